use std::backtrace::Backtrace;
use std::panic::{self, PanicHookInfo};

/// Routes panics through `tracing` on the `fatal` target, with location and
/// a captured backtrace, then hands off to the previous hook.
pub fn install_panic_hook() {
    let previous = panic::take_hook();

    panic::set_hook(Box::new(move |info: &PanicHookInfo<'_>| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "<unknown>".to_string());

        tracing::error!(
            target: "fatal",
            payload = %payload_message(info.payload()),
            location = %location,
            backtrace = %Backtrace::capture(),
            "panic"
        );

        previous(info);
    }));
}

/// Best-effort text of a panic payload.
pub fn payload_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_text_is_recovered() {
        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("boom"));
        let borrowed: Box<dyn std::any::Any + Send> = Box::new("bang");
        let other: Box<dyn std::any::Any + Send> = Box::new(7u8);

        assert_eq!(payload_message(&*owned), "boom");
        assert_eq!(payload_message(&*borrowed), "bang");
        assert_eq!(payload_message(&*other), "non-string panic payload");
    }
}
