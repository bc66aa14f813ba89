mod init;
mod panic;
mod spans;
mod trace_id;

pub use init::init_tracing;
pub use panic::{install_panic_hook, payload_message};
pub use spans::{annotate_span, child_span, root_span, warn_if_slow};
pub use trace_id::TraceId;
