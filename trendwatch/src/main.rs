use std::process::ExitCode;

use anyhow::Context;
use common::logger::{init_tracing, install_panic_hook, payload_message};
use common::time::now_ms;
use tracing::{error, info};
use trendwatch::{
    bootstrap::build_orchestrator,
    config::AppConfig,
    error::{AppError, EXIT_CONFIG, EXIT_FAULT},
    orchestrator::PassSummary,
};

const SERVICE: &str = "trendwatch";

async fn run(cfg: AppConfig) -> anyhow::Result<PassSummary> {
    let orchestrator = build_orchestrator(&cfg)
        .await
        .context("failed to initialize collaborators")?;

    orchestrator.run_pass(now_ms()).await.context("pass aborted")
}

/// Exit status for a failed pass; anything that is not an `AppError` is a fault.
fn exit_code(e: &anyhow::Error) -> u8 {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<AppError>())
        .map_or(EXIT_FAULT, AppError::exit_code)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            init_tracing(SERVICE, false);
            error!(target: "fatal", error = %e, "invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    init_tracing(SERVICE, cfg.json_logs);
    install_panic_hook();
    info!("Starting trendwatch pass...");

    // The pass runs in its own task so a panic comes back as a JoinError
    // here instead of unwinding out of main.
    match tokio::spawn(run(cfg)).await {
        Ok(Ok(summary)) => {
            info!(
                trending = ?summary.trending,
                recorded = summary.recorded.len(),
                expired = summary.expiry.lines.len(),
                "trendwatch pass finished"
            );
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            let code = exit_code(&e);
            error!(target: "fatal", error = %format!("{e:#}"), exit_code = code, "pass failed");
            ExitCode::from(code)
        }
        // Location and backtrace were already logged by the panic hook.
        Err(join) => {
            let detail = if join.is_panic() {
                payload_message(&*join.into_panic())
            } else {
                join.to_string()
            };
            error!(target: "fatal", detail = %detail, exit_code = EXIT_FAULT, "uncaught fault");
            ExitCode::from(EXIT_FAULT)
        }
    }
}
