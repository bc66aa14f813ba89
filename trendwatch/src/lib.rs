pub mod bootstrap;
pub mod config;
pub mod error;
pub mod notifier;
pub mod orchestrator;
pub mod reporter;
