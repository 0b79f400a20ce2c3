pub mod cli;
pub mod display;
pub mod error;
pub mod identity;
pub mod manager;
pub mod models;
pub mod password;
pub mod roster;
pub mod schema;
pub mod settings;

pub use crate::error::{AttendanceError, AttendanceResult};
pub use crate::identity::Identity;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber, writing to stderr. `RUST_LOG` overrides
/// `default_filter`.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
