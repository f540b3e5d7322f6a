//! Opt-in log output for binaries and tests embedding the engine.
//!
//! The library only emits `tracing` events; nothing is printed until a
//! subscriber is installed, either by the host application or with
//! [`init_logging`].

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a console subscriber. `RUST_LOG` wins over `default_filter`
/// (e.g. `"cur_ingest=debug"`). Calling this more than once is harmless.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init();

    if installed.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}
