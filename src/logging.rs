//! Tracing subscriber setup.
//!
//! Installs a global subscriber with an env-filter seeded from the
//! configured log level and a JSON or pretty formatter per `log_format`.
//! `log` macro output from lower-level modules is bridged into tracing.

use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

use crate::config::AppConfig;

pub fn init_subscriber(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = Registry::default().with(filter);

    let result = if config.log_format == "pretty" {
        tracing::subscriber::set_global_default(subscriber.with(fmt::layer().pretty()))
    } else {
        tracing::subscriber::set_global_default(subscriber.with(fmt::layer().json()))
    };

    if result.is_ok() {
        let _ = tracing_log::LogTracer::init();
    }
}
