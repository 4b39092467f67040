//! Logging and metrics bootstrap, grounded on `api::observability` from the
//! teacher repo. The teacher also wires an OpenTelemetry OTLP exporter;
//! this gateway drops that in favor of a plain `tracing-subscriber` fmt
//! layer plus the prometheus registry, since there is no collector in this
//! deployment's scope (see DESIGN.md).

use prometheus::Registry;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub struct Observability {
    pub registry: Registry,
}

impl Observability {
    pub fn init() -> Self {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("api=info,tower_http=info"));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();

        let registry = Registry::new_custom(Some("bnpl".into()), None)
            .expect("registry prefix should be valid");
        crate::metrics::register_all(&registry);

        Self { registry }
    }
}
