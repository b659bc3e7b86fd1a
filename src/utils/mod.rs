use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "spend_control=info";

/// Installs the global subscriber once. A valid `RUST_LOG` replaces the
/// default filter; logs go to stderr so JSON output on stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = build_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok());
        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
        tracing::debug!("spend_control tracing initialized");
    });
}

fn build_filter(rust_log: Option<String>) -> EnvFilter {
    rust_log
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_replaces_the_default_directive() {
        let filter = build_filter(Some("spend_control=debug".into())).to_string();
        assert!(filter.contains("debug"));
        assert!(!filter.contains("info"));
    }

    #[test]
    fn default_directive_applies_without_rust_log() {
        assert!(build_filter(None).to_string().contains(DEFAULT_DIRECTIVE));
    }
}
