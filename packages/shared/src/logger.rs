//! Logging setup utilities for the Bazaar messaging server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default `EnvFilter` directive string.
///
/// Every target in `targets` gets `default_log_level`. Hyphens are replaced
/// with underscores because tracing targets use the crate's module path.
fn default_directives(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "bazaar-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use bazaar_shared::logger::setup_logger;
///
/// setup_logger("bazaar-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    let directives = default_directives(
        &[binary_name, "bazaar_server", "tower_http"],
        default_log_level,
    );

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| directives.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_normalizes_hyphens() {
        // テスト項目: バイナリ名のハイフンがアンダースコアに変換される
        // given (前提条件):
        let targets = ["bazaar-server", "tower_http"];

        // when (操作):
        let result = default_directives(&targets, "debug");

        // then (期待する結果):
        assert_eq!(result, "bazaar_server=debug,tower_http=debug");
    }
}
