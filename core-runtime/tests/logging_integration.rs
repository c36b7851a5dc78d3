//! Integration tests for logging system

use bridge_traits::time::LogLevel;
use core_runtime::Error;
use core_runtime::logging::{default_filter_directive, init_logging, LogFormat, LoggingConfig};

#[test]
fn test_logging_initializes_once_per_process() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug);

    init_logging(config.clone()).expect("first initialization succeeds");
    tracing::debug!(target: "core_catalog", key = "charts", "Catalog cache hit");

    let second = init_logging(config);
    assert!(matches!(second, Err(Error::Logging(_))));
}

#[test]
fn test_default_directive_keeps_dependencies_quiet() {
    let directive = default_filter_directive(LogLevel::Trace);

    assert!(directive.starts_with("warn,"));
    assert!(directive.contains("core_runtime=trace"));
    assert!(directive.contains("bridge_wasm=trace"));
    assert!(!directive.contains("reqwest=trace"));
}
