// Installs the global subscriber, so it lives in its own test binary.

use jobengine::logging::{init_logging, LogLevel};

#[test]
fn test_init_logging_only_once() {
    assert!(init_logging(Some(LogLevel::Debug)).is_ok());
    tracing::debug!("subscriber installed");

    let second = init_logging(None);
    assert!(second.is_err(), "a second subscriber must be refused");
}
