//! Subscriber setup.

use anyhow::Context as _;
use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};

/// Installs the global subscriber. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.level)
        .with_context(|| format!("invalid log filter '{}'", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let result = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    result.map_err(|e| anyhow::anyhow!(e)).context("failed to install logger")
}

/// Routes panic reports through the subscriber instead of the default hook.
///
/// Validator panics are contained by the engine and already reported as rule
/// errors, so the raw stderr report is demoted to a debug event.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        tracing::debug!(%info, "validator panic contained");
    }));
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use serde_json::Value;
    use tagrule::{EngineConfig, Outcome, Registry, Validation};

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn explode(_: &mut Validation, _: &Value, _: &str) -> Outcome {
        panic!("validator blew up")
    }

    #[test]
    fn test_panic_hook_reports_through_subscriber() {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let registry = Arc::new(Registry::builder().rule("Explode", explode).unwrap().build());
        let mut valid = Validation::with_config(registry, EngineConfig::lenient());

        let passed = tracing::subscriber::with_default(subscriber, || {
            let previous = std::panic::take_hook();
            install_panic_hook();
            let passed = valid.check(&Value::Null, "Explode");
            std::panic::set_hook(previous);
            passed
        });

        assert!(!passed.unwrap());
        assert_eq!(valid.rule_errors().len(), 1);

        let logged = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("validator panic contained"), "{logged}");
        assert!(logged.contains("validator blew up"), "{logged}");
    }
}
