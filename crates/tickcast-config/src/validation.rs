//! Configuration validation.
//!
//! Collects every problem before failing so a bad file is reported in one go.

use tickcast_common::ConfigError;

use crate::schema::TickcastConfig;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &TickcastConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let server = &config.server;
    if server.port == 0 {
        errors.push("server.port must not be 0".into());
    }
    if !server.path.starts_with('/') {
        errors.push(format!("server.path = {:?} must start with '/'", server.path));
    }
    if server.bind.trim().is_empty() {
        errors.push("server.bind must not be empty".into());
    }
    validate_range(&mut errors, "server.subscriber_buffer", server.subscriber_buffer as u64, 1, 65_536);

    let broadcast = &config.broadcast;
    if broadcast.value_min > broadcast.value_max {
        errors.push(format!(
            "broadcast.value_min = {} is greater than broadcast.value_max = {}",
            broadcast.value_min, broadcast.value_max
        ));
    }
    validate_range(&mut errors, "broadcast.interval_ms", broadcast.interval_ms, 1, 60_000);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Push an error if `value` is outside `[min, max]`.
fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_text(config: &TickcastConfig) -> String {
        match validate(config) {
            Err(ConfigError::ValidationError(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&TickcastConfig::default()).is_ok());
    }

    #[test]
    fn equal_bounds_are_valid() {
        let mut config = TickcastConfig::default();
        config.broadcast.value_min = 5;
        config.broadcast.value_max = 5;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut config = TickcastConfig::default();
        config.broadcast.value_min = 10;
        config.broadcast.value_max = 3;
        assert!(error_text(&config).contains("broadcast.value_min = 10"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = TickcastConfig::default();
        config.broadcast.interval_ms = 0;
        assert!(error_text(&config).contains("broadcast.interval_ms = 0 is out of range"));
    }

    #[test]
    fn path_must_be_absolute() {
        let mut config = TickcastConfig::default();
        config.server.path = "ws".into();
        assert!(error_text(&config).contains("server.path"));
    }

    #[test]
    fn collects_all_errors() {
        let mut config = TickcastConfig::default();
        config.server.port = 0;
        config.server.subscriber_buffer = 0;
        config.broadcast.interval_ms = 120_000;

        let msg = error_text(&config);
        assert!(msg.contains("server.port"));
        assert!(msg.contains("server.subscriber_buffer"));
        assert!(msg.contains("broadcast.interval_ms"));
    }
}
