//! Configuration validation.
//!
//! Every required setting is checked and all problems are returned together,
//! so an operator sees the full list on the first failed start instead of
//! fixing them one at a time.

use crate::config::Config;
use crate::errors::ConfigError;

/// Validates a loaded configuration.
///
/// # Returns
///
/// * `Ok(())` - Configuration is complete
/// * `Err(Vec<ConfigError>)` - Every problem found
pub fn validate_config(config: &Config) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.working_dir.as_os_str().is_empty() {
        errors.push(ConfigError::MissingField {
            field: "working_dir",
        });
    }

    let required = [
        ("storage.endpoint", config.storage.endpoint.as_str()),
        ("storage.bucket", config.storage.bucket.as_str()),
        ("messaging.host", config.messaging.host.as_str()),
        ("messaging.exchange", config.messaging.exchange.as_str()),
        ("messaging.topic", config.messaging.topic.as_str()),
        ("runner.command", config.runner.command.as_str()),
    ];
    errors.extend(
        required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| ConfigError::MissingField { field }),
    );

    if config.messaging.prefetch == 0 {
        errors.push(ConfigError::InvalidField {
            field: "messaging.prefetch",
            reason: "must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_complete_config_is_valid() {
        let cfg = config_from(
            r#"
working_dir: /tmp/jobs
storage: { endpoint: "minio:9000", username: u, password: p, bucket: b }
messaging: { host: rabbit, username: u, password: p, exchange: e, topic: t }
"#,
        );
        assert!(validate_config(&cfg).is_ok());
    }

    #[test]
    fn test_all_missing_fields_are_reported() {
        let cfg = config_from(
            r#"
working_dir: ""
storage: { endpoint: "", username: u, password: p, bucket: "" }
messaging: { host: rabbit, username: u, password: p, exchange: e, topic: " ", prefetch: 0 }
"#,
        );

        let errors = validate_config(&cfg).unwrap_err();
        let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();

        assert_eq!(errors.len(), 5);
        assert!(rendered.iter().any(|e| e.contains("'working_dir'")));
        assert!(rendered.iter().any(|e| e.contains("'storage.endpoint'")));
        assert!(rendered.iter().any(|e| e.contains("'storage.bucket'")));
        assert!(rendered.iter().any(|e| e.contains("'messaging.topic'")));
        assert!(rendered.iter().any(|e| e.contains("'messaging.prefetch'")));
    }
}
