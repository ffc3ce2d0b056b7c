//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("limits.{0} must be greater than zero")]
    ZeroLimit(&'static str),
    #[error("limits.default_page_size must be within 1..={max}, got {got}")]
    DefaultPageSizeOutOfRange { got: usize, max: usize },
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push(ValidationError::MissingServerName);
    }

    let limits = &config.limits;
    for (name, value) in [
        ("retention_cap", limits.retention_cap),
        ("max_message_len", limits.max_message_len),
        ("max_page_size", limits.max_page_size),
        ("subscriber_buffer", limits.subscriber_buffer),
        ("room_mailbox_capacity", limits.room_mailbox_capacity),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroLimit(name));
        }
    }

    if limits.default_page_size == 0 || limits.default_page_size > limits.max_page_size {
        errors.push(ValidationError::DefaultPageSizeOutOfRange {
            got: limits.default_page_size,
            max: limits.max_page_size,
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

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        let config = parse(
            r#"
[server]
name = "chat"
"#,
        );
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_server_name_fails() {
        let config = parse(
            r#"
[server]
name = "  "
"#,
        );
        let errors = validate(&config).unwrap_err();
        assert!(errors.iter().any(|e| matches!(e, ValidationError::MissingServerName)));
    }

    #[test]
    fn test_zero_limits_all_reported() {
        let config = parse(
            r#"
[server]
name = "chat"

[limits]
retention_cap = 0
subscriber_buffer = 0
"#,
        );
        let errors = validate(&config).unwrap_err();
        let zero = |field: &str| {
            errors
                .iter()
                .any(|e| matches!(e, ValidationError::ZeroLimit(f) if *f == field))
        };
        assert!(zero("retention_cap"));
        assert!(zero("subscriber_buffer"));
    }

    #[test]
    fn test_default_page_above_max_fails() {
        let config = parse(
            r#"
[server]
name = "chat"

[limits]
default_page_size = 80
max_page_size = 40
"#,
        );
        let errors = validate(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "limits.default_page_size must be within 1..=40, got 80"
        );
    }
}
