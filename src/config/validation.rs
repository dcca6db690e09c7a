//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Catch shapes that would bind the edge into a broken state
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: EdgeConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::EdgeConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyServerName,
    InvalidBindAddress(String),
    InvalidMetricsAddress(String),
    InvalidStaticPrefix(String),
    EmptyStaticRoot,
    EmptySocketPath,
    ZeroBodyLimit,
    ZeroConnectionLimit,
    ZeroTimeout(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyServerName => {
                write!(f, "server.server_name must not be empty")
            }
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address {:?} is not a valid socket address", addr)
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(
                    f,
                    "observability.metrics_address {:?} is not a valid socket address",
                    addr
                )
            }
            ValidationError::InvalidStaticPrefix(prefix) => {
                write!(
                    f,
                    "static.url_prefix {:?} must start and end with '/' and not be '/' itself",
                    prefix
                )
            }
            ValidationError::EmptyStaticRoot => write!(f, "static.root must not be empty"),
            ValidationError::EmptySocketPath => {
                write!(f, "upstream.socket_path must not be empty")
            }
            ValidationError::ZeroBodyLimit => {
                write!(f, "limits.max_body_bytes must be greater than zero")
            }
            ValidationError::ZeroConnectionLimit => {
                write!(f, "listener.max_connections must be greater than zero")
            }
            ValidationError::ZeroTimeout(name) => {
                write!(f, "upstream.{} must be greater than zero", name)
            }
        }
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &EdgeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnectionLimit);
    }

    if config.server.server_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServerName);
    }

    let prefix = &config.static_files.url_prefix;
    if prefix == "/" || !prefix.starts_with('/') || !prefix.ends_with('/') {
        errors.push(ValidationError::InvalidStaticPrefix(prefix.clone()));
    }
    if config.static_files.root.trim().is_empty() {
        errors.push(ValidationError::EmptyStaticRoot);
    }

    if config.upstream.socket_path.trim().is_empty() {
        errors.push(ValidationError::EmptySocketPath);
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_timeout_secs"));
    }
    if config.upstream.response_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("response_timeout_secs"));
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
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

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&EdgeConfig::default()).is_ok());
    }

    #[test]
    fn rejects_empty_server_name() {
        let mut config = EdgeConfig::default();
        config.server.server_name = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::EmptyServerName));
    }

    #[test]
    fn rejects_prefix_without_slashes() {
        for bad in ["static/", "/static", "static", "/"] {
            let mut config = EdgeConfig::default();
            config.static_files.url_prefix = bad.to_string();
            let errors = validate_config(&config).unwrap_err();
            assert!(
                errors
                    .iter()
                    .any(|e| matches!(e, ValidationError::InvalidStaticPrefix(_))),
                "prefix {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn rejects_unparsable_bind_address() {
        let mut config = EdgeConfig::default();
        config.listener.bind_address = "not-an-address".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBindAddress(_))));
    }

    #[test]
    fn metrics_address_ignored_when_metrics_disabled() {
        let mut config = EdgeConfig::default();
        config.observability.metrics_enabled = false;
        config.observability.metrics_address = "nonsense".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn collects_every_problem_at_once() {
        let mut config = EdgeConfig::default();
        config.server.server_name = String::new();
        config.upstream.socket_path = String::new();
        config.limits.max_body_bytes = 0;
        config.upstream.connect_timeout_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
