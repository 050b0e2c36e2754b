//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ConfigValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::RouterConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("rules.directory must not be empty")]
    EmptyRulesDirectory,

    #[error("rules.poll_interval_secs must be greater than zero")]
    ZeroPollInterval,

    #[error("admin.api_key must not be empty when set")]
    EmptyApiKey,
}

pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ConfigValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ConfigValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.rules.directory.trim().is_empty() {
        errors.push(ConfigValidationError::EmptyRulesDirectory);
    }

    if config.rules.poll_interval_secs == 0 {
        errors.push(ConfigValidationError::ZeroPollInterval);
    }

    if config.admin.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        errors.push(ConfigValidationError::EmptyApiKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
