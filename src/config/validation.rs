//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate endpoint URLs and bind addresses
//! - Validate value ranges (timeouts > 0)
//! - Reject a fallback that points at the primary
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: NodeConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{ClientEndpointConfig, NodeConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid URL '{value}' ({reason})")]
    InvalidUrl {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field}: URL scheme must be http or https, got '{scheme}'")]
    UnsupportedScheme { field: String, scheme: String },

    #[error("{field}: must be greater than zero")]
    ZeroTimeout { field: String },

    #[error("{field}: fallback URL is the same as the primary URL")]
    FallbackIsPrimary { field: String },

    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: String, value: String },
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &NodeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_endpoints("execution", &config.execution, &mut errors);
    validate_endpoints("consensus", &config.consensus, &mut errors);

    if config.api.enabled {
        validate_address("api.bind_address", &config.api.bind_address, &mut errors);
    }
    if config.observability.metrics_enabled {
        validate_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_endpoints(section: &str, endpoints: &ClientEndpointConfig, errors: &mut Vec<ValidationError>) {
    let primary = validate_url(&format!("{section}.primary_url"), &endpoints.primary_url, errors);

    if let Some(fallback_url) = &endpoints.fallback_url {
        let field = format!("{section}.fallback_url");
        let fallback = validate_url(&field, fallback_url, errors);
        if let (Some(primary), Some(fallback)) = (primary, fallback) {
            if primary == fallback {
                errors.push(ValidationError::FallbackIsPrimary { field });
            }
        }
    }

    if endpoints.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: format!("{section}.timeout_secs"),
        });
    }
}

fn validate_url(field: &str, value: &str, errors: &mut Vec<ValidationError>) -> Option<url::Url> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            errors.push(ValidationError::UnsupportedScheme {
                field: field.to_string(),
                scheme: url.scheme().to_string(),
            });
            None
        }
        Err(e) => {
            errors.push(ValidationError::InvalidUrl {
                field: field.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            });
            None
        }
    }
}

fn validate_address(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
}
