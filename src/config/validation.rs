//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and formats. All errors are
//! collected so a broken file is reported in one pass.

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::NeuralConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("gate.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("gate.backoff_multiplier must be a finite number >= 1 (got {0})")]
    InvalidMultiplier(f64),

    #[error("gate.cooldown_ms must be greater than 0")]
    ZeroCooldown,

    #[error("ai.base_url '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("ai.{0} must not be empty")]
    EmptyField(&'static str),

    #[error("ai.{field} must be within [0, 2] (got {value})")]
    TemperatureOutOfRange { field: &'static str, value: f32 },

    #[error("ai.request_timeout_secs must be greater than 0")]
    ZeroTimeout,

    #[error("observability.log_level '{0}' is not a valid filter directive")]
    InvalidLogLevel(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &NeuralConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let gate = &config.gate;
    if gate.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if !gate.backoff_multiplier.is_finite() || gate.backoff_multiplier < 1.0 {
        errors.push(ValidationError::InvalidMultiplier(gate.backoff_multiplier));
    }
    if gate.cooldown_ms == 0 {
        errors.push(ValidationError::ZeroCooldown);
    }

    let ai = &config.ai;
    match Url::parse(&ai.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
            url: ai.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: ai.base_url.clone(),
            reason: e.to_string(),
        }),
    }
    for (field, value) in [
        ("api_key_env", &ai.api_key_env),
        ("fast_model", &ai.fast_model),
        ("deep_model", &ai.deep_model),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::EmptyField(field));
        }
    }
    for (field, value) in [
        ("chart_temperature", ai.chart_temperature),
        ("advice_temperature", ai.advice_temperature),
    ] {
        if !(0.0..=2.0).contains(&value) {
            errors.push(ValidationError::TemperatureOutOfRange { field, value });
        }
    }
    if ai.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let obs = &config.observability;
    if EnvFilter::try_new(&obs.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(obs.log_level.clone()));
    }
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidMetricsAddress(obs.metrics_address.clone()));
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
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&NeuralConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = NeuralConfig::default();
        config.gate.max_attempts = 0;
        config.gate.backoff_multiplier = 0.5;
        config.gate.cooldown_ms = 0;
        config.ai.base_url = "ftp://example.com".to_string();
        config.ai.fast_model = " ".to_string();
        config.ai.chart_temperature = 3.5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::ZeroAttempts));
        assert!(errors.contains(&ValidationError::InvalidMultiplier(0.5)));
        assert!(errors.contains(&ValidationError::ZeroCooldown));
        assert!(errors.contains(&ValidationError::EmptyField("fast_model")));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_nan_multiplier_rejected() {
        let mut config = NeuralConfig::default();
        config.gate.backoff_multiplier = f64::NAN;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::InvalidMultiplier(_)));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = NeuralConfig::default();
        config.observability.metrics_address = "not-an-address".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidMetricsAddress("not-an-address".to_string())]
        );
    }
}
