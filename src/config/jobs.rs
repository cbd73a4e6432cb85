//! Reconciliation job configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the scheduled reconciliation endpoints.
///
/// The sweeps are triggered by an external scheduler over HTTP; requests
/// must carry the shared trigger secret.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsConfig {
    /// Shared secret the scheduler presents when triggering a sweep
    pub trigger_secret: String,
}

impl JobsConfig {
    /// Validate jobs configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.trigger_secret.is_empty() {
            return Err(ValidationError::MissingRequired("JOBS_TRIGGER_SECRET"));
        }
        if self.trigger_secret.len() < 16 {
            return Err(ValidationError::JobsSecretTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_missing_secret() {
        let config = JobsConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_short_secret() {
        let config = JobsConfig {
            trigger_secret: "tooshort".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_valid_config() {
        let config = JobsConfig {
            trigger_secret: "a-long-enough-trigger-secret".to_string(),
        };
        assert!(config.validate().is_ok());
    }
}
