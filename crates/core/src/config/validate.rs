use super::{types::Config, ConfigError};
use crate::storage::StorageBackend;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - The selected storage backend has its section, with both buckets for S3
/// - Encoder crf is within 0-51 and segments are at least one second
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Storage validation
    match config.storage.backend {
        StorageBackend::S3 => {
            let s3 = config.storage.s3.as_ref().ok_or_else(|| {
                ConfigError::ValidationError(
                    "storage.s3 is required when storage.backend = \"s3\" \
                     (or set AWS_DOWNLOAD_BUCKET_NAME and AWS_UPLOAD_BUCKET_NAME)"
                        .to_string(),
                )
            })?;
            if s3.source_bucket.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "storage.s3.source_bucket cannot be empty".to_string(),
                ));
            }
            if s3.destination_bucket.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "storage.s3.destination_bucket cannot be empty".to_string(),
                ));
            }
        }
        StorageBackend::Local => {
            if config.storage.local.is_none() {
                return Err(ConfigError::ValidationError(
                    "storage.local is required when storage.backend = \"local\"".to_string(),
                ));
            }
        }
    }

    // Encoder validation
    if config.encoder.crf > 51 {
        return Err(ConfigError::ValidationError(format!(
            "encoder.crf must be between 0 and 51, got {}",
            config.encoder.crf
        )));
    }
    if config.encoder.segment_duration_secs == 0 {
        return Err(ConfigError::ValidationError(
            "encoder.segment_duration_secs cannot be 0".to_string(),
        ));
    }
    if config.encoder.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "encoder.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
