use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::encoder::EncoderConfig;
use crate::storage::{StorageBackend, StorageConfig};
use crate::transcoder::TranscoderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    50051
}

/// Sanitized config for API responses (endpoint details redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub storage: SanitizedStorageConfig,
    pub encoder: SanitizedEncoderConfig,
    pub transcoder: TranscoderConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedStorageConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s3: Option<SanitizedS3Config>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<SanitizedLocalConfig>,
}

/// Sanitized S3 config (custom endpoint hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedS3Config {
    pub source_bucket: String,
    pub destination_bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub custom_endpoint: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLocalConfig {
    pub source_dir: PathBuf,
    pub destination_dir: PathBuf,
}

/// Encoder settings that affect output.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedEncoderConfig {
    pub preset: String,
    pub crf: u8,
    pub audio_bitrate_kbps: u32,
    pub segment_duration_secs: u32,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            storage: SanitizedStorageConfig {
                backend: match config.storage.backend {
                    StorageBackend::S3 => "s3".to_string(),
                    StorageBackend::Local => "local".to_string(),
                },
                s3: config.storage.s3.as_ref().map(|s| SanitizedS3Config {
                    source_bucket: s.source_bucket.clone(),
                    destination_bucket: s.destination_bucket.clone(),
                    region: s.region.clone(),
                    custom_endpoint: s.endpoint_url.is_some(),
                }),
                local: config.storage.local.as_ref().map(|l| SanitizedLocalConfig {
                    source_dir: l.source_dir.clone(),
                    destination_dir: l.destination_dir.clone(),
                }),
            },
            encoder: SanitizedEncoderConfig {
                preset: config.encoder.preset.clone(),
                crf: config.encoder.crf,
                audio_bitrate_kbps: config.encoder.audio_bitrate_kbps,
                segment_duration_secs: config.encoder.segment_duration_secs,
                timeout_secs: config.encoder.timeout_secs,
            },
            transcoder: config.transcoder.clone(),
        }
    }
}
