pub mod config;
pub mod encoder;
pub mod metrics;
pub mod probe;
pub mod rendition;
pub mod storage;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
    SanitizedConfig,
};
pub use encoder::{EncodeError, EncoderConfig, FfmpegEncoder, RenditionEncoder};
pub use probe::{FfprobeProber, MediaMetadata, MediaProber, ProbeError};
pub use rendition::{classify, plan, Dimensions, Rendition, RenditionPlan};
pub use storage::{create_gateway, StorageConfig, StorageError, StorageGateway};
pub use transcoder::{Stage, TranscodeError, TranscodeResult, Transcoder, TranscoderConfig};
