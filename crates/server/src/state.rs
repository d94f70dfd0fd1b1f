use std::sync::Arc;
use ladder_core::{Config, SanitizedConfig, Transcoder};

/// Shared application state
pub struct AppState {
    config: Config,
    transcoder: Arc<Transcoder>,
}

impl AppState {
    pub fn new(config: Config, transcoder: Arc<Transcoder>) -> Self {
        Self { config, transcoder }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn transcoder(&self) -> &Transcoder {
        self.transcoder.as_ref()
    }
}
