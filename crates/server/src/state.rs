use std::sync::Arc;

use plotguess_core::{Config, SanitizedConfig};

use crate::registry::SessionRegistry;

/// Shared application state
pub struct AppState {
    config: Config,
    sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config, sessions: Arc<SessionRegistry>) -> Self {
        Self { config, sessions }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}
