use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::http::client::Transport;
use crate::http::request::Request;
use crate::presets::model::{ConfigSnapshot, PresetSnapshot};

pub const MODELS_ENDPOINT: &str = "/models/options";
pub const PRESETS_ENDPOINT: &str = "/prompt/presets";

/// Fetch-once cache for the two auxiliary snapshots.
///
/// Both loads are best-effort: a failed fetch returns `None`, keeps whatever
/// snapshot was cached before and never surfaces a user-facing error.
#[derive(Debug, Default)]
pub struct PresetLoader {
    config: Option<Arc<ConfigSnapshot>>,
    presets: Option<Arc<PresetSnapshot>>,
}

impl PresetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<Arc<ConfigSnapshot>> {
        self.config.clone()
    }

    pub fn presets(&self) -> Option<Arc<PresetSnapshot>> {
        self.presets.clone()
    }

    pub fn load_config(&mut self, transport: &dyn Transport) -> Option<Arc<ConfigSnapshot>> {
        if let Some(cached) = &self.config {
            return Some(cached.clone());
        }
        self.reload_config(transport)
    }

    pub fn reload_config(&mut self, transport: &dyn Transport) -> Option<Arc<ConfigSnapshot>> {
        let snapshot = Arc::new(fetch::<ConfigSnapshot>(transport, MODELS_ENDPOINT)?);
        self.config = Some(snapshot.clone());
        Some(snapshot)
    }

    pub fn load_presets(&mut self, transport: &dyn Transport) -> Option<Arc<PresetSnapshot>> {
        if let Some(cached) = &self.presets {
            return Some(cached.clone());
        }
        self.reload_presets(transport)
    }

    pub fn reload_presets(&mut self, transport: &dyn Transport) -> Option<Arc<PresetSnapshot>> {
        let snapshot = Arc::new(fetch::<PresetSnapshot>(transport, PRESETS_ENDPOINT)?);
        self.presets = Some(snapshot.clone());
        Some(snapshot)
    }
}

fn fetch<T: DeserializeOwned>(transport: &dyn Transport, endpoint: &str) -> Option<T> {
    let value = match transport.send(&Request::get(endpoint), None) {
        Ok(v) => v,
        Err(e) => {
            log::debug!("{} unavailable: {}", endpoint, e);
            return None;
        }
    };

    match serde_json::from_value(value) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            log::debug!("{} returned an unexpected shape: {}", endpoint, e);
            None
        }
    }
}
