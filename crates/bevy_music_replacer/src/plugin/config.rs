//! Runtime options for the music replacer plugin.

use crate::engine::{DEFAULT_EVALUATION_INTERVAL, EngineSettings};
use crate::transition::DEFAULT_FADE_DURATION;
use bevy::prelude::Resource;

/// Configuration object for [`MusicReplacerPlugin`](super::MusicReplacerPlugin).
#[derive(Debug, Clone, Resource)]
pub struct MusicReplacerPluginConfig {
    /// Minimum game time, in seconds, between two rule evaluations.
    pub evaluation_interval: f64,
    /// Crossfade length in real seconds.
    pub fade_duration: f32,
    /// Start the next clip of the flight playlist when the current one ends.
    pub continue_playlist: bool,
    /// Config assets requested from the `AssetServer` at startup.
    pub config_files: Vec<String>,
}

impl Default for MusicReplacerPluginConfig {
    fn default() -> Self {
        Self {
            evaluation_interval: DEFAULT_EVALUATION_INTERVAL,
            fade_duration: DEFAULT_FADE_DURATION,
            continue_playlist: true,
            config_files: Vec::new(),
        }
    }
}

impl MusicReplacerPluginConfig {
    pub fn evaluation_interval(mut self, seconds: f64) -> Self {
        self.evaluation_interval = seconds.max(0.0);
        self
    }

    pub fn fade_duration(mut self, seconds: f32) -> Self {
        self.fade_duration = seconds;
        self
    }

    pub fn continue_playlist(mut self, enabled: bool) -> Self {
        self.continue_playlist = enabled;
        self
    }

    /// Load `path` at startup and hold the main menu load until it settles.
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_files.push(path.into());
        self
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            evaluation_interval: self.evaluation_interval,
            fade_duration: self.fade_duration,
        }
    }
}
