//! Bevy plugin wiring for soundtrack replacement.
//!
//! The plugin registers the config asset type and loader, the resources the
//! engine lives in, and a chain of `Update` systems: load and activate,
//! drive the engine, continue the flight playlist, push volumes to sinks.

mod config;
mod systems;

pub use config::MusicReplacerPluginConfig;
pub use systems::{
    BodyCatalog, ClipLibrary, FlightMusic, FlightMusicEngine, HostSoundtrack, MusicConfigFiles,
    ReplacerStatus, SpaceMusicAltitude,
};

use self::systems::{
    continue_flight_playlist, drive_flight_music, load_music_replacements, request_music_configs,
    sync_music_volumes,
};
use crate::config::{MusicConfig, MusicConfigLoader};
use crate::events::{MusicModeChanged, MusicReplacerLoaded};
use bevy::prelude::*;

/// Bevy plugin that swaps and conditionally overrides a game's soundtrack.
#[derive(Default)]
pub struct MusicReplacerPlugin {
    config: MusicReplacerPluginConfig,
}

impl MusicReplacerPlugin {
    /// Create a plugin instance with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a plugin instance using the provided configuration.
    pub fn with_config(config: MusicReplacerPluginConfig) -> Self {
        Self { config }
    }

    /// Apply mutations to the internal configuration prior to registering.
    pub fn configure(mut self, configure: impl FnOnce(&mut MusicReplacerPluginConfig)) -> Self {
        configure(&mut self.config);
        self
    }

    /// Access the current configuration.
    pub fn config(&self) -> &MusicReplacerPluginConfig {
        &self.config
    }
}

impl Plugin for MusicReplacerPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone());
        app.init_resource::<FlightMusic>();
        app.init_resource::<SpaceMusicAltitude>();
        app.init_resource::<MusicConfigFiles>();

        app.init_asset::<MusicConfig>();
        app.init_asset_loader::<MusicConfigLoader>();

        app.add_message::<MusicModeChanged>();
        app.add_message::<MusicReplacerLoaded>();

        app.add_systems(Startup, request_music_configs);

        app.add_systems(
            Update,
            (load_music_replacements, drive_flight_music).chain(),
        );
        if self.config.continue_playlist {
            app.add_systems(
                Update,
                continue_flight_playlist
                    .after(drive_flight_music)
                    .before(sync_music_volumes),
            );
        }
        app.add_systems(Update, sync_music_volumes.after(drive_flight_music));
    }
}
