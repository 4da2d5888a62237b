//! Context-aware soundtrack replacement for Bevy games
//!
//! This crate lets config files swap a game's stock music and, while a
//! vessel is in flight, override the flight playlist depending on which
//! celestial body it orbits and how high it is.
//!
//! The crate has two layers:
//! - A host-agnostic core: the rule loader, the [`SelectionEngine`] that
//!   decides which rules apply, and the [`TransitionController`] that restarts
//!   and crossfades music through the [`PlaybackDriver`] trait.
//! - A Bevy integration: [`MusicReplacerPlugin`] loads `.musicreplacer.ron`
//!   assets, drives the engine from the [`GameContext`] resource every frame
//!   and plays the flight playlist through `AudioPlayer` entities.
//!
//! # Features
//!
//! - **Static substitutions**: replace the menu theme, scene ambiences or
//!   append to the construction and space playlists
//! - **Conditional flight music**: playlists selected by celestial body and
//!   half-open altitude band `[min, max)`
//! - **Crossfaded restarts** whenever the selection changes
//! - **Partial-failure loading**: a bad record is logged and skipped
//!
//! # Quick Start
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_music_replacer::{
//!     BodyCatalog, ClipLibrary, GameContext, HostSoundtrack, MusicReplacerPlugin,
//!     MusicReplacerPluginConfig,
//! };
//!
//! fn main() {
//!     let config = MusicReplacerPluginConfig::default()
//!         .config_file("music/mun.musicreplacer.ron");
//!
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(MusicReplacerPlugin::with_config(config))
//!         .init_resource::<GameContext>()
//!         .init_resource::<HostSoundtrack>()
//!         .init_resource::<ClipLibrary>()
//!         .insert_resource(BodyCatalog(vec!["Kerbin".into(), "Mun".into()]))
//!         .run();
//! }
//! ```
//!
//! Config records are read once the main menu is reached and every tracked
//! [`MusicConfigFiles`] entry has finished loading.
//!
//! The host keeps [`GameContext`] current (scene, active vessel, home body,
//! music volume) and reads [`SpaceMusicAltitude`] to know above which
//! altitude its own space music may start.
//!
//! # Module Organization
//!
//! - [`config`] - RON config records and their asset loader
//! - [`loader`] - Record validation and static substitutions
//! - [`selection`] - Rule filtering and mode decisions
//! - [`transition`] - Restart and crossfade state machine
//! - [`engine`] - Per-frame orchestration of selection and transitions
//! - [`plugin`] - Bevy plugin integration and systems

pub mod channel;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod events;
pub mod loader;
pub mod plugin;
pub mod replacement;
pub mod selection;
pub mod soundtrack;
#[cfg(test)]
mod testing;
pub mod theme;
pub mod transition;

pub use channel::{BevyMusicChannel, ChannelState, MusicChannel, OutgoingStream};
pub use config::{MUSIC_CONFIG_EXTENSIONS, MusicConfig, MusicConfigLoader, MusicRecord};
pub use context::{FrameClock, GameContext, GameScene, HomeBody, VesselState};
pub use engine::{DEFAULT_EVALUATION_INTERVAL, EngineSettings, MusicEngine};
pub use error::{MusicReplacerError, Result};
pub use events::{MusicModeChanged, MusicReplacerLoaded};
pub use loader::{
    BodyRegistry, ClipRegistry, LoadReport, ValidatedRecord, load_replacements, validate_record,
};
pub use plugin::{
    BodyCatalog, ClipLibrary, FlightMusic, FlightMusicEngine, HostSoundtrack, MusicConfigFiles,
    MusicReplacerPlugin, MusicReplacerPluginConfig, ReplacerStatus, SpaceMusicAltitude,
};
pub use replacement::{AltitudeBand, CelestialBody, Replacement};
pub use selection::{Decision, Evaluation, MusicMode, SelectionEngine};
pub use soundtrack::{Soundtrack, ThemeSlot};
pub use theme::Theme;
pub use transition::{
    ChannelSettings, Crossfade, DEFAULT_FADE_DURATION, FadeProgress, PlaybackDriver,
    TransitionController,
};
