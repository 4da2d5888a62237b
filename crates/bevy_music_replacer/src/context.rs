//! Game state the host exposes to the music engine.

use crate::replacement::CelestialBody;
use bevy::prelude::*;

/// Coarse scene identifier supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameScene {
    #[default]
    Loading,
    MainMenu,
    SpaceCenter,
    Editor,
    TrackingStation,
    Flight,
}

/// The vessel the player is currently flying.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselState {
    /// Altitude above the main body's sea level, in metres.
    pub altitude: f64,
    /// Body whose sphere of influence the vessel is in.
    pub main_body: CelestialBody,
}

impl VesselState {
    pub fn new(main_body: impl Into<String>, altitude: f64) -> Self {
        Self {
            altitude,
            main_body: CelestialBody::new(main_body),
        }
    }
}

/// The body the game starts on.
#[derive(Debug, Clone, PartialEq)]
pub struct HomeBody {
    pub body: CelestialBody,
    /// Height of the atmosphere ceiling; the host starts its space music above it.
    pub atmosphere_depth: f64,
}

impl HomeBody {
    pub fn new(name: impl Into<String>, atmosphere_depth: f64) -> Self {
        Self {
            body: CelestialBody::new(name),
            atmosphere_depth,
        }
    }
}

/// Live game state, written by the host every frame.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameContext {
    pub scene: GameScene,
    pub active_vessel: Option<VesselState>,
    /// `None` until the host has resolved its celestial bodies.
    pub home_body: Option<HomeBody>,
    /// User-configured music volume (0.0 - 1.0).
    pub music_volume: f32,
}

impl Default for GameContext {
    fn default() -> Self {
        Self {
            scene: GameScene::Loading,
            active_vessel: None,
            home_body: None,
            music_volume: 1.0,
        }
    }
}

impl GameContext {
    pub fn in_flight(&self) -> bool {
        self.scene == GameScene::Flight && self.active_vessel.is_some()
    }
}

/// Clock values for one frame.
///
/// `sim_time` throttles rule evaluation and follows game time; `real_time`
/// drives fades and keeps running while the game is paused.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameClock {
    pub sim_time: f64,
    pub real_time: f32,
}

impl FrameClock {
    pub fn new(sim_time: f64, real_time: f32) -> Self {
        Self {
            sim_time,
            real_time,
        }
    }
}
