//! The music engine: rule selection plus playback transitions.
//!
//! [`MusicEngine`] is created once the rules are loaded, activated when the
//! home body is known, and then updated every frame with the host's
//! [`GameContext`]. In flight it re-evaluates the rules at most every
//! `evaluation_interval` seconds of game time; everywhere else it only keeps
//! fades moving and drops back to default mode.

use crate::context::{FrameClock, GameContext, GameScene, VesselState};
use crate::error::{MusicReplacerError, Result};
use crate::loader::LoadReport;
use crate::replacement::Replacement;
use crate::selection::{Evaluation, MusicMode, SelectionEngine};
use crate::transition::{
    ChannelSettings, DEFAULT_FADE_DURATION, FadeProgress, PlaybackDriver, TransitionController,
};
use bevy::log::{debug, info};
use std::fmt::Debug;

/// Minimum game time between two rule evaluations.
pub const DEFAULT_EVALUATION_INTERVAL: f64 = 0.5;

/// Timing knobs for [`MusicEngine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub evaluation_interval: f64,
    pub fade_duration: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            evaluation_interval: DEFAULT_EVALUATION_INTERVAL,
            fade_duration: DEFAULT_FADE_DURATION,
        }
    }
}

/// Selection and transition state for one game session.
///
/// `C` is the clip handle type, `S` the driver's duplicated-stream handle.
#[derive(Debug)]
pub struct MusicEngine<C, S> {
    selection: SelectionEngine<C>,
    transition: TransitionController<S>,
    settings: EngineSettings,
    /// Home atmosphere ceiling; `None` until activated.
    space_altitude: Option<f64>,
    /// Altitude at which the host should start its own space music.
    space_music_altitude: f64,
    last_evaluation: Option<f64>,
}

impl<C, S> MusicEngine<C, S>
where
    C: Clone + PartialEq + Debug,
{
    pub fn new(
        replacements: Vec<Replacement<C>>,
        original_playlist: Vec<C>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            selection: SelectionEngine::new(replacements, original_playlist),
            transition: TransitionController::new(settings.fade_duration),
            settings,
            space_altitude: None,
            space_music_altitude: 0.0,
            last_evaluation: None,
        }
    }

    pub fn from_report(report: LoadReport<C>, settings: EngineSettings) -> Self {
        Self::new(report.replacements, report.original_playlist, settings)
    }

    /// Resolve the home body altitude and prepare the primary channel.
    ///
    /// Evaluation is refused until this has been called.
    pub fn activate<D>(&mut self, home_altitude: f64, driver: &mut D)
    where
        D: PlaybackDriver<Clip = C, Stream = S> + ?Sized,
    {
        info!(
            "[MusicReplacer] activating with {} conditional rules, space music above {home_altitude} m",
            self.selection.replacements().len()
        );
        self.space_altitude = Some(home_altitude);
        self.space_music_altitude = home_altitude;
        driver.configure(&ChannelSettings::default());
        driver.set_playlist(self.selection.playlist().to_vec());
    }

    pub fn is_active(&self) -> bool {
        self.space_altitude.is_some()
    }

    /// Per-frame entry point.
    ///
    /// Returns `Ok(Some(_))` when the rules were evaluated this frame and a
    /// [`MusicReplacerError::Precondition`] when flight music was requested
    /// before [`activate`](Self::activate).
    pub fn update<D>(
        &mut self,
        context: &GameContext,
        clock: FrameClock,
        driver: &mut D,
    ) -> Result<Option<Evaluation>>
    where
        D: PlaybackDriver<Clip = C, Stream = S> + ?Sized,
    {
        let volume = context.music_volume;
        match self.transition.advance(driver, volume, clock.real_time) {
            FadeProgress::Fading(_) => {}
            FadeProgress::Completed => debug!("[MusicReplacer] crossfade finished"),
            // Outside a fade the primary channel follows the user's volume.
            FadeProgress::Idle => driver.set_volume(volume),
        }

        match (context.scene, context.active_vessel.as_ref()) {
            (GameScene::Flight, Some(vessel)) => self.evaluate_flight(vessel, clock, volume, driver),
            (GameScene::Flight, None) => Ok(None),
            _ => {
                self.leave_flight();
                Ok(None)
            }
        }
    }

    fn evaluate_flight<D>(
        &mut self,
        vessel: &VesselState,
        clock: FrameClock,
        volume: f32,
        driver: &mut D,
    ) -> Result<Option<Evaluation>>
    where
        D: PlaybackDriver<Clip = C, Stream = S> + ?Sized,
    {
        if self.space_altitude.is_none() {
            return Err(MusicReplacerError::precondition(
                "home body altitude has not been resolved",
            ));
        }

        if let Some(last) = self.last_evaluation
            && clock.sim_time <= last + self.settings.evaluation_interval
        {
            return Ok(None);
        }
        self.last_evaluation = Some(clock.sim_time);

        let playing = driver.playing_clip();
        let evaluation =
            self.selection
                .evaluate(Some(&vessel.main_body), vessel.altitude, playing.as_ref());

        if evaluation.changed {
            driver.set_playlist(self.selection.playlist().to_vec());
        }

        if evaluation.decision.requires_restart() {
            info!(
                "[MusicReplacer] {:?} at {:.0} m around {}, restarting music",
                evaluation.decision, vessel.altitude, vessel.main_body
            );
            self.restart(driver, true, volume, clock.real_time);
        }

        Ok(Some(evaluation))
    }

    fn leave_flight(&mut self) {
        if let Some(home_altitude) = self.space_altitude
            && self.selection.revert_to_default()
        {
            info!("[MusicReplacer] left flight, back to default music");
            self.space_music_altitude = home_altitude;
        }
    }

    /// Restart the primary channel from the current playlist.
    ///
    /// Also publishes the space music altitude: the home atmosphere ceiling in
    /// default mode, zero while overridden.
    pub fn restart<D>(&mut self, driver: &mut D, crossfade: bool, volume: f32, now: f32)
    where
        D: PlaybackDriver<Clip = C, Stream = S> + ?Sized,
    {
        self.space_music_altitude = match self.selection.mode() {
            MusicMode::Default => self.space_altitude.unwrap_or(0.0),
            MusicMode::Overridden => 0.0,
        };
        self.transition.restart(driver, crossfade, volume, now);
    }

    /// Replace the conditional rules, e.g. after a config reload.
    pub fn set_replacements(&mut self, replacements: Vec<Replacement<C>>) {
        self.selection.set_replacements(replacements);
    }

    /// Release any transition resources.
    pub fn shutdown<D>(&mut self, driver: &mut D)
    where
        D: PlaybackDriver<Clip = C, Stream = S> + ?Sized,
    {
        self.transition.cancel(driver);
    }

    pub fn mode(&self) -> MusicMode {
        self.selection.mode()
    }

    pub fn space_music_altitude(&self) -> f64 {
        self.space_music_altitude
    }

    pub fn selection(&self) -> &SelectionEngine<C> {
        &self.selection
    }

    pub fn transition(&self) -> &TransitionController<S> {
        &self.transition
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }
}
