//! Restart and crossfade handling for the primary music channel.
//!
//! A crossfade is an explicit state machine advanced once per frame. While it
//! runs, the primary channel ramps from the configured music volume down to
//! silence and a duplicate of the stream that was playing when the restart
//! was requested ramps up to the same volume. When the fade ends the
//! duplicate is stopped and released and the primary is reset to full volume.
//!
//! The ramp direction is kept exactly as the host has always done it: the
//! newly started playlist fades *out* while the duplicate of the previous
//! clip fades *in*.

use bevy::log::debug;

/// Default fade length in seconds.
pub const DEFAULT_FADE_DURATION: f32 = 1.0;

/// Settings applied to the primary channel once at activation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSettings {
    pub doppler_level: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ChannelSettings {
    /// Doppler off and an effectively infinite audible range, so camera
    /// movement never colours or attenuates the music.
    fn default() -> Self {
        Self {
            doppler_level: 0.0,
            min_distance: f32::MAX,
            max_distance: f32::MAX,
        }
    }
}

/// The host's music output, as seen by the engine.
///
/// The engine never plays audio itself. It issues play/stop/volume commands
/// and swaps playlists; the driver decides which clip of a playlist plays.
pub trait PlaybackDriver {
    /// Opaque clip handle.
    type Clip;
    /// Handle to a duplicated stream.
    type Stream;

    /// Clip currently assigned to the primary channel.
    fn playing_clip(&self) -> Option<Self::Clip>;

    fn is_playing(&self) -> bool;

    fn set_volume(&mut self, volume: f32);

    /// Clone the primary channel into an independent stream.
    fn duplicate(&mut self) -> Option<Self::Stream>;

    fn set_stream_volume(&mut self, stream: &Self::Stream, volume: f32);

    /// Stop and destroy a duplicated stream.
    fn release(&mut self, stream: Self::Stream);

    /// Stop the primary channel.
    fn stop(&mut self);

    /// Replace the playlist the primary channel draws from.
    fn set_playlist(&mut self, clips: Vec<Self::Clip>);

    /// Start the next clip of the current playlist on the primary channel.
    fn play_playlist(&mut self);

    fn configure(&mut self, settings: &ChannelSettings);
}

/// An in-flight crossfade.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossfade<S> {
    pub outgoing: S,
    pub start_time: f32,
    pub duration: f32,
}

impl<S> Crossfade<S> {
    /// Elapsed fraction in `[0, 1]`.
    pub fn ratio(&self, now: f32) -> f32 {
        ((now - self.start_time) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, now: f32) -> bool {
        now >= self.start_time + self.duration
    }
}

/// Progress reported by [`TransitionController::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeProgress {
    Idle,
    Fading(f32),
    Completed,
}

/// Owns at most one [`Crossfade`] at a time.
#[derive(Debug)]
pub struct TransitionController<S> {
    fade: Option<Crossfade<S>>,
    duration: f32,
}

impl<S> Default for TransitionController<S> {
    fn default() -> Self {
        Self::new(DEFAULT_FADE_DURATION)
    }
}

impl<S> TransitionController<S> {
    pub fn new(duration: f32) -> Self {
        Self {
            fade: None,
            duration: duration.max(0.001),
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn active(&self) -> Option<&Crossfade<S>> {
        self.fade.as_ref()
    }

    /// Release the outgoing stream of any running fade right away.
    pub fn cancel<D>(&mut self, driver: &mut D)
    where
        D: PlaybackDriver<Stream = S> + ?Sized,
    {
        if let Some(fade) = self.fade.take() {
            debug!("[MusicReplacer] cancelling crossfade");
            driver.release(fade.outgoing);
        }
    }

    /// Stop the primary channel and start its playlist again.
    ///
    /// With `crossfade` set and something already playing, the playing
    /// stream is duplicated first and the fade starts at `now`.
    pub fn restart<D>(&mut self, driver: &mut D, crossfade: bool, volume: f32, now: f32)
    where
        D: PlaybackDriver<Stream = S> + ?Sized,
    {
        self.cancel(driver);

        if crossfade
            && driver.is_playing()
            && let Some(outgoing) = driver.duplicate()
        {
            driver.set_volume(volume);
            driver.set_stream_volume(&outgoing, 0.0);
            self.fade = Some(Crossfade {
                outgoing,
                start_time: now,
                duration: self.duration,
            });
        }

        driver.stop();
        driver.play_playlist();
    }

    /// Step the running fade to `now`.
    pub fn advance<D>(&mut self, driver: &mut D, volume: f32, now: f32) -> FadeProgress
    where
        D: PlaybackDriver<Stream = S> + ?Sized,
    {
        let Some(fade) = self.fade.as_ref() else {
            return FadeProgress::Idle;
        };

        if !fade.is_finished(now) {
            let ratio = fade.ratio(now);
            driver.set_volume(volume * (1.0 - ratio));
            driver.set_stream_volume(&fade.outgoing, volume * ratio);
            return FadeProgress::Fading(ratio);
        }

        driver.set_volume(volume);
        if let Some(fade) = self.fade.take() {
            driver.release(fade.outgoing);
        }
        FadeProgress::Completed
    }
}
