//! [`PlaybackDriver`] backed by Bevy audio entities.
//!
//! The primary channel is an entity carrying [`AudioPlayer`] and the
//! [`MusicChannel`] marker; each duplicated stream is a separate entity tagged
//! [`OutgoingStream`]. Volumes are recorded in [`ChannelState`] and pushed to
//! the [`AudioSink`]s every frame, since sinks only appear once Bevy has
//! started the sound.

use crate::transition::{ChannelSettings, PlaybackDriver};
use bevy::audio::{AudioPlayer, AudioSink, AudioSinkPlayback, AudioSource, PlaybackSettings, Volume};
use bevy::prelude::*;
use std::collections::HashMap;

/// Marker for the primary music channel entity.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MusicChannel;

/// Marker for a duplicated stream fading alongside the primary channel.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct OutgoingStream;

/// Persistent state of the music output between frames.
#[derive(Debug, Clone)]
pub struct ChannelState {
    primary: Option<Entity>,
    clip: Option<Handle<AudioSource>>,
    playlist: Vec<Handle<AudioSource>>,
    cursor: usize,
    volume: f32,
    streams: HashMap<Entity, f32>,
    settings: ChannelSettings,
    /// Set once an empty playlist has been reported, cleared by a new playlist.
    reported_empty: bool,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            primary: None,
            clip: None,
            playlist: Vec::new(),
            cursor: 0,
            volume: 1.0,
            streams: HashMap::new(),
            settings: ChannelSettings::default(),
            reported_empty: false,
        }
    }
}

impl ChannelState {
    /// Entity of the primary channel while it is playing.
    pub fn primary(&self) -> Option<Entity> {
        self.primary
    }

    /// Last clip started on the primary channel.
    pub fn clip(&self) -> Option<&Handle<AudioSource>> {
        self.clip.as_ref()
    }

    pub fn playlist(&self) -> &[Handle<AudioSource>] {
        &self.playlist
    }

    pub fn has_playlist(&self) -> bool {
        !self.playlist.is_empty()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Duplicated streams that are still alive, with their target volume.
    pub fn streams(&self) -> &HashMap<Entity, f32> {
        &self.streams
    }

    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    fn next_clip(&mut self) -> Option<Handle<AudioSource>> {
        if self.playlist.is_empty() {
            return None;
        }
        let clip = self.playlist[self.cursor % self.playlist.len()].clone();
        self.cursor = self.cursor.wrapping_add(1);
        Some(clip)
    }

    fn playback_settings(&self, volume: f32) -> PlaybackSettings {
        let mut settings = PlaybackSettings::ONCE.with_volume(Volume::Linear(volume));
        // Music is only positional when the channel has a finite audible range.
        settings.spatial =
            self.settings.max_distance < f32::MAX || self.settings.doppler_level > 0.0;
        settings
    }
}

/// Short-lived driver handed to the engine for one system run.
pub struct BevyMusicChannel<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    state: &'a mut ChannelState,
}

impl<'a, 'w, 's> BevyMusicChannel<'a, 'w, 's> {
    pub fn new(commands: &'a mut Commands<'w, 's>, state: &'a mut ChannelState) -> Self {
        Self { commands, state }
    }

    /// Whether there is anything to start on the primary channel.
    pub fn has_playlist(&self) -> bool {
        self.state.has_playlist()
    }

    /// Move on to the next playlist entry once the current clip has drained.
    pub fn advance_playlist(&mut self) {
        self.stop();
        self.play_playlist();
    }
}

impl PlaybackDriver for BevyMusicChannel<'_, '_, '_> {
    type Clip = Handle<AudioSource>;
    type Stream = Entity;

    fn playing_clip(&self) -> Option<Handle<AudioSource>> {
        self.state.clip.clone()
    }

    fn is_playing(&self) -> bool {
        self.state.primary.is_some()
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.volume = volume;
    }

    fn duplicate(&mut self) -> Option<Entity> {
        let clip = self.state.clip.clone()?;
        let entity = self
            .commands
            .spawn((
                AudioPlayer(clip),
                self.state.playback_settings(0.0),
                OutgoingStream,
            ))
            .id();
        self.state.streams.insert(entity, 0.0);
        Some(entity)
    }

    fn set_stream_volume(&mut self, stream: &Entity, volume: f32) {
        if let Some(level) = self.state.streams.get_mut(stream) {
            *level = volume;
        }
    }

    fn release(&mut self, stream: Entity) {
        if self.state.streams.remove(&stream).is_some() {
            self.commands.entity(stream).despawn();
        }
    }

    fn stop(&mut self) {
        if let Some(entity) = self.state.primary.take() {
            self.commands.entity(entity).despawn();
        }
    }

    fn set_playlist(&mut self, clips: Vec<Handle<AudioSource>>) {
        self.state.playlist = clips;
        self.state.cursor = 0;
        self.state.reported_empty = false;
    }

    fn play_playlist(&mut self) {
        let Some(clip) = self.state.next_clip() else {
            if !self.state.reported_empty {
                warn!("[MusicReplacer] flight playlist is empty, nothing to play");
                self.state.reported_empty = true;
            }
            return;
        };
        let entity = self
            .commands
            .spawn((
                AudioPlayer(clip.clone()),
                self.state.playback_settings(self.state.volume),
                MusicChannel,
            ))
            .id();
        self.state.primary = Some(entity);
        self.state.clip = Some(clip);
    }

    fn configure(&mut self, settings: &ChannelSettings) {
        self.state.settings = *settings;
    }
}

/// Push the recorded volumes to whichever sinks exist.
pub(crate) fn apply_channel_volumes(state: &ChannelState, sinks: &mut Query<&mut AudioSink>) {
    if let Some(primary) = state.primary
        && let Ok(mut sink) = sinks.get_mut(primary)
    {
        sink.set_volume(Volume::Linear(state.volume));
    }

    for (&entity, &volume) in &state.streams {
        if let Ok(mut sink) = sinks.get_mut(entity) {
            sink.set_volume(Volume::Linear(volume));
        }
    }
}

/// Whether the primary channel has finished its clip.
pub(crate) fn primary_drained(state: &ChannelState, sinks: &Query<&mut AudioSink>) -> bool {
    state
        .primary
        .and_then(|entity| sinks.get(entity).ok())
        .is_some_and(|sink| sink.empty())
}
