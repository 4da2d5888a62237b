//! In-memory playback driver used by the unit tests.

use crate::transition::{ChannelSettings, PlaybackDriver};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DriverCall {
    Duplicate(u32),
    Release(u32),
    Stop,
    Play(Option<&'static str>),
    SetPlaylist(Vec<&'static str>),
    Configure,
}

/// Records every command and tracks which duplicated streams are alive.
#[derive(Debug, Default)]
pub(crate) struct RecordingDriver {
    pub playing: Option<&'static str>,
    pub playlist: Vec<&'static str>,
    pub volume: f32,
    pub settings: Option<ChannelSettings>,
    pub calls: Vec<DriverCall>,
    streams: HashMap<u32, f32>,
    next_stream: u32,
    cursor: usize,
}

impl RecordingDriver {
    pub fn with_playlist(playlist: Vec<&'static str>) -> Self {
        Self {
            playlist,
            volume: 1.0,
            ..Default::default()
        }
    }

    pub fn live_streams(&self) -> usize {
        self.streams.len()
    }

    pub fn stream_volume(&self, stream: u32) -> f32 {
        self.streams.get(&stream).copied().unwrap_or(f32::NAN)
    }

    pub fn restarts(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, DriverCall::Play(_)))
            .count()
    }
}

impl PlaybackDriver for RecordingDriver {
    type Clip = &'static str;
    type Stream = u32;

    fn playing_clip(&self) -> Option<&'static str> {
        self.playing
    }

    fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn duplicate(&mut self) -> Option<u32> {
        self.playing?;
        self.next_stream += 1;
        self.streams.insert(self.next_stream, self.volume);
        self.calls.push(DriverCall::Duplicate(self.next_stream));
        Some(self.next_stream)
    }

    fn set_stream_volume(&mut self, stream: &u32, volume: f32) {
        if let Some(level) = self.streams.get_mut(stream) {
            *level = volume;
        }
    }

    fn release(&mut self, stream: u32) {
        self.streams.remove(&stream);
        self.calls.push(DriverCall::Release(stream));
    }

    fn stop(&mut self) {
        self.playing = None;
        self.calls.push(DriverCall::Stop);
    }

    fn set_playlist(&mut self, clips: Vec<&'static str>) {
        self.calls.push(DriverCall::SetPlaylist(clips.clone()));
        self.playlist = clips;
        self.cursor = 0;
    }

    fn play_playlist(&mut self) {
        self.playing = if self.playlist.is_empty() {
            None
        } else {
            let clip = self.playlist[self.cursor % self.playlist.len()];
            self.cursor += 1;
            Some(clip)
        };
        self.calls.push(DriverCall::Play(self.playing));
    }

    fn configure(&mut self, settings: &ChannelSettings) {
        self.settings = Some(*settings);
        self.calls.push(DriverCall::Configure);
    }
}
