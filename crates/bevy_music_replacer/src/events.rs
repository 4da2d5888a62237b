//! Messages the plugin writes for the host.

use crate::selection::{Decision, MusicMode};
use bevy::prelude::*;

/// Fired whenever an evaluation restarts the flight music.
#[derive(Event, Message, Clone, Debug)]
pub struct MusicModeChanged {
    pub mode: MusicMode,
    pub decision: Decision,
}

/// Fired once the config records have been processed.
#[derive(Event, Message, Clone, Debug)]
pub struct MusicReplacerLoaded {
    /// Rules handed to the selection engine.
    pub conditional: usize,
    /// Records applied directly to the host soundtrack.
    pub substituted: usize,
    /// Records skipped because they failed validation.
    pub rejected: usize,
}
