//! Systems and host-facing resources of the music replacer plugin.

use crate::channel::{BevyMusicChannel, ChannelState, apply_channel_volumes, primary_drained};
use crate::config::MusicConfig;
use crate::context::{FrameClock, GameContext, GameScene};
use crate::engine::MusicEngine;
use crate::error::MusicReplacerError;
use crate::events::{MusicModeChanged, MusicReplacerLoaded};
use crate::loader::{ClipRegistry, load_replacements};
use crate::plugin::MusicReplacerPluginConfig;
use crate::selection::MusicMode;
use crate::soundtrack::Soundtrack;
use crate::transition::PlaybackDriver;
use bevy::asset::LoadState;
use bevy::audio::{AudioSink, AudioSource};
use bevy::prelude::*;
use std::collections::HashMap;

/// Engine type used by the plugin.
pub type FlightMusicEngine = MusicEngine<Handle<AudioSource>, Entity>;

/// Lifecycle of the replacer within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplacerStatus {
    /// Waiting for the main menu.
    #[default]
    Pending,
    /// Records applied; waiting for the home body.
    Loaded,
    Active,
    /// A required host resource was missing; nothing is touched this session.
    Disabled,
}

/// Engine and channel state owned by the plugin.
#[derive(Resource, Debug, Default)]
pub struct FlightMusic {
    engine: Option<FlightMusicEngine>,
    channel: ChannelState,
    status: ReplacerStatus,
}

impl FlightMusic {
    pub fn engine(&self) -> Option<&FlightMusicEngine> {
        self.engine.as_ref()
    }

    pub fn channel(&self) -> &ChannelState {
        &self.channel
    }

    pub fn status(&self) -> ReplacerStatus {
        self.status
    }

    pub fn mode(&self) -> MusicMode {
        self.engine
            .as_ref()
            .map_or(MusicMode::Default, FlightMusicEngine::mode)
    }
}

/// The host's default soundtrack. Substitutions are written back into it.
#[derive(Resource, Debug, Clone, Default)]
pub struct HostSoundtrack(pub Soundtrack<Handle<AudioSource>>);

/// Clips addressable from config files by `musicURL`.
#[derive(Resource, Debug, Clone, Default)]
pub struct ClipLibrary(pub HashMap<String, Handle<AudioSource>>);

impl ClipLibrary {
    pub fn insert(&mut self, url: impl Into<String>, clip: Handle<AudioSource>) {
        self.0.insert(url.into(), clip);
    }
}

impl ClipRegistry<Handle<AudioSource>> for ClipLibrary {
    fn resolve(&self, url: &str) -> Option<Handle<AudioSource>> {
        self.0.resolve(url)
    }
}

/// Names of the celestial bodies known to the host.
#[derive(Resource, Debug, Clone, Default)]
pub struct BodyCatalog(pub Vec<String>);

/// Config files the main menu load waits for.
///
/// Files listed in [`MusicReplacerPluginConfig::config_files`] are tracked
/// automatically; hosts loading configs themselves should [`track`](Self::track)
/// the handles. Loading starts once every tracked file is loaded or failed.
/// Untracked `MusicConfig` assets that are already present are read as well.
#[derive(Resource, Debug, Clone, Default)]
pub struct MusicConfigFiles {
    handles: Vec<Handle<MusicConfig>>,
}

impl MusicConfigFiles {
    pub fn track(&mut self, handle: Handle<MusicConfig>) {
        self.handles.push(handle);
    }

    pub fn handles(&self) -> &[Handle<MusicConfig>] {
        &self.handles
    }

    fn settled(&self, configs: &Assets<MusicConfig>, asset_server: &AssetServer) -> bool {
        self.handles.iter().all(|handle| {
            configs.contains(handle.id())
                || matches!(
                    asset_server.get_load_state(handle.id()),
                    Some(LoadState::Failed(_))
                )
        })
    }
}

/// Altitude above which the host should play its own space music.
///
/// Zero while replacement music is playing.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct SpaceMusicAltitude(pub f64);

pub(crate) fn request_music_configs(
    asset_server: Res<AssetServer>,
    config: Res<MusicReplacerPluginConfig>,
    mut files: ResMut<MusicConfigFiles>,
) {
    for path in &config.config_files {
        debug!("[MusicReplacer] requesting config file {path}");
        files.track(asset_server.load(path.clone()));
    }
}

/// Load the config records once the main menu is reached, then activate the
/// engine as soon as the home body is known.
#[allow(clippy::too_many_arguments)]
pub(crate) fn load_music_replacements(
    mut commands: Commands,
    mut music: ResMut<FlightMusic>,
    config: Res<MusicReplacerPluginConfig>,
    context: Option<Res<GameContext>>,
    soundtrack: Option<ResMut<HostSoundtrack>>,
    clips: Option<Res<ClipLibrary>>,
    bodies: Option<Res<BodyCatalog>>,
    configs: Res<Assets<MusicConfig>>,
    files: Res<MusicConfigFiles>,
    asset_server: Res<AssetServer>,
    mut altitude: ResMut<SpaceMusicAltitude>,
    mut loaded: MessageWriter<MusicReplacerLoaded>,
) {
    let Some(context) = context else {
        return;
    };
    let FlightMusic {
        engine,
        channel,
        status,
    } = &mut *music;

    if *status == ReplacerStatus::Pending {
        if context.scene != GameScene::MainMenu
            || !files.settled(&configs, &asset_server)
        {
            return;
        }

        let (Some(mut soundtrack), Some(clips)) = (soundtrack, clips) else {
            let err = MusicReplacerError::host_integration(
                "HostSoundtrack and ClipLibrary resources are required",
            );
            error!("[MusicReplacer] {err}, music replacement disabled");
            *status = ReplacerStatus::Disabled;
            return;
        };

        for handle in files.handles() {
            if !configs.contains(handle.id()) {
                warn!(
                    "[MusicReplacer] config file {:?} failed to load, its records are skipped",
                    handle.path()
                );
            }
        }

        let records = configs.iter().flat_map(|(_, file)| file.music.iter());
        let known_bodies: &[String] = bodies
            .as_deref()
            .map_or(&[][..], |catalog| catalog.0.as_slice());
        let report = load_replacements(records, &*clips, known_bodies, &mut soundtrack.0);

        info!(
            "[MusicReplacer] {} substitutions, {} conditional rules, {} rejected records",
            report.substituted,
            report.replacements.len(),
            report.rejected.len()
        );
        loaded.write(MusicReplacerLoaded {
            conditional: report.replacements.len(),
            substituted: report.substituted,
            rejected: report.rejected.len(),
        });

        *engine = Some(MusicEngine::from_report(report, config.engine_settings()));
        *status = ReplacerStatus::Loaded;
    }

    if *status == ReplacerStatus::Loaded
        && let Some(home) = context.home_body.as_ref()
        && let Some(engine) = engine.as_mut()
    {
        let mut driver = BevyMusicChannel::new(&mut commands, channel);
        engine.activate(home.atmosphere_depth, &mut driver);
        altitude.0 = engine.space_music_altitude();
        *status = ReplacerStatus::Active;
    }
}

/// Run the engine for this frame and keep the flight channel in step with
/// the scene.
pub(crate) fn drive_flight_music(
    mut commands: Commands,
    mut music: ResMut<FlightMusic>,
    context: Option<Res<GameContext>>,
    virtual_time: Res<Time<Virtual>>,
    real_time: Res<Time<Real>>,
    mut altitude: ResMut<SpaceMusicAltitude>,
    mut changes: MessageWriter<MusicModeChanged>,
) {
    let Some(context) = context else {
        return;
    };
    let FlightMusic {
        engine, channel, ..
    } = &mut *music;
    let Some(engine) = engine.as_mut() else {
        return;
    };

    let clock = FrameClock::new(virtual_time.elapsed_secs_f64(), real_time.elapsed_secs());
    let mut driver = BevyMusicChannel::new(&mut commands, channel);

    match engine.update(&context, clock, &mut driver) {
        Ok(Some(evaluation)) if evaluation.decision.requires_restart() => {
            changes.write(MusicModeChanged {
                mode: engine.mode(),
                decision: evaluation.decision,
            });
        }
        Ok(_) => {}
        Err(err @ MusicReplacerError::Precondition(_)) => {
            debug!("[MusicReplacer] skipping evaluation: {err}");
        }
        Err(err) => error!("[MusicReplacer] {err}"),
    }

    if context.in_flight() {
        if engine.is_active() && driver.has_playlist() && !driver.is_playing() {
            driver.play_playlist();
        }
    } else if driver.is_playing() {
        engine.shutdown(&mut driver);
        driver.stop();
    }

    let watermark = engine.space_music_altitude();
    if altitude.0 != watermark {
        altitude.0 = watermark;
    }
}

/// Start the next playlist clip once the primary channel has drained.
pub(crate) fn continue_flight_playlist(
    mut commands: Commands,
    mut music: ResMut<FlightMusic>,
    context: Option<Res<GameContext>>,
    sinks: Query<&mut AudioSink>,
) {
    if !context.is_some_and(|context| context.in_flight()) {
        return;
    }
    if primary_drained(&music.channel, &sinks) {
        debug!("[MusicReplacer] clip finished, continuing flight playlist");
        BevyMusicChannel::new(&mut commands, &mut music.channel).advance_playlist();
    }
}

pub(crate) fn sync_music_volumes(music: Res<FlightMusic>, mut sinks: Query<&mut AudioSink>) {
    apply_channel_volumes(&music.channel, &mut sinks);
}
