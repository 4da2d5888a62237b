//! Raw music replacement records and their RON asset loader.
//!
//! A config file holds a list of `MUSIC` records:
//!
//! ```ron
//! (
//!     music: [
//!         (name: "spacePlaylist", musicURL: "music/mun_orbit", celestialBody: "Mun",
//!          minAltitude: 0.0, maxAltitude: 60000.0),
//!         (name: "menuTheme", musicURL: "music/title"),
//!         (name: "constructionPlaylist", musicURL: "music/vab", removeExisting: true),
//!     ],
//! )
//! ```
//!
//! Records are deliberately loose: every field is optional at parse time so
//! that a single bad record is rejected by the loader instead of failing the
//! whole file.

use crate::error::{MusicReplacerError, Result};
use bevy::asset::{AssetLoader, LoadContext, io::Reader};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use ron::extensions::Extensions;
use serde::Deserialize;

/// File extensions handled by [`MusicConfigLoader`].
pub const MUSIC_CONFIG_EXTENSIONS: &[&str] = &["musicreplacer.ron", "musicreplacer"];

/// One `MUSIC` record as written in a config file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MusicRecord {
    /// Theme name (case-sensitive), e.g. `spacePlaylist`.
    #[serde(default)]
    pub name: Option<String>,
    /// Identifier of the clip in the host's clip library.
    #[serde(default, rename = "musicURL")]
    pub music_url: Option<String>,
    /// Drop the host's stock entries of this playlist.
    #[serde(default, rename = "removeExisting")]
    pub remove_existing: Option<bool>,
    #[serde(default, rename = "celestialBody")]
    pub celestial_body: Option<String>,
    #[serde(default, rename = "minAltitude")]
    pub min_altitude: Option<f64>,
    #[serde(default, rename = "maxAltitude")]
    pub max_altitude: Option<f64>,
}

impl MusicRecord {
    pub fn new(name: impl Into<String>, music_url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            music_url: Some(music_url.into()),
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.celestial_body = Some(body.into());
        self
    }

    pub fn with_altitudes(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_altitude = min;
        self.max_altitude = max;
        self
    }

    pub fn removing_existing(mut self) -> Self {
        self.remove_existing = Some(true);
        self
    }
}

/// A parsed config file.
#[derive(Asset, TypePath, Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MusicConfig {
    #[serde(default)]
    pub music: Vec<MusicRecord>,
}

impl MusicConfig {
    /// Parse a config from RON text. `Some(..)` may be omitted around optional fields.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron_options().from_str(text)?)
    }

    /// Parse a config from raw RON bytes.
    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(ron_options().from_bytes(bytes)?)
    }

    /// Read and parse a config file from disk.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|err| MusicReplacerError::file_read(path.display().to_string(), err.to_string()))?;
        Self::from_ron_bytes(&bytes)
    }
}

fn ron_options() -> ron::Options {
    ron::Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

/// Loader for `.musicreplacer.ron` assets.
#[derive(Default)]
pub struct MusicConfigLoader;

impl AssetLoader for MusicConfigLoader {
    type Asset = MusicConfig;
    type Settings = ();
    type Error = anyhow::Error;

    async fn load(
        &self,
        reader: &mut dyn Reader,
        _settings: &Self::Settings,
        _load_context: &mut LoadContext<'_>,
    ) -> std::result::Result<Self::Asset, Self::Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).await?;
        let config = MusicConfig::from_ron_bytes(&bytes)?;
        Ok(config)
    }

    fn extensions(&self) -> &[&str] {
        MUSIC_CONFIG_EXTENSIONS
    }
}
