//! Error types for the bevy_music_replacer plugin
//!
//! None of these errors are fatal to the host. Per-record loader errors skip
//! the offending record, precondition errors skip a single evaluation tick and
//! host integration errors disable soundtrack replacement for the session.

use thiserror::Error;

/// The main error type for bevy_music_replacer operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MusicReplacerError {
    /// A config record is missing a required field or combines fields illegally
    #[error("Invalid MUSIC record #{record}: {reason}")]
    ConfigValidation { record: usize, reason: String },

    /// The `name` field does not name a known theme (names are case-sensitive)
    #[error("Unknown music theme '{0}'")]
    UnknownTheme(String),

    /// The `celestialBody` field names a body the host does not know about
    #[error("Couldn't find celestial body named '{0}'")]
    UnknownBody(String),

    /// The `musicURL` field does not resolve to a loaded clip
    #[error("Couldn't find audio file at URL: {0}")]
    AssetResolution(String),

    /// The engine was asked to evaluate before the home body was resolved
    #[error("Engine not ready: {0}")]
    Precondition(String),

    /// A host subsystem required at startup is missing
    #[error("Host integration failed: {0}")]
    HostIntegration(String),

    /// Config text could not be parsed
    #[error("Failed to parse music config: {0}")]
    ConfigParse(String),

    /// Error reading a config file from disk
    #[error("Failed to read file '{path}': {reason}")]
    FileRead { path: String, reason: String },
}

impl MusicReplacerError {
    /// Creates a config validation error for the record at `record`
    pub fn validation(record: usize, reason: impl Into<String>) -> Self {
        MusicReplacerError::ConfigValidation {
            record,
            reason: reason.into(),
        }
    }

    /// Creates a precondition error
    pub fn precondition(reason: impl Into<String>) -> Self {
        MusicReplacerError::Precondition(reason.into())
    }

    /// Creates a host integration error
    pub fn host_integration(reason: impl Into<String>) -> Self {
        MusicReplacerError::HostIntegration(reason.into())
    }

    /// Creates a file read error with path and reason
    pub fn file_read(path: impl Into<String>, reason: impl Into<String>) -> Self {
        MusicReplacerError::FileRead {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error only affects a single config record.
    pub fn is_per_record(&self) -> bool {
        matches!(
            self,
            MusicReplacerError::ConfigValidation { .. }
                | MusicReplacerError::UnknownTheme(_)
                | MusicReplacerError::UnknownBody(_)
                | MusicReplacerError::AssetResolution(_)
        )
    }
}

/// Type alias for Result using MusicReplacerError
pub type Result<T> = std::result::Result<T, MusicReplacerError>;

impl From<ron::error::SpannedError> for MusicReplacerError {
    fn from(err: ron::error::SpannedError) -> Self {
        MusicReplacerError::ConfigParse(err.to_string())
    }
}
