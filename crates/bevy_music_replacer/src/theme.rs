//! Soundtrack slots that config records can target.

use crate::error::MusicReplacerError;
use std::fmt;
use std::str::FromStr;

/// One of the host's named music or ambience slots.
///
/// Config files refer to themes by their exact (case-sensitive) camelCase
/// name, e.g. `spacePlaylist` or `VABAmbience`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    MenuTheme,
    MenuAmbience,
    Credits,
    TrackingAmbience,
    SpaceCenterAmbience,
    VabAmbience,
    SphAmbience,
    AstroComplexAmbience,
    ResearchComplexAmbience,
    MissionControlAmbience,
    AdminFacilityAmbience,
    ConstructionPlaylist,
    SpacePlaylist,
}

impl Theme {
    /// Every theme, in declaration order.
    pub const ALL: [Theme; 13] = [
        Theme::MenuTheme,
        Theme::MenuAmbience,
        Theme::Credits,
        Theme::TrackingAmbience,
        Theme::SpaceCenterAmbience,
        Theme::VabAmbience,
        Theme::SphAmbience,
        Theme::AstroComplexAmbience,
        Theme::ResearchComplexAmbience,
        Theme::MissionControlAmbience,
        Theme::AdminFacilityAmbience,
        Theme::ConstructionPlaylist,
        Theme::SpacePlaylist,
    ];

    /// Name used in config files.
    pub fn name(self) -> &'static str {
        match self {
            Theme::MenuTheme => "menuTheme",
            Theme::MenuAmbience => "menuAmbience",
            Theme::Credits => "credits",
            Theme::TrackingAmbience => "trackingAmbience",
            Theme::SpaceCenterAmbience => "spaceCenterAmbience",
            Theme::VabAmbience => "VABAmbience",
            Theme::SphAmbience => "SPHAmbience",
            Theme::AstroComplexAmbience => "astroComplexAmbience",
            Theme::ResearchComplexAmbience => "researchComplexAmbience",
            Theme::MissionControlAmbience => "missionControlAmbience",
            Theme::AdminFacilityAmbience => "adminFacilityAmbience",
            Theme::ConstructionPlaylist => "constructionPlaylist",
            Theme::SpacePlaylist => "spacePlaylist",
        }
    }

    /// Only the in-flight playlist supports body and altitude filters.
    pub fn is_conditional(self) -> bool {
        self == Theme::SpacePlaylist
    }

    /// Playlist themes collect clips; the rest hold a single clip.
    pub fn is_playlist(self) -> bool {
        matches!(self, Theme::ConstructionPlaylist | Theme::SpacePlaylist)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Theme {
    type Err = MusicReplacerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name() == s)
            .ok_or_else(|| MusicReplacerError::UnknownTheme(s.to_string()))
    }
}
