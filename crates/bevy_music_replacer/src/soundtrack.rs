//! The host's default audio bundle.
//!
//! [`Soundtrack`] mirrors every slot of the host's music setup as a plain
//! struct. The plugin copies it by value when it takes over, applies static
//! substitutions through [`Soundtrack::slot_mut`], and hands it back to the
//! host as a resource.

use crate::theme::Theme;

/// Every music and ambience slot the host cycles through.
#[derive(Debug, Clone, PartialEq)]
pub struct Soundtrack<C> {
    pub menu_theme: Option<C>,
    pub menu_ambience: Option<C>,
    pub credits: Option<C>,
    pub tracking_ambience: Option<C>,
    pub space_center_ambience: Option<C>,
    pub vab_ambience: Option<C>,
    pub sph_ambience: Option<C>,
    pub astro_complex_ambience: Option<C>,
    pub research_complex_ambience: Option<C>,
    pub mission_control_ambience: Option<C>,
    pub admin_facility_ambience: Option<C>,
    pub construction_playlist: Vec<C>,
    pub space_playlist: Vec<C>,
}

impl<C> Default for Soundtrack<C> {
    fn default() -> Self {
        Self {
            menu_theme: None,
            menu_ambience: None,
            credits: None,
            tracking_ambience: None,
            space_center_ambience: None,
            vab_ambience: None,
            sph_ambience: None,
            astro_complex_ambience: None,
            research_complex_ambience: None,
            mission_control_ambience: None,
            admin_facility_ambience: None,
            construction_playlist: Vec::new(),
            space_playlist: Vec::new(),
        }
    }
}

/// Mutable access to the storage behind a single theme.
pub enum ThemeSlot<'a, C> {
    /// The theme holds one clip; a substitution replaces it.
    Clip(&'a mut Option<C>),
    /// The theme is a playlist; a substitution appends to it.
    Playlist(&'a mut Vec<C>),
}

impl<C> ThemeSlot<'_, C> {
    /// Apply a static substitution to this slot.
    pub fn substitute(self, clip: C) {
        match self {
            ThemeSlot::Clip(slot) => *slot = Some(clip),
            ThemeSlot::Playlist(list) => list.push(clip),
        }
    }
}

impl<C> Soundtrack<C> {
    /// Resolve the storage for `theme`.
    pub fn slot_mut(&mut self, theme: Theme) -> ThemeSlot<'_, C> {
        match theme {
            Theme::MenuTheme => ThemeSlot::Clip(&mut self.menu_theme),
            Theme::MenuAmbience => ThemeSlot::Clip(&mut self.menu_ambience),
            Theme::Credits => ThemeSlot::Clip(&mut self.credits),
            Theme::TrackingAmbience => ThemeSlot::Clip(&mut self.tracking_ambience),
            Theme::SpaceCenterAmbience => ThemeSlot::Clip(&mut self.space_center_ambience),
            Theme::VabAmbience => ThemeSlot::Clip(&mut self.vab_ambience),
            Theme::SphAmbience => ThemeSlot::Clip(&mut self.sph_ambience),
            Theme::AstroComplexAmbience => ThemeSlot::Clip(&mut self.astro_complex_ambience),
            Theme::ResearchComplexAmbience => {
                ThemeSlot::Clip(&mut self.research_complex_ambience)
            }
            Theme::MissionControlAmbience => ThemeSlot::Clip(&mut self.mission_control_ambience),
            Theme::AdminFacilityAmbience => ThemeSlot::Clip(&mut self.admin_facility_ambience),
            Theme::ConstructionPlaylist => ThemeSlot::Playlist(&mut self.construction_playlist),
            Theme::SpacePlaylist => ThemeSlot::Playlist(&mut self.space_playlist),
        }
    }

    /// Shorthand for `slot_mut(theme).substitute(clip)`.
    pub fn substitute(&mut self, theme: Theme, clip: C) {
        self.slot_mut(theme).substitute(clip);
    }

    /// The playlist behind `theme`, if it is a playlist theme.
    pub fn playlist_mut(&mut self, theme: Theme) -> Option<&mut Vec<C>> {
        match self.slot_mut(theme) {
            ThemeSlot::Playlist(list) => Some(list),
            ThemeSlot::Clip(_) => None,
        }
    }
}
