//! Rule selection for the in-flight playlist.
//!
//! Every evaluation filters the conditional rules against the vessel's body
//! and altitude, compares the result with the previous selection as a set,
//! and decides whether playback has to restart.

use crate::replacement::{CelestialBody, Replacement};
use crate::theme::Theme;
use bevy::log::debug;
use std::fmt::Debug;

/// Whether the live playlist is the host's own or a substituted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MusicMode {
    #[default]
    Default,
    Overridden,
}

/// What an evaluation asks the transition controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep playing; the playlist may still have been swapped underneath.
    Unchanged,
    /// Default → Overridden, restart with a crossfade.
    EnterOverride,
    /// Overridden → Default, restart with a crossfade.
    LeaveOverride,
    /// Still overridden, but the playing clip left the playlist.
    SelectionChanged,
}

impl Decision {
    pub fn requires_restart(self) -> bool {
        self != Decision::Unchanged
    }
}

/// Result of a single [`SelectionEngine::evaluate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// The set of matching rules differs from the previous one.
    pub changed: bool,
    pub decision: Decision,
}

/// Selection state for the conditional theme.
#[derive(Debug, Clone)]
pub struct SelectionEngine<C> {
    theme: Theme,
    replacements: Vec<Replacement<C>>,
    original_playlist: Vec<C>,
    current: Vec<Replacement<C>>,
    playlist: Vec<C>,
    mode: MusicMode,
}

impl<C: Clone + PartialEq + Debug> SelectionEngine<C> {
    /// `original_playlist` is restored whenever no rule matches.
    pub fn new(replacements: Vec<Replacement<C>>, original_playlist: Vec<C>) -> Self {
        Self {
            theme: Theme::SpacePlaylist,
            replacements,
            playlist: original_playlist.clone(),
            original_playlist,
            current: Vec::new(),
            mode: MusicMode::Default,
        }
    }

    /// Rules of the active theme that hold for `body` and `altitude`.
    pub fn select(&self, body: Option<&CelestialBody>, altitude: f64) -> Vec<Replacement<C>> {
        self.replacements
            .iter()
            .filter(|rule| rule.theme == self.theme && rule.matches(body, altitude))
            .cloned()
            .collect()
    }

    /// Re-run selection for the current flight state.
    ///
    /// `playing` is the clip on the primary channel; a restart without a mode
    /// change only happens when it is no longer part of the new playlist.
    pub fn evaluate(
        &mut self,
        body: Option<&CelestialBody>,
        altitude: f64,
        playing: Option<&C>,
    ) -> Evaluation {
        let selection = self.select(body, altitude);
        let changed = !same_members(&selection, &self.current);

        if changed {
            debug!(
                "[MusicReplacer] replacement list changed ({} -> {} rules)",
                self.current.len(),
                selection.len()
            );
            self.current = selection;
            self.playlist = if self.current.is_empty() {
                self.original_playlist.clone()
            } else {
                self.current.iter().map(|rule| rule.clip.clone()).collect()
            };
        }

        let has_selection = !self.current.is_empty();
        let decision = match self.mode {
            MusicMode::Default if has_selection => {
                self.mode = MusicMode::Overridden;
                Decision::EnterOverride
            }
            MusicMode::Overridden if !has_selection => {
                self.mode = MusicMode::Default;
                Decision::LeaveOverride
            }
            MusicMode::Overridden
                if changed && !playing.is_some_and(|clip| self.playlist.contains(clip)) =>
            {
                Decision::SelectionChanged
            }
            _ => Decision::Unchanged,
        };

        Evaluation { changed, decision }
    }

    /// Drop back to default mode without touching playback (leaving flight).
    ///
    /// Returns `true` if the mode changed. The current selection is kept, so
    /// re-entering flight with the same selection re-enters override mode.
    pub fn revert_to_default(&mut self) -> bool {
        let was_overridden = self.mode == MusicMode::Overridden;
        self.mode = MusicMode::Default;
        was_overridden
    }

    /// Swap in a new rule list, keeping the current selection for change detection.
    pub fn set_replacements(&mut self, replacements: Vec<Replacement<C>>) {
        self.replacements = replacements;
    }

    pub fn mode(&self) -> MusicMode {
        self.mode
    }

    pub fn current(&self) -> &[Replacement<C>] {
        &self.current
    }

    /// The playlist the driver should be cycling through.
    pub fn playlist(&self) -> &[C] {
        &self.playlist
    }

    pub fn original_playlist(&self) -> &[C] {
        &self.original_playlist
    }

    pub fn replacements(&self) -> &[Replacement<C>] {
        &self.replacements
    }
}

/// Set equality for small unhashable lists.
fn same_members<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.iter().all(|item| b.contains(item)) && b.iter().all(|item| a.contains(item))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn low_orbit() -> Replacement<&'static str> {
        Replacement::new(Theme::SpacePlaylist, "C1").with_band(0.0, 70_000.0)
    }

    fn engine(rules: Vec<Replacement<&'static str>>) -> SelectionEngine<&'static str> {
        SelectionEngine::new(rules, vec!["stock-1", "stock-2"])
    }

    #[test]
    fn entering_a_band_overrides_the_playlist() {
        let mut engine = engine(vec![low_orbit()]);
        let eval = engine.evaluate(None, 50_000.0, Some(&"stock-1"));

        assert_eq!(
            eval,
            Evaluation {
                changed: true,
                decision: Decision::EnterOverride
            }
        );
        assert_eq!(engine.mode(), MusicMode::Overridden);
        assert_eq!(engine.playlist(), &["C1"]);
    }

    #[test]
    fn leaving_the_band_restores_the_original_playlist() {
        let mut engine = engine(vec![low_orbit()]);
        engine.evaluate(None, 50_000.0, Some(&"stock-1"));
        let eval = engine.evaluate(None, 80_000.0, Some(&"C1"));

        assert_eq!(eval.decision, Decision::LeaveOverride);
        assert!(eval.changed);
        assert_eq!(engine.mode(), MusicMode::Default);
        assert_eq!(engine.playlist(), &["stock-1", "stock-2"]);
        assert!(engine.current().is_empty());
    }

    #[test]
    fn evaluation_is_idempotent_for_unchanged_context() {
        let mut engine = engine(vec![low_orbit()]);
        engine.evaluate(None, 50_000.0, Some(&"stock-1"));
        let eval = engine.evaluate(None, 50_000.0, Some(&"C1"));

        assert_eq!(
            eval,
            Evaluation {
                changed: false,
                decision: Decision::Unchanged
            }
        );
    }

    #[test]
    fn crossing_between_bands_restarts_without_mode_change() {
        let mut engine = engine(vec![
            Replacement::new(Theme::SpacePlaylist, "low")
                .with_body("Mun")
                .with_band(0.0, 10_000.0),
            Replacement::new(Theme::SpacePlaylist, "high")
                .with_body("Mun")
                .with_band(10_000.0, 60_000.0),
        ]);
        let mun = CelestialBody::new("Mun");

        engine.evaluate(Some(&mun), 5_000.0, None);
        let eval = engine.evaluate(Some(&mun), 10_000.0, Some(&"low"));

        assert!(eval.changed);
        assert_eq!(eval.decision, Decision::SelectionChanged);
        assert_eq!(engine.mode(), MusicMode::Overridden);
        assert_eq!(engine.playlist(), &["high"]);
    }

    #[test]
    fn playing_clip_still_in_playlist_keeps_playing() {
        let mut engine = engine(vec![
            Replacement::new(Theme::SpacePlaylist, "shared").with_band(0.0, 100.0),
            Replacement::new(Theme::SpacePlaylist, "extra").with_band(50.0, 100.0),
        ]);
        engine.evaluate(None, 10.0, None);
        let eval = engine.evaluate(None, 60.0, Some(&"shared"));

        assert!(eval.changed);
        assert_eq!(eval.decision, Decision::Unchanged);
        assert_eq!(engine.playlist(), &["shared", "extra"]);
    }

    #[test]
    fn empty_selection_in_default_mode_never_restarts() {
        let mut engine = engine(vec![low_orbit()]);
        let eval = engine.evaluate(None, 90_000.0, None);

        assert!(!eval.changed);
        assert_eq!(eval.decision, Decision::Unchanged);
        assert_eq!(engine.mode(), MusicMode::Default);
    }

    #[test]
    fn reordering_rules_is_not_a_change() {
        let a = Replacement::new(Theme::SpacePlaylist, "a").with_band(0.0, 100.0);
        let b = Replacement::new(Theme::SpacePlaylist, "b").with_band(0.0, 200.0);
        let mut engine = engine(vec![a.clone(), b.clone()]);
        engine.evaluate(None, 50.0, None);

        engine.set_replacements(vec![b, a]);
        let eval = engine.evaluate(None, 50.0, Some(&"a"));

        assert!(!eval.changed);
        assert_eq!(eval.decision, Decision::Unchanged);
    }

    #[test]
    fn altitude_bounds_are_half_open() {
        let mut engine = engine(vec![
            Replacement::new(Theme::SpacePlaylist, "band").with_band(1_000.0, 2_000.0),
        ]);
        assert_eq!(engine.select(None, 1_000.0).len(), 1);
        assert!(engine.select(None, 2_000.0).is_empty());

        engine.evaluate(None, 1_000.0, None);
        assert_eq!(engine.mode(), MusicMode::Overridden);
        engine.evaluate(None, 2_000.0, Some(&"band"));
        assert_eq!(engine.mode(), MusicMode::Default);
    }

    #[test]
    fn all_matching_rules_form_the_pool() {
        let engine = engine(vec![
            Replacement::new(Theme::SpacePlaylist, "any-body").with_band(0.0, 1e6),
            Replacement::new(Theme::SpacePlaylist, "minmus").with_body("Minmus"),
            Replacement::new(Theme::SpacePlaylist, "mun").with_body("Mun"),
        ]);
        let minmus = CelestialBody::new("Minmus");
        let clips: Vec<_> = engine
            .select(Some(&minmus), 500.0)
            .into_iter()
            .map(|rule| rule.clip)
            .collect();
        assert_eq!(clips, vec!["any-body", "minmus"]);
    }

    #[test]
    fn overridden_mode_implies_a_non_empty_selection() {
        let mut engine = engine(vec![low_orbit()]);
        for altitude in [10.0, 80_000.0, 69_999.0, 70_000.0, 0.0, 50.0, 1e9] {
            engine.evaluate(None, altitude, engine.playlist().first().copied().as_ref());
            if engine.mode() == MusicMode::Overridden {
                assert!(!engine.current().is_empty());
            }
        }
    }

    #[test]
    fn revert_keeps_selection_and_reenters_override() {
        let mut engine = engine(vec![low_orbit()]);
        engine.evaluate(None, 100.0, None);
        assert!(engine.revert_to_default());
        assert!(!engine.revert_to_default());

        let eval = engine.evaluate(None, 100.0, Some(&"C1"));
        assert!(!eval.changed);
        assert_eq!(eval.decision, Decision::EnterOverride);
    }
}
