//! Turns raw [`MusicRecord`]s into replacement rules.
//!
//! Loading is partial-failure tolerant: a record that fails validation is
//! logged and skipped, and the remaining records are still processed.
//! Unconditional records are applied straight to the [`Soundtrack`]; only
//! conditional `spacePlaylist` records reach the selection engine.

use crate::config::MusicRecord;
use crate::error::{MusicReplacerError, Result};
use crate::replacement::{AltitudeBand, CelestialBody, Replacement};
use crate::soundtrack::Soundtrack;
use crate::theme::Theme;
use bevy::log::{error, info};
use std::collections::{HashMap, HashSet};

/// Resolves a `musicURL` to a loaded clip.
pub trait ClipRegistry<C> {
    fn resolve(&self, url: &str) -> Option<C>;
}

impl<C: Clone> ClipRegistry<C> for HashMap<String, C> {
    fn resolve(&self, url: &str) -> Option<C> {
        self.get(url).cloned()
    }
}

/// Looks up celestial bodies by name.
pub trait BodyRegistry {
    fn find(&self, name: &str) -> Option<CelestialBody>;
}

impl<T: AsRef<str>> BodyRegistry for [T] {
    fn find(&self, name: &str) -> Option<CelestialBody> {
        self.iter()
            .any(|body| body.as_ref() == name)
            .then(|| CelestialBody::new(name))
    }
}

impl BodyRegistry for HashSet<String> {
    fn find(&self, name: &str) -> Option<CelestialBody> {
        self.contains(name).then(|| CelestialBody::new(name))
    }
}

/// A record that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord<C> {
    pub replacement: Replacement<C>,
    pub remove_existing: bool,
}

/// Outcome of [`load_replacements`].
#[derive(Debug, Clone)]
pub struct LoadReport<C> {
    /// Conditional rules for the selection engine.
    pub replacements: Vec<Replacement<C>>,
    /// The in-flight playlist after substitutions, used whenever no rule matches.
    pub original_playlist: Vec<C>,
    /// Number of records applied directly to the soundtrack.
    pub substituted: usize,
    /// Errors for every skipped record.
    pub rejected: Vec<MusicReplacerError>,
}

/// Validate a single record. `index` only labels diagnostics.
///
/// Every failing field is reported. A single problem comes back as its own
/// error kind; several are folded into one [`MusicReplacerError::ConfigValidation`].
/// An unknown theme name stops validation right away.
pub fn validate_record<C, R, B>(
    index: usize,
    record: &MusicRecord,
    clips: &R,
    bodies: &B,
) -> Result<ValidatedRecord<C>>
where
    R: ClipRegistry<C> + ?Sized,
    B: BodyRegistry + ?Sized,
{
    let mut problems = Vec::new();

    let theme = match record.name.as_deref() {
        Some(name) => Some(name.parse::<Theme>()?),
        None => {
            problems.push(MusicReplacerError::validation(index, "no name attribute found"));
            None
        }
    };
    let conditional = theme.is_some_and(Theme::is_conditional);

    let clip = match record.music_url.as_deref() {
        Some(url) => {
            let clip = clips.resolve(url);
            if clip.is_none() {
                problems.push(MusicReplacerError::AssetResolution(url.to_string()));
            }
            clip
        }
        None => {
            problems.push(MusicReplacerError::validation(index, "no musicURL attribute found"));
            None
        }
    };

    let mut body = None;
    if let Some(name) = record.celestial_body.as_deref() {
        if !conditional {
            problems.push(not_conditional(index, "celestialBody"));
        } else {
            body = bodies.find(name);
            if body.is_none() {
                problems.push(MusicReplacerError::UnknownBody(name.to_string()));
            }
        }
    }

    let mut band = AltitudeBand::default();
    if let Some(min) = record.min_altitude {
        if conditional {
            band.min = min;
        } else {
            problems.push(not_conditional(index, "minAltitude"));
        }
    }
    if let Some(max) = record.max_altitude {
        if conditional {
            band.max = max;
        } else {
            problems.push(not_conditional(index, "maxAltitude"));
        }
    }

    match (theme, clip) {
        (Some(theme), Some(clip)) if problems.is_empty() => Ok(ValidatedRecord {
            replacement: Replacement {
                theme,
                clip,
                body,
                band,
            },
            remove_existing: record.remove_existing.unwrap_or(false),
        }),
        _ => Err(fold_problems(index, problems)),
    }
}

fn not_conditional(index: usize, field: &str) -> MusicReplacerError {
    MusicReplacerError::validation(
        index,
        format!(
            "the {field} attribute is only valid for {}",
            Theme::SpacePlaylist
        ),
    )
}

fn fold_problems(index: usize, mut problems: Vec<MusicReplacerError>) -> MusicReplacerError {
    if problems.len() == 1
        && let Some(problem) = problems.pop()
    {
        return problem;
    }
    let reasons: Vec<String> = problems.iter().map(ToString::to_string).collect();
    MusicReplacerError::validation(index, reasons.join("; "))
}

/// Validate `records`, apply static substitutions to `soundtrack` and
/// collect the conditional rules.
///
/// `removeExisting` drops the playlist entries that were present before
/// loading started; clips added by records are kept.
pub fn load_replacements<'a, C, R, B>(
    records: impl IntoIterator<Item = &'a MusicRecord>,
    clips: &R,
    bodies: &B,
    soundtrack: &mut Soundtrack<C>,
) -> LoadReport<C>
where
    C: Clone,
    R: ClipRegistry<C> + ?Sized,
    B: BodyRegistry + ?Sized,
{
    let construction_count = soundtrack.construction_playlist.len();
    let space_count = soundtrack.space_playlist.len();
    let mut remove_construction = false;
    let mut remove_space = false;

    let mut replacements = Vec::new();
    let mut rejected = Vec::new();
    let mut substituted = 0;

    for (index, record) in records.into_iter().enumerate() {
        let validated = match validate_record(index, record, clips, bodies) {
            Ok(validated) => validated,
            Err(err) => {
                error!("[MusicReplacer] Couldn't load MUSIC record #{index}: {err}");
                rejected.push(err);
                continue;
            }
        };

        let ValidatedRecord {
            replacement,
            remove_existing,
        } = validated;
        let theme = replacement.theme;
        info!("[MusicReplacer] Loaded a MUSIC record for {theme}");

        if replacement.is_unconditional() {
            soundtrack.substitute(theme, replacement.clip);
            substituted += 1;
        } else {
            replacements.push(replacement);
        }

        match theme {
            Theme::SpacePlaylist => remove_space |= remove_existing,
            Theme::ConstructionPlaylist => remove_construction |= remove_existing,
            _ => {}
        }
    }

    if remove_construction {
        soundtrack.construction_playlist.drain(..construction_count);
    }
    if remove_space {
        soundtrack.space_playlist.drain(..space_count);
    }

    LoadReport {
        replacements,
        original_playlist: soundtrack.space_playlist.clone(),
        substituted,
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clips() -> HashMap<String, &'static str> {
        ["music/orbit", "music/low", "music/vab", "music/title"]
            .into_iter()
            .map(|url| (url.to_string(), url))
            .collect()
    }

    const BODIES: [&str; 3] = ["Kerbin", "Mun", "Minmus"];

    fn stock_soundtrack() -> Soundtrack<&'static str> {
        Soundtrack {
            menu_theme: Some("stock/title"),
            construction_playlist: vec!["stock/build-1", "stock/build-2"],
            space_playlist: vec!["stock/space-1", "stock/space-2"],
            ..Default::default()
        }
    }

    #[test]
    fn conditional_records_become_replacements() {
        let records = vec![
            MusicRecord::new("spacePlaylist", "music/orbit")
                .with_body("Mun")
                .with_altitudes(Some(10.0), Some(60_000.0)),
        ];
        let mut soundtrack = stock_soundtrack();
        let report = load_replacements(&records, &clips(), &BODIES[..], &mut soundtrack);

        assert!(report.rejected.is_empty());
        assert_eq!(
            report.replacements,
            vec![
                Replacement::new(Theme::SpacePlaylist, "music/orbit")
                    .with_body("Mun")
                    .with_band(10.0, 60_000.0)
            ]
        );
        assert_eq!(report.original_playlist, vec!["stock/space-1", "stock/space-2"]);
    }

    #[test]
    fn unconditional_records_are_applied_to_the_soundtrack() {
        let records = vec![
            MusicRecord::new("menuTheme", "music/title"),
            MusicRecord::new("spacePlaylist", "music/orbit"),
            MusicRecord::new("constructionPlaylist", "music/vab"),
        ];
        let mut soundtrack = stock_soundtrack();
        let report = load_replacements(&records, &clips(), &BODIES[..], &mut soundtrack);

        assert_eq!(report.substituted, 3);
        assert!(report.replacements.is_empty());
        assert_eq!(soundtrack.menu_theme, Some("music/title"));
        assert_eq!(
            soundtrack.space_playlist,
            vec!["stock/space-1", "stock/space-2", "music/orbit"]
        );
        assert_eq!(report.original_playlist, soundtrack.space_playlist);
    }

    #[test]
    fn body_on_non_conditional_theme_is_skipped_and_loading_continues() {
        let records = vec![
            MusicRecord::new("VABAmbience", "music/vab").with_body("Kerbin"),
            MusicRecord::new("spacePlaylist", "music/low").with_altitudes(None, Some(70_000.0)),
        ];
        let mut soundtrack = stock_soundtrack();
        let report = load_replacements(&records, &clips(), &BODIES[..], &mut soundtrack);

        assert_eq!(report.rejected.len(), 1);
        assert!(matches!(
            report.rejected[0],
            MusicReplacerError::ConfigValidation { record: 0, .. }
        ));
        assert_eq!(soundtrack.vab_ambience, None);
        assert_eq!(report.replacements.len(), 1);
        assert_eq!(report.replacements[0].clip, "music/low");
    }

    #[test]
    fn altitude_on_non_conditional_theme_is_rejected() {
        let record = MusicRecord::new("credits", "music/title").with_altitudes(Some(5.0), None);
        let err = validate_record::<&str, _, _>(4, &record, &clips(), &BODIES[..]).unwrap_err();
        assert!(matches!(err, MusicReplacerError::ConfigValidation { record: 4, .. }));
    }

    #[test]
    fn invalid_records_report_the_matching_error() {
        let cases = vec![
            (
                MusicRecord {
                    music_url: Some("music/orbit".into()),
                    ..Default::default()
                },
                "validation",
            ),
            (MusicRecord::new("SpacePlaylist", "music/orbit"), "theme"),
            (MusicRecord::new("spacePlaylist", "music/missing"), "asset"),
            (
                MusicRecord::new("spacePlaylist", "music/orbit").with_body("Duna"),
                "body",
            ),
        ];

        for (record, expected) in cases {
            let err = validate_record::<&str, _, _>(0, &record, &clips(), &BODIES[..]).unwrap_err();
            assert!(err.is_per_record());
            let kind = match err {
                MusicReplacerError::ConfigValidation { .. } => "validation",
                MusicReplacerError::UnknownTheme(_) => "theme",
                MusicReplacerError::AssetResolution(_) => "asset",
                MusicReplacerError::UnknownBody(_) => "body",
                other => panic!("unexpected error {other:?}"),
            };
            assert_eq!(kind, expected);
        }
    }

    #[test]
    fn every_failing_field_is_reported() {
        let record = MusicRecord {
            celestial_body: Some("Kerbin".into()),
            max_altitude: Some(1_000.0),
            ..Default::default()
        };
        let err = validate_record::<&str, _, _>(2, &record, &clips(), &BODIES[..]).unwrap_err();

        let reason = match err {
            MusicReplacerError::ConfigValidation { record: 2, reason } => reason,
            other => panic!("expected a folded validation error, got {other:?}"),
        };
        for field in ["name", "musicURL", "celestialBody", "maxAltitude"] {
            assert!(reason.contains(field), "{field} missing from '{reason}'");
        }
    }

    #[test]
    fn unknown_theme_stops_validation_early() {
        let record = MusicRecord::new("spaceplaylist", "music/missing").with_body("Duna");
        let err = validate_record::<&str, _, _>(0, &record, &clips(), &BODIES[..]).unwrap_err();
        assert_eq!(err, MusicReplacerError::UnknownTheme("spaceplaylist".into()));
    }

    #[test]
    fn remove_existing_drops_only_stock_entries() {
        let records = vec![
            MusicRecord::new("constructionPlaylist", "music/vab").removing_existing(),
            MusicRecord::new("spacePlaylist", "music/orbit"),
        ];
        let mut soundtrack = stock_soundtrack();
        let report = load_replacements(&records, &clips(), &BODIES[..], &mut soundtrack);

        assert_eq!(soundtrack.construction_playlist, vec!["music/vab"]);
        assert_eq!(
            soundtrack.space_playlist,
            vec!["stock/space-1", "stock/space-2", "music/orbit"]
        );
        assert_eq!(report.original_playlist.len(), 3);
    }

    #[test]
    fn remove_existing_on_conditional_record_clears_stock_space_music() {
        let records = vec![
            MusicRecord::new("spacePlaylist", "music/low")
                .with_altitudes(None, Some(70_000.0))
                .removing_existing(),
        ];
        let mut soundtrack = stock_soundtrack();
        let report = load_replacements(&records, &clips(), &BODIES[..], &mut soundtrack);

        assert!(soundtrack.space_playlist.is_empty());
        assert!(report.original_playlist.is_empty());
        assert_eq!(report.replacements.len(), 1);
    }

    #[test]
    fn rejected_records_do_not_trigger_removal() {
        let records = vec![
            MusicRecord::new("spacePlaylist", "music/missing").removing_existing(),
        ];
        let mut soundtrack = stock_soundtrack();
        load_replacements(&records, &clips(), &BODIES[..], &mut soundtrack);

        assert_eq!(soundtrack.space_playlist.len(), 2);
    }
}
