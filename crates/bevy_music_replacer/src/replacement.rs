//! Validated replacement rules.

use crate::theme::Theme;
use std::fmt;

/// Name of a celestial body known to the host (e.g. `"Kerbin"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CelestialBody(pub String);

impl CelestialBody {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Half-open altitude range `[min, max)` in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeBand {
    pub min: f64,
    pub max: f64,
}

impl Default for AltitudeBand {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }
}

impl AltitudeBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, altitude: f64) -> bool {
        altitude >= self.min && altitude < self.max
    }

    /// True for the default `[0, +inf)` band.
    pub fn is_unbounded(&self) -> bool {
        *self == Self::default()
    }
}

/// A validated rule: play `clip` for `theme` when the conditions hold.
///
/// `body` and `band` only carry meaning for [`Theme::SpacePlaylist`]; the
/// loader refuses them for every other theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement<C> {
    pub theme: Theme,
    pub clip: C,
    pub body: Option<CelestialBody>,
    pub band: AltitudeBand,
}

impl<C> Replacement<C> {
    /// A rule with no body filter and the default altitude band.
    pub fn new(theme: Theme, clip: C) -> Self {
        Self {
            theme,
            clip,
            body: None,
            band: AltitudeBand::default(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(CelestialBody::new(body));
        self
    }

    pub fn with_band(mut self, min: f64, max: f64) -> Self {
        self.band = AltitudeBand::new(min, max);
        self
    }

    /// Unconditional rules are applied once at load time and never evaluated.
    pub fn is_unconditional(&self) -> bool {
        !self.theme.is_conditional() || (self.body.is_none() && self.band.is_unbounded())
    }

    /// Whether the rule holds for a vessel at `altitude` around `body`.
    pub fn matches(&self, body: Option<&CelestialBody>, altitude: f64) -> bool {
        let body_ok = match &self.body {
            None => true,
            Some(required) => body == Some(required),
        };
        body_ok && self.band.contains(altitude)
    }
}
