//! Confidence scores by administrative granularity.

use haulgeo_core::AdminLevel;

/// Score for a level that is absent or not one of the known granularities.
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Maps a match's granularity to a confidence in `[0, 1]`.
///
/// Monotonically non-decreasing from `Country` to `HouseNumber`.
#[must_use]
pub fn score(level: Option<AdminLevel>) -> f64 {
    match level {
        Some(AdminLevel::Country) => 0.1,
        Some(AdminLevel::Province) => 0.2,
        Some(AdminLevel::City) => 0.4,
        Some(AdminLevel::District) => 0.6,
        Some(AdminLevel::Township) => 0.8,
        Some(AdminLevel::Street) => 0.9,
        Some(AdminLevel::HouseNumber) => 1.0,
        None => NEUTRAL_CONFIDENCE,
    }
}
