use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wayfare_core::Offer;

/// Price units one minute of travel time is worth under `Best`.
///
/// Product decision: under `Best`, a flight one minute shorter is worth up to
/// two price units more. Changing it reorders every `Best` listing.
pub const BEST_DURATION_WEIGHT: f64 = 2.0;

/// Ordering applied to the filtered result list. Exactly one is active.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Cheapest,
    Quickest,
    #[default]
    Best,
}

impl SortMode {
    /// Lower is better.
    pub fn score(&self, offer: &Offer) -> f64 {
        match self {
            SortMode::Cheapest => offer.base_price,
            SortMode::Quickest => offer.duration_minutes as f64,
            SortMode::Best => offer.base_price + BEST_DURATION_WEIGHT * offer.duration_minutes as f64,
        }
    }

    /// Total order: score, then earlier departure, then offer id.
    pub fn compare(&self, a: &Offer, b: &Offer) -> Ordering {
        self.score(a)
            .total_cmp(&self.score(b))
            .then_with(|| a.departure_time.cmp(&b.departure_time))
            .then_with(|| a.id.cmp(&b.id))
    }

    pub fn rank(&self, offers: &mut [Offer]) {
        offers.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortMode::Cheapest => "cheapest",
            SortMode::Quickest => "quickest",
            SortMode::Best => "best",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort mode: {0}")]
pub struct UnknownSortMode(pub String);

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cheapest" => Ok(SortMode::Cheapest),
            "quickest" => Ok(SortMode::Quickest),
            "best" => Ok(SortMode::Best),
            _ => Err(UnknownSortMode(raw.to_string())),
        }
    }
}
