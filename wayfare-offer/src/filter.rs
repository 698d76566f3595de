use std::collections::BTreeSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use wayfare_core::Offer;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StopsBucket {
    NonStop,
    OneStop,
    TwoPlus,
}

impl StopsBucket {
    pub const ALL: [StopsBucket; 3] = [StopsBucket::NonStop, StopsBucket::OneStop, StopsBucket::TwoPlus];

    pub fn of(stops: u32) -> Self {
        match stops {
            0 => StopsBucket::NonStop,
            1 => StopsBucket::OneStop,
            _ => StopsBucket::TwoPlus,
        }
    }
}

/// Part of the day an offer departs in, by local departure hour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepartureWindow {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl DepartureWindow {
    pub const ALL: [DepartureWindow; 4] = [
        DepartureWindow::Night,
        DepartureWindow::Morning,
        DepartureWindow::Afternoon,
        DepartureWindow::Evening,
    ];

    pub fn hours(&self) -> Range<u32> {
        match self {
            DepartureWindow::Night => 0..6,
            DepartureWindow::Morning => 6..12,
            DepartureWindow::Afternoon => 12..18,
            DepartureWindow::Evening => 18..24,
        }
    }

    pub fn of_hour(hour: u32) -> Self {
        match hour {
            0..=5 => DepartureWindow::Night,
            6..=11 => DepartureWindow::Morning,
            12..=17 => DepartureWindow::Afternoon,
            _ => DepartureWindow::Evening,
        }
    }
}

/// User-selected filters for one results view.
///
/// Values are replaced, not edited: every toggle returns a new state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterState {
    pub stops_allowed: BTreeSet<StopsBucket>,
    /// Highest base price shown. `None` means no ceiling.
    pub price_max: Option<f64>,
    /// Empty means every airline is allowed.
    pub airlines_allowed: BTreeSet<String>,
    pub departure_windows_allowed: BTreeSet<DepartureWindow>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            stops_allowed: StopsBucket::ALL.into_iter().collect(),
            price_max: None,
            airlines_allowed: BTreeSet::new(),
            departure_windows_allowed: DepartureWindow::ALL.into_iter().collect(),
        }
    }
}

impl FilterState {
    /// Reset state for a fresh result set: everything on, ceiling at the
    /// highest price present.
    pub fn for_offers<'a>(offers: impl IntoIterator<Item = &'a Offer>) -> Self {
        let price_max = offers
            .into_iter()
            .map(|o| o.base_price)
            .reduce(f64::max);

        Self {
            price_max,
            ..Self::default()
        }
    }

    /// Conjunction of every predicate.
    pub fn matches(&self, offer: &Offer) -> bool {
        self.stops_allowed.contains(&StopsBucket::of(offer.stops))
            && self.price_max.map_or(true, |max| offer.base_price <= max)
            && (self.airlines_allowed.is_empty() || self.airlines_allowed.contains(&offer.airline))
            && self
                .departure_windows_allowed
                .contains(&DepartureWindow::of_hour(offer.departure_hour()))
    }

    pub fn toggle_stops(mut self, bucket: StopsBucket) -> Self {
        if !self.stops_allowed.remove(&bucket) {
            self.stops_allowed.insert(bucket);
        }
        self
    }

    pub fn toggle_window(mut self, window: DepartureWindow) -> Self {
        if !self.departure_windows_allowed.remove(&window) {
            self.departure_windows_allowed.insert(window);
        }
        self
    }

    pub fn toggle_airline(mut self, airline: &str) -> Self {
        if !self.airlines_allowed.remove(airline) {
            self.airlines_allowed.insert(airline.to_string());
        }
        self
    }

    pub fn with_price_max(mut self, price_max: Option<f64>) -> Self {
        self.price_max = price_max;
        self
    }
}

/// Airlines present in a result set, for the airline checklist.
pub fn airlines_in<'a>(offers: impl IntoIterator<Item = &'a Offer>) -> BTreeSet<String> {
    offers.into_iter().map(|o| o.airline.clone()).collect()
}
