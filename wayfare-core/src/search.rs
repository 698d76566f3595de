use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::normalize::validate_query;
use crate::ValidationFailure;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CabinClass {
    #[default]
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl fmt::Display for CabinClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        };
        f.write_str(label)
    }
}

impl FromStr for CabinClass {
    type Err = ValidationFailure;

    /// Parses dropdown labels. An empty selection falls back to economy.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let label = raw.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match label.as_str() {
            "" | "economy" => Ok(CabinClass::Economy),
            "premium_economy" | "premium" => Ok(CabinClass::PremiumEconomy),
            "business" => Ok(CabinClass::Business),
            "first" => Ok(CabinClass::First),
            _ => Err(ValidationFailure::UnknownCabinClass(raw.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PaxCounts {
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
}

impl PaxCounts {
    pub fn adults(adults: u32) -> Self {
        Self { adults, children: 0, infants: 0 }
    }
}

impl Default for PaxCounts {
    fn default() -> Self {
        Self::adults(1)
    }
}

/// Raw values as they come off the search form.
///
/// Dates are whatever the picker produced, carrying the user's local offset.
#[derive(Debug, Clone)]
pub struct SearchForm {
    pub origin: String,
    pub destination: String,
    pub departure: Option<DateTime<FixedOffset>>,
    pub return_date: Option<DateTime<FixedOffset>>,
    pub trip_type: TripType,
    pub cabin_class: String,
    pub pax: PaxCounts,
}

/// Canonical, validated flight search.
///
/// Only built by [`crate::normalize_query`]; a new search replaces the old
/// value rather than mutating it. Deserializing runs the same checks, so a
/// stored query that breaks them is rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "StoredQuery")]
pub struct SearchQuery {
    pub(crate) origin: String,
    pub(crate) destination: String,
    pub(crate) departure_date: NaiveDate,
    pub(crate) return_date: Option<NaiveDate>,
    pub(crate) pax: PaxCounts,
    pub(crate) cabin_class: CabinClass,
    pub(crate) trip_type: TripType,
}

impl SearchQuery {
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_date
    }

    pub fn return_date(&self) -> Option<NaiveDate> {
        self.return_date
    }

    pub fn pax(&self) -> PaxCounts {
        self.pax
    }

    pub fn cabin_class(&self) -> CabinClass {
        self.cabin_class
    }

    pub fn trip_type(&self) -> TripType {
        self.trip_type
    }

    pub fn is_round_trip(&self) -> bool {
        self.trip_type == TripType::RoundTrip
    }

    /// `YYYY-MM-DD`, as sent to the listings service.
    pub fn departure_date_iso(&self) -> String {
        self.departure_date.format("%Y-%m-%d").to_string()
    }

    pub fn return_date_iso(&self) -> Option<String> {
        self.return_date.map(|d| d.format("%Y-%m-%d").to_string())
    }
}

/// Wire shape of a persisted [`SearchQuery`], before validation.
#[derive(Deserialize)]
struct StoredQuery {
    origin: String,
    destination: String,
    departure_date: NaiveDate,
    #[serde(default)]
    return_date: Option<NaiveDate>,
    pax: PaxCounts,
    #[serde(default)]
    cabin_class: CabinClass,
    trip_type: TripType,
}

impl TryFrom<StoredQuery> for SearchQuery {
    type Error = ValidationFailure;

    fn try_from(stored: StoredQuery) -> Result<Self, Self::Error> {
        validate_query(SearchQuery {
            origin: stored.origin,
            destination: stored.destination,
            departure_date: stored.departure_date,
            return_date: stored.return_date,
            pax: stored.pax,
            cabin_class: stored.cabin_class,
            trip_type: stored.trip_type,
        })
    }
}

/// One remembered search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentSearchEntry {
    pub query: SearchQuery,
    pub timestamp: DateTime<Utc>,
}

impl RecentSearchEntry {
    pub fn new(query: SearchQuery, timestamp: DateTime<Utc>) -> Self {
        Self { query, timestamp }
    }

    /// Two entries with the same key are the same search for de-duplication.
    pub fn key(&self) -> (&str, &str, NaiveDate) {
        (
            self.query.origin(),
            self.query.destination(),
            self.query.departure_date(),
        )
    }
}

/// A recent-search list read back from a store.
///
/// Entries that fail to parse or validate are skipped with a warning; the
/// rest of the list still loads.
#[derive(Debug, Default)]
pub struct StoredSearches(pub Vec<RecentSearchEntry>);

impl<'de> Deserialize<'de> for StoredSearches {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Valid(RecentSearchEntry),
            Rejected(IgnoredAny),
        }

        let stored = Vec::<Stored>::deserialize(deserializer)?;
        let total = stored.len();
        let entries: Vec<RecentSearchEntry> = stored
            .into_iter()
            .filter_map(|entry| match entry {
                Stored::Valid(entry) => Some(entry),
                Stored::Rejected(_) => None,
            })
            .collect();

        if entries.len() < total {
            tracing::warn!("Dropped {} invalid stored searches", total - entries.len());
        }
        Ok(Self(entries))
    }
}
