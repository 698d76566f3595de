pub mod tiers;
pub mod pairing;
pub mod filter;
pub mod ranking;
pub mod compose;
pub mod deals;
pub mod recent;
pub mod session;

pub use compose::{compose, compose_itineraries, Projection, ResultsState, ViewState};
pub use deals::{DealBoard, DealBucket, DealsAggregator, DealsError, DEFAULT_DEALS_LIMIT};
pub use filter::{airlines_in, DepartureWindow, FilterState, StopsBucket};
pub use pairing::{pair_round_trip, Itinerary, Pairing, PairingGap, PairingReport, PairingStrategy};
pub use ranking::{SortMode, UnknownSortMode};
pub use recent::{LedgerError, RecentSearchLedger, RECENT_SEARCH_CAPACITY};
pub use session::{SearchOutcome, SearchSession};
pub use tiers::{derive_fare_tiers, FareCode, FareTier, Perk, PerkStatus};
