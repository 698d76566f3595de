use serde::{Deserialize, Serialize};

pub mod search;
pub mod offer;
pub mod normalize;
pub mod repository;

pub use normalize::{local_calendar_date, normalize_airport_code, normalize_query};
pub use offer::Offer;
pub use repository::{DealsRequest, OfferRetriever, RecentSearchStore, RetrievalRequest, RetrievalResponse};
pub use search::{CabinClass, PaxCounts, RecentSearchEntry, SearchForm, SearchQuery, StoredSearches, TripType};

/// Error type returned across async collaborator seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A malformed query, caught before anything is dispatched to retrieval.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("Origin is required")]
    MissingOrigin,
    #[error("Destination is required")]
    MissingDestination,
    #[error("Departure date is required")]
    MissingDepartureDate,
    #[error("Return date is required for a round trip")]
    MissingReturnDate,
    #[error("Invalid airport code: {0}")]
    InvalidAirportCode(String),
    #[error("Origin and destination are both {0}")]
    SameOriginAndDestination(String),
    #[error("Return date {return_date} is before departure date {departure_date}")]
    ReturnBeforeDeparture {
        departure_date: chrono::NaiveDate,
        return_date: chrono::NaiveDate,
    },
    #[error("At least one adult passenger is required")]
    NoAdults,
    #[error("Unknown cabin class: {0}")]
    UnknownCabinClass(String),
}

/// Network or service failure reported by the listings collaborator.
///
/// Surfaced to rendering as an error state. Nothing retries automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Offer retrieval failed: {message}")]
pub struct RetrievalFailure {
    pub message: String,
}

impl RetrievalFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<BoxError> for RetrievalFailure {
    fn from(err: BoxError) -> Self {
        Self::new(err.to_string())
    }
}
