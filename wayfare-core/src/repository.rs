use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::offer::Offer;
use crate::search::{CabinClass, PaxCounts, RecentSearchEntry, SearchQuery};
use crate::BoxError;

/// What the listings service is asked for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetrievalRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub cabin_class: CabinClass,
    pub pax: PaxCounts,
}

impl From<&SearchQuery> for RetrievalRequest {
    fn from(query: &SearchQuery) -> Self {
        Self {
            origin: query.origin().to_string(),
            destination: query.destination().to_string(),
            departure_date: query.departure_date_iso(),
            return_date: query.return_date_iso(),
            cabin_class: query.cabin_class(),
            pax: query.pax(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResponse {
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub return_flights: Option<Vec<Offer>>,
    #[serde(default)]
    pub is_round_trip: bool,
}

/// Origin-only request backing the deals list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DealsRequest {
    pub origin: String,
    pub limit: usize,
}

/// Listings service consumed by the engine
#[async_trait]
pub trait OfferRetriever: Send + Sync {
    async fn search(
        &self,
        request: &RetrievalRequest,
    ) -> Result<RetrievalResponse, BoxError>;

    /// Cheapest offers from `origin` across destinations
    async fn deals(
        &self,
        request: &DealsRequest,
    ) -> Result<Vec<Offer>, BoxError>;
}

/// Durable storage behind the recent-search ledger.
///
/// Writes come from a single session, so no transactional guarantee is needed.
#[async_trait]
pub trait RecentSearchStore: Send + Sync {
    async fn get(&self) -> Result<Vec<RecentSearchEntry>, BoxError>;

    async fn put(
        &self,
        entries: &[RecentSearchEntry],
    ) -> Result<(), BoxError>;
}
