use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tracing::info;
use wayfare_core::{BoxError, DealsRequest, Offer, OfferRetriever, RetrievalRequest, RetrievalResponse};

use crate::StoreError;

/// Listings served from a JSON array of offers, in file order.
///
/// Stands in for the listings service when no database is configured.
#[derive(Debug, Clone, Default)]
pub struct FixtureOfferRetriever {
    offers: Vec<Offer>,
}

impl FixtureOfferRetriever {
    pub fn new(offers: Vec<Offer>) -> Self {
        Self { offers }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let offers: Vec<Offer> = serde_json::from_str(&raw)?;
        info!("Loaded {} fixture offers from {}", offers.len(), path.display());
        Ok(Self::new(offers))
    }

    fn leg(&self, origin: &str, destination: &str, date: &str, request: &RetrievalRequest) -> Vec<Offer> {
        self.offers
            .iter()
            .filter(|o| o.origin_code == origin && o.destination_code == destination)
            .filter(|o| o.departure_date().format("%Y-%m-%d").to_string() == date)
            .filter(|o| o.cabin_class == request.cabin_class)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OfferRetriever for FixtureOfferRetriever {
    async fn search(&self, request: &RetrievalRequest) -> Result<RetrievalResponse, BoxError> {
        let offers = self.leg(&request.origin, &request.destination, &request.departure_date, request);
        let return_flights = request
            .return_date
            .as_deref()
            .map(|date| self.leg(&request.destination, &request.origin, date, request));

        Ok(RetrievalResponse {
            offers,
            is_round_trip: return_flights.is_some(),
            return_flights,
        })
    }

    /// Cheapest offer per destination, cheapest destinations first, capped at the limit.
    async fn deals(&self, request: &DealsRequest) -> Result<Vec<Offer>, BoxError> {
        let mut cheapest: HashMap<&str, &Offer> = HashMap::new();
        for offer in self.offers.iter().filter(|o| o.origin_code == request.origin) {
            cheapest
                .entry(offer.destination_code.as_str())
                .and_modify(|current| {
                    if offer.base_price < current.base_price {
                        *current = offer;
                    }
                })
                .or_insert(offer);
        }

        let mut deals: Vec<Offer> = cheapest.into_values().cloned().collect();
        deals.sort_by(|a, b| {
            a.base_price
                .total_cmp(&b.base_price)
                .then_with(|| a.destination_code.cmp(&b.destination_code))
        });
        deals.truncate(request.limit);
        Ok(deals)
    }
}
