use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use wayfare_core::{normalize_airport_code, DealsRequest, Offer, OfferRetriever, RetrievalFailure, ValidationFailure};

pub const DEFAULT_DEALS_LIMIT: usize = 12;

/// One destination/price entry in the promotional list.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DealBucket {
    pub destination_city: String,
    pub price: f64,
    pub duration_minutes: u32,
    pub stops: u32,
    pub departure_date: NaiveDate,
}

impl From<&Offer> for DealBucket {
    fn from(offer: &Offer) -> Self {
        Self {
            destination_city: offer.destination_label().to_string(),
            price: offer.base_price,
            duration_minutes: offer.duration_minutes,
            stops: offer.stops,
            departure_date: offer.departure_date(),
        }
    }
}

/// Cheapest destinations from one origin, ascending by price.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DealBoard {
    origin: String,
    buckets: Vec<DealBucket>,
}

impl DealBoard {
    /// Keep the cheapest offer per destination, then the `limit` cheapest of those.
    pub fn from_offers(origin: impl Into<String>, offers: &[Offer], limit: usize) -> Self {
        let mut cheapest: HashMap<&str, &Offer> = HashMap::new();
        for offer in offers {
            if !(offer.base_price.is_finite() && offer.base_price > 0.0) {
                tracing::warn!("Skipping deal offer {} with unusable price {}", offer.id, offer.base_price);
                continue;
            }
            cheapest
                .entry(offer.destination_code.as_str())
                .and_modify(|current| {
                    if offer.base_price < current.base_price {
                        *current = offer;
                    }
                })
                .or_insert(offer);
        }

        let mut buckets: Vec<DealBucket> = cheapest.into_values().map(DealBucket::from).collect();
        buckets.sort_by(|a, b| {
            a.price
                .total_cmp(&b.price)
                .then_with(|| a.destination_city.cmp(&b.destination_city))
        });
        buckets.truncate(limit);

        Self {
            origin: origin.into(),
            buckets,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn buckets(&self) -> &[DealBucket] {
        &self.buckets
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Highest price among the buckets held right now.
    ///
    /// Always recomputed from the buckets, so it moves with the data.
    pub fn ceiling(&self) -> Option<f64> {
        self.buckets.iter().map(|b| b.price).reduce(f64::max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DealsError {
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    #[error(transparent)]
    Retrieval(#[from] RetrievalFailure),
}

/// Loads deal boards from the listings service.
pub struct DealsAggregator {
    retriever: Arc<dyn OfferRetriever>,
    limit: usize,
}

impl DealsAggregator {
    pub fn new(retriever: Arc<dyn OfferRetriever>, limit: usize) -> Self {
        Self { retriever, limit }
    }

    pub async fn load(&self, origin: &str) -> Result<DealBoard, DealsError> {
        let origin = normalize_airport_code(origin)?;
        let request = DealsRequest {
            origin: origin.clone(),
            limit: self.limit,
        };

        let offers = self.retriever.deals(&request).await.map_err(|e| {
            tracing::error!("Deals retrieval failed for {}: {}", origin, e);
            RetrievalFailure::from(e)
        })?;

        let board = DealBoard::from_offers(origin, &offers, self.limit);
        tracing::info!(
            "Loaded {} deals from {} (ceiling {:?})",
            board.buckets().len(),
            board.origin(),
            board.ceiling()
        );
        Ok(board)
    }
}
