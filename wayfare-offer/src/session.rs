use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use wayfare_core::{OfferRetriever, RecentSearchEntry, RetrievalFailure, RetrievalRequest, SearchQuery};

use crate::compose::{Projection, ResultsState, ViewState};
use crate::deals::{DealBoard, DealsAggregator, DealsError};
use crate::filter::FilterState;
use crate::pairing::{pair_round_trip, Itinerary};
use crate::ranking::SortMode;
use crate::recent::RecentSearchLedger;

/// What happened to one dispatched search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchOutcome {
    /// The response was the latest issued and is now on screen.
    Applied {
        sequence: u64,
        itineraries: usize,
        pairing_gaps: usize,
    },
    /// A newer search was issued while this one was in flight; its response was discarded.
    Superseded { sequence: u64, latest: u64 },
    Failed(RetrievalFailure),
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Loading,
    Loaded,
    Failed(RetrievalFailure),
}

struct Results {
    phase: Phase,
    query: Option<SearchQuery>,
    itineraries: Vec<Itinerary>,
    pairing_gaps: usize,
    view: ViewState,
    deals: DealBoard,
}

impl Results {
    fn projection(&self) -> Projection {
        let deal_buckets = self.deals.buckets().to_vec();
        match &self.phase {
            Phase::Idle => Projection::pending(ResultsState::Idle, deal_buckets),
            Phase::Loading => Projection::pending(ResultsState::Loading, deal_buckets),
            Phase::Failed(failure) => Projection::pending(ResultsState::Failed(failure.clone()), deal_buckets),
            Phase::Loaded => Projection::loaded(&self.itineraries, &self.view, deal_buckets, self.pairing_gaps),
        }
    }
}

/// One results view: dispatches searches and holds what is shown.
///
/// Every search takes a sequence number before it suspends on the listings
/// service. Only the response carrying the latest number is applied.
pub struct SearchSession {
    retriever: Arc<dyn OfferRetriever>,
    ledger: Mutex<RecentSearchLedger>,
    issued: AtomicU64,
    deals_issued: AtomicU64,
    results: RwLock<Results>,
}

impl SearchSession {
    pub fn new(retriever: Arc<dyn OfferRetriever>, ledger: RecentSearchLedger) -> Self {
        Self {
            retriever,
            ledger: Mutex::new(ledger),
            issued: AtomicU64::new(0),
            deals_issued: AtomicU64::new(0),
            results: RwLock::new(Results {
                phase: Phase::Idle,
                query: None,
                itineraries: Vec::new(),
                pairing_gaps: 0,
                view: ViewState::default(),
                deals: DealBoard::default(),
            }),
        }
    }

    fn is_latest(&self, sequence: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == sequence
    }

    pub async fn search(&self, query: SearchQuery) -> SearchOutcome {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut results = self.results.write().await;
            if self.is_latest(sequence) {
                results.phase = Phase::Loading;
            }
        }

        let request = RetrievalRequest::from(&query);
        tracing::info!(
            "Search #{} {} -> {} on {}",
            sequence,
            request.origin,
            request.destination,
            request.departure_date
        );
        let response = self.retriever.search(&request).await;

        let mut results = self.results.write().await;
        if !self.is_latest(sequence) {
            let latest = self.issued.load(Ordering::SeqCst);
            tracing::debug!("Discarding search #{} response, #{} is newer", sequence, latest);
            return SearchOutcome::Superseded { sequence, latest };
        }

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Search #{} failed: {}", sequence, e);
                let failure = RetrievalFailure::from(e);
                results.phase = Phase::Failed(failure.clone());
                return SearchOutcome::Failed(failure);
            }
        };

        let (itineraries, pairing_gaps) = if query.return_date().is_some() {
            let report = pair_round_trip(response.offers, response.return_flights.unwrap_or_default());
            let gaps = report.gap_count();
            (report.into_itineraries(), gaps)
        } else {
            (response.offers.into_iter().map(Itinerary::one_way).collect(), 0)
        };

        results.view = results
            .view
            .with_filter(FilterState::for_offers(itineraries.iter().map(|i| &i.outbound)));
        results.phase = Phase::Loaded;
        results.query = Some(query.clone());
        results.itineraries = itineraries;
        results.pairing_gaps = pairing_gaps;
        let applied = results.itineraries.len();
        drop(results);

        tracing::info!("Search #{} returned {} itineraries ({} unpaired)", sequence, applied, pairing_gaps);

        if let Err(e) = self.ledger.lock().await.record(query).await {
            tracing::warn!("Could not remember search #{}: {}", sequence, e);
        }

        SearchOutcome::Applied {
            sequence,
            itineraries: applied,
            pairing_gaps,
        }
    }

    /// Re-dispatch a stored search exactly as it was recorded.
    pub async fn replay(&self, index: usize) -> Option<SearchOutcome> {
        let query = self.ledger.lock().await.replay(index)?;
        Some(self.search(query).await)
    }

    pub async fn recent_searches(&self) -> Vec<RecentSearchEntry> {
        self.ledger.lock().await.entries().to_vec()
    }

    /// Load the deals list, discarding responses overtaken by a newer load.
    pub async fn load_deals(&self, aggregator: &DealsAggregator, origin: &str) -> Result<DealBoard, DealsError> {
        let sequence = self.deals_issued.fetch_add(1, Ordering::SeqCst) + 1;
        let board = aggregator.load(origin).await?;

        let mut results = self.results.write().await;
        if self.deals_issued.load(Ordering::SeqCst) == sequence {
            results.deals = board.clone();
        } else {
            tracing::debug!("Discarding deals load #{} for {}", sequence, board.origin());
        }
        Ok(board)
    }

    pub async fn projection(&self) -> Projection {
        self.results.read().await.projection()
    }

    pub async fn view(&self) -> ViewState {
        self.results.read().await.view.clone()
    }

    pub async fn current_query(&self) -> Option<SearchQuery> {
        self.results.read().await.query.clone()
    }

    pub async fn set_filter(&self, filter: FilterState) -> Projection {
        let mut results = self.results.write().await;
        results.view = results.view.with_filter(filter);
        results.projection()
    }

    pub async fn set_sort(&self, sort: SortMode) -> Projection {
        let mut results = self.results.write().await;
        results.view = results.view.with_sort(sort);
        results.projection()
    }
}
