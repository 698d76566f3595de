use serde::Serialize;
use wayfare_core::{Offer, RetrievalFailure};

use crate::deals::DealBucket;
use crate::filter::FilterState;
use crate::pairing::Itinerary;
use crate::ranking::SortMode;
use crate::tiers::{derive_fare_tiers, FareTier};

/// Filter and sort selection for one results view.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ViewState {
    pub filter: FilterState,
    pub sort: SortMode,
}

impl ViewState {
    pub fn new(filter: FilterState, sort: SortMode) -> Self {
        Self { filter, sort }
    }

    pub fn with_filter(&self, filter: FilterState) -> Self {
        Self { filter, sort: self.sort }
    }

    pub fn with_sort(&self, sort: SortMode) -> Self {
        Self {
            filter: self.filter.clone(),
            sort,
        }
    }
}

/// What the result list should show.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultsState {
    /// No search issued yet.
    Idle,
    Loading,
    Ready,
    /// The search succeeded but nothing survives the filters.
    Empty,
    Failed(RetrievalFailure),
}

/// Filter then rank a flat offer list.
pub fn compose(offers: &[Offer], filter: &FilterState, sort: SortMode) -> Vec<Offer> {
    let mut kept: Vec<Offer> = offers.iter().filter(|o| filter.matches(o)).cloned().collect();
    sort.rank(&mut kept);
    kept
}

/// Same as [`compose`], judged on each itinerary's outbound leg.
pub fn compose_itineraries(itineraries: &[Itinerary], filter: &FilterState, sort: SortMode) -> Vec<Itinerary> {
    let mut kept: Vec<Itinerary> = itineraries
        .iter()
        .filter(|i| filter.matches(&i.outbound))
        .cloned()
        .collect();
    kept.sort_by(|a, b| sort.compare(&a.outbound, &b.outbound));
    kept
}

/// Read-only result surface handed to rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Projection {
    #[serde(flatten)]
    pub state: ResultsState,
    pub itineraries: Vec<Itinerary>,
    pub deal_buckets: Vec<DealBucket>,
    /// Outbound offers dropped for lack of a return leg.
    pub pairing_gaps: usize,
}

impl Projection {
    /// Build a projection over a completed search.
    pub fn loaded(itineraries: &[Itinerary], view: &ViewState, deal_buckets: Vec<DealBucket>, pairing_gaps: usize) -> Self {
        let itineraries = compose_itineraries(itineraries, &view.filter, view.sort);
        let state = if itineraries.is_empty() {
            ResultsState::Empty
        } else {
            ResultsState::Ready
        };

        Self {
            state,
            itineraries,
            deal_buckets,
            pairing_gaps,
        }
    }

    /// A projection with no results, e.g. while loading or after a failure.
    pub fn pending(state: ResultsState, deal_buckets: Vec<DealBucket>) -> Self {
        Self {
            state,
            itineraries: Vec::new(),
            deal_buckets,
            pairing_gaps: 0,
        }
    }

    pub fn filtered_and_sorted_offers(&self) -> Vec<&Offer> {
        self.itineraries.iter().map(|i| &i.outbound).collect()
    }

    pub fn fare_tiers_for(&self, offer: &Offer) -> [FareTier; 2] {
        derive_fare_tiers(offer.base_price)
    }
}
