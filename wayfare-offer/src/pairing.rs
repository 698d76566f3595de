use std::collections::HashMap;

use serde::Serialize;
use wayfare_core::Offer;

/// An outbound offer with its return leg, if any.
///
/// One-way searches produce itineraries with no inbound leg.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Itinerary {
    pub outbound: Offer,
    pub inbound: Option<Offer>,
}

impl Itinerary {
    pub fn one_way(outbound: Offer) -> Self {
        Self { outbound, inbound: None }
    }

    pub fn round_trip(outbound: Offer, inbound: Offer) -> Self {
        Self { outbound, inbound: Some(inbound) }
    }
}

/// Why an outbound offer ended up without a return leg.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairingGap {
    /// Positional pairing ran out of return offers.
    NoReturnAtPosition { index: usize },
    /// No return offer carries the outbound's itinerary id.
    NoLinkedReturn { itinerary_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pairing {
    Paired { outbound: Offer, inbound: Offer },
    Unpaired { outbound: Offer, gap: PairingGap },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PairingStrategy {
    /// Matched on the itinerary id returned by the listings service.
    Linked,
    /// Matched by index; only correct when both legs share order and length.
    Positional,
}

/// Result of pairing one round-trip response.
#[derive(Debug, Clone)]
pub struct PairingReport {
    pub strategy: PairingStrategy,
    pub pairings: Vec<Pairing>,
    /// `(outbound, return)` lengths when positional pairing saw unequal legs.
    pub length_mismatch: Option<(usize, usize)>,
}

impl PairingReport {
    pub fn gaps(&self) -> impl Iterator<Item = (&Offer, &PairingGap)> {
        self.pairings.iter().filter_map(|pairing| match pairing {
            Pairing::Unpaired { outbound, gap } => Some((outbound, gap)),
            Pairing::Paired { .. } => None,
        })
    }

    pub fn gap_count(&self) -> usize {
        self.gaps().count()
    }

    /// Keep only complete round trips; unpaired outbound offers are dropped.
    pub fn into_itineraries(self) -> Vec<Itinerary> {
        self.pairings
            .into_iter()
            .filter_map(|pairing| match pairing {
                Pairing::Paired { outbound, inbound } => Some(Itinerary::round_trip(outbound, inbound)),
                Pairing::Unpaired { .. } => None,
            })
            .collect()
    }
}

/// Associate each outbound offer with a return offer.
///
/// Uses itinerary ids when every offer on both legs has one, and falls back to
/// index alignment otherwise.
pub fn pair_round_trip(outbound: Vec<Offer>, returns: Vec<Offer>) -> PairingReport {
    let linked = !outbound.is_empty()
        && outbound.iter().all(|o| o.itinerary_id.is_some())
        && returns.iter().all(|o| o.itinerary_id.is_some());

    let report = if linked {
        pair_linked(outbound, returns)
    } else {
        pair_positional(outbound, returns)
    };

    for (offer, gap) in report.gaps() {
        tracing::debug!("Dropping outbound offer {} without a return leg: {:?}", offer.id, gap);
    }

    report
}

fn pair_linked(outbound: Vec<Offer>, returns: Vec<Offer>) -> PairingReport {
    let mut by_itinerary: HashMap<String, Offer> = HashMap::new();
    for offer in returns {
        if let Some(key) = offer.itinerary_id.clone() {
            // First return offer for an itinerary wins
            by_itinerary.entry(key).or_insert(offer);
        }
    }

    let pairings = outbound
        .into_iter()
        .map(|outbound| {
            let key = outbound.itinerary_id.clone().unwrap_or_default();
            match by_itinerary.get(&key) {
                Some(inbound) => Pairing::Paired { outbound, inbound: inbound.clone() },
                None => Pairing::Unpaired {
                    outbound,
                    gap: PairingGap::NoLinkedReturn { itinerary_id: key },
                },
            }
        })
        .collect();

    PairingReport {
        strategy: PairingStrategy::Linked,
        pairings,
        length_mismatch: None,
    }
}

fn pair_positional(outbound: Vec<Offer>, returns: Vec<Offer>) -> PairingReport {
    let length_mismatch = if outbound.len() != returns.len() {
        tracing::warn!(
            "Positional pairing over unequal legs: {} outbound, {} return",
            outbound.len(),
            returns.len()
        );
        Some((outbound.len(), returns.len()))
    } else {
        None
    };

    let mut returns = returns.into_iter();
    let pairings = outbound
        .into_iter()
        .enumerate()
        .map(|(index, outbound)| match returns.next() {
            Some(inbound) => Pairing::Paired { outbound, inbound },
            None => Pairing::Unpaired {
                outbound,
                gap: PairingGap::NoReturnAtPosition { index },
            },
        })
        .collect();

    PairingReport {
        strategy: PairingStrategy::Positional,
        pairings,
        length_mismatch,
    }
}
