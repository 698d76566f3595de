use serde::{Deserialize, Serialize};

/// ECONOMY price relative to the offer's base price.
pub const ECONOMY_MULTIPLIER: f64 = 1.6;

/// Perk categories every tier lists, in display order.
const PERK_CATEGORIES: [&str; 5] = [
    "Carry-on bag",
    "Checked bag",
    "Seat selection",
    "Extra legroom",
    "Changes",
];
const REFUND_PERK: &str = "Refund";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FareCode {
    Basic,
    Economy,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PerkStatus {
    Included,
    Fee,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Perk {
    pub text: String,
    pub status: PerkStatus,
}

impl Perk {
    fn new(text: &str, status: PerkStatus) -> Self {
        Self { text: text.to_string(), status }
    }
}

/// A purchasable variant of one offer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FareTier {
    pub code: FareCode,
    pub label: String,
    pub price: i64,
    pub refundable: bool,
    pub perks: Vec<Perk>,
}

/// Expand one base price into the fixed BASIC, ECONOMY tier pair.
///
/// Pure: no clock, no randomness, no market input. Rendering calls this on
/// every pass instead of caching the result.
pub fn derive_fare_tiers(base_price: f64) -> [FareTier; 2] {
    [basic_tier(base_price), economy_tier(base_price)]
}

fn basic_tier(base_price: f64) -> FareTier {
    let mut perks: Vec<Perk> = PERK_CATEGORIES
        .iter()
        .map(|text| Perk::new(text, PerkStatus::Fee))
        .collect();
    perks.push(Perk::new(REFUND_PERK, PerkStatus::Unavailable));

    FareTier {
        code: FareCode::Basic,
        label: "Basic".to_string(),
        price: round_price(base_price),
        refundable: false,
        perks,
    }
}

fn economy_tier(base_price: f64) -> FareTier {
    let mut perks: Vec<Perk> = PERK_CATEGORIES
        .iter()
        .map(|text| Perk::new(text, PerkStatus::Included))
        .collect();
    perks.push(Perk::new(REFUND_PERK, PerkStatus::Included));

    FareTier {
        code: FareCode::Economy,
        label: "Economy".to_string(),
        price: round_price(base_price * ECONOMY_MULTIPLIER),
        refundable: true,
        perks,
    }
}

fn round_price(amount: f64) -> i64 {
    amount.round() as i64
}
