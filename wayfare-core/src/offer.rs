use chrono::{DateTime, FixedOffset, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::search::CabinClass;

/// One priced, scheduled flight option as returned by the listings service.
///
/// Read-only inside the engine. Times carry the airport-local offset, so the
/// hour and calendar date read from them are local to the departure airport.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: String,
    pub airline: String,
    pub origin_code: String,
    pub destination_code: String,
    #[serde(default)]
    pub destination_city: Option<String>,
    pub departure_time: DateTime<FixedOffset>,
    pub arrival_time: DateTime<FixedOffset>,
    pub duration_minutes: u32,
    pub stops: u32,
    pub base_price: f64,
    pub cabin_class: CabinClass,
    /// Links an outbound offer to its return leg when the service provides one.
    #[serde(default)]
    pub itinerary_id: Option<String>,
}

impl Offer {
    /// Local hour of departure, 0..24.
    pub fn departure_hour(&self) -> u32 {
        self.departure_time.hour()
    }

    pub fn departure_date(&self) -> NaiveDate {
        self.departure_time.date_naive()
    }

    /// City label for display, falling back to the airport code.
    pub fn destination_label(&self) -> &str {
        self.destination_city.as_deref().unwrap_or(&self.destination_code)
    }
}
