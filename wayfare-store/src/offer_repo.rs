use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::{info, warn};
use uuid::Uuid;
use wayfare_core::{
    BoxError, CabinClass, DealsRequest, Offer, OfferRetriever, RetrievalRequest, RetrievalResponse,
};

use crate::StoreError;

// Columns read from the `flight_offers` view. Times are stored as instants
// plus the airport's UTC offset so local wall-clock times survive the trip.
const OFFER_COLUMNS: &str = "offer_id, itinerary_id, airline, origin_code, destination_code, destination_city, \
     departure_time, departure_utc_offset_minutes, arrival_time, arrival_utc_offset_minutes, \
     duration_minutes, stops, base_price::float8 AS base_price, cabin_class";

/// Listings backed by a read-only Postgres view.
pub struct PostgresOfferRetriever {
    pub pool: sqlx::PgPool,
}

impl PostgresOfferRetriever {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_leg(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        cabin_class: CabinClass,
        seats: u32,
    ) -> Result<Vec<Offer>, StoreError> {
        let sql = format!(
            "SELECT {} FROM flight_offers \
             WHERE origin_code = $1 AND destination_code = $2 AND departure_local_date = $3 \
             AND cabin_class = $4 AND seats_available >= $5 \
             ORDER BY base_price",
            OFFER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(origin)
            .bind(destination)
            .bind(date)
            .bind(cabin_class.to_string())
            .bind(i32::try_from(seats).unwrap_or(i32::MAX))
            .fetch_all(&self.pool)
            .await?;

        offers_from_rows(&rows)
    }
}

#[async_trait]
impl OfferRetriever for PostgresOfferRetriever {
    async fn search(&self, request: &RetrievalRequest) -> Result<RetrievalResponse, BoxError> {
        let departure = parse_date(&request.departure_date)?;
        let seats = request.pax.adults + request.pax.children;

        let offers = self
            .fetch_leg(&request.origin, &request.destination, departure, request.cabin_class, seats)
            .await?;

        let return_flights = match request.return_date.as_deref() {
            Some(date) => {
                let date = parse_date(date)?;
                Some(
                    self.fetch_leg(&request.destination, &request.origin, date, request.cabin_class, seats)
                        .await?,
                )
            }
            None => None,
        };

        info!(
            "Listings {} -> {}: {} outbound, {:?} return",
            request.origin,
            request.destination,
            offers.len(),
            return_flights.as_ref().map(Vec::len)
        );

        Ok(RetrievalResponse {
            offers,
            is_round_trip: return_flights.is_some(),
            return_flights,
        })
    }

    async fn deals(&self, request: &DealsRequest) -> Result<Vec<Offer>, BoxError> {
        // Cheapest upcoming offer per destination, cheapest destinations first
        let sql = format!(
            "SELECT * FROM ( \
                 SELECT DISTINCT ON (destination_code) {} FROM flight_offers \
                 WHERE origin_code = $1 AND departure_local_date >= CURRENT_DATE \
                 ORDER BY destination_code, base_price \
             ) cheapest \
             ORDER BY base_price \
             LIMIT $2",
            OFFER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(&request.origin)
            .bind(i64::try_from(request.limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        Ok(offers_from_rows(&rows)?)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| StoreError::InvalidRequest(format!("bad date {:?}: {}", value, e)))
}

fn localize(instant: DateTime<Utc>, offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset_minutes.checked_mul(60)?)?;
    Some(instant.with_timezone(&offset))
}

fn offers_from_rows(rows: &[PgRow]) -> Result<Vec<Offer>, StoreError> {
    let mut offers = Vec::with_capacity(rows.len());
    for row in rows {
        match offer_from_row(row) {
            Ok(offer) => offers.push(offer),
            Err(StoreError::InvalidRow { id, reason }) => warn!("Skipping offer {}: {}", id, reason),
            Err(e) => return Err(e),
        }
    }
    Ok(offers)
}

fn offer_from_row(row: &PgRow) -> Result<Offer, StoreError> {
    // Rows without a published offer id still need a stable key for this response
    let id = row
        .try_get::<Option<Uuid>, _>("offer_id")?
        .unwrap_or_else(Uuid::new_v4)
        .to_string();
    let invalid = |reason: String| StoreError::InvalidRow {
        id: id.clone(),
        reason,
    };

    let local_time = |instant_column: &str, offset_column: &str| -> Result<DateTime<FixedOffset>, StoreError> {
        let instant: DateTime<Utc> = row.try_get(instant_column)?;
        let minutes: i32 = row.try_get(offset_column)?;
        localize(instant, minutes).ok_or_else(|| invalid(format!("{} {} out of range", offset_column, minutes)))
    };
    let departure_time = local_time("departure_time", "departure_utc_offset_minutes")?;
    let arrival_time = local_time("arrival_time", "arrival_utc_offset_minutes")?;

    let cabin: String = row.try_get("cabin_class")?;
    let cabin_class = CabinClass::from_str(&cabin).map_err(|e| invalid(e.to_string()))?;

    let duration: i32 = row.try_get("duration_minutes")?;
    let duration_minutes = u32::try_from(duration).map_err(|_| invalid(format!("negative duration {}", duration)))?;
    let stops: i32 = row.try_get("stops")?;
    let stops = u32::try_from(stops).map_err(|_| invalid(format!("negative stops {}", stops)))?;

    let base_price: f64 = row.try_get("base_price")?;
    if !(base_price.is_finite() && base_price > 0.0) {
        return Err(invalid(format!("price {}", base_price)));
    }

    let offer = Offer {
        airline: row.try_get("airline")?,
        origin_code: row.try_get("origin_code")?,
        destination_code: row.try_get("destination_code")?,
        destination_city: row.try_get("destination_city")?,
        departure_time,
        arrival_time,
        duration_minutes,
        stops,
        base_price,
        cabin_class,
        itinerary_id: row.try_get("itinerary_id")?,
        id,
    };
    Ok(offer)
}
