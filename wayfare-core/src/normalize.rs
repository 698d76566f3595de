use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::search::{CabinClass, SearchForm, SearchQuery, TripType};
use crate::ValidationFailure;

/// Turn raw form input into a canonical [`SearchQuery`].
///
/// Nothing is dispatched on failure; the caller shows the returned reason.
pub fn normalize_query(form: &SearchForm) -> Result<SearchQuery, ValidationFailure> {
    if form.origin.trim().is_empty() {
        return Err(ValidationFailure::MissingOrigin);
    }
    if form.destination.trim().is_empty() {
        return Err(ValidationFailure::MissingDestination);
    }

    let departure_date = form
        .departure
        .as_ref()
        .map(local_calendar_date)
        .ok_or(ValidationFailure::MissingDepartureDate)?;

    // A one-way search never carries a return date, even if the picker still holds one
    let return_date = match form.trip_type {
        TripType::RoundTrip => Some(
            form.return_date
                .as_ref()
                .map(local_calendar_date)
                .ok_or(ValidationFailure::MissingReturnDate)?,
        ),
        TripType::OneWay => None,
    };

    let cabin_class: CabinClass = form.cabin_class.parse()?;

    let query = validate_query(SearchQuery {
        origin: form.origin.clone(),
        destination: form.destination.clone(),
        departure_date,
        return_date,
        pax: form.pax,
        cabin_class,
        trip_type: form.trip_type,
    })?;

    tracing::debug!(
        "Normalized search {} -> {} on {}",
        query.origin,
        query.destination,
        query.departure_date
    );
    Ok(query)
}

/// Checks every [`SearchQuery`] passes, whether built from the form or read
/// back from storage.
pub(crate) fn validate_query(query: SearchQuery) -> Result<SearchQuery, ValidationFailure> {
    let origin = normalize_airport_code(&query.origin)?;
    let destination = normalize_airport_code(&query.destination)?;
    if origin == destination {
        return Err(ValidationFailure::SameOriginAndDestination(origin));
    }

    let return_date = match query.trip_type {
        TripType::RoundTrip => Some(query.return_date.ok_or(ValidationFailure::MissingReturnDate)?),
        TripType::OneWay => None,
    };
    if let Some(return_date) = return_date {
        if return_date < query.departure_date {
            return Err(ValidationFailure::ReturnBeforeDeparture {
                departure_date: query.departure_date,
                return_date,
            });
        }
    }

    if query.pax.adults == 0 {
        return Err(ValidationFailure::NoAdults);
    }

    Ok(SearchQuery {
        origin,
        destination,
        return_date,
        ..query
    })
}

/// Trim and upper-case an IATA airport code.
pub fn normalize_airport_code(raw: &str) -> Result<String, ValidationFailure> {
    let trimmed = raw.trim();
    let code = trimmed.to_ascii_uppercase();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(ValidationFailure::InvalidAirportCode(trimmed.to_string()))
    }
}

/// Calendar date the user picked, in the picker's own offset.
///
/// Converting to UTC first would move late-evening picks onto the next day.
pub fn local_calendar_date(picked: &DateTime<FixedOffset>) -> NaiveDate {
    picked.date_naive()
}
