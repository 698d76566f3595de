use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use tracing::info;
use wayfare_core::{normalize_query, PaxCounts, RecentSearchEntry, SearchForm, SearchQuery, TripType};
use wayfare_offer::{airlines_in, DealBoard, DealsAggregator, FareTier, Projection, SearchOutcome, SearchSession};

use crate::cli::{Command, SearchArgs, ViewArgs};
use crate::error::CommandError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct OfferTiers {
    pub offer_id: String,
    pub tiers: [FareTier; 2],
}

#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub query: Option<SearchQuery>,
    /// Airlines in the unfiltered result set, for the airline checklist
    pub airlines: BTreeSet<String>,
    pub results: Projection,
    pub fare_tiers: Vec<OfferTiers>,
}

#[derive(Debug, Serialize)]
pub struct DealsReport {
    #[serde(flatten)]
    pub board: DealBoard,
    pub ceiling: Option<f64>,
}

pub async fn run(state: &AppState, command: Command) -> Result<serde_json::Value, CommandError> {
    let output = match command {
        Command::Search(args) => serde_json::to_value(search(state, args).await?)?,
        Command::Deals { origin, limit } => serde_json::to_value(deals(state, &origin, limit).await?)?,
        Command::Recent => serde_json::to_value(recent(state).await)?,
        Command::Replay { index, view } => serde_json::to_value(replay(state, index, &view).await?)?,
    };
    Ok(output)
}

pub async fn search(state: &AppState, args: SearchArgs) -> Result<SearchReport, CommandError> {
    let query = normalize_query(&search_form(&args)?)?;
    let session = state.session().await;
    let outcome = session.search(query).await;
    report(&session, outcome, &args.view).await
}

pub async fn replay(state: &AppState, index: usize, view: &ViewArgs) -> Result<SearchReport, CommandError> {
    let session = state.session().await;
    let outcome = session
        .replay(index)
        .await
        .ok_or(CommandError::NoSuchRecentSearch(index))?;
    report(&session, outcome, view).await
}

pub async fn deals(state: &AppState, origin: &str, limit: Option<usize>) -> Result<DealsReport, CommandError> {
    let aggregator = DealsAggregator::new(state.retriever.clone(), limit.unwrap_or(state.deals_limit));
    let session = state.session().await;
    let board = session.load_deals(&aggregator, origin).await?;
    Ok(DealsReport {
        ceiling: board.ceiling(),
        board,
    })
}

pub async fn recent(state: &AppState) -> Vec<RecentSearchEntry> {
    state.session().await.recent_searches().await
}

async fn report(session: &SearchSession, outcome: SearchOutcome, view: &ViewArgs) -> Result<SearchReport, CommandError> {
    if let SearchOutcome::Failed(failure) = outcome {
        return Err(failure.into());
    }

    let airlines = airlines_in(session.projection().await.filtered_and_sorted_offers());
    session.set_filter(view.apply(session.view().await.filter)).await;
    let results = session.set_sort(view.sort).await;

    let fare_tiers = results
        .filtered_and_sorted_offers()
        .into_iter()
        .map(|offer| OfferTiers {
            offer_id: offer.id.clone(),
            tiers: results.fare_tiers_for(offer),
        })
        .collect();

    info!("{} itineraries shown ({:?})", results.itineraries.len(), results.state);
    Ok(SearchReport {
        outcome,
        query: session.current_query().await,
        airlines,
        results,
        fare_tiers,
    })
}

fn search_form(args: &SearchArgs) -> Result<SearchForm, CommandError> {
    let trip_type = if args.round_trip || args.return_date.is_some() {
        TripType::RoundTrip
    } else {
        TripType::OneWay
    };

    Ok(SearchForm {
        origin: args.from.clone(),
        destination: args.to.clone(),
        departure: args.depart.as_deref().map(parse_picker_value).transpose()?,
        return_date: args.return_date.as_deref().map(parse_picker_value).transpose()?,
        trip_type,
        cabin_class: args.cabin.clone(),
        pax: PaxCounts {
            adults: args.adults,
            children: args.children,
            infants: args.infants,
        },
    })
}

/// A bare date is read as midnight at UTC+0 so its calendar date is kept as typed.
pub fn parse_picker_value(raw: &str) -> Result<DateTime<FixedOffset>, CommandError> {
    let raw = raw.trim();
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Ok(value);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().fixed_offset())
        .ok_or_else(|| CommandError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_picker_value_keeps_local_date() {
        let late = parse_picker_value("2025-12-01T23:30:00-08:00").unwrap();
        assert_eq!(late.date_naive(), NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(late.hour(), 23);

        let bare = parse_picker_value(" 2025-12-08 ").unwrap();
        assert_eq!(bare.date_naive(), NaiveDate::from_ymd_opt(2025, 12, 8).unwrap());

        assert!(matches!(parse_picker_value("08/12/2025"), Err(CommandError::InvalidDate(_))));
    }

    #[test]
    fn test_return_implies_round_trip() {
        let args = SearchArgs {
            from: "LAX".to_string(),
            to: "JFK".to_string(),
            depart: Some("2025-12-01".to_string()),
            return_date: Some("2025-12-08".to_string()),
            round_trip: false,
            cabin: "economy".to_string(),
            adults: 1,
            children: 0,
            infants: 0,
            view: ViewArgs::default(),
        };
        assert_eq!(search_form(&args).unwrap().trip_type, TripType::RoundTrip);

        let one_way = SearchArgs { return_date: None, ..args };
        assert_eq!(search_form(&one_way).unwrap().trip_type, TripType::OneWay);

        let missing_return = SearchArgs { round_trip: true, ..one_way };
        let form = search_form(&missing_return).unwrap();
        assert!(matches!(
            normalize_query(&form),
            Err(wayfare_core::ValidationFailure::MissingReturnDate)
        ));
    }
}
