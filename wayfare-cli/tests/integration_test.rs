use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use clap::Parser;
use wayfare_cli::{commands, AppState, Cli, Command, CommandError};
use wayfare_core::{
    BoxError, CabinClass, DealsRequest, Offer, OfferRetriever, RetrievalRequest, RetrievalResponse,
};
use wayfare_offer::{FareCode, ResultsState, SearchOutcome};
use wayfare_store::{FileRecentSearchStore, FixtureOfferRetriever, InMemoryRecentSearchStore};

fn offer(id: &str, from: &str, to: &str, departs: &str, price: f64, duration: u32) -> Offer {
    let departure_time = DateTime::parse_from_rfc3339(departs).unwrap();
    Offer {
        id: id.to_string(),
        airline: "AA".to_string(),
        origin_code: from.to_string(),
        destination_code: to.to_string(),
        destination_city: None,
        departure_time,
        arrival_time: departure_time + chrono::Duration::minutes(duration as i64),
        duration_minutes: duration,
        stops: 0,
        base_price: price,
        cabin_class: CabinClass::Economy,
        itinerary_id: None,
    }
}

fn listings() -> Vec<Offer> {
    vec![
        offer("1", "LAX", "JFK", "2025-12-01T08:00:00-08:00", 200.0, 300),
        offer("2", "LAX", "JFK", "2025-12-01T13:00:00-08:00", 350.0, 300),
        offer("r1", "JFK", "LAX", "2025-12-08T09:00:00-05:00", 220.0, 360),
        offer("r2", "JFK", "LAX", "2025-12-08T18:00:00-05:00", 260.0, 350),
        offer("b1", "LAX", "BOS", "2025-12-03T07:00:00-08:00", 180.0, 330),
        offer("b2", "LAX", "BOS", "2025-12-04T07:00:00-08:00", 150.0, 335),
        offer("s1", "LAX", "SFO", "2025-12-05T07:00:00-08:00", 89.0, 80),
    ]
}

fn state() -> AppState {
    AppState::new(
        Arc::new(FixtureOfferRetriever::new(listings())),
        Arc::new(InMemoryRecentSearchStore::new()),
        12,
    )
}

fn command(args: &[&str]) -> Command {
    let mut argv = vec!["wayfare"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap().command
}

async fn search(state: &AppState, args: &[&str]) -> Result<commands::SearchReport, CommandError> {
    let mut argv = vec!["search"];
    argv.extend_from_slice(args);
    match command(&argv) {
        Command::Search(args) => commands::search(state, args).await,
        other => panic!("expected search, got {:?}", other),
    }
}

#[tokio::test]
async fn test_round_trip_search_flow() {
    let state = state();
    let report = search(&state, &["-f", "lax", "-t", "jfk", "--depart", "2025-12-01", "--return", "2025-12-08"])
        .await
        .unwrap();

    assert!(matches!(report.outcome, SearchOutcome::Applied { itineraries: 2, pairing_gaps: 0, .. }));
    assert_eq!(report.results.state, ResultsState::Ready);

    // Best: 200 + 2*300 = 800 beats 350 + 2*300 = 950
    let first = &report.results.itineraries[0];
    assert_eq!(first.outbound.id, "1");
    assert_eq!(first.inbound.as_ref().unwrap().id, "r1");

    let tiers = &report.fare_tiers[0];
    assert_eq!(tiers.offer_id, "1");
    assert_eq!(tiers.tiers[0].code, FareCode::Basic);
    assert_eq!(tiers.tiers[0].price, 200);
    assert_eq!(tiers.tiers[1].code, FareCode::Economy);
    assert_eq!(tiers.tiers[1].price, 320);

    let query = report.query.unwrap();
    assert_eq!(query.origin(), "LAX");
    assert_eq!(query.return_date_iso().as_deref(), Some("2025-12-08"));
}

#[tokio::test]
async fn test_filters_and_empty_state() {
    let state = state();
    let report = search(&state, &["-f", "LAX", "-t", "JFK", "--depart", "2025-12-01", "--max-price", "250"])
        .await
        .unwrap();
    let ids: Vec<_> = report.results.itineraries.iter().map(|i| i.outbound.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
    assert!(report.airlines.contains("AA"));

    let empty = search(&state, &["-f", "LAX", "-t", "JFK", "--depart", "2025-12-01", "--hide-stops", "0"])
        .await
        .unwrap();
    assert_eq!(empty.results.state, ResultsState::Empty);
    assert!(empty.fare_tiers.is_empty());
}

#[tokio::test]
async fn test_invalid_query_never_reaches_listings() {
    let state = state();
    let result = search(&state, &["-f", "LAX", "-t", "lax", "--depart", "2025-12-01"]).await;
    assert!(matches!(result, Err(CommandError::Validation(_))));

    let result = search(&state, &["-f", "LAX", "-t", "JFK"]).await;
    assert!(matches!(result, Err(CommandError::Validation(_))));

    assert!(commands::recent(&state).await.is_empty());
}

#[tokio::test]
async fn test_recent_and_replay_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.json");
    let state = AppState::new(
        Arc::new(FixtureOfferRetriever::new(listings())),
        Arc::new(FileRecentSearchStore::new(&path)),
        12,
    );

    search(&state, &["-f", "LAX", "-t", "JFK", "--depart", "2025-12-01"]).await.unwrap();
    search(&state, &["-f", "LAX", "-t", "BOS", "--depart", "2025-12-03"]).await.unwrap();
    search(&state, &["-f", "LAX", "-t", "JFK", "--depart", "2025-12-01"]).await.unwrap();

    let recent = commands::recent(&state).await;
    let destinations: Vec<_> = recent.iter().map(|e| e.query.destination()).collect();
    assert_eq!(destinations, vec!["JFK", "BOS"]);

    let output = commands::run(&state, command(&["replay", "1", "--sort", "cheapest"])).await.unwrap();
    assert_eq!(output["query"]["destination"], "BOS");
    assert_eq!(output["results"]["state"], "READY");

    let recent = commands::recent(&state).await;
    assert_eq!(recent[0].query.destination(), "BOS");

    let missing = commands::run(&state, command(&["replay", "4"])).await;
    assert!(matches!(missing, Err(CommandError::NoSuchRecentSearch(4))));
}

#[tokio::test]
async fn test_invalid_stored_search_is_never_replayed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recent.json");
    std::fs::write(
        &path,
        r#"[
            {
                "query": {
                    "origin": "LAX", "destination": "LAX", "departure_date": "2025-12-08",
                    "return_date": "2025-12-01", "pax": { "adults": 0 }, "trip_type": "ONE_WAY"
                },
                "timestamp": "2025-11-02T10:00:00Z"
            },
            {
                "query": {
                    "origin": "LAX", "destination": "BOS", "departure_date": "2025-12-03",
                    "pax": { "adults": 1 }, "cabin_class": "ECONOMY", "trip_type": "ONE_WAY"
                },
                "timestamp": "2025-11-01T10:00:00Z"
            }
        ]"#,
    )
    .unwrap();
    let state = AppState::new(
        Arc::new(FixtureOfferRetriever::new(listings())),
        Arc::new(FileRecentSearchStore::new(&path)),
        12,
    );

    let recent = commands::recent(&state).await;
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].query.destination(), "BOS");

    let output = commands::run(&state, command(&["replay", "0"])).await.unwrap();
    assert_eq!(output["query"]["origin"], "LAX");
    assert_eq!(output["query"]["destination"], "BOS");
    assert_eq!(output["query"]["pax"]["adults"], 1);

    let missing = commands::run(&state, command(&["replay", "1"])).await;
    assert!(matches!(missing, Err(CommandError::NoSuchRecentSearch(1))));
}

#[tokio::test]
async fn test_deals_board() {
    let state = state();
    let output = commands::run(&state, command(&["deals", "--origin", "lax"])).await.unwrap();

    assert_eq!(output["origin"], "LAX");
    let buckets = output["buckets"].as_array().unwrap();
    // Cheapest per destination, ascending
    let prices: Vec<f64> = buckets.iter().map(|b| b["price"].as_f64().unwrap()).collect();
    assert_eq!(prices, vec![89.0, 150.0, 200.0]);
    assert_eq!(output["ceiling"], 200.0);

    let limited = commands::deals(&state, "LAX", Some(2)).await.unwrap();
    assert_eq!(limited.ceiling, Some(150.0));
}

struct Unavailable;

#[async_trait]
impl OfferRetriever for Unavailable {
    async fn search(&self, _request: &RetrievalRequest) -> Result<RetrievalResponse, BoxError> {
        Err("listings service timed out".into())
    }

    async fn deals(&self, _request: &DealsRequest) -> Result<Vec<Offer>, BoxError> {
        Err("listings service timed out".into())
    }
}

#[tokio::test]
async fn test_retrieval_failure_is_reported() {
    let state = AppState::new(Arc::new(Unavailable), Arc::new(InMemoryRecentSearchStore::new()), 12);

    let result = search(&state, &["-f", "LAX", "-t", "JFK", "--depart", "2025-12-01"]).await;
    match result {
        Err(CommandError::Retrieval(failure)) => assert!(failure.message.contains("timed out")),
        other => panic!("expected retrieval failure, got {:?}", other.map(|r| r.outcome)),
    }
    assert!(commands::recent(&state).await.is_empty());

    assert!(commands::deals(&state, "LAX", None).await.is_err());
}
