use clap::{Args, Parser, Subcommand};
use wayfare_offer::{DepartureWindow, FilterState, SortMode, StopsBucket};

#[derive(Debug, Parser)]
#[command(name = "wayfare", version, about = "Compose, filter and rank flight search results", rename_all = "kebab")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
    /// Run a flight search and print the composed result list
    Search(SearchArgs),
    /// Cheapest destinations from an origin
    Deals {
        #[arg(long, short = 'o', value_name = "IATA")]
        origin: String,
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },
    /// List remembered searches, newest first
    Recent,
    /// Run a remembered search again
    Replay {
        /// Position in the recent list, 0 is newest
        index: usize,
        #[command(flatten)]
        view: ViewArgs,
    },
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long, short = 'f', value_name = "IATA")]
    pub from: String,
    #[arg(long, short = 't', value_name = "IATA")]
    pub to: String,
    /// YYYY-MM-DD, or an RFC 3339 timestamp whose local date is used
    #[arg(long, value_name = "DATE")]
    pub depart: Option<String>,
    #[arg(long = "return", value_name = "DATE")]
    pub return_date: Option<String>,
    /// Implied by --return
    #[arg(long)]
    pub round_trip: bool,
    #[arg(long, default_value = "economy")]
    pub cabin: String,
    #[arg(long, default_value_t = 1)]
    pub adults: u32,
    #[arg(long, default_value_t = 0)]
    pub children: u32,
    #[arg(long, default_value_t = 0)]
    pub infants: u32,
    #[command(flatten)]
    pub view: ViewArgs,
}

/// Filter and sort selection applied on top of a fresh result set.
#[derive(Debug, Args, Clone, Default)]
pub struct ViewArgs {
    #[arg(long, default_value_t = SortMode::Best)]
    pub sort: SortMode,
    #[arg(long, value_name = "PRICE")]
    pub max_price: Option<f64>,
    /// 0, 1 or 2+; repeatable
    #[arg(long = "hide-stops", value_name = "STOPS", value_parser = parse_stops)]
    pub hide_stops: Vec<StopsBucket>,
    /// night, morning, afternoon or evening; repeatable
    #[arg(long = "hide-window", value_name = "WINDOW", value_parser = parse_window)]
    pub hide_windows: Vec<DepartureWindow>,
    /// Only show these airlines; repeatable
    #[arg(long = "airline", value_name = "CODE")]
    pub airlines: Vec<String>,
}

impl ViewArgs {
    pub fn apply(&self, base: FilterState) -> FilterState {
        let filter = self.hide_stops.iter().copied().fold(base, FilterState::toggle_stops);
        let filter = self.hide_windows.iter().copied().fold(filter, FilterState::toggle_window);
        let filter = self
            .airlines
            .iter()
            .fold(filter, |filter, airline| filter.toggle_airline(&airline.trim().to_ascii_uppercase()));

        match self.max_price {
            Some(max) => filter.with_price_max(Some(max)),
            None => filter,
        }
    }
}

fn parse_stops(raw: &str) -> Result<StopsBucket, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "0" | "nonstop" | "non-stop" => Ok(StopsBucket::NonStop),
        "1" => Ok(StopsBucket::OneStop),
        "2" | "2+" => Ok(StopsBucket::TwoPlus),
        other => Err(format!("expected 0, 1 or 2+, got {:?}", other)),
    }
}

fn parse_window(raw: &str) -> Result<DepartureWindow, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "night" => Ok(DepartureWindow::Night),
        "morning" => Ok(DepartureWindow::Morning),
        "afternoon" => Ok(DepartureWindow::Afternoon),
        "evening" => Ok(DepartureWindow::Evening),
        other => Err(format!("unknown departure window {:?}", other)),
    }
}
