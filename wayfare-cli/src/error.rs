use wayfare_core::{RetrievalFailure, ValidationFailure};
use wayfare_offer::DealsError;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Invalid search: {0}")]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Retrieval(#[from] RetrievalFailure),

    #[error(transparent)]
    Deals(#[from] DealsError),

    #[error("Invalid date {0:?}: expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate(String),

    #[error("No recent search at position {0}")]
    NoSuchRecentSearch(usize),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}
