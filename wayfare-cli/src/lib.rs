pub mod cli;
pub mod commands;
pub mod error;
pub mod state;

pub use cli::{Cli, Command};
pub use error::CommandError;
pub use state::AppState;
