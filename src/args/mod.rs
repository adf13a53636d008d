//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;


pub use cli::{AggregateArgs, Command, CommanderArgs, RunArgs};
pub use parsers::parse_duration_arg;
