//! # Commands
//!
//! Subcommands exposed by the `sheet_sql` binary.
use thiserror::Error;

pub mod generate;

pub use generate::GenerateCommand;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Missing required argument '-{0}=<value>'")]
    MissingArgument(String),
}
