//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - An [`Execute`] implementation producing an [`Outputable`] result

mod compile;
mod derive;

pub use compile::CompileCmd;
pub use derive::DeriveCmd;

use clap::Subcommand;
use std::error::Error;

use crate::config::ConfigFile;
use crate::output::{OutputFormat, Outputable};

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, config: &ConfigFile) -> Result<Self::Output, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile a derived repository method name into a statement
    Derive(DeriveCmd),

    /// Compile a JSON request file (predicate tree or derived method)
    Compile(CompileCmd),
}

impl Command {
    /// Execute the command and return formatted output
    pub fn run(self, config: &ConfigFile, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        match self {
            Command::Derive(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
            Command::Compile(cmd) => {
                let result = cmd.execute(config)?;
                Ok(result.format(format))
            }
        }
    }
}
