//! Replace the rule-section table with a JSON corpus

mod handler;

pub use handler::handle_rules_command;

use std::path::PathBuf;

use clap::Args;

use super::SyncArgs;

#[derive(Args, Debug, Clone)]
pub struct RulesCommands {
    /// Rule-sections JSON file (an array of section objects)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Target table
    #[arg(long, value_name = "NAME")]
    pub table: Option<String>,

    /// Append instead of deleting the existing rows first
    #[arg(long)]
    pub keep_existing: bool,

    #[command(flatten)]
    pub sync: SyncArgs,
}
