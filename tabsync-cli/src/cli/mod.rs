//! Command-line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::FileConfig;
use commands::questions::QuestionsCommands;
use commands::results::{ResultsCommands, ResultsVariant};
use commands::rules::RulesCommands;

#[derive(Parser, Debug)]
#[command(
    name = "tabsync",
    version,
    about = "Bulk replace-sync of local JSON records into Google Sheets and Supabase tables"
)]
pub struct Cli {
    /// Config file (default: <config dir>/tabsync/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the quiz questions into the result sheet
    Questions(QuestionsCommands),
    /// Patch result-sheet rows with an evaluation run
    Results(ResultsCommands),
    /// Patch result-sheet rows with an evaluation run, including references and reasoning
    Reasoning(ResultsCommands),
    /// Replace the rule-section table with a JSON corpus
    Rules(RulesCommands),
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let file_config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Questions(args) => {
            commands::questions::handle_questions_command(args, &file_config).await
        }
        Commands::Results(args) => {
            let variant = ResultsVariant::Evaluation;
            commands::results::handle_results_command(args, variant, &file_config).await
        }
        Commands::Reasoning(args) => {
            let variant = ResultsVariant::Reasoning;
            commands::results::handle_results_command(args, variant, &file_config).await
        }
        Commands::Rules(args) => commands::rules::handle_rules_command(args, &file_config).await,
    }
}
