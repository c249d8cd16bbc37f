//! Patch result-sheet rows with an evaluation run

mod handler;

pub use handler::handle_results_command;

use std::path::PathBuf;

use clap::Args;

use super::{SheetArgs, SyncArgs};
use crate::sync::{RowLayout, presets};

#[derive(Args, Debug, Clone)]
pub struct ResultsCommands {
    /// Evaluation output JSON (an envelope with a `results` array)
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    #[command(flatten)]
    pub sheet: SheetArgs,

    #[command(flatten)]
    pub sync: SyncArgs,
}

/// Which evaluation columns get written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsVariant {
    /// Answer, judgement, confidence, score, time, timestamp
    Evaluation,
    /// Adds references, reasoning and the derived grade score
    Reasoning,
}

impl ResultsVariant {
    /// Built-in layout whose judgement formula points at rows from `first_row`
    pub fn builtin_layout(self, first_row: usize) -> RowLayout {
        match self {
            ResultsVariant::Evaluation => presets::results_sheet(first_row),
            ResultsVariant::Reasoning => presets::reasoning_sheet(first_row),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ResultsVariant::Evaluation => "results",
            ResultsVariant::Reasoning => "results with reasoning",
        }
    }
}
