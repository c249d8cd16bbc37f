//! Write the quiz questions into the result sheet

mod handler;

pub use handler::handle_questions_command;

use std::path::PathBuf;

use clap::Args;

use super::{SheetArgs, SyncArgs};

#[derive(Args, Debug, Clone)]
pub struct QuestionsCommands {
    /// Questions JSON file (an array of question objects)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    #[command(flatten)]
    pub sheet: SheetArgs,

    #[command(flatten)]
    pub sync: SyncArgs,
}
