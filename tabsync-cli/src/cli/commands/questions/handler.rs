//! Questions command handler

use anyhow::Result;
use colored::*;

use super::QuestionsCommands;
use crate::api::sheets::SheetSink;
use crate::cli::commands::dry_run;
use crate::config::{CredentialSource, FileConfig, SyncConfig, ValueMode};
use crate::sync::{BulkSync, RecordSet, presets, report};

/// Load, sort and write every question, one row each
pub async fn handle_questions_command(
    args: QuestionsCommands,
    file_config: &FileConfig,
) -> Result<()> {
    let source = args
        .file
        .clone()
        .unwrap_or_else(|| file_config.inputs.questions.clone());
    let layout = args.sync.layout(presets::questions_sheet)?;
    let batch_size = args.sync.batch_size(file_config);

    let load = || -> Result<RecordSet> {
        let mut set = RecordSet::from_array_file(&source)?;
        set.sort_by_key_field(presets::QUESTION_KEY);
        Ok(set)
    };

    if args.sync.dry_run {
        let target = format!("sheet '{}'", args.sheet.sheet_name(&file_config.sheets));
        return dry_run(&layout, load, &target, batch_size, args.sheet.clear).await;
    }

    let (target, credentials_file) = args.sheet.resolve(&file_config.sheets)?;
    let config = SyncConfig::new(
        target.spreadsheet_id.clone(),
        CredentialSource::ServiceAccountFile(credentials_file),
    )
    .batch_size(batch_size)
    .value_mode(ValueMode::Raw)
    .clear_before_upload(args.sheet.clear);

    println!(
        "Writing questions from {} to sheet '{}'",
        source.display().to_string().cyan(),
        target.sheet_name.cyan()
    );

    let run = BulkSync::new(&config, &layout)
        .execute(load, |credentials| {
            SheetSink::connect(credentials, &target, config.value_mode, &layout)
        })
        .await?;

    report(&run.outcome, None).print();
    println!("Spreadsheet: {}", run.sink.web_url().cyan());
    Ok(())
}
