//! Results and reasoning command handler

use anyhow::Result;
use colored::*;

use super::{ResultsCommands, ResultsVariant};
use crate::api::sheets::SheetSink;
use crate::cli::commands::dry_run;
use crate::config::{CredentialSource, FileConfig, SyncConfig, ValueMode};
use crate::sync::{BulkSync, RecordSet, report};

/// Key of the records array inside an evaluation envelope
const RESULTS_KEY: &str = "results";
/// Envelope field holding the run's accuracy percentage
const ACCURACY_KEY: &str = "accuracy_rate";

/// Patch one row per evaluated question; user-entered so formulas evaluate
pub async fn handle_results_command(
    args: ResultsCommands,
    variant: ResultsVariant,
    file_config: &FileConfig,
) -> Result<()> {
    let first_row = args.sheet.first_row(&file_config.sheets)?;
    let layout = args.sync.layout(|| variant.builtin_layout(first_row))?;
    let batch_size = args.sync.batch_size(file_config);
    let load = || RecordSet::from_envelope_file(&args.file, RESULTS_KEY);

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
    .value_mode(ValueMode::UserEntered)
    .clear_before_upload(args.sheet.clear);

    println!(
        "Writing {} from {} to sheet '{}'",
        variant.label(),
        args.file.display().to_string().cyan(),
        target.sheet_name.cyan()
    );

    let run = BulkSync::new(&config, &layout)
        .execute(load, |credentials| {
            SheetSink::connect(credentials, &target, config.value_mode, &layout)
        })
        .await?;

    let accuracy = run.records.context_f64(ACCURACY_KEY);
    if accuracy.is_none() {
        log::debug!("No '{}' in {}", ACCURACY_KEY, args.file.display());
    }

    report(&run.outcome, accuracy).print();
    println!("Spreadsheet: {}", run.sink.web_url().cyan());
    Ok(())
}
