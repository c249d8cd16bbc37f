//! Rules command handler

use anyhow::Result;
use colored::*;

use super::RulesCommands;
use crate::api::supabase::{Filter, TableSink};
use crate::cli::commands::dry_run;
use crate::config::{CredentialSource, FileConfig, SyncConfig};
use crate::sync::{BulkSync, RecordSet, presets, report};

/// Delete everything in the table, then insert the corpus in batches
pub async fn handle_rules_command(args: RulesCommands, file_config: &FileConfig) -> Result<()> {
    let source = args
        .file
        .clone()
        .unwrap_or_else(|| file_config.inputs.rules.clone());
    let layout = args.sync.layout(presets::rules_table)?;
    let batch_size = args.sync.batch_size(file_config);
    let load = || RecordSet::from_array_file(&source);
    let table = args
        .table
        .clone()
        .unwrap_or_else(|| file_config.supabase.table.clone());
    let clear = !args.keep_existing;

    if args.sync.dry_run {
        let target = format!("table '{}'", table);
        return dry_run(&layout, load, &target, batch_size, clear).await;
    }

    let config = SyncConfig::new(
        table.clone(),
        CredentialSource::environment(&file_config.supabase.url_env, &file_config.supabase.key_env),
    )
    .batch_size(batch_size)
    .clear_before_upload(clear);

    println!(
        "Uploading rule sections from {} to table '{}'",
        source.display().to_string().cyan(),
        table.cyan()
    );

    let run = BulkSync::new(&config, &layout)
        .execute(load, |credentials| {
            std::future::ready(TableSink::connect(credentials, table.as_str(), &layout))
        })
        .await?;

    report(&run.outcome, None).print();
    print_table_statistics(&run.sink).await;
    Ok(())
}

/// Row counts after the upload; failures are warnings
async fn print_table_statistics(sink: &TableSink) {
    let queries = [
        ("Total rows", vec![]),
        ("Part 1 (rules)", vec![Filter::eq("part", 1)]),
        ("Part 2 (interpretations)", vec![Filter::eq("part", 2)]),
        ("Split sections", vec![Filter::eq("is_split", true)]),
    ];

    println!();
    println!("{}", format!("Statistics for '{}':", sink.table()).bold());
    for (label, filters) in queries {
        match sink.count(&filters).await {
            Ok(count) => println!("  {}: {}", label, count.to_string().cyan()),
            Err(e) => log::warn!("Could not count {}: {:#}", label.to_lowercase(), e),
        }
    }
}
