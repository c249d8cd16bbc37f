//! Command implementations and their shared arguments

pub mod questions;
pub mod results;
pub mod rules;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use colored::*;

use crate::api::sheets::SheetTarget;
use crate::config::{CredentialSource, FileConfig, SheetsSection, SyncConfig};
use crate::sync::{Batch, BulkSync, RecordSet, RowLayout, Sink, WriteReceipt};

/// Options every sync command accepts
#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Rows per upload call (0 = everything in one call)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// TOML layout file replacing the built-in column layout
    #[arg(long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Project and print rows without credentials or network calls
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn batch_size(&self, file_config: &FileConfig) -> usize {
        self.batch_size.unwrap_or(file_config.sync.batch_size)
    }

    /// The `--layout` file, or the built-in layout
    pub fn layout(&self, builtin: impl FnOnce() -> RowLayout) -> Result<RowLayout> {
        match self.layout {
            Some(ref path) => {
                let layout = RowLayout::from_toml_file(path)?;
                log::info!("Using layout '{}' from {}", layout.name, path.display());
                Ok(layout)
            }
            None => Ok(builtin()),
        }
    }
}

/// Options of the spreadsheet commands
#[derive(Args, Debug, Clone, Default)]
pub struct SheetArgs {
    /// Target spreadsheet id
    #[arg(long, value_name = "ID")]
    pub spreadsheet_id: Option<String>,

    /// Sheet (tab) name
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,

    /// First data row (row 1 holds headers)
    #[arg(long, value_name = "ROW")]
    pub first_row: Option<usize>,

    /// Service-account key file
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// Clear the layout's columns before writing
    #[arg(long)]
    pub clear: bool,
}

impl SheetArgs {
    /// First data row, `--first-row` over the config file
    pub fn first_row(&self, section: &SheetsSection) -> Result<usize> {
        let first_row = self.first_row.unwrap_or(section.first_row);
        if first_row == 0 {
            anyhow::bail!("Rows are numbered from 1; --first-row 0 is invalid");
        }
        Ok(first_row)
    }

    pub fn sheet_name(&self, section: &SheetsSection) -> String {
        self.sheet.clone().unwrap_or_else(|| section.sheet_name.clone())
    }

    /// Merge flags over the config file
    pub fn resolve(&self, section: &SheetsSection) -> Result<(SheetTarget, PathBuf)> {
        let spreadsheet_id = self
            .spreadsheet_id
            .clone()
            .or_else(|| section.spreadsheet_id.clone())
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "No spreadsheet id. Pass --spreadsheet-id or set [sheets] spreadsheet_id in the config file"
                )
            })?;

        let target = SheetTarget {
            spreadsheet_id,
            sheet_name: self.sheet_name(section),
            first_row: self.first_row(section)?,
        };
        let credentials = self
            .credentials
            .clone()
            .unwrap_or_else(|| section.credentials_file.clone());

        Ok((target, credentials))
    }
}

/// Prints each batch instead of writing it
struct PreviewSink {
    target: String,
    header: String,
}

#[async_trait]
impl Sink for PreviewSink {
    fn describe(&self) -> String {
        format!("{} (dry run)", self.target)
    }

    async fn clear(&self) -> Result<()> {
        println!("{} {}", "Would clear".yellow(), self.target);
        Ok(())
    }

    async fn write_batch(&self, batch: &Batch<'_>) -> Result<WriteReceipt> {
        println!();
        println!(
            "{}",
            format!("Batch {} (rows {})", batch.index + 1, batch.row_range()).bold()
        );
        println!("{}", self.header.dimmed());
        for row in batch.rows {
            let cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            println!("{}", cells.join("\t"));
        }
        Ok(WriteReceipt::default())
    }
}

/// Run the pipeline against a printing sink: no credentials, no network
pub async fn dry_run<L>(
    layout: &RowLayout,
    load: L,
    target: &str,
    batch_size: usize,
    clear: bool,
) -> Result<()>
where
    L: FnOnce() -> Result<RecordSet>,
{
    let config = SyncConfig::new(target, CredentialSource::None)
        .batch_size(batch_size)
        .clear_before_upload(clear);
    let sink = PreviewSink {
        target: target.to_string(),
        header: layout.column_names().join("\t"),
    };

    let run = BulkSync::new(&config, layout)
        .execute(load, |_| std::future::ready(Ok(sink)))
        .await?;

    println!();
    println!(
        "{} {} rows in {} batch(es), layout '{}'; nothing was written",
        "Dry run:".yellow().bold(),
        run.outcome.total,
        run.outcome.batches,
        layout.name
    );
    Ok(())
}
