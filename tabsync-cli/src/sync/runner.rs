//! The bulk replace-sync pipeline
//!
//! resolve credentials → load records → connect → [clear] → project → batch → upload
//!
//! Everything before the first sink call is fatal; everything after it is
//! counted and logged, and never stops the remaining batches.

use std::future::Future;

use anyhow::Result;

use super::{BatchFailure, ClearStatus, RecordSet, RowLayout, Sink, SyncOutcome, chunk_rows};
use crate::config::{Credentials, SyncConfig};

/// Longest error text kept per failed batch
pub const MAX_ERROR_CHARS: usize = 200;

/// Everything a finished run hands back to its caller
pub struct SyncRun<S> {
    pub sink: S,
    pub records: RecordSet,
    pub outcome: SyncOutcome,
}

/// Syncs a record set into a sink through a fixed layout
pub struct BulkSync<'a> {
    config: &'a SyncConfig,
    layout: &'a RowLayout,
}

impl<'a> BulkSync<'a> {
    pub fn new(config: &'a SyncConfig, layout: &'a RowLayout) -> Self {
        Self { config, layout }
    }

    /// Run the whole pipeline
    ///
    /// Credentials are resolved and the source is loaded before `connect` is
    /// called, so a pre-flight failure never reaches the sink.
    pub async fn execute<S, L, C, F>(&self, load: L, connect: C) -> Result<SyncRun<S>>
    where
        S: Sink,
        L: FnOnce() -> Result<RecordSet>,
        C: FnOnce(Credentials) -> F,
        F: Future<Output = Result<S>>,
    {
        let credentials = self.config.credential_source.resolve()?;
        let records = load()?;
        log::info!(
            "Loaded {} records for {} ({})",
            records.len(),
            self.config.sink_id,
            self.layout.name
        );
        if records.is_empty() {
            log::warn!(
                "Source has no records; only the clear step can change {}",
                self.config.sink_id
            );
        }

        let sink = connect(credentials).await?;
        let outcome = self.run(&sink, &records).await;

        Ok(SyncRun {
            sink,
            records,
            outcome,
        })
    }

    /// Clear (when configured), project and upload against an open sink
    pub async fn run<S: Sink>(&self, sink: &S, records: &RecordSet) -> SyncOutcome {
        let rows = self.layout.project_all(&records.records, &records.context);
        let mut outcome = SyncOutcome::new(rows.len());

        if self.config.clear_before_upload {
            log::info!("Clearing existing rows in {}", sink.describe());
            outcome.clear = match sink.clear().await {
                Ok(()) => ClearStatus::Cleared,
                Err(e) => {
                    let message = truncate_message(&format!("{:#}", e), MAX_ERROR_CHARS);
                    log::warn!(
                        "Clearing {} failed, uploading anyway: {}",
                        sink.describe(),
                        message
                    );
                    ClearStatus::Failed(message)
                }
            };
        }

        let batches = chunk_rows(&rows, self.config.batch_size);
        outcome.batches = batches.len();
        let total_batches = batches.len();

        for batch in batches {
            match sink.write_batch(&batch).await {
                Ok(receipt) => {
                    outcome.record_success(batch.len(), receipt.updated_cells);
                    log::info!(
                        "Progress: {}/{} ({}%)",
                        outcome.succeeded,
                        outcome.total,
                        outcome.succeeded * 100 / outcome.total.max(1)
                    );
                }
                Err(e) => {
                    let message = truncate_message(&format!("{:#}", e), MAX_ERROR_CHARS);
                    log::error!(
                        "Batch {}/{} (rows {}) failed: {}",
                        batch.index + 1,
                        total_batches,
                        batch.row_range(),
                        message
                    );
                    outcome.record_failure(BatchFailure {
                        index: batch.index,
                        rows: batch.row_range(),
                        size: batch.len(),
                        message,
                    });
                }
            }
        }

        if outcome.is_complete() {
            log::info!("All {} rows written to {}", outcome.total, sink.describe());
        } else {
            log::warn!(
                "{} of {} rows were not written to {} ({} failed batch(es))",
                outcome.failed,
                outcome.total,
                sink.describe(),
                outcome.failures.len()
            );
        }

        outcome
    }
}

/// Cut a message to at most `max_chars` characters
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CredentialSource, ValueMode};
    use crate::sync::{Batch, Cell, Column, ColumnRule, Record, Row, WriteReceipt};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear,
        Write { index: usize, rows: Vec<Row> },
    }

    /// Records every call; fails the batches and clear it is told to
    #[derive(Clone, Default)]
    struct SpySink {
        calls: Arc<Mutex<Vec<Call>>>,
        failing_batches: Vec<usize>,
        fail_clear: bool,
    }

    impl SpySink {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Sink for SpySink {
        fn describe(&self) -> String {
            "spy".to_string()
        }

        async fn clear(&self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Clear);
            if self.fail_clear {
                anyhow::bail!("permission denied");
            }
            Ok(())
        }

        async fn write_batch(&self, batch: &Batch<'_>) -> Result<WriteReceipt> {
            self.calls.lock().unwrap().push(Call::Write {
                index: batch.index,
                rows: batch.rows.to_vec(),
            });
            if self.failing_batches.contains(&batch.index) {
                anyhow::bail!("HTTP 400: invalid input syntax for batch {}", batch.index);
            }
            Ok(WriteReceipt {
                updated_cells: Some(batch.len()),
            })
        }
    }

    fn layout() -> RowLayout {
        RowLayout::new(
            "test",
            vec![
                Column::new("n", ColumnRule::field("n")),
                Column::new("grade", ColumnRule::grade_score("grade")),
            ],
        )
    }

    fn records(n: usize) -> RecordSet {
        RecordSet::new(
            (0..n)
                .map(|i| json!({"n": i}).as_object().unwrap().clone())
                .collect::<Vec<Record>>(),
        )
    }

    fn config(batch_size: usize, clear: bool) -> SyncConfig {
        SyncConfig {
            sink_id: "test".to_string(),
            // Resolution never touches the environment for this source
            credential_source: CredentialSource::None,
            batch_size,
            value_mode: ValueMode::Raw,
            clear_before_upload: clear,
        }
    }

    fn writes(calls: &[Call]) -> Vec<usize> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::Write { index, .. } => Some(*index),
                Call::Clear => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_failed_middle_batch_does_not_stop_later_batches() {
        let config = config(10, false);
        let layout = layout();
        let sink = SpySink {
            failing_batches: vec![1],
            ..SpySink::default()
        };

        let outcome = BulkSync::new(&config, &layout).run(&sink, &records(25)).await;

        assert_eq!(writes(&sink.calls()), vec![0, 1, 2]);
        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.succeeded, 15);
        assert_eq!(outcome.failed, 10);
        assert_eq!(outcome.updated_cells, Some(15));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].rows, "11-20");
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn test_batches_reproduce_projected_order() {
        let config = config(4, false);
        let layout = layout();
        let set = records(10);
        let sink = SpySink::default();

        BulkSync::new(&config, &layout).run(&sink, &set).await;

        let sent: Vec<Row> = sink
            .calls()
            .into_iter()
            .flat_map(|c| match c {
                Call::Write { rows, .. } => rows,
                Call::Clear => vec![],
            })
            .collect();
        assert_eq!(sent, layout.project_all(&set.records, &set.context));
        assert_eq!(sent[9][0], Cell::Int(9));
    }

    #[tokio::test]
    async fn test_clear_runs_once_before_any_write() {
        let config = config(2, true);
        let layout = layout();
        let sink = SpySink {
            failing_batches: vec![0, 2],
            ..SpySink::default()
        };

        let outcome = BulkSync::new(&config, &layout).run(&sink, &records(6)).await;

        let calls = sink.calls();
        assert_eq!(calls[0], Call::Clear);
        assert_eq!(calls.iter().filter(|c| **c == Call::Clear).count(), 1);
        assert_eq!(writes(&calls), vec![0, 1, 2]);
        assert_eq!(outcome.clear, ClearStatus::Cleared);
        assert_eq!(outcome.failed, 4);
    }

    #[tokio::test]
    async fn test_failed_clear_still_uploads() {
        let config = config(100, true);
        let layout = layout();
        let sink = SpySink {
            fail_clear: true,
            ..SpySink::default()
        };

        let outcome = BulkSync::new(&config, &layout).run(&sink, &records(3)).await;

        assert!(matches!(
            outcome.clear,
            ClearStatus::Failed(ref m) if m.contains("permission denied")
        ));
        assert_eq!(outcome.succeeded, 3);
        assert_eq!(writes(&sink.calls()), vec![0]);
    }

    #[tokio::test]
    async fn test_clear_skipped_when_not_configured() {
        let config = config(100, false);
        let layout = layout();
        let sink = SpySink::default();

        let outcome = BulkSync::new(&config, &layout).run(&sink, &records(1)).await;

        assert_eq!(outcome.clear, ClearStatus::Skipped);
        assert!(!sink.calls().contains(&Call::Clear));
    }

    #[tokio::test]
    async fn test_missing_environment_aborts_before_sink() {
        let mut config = config(100, true);
        config.credential_source = CredentialSource::Environment {
            url_var: "TABSYNC_TEST_UNSET_URL_418".to_string(),
            key_var: "TABSYNC_TEST_UNSET_KEY_418".to_string(),
        };
        let layout = layout();
        let sink = SpySink::default();
        let spy = sink.clone();
        let mut loaded = false;

        let result = BulkSync::new(&config, &layout)
            .execute(
                || {
                    loaded = true;
                    Ok(records(5))
                },
                |_| async move { Ok(sink) },
            )
            .await;

        let err = result.err().expect("missing variables must be fatal");
        assert!(err.to_string().contains("TABSYNC_TEST_UNSET_URL_418"));
        assert!(!loaded);
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_file_aborts_before_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(100, false);
        config.credential_source =
            CredentialSource::ServiceAccountFile(dir.path().join("missing-key.json"));
        let layout = layout();
        let sink = SpySink::default();
        let spy = sink.clone();

        let result = BulkSync::new(&config, &layout)
            .execute(|| Ok(records(5)), |_| async move { Ok(sink) })
            .await;

        assert!(result.is_err());
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_source_aborts_before_sink() {
        let config = config(100, true);
        let layout = layout();
        let sink = SpySink::default();
        let spy = sink.clone();

        let result = BulkSync::new(&config, &layout)
            .execute(
                || Err(anyhow::anyhow!("Failed to parse JSON")),
                |_| async move { Ok(sink) },
            )
            .await;

        assert!(result.is_err());
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_execute_returns_sink_and_records() {
        let config = config(2, false);
        let layout = layout();

        let run = BulkSync::new(&config, &layout)
            .execute(|| Ok(records(3)), |_| async { Ok(SpySink::default()) })
            .await
            .unwrap();

        assert_eq!(run.records.len(), 3);
        assert_eq!(run.outcome.succeeded, 3);
        assert_eq!(writes(&run.sink.calls()), vec![0, 1]);
    }

    #[test]
    fn test_truncate_message_is_char_safe() {
        assert_eq!(truncate_message("short", 200), "short");
        let long = "エ".repeat(250);
        let cut = truncate_message(&long, 200);
        assert_eq!(cut.chars().count(), 203);
        assert!(cut.ends_with("..."));
    }
}
