//! The remote tabular store a sync writes into

use anyhow::Result;
use async_trait::async_trait;

use super::Batch;

/// What a sink reports back for one successful write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReceipt {
    /// Cells the remote side reports as updated, when it reports them
    pub updated_cells: Option<usize>,
}

/// A spreadsheet or table that accepts batched row writes
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short description for logs (e.g. "sheet テスト結果")
    fn describe(&self) -> String;

    /// Delete every existing row
    async fn clear(&self) -> Result<()>;

    /// Write one batch in a single call
    async fn write_batch(&self, batch: &Batch<'_>) -> Result<WriteReceipt>;
}
