//! Partitioning rows into upload batches

use super::Row;

/// Default rows per upload call
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// A contiguous slice of rows sent in one write
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Batch<'a> {
    /// Zero-based batch number
    pub index: usize,
    /// Position of the first row within the full row list
    pub offset: usize,
    pub rows: &'a [Row],
}

impl Batch<'_> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// One-based, inclusive row range for display (e.g. "101-200")
    pub fn row_range(&self) -> String {
        format!("{}-{}", self.offset + 1, self.offset + self.rows.len())
    }
}

/// Split rows into batches of `batch_size` in source order
///
/// A batch size of 0 sends everything in one batch.
pub fn chunk_rows(rows: &[Row], batch_size: usize) -> Vec<Batch<'_>> {
    let batch_size = if batch_size == 0 {
        rows.len().max(1)
    } else {
        batch_size
    };

    rows.chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| Batch {
            index,
            offset: index * batch_size,
            rows: chunk,
        })
        .collect()
}
