//! Aggregate outcome of a sync run and its printed summary

use colored::*;

/// Result of the optional clear step
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClearStatus {
    #[default]
    Skipped,
    Cleared,
    /// Clear failed; the upload went ahead against possibly stale rows
    Failed(String),
}

/// One batch that could not be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    /// One-based inclusive row range (e.g. "101-200")
    pub rows: String,
    pub size: usize,
    /// Error text, truncated
    pub message: String,
}

/// Counters accumulated over one run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncOutcome {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batches: usize,
    pub clear: ClearStatus,
    pub failures: Vec<BatchFailure>,
    /// Sum of cells the sink reported as updated, if it reports them
    pub updated_cells: Option<usize>,
}

impl SyncOutcome {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.succeeded == self.total
    }

    pub(crate) fn record_success(&mut self, rows: usize, updated_cells: Option<usize>) {
        self.succeeded += rows;
        if let Some(cells) = updated_cells {
            *self.updated_cells.get_or_insert(0) += cells;
        }
    }

    pub(crate) fn record_failure(&mut self, failure: BatchFailure) {
        self.failed += failure.size;
        self.failures.push(failure);
    }
}

/// Printable summary of a run
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub total: usize,
    pub updated_cells: Option<usize>,
    /// Accuracy percentage supplied by the caller, never computed here
    pub accuracy: Option<f64>,
    pub clear: ClearStatus,
    pub failed_batches: Vec<BatchFailure>,
}

/// Build the summary for a finished run
pub fn report(outcome: &SyncOutcome, accuracy: Option<f64>) -> SyncSummary {
    SyncSummary {
        succeeded: outcome.succeeded,
        failed: outcome.failed,
        total: outcome.total,
        updated_cells: outcome.updated_cells,
        accuracy,
        clear: outcome.clear.clone(),
        failed_batches: outcome.failures.clone(),
    }
}

impl SyncSummary {
    /// Plain summary lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Uploaded: {}/{} rows", self.succeeded, self.total),
            format!("Failed:   {} rows", self.failed),
        ];

        if let Some(cells) = self.updated_cells {
            lines.push(format!("Updated cells: {}", cells));
        }
        if let Some(accuracy) = self.accuracy {
            lines.push(format!("Accuracy: {:.2}%", accuracy));
        }
        if let ClearStatus::Failed(ref message) = self.clear {
            lines.push(format!("Clear failed (existing rows kept): {}", message));
        }
        for failure in &self.failed_batches {
            lines.push(format!(
                "Batch {} (rows {}) failed: {}",
                failure.index + 1,
                failure.rows,
                failure.message
            ));
        }

        lines
    }

    /// Print the summary to stdout
    pub fn print(&self) {
        let rule = "=".repeat(60);
        println!();
        println!("{}", rule.dimmed());

        let uploaded = format!("Uploaded: {}/{} rows", self.succeeded, self.total);
        if self.failed == 0 {
            println!("{}", uploaded.bright_green().bold());
        } else {
            println!("{}", uploaded.yellow().bold());
            println!("{}", format!("Failed:   {} rows", self.failed).red());
        }

        // Everything past the two count lines prints as-is
        for line in self.lines().into_iter().skip(2) {
            println!("{}", line);
        }
        println!("{}", rule.dimmed());
    }
}
