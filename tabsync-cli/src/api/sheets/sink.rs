//! Spreadsheet sink: one `values:batchUpdate` per batch

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use super::a1;
use super::client::SheetsClient;
use super::models::ValueRange;
use crate::config::{Credentials, ValueMode};
use crate::sync::{Batch, RowLayout, Sink, WriteReceipt};

/// Where rows land in the spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTarget {
    pub spreadsheet_id: String,
    pub sheet_name: String,
    /// Sheet row of the first data row (1-based)
    pub first_row: usize,
}

/// Run of adjacent spreadsheet columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based spreadsheet column of the first cell
    pub start_col: usize,
    /// Row positions (layout column indices) written into this segment, in order
    pub cells: Vec<usize>,
}

impl Segment {
    pub fn end_col(&self) -> usize {
        self.start_col + self.cells.len() - 1
    }
}

/// Group a layout's placed columns into contiguous segments
///
/// A new segment starts wherever the next column is not directly to the
/// right of the previous one (e.g. `D..K` then `O`).
pub fn segments_for_layout(layout: &RowLayout) -> Result<Vec<Segment>> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut seen = HashSet::new();

    for (position, column) in layout.columns.iter().enumerate() {
        let Some(ref letter) = column.sheet_column else {
            anyhow::bail!(
                "Column '{}' of layout '{}' has no spreadsheet column",
                column.name,
                layout.name
            );
        };
        let col = a1::column_index(letter)?;
        if !seen.insert(col) {
            anyhow::bail!(
                "Spreadsheet column {} is used twice in layout '{}'",
                letter,
                layout.name
            );
        }

        match segments.last_mut() {
            Some(segment) if segment.end_col() + 1 == col => segment.cells.push(position),
            _ => segments.push(Segment {
                start_col: col,
                cells: vec![position],
            }),
        }
    }

    if segments.is_empty() {
        anyhow::bail!("Layout '{}' has no columns", layout.name);
    }
    Ok(segments)
}

/// Value ranges for one batch, one per segment
pub fn value_ranges(
    target: &SheetTarget,
    segments: &[Segment],
    batch: &Batch<'_>,
) -> Vec<ValueRange> {
    let start_row = target.first_row + batch.offset;
    let end_row = start_row + batch.len() - 1;

    segments
        .iter()
        .map(|segment| {
            let values = batch
                .rows
                .iter()
                .map(|row| {
                    segment
                        .cells
                        .iter()
                        .map(|&i| row.get(i).map(|c| c.to_sheet_json()).unwrap_or_default())
                        .collect()
                })
                .collect();

            ValueRange::rows(
                a1::range(
                    &target.sheet_name,
                    segment.start_col,
                    start_row,
                    segment.end_col(),
                    end_row,
                ),
                values,
            )
        })
        .collect()
}

/// Ranges wiped by `clear`: every segment from the first data row down
pub fn clear_ranges(target: &SheetTarget, segments: &[Segment]) -> Vec<String> {
    segments
        .iter()
        .map(|s| a1::open_range(&target.sheet_name, s.start_col, target.first_row, s.end_col()))
        .collect()
}

pub struct SheetSink {
    client: SheetsClient,
    target: SheetTarget,
    value_mode: ValueMode,
    segments: Vec<Segment>,
}

impl SheetSink {
    /// Validate the layout, then authenticate
    pub async fn connect(
        credentials: Credentials,
        target: &SheetTarget,
        value_mode: ValueMode,
        layout: &RowLayout,
    ) -> Result<Self> {
        let segments = segments_for_layout(layout)?;
        let key = credentials.into_service_account()?;
        let client = SheetsClient::connect(&key, target.spreadsheet_id.clone()).await?;

        Ok(Self {
            client,
            target: target.clone(),
            value_mode,
            segments,
        })
    }

    pub fn web_url(&self) -> String {
        self.client.web_url()
    }
}

#[async_trait]
impl Sink for SheetSink {
    fn describe(&self) -> String {
        format!("sheet '{}' of {}", self.target.sheet_name, self.client.spreadsheet_id())
    }

    async fn clear(&self) -> Result<()> {
        self.client
            .batch_clear(clear_ranges(&self.target, &self.segments))
            .await
    }

    async fn write_batch(&self, batch: &Batch<'_>) -> Result<WriteReceipt> {
        let data = value_ranges(&self.target, &self.segments, batch);
        log::debug!(
            "Writing {}",
            data.iter().map(|d| d.range.as_str()).collect::<Vec<_>>().join(", ")
        );

        let response = self.client.batch_update(self.value_mode, data).await?;
        log::debug!(
            "Batch {} updated {} rows, {} cells",
            batch.index + 1,
            response.total_updated_rows.unwrap_or(0),
            response.total_updated_cells.unwrap_or(0)
        );
        Ok(WriteReceipt {
            updated_cells: response.total_updated_cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{Cell, Column, ColumnRule, chunk_rows, presets};
    use serde_json::json;

    fn target() -> SheetTarget {
        SheetTarget {
            spreadsheet_id: "sheet-id".to_string(),
            sheet_name: "テスト結果".to_string(),
            first_row: 2,
        }
    }

    #[test]
    fn test_reasoning_layout_splits_into_two_segments() {
        let segments = segments_for_layout(&presets::reasoning_sheet(2)).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].start_col, segments[0].end_col()), (3, 10));
        assert_eq!(segments[1], Segment { start_col: 14, cells: vec![8] });
    }

    #[test]
    fn test_questions_layout_is_one_segment() {
        let segments = segments_for_layout(&presets::questions_sheet()).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start_col, segments[0].end_col()), (0, 13));
    }

    #[test]
    fn test_unplaced_column_is_rejected() {
        let layout = RowLayout::new("bad", vec![Column::new("a", ColumnRule::Blank)]);
        assert!(segments_for_layout(&layout).is_err());
    }

    #[test]
    fn test_out_of_range_column_letter_is_rejected() {
        let layout = RowLayout::new(
            "bad",
            vec![Column::new("a", ColumnRule::Blank).at("ZZZZZZZZZZZZZZZZ")],
        );
        assert!(segments_for_layout(&layout).is_err());
    }

    #[test]
    fn test_duplicate_column_is_rejected() {
        let layout = RowLayout::new(
            "bad",
            vec![
                Column::new("a", ColumnRule::Blank).at("D"),
                Column::new("b", ColumnRule::Blank).at("D"),
            ],
        );
        assert!(segments_for_layout(&layout).is_err());
    }

    #[test]
    fn test_value_ranges_follow_batch_offset() {
        let layout = presets::results_sheet(2);
        let segments = segments_for_layout(&layout).unwrap();
        let rows: Vec<_> = (0..150)
            .map(|i| {
                let mut row = vec![Cell::Blank; layout.columns.len()];
                row[0] = Cell::Int(i);
                row[6] = Cell::text("2025-01-08");
                row
            })
            .collect();
        let batches = chunk_rows(&rows, 100);

        let first = value_ranges(&target(), &segments, &batches[0]);
        assert_eq!(first[0].range, "テスト結果!D2:I101");
        assert_eq!(first[1].range, "テスト結果!M2:M101");

        let second = value_ranges(&target(), &segments, &batches[1]);
        assert_eq!(second[0].range, "テスト結果!D102:I151");
        assert_eq!(second[0].values.len(), 50);
        assert_eq!(second[0].values[0][0], json!(100));
        assert_eq!(second[0].values[0][1], json!(""));
        assert_eq!(second[1].values[0], vec![json!("2025-01-08")]);
    }

    #[test]
    fn test_judgement_formula_matches_written_row() {
        let target = SheetTarget {
            first_row: 3,
            ..target()
        };
        let layout = presets::results_sheet(target.first_row);
        let segments = segments_for_layout(&layout).unwrap();
        let rows: Vec<_> = (1..=3)
            .map(|n| {
                let question = json!({"question_number": n, "ai_answer": "○"});
                layout.project(question.as_object().unwrap(), &serde_json::Map::new())
            })
            .collect();
        let batches = chunk_rows(&rows, 100);

        let ranges = value_ranges(&target, &segments, &batches[0]);
        assert_eq!(ranges[0].range, "テスト結果!D3:I5");
        for (i, values) in ranges[0].values.iter().enumerate() {
            let row = target.first_row + i;
            assert_eq!(values[1], json!(format!(r#"=IF(C{row}=D{row},"○","×")"#)));
        }
    }

    #[test]
    fn test_clear_ranges_are_open_ended() {
        let segments = segments_for_layout(&presets::results_sheet(2)).unwrap();
        assert_eq!(
            clear_ranges(&target(), &segments),
            vec!["テスト結果!D2:I".to_string(), "テスト結果!M2:M".to_string()]
        );
    }
}
