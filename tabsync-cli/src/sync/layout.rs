//! Row layouts: the static column schema a record is projected through

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Cell, Record, Row};

/// Ordered column schema of a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowLayout {
    /// Human-readable layout name (used in logs)
    pub name: String,
    pub columns: Vec<Column>,
}

/// One column of a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Table column name, or the header label for spreadsheets
    pub name: String,
    /// Spreadsheet column letter (e.g. "D"); required by spreadsheet sinks only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_column: Option<String>,
    pub rule: ColumnRule,
}

/// How a cell is derived from a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnRule {
    /// Copy a record field
    Field {
        field: String,
        /// Used when the field is missing or null
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Cell>,
    },
    /// Always blank
    Blank,
    /// Copy a value shared by the whole record set (e.g. `timestamp`)
    Context { key: String },
    /// Map a confidence grade to a numeric score
    GradeScore { field: String },
    /// Formula template; `{row}` becomes `record[row_key] + row_offset`
    Formula {
        template: String,
        row_key: String,
        #[serde(default)]
        row_offset: i64,
    },
    /// JSON pointer into the record, optionally rounded to `round` decimals
    Pointer {
        pointer: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        round: Option<u32>,
    },
    /// `<id>` or `<id> (<index>/<total>)` when the record is flagged as split
    SplitLabel {
        id_field: String,
        flag_field: String,
        index_field: String,
        total_field: String,
    },
}

impl Column {
    pub fn new(name: impl Into<String>, rule: ColumnRule) -> Self {
        Self {
            name: name.into(),
            sheet_column: None,
            rule,
        }
    }

    /// Place this column at a spreadsheet column letter
    pub fn at(mut self, sheet_column: impl Into<String>) -> Self {
        self.sheet_column = Some(sheet_column.into());
        self
    }
}

impl ColumnRule {
    pub fn field(field: impl Into<String>) -> Self {
        ColumnRule::Field {
            field: field.into(),
            default: None,
        }
    }

    pub fn field_or(field: impl Into<String>, default: Cell) -> Self {
        ColumnRule::Field {
            field: field.into(),
            default: Some(default),
        }
    }

    pub fn grade_score(field: impl Into<String>) -> Self {
        ColumnRule::GradeScore {
            field: field.into(),
        }
    }

    pub fn context(key: impl Into<String>) -> Self {
        ColumnRule::Context { key: key.into() }
    }

    /// Derive one cell; never fails, missing inputs give a blank or default
    pub fn apply(&self, record: &Record, context: &Map<String, Value>) -> Cell {
        match self {
            ColumnRule::Field { field, default } => match record.get(field) {
                Some(value) if !value.is_null() => Cell::from_json(value),
                _ => default.clone().unwrap_or_default(),
            },

            ColumnRule::Blank => Cell::Blank,

            ColumnRule::Context { key } => {
                context.get(key).map(Cell::from_json).unwrap_or_default()
            }

            ColumnRule::GradeScore { field } => {
                let grade = record.get(field).and_then(Value::as_str);
                grade_score(grade).map(Cell::Float).unwrap_or_default()
            }

            ColumnRule::Formula {
                template,
                row_key,
                row_offset,
            } => match record
                .get(row_key)
                .and_then(Value::as_i64)
                .and_then(|key| key.checked_add(*row_offset))
            {
                Some(row) if row > 0 => Cell::Formula(template.replace("{row}", &row.to_string())),
                _ => Cell::Blank,
            },

            ColumnRule::Pointer { pointer, round } => {
                match (record_pointer(record, pointer), round) {
                    (Some(Value::Number(n)), Some(decimals)) => match n.as_f64() {
                        Some(f) => Cell::Float(round_to(f, *decimals)),
                        None => Cell::Blank,
                    },
                    (Some(value), _) => Cell::from_json(value),
                    (None, _) => Cell::Blank,
                }
            }

            ColumnRule::SplitLabel {
                id_field,
                flag_field,
                index_field,
                total_field,
            } => {
                let Some(id) = record.get(id_field).filter(|v| !v.is_null()) else {
                    return Cell::Blank;
                };
                let id = Cell::from_json(id).to_string();
                let is_split = record.get(flag_field).and_then(Value::as_bool).unwrap_or(false);
                if !is_split {
                    return Cell::Text(id);
                }
                let part = |field: &str| {
                    record
                        .get(field)
                        .map(|v| Cell::from_json(v).to_string())
                        .unwrap_or_default()
                };
                Cell::Text(format!("{} ({}/{})", id, part(index_field), part(total_field)))
            }
        }
    }
}

/// Confidence grade to score: `A+` 0.95, `A` 0.85, `B` 0.7, any other grade 0.5
///
/// An absent or empty grade has no score.
pub fn grade_score(grade: Option<&str>) -> Option<f64> {
    match grade {
        None | Some("") => None,
        Some("A+") => Some(0.95),
        Some("A") => Some(0.85),
        Some("B") => Some(0.7),
        Some(_) => Some(0.5),
    }
}

fn record_pointer<'a>(record: &'a Record, pointer: &str) -> Option<&'a Value> {
    let mut segments = pointer.strip_prefix('/')?.split('/');
    let first = segments.next()?;
    let mut current = record.get(&unescape_pointer(first))?;
    for segment in segments {
        current = current.pointer(&format!("/{}", segment))?;
    }
    Some(current)
}

fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

impl RowLayout {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Load a layout from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout file: {}", path.display()))?;
        let layout: RowLayout = toml::from_str(&content)
            .with_context(|| format!("Failed to parse layout file: {}", path.display()))?;
        if layout.columns.is_empty() {
            anyhow::bail!("Layout '{}' has no columns", layout.name);
        }
        Ok(layout)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Project one record into a row of exactly one cell per column
    pub fn project(&self, record: &Record, context: &Map<String, Value>) -> Row {
        self.columns
            .iter()
            .map(|column| column.rule.apply(record, context))
            .collect()
    }

    /// Project every record, preserving order
    pub fn project_all(&self, records: &[Record], context: &Map<String, Value>) -> Vec<Row> {
        records.iter().map(|r| self.project(r, context)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_grade_score_table() {
        assert_eq!(grade_score(Some("A+")), Some(0.95));
        assert_eq!(grade_score(Some("A")), Some(0.85));
        assert_eq!(grade_score(Some("B")), Some(0.7));
        assert_eq!(grade_score(Some("C")), Some(0.5));
        assert_eq!(grade_score(Some("a+")), Some(0.5));
        assert_eq!(grade_score(Some("")), None);
        assert_eq!(grade_score(None), None);
    }

    #[test]
    fn test_grade_score_rule_blank_when_absent() {
        let rule = ColumnRule::grade_score("confidence_grade");
        let ctx = Map::new();
        assert_eq!(rule.apply(&record(json!({})), &ctx), Cell::Blank);
        assert_eq!(
            rule.apply(&record(json!({"confidence_grade": null})), &ctx),
            Cell::Blank
        );
        assert_eq!(
            rule.apply(&record(json!({"confidence_grade": "A"})), &ctx),
            Cell::Float(0.85)
        );
    }

    #[test]
    fn test_field_default_applies_to_missing_and_null() {
        let rule = ColumnRule::field_or("is_split", Cell::Bool(false));
        let ctx = Map::new();
        assert_eq!(rule.apply(&record(json!({})), &ctx), Cell::Bool(false));
        assert_eq!(rule.apply(&record(json!({"is_split": null})), &ctx), Cell::Bool(false));
        assert_eq!(rule.apply(&record(json!({"is_split": true})), &ctx), Cell::Bool(true));
    }

    #[test]
    fn test_formula_uses_key_plus_offset() {
        let rule = ColumnRule::Formula {
            template: r#"=IF(C{row}=D{row},"○","×")"#.to_string(),
            row_key: "question_number".to_string(),
            row_offset: 1,
        };
        let ctx = Map::new();
        assert_eq!(
            rule.apply(&record(json!({"question_number": 7})), &ctx),
            Cell::Formula(r#"=IF(C8=D8,"○","×")"#.to_string())
        );
        assert_eq!(rule.apply(&record(json!({})), &ctx), Cell::Blank);
    }

    #[test]
    fn test_formula_row_out_of_range_is_blank() {
        let rule = ColumnRule::Formula {
            template: "=C{row}".to_string(),
            row_key: "question_number".to_string(),
            row_offset: 1,
        };
        let ctx = Map::new();
        assert_eq!(
            rule.apply(&record(json!({"question_number": i64::MAX})), &ctx),
            Cell::Blank
        );
        assert_eq!(rule.apply(&record(json!({"question_number": -5})), &ctx), Cell::Blank);
        assert_eq!(
            rule.apply(&record(json!({"question_number": "7"})), &ctx),
            Cell::Blank
        );
    }

    #[test]
    fn test_pointer_rounds_numbers() {
        let rule = ColumnRule::Pointer {
            pointer: "/search_results/0/combinedScore".to_string(),
            round: Some(3),
        };
        let ctx = Map::new();
        let r = record(json!({"search_results": [{"combinedScore": 0.123456}]}));
        assert_eq!(rule.apply(&r, &ctx), Cell::Float(0.123));
        assert_eq!(rule.apply(&record(json!({"search_results": []})), &ctx), Cell::Blank);
        assert_eq!(rule.apply(&record(json!({})), &ctx), Cell::Blank);
    }

    #[test]
    fn test_split_label() {
        let rule = ColumnRule::SplitLabel {
            id_field: "section_id".to_string(),
            flag_field: "is_split".to_string(),
            index_field: "split_index".to_string(),
            total_field: "split_total".to_string(),
        };
        let ctx = Map::new();
        assert_eq!(
            rule.apply(&record(json!({"section_id": "4-1"})), &ctx),
            Cell::text("4-1")
        );
        assert_eq!(
            rule.apply(
                &record(json!({
                    "section_id": "4-1",
                    "is_split": true,
                    "split_index": 2,
                    "split_total": 3
                })),
                &ctx
            ),
            Cell::text("4-1 (2/3)")
        );
        assert_eq!(rule.apply(&record(json!({})), &ctx), Cell::Blank);
    }

    #[test]
    fn test_context_rule() {
        let rule = ColumnRule::context("timestamp");
        let mut ctx = Map::new();
        ctx.insert("timestamp".to_string(), json!("2025-01-08"));
        assert_eq!(rule.apply(&record(json!({})), &ctx), Cell::text("2025-01-08"));
        assert_eq!(rule.apply(&record(json!({})), &Map::new()), Cell::Blank);
    }

    #[test]
    fn test_project_is_total_and_fixed_width() {
        let layout = RowLayout::new(
            "test",
            vec![
                Column::new("a", ColumnRule::field("a")),
                Column::new("gap", ColumnRule::Blank),
                Column::new("score", ColumnRule::grade_score("grade")),
            ],
        );

        let row = layout.project(&record(json!({"unrelated": 1})), &Map::new());
        assert_eq!(row.len(), layout.columns.len());
        assert!(row.iter().all(Cell::is_blank));
    }

    #[test]
    fn test_layout_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.toml");
        fs::write(
            &path,
            r#"
name = "custom"

[[columns]]
name = "ai_answer"
sheet_column = "D"
rule = { type = "field", field = "ai_answer" }

[[columns]]
name = "score"
sheet_column = "E"
rule = { type = "grade_score", field = "confidence_grade" }

[[columns]]
name = "is_split"
rule = { type = "field", field = "is_split", default = { type = "bool", value = false } }
"#,
        )
        .unwrap();

        let layout = RowLayout::from_toml_file(&path).unwrap();
        assert_eq!(layout.name, "custom");
        assert_eq!(layout.column_names(), vec!["ai_answer", "score", "is_split"]);
        assert_eq!(layout.columns[0].sheet_column.as_deref(), Some("D"));
        assert_eq!(
            layout.columns[2].rule,
            ColumnRule::field_or("is_split", Cell::Bool(false))
        );
    }

    #[test]
    fn test_layout_without_columns_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "name = \"empty\"\ncolumns = []\n").unwrap();
        assert!(RowLayout::from_toml_file(&path).is_err());
    }
}
