//! Cell values of a projected row

use serde::{Deserialize, Serialize};

/// One positional value in a row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Cell {
    /// Left empty, for later stages to fill
    #[default]
    Blank,
    /// Literal text
    Text(String),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Spreadsheet formula, evaluated only under `USER_ENTERED`
    Formula(String),
}

/// A projected row, aligned to the columns of its layout
pub type Row = Vec<Cell>;

#[cfg(test)]
impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Blank)
    }
}

impl Cell {
    /// Convert a JSON scalar into a cell
    ///
    /// Nested arrays and objects keep their compact JSON text.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Cell::Blank,
            serde_json::Value::Bool(b) => Cell::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Cell::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Cell::Float(f)
                } else {
                    Cell::Blank
                }
            }
            serde_json::Value::String(s) => Cell::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Cell::Text(json.to_string())
            }
        }
    }

    /// JSON for a spreadsheet value range (blank cells become `""`)
    pub fn to_sheet_json(&self) -> serde_json::Value {
        match self {
            Cell::Blank => serde_json::Value::String(String::new()),
            Cell::Formula(f) => serde_json::Value::String(f.clone()),
            other => other.to_table_json(),
        }
    }

    /// JSON for a table column (blank cells become `null`)
    pub fn to_table_json(&self) -> serde_json::Value {
        match self {
            Cell::Blank => serde_json::Value::Null,
            Cell::Text(s) => serde_json::Value::String(s.clone()),
            Cell::Int(i) => serde_json::json!(*i),
            Cell::Float(f) => serde_json::json!(*f),
            Cell::Bool(b) => serde_json::Value::Bool(*b),
            Cell::Formula(f) => serde_json::Value::String(f.clone()),
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Blank => Ok(()),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Int(i) => write!(f, "{}", i),
            Cell::Float(fl) => write!(f, "{}", fl),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::Formula(formula) => write!(f, "{}", formula),
        }
    }
}
