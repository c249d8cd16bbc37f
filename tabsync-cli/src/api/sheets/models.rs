//! Request and response bodies of the Sheets values API

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One rectangular block of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: String,
    pub major_dimension: String,
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn rows(range: impl Into<String>, values: Vec<Vec<Value>>) -> Self {
        Self {
            range: range.into(),
            major_dimension: "ROWS".to_string(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub value_input_option: String,
    pub data: Vec<ValueRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub total_updated_rows: Option<usize>,
    #[serde(default)]
    pub total_updated_cells: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchClearRequest {
    pub ranges: Vec<String>,
}
