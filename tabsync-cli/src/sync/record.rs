//! Source records and the files they are loaded from

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

/// One logical input unit (a question, a rule section, an evaluation result)
pub type Record = Map<String, Value>;

/// Records loaded from one file, plus values shared by every record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub records: Vec<Record>,
    /// Envelope fields outside the record array (e.g. `timestamp`)
    pub context: Map<String, Value>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            context: Map::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Load a file whose top level is an array of flat objects
    pub fn from_array_file(path: &Path) -> Result<Self> {
        let json = read_json(path)?;
        let records = parse_records(json, path)?;
        Ok(Self::new(records))
    }

    /// Load a file whose top level is an object holding the records under
    /// `records_key`; every other top-level field becomes context
    pub fn from_envelope_file(path: &Path, records_key: &str) -> Result<Self> {
        let json = read_json(path)?;
        let Value::Object(mut envelope) = json else {
            anyhow::bail!("Expected a JSON object at the top of {}", path.display());
        };

        let records = envelope.remove(records_key).ok_or_else(|| {
            anyhow::anyhow!("Missing '{}' array in {}", records_key, path.display())
        })?;
        let records = parse_records(records, path)?;

        Ok(Self {
            records,
            context: envelope,
        })
    }

    /// Stable sort by a numeric key field; records without the key go last
    pub fn sort_by_key_field(&mut self, key: &str) {
        self.records
            .sort_by_key(|r| r.get(key).and_then(Value::as_i64).unwrap_or(i64::MAX));
    }

    /// Numeric context value (e.g. `accuracy_rate`)
    pub fn context_f64(&self, key: &str) -> Option<f64> {
        self.context.get(key).and_then(Value::as_f64)
    }
}

fn read_json(path: &Path) -> Result<Value> {
    if !path.exists() {
        anyhow::bail!("Source file does not exist: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

fn parse_records(json: Value, path: &Path) -> Result<Vec<Record>> {
    let Value::Array(items) = json else {
        anyhow::bail!("Expected a JSON array of records in {}", path.display());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(anyhow::anyhow!(
                "Record {} in {} is not an object: {}",
                idx,
                path.display(),
                other
            )),
        })
        .collect()
}
