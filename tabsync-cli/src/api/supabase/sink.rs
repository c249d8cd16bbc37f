//! Table sink: one insert per batch, delete-all as the clear step

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::client::SupabaseClient;
use super::filter::Filter;
use crate::config::Credentials;
use crate::sync::{Batch, Row, RowLayout, Sink, WriteReceipt};

/// Surrogate key column and the sentinel no real row carries
const ID_COLUMN: &str = "id";
const ID_SENTINEL: i64 = 0;

pub struct TableSink {
    client: SupabaseClient,
    table: String,
    columns: Vec<String>,
}

/// Key a row by its layout's column names
pub fn row_to_object(columns: &[String], row: &Row) -> Value {
    let object: Map<String, Value> = columns
        .iter()
        .zip(row.iter())
        .map(|(name, cell)| (name.clone(), cell.to_table_json()))
        .collect();
    Value::Object(object)
}

impl TableSink {
    pub fn connect(
        credentials: Credentials,
        table: impl Into<String>,
        layout: &RowLayout,
    ) -> Result<Self> {
        let client = SupabaseClient::new(credentials.into_supabase()?)?;
        Ok(Self {
            client,
            table: table.into(),
            columns: layout.columns.iter().map(|c| c.name.clone()).collect(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Rows matching every filter
    pub async fn count(&self, filters: &[Filter]) -> Result<u64> {
        self.client.count(&self.table, filters).await
    }
}

#[async_trait]
impl Sink for TableSink {
    fn describe(&self) -> String {
        format!("table '{}'", self.table)
    }

    async fn clear(&self) -> Result<()> {
        self.client
            .delete(&self.table, &[Filter::neq(ID_COLUMN, ID_SENTINEL)])
            .await
    }

    async fn write_batch(&self, batch: &Batch<'_>) -> Result<WriteReceipt> {
        let objects: Vec<Value> = batch
            .rows
            .iter()
            .map(|row| row_to_object(&self.columns, row))
            .collect();

        self.client.insert(&self.table, &objects).await?;
        Ok(WriteReceipt::default())
    }
}
