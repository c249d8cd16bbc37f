//! Configuration: sync settings, the TOML config file, and credential sources

mod credentials;
mod file;

pub use credentials::{CredentialSource, Credentials};
pub use file::{FileConfig, SheetsSection};

use serde::{Deserialize, Serialize};

use crate::sync::DEFAULT_BATCH_SIZE;

/// How the spreadsheet interprets written values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueMode {
    /// Stored literally
    #[default]
    Raw,
    /// Parsed as if typed into the UI, so formulas evaluate
    UserEntered,
}

impl ValueMode {
    /// Value for the `valueInputOption` request field
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ValueMode::Raw => "RAW",
            ValueMode::UserEntered => "USER_ENTERED",
        }
    }
}

/// Everything one sync run needs to know about its target
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Spreadsheet id or table name
    pub sink_id: String,
    pub credential_source: CredentialSource,
    /// Rows per upload call (0 sends everything at once)
    pub batch_size: usize,
    pub value_mode: ValueMode,
    /// Delete all existing rows before uploading
    pub clear_before_upload: bool,
}

impl SyncConfig {
    pub fn new(sink_id: impl Into<String>, credential_source: CredentialSource) -> Self {
        Self {
            sink_id: sink_id.into(),
            credential_source,
            batch_size: DEFAULT_BATCH_SIZE,
            value_mode: ValueMode::default(),
            clear_before_upload: false,
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn value_mode(mut self, value_mode: ValueMode) -> Self {
        self.value_mode = value_mode;
        self
    }

    pub fn clear_before_upload(mut self, clear: bool) -> Self {
        self.clear_before_upload = clear;
        self
    }
}
