//! Google Sheets v4 values client

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};

use super::auth::{SPREADSHEETS_SCOPE, ServiceAccountKey};
use super::models::{BatchClearRequest, BatchUpdateRequest, BatchUpdateResponse, ValueRange};
use crate::config::ValueMode;

const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Authenticated client bound to one spreadsheet
pub struct SheetsClient {
    http: reqwest::Client,
    token: SecretString,
    spreadsheet_id: String,
    base_url: String,
}

impl SheetsClient {
    /// Authenticate once; the token is reused for every later call
    pub async fn connect(
        key: &ServiceAccountKey,
        spreadsheet_id: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::new();
        let token = key
            .fetch_access_token(&http, &[SPREADSHEETS_SCOPE])
            .await
            .context("Google Sheets authentication failed")?;

        log::info!("Authenticated, token valid until {}", token.expires_at);

        Ok(Self::with_token(http, token.token, spreadsheet_id))
    }

    fn with_token(
        http: reqwest::Client,
        token: SecretString,
        spreadsheet_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            token,
            spreadsheet_id: spreadsheet_id.into(),
            base_url: SHEETS_BASE_URL.to_string(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Browser URL of the spreadsheet
    pub fn web_url(&self) -> String {
        spreadsheet_web_url(&self.spreadsheet_id)
    }

    fn values_url(&self, action: &str) -> String {
        format!(
            "{}/{}/values:{}",
            self.base_url,
            urlencoding::encode(&self.spreadsheet_id),
            action
        )
    }

    /// Write several ranges in one call
    pub async fn batch_update(
        &self,
        value_mode: ValueMode,
        data: Vec<ValueRange>,
    ) -> Result<BatchUpdateResponse> {
        let body = BatchUpdateRequest {
            value_input_option: value_mode.as_api_str().to_string(),
            data,
        };

        let response = self
            .http
            .post(self.values_url("batchUpdate"))
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .context("Failed to send values:batchUpdate")?;

        let response = crate::api::check_status(response, "values:batchUpdate").await?;
        response
            .json()
            .await
            .context("Invalid values:batchUpdate response")
    }

    /// Clear several ranges in one call
    pub async fn batch_clear(&self, ranges: Vec<String>) -> Result<()> {
        let response = self
            .http
            .post(self.values_url("batchClear"))
            .bearer_auth(self.token.expose_secret())
            .json(&BatchClearRequest { ranges })
            .send()
            .await
            .context("Failed to send values:batchClear")?;

        crate::api::check_status(response, "values:batchClear").await?;
        Ok(())
    }
}

pub fn spreadsheet_web_url(spreadsheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}", spreadsheet_id)
}
