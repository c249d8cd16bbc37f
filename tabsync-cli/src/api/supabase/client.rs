//! Minimal PostgREST client for Supabase tables

use anyhow::{Context, Result};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::filter::{Filter, parse_content_range, query_string};

/// Project URL and API key
#[derive(Debug)]
pub struct SupabaseCredentials {
    pub url: String,
    pub key: SecretString,
}

pub struct SupabaseClient {
    http: reqwest::Client,
    rest_url: String,
    key: SecretString,
}

impl SupabaseClient {
    pub fn new(credentials: SupabaseCredentials) -> Result<Self> {
        let url = credentials.url.trim().trim_end_matches('/');
        if !url.starts_with("https://") && !url.starts_with("http://") {
            anyhow::bail!("SUPABASE_URL must be an http(s) URL, got '{}'", url);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            rest_url: format!("{}/rest/v1", url),
            key: credentials.key,
        })
    }

    pub fn table_url(&self, table: &str, query: &str) -> String {
        let base = format!("{}/{}", self.rest_url, urlencoding::encode(table));
        if query.is_empty() {
            base
        } else {
            format!("{}?{}", base, query)
        }
    }

    fn request(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.key.expose_secret())
            .bearer_auth(self.key.expose_secret())
    }

    /// Delete rows matching every filter
    ///
    /// PostgREST refuses an unfiltered delete; "all rows" is expressed as a
    /// filter that excludes only a sentinel id (e.g. `id=neq.0`).
    pub async fn delete(&self, table: &str, filters: &[Filter]) -> Result<()> {
        if filters.is_empty() {
            anyhow::bail!("Refusing to delete from '{}' without a filter", table);
        }

        let url = self.table_url(table, &query_string(None, filters));
        let response = self
            .request(Method::DELETE, url)
            .header("Prefer", "return=minimal")
            .send()
            .await
            .with_context(|| format!("Failed to send delete to '{}'", table))?;

        crate::api::check_status(response, &format!("Delete from '{}'", table)).await?;
        Ok(())
    }

    /// Insert a JSON array of rows in one request
    pub async fn insert(&self, table: &str, rows: &[Value]) -> Result<()> {
        let url = self.table_url(table, "");
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await
            .with_context(|| format!("Failed to send insert to '{}'", table))?;

        crate::api::check_status(response, &format!("Insert into '{}'", table)).await?;
        Ok(())
    }

    /// Exact number of rows matching every filter
    pub async fn count(&self, table: &str, filters: &[Filter]) -> Result<u64> {
        let url = self.table_url(table, &query_string(Some("*"), filters));
        let response = self
            .request(Method::HEAD, url)
            .header("Prefer", "count=exact")
            .send()
            .await
            .with_context(|| format!("Failed to send count to '{}'", table))?;

        let response = crate::api::check_status(response, &format!("Count on '{}'", table)).await?;
        let header = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| anyhow::anyhow!("Count on '{}' returned no Content-Range", table))?;

        parse_content_range(header)
            .ok_or_else(|| anyhow::anyhow!("Unexpected Content-Range '{}'", header))
    }
}
