//! Clients for the remote tabular stores
//!
//! Google Sheets (range-based value updates) and Supabase (PostgREST tables),
//! each exposed as a [`crate::sync::Sink`].

pub mod sheets;
pub mod supabase;

use anyhow::Result;

/// Longest response body quoted in an error
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Turn a non-2xx response into an error carrying the status and body
pub(crate) async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    anyhow::bail!(
        "{} failed: HTTP {}: {}",
        what,
        status,
        crate::sync::truncate_message(body.trim(), MAX_ERROR_BODY_CHARS)
    )
}
