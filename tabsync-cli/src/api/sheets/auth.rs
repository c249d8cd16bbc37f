//! Service-account authentication (OAuth 2.0 JWT bearer grant)
//!
//! The key file is read and validated before any network call. The access
//! token is exchanged once per run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Read/write access to spreadsheets
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Google caps assertion lifetime at one hour
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// The parts of a service-account key file used for signing
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    #[serde(deserialize_with = "deserialize_secret")]
    private_key: SecretString,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// Claims of the signed assertion
#[derive(Debug, Serialize, PartialEq, Eq)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Bearer token for API calls
#[derive(Debug)]
pub struct AccessToken {
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl ServiceAccountKey {
    /// Read and validate a key file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Service-account key file does not exist: {}", path.display());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read service-account key: {}", path.display()))?;
        let key = Self::from_json(&content)
            .with_context(|| format!("Invalid service-account key: {}", path.display()))?;

        log::debug!("Loaded service-account key for {}", key.client_email);
        Ok(key)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let key: ServiceAccountKey =
            serde_json::from_str(content).context("Key file is not a service-account JSON key")?;
        key.encoding_key()?;
        Ok(key)
    }

    fn encoding_key(&self) -> Result<EncodingKey> {
        EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .context("private_key is not a valid RSA PEM key")
    }

    fn claims(&self, scopes: &[&str], now: DateTime<Utc>) -> AssertionClaims<'_> {
        AssertionClaims {
            iss: &self.client_email,
            scope: scopes.join(" "),
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        }
    }

    /// Sign the RS256 assertion
    fn assertion(&self, scopes: &[&str], now: DateTime<Utc>) -> Result<String> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        jsonwebtoken::encode(&header, &self.claims(scopes, now), &self.encoding_key()?)
            .context("Failed to sign service-account assertion")
    }

    /// Exchange a signed assertion for an access token
    pub async fn fetch_access_token(
        &self,
        http: &reqwest::Client,
        scopes: &[&str],
    ) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = self.assertion(scopes, now)?;

        log::info!("Authenticating as {}", self.client_email);

        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("Failed to reach the OAuth token endpoint")?;

        let response = crate::api::check_status(response, "Token exchange").await?;
        let token: TokenResponse = response
            .json()
            .await
            .context("Invalid token response")?;

        let expires_at = token
            .expires_in
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(now + Duration::seconds(ASSERTION_LIFETIME_SECS));

        Ok(AccessToken {
            token: SecretString::from(token.access_token),
            expires_at,
        })
    }
}
