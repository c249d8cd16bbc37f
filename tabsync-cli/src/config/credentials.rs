//! Where credentials come from, resolved before any network call

use std::path::PathBuf;

use anyhow::Result;
use secrecy::SecretString;

use crate::api::sheets::ServiceAccountKey;
use crate::api::supabase::SupabaseCredentials;

/// Source of the credentials for one sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Google service-account key file
    ServiceAccountFile(PathBuf),
    /// Project URL and API key read from environment variables
    Environment { url_var: String, key_var: String },
    /// No credentials; used by `--dry-run`, which never opens a real sink
    None,
}

/// Resolved credentials, ready to open a sink
#[derive(Debug)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    Supabase(SupabaseCredentials),
    None,
}

impl CredentialSource {
    /// Project URL and API key from the named variables
    pub fn environment(url_var: impl Into<String>, key_var: impl Into<String>) -> Self {
        CredentialSource::Environment {
            url_var: url_var.into(),
            key_var: key_var.into(),
        }
    }

    /// Resolve against the process environment and filesystem
    pub fn resolve(&self) -> Result<Credentials> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    /// Resolve with a custom variable lookup; empty values count as missing
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Credentials>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            CredentialSource::ServiceAccountFile(path) => {
                Ok(Credentials::ServiceAccount(ServiceAccountKey::from_file(path)?))
            }
            CredentialSource::Environment { url_var, key_var } => {
                let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
                let url = read(url_var);
                let key = read(key_var);

                match (url, key) {
                    (Some(url), Some(key)) => Ok(Credentials::Supabase(SupabaseCredentials {
                        url,
                        key: SecretString::from(key),
                    })),
                    (url, key) => {
                        let missing: Vec<&str> =
                            [(url.is_none(), url_var), (key.is_none(), key_var)]
                                .into_iter()
                                .filter(|(missing, _)| *missing)
                                .map(|(_, name)| name.as_str())
                                .collect();
                        anyhow::bail!(
                            "Missing environment variable(s): {}. Set them (or add them to .env), e.g. export {}='https://<project>.supabase.co'",
                            missing.join(", "),
                            url_var
                        )
                    }
                }
            }
            CredentialSource::None => Ok(Credentials::None),
        }
    }
}

impl Credentials {
    pub fn into_service_account(self) -> Result<ServiceAccountKey> {
        match self {
            Credentials::ServiceAccount(key) => Ok(key),
            other => anyhow::bail!(
                "Spreadsheet sinks need a service-account key, got {}",
                other.kind()
            ),
        }
    }

    pub fn into_supabase(self) -> Result<SupabaseCredentials> {
        match self {
            Credentials::Supabase(creds) => Ok(creds),
            other => anyhow::bail!("Table sinks need a Supabase URL and key, got {}", other.kind()),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Credentials::ServiceAccount(_) => "a service-account key",
            Credentials::Supabase(_) => "Supabase credentials",
            Credentials::None => "no credentials",
        }
    }
}
