//! Optional TOML config file
//!
//! Looked up at `--config <path>` or `<config dir>/tabsync/config.toml`.
//! Every field has a default, so a missing file is not an error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::sync::DEFAULT_BATCH_SIZE;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub sheets: SheetsSection,
    pub supabase: SupabaseSection,
    pub sync: SyncSection,
    pub inputs: InputsSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SheetsSection {
    pub spreadsheet_id: Option<String>,
    pub sheet_name: String,
    /// First data row; row 1 holds headers
    pub first_row: usize,
    pub credentials_file: PathBuf,
}

impl Default for SheetsSection {
    fn default() -> Self {
        Self {
            spreadsheet_id: None,
            sheet_name: "テスト結果".to_string(),
            first_row: 2,
            credentials_file: PathBuf::from("service-account.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SupabaseSection {
    pub table: String,
    /// Environment variable holding the project URL
    pub url_env: String,
    /// Environment variable holding the API key
    pub key_env: String,
}

impl Default for SupabaseSection {
    fn default() -> Self {
        Self {
            table: "jba_rules".to_string(),
            url_env: "SUPABASE_URL".to_string(),
            key_env: "SUPABASE_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncSection {
    pub batch_size: usize,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Default source files for commands whose path argument is optional
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InputsSection {
    pub questions: PathBuf,
    pub rules: PathBuf,
}

impl Default for InputsSection {
    fn default() -> Self {
        Self {
            questions: PathBuf::from("questions.json"),
            rules: PathBuf::from("rule_sections.json"),
        }
    }
}

impl FileConfig {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tabsync").join("config.toml"))
    }

    /// Load from an explicit path (must exist) or the default location (may be absent)
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file does not exist: {}", path.display());
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    log::debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = FileConfig::from_toml("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.sync.batch_size, 100);
        assert_eq!(config.sheets.first_row, 2);
        assert_eq!(config.supabase.url_env, "SUPABASE_URL");
    }

    #[test]
    fn test_partial_sections() {
        let config = FileConfig::from_toml(
            r#"
[sheets]
spreadsheet_id = "1Fk8FgOC7Rdb"
credentials_file = "keys/sa.json"

[supabase]
table = "rules_staging"

[sync]
batch_size = 25
"#,
        )
        .unwrap();

        assert_eq!(config.sheets.spreadsheet_id.as_deref(), Some("1Fk8FgOC7Rdb"));
        assert_eq!(config.sheets.sheet_name, "テスト結果");
        assert_eq!(config.sheets.credentials_file, PathBuf::from("keys/sa.json"));
        assert_eq!(config.supabase.table, "rules_staging");
        assert_eq!(config.supabase.key_env, "SUPABASE_KEY");
        assert_eq!(config.sync.batch_size, 25);
        assert_eq!(config.inputs, InputsSection::default());
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(FileConfig::from_toml("[sync]\nbatch_size = \"many\"").is_err());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("config.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[sheets]\nsheet_name = \"Results\"\n").unwrap();

        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.sheets.sheet_name, "Results");
    }
}
