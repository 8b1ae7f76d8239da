use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{DailyNorms, DEFAULT_PERIOD_DAYS};
use crate::categorizer::CategoryTable;
use crate::error::{PocketbookError, Result};

/// Overrides the settings file location.
pub const CONFIG_ENV: &str = "POCKETBOOK_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Source file name for a month; `{month}` is replaced by the lower-cased month.
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_period_days")]
    pub period_days: u32,
    #[serde(default)]
    pub norms: DailyNorms,
    /// Optional JSON category table replacing the built-in one.
    #[serde(default)]
    pub rules_file: Option<String>,
}

fn default_file_pattern() -> String {
    "hsbc_{month}.csv".to_string()
}

fn default_currency() -> String {
    "£".to_string()
}

fn default_period_days() -> u32 {
    DEFAULT_PERIOD_DAYS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            file_pattern: default_file_pattern(),
            currency: default_currency(),
            period_days: default_period_days(),
            norms: DailyNorms::default(),
            rules_file: None,
        }
    }
}

impl Settings {
    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.data_path().join("workbook.db")
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_path().join("exports")
    }

    /// `<data_dir>/<file_pattern>` for the given month name.
    pub fn source_for_month(&self, month: &str) -> PathBuf {
        let name = self
            .file_pattern
            .replace("{month}", &month.trim().to_lowercase());
        self.data_path().join(name)
    }

    pub fn category_table(&self) -> Result<CategoryTable> {
        match &self.rules_file {
            Some(path) => CategoryTable::load(Path::new(&shellexpand_path(path))),
            None => Ok(CategoryTable::default()),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("pocketbook")
}

pub fn settings_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("settings.json"))
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("pocketbook")
}

pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PocketbookError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
