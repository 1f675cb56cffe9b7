//! Runtime configuration resolved from the process environment.

use crate::engine::category::DEFAULT_CATEGORY;
use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "MEALPLAN_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "MEALPLAN_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "MEALPLAN_LOG_DIR";
pub const DEFAULT_CATEGORY_ENV: &str = "MEALPLAN_DEFAULT_CATEGORY";

const DB_FILE_NAME: &str = "mealplan.sqlite3";

/// Settings shared by every front-end of the planner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<String>,
    pub default_category: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Reads `MEALPLAN_*` variables, falling back to defaults for unset or
    /// blank values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PlannerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(DB_PATH_ENV) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        config.log_dir = read(LOG_DIR_ENV);
        if let Some(category) = read(DEFAULT_CATEGORY_ENV) {
            config.default_category = category;
        }
        config
    }
}
