//! Application configuration.
//!
//! Loaded from a TOML file named by `ACTIVITY_LOG_CONFIG`, falling back to
//! `./activity-log.toml`, then to built-in defaults. A few environment
//! variables override individual values:
//! - `ACTIVITY_LOG_STORE_PATH`: submissions file path
//! - `ACTIVITY_LOG_ADMIN_SECRET`: plaintext admin secret
//! - `ACTIVITY_LOG_MAX_ACTIVITIES`: upper bound on activities per submission

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AuthRecord, DEFAULT_PBKDF2_ITERATIONS};
use crate::error::{AppError, Result};

pub const CONFIG_ENV: &str = "ACTIVITY_LOG_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "activity-log.toml";
pub const DEFAULT_ADMIN_SECRET: &str = "password123";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub admin: AdminConfig,
    pub form: FormConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("submissions.csv"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    #[serde(skip_serializing)]
    pub secret: Option<String>,
    pub hashed: Option<AuthRecord>,
    /// Iterations used when hashing a plaintext `secret`.
    pub iterations: u32,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            secret: None,
            hashed: None,
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl AdminConfig {
    /// Resolve the configured secret into a verifiable record. A precomputed
    /// hash wins over a plaintext secret.
    pub fn credential(&self) -> Result<AuthRecord> {
        if let Some(record) = &self.hashed {
            record.validate()?;
            return Ok(record.clone());
        }
        match self.secret.as_deref() {
            Some(secret) => AuthRecord::from_secret(secret, self.iterations),
            None => {
                warn!("no admin secret configured, using the built-in default");
                AuthRecord::from_secret(DEFAULT_ADMIN_SECRET, self.iterations)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub min_activities: usize,
    pub max_activities: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            min_activities: 1,
            max_activities: 20,
        }
    }
}

impl FormConfig {
    pub fn clamp(&self, count: usize) -> usize {
        count.clamp(self.min_activities, self.max_activities)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if self.store.path.as_os_str().is_empty() {
            return Err(AppError::Config("store.path must not be empty".to_string()));
        }
        if self.form.min_activities == 0 {
            return Err(AppError::Config(
                "form.min_activities must be at least 1".to_string(),
            ));
        }
        if self.form.min_activities > self.form.max_activities {
            return Err(AppError::Config(format!(
                "form.min_activities ({}) exceeds form.max_activities ({})",
                self.form.min_activities, self.form.max_activities
            )));
        }
        Ok(())
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| AppError::Config(err.to_string()))
    }

    fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("ACTIVITY_LOG_STORE_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(secret) = var("ACTIVITY_LOG_ADMIN_SECRET") {
            self.admin.secret = Some(secret);
            self.admin.hashed = None;
        }
        if let Some(max) = var("ACTIVITY_LOG_MAX_ACTIVITIES") {
            self.form.max_activities = max.trim().parse::<usize>().map_err(|err| {
                AppError::Config(format!("Invalid ACTIVITY_LOG_MAX_ACTIVITIES: {err}"))
            })?;
        }
        Ok(())
    }
}

/// Load configuration from the discovered config file (if any) plus environment overrides.
pub fn load() -> Result<AppConfig> {
    let explicit = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
    load_with(explicit.as_deref(), |key| std::env::var(key).ok())
}

/// Load configuration from `path` (or the default file) using `var` to look
/// up overrides.
pub fn load_with<F>(path: Option<&Path>, var: F) -> Result<AppConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.is_file() {
                read_file(default_path)?
            } else {
                AppConfig::default()
            }
        }
    };
    config.apply_overrides(var)?;
    config.validate()?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<AppConfig> {
    let text = fs::read_to_string(path)
        .map_err(|err| AppError::Config(format!("cannot read {}: {err}", path.display())))?;
    let config = AppConfig::from_toml(&text)?;
    info!(path = %path.display(), "configuration loaded");
    Ok(config)
}
