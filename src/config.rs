//! Viewer configuration.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! working-directory config file -> environment.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDate};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::session::Credentials;

pub const CONFIG_FILE_NAME: &str = "site-viewer.toml";
pub const ENV_PREFIX: &str = "SITE_VIEWER_";

/// Password of the built-in account when no configuration overrides it.
const DEFAULT_PASSWORD: &str = "changeme";

/// A fixed local source for the "Manual Input" path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualSource {
    /// Provenance label applied to every row of this file.
    pub label: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub credentials: Credentials,
    /// Sources loaded by "Manual Input", in order.
    pub manual_sources: Vec<ManualSource>,
    /// Suggested file name for exports.
    pub export_file_name: String,
    /// Earliest date selectable in the date filter.
    pub earliest_date: NaiveDate,
    pub window: WindowConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let manual = |label: &str, file: &str| ManualSource {
            label: label.to_string(),
            path: Path::new("data").join(file),
        };
        Self {
            credentials: Credentials::new("admin", DEFAULT_PASSWORD),
            manual_sources: vec![
                manual("BSNL", "bsnl.xlsx"),
                manual("Airtel", "airtel.xlsx"),
                manual("VI", "vi.xlsx"),
            ],
            export_file_name: "site_data.xlsx".to_string(),
            earliest_date: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap_or_default(),
            window: WindowConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reject settings the viewer cannot work with.
    pub fn validate(&self, today: NaiveDate) -> anyhow::Result<()> {
        if self.earliest_date > today {
            anyhow::bail!(
                "earliest_date {} is after today ({today})",
                self.earliest_date
            );
        }
        Ok(())
    }

    /// True while the built-in password is still in effect.
    pub fn uses_default_password(&self) -> bool {
        self.credentials.verify(&self.credentials.username, DEFAULT_PASSWORD)
    }
}

/// Figment layering for a given user config directory and working directory.
fn layered(user_dir: Option<&Path>, workdir: &Path) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(dir) = user_dir {
        let user_config = dir.join(CONFIG_FILE_NAME);
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    let local_config = workdir.join(CONFIG_FILE_NAME);
    if local_config.exists() {
        figment = figment.merge(Toml::file(&local_config));
    }

    // SITE_VIEWER_CREDENTIALS__USERNAME, SITE_VIEWER_EXPORT_FILE_NAME, ...
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `SITE_VIEWER_`)
/// 2. `./site-viewer.toml`
/// 3. User config (`~/.config/site-viewer/site-viewer.toml`)
/// 4. Built-in defaults
pub fn load_config(workdir: &Path) -> anyhow::Result<AppConfig> {
    let dirs = directories::ProjectDirs::from("dev", "site-viewer", "site-viewer");
    let user_dir = dirs.as_ref().map(|d| d.config_dir());

    let config: AppConfig = layered(user_dir, workdir)
        .extract()
        .with_context(|| format!("loading {CONFIG_FILE_NAME}"))?;
    config
        .validate(Local::now().date_naive())
        .with_context(|| format!("invalid {CONFIG_FILE_NAME}"))?;
    Ok(config)
}
