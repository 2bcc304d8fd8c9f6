// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::entry::ViewMode;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;

fn default_true() -> bool {
    true
}
fn default_upcoming_hours() -> u32 {
    24
}
fn default_sample_size() -> usize {
    3
}
fn default_fetch_timeout() -> u64 {
    10
}
fn default_refresh_interval() -> u32 {
    15
}

/// Per-widget settings echoed into every entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub selected_list: Option<String>,
    pub tags: Vec<String>,
    pub show_url: bool,
    pub show_summary: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            selected_list: None,
            tags: Vec::new(),
            show_url: true,
            show_summary: true,
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub selected_list: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub show_url: bool,
    #[serde(default = "default_true")]
    pub show_summary: bool,
    #[serde(default)]
    pub view_mode: ViewMode,
    /// List identifier shown by the single-list view.
    #[serde(default)]
    pub detail_list: Option<String>,

    #[serde(default = "default_upcoming_hours")]
    pub upcoming_hours: u32,
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_mins: u32,
    /// False when running where no permission prompt may be shown.
    #[serde(default = "default_true")]
    pub interactive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            selected_list: None,
            tags: Vec::new(),
            // Match the serde defaults
            show_url: true,
            show_summary: true,
            view_mode: ViewMode::default(),
            detail_list: None,
            upcoming_hours: 24,
            sample_size: 3,
            fetch_timeout_secs: 10,
            refresh_interval_mins: 15,
            interactive: true,
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Load, treating a missing file as defaults. Parse errors still surface.
    pub fn load_or_default(ctx: &dyn AppContext) -> Result<Self> {
        match Self::load(ctx) {
            Ok(config) => Ok(config),
            Err(e) if Self::is_missing_config_error(&e) => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Detects whether an error means the config file was missing, either by
    /// our explicit message or an io NotFound anywhere in the chain.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    pub fn get_path_string(ctx: &dyn AppContext) -> Result<String> {
        let path = ctx.get_config_file_path()?;
        Ok(path.to_string_lossy().to_string())
    }

    pub fn widget(&self) -> WidgetConfig {
        WidgetConfig {
            selected_list: self.selected_list.clone(),
            tags: self.tags.clone(),
            show_url: self.show_url,
            show_summary: self.show_summary,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.refresh_interval_mins.max(1)))
    }
}
