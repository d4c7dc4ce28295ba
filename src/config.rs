use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::PAGE_SIZE;

const BASE_URL_ENV: &str = "TIMETRACK_API_BASE_URL";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Items requested per page
  #[serde(default = "default_page_size")]
  pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Base URL of the time-tracking API, e.g. https://tracker.example.com/api
  pub base_url: Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl ApiConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

fn default_page_size() -> usize {
  PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
  30
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./timetrack.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/timetrack/config.yaml
  ///
  /// With no file found, defaults are used and the base URL must come from
  /// the environment.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self {
        page_size: PAGE_SIZE,
        ..Self::default()
      }),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("timetrack.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("timetrack").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    if config.page_size == 0 {
      return Err(eyre!("page_size must be at least 1"));
    }
    Ok(config)
  }

  /// The API base URL, with TIMETRACK_API_BASE_URL taking precedence over the file.
  pub fn base_url(&self) -> Result<String> {
    resolve_base_url(
      std::env::var(BASE_URL_ENV).ok(),
      self.api.base_url.as_deref(),
    )
  }

  /// Get the API key from environment variables.
  ///
  /// Checks TIMETRACK_API_KEY first, then API_KEY as fallback.
  pub fn get_api_key() -> Result<String> {
    std::env::var("TIMETRACK_API_KEY")
      .or_else(|_| std::env::var("API_KEY"))
      .map_err(|_| eyre!("API key not found. Set TIMETRACK_API_KEY or API_KEY environment variable."))
  }
}

fn resolve_base_url(from_env: Option<String>, from_file: Option<&str>) -> Result<String> {
  from_env
    .filter(|url| !url.trim().is_empty())
    .or_else(|| from_file.map(String::from))
    .ok_or_else(|| {
      eyre!(
        "API base URL not configured. Set api.base_url in ~/.config/timetrack/config.yaml \
         or the {} environment variable.",
        BASE_URL_ENV
      )
    })
}
