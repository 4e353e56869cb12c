use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::try_exists;

use syne_markdown::highlight::DEFAULT_THEME;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub blog: BlogConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Overall deadline for one request
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    pub title: String,
    pub page_size: usize,
    pub latest_count: usize,
    pub summary_length: usize,
    pub words_per_minute: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub highlight_theme: String,
    #[serde(default = "default_sanitize")]
    pub sanitize: bool,
}

fn default_sanitize() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_API_URL),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            blog: BlogConfig {
                title: String::from("syne's blog"),
                page_size: 10,
                latest_count: 6,
                summary_length: 200,
                words_per_minute: 300,
            },
            render: RenderConfig {
                highlight_theme: String::from(DEFAULT_THEME),
                sanitize: true,
            },
        }
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it is missing,
    /// empty or unparsable. `SYNE_API_URL` overrides the API base URL.
    pub async fn load() -> Result<Self> {
        let mut config = Self::load_file().await?;
        if let Ok(url) = std::env::var("SYNE_API_URL") {
            if !url.trim().is_empty() {
                log::debug!("API base URL overridden by SYNE_API_URL: {}", url);
                config.api.base_url = url;
            }
        }
        Ok(config)
    }

    async fn load_file() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };

        match Self::read(&path).await? {
            Some(config) => Ok(config),
            None => {
                let config = Self::default();
                if let Err(e) = config.save().await {
                    log::warn!("Could not write default config: {}", e);
                }
                Ok(config)
            }
        }
    }

    /// `None` means the file should be replaced by defaults: it is missing,
    /// blank, unreadable, or not valid JSON (then kept aside as `.bak`).
    async fn read(path: &Path) -> Result<Option<Self>> {
        if !try_exists(path).await? {
            log::info!("No config at {}, writing defaults", path.display());
            return Ok(None);
        }

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                log::error!("Cannot read config {}: {}", path.display(), e);
                return Ok(None);
            }
        };
        if content.trim().is_empty() {
            log::warn!("Config {} is blank, writing defaults", path.display());
            return Ok(None);
        }

        match serde_json::from_str::<Self>(&content) {
            Ok(mut config) => {
                config.validate()?;
                log::debug!("Loaded config from {}", path.display());
                Ok(Some(config))
            }
            Err(e) => {
                log::error!("Config {} is malformed: {}", path.display(), e);
                let backup = path.with_extension("bak");
                match tokio::fs::copy(path, &backup).await {
                    Ok(_) => log::info!("Kept the malformed config as {}", backup.display()),
                    Err(e) => log::warn!("Could not back up malformed config: {}", e),
                }
                Ok(None)
            }
        }
    }

    /// Writes the validated config as pretty JSON, creating the directory.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        let mut validated = self.clone();
        validated.validate()?;

        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Cannot create config directory {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(&validated).context("Cannot serialize config")?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Cannot write config {}", path.display()))?;

        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replaces out-of-range values with defaults.
    pub fn validate(&mut self) -> Result<()> {
        let defaults = Self::default();
        let mut corrected = false;

        if self.api.base_url.trim().is_empty() {
            log::warn!("Empty API base URL, using default");
            self.api.base_url = defaults.api.base_url;
            corrected = true;
        }

        if self.api.timeout_secs == 0 || self.api.timeout_secs > 300 {
            log::warn!("Invalid timeout: {}s, using default", self.api.timeout_secs);
            self.api.timeout_secs = DEFAULT_TIMEOUT_SECS;
            corrected = true;
        }

        if self.blog.page_size == 0 || self.blog.page_size > 100 {
            log::warn!("Invalid page size: {}, using default", self.blog.page_size);
            self.blog.page_size = defaults.blog.page_size;
            corrected = true;
        }

        if self.blog.summary_length == 0 {
            log::warn!("Summary length must be positive, using default");
            self.blog.summary_length = defaults.blog.summary_length;
            corrected = true;
        }

        if self.blog.words_per_minute == 0 {
            log::warn!("Reading speed must be positive, using default");
            self.blog.words_per_minute = defaults.blog.words_per_minute;
            corrected = true;
        }

        if self.render.highlight_theme.is_empty() {
            log::warn!("Empty highlight theme, using default");
            self.render.highlight_theme = defaults.render.highlight_theme;
            corrected = true;
        }

        if corrected {
            log::info!("Config contained invalid values; defaults substituted");
        }

        Ok(())
    }

    /// `SYNE_CONFIG_PATH`, then `SYNE_CONFIG_DIR/config.json`, then the
    /// platform config directory.
    fn config_path() -> Option<PathBuf> {
        std::env::var_os("SYNE_CONFIG_PATH")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("SYNE_CONFIG_DIR").map(|dir| PathBuf::from(dir).join(CONFIG_FILE)))
            .or_else(|| {
                ProjectDirs::from("com", "syne", "syne").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            })
    }
}
