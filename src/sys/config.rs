use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    #[serde(default = "default_fallback_image")]
    pub fallback_image: String,
    #[serde(default = "default_title_font")]
    pub title_font: String,
    #[serde(default = "default_body_font")]
    pub body_font: String,
    #[serde(default = "default_watermark")]
    pub watermark: String,
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_cache_dir() -> String { "cache".to_string() }
fn default_fallback_image() -> String { "https://i.ytimg.com/img/no_thumbnail.jpg".to_string() }
fn default_title_font() -> String { "assets/font.ttf".to_string() }
fn default_body_font() -> String { "assets/font2.ttf".to_string() }
fn default_watermark() -> String { "Powered by Prince Patel".to_string() }
fn default_ytdlp_path() -> String { "yt-dlp".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            fallback_image: default_fallback_image(),
            title_font: default_title_font(),
            body_font: default_body_font(),
            watermark: default_watermark(),
            ytdlp_path: default_ytdlp_path(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        ProjectDirs::from("com", "glassthumb", "glassthumb")
            .map(|proj_dirs| proj_dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")).unwrap_or_else(|_| ".".to_string());
                Path::new(&home).join(".glassthumb").join("config.toml")
            })
    }

    /// Defaults when the file does not exist; an error when it exists but
    /// can't be read or parsed.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Malformed config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut content = String::from("# Glassthumb Configuration\n\n");

        content.push_str("# Directory where finished thumbnails and raw downloads are kept.\n");
        content.push_str(&format!("cache_dir = {}\n\n", toml_string(&self.cache_dir)));

        content.push_str("# Image URL or path returned whenever a thumbnail cannot be generated.\n");
        content.push_str(&format!("fallback_image = {}\n\n", toml_string(&self.fallback_image)));

        content.push_str("# TrueType fonts. If either is missing a built-in bitmap font is used.\n");
        content.push_str(&format!("title_font = {}\n", toml_string(&self.title_font)));
        content.push_str(&format!("body_font = {}\n\n", toml_string(&self.body_font)));

        content.push_str("# Attribution drawn in the bottom-right corner.\n");
        content.push_str(&format!("watermark = {}\n\n", toml_string(&self.watermark)));

        content.push_str("# yt-dlp executable used for metadata lookups.\n");
        content.push_str(&format!("ytdlp_path = {}\n\n", toml_string(&self.ytdlp_path)));

        content.push_str("[logging]\n");
        content.push_str("# Also write logs to a file.\n");
        content.push_str(&format!("enabled = {}\n", self.logging.enabled));
        if let Some(log_path) = &self.logging.path {
            content.push_str(&format!("path = {}\n", toml_string(&log_path.to_string_lossy())));
        }

        fs::write(path, content)?;
        Ok(())
    }

    pub fn expand_tilde(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(dirs) = directories::BaseDirs::new() {
                return dirs.home_dir().join(rest);
            }
        }
        PathBuf::from(path)
    }
}

fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}
