use crate::sys::config::Config;
use std::path::PathBuf;

/// Runtime settings resolved from the config file and command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cache_dir: PathBuf,
    pub fallback_image: String,
    pub title_font: PathBuf,
    pub body_font: PathBuf,
    pub watermark: String,
    pub ytdlp_path: String,

    pub enable_logging: bool,
    pub log_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

impl Settings {
    pub fn from_config(config: Config) -> Self {
        Self {
            cache_dir: Config::expand_tilde(&config.cache_dir),
            fallback_image: config.fallback_image,
            title_font: Config::expand_tilde(&config.title_font),
            body_font: Config::expand_tilde(&config.body_font),
            watermark: config.watermark,
            ytdlp_path: Config::expand_tilde(&config.ytdlp_path).to_string_lossy().to_string(),
            enable_logging: config.logging.enabled,
            log_path: config.logging.path,
        }
    }

    pub fn with_cache_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.cache_dir = dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_cache_dir_overrides_config() {
        let settings = Settings::default().with_cache_dir(Some(PathBuf::from("/tmp/thumbs")));
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/thumbs"));

        let untouched = Settings::default().with_cache_dir(None);
        assert_eq!(untouched.cache_dir, PathBuf::from("cache"));
    }
}
