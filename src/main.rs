mod app;
mod cli;
mod compose;
mod error;
mod model;
mod sys;

use anyhow::Result;
use app::Generator;
use clap::Parser;
use cli::Cli;
use model::settings::Settings;
use sys::config::Config;
use sys::yt::YtDlp;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::get_config_path);
    if cli.write_config {
        Config::default().save(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let (config, config_error) = match Config::load_from(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    let settings = Settings::from_config(config).with_cache_dir(cli.cache_dir.clone());

    let log_file = settings.log_path.clone().filter(|_| settings.enable_logging);
    sys::logging::init_logger(log_file, cli.verbose)?;
    if let Some(e) = config_error {
        log::warn!("{:#}; using default settings", e);
    }

    sys::cache::ensure_cache_dir(&settings.cache_dir)?;

    match sys::deps::check_yt_dlp(&settings.ytdlp_path) {
        Ok(version) => log::debug!("yt-dlp version: {}", version),
        Err(e) => log::warn!("{:#}; every lookup will fall back", e),
    }

    let search = YtDlp::new(settings.ytdlp_path.clone());
    let generator = Generator::new(settings, search);

    let mut fallbacks = 0;
    for id in &cli.ids {
        let outcome = generator.generate(id).await;
        if outcome.is_fallback() {
            fallbacks += 1;
        }
        println!("{}", outcome.reference());
    }
    if fallbacks > 0 {
        log::info!("{} of {} id(s) used the fallback image", fallbacks, cli.ids.len());
    }

    Ok(())
}
