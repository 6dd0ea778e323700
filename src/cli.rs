use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "Glassthumb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(help_template = "NAME:
   {name} - Glass-card video thumbnails

USAGE:
   glassthumb <video-id>... [global options]

VERSION:
   {version}

DESCRIPTION:
   {name} looks up a video, downloads its thumbnail and renders a 1920x1080
   promotional card into the cache directory. One line is printed per id:
   the path of the PNG, or the configured fallback image when anything fails.

GLOBAL OPTIONS:
{options}
")]
pub struct Cli {
    /// Video ids to render
    pub ids: Vec<String>,

    /// Read configuration from this file instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Write a commented default config file and exit
    #[arg(long)]
    pub write_config: bool,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ids_and_overrides() {
        let cli = Cli::parse_from(["glassthumb", "abc123", "xyz", "--cache-dir", "/tmp/c", "-v"]);
        assert_eq!(cli.ids, vec!["abc123", "xyz"]);
        assert_eq!(cli.cache_dir, Some(PathBuf::from("/tmp/c")));
        assert!(cli.verbose);
        assert!(!cli.write_config);
    }
}
