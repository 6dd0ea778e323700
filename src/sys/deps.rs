use anyhow::{bail, Context, Result};
use std::process::Command;

/// Returns the installed yt-dlp version string.
pub fn check_yt_dlp(binary: &str) -> Result<String> {
    let output = Command::new(binary)
        .arg("--version")
        .output()
        .with_context(|| format!("Failed to execute {binary}. Is it installed and in your PATH?"))?;

    if !output.status.success() {
        bail!("{} command failed with status: {}", binary, output.status);
    }

    let version_str = String::from_utf8(output.stdout)?.trim().to_string();
    Ok(version_str)
}
