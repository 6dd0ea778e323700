use crate::model::{Channel, SearchHit, ThumbnailField, ThumbnailRef, ViewCount};
use anyhow::{Context, Result};
use serde_json::Value;
use std::future::Future;
use std::process::Stdio;
use tokio::process::Command;

pub fn watch_url(identifier: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", identifier)
}

/// External metadata provider: given an item URL, return at most `limit` hits.
pub trait VideoSearch: Send + Sync {
    fn lookup(&self, url: &str, limit: u32) -> impl Future<Output = Result<Vec<SearchHit>>> + Send;
}

/// Metadata lookups through the yt-dlp executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: String,
}

impl YtDlp {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

impl VideoSearch for YtDlp {
    async fn lookup(&self, url: &str, limit: u32) -> Result<Vec<SearchHit>> {
        let limit_str = limit.to_string();
        let output = Command::new(&self.binary)
            .args([
                "--dump-json",
                "--no-warnings",
                "--no-playlist",
                "--skip-download",
                "--playlist-end",
                limit_str.as_str(),
                url,
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to spawn {}", self.binary))?;

        if !output.status.success() {
            let err = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "yt-dlp error: {}",
                err.lines().next().unwrap_or("Unknown error")
            );
        }

        let stdout = String::from_utf8(output.stdout)?;
        let mut hits = Vec::new();
        for line in stdout.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let val: Value = serde_json::from_str(line).context("Failed to parse yt-dlp JSON")?;
            hits.push(parse_ytdlp_entry(&val));
            if hits.len() >= limit as usize {
                break;
            }
        }
        log::debug!("yt-dlp returned {} result(s) for {}", hits.len(), url);
        Ok(hits)
    }
}

/// Maps one `--dump-json` document onto the provider-neutral hit shape.
pub fn parse_ytdlp_entry(val: &Value) -> SearchHit {
    let title = val["title"].as_str().map(|s| s.to_string());

    let duration = val["duration_string"]
        .as_str()
        .map(|s| s.to_string())
        .or_else(|| val["duration"].as_f64().map(format_duration));

    let view_count = match &val["view_count"] {
        Value::Null => None,
        v => Some(ViewCount::Plain(v.clone())),
    };

    let channel = val["channel"]
        .as_str()
        .or_else(|| val["uploader"].as_str())
        .map(|s| Channel::Plain(Value::String(s.to_string())));

    // yt-dlp orders thumbnails by preference, best last.
    let thumbnails = val["thumbnails"].as_array().map(|arr| {
        ThumbnailField::Variants(
            arr.iter()
                .filter_map(|t| t["url"].as_str())
                .map(|url| ThumbnailRef { url: url.to_string() })
                .collect(),
        )
    });
    let thumbnail = val["thumbnail"]
        .as_str()
        .map(|url| ThumbnailField::Single(ThumbnailRef { url: url.to_string() }));

    SearchHit {
        title,
        duration,
        view_count,
        channel,
        thumbnails,
        thumbnail,
    }
}

pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds as u64;
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemMetadata;
    use serde_json::json;

    #[test]
    fn watch_url_is_canonical() {
        assert_eq!(watch_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn durations_format_like_the_site() {
        assert_eq!(format_duration(0.0), "00:00");
        assert_eq!(format_duration(225.0), "03:45");
        assert_eq!(format_duration(3725.9), "1:02:05");
    }

    #[test]
    fn ytdlp_document_maps_to_metadata() {
        let doc = json!({
            "id": "abc123",
            "title": "Night Drive",
            "duration": 245.0,
            "duration_string": "4:05",
            "view_count": 1532,
            "channel": "Synth Lane",
            "uploader": "Synth Lane Uploads",
            "thumbnail": "https://i.ytimg.com/vi/abc123/maxresdefault.jpg",
            "thumbnails": [
                { "url": "https://i.ytimg.com/vi/abc123/default.jpg", "preference": -10 },
                { "url": "https://i.ytimg.com/vi_webp/abc123/maxresdefault.webp?v=1", "preference": 0 }
            ]
        });

        let meta = ItemMetadata::from_hit("abc123", parse_ytdlp_entry(&doc)).unwrap();
        assert_eq!(meta.title, "Night Drive");
        assert_eq!(meta.duration_label, "4:05");
        assert_eq!(meta.view_count_label, "1532");
        assert_eq!(meta.channel_name, "Synth Lane");
        assert_eq!(
            meta.thumbnail_url,
            "https://i.ytimg.com/vi_webp/abc123/maxresdefault.webp"
        );
    }

    #[test]
    fn sparse_ytdlp_document_uses_fallback_fields() {
        let doc = json!({
            "duration": 61.0,
            "uploader": "Someone",
            "thumbnail": "https://i.ytimg.com/vi/x/hqdefault.jpg?sqp=abc"
        });

        let meta = ItemMetadata::from_hit("x", parse_ytdlp_entry(&doc)).unwrap();
        assert_eq!(meta.duration_label, "01:01");
        assert_eq!(meta.channel_name, "Someone");
        assert_eq!(meta.view_count_label, "0");
        assert_eq!(meta.thumbnail_url, "https://i.ytimg.com/vi/x/hqdefault.jpg");
    }
}
