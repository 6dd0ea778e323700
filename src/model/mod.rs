use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

pub mod settings;

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_CHANNEL: &str = "Unknown Channel";
pub const ZERO_DURATION: &str = "00:00";
pub const ZERO_VIEWS: &str = "0";

const TITLE_LIMIT: usize = 28;
const TITLE_KEEP: usize = 25;
const CHANNEL_LIMIT: usize = 35;
const CHANNEL_KEEP: usize = 32;

// Word characters, whitespace and - . , ! ? ' "
static TITLE_FILTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s\-.,!?'"]"#).expect("static regex"));

/// One entry returned by the search provider, before any normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub view_count: Option<ViewCount>,
    #[serde(default)]
    pub channel: Option<Channel>,
    #[serde(default)]
    pub thumbnails: Option<ThumbnailField>,
    #[serde(default)]
    pub thumbnail: Option<ThumbnailField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ViewCount {
    Structured {
        #[serde(default)]
        short: Option<String>,
    },
    Plain(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Channel {
    Structured {
        #[serde(default)]
        name: Option<String>,
    },
    Plain(Value),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThumbnailRef {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThumbnailField {
    Variants(Vec<ThumbnailRef>),
    Single(ThumbnailRef),
}

impl ViewCount {
    /// "1.2M views" becomes "1.2M"; plain scalars are stringified as-is and
    /// anything else reads as zero.
    pub fn label(&self) -> String {
        match self {
            ViewCount::Structured { short } => short
                .as_deref()
                .unwrap_or(ZERO_VIEWS)
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_string(),
            ViewCount::Plain(value) => {
                scalar_label(value).unwrap_or_else(|| ZERO_VIEWS.to_string())
            }
        }
    }
}

impl Channel {
    pub fn label(&self) -> String {
        match self {
            Channel::Structured { name } => {
                name.clone().unwrap_or_else(|| UNKNOWN_CHANNEL.to_string())
            }
            Channel::Plain(value) => {
                scalar_label(value).unwrap_or_else(|| UNKNOWN_CHANNEL.to_string())
            }
        }
    }
}

impl ThumbnailField {
    fn is_empty(&self) -> bool {
        matches!(self, ThumbnailField::Variants(list) if list.is_empty())
    }

    /// Picks the last (largest) variant and drops any query string.
    fn resolve(&self) -> String {
        let url = match self {
            ThumbnailField::Variants(list) => list.last().map(|t| t.url.as_str()).unwrap_or(""),
            ThumbnailField::Single(single) => single.url.as_str(),
        };
        url.split('?').next().unwrap_or_default().to_string()
    }
}

/// Objects, arrays and null are malformed here and yield `None`.
fn scalar_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Normalized metadata for one item. Built once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemMetadata {
    pub identifier: String,
    pub title: String,
    pub duration_label: String,
    pub view_count_label: String,
    pub channel_name: String,
    pub thumbnail_url: String,
}

impl ItemMetadata {
    /// Returns `None` when the hit carries no usable thumbnail URL.
    pub fn from_hit(identifier: &str, hit: SearchHit) -> Option<Self> {
        let thumb_field = [hit.thumbnails.as_ref(), hit.thumbnail.as_ref()]
            .into_iter()
            .flatten()
            .find(|field| !field.is_empty());
        let thumbnail_url = thumb_field.map(ThumbnailField::resolve).unwrap_or_default();
        if thumbnail_url.is_empty() {
            return None;
        }

        Some(Self {
            identifier: identifier.to_string(),
            title: hit.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            duration_label: hit.duration.unwrap_or_else(|| ZERO_DURATION.to_string()),
            view_count_label: hit
                .view_count
                .map(|v| v.label())
                .unwrap_or_else(|| ZERO_VIEWS.to_string()),
            channel_name: hit
                .channel
                .map(|c| c.label())
                .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
            thumbnail_url,
        })
    }

    pub fn display_title(&self) -> String {
        let cleaned = TITLE_FILTER.replace_all(&self.title, "");
        truncate_with_ellipsis(&cleaned, TITLE_LIMIT, TITLE_KEEP)
    }

    pub fn display_channel(&self) -> String {
        truncate_with_ellipsis(&self.channel_name, CHANNEL_LIMIT, CHANNEL_KEEP)
    }

    pub fn meta_line(&self) -> String {
        format!("👁 {} Views • ⏱ {}", self.view_count_label, self.duration_label)
    }
}

pub fn truncate_with_ellipsis(text: &str, limit: usize, keep: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(keep).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(value: Value) -> SearchHit {
        serde_json::from_value(value).expect("valid hit")
    }

    #[test]
    fn structured_fields_are_flattened() {
        let meta = ItemMetadata::from_hit(
            "abc123",
            hit(json!({
                "title": "Test & Song!!",
                "duration": "03:45",
                "viewCount": { "short": "1.2M views", "text": "1,234,567 views" },
                "channel": { "name": "MyChannel", "id": "UC1" },
                "thumbnails": [
                    { "url": "https://x/small.jpg?a=0", "width": 120 },
                    { "url": "https://x/y.jpg?a=1", "width": 1280 }
                ]
            })),
        )
        .expect("thumbnail present");

        assert_eq!(meta.thumbnail_url, "https://x/y.jpg");
        assert_eq!(meta.view_count_label, "1.2M");
        assert_eq!(meta.channel_name, "MyChannel");
        assert_eq!(meta.duration_label, "03:45");
        assert_eq!(meta.display_title(), "Test  Song!!");
    }

    #[test]
    fn plain_fields_are_stringified() {
        let meta = ItemMetadata::from_hit(
            "id",
            hit(json!({
                "viewCount": 98765,
                "channel": "Plain Channel",
                "thumbnail": { "url": "https://x/single.jpg?sqp=1" }
            })),
        )
        .unwrap();

        assert_eq!(meta.view_count_label, "98765");
        assert_eq!(meta.channel_name, "Plain Channel");
        assert_eq!(meta.thumbnail_url, "https://x/single.jpg");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let meta = ItemMetadata::from_hit(
            "id",
            hit(json!({ "thumbnails": [{ "url": "https://x/a.jpg" }] })),
        )
        .unwrap();

        assert_eq!(meta.title, UNKNOWN_TITLE);
        assert_eq!(meta.channel_name, UNKNOWN_CHANNEL);
        assert_eq!(meta.duration_label, ZERO_DURATION);
        assert_eq!(meta.view_count_label, ZERO_VIEWS);
    }

    #[test]
    fn structured_values_without_inner_fields_use_defaults() {
        let meta = ItemMetadata::from_hit(
            "id",
            hit(json!({
                "viewCount": {},
                "channel": {},
                "thumbnails": [{ "url": "https://x/a.jpg" }]
            })),
        )
        .unwrap();

        assert_eq!(meta.view_count_label, "0");
        assert_eq!(meta.channel_name, UNKNOWN_CHANNEL);
    }

    #[test]
    fn malformed_shapes_use_defaults_not_raw_json() {
        let meta = ItemMetadata::from_hit(
            "id",
            hit(json!({
                "viewCount": { "short": 12345 },
                "channel": { "name": 7 },
                "thumbnails": [{ "url": "https://x/a.jpg" }]
            })),
        )
        .unwrap();
        assert_eq!(meta.view_count_label, ZERO_VIEWS);
        assert_eq!(meta.channel_name, UNKNOWN_CHANNEL);

        let meta = ItemMetadata::from_hit(
            "id",
            hit(json!({
                "viewCount": [1, 2],
                "channel": [7],
                "thumbnails": [{ "url": "https://x/a.jpg" }]
            })),
        )
        .unwrap();
        assert_eq!(meta.view_count_label, ZERO_VIEWS);
        assert_eq!(meta.channel_name, UNKNOWN_CHANNEL);
    }

    #[test]
    fn empty_variant_list_falls_through_to_single_thumbnail() {
        let meta = ItemMetadata::from_hit(
            "id",
            hit(json!({
                "thumbnails": [],
                "thumbnail": { "url": "https://x/fallback.jpg" }
            })),
        )
        .unwrap();

        assert_eq!(meta.thumbnail_url, "https://x/fallback.jpg");
    }

    #[test]
    fn no_thumbnail_is_a_lookup_miss() {
        assert!(ItemMetadata::from_hit("id", hit(json!({ "title": "x" }))).is_none());
        assert!(ItemMetadata::from_hit("id", hit(json!({ "thumbnails": [] }))).is_none());
        assert!(
            ItemMetadata::from_hit("id", hit(json!({ "thumbnail": { "url": "?only=query" } })))
                .is_none()
        );
    }

    #[test]
    fn long_titles_are_truncated_after_filtering() {
        let mut meta = ItemMetadata::from_hit(
            "id",
            hit(json!({ "thumbnails": [{ "url": "https://x/a.jpg" }] })),
        )
        .unwrap();

        meta.title = "a".repeat(28);
        assert_eq!(meta.display_title(), "a".repeat(28));

        meta.title = "b".repeat(29);
        let shown = meta.display_title();
        assert_eq!(shown, format!("{}...", "b".repeat(25)));
        assert_eq!(shown.chars().count(), 28);

        // Filtering happens before the length check.
        meta.title = format!("{}@@@", "c".repeat(28));
        assert_eq!(meta.display_title(), "c".repeat(28));
    }

    #[test]
    fn title_filter_keeps_allowed_punctuation() {
        let mut meta = ItemMetadata::from_hit(
            "id",
            hit(json!({ "thumbnails": [{ "url": "https://x/a.jpg" }] })),
        )
        .unwrap();
        meta.title = r#"Don't "Stop" (Live) #1?"#.to_string();
        assert_eq!(meta.display_title(), r#"Don't "Stop" Live 1?"#);
    }

    #[test]
    fn channel_names_truncate_past_35_chars() {
        assert_eq!(truncate_with_ellipsis(&"c".repeat(35), 35, 32), "c".repeat(35));
        assert_eq!(
            truncate_with_ellipsis(&"c".repeat(36), 35, 32),
            format!("{}...", "c".repeat(32))
        );
        // Counted in characters, not bytes.
        let accented = "é".repeat(30);
        assert_eq!(truncate_with_ellipsis(&accented, 35, 32), accented);
    }

    #[test]
    fn meta_line_uses_both_labels() {
        let meta = ItemMetadata::from_hit(
            "id",
            hit(json!({
                "duration": "4:20",
                "viewCount": "77",
                "thumbnails": [{ "url": "https://x/a.jpg" }]
            })),
        )
        .unwrap();
        assert_eq!(meta.meta_line(), "👁 77 Views • ⏱ 4:20");
    }
}
