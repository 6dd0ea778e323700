use thiserror::Error;

/// Every way a request can end up on the fallback image.
#[derive(Debug, Error)]
pub enum ThumbError {
    /// The provider had no result, or the result had no thumbnail.
    #[error("no usable search result")]
    LookupMiss,
    #[error("metadata search failed: {0:#}")]
    Search(anyhow::Error),
    #[error("thumbnail download returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("thumbnail download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("compositing failed: {0:#}")]
    Render(anyhow::Error),
}

impl ThumbError {
    /// Lookup misses are expected and not worth an error-level log line.
    pub fn is_expected(&self) -> bool {
        matches!(self, ThumbError::LookupMiss)
    }
}
