use crate::compose::{self, text::FontSet};
use crate::error::ThumbError;
use crate::model::ItemMetadata;
use crate::model::settings::Settings;
use crate::sys::cache::{self, CachePaths, KeyedLocks};
use crate::sys::image as sys_image;
use crate::sys::yt::{self, VideoSearch};
use anyhow::anyhow;
use std::path::PathBuf;
use std::sync::Arc;

/// What a request produced. Never an error: failures carry the fallback.
#[derive(Debug)]
pub enum Outcome {
    Ready { path: PathBuf, cached: bool },
    Fallback { reference: String, cause: ThumbError },
}

impl Outcome {
    /// Path or URL to hand back to the caller.
    pub fn reference(&self) -> String {
        match self {
            Outcome::Ready { path, .. } => path.to_string_lossy().to_string(),
            Outcome::Fallback { reference, .. } => reference.clone(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Outcome::Fallback { .. })
    }
}

pub struct Generator<S> {
    search: S,
    client: reqwest::Client,
    fonts: Arc<FontSet>,
    settings: Settings,
    locks: KeyedLocks,
}

impl<S: VideoSearch> Generator<S> {
    pub fn new(settings: Settings, search: S) -> Self {
        let fonts = FontSet::load(&settings.title_font, &settings.body_font);
        Self::with_fonts(settings, search, fonts)
    }

    pub fn with_fonts(settings: Settings, search: S, fonts: FontSet) -> Self {
        Self {
            search,
            client: reqwest::Client::new(),
            fonts: Arc::new(fonts),
            settings,
            locks: KeyedLocks::default(),
        }
    }

    /// Returns the cached thumbnail for `identifier`, generating it first if
    /// needed. Any failure yields the configured fallback reference.
    pub async fn generate(&self, identifier: &str) -> Outcome {
        let paths = CachePaths::new(&self.settings.cache_dir, identifier);
        if paths.is_cached() {
            return Outcome::Ready { path: paths.output, cached: true };
        }

        let result = {
            let entry = self.locks.entry(identifier);
            let _guard = entry.lock().await;
            // Another request may have finished while we waited.
            if paths.is_cached() {
                Ok(true)
            } else {
                self.run_pipeline(identifier, &paths).await.map(|_| false)
            }
        };

        match result {
            Ok(cached) => Outcome::Ready { path: paths.output, cached },
            Err(cause) => {
                if cause.is_expected() {
                    log::info!("No thumbnail source for {}: {}", identifier, cause);
                } else {
                    log::error!("Thumbnail generation failed for {}: {:?}", identifier, cause);
                }
                Outcome::Fallback {
                    reference: self.settings.fallback_image.clone(),
                    cause,
                }
            }
        }
    }

    async fn run_pipeline(&self, identifier: &str, paths: &CachePaths) -> Result<(), ThumbError> {
        let meta = self.fetch_metadata(identifier).await?;
        log::debug!("Metadata for {}: {:?}", identifier, meta);

        sys_image::download_image(&self.client, &meta.thumbnail_url, &paths.raw).await?;

        let fonts = Arc::clone(&self.fonts);
        let watermark = self.settings.watermark.clone();
        let raw = paths.raw.clone();
        let output = paths.output.clone();
        tokio::task::spawn_blocking(move || {
            let source = sys_image::load_source(&raw);
            let canvas = compose::compose(&source, &meta, &fonts, &watermark);
            cache::write_png(canvas, &output)
        })
        .await
        .map_err(|e| ThumbError::Render(anyhow!("compositing task aborted: {e}")))?
        .map_err(ThumbError::Render)?;

        cache::discard_raw(&paths.raw);
        log::info!("Generated {}", paths.output.display());
        Ok(())
    }

    async fn fetch_metadata(&self, identifier: &str) -> Result<ItemMetadata, ThumbError> {
        let hits = self
            .search
            .lookup(&yt::watch_url(identifier), 1)
            .await
            .map_err(ThumbError::Search)?;
        let hit = hits.into_iter().next().ok_or(ThumbError::LookupMiss)?;
        ItemMetadata::from_hit(identifier, hit).ok_or(ThumbError::LookupMiss)
    }
}
