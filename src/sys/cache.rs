use anyhow::{Context, Result};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Idempotent; safe to call on every start.
pub fn ensure_cache_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)
}

#[derive(Debug, Clone)]
pub struct CachePaths {
    pub output: PathBuf,
    pub raw: PathBuf,
}

impl CachePaths {
    pub fn new(dir: &Path, identifier: &str) -> Self {
        Self {
            output: dir.join(format!("{identifier}_glass_fix.png")),
            raw: dir.join(format!("raw_{identifier}.jpg")),
        }
    }

    pub fn is_cached(&self) -> bool {
        self.output.is_file()
    }
}

/// Flattens to RGB and writes a PNG straight to `path`.
pub fn write_png(canvas: RgbaImage, path: &Path) -> Result<()> {
    let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let encoder = PngEncoder::new_with_quality(
        BufWriter::new(file),
        CompressionType::Best,
        FilterType::Adaptive,
    );
    encoder
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .context("Failed to encode PNG")?;
    Ok(())
}

pub fn discard_raw(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            log::warn!("Could not remove {}: {}", path.display(), e);
        }
    }
}

/// One async mutex per identifier so identical requests in this process
/// run the pipeline once.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl KeyedLocks {
    /// Shared handle for `key`. The map entry goes away when the last handle
    /// is dropped, including when the owning future is cancelled.
    pub fn entry(&self, key: &str) -> KeyedLock<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let lock = locks.entry(key.to_string()).or_default().clone();
        KeyedLock {
            owner: self,
            key: key.to_string(),
            lock,
        }
    }

    fn release(&self, key: &str, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Map entry plus ours.
        if Arc::strong_count(lock) <= 2 {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub struct KeyedLock<'a> {
    owner: &'a KeyedLocks,
    key: String,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl KeyedLock<'_> {
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.lock.lock().await
    }
}

impl Drop for KeyedLock<'_> {
    fn drop(&mut self) {
        self.owner.release(&self.key, &self.lock);
    }
}
