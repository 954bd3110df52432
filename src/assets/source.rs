use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{CaptionError, CaptionResult};

/// Fetches encoded background image bytes by URL.
///
/// Fetching is the host's business (HTTP, proxy, cache); the editor only needs bytes it can
/// read pixels from, since export re-encodes the canvas.
pub trait ImageSource {
    fn fetch(&mut self, url: &str) -> CaptionResult<Vec<u8>>;
}

/// Reads images from the local filesystem.
///
/// Accepts `file://` URLs, absolute paths, and paths relative to `root`.
#[derive(Clone, Debug)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> CaptionResult<PathBuf> {
        let url = url.trim();
        if url.is_empty() {
            return Err(CaptionError::image_load("image url must be non-empty"));
        }
        if let Some(rest) = url.strip_prefix("file://") {
            return Ok(PathBuf::from(rest));
        }
        if url.contains("://") {
            return Err(CaptionError::image_load(format!(
                "unsupported url scheme in '{url}'"
            )));
        }
        let p = Path::new(url);
        if p.is_absolute() {
            Ok(p.to_path_buf())
        } else {
            Ok(self.root.join(p))
        }
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&mut self, url: &str) -> CaptionResult<Vec<u8>> {
        let path = self.resolve(url)?;
        std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))
            .map_err(|e| CaptionError::image_load(format!("{e:#}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
