//! Save flow: PNG data URI plus caption and body, handed to a persistence backend.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{CaptionError, CaptionResult};
use crate::render::FrameRGBA;

/// RPC action that stores the image and queues the post.
pub const SAVE_ACTION: &str = "_salvaImmagineEPostInAttesa";

const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Snapshot handed to a [`SaveBackend`]. Built for one save call and dropped after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub png_data_uri: String,
    /// Final caption markup.
    pub caption_html: String,
    /// Post body exactly as it was opened.
    pub body_text: String,
}

impl ExportArtifact {
    pub fn new(frame: &FrameRGBA, caption_html: &str, body_text: &str) -> CaptionResult<Self> {
        let png = encode_png(frame)?;
        Ok(Self {
            png_data_uri: png_data_uri(&png),
            caption_html: caption_html.to_owned(),
            body_text: body_text.to_owned(),
        })
    }

    pub fn png_bytes(&self) -> CaptionResult<Vec<u8>> {
        decode_png_data_uri(&self.png_data_uri)
    }
}

pub fn encode_png(frame: &FrameRGBA) -> CaptionResult<Vec<u8>> {
    let rgba = frame.to_straight_rgba8();
    let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
        .ok_or_else(|| CaptionError::export("frame byte length does not match its size"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .context("encode png")
        .map_err(|e| CaptionError::export(format!("{e:#}")))?;
    Ok(out.into_inner())
}

pub fn png_data_uri(png: &[u8]) -> String {
    let mut uri = String::from(PNG_DATA_URI_PREFIX);
    base64::engine::general_purpose::STANDARD.encode_string(png, &mut uri);
    uri
}

pub fn decode_png_data_uri(uri: &str) -> CaptionResult<Vec<u8>> {
    let payload = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| CaptionError::export("not a base64 PNG data URI"))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| CaptionError::export(format!("invalid base64 payload: {e}")))
}

/// Wire envelope of the persistence RPC: `{"action": .., "data": {..}}`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SaveRequest {
    pub action: String,
    pub data: SavePayload,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SavePayload {
    #[serde(rename = "immagineBase64")]
    pub image_base64: String,
    #[serde(rename = "titolo")]
    pub title: String,
    #[serde(rename = "testo")]
    pub body: String,
}

impl From<&ExportArtifact> for SaveRequest {
    fn from(a: &ExportArtifact) -> Self {
        Self {
            action: SAVE_ACTION.to_owned(),
            data: SavePayload {
                image_base64: a.png_data_uri.clone(),
                title: a.caption_html.clone(),
                body: a.body_text.clone(),
            },
        }
    }
}

/// Reply envelope: `{"data": ..}` on success, `{"error": ".."}` on failure.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RpcResponse {
    /// Human readable status, or the backend's error as an export failure.
    pub fn into_status(self) -> CaptionResult<String> {
        if let Some(err) = self.error.filter(|e| !e.is_empty()) {
            return Err(CaptionError::export(err));
        }
        Ok(match self.data {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
    }
}

pub trait SaveBackend {
    /// Persist `artifact`, returning a status message for the user.
    fn save(&mut self, artifact: &ExportArtifact) -> CaptionResult<String>;
}

/// Writes `<stem>.png` and the `<stem>.json` save request into a directory.
#[derive(Clone, Debug)]
pub struct DirectorySaveBackend {
    dir: PathBuf,
    stem: String,
}

impl DirectorySaveBackend {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    pub fn png_path(&self) -> PathBuf {
        self.dir.join(format!("{}.png", self.stem))
    }

    pub fn request_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.stem))
    }

    fn write(&self, artifact: &ExportArtifact) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create save dir '{}'", self.dir.display()))?;
        let png = artifact.png_bytes()?;
        write_file(&self.png_path(), &png)?;
        let request = serde_json::to_vec_pretty(&SaveRequest::from(artifact))
            .context("serialize save request")?;
        write_file(&self.request_path(), &request)?;
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}

impl SaveBackend for DirectorySaveBackend {
    fn save(&mut self, artifact: &ExportArtifact) -> CaptionResult<String> {
        self.write(artifact)
            .map_err(|e| CaptionError::export(format!("{e:#}")))?;
        Ok(format!("Saved {}", self.png_path().display()))
    }
}

/// Sends the JSON request body through `send` and interprets the JSON reply.
pub struct RpcSaveBackend<F>
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    send: F,
}

impl<F> RpcSaveBackend<F>
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    pub fn new(send: F) -> Self {
        Self { send }
    }
}

impl<F> SaveBackend for RpcSaveBackend<F>
where
    F: FnMut(&str) -> anyhow::Result<String>,
{
    fn save(&mut self, artifact: &ExportArtifact) -> CaptionResult<String> {
        let body = serde_json::to_string(&SaveRequest::from(artifact))
            .map_err(|e| CaptionError::export(format!("serialize save request: {e}")))?;
        let reply = (self.send)(&body).map_err(|e| CaptionError::export(format!("{e:#}")))?;
        let response: RpcResponse = serde_json::from_str(&reply)
            .map_err(|e| CaptionError::export(format!("malformed save response: {e}")))?;
        response.into_status()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/mod.rs"]
mod tests;
