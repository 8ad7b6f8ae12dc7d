//! Resolves command assets into bytes plus a content-sniffed media type.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Aliases normalized to the labels browsers expect in a data URI.
const MEDIA_TYPE_ALIASES: &[(&str, &str)] = &[
    ("audio/x-wav", "audio/wav"),
    ("audio/x-flac", "audio/flac"),
    ("audio/x-aiff", "audio/aiff"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub media_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("failed to read payload {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("payload file is empty: {}", path.display())]
    Empty { path: PathBuf },
}

#[async_trait]
/// Loads the asset behind a command's `file_path`.
pub trait PayloadLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<Payload, PayloadError>;
}

#[derive(Debug, Clone, Default)]
/// Reads assets from disk on every call; relative paths resolve against `root`.
pub struct FsPayloadLoader {
    root: PathBuf,
}

impl FsPayloadLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

#[async_trait]
impl PayloadLoader for FsPayloadLoader {
    async fn load(&self, path: &Path) -> Result<Payload, PayloadError> {
        let resolved = self.resolve(path);
        let bytes = tokio::fs::read(&resolved)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => PayloadError::NotFound {
                    path: resolved.clone(),
                },
                _ => PayloadError::Read {
                    path: resolved.clone(),
                    source,
                },
            })?;
        if bytes.is_empty() {
            return Err(PayloadError::Empty { path: resolved });
        }
        Ok(Payload {
            media_type: detect_media_type(&bytes),
            bytes,
        })
    }
}

/// Sniffs the media type from magic bytes; the file extension is never consulted.
pub fn detect_media_type(bytes: &[u8]) -> String {
    let detected = infer::get(bytes)
        .map(|kind| kind.mime_type())
        .unwrap_or(FALLBACK_MEDIA_TYPE);
    MEDIA_TYPE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == detected)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(detected)
        .to_string()
}

#[cfg(test)]
pub(crate) fn wav_fixture_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&36u32.to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8_000u32.to_le_bytes());
    bytes.extend_from_slice(&8_000u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&8u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes
}
