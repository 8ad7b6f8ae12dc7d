//! Audio asset reads for the `/audio` route.
use std::io::ErrorKind;
use std::path::Path;

use axum::http::StatusCode;
use sfx_core::resolve_asset_path;
use sfx_dispatch::detect_media_type;
use tracing::{debug, warn};

pub(super) async fn serve_audio_asset(
    audio_dir: &Path,
    requested: &str,
) -> Result<(String, Vec<u8>), StatusCode> {
    let path = resolve_asset_path(audio_dir, requested).map_err(|error| {
        debug!(requested, error = %error, "rejected audio asset path");
        StatusCode::BAD_REQUEST
    })?;

    match tokio::fs::metadata(&path).await {
        Ok(metadata) if metadata.is_file() => {}
        Ok(_) => return Err(StatusCode::NOT_FOUND),
        Err(error) if error.kind() == ErrorKind::NotFound => return Err(StatusCode::NOT_FOUND),
        Err(error) => {
            warn!(path = %path.display(), error = %error, "failed to stat audio asset");
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    let bytes = tokio::fs::read(&path).await.map_err(|error| {
        warn!(path = %path.display(), error = %error, "failed to read audio asset");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok((detect_media_type(&bytes), bytes))
}
