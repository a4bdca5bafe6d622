use std::path::{Path, PathBuf};

use axum::http::{header, HeaderMap};
use rand::Rng;

use hostelhub_shared::errors::{AppError, AppResult, ErrorCode};

/// Route prefix the upload directory is served under.
pub const UPLOADS_ROUTE: &str = "/public/uploads";

/// Profile photos on local disk, served statically.
#[derive(Debug, Clone)]
pub struct PhotoStorage {
    dir: PathBuf,
    max_bytes: usize,
}

/// A photo that passed validation and is waiting to be written.
#[derive(Debug)]
pub struct PendingPhoto {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoStorage {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self { dir: dir.into(), max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Checks type and size and assigns the stored name. Nothing is written.
    pub fn accept(
        &self,
        content_type: Option<&str>,
        original_name: Option<&str>,
        bytes: Vec<u8>,
    ) -> AppResult<PendingPhoto> {
        if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
            return Err(AppError::new(ErrorCode::PhotoUploadFailed, "only image files are allowed"));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::new(
                ErrorCode::PayloadTooLarge,
                format!("photo exceeds the {} byte limit", self.max_bytes),
            ));
        }
        Ok(PendingPhoto { file_name: unique_file_name(original_name), bytes })
    }

    /// Writes the photo and returns its absolute URL under `base_url`.
    pub async fn save(&self, photo: PendingPhoto, base_url: &str) -> AppResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| AppError::internal(format!("cannot create upload dir: {e}")))?;
        tokio::fs::write(self.dir.join(&photo.file_name), &photo.bytes)
            .await
            .map_err(|e| AppError::internal(format!("cannot write photo: {e}")))?;

        tracing::info!(file = %photo.file_name, size = photo.bytes.len(), "profile photo stored");
        Ok(format!("{base_url}{UPLOADS_ROUTE}/{}", photo.file_name))
    }
}

/// `profilePhoto-<unix-millis>-<0..1e9><.ext>`, keeping the client's extension.
fn unique_file_name(original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("profilePhoto-{}-{suffix}{ext}", chrono::Utc::now().timestamp_millis())
}

/// `<proto>://<host>` as seen by the client that made this request.
pub fn public_base_url(headers: &HeaderMap) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}
