//! Input resolution and file-type dispatch.
//!
//! A user-supplied path or URL is normalised to a local file whose kind
//! (PDF or raster image) is known before any extraction work starts. The
//! kind comes from the extension, and the leading bytes must agree with it
//! so that a renamed `.docx` fails here instead of deep inside pdfium or
//! the image decoder.

use crate::error::DocExtractError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

/// What the extraction stage has to do with a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

/// Extensions routed to the OCR path.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

impl FileKind {
    /// Classify a path by its (case-insensitive) extension.
    pub fn from_path(path: &Path) -> Result<Self, DocExtractError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if extension == "pdf" {
            Ok(FileKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Ok(FileKind::Image)
        } else {
            Err(DocExtractError::UnsupportedFileType {
                path: path.to_path_buf(),
                extension,
            })
        }
    }
}

/// The resolved input: a local path or a downloaded temp file.
#[derive(Debug)]
pub enum ResolvedInput {
    /// Input was already a local file.
    Local { path: PathBuf, kind: FileKind },
    /// Input was a URL; the file lives in a temp directory that is removed
    /// when this value is dropped.
    Downloaded {
        path: PathBuf,
        kind: FileKind,
        _temp_dir: TempDir,
    },
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local { path, .. } => path,
            ResolvedInput::Downloaded { path, .. } => path,
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            ResolvedInput::Local { kind, .. } => *kind,
            ResolvedInput::Downloaded { kind, .. } => *kind,
        }
    }
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to a local file of known kind.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, DocExtractError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(Path::new(input))
    }
}

fn resolve_local(path: &Path) -> Result<ResolvedInput, DocExtractError> {
    let kind = FileKind::from_path(path)?;
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(DocExtractError::FileNotFound { path });
    }

    let head = read_head(&path)?;
    check_magic(&path, kind, &head)?;

    debug!("Resolved local {:?}: {}", kind, path.display());
    Ok(ResolvedInput::Local { path, kind })
}

/// The first eight bytes of the file, or fewer if it is shorter.
fn read_head(path: &Path) -> Result<Vec<u8>, DocExtractError> {
    let io_error = |e: std::io::Error| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DocExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::NotFound => DocExtractError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => DocExtractError::ReadFailed {
            path: path.to_path_buf(),
            detail: e.to_string(),
        },
    };
    let file = std::fs::File::open(path).map_err(io_error)?;
    let mut head = Vec::with_capacity(8);
    file.take(8).read_to_end(&mut head).map_err(io_error)?;
    Ok(head)
}

/// Verify the leading bytes agree with the extension.
fn check_magic(path: &Path, kind: FileKind, head: &[u8]) -> Result<(), DocExtractError> {
    match kind {
        FileKind::Pdf => {
            if !head.starts_with(b"%PDF") {
                let mut magic = [0u8; 4];
                let n = head.len().min(4);
                magic[..n].copy_from_slice(&head[..n]);
                return Err(DocExtractError::NotAPdf {
                    path: path.to_path_buf(),
                    magic,
                });
            }
        }
        FileKind::Image => {
            let is_png = head.starts_with(b"\x89PNG\r\n\x1a\n");
            let is_jpeg = head.starts_with(&[0xFF, 0xD8, 0xFF]);
            if !is_png && !is_jpeg {
                return Err(DocExtractError::ImageDecode {
                    path: path.to_path_buf(),
                    detail: "not a PNG or JPEG file".into(),
                });
            }
        }
    }
    Ok(())
}

/// Download a URL to a temporary directory and return the path.
async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, DocExtractError> {
    info!("Downloading document from: {}", url);

    let filename = extract_filename(url);
    let kind = FileKind::from_path(Path::new(&filename))?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocExtractError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DocExtractError::DownloadFailed {
            url: url.to_string(),
            reason: if e.is_timeout() {
                format!("timed out after {timeout_secs}s")
            } else {
                e.to_string()
            },
        })?;

    if !response.status().is_success() {
        return Err(DocExtractError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DocExtractError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let temp_dir = TempDir::new().map_err(|e| DocExtractError::Internal(e.to_string()))?;
    let file_path = temp_dir.path().join(&filename);
    check_magic(&file_path, kind, &bytes[..bytes.len().min(8)])?;

    tokio::fs::write(&file_path, &bytes)
        .await
        .map_err(|e| DocExtractError::Internal(format!("Failed to write temp file: {}", e)))?;

    info!("Downloaded to: {}", file_path.display());

    Ok(ResolvedInput::Downloaded {
        path: file_path,
        kind,
        _temp_dir: temp_dir,
    })
}

/// Last path segment of the URL, which must carry the extension.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }
    "download".to_string()
}
