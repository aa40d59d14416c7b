//! Image path: decode → grayscale → binarize → OCR.
//!
//! Scanned ID cards come in with coloured security backgrounds and uneven
//! lighting. A global Otsu threshold separates ink from background well
//! enough for Tesseract to read names and numbers reliably, and it needs no
//! tuning per document.
//!
//! Decoding and thresholding are CPU-bound, so they run on
//! `spawn_blocking`; the OCR engine itself is behind the [`OcrEngine`] trait
//! so tests (and callers with a different engine) can replace Tesseract.

use crate::error::DocExtractError;
use crate::pipeline::postprocess::clean_ocr_text;
use async_trait::async_trait;
use image::{GrayImage, ImageFormat};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Turns a binarized page image into text.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &GrayImage) -> Result<String, DocExtractError>;
}

/// Runs the `tesseract` command-line tool.
#[derive(Debug, Clone)]
pub struct TesseractCli {
    binary: PathBuf,
    language: String,
}

impl Default for TesseractCli {
    fn default() -> Self {
        Self::new("eng")
    }
}

impl TesseractCli {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            binary: PathBuf::from("tesseract"),
            language: language.into(),
        }
    }

    /// Use a tesseract executable that is not on `PATH`.
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }
}

#[async_trait]
impl OcrEngine for TesseractCli {
    async fn recognize(&self, image: &GrayImage) -> Result<String, DocExtractError> {
        let owned = image.clone();
        let tmp = tokio::task::spawn_blocking(move || -> Result<_, DocExtractError> {
            let tmp = tempfile::Builder::new()
                .prefix("docextract-ocr-")
                .suffix(".png")
                .tempfile()
                .map_err(|e| DocExtractError::Internal(format!("tempfile: {e}")))?;
            owned
                .save_with_format(tmp.path(), ImageFormat::Png)
                .map_err(|e| DocExtractError::OcrFailed(format!("could not stage image: {e}")))?;
            Ok(tmp)
        })
        .await
        .map_err(|e| DocExtractError::Internal(format!("OCR staging task panicked: {e}")))??;

        let output = Command::new(&self.binary)
            .arg(tmp.path())
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DocExtractError::OcrFailed(format!(
                        "'{}' not found; install Tesseract or put it on PATH",
                        self.binary.display()
                    ))
                } else {
                    DocExtractError::OcrFailed(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(DocExtractError::OcrFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        // `tmp` lives until here so tesseract could read it.
        drop(tmp);
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Grayscale + global Otsu threshold.
pub fn binarize(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    debug!("Otsu threshold level: {}", level);
    threshold(image, level, ThresholdType::Binary)
}

fn load_binarized(path: &Path) -> Result<GrayImage, DocExtractError> {
    let decoded = image::open(path).map_err(|e| DocExtractError::ImageDecode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let gray = decoded.to_luma8();
    debug!("Decoded {} → {}x{} px", path.display(), gray.width(), gray.height());
    Ok(binarize(&gray))
}

/// Run the full image path and return cleaned, non-empty text.
pub async fn extract_image_text(
    path: &Path,
    engine: &dyn OcrEngine,
) -> Result<String, DocExtractError> {
    let owned = path.to_path_buf();
    let binarized = tokio::task::spawn_blocking(move || load_binarized(&owned))
        .await
        .map_err(|e| DocExtractError::Internal(format!("Image decode task panicked: {e}")))??;

    let raw = engine.recognize(&binarized).await?;
    let text = clean_ocr_text(&raw);
    if text.is_empty() {
        return Err(DocExtractError::NoTextExtracted {
            path: path.to_path_buf(),
        });
    }
    info!("OCR extracted {} chars from {}", text.chars().count(), path.display());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    struct FixedOcr(&'static str);

    #[async_trait]
    impl OcrEngine for FixedOcr {
        async fn recognize(&self, _image: &GrayImage) -> Result<String, DocExtractError> {
            Ok(self.0.to_string())
        }
    }

    fn write_png(dir: &Path, name: &str) -> PathBuf {
        let img = GrayImage::from_fn(40, 20, |x, _| if x < 20 { Luma([30]) } else { Luma([220]) });
        let path = dir.join(name);
        img.save_with_format(&path, ImageFormat::Png).unwrap();
        path
    }

    #[test]
    fn binarize_produces_two_levels() {
        let img = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 40 } else { 200 }]));
        let out = binarize(&img);
        assert!(out.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(out.get_pixel(0, 0)[0], 0);
        assert_eq!(out.get_pixel(9, 0)[0], 255);
    }

    #[tokio::test]
    async fn text_is_cleaned_and_returned() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "card.png");
        let text = extract_image_text(&path, &FixedOcr("  Asha Rao  \r\n1234 5678 9012\n"))
            .await
            .unwrap();
        assert_eq!(text, "Asha Rao\n1234 5678 9012");
    }

    #[tokio::test]
    async fn blank_ocr_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "blank.png");
        let err = extract_image_text(&path, &FixedOcr(" \n \u{000C}")).await.unwrap_err();
        assert!(matches!(err, DocExtractError::NoTextExtracted { .. }));
    }

    #[tokio::test]
    async fn undecodable_image_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\ntruncated").unwrap();
        let err = extract_image_text(&path, &FixedOcr("never used")).await.unwrap_err();
        assert!(matches!(err, DocExtractError::ImageDecode { .. }));
    }
}
