//! PDF path: per-page text via pdfium, then character-budget chunking.
//!
//! Form 16 certificates are born-digital, so their text layer is read
//! directly. Nothing is rasterised.
//!
//! All pdfium calls happen inside `spawn_blocking`. Binding is resolved in
//! this order: the configured library directory, `PDFIUM_LIB_PATH`, then
//! the system dynamic loader.

use crate::error::DocExtractError;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Options the PDF stage needs from the extraction config.
#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    pub password: Option<String>,
    pub library_dir: Option<PathBuf>,
}

/// Read every page's text and group the pages into chunks of at most
/// `chunk_size` characters (a single oversized page forms its own chunk).
pub async fn extract_pdf_chunks(
    pdf_path: &Path,
    options: &PdfOptions,
    chunk_size: usize,
) -> Result<Vec<String>, DocExtractError> {
    let path = pdf_path.to_path_buf();
    let opts = options.clone();

    let pages = tokio::task::spawn_blocking(move || read_page_texts(&path, &opts))
        .await
        .map_err(|e| DocExtractError::Internal(format!("PDF text task panicked: {}", e)))??;

    let chunks = chunk_pages(&pages, chunk_size);
    if chunks.is_empty() {
        return Err(DocExtractError::NoTextExtracted {
            path: pdf_path.to_path_buf(),
        });
    }
    info!(
        "PDF {}: {} pages → {} chunks",
        pdf_path.display(),
        pages.len(),
        chunks.len()
    );
    Ok(chunks)
}

/// Group page texts into chunks.
///
/// Pages are appended to the current chunk while the combined length stays
/// within `threshold`. A page that would push it over closes the current
/// chunk and starts the next one. Lengths are counted in characters.
/// Pages holding only whitespace are skipped, so every chunk has text.
pub fn chunk_pages(pages: &[String], threshold: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for page in pages {
        if page.trim().is_empty() {
            continue;
        }
        let page_len = page.chars().count();
        if current_len + page_len > threshold {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            current.push_str(page);
            current_len = page_len;
        } else {
            current.push_str(page);
            current_len += page_len;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, DocExtractError> {
    let configured = library_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os("PDFIUM_LIB_PATH").map(PathBuf::from));

    let bindings = match configured {
        Some(dir) => {
            debug!("Binding pdfium from {}", dir.display());
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
                .or_else(|_| Pdfium::bind_to_system_library())
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| DocExtractError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn read_page_texts(pdf_path: &Path, options: &PdfOptions) -> Result<Vec<String>, DocExtractError> {
    let pdfium = bind_pdfium(options.library_dir.as_deref())?;
    let password = options.password.as_deref();

    let document = pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                DocExtractError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                DocExtractError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            DocExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })?;

    let mut texts = Vec::with_capacity(document.pages().len() as usize);
    for (idx, page) in document.pages().iter().enumerate() {
        let text = page
            .text()
            .map_err(|e| DocExtractError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: format!("page {}: {:?}", idx + 1, e),
            })?
            .all();
        debug!("Page {}: {} chars", idx + 1, text.chars().count());
        texts.push(text);
    }
    Ok(texts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(lens: &[usize]) -> Vec<String> {
        lens.iter()
            .enumerate()
            .map(|(i, &n)| char::from(b'a' + i as u8).to_string().repeat(n))
            .collect()
    }

    #[test]
    fn small_pages_share_a_chunk() {
        let chunks = chunk_pages(&pages(&[10, 20, 30]), 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 60);
    }

    #[test]
    fn exceeding_threshold_starts_new_chunk() {
        let chunks = chunk_pages(&pages(&[60, 50, 40]), 100);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a".repeat(60));
        assert_eq!(chunks[1], format!("{}{}", "b".repeat(50), "c".repeat(40)));
    }

    #[test]
    fn exactly_at_threshold_stays_together() {
        let chunks = chunk_pages(&pages(&[50, 50]), 100);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn oversized_page_is_its_own_chunk() {
        let chunks = chunk_pages(&pages(&[250, 10]), 100);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 250);
        assert_eq!(chunks[1].len(), 10);
    }

    #[test]
    fn no_empty_chunks() {
        assert!(chunk_pages(&[], 100).is_empty());
        assert!(chunk_pages(&[String::new(), String::new()], 100).is_empty());
        let chunks = chunk_pages(&pages(&[0, 120, 0]), 100);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn whitespace_pages_are_skipped() {
        let blank = vec!["\r\n".to_string(), " ".to_string(), "\n\t".to_string()];
        assert!(chunk_pages(&blank, 100).is_empty());

        let mixed = vec!["\r\n".to_string(), "TAN: BLRA12345B".to_string(), " \n".to_string()];
        assert_eq!(chunk_pages(&mixed, 100), vec!["TAN: BLRA12345B".to_string()]);
    }

    #[test]
    fn chunks_preserve_page_order_and_content() {
        let input = pages(&[30, 80, 30, 90]);
        let chunks = chunk_pages(&input, 100);
        assert_eq!(chunks.concat(), input.concat());
        assert!(chunks.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn length_is_counted_in_chars() {
        let input = vec!["é".repeat(60), "é".repeat(40)];
        assert_eq!(chunk_pages(&input, 100).len(), 1);
    }
}
