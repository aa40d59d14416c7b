//! # docextract
//!
//! Extract structured fields from Indian identity and tax documents
//! (Aadhaar front and back, PAN card, Form 16) using OCR plus an LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file / URL
//!  │
//!  ├─ 1. Deps     validate caller-supplied known values (no I/O)
//!  ├─ 2. Input    resolve, classify by extension, check magic bytes
//!  ├─ 3. Text     image: grayscale → Otsu → Tesseract
//!  │              PDF:   pdfium text layer → page chunks
//!  ├─ 4. Model    one call per chunk (OpenAI / Anthropic / any edgequake provider)
//!  ├─ 5. Merge    fold per-chunk records into one
//!  └─ 6. Output   typed record or JSON (ISO-8601 dates)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docextract::{Dependencies, DocumentType, ExtractionConfig, Extractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key read from OPENAI_API_KEY
//!     let extractor = Extractor::new(ExtractionConfig::default());
//!     let json = extractor
//!         .extract_json("aadhaar_front.jpg", DocumentType::AadhaarFront, &Dependencies::new())
//!         .await?;
//!     println!("{json}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docextract` binary (clap + anyhow + tracing-subscriber) |
//!
//! ## Runtime requirements
//!
//! Image inputs need the `tesseract` binary on `PATH` (or a custom
//! [`OcrEngine`]). PDF inputs need the pdfium shared library, found through
//! `PDFIUM_LIB_PATH` or the system loader.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod agent;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod processor;
pub mod prompts;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use agent::{Agent, AgentFactory};
pub use config::{ExtractionConfig, ExtractionConfigBuilder, Provider};
pub use dependencies::{
    Dependencies, DependencyContract, DependencyKind, DependencySpec, DependencyValidator,
};
pub use error::{DocExtractError, ErrorKind};
pub use extract::{DocumentType, ExtractedDocument, Extraction, Extractor, OutputFormat};
pub use model::{ExtractionContext, GenerationRequest, ModelAdapter};
pub use pipeline::ocr::{OcrEngine, TesseractCli};
pub use processor::{is_canonical_pan, DocumentKind, DocumentProcessor};
pub use schema::{AadhaarBack, AadhaarFront, Form16, PanCard};
