//! Public extraction entry points.
//!
//! [`Extractor`] picks the processor for a [`DocumentType`], runs it to
//! completion and hands back either JSON text or the typed record.
//! A fresh processor (and model adapter) is built per call; nothing is
//! shared between extractions except the immutable config.

use crate::config::ExtractionConfig;
use crate::dependencies::Dependencies;
use crate::error::DocExtractError;
use crate::processor::{DocumentKind, DocumentProcessor};
use crate::schema::{AadhaarBack, AadhaarFront, Form16, PanCard};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::info;

/// The four supported documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    AadhaarFront,
    AadhaarBack,
    Pan,
    Form16,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::AadhaarFront,
        DocumentType::AadhaarBack,
        DocumentType::Pan,
        DocumentType::Form16,
    ];

    /// Canonical tag, e.g. `aadhaar_front`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::AadhaarFront => AadhaarFront::DOC_TYPE,
            DocumentType::AadhaarBack => AadhaarBack::DOC_TYPE,
            DocumentType::Pan => PanCard::DOC_TYPE,
            DocumentType::Form16 => Form16::DOC_TYPE,
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = DocExtractError;

    /// Case-insensitive; hyphens are accepted in place of underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .ok_or_else(|| DocExtractError::UnsupportedDocumentType {
                name: s.to_string(),
            })
    }
}

/// How [`Extractor::extract`] returns its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Compact JSON text, dates as ISO-8601.
    #[default]
    Json,
    /// The typed record.
    Record,
}

/// A typed extraction result for any supported document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtractedDocument {
    AadhaarFront(AadhaarFront),
    AadhaarBack(AadhaarBack),
    Pan(PanCard),
    Form16(Form16),
}

impl ExtractedDocument {
    pub fn doc_type(&self) -> DocumentType {
        match self {
            ExtractedDocument::AadhaarFront(_) => DocumentType::AadhaarFront,
            ExtractedDocument::AadhaarBack(_) => DocumentType::AadhaarBack,
            ExtractedDocument::Pan(_) => DocumentType::Pan,
            ExtractedDocument::Form16(_) => DocumentType::Form16,
        }
    }

    /// Run the document type's field checks.
    pub fn validate(&self) -> bool {
        match self {
            ExtractedDocument::AadhaarFront(d) => d.validate(),
            ExtractedDocument::AadhaarBack(d) => d.validate(),
            ExtractedDocument::Pan(d) => d.validate(),
            ExtractedDocument::Form16(d) => d.validate(),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, DocExtractError> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }
}

/// Result of [`Extractor::extract`], shaped by [`OutputFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Json(String),
    Record(ExtractedDocument),
}

impl Extraction {
    pub fn as_json(&self) -> Option<&str> {
        match self {
            Extraction::Json(s) => Some(s),
            Extraction::Record(_) => None,
        }
    }

    pub fn into_record(self) -> Option<ExtractedDocument> {
        match self {
            Extraction::Record(r) => Some(r),
            Extraction::Json(_) => None,
        }
    }
}

/// Entry point for library callers.
///
/// # Example
/// ```rust,no_run
/// use docextract::{Dependencies, DocumentType, ExtractionConfig, Extractor, OutputFormat};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = Extractor::new(ExtractionConfig::default());
/// let result = extractor
///     .extract("pan.jpg", DocumentType::Pan, OutputFormat::Json, &Dependencies::new())
///     .await?;
/// println!("{}", result.as_json().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract `doc_type` from a local path or HTTP(S) URL.
    pub async fn extract(
        &self,
        input: impl AsRef<str>,
        doc_type: DocumentType,
        format: OutputFormat,
        dependencies: &Dependencies,
    ) -> Result<Extraction, DocExtractError> {
        let record = self.extract_record(input, doc_type, dependencies).await?;
        match format {
            OutputFormat::Record => Ok(Extraction::Record(record)),
            OutputFormat::Json => Ok(Extraction::Json(record.to_json(false)?)),
        }
    }

    /// Blocking wrapper around [`Extractor::extract`].
    ///
    /// Creates a temporary tokio runtime internally, so it must not be
    /// called from inside an async context.
    pub fn extract_sync(
        &self,
        input: impl AsRef<str>,
        doc_type: DocumentType,
        format: OutputFormat,
        dependencies: &Dependencies,
    ) -> Result<Extraction, DocExtractError> {
        tokio::runtime::Runtime::new()
            .map_err(|e| DocExtractError::Internal(format!("Failed to create tokio runtime: {}", e)))?
            .block_on(self.extract(input, doc_type, format, dependencies))
    }

    /// Shorthand for [`OutputFormat::Json`].
    pub async fn extract_json(
        &self,
        input: impl AsRef<str>,
        doc_type: DocumentType,
        dependencies: &Dependencies,
    ) -> Result<String, DocExtractError> {
        let record = self.extract_record(input, doc_type, dependencies).await?;
        record.to_json(false)
    }

    /// Extract and return the typed record.
    pub async fn extract_record(
        &self,
        input: impl AsRef<str>,
        doc_type: DocumentType,
        dependencies: &Dependencies,
    ) -> Result<ExtractedDocument, DocExtractError> {
        let input = input.as_ref();
        let start = Instant::now();
        info!("Extracting {} from {}", doc_type, input);

        let record = match doc_type {
            DocumentType::AadhaarFront => {
                ExtractedDocument::AadhaarFront(self.run::<AadhaarFront>(input, dependencies).await?)
            }
            DocumentType::AadhaarBack => {
                ExtractedDocument::AadhaarBack(self.run::<AadhaarBack>(input, dependencies).await?)
            }
            DocumentType::Pan => ExtractedDocument::Pan(self.run::<PanCard>(input, dependencies).await?),
            DocumentType::Form16 => {
                ExtractedDocument::Form16(self.run::<Form16>(input, dependencies).await?)
            }
        };

        info!("{} done in {}ms", doc_type, start.elapsed().as_millis());
        Ok(record)
    }

    async fn run<D: DocumentKind>(
        &self,
        input: &str,
        dependencies: &Dependencies,
    ) -> Result<D, DocExtractError> {
        DocumentProcessor::<D>::new(&self.config)?
            .process(input, dependencies)
            .await
    }
}
