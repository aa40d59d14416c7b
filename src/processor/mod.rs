//! Document processors: file → text chunks → model calls → one record.
//!
//! [`DocumentProcessor<D>`] is generic over a [`DocumentKind`], the output
//! record of one document type. Everything type-specific (prompts, the
//! dependency contract, how partial results merge, what "valid" means)
//! lives in that trait; the processor owns the shared flow:
//!
//! 1. validate dependencies (no I/O yet)
//! 2. resolve the input and classify it as PDF or image
//! 3. extract text: OCR yields one chunk, a PDF yields one chunk per
//!    `chunk_size` characters of pages
//! 4. one model call per chunk, in order
//! 5. tidy each chunk's record, then fold them with [`DocumentKind::merge`]

pub mod aadhaar;
pub mod form16;
pub mod pan;

pub use pan::is_canonical_pan;

use crate::agent::{Agent, AgentFactory};
use crate::config::ExtractionConfig;
use crate::dependencies::{Dependencies, DependencyContract, DependencyValidator};
use crate::error::DocExtractError;
use crate::model::ExtractionContext;
use crate::pipeline::input::{resolve_input, FileKind, ResolvedInput};
use crate::pipeline::ocr::{extract_image_text, OcrEngine, TesseractCli};
use crate::pipeline::pdf::{extract_pdf_chunks, PdfOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Type-specific behaviour of one supported document.
pub trait DocumentKind: DeserializeOwned + Serialize + Default + Send + Sync + 'static {
    /// Document-type tag, e.g. `"pan"`.
    const DOC_TYPE: &'static str;

    /// Instructions sent as the system message.
    const SYSTEM_PROMPT: &'static str;

    /// User message embedding one chunk of document text.
    fn user_prompt(text: &str) -> String;

    /// Side-channel values this document accepts. Empty by default.
    fn dependency_contract() -> DependencyContract {
        DependencyContract::default()
    }

    /// JSON shape shown to the model.
    fn output_template() -> Result<Value, DocExtractError> {
        Ok(serde_json::to_value(Self::default())?)
    }

    /// Clean up one chunk's record before it is merged. Unchanged by default.
    fn tidy(self) -> Self {
        self
    }

    /// Combine the record so far with the record from the next chunk.
    fn merge(self, next: Self) -> Self;

    /// Deterministic post-hoc check of the extracted fields.
    fn validate(&self) -> bool;
}

/// Runs the extraction flow for document type `D`.
pub struct DocumentProcessor<D: DocumentKind> {
    agent: Agent<D>,
    validator: DependencyValidator,
    ocr: Arc<dyn OcrEngine>,
    pdf: PdfOptions,
    chunk_size: usize,
    download_timeout_secs: u64,
}

impl<D: DocumentKind> std::fmt::Debug for DocumentProcessor<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentProcessor")
            .field("doc_type", &D::DOC_TYPE)
            .field("agent", &self.agent)
            .field("chunk_size", &self.chunk_size)
            .finish()
    }
}

impl<D: DocumentKind> DocumentProcessor<D> {
    /// Build the agent and collaborators. The config's dependency contract,
    /// when set, replaces the document's built-in one.
    pub fn new(config: &ExtractionConfig) -> Result<Self, DocExtractError> {
        let agent = AgentFactory::create_agent::<D>(config, D::SYSTEM_PROMPT)?
            .with_output_template(D::output_template()?);
        let contract = config
            .dependencies
            .clone()
            .unwrap_or_else(D::dependency_contract);
        let ocr = config
            .ocr_engine
            .clone()
            .unwrap_or_else(|| Arc::new(TesseractCli::new(config.ocr_language.clone())));

        debug!("{} processor using {}", D::DOC_TYPE, agent.model_name());
        Ok(Self {
            agent,
            validator: DependencyValidator::new(contract),
            ocr,
            pdf: PdfOptions {
                password: config.password.clone(),
                library_dir: config.pdfium_lib_path.clone(),
            },
            chunk_size: config.chunk_size,
            download_timeout_secs: config.download_timeout_secs,
        })
    }

    /// Extract a `D` from a local path or HTTP(S) URL.
    pub async fn process(
        &self,
        input: impl AsRef<str>,
        dependencies: &Dependencies,
    ) -> Result<D, DocExtractError> {
        let input = input.as_ref();
        let validated = self.validator.validate(dependencies)?;

        let resolved = resolve_input(input, self.download_timeout_secs).await?;
        let chunks = self.extract_chunks(&resolved).await?;

        let context = ExtractionContext::new(resolved.path(), validated);
        let record = self.run_chunks(&chunks, &context).await?;
        info!("{}: extracted from {}", D::DOC_TYPE, input);
        Ok(record)
    }

    /// See [`DocumentKind::validate`].
    pub fn validate(&self, data: &D) -> bool {
        data.validate()
    }

    async fn extract_chunks(&self, resolved: &ResolvedInput) -> Result<Vec<String>, DocExtractError> {
        match resolved.kind() {
            FileKind::Image => {
                let text = extract_image_text(resolved.path(), self.ocr.as_ref()).await?;
                Ok(vec![text])
            }
            FileKind::Pdf => extract_pdf_chunks(resolved.path(), &self.pdf, self.chunk_size).await,
        }
    }

    /// One agent call per chunk, merged in chunk order.
    pub(crate) async fn run_chunks(
        &self,
        chunks: &[String],
        context: &ExtractionContext,
    ) -> Result<D, DocExtractError> {
        let mut merged: Option<D> = None;
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("{}: chunk {}/{}", D::DOC_TYPE, idx + 1, chunks.len());
            let part = self.agent.run(&D::user_prompt(chunk), context).await?.tidy();
            merged = Some(match merged {
                None => part,
                Some(acc) => acc.merge(part),
            });
        }
        merged.ok_or_else(|| DocExtractError::NoTextExtracted {
            path: context.file_path().to_path_buf(),
        })
    }
}
