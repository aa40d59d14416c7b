//! Model adapters: one uniform `generate` contract over each LLM vendor.
//!
//! An adapter receives a fully composed [`GenerationRequest`] and returns
//! the model's raw reply text. Turning that text into a typed record is the
//! job of [`crate::agent::Agent`], so adapters never see Rust schema types.
//!
//! Vendors are reached through [`ProviderAdapter`], which drives any
//! `edgequake_llm::LLMProvider`. Tests and callers with their own transport
//! implement [`ModelAdapter`] directly.
//!
//! Adapters never retry. A failed call is fatal to the extraction.

pub mod provider;

pub use provider::ProviderAdapter;

use crate::dependencies::Dependencies;
use crate::error::DocExtractError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Uniform generation contract implemented by every vendor adapter.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Send one request and return the model's reply text.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, DocExtractError>;

    /// Short identifier used in logs and errors, e.g. `openai:gpt-4.1-mini`.
    fn name(&self) -> &str;
}

/// Immutable per-call context: which file is being processed and the
/// caller's validated side-channel values.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionContext {
    file_path: PathBuf,
    dependencies: Dependencies,
}

impl ExtractionContext {
    pub fn new(file_path: impl Into<PathBuf>, dependencies: Dependencies) -> Self {
        Self {
            file_path: file_path.into(),
            dependencies,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }
}

/// Everything an adapter needs for one call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    /// Document-type instructions.
    pub system_prompt: &'a str,
    /// User turn carrying the extracted document text.
    pub prompt: &'a str,
    /// Name of the target record type, for logs and errors.
    pub schema_name: &'static str,
    /// Example instance of the target record (every field present).
    pub output_template: &'a Value,
    pub context: &'a ExtractionContext,
}

impl GenerationRequest<'_> {
    /// System prompt followed by the output contract.
    pub fn system_message(&self) -> String {
        let template =
            serde_json::to_string_pretty(self.output_template).unwrap_or_else(|_| "{}".into());
        format!(
            "{}\n\nRespond with a single JSON object and nothing else. \
             The object must have exactly this shape (all keys present):\n{}",
            self.system_prompt.trim_end(),
            template
        )
    }

    /// Known values from the caller, if there are any.
    pub fn context_message(&self) -> Option<String> {
        let deps = self.context.dependencies();
        if deps.is_empty() {
            return None;
        }
        let rendered = serde_json::to_string_pretty(deps).ok()?;
        Some(format!(
            "The following values are already known for this document. \
             Prefer them when the text is ambiguous:\n{rendered}"
        ))
    }
}
