//! Configuration types for document extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`],
//! built via its [`ExtractionConfigBuilder`]. The config is immutable once
//! built and is shared by reference with the agent factory and every
//! processor created from it.

use crate::dependencies::DependencyContract;
use crate::error::DocExtractError;
use crate::model::ModelAdapter;
use crate::pipeline::ocr::OcrEngine;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Registered LLM vendors.
///
/// Adding a vendor means adding a variant here and one constructor arm in
/// [`crate::agent::AgentFactory::create_model`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    Anthropic,
}

impl Provider {
    /// Registry name, as accepted by [`Provider::from_str`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
        }
    }

    /// Environment variable holding this vendor's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }

    /// Model used when the caller does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4.1-mini",
            Provider::Anthropic => "claude-sonnet-4-20250514",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = DocExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            _ => Err(DocExtractError::UnsupportedProvider {
                name: s.to_string(),
            }),
        }
    }
}

/// Configuration for an extraction run.
///
/// # Example
/// ```rust
/// use docextract::{ExtractionConfig, Provider};
///
/// let config = ExtractionConfig::builder()
///     .provider(Provider::Anthropic)
///     .model("claude-sonnet-4-20250514")
///     .chunk_size(6000)
///     .build()
///     .unwrap();
/// assert_eq!(config.chunk_size, 6000);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// LLM vendor. Default: OpenAI.
    pub provider: Provider,

    /// Model identifier. If None, uses [`Provider::default_model`].
    pub model: Option<String>,

    /// API key. If None, the vendor's environment variable is consulted
    /// by the edgequake provider factory.
    pub api_key: Option<String>,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Maximum tokens the model may generate per call. Default: 4096.
    pub max_tokens: usize,

    /// Maximum characters per PDF text chunk. Default: 4000.
    pub chunk_size: usize,

    /// Overrides the document type's built-in dependency contract.
    pub dependencies: Option<DependencyContract>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Directory containing the pdfium shared library. If None,
    /// `PDFIUM_LIB_PATH` and then the system loader are tried.
    pub pdfium_lib_path: Option<PathBuf>,

    /// Tesseract language code(s), e.g. "eng" or "eng+hin". Default: "eng".
    pub ocr_language: String,

    /// Per-call timeout for model requests, in seconds. Default: 120.
    pub request_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Pre-constructed model adapter. Takes precedence over everything else.
    pub model_adapter: Option<Arc<dyn ModelAdapter>>,

    /// Pre-constructed edgequake provider. Used when no adapter is given.
    pub llm_provider: Option<Arc<dyn LLMProvider>>,

    /// OCR engine for image inputs. If None, the Tesseract CLI is used.
    pub ocr_engine: Option<Arc<dyn OcrEngine>>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            temperature: 0.7,
            max_tokens: 4096,
            chunk_size: 4000,
            dependencies: None,
            password: None,
            pdfium_lib_path: None,
            ocr_language: "eng".to_string(),
            request_timeout_secs: 120,
            download_timeout_secs: 120,
            model_adapter: None,
            llm_provider: None,
            ocr_engine: None,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("chunk_size", &self.chunk_size)
            .field("dependencies", &self.dependencies)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("pdfium_lib_path", &self.pdfium_lib_path)
            .field("ocr_language", &self.ocr_language)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("model_adapter", &self.model_adapter.as_ref().map(|a| a.name().to_string()))
            .field("llm_provider", &self.llm_provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("ocr_engine", &self.ocr_engine.as_ref().map(|_| "<dyn OcrEngine>"))
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The model to call: explicit, or the provider default.
    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn provider(mut self, provider: Provider) -> Self {
        self.config.provider = provider;
        self
    }

    /// Set the provider from its registry name.
    pub fn provider_name(self, name: &str) -> Result<Self, DocExtractError> {
        let provider = name.parse()?;
        Ok(self.provider(provider))
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.config.chunk_size = n;
        self
    }

    pub fn dependencies(mut self, contract: DependencyContract) -> Self {
        self.config.dependencies = Some(contract);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn model_adapter(mut self, adapter: Arc<dyn ModelAdapter>) -> Self {
        self.config.model_adapter = Some(adapter);
        self
    }

    pub fn llm_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.llm_provider = Some(provider);
        self
    }

    pub fn ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.config.ocr_engine = Some(engine);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, DocExtractError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(DocExtractError::InvalidConfig(
                "Chunk size must be ≥ 1".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(DocExtractError::InvalidConfig(
                "Max tokens must be ≥ 1".into(),
            ));
        }
        if c.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(DocExtractError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        if c.ocr_language.trim().is_empty() {
            return Err(DocExtractError::InvalidConfig(
                "OCR language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn defaults() {
        let c = ExtractionConfig::default();
        assert_eq!(c.provider, Provider::OpenAi);
        assert_eq!(c.chunk_size, 4000);
        assert_eq!(c.temperature, 0.7);
        assert_eq!(c.model_name(), "gpt-4.1-mini");
    }

    #[test]
    fn provider_from_str() {
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);
        assert_eq!(" Anthropic ".parse::<Provider>().unwrap(), Provider::Anthropic);
        let err = "gemini".parse::<Provider>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = ExtractionConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_zero_chunk_size() {
        let err = ExtractionConfig::builder().chunk_size(0).build().unwrap_err();
        assert!(matches!(err, DocExtractError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_blank_model() {
        assert!(ExtractionConfig::builder().model("  ").build().is_err());
    }

    #[test]
    fn provider_name_rejects_unknown() {
        assert!(ExtractionConfig::builder().provider_name("cohere").is_err());
        let c = ExtractionConfig::builder()
            .provider_name("anthropic")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(c.model_name(), "claude-sonnet-4-20250514");
    }

    #[test]
    fn debug_redacts_secrets() {
        let c = ExtractionConfig::builder()
            .api_key("sk-secret")
            .password("hunter2")
            .build()
            .unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-secret"));
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
