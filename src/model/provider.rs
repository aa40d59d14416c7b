//! Adapter over an `edgequake_llm` provider.
//!
//! Every vendor goes through here: OpenAI and Anthropic built from an
//! explicit key, a named provider resolved from the environment, or any
//! pre-built provider the caller hands in (Gemini, Ollama, Azure, …).

use super::{GenerationRequest, ModelAdapter};
use crate::config::Provider;
use crate::error::DocExtractError;
use async_trait::async_trait;
use edgequake_llm::{
    AnthropicProvider, ChatMessage, CompletionOptions, LLMProvider, OpenAIProvider,
    ProviderFactory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Wraps an `Arc<dyn LLMProvider>` with fixed completion options.
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    json_output: bool,
    timeout: Option<Duration>,
    label: String,
}

impl std::fmt::Debug for ProviderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderAdapter")
            .field("label", &self.label)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("json_output", &self.json_output)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderAdapter {
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        label: impl Into<String>,
        temperature: f32,
        max_tokens: usize,
    ) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
            json_output: false,
            timeout: None,
            label: label.into(),
        }
    }

    /// Build the vendor's edgequake provider from an explicit API key.
    ///
    /// OpenAI calls ask for a JSON-object response. Anthropic only accepts
    /// temperatures in `0.0..=1.0`, so the value is clamped.
    pub fn with_api_key(
        vendor: Provider,
        api_key: &str,
        model: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Self {
        let label = format!("{}:{}", vendor.as_str(), model);
        match vendor {
            Provider::OpenAi => {
                let provider = OpenAIProvider::new(api_key).with_model(model);
                Self::new(Arc::new(provider), label, temperature, max_tokens).with_json_output()
            }
            Provider::Anthropic => {
                let provider = AnthropicProvider::new(api_key).with_model(model);
                Self::new(
                    Arc::new(provider),
                    label,
                    temperature.clamp(0.0, 1.0),
                    max_tokens,
                )
            }
        }
    }

    /// Build through [`ProviderFactory`], which reads the vendor's API key
    /// from the environment.
    pub fn from_env(
        provider_name: &str,
        model: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<Self, DocExtractError> {
        let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
            DocExtractError::ProviderNotConfigured {
                provider: provider_name.to_string(),
                hint: format!("{e}"),
            }
        })?;
        Ok(Self::new(
            provider,
            format!("{provider_name}:{model}"),
            temperature,
            max_tokens,
        ))
    }

    /// Request a JSON-object response from providers that support it.
    pub fn with_json_output(mut self) -> Self {
        self.json_output = true;
        self
    }

    /// Fail a call that takes longer than `secs` seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    fn build_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            response_format: self.json_output.then(|| "json_object".to_string()),
            ..Default::default()
        }
    }

    fn build_messages(request: &GenerationRequest<'_>) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(request.system_message())];
        if let Some(ctx) = request.context_message() {
            messages.push(ChatMessage::system(ctx));
        }
        messages.push(ChatMessage::user(request.prompt));
        messages
    }
}

#[async_trait]
impl ModelAdapter for ProviderAdapter {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, DocExtractError> {
        let messages = Self::build_messages(request);
        let options = self.build_options();
        let call = self.provider.chat(&messages, Some(&options));

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                DocExtractError::ProviderRequest {
                    provider: self.label.clone(),
                    message: format!("request timed out after {}s", limit.as_secs()),
                }
            })?,
            None => call.await,
        };
        let response = result.map_err(|e| DocExtractError::ProviderRequest {
            provider: self.label.clone(),
            message: format!("{e}"),
        })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.label, response.prompt_tokens, response.completion_tokens
        );
        if response.finish_reason.as_deref() == Some("content_filter") {
            return Err(DocExtractError::ProviderResponse {
                provider: self.label.clone(),
                message: "response blocked by content filter".into(),
            });
        }
        Ok(response.content)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
