//! Agent factory: resolve a model adapter and bind it to an output schema.
//!
//! An [`Agent<T>`] is a model adapter plus a system prompt plus the JSON
//! shape of `T`. [`Agent::run`] makes exactly one model call and parses the
//! reply into `T`.

use crate::config::{ExtractionConfig, Provider};
use crate::error::DocExtractError;
use crate::model::{ExtractionContext, GenerationRequest, ModelAdapter, ProviderAdapter};
use crate::pipeline::postprocess::extract_json_object;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

/// Builds model adapters and agents from an [`ExtractionConfig`].
pub struct AgentFactory;

impl AgentFactory {
    /// Resolve the model adapter, from most-specific to least-specific:
    ///
    /// 1. **Pre-built adapter** (`config.model_adapter`), used as-is.
    /// 2. **Pre-built edgequake provider** (`config.llm_provider`), wrapped
    ///    with the configured temperature and token limit.
    /// 3. **Provider + explicit API key**: edgequake's provider for that
    ///    vendor, built with the key.
    /// 4. **Provider without a key**: edgequake's `ProviderFactory`, which
    ///    reads the vendor's API key variable from the environment.
    ///
    /// Every resolved provider gets the configured per-call timeout.
    pub fn create_model(config: &ExtractionConfig) -> Result<Arc<dyn ModelAdapter>, DocExtractError> {
        if let Some(ref adapter) = config.model_adapter {
            debug!("Using pre-built model adapter {}", adapter.name());
            return Ok(Arc::clone(adapter));
        }

        let model = config.model_name();

        let adapter = if let Some(ref provider) = config.llm_provider {
            ProviderAdapter::new(
                Arc::clone(provider),
                format!("edgequake:{}", model),
                config.temperature,
                config.max_tokens,
            )
        } else if let Some(ref key) = config.api_key {
            ProviderAdapter::with_api_key(
                config.provider,
                key,
                model,
                config.temperature,
                config.max_tokens,
            )
        } else {
            Self::adapter_from_env(config, model)?
        };

        Ok(Arc::new(adapter.with_timeout(config.request_timeout_secs)))
    }

    fn adapter_from_env(
        config: &ExtractionConfig,
        model: &str,
    ) -> Result<ProviderAdapter, DocExtractError> {
        let temperature = match config.provider {
            Provider::OpenAi => config.temperature,
            Provider::Anthropic => config.temperature.clamp(0.0, 1.0),
        };
        let adapter = ProviderAdapter::from_env(
            config.provider.as_str(),
            model,
            temperature,
            config.max_tokens,
        )
        .map_err(|e| match e {
            DocExtractError::ProviderNotConfigured { provider, hint } => {
                DocExtractError::ProviderNotConfigured {
                    hint: format!(
                        "Set {} or pass an API key explicitly.\n{}",
                        config.provider.api_key_env(),
                        hint
                    ),
                    provider,
                }
            }
            other => other,
        })?;
        Ok(match config.provider {
            Provider::OpenAi => adapter.with_json_output(),
            Provider::Anthropic => adapter,
        })
    }

    /// Bind a freshly resolved adapter to output type `T`.
    pub fn create_agent<T>(
        config: &ExtractionConfig,
        system_prompt: impl Into<String>,
    ) -> Result<Agent<T>, DocExtractError>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let model = Self::create_model(config)?;
        Agent::new(model, system_prompt)
    }
}

/// A model adapter bound to a system prompt and output type `T`.
pub struct Agent<T> {
    model: Arc<dyn ModelAdapter>,
    system_prompt: String,
    output_template: Value,
    schema_name: &'static str,
    _output: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Agent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.model.name())
            .field("schema", &self.schema_name)
            .finish()
    }
}

impl<T> Agent<T>
where
    T: DeserializeOwned + Serialize + Default,
{
    /// The output template defaults to `T::default()` serialised.
    pub fn new(
        model: Arc<dyn ModelAdapter>,
        system_prompt: impl Into<String>,
    ) -> Result<Self, DocExtractError> {
        Ok(Self {
            model,
            system_prompt: system_prompt.into(),
            output_template: serde_json::to_value(T::default())?,
            schema_name: short_type_name::<T>(),
            _output: PhantomData,
        })
    }

    /// Replace the JSON shape shown to the model, e.g. to include one
    /// example element in each list.
    pub fn with_output_template(mut self, template: Value) -> Self {
        self.output_template = template;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    /// One model call; the reply is unwrapped from any fences or prose and
    /// deserialised into `T`.
    pub async fn run(&self, prompt: &str, context: &ExtractionContext) -> Result<T, DocExtractError> {
        let request = GenerationRequest {
            system_prompt: &self.system_prompt,
            prompt,
            schema_name: self.schema_name,
            output_template: &self.output_template,
            context,
        };

        info!(
            "Calling {} for {} ({} prompt chars)",
            self.model.name(),
            self.schema_name,
            prompt.chars().count()
        );
        let reply = self.model.generate(&request).await?;
        debug!("{} replied with {} chars", self.model.name(), reply.chars().count());

        let json = extract_json_object(&reply);
        serde_json::from_str(&json).map_err(|e| DocExtractError::SchemaParse {
            schema: self.schema_name,
            detail: e.to_string(),
        })
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependencies::Dependencies;
    use crate::error::ErrorKind;
    use crate::schema::PanCard;
    use crate::test_support::ScriptedModel;

    fn ctx() -> ExtractionContext {
        ExtractionContext::new("pan.png", Dependencies::new())
    }

    #[tokio::test]
    async fn run_parses_fenced_reply() {
        let model = Arc::new(ScriptedModel::new([
            "```json\n{\"pan_number\": \"ABCDE1234F\", \"name\": \"ASHA RAO\"}\n```",
        ]));
        let agent: Agent<PanCard> = Agent::new(model.clone(), "You are a PAN card parser.").unwrap();
        let pan = agent.run("Document Text: ...", &ctx()).await.unwrap();
        assert_eq!(pan.pan_number, "ABCDE1234F");
        assert_eq!(pan.gender, "");

        let systems = model.system_messages();
        assert_eq!(systems.len(), 1);
        assert!(systems[0].contains("\"father_name\""));
    }

    #[tokio::test]
    async fn unparseable_reply_is_a_provider_error() {
        let model = Arc::new(ScriptedModel::new(["I could not read the card."]));
        let agent: Agent<PanCard> = Agent::new(model, "sys").unwrap();
        let err = agent.run("text", &ctx()).await.unwrap_err();
        assert!(matches!(err, DocExtractError::SchemaParse { schema: "PanCard", .. }));
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[test]
    fn prebuilt_adapter_wins() {
        let model: Arc<dyn ModelAdapter> = Arc::new(ScriptedModel::new(["{}"]));
        let config = ExtractionConfig::builder()
            .api_key("sk-ignored")
            .model_adapter(Arc::clone(&model))
            .build()
            .unwrap();
        let resolved = AgentFactory::create_model(&config).unwrap();
        assert_eq!(resolved.name(), "scripted");
    }

    #[test]
    fn explicit_key_selects_vendor_provider() {
        let config = ExtractionConfig::builder()
            .provider(Provider::Anthropic)
            .api_key("sk-test")
            .model("claude-test")
            .build()
            .unwrap();
        let resolved = AgentFactory::create_model(&config).unwrap();
        assert_eq!(resolved.name(), "anthropic:claude-test");
    }

    #[test]
    fn prebuilt_edgequake_provider_is_labelled() {
        let config = ExtractionConfig::builder()
            .llm_provider(Arc::new(edgequake_llm::MockProvider::new()))
            .model("mock-model")
            .build()
            .unwrap();
        let resolved = AgentFactory::create_model(&config).unwrap();
        assert_eq!(resolved.name(), "edgequake:mock-model");
    }

    #[test]
    fn type_name_is_short() {
        assert_eq!(short_type_name::<PanCard>(), "PanCard");
    }
}
