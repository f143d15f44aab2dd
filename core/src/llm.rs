use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::BackendConfig;
use crate::error::BackendError;
use crate::kind::AnalysisKind;

const SYSTEM_PROMPT: &str = "You are a business analyst. Answer with a single JSON object \
that conforms to the provided JSON schema. Do not add fields that the schema does not declare.";

/// Everything the backend needs for one call. Built fresh per request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: AnalysisKind,
    pub instruction: String,
    /// JSON-Schema rendering of the expected output.
    pub output_schema: Value,
}

/// The single capability the core needs from a model provider:
/// "generate text steered toward this shape".
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError>;
}

pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    /// Fails when `base_url` is not an http(s) URL; the client would
    /// otherwise only complain on the first request.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut openai = OpenAIConfig::new().with_api_key(config.api_key.clone());
        if let Some(base) = &config.base_url {
            let base = base.trim().trim_end_matches('/');
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                bail!("OPENAI_BASE_URL must be an http(s) URL, got '{}'", base);
            }
            openai = openai.with_api_base(base);
        }
        let client = Client::with_config(openai);

        info!("Brain connected. Model: {}", config.model);
        Ok(Self {
            client,
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Connectivity check used at startup.
    pub async fn ping(&self) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content("Hello! Reply with 'System Online'.")
                    .build()?,
            )])
            .build()?;

        let response = self.client.chat().create(request).await?;
        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

#[async_trait]
impl GenerativeBackend for OpenAiBackend {
    async fn generate(&self, request: GenerationRequest) -> Result<String, BackendError> {
        let transport = |e: async_openai::error::OpenAIError| BackendError::Transport(e.to_string());

        // 1. Steer the output: system instructions + the schema as response format
        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some(format!("Structured result of a {} request", request.kind)),
                name: request.kind.slug().replace('-', "_"),
                schema: Some(request.output_schema),
                strict: None,
            },
        };

        // 2. Prepare the Request
        let chat = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages([
                ChatCompletionRequestMessage::System(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(SYSTEM_PROMPT)
                        .build()
                        .map_err(transport)?,
                ),
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(request.instruction)
                        .build()
                        .map_err(transport)?,
                ),
            ])
            .response_format(response_format)
            .build()
            .map_err(transport)?;

        // 3. Send to AI
        let response = self.client.chat().create(chat).await.map_err(transport)?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(BackendError::EmptyResponse)?;

        debug!(kind = %request.kind, bytes = content.len(), "backend answered");
        Ok(content)
    }
}
