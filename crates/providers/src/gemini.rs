//! Gemini provider implementation.
//!
//! Talks to the `models/{model}:generateContent` REST endpoint with
//! function calling enabled. Supports:
//! - System instructions
//! - Function declarations built from the tool catalog
//! - Function call / function response round trips
//! - Disabling tool use for a forced final answer (`ToolChoice::None`)

use async_trait::async_trait;
use cowork_core::error::ProviderError;
use cowork_core::message::{Role, Turn, TurnContent};
use cowork_core::provider::*;
use cowork_core::tool::ToolCallRequest;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// A Gemini `generateContent` provider.
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
            client,
        })
    }

    /// Build the provider from application configuration.
    pub fn from_config(config: &cowork_config::AppConfig) -> Result<Self, ProviderError> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(
                "no Gemini API key (set GEMINI_API_KEY or api_key in config.toml)".into(),
            )
        })?;

        Self::new(
            &config.model.base_url,
            api_key,
            &config.model.name,
            config.model.temperature,
            Duration::from_secs(config.model.request_timeout_secs),
        )
    }

    /// Build the JSON request body for a turn.
    fn build_body(&self, request: &ProviderRequest) -> ApiRequest {
        let tools = if request.tools.is_empty() {
            Vec::new()
        } else {
            vec![ApiTool {
                function_declarations: Self::to_api_declarations(&request.tools),
            }]
        };

        let tool_config = (!request.tools.is_empty()).then(|| ApiToolConfig {
            function_calling_config: ApiFunctionCallingConfig {
                mode: match request.tool_choice {
                    ToolChoice::Auto => "AUTO".into(),
                    ToolChoice::None => "NONE".into(),
                },
            },
        });

        ApiRequest {
            system_instruction: request.system_prompt.as_ref().map(|text| ApiContent {
                role: None,
                parts: vec![ApiPart::text(text.clone())],
            }),
            contents: Self::to_api_contents(&request.turns),
            tools,
            tool_config,
            generation_config: ApiGenerationConfig {
                temperature: self.temperature,
            },
        }
    }

    /// Convert conversation turns to Gemini contents.
    fn to_api_contents(turns: &[Turn]) -> Vec<ApiContent> {
        turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    Role::User => "user",
                    Role::Agent => "model",
                };
                let parts = match &turn.content {
                    TurnContent::Text(text) => vec![ApiPart::text(text.clone())],
                    TurnContent::ToolCalls(calls) => calls
                        .iter()
                        .map(|call| ApiPart {
                            function_call: Some(ApiFunctionCall {
                                name: call.name.clone(),
                                args: Value::Object(call.arguments.clone()),
                            }),
                            ..ApiPart::default()
                        })
                        .collect(),
                    TurnContent::ToolResponses(responses) => responses
                        .iter()
                        .map(|response| ApiPart {
                            function_response: Some(ApiFunctionResponse {
                                name: response.name.clone(),
                                response: serde_json::to_value(&response.result)
                                    .unwrap_or(Value::Null),
                            }),
                            ..ApiPart::default()
                        })
                        .collect(),
                };
                ApiContent {
                    role: Some(role.into()),
                    parts,
                }
            })
            .collect()
    }

    /// Convert tool definitions to Gemini function declarations.
    fn to_api_declarations(tools: &[ToolDefinition]) -> Vec<ApiFunctionDeclaration> {
        tools
            .iter()
            .map(|t| ApiFunctionDeclaration {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect()
    }

    /// Turn a parsed API response into the model's next move.
    fn parse_response(api: ApiResponse) -> Result<(ModelReply, Option<Usage>), ProviderError> {
        let usage = api.usage_metadata.map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        let Some(candidate) = api.candidates.into_iter().next() else {
            let reason = api
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .unwrap_or_else(|| "no candidates".into());
            return Err(ProviderError::InvalidResponse(format!(
                "empty response: {reason}"
            )));
        };

        let mut text = String::new();
        let mut calls = Vec::new();
        for part in candidate.content.map(|c| c.parts).unwrap_or_default() {
            if let Some(t) = part.text {
                text.push_str(&t);
            }
            if let Some(fc) = part.function_call {
                let arguments = match fc.args {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => {
                        warn!(tool = %fc.name, "Non-object function call args: {other}");
                        Map::new()
                    }
                };
                calls.push(ToolCallRequest::new(fc.name, arguments));
            }
        }

        Ok((ModelReply::from_parts(text, calls), usage))
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn send_turn(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = self.build_body(&request);

        debug!(
            model = %self.model,
            turns = request.turns.len(),
            tools = request.tools.len(),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let model = api_response
            .model_version
            .clone()
            .unwrap_or_else(|| self.model.clone());
        let (reply, usage) = Self::parse_response(api_response)?;

        Ok(ProviderResponse {
            reply,
            usage,
            model,
        })
    }
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<ApiContent>,
    contents: Vec<ApiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ApiToolConfig>,
    generation_config: ApiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<ApiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<ApiFunctionResponse>,
}

impl ApiPart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiTool {
    function_declarations: Vec<ApiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct ApiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolConfig {
    function_calling_config: ApiFunctionCallingConfig,
}

#[derive(Debug, Serialize)]
struct ApiFunctionCallingConfig {
    mode: String,
}

#[derive(Debug, Serialize)]
struct ApiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,
    #[serde(default)]
    usage_metadata: Option<ApiUsage>,
    #[serde(default)]
    prompt_feedback: Option<ApiPromptFeedback>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
