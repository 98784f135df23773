//! Chat-completions client and the agent's tool-use loop.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

use crate::agent::{Tool, ToolSpec};
use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

/// One message in a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    /// A system message carrying the agent's instructions.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// A tool-result message answering a specific tool call.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// The function half of a tool call: name plus JSON-encoded arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

/// Produces the model's next message for a transcript and a tool set.
///
/// Implemented over HTTP by [`ChatClient`]; tests script it directly.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage>;
}

/// Chat client for the OpenAI `/chat/completions` endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatClient {
    /// Create a client from configuration.
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.chat_model.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDeclaration<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Serialize)]
struct ToolDeclaration<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: FunctionDeclaration<'a>,
}

#[derive(Serialize)]
struct FunctionDeclaration<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a JsonValue,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatMessage> {
        let url = format!("{}/chat/completions", self.base_url);
        let declarations: Vec<ToolDeclaration<'_>> = tools
            .iter()
            .map(|spec| ToolDeclaration {
                kind: "function",
                function: FunctionDeclaration {
                    name: &spec.name,
                    description: &spec.description,
                    parameters: &spec.parameters,
                },
            })
            .collect();
        let body = ChatRequest {
            model: &self.model,
            messages,
            tool_choice: if declarations.is_empty() { None } else { Some("auto") },
            tools: declarations,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Agent(format!("chat request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(format!("chat provider rejected the API key ({})", status)));
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Agent(format!("chat provider returned {}: {}", status, detail)));
        }

        let mut parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Agent(format!("invalid chat response: {}", e)))?;
        if parsed.choices.is_empty() {
            return Err(Error::Agent("chat provider returned no choices".to_string()));
        }
        Ok(parsed.choices.remove(0).message)
    }
}

/// The conversational agent: a bounded tool-use loop over a chat backend.
///
/// Holds no memory across turns; callers wanting continuity fold prior
/// turns into the input text themselves.
pub struct ShoppingAgent {
    backend: Arc<dyn ChatBackend>,
    tools: Vec<Arc<dyn Tool>>,
    instructions: String,
    max_tool_rounds: usize,
}

impl ShoppingAgent {
    /// Create an agent over a backend, a tool set, and an instruction prompt.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        tools: Vec<Arc<dyn Tool>>,
        instructions: impl Into<String>,
        max_tool_rounds: usize,
    ) -> Self {
        Self {
            backend,
            tools,
            instructions: instructions.into(),
            max_tool_rounds,
        }
    }

    /// Run one turn: the model may call tools any number of times, each
    /// resolved before it continues, until it produces a final message.
    pub async fn respond(&self, input: &str) -> Result<String> {
        let mut messages = vec![
            ChatMessage::system(&self.instructions),
            ChatMessage::user(input),
        ];
        let specs: Vec<ToolSpec> = self.tools.iter().map(|t| t.spec()).collect();

        for round in 0..self.max_tool_rounds {
            let reply = self.backend.complete(&messages, &specs).await?;

            if reply.tool_calls.is_empty() {
                return Ok(reply.content.unwrap_or_default());
            }

            debug!(round, calls = reply.tool_calls.len(), "resolving tool calls");
            let calls = reply.tool_calls.clone();
            messages.push(reply);

            for call in calls {
                let tool = self
                    .tools
                    .iter()
                    .find(|t| t.spec().name == call.function.name)
                    .ok_or_else(|| {
                        Error::Agent(format!("model requested unknown tool '{}'", call.function.name))
                    })?;
                let arguments: JsonValue = serde_json::from_str(&call.function.arguments)
                    .map_err(|e| {
                        Error::Agent(format!(
                            "model sent unparseable arguments for '{}': {}",
                            call.function.name, e
                        ))
                    })?;
                let output = tool.invoke(arguments).await?;
                messages.push(ChatMessage::tool(call.id, output.to_string()));
            }
        }

        Err(Error::Agent(format!(
            "tool loop did not settle within {} rounds",
            self.max_tool_rounds
        )))
    }
}
