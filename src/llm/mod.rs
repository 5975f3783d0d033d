//! LLM client abstraction for OpenAI-compatible chat completions with tool calling.

mod openrouter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use openrouter::OpenRouterClient;

/// Message role in a chat conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Result of a tool invocation, tagged with the originating call id.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,

    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,

    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: &Value) -> Self {
        Self {
            id: id.into(),
            call_type: function_type(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.to_string(),
            },
        }
    }

    /// Parse the JSON-encoded arguments. Malformed arguments become an empty object.
    pub fn parsed_arguments(&self) -> Value {
        match serde_json::from_str::<Value>(&self.function.arguments) {
            Ok(Value::Object(map)) => Value::Object(map),
            Ok(_) | Err(_) => {
                if !self.function.arguments.trim().is_empty() {
                    tracing::warn!(
                        tool = %self.function.name,
                        "Tool call arguments are not a JSON object: {}",
                        self.function.arguments
                    );
                }
                Value::Object(serde_json::Map::new())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,

    /// JSON-encoded arguments, as sent by the provider
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

/// Tool definition advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Assistant turn returned by the provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: Option<String>,
    pub tool_calls: Option<Vec<ToolCall>>,
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// Tool calls requested by this turn, empty when the model is done.
    pub fn requested_tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or(&[])
    }

    /// Convert into the assistant message appended to the history.
    pub fn to_message(&self) -> ChatMessage {
        ChatMessage {
            role: Role::Assistant,
            content: self.content.clone(),
            tool_calls: self
                .tool_calls
                .clone()
                .filter(|calls| !calls.is_empty()),
            tool_call_id: None,
        }
    }
}

/// Trait for LLM providers.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send the full conversation plus tool definitions and return the next assistant turn.
    async fn chat_completion(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: Option<&[ToolSchema]>,
    ) -> anyhow::Result<ChatResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_message_serializes_call_id() {
        let msg = ChatMessage::tool_result("call_1", "ok");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({"role": "tool", "content": "ok", "tool_call_id": "call_1"})
        );
    }

    #[test]
    fn malformed_arguments_become_empty_object() {
        let mut call = ToolCall::new("c1", "subir_tweet", &json!({}));
        call.function.arguments = "{not json".to_string();
        assert_eq!(call.parsed_arguments(), json!({}));

        call.function.arguments = r#"{"contenido":"hola"}"#.to_string();
        assert_eq!(call.parsed_arguments(), json!({"contenido": "hola"}));
    }

    #[test]
    fn empty_tool_call_list_is_dropped_from_history_message() {
        let response = ChatResponse {
            content: Some("Listo.".to_string()),
            tool_calls: Some(vec![]),
            finish_reason: Some("stop".to_string()),
        };
        assert!(response.requested_tool_calls().is_empty());
        assert_eq!(response.to_message().tool_calls, None);
    }
}
