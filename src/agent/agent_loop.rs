//! Campaign tool-calling loop.

use std::sync::Arc;

use crate::config::Config;
use crate::llm::{ChatMessage, LlmClient, OpenRouterClient, ToolCall, ToolSchema};
use crate::mcp::McpClient;
use crate::tools::{ToolRegistry, ToolSource};

use super::error::AgentError;
use super::prompt::{build_system_prompt, build_user_prompt};
use super::result::CampaignResult;

/// Per-run knobs.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Model identifier sent with every completion
    pub model: String,

    /// Upper bound on LLM round trips for one campaign
    pub max_iterations: usize,
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            max_iterations: config.max_iterations,
        }
    }
}

/// Loop states. `ExecutingTools` carries the calls of the last assistant turn.
enum LoopState {
    AwaitingLlm,
    ExecutingTools(Vec<ToolCall>),
    Done(String),
    Failed(AgentError),
}

/// Generates and publishes a campaign through an LLM and a tool source.
pub struct CampaignAgent {
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
    settings: AgentSettings,
}

impl CampaignAgent {
    pub fn new(llm: Arc<dyn LlmClient>, tools: Arc<dyn ToolSource>, settings: AgentSettings) -> Self {
        Self {
            llm,
            tools,
            settings,
        }
    }

    /// Agent backed by OpenRouter and the configured remote tool server.
    pub fn from_config(config: &Config) -> Self {
        let llm = Arc::new(OpenRouterClient::from_config(&config.llm));
        let tools = Arc::new(McpClient::new(config.mcp_server_url.clone()));
        Self::new(llm, tools, AgentSettings::from_config(config))
    }

    /// Run the full tool-calling conversation for one product/audience pair.
    ///
    /// Returns only once the model stops requesting tools, or fails on the
    /// first LLM error, tool error, unknown tool or exhausted iteration budget.
    pub async fn generate_campaign(
        &self,
        producto: &str,
        publico: &str,
    ) -> Result<CampaignResult, AgentError> {
        let discovered = self.tools.discover().await.map_err(AgentError::Discovery)?;
        let registry = ToolRegistry::from_discovered(discovered)?;
        let tool_schemas = registry.get_tool_schemas();

        let mut messages = vec![
            ChatMessage::system(build_system_prompt()),
            ChatMessage::user(build_user_prompt(producto, publico)),
        ];
        let mut result = CampaignResult::new(producto, publico);

        let mut iterations = 0;
        let mut state = LoopState::AwaitingLlm;

        loop {
            state = match state {
                LoopState::AwaitingLlm => {
                    if iterations >= self.settings.max_iterations {
                        LoopState::Failed(AgentError::MaxIterations(self.settings.max_iterations))
                    } else {
                        iterations += 1;
                        self.next_turn(iterations, &mut messages, &tool_schemas).await
                    }
                }
                LoopState::ExecutingTools(tool_calls) => {
                    match self
                        .execute_tool_calls(&tool_calls, &registry, &mut result, &mut messages)
                        .await
                    {
                        Ok(()) => LoopState::AwaitingLlm,
                        Err(e) => LoopState::Failed(e),
                    }
                }
                LoopState::Done(summary) => {
                    tracing::info!(
                        iterations,
                        tweets = result.tweets.len(),
                        "Campaign generated for {}",
                        producto
                    );
                    result.resumen = Some(summary);
                    return Ok(result);
                }
                LoopState::Failed(e) => {
                    tracing::warn!(iterations, "Campaign run failed: {}", e);
                    return Err(e);
                }
            };
        }
    }

    /// Ask the LLM for its next turn and append it to the history.
    async fn next_turn(
        &self,
        iteration: usize,
        messages: &mut Vec<ChatMessage>,
        tool_schemas: &[ToolSchema],
    ) -> LoopState {
        tracing::debug!("Agent iteration {}", iteration);

        let response = match self
            .llm
            .chat_completion(&self.settings.model, messages.as_slice(), Some(tool_schemas))
            .await
        {
            Ok(response) => response,
            Err(e) => return LoopState::Failed(AgentError::Llm(e)),
        };

        messages.push(response.to_message());

        let tool_calls = response.requested_tool_calls();
        if tool_calls.is_empty() {
            let summary = response.content.as_deref().unwrap_or_default().trim();
            LoopState::Done(summary.to_string())
        } else {
            LoopState::ExecutingTools(tool_calls.to_vec())
        }
    }

    /// Execute each requested call in order, recording payloads and appending tool results.
    async fn execute_tool_calls(
        &self,
        tool_calls: &[ToolCall],
        registry: &ToolRegistry,
        result: &mut CampaignResult,
        messages: &mut Vec<ChatMessage>,
    ) -> Result<(), AgentError> {
        for tool_call in tool_calls {
            let name = tool_call.function.name.as_str();
            let args = tool_call.parsed_arguments();

            tracing::info!(tool = name, call_id = %tool_call.id, "Calling tool with args: {}", args);

            result.capture(name, &args);

            let tool = registry.resolve(name)?;
            let output = tool.execute(args).await.map_err(|error| AgentError::Tool {
                name: name.to_string(),
                error,
            })?;

            tracing::debug!(tool = name, "Tool result: {}", truncate_for_log(&output, 200));

            messages.push(ChatMessage::tool_result(tool_call.id.clone(), output));
        }
        Ok(())
    }
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}... [truncated]", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatResponse, Role};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned assistant turns and records every request's history.
    struct ScriptedLlm {
        turns: Mutex<VecDeque<ChatResponse>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedLlm {
        fn new(turns: Vec<ChatResponse>) -> Self {
            Self {
                turns: Mutex::new(turns.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
            _tools: Option<&[ToolSchema]>,
        ) -> anyhow::Result<ChatResponse> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.turns
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("script exhausted"))
        }
    }

    fn call(id: &str, name: &str, contenido: &str) -> ToolCall {
        ToolCall::new(id, name, &json!({ "contenido": contenido }))
    }

    fn tools_turn(calls: Vec<ToolCall>) -> ChatResponse {
        ChatResponse {
            content: None,
            tool_calls: Some(calls),
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    fn text_turn(text: &str) -> ChatResponse {
        ChatResponse {
            content: Some(text.to_string()),
            tool_calls: None,
            finish_reason: Some("stop".to_string()),
        }
    }

    fn agent(llm: Arc<ScriptedLlm>, max_iterations: usize) -> CampaignAgent {
        CampaignAgent::new(
            llm,
            Arc::new(ToolRegistry::campaign()),
            AgentSettings {
                model: "test-model".to_string(),
                max_iterations,
            },
        )
    }

    #[tokio::test]
    async fn multiple_calls_in_one_turn_are_answered_in_order() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tools_turn(vec![
                call("a", "subir_tweet", "uno"),
                call("b", "subir_tweet", "dos"),
            ]),
            text_turn("  Hecho.  "),
        ]));
        let result = agent(llm.clone(), 10)
            .generate_campaign("p", "q")
            .await
            .unwrap();

        assert_eq!(result.tweets, vec!["uno", "dos"]);
        assert_eq!(result.resumen.as_deref(), Some("Hecho."));

        let seen = llm.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(second.len(), 5);
        assert_eq!(second[2].role, Role::Assistant);
        assert_eq!(second[3].tool_call_id.as_deref(), Some("a"));
        assert_eq!(second[4].tool_call_id.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn iteration_bound_stops_a_looping_model() {
        let turns = (0..5)
            .map(|i| tools_turn(vec![call(&format!("c{i}"), "subir_tweet", "otra vez")]))
            .collect();
        let llm = Arc::new(ScriptedLlm::new(turns));

        let err = agent(llm.clone(), 3)
            .generate_campaign("p", "q")
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::MaxIterations(3)));
        assert_eq!(llm.seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn llm_failure_fails_the_run() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let err = agent(llm, 5).generate_campaign("p", "q").await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }

    #[tokio::test]
    async fn tool_error_fails_the_run() {
        let bad = ToolCall::new("x", "subir_post_linkedin", &json!({ "texto": "sin contenido" }));
        let llm = Arc::new(ScriptedLlm::new(vec![tools_turn(vec![bad]), text_turn("no")]));
        let err = agent(llm, 5).generate_campaign("p", "q").await.unwrap_err();
        match err {
            AgentError::Tool { name, .. } => assert_eq!(name, "subir_post_linkedin"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_final_reply_yields_empty_summary() {
        let llm = Arc::new(ScriptedLlm::new(vec![ChatResponse::default()]));
        let result = agent(llm, 5).generate_campaign("p", "q").await.unwrap();
        assert_eq!(result.resumen.as_deref(), Some(""));
        assert!(result.tweets.is_empty());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_log("ñandú", 10), "ñandú");
        assert_eq!(truncate_for_log("ñandú", 2), "ña... [truncated]");
    }
}
