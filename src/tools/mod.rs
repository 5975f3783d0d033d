//! Tool system for the campaign agent.
//!
//! A [`Tool`] is a named capability taking JSON arguments and returning a
//! string. Tools reach the agent through a [`ToolSource`]: either the
//! in-process [`ToolRegistry`] or a remote tool server (see `crate::mcp`).

mod publish;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::AgentError;
use crate::llm::{FunctionDefinition, ToolSchema};

pub use publish::{SubirPostLinkedin, SubirPublicacionInstagram, SubirTweet};

pub const TWEET_TOOL: &str = "subir_tweet";
pub const LINKEDIN_TOOL: &str = "subir_post_linkedin";
pub const INSTAGRAM_TOOL: &str = "subir_publicacion_instagram";

/// Closed set of tool names a campaign may use.
pub const CAMPAIGN_TOOLS: [&str; 3] = [TWEET_TOOL, LINKEDIN_TOOL, INSTAGRAM_TOOL];

/// Payload field every publishing tool takes.
pub const CONTENT_ARG: &str = "contenido";

/// Trait for implementing tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool name (used in LLM function calls).
    fn name(&self) -> &str;

    /// Get the tool description (shown to LLM).
    fn description(&self) -> &str;

    /// Get the JSON schema for tool parameters.
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: Value) -> anyhow::Result<String>;
}

/// Anything that can advertise the tools currently available.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn discover(&self) -> anyhow::Result<Vec<Arc<dyn Tool>>>;
}

/// Information about a tool for display purposes.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
}

/// Name-indexed set of tools.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Registry holding the three simulated publishing tools.
    pub fn campaign() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(SubirTweet));
        registry.register(Arc::new(SubirPostLinkedin));
        registry.register(Arc::new(SubirPublicacionInstagram));
        registry
    }

    /// Build a registry from discovered tools, restricted to [`CAMPAIGN_TOOLS`].
    ///
    /// Fails if any campaign tool was not advertised.
    pub fn from_discovered(tools: Vec<Arc<dyn Tool>>) -> Result<Self, AgentError> {
        let mut registry = Self::default();
        for tool in tools {
            if CAMPAIGN_TOOLS.contains(&tool.name()) {
                registry.register(tool);
            } else {
                tracing::warn!(tool = %tool.name(), "Ignoring tool outside the campaign tool set");
            }
        }

        let missing: Vec<String> = CAMPAIGN_TOOLS
            .iter()
            .filter(|name| !registry.tools.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AgentError::ToolsUnavailable(missing));
        }

        Ok(registry)
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Resolve a tool requested by name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Tool>, AgentError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.tools
            .values()
            .map(|t| ToolInfo {
                name: t.name().to_string(),
                description: t.description().to_string(),
            })
            .collect()
    }

    /// Function definitions in the format the LLM expects.
    pub fn get_tool_schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .values()
            .map(|t| ToolSchema {
                schema_type: "function".to_string(),
                function: FunctionDefinition {
                    name: t.name().to_string(),
                    description: t.description().to_string(),
                    parameters: t.parameters_schema(),
                },
            })
            .collect()
    }

    /// Execute a tool by name.
    pub async fn execute(&self, name: &str, args: Value) -> anyhow::Result<String> {
        let tool = self.resolve(name)?;
        tool.execute(args).await
    }
}

#[async_trait]
impl ToolSource for ToolRegistry {
    async fn discover(&self) -> anyhow::Result<Vec<Arc<dyn Tool>>> {
        Ok(self.tools.values().cloned().collect())
    }
}

/// Extract the required `contenido` string argument.
pub(crate) fn content_arg(args: &Value) -> anyhow::Result<&str> {
    args[CONTENT_ARG]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' argument", CONTENT_ARG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Borrar;

    #[async_trait]
    impl Tool for Borrar {
        fn name(&self) -> &str {
            "borrar_todo"
        }

        fn description(&self) -> &str {
            "Deletes everything"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn execute(&self, _args: Value) -> anyhow::Result<String> {
            Ok("borrado".to_string())
        }
    }

    #[test]
    fn campaign_registry_exposes_closed_tool_set() {
        let registry = ToolRegistry::campaign();
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        let mut expected: Vec<String> = CAMPAIGN_TOOLS.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(names, expected);

        let schemas = registry.get_tool_schemas();
        assert_eq!(schemas.len(), 3);
        assert!(schemas.iter().all(|s| s.function.parameters["required"] == json!(["contenido"])));
    }

    #[test]
    fn unknown_tool_maps_to_typed_error() {
        let registry = ToolRegistry::campaign();
        match registry.resolve("borrar_todo") {
            Err(AgentError::UnknownTool(name)) => assert_eq!(name, "borrar_todo"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("borrar_todo should not resolve"),
        }
    }

    #[tokio::test]
    async fn discovered_tools_outside_the_set_are_dropped() {
        let mut tools = ToolRegistry::campaign().discover().await.unwrap();
        tools.push(Arc::new(Borrar));

        let registry = ToolRegistry::from_discovered(tools).unwrap();
        assert!(!registry.contains("borrar_todo"));
        assert!(registry.contains(TWEET_TOOL));
    }

    #[tokio::test]
    async fn discovery_missing_a_campaign_tool_fails() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(SubirTweet), Arc::new(Borrar)];
        match ToolRegistry::from_discovered(tools) {
            Err(AgentError::ToolsUnavailable(missing)) => {
                assert_eq!(missing, vec![LINKEDIN_TOOL.to_string(), INSTAGRAM_TOOL.to_string()]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("registry should be incomplete"),
        }
    }
}
