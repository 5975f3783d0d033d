use thiserror::Error;

/// Reasons a campaign run can fail. All are terminal for the run.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Unknown tool requested: {0}")]
    UnknownTool(String),

    #[error("Tool server does not advertise required tools: {}", .0.join(", "))]
    ToolsUnavailable(Vec<String>),

    #[error("Tool discovery failed: {0:#}")]
    Discovery(anyhow::Error),

    #[error("LLM request failed: {0:#}")]
    Llm(anyhow::Error),

    #[error("Tool {name} failed: {error:#}")]
    Tool {
        name: String,
        error: anyhow::Error,
    },

    #[error("Max iterations ({0}) reached without completion")]
    MaxIterations(usize),
}
