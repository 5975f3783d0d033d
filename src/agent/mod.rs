//! Agent module - drives the LLM through the campaign tool-calling loop.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build the system and user prompts for the product/audience pair
//! 2. Discover the publishing tools from the tool source
//! 3. Call the LLM with the history and tool definitions
//! 4. Execute requested tool calls and feed results back
//! 5. Stop when the LLM replies without tool calls (or the iteration bound is hit)

mod agent_loop;
mod error;
mod prompt;
mod result;

pub use agent_loop::{AgentSettings, CampaignAgent};
pub use error::AgentError;
pub use prompt::{build_system_prompt, build_user_prompt};
pub use result::CampaignResult;
