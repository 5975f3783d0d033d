use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tools::{CONTENT_ARG, INSTAGRAM_TOOL, LINKEDIN_TOOL, TWEET_TOOL};

/// Content published during one campaign run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CampaignResult {
    pub producto: String,
    pub publico_objetivo: String,

    /// Expected to hold three entries; not enforced
    #[serde(default)]
    pub tweets: Vec<String>,

    #[serde(default)]
    pub linkedin_post: Option<String>,

    #[serde(default)]
    pub instagram_post: Option<String>,

    /// Final model reply, set once it stops calling tools
    #[serde(default)]
    pub resumen: Option<String>,

    pub generated_at: DateTime<Utc>,
}

impl CampaignResult {
    pub fn new(producto: &str, publico_objetivo: &str) -> Self {
        Self {
            producto: producto.to_string(),
            publico_objetivo: publico_objetivo.to_string(),
            tweets: Vec::new(),
            linkedin_post: None,
            instagram_post: None,
            resumen: None,
            generated_at: Utc::now(),
        }
    }

    /// Record the payload of a tool call.
    ///
    /// Only a string `contenido` argument is captured. Repeated LinkedIn or
    /// Instagram calls overwrite the previous value.
    pub fn capture(&mut self, tool_name: &str, args: &Value) {
        let Some(contenido) = args.get(CONTENT_ARG).and_then(Value::as_str) else {
            return;
        };

        match tool_name {
            TWEET_TOOL => self.tweets.push(contenido.to_string()),
            LINKEDIN_TOOL => self.linkedin_post = Some(contenido.to_string()),
            INSTAGRAM_TOOL => self.instagram_post = Some(contenido.to_string()),
            _ => {}
        }
    }
}
