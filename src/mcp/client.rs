//! Client for a remote tool server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use super::{JSONRPC_VERSION, PROTOCOL_VERSION, SESSION_HEADER};
use crate::tools::{Tool, ToolSource};

/// Discovers tools on a remote server.
///
/// One session is opened lazily and shared by every discovery. A session the
/// server no longer accepts is replaced once before giving up.
#[derive(Clone)]
pub struct McpClient {
    http: reqwest::Client,
    url: String,
    session: Arc<Mutex<Option<Arc<McpSession>>>>,
}

impl McpClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Current session, opening one if none is cached.
    async fn session(&self) -> anyhow::Result<Arc<McpSession>> {
        let mut cached = self.session.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }
        let session = self.connect().await?;
        *cached = Some(session.clone());
        Ok(session)
    }

    /// Forget `stale` unless another caller already replaced it.
    async fn invalidate(&self, stale: &Arc<McpSession>) {
        let mut cached = self.session.lock().await;
        if cached.as_ref().is_some_and(|s| Arc::ptr_eq(s, stale)) {
            *cached = None;
        }
    }

    async fn connect(&self) -> anyhow::Result<Arc<McpSession>> {
        let mut session = McpSession {
            http: self.http.clone(),
            url: self.url.clone(),
            session_id: None,
            next_id: AtomicU64::new(1),
        };

        let (result, session_id) = session
            .send(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
            .await
            .with_context(|| format!("Failed to initialize tool session at {}", self.url))?;
        session.session_id = session_id;

        tracing::debug!(
            url = %self.url,
            server = %result["serverInfo"]["name"],
            session = ?session.session_id,
            "Tool session initialized"
        );

        session.notify("notifications/initialized").await?;
        Ok(Arc::new(session))
    }
}

#[async_trait]
impl ToolSource for McpClient {
    async fn discover(&self) -> anyhow::Result<Vec<Arc<dyn Tool>>> {
        let mut session = self.session().await?;
        let result = match session.request("tools/list", json!({})).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(url = %self.url, "Tool session rejected, reconnecting: {}", e);
                self.invalidate(&session).await;
                session = self.session().await?;
                session.request("tools/list", json!({})).await?
            }
        };

        let listing: ToolListing =
            serde_json::from_value(result).context("Invalid tools/list result")?;

        tracing::info!(count = listing.tools.len(), "Discovered remote tools");

        Ok(listing
            .tools
            .into_iter()
            .map(|descriptor| {
                Arc::new(RemoteTool {
                    name: descriptor.name,
                    description: descriptor.description.unwrap_or_default(),
                    input_schema: descriptor
                        .input_schema
                        .unwrap_or_else(|| json!({ "type": "object" })),
                    session: session.clone(),
                }) as Arc<dyn Tool>
            })
            .collect())
    }
}

#[derive(Deserialize)]
struct ToolListing {
    #[serde(default)]
    tools: Vec<ToolDescriptor>,
}

#[derive(Deserialize)]
struct ToolDescriptor {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(rename = "inputSchema", default)]
    input_schema: Option<Value>,
}

#[derive(Deserialize)]
struct CallResult {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(rename = "isError", default)]
    is_error: bool,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type", default)]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl CallResult {
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

struct McpSession {
    http: reqwest::Client,
    url: String,
    session_id: Option<String>,
    next_id: AtomicU64,
}

impl McpSession {
    async fn request(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        let (result, _) = self.send(method, params).await?;
        Ok(result)
    }

    /// Send a request, returning the result and any session id the server assigned.
    async fn send(&self, method: &str, params: Value) -> anyhow::Result<(Value, Option<String>)> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id,
            "method": method,
            "params": params,
        });

        let mut request = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json, text/event-stream")
            .json(&body);
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_HEADER, session_id);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Tool server unreachable at {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Tool server returned {} for {}: {}", status, method, text);
        }

        let session_id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        let is_event_stream = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/event-stream"));

        let text = response.text().await?;
        let reply = if is_event_stream {
            parse_event_stream(&text)?
        } else {
            serde_json::from_str::<Value>(&text)
                .with_context(|| format!("Invalid JSON-RPC reply for {}", method))?
        };

        Ok((into_result(method, reply)?, session_id))
    }

    async fn notify(&self, method: &str) -> anyhow::Result<()> {
        let mut request = self
            .http
            .post(&self.url)
            .header(ACCEPT, "application/json, text/event-stream")
            .json(&json!({ "jsonrpc": JSONRPC_VERSION, "method": method }));
        if let Some(session_id) = &self.session_id {
            request = request.header(SESSION_HEADER, session_id);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Tool server rejected {}: {}", method, response.status());
        }
        Ok(())
    }
}

fn into_result(method: &str, reply: Value) -> anyhow::Result<Value> {
    if let Some(error) = reply.get("error") {
        anyhow::bail!(
            "{} failed ({}): {}",
            method,
            error["code"],
            error["message"].as_str().unwrap_or("unknown error")
        );
    }
    reply
        .get("result")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("{} reply carries no result", method))
}

/// Take the first JSON-RPC message out of a server-sent event stream body.
fn parse_event_stream(body: &str) -> anyhow::Result<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(str::trim)
        .filter(|data| !data.is_empty())
        .find_map(|data| serde_json::from_str::<Value>(data).ok())
        .ok_or_else(|| anyhow::anyhow!("Event stream reply carries no JSON-RPC message"))
}

/// A tool living on the remote server.
pub struct RemoteTool {
    name: String,
    description: String,
    input_schema: Value,
    session: Arc<McpSession>,
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.input_schema.clone()
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let result = self
            .session
            .request("tools/call", json!({ "name": self.name, "arguments": args }))
            .await?;
        let result: CallResult =
            serde_json::from_value(result).context("Invalid tools/call result")?;

        let text = result.text();
        if result.is_error {
            anyhow::bail!("Tool {} failed: {}", self.name, text);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolRegistry;

    async fn spawn_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = crate::mcp::router(Arc::new(ToolRegistry::campaign()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/mcp", addr)
    }

    #[test]
    fn event_stream_body_yields_first_message() {
        let body = "event: message\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n\n";
        let reply = parse_event_stream(body).unwrap();
        assert_eq!(reply["id"], 1);
        assert!(parse_event_stream(": ping\n\n").is_err());
    }

    #[test]
    fn jsonrpc_error_becomes_err() {
        let reply = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32601, "message": "nope"}});
        let err = into_result("tools/list", reply).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[tokio::test]
    async fn discovers_and_calls_remote_tools() {
        let url = spawn_server().await;
        let client = McpClient::new(url);

        let tools = client.discover().await.unwrap();
        let registry = ToolRegistry::from_discovered(tools).unwrap();

        let reply = registry
            .execute("subir_tweet", json!({ "contenido": "Hola corredores" }))
            .await
            .unwrap();
        assert_eq!(
            reply,
            "El tweet que comienza con 'Hola corredores...' fue publicado exitosamente."
        );
    }

    #[tokio::test]
    async fn discoveries_share_one_session() {
        let url = spawn_server().await;
        let client = McpClient::new(url);

        client.discover().await.unwrap();
        let first = client.session().await.unwrap();
        client.discover().await.unwrap();
        let second = client.session().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.session_id.is_some());

        client.invalidate(&first).await;
        let replaced = client.session().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &replaced));
        assert_ne!(first.session_id, replaced.session_id);

        client.invalidate(&first).await;
        assert!(Arc::ptr_eq(&replaced, &client.session().await.unwrap()));
    }

    #[tokio::test]
    async fn remote_tool_error_is_propagated() {
        let url = spawn_server().await;
        let tools = McpClient::new(url).discover().await.unwrap();
        let registry = ToolRegistry::from_discovered(tools).unwrap();

        let err = registry
            .execute("subir_publicacion_instagram", json!({}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("contenido"));
    }
}
