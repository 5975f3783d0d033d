//! Tool server: POST /mcp (JSON-RPC) and GET /health.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use super::{INVALID_PARAMS, JSONRPC_VERSION, METHOD_NOT_FOUND, PROTOCOL_VERSION, SESSION_HEADER};
use crate::tools::ToolRegistry;

pub const SERVER_NAME: &str = "campaign-tools";

pub fn router(registry: Arc<ToolRegistry>) -> Router {
    Router::new()
        .route("/mcp", post(mcp_post))
        .route("/health", get(health))
        .with_state(registry)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "server": SERVER_NAME }))
}

async fn mcp_post(
    State(registry): State<Arc<ToolRegistry>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (HeaderMap, Json<Value>) {
    let method = body.get("method").and_then(Value::as_str).unwrap_or("");
    let id = body.get("id").cloned().unwrap_or(Value::Null);
    let params = body.get("params").cloned().unwrap_or_default();
    let session_id = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok());

    tracing::debug!(method, session = ?session_id, "Tool server request");

    let mut response_headers = HeaderMap::new();

    let reply = match method {
        "initialize" => {
            let new_session_id = uuid::Uuid::new_v4().to_string();
            if let Ok(value) = HeaderValue::from_str(&new_session_id) {
                response_headers.insert(SESSION_HEADER, value);
            }
            tracing::info!(session = %new_session_id, "Tool session opened");

            let protocol_version = params
                .get("protocolVersion")
                .and_then(Value::as_str)
                .unwrap_or(PROTOCOL_VERSION);

            success(
                id,
                json!({
                    "protocolVersion": protocol_version,
                    "capabilities": { "tools": { "listChanged": false } },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
        }

        "notifications/initialized" => success(id, json!({})),

        "tools/list" => success(id, json!({ "tools": tool_list(&registry) })),

        "tools/call" => match params.get("name").and_then(Value::as_str) {
            Some(name) => {
                let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));
                success(id, call_tool(&registry, name, arguments).await)
            }
            None => failure(id, INVALID_PARAMS, "Missing tool name".to_string()),
        },

        _ => failure(id, METHOD_NOT_FOUND, format!("Method not found: {}", method)),
    };

    (response_headers, Json(reply))
}

fn tool_list(registry: &ToolRegistry) -> Vec<Value> {
    registry
        .get_tool_schemas()
        .into_iter()
        .map(|schema| {
            json!({
                "name": schema.function.name,
                "description": schema.function.description,
                "inputSchema": schema.function.parameters,
            })
        })
        .collect()
}

async fn call_tool(registry: &ToolRegistry, name: &str, arguments: Value) -> Value {
    tracing::info!(tool = name, "Executing tool");
    match registry.execute(name, arguments).await {
        Ok(text) => json!({
            "content": [{ "type": "text", "text": text }],
            "isError": false
        }),
        Err(e) => {
            tracing::warn!(tool = name, "Tool failed: {}", e);
            json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "isError": true
            })
        }
    }
}

fn success(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": JSONRPC_VERSION, "id": id, "result": result })
}

fn failure(id: Value, code: i64, message: String) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": { "code": code, "message": message }
    })
}
