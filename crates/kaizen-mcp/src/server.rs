use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, ToolCallResult, INTERNAL_ERROR, INVALID_PARAMS,
    METHOD_NOT_FOUND, PARSE_ERROR, PROTOCOL_VERSION, SERVER_NAME,
};
use crate::session::ServerContext;
use crate::tools::{self, KaizenTool};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Request dispatch (pub for unit and integration tests)
// ---------------------------------------------------------------------------

pub async fn handle_request(
    req: &JsonRpcRequest,
    tools: &[Box<dyn KaizenTool>],
    ctx: &ServerContext,
) -> JsonRpcResponse {
    match req.method.as_str() {
        "initialize" => JsonRpcResponse::result(
            req.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),

        "tools/list" => {
            let tool_list: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name(),
                        "description": t.description(),
                        "inputSchema": t.schema()
                    })
                })
                .collect();
            JsonRpcResponse::result(req.id.clone(), json!({ "tools": tool_list }))
        }

        "tools/call" => {
            let params = req.params.clone().unwrap_or_else(|| json!({}));
            let Some(tool_name) = params["name"].as_str() else {
                return JsonRpcResponse::error(
                    req.id.clone(),
                    INVALID_PARAMS,
                    "Missing tool name",
                    None,
                );
            };
            let args = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

            // Tool failures are not protocol failures: the RPC succeeds and
            // the payload carries isError.
            let (text, is_error) = match tools::invoke(tools, tool_name, args, ctx).await {
                Ok(value) => match serde_json::to_string_pretty(&value) {
                    Ok(text) => (text, false),
                    Err(e) => {
                        return JsonRpcResponse::error(
                            req.id.clone(),
                            INTERNAL_ERROR,
                            "Internal error",
                            Some(Value::from(e.to_string())),
                        );
                    }
                },
                Err(message) => (json!({ "error": message }).to_string(), true),
            };

            let call_result = ToolCallResult::text(text, is_error);
            match serde_json::to_value(&call_result) {
                Ok(result) => JsonRpcResponse::result(req.id.clone(), result),
                Err(e) => JsonRpcResponse::error(
                    req.id.clone(),
                    INTERNAL_ERROR,
                    "Internal error",
                    Some(Value::from(e.to_string())),
                ),
            }
        }

        other => JsonRpcResponse::error(
            req.id.clone(),
            METHOD_NOT_FOUND,
            format!("Method not found: {other}"),
            None,
        ),
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Process a message without an id: side effects only, never a response.
pub fn handle_notification(req: &JsonRpcRequest, ctx: &ServerContext) {
    if req.method == "notifications/initialized" {
        ctx.mark_initialized();
        tracing::info!("client completed initialize handshake");
    } else {
        tracing::debug!(method = %req.method, "ignoring notification");
    }
}

// ---------------------------------------------------------------------------
// Server loop
// ---------------------------------------------------------------------------

/// Run the stdio server until stdin closes. Each request is handled on its
/// own task, so responses may interleave out of arrival order; a response
/// is always correlated to its request by id. All output is serialized
/// through one writer task so lines are never torn.
pub async fn run(initial_root: Option<PathBuf>) -> anyhow::Result<()> {
    let ctx = Arc::new(match initial_root {
        Some(root) => ServerContext::with_root(root),
        None => ServerContext::new(),
    });
    let tools: Arc<Vec<Box<dyn KaizenTool>>> = Arc::new(tools::all_tools());

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = rx.recv().await {
            if stdout.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if stdout.write_all(b"\n").await.is_err() {
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    tracing::info!("kaizen MCP server started (stdio)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let raw: Value = match serde_json::from_str(line.trim()) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!(error = %e, "request is not valid JSON");
                let resp = JsonRpcResponse::error(
                    Some(Value::Null),
                    PARSE_ERROR,
                    "Parse error",
                    Some(Value::from(e.to_string())),
                );
                let _ = tx.send(serde_json::to_string(&resp)?);
                continue;
            }
        };

        // Field extraction is permissive: a missing or non-string method
        // falls through dispatch to "method not found", never a parse
        // error. Only undecodable bytes earn -32700.
        let has_id = raw
            .as_object()
            .map(|o| o.contains_key("id"))
            .unwrap_or(false);
        let request = JsonRpcRequest {
            jsonrpc: raw["jsonrpc"].as_str().unwrap_or_default().to_string(),
            id: raw.get("id").cloned(),
            method: raw["method"].as_str().unwrap_or_default().to_string(),
            params: raw.get("params").cloned(),
        };

        if !has_id {
            handle_notification(&request, &ctx);
            continue;
        }

        let ctx = Arc::clone(&ctx);
        let tools = Arc::clone(&tools);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_request(&request, &tools, &ctx).await;
            match serde_json::to_string(&response) {
                Ok(line) => {
                    let _ = tx.send(line);
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to serialize response");
                    let fallback = JsonRpcResponse::error(
                        request.id.clone(),
                        INTERNAL_ERROR,
                        "Internal error",
                        Some(Value::from(e.to_string())),
                    );
                    if let Ok(line) = serde_json::to_string(&fallback) {
                        let _ = tx.send(line);
                    }
                }
            }
        });
    }

    tracing::info!("stdin closed, shutting down");
    drop(tx);
    let _ = writer.await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
