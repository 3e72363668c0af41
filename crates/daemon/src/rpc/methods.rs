// JSON-RPC dispatch: raw line -> typed `KbCall` -> navigator -> response.

use std::sync::Arc;

use kbnav_common::protocol::calls::{CallError, KbCall};
use kbnav_common::protocol::jsonrpc::{
    Request, RequestId, Response, RpcError, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND, PARSE_ERROR,
};
use kbnav_common::KbError;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::navigator::Navigator;
use crate::rpc::mcp;

#[derive(Clone)]
pub struct RpcServerState {
    navigator: Arc<Navigator>,
}

impl RpcServerState {
    pub fn new(navigator: Arc<Navigator>) -> Self {
        Self { navigator }
    }
}

/// Handle one raw line. Notifications (a method without an `id`) get no
/// response.
pub async fn handle_raw_request(raw: &[u8], state: &RpcServerState) -> Option<Response> {
    if let Ok(Value::Object(message)) = serde_json::from_slice::<Value>(raw) {
        if !message.contains_key("id") {
            if let Some(method) = message.get("method").and_then(Value::as_str) {
                debug!(method, "ignoring json-rpc notification");
                return None;
            }
        }
    }

    let request = match serde_json::from_slice::<Request>(raw) {
        Ok(request) => request,
        Err(error) => {
            return Some(Response::error(
                RequestId::Null,
                RpcError {
                    code: PARSE_ERROR,
                    message: "Parse error".to_string(),
                    data: Some(json!({ "reason": error.to_string() })),
                },
            ));
        }
    };

    if request.jsonrpc != "2.0" {
        return Some(Response::error(
            request.id,
            RpcError { code: INVALID_REQUEST, message: "Invalid Request".to_string(), data: None },
        ));
    }

    Some(dispatch_request(request, state).await)
}

pub async fn dispatch_request(request: Request, state: &RpcServerState) -> Response {
    let call = match KbCall::from_parts(&request.method, request.params) {
        Ok(call) => call,
        Err(CallError::UnknownMethod(_)) => {
            return Response::error(
                request.id,
                RpcError {
                    code: METHOD_NOT_FOUND,
                    message: "Method not found".to_string(),
                    data: None,
                },
            );
        }
        Err(CallError::InvalidParams(reason)) => {
            return invalid_params_response(request.id, reason);
        }
    };

    match &call {
        KbCall::CallTool(tool) => {
            debug!(method = call.method(), tool = tool.name(), "dispatching rpc call");
        }
        _ => debug!(method = call.method(), "dispatching rpc call"),
    }
    let navigator = Arc::clone(&state.navigator);
    match tokio::task::spawn_blocking(move || execute(&navigator, call)).await {
        Ok(Ok(result)) => Response::success(request.id, result),
        Ok(Err(error)) => Response::error(request.id, RpcError::from(&error)),
        Err(error) => {
            warn!(%error, "rpc worker task failed");
            Response::error(
                request.id,
                RpcError {
                    code: INTERNAL_ERROR,
                    message: "Internal error".to_string(),
                    data: None,
                },
            )
        }
    }
}

/// Run one decoded call against the navigator. Blocking.
pub fn execute(navigator: &Navigator, call: KbCall) -> Result<Value, KbError> {
    let value = match call {
        KbCall::Ping => json!({ "ok": true }),
        KbCall::ListDocuments => json!(navigator.list_documents()),
        KbCall::ReadDocument(args) => json!(navigator.read_document(&args.path)?),
        KbCall::ReadSection(args) => json!(navigator.read_section(&args.path, &args.title)?),
        KbCall::Search(args) => json!(navigator.search_documents(&args.query, args.limit)?),
        KbCall::ListResources => json!(navigator.list_resources()),
        KbCall::ReadResource(args) => json!(navigator.read_resource(&args.uri)?),
        KbCall::RebuildIndex => json!(navigator.reindex()?),
        KbCall::Initialize(args) => mcp::initialize(&args),
        KbCall::ListTools => mcp::list_tools(),
        KbCall::CallTool(tool) => mcp::call_tool(navigator, tool)?,
        KbCall::McpListResources => mcp::list_resources(navigator),
        KbCall::McpReadResource(args) => mcp::read_resource(navigator, &args.uri)?,
        KbCall::ListPrompts => mcp::list_prompts(),
        KbCall::GetPrompt(prompt) => mcp::get_prompt(&prompt),
    };
    Ok(value)
}

fn invalid_params_response(request_id: RequestId, reason: String) -> Response {
    Response::error(
        request_id,
        RpcError {
            code: INVALID_PARAMS,
            message: "Invalid params".to_string(),
            data: Some(json!({ "reason": reason })),
        },
    )
}

#[cfg(test)]
mod tests {
    use std::fs;

    use kbnav_common::protocol::jsonrpc::{FORBIDDEN, NOT_FOUND};
    use tempfile::TempDir;

    use super::*;
    use crate::navigator::NavigatorOptions;

    fn state() -> (TempDir, RpcServerState) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "# Intro\nhello world\n# Details\nmore text").unwrap();
        let navigator = Navigator::open(NavigatorOptions::inline([dir.path()])).unwrap();
        (dir, RpcServerState::new(Arc::new(navigator)))
    }

    async fn call(state: &RpcServerState, method: &str, params: Option<Value>) -> Response {
        dispatch_request(Request::new(method, params, RequestId::Number(1)), state).await
    }

    #[tokio::test]
    async fn ping_returns_ok() {
        let (_dir, state) = state();
        let response = call(&state, "rpc.ping", None).await;
        assert_eq!(response.result, Some(json!({ "ok": true })));
    }

    #[tokio::test]
    async fn reads_a_section() {
        let (_dir, state) = state();
        let response = call(
            &state,
            "documents.section",
            Some(json!({ "path": "notes.md", "title": "details" })),
        )
        .await;

        let result = response.result.expect("section result");
        assert_eq!(result["content"], "more text");
        assert_eq!(result["scope"], "header");
        assert_eq!(result["header"]["title"], "Details");
    }

    #[tokio::test]
    async fn kb_errors_carry_their_code() {
        let (_dir, state) = state();

        let response = call(&state, "documents.read", Some(json!({ "path": "../etc/passwd" }))).await;
        let error = response.error.expect("traversal error");
        assert_eq!(error.code, FORBIDDEN);
        assert_eq!(error.data, Some(json!({ "code": "PATH_TRAVERSAL" })));

        let response = call(
            &state,
            "documents.section",
            Some(json!({ "path": "notes.md", "title": "Missing" })),
        )
        .await;
        let error = response.error.expect("missing header error");
        assert_eq!(error.code, NOT_FOUND);
        assert_eq!(error.data, Some(json!({ "code": "HEADER_NOT_FOUND" })));
    }

    #[tokio::test]
    async fn malformed_params_are_invalid_params() {
        let (_dir, state) = state();
        let response = call(&state, "documents.search", Some(json!({ "q": "rust" }))).await;
        assert_eq!(response.error.expect("params error").code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_is_not_found() {
        let (_dir, state) = state();
        let response = call(&state, "documents.write", None).await;
        assert_eq!(response.error.expect("method error").code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn raw_garbage_is_a_parse_error() {
        let (_dir, state) = state();
        let response = handle_raw_request(b"{not json", &state).await.expect("parse errors are answered");
        assert_eq!(response.id, RequestId::Null);
        assert_eq!(response.error.expect("parse error").code, PARSE_ERROR);
    }

    #[tokio::test]
    async fn wrong_version_is_an_invalid_request() {
        let (_dir, state) = state();
        let raw = br#"{"jsonrpc":"1.0","method":"rpc.ping","id":3}"#;
        let response = handle_raw_request(raw, &state).await.expect("requests are answered");
        assert_eq!(response.id, RequestId::Number(3));
        assert_eq!(response.error.expect("version error").code, INVALID_REQUEST);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let (_dir, state) = state();
        let raw = br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        assert!(handle_raw_request(raw, &state).await.is_none());
    }

    #[tokio::test]
    async fn mcp_tool_call_reads_a_section() {
        let (_dir, state) = state();
        let response = call(
            &state,
            "tools/call",
            Some(json!({
                "name": "read_section",
                "arguments": { "path": "notes.md", "section": "Intro" },
            })),
        )
        .await;

        let result = response.result.expect("tool result");
        assert_eq!(result["content"][0]["text"], "hello world");
    }

    #[tokio::test]
    async fn mcp_errors_use_the_same_codes() {
        let (_dir, state) = state();
        let response = call(
            &state,
            "resources/read",
            Some(json!({ "uri": "kb://documents/../secret.md" })),
        )
        .await;
        assert_eq!(response.error.expect("traversal error").code, FORBIDDEN);

        let response =
            call(&state, "tools/call", Some(json!({ "name": "drop_tables" }))).await;
        assert_eq!(response.error.expect("unknown tool").code, INVALID_PARAMS);
    }
}
