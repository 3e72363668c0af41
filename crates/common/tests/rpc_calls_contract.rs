use std::collections::BTreeSet;

use kbnav_common::protocol::calls::{
    CallError, KbCall, PromptCall, SearchArgs, ToolCall, IMPLEMENTED_METHODS,
};
use serde_json::json;

fn sample_params(method: &str) -> serde_json::Value {
    match method {
        "documents.read" => json!({"path": "notes.md"}),
        "documents.section" => json!({"path": "notes.md", "title": "Intro"}),
        "documents.search" => json!({"query": "rust"}),
        "resources.read" | "resources/read" => json!({"uri": "kb://documents/notes.md"}),
        "initialize" => json!({"protocolVersion": "2024-11-05", "capabilities": {}}),
        "tools/call" => json!({"name": "search_documents", "arguments": {"query": "rust"}}),
        "prompts/get" => json!({"name": "summarize_daily"}),
        _ => json!({}),
    }
}

#[test]
fn every_implemented_method_decodes() {
    for method in IMPLEMENTED_METHODS {
        let call = KbCall::from_parts(method, Some(sample_params(method)))
            .unwrap_or_else(|error| panic!("{method} failed to decode: {error}"));
        assert_eq!(call.method(), *method);
    }
}

#[test]
fn implemented_methods_are_unique() {
    let unique: BTreeSet<&str> = IMPLEMENTED_METHODS.iter().copied().collect();
    assert_eq!(unique.len(), IMPLEMENTED_METHODS.len(), "duplicate method names");
}

#[test]
fn write_methods_are_not_exposed() {
    for method in ["documents.write", "documents.edit", "documents.delete"] {
        assert_eq!(
            KbCall::from_parts(method, Some(json!({"path": "a.md"}))),
            Err(CallError::UnknownMethod(method.to_string()))
        );
    }
}

#[test]
fn mcp_methods_share_the_native_argument_types() {
    for method in ["initialize", "tools/list", "tools/call", "resources/list", "resources/read", "prompts/list", "prompts/get"] {
        assert!(IMPLEMENTED_METHODS.contains(&method), "{method} is not dispatched");
    }

    assert_eq!(
        KbCall::from_parts("tools/call", Some(sample_params("tools/call"))).unwrap(),
        KbCall::CallTool(ToolCall::SearchDocuments(SearchArgs { query: "rust".into(), limit: None }))
    );
    assert_eq!(
        KbCall::from_parts("prompts/get", Some(sample_params("prompts/get"))).unwrap(),
        KbCall::GetPrompt(PromptCall::SummarizeDaily)
    );
}

#[test]
fn mcp_tool_calls_cannot_reach_write_operations() {
    for tool in ["write_document", "delete_document", "edit_section"] {
        assert!(matches!(
            KbCall::from_parts("tools/call", Some(json!({"name": tool, "arguments": {"path": "a.md"}}))),
            Err(CallError::InvalidParams(_))
        ));
    }
}
