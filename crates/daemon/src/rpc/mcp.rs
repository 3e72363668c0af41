// Model Context Protocol results: tools, resources and prompts over the
// same navigator the native methods use.

use kbnav_common::protocol::calls::{
    InitializeArgs, PromptCall, ToolCall, PROMPT_FIND_RELATED, PROMPT_SUMMARIZE_DAILY,
    TOOL_LIST_DOCUMENTS, TOOL_READ_DOCUMENT, TOOL_READ_SECTION, TOOL_SEARCH_DOCUMENTS,
};
use kbnav_common::resource::RESOURCE_MIME_TYPE;
use kbnav_common::types::{Document, SearchResult};
use kbnav_common::KbError;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::navigator::Navigator;

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "kbnav";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct McpResource {
    uri: String,
    name: String,
    mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceContents {
    uri: String,
    mime_type: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct TextContent {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

impl TextContent {
    fn new(text: String) -> Self {
        Self { kind: "text", text }
    }
}

pub fn initialize(args: &InitializeArgs) -> Value {
    if let Some(client) = &args.client_info {
        info!(client = %client.name, version = %client.version, "mcp client connected");
    }
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": {},
            "resources": {},
            "prompts": {},
        },
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

pub fn list_tools() -> Value {
    json!({
        "tools": [
            {
                "name": TOOL_LIST_DOCUMENTS,
                "description": "List all documents in the knowledge base",
                "inputSchema": { "type": "object", "properties": {} },
            },
            {
                "name": TOOL_READ_DOCUMENT,
                "description": "Read a document from the knowledge base",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Path relative to the knowledge base root" },
                    },
                    "required": ["path"],
                },
            },
            {
                "name": TOOL_READ_SECTION,
                "description": "Read one section of a document by its header title",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "description": "Path to the document" },
                        "section": { "type": "string", "description": "Header title to read" },
                    },
                    "required": ["path", "section"],
                },
            },
            {
                "name": TOOL_SEARCH_DOCUMENTS,
                "description": "Search documents by keyword",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "description": "Search query" },
                        "limit": { "type": "integer", "description": "Maximum results", "default": 10 },
                    },
                    "required": ["query"],
                },
            },
        ],
    })
}

pub fn call_tool(navigator: &Navigator, call: ToolCall) -> Result<Value, KbError> {
    let text = match call {
        ToolCall::ListDocuments => document_listing(&navigator.list_documents()),
        ToolCall::ReadDocument(args) => navigator.read_document(&args.path)?.content,
        ToolCall::ReadSection(args) => navigator.read_section(&args.path, &args.title)?.content,
        ToolCall::SearchDocuments(args) => {
            let results = navigator.search_documents(&args.query, args.limit)?;
            search_listing(args.query.trim(), &results)
        }
    };
    Ok(json!({ "content": [TextContent::new(text)] }))
}

pub fn list_resources(navigator: &Navigator) -> Value {
    let resources: Vec<McpResource> = navigator
        .list_resources()
        .into_iter()
        .map(|resource| McpResource {
            uri: resource.uri,
            name: resource.name,
            mime_type: RESOURCE_MIME_TYPE,
        })
        .collect();
    json!({ "resources": resources })
}

pub fn read_resource(navigator: &Navigator, uri: &str) -> Result<Value, KbError> {
    let doc = navigator.read_resource(uri)?;
    let contents =
        ResourceContents { uri: uri.to_string(), mime_type: RESOURCE_MIME_TYPE, text: doc.content };
    Ok(json!({ "contents": [contents] }))
}

pub fn list_prompts() -> Value {
    json!({
        "prompts": [
            {
                "name": PROMPT_SUMMARIZE_DAILY,
                "description": "Summarize today's notes",
                "arguments": [],
            },
            {
                "name": PROMPT_FIND_RELATED,
                "description": "Find related notes about a topic",
                "arguments": [
                    { "name": "topic", "description": "Topic to search for", "required": true },
                ],
            },
        ],
    })
}

pub fn get_prompt(call: &PromptCall) -> Value {
    let (description, text) = match call {
        PromptCall::SummarizeDaily => (
            "Summarize today's notes",
            "Summarize my notes from today. Focus on: what I accomplished, open tasks and key insights."
                .to_string(),
        ),
        PromptCall::FindRelated { topic } => (
            "Find related notes about a topic",
            format!(
                "Find and summarize all my notes related to: {topic}. Include connections between them."
            ),
        ),
    };
    json!({
        "description": description,
        "messages": [{ "role": "user", "content": TextContent::new(text) }],
    })
}

fn document_listing(documents: &[Document]) -> String {
    let mut text = format!("Found {} documents", documents.len());
    for doc in documents {
        text.push_str("\n- ");
        text.push_str(&doc.path);
    }
    text
}

fn search_listing(query: &str, results: &[SearchResult]) -> String {
    let mut text = format!("Found {} results for: {query}", results.len());
    for result in results {
        text.push_str(&format!("\n- {} ({:.3})", result.document_path, result.score));
        if let Some(header) = &result.header {
            text.push_str(&format!(" [{}]", header.title));
        }
        if !result.snippet.is_empty() {
            text.push_str(&format!(": {}", result.snippet.replace('\n', " ")));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use std::fs;

    use kbnav_common::protocol::calls::{ReadSectionArgs, SearchArgs};
    use tempfile::TempDir;

    use super::*;
    use crate::navigator::NavigatorOptions;

    fn navigator() -> (TempDir, Navigator) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.md"), "# Intro\nhello world\n# Details\nmore text").unwrap();
        fs::write(dir.path().join("todo.org"), "* TODO Ship\nworld tour").unwrap();
        let navigator = Navigator::open(NavigatorOptions::inline([dir.path()])).unwrap();
        (dir, navigator)
    }

    #[test]
    fn initialize_advertises_all_capabilities() {
        let result = initialize(&InitializeArgs::default());
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        for capability in ["tools", "resources", "prompts"] {
            assert!(result["capabilities"][capability].is_object(), "{capability}");
        }
    }

    #[test]
    fn tools_list_names_every_tool() {
        let tools = list_tools();
        let names: Vec<&str> =
            tools["tools"].as_array().unwrap().iter().filter_map(|tool| tool["name"].as_str()).collect();
        assert_eq!(
            names,
            [TOOL_LIST_DOCUMENTS, TOOL_READ_DOCUMENT, TOOL_READ_SECTION, TOOL_SEARCH_DOCUMENTS]
        );
    }

    #[test]
    fn tool_results_are_text_content() {
        let (_dir, nav) = navigator();

        let result = call_tool(
            &nav,
            ToolCall::ReadSection(ReadSectionArgs { path: "notes.md".into(), title: "Details".into() }),
        )
        .unwrap();
        assert_eq!(result["content"][0]["type"], "text");
        assert_eq!(result["content"][0]["text"], "more text");

        let result = call_tool(&nav, ToolCall::ListDocuments).unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Found 2 documents"));
        assert!(text.contains("- notes.md") && text.contains("- todo.org"));

        let result = call_tool(
            &nav,
            ToolCall::SearchDocuments(SearchArgs { query: "world".into(), limit: None }),
        )
        .unwrap();
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Found 2 results for: world"), "{text}");
        assert!(text.contains("[Intro]"));
    }

    #[test]
    fn resources_use_mcp_field_names() {
        let (_dir, nav) = navigator();

        let listed = list_resources(&nav);
        assert_eq!(listed["resources"][0]["uri"], "kb://documents/notes.md");
        assert_eq!(listed["resources"][0]["mimeType"], RESOURCE_MIME_TYPE);

        let read = read_resource(&nav, "kb://documents/todo.org").unwrap();
        assert_eq!(read["contents"][0]["uri"], "kb://documents/todo.org");
        assert_eq!(read["contents"][0]["text"], "* TODO Ship\nworld tour");
    }

    #[test]
    fn find_related_prompt_mentions_the_topic() {
        let prompt = get_prompt(&PromptCall::FindRelated { topic: "gardening".into() });
        assert_eq!(prompt["messages"][0]["role"], "user");
        let text = prompt["messages"][0]["content"]["text"].as_str().unwrap();
        assert!(text.contains("gardening"));

        let prompts = list_prompts();
        let names: Vec<&str> = prompts["prompts"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|prompt| prompt["name"].as_str())
            .collect();
        assert_eq!(names, [PROMPT_SUMMARIZE_DAILY, PROMPT_FIND_RELATED]);
    }
}
