// RPC method names and their typed arguments.
//
// Raw `(method, params)` pairs are decoded once at the transport boundary
// into a `KbCall`; handlers never see untyped parameter maps.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ── Daemon-internal ────────────────────────────────────────────────
pub const RPC_PING: &str = "rpc.ping";

// ── Documents ──────────────────────────────────────────────────────
pub const DOCUMENTS_LIST: &str = "documents.list";
pub const DOCUMENTS_READ: &str = "documents.read";
pub const DOCUMENTS_SECTION: &str = "documents.section";
pub const DOCUMENTS_SEARCH: &str = "documents.search";

// ── Resources ──────────────────────────────────────────────────────
pub const RESOURCES_LIST: &str = "resources.list";
pub const RESOURCES_READ: &str = "resources.read";

// ── Index ──────────────────────────────────────────────────────────
pub const INDEX_REBUILD: &str = "index.rebuild";

// ── Model Context Protocol ─────────────────────────────────────────
pub const MCP_INITIALIZE: &str = "initialize";
pub const MCP_TOOLS_LIST: &str = "tools/list";
pub const MCP_TOOLS_CALL: &str = "tools/call";
pub const MCP_RESOURCES_LIST: &str = "resources/list";
pub const MCP_RESOURCES_READ: &str = "resources/read";
pub const MCP_PROMPTS_LIST: &str = "prompts/list";
pub const MCP_PROMPTS_GET: &str = "prompts/get";

// MCP tool and prompt names.
pub const TOOL_LIST_DOCUMENTS: &str = "list_documents";
pub const TOOL_READ_DOCUMENT: &str = "read_document";
pub const TOOL_READ_SECTION: &str = "read_section";
pub const TOOL_SEARCH_DOCUMENTS: &str = "search_documents";
pub const PROMPT_SUMMARIZE_DAILY: &str = "summarize_daily";
pub const PROMPT_FIND_RELATED: &str = "find_related";

/// All methods the daemon dispatches.
pub const IMPLEMENTED_METHODS: &[&str] = &[
    RPC_PING,
    DOCUMENTS_LIST,
    DOCUMENTS_READ,
    DOCUMENTS_SECTION,
    DOCUMENTS_SEARCH,
    RESOURCES_LIST,
    RESOURCES_READ,
    INDEX_REBUILD,
    MCP_INITIALIZE,
    MCP_TOOLS_LIST,
    MCP_TOOLS_CALL,
    MCP_RESOURCES_LIST,
    MCP_RESOURCES_READ,
    MCP_PROMPTS_LIST,
    MCP_PROMPTS_GET,
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReadDocumentArgs {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReadSectionArgs {
    pub path: String,
    /// MCP clients send this as `section`.
    #[serde(alias = "section")]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SearchArgs {
    pub query: String,
    /// Defaulted and clamped by the navigator.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReadResourceArgs {
    pub uri: String,
}

/// `initialize` params. Every field is optional and unknown fields are
/// tolerated, since clients advertise capabilities we do not use.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct InitializeArgs {
    pub protocol_version: Option<String>,
    pub client_info: Option<ClientInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// `tools/call` envelope before the arguments are decoded.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

/// One decoded MCP tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    ListDocuments,
    ReadDocument(ReadDocumentArgs),
    ReadSection(ReadSectionArgs),
    SearchDocuments(SearchArgs),
}

impl ToolCall {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListDocuments => TOOL_LIST_DOCUMENTS,
            Self::ReadDocument(_) => TOOL_READ_DOCUMENT,
            Self::ReadSection(_) => TOOL_READ_SECTION,
            Self::SearchDocuments(_) => TOOL_SEARCH_DOCUMENTS,
        }
    }
}

/// `prompts/get` envelope. `topic` is accepted both inside `arguments` and
/// at the top level.
#[derive(Debug, Deserialize)]
struct PromptGetParams {
    name: String,
    #[serde(default)]
    arguments: Option<PromptArguments>,
    #[serde(default)]
    topic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PromptArguments {
    #[serde(default)]
    topic: Option<String>,
}

/// One decoded MCP prompt request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptCall {
    SummarizeDaily,
    FindRelated { topic: String },
}

/// One decoded RPC call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KbCall {
    Ping,
    ListDocuments,
    ReadDocument(ReadDocumentArgs),
    ReadSection(ReadSectionArgs),
    Search(SearchArgs),
    ListResources,
    ReadResource(ReadResourceArgs),
    RebuildIndex,
    Initialize(InitializeArgs),
    ListTools,
    CallTool(ToolCall),
    McpListResources,
    McpReadResource(ReadResourceArgs),
    ListPrompts,
    GetPrompt(PromptCall),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("{0}")]
    InvalidParams(String),
}

impl KbCall {
    pub fn from_parts(method: &str, params: Option<Value>) -> Result<Self, CallError> {
        match method {
            RPC_PING => Ok(Self::Ping),
            DOCUMENTS_LIST => Ok(Self::ListDocuments),
            DOCUMENTS_READ => decode(method, params).map(Self::ReadDocument),
            DOCUMENTS_SECTION => decode(method, params).map(Self::ReadSection),
            DOCUMENTS_SEARCH => decode(method, params).map(Self::Search),
            RESOURCES_LIST => Ok(Self::ListResources),
            RESOURCES_READ => decode(method, params).map(Self::ReadResource),
            INDEX_REBUILD => Ok(Self::RebuildIndex),
            MCP_INITIALIZE => match params {
                Some(params) => decode(method, Some(params)).map(Self::Initialize),
                None => Ok(Self::Initialize(InitializeArgs::default())),
            },
            MCP_TOOLS_LIST => Ok(Self::ListTools),
            MCP_TOOLS_CALL => decode_tool_call(params).map(Self::CallTool),
            MCP_RESOURCES_LIST => Ok(Self::McpListResources),
            MCP_RESOURCES_READ => decode(method, params).map(Self::McpReadResource),
            MCP_PROMPTS_LIST => Ok(Self::ListPrompts),
            MCP_PROMPTS_GET => decode_prompt_call(params).map(Self::GetPrompt),
            other => Err(CallError::UnknownMethod(other.to_string())),
        }
    }

    pub const fn method(&self) -> &'static str {
        match self {
            Self::Ping => RPC_PING,
            Self::ListDocuments => DOCUMENTS_LIST,
            Self::ReadDocument(_) => DOCUMENTS_READ,
            Self::ReadSection(_) => DOCUMENTS_SECTION,
            Self::Search(_) => DOCUMENTS_SEARCH,
            Self::ListResources => RESOURCES_LIST,
            Self::ReadResource(_) => RESOURCES_READ,
            Self::RebuildIndex => INDEX_REBUILD,
            Self::Initialize(_) => MCP_INITIALIZE,
            Self::ListTools => MCP_TOOLS_LIST,
            Self::CallTool(_) => MCP_TOOLS_CALL,
            Self::McpListResources => MCP_RESOURCES_LIST,
            Self::McpReadResource(_) => MCP_RESOURCES_READ,
            Self::ListPrompts => MCP_PROMPTS_LIST,
            Self::GetPrompt(_) => MCP_PROMPTS_GET,
        }
    }
}

fn decode<T: DeserializeOwned>(method: &str, params: Option<Value>) -> Result<T, CallError> {
    let Some(params) = params else {
        return Err(CallError::InvalidParams(format!("{method} requires params")));
    };

    serde_json::from_value(params).map_err(|error| {
        CallError::InvalidParams(format!("failed to decode {method} params: {error}"))
    })
}

fn decode_tool_call(params: Option<Value>) -> Result<ToolCall, CallError> {
    let ToolCallParams { name, arguments } = decode(MCP_TOOLS_CALL, params)?;
    let arguments = arguments.filter(|value| !value.is_null());
    let method = format!("{MCP_TOOLS_CALL} {name}");

    match name.as_str() {
        TOOL_LIST_DOCUMENTS => Ok(ToolCall::ListDocuments),
        TOOL_READ_DOCUMENT => decode(&method, arguments).map(ToolCall::ReadDocument),
        TOOL_READ_SECTION => decode(&method, arguments).map(ToolCall::ReadSection),
        TOOL_SEARCH_DOCUMENTS => decode(&method, arguments).map(ToolCall::SearchDocuments),
        other => Err(CallError::InvalidParams(format!("unknown tool: {other}"))),
    }
}

fn decode_prompt_call(params: Option<Value>) -> Result<PromptCall, CallError> {
    let PromptGetParams { name, arguments, topic } = decode(MCP_PROMPTS_GET, params)?;

    match name.as_str() {
        PROMPT_SUMMARIZE_DAILY => Ok(PromptCall::SummarizeDaily),
        PROMPT_FIND_RELATED => arguments
            .and_then(|arguments| arguments.topic)
            .or(topic)
            .filter(|topic| !topic.trim().is_empty())
            .map(|topic| PromptCall::FindRelated { topic })
            .ok_or_else(|| CallError::InvalidParams("find_related requires a topic".to_string())),
        other => Err(CallError::InvalidParams(format!("unknown prompt: {other}"))),
    }
}
