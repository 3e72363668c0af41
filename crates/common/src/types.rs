// Core domain types shared across kbnav crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format::Format;

/// One parsed file of the corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Corpus-relative path with forward slashes.
    pub path: String,
    /// File stem.
    pub title: String,
    /// Full raw text. Empty in listings.
    #[serde(default)]
    pub content: String,
    pub format: Format,
    /// Root-level headers; each owns its descendants.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    pub size: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A titled section node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
    /// Nesting depth as written in the source (1 = top level).
    pub level: u8,
    pub title: String,
    /// Body text between this heading and the next heading of any level.
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Header>,
    /// 1-based source line of the heading.
    pub line_num: u32,
}

impl Header {
    pub fn to_ref(&self) -> HeaderRef {
        HeaderRef { title: self.title.clone(), level: self.level, line_num: self.line_num }
    }
}

/// Lightweight pointer to a header, without its content or children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeaderRef {
    pub title: String,
    pub level: u8,
    pub line_num: u32,
}

/// One hit of a search call. Scores compare only within the same call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub document_path: String,
    pub score: f64,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderRef>,
}

/// Whether a section read was resolved to a header or fell back to the whole document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionScope {
    Header,
    Document,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SectionRead {
    pub scope: SectionScope,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<HeaderRef>,
}

/// Stable external name for a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    pub uri: String,
    pub name: String,
    pub mime_type: String,
    pub document_id: String,
}

/// Outcome of a full index rebuild.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReindexReport {
    pub indexed: usize,
    pub removed: usize,
    pub failed: usize,
}
