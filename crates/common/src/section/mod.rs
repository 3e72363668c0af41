// Header trees for every supported format.

pub mod markdown;
pub mod org;
pub mod resolve;
pub mod text;
mod tree;

pub use resolve::{find_header, header_at_line, read_section};

use crate::format::Format;
use crate::types::{Document, Header};

/// Header tree of `content` using the parser for `format`. Never fails.
pub fn parse_headers(content: &str, format: Format) -> Vec<Header> {
    match format {
        Format::Org => org::parse_headers(content),
        Format::Markdown => markdown::parse_headers(content),
        Format::Text => text::parse_headers(content),
    }
}

/// Parse raw text into a document. Path, title and filesystem metadata are
/// left for the caller to fill in.
pub fn parse_document(content: &str, format: Format) -> Document {
    Document {
        content: content.to_string(),
        format,
        headers: parse_headers(content, format),
        ..Document::default()
    }
}
