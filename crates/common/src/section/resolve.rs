// Title lookup over header trees.

use crate::error::KbError;
use crate::format::Format;
use crate::section::parse_headers;
use crate::types::{Header, SectionRead, SectionScope};

/// First header, depth-first, whose title equals `title` ignoring case.
pub fn find_header<'a>(headers: &'a [Header], title: &str) -> Option<&'a Header> {
    let wanted = title.to_lowercase();
    find_lowercase(headers, &wanted)
}

fn find_lowercase<'a>(headers: &'a [Header], wanted: &str) -> Option<&'a Header> {
    headers.iter().find_map(|header| {
        if header.title.to_lowercase() == wanted {
            Some(header)
        } else {
            find_lowercase(&header.children, wanted)
        }
    })
}

/// Content under `title`, parsed fresh from `content`.
///
/// Formats without section addressing return the whole text with
/// [`SectionScope::Document`].
pub fn read_section(content: &str, format: Format, title: &str) -> Result<SectionRead, KbError> {
    if !format.supports_section_addressing() {
        return Ok(SectionRead {
            scope: SectionScope::Document,
            content: content.to_string(),
            header: None,
        });
    }

    let headers = parse_headers(content, format);
    let header =
        find_header(&headers, title).ok_or_else(|| KbError::HeaderNotFound(title.to_string()))?;

    Ok(SectionRead {
        scope: SectionScope::Header,
        content: header.content.clone(),
        header: Some(header.to_ref()),
    })
}

/// Innermost header whose span contains the 1-based `line`.
pub fn header_at_line(headers: &[Header], line: u32) -> Option<&Header> {
    let candidate = headers.iter().rev().find(|header| header.line_num <= line)?;
    header_at_line(&candidate.children, line).or(Some(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTES: &str = "# Intro\nhello world\n# Details\nmore text";

    #[test]
    fn reads_the_body_of_the_matching_header() {
        let section = read_section(NOTES, Format::Markdown, "Details").unwrap();

        assert_eq!(section.scope, SectionScope::Header);
        assert_eq!(section.content, "more text");
        assert_eq!(section.header.unwrap().line_num, 3);
    }

    #[test]
    fn missing_header_carries_the_requested_title() {
        let err = read_section(NOTES, Format::Markdown, "Missing").unwrap_err();
        assert_eq!(err, KbError::HeaderNotFound("Missing".into()));
    }

    #[test]
    fn matching_is_case_insensitive_but_exact() {
        assert_eq!(read_section(NOTES, Format::Markdown, "dEtAiLs").unwrap().content, "more text");
        assert!(read_section(NOTES, Format::Markdown, "Detail").is_err());
        assert!(read_section(NOTES, Format::Markdown, "Details ").is_err());
    }

    #[test]
    fn depth_first_search_returns_the_first_match() {
        let org = "* Parent\n** Notes\nnested\n* Notes\ntop level\n";
        let section = read_section(org, Format::Org, "notes").unwrap();
        assert_eq!(section.content, "nested");
    }

    #[test]
    fn text_format_returns_whole_document() {
        let text = "# A\nalpha\n# B\nbeta";
        let section = read_section(text, Format::Text, "anything").unwrap();

        assert_eq!(section.scope, SectionScope::Document);
        assert_eq!(section.content, text);
        assert!(section.header.is_none());
    }

    #[test]
    fn header_at_line_finds_the_innermost_section() {
        let headers = parse_headers("# A\na\n## B\nb\n# C\nc", Format::Markdown);

        assert_eq!(header_at_line(&headers, 2).unwrap().title, "A");
        assert_eq!(header_at_line(&headers, 4).unwrap().title, "B");
        assert_eq!(header_at_line(&headers, 6).unwrap().title, "C");
    }

    #[test]
    fn lines_before_the_first_header_have_no_section() {
        let headers = parse_headers("preamble\n# A\n", Format::Markdown);
        assert!(header_at_line(&headers, 1).is_none());
    }
}
