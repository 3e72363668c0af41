// Stateless substring scorer with snippet extraction.
//
// Results keep corpus listing order and are not sorted by score; the score
// is a match density (occurrences per content byte), not a ranking.

use kbnav_common::section::header_at_line;
use kbnav_common::types::{Document, SearchResult};

const SNIPPET_BEFORE: usize = 50;
const SNIPPET_AFTER: usize = 100;
const FALLBACK_SNIPPET_BYTES: usize = 150;
const ELLIPSIS: &str = "...";

/// Lower-cased copy of a text that remembers where each byte came from.
struct FoldedText<'a> {
    original: &'a str,
    folded: String,
    origin: Vec<usize>,
}

/// Per-char lower-casing. `str::to_lowercase` applies the context-sensitive
/// final sigma rule, so needle and content must both go through this.
fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

impl<'a> FoldedText<'a> {
    fn new(original: &'a str) -> Self {
        let mut folded = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len());
        for (offset, ch) in original.char_indices() {
            for lower in ch.to_lowercase() {
                folded.push(lower);
                origin.extend(std::iter::repeat(offset).take(lower.len_utf8()));
            }
        }
        Self { original, folded, origin }
    }

    /// Original byte range of the first match of an already lower-cased needle.
    fn find(&self, needle: &str) -> Option<(usize, usize)> {
        let start = self.folded.find(needle)?;
        let last = self.origin[start + needle.len() - 1];
        let end = last + self.original[last..].chars().next().map_or(0, char::len_utf8);
        Some((self.origin[start], end))
    }

    fn count(&self, needle: &str) -> usize {
        self.folded.matches(needle).count()
    }
}

/// `occurrences / content bytes * 100`, or 0 when the query does not occur.
pub fn relevance(content: &str, query: &str) -> f64 {
    let needle = fold_case(query);
    if needle.is_empty() || content.is_empty() {
        return 0.0;
    }
    let count = FoldedText::new(content).count(&needle);
    count as f64 / content.len() as f64 * 100.0
}

/// Excerpt around the first case-insensitive match of `query`.
pub fn extract_snippet(content: &str, query: &str) -> String {
    let needle = fold_case(query);
    let found = if needle.is_empty() { None } else { FoldedText::new(content).find(&needle) };

    match found {
        Some((start, end)) => window(content, start, end),
        None => truncate(content, FALLBACK_SNIPPET_BYTES),
    }
}

/// Score one fully read document. `None` when it does not match.
pub fn score_document(doc: &Document, query: &str) -> Option<SearchResult> {
    let needle = fold_case(query);
    if needle.is_empty() {
        return None;
    }

    let text = FoldedText::new(&doc.content);
    let (start, end) = text.find(&needle)?;
    let score = text.count(&needle) as f64 / doc.content.len() as f64 * 100.0;

    let line = doc.content[..start].bytes().filter(|byte| *byte == b'\n').count() as u32 + 1;
    let header = header_at_line(&doc.headers, line).map(|header| header.to_ref());

    Some(SearchResult {
        document_path: doc.path.clone(),
        score,
        snippet: window(&doc.content, start, end),
        header,
    })
}

fn window(content: &str, start: usize, end: usize) -> String {
    let from = floor_boundary(content, start.saturating_sub(SNIPPET_BEFORE));
    let to = ceil_boundary(content, end.saturating_add(SNIPPET_AFTER).min(content.len()));

    let mut snippet = String::new();
    if from > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(content[from..to].trim());
    if to < content.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

fn truncate(content: &str, max: usize) -> String {
    if content.len() <= max {
        return content.to_string();
    }
    format!("{}{ELLIPSIS}", &content[..floor_boundary(content, max)])
}

fn floor_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_boundary(text: &str, mut index: usize) -> usize {
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use kbnav_common::section::parse_document;
    use kbnav_common::Format;

    use super::*;

    fn doc(path: &str, content: &str, format: Format) -> Document {
        Document { path: path.to_string(), ..parse_document(content, format) }
    }

    #[test]
    fn relevance_is_match_density() {
        assert_eq!(relevance("find me here", "find"), 1.0 / 12.0 * 100.0);
        assert_eq!(relevance("Rust rust RUST", "rust"), 3.0 / 14.0 * 100.0);
        assert_eq!(relevance("nothing relevant", "find"), 0.0);
    }

    #[test]
    fn shorter_documents_score_higher_for_one_match() {
        assert!(relevance("find", "find") > relevance("find it in a longer text", "find"));
    }

    #[test]
    fn snippet_of_short_content_has_no_ellipsis() {
        assert_eq!(extract_snippet("  find me here  ", "FIND"), "find me here");
    }

    #[test]
    fn snippet_window_marks_cut_edges() {
        let content = format!("{}needle{}", "a".repeat(80), "b".repeat(200));
        let snippet = extract_snippet(&content, "needle");

        assert!(snippet.starts_with("...aaaa"));
        assert!(snippet.ends_with("b..."));
        assert_eq!(snippet.len(), 3 + 50 + 6 + 100 + 3);
    }

    #[test]
    fn snippet_at_the_start_only_marks_the_end() {
        let content = format!("needle{}", " x".repeat(100));
        let snippet = extract_snippet(&content, "needle");

        assert!(snippet.starts_with("needle"));
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn snippet_never_splits_multibyte_characters() {
        let content = format!("{}Ünïcödé match {}", "é".repeat(40), "ß".repeat(80));
        let snippet = extract_snippet(&content, "ÜNÏCÖDÉ");
        assert!(snippet.contains("Ünïcödé match"));
    }

    #[test]
    fn fallback_snippet_truncates_without_a_match() {
        let content = "z".repeat(400);
        let snippet = extract_snippet(&content, "absent");
        assert_eq!(snippet.len(), FALLBACK_SNIPPET_BYTES + 3);
        assert!(snippet.ends_with("..."));

        assert_eq!(extract_snippet("short", "absent"), "short");
    }

    #[test]
    fn scoring_localises_the_enclosing_header() {
        let content = "# Intro\nhello\n## Setup\ninstall the toolchain\n# Usage\nrun it";
        let result = score_document(&doc("guide.md", content, Format::Markdown), "toolchain").unwrap();

        assert_eq!(result.document_path, "guide.md");
        assert!(result.score > 0.0);
        assert_eq!(result.header.unwrap().title, "Setup");
    }

    #[test]
    fn matches_before_the_first_header_have_no_header() {
        let result =
            score_document(&doc("a.md", "preamble word\n# Later", Format::Markdown), "word").unwrap();
        assert!(result.header.is_none());
    }

    #[test]
    fn final_sigma_matches_its_own_text() {
        let result = score_document(&doc("greek.txt", "ΟΔΟΣ", Format::Text), "ΟΔΟΣ").unwrap();
        assert_eq!(result.snippet, "ΟΔΟΣ");
        assert_eq!(relevance("ΟΔΟΣ", "ΟΔΟΣ"), 1.0 / "ΟΔΟΣ".len() as f64 * 100.0);
    }

    #[test]
    fn non_matching_document_is_excluded() {
        assert!(score_document(&doc("b.txt", "nothing relevant", Format::Text), "find").is_none());
    }
}
