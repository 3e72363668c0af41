use crate::section::tree::{build_tree, HeadingDraft};
use crate::types::Header;

/// `# ` and `## ` lines of a plain-text note.
///
/// Text headers carry no body: plain text has no section addressing, so
/// section reads return the whole document instead.
pub fn parse_headers(content: &str) -> Vec<Header> {
    let drafts = content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let (level, title) = if let Some(title) = line.strip_prefix("## ") {
                (2, title)
            } else if let Some(title) = line.strip_prefix("# ") {
                (1, title)
            } else {
                return None;
            };

            Some(HeadingDraft { level, title: title.trim().to_string(), line: index as u32 + 1 })
        })
        .collect();

    build_tree(content, drafts, |_| false)
}
