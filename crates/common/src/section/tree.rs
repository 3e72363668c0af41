// Shared header-tree construction for every format.

use std::iter::Peekable;

use crate::types::Header;

/// A heading found by a format scanner, before nesting.
#[derive(Debug, Clone)]
pub(crate) struct HeadingDraft {
    pub level: u8,
    pub title: String,
    /// 1-based line of the heading.
    pub line: u32,
}

/// Attach bodies to drafts and nest them by level.
///
/// A header's body is every line strictly between its heading and the next
/// heading of any level for which `is_body_line` (0-based index) holds, with
/// blank lines trimmed at both ends. A header becomes a child of the nearest
/// preceding header with a strictly smaller level.
pub(crate) fn build_tree<F>(content: &str, drafts: Vec<HeadingDraft>, is_body_line: F) -> Vec<Header>
where
    F: Fn(usize) -> bool,
{
    let lines: Vec<&str> = content.lines().collect();
    let total = lines.len();

    let next_lines: Vec<usize> = drafts
        .iter()
        .skip(1)
        .map(|next| next.line as usize - 1)
        .chain(std::iter::once(total))
        .collect();

    let flat = drafts.into_iter().zip(next_lines).map(|(draft, body_end)| {
        let body_start = (draft.line as usize).min(total);
        let body: Vec<&str> = (body_start..body_end.clamp(body_start, total))
            .filter(|index| is_body_line(*index))
            .map(|index| lines[index])
            .collect();

        Header {
            level: draft.level,
            title: draft.title,
            content: trim_blank_lines(&body),
            children: Vec::new(),
            line_num: draft.line,
        }
    });

    nest(&mut flat.peekable(), 0)
}

fn nest<I>(headers: &mut Peekable<I>, parent_level: u8) -> Vec<Header>
where
    I: Iterator<Item = Header>,
{
    let mut siblings = Vec::new();
    while let Some(mut header) = headers.next_if(|next| next.level > parent_level) {
        header.children = nest(headers, header.level);
        siblings.push(header);
    }
    siblings
}

fn trim_blank_lines(lines: &[&str]) -> String {
    let is_blank = |line: &&str| line.trim().is_empty();
    let start = lines.iter().position(|line| !is_blank(line)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|line| !is_blank(line)).map_or(start, |index| index + 1);
    lines[start..end].join("\n")
}
