// Org-mode outline parsing.
//
// A structural pass classifies every line (headline, drawer, planning, block
// delimiter, text); the headline nodes are then walked into the shared header
// tree. Drawers and planning lines belong to their headline's metadata, not to
// its text, so they are left out of header content.

use std::collections::HashSet;

use crate::section::tree::{build_tree, HeadingDraft};
use crate::types::Header;

const TODO_KEYWORDS: &[&str] = &["TODO", "DONE"];
const HIDDEN_DRAWERS: &[&str] = &["PROPERTIES", "LOGBOOK"];
const PLANNING_KEYWORDS: &[&str] = &["SCHEDULED:", "DEADLINE:", "CLOSED:"];
const EMPHASIS_MARKERS: &[char] = &['*', '/', '=', '~', '+', '_'];

#[derive(Debug, PartialEq, Eq)]
enum OrgLine<'a> {
    Headline { stars: usize, text: &'a str },
    DrawerStart(&'a str),
    DrawerEnd,
    Planning,
    BlockStart,
    BlockEnd,
    Text,
}

pub fn parse_headers(content: &str) -> Vec<Header> {
    let mut drafts = Vec::new();
    let mut hidden = HashSet::new();
    let mut in_block = false;
    let mut in_drawer = false;

    for (index, line) in content.lines().enumerate() {
        let kind = classify(line);

        if in_block {
            in_block = kind != OrgLine::BlockEnd;
            continue;
        }

        match kind {
            OrgLine::Headline { stars, text } => {
                in_drawer = false;
                drafts.push(HeadingDraft {
                    level: u8::try_from(stars).unwrap_or(u8::MAX),
                    title: headline_title(text),
                    line: index as u32 + 1,
                });
            }
            OrgLine::BlockStart => in_block = true,
            OrgLine::DrawerStart(name)
                if HIDDEN_DRAWERS.iter().any(|hidden| hidden.eq_ignore_ascii_case(name)) =>
            {
                in_drawer = true;
                hidden.insert(index);
            }
            OrgLine::DrawerEnd if in_drawer => {
                in_drawer = false;
                hidden.insert(index);
            }
            OrgLine::Planning => {
                hidden.insert(index);
            }
            _ if in_drawer => {
                hidden.insert(index);
            }
            _ => {}
        }
    }

    build_tree(content, drafts, |index| !hidden.contains(&index))
}

fn classify(line: &str) -> OrgLine<'_> {
    let stars = line.bytes().take_while(|byte| *byte == b'*').count();
    if stars > 0 && line[stars..].starts_with(|ch: char| ch == ' ' || ch == '\t') {
        return OrgLine::Headline { stars, text: &line[stars..] };
    }

    let trimmed = line.trim();
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("#+begin_") {
        return OrgLine::BlockStart;
    }
    if lower.starts_with("#+end_") {
        return OrgLine::BlockEnd;
    }
    if trimmed.eq_ignore_ascii_case(":end:") {
        return OrgLine::DrawerEnd;
    }
    if let Some(name) = trimmed.strip_prefix(':').and_then(|rest| rest.strip_suffix(':')) {
        if !name.is_empty() && name.chars().all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-')
        {
            return OrgLine::DrawerStart(name);
        }
    }
    if PLANNING_KEYWORDS.iter().any(|keyword| trimmed.starts_with(keyword)) {
        return OrgLine::Planning;
    }

    OrgLine::Text
}

/// Display text of a headline: keyword, priority cookie and tags removed,
/// inline markup flattened.
fn headline_title(text: &str) -> String {
    let mut rest = text.trim();

    for keyword in TODO_KEYWORDS {
        if let Some(after) = rest.strip_prefix(keyword) {
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                rest = after.trim_start();
                break;
            }
        }
    }

    if let Some(after) = rest.strip_prefix("[#") {
        let mut chars = after.chars();
        if chars.next().is_some_and(char::is_alphanumeric) && chars.next() == Some(']') {
            rest = chars.as_str().trim_start();
        }
    }

    if let Some((head, last)) = rest.rsplit_once(char::is_whitespace) {
        if is_tag_group(last) {
            rest = head.trim_end();
        }
    }

    flatten_inline(rest)
}

fn is_tag_group(token: &str) -> bool {
    token.len() >= 3
        && token.starts_with(':')
        && token.ends_with(':')
        && token[1..token.len() - 1].split(':').all(|tag| {
            !tag.is_empty() && tag.chars().all(|ch| ch.is_alphanumeric() || "_@#%".contains(ch))
        })
}

/// Plain text of Org inline markup: links reduced to their description (or
/// target) and emphasis markers removed.
pub fn flatten_inline(text: &str) -> String {
    strip_emphasis(&flatten_links(text))
}

fn flatten_links(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("[[") {
        let Some(len) = rest[start..].find("]]") else {
            break;
        };
        let inner = &rest[start + 2..start + len];
        out.push_str(&rest[..start]);
        out.push_str(inner.split_once("][").map_or(inner, |(_, description)| description));
        rest = &rest[start + len + 2..];
    }

    out.push_str(rest);
    out
}

fn strip_emphasis(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        if EMPHASIS_MARKERS.contains(&ch) && opens_emphasis(&chars, index) {
            if let Some(close) = closing_marker(&chars, index) {
                let inner: String = chars[index + 1..close].iter().collect();
                out.push_str(&strip_emphasis(&inner));
                index = close + 1;
                continue;
            }
        }
        out.push(ch);
        index += 1;
    }

    out
}

fn opens_emphasis(chars: &[char], index: usize) -> bool {
    let before_ok = index == 0 || !chars[index - 1].is_alphanumeric();
    let after_ok = chars.get(index + 1).is_some_and(|next| !next.is_whitespace());
    before_ok && after_ok
}

fn closing_marker(chars: &[char], open: usize) -> Option<usize> {
    let marker = chars[open];
    (open + 2..chars.len()).find(|&index| {
        chars[index] == marker
            && !chars[index - 1].is_whitespace()
            && chars.get(index + 1).map_or(true, |next| !next.is_alphanumeric())
    })
}
