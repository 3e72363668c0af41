use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};

use crate::section::tree::{build_tree, HeadingDraft};
use crate::types::Header;

/// ATX headings of a Markdown document, nested by level.
///
/// Headings are located with pulldown-cmark so `#` lines inside fenced code
/// or HTML blocks are skipped; the title is the rest of the physical line.
pub fn parse_headers(markdown: &str) -> Vec<Header> {
    let mut drafts = Vec::new();

    for (event, range) in Parser::new(markdown).into_offset_iter() {
        let Event::Start(Tag::Heading { level, .. }) = event else {
            continue;
        };

        let line_start = line_start_for_offset(markdown, range.start);
        if !is_atx_heading(&markdown[line_start..]) {
            continue;
        }

        drafts.push(HeadingDraft {
            level: level_to_u8(level),
            title: atx_title(line_at(markdown, line_start)),
            line: line_number_for_offset(markdown, range.start),
        });
    }

    build_tree(markdown, drafts, |_| true)
}

/// Heading text without the opening run or an optional closing run of `#`.
/// A closing run only counts when whitespace separates it from the text.
fn atx_title(line: &str) -> String {
    let text = line.trim_start().trim_start_matches('#').trim();
    let unclosed = text.trim_end_matches('#');
    if unclosed.is_empty() {
        String::new()
    } else if unclosed.ends_with([' ', '\t']) {
        unclosed.trim_end().to_string()
    } else {
        text.to_string()
    }
}

fn is_atx_heading(line: &str) -> bool {
    line.chars().find(|ch| !ch.is_whitespace()).map(|ch| ch == '#').unwrap_or(false)
}

fn line_start_for_offset(markdown: &str, offset: usize) -> usize {
    markdown[..offset].rfind('\n').map(|index| index + 1).unwrap_or(0)
}

fn line_at(markdown: &str, line_start: usize) -> &str {
    let rest = &markdown[line_start..];
    rest.split('\n').next().unwrap_or(rest).trim_end_matches('\r')
}

fn line_number_for_offset(markdown: &str, offset: usize) -> u32 {
    markdown[..offset].bytes().filter(|byte| *byte == b'\n').count() as u32 + 1
}

fn level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_headers;

    #[test]
    fn builds_nested_tree_from_atx_levels() {
        let markdown = "# Root\n\n## Child\n\n### Grandchild\n\n## Sibling\n";
        let headers = parse_headers(markdown);

        assert_eq!(headers.len(), 1);
        let root = &headers[0];
        assert_eq!(root.title, "Root");
        assert_eq!(root.level, 1);
        assert_eq!(root.line_num, 1);

        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].title, "Child");
        assert_eq!(root.children[0].line_num, 3);
        assert_eq!(root.children[0].children[0].title, "Grandchild");
        assert_eq!(root.children[0].children[0].level, 3);
        assert_eq!(root.children[1].title, "Sibling");
        assert_eq!(root.children[1].line_num, 7);
    }

    #[test]
    fn header_content_is_the_body_up_to_the_next_heading() {
        let headers = parse_headers("# Intro\nhello world\n# Details\nmore text");

        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].content, "hello world");
        assert_eq!(headers[1].title, "Details");
        assert_eq!(headers[1].content, "more text");
        assert_eq!(headers[1].line_num, 3);
    }

    #[test]
    fn title_keeps_inline_markup_from_the_source_line() {
        let headers = parse_headers("## Using `cargo` *well*\n");
        assert_eq!(headers[0].title, "Using `cargo` *well*");
    }

    #[test]
    fn ignores_setext_headings() {
        let headers = parse_headers("Title\n=====\n\n# Actual\n");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].title, "Actual");
    }

    #[test]
    fn ignores_hash_lines_in_code_blocks_and_html_blocks() {
        let markdown = r#"# Real

```
# Not a section
```

<div>
# Also not a section
</div>

## Next
"#;

        let headers = parse_headers(markdown);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].title, "Real");
        assert!(headers[0].content.contains("# Not a section"));
        assert_eq!(headers[0].children[0].title, "Next");
    }

    #[test]
    fn document_without_headings_yields_no_headers() {
        assert!(parse_headers("just some text\n\nand more").is_empty());
        assert!(parse_headers("").is_empty());
    }

    #[test]
    fn crlf_line_endings_do_not_leak_into_titles() {
        let headers = parse_headers("# One\r\nbody\r\n# Two\r\n");
        assert_eq!(headers[0].title, "One");
        assert_eq!(headers[0].content, "body");
        assert_eq!(headers[1].title, "Two");
    }

    #[test]
    fn closing_hash_runs_are_not_part_of_the_title() {
        let markdown = "# Title #\nbody\n## Lang ##   \n### C#\n#### ####\n";
        let headers = parse_headers(markdown);

        assert_eq!(headers[0].title, "Title");
        assert_eq!(headers[0].children[0].title, "Lang");
        assert_eq!(headers[0].children[0].children[0].title, "C#");
        assert_eq!(headers[0].children[0].children[0].children[0].title, "");

        let section = crate::section::read_section(markdown, crate::Format::Markdown, "Title")
            .expect("closed heading should be addressable by its text");
        assert_eq!(section.content, "body");
    }
}
