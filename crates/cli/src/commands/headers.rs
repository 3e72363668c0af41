// `kbnav headers`: indented header outline of one document.

use anyhow::Context as _;
use clap::Args;
use kbnav_common::types::Header;
use serde::Serialize;

use super::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct HeadersArgs {
    /// Document path, relative to a knowledge base root.
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct HeadersResult {
    pub path: String,
    pub section_addressing: bool,
    pub headers: Vec<Header>,
}

pub fn run(args: HeadersArgs, ctx: &Context) -> anyhow::Result<()> {
    let document = ctx
        .navigator
        .read_document(&args.path)
        .with_context(|| format!("failed to read {}", args.path))?;
    let result = HeadersResult {
        section_addressing: document.format.supports_section_addressing(),
        path: document.path,
        headers: document.headers,
    };
    output::print_output(ctx.format, &result, format_human)?;
    Ok(())
}

pub(crate) fn format_human(result: &HeadersResult) -> String {
    if result.headers.is_empty() {
        return format!("{}: no headers", result.path);
    }

    let mut lines = vec![result.path.clone()];
    outline(&result.headers, 1, &mut lines);
    if !result.section_addressing {
        lines.push("(headers in this format cannot be read as sections)".into());
    }
    lines.join("\n")
}

fn outline(headers: &[Header], depth: usize, lines: &mut Vec<String>) {
    for header in headers {
        lines.push(format!(
            "{}{} {}  :{}",
            "  ".repeat(depth),
            "#".repeat(usize::from(header.level.max(1))),
            header.title,
            header.line_num
        ));
        outline(&header.children, depth + 1, lines);
    }
}
