// `kbnav read`: print a document, or one section of it.

use anyhow::Context as _;
use clap::Args;
use kbnav_common::types::{Document, SectionRead, SectionScope};

use super::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct ReadArgs {
    /// Document path, relative to a knowledge base root.
    pub path: String,

    /// Header title to scope the read to (case-insensitive).
    #[arg(long)]
    pub section: Option<String>,
}

pub fn run(args: ReadArgs, ctx: &Context) -> anyhow::Result<()> {
    match args.section {
        Some(title) => {
            let section = ctx
                .navigator
                .read_section(&args.path, &title)
                .with_context(|| format!("failed to read section `{title}` of {}", args.path))?;
            output::print_output(ctx.format, &section, format_section)?;
        }
        None => {
            let document = ctx
                .navigator
                .read_document(&args.path)
                .with_context(|| format!("failed to read {}", args.path))?;
            output::print_output(ctx.format, &document, format_document)?;
        }
    }
    Ok(())
}

pub(crate) fn format_document(document: &Document) -> String {
    document.content.clone()
}

pub(crate) fn format_section(section: &SectionRead) -> String {
    match (section.scope, &section.header) {
        (SectionScope::Header, Some(header)) => {
            format!("{} (line {})\n\n{}", header.title, header.line_num, section.content)
        }
        (SectionScope::Document, _) => {
            format!("[format has no sections; whole document follows]\n{}", section.content)
        }
        (SectionScope::Header, None) => section.content.clone(),
    }
}
