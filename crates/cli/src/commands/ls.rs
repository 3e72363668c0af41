// `kbnav ls`: list knowledge base documents.

use clap::Args;
use kbnav_common::types::Document;

use super::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct LsArgs {}

pub fn run(_args: LsArgs, ctx: &Context) -> anyhow::Result<()> {
    let documents = ctx.navigator.list_documents();
    output::print_output(ctx.format, &documents, |docs| format_human(docs))?;
    Ok(())
}

pub(crate) fn format_human(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents found.".into();
    }

    let width = documents.iter().map(|doc| doc.path.len()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(documents.len() + 1);
    lines.push(format!("{} document(s)", documents.len()));
    for doc in documents {
        lines.push(format!(
            "  {:<width$}  {:<8} {:>8} B  {}",
            doc.path,
            doc.format.as_str(),
            doc.size,
            doc.updated_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    lines.join("\n")
}
