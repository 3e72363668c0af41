// `kbnav search`: search across the knowledge base.

use anyhow::Context as _;
use clap::Args;
use kbnav_common::types::SearchResult;
use serde::Serialize;

use super::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Search query. Indexed search accepts FTS5 syntax.
    pub query: String,

    /// Maximum number of results (1-100).
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub hits: Vec<SearchResult>,
}

pub fn run(args: SearchArgs, ctx: &Context) -> anyhow::Result<()> {
    let hits = ctx
        .navigator
        .search_documents(&args.query, args.limit)
        .with_context(|| format!("search for \"{}\" failed", args.query))?;
    let result = SearchOutput { query: args.query, hits };
    output::print_output(ctx.format, &result, format_human)?;
    Ok(())
}

pub(crate) fn format_human(result: &SearchOutput) -> String {
    if result.hits.is_empty() {
        return format!("No results for \"{}\".", result.query);
    }

    let mut lines = vec![format!("{} result(s) for \"{}\":", result.hits.len(), result.query)];
    for hit in &result.hits {
        let location = match &hit.header {
            Some(header) => format!("{} > {}", hit.document_path, header.title),
            None => hit.document_path.clone(),
        };
        lines.push(format!("\n  {location}  ({:.3})", hit.score));
        if !hit.snippet.is_empty() {
            lines.push(format!("    {}", hit.snippet.replace('\n', " ")));
        }
    }
    lines.join("\n")
}
