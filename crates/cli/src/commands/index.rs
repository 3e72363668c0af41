// `kbnav index`: rebuild the persistent search index.

use anyhow::{bail, Context as _};
use clap::Args;
use kbnav_common::types::ReindexReport;

use super::Context;
use crate::output;

#[derive(Debug, Args)]
pub struct IndexArgs {}

pub fn run(_args: IndexArgs, ctx: &Context) -> anyhow::Result<()> {
    if !ctx.navigator.is_indexed() {
        bail!("indexed search is not configured; set [search].strategy = \"indexed\"");
    }
    let report = ctx.navigator.reindex().context("index rebuild failed")?;
    output::print_output(ctx.format, &report, format_human)?;
    Ok(())
}

pub(crate) fn format_human(report: &ReindexReport) -> String {
    let mut line = format!("Indexed {} document(s), removed {} stale", report.indexed, report.removed);
    if report.failed > 0 {
        line.push_str(&format!(", {} failed (see log)", report.failed));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_only_mentioned_when_present() {
        let clean = ReindexReport { indexed: 3, removed: 1, failed: 0 };
        assert_eq!(format_human(&clean), "Indexed 3 document(s), removed 1 stale");

        let partial = ReindexReport { indexed: 2, removed: 0, failed: 1 };
        assert!(format_human(&partial).ends_with("1 failed (see log)"));
    }
}
