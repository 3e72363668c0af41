// CLI subcommand dispatch.

use clap::Subcommand;
use kbnav_daemon::navigator::Navigator;

use crate::output::OutputFormat;

pub mod headers;
pub mod index;
pub mod ls;
pub mod read;
pub mod repl;
pub mod search;

/// What every command runs against.
pub struct Context {
    pub navigator: Navigator,
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Command {
    /// List documents in the knowledge base
    Ls(ls::LsArgs),
    /// Read a document or one of its sections
    Read(read::ReadArgs),
    /// Show a document's header outline
    Headers(headers::HeadersArgs),
    /// Search across documents
    Search(search::SearchArgs),
    /// Rebuild the persistent search index
    Index(index::IndexArgs),
    /// Interactive prompt
    Repl(repl::ReplArgs),
}

pub fn run(cmd: Command, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        Command::Ls(args) => ls::run(args, ctx),
        Command::Read(args) => read::run(args, ctx),
        Command::Headers(args) => headers::run(args, ctx),
        Command::Search(args) => search::run(args, ctx),
        Command::Index(args) => index::run(args, ctx),
        Command::Repl(args) => repl::run(args, ctx),
    }
}
