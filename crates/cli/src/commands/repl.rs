// `kbnav repl`: line-oriented prompt over the same navigator.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context as _;
use clap::Args;
use kbnav_daemon::navigator::Navigator;

use super::headers::HeadersResult;
use super::search::SearchOutput;
use super::{headers, ls, read, search, Context};
use crate::output::{self, OutputFormat};

const PROMPT: &str = "kbnav> ";
const HELP: &str = "commands: list | read <path> [section...] | headers <path> | search <query> | exit";

#[derive(Debug, Args)]
pub struct ReplArgs {}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    List,
    Read { path: &'a str, section: Option<String> },
    Headers { path: &'a str },
    Search { query: &'a str },
    Help,
    Exit,
}

pub fn run(_args: ReplArgs, ctx: &Context) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    run_session(&ctx.navigator, ctx.format, stdin.lock(), &mut io::stdout().lock(), prompt)
}

/// Drive one session until `exit` or end of input. Command errors are
/// reported inline and the session continues.
pub fn run_session<R, W>(
    navigator: &Navigator,
    format: OutputFormat,
    input: R,
    out: &mut W,
    prompt: bool,
) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let line = line.context("failed to read repl input")?;

        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                output::write_error(out, format, "USAGE", &message, false)?;
                continue;
            }
        };

        if command == ReplCommand::Exit {
            return Ok(());
        }
        if let Err(error) = execute(navigator, format, command, out) {
            output::write_error(out, format, output::error_code(&error), &format!("{error:#}"), false)?;
        }
    }
}

fn parse(line: &str) -> Result<Option<ReplCommand<'_>>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let command = match verb {
        "list" | "ls" => ReplCommand::List,
        "read" => {
            let path = words.next().ok_or("usage: read <path> [section...]")?;
            let section: Vec<&str> = words.collect();
            let section = (!section.is_empty()).then(|| section.join(" "));
            ReplCommand::Read { path, section }
        }
        "headers" => ReplCommand::Headers { path: words.next().ok_or("usage: headers <path>")? },
        "search" => {
            let query = line.trim_start()[verb.len()..].trim();
            if query.is_empty() {
                return Err("usage: search <query>".into());
            }
            ReplCommand::Search { query }
        }
        "help" | "?" => ReplCommand::Help,
        "exit" | "quit" => ReplCommand::Exit,
        other => return Err(format!("unknown command `{other}`; {HELP}")),
    };
    Ok(Some(command))
}

fn execute<W: Write>(
    navigator: &Navigator,
    format: OutputFormat,
    command: ReplCommand<'_>,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        ReplCommand::List => {
            let documents = navigator.list_documents();
            output::write_output(out, format, &documents, |docs| ls::format_human(docs))?;
        }
        ReplCommand::Read { path, section: Some(title) } => {
            let section = navigator.read_section(path, &title)?;
            output::write_output(out, format, &section, read::format_section)?;
        }
        ReplCommand::Read { path, section: None } => {
            let document = navigator.read_document(path)?;
            output::write_output(out, format, &document, read::format_document)?;
        }
        ReplCommand::Headers { path } => {
            let document = navigator.read_document(path)?;
            let result = HeadersResult {
                section_addressing: document.format.supports_section_addressing(),
                path: document.path,
                headers: document.headers,
            };
            output::write_output(out, format, &result, headers::format_human)?;
        }
        ReplCommand::Search { query } => {
            let hits = navigator.search_documents(query, None)?;
            let result = SearchOutput { query: query.to_string(), hits };
            output::write_output(out, format, &result, search::format_human)?;
        }
        ReplCommand::Help => writeln!(out, "{HELP}")?,
        ReplCommand::Exit => {}
    }
    Ok(())
}
