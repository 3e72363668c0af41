// Persistent full-text index backed by SQLite FTS5.
//
// One row per corpus path. Columns: path, title, content, format; all four
// are searchable, so queries may use column filters such as `title:rust`.

use std::path::Path;

use kbnav_common::types::{Document, SearchResult};
use kbnav_common::KbError;
use rusqlite::{params, Connection};
use tracing::{debug, Span};

const HIGHLIGHT_OPEN: &str = "<mark>";
const HIGHLIGHT_CLOSE: &str = "</mark>";

pub struct Fts5Index {
    conn: Connection,
    span: Span,
}

impl Fts5Index {
    /// Open the index file at `path`, creating it and its parent directory if absent.
    pub fn open(path: &Path, span: Span) -> Result<Self, KbError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|error| {
                KbError::IndexFailure(format!("failed to create `{}`: {error}", parent.display()))
            })?;
        }
        let conn = Connection::open(path).map_err(|error| {
            KbError::IndexFailure(format!("failed to open index `{}`: {error}", path.display()))
        })?;
        Self::with_connection(conn, span)
    }

    pub fn open_in_memory(span: Span) -> Result<Self, KbError> {
        let conn = Connection::open_in_memory().map_err(index_error)?;
        Self::with_connection(conn, span)
    }

    fn with_connection(conn: Connection, span: Span) -> Result<Self, KbError> {
        let index = Self { conn, span };
        index.ensure_schema()?;
        Ok(index)
    }

    fn ensure_schema(&self) -> Result<(), KbError> {
        self.conn
            .execute_batch(
                "CREATE VIRTUAL TABLE IF NOT EXISTS search_index USING fts5(
                    path,
                    title,
                    content,
                    format,
                    tokenize = 'unicode61'
                );",
            )
            .map_err(index_error)?;

        debug!(parent: &self.span, "FTS5 search_index table ensured");
        Ok(())
    }

    /// Add or replace the entry for `doc.path`.
    pub fn upsert(&mut self, doc: &Document) -> Result<(), KbError> {
        // FTS5 has no ON CONFLICT, so delete-then-insert in one transaction.
        let tx = self.conn.transaction().map_err(index_error)?;
        tx.execute("DELETE FROM search_index WHERE path = ?1", params![doc.path])
            .map_err(index_error)?;
        tx.execute(
            "INSERT INTO search_index (path, title, content, format) VALUES (?1, ?2, ?3, ?4)",
            params![doc.path, doc.title, doc.content, doc.format.as_str()],
        )
        .map_err(index_error)?;
        tx.commit().map_err(index_error)?;

        debug!(parent: &self.span, path = %doc.path, "document indexed");
        Ok(())
    }

    pub fn remove(&self, path: &str) -> Result<(), KbError> {
        self.conn
            .execute("DELETE FROM search_index WHERE path = ?1", params![path])
            .map_err(index_error)?;
        Ok(())
    }

    /// Hits ordered by relevance, best first. The score is the negated bm25 rank.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>, KbError> {
        if query.trim().is_empty() {
            return Ok(vec![]);
        }

        let mut stmt = self
            .conn
            .prepare(
                "SELECT path, snippet(search_index, 2, '<mark>', '</mark>', '...', 32), -rank
                 FROM search_index
                 WHERE search_index MATCH ?1
                 ORDER BY rank
                 LIMIT ?2",
            )
            .map_err(index_error)?;

        let hits = stmt
            .query_map(params![query, limit as i64], |row| {
                let snippet: String = row.get(1)?;
                Ok(SearchResult {
                    document_path: row.get(0)?,
                    score: row.get(2)?,
                    snippet: if snippet.contains(HIGHLIGHT_OPEN) { snippet } else { String::new() },
                    header: None,
                })
            })
            .map_err(query_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_error)?;

        debug!(parent: &self.span, query, hits = hits.len(), "index searched");
        Ok(hits)
    }

    pub fn indexed_paths(&self) -> Result<Vec<String>, KbError> {
        let mut stmt = self.conn.prepare("SELECT path FROM search_index").map_err(index_error)?;
        let paths = stmt
            .query_map([], |row| row.get(0))
            .map_err(index_error)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(index_error)?;
        Ok(paths)
    }

    /// Flush and release the connection.
    pub fn close(self) -> Result<(), KbError> {
        let span = self.span;
        self.conn.close().map_err(|(_, error)| index_error(error))?;
        debug!(parent: &span, "search index closed");
        Ok(())
    }
}

fn index_error(error: rusqlite::Error) -> KbError {
    KbError::IndexFailure(error.to_string())
}

/// Malformed FTS5 query syntax is the caller's fault; anything else is the index's.
fn query_error(error: rusqlite::Error) -> KbError {
    let message = error.to_string();
    if message.contains("fts5:")
        || message.contains("no such column")
        || message.contains("unterminated string")
    {
        KbError::InvalidQuery(message)
    } else {
        KbError::IndexFailure(message)
    }
}

#[cfg(test)]
mod tests {
    use kbnav_common::Format;

    use super::*;

    fn doc(path: &str, title: &str, content: &str) -> Document {
        Document {
            path: path.into(),
            title: title.into(),
            content: content.into(),
            format: Format::detect(path),
            ..Document::default()
        }
    }

    fn setup_index() -> Fts5Index {
        let mut idx = Fts5Index::open_in_memory(Span::none()).unwrap();
        idx.upsert(&doc("start.md", "start", "Welcome to kbnav, a plain-text notes navigator."))
            .unwrap();
        idx.upsert(&doc("arch.org", "architecture", "The daemon serves HTTP and JSON-RPC.")).unwrap();
        idx.upsert(&doc("api.txt", "api", "Methods: documents.read, documents.search.")).unwrap();
        idx
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let idx = Fts5Index::open_in_memory(Span::none()).unwrap();
        idx.ensure_schema().unwrap();
    }

    #[test]
    fn search_returns_matching_docs() {
        let idx = setup_index();

        let hits = idx.search("navigator", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_path, "start.md");
        assert!(hits[0].score > 0.0);
        assert!(hits[0].header.is_none());
    }

    #[test]
    fn search_respects_limit() {
        let mut idx = Fts5Index::open_in_memory(Span::none()).unwrap();
        for i in 0..3 {
            idx.upsert(&doc(&format!("n{i}.md"), "n", &format!("shared term part {i}"))).unwrap();
        }

        assert_eq!(idx.search("shared", 10).unwrap().len(), 3);
        assert_eq!(idx.search("shared", 1).unwrap().len(), 1);
    }

    #[test]
    fn reindexing_a_path_replaces_its_entry() {
        let mut idx = setup_index();
        idx.upsert(&doc("start.md", "start", "Completely different content about kangaroos."))
            .unwrap();

        assert!(idx.search("Welcome", 10).unwrap().is_empty());
        let hits = idx.search("kangaroos", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_path, "start.md");
        assert_eq!(idx.indexed_paths().unwrap().len(), 3);
    }

    #[test]
    fn remove_deletes_from_index() {
        let idx = setup_index();
        idx.remove("start.md").unwrap();
        idx.remove("never-indexed.md").unwrap();

        assert!(idx.search("navigator", 10).unwrap().is_empty());
        assert_eq!(idx.indexed_paths().unwrap().len(), 2);
    }

    #[test]
    fn snippet_highlights_content_matches() {
        let idx = setup_index();

        let hits = idx.search("daemon", 10).unwrap();
        assert!(
            hits[0].snippet.contains(HIGHLIGHT_OPEN) && hits[0].snippet.contains(HIGHLIGHT_CLOSE),
            "snippet should contain highlight markers: {}",
            hits[0].snippet
        );
    }

    #[test]
    fn title_only_match_has_empty_snippet() {
        let idx = setup_index();

        let hits = idx.search("title:architecture", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_path, "arch.org");
        assert_eq!(hits[0].snippet, "");
    }

    #[test]
    fn format_column_is_searchable() {
        let idx = setup_index();
        let hits = idx.search("format:org", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_path, "arch.org");
    }

    #[test]
    fn malformed_query_is_invalid_not_a_failure() {
        let idx = setup_index();
        assert!(matches!(idx.search("\"unterminated", 10), Err(KbError::InvalidQuery(_))));
        assert!(matches!(idx.search("nosuchcolumn:x", 10), Err(KbError::InvalidQuery(_))));
    }

    #[test]
    fn index_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/index.db");

        let mut idx = Fts5Index::open(&path, Span::none()).unwrap();
        idx.upsert(&doc("a.md", "a", "durable words")).unwrap();
        idx.close().unwrap();

        let idx = Fts5Index::open(&path, Span::none()).unwrap();
        assert_eq!(idx.search("durable", 10).unwrap().len(), 1);
    }
}
