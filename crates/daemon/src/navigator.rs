// Corpus operations over the sandboxed roots: listing, reads, section lookup,
// resources and search.

use std::collections::HashSet;
use std::fs::{self, Metadata};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use kbnav_common::format::{is_allowed_file, title_from_filename};
use kbnav_common::path::to_slash;
use kbnav_common::query::{clamp_limit, validate_query};
use kbnav_common::resource::path_from_uri;
use kbnav_common::section::{self, parse_document};
use kbnav_common::types::{Document, ReindexReport, Resource, SearchResult, SectionRead};
use kbnav_common::{Format, KbError};
use tracing::{debug, info, warn, Span};
use walkdir::WalkDir;

use crate::sandbox::Sandbox;
use crate::search::{inline, Fts5Index};

/// Which search strategy `search_documents` uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStrategy {
    Inline,
    Indexed { index_path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub roots: Vec<PathBuf>,
    pub search: SearchStrategy,
    /// Parent span for every event this navigator emits.
    pub span: Span,
}

impl NavigatorOptions {
    pub fn inline<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
            search: SearchStrategy::Inline,
            span: Span::none(),
        }
    }

    pub fn with_index(mut self, index_path: impl Into<PathBuf>) -> Self {
        self.search = SearchStrategy::Indexed { index_path: index_path.into() };
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

pub struct Navigator {
    sandbox: Sandbox,
    index: Option<Mutex<Fts5Index>>,
    span: Span,
}

impl Navigator {
    /// Validate the roots and, for the indexed strategy, open the index.
    pub fn open(options: NavigatorOptions) -> Result<Self, KbError> {
        let NavigatorOptions { roots, search, span } = options;
        let sandbox = Sandbox::new(&roots)?;

        let index = match search {
            SearchStrategy::Inline => None,
            SearchStrategy::Indexed { index_path } => {
                Some(Mutex::new(Fts5Index::open(&index_path, span.clone())?))
            }
        };

        info!(
            parent: &span,
            roots = ?sandbox.roots(),
            indexed = index.is_some(),
            "navigator opened"
        );
        Ok(Self { sandbox, index, span })
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Every allowed file under the roots, without content or headers.
    ///
    /// Roots are walked in configured order and entries within a directory by
    /// file name; a path already listed from an earlier root is skipped.
    pub fn list_documents(&self) -> Vec<Document> {
        let mut seen = HashSet::new();
        let mut documents = Vec::new();

        for root in self.sandbox.roots() {
            for entry in WalkDir::new(root).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(error) => {
                        warn!(parent: &self.span, %error, "skipping unreadable corpus entry");
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }

                let file_name = entry.file_name().to_string_lossy();
                if !is_allowed_file(&file_name) {
                    continue;
                }

                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                let path = to_slash(relative);
                if !seen.insert(path.clone()) {
                    continue;
                }

                let metadata = match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(error) => {
                        warn!(parent: &self.span, %path, %error, "skipping file without metadata");
                        continue;
                    }
                };

                documents.push(summary(path, &metadata));
            }
        }

        debug!(parent: &self.span, count = documents.len(), "documents listed");
        documents
    }

    /// Read and parse one document. Extensions are not re-checked here; the
    /// sandbox alone decides what is readable.
    pub fn read_document(&self, path: &str) -> Result<Document, KbError> {
        let (path, content, metadata) = self.read_raw(path)?;
        let format = Format::detect(&path);

        let parsed = parse_document(&content, format);
        Ok(Document { content: parsed.content, headers: parsed.headers, ..summary(path, &metadata) })
    }

    /// Content under the header titled `title`, parsed fresh from disk.
    pub fn read_section(&self, path: &str, title: &str) -> Result<SectionRead, KbError> {
        let (path, content, _) = self.read_raw(path)?;
        section::read_section(&content, Format::detect(&path), title)
    }

    pub fn list_resources(&self) -> Vec<Resource> {
        self.list_documents().iter().map(Resource::from).collect()
    }

    /// Read the document named by a `kb://documents/...` URI.
    pub fn read_resource(&self, uri: &str) -> Result<Document, KbError> {
        let path = path_from_uri(uri)
            .ok_or_else(|| KbError::InvalidPath(format!("unsupported resource uri: {uri}")))?;
        self.read_document(path)
    }

    /// Search with the configured strategy. `limit` defaults to 10 and is
    /// clamped to 1..=100.
    pub fn search_documents(
        &self,
        query: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SearchResult>, KbError> {
        let query = validate_query(query)?;
        let limit = clamp_limit(limit);

        match &self.index {
            Some(index) => lock(index)?.search(query, limit),
            None => Ok(self.inline_search(query, limit)),
        }
    }

    /// Full corpus scan. Unreadable documents are logged and skipped; results
    /// stay in listing order and are cut to `limit` after collection.
    fn inline_search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        let mut results = Vec::new();
        for listed in self.list_documents() {
            let doc = match self.read_document(&listed.path) {
                Ok(doc) => doc,
                Err(error) => {
                    warn!(
                        parent: &self.span,
                        path = %listed.path,
                        %error,
                        "skipping document in search"
                    );
                    continue;
                }
            };
            if let Some(result) = inline::score_document(&doc, query) {
                results.push(result);
            }
        }

        results.truncate(limit);
        results
    }

    /// Read `path` and add or replace its index entry.
    pub fn index_document(&self, path: &str) -> Result<(), KbError> {
        let index = self.require_index()?;
        let doc = self.read_document(path)?;
        lock(index)?.upsert(&doc)
    }

    /// Index every listed document and drop entries for paths no longer listed.
    pub fn reindex(&self) -> Result<ReindexReport, KbError> {
        let index = self.require_index()?;
        let mut report = ReindexReport::default();
        let mut listed = HashSet::new();

        for summary in self.list_documents() {
            listed.insert(summary.path.clone());
            let indexed =
                self.read_document(&summary.path).and_then(|doc| lock(index)?.upsert(&doc));
            match indexed {
                Ok(()) => report.indexed += 1,
                Err(error) => {
                    warn!(
                        parent: &self.span,
                        path = %summary.path,
                        %error,
                        "failed to index document"
                    );
                    report.failed += 1;
                }
            }
        }

        let guard = lock(index)?;
        for stale in guard.indexed_paths()? {
            if !listed.contains(&stale) {
                guard.remove(&stale)?;
                report.removed += 1;
            }
        }
        drop(guard);

        info!(
            parent: &self.span,
            indexed = report.indexed,
            removed = report.removed,
            failed = report.failed,
            "search index rebuilt"
        );
        Ok(report)
    }

    /// Release the search index, if any.
    pub fn close(self) -> Result<(), KbError> {
        let Self { index, span, .. } = self;
        if let Some(index) = index {
            let index = index.into_inner().map_err(|_| poisoned())?;
            index.close()?;
        }
        info!(parent: &span, "navigator closed");
        Ok(())
    }

    fn require_index(&self) -> Result<&Mutex<Fts5Index>, KbError> {
        self.index
            .as_ref()
            .ok_or_else(|| KbError::IndexFailure("indexed search is not enabled".to_string()))
    }

    fn read_raw(&self, path: &str) -> Result<(String, String, Metadata), KbError> {
        let (clean, absolute) = self.sandbox.resolve(path).inspect_err(|error| {
            warn!(parent: &self.span, path, %error, "sandbox rejected path");
        })?;

        let metadata = fs::metadata(&absolute)
            .ok()
            .filter(Metadata::is_file)
            .ok_or_else(|| KbError::DocumentNotFound(clean.clone()))?;
        let bytes = fs::read(&absolute).map_err(|_| KbError::DocumentNotFound(clean.clone()))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();

        Ok((clean, content, metadata))
    }
}

fn summary(path: String, metadata: &Metadata) -> Document {
    let updated_at: DateTime<Utc> =
        metadata.modified().map(DateTime::from).unwrap_or_else(|_| Utc::now());
    let created_at = metadata.created().map(DateTime::from).unwrap_or(updated_at);

    Document {
        title: title_from_filename(&path),
        format: Format::detect(&path),
        size: metadata.len(),
        created_at,
        updated_at,
        path,
        ..Document::default()
    }
}

fn lock(index: &Mutex<Fts5Index>) -> Result<MutexGuard<'_, Fts5Index>, KbError> {
    index.lock().map_err(|_| poisoned())
}

fn poisoned() -> KbError {
    KbError::IndexFailure("search index lock poisoned".to_string())
}
