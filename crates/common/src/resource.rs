// `kb://documents/<path>` resource identifiers.

use crate::types::{Document, Resource};

pub const RESOURCE_URI_PREFIX: &str = "kb://documents/";
pub const RESOURCE_MIME_TYPE: &str = "text/plain";

pub fn resource_uri(path: &str) -> String {
    format!("{RESOURCE_URI_PREFIX}{}", path.replace('\\', "/"))
}

/// Corpus path named by a resource URI, or `None` for foreign URIs.
pub fn path_from_uri(uri: &str) -> Option<&str> {
    uri.strip_prefix(RESOURCE_URI_PREFIX).filter(|path| !path.is_empty())
}

impl From<&Document> for Resource {
    fn from(doc: &Document) -> Self {
        Self {
            uri: resource_uri(&doc.path),
            name: doc.title.clone(),
            mime_type: RESOURCE_MIME_TYPE.to_string(),
            document_id: doc.path.clone(),
        }
    }
}
