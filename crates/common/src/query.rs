// Search query and limit validation shared by every entry point.

use crate::error::KbError;

pub const MAX_QUERY_BYTES: usize = 1000;
pub const DEFAULT_SEARCH_LIMIT: usize = 10;
pub const MAX_SEARCH_LIMIT: usize = 100;

/// Trimmed query, or `InvalidQuery` when it is blank or too long.
pub fn validate_query(query: &str) -> Result<&str, KbError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(KbError::InvalidQuery("query must not be empty".to_string()));
    }
    if trimmed.len() > MAX_QUERY_BYTES {
        return Err(KbError::InvalidQuery(format!(
            "query exceeds {MAX_QUERY_BYTES} bytes ({} bytes)",
            trimmed.len()
        )));
    }
    Ok(trimmed)
}

pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_SEARCH_LIMIT).clamp(1, MAX_SEARCH_LIMIT)
}
