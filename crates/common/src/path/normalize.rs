// Relative path cleaning: traversal rejection (including NFKC look-alikes), 512 char max.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum allowed path length in characters.
const MAX_PATH_CHARS: usize = 512;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path exceeds maximum length of {MAX_PATH_CHARS} characters")]
    TooLong,

    #[error("path contains directory traversal component: {0}")]
    Traversal(String),

    #[error("path contains null byte")]
    NullByte,
}

/// Clean an untrusted corpus-relative path.
///
/// Rules:
/// - Reject null bytes and empty input
/// - Treat `\` as a separator and emit `/`
/// - Drop empty and `.` segments (so leading `/` and `//` collapse away)
/// - Reject any `..` segment, wherever it appears, also after NFKC
///   normalization (fullwidth dots and slashes)
/// - Keep the remaining segments byte-for-byte: filenames on disk are not
///   normalized, so rewriting them would point at a different file
/// - Enforce max 512 character limit (after cleaning)
pub fn clean_relative_path(input: &str) -> Result<String, PathError> {
    if input.is_empty() {
        return Err(PathError::Empty);
    }

    if input.contains('\0') {
        return Err(PathError::NullByte);
    }

    let normalized: String = input.nfkc().collect();
    if split_segments(&normalized).any(|segment| segment == "..") {
        return Err(PathError::Traversal(input.to_string()));
    }

    let mut components = Vec::new();
    for component in split_segments(input) {
        match component {
            "" | "." => continue,
            ".." => return Err(PathError::Traversal(input.to_string())),
            other => components.push(other),
        }
    }

    if components.is_empty() {
        return Err(PathError::Empty);
    }

    let result = components.join("/");

    if result.chars().count() > MAX_PATH_CHARS {
        return Err(PathError::TooLong);
    }

    Ok(result)
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\'])
}

/// Forward-slash form of a platform relative path.
pub fn to_slash(path: &std::path::Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
