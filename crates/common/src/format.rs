// Document format detection, keyed on the file extension only.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Extensions the corpus listing accepts (lower-case, without the dot).
pub const ALLOWED_EXTENSIONS: &[&str] = &["org", "md", "markdown", "txt"];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Org,
    Markdown,
    #[default]
    Text,
}

impl Format {
    /// `.org` is Org, `.md`/`.markdown` is Markdown, everything else is Text.
    /// Content is never sniffed.
    pub fn detect(filename: &str) -> Self {
        match extension_of(filename).as_deref() {
            Some("org") => Self::Org,
            Some("md" | "markdown") => Self::Markdown,
            _ => Self::Text,
        }
    }

    /// Whether a section can be addressed by header title in this format.
    pub const fn supports_section_addressing(self) -> bool {
        matches!(self, Self::Org | Self::Markdown)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Org => "org",
            Self::Markdown => "markdown",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension allowlist used by corpus listing.
pub fn is_allowed_file(filename: &str) -> bool {
    extension_of(filename).is_some_and(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// File stem used as the document title.
pub fn title_from_filename(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename).extension().map(|ext| ext.to_string_lossy().to_lowercase())
}
