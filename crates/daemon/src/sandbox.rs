// Maps untrusted corpus-relative paths to absolute paths under the allowed roots.

use std::path::{Path, PathBuf};

use kbnav_common::path::clean_relative_path;
use kbnav_common::KbError;

#[derive(Debug, Clone)]
pub struct Sandbox {
    roots: Vec<PathBuf>,
}

impl Sandbox {
    /// Canonicalise every root. Each must be an existing directory.
    pub fn new<I, P>(roots: I) -> Result<Self, KbError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut canonical = Vec::new();
        for root in roots {
            let root = root.as_ref();
            let resolved = root
                .canonicalize()
                .map_err(|error| KbError::InvalidRoot(format!("{}: {error}", root.display())))?;
            if !resolved.is_dir() {
                return Err(KbError::InvalidRoot(format!("{} is not a directory", root.display())));
            }
            if !canonical.contains(&resolved) {
                canonical.push(resolved);
            }
        }

        if canonical.is_empty() {
            return Err(KbError::InvalidRoot("no sandbox roots configured".to_string()));
        }

        Ok(Self { roots: canonical })
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Clean `relative` and resolve it against the roots in order.
    ///
    /// Traversal segments are rejected before any filesystem access. An
    /// existing candidate is followed through symlinks and must stay under
    /// its root; when no root holds the file, the join under the first root
    /// is returned so the caller reports it as not found.
    pub fn resolve(&self, relative: &str) -> Result<(String, PathBuf), KbError> {
        let clean = clean_relative_path(relative)?;
        let mut escaped = false;

        for root in &self.roots {
            let candidate = root.join(&clean);
            if !candidate.starts_with(root) {
                escaped = true;
                continue;
            }

            match candidate.canonicalize() {
                Ok(resolved) if resolved.starts_with(root) => return Ok((clean, resolved)),
                Ok(_) => escaped = true,
                Err(_) => {}
            }
        }

        if escaped {
            return Err(KbError::NotInAllowedRoots(clean));
        }

        let fallback = self.roots[0].join(&clean);
        Ok((clean, fallback))
    }
}
