//! Throwaway `.env` files.
//!
//! ```
//! use test_helpers::dotenv::DotenvFile;
//!
//! # fn main() -> anyhow::Result<()> {
//! let file = DotenvFile::with_entries([("APP_HOST", "from-dotenv")])?;
//! assert!(file.path().as_str().ends_with(".env"));
//! # Ok(())
//! # }
//! ```

use std::fmt::Write as _;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// A `.env` file inside a temporary directory removed on drop.
#[derive(Debug)]
pub struct DotenvFile {
    dir: TempDir,
    path: Utf8PathBuf,
}

impl DotenvFile {
    /// Writes `contents` verbatim to `<tempdir>/.env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be created, or the
    /// temporary path is not valid UTF-8.
    pub fn with_contents(contents: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let root = Utf8Path::from_path(dir.path())
            .ok_or_else(|| anyhow!("temp dir is not valid UTF-8"))?;
        let path = root.join(".env");
        std::fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(Self { dir, path })
    }

    /// Writes one `KEY=value` line per entry.
    ///
    /// # Errors
    ///
    /// See [`DotenvFile::with_contents`].
    pub fn with_entries<I, K, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut contents = String::new();
        for (key, value) in entries {
            writeln!(contents, "{}={}", key.as_ref(), value.as_ref())
                .context("format dotenv line")?;
        }
        Self::with_contents(&contents)
    }

    /// Full path of the file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Directory holding the file.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}
