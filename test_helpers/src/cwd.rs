//! Working-directory guard for tests.
//!
//! The resolver looks for `.env` relative to the working directory by
//! default, so tests exercising that lookup switch into a temporary
//! directory through [`set_dir`] and let the guard switch back.
//!
//! # Examples
//!
//! ```no_run
//! use test_helpers::cwd;
//!
//! # fn main() -> anyhow::Result<()> {
//! let guard = cwd::set_dir("/tmp")?;
//! // Relative paths now resolve under `/tmp`.
//! guard.restore()?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::{Mutex, MutexGuard};
use std::sync::LazyLock;

static CWD_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

/// Restores the prior working directory on drop.
#[must_use = "dropping restores the prior working directory"]
pub struct CwdGuard {
    original: Utf8PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl CwdGuard {
    /// Directory that will be restored.
    #[must_use]
    pub fn original(&self) -> &Utf8Path {
        &self.original
    }

    /// Restores the original directory, reporting failure.
    ///
    /// # Errors
    ///
    /// Returns an error if `set_current_dir` fails.
    pub fn restore(&self) -> std::io::Result<()> {
        std::env::set_current_dir(&self.original)
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        // Best effort; call `restore` to observe failures.
        let _unused = std::env::set_current_dir(&self.original);
    }
}

/// Changes into `path`, holding a global lock until the guard drops.
///
/// The original directory is captured as UTF-8 before switching, so a
/// conversion failure never leaves the process elsewhere.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read, is not valid
/// UTF-8, or `path` cannot be entered.
pub fn set_dir(path: impl AsRef<std::path::Path>) -> Result<CwdGuard> {
    let lock = CWD_MUTEX.lock();
    let old = std::env::current_dir().context("read current dir")?;
    let original = Utf8PathBuf::from_path_buf(old)
        .map_err(|non_utf8| anyhow!("cwd is not valid UTF-8: {}", non_utf8.display()))?;
    std::env::set_current_dir(path.as_ref()).context("set current dir")?;
    Ok(CwdGuard {
        original,
        _lock: lock,
    })
}
