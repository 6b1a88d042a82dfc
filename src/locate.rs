//! Locating the first existing candidate inside one directory

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::options::{DownOptions, UpOptions, resolve};
use crate::types::PathType;

/// Type and symlink constraints applied to every candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    /// Kind of entry to accept
    pub path_type:      PathType,
    /// Follow symlinks when checking the entry type
    pub allow_symlinks: bool,
}

impl Default for Probe {
    fn default() -> Self {
        Self { path_type: PathType::File, allow_symlinks: true }
    }
}

impl From<&UpOptions> for Probe {
    fn from(options: &UpOptions) -> Self {
        Self { path_type: options.path_type, allow_symlinks: options.allow_symlinks }
    }
}

impl From<&DownOptions> for Probe {
    fn from(options: &DownOptions) -> Self {
        Self { path_type: options.path_type, allow_symlinks: options.allow_symlinks }
    }
}

impl Probe {
    /// Returns true if `path` exists and satisfies the constraints
    ///
    /// Any stat failure, including permission errors, is a negative answer.
    #[must_use]
    pub fn check(self, path: &Path) -> bool {
        let metadata =
            if self.allow_symlinks { fs::metadata(path) } else { fs::symlink_metadata(path) };
        self.accept(path, metadata)
    }

    /// Non-blocking form of [`Probe::check`]
    #[cfg(feature = "async")]
    pub async fn check_async(self, path: &Path) -> bool {
        let metadata = if self.allow_symlinks {
            tokio::fs::metadata(path).await
        } else {
            tokio::fs::symlink_metadata(path).await
        };
        self.accept(path, metadata)
    }

    fn accept(self, path: &Path, metadata: io::Result<fs::Metadata>) -> bool {
        match metadata {
            Ok(metadata) => {
                let accepted = self.path_type.accepts(&metadata);
                if !accepted {
                    trace!(path = %path.display(), "candidate has the wrong type");
                }
                accepted
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable candidate");
                false
            },
        }
    }
}

/// Find the first candidate that exists in `directory`
///
/// Candidates are checked in order and the first accepted one wins. The
/// returned path is `directory` joined with the candidate, so absolute
/// candidates are returned as they are.
pub fn locate<P: AsRef<Path>>(directory: &Path, candidates: &[P], probe: Probe) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|candidate| resolve(directory, candidate.as_ref()))
        .find(|path| probe.check(path))
}

/// Non-blocking form of [`locate`]
///
/// All candidates are checked concurrently, but the result is still the first
/// accepted candidate in list order, not the first check to complete.
/// Must be called from within a tokio runtime.
#[cfg(feature = "async")]
pub async fn locate_async<P: AsRef<Path>>(
    directory: &Path,
    candidates: &[P],
    probe: Probe,
) -> Option<PathBuf> {
    if let [candidate] = candidates {
        let path = resolve(directory, candidate.as_ref());
        return probe.check_async(&path).await.then_some(path);
    }

    let mut checks: Vec<_> = candidates
        .iter()
        .map(|candidate| {
            let path = resolve(directory, candidate.as_ref());
            let handle = tokio::spawn({
                let path = path.clone();
                async move { probe.check_async(&path).await }
            });
            (path, handle)
        })
        .collect();

    let mut found = None;
    for (index, (path, handle)) in checks.iter_mut().enumerate() {
        if matches!(handle.await, Ok(true)) {
            found = Some((index, path.clone()));
            break;
        }
    }

    if let Some((index, _)) = found {
        for (_, handle) in &checks[index + 1..] {
            handle.abort();
        }
    }
    found.map(|(_, path)| path)
}

/// Returns true if `path` exists, following symlinks
///
/// # Errors
/// Returns error if `path` is empty.
pub fn exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = non_empty(path.as_ref())?;
    Ok(path.exists())
}

/// Returns true if `path` is a regular file, following symlinks
///
/// # Errors
/// Returns error if `path` is empty.
pub fn is_file(path: impl AsRef<Path>) -> Result<bool> {
    let path = non_empty(path.as_ref())?;
    Ok(path.is_file())
}

/// Returns true if `path` is a directory, following symlinks
///
/// # Errors
/// Returns error if `path` is empty.
pub fn is_directory(path: impl AsRef<Path>) -> Result<bool> {
    let path = non_empty(path.as_ref())?;
    Ok(path.is_dir())
}

fn non_empty(path: &Path) -> Result<&Path> {
    if path.as_os_str().is_empty() {
        return Err(Error::invalid_argument("Expected a non-empty path"));
    }
    Ok(path)
}
