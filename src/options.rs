//! Search options and working directory resolution

use std::env;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{DEFAULT_DEPTH, PathType, Strategy};

/// Options for an upward search
#[derive(Debug, Clone)]
pub struct UpOptions {
    /// Directory to start from, the process working directory when unset
    pub cwd:            Option<PathBuf>,
    /// Kind of entry to accept
    pub path_type:      PathType,
    /// Whether a symlink to an acceptable entry counts as a match
    pub allow_symlinks: bool,
    /// Last directory to check, the filesystem root when unset
    pub stop_at:        Option<PathBuf>,
    /// Maximum number of matches collected by `find_up_multiple`, unbounded
    /// when unset. `Some(0)` makes the search fail with
    /// [`Error::InvalidArgument`].
    pub limit:          Option<usize>,
}

impl Default for UpOptions {
    fn default() -> Self {
        Self {
            cwd:            None,
            path_type:      PathType::File,
            allow_symlinks: true,
            stop_at:        None,
            limit:          None,
        }
    }
}

impl UpOptions {
    /// Create options with the defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting directory
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the kind of entry to accept
    #[must_use]
    pub const fn path_type(mut self, path_type: PathType) -> Self {
        self.path_type = path_type;
        self
    }

    /// Set whether symlinks are followed
    #[must_use]
    pub const fn allow_symlinks(mut self, allow: bool) -> Self {
        self.allow_symlinks = allow;
        self
    }

    /// Set the directory at which the walk halts after checking it
    #[must_use]
    pub fn stop_at(mut self, stop_at: impl Into<PathBuf>) -> Self {
        self.stop_at = Some(stop_at.into());
        self
    }

    /// Set the maximum number of matches to collect
    ///
    /// A limit of 0 is not clamped. The search rejects it with
    /// [`Error::InvalidArgument`].
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Options for a downward search
#[derive(Debug, Clone)]
pub struct DownOptions {
    /// Directory to start from, the process working directory when unset
    pub cwd:            Option<PathBuf>,
    /// Kind of entry to accept
    pub path_type:      PathType,
    /// Whether a symlink to an acceptable entry counts as a match
    pub allow_symlinks: bool,
    /// Levels below `cwd` to descend into, 0 checks `cwd` only
    pub depth:          usize,
    /// Traversal order
    pub strategy:       Strategy,
}

impl Default for DownOptions {
    fn default() -> Self {
        Self {
            cwd:            None,
            path_type:      PathType::File,
            allow_symlinks: true,
            depth:          DEFAULT_DEPTH,
            strategy:       Strategy::Breadth,
        }
    }
}

impl DownOptions {
    /// Create options with the defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the starting directory
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the kind of entry to accept
    #[must_use]
    pub const fn path_type(mut self, path_type: PathType) -> Self {
        self.path_type = path_type;
        self
    }

    /// Set whether symlinks are followed
    #[must_use]
    pub const fn allow_symlinks(mut self, allow: bool) -> Self {
        self.allow_symlinks = allow;
        self
    }

    /// Set the maximum depth; negative values are clamped to 0
    #[must_use]
    pub fn depth(mut self, depth: i64) -> Self {
        self.depth = usize::try_from(depth.max(0)).unwrap_or(usize::MAX);
        self
    }

    /// Set the traversal order
    #[must_use]
    pub const fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Resolve the starting directory of a search
///
/// The process working directory is only read when `cwd` is unset or
/// relative.
///
/// # Errors
/// Returns error if the process working directory cannot be determined.
pub fn resolve_cwd(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(dir) if dir.is_absolute() => Ok(normalize(dir)),
        Some(dir) => Ok(normalize(&env::current_dir()?.join(dir))),
        None => Ok(normalize(&env::current_dir()?)),
    }
}

/// Resolve `path` against `base` without touching the filesystem
#[must_use]
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    normalize(&base.join(path))
}

/// Collapse `.` and `..` components lexically
///
/// `..` at the root stays at the root. Symlinks are not resolved.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                out.push(component);
            },
            Component::CurDir => {},
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            },
        }
    }
    out
}

pub(crate) fn validate_limit(limit: Option<usize>) -> Result<usize> {
    match limit {
        Some(0) => Err(Error::invalid_argument("limit must be at least 1")),
        Some(n) => Ok(n),
        None => Ok(usize::MAX),
    }
}
