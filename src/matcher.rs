//! Search targets: literal names or matcher callbacks

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "async")]
use async_trait::async_trait;
use globset::{GlobBuilder, GlobMatcher};
use tracing::debug;

use crate::error::{BoxError, Error, Result};
#[cfg(feature = "async")]
use crate::locate::locate_async;
use crate::locate::{Probe, locate};

/// Outcome of checking one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    /// A candidate, absolute or relative to the checked directory
    Path(PathBuf),
    /// Several candidates, the first one passing the type checks wins
    Candidates(Vec<PathBuf>),
    /// Abort the whole search, keeping matches collected so far
    Stop,
    /// Nothing here, keep going
    Continue,
}

impl Match {
    /// Convenience constructor for [`Match::Path`]
    #[must_use]
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

/// Split a matcher answer into candidates still to be checked, or a final
/// answer. Empty paths are dropped.
fn into_candidates(found: Match) -> std::result::Result<Vec<PathBuf>, Match> {
    let paths = match found {
        Match::Path(path) => vec![path],
        Match::Candidates(paths) => paths,
        other => return Err(other),
    };
    Ok(paths.into_iter().filter(|path| !path.as_os_str().is_empty()).collect())
}

impl<P: Into<PathBuf>> From<Option<P>> for Match {
    fn from(path: Option<P>) -> Self {
        path.map_or(Self::Continue, Self::path)
    }
}

/// Blocking matcher called once per visited directory
pub trait Matcher {
    /// Inspect `directory` and report what was found
    ///
    /// # Errors
    /// Any error aborts the search and is returned to the caller.
    fn find(&self, directory: &Path) -> std::result::Result<Match, BoxError>;
}

impl<F> Matcher for F
where
    F: Fn(&Path) -> std::result::Result<Match, BoxError>,
{
    fn find(&self, directory: &Path) -> std::result::Result<Match, BoxError> {
        self(directory)
    }
}

/// Non-blocking matcher called once per visited directory
#[cfg(feature = "async")]
#[async_trait]
pub trait AsyncMatcher: Send + Sync {
    /// Inspect `directory` and report what was found
    ///
    /// # Errors
    /// Any error aborts the search and is returned to the caller.
    async fn find(&self, directory: &Path) -> std::result::Result<Match, BoxError>;
}

#[cfg(feature = "async")]
#[async_trait]
impl<F, Fut> AsyncMatcher for F
where
    F: Fn(PathBuf) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Match, BoxError>> + Send + 'static,
{
    async fn find(&self, directory: &Path) -> std::result::Result<Match, BoxError> {
        self(directory.to_path_buf()).await
    }
}

/// What a blocking search looks for
pub enum Target<'a> {
    /// Names checked in order in every directory
    Names(Vec<PathBuf>),
    /// Callback deciding per directory
    Matcher(Box<dyn Matcher + 'a>),
}

impl<'a> Target<'a> {
    /// Wrap a matcher callback
    pub fn matcher<M: Matcher + 'a>(matcher: M) -> Self {
        Self::Matcher(Box::new(matcher))
    }

    /// Wrap a closure as a matcher
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Path) -> std::result::Result<Match, BoxError> + 'a,
    {
        Self::Matcher(Box::new(f))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Names(names) => validate_names(names),
            Self::Matcher(_) => Ok(()),
        }
    }

    /// Check one directory
    ///
    /// Paths returned by a matcher are checked like names, so they must exist
    /// and have the right type to count. The result is never
    /// [`Match::Candidates`].
    pub(crate) fn apply(&self, directory: &Path, probe: Probe) -> Result<Match> {
        let found = match self {
            Self::Names(names) => return Ok(locate(directory, names.as_slice(), probe).into()),
            Self::Matcher(matcher) => matcher.find(directory).map_err(Error::Matcher)?,
        };
        Ok(match into_candidates(found) {
            Ok(paths) => locate(directory, paths.as_slice(), probe).into(),
            Err(answer) => answer,
        })
    }
}

impl fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Names(names) => f.debug_tuple("Names").field(names).finish(),
            Self::Matcher(_) => f.write_str("Matcher(..)"),
        }
    }
}

/// What a non-blocking search looks for
#[cfg(feature = "async")]
pub enum AsyncTarget<'a> {
    /// Names checked in order in every directory
    Names(Vec<PathBuf>),
    /// Awaited callback deciding per directory
    Matcher(Box<dyn AsyncMatcher + 'a>),
    /// Blocking callback, called inline
    Blocking(Box<dyn Matcher + Send + Sync + 'a>),
}

#[cfg(feature = "async")]
impl<'a> AsyncTarget<'a> {
    /// Wrap a non-blocking matcher callback
    pub fn matcher<M: AsyncMatcher + 'a>(matcher: M) -> Self {
        Self::Matcher(Box::new(matcher))
    }

    /// Wrap a closure returning a future as a matcher
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(PathBuf) -> Fut + Send + Sync + 'a,
        Fut: Future<Output = std::result::Result<Match, BoxError>> + Send + 'static,
    {
        Self::Matcher(Box::new(f))
    }

    /// Wrap a blocking matcher callback
    pub fn from_blocking<M: Matcher + Send + Sync + 'a>(matcher: M) -> Self {
        Self::Blocking(Box::new(matcher))
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Names(names) => validate_names(names),
            Self::Matcher(_) | Self::Blocking(_) => Ok(()),
        }
    }

    /// Non-blocking form of [`Target::apply`]
    pub(crate) async fn apply(&self, directory: &Path, probe: Probe) -> Result<Match> {
        let found = match self {
            Self::Names(names) => {
                return Ok(locate_async(directory, names.as_slice(), probe).await.into());
            },
            Self::Matcher(matcher) => matcher.find(directory).await,
            Self::Blocking(matcher) => matcher.find(directory),
        };
        Ok(match into_candidates(found.map_err(Error::Matcher)?) {
            Ok(paths) => locate_async(directory, paths.as_slice(), probe).await.into(),
            Err(answer) => answer,
        })
    }
}

#[cfg(feature = "async")]
impl fmt::Debug for AsyncTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Names(names) => f.debug_tuple("Names").field(names).finish(),
            Self::Matcher(_) => f.write_str("Matcher(..)"),
            Self::Blocking(_) => f.write_str("Blocking(..)"),
        }
    }
}

fn validate_names(names: &[PathBuf]) -> Result<()> {
    if names.iter().any(|name| name.as_os_str().is_empty()) {
        return Err(Error::invalid_argument("Names must not be empty"));
    }
    Ok(())
}

macro_rules! impl_names_from {
    ($target:ident) => {
        impl From<&str> for $target<'_> {
            fn from(name: &str) -> Self {
                Self::Names(vec![PathBuf::from(name)])
            }
        }

        impl From<String> for $target<'_> {
            fn from(name: String) -> Self {
                Self::Names(vec![PathBuf::from(name)])
            }
        }

        impl From<&Path> for $target<'_> {
            fn from(name: &Path) -> Self {
                Self::Names(vec![name.to_path_buf()])
            }
        }

        impl From<PathBuf> for $target<'_> {
            fn from(name: PathBuf) -> Self {
                Self::Names(vec![name])
            }
        }

        impl<T: Into<PathBuf>> From<Vec<T>> for $target<'_> {
            fn from(names: Vec<T>) -> Self {
                Self::Names(names.into_iter().map(Into::into).collect())
            }
        }

        impl<T: Into<PathBuf> + Clone> From<&[T]> for $target<'_> {
            fn from(names: &[T]) -> Self {
                Self::Names(names.iter().cloned().map(Into::into).collect())
            }
        }

        impl<T: Into<PathBuf>, const N: usize> From<[T; N]> for $target<'_> {
            fn from(names: [T; N]) -> Self {
                Self::Names(names.into_iter().map(Into::into).collect())
            }
        }
    };
}

impl_names_from!(Target);
#[cfg(feature = "async")]
impl_names_from!(AsyncTarget);

/// Matcher reporting every entry whose file name matches a glob
///
/// Matching entries are tried in file name order and the first one that
/// passes the type and symlink checks wins.
#[derive(Debug, Clone)]
pub struct Glob {
    matcher: GlobMatcher,
}

/// Build a [`Glob`] matcher from `pattern`
///
/// # Errors
/// Returns error if the pattern is invalid.
pub fn glob(pattern: &str) -> Result<Glob> {
    if pattern.is_empty() {
        return Err(Error::invalid_argument("Pattern must not be empty"));
    }
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| Error::invalid_argument(&format!("Invalid pattern: {e}")))?;
    Ok(Glob { matcher: glob.compile_matcher() })
}

impl Glob {
    fn candidates(&self, mut names: Vec<PathBuf>) -> Match {
        names.retain(|name| self.matcher.is_match(name));
        if names.is_empty() {
            return Match::Continue;
        }
        names.sort();
        Match::Candidates(names)
    }
}

impl Matcher for Glob {
    fn find(&self, directory: &Path) -> std::result::Result<Match, BoxError> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(directory = %directory.display(), error = %e, "glob skipped directory");
                return Ok(Match::Continue);
            },
        };
        let names = entries.filter_map(|entry| entry.ok().map(|e| PathBuf::from(e.file_name())));
        Ok(self.candidates(names.collect()))
    }
}

#[cfg(feature = "async")]
#[async_trait]
impl AsyncMatcher for Glob {
    async fn find(&self, directory: &Path) -> std::result::Result<Match, BoxError> {
        let mut entries = match tokio::fs::read_dir(directory).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!(directory = %directory.display(), error = %e, "glob skipped directory");
                return Ok(Match::Continue);
            },
        };
        let mut names = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            names.push(PathBuf::from(entry.file_name()));
        }
        Ok(self.candidates(names))
    }
}
