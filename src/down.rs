//! Bounded downward search into subdirectories

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::Result;
use crate::locate::Probe;
#[cfg(feature = "async")]
use crate::matcher::AsyncTarget;
use crate::matcher::{Match, Target};
use crate::options::{DownOptions, resolve_cwd};
use crate::types::Strategy;

/// Directories waiting to be checked, with their depth below the start
///
/// Breadth-first pops from the front. Depth-first pops from the back and
/// pushes children in reverse, which visits them in pre-order just like a
/// recursive walk would.
#[derive(Debug)]
struct Frontier {
    strategy:  Strategy,
    max_depth: usize,
    pending:   VecDeque<(PathBuf, usize)>,
}

impl Frontier {
    fn new(root: PathBuf, options: &DownOptions) -> Self {
        Self {
            strategy:  options.strategy,
            max_depth: options.depth,
            pending:   VecDeque::from([(root, 0)]),
        }
    }

    fn pop(&mut self) -> Option<(PathBuf, usize)> {
        match self.strategy {
            Strategy::Breadth => self.pending.pop_front(),
            Strategy::Depth => self.pending.pop_back(),
        }
    }

    const fn should_descend(&self, depth: usize) -> bool {
        depth < self.max_depth
    }

    /// Queue the subdirectories of a directory found at `depth`
    fn extend(&mut self, children: Vec<PathBuf>, depth: usize) {
        let children = children.into_iter().map(|child| (child, depth + 1));
        match self.strategy {
            Strategy::Breadth => self.pending.extend(children),
            Strategy::Depth => self.pending.extend(children.rev()),
        }
    }
}

/// Subdirectories of `directory`, sorted by name
///
/// Symlinks are not followed. A directory that cannot be listed has no
/// children as far as the search is concerned.
fn list_children(directory: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(directory = %directory.display(), error = %e, "skipping unreadable directory");
            return Vec::new();
        },
    };

    let mut children: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!(directory = %directory.display(), error = %e, "skipping unreadable entry");
                None
            },
        })
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_dir()))
        .map(|entry| entry.path())
        .collect();
    children.sort();
    children
}

/// Non-blocking form of [`list_children`]
#[cfg(feature = "async")]
async fn list_children_async(directory: &Path) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(directory).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(directory = %directory.display(), error = %e, "skipping unreadable directory");
            return Vec::new();
        },
    };

    let mut children = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                if entry.file_type().await.is_ok_and(|file_type| file_type.is_dir()) {
                    children.push(entry.path());
                }
            },
            Ok(None) => break,
            Err(e) => {
                debug!(directory = %directory.display(), error = %e, "stopped listing directory");
                break;
            },
        }
    }
    children.sort();
    children
}

/// Find the first match in the starting directory or below it
///
/// Visits at most `depth` levels below the start in the configured order.
/// A [`Match::Stop`] ends the search with no result.
///
/// # Errors
/// Returns error if a matcher fails, a name is empty, or the process working
/// directory is needed and cannot be read.
pub fn find_down<'a>(
    target: impl Into<Target<'a>>,
    options: &DownOptions,
) -> Result<Option<PathBuf>> {
    let target = target.into();
    target.validate()?;
    let probe = Probe::from(options);
    let mut frontier = Frontier::new(resolve_cwd(options.cwd.as_deref())?, options);

    while let Some((directory, depth)) = frontier.pop() {
        trace!(directory = %directory.display(), depth, "checking directory");
        match target.apply(&directory, probe)? {
            Match::Path(path) => return Ok(Some(path)),
            Match::Stop => {
                debug!(directory = %directory.display(), "matcher stopped the search");
                return Ok(None);
            },
            Match::Continue | Match::Candidates(_) => {},
        }
        if frontier.should_descend(depth) {
            frontier.extend(list_children(&directory), depth);
        }
    }

    Ok(None)
}

/// Non-blocking form of [`find_down`]
///
/// # Errors
/// Same as [`find_down`].
#[cfg(feature = "async")]
pub async fn find_down_async<'a>(
    target: impl Into<AsyncTarget<'a>>,
    options: &DownOptions,
) -> Result<Option<PathBuf>> {
    let target = target.into();
    target.validate()?;
    let probe = Probe::from(options);
    let mut frontier = Frontier::new(resolve_cwd(options.cwd.as_deref())?, options);

    while let Some((directory, depth)) = frontier.pop() {
        trace!(directory = %directory.display(), depth, "checking directory");
        match target.apply(&directory, probe).await? {
            Match::Path(path) => return Ok(Some(path)),
            Match::Stop => {
                debug!(directory = %directory.display(), "matcher stopped the search");
                return Ok(None);
            },
            Match::Continue | Match::Candidates(_) => {},
        }
        if frontier.should_descend(depth) {
            frontier.extend(list_children_async(&directory).await, depth);
        }
    }

    Ok(None)
}
