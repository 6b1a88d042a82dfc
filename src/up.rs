//! Upward search from a directory through its parents

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::Result;
use crate::locate::Probe;
#[cfg(feature = "async")]
use crate::matcher::AsyncTarget;
use crate::matcher::{Match, Target};
use crate::options::{UpOptions, resolve, resolve_cwd, validate_limit};

/// State of one upward walk, shared by the blocking and async drivers
///
/// The drivers only differ in how a directory is checked. Everything else,
/// including termination, lives here.
#[derive(Debug)]
struct UpwardWalk {
    /// Directory to check next
    directory: PathBuf,
    /// Last directory to check
    stop_at:   Option<PathBuf>,
    /// Matches wanted before stopping
    limit:     usize,
    /// Matches collected so far, nearest first
    matches:   Vec<PathBuf>,
    done:      bool,
}

impl UpwardWalk {
    fn new(options: &UpOptions) -> Result<Self> {
        let limit = validate_limit(options.limit)?;
        let directory = resolve_cwd(options.cwd.as_deref())?;
        let stop_at = options.stop_at.as_deref().map(|stop_at| resolve(&directory, stop_at));
        Ok(Self { directory, stop_at, limit, matches: Vec::new(), done: false })
    }

    /// Directory to check next, `None` once the walk has terminated
    fn directory(&self) -> Option<&Path> {
        (!self.done).then_some(self.directory.as_path())
    }

    /// Feed the outcome for the current directory and move on
    fn record(&mut self, found: Match) {
        match found {
            Match::Stop => {
                debug!(directory = %self.directory.display(), "matcher stopped the search");
                self.done = true;
                return;
            },
            Match::Path(path) => {
                trace!(path = %path.display(), "found match");
                self.matches.push(path);
                if self.matches.len() >= self.limit {
                    self.done = true;
                    return;
                }
            },
            // `Target::apply` resolves candidates before they get here
            Match::Continue | Match::Candidates(_) => {},
        }

        if self.stop_at.as_deref() == Some(self.directory.as_path()) {
            debug!(directory = %self.directory.display(), "reached stop directory");
            self.done = true;
            return;
        }
        match self.directory.parent() {
            Some(parent) => self.directory = parent.to_path_buf(),
            None => {
                debug!(directory = %self.directory.display(), "reached filesystem root");
                self.done = true;
            },
        }
    }

    fn into_matches(self) -> Vec<PathBuf> {
        self.matches
    }
}

fn single(options: &UpOptions) -> UpOptions {
    UpOptions { limit: Some(1), ..options.clone() }
}

/// Find the nearest match in the starting directory or one of its parents
///
/// # Errors
/// Returns error if a matcher fails, an argument is invalid, or the process
/// working directory is needed and cannot be read.
pub fn find_up<'a>(
    target: impl Into<Target<'a>>,
    options: &UpOptions,
) -> Result<Option<PathBuf>> {
    Ok(find_up_multiple(target, &single(options))?.into_iter().next())
}

/// Collect matches from the starting directory upwards, nearest first
///
/// Each directory contributes at most one match, the first name in order
/// that exists there. Collection ends at `stop_at`, the filesystem root,
/// `limit` matches, or a [`Match::Stop`], whichever comes first. Without a
/// limit every match up to the end of the walk is collected.
///
/// # Errors
/// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument) if
/// `limit` is `Some(0)`. Also returns error if a matcher fails, an argument
/// is invalid, or the process working directory is needed and cannot be read.
pub fn find_up_multiple<'a>(
    target: impl Into<Target<'a>>,
    options: &UpOptions,
) -> Result<Vec<PathBuf>> {
    let target = target.into();
    target.validate()?;
    let probe = Probe::from(options);
    let mut walk = UpwardWalk::new(options)?;

    while let Some(directory) = walk.directory() {
        trace!(directory = %directory.display(), "checking directory");
        let found = target.apply(directory, probe)?;
        walk.record(found);
    }

    Ok(walk.into_matches())
}

/// Non-blocking form of [`find_up`]
///
/// # Errors
/// Same as [`find_up`].
#[cfg(feature = "async")]
pub async fn find_up_async<'a>(
    target: impl Into<AsyncTarget<'a>>,
    options: &UpOptions,
) -> Result<Option<PathBuf>> {
    Ok(find_up_multiple_async(target, &single(options)).await?.into_iter().next())
}

/// Non-blocking form of [`find_up_multiple`]
///
/// # Errors
/// Same as [`find_up_multiple`].
#[cfg(feature = "async")]
pub async fn find_up_multiple_async<'a>(
    target: impl Into<AsyncTarget<'a>>,
    options: &UpOptions,
) -> Result<Vec<PathBuf>> {
    let target = target.into();
    target.validate()?;
    let probe = Probe::from(options);
    let mut walk = UpwardWalk::new(options)?;

    while let Some(directory) = walk.directory() {
        trace!(directory = %directory.display(), "checking directory");
        let found = target.apply(directory, probe).await?;
        walk.record(found);
    }

    Ok(walk.into_matches())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::fs::{self, File};

    use tempfile::TempDir;

    use super::*;
    use crate::error::Error;
    use crate::types::PathType;

    /// `root/marker.txt`, `root/a/marker.txt`, `root/a/b/c/`
    fn fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let deep = temp_dir.path().join("a").join("b").join("c");
        fs::create_dir_all(&deep).unwrap();
        File::create(temp_dir.path().join("marker.txt")).unwrap();
        File::create(temp_dir.path().join("a").join("marker.txt")).unwrap();
        temp_dir
    }

    fn deep(temp_dir: &TempDir) -> PathBuf {
        temp_dir.path().join("a").join("b").join("c")
    }

    #[test]
    fn test_walk_visits_nearest_first() {
        let temp_dir = fixture();
        let visited = RefCell::new(Vec::new());
        let options = UpOptions::new().cwd(deep(&temp_dir)).stop_at(temp_dir.path());

        let found = find_up(
            Target::from_fn(|dir: &Path| {
                visited.borrow_mut().push(dir.to_path_buf());
                Ok(Match::Continue)
            }),
            &options,
        )
        .unwrap();

        assert_eq!(found, None);
        assert_eq!(
            visited.into_inner(),
            vec![
                deep(&temp_dir),
                temp_dir.path().join("a").join("b"),
                temp_dir.path().join("a"),
                temp_dir.path().to_path_buf(),
            ]
        );
    }

    #[test]
    fn test_finds_nearest() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir));
        assert_eq!(
            find_up("marker.txt", &options).unwrap(),
            Some(temp_dir.path().join("a").join("marker.txt"))
        );
    }

    #[test]
    fn test_closer_later_name_beats_farther_first_name() {
        let temp_dir = fixture();
        File::create(temp_dir.path().join("first.txt")).unwrap();
        let options = UpOptions::new().cwd(deep(&temp_dir));
        assert_eq!(
            find_up(["first.txt", "marker.txt"], &options).unwrap(),
            Some(temp_dir.path().join("a").join("marker.txt"))
        );
    }

    #[test]
    fn test_multiple_is_nearest_first_and_limited() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir)).stop_at(temp_dir.path());
        assert_eq!(
            find_up_multiple("marker.txt", &options).unwrap(),
            vec![temp_dir.path().join("a").join("marker.txt"), temp_dir.path().join("marker.txt")]
        );

        let limited = options.limit(1);
        assert_eq!(
            find_up_multiple("marker.txt", &limited).unwrap(),
            vec![temp_dir.path().join("a").join("marker.txt")]
        );
    }

    #[test]
    fn test_stop_at_bounds_the_walk() {
        let temp_dir = fixture();
        let options =
            UpOptions::new().cwd(deep(&temp_dir)).stop_at(temp_dir.path().join("a").join("b"));
        assert_eq!(find_up("marker.txt", &options).unwrap(), None);
    }

    #[test]
    fn test_match_at_stop_directory_counts() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir)).stop_at(temp_dir.path().join("a"));
        assert_eq!(
            find_up_multiple("marker.txt", &options).unwrap(),
            vec![temp_dir.path().join("a").join("marker.txt")]
        );
    }

    #[test]
    fn test_relative_stop_at_resolves_against_cwd() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir)).stop_at("../..");
        assert_eq!(
            find_up_multiple("marker.txt", &options).unwrap(),
            vec![temp_dir.path().join("a").join("marker.txt")]
        );
    }

    #[test]
    fn test_stop_sentinel_halts_immediately() {
        let temp_dir = fixture();
        let calls = RefCell::new(0);
        let options = UpOptions::new().cwd(deep(&temp_dir));

        let found = find_up(
            Target::from_fn(|_: &Path| {
                *calls.borrow_mut() += 1;
                Ok(Match::Stop)
            }),
            &options,
        )
        .unwrap();

        assert_eq!(found, None);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn test_stop_keeps_collected_matches() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(temp_dir.path().join("a"));
        let stop_dir = temp_dir.path().to_path_buf();

        let found = find_up_multiple(
            Target::from_fn(|dir: &Path| {
                if dir == stop_dir {
                    Ok(Match::Stop)
                } else {
                    Ok(Match::path("marker.txt"))
                }
            }),
            &options,
        )
        .unwrap();

        assert_eq!(found, vec![temp_dir.path().join("a").join("marker.txt")]);
    }

    #[test]
    fn test_directory_type() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir)).path_type(PathType::Directory);
        assert_eq!(find_up("marker.txt", &options).unwrap(), None);
        assert_eq!(find_up("b", &options).unwrap(), Some(temp_dir.path().join("a").join("b")));
    }

    #[test]
    fn test_matcher_error_aborts() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir));
        let result = find_up(Target::from_fn(|_: &Path| Err("broken".into())), &options);
        assert!(matches!(result, Err(Error::Matcher(_))));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(temp_dir.path()).limit(0);
        assert!(matches!(find_up_multiple("marker.txt", &options), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_walk_ends_at_root() {
        let mut walk = UpwardWalk::new(&UpOptions::new().cwd("/")).unwrap();
        assert_eq!(walk.directory(), Some(Path::new("/")));
        walk.record(Match::Continue);
        assert_eq!(walk.directory(), None);
    }

    #[test]
    fn test_glob_passes_over_directories_named_like_files() {
        let temp_dir = fixture();
        fs::create_dir(temp_dir.path().join("a").join("a.json")).unwrap();
        File::create(temp_dir.path().join("a").join("package.json")).unwrap();
        let options = UpOptions::new().cwd(deep(&temp_dir));
        let target = Target::matcher(crate::matcher::glob("*.json").unwrap());
        assert_eq!(
            find_up(target, &options).unwrap(),
            Some(temp_dir.path().join("a").join("package.json"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_skipped_when_disallowed() {
        let temp_dir = fixture();
        std::os::unix::fs::symlink(
            temp_dir.path().join("marker.txt"),
            temp_dir.path().join("a").join("b").join("marker.txt"),
        )
        .unwrap();

        let options = UpOptions::new().cwd(deep(&temp_dir));
        assert_eq!(
            find_up("marker.txt", &options).unwrap(),
            Some(temp_dir.path().join("a").join("b").join("marker.txt"))
        );

        let strict = options.allow_symlinks(false);
        assert_eq!(
            find_up("marker.txt", &strict).unwrap(),
            Some(temp_dir.path().join("a").join("marker.txt"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_both_accepts_any_entry() {
        use std::os::unix::net::UnixListener;

        let temp_dir = fixture();
        let socket = temp_dir.path().join("a").join("b").join("daemon.sock");
        let _listener = UnixListener::bind(&socket).unwrap();

        let options = UpOptions::new().cwd(deep(&temp_dir));
        assert_eq!(find_up("daemon.sock", &options).unwrap(), None);
        let both = options.path_type(PathType::Both);
        assert_eq!(find_up("daemon.sock", &both).unwrap(), Some(socket));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_matches_blocking() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir)).stop_at(temp_dir.path());
        assert_eq!(
            find_up_multiple_async("marker.txt", &options).await.unwrap(),
            find_up_multiple("marker.txt", &options).unwrap()
        );
        assert_eq!(
            find_up_async(["nope", "marker.txt"], &options).await.unwrap(),
            Some(temp_dir.path().join("a").join("marker.txt"))
        );
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_stop_sentinel() {
        let temp_dir = fixture();
        let options = UpOptions::new().cwd(deep(&temp_dir));
        let stop =
            AsyncTarget::from_fn(|_dir: PathBuf| async { Ok::<_, crate::BoxError>(Match::Stop) });
        let found = find_up_async(stop, &options).await.unwrap();
        assert_eq!(found, None);
    }
}
