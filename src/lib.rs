//! `findup` - Find files or directories by walking up parent directories or
//! down into children.
//!
//! Upward search checks the starting directory and then each parent until a
//! match, the stop directory or the filesystem root. Downward search checks
//! the starting directory and its subdirectories up to a depth, breadth-first
//! or depth-first. Both take either a list of names, tried in order in every
//! directory, or a matcher deciding per directory.
//!
//! Every search has a blocking form and, with the `async` feature, a tokio
//! form with the same results.

#![deny(
    warnings,
    missing_debug_implementations,
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]

pub mod down;
pub mod error;
pub mod locate;
pub mod matcher;
pub mod options;
pub mod types;
pub mod up;

pub use down::find_down;
#[cfg(feature = "async")]
pub use down::find_down_async;
pub use error::{BoxError, Error, Result};
pub use locate::{exists, is_directory, is_file};
#[cfg(feature = "async")]
pub use matcher::{AsyncMatcher, AsyncTarget};
pub use matcher::{Glob, Match, Matcher, Target, glob};
pub use options::{DownOptions, UpOptions};
pub use types::{PathType, Strategy};
pub use up::{find_up, find_up_multiple};
#[cfg(feature = "async")]
pub use up::{find_up_async, find_up_multiple_async};
