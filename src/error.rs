//! Error types for `findup`

use arrayvec::ArrayString;
use thiserror::Error;

/// Maximum length of error messages
pub const MAX_ERROR_LENGTH: usize = 256;

/// Custom result type for `findup` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by a user-supplied matcher
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for `findup`
///
/// A search that simply finds nothing is not an error. Filesystem failures
/// hit while probing candidates or listing directories are swallowed by the
/// traversal and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument was rejected before touching the filesystem
    #[error("Error: {0}")]
    InvalidArgument(Box<ArrayString<MAX_ERROR_LENGTH>>),

    /// A matcher callback failed; the search was aborted
    #[error("Error: Matcher failed: {0}")]
    Matcher(#[source] BoxError),

    /// The working directory could not be determined
    #[error("Error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new invalid argument error
    ///
    /// Messages longer than `MAX_ERROR_LENGTH` bytes are cut at the last
    /// character that fits.
    #[must_use]
    pub fn invalid_argument(msg: &str) -> Self {
        let mut buf = ArrayString::new();
        for c in msg.chars() {
            if buf.try_push(c).is_err() {
                break;
            }
        }
        Self::InvalidArgument(Box::new(buf))
    }

    /// Wrap a matcher failure
    #[must_use]
    pub fn matcher(err: impl Into<BoxError>) -> Self {
        Self::Matcher(err.into())
    }

    /// Get a user-friendly error message with action items
    #[must_use]
    pub fn user_message(&self) -> ArrayString<MAX_ERROR_LENGTH> {
        let mut msg = ArrayString::new();
        match self {
            Self::InvalidArgument(arg_msg) => {
                let _ = msg.try_push_str("Error: ");
                let _ = msg.try_push_str(arg_msg);
                let _ = msg.try_push_str("\nTip: Run with --help to see accepted values");
            },
            Self::Matcher(e) => {
                let _ = msg.try_push_str(&format!("Error: Matcher failed: {e}"));
            },
            Self::Io(e) => {
                let _ = msg.try_push_str(&format!(
                    "Error: {e}\nTip: Check that the working directory exists and try again"
                ));
            },
        }
        msg
    }
}
