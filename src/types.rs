//! Common types and constants for `findup`

use std::fs::Metadata;
use std::str::FromStr;

use crate::error::Error;

/// Default number of levels a downward search descends below its start
pub const DEFAULT_DEPTH: usize = 1;

/// Kind of filesystem entry a search accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathType {
    /// Regular files only
    #[default]
    File,
    /// Directories only
    Directory,
    /// Any existing entry
    Both,
}

impl PathType {
    /// Returns true if `metadata` describes an acceptable entry
    ///
    /// `Both` accepts anything that exists, including sockets, FIFOs and
    /// device nodes. With metadata taken without following symlinks, a
    /// symlink is neither file nor directory, so only `Both` accepts it.
    #[must_use]
    pub fn accepts(self, metadata: &Metadata) -> bool {
        let file_type = metadata.file_type();
        match self {
            Self::File => file_type.is_file(),
            Self::Directory => file_type.is_dir(),
            Self::Both => true,
        }
    }
}

impl FromStr for PathType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "directory" => Ok(Self::Directory),
            "both" => Ok(Self::Both),
            other => Err(Error::invalid_argument(&format!(
                "Invalid type `{other}`, expected `file`, `directory` or `both`"
            ))),
        }
    }
}

/// Traversal order of a downward search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Shallowest directories first
    #[default]
    Breadth,
    /// Each subtree fully before its next sibling
    Depth,
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breadth" => Ok(Self::Breadth),
            "depth" => Ok(Self::Depth),
            other => Err(Error::invalid_argument(&format!(
                "Invalid strategy `{other}`, expected `breadth` or `depth`"
            ))),
        }
    }
}

const _: () = {
    assert!(DEFAULT_DEPTH > 0);
};
