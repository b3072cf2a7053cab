//! Error types for ssh configuration reading
// (c) 2024 Ross Younger

use std::path::PathBuf;

/// Problems encountered while reading an ssh configuration tree.
///
/// Only [`Error::ResourceNotFound`] on the root file is fatal; the others are
/// recorded by the [`Reader`](super::Reader) and reading carries on without
/// the offending include target.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root configuration file does not exist or cannot be read
    #[error("ssh configuration {} could not be read", .path.display())]
    ResourceNotFound {
        /// The path we were asked to read
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// An include target exists but could not be canonicalized or opened
    #[error("include target {} could not be resolved", .path.display())]
    IncludePathUnresolvable {
        /// The include target
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: std::io::Error,
    },

    /// An include would re-open a file already being read, or nests too deeply
    #[error("include of {} abandoned at depth {depth}: cycle or nesting too deep", .path.display())]
    IncludeCycleExceeded {
        /// The include target that was skipped
        path: PathBuf,
        /// Include depth at which expansion stopped
        depth: usize,
    },

    /// An Include line could not be interpreted (bad quoting, unset variable, bad pattern)
    #[error("bad Include directive at {} line {line}: {reason}", .source_file.display())]
    BadInclude {
        /// File containing the directive
        source_file: PathBuf,
        /// Line number of the directive
        line: usize,
        /// What went wrong
        reason: String,
    },
}

/// Convenience alias
pub type Result<T, E = Error> = std::result::Result<T, E>;
