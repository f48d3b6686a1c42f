use std::io;

/// Errors that can occur while rendering a diff.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A serialized patch contained a line that is neither a header, context,
    /// an insertion nor a deletion.
    #[error("malformed patch line starting with {prefix:?}: {line:?}")]
    MalformedPatch { prefix: char, line: String },
    /// Writing to the output failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
