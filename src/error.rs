use std::io;

/// Result type used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while constructing units or moving chunks through a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested block size is outside `MIN_BLOCK_SIZE..=MAX_BLOCK_SIZE`.
    #[error("invalid block size {0}: must be between {min} and {max}", min = crate::blocks::MIN_BLOCK_SIZE, max = crate::blocks::MAX_BLOCK_SIZE)]
    InvalidBlockSize(usize),

    /// A deferred argument referenced a meta variable the chunk does not carry.
    #[error("unit {unit} requested missing meta variable {key:?}")]
    MissingMetaVariable { key: String, unit: String },

    /// `reverse` was called on a unit without an inverse.
    #[error("unit {0} is not invertible")]
    NotInvertible(String),

    /// The oracle was asked for a field it does not know.
    #[error("unknown oracle field {0:?}")]
    UnknownField(String),

    /// A meta key lookup without default failed.
    #[error("meta key {0:?} not found")]
    KeyNotFound(String),

    /// The same argument name was supplied twice.
    #[error("duplicate argument {0:?}")]
    DuplicateArgument(String),

    /// A unit factory left an argument unconsumed.
    #[error("unit {unit} does not accept argument {name:?}")]
    UnknownArgument { name: String, unit: String },

    /// An argument was present but had the wrong shape or value.
    #[error("invalid argument {name:?}: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// No factory is registered under this name.
    #[error("no unit registered under the name {0:?}")]
    UnknownUnit(String),

    /// A unit failed while transforming a chunk.
    #[error("unit {unit} failed: {message}")]
    Unit { unit: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn invalid_argument(name: &str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unit(unit: &str, message: impl Into<String>) -> Self {
        Error::Unit {
            unit: unit.to_owned(),
            message: message.into(),
        }
    }
}
