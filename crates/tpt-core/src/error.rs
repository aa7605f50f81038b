//! Error type shared by list loading, normalization and queries.

use crate::types::ListKind;

/// Errors raised while building a [`DisconnectParser`](crate::DisconnectParser)
/// or answering a category query.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Zero or several source forms were given for one list.
    #[error("invalid {list} source: {reason}")]
    SourceConflict { list: ListKind, reason: String },

    /// The list location could not be read or decoded.
    #[error("unable to load {list} from {location}: {reason}")]
    SourceLoad {
        list: ListKind,
        location: String,
        reason: String,
    },

    /// The list contents do not match the expected format.
    #[error("list format error: {0}")]
    ListFormat(String),

    /// The catch-all category and the remap table are out of sync.
    #[error("remap table out of sync with blocklist: {0}")]
    RemapConsistency(String),

    /// A query named a category absent from the blocklist.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// The public suffix list could not be parsed.
    #[error("invalid public suffix list: {0}")]
    PublicSuffix(String),

    /// A configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
