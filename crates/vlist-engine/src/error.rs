#![forbid(unsafe_code)]

//! Error types for the collection engine.

use std::fmt;

/// Why an asynchronous item source failed to settle with a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The host rejected the load.
    Rejected(String),
    /// The resolver was dropped without settling.
    Dropped,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "item source rejected: {reason}"),
            Self::Dropped => write!(f, "item source dropped before settling"),
        }
    }
}

impl std::error::Error for SourceError {}

/// Errors returned by [`VirtualCollection`](crate::VirtualCollection) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// An index addressed an item past the end of the collection.
    IndexOutOfRange { index: usize, len: usize },
    /// More items were requested but no handler is registered.
    NoMoreItemsHandler,
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for collection of {len} items")
            }
            Self::NoMoreItemsHandler => write!(f, "no more-items handler registered"),
        }
    }
}

impl std::error::Error for CollectionError {}
