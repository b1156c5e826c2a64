#![forbid(unsafe_code)]

//! vlist public facade crate.
//!
//! Re-exports the types a host needs to drive a virtualized collection and
//! offers a prelude for day-to-day usage.
//!
//! ```
//! use vlist::prelude::*;
//!
//! let mut photos = VirtualCollection::<u32>::new(
//!     CollectionConfig::default().with_layout(LayoutConfig::full_width_row(Some(40.0))),
//!     (0..1_000).collect::<Vec<u32>>(),
//! );
//! photos.set_viewport(Viewport::new(320.0, 400.0));
//! assert_eq!(photos.visible_window().visible(), 0..10);
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use vlist_core::{CollectionItem, ItemKey, KeyHasher, PositionedItem, Size, SizeHint};

// --- Layout re-exports -----------------------------------------------------

pub use vlist_layout::{
    FixedGrid, FullWidthRow, Layout, LayoutConfig, LayoutKind, LayoutNotice, LayoutStrategy,
    MixedGrid, ShelfPacker,
};

// --- Engine re-exports -----------------------------------------------------

pub use vlist_engine::{
    Batch, BatchResolver, Cell, CellWindow, CollectionConfig, CollectionError, ItemSource,
    LoadState, MoreItemsRequest, Notification, PaginationMeta, PendingBatch, SourceError,
    SourceReply, Viewport, VirtualCollection, VisibleWindow, pending_batch,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for vlist hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A collection operation failed.
    Collection(CollectionError),
    /// An item source failed to settle.
    Source(SourceError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection(err) => write!(f, "{err}"),
            Self::Source(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            Self::Source(err) => Some(err),
        }
    }
}

impl From<CollectionError> for Error {
    fn from(err: CollectionError) -> Self {
        Self::Collection(err)
    }
}

impl From<SourceError> for Error {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

/// Standard result type for vlist APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Batch, CollectionConfig, CollectionItem, Error, ItemKey, ItemSource, LayoutConfig,
        LoadState, MoreItemsRequest, Notification, PaginationMeta, Result, SizeHint, Viewport,
        VirtualCollection, pending_batch,
    };

    pub use crate::{core, engine, layout};
}

pub use vlist_core as core;
pub use vlist_engine as engine;
pub use vlist_layout as layout;
