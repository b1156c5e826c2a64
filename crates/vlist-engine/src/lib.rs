#![forbid(unsafe_code)]

//! Virtualization engine for large scrollable collections.
//!
//! Given an ordered item collection, a layout and a viewport, the engine
//! decides which items need a render cell, recycles cells by item key as the
//! viewport moves, and asks the host for more items as the end approaches.
//!
//! ```
//! use vlist_engine::{CollectionConfig, Viewport, VirtualCollection};
//! use vlist_layout::LayoutConfig;
//!
//! let config = CollectionConfig::default()
//!     .with_layout(LayoutConfig::fixed_grid(100.0, 50.0));
//! let mut collection = VirtualCollection::<u32>::new(config, (0..10).collect::<Vec<u32>>());
//! collection.set_viewport(Viewport::new(320.0, 100.0));
//! assert_eq!(collection.visible_window().visible_count, 6);
//! ```

pub mod cells;
pub mod collection;
pub mod config;
pub mod error;
pub mod infinite_scroll;
pub mod outbox;
pub mod pagination;
pub mod source;
pub mod viewport;

pub use cells::{Cell, CellWindow};
pub use collection::{Trigger, VirtualCollection};
pub use config::{CollectionConfig, DEFAULT_BUFFER, DEFAULT_INFINITE_SCROLL_BUFFER};
pub use error::{CollectionError, SourceError};
pub use infinite_scroll::{InfiniteScrollController, ScrollDecision, ScrollState};
pub use outbox::{Notification, Outbox};
pub use pagination::{
    CollectionChange, LoadState, PaginationEvent, PaginationMeta, PaginationState,
};
pub use source::{
    Batch, BatchResolver, ItemSource, MoreItemsRequest, PendingBatch, SourceReply, pending_batch,
};
pub use viewport::{Viewport, ViewportReport, ViewportTracker, VisibleWindow};
