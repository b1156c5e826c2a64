#![forbid(unsafe_code)]

//! Layout strategies for virtualized collections.
//!
//! A layout answers four questions for the engine: how big is the content,
//! which index is first visible at a scroll offset, how many items are
//! visible from there, and where does item `i` go.
//!
//! Three strategies exist, behind the [`LayoutStrategy`] trait and the
//! [`Layout`] enum:
//!
//! - [`FixedGrid`] - uniform cells, closed-form arithmetic, pixel units
//! - [`FullWidthRow`] - one item per row, shelf-packed
//! - [`MixedGrid`] - items with their own sizes, shelf-packed
//!
//! The packed layouts report `x` and `width` as a percentage of the
//! container ([`SHELF_WIDTH`] units) and `y`/`height` in pixels.

pub mod fixed_grid;
pub mod full_width_row;
pub mod layout;
pub mod mixed_grid;
pub mod shelf;

pub use fixed_grid::FixedGrid;
pub use full_width_row::FullWidthRow;
pub use layout::{Layout, LayoutConfig, LayoutKind, LayoutNotice, LayoutSelection};
pub use mixed_grid::MixedGrid;
pub use shelf::ShelfPacker;

use vlist_core::{PositionedItem, Size, SizeHint};

/// Shelf width of the packed layouts: 100 percent of the container.
pub const SHELF_WIDTH: f64 = 100.0;

/// Row height used when neither the configuration nor the item provides one.
pub const DEFAULT_ROW_HEIGHT: f64 = 160.0;

/// Geometry queries shared by every layout.
///
/// `length` is the number of items the layout answers for. It is normally
/// kept in step by [`append`](Self::append) and [`remove`](Self::remove), but
/// can be overridden with [`set_length`](Self::set_length); queries never
/// report indices at or past it.
pub trait LayoutStrategy {
    /// Number of items the layout answers for.
    fn length(&self) -> usize;

    /// Override the item count.
    fn set_length(&mut self, length: usize);

    /// Total scrollable content size for a container of the given client size.
    fn content_size(&self, client_width: f64, client_height: f64) -> Size;

    /// First visible index at the given scroll offset.
    fn index_at(
        &self,
        scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        client_height: f64,
    ) -> usize;

    /// Number of items visible from [`index_at`](Self::index_at) onward.
    fn count(
        &self,
        scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        client_height: f64,
    ) -> usize;

    /// Position and size of item `index`, or `None` past the end.
    fn position_of(
        &self,
        index: usize,
        client_width: f64,
        client_height: f64,
    ) -> Option<PositionedItem>;

    /// Lay out newly loaded items after the existing ones.
    ///
    /// Positions of items already laid out never change.
    fn append(&mut self, hints: &[SizeHint]);

    /// Drop item `index`; items after it move up. Returns `false` if out of range.
    fn remove(&mut self, index: usize) -> bool;
}
