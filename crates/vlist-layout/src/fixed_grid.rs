#![forbid(unsafe_code)]

//! Uniform grid of fixed-size cells, in pixels.
//!
//! Every query is closed-form, so growth never touches existing positions.

use vlist_core::{PositionedItem, Size, SizeHint};

use crate::LayoutStrategy;

/// Grid where every item is `item_width` x `item_height` pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedGrid {
    item_width: f64,
    item_height: f64,
    length: usize,
}

impl FixedGrid {
    /// Create an empty grid.
    #[must_use]
    pub fn new(item_width: f64, item_height: f64) -> Self {
        Self {
            item_width,
            item_height,
            length: 0,
        }
    }

    /// Set the initial item count.
    #[must_use]
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    #[inline]
    pub fn item_width(&self) -> f64 {
        self.item_width
    }

    #[inline]
    pub fn item_height(&self) -> f64 {
        self.item_height
    }

    /// Columns that fit in `client_width`, never fewer than one.
    pub fn columns(&self, client_width: f64) -> usize {
        if self.item_width <= 0.0 {
            return 1;
        }
        ((client_width / self.item_width).floor() as usize).max(1)
    }

    fn rows(&self, columns: usize) -> usize {
        self.length.div_ceil(columns)
    }
}

impl LayoutStrategy for FixedGrid {
    fn length(&self) -> usize {
        self.length
    }

    fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    fn content_size(&self, client_width: f64, _client_height: f64) -> Size {
        let columns = self.columns(client_width);
        Size::new(client_width, self.rows(columns) as f64 * self.item_height)
    }

    fn index_at(
        &self,
        _scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        _client_height: f64,
    ) -> usize {
        if self.item_height <= 0.0 {
            return 0;
        }
        let row = (scroll_top.max(0.0) / self.item_height).floor() as usize;
        row.saturating_mul(self.columns(client_width))
            .min(self.length)
    }

    fn count(
        &self,
        scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        client_height: f64,
    ) -> usize {
        let first = self.index_at(scroll_left, scroll_top, client_width, client_height);
        let remaining = self.length - first;
        if self.item_height <= 0.0 {
            return remaining;
        }
        if client_height <= 0.0 {
            return 0;
        }
        // A viewport starting mid-row needs one more row to reach its bottom.
        let row_offset = scroll_top.max(0.0) % self.item_height;
        let rows = ((row_offset + client_height) / self.item_height).ceil() as usize;
        rows.saturating_mul(self.columns(client_width))
            .min(remaining)
    }

    fn position_of(
        &self,
        index: usize,
        client_width: f64,
        _client_height: f64,
    ) -> Option<PositionedItem> {
        if index >= self.length {
            return None;
        }
        let columns = self.columns(client_width);
        let row = index / columns;
        let col = index % columns;
        Some(PositionedItem::new(
            col as f64 * self.item_width,
            row as f64 * self.item_height,
            self.item_width,
            self.item_height,
        ))
    }

    fn append(&mut self, hints: &[SizeHint]) {
        self.length += hints.len();
    }

    fn remove(&mut self, index: usize) -> bool {
        if index >= self.length {
            return false;
        }
        self.length -= 1;
        true
    }
}
