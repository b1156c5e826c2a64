#![forbid(unsafe_code)]

//! Single-column list of full-width rows.
//!
//! Rows are packed as 100%-wide rectangles, so each one closes the previous
//! shelf. With a forced row height every row is identical and visibility is
//! answered by division instead of a shelf search.

use vlist_core::{PositionedItem, Size, SizeHint};

use crate::shelf::ShelfPacker;
use crate::{LayoutStrategy, SHELF_WIDTH};

/// One item per row, each spanning the full container width.
#[derive(Debug, Clone)]
pub struct FullWidthRow {
    packer: ShelfPacker,
    row_height: f64,
    force_height: bool,
    length: usize,
}

impl FullWidthRow {
    /// Lay out `hints` as rows.
    ///
    /// With `force_height` every row is `row_height` tall; otherwise each row
    /// takes its item's height hint and falls back to `row_height`.
    #[must_use]
    pub fn new(hints: &[SizeHint], row_height: f64, force_height: bool) -> Self {
        let mut layout = Self {
            packer: ShelfPacker::new(SHELF_WIDTH),
            row_height,
            force_height,
            length: 0,
        };
        layout.append(hints);
        layout
    }

    #[inline]
    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    #[inline]
    pub fn is_force_height(&self) -> bool {
        self.force_height
    }

    /// Underlying packing.
    #[inline]
    pub fn packer(&self) -> &ShelfPacker {
        &self.packer
    }

    fn uniform(&self) -> bool {
        self.force_height && self.row_height > 0.0
    }

    fn rect_for(&self, hint: &SizeHint) -> Size {
        let height = if self.force_height {
            self.row_height
        } else {
            hint.height.unwrap_or(self.row_height)
        };
        Size::new(SHELF_WIDTH, height)
    }

    fn laid_out(&self) -> usize {
        self.length.min(self.packer.len())
    }
}

impl LayoutStrategy for FullWidthRow {
    fn length(&self) -> usize {
        self.length
    }

    fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    fn content_size(&self, client_width: f64, _client_height: f64) -> Size {
        let height = if self.uniform() {
            self.laid_out() as f64 * self.row_height
        } else {
            self.packer.content_height_through(self.laid_out())
        };
        Size::new(client_width, height)
    }

    fn index_at(
        &self,
        _scroll_left: f64,
        scroll_top: f64,
        _client_width: f64,
        _client_height: f64,
    ) -> usize {
        let first = if self.uniform() {
            (scroll_top.max(0.0) / self.row_height).floor() as usize
        } else {
            self.packer.first_visible_index(scroll_top)
        };
        first.min(self.laid_out())
    }

    fn count(
        &self,
        scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        client_height: f64,
    ) -> usize {
        let first = self.index_at(scroll_left, scroll_top, client_width, client_height);
        let remaining = self.laid_out() - first;
        if client_height <= 0.0 {
            return 0;
        }
        let visible = if self.uniform() {
            let row_offset = scroll_top.max(0.0) % self.row_height;
            ((row_offset + client_height) / self.row_height).ceil() as usize
        } else {
            self.packer.visible_count(scroll_top, client_height)
        };
        visible.min(remaining)
    }

    fn position_of(
        &self,
        index: usize,
        _client_width: f64,
        _client_height: f64,
    ) -> Option<PositionedItem> {
        if index >= self.length {
            return None;
        }
        self.packer.position(index)
    }

    fn append(&mut self, hints: &[SizeHint]) {
        let rects: Vec<Size> = hints.iter().map(|hint| self.rect_for(hint)).collect();
        self.packer.append(&rects);
        self.length += hints.len();
    }

    fn remove(&mut self, index: usize) -> bool {
        if self.packer.remove(index).is_none() {
            return false;
        }
        self.length = self.length.saturating_sub(1);
        true
    }
}
