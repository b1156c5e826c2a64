#![forbid(unsafe_code)]

//! Grid of individually sized items.
//!
//! Each item declares its width as a percentage of the container and its
//! height in pixels; items are shelf-packed in order.

use vlist_core::{PositionedItem, Size, SizeHint};

use crate::shelf::ShelfPacker;
use crate::{DEFAULT_ROW_HEIGHT, LayoutStrategy, SHELF_WIDTH};

/// Shelf-packed grid of items with their own dimensions.
#[derive(Debug, Clone)]
pub struct MixedGrid {
    packer: ShelfPacker,
    length: usize,
}

impl MixedGrid {
    /// Pack `hints` in order.
    #[must_use]
    pub fn new(hints: &[SizeHint]) -> Self {
        let mut layout = Self {
            packer: ShelfPacker::new(SHELF_WIDTH),
            length: 0,
        };
        layout.append(hints);
        layout
    }

    /// Underlying packing.
    #[inline]
    pub fn packer(&self) -> &ShelfPacker {
        &self.packer
    }

    /// Rectangle for one item. A missing width spans the whole shelf.
    fn rect_for(hint: &SizeHint) -> Size {
        Size::new(
            hint.width.unwrap_or(SHELF_WIDTH),
            hint.height.unwrap_or(DEFAULT_ROW_HEIGHT),
        )
    }

    fn laid_out(&self) -> usize {
        self.length.min(self.packer.len())
    }
}

impl LayoutStrategy for MixedGrid {
    fn length(&self) -> usize {
        self.length
    }

    fn set_length(&mut self, length: usize) {
        self.length = length;
    }

    fn content_size(&self, client_width: f64, _client_height: f64) -> Size {
        Size::new(
            client_width,
            self.packer.content_height_through(self.laid_out()),
        )
    }

    fn index_at(
        &self,
        _scroll_left: f64,
        scroll_top: f64,
        _client_width: f64,
        _client_height: f64,
    ) -> usize {
        self.packer
            .first_visible_index(scroll_top)
            .min(self.laid_out())
    }

    fn count(
        &self,
        scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        client_height: f64,
    ) -> usize {
        let first = self.index_at(scroll_left, scroll_top, client_width, client_height);
        self.packer
            .visible_count(scroll_top, client_height)
            .min(self.laid_out() - first)
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
        let rects: Vec<Size> = hints.iter().map(Self::rect_for).collect();
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

#[cfg(test)]
mod tests {
    use super::*;

    fn three_items() -> MixedGrid {
        MixedGrid::new(&[
            SizeHint::new(50.0, 40.0),
            SizeHint::new(60.0, 30.0),
            SizeHint::new(100.0, 20.0),
        ])
    }

    #[test]
    fn overflowing_item_starts_new_shelf() {
        let grid = three_items();
        assert_eq!(grid.position_of(0, 0.0, 0.0), Some(PositionedItem::new(0.0, 0.0, 50.0, 40.0)));
        assert_eq!(grid.position_of(1, 0.0, 0.0), Some(PositionedItem::new(0.0, 40.0, 60.0, 30.0)));
        assert_eq!(
            grid.position_of(2, 0.0, 0.0),
            Some(PositionedItem::new(0.0, 70.0, 100.0, 20.0))
        );
        assert_eq!(grid.content_size(800.0, 600.0), Size::new(800.0, 90.0));
    }

    #[test]
    fn side_by_side_items_share_visibility() {
        let grid = MixedGrid::new(&[
            SizeHint::new(50.0, 40.0),
            SizeHint::new(50.0, 10.0),
            SizeHint::new(50.0, 40.0),
        ]);
        // The first shelf holds two items and is 40px tall.
        assert_eq!(grid.index_at(0.0, 20.0, 0.0, 10.0), 0);
        assert_eq!(grid.count(0.0, 20.0, 0.0, 10.0), 2);
        assert_eq!(grid.index_at(0.0, 40.0, 0.0, 10.0), 2);
        assert_eq!(grid.count(0.0, 40.0, 0.0, 10.0), 1);
    }

    #[test]
    fn missing_hints_fall_back_to_full_row() {
        let grid = MixedGrid::new(&[SizeHint::NONE, SizeHint::height(20.0)]);
        assert_eq!(
            grid.position_of(0, 0.0, 0.0),
            Some(PositionedItem::new(0.0, 0.0, SHELF_WIDTH, DEFAULT_ROW_HEIGHT))
        );
        assert_eq!(grid.position_of(1, 0.0, 0.0).map(|p| p.y), Some(DEFAULT_ROW_HEIGHT));
    }

    #[test]
    fn append_keeps_existing_positions() {
        let mut grid = three_items();
        let before: Vec<_> = grid.packer().positions().to_vec();
        grid.append(&[SizeHint::new(30.0, 5.0)]);
        assert_eq!(&grid.packer().positions()[..3], before.as_slice());
        // The open shelf (item 2, full width) cannot take it.
        assert_eq!(grid.position_of(3, 0.0, 0.0), Some(PositionedItem::new(0.0, 90.0, 30.0, 5.0)));
        assert_eq!(grid.length(), 4);
    }

    #[test]
    fn count_past_end_is_zero() {
        let grid = three_items();
        assert_eq!(grid.index_at(0.0, 1000.0, 0.0, 100.0), 3);
        assert_eq!(grid.count(0.0, 1000.0, 0.0, 100.0), 0);
    }
}
