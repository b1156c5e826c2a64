#![forbid(unsafe_code)]

//! Greedy shelf-first bin packer.
//!
//! Rectangles are placed left to right on the current shelf until the next
//! one would overflow the shelf width; the shelf is then closed and a new one
//! opens below it, as tall as its tallest rectangle.
//!
//! # Invariants
//!
//! 1. Input order is preserved: rectangle `i` is never placed after `i + 1`.
//! 2. Closed shelves are never revisited by [`ShelfPacker::append`].
//! 3. Packing `a` then appending `b` yields the same positions as packing
//!    `a ++ b` in one call.
//! 4. Shelf `y` offsets are non-decreasing, so visibility queries can binary
//!    search shelf boundaries.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Rectangle wider than the shelf | Placed alone on its own shelf at its declared width |
//! | Zero-height shelf | Never reported as visible |
//! | Removal | Repacks from the shelf before the removed rectangle onward |

use vlist_core::{PositionedItem, Size};

/// One row of the packing.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Shelf {
    /// Index of the first rectangle on this shelf.
    first: usize,
    /// Top of the shelf.
    y: f64,
    /// Height of the tallest rectangle on the shelf so far.
    height: f64,
}

impl Shelf {
    #[inline]
    fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Packs rectangles into shelves of a fixed total width.
#[derive(Debug, Clone)]
pub struct ShelfPacker {
    shelf_width: f64,
    /// Input rectangles, kept so removals can repack.
    rects: Vec<Size>,
    placed: Vec<PositionedItem>,
    shelves: Vec<Shelf>,
    /// Accumulated width of the open (last) shelf.
    cursor_x: f64,
}

impl ShelfPacker {
    /// Create an empty packer.
    #[must_use]
    pub fn new(shelf_width: f64) -> Self {
        Self {
            shelf_width,
            rects: Vec::new(),
            placed: Vec::new(),
            shelves: Vec::new(),
            cursor_x: 0.0,
        }
    }

    /// Pack `rects` in order into shelves of `shelf_width`.
    #[must_use]
    pub fn pack(rects: &[Size], shelf_width: f64) -> Self {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("vlist.pack", count = rects.len()).entered();

        let mut packer = Self::new(shelf_width);
        packer.place_all(rects);
        packer
    }

    /// Extend the packing without moving anything already placed.
    pub fn append(&mut self, rects: &[Size]) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "vlist.pack_append",
            count = rects.len(),
            placed = self.placed.len()
        )
        .entered();

        self.place_all(rects);
    }

    fn place_all(&mut self, rects: &[Size]) {
        self.rects.reserve(rects.len());
        self.placed.reserve(rects.len());
        for rect in rects {
            self.rects.push(*rect);
            self.place(*rect);
        }
    }

    fn place(&mut self, rect: Size) {
        let index = self.placed.len();
        if self.shelves.is_empty() || self.cursor_x + rect.width > self.shelf_width {
            let y = self.shelves.last().map_or(0.0, Shelf::bottom);
            self.shelves.push(Shelf {
                first: index,
                y,
                height: 0.0,
            });
            self.cursor_x = 0.0;
        }

        if let Some(shelf) = self.shelves.last_mut() {
            self.placed.push(PositionedItem::new(
                self.cursor_x,
                shelf.y,
                rect.width,
                rect.height,
            ));
            shelf.height = shelf.height.max(rect.height);
            self.cursor_x += rect.width;
        }
    }

    /// Remove the rectangle at `index` and repack everything after it.
    ///
    /// Returns the removed rectangle, or `None` if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Option<Size> {
        if index >= self.rects.len() {
            return None;
        }
        let removed = self.rects.remove(index);

        // Restart at the shelf before the one holding `index`: the first
        // rectangle after the removal may now fit there.
        let shelf_idx = self.shelf_of(index);
        let restart_shelf = shelf_idx.saturating_sub(1);
        let restart = self.shelves.get(restart_shelf).map_or(0, |s| s.first);

        self.shelves.truncate(restart_shelf);
        self.placed.truncate(restart);
        self.cursor_x = self.placed.last().map_or(0.0, PositionedItem::right);

        for i in restart..self.rects.len() {
            let rect = self.rects[i];
            self.place(rect);
        }
        Some(removed)
    }

    /// Drop every rectangle.
    pub fn clear(&mut self) {
        self.rects.clear();
        self.placed.clear();
        self.shelves.clear();
        self.cursor_x = 0.0;
    }

    /// Total width of a shelf.
    #[inline]
    pub fn shelf_width(&self) -> f64 {
        self.shelf_width
    }

    /// Number of placed rectangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Whether nothing has been placed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Number of shelves, including the open one.
    #[inline]
    pub fn shelf_count(&self) -> usize {
        self.shelves.len()
    }

    /// Position of rectangle `index`.
    #[inline]
    pub fn position(&self, index: usize) -> Option<PositionedItem> {
        self.placed.get(index).copied()
    }

    /// All placed positions, in input order.
    #[inline]
    pub fn positions(&self) -> &[PositionedItem] {
        &self.placed
    }

    /// Sum of all shelf heights, the open shelf included.
    pub fn content_height(&self) -> f64 {
        self.shelves.last().map_or(0.0, Shelf::bottom)
    }

    /// Height needed to show the first `n` rectangles.
    ///
    /// This is the bottom of the shelf holding rectangle `n - 1`, so a shelf
    /// that is only partially inside the first `n` still counts in full.
    pub fn content_height_through(&self, n: usize) -> f64 {
        if n == 0 || self.placed.is_empty() {
            return 0.0;
        }
        if n >= self.placed.len() {
            return self.content_height();
        }
        self.shelves[self.shelf_of(n - 1)].bottom()
    }

    /// Index of the shelf holding rectangle `index`.
    fn shelf_of(&self, index: usize) -> usize {
        self.shelves
            .partition_point(|shelf| shelf.first <= index)
            .saturating_sub(1)
    }

    /// First rectangle on the first shelf whose bottom lies below `scroll_top`.
    ///
    /// Returns [`len`](Self::len) when every shelf ends above `scroll_top`.
    pub fn first_visible_index(&self, scroll_top: f64) -> usize {
        let shelf = self
            .shelves
            .partition_point(|shelf| shelf.bottom() <= scroll_top);
        self.shelves.get(shelf).map_or(self.placed.len(), |s| s.first)
    }

    /// Number of rectangles on shelves intersecting
    /// `[scroll_top, scroll_top + client_height)`.
    pub fn visible_count(&self, scroll_top: f64, client_height: f64) -> usize {
        if client_height <= 0.0 {
            return 0;
        }
        let first = self.first_visible_index(scroll_top);
        let viewport_bottom = scroll_top + client_height;
        let end_shelf = self
            .shelves
            .partition_point(|shelf| shelf.y < viewport_bottom);
        let end = self
            .shelves
            .get(end_shelf)
            .map_or(self.placed.len(), |s| s.first);
        end.saturating_sub(first)
    }
}
