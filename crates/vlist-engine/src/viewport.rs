#![forbid(unsafe_code)]

//! Viewport tracking.
//!
//! Turns scroll position and client size into the visible index range and
//! the buffered range of items that should own a cell.
//!
//! # Invariants
//!
//! 1. `first_visible_index <= item_count` and
//!    `first_visible_index + visible_count <= item_count`.
//! 2. The extended range always contains the visible range and never leaves
//!    `[0, item_count)`.
//! 3. A viewport report is produced only when `(first, count)` differs from
//!    the last pair handed out by [`ViewportTracker::take_report`].
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Scrolled past the content | `first == item_count`, `count == 0` |
//! | Zero client height | `count == 0`, extended range still holds the buffer |
//! | Layout reports more items than exist | Clamped to `item_count` |

use std::ops::Range;

use vlist_layout::LayoutStrategy;

/// Scroll offset, client size and buffer, as supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_left: f64,
    pub scroll_top: f64,
    pub client_width: f64,
    pub client_height: f64,
    /// Extra cells kept before and after the visible range.
    pub buffer: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_left: 0.0,
            scroll_top: 0.0,
            client_width: 0.0,
            client_height: 0.0,
            buffer: crate::config::DEFAULT_BUFFER,
        }
    }
}

impl Viewport {
    /// A viewport of the given client size, scrolled to the origin.
    #[must_use]
    pub fn new(client_width: f64, client_height: f64) -> Self {
        Self {
            client_width,
            client_height,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scroll(mut self, scroll_left: f64, scroll_top: f64) -> Self {
        self.scroll_left = scroll_left;
        self.scroll_top = scroll_top;
        self
    }

    #[must_use]
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    /// Whether the client area has been measured.
    #[inline]
    pub fn has_geometry(&self) -> bool {
        self.client_width > 0.0 && self.client_height > 0.0
    }
}

/// Result of one [`ViewportTracker::recompute`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibleWindow {
    pub first_visible_index: usize,
    pub visible_count: usize,
    /// Items that should own a cell: the visible range plus buffer.
    pub extended: Range<usize>,
    /// `(first, count)` differs from the last reported pair.
    pub changed: bool,
}

impl VisibleWindow {
    /// One past the last visible item.
    #[inline]
    pub fn last_visible_index(&self) -> usize {
        self.first_visible_index + self.visible_count
    }

    /// Visible index range.
    #[inline]
    pub fn visible(&self) -> Range<usize> {
        self.first_visible_index..self.last_visible_index()
    }
}

/// Visible range handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportReport {
    pub first_visible_index: usize,
    pub visible_count: usize,
    pub last_visible_index: usize,
}

/// Computes visible windows and remembers what was last reported.
#[derive(Debug, Clone, Default)]
pub struct ViewportTracker {
    reported: Option<(usize, usize)>,
    pending: Option<(usize, usize)>,
}

impl ViewportTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the visible and extended ranges for `viewport`.
    ///
    /// A changed pair is parked until [`take_report`](Self::take_report), so
    /// several recomputes in one pass yield at most one report.
    pub fn recompute<L>(
        &mut self,
        layout: &L,
        item_count: usize,
        viewport: &Viewport,
    ) -> VisibleWindow
    where
        L: LayoutStrategy + ?Sized,
    {
        let Viewport {
            scroll_left,
            scroll_top,
            client_width,
            client_height,
            buffer,
        } = *viewport;

        let first = layout
            .index_at(scroll_left, scroll_top, client_width, client_height)
            .min(item_count);
        let count = layout
            .count(scroll_left, scroll_top, client_width, client_height)
            .min(item_count - first);

        let start = first - first.min(buffer);
        let end = start
            .saturating_add(count)
            .saturating_add(buffer.saturating_mul(2))
            .min(item_count);

        let pair = (first, count);
        let changed = self.reported != Some(pair);
        self.pending = changed.then_some(pair);

        VisibleWindow {
            first_visible_index: first,
            visible_count: count,
            extended: start..end,
            changed,
        }
    }

    /// Take the parked report, if the visible pair changed since the last one.
    pub fn take_report(&mut self) -> Option<ViewportReport> {
        let (first, count) = self.pending.take()?;
        self.reported = Some((first, count));
        Some(ViewportReport {
            first_visible_index: first,
            visible_count: count,
            last_visible_index: first + count,
        })
    }

    /// Last pair handed to the host.
    pub fn reported(&self) -> Option<(usize, usize)> {
        self.reported
    }
}
