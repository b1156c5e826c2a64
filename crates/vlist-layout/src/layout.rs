#![forbid(unsafe_code)]

//! Layout configuration and strategy selection.
//!
//! # Decision Rule
//!
//! 1) Both `item_width` and `item_height` set (and positive): **FixedGrid**.
//! 2) Else `full_width_row`: **FullWidthRow**, with `row_height` forced on
//!    every row when set, otherwise item heights falling back to
//!    `row_height_default`.
//! 3) Else **MixedGrid**, plus a [`LayoutNotice::MixedGridFallback`] so the
//!    host knows it got the fallback rather than a configured layout.

use std::fmt;

use vlist_core::{PositionedItem, Size, SizeHint};

use crate::{DEFAULT_ROW_HEIGHT, FixedGrid, FullWidthRow, LayoutStrategy, MixedGrid};

/// Layout configuration supplied by the host.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Fixed item width in pixels (FixedGrid, together with `item_height`).
    pub item_width: Option<f64>,
    /// Fixed item height in pixels (FixedGrid, together with `item_width`).
    pub item_height: Option<f64>,
    /// Lay items out one per full-width row.
    pub full_width_row: bool,
    /// Row height forced on every full-width row.
    pub row_height: Option<f64>,
    /// Row height for rows whose item carries no height hint.
    pub row_height_default: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            item_width: None,
            item_height: None,
            full_width_row: true,
            row_height: None,
            row_height_default: DEFAULT_ROW_HEIGHT,
        }
    }
}

impl LayoutConfig {
    /// Configure a fixed grid of `width` x `height` cells.
    #[must_use]
    pub fn fixed_grid(width: f64, height: f64) -> Self {
        Self::default().with_item_size(width, height)
    }

    /// Configure full-width rows, optionally forcing a row height.
    #[must_use]
    pub fn full_width_row(row_height: Option<f64>) -> Self {
        Self {
            row_height,
            ..Self::default()
        }
    }

    /// Configure a mixed grid (items size themselves).
    #[must_use]
    pub fn mixed_grid() -> Self {
        Self::default().with_full_width_row(false)
    }

    /// Set the fixed item size.
    #[must_use]
    pub fn with_item_size(mut self, width: f64, height: f64) -> Self {
        self.item_width = Some(width);
        self.item_height = Some(height);
        self
    }

    /// Enable or disable full-width-row mode.
    #[must_use]
    pub fn with_full_width_row(mut self, enabled: bool) -> Self {
        self.full_width_row = enabled;
        self
    }

    /// Force a row height on every full-width row.
    #[must_use]
    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = Some(height);
        self
    }

    /// Set the row height used when items carry no height.
    #[must_use]
    pub fn with_row_height_default(mut self, height: f64) -> Self {
        self.row_height_default = height;
        self
    }

    fn fixed_size(&self) -> Option<(f64, f64)> {
        match (self.item_width, self.item_height) {
            (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some((w, h)),
            _ => None,
        }
    }

    fn forced_row_height(&self) -> Option<f64> {
        self.row_height.filter(|h| *h > 0.0)
    }

    /// Pick and build the layout for `hints`.
    pub fn select(&self, hints: &[SizeHint]) -> LayoutSelection {
        if let Some((width, height)) = self.fixed_size() {
            let mut grid = FixedGrid::new(width, height);
            grid.append(hints);
            return LayoutSelection {
                layout: Layout::FixedGrid(grid),
                notice: None,
            };
        }

        if self.full_width_row {
            let forced = self.forced_row_height();
            let height = forced.unwrap_or(self.row_height_default);
            return LayoutSelection {
                layout: Layout::FullWidthRow(FullWidthRow::new(hints, height, forced.is_some())),
                notice: None,
            };
        }

        #[cfg(feature = "tracing")]
        tracing::warn!(items = hints.len(), "using default MixedGrid layout");

        LayoutSelection {
            layout: Layout::MixedGrid(MixedGrid::new(hints)),
            notice: Some(LayoutNotice::MixedGridFallback),
        }
    }
}

/// Non-fatal diagnostic raised while selecting a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutNotice {
    /// Neither a fixed item size nor full-width rows were configured.
    MixedGridFallback,
}

impl fmt::Display for LayoutNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MixedGridFallback => write!(
                f,
                "no fixed item size or full-width rows configured; using MixedGrid"
            ),
        }
    }
}

/// Result of [`LayoutConfig::select`].
#[derive(Debug, Clone)]
pub struct LayoutSelection {
    pub layout: Layout,
    pub notice: Option<LayoutNotice>,
}

/// Which strategy a [`Layout`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    FixedGrid,
    FullWidthRow,
    MixedGrid,
}

/// The active layout strategy.
#[derive(Debug, Clone)]
pub enum Layout {
    FixedGrid(FixedGrid),
    FullWidthRow(FullWidthRow),
    MixedGrid(MixedGrid),
}

impl Default for Layout {
    /// Empty full-width rows, as selected by [`LayoutConfig::default`].
    fn default() -> Self {
        Self::FullWidthRow(FullWidthRow::new(&[], DEFAULT_ROW_HEIGHT, false))
    }
}

impl Layout {
    /// Which strategy this is.
    #[must_use]
    pub fn kind(&self) -> LayoutKind {
        match self {
            Self::FixedGrid(_) => LayoutKind::FixedGrid,
            Self::FullWidthRow(_) => LayoutKind::FullWidthRow,
            Self::MixedGrid(_) => LayoutKind::MixedGrid,
        }
    }

    fn strategy(&self) -> &dyn LayoutStrategy {
        match self {
            Self::FixedGrid(l) => l,
            Self::FullWidthRow(l) => l,
            Self::MixedGrid(l) => l,
        }
    }

    fn strategy_mut(&mut self) -> &mut dyn LayoutStrategy {
        match self {
            Self::FixedGrid(l) => l,
            Self::FullWidthRow(l) => l,
            Self::MixedGrid(l) => l,
        }
    }
}

impl LayoutStrategy for Layout {
    fn length(&self) -> usize {
        self.strategy().length()
    }

    fn set_length(&mut self, length: usize) {
        self.strategy_mut().set_length(length);
    }

    fn content_size(&self, client_width: f64, client_height: f64) -> Size {
        self.strategy().content_size(client_width, client_height)
    }

    fn index_at(
        &self,
        scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        client_height: f64,
    ) -> usize {
        self.strategy()
            .index_at(scroll_left, scroll_top, client_width, client_height)
    }

    fn count(
        &self,
        scroll_left: f64,
        scroll_top: f64,
        client_width: f64,
        client_height: f64,
    ) -> usize {
        self.strategy()
            .count(scroll_left, scroll_top, client_width, client_height)
    }

    fn position_of(
        &self,
        index: usize,
        client_width: f64,
        client_height: f64,
    ) -> Option<PositionedItem> {
        self.strategy()
            .position_of(index, client_width, client_height)
    }

    fn append(&mut self, hints: &[SizeHint]) {
        self.strategy_mut().append(hints);
    }

    fn remove(&mut self, index: usize) -> bool {
        self.strategy_mut().remove(index)
    }
}
