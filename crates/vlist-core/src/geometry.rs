#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Units depend on the layout that produced a value: `FixedGrid` works in
//! pixels on both axes, the packed layouts report `x`/`width` as a percentage
//! of the shelf and `y`/`height` in pixels.

/// Width and height of a content area or container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A zero-sized area.
    pub const ZERO: Self = Self::new(0.0, 0.0);
}

/// Position and size of one item, as computed by a layout strategy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionedItem {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PositionedItem {
    /// Style given to cells that are parked in the pool: no extent, at the origin.
    pub const COLLAPSED: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a new positioned item.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Check if the item has zero area.
    #[inline]
    pub fn is_collapsed(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Size hints an item may carry for layouts that size items individually.
///
/// `MixedGrid` reads both (width as a percentage of the container, height in
/// pixels); `FullWidthRow` only reads the height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SizeHint {
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl SizeHint {
    /// No hint on either axis.
    pub const NONE: Self = Self {
        width: None,
        height: None,
    };

    /// Hint both axes.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Hint the height only.
    #[inline]
    pub const fn height(height: f64) -> Self {
        Self {
            width: None,
            height: Some(height),
        }
    }
}
