#![forbid(unsafe_code)]

//! Collection configuration.

use vlist_layout::LayoutConfig;

/// Cells rendered on each side of the visible range.
pub const DEFAULT_BUFFER: usize = 5;
/// Distance from the end, in items, at which more items are requested.
pub const DEFAULT_INFINITE_SCROLL_BUFFER: usize = 50;

/// Host-facing configuration for a [`VirtualCollection`](crate::VirtualCollection).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CollectionConfig {
    /// Extra cells kept alive before and after the visible range.
    pub buffer: usize,
    /// Request more items automatically when scrolling near the end.
    pub infinite_scroll: bool,
    /// How close to the end, in items, triggers a request.
    pub infinite_scroll_buffer: usize,
    /// Layout selection inputs.
    pub layout: LayoutConfig,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            buffer: DEFAULT_BUFFER,
            infinite_scroll: true,
            infinite_scroll_buffer: DEFAULT_INFINITE_SCROLL_BUFFER,
            layout: LayoutConfig::default(),
        }
    }
}

impl CollectionConfig {
    #[must_use]
    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    #[must_use]
    pub fn with_infinite_scroll(mut self, enabled: bool) -> Self {
        self.infinite_scroll = enabled;
        self
    }

    #[must_use]
    pub fn with_infinite_scroll_buffer(mut self, buffer: usize) -> Self {
        self.infinite_scroll_buffer = buffer;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CollectionConfig::default();
        assert_eq!(config.buffer, 5);
        assert!(config.infinite_scroll);
        assert_eq!(config.infinite_scroll_buffer, 50);
        assert!(config.layout.full_width_row);
    }

    #[test]
    fn builders_chain() {
        let config = CollectionConfig::default()
            .with_buffer(2)
            .with_infinite_scroll(false)
            .with_infinite_scroll_buffer(8)
            .with_layout(LayoutConfig::fixed_grid(100.0, 50.0));
        assert_eq!(config.buffer, 2);
        assert!(!config.infinite_scroll);
        assert_eq!(config.infinite_scroll_buffer, 8);
        assert_eq!(config.layout.item_width, Some(100.0));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let config: CollectionConfig =
            serde_json::from_str(r#"{"buffer": 3, "layout": {"row_height": 90.0}}"#)
                .expect("valid config");
        assert_eq!(config.buffer, 3);
        assert_eq!(config.infinite_scroll_buffer, 50);
        assert_eq!(config.layout.row_height, Some(90.0));
        assert!(config.layout.full_width_row);
    }
}
