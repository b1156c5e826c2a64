#![forbid(unsafe_code)]

//! Near-end detection for infinite scroll.

/// Outcome of one [`InfiniteScrollController::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Infinite scroll is turned off.
    Disabled,
    /// A load is pending or a request is still unanswered.
    Loading,
    /// Nothing more to load.
    AllLoaded,
    /// The viewport is too far from the end.
    NotNearEnd,
    /// Ask the host for more items.
    LoadMore { current_length: usize },
}

/// Inputs to a near-end check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    pub last_visible_index: usize,
    pub collection_len: usize,
    pub loading: bool,
    pub all_loaded: bool,
}

/// Decides when to request more items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfiniteScrollController {
    enabled: bool,
    buffer: usize,
    awaiting_reply: bool,
}

impl InfiniteScrollController {
    #[must_use]
    pub fn new(enabled: bool, buffer: usize) -> Self {
        Self {
            enabled,
            buffer,
            awaiting_reply: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_buffer(&mut self, buffer: usize) {
        self.buffer = buffer;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn buffer(&self) -> usize {
        self.buffer
    }

    /// A request went out and the host has not answered yet.
    #[inline]
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    pub fn mark_requested(&mut self) {
        self.awaiting_reply = true;
    }

    pub fn mark_replied(&mut self) {
        self.awaiting_reply = false;
    }

    /// Decide whether `state` warrants a load-more request.
    pub fn evaluate(&self, state: ScrollState) -> ScrollDecision {
        if !self.enabled {
            return ScrollDecision::Disabled;
        }
        if state.loading || self.awaiting_reply {
            return ScrollDecision::Loading;
        }
        if state.all_loaded {
            return ScrollDecision::AllLoaded;
        }
        let remaining = state.collection_len.saturating_sub(state.last_visible_index);
        if remaining <= self.buffer {
            ScrollDecision::LoadMore {
                current_length: state.collection_len,
            }
        } else {
            ScrollDecision::NotNearEnd
        }
    }
}
