#![forbid(unsafe_code)]

//! Host notifications.
//!
//! Notifications are queued during a pass and handed out by
//! [`Outbox::drain`]. State-style notifications coalesce (latest wins) so a
//! burst of changes produces one report; loading transitions are kept in
//! order with repeats dropped.

use std::mem;

use vlist_core::Size;
use vlist_layout::LayoutNotice;

use crate::pagination::PaginationMeta;

/// Something the host should know about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The visible range changed.
    ViewportChange {
        first_visible_index: usize,
        visible_count: usize,
        last_visible_index: usize,
    },
    /// A load started (`true`) or finished (`false`).
    IsLoading(bool),
    AllItemsLoaded(bool),
    /// The collection changed.
    ItemsChange { len: usize, meta: PaginationMeta },
    /// The scrollable content size changed.
    ContentSizeChange(Size),
    /// Non-fatal layout diagnostic.
    Diagnostic(LayoutNotice),
    /// Items in the window whose key repeats an earlier one. Sent when the
    /// count changes; each repeat still gets its own cell.
    DuplicateKeys { count: usize },
}

impl Notification {
    fn coalesces_with(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::ViewportChange { .. }, Self::ViewportChange { .. })
                | (Self::AllItemsLoaded(_), Self::AllItemsLoaded(_))
                | (Self::ItemsChange { .. }, Self::ItemsChange { .. })
                | (Self::ContentSizeChange(_), Self::ContentSizeChange(_))
                | (Self::DuplicateKeys { .. }, Self::DuplicateKeys { .. })
        )
    }
}

/// Queue of notifications awaiting delivery.
#[derive(Debug, Clone, Default)]
pub struct Outbox {
    queue: Vec<Notification>,
    last_loading: Option<bool>,
    coalesced: u64,
}

impl Outbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `notification`, replacing any queued one of the same kind.
    pub fn push(&mut self, notification: Notification) {
        if let Notification::IsLoading(loading) = notification {
            if self.last_loading == Some(loading) {
                self.coalesced += 1;
                return;
            }
            self.last_loading = Some(loading);
            self.queue.push(notification);
            return;
        }

        if let Some(pos) = self
            .queue
            .iter()
            .position(|queued| queued.coalesces_with(&notification))
        {
            self.queue.remove(pos);
            self.coalesced += 1;
        }
        self.queue.push(notification);
    }

    /// Take everything queued, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        mem::take(&mut self.queue)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Notifications dropped or replaced by coalescing.
    #[inline]
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
