#![forbid(unsafe_code)]

//! The virtualized collection.
//!
//! [`VirtualCollection`] ties the pieces together: it owns the items (via
//! [`PaginationState`]), the active [`Layout`], the [`ViewportTracker`], the
//! [`CellWindow`] and the [`InfiniteScrollController`], and turns host events
//! into recompute passes.
//!
//! # Pass Order
//!
//! 1. Rebuild the layout if the configuration or the whole collection changed.
//! 2. Sync the layout length with the collection.
//! 3. Recompute the visible window.
//! 4. Reconcile cells over the extended range.
//! 5. Report a content size change.
//! 6. Evaluate infinite scroll (may request and absorb more items).
//!
//! Steps repeat while the pass itself dirtied the collection, up to a fixed
//! number of rounds. The viewport report is flushed once, after the last round.
//!
//! # Invariants
//!
//! 1. Passes never nest; a trigger raised during a pass is folded into the
//!    next round of the running pass.
//! 2. After every public mutation the cells match the current window.
//! 3. At most one load-more request is outstanding at a time. A request
//!    whose every [`SourceReply`] is dropped unanswered stops being
//!    outstanding, and the next geometry change may ask again.

use std::fmt;
use std::mem;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use bitflags::bitflags;
use vlist_core::{CollectionItem, Size, SizeHint};
use vlist_layout::{Layout, LayoutConfig, LayoutStrategy};

use crate::cells::{Cell, CellWindow};
use crate::config::CollectionConfig;
use crate::error::CollectionError;
use crate::infinite_scroll::{InfiniteScrollController, ScrollDecision, ScrollState};
use crate::outbox::{Notification, Outbox};
use crate::pagination::{
    CollectionChange, LoadState, PaginationEvent, PaginationMeta, PaginationState,
};
use crate::source::{ItemSource, MoreItemsRequest, SourceReply};
use crate::viewport::{Viewport, ViewportTracker, VisibleWindow};

/// Upper bound on recompute rounds in one pass.
const MAX_SETTLE_ROUNDS: usize = 8;

bitflags! {
    /// What changed since the last pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Trigger: u8 {
        /// Scroll offset, client size or buffer.
        const GEOMETRY   = 0b001;
        /// Items added, removed or replaced.
        const COLLECTION = 0b010;
        /// Layout or infinite-scroll settings.
        const CONFIG     = 0b100;
    }
}

type MoreItemsHandler<T> = Box<dyn FnMut(MoreItemsRequest<T>)>;

/// A virtualized, optionally infinitely scrolling collection.
pub struct VirtualCollection<T: CollectionItem> {
    config: CollectionConfig,
    viewport: Viewport,
    pagination: PaginationState<T>,
    layout: Layout,
    rebuild_layout: bool,
    tracker: ViewportTracker,
    window: VisibleWindow,
    cells: CellWindow<T>,
    infinite: InfiniteScrollController,
    outbox: Outbox,
    content_size: Option<Size>,
    duplicate_keys: usize,
    handler: Option<MoreItemsHandler<T>>,
    reply: Option<Receiver<ItemSource<T>>>,
    dirty: Trigger,
    in_pass: bool,
}

impl<T: CollectionItem> VirtualCollection<T> {
    /// Create a collection over `source` and run the first pass.
    pub fn new(config: CollectionConfig, source: impl Into<ItemSource<T>>) -> Self {
        let mut collection = Self {
            viewport: Viewport::default().with_buffer(config.buffer),
            infinite: InfiniteScrollController::new(
                config.infinite_scroll,
                config.infinite_scroll_buffer,
            ),
            config,
            pagination: PaginationState::new(),
            layout: Layout::default(),
            rebuild_layout: true,
            tracker: ViewportTracker::new(),
            window: VisibleWindow::default(),
            cells: CellWindow::new(),
            outbox: Outbox::new(),
            content_size: None,
            duplicate_keys: 0,
            handler: None,
            reply: None,
            dirty: Trigger::empty(),
            in_pass: false,
        };
        collection.pagination.assign(source.into());
        collection.absorb_pagination();
        collection.request(Trigger::CONFIG | Trigger::COLLECTION);
        collection
    }

    /// Register the handler that answers load-more requests.
    #[must_use]
    pub fn with_more_items_handler(
        mut self,
        handler: impl FnMut(MoreItemsRequest<T>) + 'static,
    ) -> Self {
        self.set_more_items_handler(handler);
        self
    }

    /// Register or replace the load-more handler.
    pub fn set_more_items_handler(
        &mut self,
        handler: impl FnMut(MoreItemsRequest<T>) + 'static,
    ) {
        self.handler = Some(Box::new(handler));
        self.request(Trigger::CONFIG);
    }

    pub fn clear_more_items_handler(&mut self) {
        self.handler = None;
    }

    // ── Host events ───────────────────────────────────────────────────────

    /// A viewport of the given client size, scrolled to the origin, carrying
    /// the configured buffer.
    #[must_use]
    pub fn viewport_of(&self, client_width: f64, client_height: f64) -> Viewport {
        Viewport::new(client_width, client_height).with_buffer(self.config.buffer)
    }

    /// Replace scroll offset, client size and buffer.
    ///
    /// `viewport.buffer` replaces the configured buffer. [`Viewport::new`]
    /// carries the default buffer; use [`viewport_of`](Self::viewport_of) to
    /// keep the configured one.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.viewport == viewport {
            return;
        }
        self.viewport = viewport;
        self.config.buffer = viewport.buffer;
        self.request(Trigger::GEOMETRY);
    }

    /// Scroll to `(scroll_left, scroll_top)`.
    pub fn scroll_to(&mut self, scroll_left: f64, scroll_top: f64) {
        self.set_viewport(self.viewport.with_scroll(scroll_left, scroll_top));
    }

    /// Resize the client area.
    pub fn resize(&mut self, client_width: f64, client_height: f64) {
        self.set_viewport(Viewport {
            client_width,
            client_height,
            ..self.viewport
        });
    }

    pub fn set_buffer(&mut self, buffer: usize) {
        self.set_viewport(self.viewport.with_buffer(buffer));
    }

    /// Replace the collection. Cells are rebuilt and the scroll offset resets.
    pub fn set_items(&mut self, source: impl Into<ItemSource<T>>) {
        self.pagination.assign(source.into());
        self.absorb_pagination();
        self.request(Trigger::COLLECTION);
    }

    /// Replace the layout configuration. Cells are rebuilt and the scroll
    /// offset resets.
    pub fn set_layout_config(&mut self, layout: LayoutConfig) {
        if self.config.layout == layout {
            return;
        }
        self.config.layout = layout;
        self.rebuild_layout = true;
        self.viewport.scroll_top = 0.0;
        self.request(Trigger::CONFIG);
    }

    pub fn set_infinite_scroll(&mut self, enabled: bool) {
        self.config.infinite_scroll = enabled;
        self.infinite.set_enabled(enabled);
        self.request(Trigger::CONFIG);
    }

    pub fn set_infinite_scroll_buffer(&mut self, buffer: usize) {
        self.config.infinite_scroll_buffer = buffer;
        self.infinite.set_buffer(buffer);
        self.request(Trigger::CONFIG);
    }

    /// Remove the item at `index`.
    pub fn remove_item(&mut self, index: usize) -> Result<T, CollectionError> {
        let len = self.pagination.len();
        let item = self
            .pagination
            .remove(index)
            .ok_or(CollectionError::IndexOutOfRange { index, len })?;
        self.absorb_pagination();
        self.request(Trigger::COLLECTION);
        Ok(item)
    }

    /// Remove every item reporting [`CollectionItem::is_deleted`]; returns
    /// how many were removed.
    pub fn remove_deleted(&mut self) -> usize {
        let doomed: Vec<usize> = self
            .pagination
            .items()
            .iter()
            .enumerate()
            .filter(|(_, item)| item.is_deleted())
            .map(|(index, _)| index)
            .collect();
        for &index in doomed.iter().rev() {
            self.pagination.remove(index);
            self.absorb_pagination();
        }
        if !doomed.is_empty() {
            self.request(Trigger::COLLECTION);
        }
        doomed.len()
    }

    /// Ask the host for more items now, regardless of scroll position.
    pub fn load_more(&mut self) -> Result<(), CollectionError> {
        if self.handler.is_none() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                current_length = self.pagination.len(),
                "more items requested without a handler"
            );
            return Err(CollectionError::NoMoreItemsHandler);
        }
        self.send_request();
        self.request(Trigger::empty());
        Ok(())
    }

    /// Absorb host replies and settled sources. Returns `true` if anything
    /// reached the collection.
    pub fn pump(&mut self) -> bool {
        let replied = self.drain_replies();
        let settled = self.pagination.poll();
        if settled {
            self.absorb_pagination();
        }
        self.request(Trigger::empty());
        replied || settled
    }

    /// Take queued notifications, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.outbox.drain()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn items(&self) -> &[T] {
        self.pagination.items()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pagination.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pagination.is_empty()
    }

    #[inline]
    pub fn meta(&self) -> PaginationMeta {
        self.pagination.meta()
    }

    #[inline]
    pub fn load_state(&self) -> LoadState {
        self.pagination.load_state()
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.pagination.is_loading()
    }

    #[inline]
    pub fn is_all_loaded(&self) -> bool {
        self.pagination.is_all_loaded()
    }

    /// Cell pool, hidden cells included.
    #[inline]
    pub fn cells(&self) -> &[Cell<T>] {
        self.cells.cells()
    }

    pub fn visible_cells(&self) -> impl Iterator<Item = &Cell<T>> {
        self.cells.visible_cells()
    }

    #[inline]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[inline]
    pub fn visible_window(&self) -> &VisibleWindow {
        &self.window
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Scrollable content size as of the last pass.
    pub fn content_size(&self) -> Size {
        self.content_size.unwrap_or(Size::ZERO)
    }

    #[inline]
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Whether a manual "show more" control should be offered.
    pub fn show_more_option(&self) -> bool {
        self.handler.is_some()
            && !self.config.infinite_scroll
            && !self.pagination.is_all_loaded()
            && !self.pagination.is_loading()
    }

    // ── Pass machinery ────────────────────────────────────────────────────

    fn request(&mut self, trigger: Trigger) {
        self.dirty |= trigger;
        if self.in_pass {
            return;
        }
        self.in_pass = true;
        let mut rounds = 0;
        while !self.dirty.is_empty() {
            if rounds == MAX_SETTLE_ROUNDS {
                #[cfg(feature = "tracing")]
                tracing::warn!(rounds, pending = ?self.dirty, "pass did not settle");
                break;
            }
            let trigger = mem::take(&mut self.dirty);
            self.recompute(trigger);
            rounds += 1;
        }
        self.in_pass = false;

        if let Some(report) = self.tracker.take_report() {
            self.outbox.push(Notification::ViewportChange {
                first_visible_index: report.first_visible_index,
                visible_count: report.visible_count,
                last_visible_index: report.last_visible_index,
            });
        }
    }

    fn recompute(&mut self, trigger: Trigger) {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "vlist.recompute",
            trigger = ?trigger,
            items = self.pagination.len()
        )
        .entered();
        #[cfg(not(feature = "tracing"))]
        let _ = trigger;

        if mem::take(&mut self.rebuild_layout) {
            self.rebuild();
        }

        let len = self.pagination.len();
        if self.layout.length() != len {
            self.layout.set_length(len);
        }

        self.window = self.tracker.recompute(&self.layout, len, &self.viewport);
        #[cfg(feature = "tracing")]
        tracing::trace!(
            first = self.window.first_visible_index,
            count = self.window.visible_count,
            start = self.window.extended.start,
            end = self.window.extended.end,
            changed = self.window.changed,
            "window"
        );

        let Viewport {
            client_width,
            client_height,
            ..
        } = self.viewport;
        let layout = &self.layout;
        self.cells.reconcile(
            self.window.extended.clone(),
            self.pagination.items(),
            |index| layout.position_of(index, client_width, client_height),
        );

        let duplicates = self.cells.duplicate_keys();
        if duplicates != self.duplicate_keys {
            if duplicates > 0 {
                #[cfg(feature = "tracing")]
                tracing::warn!(duplicates, "items in the window share a key");
            }
            self.duplicate_keys = duplicates;
            self.outbox.push(Notification::DuplicateKeys { count: duplicates });
        }

        let size = self.layout.content_size(client_width, client_height);
        if self.content_size != Some(size) {
            self.content_size = Some(size);
            self.outbox.push(Notification::ContentSizeChange(size));
        }

        self.check_infinite_scroll();
    }

    fn rebuild(&mut self) {
        let hints: Vec<SizeHint> = self
            .pagination
            .items()
            .iter()
            .map(CollectionItem::size_hint)
            .collect();
        let selection = self.config.layout.select(&hints);
        #[cfg(feature = "tracing")]
        tracing::debug!(kind = ?selection.layout.kind(), items = hints.len(), "layout rebuilt");
        self.layout = selection.layout;
        if let Some(notice) = selection.notice {
            self.outbox.push(Notification::Diagnostic(notice));
        }
        self.cells.invalidate();
    }

    fn check_infinite_scroll(&mut self) {
        if self.handler.is_none() || !self.viewport.has_geometry() {
            return;
        }
        let decision = self.infinite.evaluate(ScrollState {
            last_visible_index: self.window.last_visible_index(),
            collection_len: self.pagination.len(),
            loading: self.pagination.is_loading(),
            all_loaded: self.pagination.is_all_loaded(),
        });
        match decision {
            ScrollDecision::LoadMore { .. } => self.send_request(),
            ScrollDecision::Disabled
            | ScrollDecision::Loading
            | ScrollDecision::AllLoaded
            | ScrollDecision::NotNearEnd => {}
        }
    }

    /// Hand a request to the handler, if one is registered. Each request gets
    /// its own reply channel, replacing any earlier one.
    fn send_request(&mut self) {
        let current_length = self.pagination.len();
        let Some(handler) = self.handler.as_mut() else {
            return;
        };
        let (tx, rx) = mpsc::channel();

        #[cfg(feature = "tracing")]
        tracing::debug!(current_length, "requesting more items");
        self.reply = Some(rx);
        self.infinite.mark_requested();
        handler(MoreItemsRequest {
            current_length,
            reply: SourceReply::new(tx),
        });
        self.drain_replies();
    }

    fn drain_replies(&mut self) -> bool {
        let mut replied = false;
        while let Some(rx) = self.reply.as_ref() {
            match rx.try_recv() {
                Ok(source) => {
                    self.infinite.mark_replied();
                    self.pagination.supply(source);
                    self.absorb_pagination();
                    replied = true;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.reply = None;
                    if self.infinite.is_awaiting_reply() {
                        #[cfg(feature = "tracing")]
                        tracing::debug!("more-items request dropped without a reply");
                        self.infinite.mark_replied();
                    }
                }
            }
        }
        replied
    }

    /// Fold pagination events into the layout and the outbox.
    fn absorb_pagination(&mut self) {
        for event in self.pagination.drain_events() {
            match event {
                PaginationEvent::LoadingStarted => {
                    self.outbox.push(Notification::IsLoading(true));
                }
                PaginationEvent::LoadingFinished => {
                    self.outbox.push(Notification::IsLoading(false));
                }
                PaginationEvent::AllLoaded(all_loaded) => {
                    self.outbox.push(Notification::AllItemsLoaded(all_loaded));
                }
                PaginationEvent::ItemsChanged { change, meta } => {
                    match change {
                        CollectionChange::Replaced => {
                            self.rebuild_layout = true;
                            self.viewport.scroll_top = 0.0;
                        }
                        CollectionChange::Appended(range) => {
                            if let Some(added) = self.pagination.items().get(range) {
                                let hints: Vec<SizeHint> =
                                    added.iter().map(CollectionItem::size_hint).collect();
                                self.layout.append(&hints);
                            }
                        }
                        CollectionChange::Removed(index) => {
                            self.layout.remove(index);
                        }
                    }
                    self.outbox.push(Notification::ItemsChange {
                        len: self.pagination.len(),
                        meta,
                    });
                    self.dirty |= Trigger::COLLECTION;
                }
            }
        }
    }
}

impl<T: CollectionItem> fmt::Debug for VirtualCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualCollection")
            .field("len", &self.pagination.len())
            .field("load_state", &self.pagination.load_state())
            .field("layout", &self.layout.kind())
            .field("viewport", &self.viewport)
            .field("window", &self.window)
            .field("cells", &self.cells.len())
            .field("has_handler", &self.handler.is_some())
            .finish_non_exhaustive()
    }
}
