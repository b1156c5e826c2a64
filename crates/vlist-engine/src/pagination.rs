#![forbid(unsafe_code)]

//! Pagination state machine.
//!
//! Owns the ordered item collection, its metadata and the load state, and
//! folds settled sources into them.
//!
//! # State Machine
//!
//! ```text
//! idle ──pending source──▶ pending ──resolve──▶ success
//!   ▲                        │  ▲                  │
//!   │                        │  └──pending source──┤
//!   │                        └──reject/drop──▶ error
//! ```
//!
//! # Invariants
//!
//! 1. Entering `Pending` from any other state emits exactly one
//!    [`PaginationEvent::LoadingStarted`]; leaving it emits exactly one
//!    [`PaginationEvent::LoadingFinished`].
//! 2. Only the newest pending source mutates the collection. Superseded
//!    sources are still polled so their own callbacks fire.
//! 3. `meta.last_index` never exceeds `meta.total_count` once normalized.

use std::mem;
use std::ops::Range;

use crate::error::SourceError;
use crate::source::{Batch, ItemSource, PendingBatch};

/// Load state of the most recent source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

impl LoadState {
    #[inline]
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

/// Pagination metadata carried alongside a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PaginationMeta {
    /// Items loaded so far.
    pub last_index: usize,
    /// Total items available, when known.
    pub total_count: Option<usize>,
    /// The host declared that nothing more will be loaded.
    pub all_loaded: bool,
}

impl PaginationMeta {
    #[must_use]
    pub fn new(last_index: usize, total_count: Option<usize>) -> Self {
        Self {
            last_index,
            total_count,
            all_loaded: false,
        }
        .normalized()
    }

    /// Metadata for a collection of `len` items with nothing left to load.
    #[must_use]
    pub fn complete(len: usize) -> Self {
        Self::new(len, Some(len))
    }

    #[must_use]
    pub fn with_all_loaded(mut self, all_loaded: bool) -> Self {
        self.all_loaded = all_loaded;
        self
    }

    /// Whether every item has been loaded.
    pub fn is_all_loaded(&self) -> bool {
        self.all_loaded || self.total_count.is_some_and(|total| self.last_index >= total)
    }

    fn normalized(mut self) -> Self {
        if let Some(total) = self.total_count
            && self.last_index > total
        {
            self.total_count = Some(self.last_index);
        }
        self
    }
}

/// How the collection changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
    /// The whole collection was replaced.
    Replaced,
    /// Items were appended at these indices.
    Appended(Range<usize>),
    /// The item at this index was removed.
    Removed(usize),
}

/// Emitted by [`PaginationState`] as sources settle.
#[derive(Debug, Clone, PartialEq)]
pub enum PaginationEvent {
    LoadingStarted,
    LoadingFinished,
    ItemsChanged {
        change: CollectionChange,
        meta: PaginationMeta,
    },
    AllLoaded(bool),
}

#[derive(Debug)]
struct InFlight<T> {
    generation: u64,
    refresh: bool,
    source: PendingBatch<T>,
}

/// Item collection plus the sources feeding it.
#[derive(Debug)]
pub struct PaginationState<T> {
    items: Vec<T>,
    meta: PaginationMeta,
    load_state: LoadState,
    generation: u64,
    in_flight: Option<InFlight<T>>,
    superseded: Vec<InFlight<T>>,
    events: Vec<PaginationEvent>,
}

impl<T> Default for PaginationState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            meta: PaginationMeta::default(),
            load_state: LoadState::Idle,
            generation: 0,
            in_flight: None,
            superseded: Vec::new(),
            events: Vec::new(),
        }
    }
}

impl<T: Clone> PaginationState<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection with `source`.
    ///
    /// A pending source empties the collection until it settles.
    pub fn assign(&mut self, source: ItemSource<T>) {
        match source {
            ItemSource::Ready(batch) => {
                self.supersede_in_flight();
                self.finish_ready();
                self.merge(batch, true);
            }
            ItemSource::Pending(pending) => {
                self.items.clear();
                self.meta = PaginationMeta::default();
                self.push_change(CollectionChange::Replaced);
                self.begin(pending, true);
            }
        }
    }

    /// Append the items `source` yields.
    pub fn supply(&mut self, source: ItemSource<T>) {
        match source {
            ItemSource::Ready(batch) => {
                let refresh = self.supersede_in_flight();
                self.finish_ready();
                self.merge(batch, refresh);
            }
            ItemSource::Pending(pending) => self.begin(pending, false),
        }
    }

    /// Check every in-flight source for a settlement.
    ///
    /// Returns `true` if the current source settled.
    pub fn poll(&mut self) -> bool {
        self.superseded.retain_mut(|stale| match stale.source.poll() {
            None => true,
            Some(outcome) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    generation = stale.generation,
                    ok = outcome.is_ok(),
                    "superseded source settled"
                );
                match outcome {
                    Ok(_) => stale.source.notify_success(),
                    Err(error) => stale.source.notify_failure(&error),
                }
                false
            }
        });

        let Some(outcome) = self.in_flight.as_ref().and_then(|f| f.source.poll()) else {
            return false;
        };
        let Some(mut current) = self.in_flight.take() else {
            return false;
        };

        debug_assert_eq!(current.generation, self.generation);
        match outcome {
            Ok(batch) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    generation = current.generation,
                    items = batch.items.len(),
                    "load succeeded"
                );
                self.load_state = LoadState::Success;
                self.merge(batch, current.refresh);
                current.source.notify_success();
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(generation = current.generation, %error, "item source failed");
                self.load_state = LoadState::Error;
                current.source.notify_failure(&error);
            }
        }
        self.events.push(PaginationEvent::LoadingFinished);
        true
    }

    /// Remove the item at `index`. Metadata is left as it was.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        self.push_change(CollectionChange::Removed(index));
        Some(item)
    }

    /// Events produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<PaginationEvent> {
        mem::take(&mut self.events)
    }

    #[inline]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn meta(&self) -> PaginationMeta {
        self.meta
    }

    #[inline]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    #[inline]
    pub fn is_loading(&self) -> bool {
        self.load_state.is_pending()
    }

    #[inline]
    pub fn is_all_loaded(&self) -> bool {
        self.meta.is_all_loaded()
    }

    /// Generation of the newest source.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sources superseded but not yet settled.
    #[inline]
    pub fn stale_sources(&self) -> usize {
        self.superseded.len()
    }

    fn begin(&mut self, source: PendingBatch<T>, refresh: bool) {
        self.generation += 1;
        let inherited = self.supersede_in_flight();
        if !self.load_state.is_pending() {
            #[cfg(feature = "tracing")]
            tracing::debug!(generation = self.generation, refresh, "load started");
            self.events.push(PaginationEvent::LoadingStarted);
        }
        self.load_state = LoadState::Pending;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            refresh: refresh || inherited,
            source,
        });
    }

    /// Park the in-flight source, if any; returns whether it was a refresh.
    fn supersede_in_flight(&mut self) -> bool {
        let Some(previous) = self.in_flight.take() else {
            return false;
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(generation = previous.generation, "source superseded");
        let refresh = previous.refresh;
        self.superseded.push(previous);
        refresh
    }

    fn finish_ready(&mut self) {
        if self.load_state.is_pending() {
            self.events.push(PaginationEvent::LoadingFinished);
        }
        self.load_state = LoadState::Success;
    }

    fn merge(&mut self, batch: Batch<T>, refresh: bool) {
        let Batch { items, meta } = batch;
        let batch_len = items.len();
        let change = if refresh {
            self.items = items;
            CollectionChange::Replaced
        } else {
            let start = self.items.len();
            self.items.extend(items);
            CollectionChange::Appended(start..self.items.len())
        };

        self.meta = match meta {
            Some(meta) => meta.normalized(),
            // An empty batch without metadata means the source is exhausted.
            None if batch_len == 0 => PaginationMeta::complete(self.items.len()),
            None => PaginationMeta::new(self.items.len(), None),
        };
        self.push_change(change);
    }

    fn push_change(&mut self, change: CollectionChange) {
        self.events.push(PaginationEvent::ItemsChanged {
            change,
            meta: self.meta,
        });
        self.events
            .push(PaginationEvent::AllLoaded(self.meta.is_all_loaded()));
    }
}
