#![forbid(unsafe_code)]

//! Item sources supplied by the host.
//!
//! A source is either a batch that is ready now or a [`PendingBatch`] that
//! the host settles later through its [`BatchResolver`]. The resolver may be
//! moved to another thread; the pending half stays with the collection and is
//! polled from [`VirtualCollection::pump`](crate::VirtualCollection::pump).

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::error::SourceError;
use crate::pagination::PaginationMeta;

/// Items plus optional pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch<T> {
    pub items: Vec<T>,
    pub meta: Option<PaginationMeta>,
}

impl<T> Batch<T> {
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self { items, meta: None }
    }

    /// Attach explicit pagination metadata.
    #[must_use]
    pub fn with_meta(mut self, meta: PaginationMeta) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T> From<Vec<T>> for Batch<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

type Settlement<T> = Result<Batch<T>, SourceError>;

/// Create a linked resolver / pending pair.
#[must_use]
pub fn pending_batch<T>() -> (BatchResolver<T>, PendingBatch<T>) {
    let (tx, rx) = mpsc::channel();
    (
        BatchResolver { tx },
        PendingBatch {
            rx,
            on_success: None,
            on_failure: None,
        },
    )
}

/// Settles a [`PendingBatch`]. Dropping it unsettled fails the batch with
/// [`SourceError::Dropped`].
pub struct BatchResolver<T> {
    tx: Sender<Settlement<T>>,
}

impl<T> BatchResolver<T> {
    /// Settle with items. Returns `false` if the pending half is gone.
    pub fn resolve(self, batch: impl Into<Batch<T>>) -> bool {
        self.tx.send(Ok(batch.into())).is_ok()
    }

    /// Settle with a failure. Returns `false` if the pending half is gone.
    pub fn reject(self, reason: impl Into<String>) -> bool {
        self.tx.send(Err(SourceError::Rejected(reason.into()))).is_ok()
    }
}

impl<T> fmt::Debug for BatchResolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchResolver").finish_non_exhaustive()
    }
}

/// A batch that has not settled yet.
///
/// Callbacks registered here fire when the batch settles, even if the
/// collection has since moved on to a newer source.
pub struct PendingBatch<T> {
    rx: Receiver<Settlement<T>>,
    on_success: Option<Box<dyn FnOnce()>>,
    on_failure: Option<Box<dyn FnOnce(&SourceError)>>,
}

impl<T> PendingBatch<T> {
    /// Run `f` once the batch resolves.
    #[must_use]
    pub fn on_success(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    /// Run `f` once the batch fails.
    #[must_use]
    pub fn on_failure(mut self, f: impl FnOnce(&SourceError) + 'static) -> Self {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Non-blocking check for a settlement.
    pub(crate) fn poll(&self) -> Option<Settlement<T>> {
        match self.rx.try_recv() {
            Ok(settlement) => Some(settlement),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(SourceError::Dropped)),
        }
    }

    pub(crate) fn notify_success(&mut self) {
        if let Some(f) = self.on_success.take() {
            f();
        }
    }

    pub(crate) fn notify_failure(&mut self, error: &SourceError) {
        if let Some(f) = self.on_failure.take() {
            f(error);
        }
    }
}

impl<T> fmt::Debug for PendingBatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingBatch")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// Where a collection's items come from.
#[derive(Debug)]
pub enum ItemSource<T> {
    Ready(Batch<T>),
    Pending(PendingBatch<T>),
}

impl<T> From<Batch<T>> for ItemSource<T> {
    fn from(batch: Batch<T>) -> Self {
        Self::Ready(batch)
    }
}

impl<T> From<Vec<T>> for ItemSource<T> {
    fn from(items: Vec<T>) -> Self {
        Self::Ready(Batch::new(items))
    }
}

impl<T> From<PendingBatch<T>> for ItemSource<T> {
    fn from(pending: PendingBatch<T>) -> Self {
        Self::Pending(pending)
    }
}

/// Channel the host answers a [`MoreItemsRequest`] on.
///
/// Dropping every copy without calling [`supply`](Self::supply) declines the
/// request; the collection asks again on a later scroll or resize.
pub struct SourceReply<T> {
    tx: Sender<ItemSource<T>>,
}

impl<T> SourceReply<T> {
    pub(crate) fn new(tx: Sender<ItemSource<T>>) -> Self {
        Self { tx }
    }

    /// Hand the next items to the collection. Returns `false` if the
    /// collection has been dropped.
    pub fn supply(&self, source: impl Into<ItemSource<T>>) -> bool {
        self.tx.send(source.into()).is_ok()
    }
}

impl<T> Clone for SourceReply<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> fmt::Debug for SourceReply<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceReply").finish_non_exhaustive()
    }
}

/// Sent to the host when the collection wants more items.
#[derive(Debug)]
pub struct MoreItemsRequest<T> {
    /// Items currently in the collection.
    pub current_length: usize,
    pub reply: SourceReply<T>,
}
