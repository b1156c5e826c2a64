#![forbid(unsafe_code)]

//! Item identity.
//!
//! Cells are recycled by key, never by index: an item that stays inside the
//! window keeps its cell even when items before it are inserted or removed.
//! A key is a 64-bit FNV-1a digest, either of an explicit key field or of the
//! whole value.

use std::hash::{Hash, Hasher};

use crate::geometry::SizeHint;

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x100000001b3;

/// Stable identity of an item inside a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(pub u64);

impl ItemKey {
    /// Derive a key by hashing `value`.
    ///
    /// Deterministic across runs, so keys can be logged and compared between
    /// sessions on the same target.
    #[must_use]
    pub fn of<H: Hash + ?Sized>(value: &H) -> Self {
        let mut hasher = KeyHasher::default();
        value.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Key of the `ordinal`-th repeat of this key inside one window.
    ///
    /// Ordinal 0 is the key itself, so collections without repeated keys
    /// see their keys unchanged.
    #[must_use]
    pub fn occurrence(self, ordinal: usize) -> Self {
        if ordinal == 0 {
            return self;
        }
        let mut hasher = KeyHasher { state: self.0 };
        hasher.write(&(ordinal as u64).to_le_bytes());
        Self(hasher.finish())
    }

    /// Raw key value.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// FNV-1a hasher used for [`ItemKey::of`].
#[derive(Debug, Clone, Copy)]
pub struct KeyHasher {
    state: u64,
}

impl Default for KeyHasher {
    fn default() -> Self {
        Self {
            state: FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for KeyHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= *byte as u64;
            self.state = self.state.wrapping_mul(FNV_PRIME);
        }
    }
}

/// An item that can live in a virtualized collection.
///
/// The engine copies items into its own ordered collection, so implementors
/// must be `Clone`; the copy is what cells point at.
pub trait CollectionItem: Clone {
    /// Stable identity.
    ///
    /// Items that share a key (equal values under the hashed impls below) each
    /// still get a cell, told apart by their order inside the window.
    fn key(&self) -> ItemKey;

    /// Width/height hints for layouts that size items individually.
    fn size_hint(&self) -> SizeHint {
        SizeHint::NONE
    }

    /// Soft-delete marker; deleted items are pruned by the collection.
    fn is_deleted(&self) -> bool {
        false
    }
}

macro_rules! impl_hashed_item {
    ($($ty:ty),* $(,)?) => {
        $(
            impl CollectionItem for $ty {
                fn key(&self) -> ItemKey {
                    ItemKey::of(self)
                }
            }
        )*
    };
}

impl_hashed_item!(u32, u64, usize, i32, i64, String, &'static str);
