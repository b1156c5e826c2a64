#![forbid(unsafe_code)]

//! Core primitives shared by the vlist crates.
//!
//! Nothing in here knows about viewports or pools; it only describes where an
//! item sits and how an item is identified.

pub mod geometry;
pub mod item;

pub use geometry::{PositionedItem, Size, SizeHint};
pub use item::{CollectionItem, ItemKey, KeyHasher};
