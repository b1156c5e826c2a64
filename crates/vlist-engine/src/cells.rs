#![forbid(unsafe_code)]

//! Key-stable cell recycling.
//!
//! A [`CellWindow`] owns the pool of render cells and maps the extended
//! index range onto it. Reconciliation runs in three phases:
//!
//! 1. **Keep**: items whose key already owns a cell keep that cell; only its
//!    style and index are refreshed.
//! 2. **Recycle**: every unclaimed cell is reassigned to a new item, taken
//!    from the back of the pending list, or hidden if none are left.
//! 3. **Grow**: any items still without a cell get a freshly created one.
//!
//! # Invariants
//!
//! 1. After a reconcile, the keys of the non-hidden cells are exactly the
//!    window keys of the items in the range. An item's window key is its
//!    [`ItemKey`], tagged with [`ItemKey::occurrence`] when the same key
//!    already appeared earlier in the range.
//! 2. No two non-hidden cells share a key.
//! 3. The pool never shrinks; hidden cells are kept for reuse.
//! 4. An item that stays in range keeps the same cell across reconciles.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Range extends past `items` | Truncated to `items.len()` |
//! | Duplicate key inside the range | Each repeat gets its own cell |
//! | No position for an index | Cell gets [`PositionedItem::COLLAPSED`] |

use std::collections::HashMap;
use std::ops::Range;

use vlist_core::{CollectionItem, ItemKey, PositionedItem};

/// A render cell bound to one item.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<T> {
    /// Window key: the item key, or an occurrence of it for repeated keys.
    pub key: ItemKey,
    pub item: T,
    pub index: usize,
    pub style: PositionedItem,
    pub hidden: bool,
}

/// Pool of cells for the items in the extended range.
#[derive(Debug, Clone)]
pub struct CellWindow<T> {
    cells: Vec<Cell<T>>,
    by_key: HashMap<ItemKey, usize>,
    // Scratch buffers reused across reconciles.
    claimed: Vec<bool>,
    occurrences: HashMap<ItemKey, usize>,
    fresh: Vec<(usize, ItemKey)>,
    duplicates: usize,
}

impl<T> Default for CellWindow<T> {
    fn default() -> Self {
        Self {
            cells: Vec::new(),
            by_key: HashMap::new(),
            claimed: Vec::new(),
            occurrences: HashMap::new(),
            fresh: Vec::new(),
            duplicates: 0,
        }
    }
}

impl<T: CollectionItem> CellWindow<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind cells to `items[range]`, positioning each with `style_of(index)`.
    pub fn reconcile<F>(&mut self, range: Range<usize>, items: &[T], mut style_of: F) -> &[Cell<T>]
    where
        F: FnMut(usize) -> Option<PositionedItem>,
    {
        let range = range.start.min(items.len())..range.end.min(items.len());

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "vlist.reconcile",
            start = range.start,
            end = range.end,
            pool = self.cells.len()
        )
        .entered();

        let mut style = |index: usize| style_of(index).unwrap_or(PositionedItem::COLLAPSED);

        self.claimed.clear();
        self.claimed.resize(self.cells.len(), false);
        self.occurrences.clear();
        self.fresh.clear();
        self.duplicates = 0;
        let mut next = HashMap::with_capacity(range.len());

        // Phase 1: items that already own a cell keep it.
        for index in range.clone() {
            let base = items[index].key();
            let seen = self.occurrences.entry(base).or_insert(0);
            let key = base.occurrence(*seen);
            if *seen > 0 {
                self.duplicates += 1;
            }
            *seen += 1;
            match self.by_key.get(&key) {
                Some(&slot) => {
                    let cell = &mut self.cells[slot];
                    cell.index = index;
                    cell.style = style(index);
                    cell.hidden = false;
                    self.claimed[slot] = true;
                    next.insert(key, slot);
                }
                None => self.fresh.push((index, key)),
            }
        }

        // Phase 2: recycle unclaimed cells, newest pending item first.
        for slot in 0..self.cells.len() {
            if self.claimed[slot] {
                continue;
            }
            let cell = &mut self.cells[slot];
            match self.fresh.pop() {
                Some((index, key)) => {
                    cell.key = key;
                    cell.item = items[index].clone();
                    cell.index = index;
                    cell.style = style(index);
                    cell.hidden = false;
                    next.insert(cell.key, slot);
                }
                None => {
                    cell.hidden = true;
                    cell.style = PositionedItem::COLLAPSED;
                }
            }
        }

        // Phase 3: grow the pool for whatever is left.
        for &(index, key) in &self.fresh {
            next.insert(key, self.cells.len());
            self.cells.push(Cell {
                key,
                item: items[index].clone(),
                index,
                style: style(index),
                hidden: false,
            });
        }
        self.fresh.clear();

        self.by_key = next;
        &self.cells
    }

    /// Drop every cell; the next reconcile starts from an empty pool.
    pub fn invalidate(&mut self) {
        self.cells.clear();
        self.by_key.clear();
    }

    /// All cells in the pool, hidden ones included.
    #[inline]
    pub fn cells(&self) -> &[Cell<T>] {
        &self.cells
    }

    /// Cells currently bound to an item.
    pub fn visible_cells(&self) -> impl Iterator<Item = &Cell<T>> {
        self.cells.iter().filter(|cell| !cell.hidden)
    }

    /// Items in the last reconciled range whose key repeated an earlier one.
    #[inline]
    pub fn duplicate_keys(&self) -> usize {
        self.duplicates
    }

    /// The cell bound to window key `key`, if any.
    ///
    /// For repeated keys, pass `key.occurrence(n)` to reach the `n`-th repeat.
    pub fn cell_for(&self, key: ItemKey) -> Option<&Cell<T>> {
        self.by_key.get(&key).map(|&slot| &self.cells[slot])
    }

    /// Pool size, hidden cells included.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(index: usize) -> Option<PositionedItem> {
        Some(PositionedItem::new(0.0, index as f64 * 10.0, 100.0, 10.0))
    }

    fn slot_of(window: &CellWindow<u32>, item: u32) -> usize {
        window
            .cells()
            .iter()
            .position(|cell| !cell.hidden && cell.item == item)
            .expect("item has a cell")
    }

    fn visible_items(window: &CellWindow<u32>) -> Vec<u32> {
        let mut items: Vec<u32> = window.visible_cells().map(|cell| cell.item).collect();
        items.sort_unstable();
        items
    }

    #[test]
    fn first_reconcile_creates_cells_in_order() {
        let items: Vec<u32> = (0..10).collect();
        let mut window = CellWindow::new();
        let cells = window.reconcile(2..5, &items, at);
        let bound: Vec<(u32, usize)> = cells.iter().map(|c| (c.item, c.index)).collect();
        assert_eq!(bound, vec![(2, 2), (3, 3), (4, 4)]);
        assert_eq!(cells[1].style.y, 30.0);
    }

    #[test]
    fn overlapping_items_keep_their_cells() {
        let items: Vec<u32> = (0..20).collect();
        let mut window = CellWindow::new();
        window.reconcile(0..5, &items, at);
        let slot_of_3 = slot_of(&window, 3);

        window.reconcile(2..7, &items, at);
        assert_eq!(slot_of(&window, 3), slot_of_3);
        assert_eq!(window.len(), 5);
        assert_eq!(visible_items(&window), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn recycled_cells_take_items_from_the_back() {
        let items: Vec<u32> = (0..20).collect();
        let mut window = CellWindow::new();
        window.reconcile(0..2, &items, at);
        // Items 0 and 1 leave; slots 0 and 1 are recycled for 11 then 10.
        let cells = window.reconcile(10..12, &items, at);
        assert_eq!(cells[0].item, 11);
        assert_eq!(cells[1].item, 10);
        assert_eq!(cells[0].style.y, 110.0);
    }

    #[test]
    fn shrinking_range_hides_surplus_cells() {
        let items: Vec<u32> = (0..10).collect();
        let mut window = CellWindow::new();
        window.reconcile(0..6, &items, at);
        window.reconcile(0..2, &items, at);
        assert_eq!(window.len(), 6);
        assert_eq!(window.visible_cells().count(), 2);
        for cell in window.cells().iter().filter(|c| c.hidden) {
            assert_eq!(cell.style, PositionedItem::COLLAPSED);
        }
    }

    #[test]
    fn hidden_cells_are_reused_before_growing() {
        let items: Vec<u32> = (0..10).collect();
        let mut window = CellWindow::new();
        window.reconcile(0..6, &items, at);
        window.reconcile(0..2, &items, at);
        window.reconcile(4..8, &items, at);
        assert_eq!(window.len(), 6);
        assert_eq!(visible_items(&window), vec![4, 5, 6, 7]);
    }

    #[test]
    fn removal_shifts_index_but_keeps_cell() {
        let mut items: Vec<u32> = (0..10).collect();
        let mut window = CellWindow::new();
        window.reconcile(0..5, &items, at);
        let slot_of_4 = slot_of(&window, 4);

        items.remove(1);
        window.reconcile(0..5, &items, at);
        assert_eq!(slot_of(&window, 4), slot_of_4);
        let cell = window.cell_for(ItemKey::of(&4u32)).expect("bound");
        assert_eq!(cell.index, 3);
        assert_eq!(cell.style.y, 30.0);
        assert_eq!(visible_items(&window), vec![0, 2, 3, 4, 5]);
    }

    #[test]
    fn duplicate_keys_each_get_a_cell() {
        let items = vec![7u32, 7, 8];
        let mut window = CellWindow::new();
        window.reconcile(0..3, &items, at);
        assert_eq!(window.visible_cells().count(), 3);
        assert_eq!(window.duplicate_keys(), 1);
        let seven = ItemKey::of(&7u32);
        assert_eq!(window.cell_for(seven).map(|c| c.index), Some(0));
        assert_eq!(window.cell_for(seven.occurrence(1)).map(|c| c.index), Some(1));
    }

    #[test]
    fn duplicate_keys_keep_cells_while_in_range() {
        let items = vec![1u32, 7, 7, 2, 3];
        let mut window = CellWindow::new();
        window.reconcile(0..4, &items, at);
        let second = window
            .cell_for(ItemKey::of(&7u32).occurrence(1))
            .map(|c| c.index);
        window.reconcile(0..5, &items, at);
        assert_eq!(
            window.cell_for(ItemKey::of(&7u32).occurrence(1)).map(|c| c.index),
            second
        );
        assert_eq!(window.visible_cells().count(), 5);

        window.reconcile(3..5, &items, at);
        assert_eq!(window.duplicate_keys(), 0);
    }

    #[test]
    fn range_past_items_is_truncated() {
        let items: Vec<u32> = (0..3).collect();
        let mut window = CellWindow::new();
        window.reconcile(1..10, &items, at);
        assert_eq!(visible_items(&window), vec![1, 2]);
    }

    #[test]
    fn missing_position_collapses() {
        let items: Vec<u32> = (0..3).collect();
        let mut window = CellWindow::new();
        let cells = window.reconcile(0..3, &items, |_| None);
        assert!(cells.iter().all(|c| c.style.is_collapsed()));
    }

    #[test]
    fn invalidate_empties_pool() {
        let items: Vec<u32> = (0..3).collect();
        let mut window = CellWindow::new();
        window.reconcile(0..3, &items, at);
        window.invalidate();
        assert!(window.is_empty());
        assert!(window.cell_for(ItemKey::of(&0u32)).is_none());
    }
}
