#![forbid(unsafe_code)]

//! End-to-end behavior of [`VirtualCollection`] driven the way a host would
//! drive it: viewport events in, notifications and cells out.

use std::cell::RefCell;
use std::rc::Rc;

use vlist_core::{CollectionItem, ItemKey, PositionedItem, SizeHint};
use vlist_engine::{
    Batch, BatchResolver, CollectionConfig, LoadState, MoreItemsRequest, Notification,
    PaginationMeta, SourceError, Viewport, VirtualCollection, pending_batch,
};
use vlist_layout::{LayoutConfig, LayoutKind, LayoutStrategy};

#[derive(Debug, Clone, PartialEq)]
struct Photo {
    id: u32,
    width: Option<f64>,
    height: Option<f64>,
    deleted: bool,
}

impl Photo {
    fn new(id: u32) -> Self {
        Self {
            id,
            width: None,
            height: None,
            deleted: false,
        }
    }

    fn sized(id: u32, width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::new(id)
        }
    }
}

impl CollectionItem for Photo {
    fn key(&self) -> ItemKey {
        ItemKey::of(&self.id)
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint {
            width: self.width,
            height: self.height,
        }
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }
}

fn photos(range: std::ops::Range<u32>) -> Vec<Photo> {
    range.map(Photo::new).collect()
}

fn rows_config(row_height: f64) -> CollectionConfig {
    CollectionConfig::default().with_layout(LayoutConfig::full_width_row(Some(row_height)))
}

fn loading_flags(notes: &[Notification]) -> Vec<bool> {
    notes
        .iter()
        .filter_map(|n| match n {
            Notification::IsLoading(flag) => Some(*flag),
            _ => None,
        })
        .collect()
}

/// Handler that parks every request's resolver for the test to settle.
fn parking_handler(
    parked: &Rc<RefCell<Vec<(usize, BatchResolver<Photo>)>>>,
) -> impl FnMut(MoreItemsRequest<Photo>) + 'static {
    let parked = parked.clone();
    move |request| {
        let (resolver, pending) = pending_batch();
        parked
            .borrow_mut()
            .push((request.current_length, resolver));
        request.reply.supply(pending);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Layout scenarios
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn fixed_grid_ten_items_three_columns() {
    let config = CollectionConfig::default().with_layout(LayoutConfig::fixed_grid(100.0, 50.0));
    let mut collection = VirtualCollection::new(config, photos(0..10));

    collection.set_viewport(Viewport::new(320.0, 100.0));
    let window = collection.visible_window().clone();
    assert_eq!(window.first_visible_index, 0);
    assert_eq!(window.visible_count, 6);
    assert_eq!(window.extended, 0..10);

    // Five 50px rows span 240px; only ten items exist.
    collection.resize(320.0, 240.0);
    assert_eq!(collection.visible_window().visible_count, 10);
    assert_eq!(collection.visible_cells().count(), 10);

    let cell = collection
        .visible_cells()
        .find(|c| c.index == 4)
        .expect("item 4 bound");
    assert_eq!(cell.style, PositionedItem::new(100.0, 50.0, 100.0, 50.0));
}

#[test]
fn mixed_grid_stacks_full_width_items() {
    let config = CollectionConfig::default().with_layout(LayoutConfig::mixed_grid());
    let items = vec![
        Photo::sized(1, 100.0, 40.0),
        Photo::sized(2, 100.0, 30.0),
        Photo::sized(3, 100.0, 20.0),
    ];
    let mut collection = VirtualCollection::new(config, items);
    collection.set_viewport(Viewport::new(400.0, 600.0));

    assert_eq!(collection.layout().kind(), LayoutKind::MixedGrid);
    let ys: Vec<(f64, f64)> = (0..3)
        .filter_map(|i| collection.layout().position_of(i, 400.0, 600.0))
        .map(|p| (p.x, p.y))
        .collect();
    assert_eq!(ys, vec![(0.0, 0.0), (0.0, 40.0), (0.0, 70.0)]);
    assert_eq!(collection.content_size().height, 90.0);

    let notes = collection.drain_notifications();
    assert!(
        notes
            .iter()
            .any(|n| matches!(n, Notification::Diagnostic(_)))
    );
}

#[test]
fn full_width_rows_use_item_heights_when_not_forced() {
    let items = vec![
        Photo::sized(1, 10.0, 30.0),
        Photo::new(2),
        Photo::sized(3, 10.0, 45.0),
    ];
    let mut collection = VirtualCollection::new(CollectionConfig::default(), items);
    collection.set_viewport(Viewport::new(300.0, 600.0));
    assert_eq!(collection.layout().kind(), LayoutKind::FullWidthRow);
    // 30 + default 160 + 45
    assert_eq!(collection.content_size().height, 235.0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Cell recycling
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn scrolling_keeps_cells_for_overlapping_items() {
    let mut collection = VirtualCollection::new(rows_config(50.0), photos(0..1000));
    collection.set_viewport(Viewport::new(300.0, 500.0).with_buffer(2));
    let pool = collection.cells().len();
    let slot_of_8 = collection
        .cells()
        .iter()
        .position(|c| !c.hidden && c.item.id == 8)
        .expect("bound");

    collection.scroll_to(0.0, 250.0);
    let slot_after = collection
        .cells()
        .iter()
        .position(|c| !c.hidden && c.item.id == 8)
        .expect("still bound");
    assert_eq!(slot_after, slot_of_8);
    assert_eq!(collection.cells().len(), pool);

    // A far jump recycles the pool without growing it.
    collection.scroll_to(0.0, 25_000.0);
    assert_eq!(collection.cells().len(), pool);
    assert!(collection.visible_cells().all(|c| c.index >= 498));
}

#[test]
fn removal_keeps_remaining_cells() {
    let mut collection = VirtualCollection::new(rows_config(50.0), photos(0..20));
    collection.set_viewport(Viewport::new(300.0, 200.0).with_buffer(1));
    let key = ItemKey::of(&3u32);
    let before = collection
        .cells()
        .iter()
        .position(|c| c.key == key)
        .expect("bound");

    let removed = collection.remove_item(0).expect("in range");
    assert_eq!(removed.id, 0);
    let cell = collection
        .cells()
        .iter()
        .position(|c| c.key == key && !c.hidden)
        .expect("still bound");
    assert_eq!(cell, before);
    assert_eq!(collection.cells()[cell].index, 2);
    assert_eq!(collection.cells()[cell].style.y, 100.0);
}

#[test]
fn soft_deleted_items_are_pruned() {
    let mut items = photos(0..6);
    items[1].deleted = true;
    items[4].deleted = true;
    let mut collection = VirtualCollection::new(rows_config(50.0), items);
    assert_eq!(collection.remove_deleted(), 2);
    let ids: Vec<u32> = collection.items().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![0, 2, 3, 5]);
    assert_eq!(collection.content_size().height, 200.0);
    assert_eq!(collection.remove_deleted(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════
// Infinite scroll
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn near_end_triggers_one_request() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..100))
        .with_more_items_handler(parking_handler(&parked));

    // Rows 86..96 are visible: 100 - 96 <= 5.
    collection.set_viewport(Viewport::new(300.0, 100.0).with_scroll(0.0, 860.0));
    assert_eq!(collection.visible_window().last_visible_index(), 96);
    assert_eq!(parked.borrow().len(), 1);
    assert_eq!(parked.borrow()[0].0, 100);
    assert_eq!(collection.load_state(), LoadState::Pending);

    // Same spot while pending: no second request.
    collection.scroll_to(0.0, 870.0);
    collection.scroll_to(0.0, 900.0);
    assert_eq!(parked.borrow().len(), 1);

    let (_, resolver) = parked.borrow_mut().remove(0);
    resolver.resolve(photos(100..150));
    assert!(collection.pump());
    assert_eq!(collection.len(), 150);
    assert_eq!(collection.load_state(), LoadState::Success);
    assert_eq!(
        loading_flags(&collection.drain_notifications()),
        vec![true, false]
    );
}

#[test]
fn far_from_end_requests_nothing() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..100))
        .with_more_items_handler(parking_handler(&parked));
    collection.set_viewport(Viewport::new(300.0, 100.0).with_scroll(0.0, 500.0));
    assert!(parked.borrow().is_empty());
    assert_eq!(collection.load_state(), LoadState::Success);
}

#[test]
fn empty_resolution_completes_collection() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..10))
        .with_more_items_handler(parking_handler(&parked));
    collection.set_viewport(Viewport::new(300.0, 100.0));
    assert_eq!(parked.borrow().len(), 1);

    let (_, resolver) = parked.borrow_mut().remove(0);
    resolver.resolve(Vec::<Photo>::new());
    collection.pump();

    assert_eq!(collection.meta(), PaginationMeta::complete(10));
    assert!(collection.is_all_loaded());
    let notes = collection.drain_notifications();
    assert!(notes.contains(&Notification::AllItemsLoaded(true)));

    // Nothing more is requested once complete.
    collection.scroll_to(0.0, 5.0);
    assert!(parked.borrow().is_empty());
}

#[test]
fn explicit_meta_controls_completion() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..10))
        .with_more_items_handler(parking_handler(&parked));
    collection.set_viewport(Viewport::new(300.0, 100.0));

    let (_, resolver) = parked.borrow_mut().remove(0);
    resolver.resolve(Batch::new(photos(10..20)).with_meta(PaginationMeta::new(20, Some(20))));
    collection.pump();
    assert_eq!(collection.len(), 20);
    assert!(collection.is_all_loaded());
}

#[test]
fn failed_load_reports_and_allows_retry_on_scroll() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let failures = Rc::new(RefCell::new(Vec::new()));
    let sink = failures.clone();
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..10)).with_more_items_handler({
        let parked = parked.clone();
        move |request: MoreItemsRequest<Photo>| {
            let (resolver, pending) = pending_batch();
            let sink = sink.clone();
            parked.borrow_mut().push(resolver);
            request
                .reply
                .supply(pending.on_failure(move |e| sink.borrow_mut().push(e.clone())));
        }
    });
    collection.set_viewport(Viewport::new(300.0, 100.0));
    let resolver = parked.borrow_mut().remove(0);
    resolver.reject("network down");
    collection.pump();

    assert_eq!(collection.load_state(), LoadState::Error);
    assert_eq!(collection.len(), 10);
    assert_eq!(
        failures.borrow().as_slice(),
        &[SourceError::Rejected("network down".into())]
    );
    // A failure alone does not re-request; the next scroll does.
    assert!(parked.borrow().is_empty());
    collection.scroll_to(0.0, 1.0);
    assert_eq!(parked.borrow().len(), 1);
}

#[test]
fn declined_request_is_asked_again_on_scroll() {
    let requests = Rc::new(RefCell::new(0usize));
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..10)).with_more_items_handler({
        let requests = requests.clone();
        move |request: MoreItemsRequest<Photo>| {
            *requests.borrow_mut() += 1;
            drop(request);
        }
    });

    collection.set_viewport(Viewport::new(300.0, 100.0));
    assert_eq!(*requests.borrow(), 1, "one request per pass");
    assert_eq!(collection.load_state(), LoadState::Idle);

    collection.scroll_to(0.0, 10.0);
    assert_eq!(*requests.borrow(), 2);
    collection.resize(300.0, 480.0);
    assert_eq!(*requests.borrow(), 3);
    assert!(!collection.is_loading());
    assert!(!collection.is_all_loaded());
}

#[test]
fn deferred_reply_holds_off_repeat_requests() {
    let replies = Rc::new(RefCell::new(Vec::new()));
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..10)).with_more_items_handler({
        let replies = replies.clone();
        move |request: MoreItemsRequest<Photo>| replies.borrow_mut().push(request.reply)
    });

    collection.set_viewport(Viewport::new(300.0, 100.0));
    collection.scroll_to(0.0, 10.0);
    assert_eq!(replies.borrow().len(), 1, "unanswered request is still outstanding");

    let reply = replies.borrow_mut().remove(0);
    assert!(reply.supply(photos(10..20)));
    drop(reply);
    assert!(collection.pump());
    assert_eq!(collection.len(), 20);
}

#[test]
fn show_more_drives_manual_loading() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let config = rows_config(10.0).with_infinite_scroll(false);
    let mut collection = VirtualCollection::new(config, photos(0..10))
        .with_more_items_handler(parking_handler(&parked));
    collection.set_viewport(Viewport::new(300.0, 100.0));
    assert!(parked.borrow().is_empty());
    assert!(collection.show_more_option());

    collection.load_more().expect("handler registered");
    assert_eq!(parked.borrow().len(), 1);
    assert!(!collection.show_more_option());

    let (_, resolver) = parked.borrow_mut().remove(0);
    resolver.resolve(photos(10..15));
    collection.pump();
    assert_eq!(collection.len(), 15);
    assert!(collection.show_more_option());
}

// ═══════════════════════════════════════════════════════════════════════════
// Passes
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn unchanged_inputs_leave_pool_and_outbox_alone() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let mut collection = VirtualCollection::new(rows_config(50.0), photos(0..100))
        .with_more_items_handler(parking_handler(&parked));
    collection.set_viewport(Viewport::new(300.0, 200.0).with_scroll(0.0, 400.0));
    collection.drain_notifications();
    let before = collection.cells().to_vec();

    let buffer = collection.config().infinite_scroll_buffer;
    collection.set_infinite_scroll_buffer(buffer);
    collection.set_infinite_scroll(true);
    collection.set_viewport(*collection.viewport());
    collection.pump();

    assert_eq!(collection.cells(), before.as_slice());
    assert!(collection.drain_notifications().is_empty());
    assert!(parked.borrow().is_empty());
}

#[test]
fn viewport_of_keeps_configured_buffer() {
    let config = rows_config(50.0).with_buffer(2);
    let mut collection = VirtualCollection::new(config, photos(0..100));
    collection.set_viewport(collection.viewport_of(300.0, 200.0));
    assert_eq!(collection.config().buffer, 2);
    assert_eq!(collection.visible_window().extended, 0..8);
}

#[test]
fn equal_values_each_get_a_cell() {
    let mut collection =
        VirtualCollection::<&str>::new(CollectionConfig::default(), vec!["a", "b", "a"]);
    collection.set_viewport(Viewport::new(300.0, 500.0));

    assert_eq!(collection.visible_window().extended, 0..3);
    let mut bound: Vec<usize> = collection.visible_cells().map(|c| c.index).collect();
    bound.sort_unstable();
    assert_eq!(bound, vec![0, 1, 2]);
    assert!(
        collection
            .drain_notifications()
            .contains(&Notification::DuplicateKeys { count: 1 })
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// Sources
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn pending_initial_source_fills_on_pump() {
    let (resolver, pending) = pending_batch::<Photo>();
    let mut collection = VirtualCollection::new(rows_config(50.0), pending);
    collection.set_viewport(Viewport::new(300.0, 200.0));
    assert!(collection.is_empty());
    assert!(collection.is_loading());
    assert!(!collection.is_all_loaded());

    resolver.resolve(photos(0..30));
    assert!(collection.pump());
    assert_eq!(collection.len(), 30);
    assert_eq!(collection.visible_window().visible_count, 4);
    assert!(!collection.pump());
}

#[test]
fn refresh_supersedes_stale_source() {
    let hits = Rc::new(RefCell::new(Vec::new()));
    let (stale_resolver, stale) = pending_batch::<Photo>();
    let stale = stale.on_success({
        let hits = hits.clone();
        move || hits.borrow_mut().push("stale")
    });
    let mut collection = VirtualCollection::new(rows_config(50.0), stale);

    let (fresh_resolver, fresh) = pending_batch::<Photo>();
    let fresh = fresh.on_success({
        let hits = hits.clone();
        move || hits.borrow_mut().push("fresh")
    });
    collection.set_items(fresh);

    stale_resolver.resolve(photos(100..200));
    collection.pump();
    assert!(collection.is_empty());
    assert!(collection.is_loading());
    assert_eq!(*hits.borrow(), vec!["stale"]);

    fresh_resolver.resolve(photos(0..5));
    collection.pump();
    let ids: Vec<u32> = collection.items().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    assert_eq!(*hits.borrow(), vec!["stale", "fresh"]);
    assert_eq!(
        loading_flags(&collection.drain_notifications()),
        vec![true, false]
    );
}

#[test]
fn refresh_resets_scroll_and_reports_items() {
    let mut collection = VirtualCollection::new(rows_config(50.0), photos(0..100));
    collection.set_viewport(Viewport::new(300.0, 200.0).with_scroll(0.0, 2500.0));
    collection.drain_notifications();

    collection.set_items(photos(500..510));
    assert_eq!(collection.viewport().scroll_top, 0.0);
    let notes = collection.drain_notifications();
    assert!(notes.contains(&Notification::ItemsChange {
        len: 10,
        meta: PaginationMeta::new(10, None),
    }));
    assert!(notes.contains(&Notification::ViewportChange {
        first_visible_index: 0,
        visible_count: 4,
        last_visible_index: 4,
    }));
}

#[test]
fn content_size_reported_only_on_change() {
    let mut collection = VirtualCollection::new(rows_config(50.0), photos(0..10));
    let first = collection.drain_notifications();
    assert!(first.iter().any(|n| matches!(n, Notification::ContentSizeChange(_))));

    collection.scroll_to(0.0, 100.0);
    let after_scroll = collection.drain_notifications();
    assert!(
        !after_scroll
            .iter()
            .any(|n| matches!(n, Notification::ContentSizeChange(_)))
    );
}

#[test]
fn layout_length_tracks_collection() {
    let parked = Rc::new(RefCell::new(Vec::new()));
    let config = rows_config(10.0).with_infinite_scroll_buffer(5);
    let mut collection = VirtualCollection::new(config, photos(0..10))
        .with_more_items_handler(parking_handler(&parked));
    collection.set_viewport(Viewport::new(300.0, 100.0));
    let (_, resolver) = parked.borrow_mut().remove(0);
    resolver.resolve(photos(10..40));
    collection.pump();
    assert_eq!(collection.layout().length(), 40);
    collection.remove_item(39).expect("in range");
    assert_eq!(collection.layout().length(), 39);
}
