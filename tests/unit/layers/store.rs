use std::{cell::Cell, rc::Rc};

use super::*;

fn img(w: u32, h: u32) -> Arc<DecodedImage> {
    Arc::new(DecodedImage::solid(w, h, [10, 20, 30, 255]))
}

fn counting(store: &mut LayerStore) -> Rc<Cell<u32>> {
    let hits = Rc::new(Cell::new(0));
    let seen = hits.clone();
    store.subscribe(move |_| seen.set(seen.get() + 1));
    hits
}

#[test]
fn add_then_remove_restores_every_list() {
    let mut store = LayerStore::starter();
    store.add(LayerKind::Text);
    store.add(LayerKind::Overlay);

    for kind in [LayerKind::Background, LayerKind::Overlay, LayerKind::Text] {
        let bgs = store.backgrounds().to_vec();
        let ovs = store.overlays().to_vec();
        let txs = store.texts().to_vec();

        let id = store.add(kind);
        assert_eq!(store.kind_of(id), Some(kind));
        assert!(store.remove(kind, id));

        assert_eq!(store.backgrounds(), bgs.as_slice());
        assert_eq!(store.overlays(), ovs.as_slice());
        assert_eq!(store.texts(), txs.as_slice());
    }
}

#[test]
fn ids_never_collide_even_when_created_back_to_back() {
    let mut store = LayerStore::new();
    let ids: Vec<_> = (0..50).map(|_| store.add(LayerKind::Overlay)).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
}

#[test]
fn remove_preserves_relative_order() {
    let mut store = LayerStore::new();
    let a = store.add(LayerKind::Text);
    let b = store.add(LayerKind::Text);
    let c = store.add(LayerKind::Text);
    store.remove(LayerKind::Text, b);
    let order: Vec<_> = store.texts().iter().map(|t| t.id).collect();
    assert_eq!(order, vec![a, c]);
}

#[test]
fn absent_ids_are_silent_no_ops() {
    let mut store = LayerStore::starter();
    let hits = counting(&mut store);
    let ghost = LayerId(9_999);

    assert!(!store.remove(LayerKind::Overlay, ghost));
    assert!(!store.update(LayerKind::Text, ghost, LayerField::X(1.0)));
    assert!(!store.move_up(StackKind::Background, ghost));
    assert!(!store.mark_loaded(ImageKind::Overlay, ghost, img(1, 1), "x.png"));
    assert_eq!(hits.get(), 0);
}

#[test]
fn move_up_swaps_toward_top_and_stops_at_boundary() {
    let mut store = LayerStore::new();
    let a = store.add(LayerKind::Background);
    let b = store.add(LayerKind::Background);
    let hits = counting(&mut store);

    assert!(store.move_up(StackKind::Background, a));
    let order: Vec<_> = store.backgrounds().iter().map(|l| l.id).collect();
    assert_eq!(order, vec![b, a]);
    assert_eq!(hits.get(), 1);

    let before = store.backgrounds().to_vec();
    assert!(!store.move_up(StackKind::Background, a));
    assert_eq!(store.backgrounds(), before.as_slice());
    assert_eq!(hits.get(), 1);
}

#[test]
fn move_down_at_bottom_is_a_no_op() {
    let mut store = LayerStore::new();
    let a = store.add(LayerKind::Text);
    let b = store.add(LayerKind::Text);
    let hits = counting(&mut store);

    assert!(!store.move_down(StackKind::Text, a));
    assert_eq!(hits.get(), 0);

    assert!(store.move_down(StackKind::Text, b));
    let order: Vec<_> = store.texts().iter().map(|l| l.id).collect();
    assert_eq!(order, vec![b, a]);
}

#[test]
fn update_stores_values_without_clamping() {
    let mut store = LayerStore::new();
    let id = store.add(LayerKind::Overlay);
    assert!(store.update(LayerKind::Overlay, id, LayerField::Scale(-40.0)));
    assert_eq!(store.overlay(id).unwrap().scale, -40.0);
}

#[test]
fn update_with_foreign_field_is_ignored() {
    let mut store = LayerStore::new();
    let id = store.add(LayerKind::Background);
    let hits = counting(&mut store);
    assert!(!store.update(LayerKind::Background, id, LayerField::Content("x".into())));
    assert_eq!(hits.get(), 0);
}

#[test]
fn every_change_notifies_exactly_once() {
    let mut store = LayerStore::new();
    let hits = counting(&mut store);

    let id = store.add(LayerKind::Background);
    assert_eq!(hits.get(), 1);
    store.update(LayerKind::Background, id, LayerField::Opacity(40.0));
    assert_eq!(hits.get(), 2);
    store.mark_loaded(ImageKind::Background, id, img(2, 2), "bg.png");
    assert_eq!(hits.get(), 3);
    assert_eq!(store.revision(), 3);
}

#[test]
fn subscribers_see_the_new_state() {
    let mut store = LayerStore::new();
    let seen = Rc::new(Cell::new(0usize));
    let out = seen.clone();
    store.subscribe(move |s| out.set(s.texts().len()));
    store.add(LayerKind::Text);
    store.add(LayerKind::Text);
    assert_eq!(seen.get(), 2);
}

#[test]
fn mark_loaded_records_natural_size_for_backgrounds() {
    let mut store = LayerStore::starter();
    let id = store.backgrounds()[0].id;
    assert!(!store.has_loaded_background());
    assert!(store.mark_loaded(ImageKind::Background, id, img(1000, 1200), "big.png"));

    let bg = store.background(id).unwrap();
    assert!(bg.loaded);
    assert_eq!((bg.natural_width, bg.natural_height), (1000, 1200));
    assert_eq!((bg.x, bg.y), (50.0, 50.0));
    assert!(store.has_loaded_background());
}

#[test]
fn replace_layers_keeps_future_ids_unique() {
    let mut store = LayerStore::new();
    store.replace_layers(
        vec![BackgroundLayer::new(LayerId(70))],
        vec![],
        vec![TextLayer::new(LayerId(90))],
    );
    let fresh = store.add(LayerKind::Overlay);
    assert!(fresh > LayerId(90));
}
