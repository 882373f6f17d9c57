//! End-to-end update-cycle scenarios driven through the harness.

use proptest::prelude::*;
use smoothflow_core::{
    CompletionFilter, ElementRef, Rect, ReflowError, ReflowOptions, ReflowState, WatchedProperty,
};
use smoothflow_test::{Harness, Mutation, NodeId};

fn host() -> Harness {
    let mut h = Harness::new("div#app", Rect::new(0.0, 0.0, 800.0, 600.0));
    h.mount();
    h
}

fn sel(selector: &str) -> ElementRef<NodeId> {
    ElementRef::Selector(selector.to_string())
}

// =============================================================================
// Height
// =============================================================================

#[test]
fn test_height_grows_from_50_to_120() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.register(ReflowOptions::new().selector(".list")).unwrap();

    let started = h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 120.0)));
    assert_eq!(started, 1);

    assert_eq!(
        h.surface().journal_for(list),
        vec![
            Mutation::set(list, "overflow-x", "hidden"),
            Mutation::set(list, "overflow-y", "hidden"),
            Mutation::set(list, "height", "50px"),
            Mutation::Flush(list),
            Mutation::set(list, "transition", "height .5s"),
            Mutation::set(list, "height", "120px"),
        ]
    );
    h.assert_state(0, ReflowState::Active);

    h.complete(list, "height");
    h.assert_state(0, ReflowState::Inactive)
        .assert_inline(list, "height", None)
        .assert_inline(list, "transition", None)
        .assert_inline(list, "overflow-x", Some("visible"))
        .assert_inline(list, "overflow-y", Some("visible"));
}

#[test]
fn test_shrinking_height_plays_in_reverse() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 120.0));
    h.register(ReflowOptions::new().selector(".list").hide_scrollbar(false))
        .unwrap();

    h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 50.0)));
    assert_eq!(
        h.surface().journal_for(list),
        vec![
            Mutation::set(list, "height", "120px"),
            Mutation::Flush(list),
            Mutation::set(list, "transition", "height .5s"),
            Mutation::set(list, "height", "50px"),
        ]
    );
}

#[test]
fn test_unchanged_geometry_writes_nothing() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.register(ReflowOptions::new().selector(".list")).unwrap();

    // Width and position move, but only height is watched.
    let started = h.update(|s| s.set_layout(list, Rect::new(30.0, 10.0, 200.0, 50.0)));
    assert_eq!(started, 0);
    assert!(h.surface().journal().is_empty());
    h.assert_state(0, ReflowState::Inactive);
}

#[test]
fn test_stylesheet_transition_is_preserved() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.surface_mut()
        .set_stylesheet_transition(list, "opacity 1s");
    h.register(ReflowOptions::new().selector(".list")).unwrap();

    h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 80.0)));
    h.assert_inline(list, "transition", Some("opacity 1s,height .5s"));
}

#[test]
fn test_custom_transition_replaces_default() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.register(
        ReflowOptions::new()
            .selector(".list")
            .transition("height 250ms ease-in-out"),
    )
    .unwrap();

    h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 80.0)));
    h.assert_inline(list, "transition", Some("height 250ms ease-in-out"));
}

#[test]
fn test_stylesheet_overflow_is_restored() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.surface_mut().set_stylesheet_overflow(list, "auto", "scroll");
    h.register(ReflowOptions::new().selector(".list")).unwrap();

    h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 80.0)));
    h.assert_inline(list, "overflow-y", Some("hidden"));

    h.complete(list, "height");
    h.assert_inline(list, "overflow-x", Some("auto"))
        .assert_inline(list, "overflow-y", Some("scroll"));
}

// =============================================================================
// Transform
// =============================================================================

#[test]
fn test_transform_moves_down_by_30() {
    let mut h = host();
    let root = h.root();
    let item = h.spawn(root, "li#second", Rect::new(10.0, 0.0, 100.0, 20.0));
    h.register(
        ReflowOptions::new()
            .selector("#second")
            .properties([WatchedProperty::Transform])
            .hide_scrollbar(false),
    )
    .unwrap();

    let started = h.update(|s| s.set_layout(item, Rect::new(40.0, 0.0, 100.0, 20.0)));
    assert_eq!(started, 1);
    assert_eq!(
        h.surface().journal_for(item),
        vec![
            Mutation::set(item, "transform", "translate(0px, -30px)"),
            Mutation::Flush(item),
            Mutation::set(item, "transition", "transform .5s"),
            Mutation::clear(item, "transform"),
        ]
    );

    h.complete(item, "transform");
    h.assert_state(0, ReflowState::Inactive).assert_clean(item);
}

#[test]
fn test_transform_with_size_watches_both() {
    let mut h = host();
    let root = h.root();
    let card = h.spawn(root, "div.card", Rect::new(0.0, 0.0, 100.0, 100.0));
    h.register(
        ReflowOptions::new()
            .selector(".card")
            .properties([WatchedProperty::Transform, WatchedProperty::Width])
            .hide_scrollbar(false),
    )
    .unwrap();

    h.update(|s| s.set_layout(card, Rect::new(0.0, 50.0, 200.0, 100.0)));
    h.assert_inline(card, "transform", None)
        .assert_inline(card, "width", Some("200px"))
        .assert_inline(card, "transition", Some("transform .5s,width .5s"));
    assert!(h
        .surface()
        .journal()
        .contains(&Mutation::set(card, "transform", "translate(-50px, 0px)")));
}

// =============================================================================
// Registration and removal
// =============================================================================

#[test]
fn test_element_removed_between_phases() {
    let mut h = host();
    let root = h.root();
    let a = h.spawn(root, "div.a", Rect::new(0.0, 0.0, 100.0, 40.0));
    let b = h.spawn(root, "div.b", Rect::new(40.0, 0.0, 100.0, 40.0));
    h.register_all([
        ReflowOptions::new().selector(".a"),
        ReflowOptions::new().selector(".b"),
    ])
    .unwrap();

    h.before_update();
    h.surface_mut()
        .set_layout(a, Rect::new(0.0, 0.0, 100.0, 90.0));
    h.surface_mut()
        .set_layout(b, Rect::new(90.0, 0.0, 100.0, 10.0));
    h.unregister(&sel(".a")).unwrap();

    assert_eq!(h.after_update(), 1);
    h.assert_tracked(1)
        .assert_clean(a)
        .assert_state(0, ReflowState::Active)
        .assert_inline(b, "height", Some("10px"));
}

#[test]
fn test_unregister_active_element_reverts_at_next_before_phase() {
    let mut h = host();
    let root = h.root();
    let a = h.spawn(root, "div.a", Rect::new(0.0, 0.0, 100.0, 40.0));
    h.register(ReflowOptions::new().selector(".a")).unwrap();
    h.update(|s| s.set_layout(a, Rect::new(0.0, 0.0, 100.0, 90.0)));

    h.unregister(&ElementRef::Node(a)).unwrap();
    h.assert_tracked(1).assert_inline(a, "height", Some("90px"));

    h.before_update();
    h.assert_tracked(0)
        .assert_inline(a, "height", None)
        .assert_inline(a, "transition", None);
}

#[test]
fn test_unregister_unknown_element_fails() {
    let mut h = host();
    let root = h.root();
    h.spawn(root, "div.a", Rect::new(0.0, 0.0, 100.0, 40.0));
    h.register(ReflowOptions::new().selector(".a")).unwrap();

    let result = h.unregister(&sel(".nowhere"));
    assert!(matches!(result, Err(ReflowError::NotRegistered { .. })));
    h.assert_tracked(1);
}

#[test]
fn test_unregister_twice_fails_second_time() {
    let mut h = host();
    let root = h.root();
    h.spawn(root, "div.a", Rect::new(0.0, 0.0, 100.0, 40.0));
    h.register(ReflowOptions::new().selector(".a")).unwrap();

    assert!(h.unregister(&sel(".a")).is_ok());
    assert!(h.unregister(&sel(".a")).is_err());
}

#[test]
fn test_invalid_registration_is_rejected() {
    let mut h = host();
    let result = h.register(ReflowOptions::new().selector("  "));
    assert!(matches!(result, Err(ReflowError::InvalidConfig(_))));
    h.assert_tracked(0);
}

#[test]
fn test_root_registration_tracks_host_root() {
    let mut h = host();
    let root = h.root();
    h.register(ReflowOptions::new()).unwrap();

    h.update(|s| s.set_layout(root, Rect::new(0.0, 0.0, 800.0, 640.0)));
    h.assert_inline(root, "height", Some("640px"));
}

// =============================================================================
// Absent targets
// =============================================================================

#[test]
fn test_missing_target_is_skipped() {
    let mut h = host();
    h.register(ReflowOptions::new().selector(".ghost")).unwrap();
    assert_eq!(h.update(|_| {}), 0);
    h.assert_state(0, ReflowState::Inactive);
    assert!(h.surface().journal().is_empty());
}

#[test]
fn test_target_removed_during_mutation() {
    let mut h = host();
    let root = h.root();
    let panel = h.spawn(root, "div.panel", Rect::new(0.0, 0.0, 100.0, 40.0));
    h.register(ReflowOptions::new().selector(".panel")).unwrap();

    assert_eq!(h.update(|s| s.remove(panel)), 0);
    h.assert_state(0, ReflowState::Inactive);
    assert!(h.surface().journal().is_empty());
}

#[test]
fn test_target_appearing_has_nothing_to_invert() {
    let mut h = host();
    let root = h.root();
    h.register(ReflowOptions::new().selector(".late")).unwrap();

    let started = h.update(|s| {
        let late = s.create("div.late", Rect::new(0.0, 0.0, 100.0, 70.0));
        s.append(root, late);
    });
    assert_eq!(started, 0);
    assert!(h.surface().journal().is_empty());
}

// =============================================================================
// Interruption and chaining
// =============================================================================

#[test]
fn test_interrupted_transition_restarts_from_current_geometry() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.register(ReflowOptions::new().selector(".list").hide_scrollbar(false))
        .unwrap();

    h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 120.0)));
    h.surface_mut().clear_journal();

    // A new update arrives before the first transition completed.
    let started = h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 200.0)));
    assert_eq!(started, 1);
    assert_eq!(
        h.surface().journal_for(list),
        vec![
            Mutation::clear(list, "height"),
            Mutation::clear(list, "transition"),
            Mutation::set(list, "height", "120px"),
            Mutation::Flush(list),
            Mutation::set(list, "transition", "height .5s"),
            Mutation::set(list, "height", "200px"),
        ]
    );
}

#[test]
fn test_unwatched_completion_on_own_target_is_ignored() {
    let mut h = host();
    let root = h.root();
    let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.register(ReflowOptions::new().selector(".list")).unwrap();
    h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 300.0, 120.0)));

    h.complete(list, "opacity");
    h.assert_state(0, ReflowState::Active)
        .assert_inline(list, "height", Some("120px"));
}

#[test]
fn test_chained_transition_after_completion() {
    let mut h = host();
    let root = h.root();
    let panel = h.spawn(root, "div.panel", Rect::new(0.0, 0.0, 300.0, 50.0));
    let body = h.spawn(panel, "div.body", Rect::new(0.0, 0.0, 300.0, 50.0));
    h.register(
        ReflowOptions::new()
            .selector(".panel")
            .hide_scrollbar(false)
            .transition_event(CompletionFilter::default().with_property_name("opacity")),
    )
    .unwrap();

    h.update(|s| s.set_layout(panel, Rect::new(0.0, 0.0, 300.0, 120.0)));
    h.complete(panel, "height");
    h.assert_state(0, ReflowState::Inactive);

    // The body fades in and pushes the panel further without a host update.
    h.surface_mut()
        .set_layout(panel, Rect::new(0.0, 0.0, 300.0, 200.0));
    h.surface_mut().clear_journal();
    h.complete(body, "opacity");

    h.assert_state(0, ReflowState::Active);
    assert_eq!(
        h.surface().journal_for(panel),
        vec![
            Mutation::set(panel, "height", "120px"),
            Mutation::Flush(panel),
            Mutation::set(panel, "transition", "height .5s"),
            Mutation::set(panel, "height", "200px"),
        ]
    );
}

// =============================================================================
// Completion filters
// =============================================================================

struct Accordion {
    h: Harness,
    panel: NodeId,
    body: NodeId,
    sibling: NodeId,
}

fn accordion(filter: Option<CompletionFilter>, properties: &[WatchedProperty]) -> Accordion {
    let mut h = host();
    let root = h.root();
    let panel = h.spawn(root, "section.panel", Rect::new(0.0, 0.0, 300.0, 50.0));
    let body = h.spawn(panel, "div.body.fade", Rect::new(0.0, 0.0, 300.0, 50.0));
    let sibling = h.spawn(root, "div.sibling.fade", Rect::new(60.0, 0.0, 300.0, 50.0));

    let mut options = ReflowOptions::new()
        .selector(".panel")
        .properties(properties.iter().copied())
        .hide_scrollbar(false);
    if let Some(filter) = filter {
        options = options.transition_event(filter);
    }
    h.register(options).unwrap();

    // Capture the resting geometry.
    assert_eq!(h.update(|_| {}), 0);
    h.surface_mut()
        .set_layout(panel, Rect::new(20.0, 0.0, 300.0, 90.0));

    Accordion {
        h,
        panel,
        body,
        sibling,
    }
}

#[test]
fn test_descendant_signal_triggers_reflow() {
    let mut a = accordion(
        Some(CompletionFilter::selector(".fade").with_property_name("opacity")),
        &[WatchedProperty::Height],
    );
    a.h.complete(a.body, "opacity");
    a.h.assert_state(0, ReflowState::Active)
        .assert_inline(a.panel, "height", Some("90px"));
}

#[test]
fn test_signal_without_filter_is_ignored() {
    let mut a = accordion(None, &[WatchedProperty::Height]);
    a.h.complete(a.body, "opacity");
    a.h.assert_state(0, ReflowState::Inactive).assert_clean(a.panel);
}

#[test]
fn test_filter_property_name_must_match() {
    let mut a = accordion(
        Some(CompletionFilter::selector(".fade").with_property_name("opacity")),
        &[WatchedProperty::Height],
    );
    a.h.complete(a.body, "color");
    a.h.assert_state(0, ReflowState::Inactive);
}

#[test]
fn test_filter_selector_must_match() {
    let mut a = accordion(
        Some(CompletionFilter::selector(".slide")),
        &[WatchedProperty::Height],
    );
    a.h.complete(a.body, "opacity");
    a.h.assert_state(0, ReflowState::Inactive);
}

#[test]
fn test_outside_signal_ignored_for_size_watch() {
    let mut a = accordion(
        Some(CompletionFilter::selector(".fade")),
        &[WatchedProperty::Height],
    );
    a.h.complete(a.sibling, "opacity");
    a.h.assert_state(0, ReflowState::Inactive);
}

#[test]
fn test_outside_signal_accepted_for_transform_watch() {
    let mut a = accordion(
        Some(CompletionFilter::selector(".fade")),
        &[WatchedProperty::Transform],
    );
    a.h.complete(a.sibling, "opacity");
    a.h.assert_state(0, ReflowState::Active);
    assert!(a
        .h
        .surface()
        .journal()
        .contains(&Mutation::set(a.panel, "transform", "translate(0px, -20px)")));
}

#[test]
fn test_detached_descendant_uses_captured_path() {
    let mut a = accordion(
        Some(CompletionFilter::selector(".fade")),
        &[WatchedProperty::Height],
    );
    let path = a.h.surface().path(a.body);
    a.h.surface_mut().remove(a.body);

    a.h.complete_with_path(a.body, "opacity", path);
    a.h.assert_state(0, ReflowState::Active);
}

#[test]
fn test_external_signal_while_active_is_ignored() {
    let mut a = accordion(
        Some(CompletionFilter::selector(".fade")),
        &[WatchedProperty::Height],
    );
    a.h.complete(a.body, "opacity");
    a.h.surface_mut().clear_journal();

    a.h.complete(a.body, "opacity");
    a.h.assert_state(0, ReflowState::Active);
    assert!(a.h.surface().journal().is_empty());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_completion_always_cleans_up(from in 1u32..400, to in 1u32..400, hide in any::<bool>()) {
        prop_assume!(from != to);
        let mut h = host();
        let root = h.root();
        let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 100.0, f64::from(from)));
        h.register(ReflowOptions::new().selector(".list").hide_scrollbar(hide)).unwrap();

        h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 100.0, f64::from(to))));
        h.complete(list, "height");

        let styles = h.surface().inline_styles(list);
        prop_assert!(!styles.contains_key("height"));
        prop_assert!(!styles.contains_key("transition"));
        prop_assert_eq!(h.orchestrator().state_of(0), Some(ReflowState::Inactive));
    }

    #[test]
    fn prop_start_value_is_before_height(from in 1u32..400, to in 1u32..400) {
        prop_assume!(from != to);
        let mut h = host();
        let root = h.root();
        let list = h.spawn(root, "ul.list", Rect::new(0.0, 0.0, 100.0, f64::from(from)));
        h.register(ReflowOptions::new().selector(".list").hide_scrollbar(false)).unwrap();

        h.update(|s| s.set_layout(list, Rect::new(0.0, 0.0, 100.0, f64::from(to))));
        let journal = h.surface().journal_for(list);
        let start = Mutation::set(list, "height", &format!("{from}px"));
        prop_assert_eq!(journal.first(), Some(&start));
    }
}
