//! Browser event handling - converts `transitionend` events to completion signals.

use smoothflow_core::TransitionEnd;
use wasm_bindgen::JsCast;
use web_sys::{Element, TransitionEvent};

/// Convert a `transitionend` event to a [`TransitionEnd`].
///
/// The composed path is captured at dispatch time, so it still contains the
/// ancestors of a target that has since been removed from the document.
pub fn transition_end_to_signal(event: &TransitionEvent) -> Option<TransitionEnd<Element>> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let path: Vec<Element> = event
        .composed_path()
        .iter()
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect();

    let signal = TransitionEnd::new(target, event.property_name());
    Some(if path.is_empty() {
        signal
    } else {
        signal.with_path(path)
    })
}
