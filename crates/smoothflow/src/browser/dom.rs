//! [`Surface`] over the live DOM.

use smoothflow_core::{ComputedStyle, ElementRef, Rect, Surface};
use wasm_bindgen::JsCast;
use web_sys::{window, Element, HtmlElement, Window};

/// Geometry and inline-style access through `web_sys`.
pub struct DomSurface {
    window: Window,
}

impl DomSurface {
    /// Surface for the current window, if there is one.
    pub fn new() -> Option<Self> {
        window().map(|window| Self { window })
    }

    fn html(node: &Element) -> Option<&HtmlElement> {
        node.dyn_ref::<HtmlElement>()
    }
}

impl Surface for DomSurface {
    type Node = Element;

    fn resolve(&self, root: &Element, element: &ElementRef<Element>) -> Option<Element> {
        match element {
            ElementRef::Root => Some(root.clone()),
            ElementRef::Node(node) => root.contains(Some(&**node)).then(|| node.clone()),
            ElementRef::Selector(selector) => {
                if root.matches(selector).unwrap_or(false) {
                    return Some(root.clone());
                }
                root.query_selector(selector).ok().flatten()
            }
        }
    }

    fn measure(&self, node: &Element) -> Rect {
        let r = node.get_bounding_client_rect();
        Rect::new(r.top(), r.left(), r.width(), r.height())
    }

    fn computed_style(&self, node: &Element) -> ComputedStyle {
        let Ok(Some(style)) = self.window.get_computed_style(node) else {
            return ComputedStyle::default();
        };
        let read = |property: &str| style.get_property_value(property).unwrap_or_default();
        ComputedStyle {
            overflow_x: read("overflow-x"),
            overflow_y: read("overflow-y"),
            transition: read("transition"),
        }
    }

    fn set_style(&mut self, node: &Element, property: &str, value: Option<&str>) {
        let Some(html) = Self::html(node) else {
            tracing::warn!(property, "cannot style a non-HTML element");
            return;
        };
        let style = html.style();
        let result = match value {
            Some(v) => style.set_property(property, v),
            None => style.remove_property(property).map(drop),
        };
        if let Err(err) = result {
            tracing::warn!(property, ?err, "style write rejected");
        }
    }

    fn force_layout(&mut self, node: &Element) {
        // Reading a layout property flushes pending style changes.
        if let Some(html) = Self::html(node) {
            let _ = html.offset_height();
        }
    }

    fn matches(&self, node: &Element, selector: &str) -> bool {
        node.matches(selector).unwrap_or(false)
    }

    fn describe(&self, node: &Element) -> String {
        let mut label = node.tag_name().to_lowercase();
        let id = node.id();
        if !id.is_empty() {
            label.push('#');
            label.push_str(&id);
        }
        for class in node.class_name().split_whitespace() {
            label.push('.');
            label.push_str(class);
        }
        label
    }
}
