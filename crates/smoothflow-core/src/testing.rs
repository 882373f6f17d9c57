//! Minimal in-memory surface for unit tests.
//!
//! Only class selectors (`.name`) are understood. The full-featured
//! surface lives in `smoothflow-test`.

use std::collections::{BTreeMap, HashMap};

use crate::config::ElementRef;
use crate::geometry::Rect;
use crate::surface::{ComputedStyle, Surface};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StyleOp {
    Set(u32, String, Option<String>),
    Flush(u32),
}

impl StyleOp {
    pub(crate) fn set(node: u32, property: &str, value: &str) -> Self {
        Self::Set(node, property.to_string(), Some(value.to_string()))
    }

    pub(crate) fn clear(node: u32, property: &str) -> Self {
        Self::Set(node, property.to_string(), None)
    }
}

#[derive(Debug, Default)]
pub(crate) struct MockSurface {
    parents: BTreeMap<u32, Option<u32>>,
    classes: HashMap<u32, String>,
    layout: HashMap<u32, Rect>,
    inline: HashMap<(u32, String), String>,
    pub(crate) computed: HashMap<u32, String>,
    pub(crate) journal: Vec<StyleOp>,
}

impl MockSurface {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, id: u32, parent: Option<u32>, class: &str, rect: Rect) {
        self.parents.insert(id, parent);
        self.classes.insert(id, class.to_string());
        self.layout.insert(id, rect);
    }

    pub(crate) fn set_layout(&mut self, id: u32, rect: Rect) {
        self.layout.insert(id, rect);
    }

    pub(crate) fn detach(&mut self, id: u32) {
        self.parents.insert(id, None);
    }

    pub(crate) fn attach(&mut self, id: u32, parent: u32) {
        self.parents.insert(id, Some(parent));
    }

    pub(crate) fn inline(&self, id: u32, property: &str) -> Option<&str> {
        self.inline
            .get(&(id, property.to_string()))
            .map(String::as_str)
    }

    fn is_descendant(&self, id: u32, ancestor: u32) -> bool {
        let mut current = self.parents.get(&id).copied().flatten();
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parents.get(&p).copied().flatten();
        }
        false
    }
}

impl Surface for MockSurface {
    type Node = u32;

    fn resolve(&self, root: &u32, element: &ElementRef<u32>) -> Option<u32> {
        match element {
            ElementRef::Root => Some(*root),
            ElementRef::Node(n) => Some(*n),
            ElementRef::Selector(selector) => {
                if self.matches(root, selector) {
                    return Some(*root);
                }
                self.parents
                    .keys()
                    .copied()
                    .find(|&id| self.is_descendant(id, *root) && self.matches(&id, selector))
            }
        }
    }

    fn measure(&self, node: &u32) -> Rect {
        self.layout.get(node).copied().unwrap_or_default()
    }

    fn computed_style(&self, node: &u32) -> ComputedStyle {
        let overflow = |p: &str| self.inline(*node, p).unwrap_or("visible").to_string();
        ComputedStyle {
            overflow_x: overflow("overflow-x"),
            overflow_y: overflow("overflow-y"),
            transition: self.computed.get(node).cloned().unwrap_or_default(),
        }
    }

    fn set_style(&mut self, node: &u32, property: &str, value: Option<&str>) {
        let key = (*node, property.to_string());
        match value {
            Some(v) => {
                self.inline.insert(key, v.to_string());
            }
            None => {
                self.inline.remove(&key);
            }
        }
        self.journal.push(StyleOp::Set(
            *node,
            property.to_string(),
            value.map(str::to_string),
        ));
    }

    fn force_layout(&mut self, node: &u32) {
        self.journal.push(StyleOp::Flush(*node));
    }

    fn matches(&self, node: &u32, selector: &str) -> bool {
        selector
            .strip_prefix('.')
            .is_some_and(|class| self.classes.get(node).is_some_and(|c| c == class))
    }
}
