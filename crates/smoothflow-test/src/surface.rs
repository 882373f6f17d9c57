//! In-memory rendering surface.
//!
//! A small element tree with explicit layout boxes. Layout never reacts to
//! inline styles: tests decide the "natural" geometry of every element and
//! read back the inline overrides the state machine wrote. Every write and
//! every forced layout flush is appended to a journal so tests can check
//! ordering.

use std::collections::BTreeMap;
use std::fmt;

use smoothflow_core::{ComputedStyle, ElementRef, Rect, Surface};

use crate::selector::Selector;

/// Handle to an element in a [`FakeSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Index of the node in creation order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Inline style written (`Some`) or removed (`None`).
    Style {
        /// Target element.
        node: NodeId,
        /// CSS property name.
        property: String,
        /// New value.
        value: Option<String>,
    },
    /// Synchronous layout flush.
    Flush(NodeId),
}

impl Mutation {
    /// Inline style write.
    #[must_use]
    pub fn set(node: NodeId, property: &str, value: &str) -> Self {
        Self::Style {
            node,
            property: property.to_string(),
            value: Some(value.to_string()),
        }
    }

    /// Inline style removal.
    #[must_use]
    pub fn clear(node: NodeId, property: &str) -> Self {
        Self::Style {
            node,
            property: property.to_string(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FakeNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: Rect,
    inline: BTreeMap<String, String>,
    base: ComputedStyle,
}

/// In-memory element tree implementing [`Surface`].
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    nodes: Vec<FakeNode>,
    journal: Vec<Mutation>,
}

impl FakeSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detached element from a compound selector such as
    /// `"div#main.panel[data-testid='x']"`.
    ///
    /// # Panics
    ///
    /// Panics if `descriptor` is not a valid compound selector.
    pub fn create(&mut self, descriptor: &str, layout: Rect) -> NodeId {
        let selector = Selector::parse(descriptor)
            .unwrap_or_else(|e| panic!("invalid element descriptor '{descriptor}': {e}"));
        let mut node = FakeNode {
            tag: "div".to_string(),
            layout,
            base: ComputedStyle {
                overflow_x: "visible".to_string(),
                overflow_y: "visible".to_string(),
                transition: String::new(),
            },
            ..FakeNode::default()
        };
        for part in selector.parts() {
            match part {
                Selector::Type(tag) => node.tag.clone_from(tag),
                Selector::Id(id) => node.id = Some(id.clone()),
                Selector::Class(class) => node.classes.push(class.clone()),
                Selector::TestId(value) => {
                    node.attributes
                        .insert("data-testid".to_string(), value.clone());
                }
                Selector::Attribute { name, value } => {
                    node.attributes.insert(name.clone(), value.clone());
                }
                other => panic!("element descriptor '{descriptor}' must be a compound selector, got {other:?}"),
            }
        }
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detach `node` from its parent. Its subtree stays intact.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Set the natural layout box of `node`.
    pub fn set_layout(&mut self, node: NodeId, layout: Rect) {
        self.nodes[node.0].layout = layout;
    }

    /// Natural layout box of `node`.
    #[must_use]
    pub fn layout(&self, node: NodeId) -> Rect {
        self.nodes[node.0].layout
    }

    /// Transition declared by the element's stylesheet.
    pub fn set_stylesheet_transition(&mut self, node: NodeId, transition: &str) {
        self.nodes[node.0].base.transition = transition.to_string();
    }

    /// Overflow declared by the element's stylesheet.
    pub fn set_stylesheet_overflow(&mut self, node: NodeId, x: &str, y: &str) {
        let base = &mut self.nodes[node.0].base;
        base.overflow_x = x.to_string();
        base.overflow_y = y.to_string();
    }

    /// Add a class to `node`.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.nodes[node.0].classes.push(class.to_string());
        }
    }

    /// Tag name.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    /// `id` attribute.
    #[must_use]
    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].id.as_deref()
    }

    /// Whether `node` has `class`.
    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    /// Attribute value.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    /// Parent of `node`.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    /// Ancestors of `node`, nearest first.
    #[must_use]
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(node);
        while let Some(p) = current {
            out.push(p);
            current = self.parent(p);
        }
        out
    }

    /// Propagation path of an event raised on `node`: the node, then its ancestors.
    #[must_use]
    pub fn path(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        path.extend(self.ancestors(node));
        path
    }

    /// Whether `node` is `root` or inside it.
    #[must_use]
    pub fn is_within(&self, node: NodeId, root: NodeId) -> bool {
        node == root || self.ancestors(node).contains(&root)
    }

    /// First descendant of `root` (pre-order, excluding `root`) matching `selector`.
    #[must_use]
    pub fn query(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        for &child in &self.nodes[root.0].children {
            if selector.matches(self, child) {
                return Some(child);
            }
            if let Some(found) = self.query(child, selector) {
                return Some(found);
            }
        }
        None
    }

    /// Inline style override on `node`.
    #[must_use]
    pub fn inline(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0].inline.get(property).map(String::as_str)
    }

    /// All inline overrides on `node`.
    #[must_use]
    pub fn inline_styles(&self, node: NodeId) -> &BTreeMap<String, String> {
        &self.nodes[node.0].inline
    }

    /// Every style write and flush so far.
    #[must_use]
    pub fn journal(&self) -> &[Mutation] {
        &self.journal
    }

    /// Journal entries for `node` only.
    #[must_use]
    pub fn journal_for(&self, node: NodeId) -> Vec<Mutation> {
        self.journal
            .iter()
            .filter(|m| match m {
                Mutation::Style { node: n, .. } | Mutation::Flush(n) => *n == node,
            })
            .cloned()
            .collect()
    }

    /// Forget recorded mutations.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }
}

impl Surface for FakeSurface {
    type Node = NodeId;

    fn resolve(&self, root: &NodeId, element: &ElementRef<NodeId>) -> Option<NodeId> {
        match element {
            ElementRef::Root => Some(*root),
            ElementRef::Node(node) => self.is_within(*node, *root).then_some(*node),
            ElementRef::Selector(input) => {
                let selector = match Selector::parse(input) {
                    Ok(selector) => selector,
                    Err(err) => {
                        tracing::warn!(selector = %input, "unparseable selector: {err}");
                        return None;
                    }
                };
                if selector.matches(self, *root) {
                    Some(*root)
                } else {
                    self.query(*root, &selector)
                }
            }
        }
    }

    fn measure(&self, node: &NodeId) -> Rect {
        self.layout(*node)
    }

    fn computed_style(&self, node: &NodeId) -> ComputedStyle {
        let n = &self.nodes[node.0];
        let pick = |property: &str, base: &str| {
            n.inline
                .get(property)
                .cloned()
                .unwrap_or_else(|| base.to_string())
        };
        ComputedStyle {
            overflow_x: pick("overflow-x", &n.base.overflow_x),
            overflow_y: pick("overflow-y", &n.base.overflow_y),
            transition: pick("transition", &n.base.transition),
        }
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: Option<&str>) {
        let inline = &mut self.nodes[node.0].inline;
        match value {
            Some(v) => {
                inline.insert(property.to_string(), v.to_string());
            }
            None => {
                inline.remove(property);
            }
        }
        self.journal.push(Mutation::Style {
            node: *node,
            property: property.to_string(),
            value: value.map(str::to_string),
        });
    }

    fn force_layout(&mut self, node: &NodeId) {
        self.journal.push(Mutation::Flush(*node));
    }

    fn matches(&self, node: &NodeId, selector: &str) -> bool {
        Selector::parse(selector).is_ok_and(|s| s.matches(self, *node))
    }

    fn describe(&self, node: &NodeId) -> String {
        let n = &self.nodes[node.0];
        let mut label = n.tag.clone();
        if let Some(id) = &n.id {
            label.push('#');
            label.push_str(id);
        }
        for class in &n.classes {
            label.push('.');
            label.push_str(class);
        }
        label
    }
}
