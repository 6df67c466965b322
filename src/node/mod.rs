//! Node Model - declarative tree descriptors.
//!
//! A [`Node`] describes what should exist at a position in the rendered
//! tree. Nodes are plain values: the engine records mount bookkeeping
//! (`dom`, `instance`, `rendered`) on them while they are live.
//!
//! # Example
//!
//! ```ignore
//! use spark_vdom::node::{ElementNode, Node};
//!
//! let tree: Node = ElementNode::new("ul")
//!     .prop("class", "list")
//!     .child(ElementNode::new("li").child("one"))
//!     .child(ElementNode::new("li").child("two"))
//!     .into();
//! ```

mod component;
mod element;

use std::fmt;
use std::rc::Rc;

pub use component::{ComponentNode, StatelessNode};
pub use element::ElementNode;

use crate::component::{Component, StatelessFn};
use crate::host::Host;
use crate::types::{Context, InstanceId, NativeId, Props, RefSpec};

// =============================================================================
// Leaf nodes
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub text: String,
    pub dom: Option<NativeId>,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            dom: None,
        }
    }
}

/// Placeholder for a component that rendered nothing. Keeps the component's
/// native anchor across updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoidNode {
    pub dom: Option<NativeId>,
}

/// A node that creates its own native content.
pub trait Widget {
    fn init(&self, host: &mut dyn Host, context: &Context) -> NativeId;

    /// Called when a widget of the same identity replaces this one.
    fn update(&self, _host: &mut dyn Host, anchor: NativeId) -> NativeId {
        anchor
    }

    fn destroy(&self, _host: &mut dyn Host, _dom: NativeId) {}
}

#[derive(Clone)]
pub struct WidgetNode {
    pub widget: Rc<dyn Widget>,
    pub dom: Option<NativeId>,
}

impl fmt::Debug for WidgetNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetNode").field("dom", &self.dom).finish_non_exhaustive()
    }
}

// =============================================================================
// Node
// =============================================================================

/// A declarative tree descriptor.
#[derive(Debug, Clone)]
pub enum Node {
    /// null / undefined / false. Materializes to an empty text node.
    Empty,
    Text(TextNode),
    Void(VoidNode),
    Widget(WidgetNode),
    Element(ElementNode),
    Component(ComponentNode),
    Stateless(StatelessNode),
    Fragment(Vec<Node>),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextNode::new(text))
    }

    pub fn element(tag: &str) -> ElementNode {
        ElementNode::new(tag)
    }

    pub fn component<C: Component>(props: Props) -> ComponentNode {
        ComponentNode::new::<C>(props)
    }

    pub fn stateless(name: &'static str, render: StatelessFn, props: Props) -> StatelessNode {
        StatelessNode::new(name, render, props)
    }

    /// "Rendered nothing" placeholder.
    pub fn void() -> Self {
        Node::Void(VoidNode::default())
    }

    pub fn fragment(children: impl IntoIterator<Item = Node>) -> Self {
        Node::Fragment(children.into_iter().collect())
    }

    pub fn widget(widget: impl Widget + 'static) -> Self {
        Node::Widget(WidgetNode {
            widget: Rc::new(widget),
            dom: None,
        })
    }

    /// Short name of the variant, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Empty => "empty",
            Node::Text(_) => "text",
            Node::Void(_) => "void",
            Node::Widget(_) => "widget",
            Node::Element(_) => "element",
            Node::Component(_) => "component",
            Node::Stateless(_) => "stateless",
            Node::Fragment(_) => "fragment",
        }
    }

    /// Entries skipped inside fragments.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Native node recorded by the last mount or patch.
    pub fn dom(&self) -> Option<NativeId> {
        match self {
            Node::Empty | Node::Fragment(_) => None,
            Node::Text(t) => t.dom,
            Node::Void(v) => v.dom,
            Node::Widget(w) => w.dom,
            Node::Element(el) => el.dom,
            Node::Component(c) => c.dom,
            Node::Stateless(s) => s.dom,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            Node::Element(el) => el.key.as_deref(),
            Node::Component(c) => c.key.as_deref(),
            Node::Stateless(s) => s.key.as_deref(),
            _ => None,
        }
    }

    pub fn ref_spec(&self) -> Option<&RefSpec> {
        match self {
            Node::Element(el) => el.ref_.as_ref(),
            Node::Component(c) => c.ref_.as_ref(),
            Node::Stateless(s) => s.ref_.as_ref(),
            _ => None,
        }
    }

    /// Attach a ref descriptor. Returns false for nodes that cannot carry one.
    pub fn set_ref(&mut self, spec: RefSpec) -> bool {
        match self {
            Node::Element(el) => el.ref_ = Some(spec),
            Node::Component(c) => c.ref_ = Some(spec),
            Node::Stateless(s) => s.ref_ = Some(spec),
            _ => return false,
        }
        true
    }

    /// Stamp `owner` onto every node in this tree that has none yet.
    ///
    /// Nodes that already carry an owner were produced by another render
    /// (children passed down through props) and keep it, along with their
    /// subtree.
    pub(crate) fn adopt(&mut self, owner: InstanceId) {
        match self {
            Node::Element(el) if el.owner.is_none() => {
                el.owner = Some(owner);
                for child in &mut el.children {
                    child.adopt(owner);
                }
            }
            Node::Component(c) if c.owner.is_none() => {
                c.owner = Some(owner);
                for child in &mut c.children {
                    child.adopt(owner);
                }
            }
            Node::Stateless(s) if s.owner.is_none() => s.owner = Some(owner),
            Node::Fragment(children) => {
                for child in children {
                    child.adopt(owner);
                }
            }
            _ => {}
        }
    }

    /// Deep copy without mount bookkeeping, safe to mount again.
    pub fn detached(&self) -> Node {
        match self {
            Node::Empty => Node::Empty,
            Node::Text(t) => Node::text(t.text.clone()),
            Node::Void(_) => Node::void(),
            Node::Widget(w) => Node::Widget(WidgetNode {
                widget: Rc::clone(&w.widget),
                dom: None,
            }),
            Node::Element(el) => Node::Element(el.detached()),
            Node::Component(c) => Node::Component(c.detached()),
            Node::Stateless(s) => Node::Stateless(s.detached()),
            Node::Fragment(children) => Node::Fragment(children.iter().map(Node::detached).collect()),
        }
    }

    /// Copy this node with `props` merged over its own and, when given,
    /// `children` replacing its children. The namespace is preserved.
    pub fn clone_element(&self, props: &Props, children: Option<Vec<Node>>) -> Node {
        match self {
            Node::Element(el) => {
                let mut copy = el.detached();
                copy.props = copy.props.merge(props);
                if let Some(children) = children {
                    copy.children = children;
                }
                Node::Element(copy)
            }
            Node::Component(c) => {
                let mut copy = c.detached();
                copy.props = copy.props.merge(props);
                if let Some(children) = children {
                    copy.children = children;
                }
                Node::Component(copy)
            }
            Node::Stateless(s) => {
                let mut copy = s.detached();
                copy.props = copy.props.merge(props);
                Node::Stateless(copy)
            }
            other => other.detached(),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::text(value)
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::text(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::text(value.to_string())
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::text(value.to_string())
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::text(value.to_string())
    }
}

impl From<TextNode> for Node {
    fn from(value: TextNode) -> Self {
        Node::Text(value)
    }
}

impl<N: Into<Node>> From<Option<N>> for Node {
    fn from(value: Option<N>) -> Self {
        value.map_or(Node::Empty, Into::into)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::Fragment(value)
    }
}
