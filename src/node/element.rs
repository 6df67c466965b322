//! Element nodes - tagged native elements with props and children.

use std::rc::Rc;

use crate::types::{InstanceId, NativeId, Props, RefSpec, Value};

use super::Node;

/// A native element descriptor.
///
/// `is_svg` and `namespace` may be preset by the caller, but the
/// materializer computes the effective values from the surrounding tree.
#[derive(Debug, Clone)]
pub struct ElementNode {
    pub tag: Rc<str>,
    pub props: Props,
    pub children: Vec<Node>,
    pub key: Option<Rc<str>>,
    pub ref_: Option<RefSpec>,
    pub is_svg: bool,
    pub namespace: Option<Rc<str>>,
    /// Instance that was rendering when this node was produced.
    pub owner: Option<InstanceId>,
    pub dom: Option<NativeId>,
}

impl ElementNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: Rc::from(tag),
            props: Props::new(),
            children: Vec::new(),
            key: None,
            ref_: None,
            is_svg: false,
            namespace: None,
            owner: None,
            dom: None,
        }
    }

    pub fn prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.set(name, value);
        self
    }

    pub fn props(mut self, props: Props) -> Self {
        self.props = self.props.merge(&props);
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    pub fn key(mut self, key: &str) -> Self {
        self.key = Some(Rc::from(key));
        self
    }

    pub fn with_ref(mut self, spec: RefSpec) -> Self {
        self.ref_ = Some(spec);
        self
    }

    /// Mark this element as SVG regardless of its tag.
    pub fn svg(mut self) -> Self {
        self.is_svg = true;
        self
    }

    pub fn namespace(mut self, uri: &str) -> Self {
        self.namespace = Some(Rc::from(uri));
        self
    }

    pub(crate) fn detached(&self) -> Self {
        Self {
            children: self.children.iter().map(Node::detached).collect(),
            dom: None,
            ..self.clone()
        }
    }
}

impl From<ElementNode> for Node {
    fn from(value: ElementNode) -> Self {
        Node::Element(value)
    }
}
