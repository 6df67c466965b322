//! Component nodes - stateful and stateless.

use std::rc::Rc;

use crate::component::{Component, ComponentType, StatelessFn};
use crate::types::{InstanceId, NativeId, Props, RefSpec, Value};

use super::Node;

// =============================================================================
// Stateful
// =============================================================================

/// Descriptor for a stateful component.
///
/// Once mounted, `instance` names the backing instance in the registry.
/// On update the instance moves from the previous node to the next one.
#[derive(Debug, Clone)]
pub struct ComponentNode {
    pub ty: ComponentType,
    pub props: Props,
    pub children: Vec<Node>,
    pub key: Option<Rc<str>>,
    pub ref_: Option<RefSpec>,
    pub owner: Option<InstanceId>,
    pub instance: Option<InstanceId>,
    pub dom: Option<NativeId>,
}

impl ComponentNode {
    pub fn new<C: Component>(props: Props) -> Self {
        Self::of(ComponentType::of::<C>(), props)
    }

    pub fn of(ty: ComponentType, props: Props) -> Self {
        Self {
            ty,
            props,
            children: Vec::new(),
            key: None,
            ref_: None,
            owner: None,
            instance: None,
            dom: None,
        }
    }

    pub fn prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.set(name, value);
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
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

    pub(crate) fn detached(&self) -> Self {
        Self {
            children: self.children.iter().map(Node::detached).collect(),
            instance: None,
            dom: None,
            ..self.clone()
        }
    }
}

impl From<ComponentNode> for Node {
    fn from(value: ComponentNode) -> Self {
        Node::Component(value)
    }
}

// =============================================================================
// Stateless
// =============================================================================

/// Descriptor for a stateless (function) component.
#[derive(Debug, Clone)]
pub struct StatelessNode {
    pub name: &'static str,
    pub render: StatelessFn,
    pub props: Props,
    pub key: Option<Rc<str>>,
    pub ref_: Option<RefSpec>,
    pub owner: Option<InstanceId>,
    /// Tree produced by the last call to `render`.
    pub rendered: Option<Box<Node>>,
    pub dom: Option<NativeId>,
}

impl StatelessNode {
    pub fn new(name: &'static str, render: StatelessFn, props: Props) -> Self {
        Self {
            name,
            render,
            props,
            key: None,
            ref_: None,
            owner: None,
            rendered: None,
            dom: None,
        }
    }

    pub fn prop(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.props.set(name, value);
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

    /// Both nodes render with the same function.
    pub fn same_render(&self, other: &StatelessNode) -> bool {
        std::ptr::fn_addr_eq(self.render, other.render)
    }

    pub(crate) fn detached(&self) -> Self {
        Self {
            rendered: None,
            dom: None,
            ..self.clone()
        }
    }
}

impl From<StatelessNode> for Node {
    fn from(value: StatelessNode) -> Self {
        Node::Stateless(value)
    }
}
