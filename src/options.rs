//! Engine options and lifecycle extension points.

use std::fmt;
use std::rc::Rc;

use crate::node::ComponentNode;
use crate::types::InstanceId;

/// How the engine decides whether to create namespaced (SVG) elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvgSupport {
    /// Ask the host once, at engine construction.
    #[default]
    Detect,
    /// Never create namespaced elements.
    Disabled,
}

/// Extension points invoked unconditionally at fixed lifecycle moments.
pub trait LifecycleObserver {
    fn after_mount(&self, _node: &ComponentNode) {}

    fn after_update(&self, _id: InstanceId) {}

    fn before_unmount(&self, _id: InstanceId) {}
}

#[derive(Debug, Default)]
pub struct NoopObserver;

impl LifecycleObserver for NoopObserver {}

#[derive(Clone)]
pub struct Options {
    pub svg: SvgSupport,
    pub observer: Rc<dyn LifecycleObserver>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            svg: SvgSupport::Detect,
            observer: Rc::new(NoopObserver),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn svg(mut self, svg: SvgSupport) -> Self {
        self.svg = svg;
        self
    }

    pub fn observer(mut self, observer: impl LifecycleObserver + 'static) -> Self {
        self.observer = Rc::new(observer);
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("svg", &self.svg)
            .finish_non_exhaustive()
    }
}
