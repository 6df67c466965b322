//! Components - the user-facing lifecycle contract.
//!
//! A stateful component implements [`Component`]. Its props, state and
//! context live in the engine's instance record and are reached through
//! the [`Scope`] every hook receives. Hooks return [`HookResult`]; an
//! `Err` is routed to the nearest ancestor that is an [`ErrorBoundary`].
//!
//! # Example
//!
//! ```ignore
//! struct Counter;
//!
//! impl Component for Counter {
//!     fn create(_props: &Props, _context: &Context) -> Self {
//!         Counter
//!     }
//!
//!     fn initial_state(&self, _props: &Props) -> State {
//!         State::new().with("count", 0)
//!     }
//!
//!     fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
//!         let count = scope.state().get("count").and_then(Value::as_int).unwrap_or(0);
//!         Ok(Node::element("span").child(count).into())
//!     }
//! }
//! ```

mod instance;
mod scope;

use std::any::TypeId;
use std::fmt;

pub use instance::{InstanceData, InstanceFlags, LifecycleState, PendingCallback};
pub(crate) use instance::Instance;
pub use scope::Scope;

use crate::error::HookResult;
use crate::node::Node;
use crate::types::{Context, Props, State};

// =============================================================================
// Component trait
// =============================================================================

/// A stateful component.
///
/// Every hook except `render` has a no-op default.
pub trait Component: 'static {
    fn create(props: &Props, context: &Context) -> Self
    where
        Self: Sized;

    fn initial_state(&self, _props: &Props) -> State {
        State::new()
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node>;

    fn will_mount(&mut self, _scope: &mut Scope<'_>) -> HookResult {
        Ok(())
    }

    fn did_mount(&mut self, _scope: &mut Scope<'_>) -> HookResult {
        Ok(())
    }

    fn will_receive_props(
        &mut self,
        _next_props: &Props,
        _next_context: &Context,
        _scope: &mut Scope<'_>,
    ) -> HookResult {
        Ok(())
    }

    /// Evaluated while the scope still exposes the previous props and context.
    /// Errors here are not routed to a boundary.
    fn should_update(
        &mut self,
        _next_props: &Props,
        _next_state: &State,
        _next_context: &Context,
        _scope: &mut Scope<'_>,
    ) -> HookResult<bool> {
        Ok(true)
    }

    fn will_update(
        &mut self,
        _next_props: &Props,
        _next_state: &State,
        _next_context: &Context,
        _scope: &mut Scope<'_>,
    ) -> HookResult {
        Ok(())
    }

    fn did_update(
        &mut self,
        _prev_props: &Props,
        _prev_state: &State,
        _prev_context: &Context,
        _scope: &mut Scope<'_>,
    ) -> HookResult {
        Ok(())
    }

    fn will_unmount(&mut self, _scope: &mut Scope<'_>) -> HookResult {
        Ok(())
    }

    /// Extra context merged over the parent context for descendants.
    fn child_context(&self, _scope: &Scope<'_>) -> Option<Context> {
        None
    }

    /// Boundary capability. Components that recover from descendant
    /// failures return `Some(self)`.
    fn as_boundary(&mut self) -> Option<&mut dyn ErrorBoundary> {
        None
    }
}

/// A component that recovers from errors thrown below it.
pub trait ErrorBoundary {
    /// Runs with the boundary's re-entrancy guard lifted, so state requests
    /// made here schedule a render.
    fn did_catch(&mut self, error: &anyhow::Error, scope: &mut Scope<'_>);
}

// =============================================================================
// Component identity
// =============================================================================

/// Identity and constructor of a stateful component type.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    construct: fn(&Props, &Context) -> Box<dyn Component>,
}

fn construct<C: Component>(props: &Props, context: &Context) -> Box<dyn Component> {
    Box::new(C::create(props, context))
}

impl ComponentType {
    pub fn of<C: Component>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: short_type_name(std::any::type_name::<C>()),
            construct: construct::<C>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn instantiate(&self, props: &Props, context: &Context) -> Box<dyn Component> {
        (self.construct)(props, context)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    full.rsplit("::").next().unwrap_or(full)
}

/// Render function of a stateless component.
pub type StatelessFn = fn(&Props, &Context) -> HookResult<Node>;
