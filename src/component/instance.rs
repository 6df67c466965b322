//! Component instance records.

use std::fmt;

use indexmap::IndexMap;

use crate::node::Node;
use crate::types::{Context, InstanceId, NativeId, Props, RefTarget, State};

use super::{Component, Scope};

bitflags::bitflags! {
    /// Per-instance scheduling flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InstanceFlags: u8 {
        /// A state change was requested and no update pass has completed since.
        const DIRTY   = 0b01;
        /// Re-entrant updates must not be scheduled (receiving props, unmounting).
        const DISABLE = 0b10;
    }
}

/// Where an instance is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Unmounted,
    Mounting,
    Mounted,
    Updating,
    Unmounting,
}

/// Deferred post-update closure queued by `Scope::set_state_with`.
pub type PendingCallback = Box<dyn FnOnce(&mut Scope<'_>)>;

/// Everything the engine tracks for a mounted component except the
/// component value itself.
pub struct InstanceData {
    pub(crate) name: &'static str,
    pub(crate) props: Props,
    pub(crate) state: State,
    pub(crate) context: Context,
    pub(crate) prev_props: Option<Props>,
    pub(crate) prev_state: Option<State>,
    pub(crate) prev_context: Option<Context>,
    pub(crate) pending_states: Vec<State>,
    pub(crate) pending_callbacks: Vec<PendingCallback>,
    pub(crate) children: Vec<Node>,
    pub(crate) refs: IndexMap<String, RefTarget>,
    pub(crate) dom: Option<NativeId>,
    pub(crate) rendered: Option<Node>,
    pub(crate) flags: InstanceFlags,
    pub(crate) parent: Option<InstanceId>,
    pub(crate) lifecycle: LifecycleState,
}

impl InstanceData {
    pub(crate) fn new(
        name: &'static str,
        props: Props,
        state: State,
        context: Context,
        children: Vec<Node>,
        parent: Option<InstanceId>,
    ) -> Self {
        Self {
            name,
            props,
            state,
            context,
            prev_props: None,
            prev_state: None,
            prev_context: None,
            pending_states: Vec::new(),
            pending_callbacks: Vec::new(),
            children,
            refs: IndexMap::new(),
            dom: None,
            rendered: None,
            flags: InstanceFlags::DIRTY | InstanceFlags::DISABLE,
            parent,
            lifecycle: LifecycleState::Unmounted,
        }
    }

    /// Current state with all pending state requests merged in. Clears the
    /// pending list.
    pub(crate) fn take_next_state(&mut self) -> State {
        self.pending_states
            .drain(..)
            .fold(self.state.clone(), |acc, patch| acc.merge(&patch))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn prev_props(&self) -> Option<&Props> {
        self.prev_props.as_ref()
    }

    pub fn prev_state(&self) -> Option<&State> {
        self.prev_state.as_ref()
    }

    pub fn prev_context(&self) -> Option<&Context> {
        self.prev_context.as_ref()
    }

    pub fn dom(&self) -> Option<NativeId> {
        self.dom
    }

    pub fn rendered(&self) -> Option<&Node> {
        self.rendered.as_ref()
    }

    pub fn flags(&self) -> InstanceFlags {
        self.flags
    }

    pub fn is_dirty(&self) -> bool {
        self.flags.contains(InstanceFlags::DIRTY)
    }

    pub fn is_disabled(&self) -> bool {
        self.flags.contains(InstanceFlags::DISABLE)
    }

    pub fn parent(&self) -> Option<InstanceId> {
        self.parent
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn get_ref(&self, name: &str) -> Option<RefTarget> {
        self.refs.get(name).copied()
    }

    pub fn pending_callbacks(&self) -> usize {
        self.pending_callbacks.len()
    }
}

impl fmt::Debug for InstanceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceData")
            .field("name", &self.name)
            .field("props", &self.props)
            .field("state", &self.state)
            .field("dom", &self.dom)
            .field("flags", &self.flags)
            .field("parent", &self.parent)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

/// A live instance: the user's component plus the engine's bookkeeping.
pub(crate) struct Instance {
    pub(crate) component: Box<dyn Component>,
    pub(crate) data: InstanceData,
}
