//! Scope - a hook's view of its own instance.

use crate::engine::RenderQueue;
use crate::node::Node;
use crate::types::{Context, InstanceId, Props, RefTarget, State};

use super::{InstanceData, InstanceFlags};

/// Handle passed to every lifecycle hook and to `render`.
///
/// Reads go straight to the instance record. State requests are queued and
/// applied by the next update pass.
pub struct Scope<'a> {
    id: InstanceId,
    data: &'a mut InstanceData,
    queue: &'a mut RenderQueue,
    owner: Option<InstanceId>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(
        id: InstanceId,
        data: &'a mut InstanceData,
        queue: &'a mut RenderQueue,
        owner: Option<InstanceId>,
    ) -> Self {
        Self {
            id,
            data,
            queue,
            owner,
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn props(&self) -> &Props {
        &self.data.props
    }

    pub fn state(&self) -> &State {
        &self.data.state
    }

    pub fn context(&self) -> &Context {
        &self.data.context
    }

    pub fn prev_props(&self) -> Option<&Props> {
        self.data.prev_props.as_ref()
    }

    pub fn prev_state(&self) -> Option<&State> {
        self.data.prev_state.as_ref()
    }

    pub fn prev_context(&self) -> Option<&Context> {
        self.data.prev_context.as_ref()
    }

    /// Fresh, mountable copies of the children passed to this component.
    pub fn children(&self) -> Vec<Node> {
        self.data.children.iter().map(Node::detached).collect()
    }

    /// Named ref resolved against this instance.
    pub fn get_ref(&self, name: &str) -> Option<RefTarget> {
        self.data.get_ref(name)
    }

    /// Instance currently inside `render`, if any.
    pub fn owner(&self) -> Option<InstanceId> {
        self.owner
    }

    pub fn is_dirty(&self) -> bool {
        self.data.is_dirty()
    }

    pub fn is_disabled(&self) -> bool {
        self.data.is_disabled()
    }

    /// Request a state change, merged over the current state at the next
    /// update pass.
    pub fn set_state(&mut self, patch: State) {
        self.data.pending_states.push(patch);
        self.enqueue();
    }

    /// Like [`Scope::set_state`], running `callback` at the end of the
    /// update pass that applies it.
    pub fn set_state_with(&mut self, patch: State, callback: impl FnOnce(&mut Scope<'_>) + 'static) {
        self.data.pending_states.push(patch);
        self.data.pending_callbacks.push(Box::new(callback));
        self.enqueue();
    }

    fn enqueue(&mut self) {
        if self.data.flags.contains(InstanceFlags::DISABLE) {
            return;
        }
        if !self.data.flags.contains(InstanceFlags::DIRTY) {
            self.data.flags.insert(InstanceFlags::DIRTY);
            self.queue.push(self.id);
        }
    }
}
