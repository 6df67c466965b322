//! Mount / update / unmount pipeline.
//!
//! # Pipeline Architecture
//!
//! ```text
//! Engine::render → materialize ─┬─ element / text / fragment → Host
//!                               └─ component → mount_component → render → materialize …
//! ```
//!
//! The materializer and the lifecycle engine call each other through the
//! [`Materialize`] and [`Lifecycle`] traits, both implemented by
//! [`Engine`](crate::engine::Engine). Collaborators such as the patcher reach
//! back into the pipeline through the same traits.
//!
//! ## Key Design Principles
//!
//! - **Synchronous**: every pass runs to completion or returns an error.
//! - **Explicit scope**: parent context and parent instance travel in a
//!   [`MountScope`] value, never in globals.
//! - **Deferred effects**: `did_mount` and component refs are queued and
//!   drained once the whole pass has materialized.

mod capture;
mod lifecycle;
mod materialize;

use crate::error::RenderError;
use crate::node::{ComponentNode, Node, StatelessNode};
use crate::types::{Context, InstanceId, NativeId};

/// Parent context and parent instance for a subtree being mounted or patched.
#[derive(Debug, Clone, Default)]
pub struct MountScope {
    pub context: Context,
    /// Nearest enclosing stateful instance.
    pub parent: Option<InstanceId>,
}

impl MountScope {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_context(context: Context) -> Self {
        Self {
            context,
            parent: None,
        }
    }

    pub fn child(context: Context, parent: InstanceId) -> Self {
        Self {
            context,
            parent: Some(parent),
        }
    }
}

/// First-mount conversion of nodes into native nodes.
pub trait Materialize {
    fn materialize(
        &mut self,
        node: &mut Node,
        is_svg: bool,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError>;
}

/// Component lifecycle transitions.
pub trait Lifecycle {
    fn mount_component(
        &mut self,
        node: &mut ComponentNode,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError>;

    fn mount_stateless(
        &mut self,
        node: &mut StatelessNode,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError>;

    /// Carry the instance of `prev` over to `next` and update it.
    fn re_render_component(
        &mut self,
        prev: &mut ComponentNode,
        next: &mut ComponentNode,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError>;

    fn re_render_stateless(
        &mut self,
        prev: &mut StatelessNode,
        next: &mut StatelessNode,
        scope: &MountScope,
        anchor: NativeId,
    ) -> Result<NativeId, RenderError>;

    /// General update pass. `force` skips `should_update`.
    fn update_component(&mut self, id: InstanceId, force: bool) -> Result<(), RenderError>;

    fn unmount_component(&mut self, node: &mut ComponentNode) -> Result<(), RenderError>;

    fn unmount_stateless(&mut self, node: &mut StatelessNode) -> Result<(), RenderError>;
}
