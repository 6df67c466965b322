//! Renderer collaborators - patching, property writes and refs.
//!
//! The engine delegates three jobs it does not own:
//! - [`Reconcile`]: patch a previous tree against a new one, and unmount
//! - [`PropPatch`]: write one property onto a native element
//! - [`RefHandler`]: attach, update and detach refs
//!
//! Shipped defaults: [`KeylessDiff`] pairs children
//! by position, [`AttributePatcher`] writes props as attributes and
//! [`DefaultRefs`] handles callback and named refs.

mod diff;
mod props;
mod refs;

pub use diff::KeylessDiff;
pub use props::AttributePatcher;
pub use refs::DefaultRefs;

use crate::engine::Engine;
use crate::error::RenderError;
use crate::host::Host;
use crate::node::Node;
use crate::pipeline::MountScope;
use crate::types::{InstanceId, NativeId, RefSpec, RefTarget, Value};

/// Patches and unmounts node trees.
pub trait Reconcile<H: Host> {
    /// Bring the native tree at `anchor` from `prev` to `next`. Returns the
    /// native node that now represents `next`.
    fn patch(
        &self,
        engine: &mut Engine<H>,
        prev: Option<Node>,
        next: &mut Node,
        anchor: NativeId,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError>;

    /// Release a mounted tree: unmount components, detach refs, destroy
    /// widgets. Removing the native node from its parent is the caller's job.
    fn unmount(&self, engine: &mut Engine<H>, node: Node) -> Result<(), RenderError>;
}

/// Writes a single property onto a native element.
///
/// `old` is the previous value (None on first mount). `new` of None means the
/// property was removed.
pub trait PropPatch {
    fn patch_prop(
        &self,
        host: &mut dyn Host,
        node: NativeId,
        name: &str,
        old: Option<&Value>,
        new: Option<&Value>,
        is_svg: bool,
    );
}

/// A ref descriptor together with the instance that owns it.
#[derive(Debug, Clone, Copy)]
pub struct RefBinding<'a> {
    pub owner: Option<InstanceId>,
    pub spec: &'a RefSpec,
}

pub trait RefHandler<H: Host> {
    fn attach(&self, engine: &mut Engine<H>, owner: Option<InstanceId>, spec: &RefSpec, target: RefTarget);

    fn detach(&self, engine: &mut Engine<H>, owner: Option<InstanceId>, spec: &RefSpec, target: RefTarget);

    /// Ref changed between two renders of the same target.
    fn update(
        &self,
        engine: &mut Engine<H>,
        prev: Option<RefBinding<'_>>,
        next: RefBinding<'_>,
        target: RefTarget,
    ) {
        if let Some(prev) = prev {
            self.detach(engine, prev.owner, prev.spec, target);
        }
        self.attach(engine, next.owner, next.spec, target);
    }
}
