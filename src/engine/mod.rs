//! Engine - instance registry, queues and the top-level render API.
//!
//! The engine owns everything a render pass touches:
//! - Registry: generation-checked arena of live component instances
//! - OwnerRegistry: the instance currently inside `render`
//! - DeferredQueue: `did_mount` calls and ref attachments run after a pass
//! - RenderQueue: instances that requested a state change
//!
//! # Architecture
//!
//! Components are NOT owned by the node tree. A mounted [`ComponentNode`]
//! only carries an [`InstanceId`]; the component value and its bookkeeping
//! live in the registry:
//!
//! ```text
//! Node tree                       Registry
//! Component { instance: #0v0 } →  slot 0: Counter { props, state, rendered, … }
//!   Element "div"                 slot 1: Label   { parent: #0v0, … }
//!     Component { instance: #1v0 }
//! ```
//!
//! Pluggable collaborators (reconciler, prop patcher, ref handler) are held
//! behind `Rc` so they can be cloned out and handed `&mut Engine`.
//!
//! [`ComponentNode`]: crate::node::ComponentNode

mod owner;
mod queue;
mod registry;

use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

pub use queue::{Deferred, DeferredCallback, DeferredQueue, RenderQueue};
pub(crate) use owner::OwnerRegistry;
pub(crate) use registry::Registry;

use crate::component::{Component, Instance, InstanceData, Scope};
use crate::error::RenderError;
use crate::host::Host;
use crate::node::Node;
use crate::options::{Options, SvgSupport};
use crate::pipeline::{Lifecycle, Materialize, MountScope};
use crate::renderer::{AttributePatcher, DefaultRefs, KeylessDiff, PropPatch, Reconcile, RefHandler};
use crate::types::{InstanceId, NativeId};

// =============================================================================
// Engine
// =============================================================================

pub struct Engine<H: Host> {
    pub(crate) host: H,
    pub(crate) registry: Registry,
    pub(crate) owner: OwnerRegistry,
    pub(crate) deferred: DeferredQueue<H>,
    pub(crate) render_queue: RenderQueue,
    pub(crate) reconciler: Rc<dyn Reconcile<H>>,
    pub(crate) props: Rc<dyn PropPatch>,
    pub(crate) refs: Rc<dyn RefHandler<H>>,
    pub(crate) options: Options,
    pub(crate) svg_supported: bool,
    /// Instances allocated by the passes currently running.
    pub(crate) journal: Vec<InstanceId>,
    roots: HashMap<NativeId, Node>,
}

impl<H: Host> Engine<H> {
    /// Engine with the default collaborators and options.
    pub fn new(host: H) -> Self {
        Self::builder(host).build()
    }

    pub fn builder(host: H) -> EngineBuilder<H> {
        EngineBuilder::new(host)
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Whether namespaced elements are created. Fixed at construction.
    pub fn svg_supported(&self) -> bool {
        self.svg_supported
    }

    /// Bookkeeping of a live instance.
    pub fn instance(&self, id: InstanceId) -> Option<&InstanceData> {
        self.registry.get(id).map(|instance| &instance.data)
    }

    pub fn is_mounted(&self, id: InstanceId) -> bool {
        self.registry.contains(id)
    }

    /// Number of live component instances.
    pub fn instance_count(&self) -> usize {
        self.registry.len()
    }

    /// The instance currently inside `render`, if any.
    pub fn current_owner(&self) -> Option<InstanceId> {
        self.owner.current()
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn pending_renders(&self) -> usize {
        self.render_queue.len()
    }

    /// Append a post-mount action, run by the next drain.
    pub fn defer(&mut self, f: impl FnOnce(&mut Engine<H>) -> Result<(), RenderError> + 'static) {
        self.deferred.push_callback(f);
    }

    /// Node tree last rendered into `container`.
    pub fn root(&self, container: NativeId) -> Option<&Node> {
        self.roots.get(&container)
    }

    pub fn reconciler(&self) -> Rc<dyn Reconcile<H>> {
        Rc::clone(&self.reconciler)
    }

    pub fn prop_patcher(&self) -> Rc<dyn PropPatch> {
        Rc::clone(&self.props)
    }

    pub fn ref_handler(&self) -> Rc<dyn RefHandler<H>> {
        Rc::clone(&self.refs)
    }

    /// Native node currently representing `node`.
    ///
    /// Component nodes resolve through their instance, whose root may have
    /// been replaced by a state-driven update since the node was patched.
    pub fn native_of(&self, node: &Node) -> Option<NativeId> {
        match node {
            Node::Component(component) => component
                .instance
                .and_then(|id| self.instance(id))
                .and_then(InstanceData::dom)
                .or(component.dom),
            Node::Stateless(stateless) => stateless
                .rendered
                .as_deref()
                .and_then(|rendered| self.native_of(rendered))
                .or(stateless.dom),
            other => other.dom(),
        }
    }

    pub(crate) fn data(&self, id: InstanceId) -> Result<&InstanceData, RenderError> {
        self.instance(id).ok_or(RenderError::StaleInstance(id))
    }

    pub(crate) fn data_mut(&mut self, id: InstanceId) -> Result<&mut InstanceData, RenderError> {
        self.registry
            .get_mut(id)
            .map(|instance| &mut instance.data)
            .ok_or(RenderError::StaleInstance(id))
    }

    /// Run `f` with the component and a [`Scope`] over its instance record.
    pub(crate) fn with_instance<R>(
        &mut self,
        id: InstanceId,
        f: impl FnOnce(&mut dyn Component, &mut Scope<'_>) -> R,
    ) -> Result<R, RenderError> {
        let owner = self.owner.current();
        let Instance { component, data } = self
            .registry
            .get_mut(id)
            .ok_or(RenderError::StaleInstance(id))?;
        let mut scope = Scope::new(id, data, &mut self.render_queue, owner);
        Ok(f(component.as_mut(), &mut scope))
    }

    // -------------------------------------------------------------------------
    // Top-level API
    // -------------------------------------------------------------------------

    /// Render `node` into `container`.
    ///
    /// The first call for a container materializes and appends. Later calls
    /// patch against the tree previously rendered there. Deferred callbacks
    /// are drained before returning.
    pub fn render(&mut self, mut node: Node, container: NativeId) -> Result<NativeId, RenderError> {
        debug!(kind = node.kind(), ?container, "render");
        let scope = MountScope::root();

        let dom = match self.roots.remove(&container) {
            Some(prev) => match self.native_of(&prev) {
                Some(anchor) => {
                    let reconciler = self.reconciler();
                    let patched = self.guarded(|engine| {
                        reconciler.patch(engine, Some(prev), &mut node, anchor, &scope)
                    });
                    match patched {
                        Ok(dom) => dom,
                        Err(err) => {
                            // Instances moved over by the failed patch now hang off `node`
                            self.roots.insert(container, node);
                            return Err(err);
                        }
                    }
                }
                None => {
                    // Fragment roots have no single anchor to patch in place
                    let reconciler = self.reconciler();
                    reconciler.unmount(self, prev)?;
                    self.clear_container(container);
                    self.guarded(|engine| engine.mount_into(&mut node, container, &scope))?
                }
            },
            None => self.guarded(|engine| engine.mount_into(&mut node, container, &scope))?,
        };

        self.roots.insert(container, node);
        self.flush_deferred()?;
        Ok(dom)
    }

    /// Unmount whatever was rendered into `container`. Returns false when
    /// nothing was.
    pub fn unmount_at(&mut self, container: NativeId) -> Result<bool, RenderError> {
        let Some(root) = self.roots.remove(&container) else {
            return Ok(false);
        };
        debug!(?container, "unmount root");
        let dom = self.native_of(&root);
        let reconciler = self.reconciler();
        reconciler.unmount(self, root)?;
        match dom {
            Some(dom) => self.host.remove_child(container, dom),
            None => self.clear_container(container),
        }
        Ok(true)
    }

    /// Apply pending state requests.
    ///
    /// Runs an update pass for each queued instance that is still dirty,
    /// until no more requests arrive. Returns the number of passes run.
    pub fn rerender(&mut self) -> Result<usize, RenderError> {
        let mut passes = 0;
        loop {
            let batch = self.render_queue.take();
            if batch.is_empty() {
                break;
            }
            trace!(count = batch.len(), "render queue batch");
            for id in batch {
                let dirty = self.instance(id).is_some_and(InstanceData::is_dirty);
                if dirty {
                    self.guarded(|engine| engine.update_component(id, false))?;
                    passes += 1;
                }
            }
        }
        Ok(passes)
    }

    /// Update `id` without consulting `should_update`.
    pub fn force_update(&mut self, id: InstanceId) -> Result<(), RenderError> {
        if !self.registry.contains(id) {
            return Err(RenderError::StaleInstance(id));
        }
        self.guarded(|engine| engine.update_component(id, true))
    }

    /// Drain the deferred queue.
    ///
    /// Entries appended while draining land in a fresh queue and run on the
    /// next drain.
    pub fn flush_deferred(&mut self) -> Result<(), RenderError> {
        if self.deferred.is_empty() {
            return Ok(());
        }
        let batch = self.deferred.take();
        trace!(count = batch.len(), "drain deferred queue");
        for entry in batch {
            match entry {
                Deferred::Callback(f) => f(self)?,
                Deferred::DidMount(id) => {
                    if !self.registry.contains(id) {
                        continue;
                    }
                    let result = self.with_instance(id, |component, scope| component.did_mount(scope))?;
                    self.capture(id, result)?;
                }
            }
        }
        Ok(())
    }

    /// Run a mount or patch pass. When it fails, the deferred entries it
    /// queued are dropped and the instances it allocated are released, so
    /// no `did_mount` fires for a component whose mount never completed.
    fn guarded<T>(
        &mut self,
        pass: impl FnOnce(&mut Self) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        let mark = self.deferred.mark();
        let start = self.journal.len();
        let result = pass(self);
        let allocated = self.journal.split_off(start);

        if result.is_err() {
            let dropped = self.deferred.discard_since(mark);
            let released = allocated
                .into_iter()
                .rev()
                .filter(|id| self.registry.release(*id).is_some())
                .count();
            debug!(dropped, released, "rolled back failed pass");
        }
        result
    }

    fn mount_into(
        &mut self,
        node: &mut Node,
        container: NativeId,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        let dom = self.materialize(node, false, scope)?;
        self.host.append_child(container, dom);
        Ok(dom)
    }

    fn clear_container(&mut self, container: NativeId) {
        for child in self.host.children(container) {
            self.host.remove_child(container, child);
        }
    }
}

// =============================================================================
// Builder
// =============================================================================

pub struct EngineBuilder<H: Host> {
    host: H,
    options: Options,
    reconciler: Option<Rc<dyn Reconcile<H>>>,
    props: Option<Rc<dyn PropPatch>>,
    refs: Option<Rc<dyn RefHandler<H>>>,
}

impl<H: Host> EngineBuilder<H> {
    fn new(host: H) -> Self {
        Self {
            host,
            options: Options::default(),
            reconciler: None,
            props: None,
            refs: None,
        }
    }

    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn reconciler(mut self, reconciler: impl Reconcile<H> + 'static) -> Self {
        self.reconciler = Some(Rc::new(reconciler));
        self
    }

    pub fn prop_patcher(mut self, patcher: impl PropPatch + 'static) -> Self {
        self.props = Some(Rc::new(patcher));
        self
    }

    pub fn ref_handler(mut self, refs: impl RefHandler<H> + 'static) -> Self {
        self.refs = Some(Rc::new(refs));
        self
    }

    pub fn build(self) -> Engine<H> {
        let svg_supported = match self.options.svg {
            SvgSupport::Detect => self.host.supports_svg(),
            SvgSupport::Disabled => false,
        };
        debug!(svg_supported, "engine created");
        Engine {
            host: self.host,
            registry: Registry::new(),
            owner: OwnerRegistry::new(),
            deferred: DeferredQueue::default(),
            render_queue: RenderQueue::default(),
            reconciler: self.reconciler.unwrap_or_else(|| Rc::new(KeylessDiff)),
            props: self.props.unwrap_or_else(|| Rc::new(AttributePatcher)),
            refs: self.refs.unwrap_or_else(|| Rc::new(DefaultRefs)),
            options: self.options,
            svg_supported,
            journal: Vec::new(),
            roots: HashMap::new(),
        }
    }
}
