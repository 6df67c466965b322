//! Lifecycle engine - mounting, updating and unmounting components.
//!
//! # Update pass
//!
//! ```text
//! re_render_component ─ will_receive_props (DISABLE set)
//!                     └ update_component ─ should_update (previous props visible)
//!                                        ├ will_update
//!                                        ├ render → reconciler.patch
//!                                        ├ did_update
//!                                        └ pending callbacks, deferred drain
//! ```
//!
//! Every hook result except `should_update` goes through
//! [`Engine::capture`], so a failing hook is delivered to the nearest
//! boundary and the pass continues with a fallback.

use tracing::{debug, trace};

use crate::component::{Instance, InstanceData, InstanceFlags, LifecycleState};
use crate::engine::{Deferred, Engine};
use crate::error::RenderError;
use crate::host::Host;
use crate::node::{ComponentNode, Node, StatelessNode};
use crate::renderer::RefBinding;
use crate::types::{Context, InstanceId, NativeId, RefTarget};

use super::{Lifecycle, Materialize, MountScope};

impl<H: Host> Lifecycle for Engine<H> {
    fn mount_component(
        &mut self,
        node: &mut ComponentNode,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        if node.instance.is_some() {
            return Err(RenderError::UnsupportedNode("component node is already mounted"));
        }

        let component = node.ty.instantiate(&node.props, &scope.context);
        let state = component.initial_state(&node.props);
        let data = InstanceData::new(
            node.ty.name(),
            node.props.clone(),
            state,
            scope.context.clone(),
            node.children.clone(),
            scope.parent,
        );
        let id = self.registry.allocate(Instance { component, data });
        self.journal.push(id);
        node.instance = Some(id);
        self.data_mut(id)?.lifecycle = LifecycleState::Mounting;
        debug!(component = node.ty.name(), %id, "mount component");

        let result = self.with_instance(id, |component, scope| component.will_mount(scope))?;
        self.capture(id, result)?;
        {
            let data = self.data_mut(id)?;
            data.state = data.take_next_state();
            data.flags.remove(InstanceFlags::DIRTY);
        }

        let mut rendered = self.render_component(id)?;

        self.deferred.push(Deferred::DidMount(id));
        if let Some(spec) = node.ref_.clone() {
            let owner = node.owner;
            self.deferred.push_callback(move |engine| {
                let refs = engine.ref_handler();
                refs.attach(engine, owner, &spec, RefTarget::Instance(id));
                Ok(())
            });
        }

        let child_scope = MountScope::child(self.child_context(id, &scope.context)?, id);
        let dom = self.materialize(&mut rendered, false, &child_scope)?;

        let data = self.data_mut(id)?;
        data.rendered = Some(rendered);
        data.dom = Some(dom);
        data.prev_props = Some(data.props.clone());
        data.prev_state = Some(data.state.clone());
        data.prev_context = Some(data.context.clone());
        data.flags.remove(InstanceFlags::DISABLE);
        data.lifecycle = LifecycleState::Mounted;
        node.dom = Some(dom);

        let observer = self.options.observer.clone();
        observer.after_mount(node);
        Ok(dom)
    }

    fn mount_stateless(
        &mut self,
        node: &mut StatelessNode,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        if node.dom.is_some() {
            return Err(RenderError::UnsupportedNode("stateless node is already mounted"));
        }
        trace!(component = node.name, "mount stateless");

        let mut rendered = self.render_stateless(node, scope)?;
        if let Some(spec) = node.ref_.take() {
            rendered.set_ref(spec);
        }
        let dom = self.materialize(&mut rendered, false, scope)?;
        node.rendered = Some(Box::new(rendered));
        node.dom = Some(dom);
        Ok(dom)
    }

    fn re_render_component(
        &mut self,
        prev: &mut ComponentNode,
        next: &mut ComponentNode,
        _scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        let Some(id) = prev.instance.take() else {
            return Err(RenderError::UnsupportedNode("previous component node was never mounted"));
        };
        next.instance = Some(id);
        trace!(component = next.ty.name(), %id, "re-render component");

        let next_props = next.props.clone();
        // Context is carried over from the instance, not taken from the parent
        let next_context = self.data(id)?.context.clone();

        self.data_mut(id)?.flags.insert(InstanceFlags::DISABLE);
        let result = self.with_instance(id, |component, scope| {
            component.will_receive_props(&next_props, &next_context, scope)
        })?;
        self.capture(id, result)?;
        {
            let data = self.data_mut(id)?;
            data.flags.remove(InstanceFlags::DISABLE);
            data.prev_props = Some(data.props.clone());
            data.prev_state = Some(data.state.clone());
            data.prev_context = Some(data.context.clone());
            data.props = next_props;
            data.context = next_context;
            data.children = next.children.clone();
        }

        if let Some(spec) = &next.ref_ {
            if prev.ref_.as_ref() != Some(spec) {
                let refs = self.ref_handler();
                let previous = prev.ref_.as_ref().map(|spec| RefBinding {
                    owner: prev.owner,
                    spec,
                });
                let current = RefBinding {
                    owner: next.owner,
                    spec,
                };
                refs.update(self, previous, current, RefTarget::Instance(id));
            }
        }

        self.update_component(id, false)?;

        let dom = self.data(id)?.dom.ok_or(RenderError::StaleInstance(id))?;
        next.dom = Some(dom);
        prev.dom = None;
        Ok(dom)
    }

    fn re_render_stateless(
        &mut self,
        prev: &mut StatelessNode,
        next: &mut StatelessNode,
        scope: &MountScope,
        anchor: NativeId,
    ) -> Result<NativeId, RenderError> {
        trace!(component = next.name, "re-render stateless");
        let last = prev.rendered.take().map(|rendered| *rendered);
        let mut rendered = self.render_stateless(next, scope)?;
        if let Some(spec) = next.ref_.take() {
            rendered.set_ref(spec);
        }

        let patched = self.patch_rendered(last, &mut rendered, Some(anchor), scope);
        next.rendered = Some(Box::new(rendered));
        let dom = patched?;
        next.dom = Some(dom);
        prev.dom = None;
        Ok(dom)
    }

    fn update_component(&mut self, id: InstanceId, force: bool) -> Result<(), RenderError> {
        let (name, last_dom, props, state, context, prev_props, prev_state, prev_context) = {
            let data = self.data_mut(id)?;
            data.lifecycle = LifecycleState::Updating;
            let props = data.props.clone();
            let state = data.take_next_state();
            let context = data.context.clone();
            let prev_props = data.prev_props.take().unwrap_or_else(|| props.clone());
            let prev_state = data.prev_state.take().unwrap_or_else(|| state.clone());
            let prev_context = data.prev_context.take().unwrap_or_else(|| context.clone());
            // should_update and will_update see the previous values
            data.props = prev_props.clone();
            data.context = prev_context.clone();
            (data.name, data.dom, props, state, context, prev_props, prev_state, prev_context)
        };
        debug!(component = name, %id, force, "update component");

        let mut skip = false;
        if !force {
            let decision = self.with_instance(id, |component, scope| {
                component.should_update(&props, &state, &context, scope)
            })?;
            match decision {
                Ok(update) => skip = !update,
                Err(err) => {
                    let data = self.data_mut(id)?;
                    data.props = props;
                    data.state = state;
                    data.context = context;
                    data.lifecycle = LifecycleState::Mounted;
                    return Err(RenderError::uncaught(name, err));
                }
            }
        }

        if !skip {
            let result = self.with_instance(id, |component, scope| {
                component.will_update(&props, &state, &context, scope)
            })?;
            self.capture(id, result)?;
        }

        {
            let data = self.data_mut(id)?;
            data.props = props.clone();
            data.state = state.clone();
            data.context = context.clone();
            data.flags.remove(InstanceFlags::DIRTY);
        }

        if skip {
            trace!(component = name, %id, "update skipped");
        } else {
            let last = self.data_mut(id)?.rendered.take();
            let mut rendered = match self.render_component(id) {
                Ok(rendered) => rendered,
                Err(err) => {
                    let data = self.data_mut(id)?;
                    data.rendered = last;
                    data.lifecycle = LifecycleState::Mounted;
                    return Err(err);
                }
            };
            let child_scope = MountScope::child(self.child_context(id, &context)?, id);
            let patched = self.patch_rendered(last, &mut rendered, last_dom, &child_scope);
            let data = self.data_mut(id)?;
            // The new tree owns whatever the patch moved over, even on failure
            data.rendered = Some(rendered);
            let dom = match patched {
                Ok(dom) => dom,
                Err(err) => {
                    data.lifecycle = LifecycleState::Mounted;
                    return Err(err);
                }
            };
            data.dom = Some(dom);
            if let Some(last_dom) = last_dom.filter(|last| *last != dom) {
                self.retarget_ancestors(id, last_dom, dom);
            }
            let result = self.with_instance(id, |component, scope| {
                component.did_update(&prev_props, &prev_state, &prev_context, scope)
            })?;
            self.capture(id, result)?;
        }

        {
            let data = self.data_mut(id)?;
            data.prev_props = Some(data.props.clone());
            data.prev_state = Some(data.state.clone());
            data.prev_context = Some(data.context.clone());
            data.lifecycle = LifecycleState::Mounted;
        }

        self.drain_pending_callbacks(id)?;
        let observer = self.options.observer.clone();
        observer.after_update(id);
        self.flush_deferred()
    }

    fn unmount_component(&mut self, node: &mut ComponentNode) -> Result<(), RenderError> {
        let Some(id) = node.instance else {
            return Ok(());
        };
        if !self.registry.contains(id) {
            // Released by a failed pass before it finished mounting
            node.instance = None;
            node.dom = None;
            return Ok(());
        }
        debug!(component = node.ty.name(), %id, "unmount component");
        let observer = self.options.observer.clone();
        observer.before_unmount(id);

        self.data_mut(id)?.lifecycle = LifecycleState::Unmounting;
        let result = self.with_instance(id, |component, scope| component.will_unmount(scope))?;
        self.capture(id, result)?;

        let rendered = {
            let data = self.data_mut(id)?;
            data.flags.insert(InstanceFlags::DISABLE);
            data.rendered.take()
        };
        if let Some(rendered) = rendered {
            let reconciler = self.reconciler();
            reconciler.unmount(self, rendered)?;
        }

        {
            let data = self.data_mut(id)?;
            data.dom = None;
            data.lifecycle = LifecycleState::Unmounted;
        }
        if let Some(spec) = &node.ref_ {
            let refs = self.ref_handler();
            refs.detach(self, node.owner, spec, RefTarget::Instance(id));
        }

        self.registry.release(id);
        node.instance = None;
        node.dom = None;
        Ok(())
    }

    fn unmount_stateless(&mut self, node: &mut StatelessNode) -> Result<(), RenderError> {
        trace!(component = node.name, "unmount stateless");
        if let Some(rendered) = node.rendered.take() {
            let reconciler = self.reconciler();
            reconciler.unmount(self, *rendered)?;
        }
        node.dom = None;
        Ok(())
    }
}

impl<H: Host> Engine<H> {
    /// Invoke `render` of `id` with the owner registry set to it.
    ///
    /// A render error delivered to a boundary yields a [`Node::void`]
    /// placeholder.
    pub(crate) fn render_component(&mut self, id: InstanceId) -> Result<Node, RenderError> {
        self.owner.enter(id);
        let result = match self.with_instance(id, |component, scope| component.render(scope)) {
            Ok(Ok(mut rendered)) => {
                rendered.adopt(id);
                Ok(Ok(rendered))
            }
            other => other,
        };
        self.owner.exit();

        let rendered = self.capture(id, result?)?;
        Ok(rendered.unwrap_or_else(Node::void))
    }

    /// Parent context merged with the instance's child context.
    pub(crate) fn child_context(&mut self, id: InstanceId, base: &Context) -> Result<Context, RenderError> {
        let extra = self.with_instance(id, |component, scope| component.child_context(scope))?;
        Ok(match extra {
            Some(extra) => base.merge(&extra),
            None => base.clone(),
        })
    }

    /// Stateless render. Errors are routed starting at the nearest stateful
    /// ancestor.
    fn render_stateless(&mut self, node: &StatelessNode, scope: &MountScope) -> Result<Node, RenderError> {
        match (node.render)(&node.props, &scope.context) {
            Ok(mut rendered) => {
                if let Some(owner) = node.owner {
                    rendered.adopt(owner);
                }
                Ok(rendered)
            }
            Err(err) => {
                self.route_error(scope.parent, node.name, err)?;
                Ok(Node::void())
            }
        }
    }

    /// Patch a previously rendered tree into `next`, or materialize `next`
    /// when there is nothing to patch against.
    fn patch_rendered(
        &mut self,
        last: Option<Node>,
        next: &mut Node,
        anchor: Option<NativeId>,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        let reconciler = self.reconciler();
        match (last, anchor) {
            (last, Some(anchor)) => reconciler.patch(self, last, next, anchor, scope),
            (Some(last), None) => {
                reconciler.unmount(self, last)?;
                self.materialize(next, false, scope)
            }
            (None, None) => self.materialize(next, false, scope),
        }
    }

    /// Ancestors that render `id` as their root share its native node. Move
    /// them from `last` to its replacement.
    fn retarget_ancestors(&mut self, id: InstanceId, last: NativeId, dom: NativeId) {
        let chain: Vec<InstanceId> = self.registry.ancestors(id).skip(1).collect();
        for ancestor in chain {
            match self.registry.get_mut(ancestor) {
                Some(instance) if instance.data.dom == Some(last) => {
                    trace!(%ancestor, "retarget ancestor dom");
                    instance.data.dom = Some(dom);
                }
                _ => break,
            }
        }
    }

    /// Run the post-update callbacks queued with `set_state_with`, including
    /// any queued while they run.
    fn drain_pending_callbacks(&mut self, id: InstanceId) -> Result<(), RenderError> {
        while let Some(callback) = self.data_mut(id)?.pending_callbacks.pop() {
            self.with_instance(id, |_, scope| callback(scope))?;
        }
        Ok(())
    }
}
