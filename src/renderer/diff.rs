//! Keyless Diff - positional patching of node trees.
//!
//! Two nodes are patched in place when they are the same kind of thing:
//! text and text, elements with the same tag and key, components of the same
//! type and key, stateless nodes with the same render function and key,
//! widgets sharing one widget value. Anything else is replaced: the new node
//! is materialized, swapped in at the anchor, and the old one unmounted.
//!
//! Element children are paired by position. Fragments are flattened first so
//! positions line up with the element's native children. Surplus new
//! children are appended; surplus old children are unmounted and removed.

use std::rc::Rc;

use tracing::trace;

use crate::engine::Engine;
use crate::error::RenderError;
use crate::host::Host;
use crate::node::{ElementNode, Node};
use crate::pipeline::{Lifecycle, Materialize, MountScope};
use crate::types::{NativeId, RefTarget};

use super::{Reconcile, RefBinding};

#[derive(Debug, Default, Clone, Copy)]
pub struct KeylessDiff;

impl<H: Host> Reconcile<H> for KeylessDiff {
    fn patch(
        &self,
        engine: &mut Engine<H>,
        prev: Option<Node>,
        next: &mut Node,
        anchor: NativeId,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        match prev {
            Some(prev) => {
                let is_svg = matches!(&prev, Node::Element(el) if el.is_svg);
                self.patch_node(engine, prev, next, anchor, is_svg, scope)
            }
            None => self.replace(engine, None, next, anchor, false, scope),
        }
    }

    fn unmount(&self, engine: &mut Engine<H>, node: Node) -> Result<(), RenderError> {
        match node {
            Node::Element(mut element) => {
                for child in std::mem::take(&mut element.children) {
                    self.unmount(engine, child)?;
                }
                if let (Some(spec), Some(dom)) = (&element.ref_, element.dom) {
                    let refs = engine.ref_handler();
                    refs.detach(engine, element.owner, spec, RefTarget::Native(dom));
                }
                Ok(())
            }
            Node::Component(mut component) => engine.unmount_component(&mut component),
            Node::Stateless(mut stateless) => engine.unmount_stateless(&mut stateless),
            Node::Fragment(children) => {
                for child in children {
                    self.unmount(engine, child)?;
                }
                Ok(())
            }
            Node::Widget(widget) => {
                if let Some(dom) = widget.dom {
                    widget.widget.destroy(engine.host_mut(), dom);
                }
                Ok(())
            }
            Node::Empty | Node::Text(_) | Node::Void(_) => Ok(()),
        }
    }
}

impl KeylessDiff {
    fn patch_node<H: Host>(
        &self,
        engine: &mut Engine<H>,
        mut prev: Node,
        next: &mut Node,
        anchor: NativeId,
        is_svg: bool,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        match (&mut prev, &mut *next) {
            (Node::Empty, Node::Empty) => return Ok(anchor),
            (Node::Text(p), Node::Text(n)) => {
                let dom = p.dom.unwrap_or(anchor);
                if p.text != n.text {
                    engine.host_mut().set_text(dom, &n.text);
                }
                n.dom = Some(dom);
                return Ok(dom);
            }
            (Node::Void(p), Node::Void(n)) => {
                let dom = p.dom.unwrap_or(anchor);
                n.dom = Some(dom);
                return Ok(dom);
            }
            (Node::Widget(p), Node::Widget(n)) if Rc::ptr_eq(&p.widget, &n.widget) => {
                let dom = n.widget.update(engine.host_mut(), p.dom.unwrap_or(anchor));
                n.dom = Some(dom);
                return Ok(dom);
            }
            (Node::Element(p), Node::Element(n)) if p.tag == n.tag && p.key == n.key => {
                return self.patch_element(engine, p, n, anchor, scope);
            }
            (Node::Component(p), Node::Component(n))
                if p.ty == n.ty && p.key == n.key && p.instance.is_some_and(|id| engine.is_mounted(id)) =>
            {
                return engine.re_render_component(p, n, scope);
            }
            (Node::Stateless(p), Node::Stateless(n)) if p.same_render(n) && p.key == n.key => {
                return engine.re_render_stateless(p, n, scope, anchor);
            }
            _ => {}
        }
        self.replace(engine, Some(prev), next, anchor, is_svg, scope)
    }

    fn replace<H: Host>(
        &self,
        engine: &mut Engine<H>,
        prev: Option<Node>,
        next: &mut Node,
        anchor: NativeId,
        is_svg: bool,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        trace!(
            from = prev.as_ref().map_or("none", Node::kind),
            to = next.kind(),
            "replace node"
        );
        let dom = match engine.materialize(next, is_svg, scope) {
            Ok(dom) => dom,
            Err(err) => {
                // Nothing holds `prev` after a failed replace
                if let Some(prev) = prev {
                    self.unmount(engine, prev)?;
                }
                return Err(err);
            }
        };
        engine.host_mut().replace_child(anchor, dom);
        if let Some(prev) = prev {
            self.unmount(engine, prev)?;
        }
        Ok(dom)
    }

    fn patch_element<H: Host>(
        &self,
        engine: &mut Engine<H>,
        prev: &mut ElementNode,
        next: &mut ElementNode,
        anchor: NativeId,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        let dom = prev.dom.unwrap_or(anchor);
        next.dom = Some(dom);
        next.is_svg = prev.is_svg;
        next.namespace = prev.namespace.clone();
        let is_svg = next.is_svg;

        let patcher = engine.prop_patcher();
        for (name, value) in next.props.iter() {
            let old = prev.props.get(name);
            if old != Some(value) {
                patcher.patch_prop(engine.host_mut(), dom, name, old, Some(value), is_svg);
            }
        }
        for (name, old) in prev.props.iter() {
            if !next.props.contains(name) {
                patcher.patch_prop(engine.host_mut(), dom, name, Some(old), None, is_svg);
            }
        }

        let native = engine.host().children(dom);
        let mut old_children = Vec::new();
        flatten(std::mem::take(&mut prev.children), false, &mut old_children);
        let mut new_children = Vec::new();
        flatten_mut(&mut next.children, false, &mut new_children);

        let paired = old_children.len().min(new_children.len());
        let mut old_children = old_children.into_iter();
        let mut outcome = Ok(());
        for (position, child) in new_children.into_iter().enumerate() {
            let step = match old_children.next() {
                Some(old) => match engine.native_of(&old).or_else(|| native.get(position).copied()) {
                    Some(child_anchor) => self
                        .patch_node(engine, old, child, child_anchor, is_svg, scope)
                        .map(drop),
                    None => self.unmount(engine, old).and_then(|()| {
                        let child_dom = engine.materialize(child, is_svg, scope)?;
                        engine.host_mut().append_child(dom, child_dom);
                        Ok(())
                    }),
                },
                None => engine.materialize(child, is_svg, scope).map(|child_dom| {
                    engine.host_mut().append_child(dom, child_dom);
                }),
            };
            if let Err(err) = step {
                outcome = Err(err);
                break;
            }
        }
        // Old children left unpaired, or unreached after a failure
        let failed = outcome.is_err();
        for (offset, stale) in old_children.enumerate() {
            let fallback = (!failed).then(|| native.get(paired + offset).copied()).flatten();
            let stale_dom = engine.native_of(&stale).or(fallback);
            self.unmount(engine, stale)?;
            if let Some(stale_dom) = stale_dom {
                engine.host_mut().remove_child(dom, stale_dom);
            }
        }
        outcome?;

        if prev.ref_ != next.ref_ {
            let refs = engine.ref_handler();
            let target = RefTarget::Native(dom);
            match &next.ref_ {
                Some(spec) => {
                    let previous = prev.ref_.as_ref().map(|spec| RefBinding {
                        owner: prev.owner,
                        spec,
                    });
                    let current = RefBinding {
                        owner: next.owner,
                        spec,
                    };
                    refs.update(engine, previous, current, target);
                }
                None => {
                    if let Some(spec) = &prev.ref_ {
                        refs.detach(engine, prev.owner, spec, target);
                    }
                }
            }
        }
        Ok(dom)
    }
}

/// Children in native order. Fragment contents are spliced in, and empty
/// entries inside fragments are dropped, matching what materialization
/// appended.
fn flatten(nodes: Vec<Node>, in_fragment: bool, out: &mut Vec<Node>) {
    for node in nodes {
        match node {
            Node::Fragment(children) => flatten(children, true, out),
            Node::Empty if in_fragment => {}
            other => out.push(other),
        }
    }
}

fn flatten_mut<'a>(nodes: &'a mut [Node], in_fragment: bool, out: &mut Vec<&'a mut Node>) {
    for node in nodes {
        match node {
            Node::Fragment(children) => flatten_mut(children, true, out),
            Node::Empty if in_fragment => {}
            other => out.push(other),
        }
    }
}
