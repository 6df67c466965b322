//! Materializer - first mount of a node tree into native nodes.

use std::rc::Rc;

use tracing::trace;

use crate::engine::Engine;
use crate::error::RenderError;
use crate::host::Host;
use crate::node::{ElementNode, Node};
use crate::types::{NativeId, RefTarget, SVG_NAMESPACE};

use super::{Lifecycle, Materialize, MountScope};

impl<H: Host> Materialize for Engine<H> {
    fn materialize(
        &mut self,
        node: &mut Node,
        is_svg: bool,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        trace!(kind = node.kind(), is_svg, "materialize");
        match node {
            Node::Empty => Ok(self.host.create_text_node("")),
            Node::Text(text) => {
                if text.dom.is_some() {
                    return Err(RenderError::UnsupportedNode("text node is already mounted"));
                }
                let dom = self.host.create_text_node(&text.text);
                text.dom = Some(dom);
                Ok(dom)
            }
            Node::Void(void) => match void.dom {
                Some(dom) => Ok(dom),
                None => {
                    let dom = self.host.create_text_node("");
                    void.dom = Some(dom);
                    Ok(dom)
                }
            },
            Node::Widget(widget) => {
                if widget.dom.is_some() {
                    return Err(RenderError::UnsupportedNode("widget node is already mounted"));
                }
                let dom = widget.widget.init(&mut self.host, &scope.context);
                widget.dom = Some(dom);
                Ok(dom)
            }
            Node::Element(element) => self.materialize_element(element, is_svg, scope),
            Node::Component(component) => self.mount_component(component, scope),
            Node::Stateless(stateless) => self.mount_stateless(stateless, scope),
            Node::Fragment(children) => {
                let fragment = self.host.create_fragment();
                for child in children.iter_mut().filter(|child| !child.is_invalid()) {
                    let dom = self.materialize(child, is_svg, scope)?;
                    self.host.append_child(fragment, dom);
                }
                Ok(fragment)
            }
        }
    }
}

impl<H: Host> Engine<H> {
    fn materialize_element(
        &mut self,
        element: &mut ElementNode,
        is_svg: bool,
        scope: &MountScope,
    ) -> Result<NativeId, RenderError> {
        if element.dom.is_some() {
            return Err(RenderError::UnsupportedNode("element node is already mounted"));
        }

        let mut svg = is_svg;
        if element.is_svg || &*element.tag == "svg" {
            svg = true;
        } else if &*element.tag == "foreignObject" {
            svg = false;
        }
        if !self.svg_supported {
            svg = false;
        }
        if svg {
            element.is_svg = true;
            if element.namespace.is_none() {
                element.namespace = Some(Rc::from(SVG_NAMESPACE));
            }
        }

        let dom = match element.namespace.as_deref() {
            Some(namespace) if self.svg_supported => self.host.create_element_ns(namespace, &element.tag),
            _ => self.host.create_element(&element.tag),
        };

        self.apply_props(dom, element, svg);

        for child in element.children.iter_mut() {
            let child_dom = self.materialize(child, svg, scope)?;
            self.host.append_child(dom, child_dom);
        }
        element.dom = Some(dom);

        if let Some(spec) = &element.ref_ {
            let refs = self.ref_handler();
            refs.attach(self, element.owner, spec, RefTarget::Native(dom));
        }
        Ok(dom)
    }

    /// Set every prop of a freshly created element. For `input` the `type`
    /// attribute goes first, since other attributes depend on it.
    fn apply_props(&mut self, dom: NativeId, element: &ElementNode, is_svg: bool) {
        let input_type = match &*element.tag {
            "input" => element.props.get("type"),
            _ => None,
        };
        if let Some(kind) = input_type {
            self.host.set_attribute(dom, "type", &kind.to_string());
        }

        let patcher = self.prop_patcher();
        for (name, value) in element.props.iter() {
            if input_type.is_some() && name == "type" {
                continue;
            }
            patcher.patch_prop(&mut self.host, dom, name, None, Some(value), is_svg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::options::{Options, SvgSupport};

    fn engine() -> Engine<MemoryHost> {
        Engine::new(MemoryHost::new())
    }

    #[test]
    fn test_element_with_children() {
        let mut engine = engine();
        let mut node: Node = Node::element("ul")
            .prop("className", "list")
            .child(Node::element("li").child("a"))
            .child(Node::element("li").child("b"))
            .into();

        let dom = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        assert_eq!(
            engine.host().markup(dom),
            "<ul class=\"list\"><li>a</li><li>b</li></ul>"
        );
        assert_eq!(node.dom(), Some(dom));
    }

    #[test]
    fn test_fragment_skips_invalid_entries() {
        let mut engine = engine();
        let container = engine.host_mut().create_element("div");
        let mut node = Node::fragment(vec![Node::text("a"), Node::Empty, Node::text("b")]);

        let dom = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        engine.host_mut().append_child(container, dom);
        assert_eq!(engine.host().children(container).len(), 2);
        assert_eq!(engine.host().markup(container), "<div>ab</div>");
    }

    #[test]
    fn test_empty_yields_empty_text() {
        let mut engine = engine();
        let dom = engine.materialize(&mut Node::Empty, false, &MountScope::root()).unwrap();
        assert_eq!(engine.host().text(dom), Some(""));
    }

    #[test]
    fn test_void_reuses_known_dom() {
        let mut engine = engine();
        let mut node = Node::void();
        let first = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        let second = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_remount_is_rejected() {
        let mut engine = engine();
        let mut node = Node::text("x");
        engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        let err = engine.materialize(&mut node, false, &MountScope::root()).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedNode(_)));
    }

    #[test]
    fn test_svg_namespace_propagates_until_foreign_object() {
        let mut engine = engine();
        let mut node: Node = Node::element("svg")
            .child(Node::element("circle"))
            .child(Node::element("foreignObject").child(Node::element("div")))
            .into();

        let svg = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        let host = engine.host();
        let children = host.children(svg);
        let (circle, foreign) = (children[0], children[1]);
        let div = host.children(foreign)[0];

        assert_eq!(host.namespace(svg), Some(SVG_NAMESPACE));
        assert_eq!(host.namespace(circle), Some(SVG_NAMESPACE));
        assert_eq!(host.namespace(div), None);
    }

    #[test]
    fn test_svg_disabled_creates_plain_elements() {
        let mut engine = Engine::builder(MemoryHost::new())
            .options(Options::new().svg(SvgSupport::Disabled))
            .build();
        let mut node: Node = Node::element("svg").child(Node::element("path")).into();

        let svg = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        let path = engine.host().children(svg)[0];
        assert_eq!(engine.host().namespace(svg), None);
        assert_eq!(engine.host().namespace(path), None);
    }

    #[test]
    fn test_input_type_is_set_first() {
        let mut engine = engine();
        let mut node: Node = Node::element("input")
            .prop("value", "on")
            .prop("checked", true)
            .prop("type", "checkbox")
            .into();

        let dom = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        assert_eq!(
            engine.host().attribute_names(dom),
            vec!["type", "value", "checked"]
        );
        assert_eq!(engine.host().attribute(dom, "type"), Some("checkbox"));
    }

    #[test]
    fn test_element_ref_attached_with_native_node() {
        use std::cell::RefCell;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut engine = engine();
        let mut node: Node = Node::element("div")
            .with_ref(crate::types::RefSpec::callback(move |target| log.borrow_mut().push(target)))
            .into();

        let dom = engine.materialize(&mut node, false, &MountScope::root()).unwrap();
        assert_eq!(*seen.borrow(), vec![Some(RefTarget::Native(dom))]);
    }
}
