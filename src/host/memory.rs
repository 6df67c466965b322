//! In-memory host surface.

use std::fmt::Write as _;

use indexmap::IndexMap;

use crate::types::NativeId;

use super::Host;

#[derive(Debug, Clone, PartialEq)]
pub enum MemoryNodeKind {
    Element {
        tag: String,
        namespace: Option<String>,
        attributes: IndexMap<String, String>,
    },
    Text(String),
    Fragment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    pub kind: MemoryNodeKind,
    pub parent: Option<NativeId>,
    pub children: Vec<NativeId>,
}

/// Arena-backed native tree. Node ids are never reused.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    nodes: Vec<MemoryNode>,
    svg: bool,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            svg: true,
        }
    }

    /// A surface without namespace support.
    pub fn without_svg() -> Self {
        Self {
            nodes: Vec::new(),
            svg: false,
        }
    }

    pub fn node(&self, id: NativeId) -> Option<&MemoryNode> {
        self.nodes.get(id.0)
    }

    /// Number of native nodes ever created.
    pub fn created(&self) -> usize {
        self.nodes.len()
    }

    pub fn tag(&self, id: NativeId) -> Option<&str> {
        match &self.node(id)?.kind {
            MemoryNodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn namespace(&self, id: NativeId) -> Option<&str> {
        match &self.node(id)?.kind {
            MemoryNodeKind::Element { namespace, .. } => namespace.as_deref(),
            _ => None,
        }
    }

    pub fn attribute(&self, id: NativeId, name: &str) -> Option<&str> {
        match &self.node(id)?.kind {
            MemoryNodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Attribute names in the order they were first set.
    pub fn attribute_names(&self, id: NativeId) -> Vec<&str> {
        match self.node(id).map(|n| &n.kind) {
            Some(MemoryNodeKind::Element { attributes, .. }) => {
                attributes.keys().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }

    pub fn text(&self, id: NativeId) -> Option<&str> {
        match &self.node(id)?.kind {
            MemoryNodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Serialize the subtree rooted at `id`.
    pub fn markup(&self, id: NativeId) -> String {
        let mut out = String::new();
        self.write_markup(id, &mut out);
        out
    }

    fn write_markup(&self, id: NativeId, out: &mut String) {
        let Some(node) = self.node(id) else { return };
        match &node.kind {
            MemoryNodeKind::Text(text) => out.push_str(text),
            MemoryNodeKind::Fragment => {
                for child in &node.children {
                    self.write_markup(*child, out);
                }
            }
            MemoryNodeKind::Element { tag, attributes, .. } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for child in &node.children {
                    self.write_markup(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn push(&mut self, kind: MemoryNodeKind) -> NativeId {
        let id = NativeId(self.nodes.len());
        self.nodes.push(MemoryNode {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn detach(&mut self, child: NativeId) {
        let Some(parent) = self.nodes.get(child.0).and_then(|n| n.parent) else { return };
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = None;
    }

    fn is_fragment(&self, id: NativeId) -> bool {
        matches!(self.node(id).map(|n| &n.kind), Some(MemoryNodeKind::Fragment))
    }

    /// Nodes to insert for `child`: a fragment contributes its children.
    fn take_insertable(&mut self, child: NativeId) -> Vec<NativeId> {
        if self.is_fragment(child) {
            let moved = std::mem::take(&mut self.nodes[child.0].children);
            for id in &moved {
                self.nodes[id.0].parent = None;
            }
            moved
        } else {
            self.detach(child);
            vec![child]
        }
    }
}

impl Host for MemoryHost {
    fn create_element(&mut self, tag: &str) -> NativeId {
        self.push(MemoryNodeKind::Element {
            tag: tag.to_string(),
            namespace: None,
            attributes: IndexMap::new(),
        })
    }

    fn create_element_ns(&mut self, namespace: &str, tag: &str) -> NativeId {
        self.push(MemoryNodeKind::Element {
            tag: tag.to_string(),
            namespace: Some(namespace.to_string()),
            attributes: IndexMap::new(),
        })
    }

    fn create_text_node(&mut self, text: &str) -> NativeId {
        self.push(MemoryNodeKind::Text(text.to_string()))
    }

    fn create_fragment(&mut self) -> NativeId {
        self.push(MemoryNodeKind::Fragment)
    }

    fn append_child(&mut self, parent: NativeId, child: NativeId) {
        if parent.0 >= self.nodes.len() {
            return;
        }
        for id in self.take_insertable(child) {
            self.nodes[id.0].parent = Some(parent);
            self.nodes[parent.0].children.push(id);
        }
    }

    fn replace_child(&mut self, old: NativeId, new: NativeId) {
        if old == new {
            return;
        }
        let Some(parent) = self.node(old).and_then(|n| n.parent) else { return };
        let inserted = self.take_insertable(new);
        let Some(position) = self.nodes[parent.0].children.iter().position(|c| *c == old) else {
            return;
        };
        for id in &inserted {
            self.nodes[id.0].parent = Some(parent);
        }
        self.nodes[parent.0]
            .children
            .splice(position..=position, inserted);
        self.nodes[old.0].parent = None;
    }

    fn remove_child(&mut self, parent: NativeId, child: NativeId) {
        if self.node(child).and_then(|n| n.parent) == Some(parent) {
            self.detach(child);
        }
    }

    fn children(&self, parent: NativeId) -> Vec<NativeId> {
        self.node(parent).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn parent(&self, node: NativeId) -> Option<NativeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn set_attribute(&mut self, node: NativeId, name: &str, value: &str) {
        if let Some(MemoryNode {
            kind: MemoryNodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    fn remove_attribute(&mut self, node: NativeId, name: &str) {
        if let Some(MemoryNode {
            kind: MemoryNodeKind::Element { attributes, .. },
            ..
        }) = self.nodes.get_mut(node.0)
        {
            attributes.shift_remove(name);
        }
    }

    fn set_text(&mut self, node: NativeId, text: &str) {
        if let Some(MemoryNode {
            kind: MemoryNodeKind::Text(current),
            ..
        }) = self.nodes.get_mut(node.0)
        {
            *current = text.to_string();
        }
    }

    fn supports_svg(&self) -> bool {
        self.svg
    }
}
