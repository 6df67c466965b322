//! Host - the native display surface.
//!
//! The engine never touches native nodes directly: everything goes through
//! [`Host`]. [`MemoryHost`] is an in-memory surface used by tests and by
//! hosts that serialize the tree themselves.

mod memory;

pub use memory::{MemoryHost, MemoryNode, MemoryNodeKind};

use crate::types::NativeId;

/// Native node operations the engine and its collaborators need.
///
/// Appending or inserting a fragment moves the fragment's children into the
/// target and leaves the fragment empty.
pub trait Host: 'static {
    fn create_element(&mut self, tag: &str) -> NativeId;

    fn create_element_ns(&mut self, namespace: &str, tag: &str) -> NativeId;

    fn create_text_node(&mut self, text: &str) -> NativeId;

    fn create_fragment(&mut self) -> NativeId;

    fn append_child(&mut self, parent: NativeId, child: NativeId);

    /// Put `new` where `old` is. No-op when `old` has no parent.
    fn replace_child(&mut self, old: NativeId, new: NativeId);

    fn remove_child(&mut self, parent: NativeId, child: NativeId);

    fn children(&self, parent: NativeId) -> Vec<NativeId>;

    fn parent(&self, node: NativeId) -> Option<NativeId>;

    fn set_attribute(&mut self, node: NativeId, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NativeId, name: &str);

    fn set_text(&mut self, node: NativeId, text: &str);

    /// Whether namespace-qualified element creation is available.
    fn supports_svg(&self) -> bool;
}
