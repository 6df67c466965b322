//! Owner Registry - the instance currently inside `render()`.
//!
//! Single slot, set on render entry and cleared on render exit. Renders
//! never nest: a render always returns before any child is materialized.

use std::cell::Cell;

use crate::types::InstanceId;

#[derive(Debug, Default)]
pub(crate) struct OwnerRegistry {
    current: Cell<Option<InstanceId>>,
}

impl OwnerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn enter(&self, id: InstanceId) {
        debug_assert!(
            self.current.get().is_none(),
            "render of {id} started while another render is in progress"
        );
        self.current.set(Some(id));
    }

    pub(crate) fn exit(&self) {
        self.current.set(None);
    }

    pub(crate) fn current(&self) -> Option<InstanceId> {
        self.current.get()
    }
}
