//! Default ref handling.

use tracing::warn;

use crate::engine::Engine;
use crate::host::Host;
use crate::types::{InstanceId, RefSpec, RefTarget};

use super::RefHandler;

/// Callback refs receive the target; named refs are stored on the owner
/// instance and read back through `Scope::get_ref`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRefs;

impl<H: Host> RefHandler<H> for DefaultRefs {
    fn attach(&self, engine: &mut Engine<H>, owner: Option<InstanceId>, spec: &RefSpec, target: RefTarget) {
        match spec {
            RefSpec::Callback(f) => f(Some(target)),
            RefSpec::Named(name) => {
                let Some(data) = owner.and_then(|id| engine.data_mut(id).ok()) else {
                    warn!(name = &**name, "named ref without a live owner");
                    return;
                };
                data.refs.insert(name.to_string(), target);
            }
        }
    }

    fn detach(&self, engine: &mut Engine<H>, owner: Option<InstanceId>, spec: &RefSpec, target: RefTarget) {
        match spec {
            RefSpec::Callback(f) => f(None),
            RefSpec::Named(name) => {
                let Some(data) = owner.and_then(|id| engine.data_mut(id).ok()) else {
                    return;
                };
                // Only clear the entry if it still points at this target
                if data.refs.get(&**name) == Some(&target) {
                    data.refs.shift_remove(&**name);
                }
            }
        }
    }
}
