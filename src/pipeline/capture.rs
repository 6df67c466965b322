//! Error capture - routing hook failures to the nearest error boundary.

use tracing::{error, warn};

use crate::component::{Instance, InstanceFlags, Scope};
use crate::engine::Engine;
use crate::error::{HookResult, RenderError};
use crate::host::Host;
use crate::types::InstanceId;

impl<H: Host> Engine<H> {
    /// Unwrap a hook result of instance `id`.
    ///
    /// `Ok(None)` means the error was delivered to a boundary and the caller
    /// carries on with a fallback.
    pub(crate) fn capture<T>(
        &mut self,
        id: InstanceId,
        result: HookResult<T>,
    ) -> Result<Option<T>, RenderError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                let name = self.instance(id).map_or("<released>", |data| data.name());
                self.route_error(Some(id), name, err)?;
                Ok(None)
            }
        }
    }

    /// Deliver `err` to the first boundary at or above `origin`.
    ///
    /// The boundary's DISABLE flag is lifted while `did_catch` runs so that
    /// state requests made there are scheduled, then restored.
    pub(crate) fn route_error(
        &mut self,
        origin: Option<InstanceId>,
        component: &'static str,
        err: anyhow::Error,
    ) -> Result<(), RenderError> {
        let Some(boundary) = origin.and_then(|id| self.find_boundary(id)) else {
            error!(component, error = %err, "error reached the root without a boundary");
            return Err(RenderError::uncaught(component, err));
        };

        let owner = self.owner.current();
        let Instance { component: target, data } = self
            .registry
            .get_mut(boundary)
            .ok_or(RenderError::StaleInstance(boundary))?;
        warn!(component, boundary = data.name(), error = %err, "error captured by boundary");

        let disabled = data.flags.contains(InstanceFlags::DISABLE);
        data.flags.remove(InstanceFlags::DISABLE);
        {
            let mut scope = Scope::new(boundary, data, &mut self.render_queue, owner);
            if let Some(handler) = target.as_boundary() {
                handler.did_catch(&err, &mut scope);
            }
        }
        data.flags.set(InstanceFlags::DISABLE, disabled);
        Ok(())
    }

    fn find_boundary(&mut self, origin: InstanceId) -> Option<InstanceId> {
        let chain: Vec<InstanceId> = self.registry.ancestors(origin).collect();
        chain.into_iter().find(|id| {
            self.registry
                .get_mut(*id)
                .is_some_and(|instance| instance.component.as_boundary().is_some())
        })
    }
}
