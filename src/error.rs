//! Error types.
//!
//! User code (hooks, render functions, widgets) fails with an opaque
//! [`anyhow::Error`]. The engine reports its own failures as [`RenderError`].

use thiserror::Error;

use crate::types::InstanceId;

/// Result type returned by lifecycle hooks and render functions.
pub type HookResult<T = ()> = anyhow::Result<T>;

/// Failure of a mount, update or unmount pass.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The node tree is malformed. Never routed to an error boundary.
    #[error("unsupported node: {0}")]
    UnsupportedNode(&'static str),

    /// A hook or render failed and no ancestor is an error boundary.
    #[error("uncaught error in component `{component}`: {source}")]
    Uncaught {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// The instance was released from the registry.
    #[error("component instance {0} is not mounted")]
    StaleInstance(InstanceId),
}

impl RenderError {
    pub(crate) fn uncaught(component: &'static str, source: anyhow::Error) -> Self {
        RenderError::Uncaught { component, source }
    }

    /// The user error behind an [`RenderError::Uncaught`].
    pub fn user_error(&self) -> Option<&anyhow::Error> {
        match self {
            RenderError::Uncaught { source, .. } => Some(source),
            _ => None,
        }
    }
}
