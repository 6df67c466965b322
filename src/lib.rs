//! # spark-vdom
//!
//! Reconciliation and lifecycle engine for a declarative UI library.
//!
//! A tree of lightweight [`Node`] descriptors is turned into native nodes on
//! a [`Host`] surface, and stateful [`Component`]s are driven through mount,
//! update and unmount.
//!
//! ## Architecture
//!
//! Component instances live in a generation-checked arena inside the
//! [`Engine`]; mounted component nodes only carry an [`InstanceId`]. The
//! rendering pipeline is synchronous:
//! ```text
//! Engine::render → materialize → mount_component → render → materialize …
//!                                       │
//!                   Deferred queue ← did_mount, component refs
//! ```
//!
//! Hook failures are [`anyhow::Error`]s routed to the nearest ancestor that
//! is an [`ErrorBoundary`]; failures nobody catches surface as
//! [`RenderError::Uncaught`].
//!
//! ## Modules
//!
//! - [`types`] - Core types (ids, values, props, refs)
//! - [`node`] - Node descriptors
//! - [`component`] - Component trait, instance records, scope
//! - [`engine`] - Engine, registries, queues
//! - [`pipeline`] - Materializer and lifecycle engine
//! - [`renderer`] - Patcher, property and ref collaborators
//! - [`host`] - Native surface trait and an in-memory surface

pub mod component;
pub mod engine;
pub mod error;
pub mod host;
pub mod node;
pub mod options;
pub mod pipeline;
pub mod renderer;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use component::{
    Component, ComponentType, ErrorBoundary, InstanceData, InstanceFlags, LifecycleState, Scope,
    StatelessFn,
};

pub use engine::{Engine, EngineBuilder};

pub use error::{HookResult, RenderError};

pub use host::{Host, MemoryHost};

pub use node::{ComponentNode, ElementNode, Node, StatelessNode, TextNode, VoidNode, Widget, WidgetNode};

pub use options::{LifecycleObserver, NoopObserver, Options, SvgSupport};

pub use pipeline::{Lifecycle, Materialize, MountScope};

pub use renderer::{AttributePatcher, DefaultRefs, KeylessDiff, PropPatch, Reconcile, RefBinding, RefHandler};
