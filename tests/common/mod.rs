//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Once;

use spark_vdom::{Engine, Host, InstanceId, MemoryHost, NativeId, Node};
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a fmt subscriber writing through the test harness.
/// `RUST_LOG=spark_vdom=trace cargo test` shows the engine's transitions.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Record a hook invocation.
pub fn log(entry: impl Into<String>) {
    LOG.with(|log| log.borrow_mut().push(entry.into()));
}

/// Drain the hook log.
pub fn take_log() -> Vec<String> {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

/// An engine over a fresh in-memory host plus a `<root>` container.
pub fn setup() -> (Engine<MemoryHost>, NativeId) {
    setup_with(MemoryHost::new())
}

pub fn setup_with(host: MemoryHost) -> (Engine<MemoryHost>, NativeId) {
    init_tracing();
    take_log();
    let mut engine = Engine::new(host);
    let container = engine.host_mut().create_element("root");
    (engine, container)
}

/// Markup of everything inside `container`, without the container tag.
pub fn inner(engine: &Engine<MemoryHost>, container: NativeId) -> String {
    engine
        .host()
        .children(container)
        .into_iter()
        .map(|child| engine.host().markup(child))
        .collect()
}

/// Instance backing the component rendered at the root of `container`.
pub fn root_instance(engine: &Engine<MemoryHost>, container: NativeId) -> InstanceId {
    match engine.root(container) {
        Some(Node::Component(component)) => component.instance.expect("root component is mounted"),
        other => panic!("expected a component root, found {other:?}"),
    }
}
