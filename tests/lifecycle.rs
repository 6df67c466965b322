mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{inner, log, root_instance, setup, take_log};
use spark_vdom::{
    Component, Context, Engine, HookResult, Host, InstanceId, LifecycleObserver, LifecycleState,
    MemoryHost, NativeId, Node, Options, Props, RefSpec, RefTarget, Scope, State, Value,
};

fn int(props: &Props, key: &str) -> i64 {
    props.get(key).and_then(Value::as_int).unwrap_or(0)
}

fn flag(props: &Props, key: &str) -> bool {
    props.get(key).and_then(Value::as_bool).unwrap_or(false)
}

// =============================================================================
// Components
// =============================================================================

struct Parent;

impl Component for Parent {
    fn create(_: &Props, _: &Context) -> Self {
        Parent
    }

    fn will_mount(&mut self, _: &mut Scope<'_>) -> HookResult {
        log("Parent.will_mount");
        Ok(())
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        log("Parent.render");
        let label = scope.props().get("label").cloned().unwrap_or_default();
        Ok(Node::element("div")
            .child(Node::component::<Child>(Props::new().with("label", label)))
            .into())
    }

    fn did_mount(&mut self, _: &mut Scope<'_>) -> HookResult {
        log("Parent.did_mount");
        Ok(())
    }
}

struct Child;

impl Component for Child {
    fn create(_: &Props, _: &Context) -> Self {
        Child
    }

    fn will_mount(&mut self, _: &mut Scope<'_>) -> HookResult {
        log("Child.will_mount");
        Ok(())
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        log("Child.render");
        let label = scope.props().get("label").map(ToString::to_string).unwrap_or_default();
        Ok(Node::element("span").child(label).into())
    }

    fn did_mount(&mut self, _: &mut Scope<'_>) -> HookResult {
        log("Child.did_mount");
        Ok(())
    }

    fn will_receive_props(&mut self, next_props: &Props, _: &Context, _: &mut Scope<'_>) -> HookResult {
        log(format!("Child.will_receive_props {}", next_props.get("label").map(ToString::to_string).unwrap_or_default()));
        Ok(())
    }

    fn will_unmount(&mut self, _: &mut Scope<'_>) -> HookResult {
        log("Child.will_unmount");
        Ok(())
    }
}

/// Renders `value`; refuses updates whose next props carry `block`.
struct Gate;

impl Component for Gate {
    fn create(_: &Props, _: &Context) -> Self {
        Gate
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        log("Gate.render");
        Ok(Node::text(int(scope.props(), "value").to_string()))
    }

    fn should_update(
        &mut self,
        next_props: &Props,
        _: &State,
        _: &Context,
        scope: &mut Scope<'_>,
    ) -> HookResult<bool> {
        log(format!(
            "Gate.should_update current={} next={}",
            int(scope.props(), "value"),
            int(next_props, "value")
        ));
        Ok(!flag(next_props, "block"))
    }
}

/// Requests state changes from various hooks depending on its props.
struct Counter;

impl Component for Counter {
    fn create(_: &Props, _: &Context) -> Self {
        Counter
    }

    fn initial_state(&self, _: &Props) -> State {
        State::new().with("count", 0)
    }

    fn will_mount(&mut self, scope: &mut Scope<'_>) -> HookResult {
        if flag(scope.props(), "early") {
            scope.set_state(State::new().with("count", 10));
        }
        Ok(())
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        let count = int(scope.state(), "count");
        log(format!("Counter.render {count}"));
        Ok(Node::text(count.to_string()))
    }

    fn did_mount(&mut self, scope: &mut Scope<'_>) -> HookResult {
        if flag(scope.props(), "bump") {
            scope.set_state(State::new().with("count", 20));
            scope.set_state(State::new().with("count", 30));
        }
        if flag(scope.props(), "callbacks") {
            scope.set_state_with(State::new().with("count", 1), |scope: &mut Scope<'_>| {
                log(format!("first {}", int(scope.state(), "count")));
            });
            scope.set_state_with(State::new().with("count", 2), |scope: &mut Scope<'_>| {
                log(format!("second {}", int(scope.state(), "count")));
            });
        }
        Ok(())
    }
}

/// Mirrors incoming props into state from `will_receive_props`.
struct Mirror;

impl Component for Mirror {
    fn create(_: &Props, _: &Context) -> Self {
        Mirror
    }

    fn will_receive_props(&mut self, next_props: &Props, _: &Context, scope: &mut Scope<'_>) -> HookResult {
        log(format!("Mirror.disabled={}", scope.is_disabled()));
        scope.set_state(State::new().with("seen", int(next_props, "value")));
        Ok(())
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        Ok(Node::text(format!(
            "v{}-s{}",
            int(scope.props(), "value"),
            int(scope.state(), "seen")
        )))
    }
}

/// Carries a named ref on its root element while `show` is set.
struct Labelled;

impl Component for Labelled {
    fn create(_: &Props, _: &Context) -> Self {
        Labelled
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        let root = Node::element("div").child("box");
        Ok(if flag(scope.props(), "show") {
            root.with_ref(RefSpec::named("box")).into()
        } else {
            root.into()
        })
    }

    fn did_mount(&mut self, scope: &mut Scope<'_>) -> HookResult {
        log(format!("Labelled.did_mount ref={}", scope.get_ref("box").is_some()));
        Ok(())
    }
}

struct Provider;

impl Component for Provider {
    fn create(_: &Props, _: &Context) -> Self {
        Provider
    }

    fn child_context(&self, _: &Scope<'_>) -> Option<Context> {
        Some(Context::new().with("theme", "dark"))
    }

    fn render(&mut self, _: &mut Scope<'_>) -> HookResult<Node> {
        Ok(Node::element("main")
            .child(Node::component::<Consumer>(Props::new()))
            .into())
    }
}

struct Consumer;

impl Component for Consumer {
    fn create(_: &Props, _: &Context) -> Self {
        Consumer
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        let theme = scope.context().get("theme").map(ToString::to_string);
        Ok(Node::text(theme.unwrap_or_else(|| "none".to_string())))
    }
}

/// Swaps its root from text to an element once mounted.
struct Inner;

impl Component for Inner {
    fn create(_: &Props, _: &Context) -> Self {
        Inner
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        Ok(if flag(scope.state(), "bold") {
            Node::element("b").child("el").into()
        } else {
            Node::text("el")
        })
    }

    fn did_mount(&mut self, scope: &mut Scope<'_>) -> HookResult {
        scope.set_state(State::new().with("bold", true));
        Ok(())
    }
}

/// Renders `Inner` as its root.
struct Outer;

impl Component for Outer {
    fn create(_: &Props, _: &Context) -> Self {
        Outer
    }

    fn render(&mut self, _: &mut Scope<'_>) -> HookResult<Node> {
        Ok(Node::component::<Inner>(Props::new()).into())
    }
}

fn theme(context: &Context) -> String {
    context.get("theme").map(ToString::to_string).unwrap_or_default()
}

/// Logs the arguments its update hooks receive.
struct Tracker;

impl Component for Tracker {
    fn create(_: &Props, _: &Context) -> Self {
        Tracker
    }

    fn initial_state(&self, _: &Props) -> State {
        State::new().with("count", 0)
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        log(format!(
            "render value={} count={}",
            int(scope.props(), "value"),
            int(scope.state(), "count")
        ));
        Ok(Node::text("t"))
    }

    fn did_mount(&mut self, scope: &mut Scope<'_>) -> HookResult {
        if flag(scope.props(), "bump") {
            scope.set_state_with(State::new().with("count", 7), |scope: &mut Scope<'_>| {
                log(format!("callback count={}", int(scope.state(), "count")));
            });
        }
        Ok(())
    }

    fn will_update(
        &mut self,
        next_props: &Props,
        next_state: &State,
        next_context: &Context,
        scope: &mut Scope<'_>,
    ) -> HookResult {
        log(format!(
            "will_update next=({}, {}, {}) current={}",
            int(next_props, "value"),
            int(next_state, "count"),
            theme(next_context),
            int(scope.props(), "value")
        ));
        Ok(())
    }

    fn did_update(
        &mut self,
        prev_props: &Props,
        prev_state: &State,
        prev_context: &Context,
        scope: &mut Scope<'_>,
    ) -> HookResult {
        log(format!(
            "did_update prev=({}, {}, {}) current=({}, {})",
            int(prev_props, "value"),
            int(prev_state, "count"),
            theme(prev_context),
            int(scope.props(), "value"),
            int(scope.state(), "count")
        ));
        Ok(())
    }
}

/// Provides a theme and forwards its props to a `Tracker`.
struct Themed;

impl Component for Themed {
    fn create(_: &Props, _: &Context) -> Self {
        Themed
    }

    fn child_context(&self, _: &Scope<'_>) -> Option<Context> {
        Some(Context::new().with("theme", "dark"))
    }

    fn render(&mut self, scope: &mut Scope<'_>) -> HookResult<Node> {
        Ok(Node::component::<Tracker>(scope.props().clone()).into())
    }
}

struct UpdateLog;

impl LifecycleObserver for UpdateLog {
    fn after_update(&self, _: InstanceId) {
        log("after_update");
    }
}

fn observed() -> (Engine<MemoryHost>, NativeId) {
    common::init_tracing();
    take_log();
    let mut engine = Engine::builder(MemoryHost::new())
        .options(Options::new().observer(UpdateLog))
        .build();
    let container = engine.host_mut().create_element("root");
    (engine, container)
}

// =============================================================================
// Mount
// =============================================================================

#[test]
fn test_mount_order_and_single_did_mount() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Parent>(Props::new().with("label", "hello")).into(), container)
        .unwrap();

    assert_eq!(
        take_log(),
        vec![
            "Parent.will_mount",
            "Parent.render",
            "Child.will_mount",
            "Child.render",
            "Parent.did_mount",
            "Child.did_mount",
        ]
    );
    assert_eq!(inner(&engine, container), "<div><span>hello</span></div>");

    let id = root_instance(&engine, container);
    let data = engine.instance(id).unwrap();
    assert!(data.dom().is_some());
    assert_eq!(data.lifecycle(), LifecycleState::Mounted);
    assert!(!data.is_dirty());
    assert!(!data.is_disabled());
    assert_eq!(engine.instance_count(), 2);
    assert_eq!(engine.pending_deferred(), 0);
    assert_eq!(engine.current_owner(), None);
}

#[test]
fn test_child_instance_records_parent() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Parent>(Props::new()).into(), container)
        .unwrap();

    let parent = root_instance(&engine, container);
    let Some(Node::Element(div)) = engine.instance(parent).unwrap().rendered() else {
        panic!("parent renders a div");
    };
    let Node::Component(child) = &div.children[0] else { panic!("div holds the child") };
    let child = engine.instance(child.instance.unwrap()).unwrap();
    assert_eq!(child.parent(), Some(parent));
    assert_eq!(child.name(), "Child");
}

#[test]
fn test_child_context_reaches_descendants() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Provider>(Props::new()).into(), container)
        .unwrap();
    assert_eq!(inner(&engine, container), "<main>dark</main>");
}

// =============================================================================
// Update
// =============================================================================

#[test]
fn test_new_props_flow_to_existing_child() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Parent>(Props::new().with("label", "a")).into(), container)
        .unwrap();
    let count = engine.instance_count();
    take_log();

    engine
        .render(Node::component::<Parent>(Props::new().with("label", "b")).into(), container)
        .unwrap();

    assert_eq!(inner(&engine, container), "<div><span>b</span></div>");
    assert_eq!(engine.instance_count(), count);
    let log = take_log();
    assert!(log.contains(&"Child.will_receive_props b".to_string()));
    assert!(!log.iter().any(|entry| entry.ends_with("will_mount")));
}

#[test]
fn test_should_update_false_keeps_tree_and_advances_prev() {
    let (mut engine, container) = setup();
    let dom = engine
        .render(Node::component::<Gate>(Props::new().with("value", 1)).into(), container)
        .unwrap();
    let id = root_instance(&engine, container);
    take_log();

    let same = engine
        .render(
            Node::component::<Gate>(Props::new().with("value", 2).with("block", true)).into(),
            container,
        )
        .unwrap();

    assert_eq!(same, dom);
    assert_eq!(inner(&engine, container), "1");
    // Evaluated with the previous props still visible
    assert_eq!(take_log(), vec!["Gate.should_update current=1 next=2"]);

    let data = engine.instance(id).unwrap();
    assert_eq!(data.props().get("value"), Some(&Value::Int(2)));
    assert_eq!(data.prev_props().and_then(|p| p.get("value")), Some(&Value::Int(2)));
    assert!(matches!(data.rendered(), Some(Node::Text(text)) if text.text == "1"));
}

#[test]
fn test_prop_update_hook_arguments_and_order() {
    let (mut engine, container) = observed();
    engine
        .render(Node::component::<Themed>(Props::new().with("value", 1)).into(), container)
        .unwrap();
    assert_eq!(take_log(), vec!["render value=1 count=0"]);

    engine
        .render(Node::component::<Themed>(Props::new().with("value", 2)).into(), container)
        .unwrap();

    assert_eq!(
        take_log(),
        vec![
            // will_update sees the next values while the scope still shows the old props
            "will_update next=(2, 0, dark) current=1",
            "render value=2 count=0",
            "did_update prev=(1, 0, dark) current=(2, 0)",
            // Tracker, then Themed
            "after_update",
            "after_update",
        ]
    );
}

#[test]
fn test_state_update_hook_arguments_and_order() {
    let (mut engine, container) = observed();
    engine
        .render(
            Node::component::<Themed>(Props::new().with("value", 1).with("bump", true)).into(),
            container,
        )
        .unwrap();
    take_log();

    assert_eq!(engine.rerender().unwrap(), 1);

    assert_eq!(
        take_log(),
        vec![
            "will_update next=(1, 7, dark) current=1",
            "render value=1 count=7",
            "did_update prev=(1, 0, dark) current=(1, 7)",
            "callback count=7",
            "after_update",
        ]
    );
}

#[test]
fn test_state_driven_root_swap_retargets_parent() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Outer>(Props::new()).into(), container)
        .unwrap();
    assert_eq!(inner(&engine, container), "el");

    assert_eq!(engine.rerender().unwrap(), 1);
    assert_eq!(inner(&engine, container), "<b>el</b>");

    let outer = root_instance(&engine, container);
    let b = engine.host().children(container)[0];
    assert_eq!(engine.instance(outer).unwrap().dom(), Some(b));

    // The root patch anchors on the element, not the detached text
    engine.render(Node::text("after"), container).unwrap();
    assert_eq!(inner(&engine, container), "after");
    assert_eq!(engine.instance_count(), 0);
}

#[test]
fn test_force_update_skips_should_update() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Gate>(Props::new().with("value", 5)).into(), container)
        .unwrap();
    let id = root_instance(&engine, container);
    take_log();

    engine.force_update(id).unwrap();
    assert_eq!(take_log(), vec!["Gate.render"]);
}

#[test]
fn test_will_receive_props_runs_disabled() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Mirror>(Props::new().with("value", 1)).into(), container)
        .unwrap();
    assert_eq!(inner(&engine, container), "v1-s0");

    engine
        .render(Node::component::<Mirror>(Props::new().with("value", 2)).into(), container)
        .unwrap();

    assert_eq!(take_log(), vec!["Mirror.disabled=true"]);
    // The state request was folded into the same pass, not queued
    assert_eq!(engine.pending_renders(), 0);
    assert_eq!(inner(&engine, container), "v2-s2");
}

// =============================================================================
// State requests
// =============================================================================

#[test]
fn test_set_state_while_disabled_does_not_enqueue() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Counter>(Props::new().with("early", true)).into(), container)
        .unwrap();

    assert_eq!(engine.pending_renders(), 0);
    assert_eq!(inner(&engine, container), "10");
    assert_eq!(take_log(), vec!["Counter.render 10"]);
}

#[test]
fn test_set_state_enqueues_once_and_rerender_applies() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Counter>(Props::new().with("bump", true)).into(), container)
        .unwrap();
    let id = root_instance(&engine, container);

    assert_eq!(engine.pending_renders(), 1);
    assert!(engine.instance(id).unwrap().is_dirty());
    assert_eq!(inner(&engine, container), "0");

    assert_eq!(engine.rerender().unwrap(), 1);
    assert_eq!(inner(&engine, container), "30");
    assert_eq!(engine.pending_renders(), 0);
    assert!(!engine.instance(id).unwrap().is_dirty());
    assert_eq!(engine.rerender().unwrap(), 0);
}

#[test]
fn test_rerender_drains_callbacks_lifo() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Counter>(Props::new().with("callbacks", true)).into(), container)
        .unwrap();
    let id = root_instance(&engine, container);
    assert_eq!(engine.instance(id).unwrap().pending_callbacks(), 2);
    take_log();

    engine.rerender().unwrap();

    assert_eq!(take_log(), vec!["Counter.render 2", "second 2", "first 2"]);
    assert_eq!(engine.instance(id).unwrap().pending_callbacks(), 0);
}

// =============================================================================
// Refs & unmount
// =============================================================================

#[test]
fn test_unmount_releases_instance_and_detaches_ref_once() {
    let (mut engine, container) = setup();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let node = Node::component::<Child>(Props::new().with("label", "x"))
        .with_ref(RefSpec::callback(move |target| sink.borrow_mut().push(target)));

    engine.render(node.into(), container).unwrap();
    let id = root_instance(&engine, container);
    assert_eq!(*seen.borrow(), vec![Some(RefTarget::Instance(id))]);
    take_log();

    assert!(engine.unmount_at(container).unwrap());

    assert_eq!(*seen.borrow(), vec![Some(RefTarget::Instance(id)), None]);
    assert_eq!(take_log(), vec!["Child.will_unmount"]);
    assert!(engine.instance(id).is_none());
    assert!(!engine.is_mounted(id));
    assert_eq!(engine.instance_count(), 0);
    assert_eq!(inner(&engine, container), "");
}

#[test]
fn test_nested_unmount_releases_every_instance() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Parent>(Props::new()).into(), container)
        .unwrap();
    assert_eq!(engine.instance_count(), 2);

    engine.render(Node::text("gone"), container).unwrap();

    assert_eq!(engine.instance_count(), 0);
    assert_eq!(inner(&engine, container), "gone");
    assert!(take_log().contains(&"Child.will_unmount".to_string()));
}

#[test]
fn test_named_ref_resolves_on_owner_and_is_removed() {
    let (mut engine, container) = setup();
    engine
        .render(Node::component::<Labelled>(Props::new().with("show", true)).into(), container)
        .unwrap();
    let id = root_instance(&engine, container);
    let div = engine.instance(id).unwrap().dom().unwrap();

    assert_eq!(take_log(), vec!["Labelled.did_mount ref=true"]);
    assert_eq!(engine.instance(id).unwrap().get_ref("box"), Some(RefTarget::Native(div)));

    engine
        .render(Node::component::<Labelled>(Props::new().with("show", false)).into(), container)
        .unwrap();
    assert_eq!(engine.instance(id).unwrap().get_ref("box"), None);
}
