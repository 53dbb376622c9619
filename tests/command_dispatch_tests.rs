//! Tests for the command dispatch layer: parameter handling, guards,
//! atomicity, stale-id classification, and observer publication.

use paneworks::commands::{CommandResult, CommandSpec};
use paneworks::{
    CapabilityRegistry, ChangeKind, CommandStatus, Dispatcher, WorkspaceModel,
};
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;

fn setup() -> (WorkspaceModel, CapabilityRegistry, Dispatcher) {
    (
        WorkspaceModel::new(),
        CapabilityRegistry::new(),
        Dispatcher::with_builtins(),
    )
}

fn dispatch(
    dispatcher: &mut Dispatcher,
    model: &mut WorkspaceModel,
    registry: &CapabilityRegistry,
    name: &str,
    params: Value,
) -> CommandResult {
    dispatcher.dispatch(model, registry, name, params)
}

// ── Resolution and parameters ────────────────────────────────────────────

/// Dispatching an unregistered name fails without touching the model.
#[test]
fn test_unknown_command_fails() {
    let (mut model, registry, mut dispatcher) = setup();
    let result = dispatch(&mut dispatcher, &mut model, &registry, "tab.explode", Value::Null);
    assert_eq!(result.status, CommandStatus::Failure);
    assert!(result.reason.unwrap().contains("unknown command"));
    assert!(model.is_empty());
}

/// Parameters must be a JSON object (or null).
#[test]
fn test_params_must_be_an_object() {
    let (mut model, registry, mut dispatcher) = setup();
    let result = dispatch(&mut dispatcher, &mut model, &registry, "tab.new", json!(42));
    assert_eq!(result.status, CommandStatus::Failure);
    assert!(model.is_empty());
}

/// Registration-time defaults fill in omitted parameters; caller values win.
#[test]
fn test_default_parameters_and_overrides() {
    let (mut model, registry, mut dispatcher) = setup();

    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);
    assert_eq!(model.tabs()[0].title, "untitled");

    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", json!({ "title": "work" }));
    assert_eq!(model.tabs()[1].title, "work");
}

/// The full built-in set is registered.
#[test]
fn test_builtins_are_registered() {
    let (_, _, dispatcher) = setup();
    for name in [
        "tab.new",
        "tab.close",
        "tab.rename",
        "tab.select",
        "tab.next",
        "tab.previous",
        "tab.move",
        "pane.split",
        "pane.close",
        "pane.focus",
        "pane.maximize",
        "pane.restore",
        "pane.even_sizes",
        "pane.extract_to_tab",
        "pane.resize",
        "navigation.left",
        "navigation.right",
        "navigation.up",
        "navigation.down",
        "workspace.snapshot",
        "workspace.refresh_capabilities",
    ] {
        assert!(dispatcher.registry().contains(name), "missing {name}");
    }
}

// ── Guards and not-applicable outcomes ───────────────────────────────────

/// Pane commands are guarded: with no tabs they are not applicable and
/// the model is untouched.
#[test]
fn test_guard_rejects_pane_commands_without_tabs() {
    let (mut model, registry, mut dispatcher) = setup();
    let before = model.clone();

    for name in ["pane.split", "pane.close", "navigation.right", "tab.close"] {
        let result = dispatch(&mut dispatcher, &mut model, &registry, name, Value::Null);
        assert_eq!(result.status, CommandStatus::NotApplicable, "{name}");
    }
    assert_eq!(model, before);
}

/// Closing the last pane of a tab is a no-op, not an error.
#[test]
fn test_close_last_pane_is_not_applicable() {
    let (mut model, registry, mut dispatcher) = setup();
    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);

    let before = model.clone();
    let result = dispatch(&mut dispatcher, &mut model, &registry, "pane.close", Value::Null);
    assert_eq!(result.status, CommandStatus::NotApplicable);
    assert_eq!(model, before);
}

/// A pane id that existed once maps to NotApplicable; one that never
/// existed maps to Failure.
#[test]
fn test_stale_id_versus_unknown_id() {
    let (mut model, registry, mut dispatcher) = setup();
    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);
    let split = dispatch(&mut dispatcher, &mut model, &registry, "pane.split", Value::Null);
    let pane_id = split.payload.unwrap()["pane_id"].as_u64().unwrap();

    let closed = dispatch(
        &mut dispatcher,
        &mut model,
        &registry,
        "pane.close",
        json!({ "pane_id": pane_id }),
    );
    assert_eq!(closed.status, CommandStatus::Success);

    // Closed earlier: repeat-safe.
    let again = dispatch(
        &mut dispatcher,
        &mut model,
        &registry,
        "pane.close",
        json!({ "pane_id": pane_id }),
    );
    assert_eq!(again.status, CommandStatus::NotApplicable);

    // Never allocated: caller bug.
    let bogus = dispatch(
        &mut dispatcher,
        &mut model,
        &registry,
        "pane.close",
        json!({ "pane_id": 9999 }),
    );
    assert_eq!(bogus.status, CommandStatus::Failure);
}

/// An id of the wrong kind never named a pane: it is a caller bug, not a
/// repeat-safe reference to something closed.
#[test]
fn test_other_kind_id_is_unknown_not_stale() {
    let (mut model, registry, mut dispatcher) = setup();
    let created = dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);
    let tab_raw = created.payload.unwrap()["tab_id"].as_u64().unwrap();
    dispatch(&mut dispatcher, &mut model, &registry, "pane.split", Value::Null);
    let before = model.clone();

    for name in ["pane.close", "pane.focus"] {
        let result = dispatch(
            &mut dispatcher,
            &mut model,
            &registry,
            name,
            json!({ "pane_id": tab_raw }),
        );
        assert_eq!(result.status, CommandStatus::Failure, "{name}");
        assert!(result.reason.unwrap().contains("not found"), "{name}");
    }
    assert_eq!(model, before);
}

/// Extreme reorder deltas clamp to the ends of the tab strip instead of
/// overflowing.
#[test]
fn test_tab_move_extreme_delta_clamps() {
    let (mut model, registry, mut dispatcher) = setup();
    for title in ["a", "b", "c"] {
        dispatch(&mut dispatcher, &mut model, &registry, "tab.new", json!({ "title": title }));
    }

    // "c" is active.
    let result = dispatch(
        &mut dispatcher,
        &mut model,
        &registry,
        "tab.move",
        json!({ "delta": i64::MIN }),
    );
    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(model.tabs()[0].title, "c");

    let result = dispatch(
        &mut dispatcher,
        &mut model,
        &registry,
        "tab.move",
        json!({ "delta": i64::MAX }),
    );
    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(model.tabs()[2].title, "c");
}

/// Re-maximizing the already-zoomed pane succeeds without changing state.
#[test]
fn test_maximize_is_repeat_safe() {
    let (mut model, registry, mut dispatcher) = setup();
    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);
    dispatch(&mut dispatcher, &mut model, &registry, "pane.split", Value::Null);

    let first = dispatch(&mut dispatcher, &mut model, &registry, "pane.maximize", Value::Null);
    assert_eq!(first.status, CommandStatus::Success);
    let before = model.clone();

    let second = dispatch(&mut dispatcher, &mut model, &registry, "pane.maximize", Value::Null);
    assert_eq!(second.status, CommandStatus::Success);
    assert_eq!(model, before);

    assert_eq!(
        dispatch(&mut dispatcher, &mut model, &registry, "pane.restore", Value::Null).status,
        CommandStatus::Success
    );
    assert_eq!(
        dispatch(&mut dispatcher, &mut model, &registry, "pane.restore", Value::Null).status,
        CommandStatus::NotApplicable
    );
}

// ── Atomicity ────────────────────────────────────────────────────────────

/// A failed command leaves the model structurally identical.
#[test]
fn test_failure_leaves_model_identical() {
    let (mut model, registry, mut dispatcher) = setup();
    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);
    let before = model.clone();

    let result = dispatch(
        &mut dispatcher,
        &mut model,
        &registry,
        "pane.split",
        json!({ "orientation": "diagonal" }),
    );
    assert_eq!(result.status, CommandStatus::Failure);
    assert_eq!(model, before);
}

/// A handler that panics mid-mutation is rolled back and reported as a
/// failure; observers see nothing.
#[test]
fn test_panicking_handler_rolls_back() {
    let (mut model, registry, mut dispatcher) = setup();
    dispatcher
        .registry_mut()
        .register(CommandSpec::new("test.explode", |ctx| {
            ctx.model.new_tab("half-done", ctx.capabilities);
            panic!("boom");
        }));

    let published = Rc::new(RefCell::new(0u32));
    let count = Rc::clone(&published);
    dispatcher.bus_mut().subscribe(move |_| *count.borrow_mut() += 1);

    let before = model.clone();
    let result = dispatch(&mut dispatcher, &mut model, &registry, "test.explode", Value::Null);

    assert_eq!(result.status, CommandStatus::Failure);
    assert!(result.reason.unwrap().contains("boom"));
    assert_eq!(model, before);
    assert_eq!(*published.borrow(), 0);
}

/// Identical command sequences on identical models produce identical
/// states.
#[test]
fn test_dispatch_is_deterministic() {
    let script = [
        ("tab.new", json!({ "title": "alpha" })),
        ("pane.split", json!({ "orientation": "horizontal" })),
        ("pane.split", json!({ "orientation": "vertical" })),
        ("navigation.up", Value::Null),
        ("tab.new", json!({ "title": "beta" })),
        ("tab.previous", Value::Null),
        ("pane.resize", json!({ "orientation": "horizontal", "delta": 0.1 })),
    ];

    let run = || {
        let (mut model, registry, mut dispatcher) = setup();
        for (name, params) in &script {
            dispatch(&mut dispatcher, &mut model, &registry, name, params.clone());
        }
        model
    };

    assert_eq!(run(), run());
}

// ── Observer publication ─────────────────────────────────────────────────

/// Each successful command publishes exactly one change; failed and
/// not-applicable commands publish nothing.
#[test]
fn test_one_publication_per_committed_command() {
    let (mut model, registry, mut dispatcher) = setup();

    let kinds = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&kinds);
    dispatcher
        .bus_mut()
        .subscribe(move |change| sink.borrow_mut().push(change.kind));

    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);
    dispatch(&mut dispatcher, &mut model, &registry, "pane.split", Value::Null);
    // The default split is vertical (full width), so nothing lies left.
    dispatch(&mut dispatcher, &mut model, &registry, "navigation.left", Value::Null); // N/A
    dispatch(&mut dispatcher, &mut model, &registry, "nope", Value::Null); // failure

    assert_eq!(
        *kinds.borrow(),
        vec![ChangeKind::Structural, ChangeKind::Structural]
    );
}

/// Focus commands publish focus-kind changes scoped to the pane.
#[test]
fn test_navigation_publishes_focus_change() {
    let (mut model, registry, mut dispatcher) = setup();
    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", Value::Null);
    dispatch(
        &mut dispatcher,
        &mut model,
        &registry,
        "pane.split",
        json!({ "orientation": "horizontal" }),
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    dispatcher
        .bus_mut()
        .subscribe(move |change| sink.borrow_mut().push(change.clone()));

    let result = dispatch(&mut dispatcher, &mut model, &registry, "navigation.left", Value::Null);
    assert_eq!(result.status, CommandStatus::Success);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, ChangeKind::Focus);
    assert_eq!(seen[0].tab, model.active_tab_id());
    assert_eq!(seen[0].pane, model.active_pane_id());
}

/// workspace.snapshot is read-only: it returns the session document as
/// its payload and publishes nothing.
#[test]
fn test_snapshot_is_quiet_and_readonly() {
    let (mut model, registry, mut dispatcher) = setup();
    dispatch(&mut dispatcher, &mut model, &registry, "tab.new", json!({ "title": "work" }));
    let before = model.clone();

    let published = Rc::new(RefCell::new(0u32));
    let count = Rc::clone(&published);
    dispatcher.bus_mut().subscribe(move |_| *count.borrow_mut() += 1);

    let result = dispatch(&mut dispatcher, &mut model, &registry, "workspace.snapshot", Value::Null);
    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(model, before);
    assert_eq!(*published.borrow(), 0);

    let payload = result.payload.unwrap();
    assert_eq!(payload["tabs"][0]["title"], "work");
}
