//! Tests for session capture, persistence, and restore.

use paneworks::session::{self, SessionState};
use paneworks::{CapabilityRegistry, SplitOrientation, WorkspaceModel};
use tempfile::tempdir;

fn workspace_with_layout() -> (WorkspaceModel, CapabilityRegistry) {
    let registry = CapabilityRegistry::new();
    let mut model = WorkspaceModel::new();

    // Tab 1: three panes with a nested split and an adjusted ratio.
    let t1 = model.new_tab("editor", &registry);
    let a = model.get_tab(t1).unwrap().active_pane_id();
    let b = model
        .split_pane(a, SplitOrientation::Horizontal, &registry)
        .unwrap();
    model
        .split_pane(b, SplitOrientation::Vertical, &registry)
        .unwrap();
    model.resize_pane(a, SplitOrientation::Horizontal, 0.15).unwrap();

    // Tab 2: single pane, zoom engaged.
    let t2 = model.new_tab("logs", &registry);
    let p2 = model.get_tab(t2).unwrap().active_pane_id();
    model.maximize_pane(p2).unwrap();

    // Tab 3: plain.
    model.new_tab("scratch", &registry);
    model.switch_to(t1);

    (model, registry)
}

/// An empty workspace round-trips to an empty workspace.
#[test]
fn test_empty_workspace_roundtrip() {
    let model = WorkspaceModel::new();
    let restored = session::restore(&session::capture(&model)).unwrap();
    assert_eq!(restored, model);
}

/// Capture and restore reproduce the full model: topology, ratios,
/// focus, zoom, and tab order. The allocator is compared by behavior in
/// the collision test below, since restore levels its per-kind counters.
#[test]
fn test_full_workspace_roundtrip() {
    let (model, _) = workspace_with_layout();
    let restored = session::restore(&session::capture(&model)).unwrap();
    assert_eq!(restored.tabs(), model.tabs());
    assert_eq!(restored.active_tab_id(), model.active_tab_id());
    restored.validate().unwrap();
}

/// The document survives YAML serialization unchanged.
#[test]
fn test_yaml_roundtrip_preserves_document() {
    let (model, _) = workspace_with_layout();
    let state = session::capture(&model);

    let yaml = serde_yaml_ng::to_string(&state).unwrap();
    let reparsed: SessionState = serde_yaml_ng::from_str(&yaml).unwrap();
    assert_eq!(reparsed, state);
    assert_eq!(session::restore(&reparsed).unwrap().tabs(), model.tabs());
}

/// Save-to-file and load-from-file round-trip through the storage layer.
#[test]
fn test_storage_roundtrip() {
    let (model, _) = workspace_with_layout();
    let state = session::capture(&model);

    let temp = tempdir().unwrap();
    let path = temp.path().join("session.yaml");
    session::storage::save_session_to(&state, path.clone()).unwrap();

    let loaded = session::storage::load_session_from(path).unwrap().unwrap();
    assert_eq!(loaded, state);
    assert_eq!(session::restore(&loaded).unwrap().tabs(), model.tabs());
}

/// Ids minted after a restore never collide with restored ids.
#[test]
fn test_post_restore_ids_do_not_collide() {
    let (model, registry) = workspace_with_layout();
    let state = session::capture(&model);

    let mut restored = session::restore(&state).unwrap();
    let old_tabs: Vec<_> = state.tabs.iter().map(|t| t.id).collect();
    let old_panes: Vec<_> = model
        .tabs()
        .iter()
        .flat_map(|t| t.panes().all_pane_ids())
        .collect();

    let new_tab = restored.new_tab("fresh", &registry);
    assert!(!old_tabs.contains(&new_tab));

    let seed_pane = restored.get_tab(new_tab).unwrap().active_pane_id();
    assert!(!old_panes.contains(&seed_pane));
    let split_pane = restored
        .split_pane(seed_pane, SplitOrientation::Vertical, &registry)
        .unwrap();
    assert!(!old_panes.contains(&split_pane));

    restored.validate().unwrap();
}

/// A tampered document with a duplicated id is rejected, not restored
/// into a corrupt workspace.
#[test]
fn test_restore_rejects_duplicate_ids() {
    let (model, _) = workspace_with_layout();
    let mut state = session::capture(&model);

    let duplicate = state.tabs[0].id;
    state.tabs[2].id = duplicate;
    assert!(session::restore(&state).is_err());
}

/// A corrupt file errors on load; a missing file is simply absent.
#[test]
fn test_storage_handles_missing_and_corrupt_files() {
    let temp = tempdir().unwrap();

    let missing = temp.path().join("missing.yaml");
    assert!(session::storage::load_session_from(missing).unwrap().is_none());

    let corrupt = temp.path().join("corrupt.yaml");
    std::fs::write(&corrupt, "tabs: [this is not a tab]").unwrap();
    assert!(session::storage::load_session_from(corrupt).is_err());
}
