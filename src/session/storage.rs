//! File I/O for session persistence.
//!
//! Sessions are stored in `~/.config/paneworks/last_session.yaml` by
//! default; the embedding application can point the `_to`/`_from`
//! variants anywhere.

use super::SessionState;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Default path of the session state file.
pub fn session_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("paneworks")
        .join("last_session.yaml")
}

/// Save session state to the default location.
pub fn save_session(state: &SessionState) -> Result<()> {
    save_session_to(state, session_path())
}

/// Save session state to a specific file.
pub fn save_session_to(state: &SessionState, path: PathBuf) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {parent:?}"))?;
    }

    let contents =
        serde_yaml_ng::to_string(state).context("Failed to serialize session state")?;

    std::fs::write(&path, contents)
        .with_context(|| format!("Failed to write session state to {path:?}"))?;

    log::info!("Saved session state ({} tabs) to {:?}", state.tabs.len(), path);
    Ok(())
}

/// Load session state from the default location.
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but is corrupt.
pub fn load_session() -> Result<Option<SessionState>> {
    load_session_from(session_path())
}

/// Load session state from a specific file.
pub fn load_session_from(path: PathBuf) -> Result<Option<SessionState>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read session state from {path:?}"))?;

    if contents.trim().is_empty() {
        return Ok(None);
    }

    let state: SessionState = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse session state from {path:?}"))?;

    log::info!(
        "Loaded session state ({} tabs) from {:?}",
        state.tabs.len(),
        path
    );
    Ok(Some(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdAllocator;
    use crate::session::{SessionPaneNode, SessionTab};
    use tempfile::tempdir;

    fn sample_session() -> SessionState {
        let mut ids = IdAllocator::new();
        let tab = ids.next_tab_id();
        let pane = ids.next_pane_id();
        let widget = ids.next_widget_id();
        SessionState {
            next_id: ids.high_water(),
            active_tab: Some(tab),
            tabs: vec![SessionTab {
                id: tab,
                title: "work".to_string(),
                active_pane: pane,
                zoomed: None,
                layout: SessionPaneNode::Leaf {
                    id: pane,
                    widget,
                    payload: None,
                },
            }],
        }
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nonexistent.yaml");
        let result = load_session_from(path).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_empty_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("empty.yaml");
        std::fs::write(&path, "").unwrap();
        let result = load_session_from(path).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_corrupt_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("corrupt.yaml");
        std::fs::write(&path, "not: valid: yaml: [[[").unwrap();
        let result = load_session_from(path);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("session.yaml");

        let state = sample_session();
        save_session_to(&state, path.clone()).unwrap();

        let loaded = load_session_from(path).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("nested").join("dir").join("session.yaml");

        let state = sample_session();
        save_session_to(&state, path.clone()).unwrap();
        assert!(path.exists());
    }
}
