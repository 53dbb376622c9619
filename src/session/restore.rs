//! Rebuild a workspace model from a session document.

use super::{SessionPaneNode, SessionState};
use crate::ids::IdAllocator;
use crate::pane::{Pane, PaneManager, PaneNode};
use crate::tab::Tab;
use crate::workspace::{InvariantViolation, WorkspaceModel};
use std::collections::HashSet;
use thiserror::Error;

/// Why a session document could not be turned into a workspace.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestoreError {
    /// Id 0 is the "unset" sentinel and is never allocated.
    #[error("session document uses reserved identifier 0")]
    ReservedId,
    /// The rebuilt workspace failed structural validation.
    #[error("restored workspace is invalid: {0}")]
    Invalid(#[from] InvariantViolation),
}

/// Rebuild a workspace from a saved session.
///
/// The allocator is seeded past both the recorded high-water mark and
/// every id actually present in the document, so ids minted after restore
/// never collide with restored ones and restored ids still classify as
/// allocated (of their kind) when commands receive them later.
///
/// Restored panes carry empty capability sets; call
/// [`WorkspaceModel::refresh_capabilities`] once widgets are rebound.
pub fn restore(state: &SessionState) -> Result<WorkspaceModel, RestoreError> {
    let mut ids = IdAllocator::new();

    let mut tabs = Vec::with_capacity(state.tabs.len());
    for saved in &state.tabs {
        note(saved.id.raw(), &mut ids)?;
        let root = restore_node(&saved.layout, &mut ids)?;
        let panes = PaneManager::from_parts(root, saved.active_pane);
        tabs.push(Tab::from_parts(
            saved.id,
            saved.title.clone(),
            panes,
            saved.zoomed,
        ));
    }

    // The recorded mark also covers ids allocated before the save but no
    // longer present in the document.
    ids.seed(state.next_id);

    let model = WorkspaceModel::from_parts(tabs, state.active_tab, ids);
    model.validate()?;
    log::info!(
        "Restored workspace: {} tabs, sequence high-water {}",
        model.tab_count(),
        model.id_allocator().high_water()
    );
    Ok(model)
}

fn restore_node(node: &SessionPaneNode, ids: &mut IdAllocator) -> Result<PaneNode, RestoreError> {
    match node {
        SessionPaneNode::Leaf { id, widget, .. } => {
            note(id.raw(), ids)?;
            note(widget.raw(), ids)?;
            Ok(PaneNode::leaf(Pane::new(*id, *widget, HashSet::new())))
        }
        SessionPaneNode::Split {
            id,
            orientation,
            ratio,
            first,
            second,
        } => {
            note(id.raw(), ids)?;
            let first = restore_node(first, ids)?;
            let second = restore_node(second, ids)?;
            // Out-of-range ratios are caught by validate() after assembly.
            Ok(PaneNode::Split {
                id: *id,
                orientation: *orientation,
                ratio: *ratio,
                first: Box::new(first),
                second: Box::new(second),
            })
        }
    }
}

fn note(raw: u64, ids: &mut IdAllocator) -> Result<(), RestoreError> {
    if raw == 0 {
        return Err(RestoreError::ReservedId);
    }
    ids.observe(raw);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{IdKind, PaneId, WidgetId};
    use crate::pane::SplitOrientation;
    use crate::session::SessionTab;

    fn leaf(id: PaneId, widget: WidgetId) -> SessionPaneNode {
        SessionPaneNode::Leaf {
            id,
            widget,
            payload: None,
        }
    }

    #[test]
    fn test_restore_seeds_allocator_past_document_ids() {
        let mut minted = IdAllocator::new();
        let tab = minted.next_tab_id();
        let widget = minted.next_widget_id();
        let mut pane = minted.next_pane_id();
        for _ in 0..6 {
            pane = minted.next_pane_id();
        }

        let state = SessionState {
            // Deliberately stale; ids in the document win.
            next_id: 3,
            active_tab: Some(tab),
            tabs: vec![SessionTab {
                id: tab,
                title: "work".into(),
                active_pane: pane,
                zoomed: None,
                layout: leaf(pane, widget),
            }],
        };

        let model = restore(&state).unwrap();
        assert!(model.was_allocated_as(IdKind::Pane, pane.raw()));
        assert!(model.was_allocated_as(IdKind::Tab, tab.raw()));
        let future = minted.next_pane_id();
        assert!(!model.was_allocated(future.raw()));
    }

    #[test]
    fn test_restore_rejects_reserved_id() {
        let mut minted = IdAllocator::new();
        let tab = minted.next_tab_id();
        let widget = minted.next_widget_id();
        let state = SessionState {
            next_id: 5,
            active_tab: Some(tab),
            tabs: vec![SessionTab {
                id: tab,
                title: "bad".into(),
                active_pane: PaneId::from_raw(0),
                zoomed: None,
                layout: leaf(PaneId::from_raw(0), widget),
            }],
        };
        assert_eq!(restore(&state), Err(RestoreError::ReservedId));
    }

    #[test]
    fn test_restore_rejects_unreachable_active_pane() {
        let mut minted = IdAllocator::new();
        let tab = minted.next_tab_id();
        let widget = minted.next_widget_id();
        let in_layout = minted.next_pane_id();
        let elsewhere = minted.next_pane_id();
        let state = SessionState {
            next_id: minted.high_water(),
            active_tab: Some(tab),
            tabs: vec![SessionTab {
                id: tab,
                title: "bad".into(),
                active_pane: elsewhere,
                zoomed: None,
                layout: leaf(in_layout, widget),
            }],
        };
        assert!(matches!(
            restore(&state),
            Err(RestoreError::Invalid(
                InvariantViolation::ActivePaneMissing { .. }
            ))
        ));
    }

    #[test]
    fn test_restore_rejects_bad_ratio() {
        let mut minted = IdAllocator::new();
        let tab = minted.next_tab_id();
        let split = minted.next_split_id();
        let (p1, p2) = (minted.next_pane_id(), minted.next_pane_id());
        let (w1, w2) = (minted.next_widget_id(), minted.next_widget_id());
        let state = SessionState {
            next_id: minted.high_water(),
            active_tab: Some(tab),
            tabs: vec![SessionTab {
                id: tab,
                title: "bad".into(),
                active_pane: p1,
                zoomed: None,
                layout: SessionPaneNode::Split {
                    id: split,
                    orientation: SplitOrientation::Vertical,
                    ratio: 1.5,
                    first: Box::new(leaf(p1, w1)),
                    second: Box::new(leaf(p2, w2)),
                },
            }],
        };
        assert!(matches!(
            restore(&state),
            Err(RestoreError::Invalid(
                InvariantViolation::RatioOutOfRange { .. }
            ))
        ));
    }
}
