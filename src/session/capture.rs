//! Capture the live workspace model into a session document.

use super::{SessionPaneNode, SessionState, SessionTab};
use crate::ids::WidgetId;
use crate::pane::PaneNode;
use crate::workspace::WorkspaceModel;
use serde_json::Value;

/// Capture the workspace without widget payloads.
pub fn capture(model: &WorkspaceModel) -> SessionState {
    capture_with(model, |_| None)
}

/// Capture the workspace, asking the embedding application for a payload
/// per widget (shell command, document path, whatever it wants restored).
pub fn capture_with(
    model: &WorkspaceModel,
    payload_for: impl Fn(WidgetId) -> Option<Value>,
) -> SessionState {
    let tabs = model
        .tabs()
        .iter()
        .map(|tab| SessionTab {
            id: tab.id,
            title: tab.title.clone(),
            active_pane: tab.active_pane_id(),
            zoomed: tab.zoomed(),
            // The root is always present outside of mid-operation states;
            // a pathological empty tab captures as a zero-id leaf and is
            // rejected on restore.
            layout: match tab.panes().root() {
                Some(root) => capture_node(root, &payload_for),
                None => SessionPaneNode::Leaf {
                    id: crate::ids::PaneId::from_raw(0),
                    widget: WidgetId::from_raw(0),
                    payload: None,
                },
            },
        })
        .collect();

    SessionState {
        next_id: model.id_allocator().high_water(),
        active_tab: model.active_tab_id(),
        tabs,
    }
}

fn capture_node(
    node: &PaneNode,
    payload_for: &impl Fn(WidgetId) -> Option<Value>,
) -> SessionPaneNode {
    match node {
        PaneNode::Leaf(pane) => SessionPaneNode::Leaf {
            id: pane.id,
            widget: pane.widget,
            payload: payload_for(pane.widget),
        },
        PaneNode::Split {
            id,
            orientation,
            ratio,
            first,
            second,
        } => SessionPaneNode::Split {
            id: *id,
            orientation: *orientation,
            ratio: *ratio,
            first: Box::new(capture_node(first, payload_for)),
            second: Box::new(capture_node(second, payload_for)),
        },
    }
}
