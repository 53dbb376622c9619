//! Session state types for save/restore across process restarts.
//!
//! A [`SessionState`] document captures the full workspace topology: tab
//! order, split trees with their orientations and ratios, focus pointers,
//! zoom state, and the identifier high-water mark, so restored ids never
//! collide with ids handed out before the save.
//!
//! Widget internals are not persisted. Each leaf keeps its opaque widget
//! reference (plus an optional embedder-supplied payload), and the
//! embedding application rebinds widgets after restore.

pub mod capture;
pub mod restore;
pub mod storage;

pub use capture::{capture, capture_with};
pub use restore::{restore, RestoreError};

use crate::ids::{PaneId, SplitId, TabId, WidgetId};
use crate::pane::SplitOrientation;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level saved workspace state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Identifier sequence high-water mark at save time; restore seeds
    /// the allocator with it so later ids never collide.
    pub next_id: u64,
    /// The active tab at save time (`None` = the "no tabs" state).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_tab: Option<TabId>,
    /// All tabs, in display order.
    pub tabs: Vec<SessionTab>,
}

/// A single saved tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTab {
    /// The tab's identifier.
    pub id: TabId,
    /// Tab title.
    pub title: String,
    /// The tab's active pane.
    pub active_pane: PaneId,
    /// Maximized pane, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoomed: Option<PaneId>,
    /// The tab's split tree.
    pub layout: SessionPaneNode,
}

/// Recursive split-tree node for session persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionPaneNode {
    /// A leaf pane.
    Leaf {
        /// The pane's identifier.
        id: PaneId,
        /// Opaque reference to the hosted widget.
        widget: WidgetId,
        /// Embedder-supplied widget payload, if one was captured.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payload: Option<Value>,
    },
    /// An internal split with two children.
    Split {
        /// The split's identifier.
        id: SplitId,
        /// Split orientation.
        orientation: SplitOrientation,
        /// Fraction of the split's extent given to `first`, in (0, 1).
        ratio: f32,
        /// First child (left or top).
        first: Box<SessionPaneNode>,
        /// Second child (right or bottom).
        second: Box<SessionPaneNode>,
    },
}
