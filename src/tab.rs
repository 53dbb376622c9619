//! A tab: one pane tree plus its active-pane pointer and zoom state.

use crate::ids::{PaneId, TabId};
use crate::pane::{Pane, PaneError, PaneManager};

/// A single tab in the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    /// Unique identifier for this tab
    pub id: TabId,
    /// Tab title shown by the embedding application
    pub title: String,
    /// The pane tree and active-pane pointer
    panes: PaneManager,
    /// Maximized pane, if any. A pure visibility toggle: the tree topology
    /// is untouched while a pane is zoomed.
    zoomed: Option<PaneId>,
}

impl Tab {
    /// Create a tab rooted at a single pane.
    pub fn new(id: TabId, title: impl Into<String>, pane: Pane) -> Self {
        Self {
            id,
            title: title.into(),
            panes: PaneManager::new(pane),
            zoomed: None,
        }
    }

    /// Rebuild a tab from restored parts (session restore).
    pub(crate) fn from_parts(
        id: TabId,
        title: String,
        panes: PaneManager,
        zoomed: Option<PaneId>,
    ) -> Self {
        Self {
            id,
            title,
            panes,
            zoomed,
        }
    }

    /// The pane tree.
    pub fn panes(&self) -> &PaneManager {
        &self.panes
    }

    /// The pane tree, mutable.
    pub fn panes_mut(&mut self) -> &mut PaneManager {
        &mut self.panes
    }

    /// Id of the tab's active pane.
    pub fn active_pane_id(&self) -> PaneId {
        self.panes.active_pane_id()
    }

    /// The currently maximized pane, if any.
    pub fn zoomed(&self) -> Option<PaneId> {
        self.zoomed
    }

    /// Maximize a pane. Re-maximizing the already-zoomed pane is a no-op;
    /// maximizing a different pane re-targets the zoom.
    ///
    /// Returns whether the zoom state changed.
    pub fn maximize(&mut self, pane: PaneId) -> Result<bool, PaneError> {
        if !self.panes.contains(pane) {
            return Err(PaneError::NotFound(pane));
        }
        if self.zoomed == Some(pane) {
            return Ok(false);
        }
        self.zoomed = Some(pane);
        log::info!("Maximized pane {pane} in tab {}", self.id);
        Ok(true)
    }

    /// Clear the zoom state. Returns false if nothing was zoomed.
    pub fn restore_zoom(&mut self) -> bool {
        if self.zoomed.take().is_some() {
            log::info!("Restored pane layout in tab {}", self.id);
            true
        } else {
            false
        }
    }

    /// Remove a pane from the tree, clearing the zoom state if it pointed
    /// at the removed pane.
    pub fn remove_pane(&mut self, id: PaneId) -> Result<Pane, PaneError> {
        let pane = self.panes.remove_pane(id)?;
        if self.zoomed == Some(id) {
            self.zoomed = None;
        }
        Ok(pane)
    }

    /// Rename the tab.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }
}
