//! The workspace model: the single source of truth for tabs and panes.
//!
//! All mutation goes through methods on [`WorkspaceModel`]; views derive
//! their state fresh from observer notifications and never keep a second
//! copy of the tree.

use crate::capability::CapabilityRegistry;
use crate::ids::{IdAllocator, IdKind, PaneId, SplitId, TabId};
use crate::pane::{NavigationDirection, Pane, PaneError, PaneNode, SplitOrientation};
use crate::tab::Tab;
use std::collections::HashSet;
use thiserror::Error;

/// A detected breach of the workspace structural invariants.
///
/// These indicate a bug in the engine (or a hand-crafted corrupt session
/// document), never ordinary misuse; the dispatcher aborts and rolls back
/// the offending mutation when one is detected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvariantViolation {
    #[error("duplicate identifier {0} in workspace")]
    DuplicateId(u64),
    #[error("no active tab recorded while tabs exist")]
    ActiveTabUnset,
    #[error("active tab {0} is not in the tab list")]
    ActiveTabMissing(TabId),
    #[error("tab {0} has no pane tree")]
    EmptyTab(TabId),
    #[error("active pane {pane} of tab {tab} is not reachable from its root")]
    ActivePaneMissing { tab: TabId, pane: PaneId },
    #[error("split {split} has ratio {ratio} outside (0, 1)")]
    RatioOutOfRange { split: SplitId, ratio: f32 },
    #[error("zoomed pane {pane} of tab {tab} does not exist")]
    ZoomedPaneMissing { tab: TabId, pane: PaneId },
}

/// The workspace: an ordered tab list, the active-tab pointer, and the
/// identifier allocator everything draws from.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceModel {
    tabs: Vec<Tab>,
    active_tab_id: Option<TabId>,
    ids: IdAllocator,
}

impl WorkspaceModel {
    /// Create an empty workspace (the terminal "no tabs" state).
    pub fn new() -> Self {
        Self {
            tabs: Vec::new(),
            active_tab_id: None,
            ids: IdAllocator::new(),
        }
    }

    /// Rebuild a workspace from restored parts (session restore).
    pub(crate) fn from_parts(tabs: Vec<Tab>, active_tab_id: Option<TabId>, ids: IdAllocator) -> Self {
        Self {
            tabs,
            active_tab_id,
            ids,
        }
    }

    // ── Tab access ──────────────────────────────────────────────────────

    /// All tabs in order.
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Number of tabs.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Whether the workspace has no tabs.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Get a tab by id.
    pub fn get_tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Get a mutable tab by id.
    pub fn get_tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    /// Id of the active tab.
    pub fn active_tab_id(&self) -> Option<TabId> {
        self.active_tab_id
    }

    /// The active tab.
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.and_then(|id| self.get_tab(id))
    }

    /// The active tab, mutable.
    pub fn active_tab_mut(&mut self) -> Option<&mut Tab> {
        let id = self.active_tab_id?;
        self.get_tab_mut(id)
    }

    /// Id of the active pane of the active tab.
    pub fn active_pane_id(&self) -> Option<PaneId> {
        self.active_tab().map(|t| t.active_pane_id())
    }

    /// Whether a raw id was ever allocated in this workspace.
    pub fn was_allocated(&self, raw: u64) -> bool {
        self.ids.was_allocated(raw)
    }

    /// Whether a raw id was ever allocated as the given kind. Distinguishes
    /// "closed earlier" from "never existed" when resolving stale ids; a
    /// raw value allocated as some other kind counts as never-existed.
    pub fn was_allocated_as(&self, kind: IdKind, raw: u64) -> bool {
        self.ids.was_allocated_as(kind, raw)
    }

    /// The identifier allocator (read-only; mutation happens through model
    /// operations).
    pub fn id_allocator(&self) -> &IdAllocator {
        &self.ids
    }

    // ── Tab lifecycle ───────────────────────────────────────────────────

    /// Create a tab with a single fresh pane and make it active.
    pub fn new_tab(&mut self, title: impl Into<String>, registry: &CapabilityRegistry) -> TabId {
        let tab_id = self.ids.next_tab_id();
        let widget = self.ids.next_widget_id();
        let pane_id = self.ids.next_pane_id();
        let pane = Pane::new(pane_id, widget, registry.capabilities_of(widget));
        self.tabs.push(Tab::new(tab_id, title, pane));
        self.active_tab_id = Some(tab_id);
        log::info!("Created tab {tab_id} with pane {pane_id}");
        tab_id
    }

    /// Close a tab. If it was active, the tab that slid into its index (or
    /// the new last tab) becomes active; closing the last tab leaves the
    /// workspace in the "no tabs" state.
    pub fn close_tab(&mut self, id: TabId) -> Option<Tab> {
        let index = self.tabs.iter().position(|t| t.id == id)?;
        let tab = self.tabs.remove(index);
        if self.active_tab_id == Some(id) {
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                Some(self.tabs[index.min(self.tabs.len() - 1)].id)
            };
        }
        log::info!("Closed tab {id}, {} tabs remain", self.tabs.len());
        Some(tab)
    }

    /// Make a tab active. Returns false if the tab does not exist.
    pub fn switch_to(&mut self, id: TabId) -> bool {
        if self.get_tab(id).is_some() {
            self.active_tab_id = Some(id);
            log::debug!("Switched to tab {id}");
            true
        } else {
            false
        }
    }

    /// Activate the next tab, wrapping around. Returns the new active tab.
    pub fn next_tab(&mut self) -> Option<TabId> {
        let current = self.active_tab_index()?;
        let next = self.tabs[(current + 1) % self.tabs.len()].id;
        self.active_tab_id = Some(next);
        Some(next)
    }

    /// Activate the previous tab, wrapping around. Returns the new active
    /// tab.
    pub fn prev_tab(&mut self) -> Option<TabId> {
        let current = self.active_tab_index()?;
        let prev = self.tabs[(current + self.tabs.len() - 1) % self.tabs.len()].id;
        self.active_tab_id = Some(prev);
        Some(prev)
    }

    /// Move a tab left (negative delta) or right (positive delta) in the
    /// tab order, clamped to the ends. Returns false if the tab does not
    /// exist.
    pub fn move_tab(&mut self, id: TabId, delta: i64) -> bool {
        let Some(index) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };
        let target = (index as i64)
            .saturating_add(delta)
            .clamp(0, self.tabs.len() as i64 - 1) as usize;
        if target != index {
            let tab = self.tabs.remove(index);
            self.tabs.insert(target, tab);
            log::debug!("Moved tab {id} from index {index} to {target}");
        }
        true
    }

    /// Rename a tab. Returns false if the tab does not exist.
    pub fn rename_tab(&mut self, id: TabId, title: impl Into<String>) -> bool {
        match self.get_tab_mut(id) {
            Some(tab) => {
                tab.set_title(title);
                true
            }
            None => false,
        }
    }

    fn active_tab_index(&self) -> Option<usize> {
        let id = self.active_tab_id?;
        self.tabs.iter().position(|t| t.id == id)
    }

    // ── Pane operations ─────────────────────────────────────────────────

    /// The tab owning a pane.
    pub fn find_tab_of_pane(&self, pane: PaneId) -> Option<TabId> {
        self.tabs
            .iter()
            .find(|t| t.panes().contains(pane))
            .map(|t| t.id)
    }

    /// Split a pane, wherever it lives. The new pane becomes its tab's
    /// active pane. Returns the new pane's id.
    pub fn split_pane(
        &mut self,
        pane_id: PaneId,
        orientation: SplitOrientation,
        registry: &CapabilityRegistry,
    ) -> Result<PaneId, PaneError> {
        let Some(index) = self.tabs.iter().position(|t| t.panes().contains(pane_id)) else {
            return Err(PaneError::NotFound(pane_id));
        };
        let split_id = self.ids.next_split_id();
        let widget = self.ids.next_widget_id();
        let new_pane_id = self.ids.next_pane_id();
        let pane = Pane::new(new_pane_id, widget, registry.capabilities_of(widget));
        self.tabs[index]
            .panes_mut()
            .split(pane_id, orientation, split_id, pane)
    }

    /// Close a pane, wherever it lives. Returns the removed pane so the
    /// embedding application can tear down its widget.
    pub fn close_pane(&mut self, pane_id: PaneId) -> Result<Pane, PaneError> {
        let Some(index) = self.tabs.iter().position(|t| t.panes().contains(pane_id)) else {
            return Err(PaneError::NotFound(pane_id));
        };
        self.tabs[index].remove_pane(pane_id)
    }

    /// Focus a pane, activating its owning tab as well.
    pub fn focus_pane(&mut self, pane_id: PaneId) -> Result<(), PaneError> {
        let Some(index) = self.tabs.iter().position(|t| t.panes().contains(pane_id)) else {
            return Err(PaneError::NotFound(pane_id));
        };
        let tab_id = self.tabs[index].id;
        self.tabs[index].panes_mut().focus_pane(pane_id)?;
        self.active_tab_id = Some(tab_id);
        Ok(())
    }

    /// Move focus from the active pane in the given direction. Returns the
    /// newly focused pane, or `None` when no pane lies that way (or there
    /// is no active tab).
    pub fn navigate(&mut self, direction: NavigationDirection) -> Option<PaneId> {
        let tab = self.active_tab_mut()?;
        let target = tab.panes().navigate(direction)?;
        // The id came from the tree; focusing it cannot fail.
        tab.panes_mut().focus_pane(target).ok()?;
        Some(target)
    }

    /// Maximize a pane within its tab. Returns whether the zoom state
    /// changed (false = already maximized).
    pub fn maximize_pane(&mut self, pane_id: PaneId) -> Result<bool, PaneError> {
        let Some(index) = self.tabs.iter().position(|t| t.panes().contains(pane_id)) else {
            return Err(PaneError::NotFound(pane_id));
        };
        self.tabs[index].maximize(pane_id)
    }

    /// Clear the active tab's zoom state. Returns false when nothing was
    /// zoomed (or there is no active tab).
    pub fn restore_zoom(&mut self) -> bool {
        self.active_tab_mut().is_some_and(|t| t.restore_zoom())
    }

    /// Reset every split ratio under a tab to 0.5. Returns false if the
    /// tab does not exist.
    pub fn even_sizes(&mut self, tab_id: TabId) -> bool {
        match self.get_tab_mut(tab_id) {
            Some(tab) => {
                tab.panes_mut().even_sizes();
                log::debug!("Evened split sizes in tab {tab_id}");
                true
            }
            None => false,
        }
    }

    /// Grow a pane within its nearest enclosing split of the given
    /// orientation. Returns `Ok(false)` when no such split exists.
    pub fn resize_pane(
        &mut self,
        pane_id: PaneId,
        orientation: SplitOrientation,
        delta: f32,
    ) -> Result<bool, PaneError> {
        let Some(index) = self.tabs.iter().position(|t| t.panes().contains(pane_id)) else {
            return Err(PaneError::NotFound(pane_id));
        };
        self.tabs[index].panes_mut().resize(pane_id, orientation, delta)
    }

    /// Detach a pane into a brand-new tab, which becomes active. The
    /// detached pane keeps its id and widget.
    ///
    /// Returns `Ok(None)` when the pane is already the sole pane of its
    /// tab (there is nothing to extract).
    pub fn extract_to_new_tab(&mut self, pane_id: PaneId) -> Result<Option<TabId>, PaneError> {
        let Some(index) = self.tabs.iter().position(|t| t.panes().contains(pane_id)) else {
            return Err(PaneError::NotFound(pane_id));
        };
        if self.tabs[index].panes().pane_count() <= 1 {
            return Ok(None);
        }

        let pane = self.tabs[index].remove_pane(pane_id)?;
        let title = self.tabs[index].title.clone();
        let tab_id = self.ids.next_tab_id();
        self.tabs.push(Tab::new(tab_id, title, pane));
        self.active_tab_id = Some(tab_id);
        log::info!("Extracted pane {pane_id} into new tab {tab_id}");
        Ok(Some(tab_id))
    }

    /// Re-cache every pane's capability set from the registry.
    pub fn refresh_capabilities(&mut self, registry: &CapabilityRegistry) {
        for tab in &mut self.tabs {
            tab.panes_mut().refresh_capabilities(registry);
        }
    }

    // ── Invariants ──────────────────────────────────────────────────────

    /// Check every structural invariant:
    ///
    /// 1. identifiers unique across tabs, panes, and splits
    /// 2. every tab has a tree; every split ratio strictly inside (0, 1)
    /// 3. each tab's active pane reachable from its root
    /// 4. the active tab resolvable whenever tabs exist
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut seen: HashSet<u64> = HashSet::new();

        for tab in &self.tabs {
            if !seen.insert(tab.id.raw()) {
                return Err(InvariantViolation::DuplicateId(tab.id.raw()));
            }

            let Some(root) = tab.panes().root() else {
                return Err(InvariantViolation::EmptyTab(tab.id));
            };

            let mut duplicate: Option<u64> = None;
            root.for_each(&mut |node| {
                let raw = match node {
                    PaneNode::Leaf(pane) => pane.id.raw(),
                    PaneNode::Split { id, .. } => id.raw(),
                };
                if duplicate.is_none() && !seen.insert(raw) {
                    duplicate = Some(raw);
                }
            });
            if let Some(raw) = duplicate {
                return Err(InvariantViolation::DuplicateId(raw));
            }

            if let Some((split, ratio)) = root.first_bad_ratio() {
                return Err(InvariantViolation::RatioOutOfRange { split, ratio });
            }

            let active = tab.active_pane_id();
            if !root.contains_pane(active) {
                return Err(InvariantViolation::ActivePaneMissing {
                    tab: tab.id,
                    pane: active,
                });
            }

            if let Some(zoomed) = tab.zoomed()
                && !root.contains_pane(zoomed)
            {
                return Err(InvariantViolation::ZoomedPaneMissing {
                    tab: tab.id,
                    pane: zoomed,
                });
            }
        }

        if !self.tabs.is_empty() {
            match self.active_tab_id {
                None => return Err(InvariantViolation::ActiveTabUnset),
                Some(id) if self.get_tab(id).is_none() => {
                    return Err(InvariantViolation::ActiveTabMissing(id));
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

impl Default for WorkspaceModel {
    fn default() -> Self {
        Self::new()
    }
}
