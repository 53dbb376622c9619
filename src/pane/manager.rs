//! Pane manager for coordinating pane operations within a tab
//!
//! The PaneManager owns the pane tree and provides operations for:
//! - Splitting panes horizontally and vertically
//! - Closing panes (the sibling subtree replaces the parent split verbatim)
//! - Navigating between panes using synthesized geometry
//! - Resizing and balancing split ratios

use super::types::{NavigationDirection, Pane, PaneNode, PaneRect, SplitOrientation};
use crate::capability::CapabilityRegistry;
use crate::ids::{PaneId, SplitId};
use thiserror::Error;

/// Errors from pane-tree operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaneError {
    /// The referenced pane does not exist in this tree.
    #[error("pane {0} not found")]
    NotFound(PaneId),
    /// The pane is the sole pane in the tab; close the tab instead.
    #[error("cannot close the last pane in the tab")]
    LastPane,
}

/// Outcome of removing a pane from a subtree.
enum RemoveOutcome {
    /// This entire node was the target leaf.
    RemovedSelf(Box<Pane>),
    /// The target was removed somewhere below; the subtree has collapsed
    /// around it and `successor` is the first leaf of the sibling that took
    /// the parent's place.
    RemovedWithin {
        node: PaneNode,
        removed: Box<Pane>,
        successor: PaneId,
    },
    /// The target is not in this subtree.
    NotFound(PaneNode),
}

/// Manages the pane tree within a single tab.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneManager {
    /// Root of the pane tree. Always `Some` between operations; `Option`
    /// only so subtrees can be moved through by-value rebuilds.
    root: Option<PaneNode>,
    /// Id of the currently active pane.
    active_pane_id: PaneId,
}

impl PaneManager {
    /// Create a manager rooted at a single pane.
    pub fn new(pane: Pane) -> Self {
        let active = pane.id;
        Self {
            root: Some(PaneNode::leaf(pane)),
            active_pane_id: active,
        }
    }

    /// Rebuild a manager from restored parts (session restore).
    pub(crate) fn from_parts(root: PaneNode, active_pane_id: PaneId) -> Self {
        Self {
            root: Some(root),
            active_pane_id,
        }
    }

    /// The root node.
    pub fn root(&self) -> Option<&PaneNode> {
        self.root.as_ref()
    }

    /// Id of the active pane.
    pub fn active_pane_id(&self) -> PaneId {
        self.active_pane_id
    }

    /// Find a pane by id.
    pub fn find_pane(&self, id: PaneId) -> Option<&Pane> {
        self.root.as_ref()?.find_pane(id)
    }

    /// Whether the tree contains a pane.
    pub fn contains(&self, id: PaneId) -> bool {
        self.find_pane(id).is_some()
    }

    /// Number of panes in the tree.
    pub fn pane_count(&self) -> usize {
        self.root.as_ref().map(|r| r.pane_count()).unwrap_or(0)
    }

    /// All pane ids, pre-order.
    pub fn all_pane_ids(&self) -> Vec<PaneId> {
        self.root
            .as_ref()
            .map(|r| r.all_pane_ids())
            .unwrap_or_default()
    }

    /// Synthesized unit-square rectangles for every pane.
    pub fn layout(&self) -> Vec<(PaneId, PaneRect)> {
        self.root
            .as_ref()
            .map(|r| r.layout(PaneRect::UNIT))
            .unwrap_or_default()
    }

    /// Make a pane the active pane.
    pub fn focus_pane(&mut self, id: PaneId) -> Result<(), PaneError> {
        if !self.contains(id) {
            return Err(PaneError::NotFound(id));
        }
        self.active_pane_id = id;
        log::debug!("Focused pane {id}");
        Ok(())
    }

    /// Split the target pane, replacing its leaf with a split whose first
    /// child is the original pane and whose second child is `new_pane`.
    ///
    /// The new pane becomes active. Returns the new pane's id.
    pub fn split(
        &mut self,
        target: PaneId,
        orientation: SplitOrientation,
        split_id: SplitId,
        new_pane: Pane,
    ) -> Result<PaneId, PaneError> {
        let new_id = new_pane.id;
        let Some(root) = self.root.take() else {
            return Err(PaneError::NotFound(target));
        };

        let (new_root, leftover) = Self::split_node(root, target, orientation, split_id, new_pane);
        self.root = Some(new_root);

        if leftover.is_some() {
            return Err(PaneError::NotFound(target));
        }

        self.active_pane_id = new_id;
        log::info!("Split pane {target} {}: new pane {new_id} (active)", orientation.as_str());
        Ok(new_id)
    }

    /// Split a node, finding the target pane and replacing it with a split.
    ///
    /// Returns (new_node, remaining_pane) where remaining_pane is Some if
    /// the target was not found in this subtree.
    fn split_node(
        node: PaneNode,
        target: PaneId,
        orientation: SplitOrientation,
        split_id: SplitId,
        new_pane: Pane,
    ) -> (PaneNode, Option<Pane>) {
        match node {
            PaneNode::Leaf(pane) => {
                if pane.id == target {
                    (
                        PaneNode::split(
                            split_id,
                            orientation,
                            0.5,
                            PaneNode::Leaf(pane),
                            PaneNode::leaf(new_pane),
                        ),
                        None,
                    )
                } else {
                    (PaneNode::Leaf(pane), Some(new_pane))
                }
            }
            PaneNode::Split {
                id,
                orientation: split_orientation,
                ratio,
                first,
                second,
            } => {
                let (new_first, leftover) =
                    Self::split_node(*first, target, orientation, split_id, new_pane);
                match leftover {
                    None => (
                        PaneNode::Split {
                            id,
                            orientation: split_orientation,
                            ratio,
                            first: Box::new(new_first),
                            second,
                        },
                        None,
                    ),
                    Some(pane) => {
                        let (new_second, leftover) =
                            Self::split_node(*second, target, orientation, split_id, pane);
                        (
                            PaneNode::Split {
                                id,
                                orientation: split_orientation,
                                ratio,
                                first: Box::new(new_first),
                                second: Box::new(new_second),
                            },
                            leftover,
                        )
                    }
                }
            }
        }
    }

    /// Remove a pane and collapse its parent split: the sibling subtree
    /// takes the parent's place with its own internal structure intact.
    ///
    /// If the removed pane was active, the sibling's first leaf (pre-order)
    /// becomes active. Returns the removed pane.
    pub fn remove_pane(&mut self, id: PaneId) -> Result<Pane, PaneError> {
        let Some(root) = self.root.take() else {
            return Err(PaneError::NotFound(id));
        };

        // A root leaf is the sole pane; closing it is a tab-level decision.
        if let PaneNode::Leaf(pane) = &root {
            let err = if pane.id == id {
                PaneError::LastPane
            } else {
                PaneError::NotFound(id)
            };
            self.root = Some(root);
            return Err(err);
        }

        match Self::remove_node(root, id) {
            RemoveOutcome::RemovedSelf(pane) => {
                // Unreachable for a split root; restore the leaf untouched.
                self.root = Some(PaneNode::Leaf(pane));
                Err(PaneError::LastPane)
            }
            RemoveOutcome::RemovedWithin {
                node,
                removed,
                successor,
            } => {
                self.root = Some(node);
                if self.active_pane_id == id {
                    log::debug!("Closed active pane {id}, focus moves to {successor}");
                    self.active_pane_id = successor;
                }
                log::info!("Closed pane {id}, {} panes remain", self.pane_count());
                Ok(*removed)
            }
            RemoveOutcome::NotFound(root) => {
                self.root = Some(root);
                Err(PaneError::NotFound(id))
            }
        }
    }

    fn remove_node(node: PaneNode, target: PaneId) -> RemoveOutcome {
        match node {
            PaneNode::Leaf(pane) => {
                if pane.id == target {
                    RemoveOutcome::RemovedSelf(pane)
                } else {
                    RemoveOutcome::NotFound(PaneNode::Leaf(pane))
                }
            }
            PaneNode::Split {
                id,
                orientation,
                ratio,
                first,
                second,
            } => match Self::remove_node(*first, target) {
                RemoveOutcome::RemovedSelf(removed) => {
                    // First child was the target; the second child replaces
                    // the whole split.
                    let successor = second.first_leaf_id();
                    RemoveOutcome::RemovedWithin {
                        node: *second,
                        removed,
                        successor,
                    }
                }
                RemoveOutcome::RemovedWithin {
                    node,
                    removed,
                    successor,
                } => RemoveOutcome::RemovedWithin {
                    node: PaneNode::Split {
                        id,
                        orientation,
                        ratio,
                        first: Box::new(node),
                        second,
                    },
                    removed,
                    successor,
                },
                RemoveOutcome::NotFound(first_node) => match Self::remove_node(*second, target) {
                    RemoveOutcome::RemovedSelf(removed) => {
                        let successor = first_node.first_leaf_id();
                        RemoveOutcome::RemovedWithin {
                            node: first_node,
                            removed,
                            successor,
                        }
                    }
                    RemoveOutcome::RemovedWithin {
                        node,
                        removed,
                        successor,
                    } => RemoveOutcome::RemovedWithin {
                        node: PaneNode::Split {
                            id,
                            orientation,
                            ratio,
                            first: Box::new(first_node),
                            second: Box::new(node),
                        },
                        removed,
                        successor,
                    },
                    RemoveOutcome::NotFound(second_node) => RemoveOutcome::NotFound(PaneNode::Split {
                        id,
                        orientation,
                        ratio,
                        first: Box::new(first_node),
                        second: Box::new(second_node),
                    }),
                },
            },
        }
    }

    /// The pane adjacent to the active pane in the given direction, if any.
    pub fn navigate(&self, direction: NavigationDirection) -> Option<PaneId> {
        self.root
            .as_ref()?
            .find_pane_in_direction(self.active_pane_id, direction)
    }

    /// Reset every split ratio to 0.5.
    pub fn even_sizes(&mut self) {
        if let Some(root) = self.root.as_mut() {
            root.reset_ratios();
        }
    }

    /// Grow the target pane by `delta` within its nearest enclosing split of
    /// the given orientation, clamping the ratio to [0.1, 0.9].
    ///
    /// Returns `Ok(false)` when the pane exists but has no enclosing split
    /// with that orientation.
    pub fn resize(
        &mut self,
        pane_id: PaneId,
        orientation: SplitOrientation,
        delta: f32,
    ) -> Result<bool, PaneError> {
        if !self.contains(pane_id) {
            return Err(PaneError::NotFound(pane_id));
        }
        let Some(root) = self.root.as_mut() else {
            return Err(PaneError::NotFound(pane_id));
        };
        let (_, adjusted) = Self::resize_node(root, pane_id, orientation, delta);
        if adjusted {
            log::debug!("Resized pane {pane_id} by {delta} ({})", orientation.as_str());
        }
        Ok(adjusted)
    }

    /// Returns (contains_target, adjusted). The closest enclosing split of
    /// the matching orientation adjusts first as the recursion unwinds.
    fn resize_node(
        node: &mut PaneNode,
        target: PaneId,
        orientation: SplitOrientation,
        delta: f32,
    ) -> (bool, bool) {
        match node {
            PaneNode::Leaf(pane) => (pane.id == target, false),
            PaneNode::Split {
                orientation: split_orientation,
                ratio,
                first,
                second,
                ..
            } => {
                let (in_first, adjusted) = Self::resize_node(first, target, orientation, delta);
                if in_first {
                    if !adjusted && *split_orientation == orientation {
                        *ratio = (*ratio + delta).clamp(0.1, 0.9);
                        return (true, true);
                    }
                    return (true, adjusted);
                }
                let (in_second, adjusted) = Self::resize_node(second, target, orientation, delta);
                if in_second {
                    if !adjusted && *split_orientation == orientation {
                        // Growing the second child means shrinking the first.
                        *ratio = (*ratio - delta).clamp(0.1, 0.9);
                        return (true, true);
                    }
                    return (true, adjusted);
                }
                (false, false)
            }
        }
    }

    /// Re-cache every pane's capability set from the registry.
    pub fn refresh_capabilities(&mut self, registry: &CapabilityRegistry) {
        if let Some(root) = self.root.as_mut() {
            root.for_each_pane_mut(&mut |pane| {
                pane.capabilities = registry.capabilities_of(pane.widget);
            });
        }
    }
}
