//! Core types for the pane tree
//!
//! This module defines the fundamental data structures for split panes:
//! - Binary tree structure for arbitrary nesting
//! - Per-pane state (widget reference, cached capabilities)
//! - Unit-square geometry synthesized from the tree for spatial navigation

use crate::capability::Capability;
use crate::ids::{PaneId, SplitId, WidgetId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Orientation of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitOrientation {
    /// Panes side by side (first = left, second = right)
    Horizontal,
    /// Panes stacked (first = top, second = bottom)
    Vertical,
}

impl SplitOrientation {
    /// Parse an orientation from a command parameter string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "horizontal" => Some(Self::Horizontal),
            "vertical" => Some(Self::Vertical),
            _ => None,
        }
    }

    /// The parameter-string form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Direction for spatial pane navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Rectangle in the tab's synthesized [0,1]x[0,1] coordinate space.
///
/// No pixels are involved anywhere in the engine; rectangles exist purely so
/// directional navigation can reason about adjacency and overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneRect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl PaneRect {
    /// The whole unit square, i.e. the root of a tab.
    pub const UNIT: PaneRect = PaneRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    /// Create new bounds.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Subdivide along an orientation at the given ratio.
    pub fn divide(&self, orientation: SplitOrientation, ratio: f32) -> (PaneRect, PaneRect) {
        match orientation {
            SplitOrientation::Horizontal => {
                let first_width = self.width * ratio;
                (
                    PaneRect::new(self.x, self.y, first_width, self.height),
                    PaneRect::new(self.x + first_width, self.y, self.width - first_width, self.height),
                )
            }
            SplitOrientation::Vertical => {
                let first_height = self.height * ratio;
                (
                    PaneRect::new(self.x, self.y, self.width, first_height),
                    PaneRect::new(self.x, self.y + first_height, self.width, self.height - first_height),
                )
            }
        }
    }
}

/// A single leaf pane hosting one widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    /// Unique identifier for this pane
    pub id: PaneId,
    /// Opaque reference to the hosted widget
    pub widget: WidgetId,
    /// Capability set cached from the registry at creation time
    pub capabilities: HashSet<Capability>,
}

impl Pane {
    /// Create a new pane.
    pub fn new(id: PaneId, widget: WidgetId, capabilities: HashSet<Capability>) -> Self {
        Self {
            id,
            widget,
            capabilities,
        }
    }
}

/// A node in the pane tree
///
/// - Leaf nodes contain a single pane
/// - Split nodes contain two children with an orientation and ratio
#[derive(Debug, Clone, PartialEq)]
pub enum PaneNode {
    /// A leaf node containing a pane
    Leaf(Box<Pane>),
    /// A split containing two child nodes
    Split {
        /// Unique identifier for this split
        id: SplitId,
        /// Orientation of the split
        orientation: SplitOrientation,
        /// Split ratio, strictly inside (0, 1): share of the first child
        ratio: f32,
        /// First child (left for horizontal, top for vertical)
        first: Box<PaneNode>,
        /// Second child (right for horizontal, bottom for vertical)
        second: Box<PaneNode>,
    },
}

impl PaneNode {
    /// Create a new leaf node.
    pub fn leaf(pane: Pane) -> Self {
        PaneNode::Leaf(Box::new(pane))
    }

    /// Create a new split node.
    pub fn split(
        id: SplitId,
        orientation: SplitOrientation,
        ratio: f32,
        first: PaneNode,
        second: PaneNode,
    ) -> Self {
        debug_assert!(ratio > 0.0 && ratio < 1.0);
        PaneNode::Split {
            id,
            orientation,
            ratio,
            first: Box::new(first),
            second: Box::new(second),
        }
    }

    /// Check if this is a leaf node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, PaneNode::Leaf(_))
    }

    /// Find a pane by id (recursive).
    pub fn find_pane(&self, id: PaneId) -> Option<&Pane> {
        match self {
            PaneNode::Leaf(pane) => (pane.id == id).then_some(pane.as_ref()),
            PaneNode::Split { first, second, .. } => {
                first.find_pane(id).or_else(|| second.find_pane(id))
            }
        }
    }

    /// Whether the tree contains the given pane.
    pub fn contains_pane(&self, id: PaneId) -> bool {
        self.find_pane(id).is_some()
    }

    /// All pane ids in this subtree, pre-order.
    pub fn all_pane_ids(&self) -> Vec<PaneId> {
        match self {
            PaneNode::Leaf(pane) => vec![pane.id],
            PaneNode::Split { first, second, .. } => {
                let mut ids = first.all_pane_ids();
                ids.extend(second.all_pane_ids());
                ids
            }
        }
    }

    /// The first leaf in pre-order (the close-successor of a sibling).
    pub fn first_leaf_id(&self) -> PaneId {
        match self {
            PaneNode::Leaf(pane) => pane.id,
            PaneNode::Split { first, .. } => first.first_leaf_id(),
        }
    }

    /// Count total number of panes.
    pub fn pane_count(&self) -> usize {
        match self {
            PaneNode::Leaf(_) => 1,
            PaneNode::Split { first, second, .. } => first.pane_count() + second.pane_count(),
        }
    }

    /// Visit every node in this subtree, pre-order.
    pub fn for_each(&self, f: &mut impl FnMut(&PaneNode)) {
        f(self);
        if let PaneNode::Split { first, second, .. } = self {
            first.for_each(f);
            second.for_each(f);
        }
    }

    /// Visit every pane mutably, pre-order.
    pub fn for_each_pane_mut(&mut self, f: &mut impl FnMut(&mut Pane)) {
        match self {
            PaneNode::Leaf(pane) => f(pane),
            PaneNode::Split { first, second, .. } => {
                first.for_each_pane_mut(f);
                second.for_each_pane_mut(f);
            }
        }
    }

    /// Reset every split ratio in this subtree to 0.5.
    pub fn reset_ratios(&mut self) {
        if let PaneNode::Split {
            ratio,
            first,
            second,
            ..
        } = self
        {
            *ratio = 0.5;
            first.reset_ratios();
            second.reset_ratios();
        }
    }

    /// Compute the rectangle of every leaf by subdividing `area` at each
    /// split according to its orientation and ratio.
    pub fn layout(&self, area: PaneRect) -> Vec<(PaneId, PaneRect)> {
        let mut out = Vec::new();
        self.layout_into(area, &mut out);
        out
    }

    fn layout_into(&self, area: PaneRect, out: &mut Vec<(PaneId, PaneRect)>) {
        match self {
            PaneNode::Leaf(pane) => out.push((pane.id, area)),
            PaneNode::Split {
                orientation,
                ratio,
                first,
                second,
                ..
            } => {
                let (first_area, second_area) = area.divide(*orientation, *ratio);
                first.layout_into(first_area, out);
                second.layout_into(second_area, out);
            }
        }
    }

    /// Find the pane adjacent to `from_id` in the given direction.
    ///
    /// The target is the leaf whose synthesized rectangle touches the
    /// source's facing edge with the largest boundary overlap; ties are
    /// broken by the smallest Euclidean distance between rectangle centers.
    /// Returns `None` when no pane lies in that direction.
    pub fn find_pane_in_direction(
        &self,
        from_id: PaneId,
        direction: NavigationDirection,
    ) -> Option<PaneId> {
        const EDGE_EPS: f32 = 1e-4;

        let rects = self.layout(PaneRect::UNIT);
        let (_, from_rect) = *rects.iter().find(|(id, _)| *id == from_id)?;

        let mut best: Option<(PaneId, f32, f32)> = None; // (id, overlap, center distance)
        for (id, rect) in &rects {
            if *id == from_id {
                continue;
            }

            let adjacent = match direction {
                NavigationDirection::Left => (from_rect.x - rect.right()).abs() <= EDGE_EPS,
                NavigationDirection::Right => (rect.x - from_rect.right()).abs() <= EDGE_EPS,
                NavigationDirection::Up => (from_rect.y - rect.bottom()).abs() <= EDGE_EPS,
                NavigationDirection::Down => (rect.y - from_rect.bottom()).abs() <= EDGE_EPS,
            };
            if !adjacent {
                continue;
            }

            // Overlap along the shared edge; corner contact does not count.
            let overlap = match direction {
                NavigationDirection::Left | NavigationDirection::Right => {
                    overlap_1d(from_rect.y, from_rect.bottom(), rect.y, rect.bottom())
                }
                NavigationDirection::Up | NavigationDirection::Down => {
                    overlap_1d(from_rect.x, from_rect.right(), rect.x, rect.right())
                }
            };
            if overlap <= EDGE_EPS {
                continue;
            }

            let (fx, fy) = from_rect.center();
            let (cx, cy) = rect.center();
            let distance = ((cx - fx).powi(2) + (cy - fy).powi(2)).sqrt();

            let better = match best {
                None => true,
                Some((_, best_overlap, best_distance)) => {
                    overlap > best_overlap + EDGE_EPS
                        || ((overlap - best_overlap).abs() <= EDGE_EPS
                            && distance < best_distance)
                }
            };
            if better {
                best = Some((*id, overlap, distance));
            }
        }

        best.map(|(id, _, _)| id)
    }

    /// First split whose ratio falls outside (0, 1), if any.
    pub fn first_bad_ratio(&self) -> Option<(SplitId, f32)> {
        match self {
            PaneNode::Leaf(_) => None,
            PaneNode::Split {
                id,
                ratio,
                first,
                second,
                ..
            } => {
                if !(*ratio > 0.0 && *ratio < 1.0) {
                    Some((*id, *ratio))
                } else {
                    first.first_bad_ratio().or_else(|| second.first_bad_ratio())
                }
            }
        }
    }
}

fn overlap_1d(a0: f32, a1: f32, b0: f32, b1: f32) -> f32 {
    (a1.min(b1) - a0.max(b0)).max(0.0)
}
