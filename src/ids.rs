//! Identifier allocation for tabs, panes, splits, and widget references.
//!
//! Every identifier carries its kind in the low bits and a per-kind
//! sequence number above them. Ids therefore never collide across kinds,
//! are never reused within a session even after the thing they named has
//! been closed, and the kind of any raw value can be recovered when
//! classifying a stale reference.

use serde::{Deserialize, Serialize};
use std::fmt;

const KIND_BITS: u32 = 2;
const KIND_MASK: u64 = 0b11;

/// What kind of thing a raw identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Tab,
    Pane,
    Split,
    Widget,
}

impl IdKind {
    fn tag(self) -> u64 {
        match self {
            Self::Tab => 0,
            Self::Pane => 1,
            Self::Split => 2,
            Self::Widget => 3,
        }
    }

    /// The kind encoded in a raw identifier.
    pub fn of_raw(raw: u64) -> Self {
        match raw & KIND_MASK {
            0 => Self::Tab,
            1 => Self::Pane,
            2 => Self::Split,
            _ => Self::Widget,
        }
    }
}

/// Identifier of a tab within a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(u64);

impl TabId {
    /// Build a tab id from its raw value (session restore, test fixtures).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a leaf pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneId(u64);

impl PaneId {
    /// Build a pane id from its raw value (session restore, test fixtures).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an internal split node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SplitId(u64);

impl SplitId {
    /// Build a split id from its raw value (session restore, test fixtures).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SplitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a widget instance hosted by a pane.
///
/// The engine mints these but never looks inside them; the embedding
/// application binds each one to a concrete widget and declares its
/// capabilities through the [`crate::capability::CapabilityRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Build a widget reference from its raw value.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocator for all identifier kinds in one workspace.
///
/// Sequence numbers start at 1 per kind; 0 is never handed out and can
/// serve as an "unset" sentinel in external stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next: [u64; 4],
}

impl IdAllocator {
    /// Create a fresh allocator.
    pub fn new() -> Self {
        Self { next: [1; 4] }
    }

    fn bump(&mut self, kind: IdKind) -> u64 {
        let slot = &mut self.next[kind.tag() as usize];
        let seq = *slot;
        *slot += 1;
        (seq << KIND_BITS) | kind.tag()
    }

    /// Allocate a tab id.
    pub fn next_tab_id(&mut self) -> TabId {
        TabId(self.bump(IdKind::Tab))
    }

    /// Allocate a pane id.
    pub fn next_pane_id(&mut self) -> PaneId {
        PaneId(self.bump(IdKind::Pane))
    }

    /// Allocate a split id.
    pub fn next_split_id(&mut self) -> SplitId {
        SplitId(self.bump(IdKind::Split))
    }

    /// Allocate a widget reference.
    pub fn next_widget_id(&mut self) -> WidgetId {
        WidgetId(self.bump(IdKind::Widget))
    }

    /// Whether a raw id was handed out by this allocator as the given kind.
    ///
    /// Because ids are monotonic and never reused, this distinguishes a
    /// reference to something that once existed (and was closed) from a
    /// reference that was never valid at all. A raw value allocated as a
    /// different kind is never-valid, not stale.
    pub fn was_allocated_as(&self, kind: IdKind, raw: u64) -> bool {
        let seq = raw >> KIND_BITS;
        IdKind::of_raw(raw) == kind && seq >= 1 && seq < self.next[kind.tag() as usize]
    }

    /// Whether a raw id was ever handed out, whatever its kind.
    pub fn was_allocated(&self, raw: u64) -> bool {
        self.was_allocated_as(IdKind::of_raw(raw), raw)
    }

    /// The sequence high-water mark across all kinds (the next sequence
    /// number that is guaranteed unused everywhere).
    pub fn high_water(&self) -> u64 {
        self.next.iter().copied().max().unwrap_or(1)
    }

    /// Reserve every sequence number below `seq` in every kind, so ids
    /// minted later never collide with ids from before a saved session.
    pub fn seed(&mut self, seq: u64) {
        for next in &mut self.next {
            *next = (*next).max(seq).max(1);
        }
    }

    /// Reserve past an id observed in a restored document.
    pub fn observe(&mut self, raw: u64) {
        let slot = &mut self.next[(raw & KIND_MASK) as usize];
        *slot = (*slot).max((raw >> KIND_BITS) + 1);
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
