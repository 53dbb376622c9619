//! Observer bus: synchronous change propagation from the model to views.
//!
//! Subscribers are invoked in subscription order, on the same thread as the
//! mutation, immediately after it commits — a subscriber can never observe
//! two interleaved mutations. The subscriber list itself is only mutated
//! between dispatches (enforced by the `&mut` receivers).

use crate::ids::{PaneId, TabId};
use std::fmt;

/// What kind of change a notification describes, so subscribers can skip
/// re-renders they don't care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Tree topology changed: split, close, extract, ratio change, zoom.
    Structural,
    /// Only the active tab/pane pointers moved.
    Focus,
    /// A widget's content changed (published by the embedding application).
    Content,
    /// Anything may have changed; re-derive everything from the model.
    FullResync,
}

/// A committed state change, minimally locating what moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// The tab involved, if the change is scoped to one.
    pub tab: Option<TabId>,
    /// The pane involved, if the change is scoped to one.
    pub pane: Option<PaneId>,
    /// What kind of change happened.
    pub kind: ChangeKind,
}

impl StateChange {
    /// A topology change in a tab.
    pub fn structural(tab: TabId) -> Self {
        Self {
            tab: Some(tab),
            pane: None,
            kind: ChangeKind::Structural,
        }
    }

    /// A focus move.
    pub fn focus(tab: Option<TabId>, pane: Option<PaneId>) -> Self {
        Self {
            tab,
            pane,
            kind: ChangeKind::Focus,
        }
    }

    /// The catch-all descriptor for changes without granular diffing.
    pub fn full_resync() -> Self {
        Self {
            tab: None,
            pane: None,
            kind: ChangeKind::FullResync,
        }
    }

    /// Attach the pane this change is scoped to.
    pub fn with_pane(mut self, pane: PaneId) -> Self {
        self.pane = Some(pane);
        self
    }
}

/// Handle for removing a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

type Callback = Box<dyn FnMut(&StateChange)>;

/// Single synchronous publish/subscribe channel.
#[derive(Default)]
pub struct ObserverBus {
    subscribers: Vec<(SubscriberId, Callback)>,
    next_id: u64,
}

impl ObserverBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber. Callbacks run in subscription order.
    pub fn subscribe(&mut self, callback: impl FnMut(&StateChange) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        log::debug!("Observer {} subscribed ({} total)", id.0, self.subscribers.len());
        id
    }

    /// Remove a subscriber. Returns false if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver a change to every subscriber, synchronously and in order.
    pub fn publish(&mut self, change: &StateChange) {
        for (_, callback) in &mut self.subscribers {
            callback(change);
        }
    }
}

impl fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
