//! Capability registry: the boundary between the workspace core and widgets.
//!
//! The engine never branches on what a widget concretely is. A widget
//! declares a set of opaque capability tags (`"text-input"`, `"scrollback"`,
//! ...) and anything that needs widget-specific routing queries the registry
//! instead of inspecting the widget itself.

use crate::ids::WidgetId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// An opaque capability tag declared by a widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl From<&str> for Capability {
    fn from(tag: &str) -> Self {
        Self(tag.to_string())
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry mapping widget references to their declared capability sets.
///
/// Owned by the embedding application; the core only queries it.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    widgets: HashMap<WidgetId, HashSet<Capability>>,
}

impl CapabilityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget with its capability set, replacing any previous
    /// declaration for the same widget.
    pub fn register(&mut self, widget: WidgetId, capabilities: impl IntoIterator<Item = Capability>) {
        let set: HashSet<Capability> = capabilities.into_iter().collect();
        log::debug!("Registered widget {} with {} capabilities", widget, set.len());
        self.widgets.insert(widget, set);
    }

    /// Remove a widget's declaration. Returns its capability set if it was
    /// registered.
    pub fn unregister(&mut self, widget: WidgetId) -> Option<HashSet<Capability>> {
        self.widgets.remove(&widget)
    }

    /// The capability set declared for a widget.
    ///
    /// Unknown widgets report an empty set rather than an error: a pane can
    /// legitimately exist before its widget finishes registering.
    pub fn capabilities_of(&self, widget: WidgetId) -> HashSet<Capability> {
        self.widgets.get(&widget).cloned().unwrap_or_default()
    }

    /// Whether a widget declares a specific capability.
    pub fn has_capability(&self, widget: WidgetId, capability: &Capability) -> bool {
        self.widgets
            .get(&widget)
            .is_some_and(|set| set.contains(capability))
    }

    /// All registered widgets satisfying the required capabilities.
    ///
    /// With `match_all` every required tag must be declared (an empty
    /// requirement matches every widget); otherwise one declared tag is
    /// enough (an empty requirement matches none).
    pub fn find_widgets(&self, required: &[Capability], match_all: bool) -> HashSet<WidgetId> {
        self.widgets
            .iter()
            .filter(|(_, set)| {
                if match_all {
                    required.iter().all(|c| set.contains(c))
                } else {
                    required.iter().any(|c| set.contains(c))
                }
            })
            .map(|(id, _)| *id)
            .collect()
    }
}
