// Workspace state engine: a tree-structured pane/tab model mutated only
// through a command-dispatch layer, with synchronous observer-based change
// propagation and serialized session state.
//
// The engine owns topology and focus; it never touches widget content.
// Embedding applications bind widgets to the opaque references the engine
// mints, declare widget capabilities through the registry, and re-derive
// their views from observer notifications.

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod capability;
pub mod commands;
pub mod ids;
pub mod observer;
pub mod pane;
pub mod session;
pub mod tab;
pub mod workspace;

pub use capability::{Capability, CapabilityRegistry};
pub use commands::{CommandResult, CommandSpec, CommandStatus, Dispatcher};
pub use ids::{IdKind, PaneId, SplitId, TabId, WidgetId};
pub use observer::{ChangeKind, ObserverBus, StateChange, SubscriberId};
pub use pane::{NavigationDirection, Pane, PaneError, PaneNode, PaneRect, SplitOrientation};
pub use session::{RestoreError, SessionState};
pub use tab::Tab;
pub use workspace::{InvariantViolation, WorkspaceModel};
