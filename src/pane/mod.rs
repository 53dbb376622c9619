//! Split-pane tree: node types, synthesized geometry, and the per-tab
//! pane manager.

pub mod manager;
pub mod types;

pub use manager::{PaneError, PaneManager};
pub use types::{NavigationDirection, Pane, PaneNode, PaneRect, SplitOrientation};
