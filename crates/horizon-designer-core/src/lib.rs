//! Core systems for Horizon Designer.
//!
//! This crate provides the toolkit-independent foundation of the designer's
//! model/source synchronization engine:
//!
//! - **Model Tree**: an arena of nodes with ordered children, a single root,
//!   cascade destroy and per-node annotations
//! - **Broadcast**: a typed synchronous publish/subscribe bus for
//!   `ChildAdded`, `ChildRemoved`, `ChildMoved` and `NodeReplaced`
//! - **Logging**: tracing targets and tree dumps for diagnostics
//!
//! # Example
//!
//! ```
//! use horizon_designer_core::{Broadcast, ChildRemoved, ModelTree};
//!
//! let mut tree = ModelTree::new();
//! let root = tree.set_root("frame").unwrap();
//! let panel = tree.push_child(root, "panel").unwrap();
//! tree.push_child(panel, "button").unwrap();
//!
//! let bus = Broadcast::new();
//! bus.subscribe(|event: &ChildRemoved| {
//!     println!("removed {:?} from {:?}", event.child, event.parent);
//! });
//!
//! let index = tree.index_of(panel).unwrap().unwrap();
//! for removed in tree.destroy(panel).unwrap() {
//!     bus.publish(&ChildRemoved { parent: root, child: removed, index });
//! }
//! assert_eq!(tree.len(), 1);
//! ```

pub mod broadcast;
mod error;
pub mod logging;
pub mod model;

pub use broadcast::{
    Broadcast, ChildAdded, ChildMoved, ChildRemoved, Event, ListenerGuard, ListenerId,
    NodeReplaced,
};
pub use error::{ModelError, ModelResult};
pub use logging::{ModelTreeDebug, PerfSpan, TreeFormatOptions, TreeLabel, TreeStyle};
pub use model::{ModelTree, NodeId, PayloadSnapshot};
