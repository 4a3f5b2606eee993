//! Typed broadcast bus for model change notifications.
//!
//! Listeners subscribe to one event type and are invoked synchronously, in
//! registration order, every time an event of that type is published. The
//! canvas, the outline and the property sheet all learn about structural
//! edits through this bus.
//!
//! # Key Types
//!
//! - [`Broadcast`] - The bus itself; cheap to clone, clones share listeners
//! - [`ListenerId`] - Identifier returned by [`Broadcast::subscribe`]
//! - [`ListenerGuard`] - RAII guard that unsubscribes when dropped
//! - [`ChildAdded`], [`ChildRemoved`], [`ChildMoved`], [`NodeReplaced`] - Model events
//!
//! # Reentrancy
//!
//! The listener table is never locked while a listener runs, so a listener
//! may subscribe or unsubscribe (including itself). A listener removed during
//! a dispatch is not invoked for the remainder of that dispatch.
//!
//! # Example
//!
//! ```
//! use horizon_designer_core::{Broadcast, ChildAdded, ModelTree};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! let mut tree = ModelTree::new();
//! let root = tree.set_root("root").unwrap();
//! let child = tree.push_child(root, "child").unwrap();
//!
//! let bus = Broadcast::new();
//! let seen = Arc::new(AtomicUsize::new(0));
//! let seen_clone = seen.clone();
//! bus.subscribe(move |event: &ChildAdded| {
//!     seen_clone.fetch_add(event.index + 1, Ordering::SeqCst);
//! });
//!
//! bus.publish(&ChildAdded { parent: root, child, index: 0 });
//! assert_eq!(seen.load(Ordering::SeqCst), 1);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::model::NodeId;

new_key_type! {
    /// A unique identifier for a bus subscription.
    ///
    /// Pass it to [`Broadcast::unsubscribe`] to remove the listener.
    pub struct ListenerId;
}

/// Marker trait for values that can travel over a [`Broadcast`].
pub trait Event: Any {}

/// A child was inserted under `parent` at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildAdded {
    /// The new parent.
    pub parent: NodeId,
    /// The inserted node.
    pub child: NodeId,
    /// Position among the parent's children after insertion.
    pub index: usize,
}

/// A child was removed from `parent`; it was at `index`.
///
/// Deleting a subtree publishes one event per removed node, bottom-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildRemoved {
    /// The former parent.
    pub parent: NodeId,
    /// The removed node. Its id is no longer valid.
    pub child: NodeId,
    /// Position among the parent's children before removal.
    pub index: usize,
}

/// A child changed position or parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildMoved {
    /// The moved node.
    pub child: NodeId,
    /// Parent before the move.
    pub old_parent: NodeId,
    /// Index before the move.
    pub old_index: usize,
    /// Parent after the move.
    pub new_parent: NodeId,
    /// Index after the move.
    pub new_index: usize,
}

/// The whole tree was rebuilt from source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeReplaced {
    /// Root of the discarded tree, if there was one.
    pub old: Option<NodeId>,
    /// Root of the rebuilt tree, if parsing found one.
    pub new: Option<NodeId>,
}

impl Event for ChildAdded {}
impl Event for ChildRemoved {}
impl Event for ChildMoved {}
impl Event for NodeReplaced {}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;

struct Listener {
    event_type: TypeId,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    listeners: SlotMap<ListenerId, Listener>,
    /// Registration order per event type.
    order: HashMap<TypeId, Vec<ListenerId>>,
}

#[derive(Default)]
struct Inner {
    registry: Mutex<Registry>,
    blocked: AtomicBool,
}

/// Synchronous publish/subscribe bus keyed by event type.
#[derive(Clone, Default)]
pub struct Broadcast {
    inner: Arc<Inner>,
}

impl Broadcast {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for events of type `E`.
    pub fn subscribe<E, F>(&self, listener: F) -> ListenerId
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let callback: Callback = Arc::new(move |event: &dyn Any| {
            if let Some(event) = event.downcast_ref::<E>() {
                listener(event);
            }
        });
        let event_type = TypeId::of::<E>();
        let mut registry = self.inner.registry.lock();
        let id = registry.listeners.insert(Listener {
            event_type,
            callback,
        });
        registry.order.entry(event_type).or_default().push(id);
        tracing::trace!(
            target: "horizon_designer_core::broadcast",
            ?id, event = std::any::type_name::<E>(),
            "listener subscribed"
        );
        id
    }

    /// Register a listener that is removed when the returned guard drops.
    pub fn subscribe_guarded<E, F>(&self, listener: F) -> ListenerGuard
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = self.subscribe(listener);
        ListenerGuard {
            bus: Arc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        Self::unsubscribe_inner(&self.inner, id)
    }

    fn unsubscribe_inner(inner: &Inner, id: ListenerId) -> bool {
        let mut registry = inner.registry.lock();
        let Some(listener) = registry.listeners.remove(id) else {
            return false;
        };
        if let Some(order) = registry.order.get_mut(&listener.event_type) {
            order.retain(|&other| other != id);
        }
        tracing::trace!(target: "horizon_designer_core::broadcast", ?id, "listener unsubscribed");
        true
    }

    /// Number of listeners registered for `E`.
    pub fn listener_count<E: Event>(&self) -> usize {
        self.inner
            .registry
            .lock()
            .order
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Block or unblock publishing.
    ///
    /// While blocked, [`publish`](Self::publish) delivers nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.inner.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Whether publishing is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.inner.blocked.load(Ordering::SeqCst)
    }

    /// Deliver `event` to every listener of its type, in registration order.
    ///
    /// Returns the number of listeners invoked.
    #[tracing::instrument(skip_all, target = "horizon_designer_core::broadcast", level = "trace")]
    pub fn publish<E: Event>(&self, event: &E) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: "horizon_designer_core::broadcast", "bus blocked, skipping publish");
            return 0;
        }

        let snapshot: Vec<ListenerId> = self
            .inner
            .registry
            .lock()
            .order
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();
        tracing::trace!(
            target: "horizon_designer_core::broadcast",
            listeners = snapshot.len(), event = std::any::type_name::<E>(),
            "publishing event"
        );

        let mut delivered = 0;
        for id in snapshot {
            // Re-check under the lock: an earlier listener may have removed this one.
            let callback = {
                let registry = self.inner.registry.lock();
                registry.listeners.get(id).map(|l| l.callback.clone())
            };
            if let Some(callback) = callback {
                callback(event as &dyn Any);
                delivered += 1;
            }
        }
        delivered
    }
}

impl std::fmt::Debug for Broadcast {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcast")
            .field("listeners", &self.inner.registry.lock().listeners.len())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

/// Unsubscribes its listener when dropped.
///
/// Holds only a weak reference, so it never keeps the bus alive.
pub struct ListenerGuard {
    bus: Weak<Inner>,
    id: Option<ListenerId>,
}

impl ListenerGuard {
    /// The guarded listener.
    pub fn id(&self) -> Option<ListenerId> {
        self.id
    }

    /// Keep the listener registered and give up the guard.
    pub fn release(mut self) -> Option<ListenerId> {
        self.id.take()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let (Some(id), Some(inner)) = (self.id.take(), self.bus.upgrade()) {
            Broadcast::unsubscribe_inner(&inner, id);
        }
    }
}

static_assertions::assert_impl_all!(Broadcast: Send, Sync, Clone);
static_assertions::assert_impl_all!(ListenerGuard: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelTree;

    fn ids() -> (NodeId, NodeId) {
        let mut tree = ModelTree::new();
        let root = tree.set_root(()).unwrap();
        let child = tree.push_child(root, ()).unwrap();
        (root, child)
    }

    #[test]
    fn test_registration_order() {
        let bus = Broadcast::new();
        let (root, child) = ids();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let log = log.clone();
            bus.subscribe(move |_: &ChildAdded| log.lock().push(tag));
        }
        let delivered = bus.publish(&ChildAdded {
            parent: root,
            child,
            index: 0,
        });
        assert_eq!(delivered, 3);
        assert_eq!(*log.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_keyed_by_event_type() {
        let bus = Broadcast::new();
        let (root, child) = ids();
        let added = Arc::new(Mutex::new(0));
        let added_clone = added.clone();
        bus.subscribe(move |_: &ChildAdded| *added_clone.lock() += 1);

        bus.publish(&ChildRemoved {
            parent: root,
            child,
            index: 0,
        });
        assert_eq!(*added.lock(), 0);
        assert_eq!(bus.listener_count::<ChildAdded>(), 1);
        assert_eq!(bus.listener_count::<ChildRemoved>(), 0);
    }

    #[test]
    fn test_self_removal_during_dispatch() {
        let bus = Broadcast::new();
        let (root, child) = ids();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let own_id = Arc::new(Mutex::new(None::<ListenerId>));

        let bus_clone = bus.clone();
        let calls_clone = calls.clone();
        let own_clone = own_id.clone();
        let id = bus.subscribe(move |_: &NodeReplaced| {
            calls_clone.lock().push("self-removing");
            if let Some(id) = *own_clone.lock() {
                bus_clone.unsubscribe(id);
            }
        });
        *own_id.lock() = Some(id);

        let calls_clone = calls.clone();
        bus.subscribe(move |_: &NodeReplaced| calls_clone.lock().push("stays"));

        let event = NodeReplaced {
            old: Some(root),
            new: Some(child),
        };
        bus.publish(&event);
        bus.publish(&event);
        assert_eq!(*calls.lock(), vec!["self-removing", "stays", "stays"]);
    }

    #[test]
    fn test_removed_mid_dispatch_not_invoked() {
        let bus = Broadcast::new();
        let (root, child) = ids();
        let calls = Arc::new(Mutex::new(0));
        let victim = Arc::new(Mutex::new(None::<ListenerId>));

        let bus_clone = bus.clone();
        let victim_clone = victim.clone();
        bus.subscribe(move |_: &ChildAdded| {
            if let Some(id) = victim_clone.lock().take() {
                bus_clone.unsubscribe(id);
            }
        });
        let calls_clone = calls.clone();
        let id = bus.subscribe(move |_: &ChildAdded| *calls_clone.lock() += 1);
        *victim.lock() = Some(id);

        let delivered = bus.publish(&ChildAdded {
            parent: root,
            child,
            index: 0,
        });
        assert_eq!(delivered, 1);
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_guard_unsubscribes_on_drop() {
        let bus = Broadcast::new();
        {
            let _guard = bus.subscribe_guarded(|_: &ChildMoved| {});
            assert_eq!(bus.listener_count::<ChildMoved>(), 1);
        }
        assert_eq!(bus.listener_count::<ChildMoved>(), 0);

        let guard = bus.subscribe_guarded(|_: &ChildMoved| {});
        let id = guard.release();
        assert!(id.is_some());
        assert_eq!(bus.listener_count::<ChildMoved>(), 1);
    }

    #[test]
    fn test_blocked_bus() {
        let bus = Broadcast::new();
        let (root, child) = ids();
        bus.subscribe(|_: &ChildAdded| {});
        bus.set_blocked(true);
        assert_eq!(
            bus.publish(&ChildAdded {
                parent: root,
                child,
                index: 0
            }),
            0
        );
        bus.set_blocked(false);
        assert!(!bus.is_blocked());
    }
}
