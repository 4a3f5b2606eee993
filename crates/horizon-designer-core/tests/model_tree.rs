//! Integration tests for the model tree and broadcast bus working together.

use std::sync::Arc;

use horizon_designer_core::{
    Broadcast, ChildAdded, ChildMoved, ChildRemoved, ModelError, ModelTree, NodeId,
};
use parking_lot::Mutex;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_designer_core=trace")
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn attach(self: &Arc<Self>, bus: &Broadcast) {
        let me = self.clone();
        bus.subscribe(move |e: &ChildAdded| me.events.lock().push(format!("added@{}", e.index)));
        let me = self.clone();
        bus.subscribe(move |e: &ChildRemoved| {
            me.events.lock().push(format!("removed@{}", e.index))
        });
        let me = self.clone();
        bus.subscribe(move |e: &ChildMoved| {
            me.events
                .lock()
                .push(format!("moved {}->{}", e.old_index, e.new_index))
        });
    }
}

fn insert(tree: &mut ModelTree<u32>, bus: &Broadcast, parent: NodeId, index: usize, v: u32) -> NodeId {
    let child = tree.insert_child(parent, index, v).unwrap();
    bus.publish(&ChildAdded {
        parent,
        child,
        index,
    });
    child
}

#[test]
fn edits_keep_single_parent_invariant() {
    setup();
    let bus = Broadcast::new();
    let recorder = Arc::new(Recorder::default());
    recorder.attach(&bus);

    let mut tree = ModelTree::new();
    let root = tree.set_root(0).unwrap();
    let a = insert(&mut tree, &bus, root, 0, 1);
    let b = insert(&mut tree, &bus, root, 1, 2);
    let c = insert(&mut tree, &bus, a, 0, 3);
    tree.check_integrity().unwrap();

    let (old_parent, old_index) = tree.move_node(c, b, 0).unwrap();
    bus.publish(&ChildMoved {
        child: c,
        old_parent,
        old_index,
        new_parent: b,
        new_index: 0,
    });
    tree.check_integrity().unwrap();
    assert_eq!(tree.children(a).unwrap(), &[] as &[NodeId]);
    assert_eq!(tree.children(b).unwrap(), &[c]);

    let index = tree.index_of(b).unwrap().unwrap();
    for removed in tree.destroy(b).unwrap() {
        bus.publish(&ChildRemoved {
            parent: root,
            child: removed,
            index,
        });
    }
    tree.check_integrity().unwrap();

    assert_eq!(
        *recorder.events.lock(),
        vec!["added@0", "added@1", "added@0", "moved 0->0", "removed@1", "removed@1"]
    );
}

#[test]
fn stale_ids_never_alias() {
    let mut tree = ModelTree::new();
    let root = tree.set_root(0).unwrap();
    let doomed = tree.push_child(root, 1).unwrap();
    tree.destroy(doomed).unwrap();
    let fresh = tree.push_child(root, 2).unwrap();

    assert_ne!(doomed, fresh);
    assert_eq!(tree.get(doomed), Err(ModelError::InvalidNodeId));
    assert_eq!(tree.parent(doomed), Err(ModelError::InvalidNodeId));
    assert_eq!(*tree.get(fresh).unwrap(), 2);
}

#[test]
fn destroying_root_empties_tree() {
    let mut tree = ModelTree::new();
    let root = tree.set_root("root").unwrap();
    tree.push_child(root, "a").unwrap();
    tree.destroy(root).unwrap();
    assert!(tree.is_empty());
    assert_eq!(tree.root(), None);
    tree.set_root("again").unwrap();
}
