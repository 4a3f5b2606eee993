//! End-to-end behavior of parsing and structural edits on whole files.

use std::sync::Arc;

use horizon_designer::{
    Association, CapabilityError, CreateRequest, DescriptorRegistry, DesignSession, DesignerError,
    OperationState, ParseError, SessionConfig, SharedDiagnostics, StructuralEditError,
    VariableSupport,
};

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_designer=debug,horizon_designer_core=debug")
        .with_test_writer()
        .try_init();
}

fn open(source: &str) -> DesignSession {
    setup();
    let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
    DesignSession::open(source, registry, SessionConfig::default()).unwrap()
}

#[test]
fn root_with_one_inline_child() {
    let mut session = open(
        "import javax.swing.*;\n\
         public class Launcher {\n\
         \tpublic static void main(String[] args) {\n\
         \t\tJPanel panel = new JPanel();\n\
         \t\tpanel.add(new JButton(\"OK\"));\n\
         \t}\n\
         }\n",
    );
    assert_eq!(session.tree().len(), 2);
    let root = session.root().unwrap();
    assert_eq!(session.info(root).unwrap().name(), Some("panel"));

    let child = session.children(root).unwrap()[0];
    assert!(matches!(
        session.association(child).unwrap(),
        Some(Association::Invocation { .. })
    ));
    assert!(session.info(child).unwrap().name().is_none());
    assert!(matches!(
        session.variable_support(child).unwrap(),
        VariableSupport::Anonymous(_)
    ));

    let before = session.dump().unwrap();
    session.refresh().unwrap();
    assert_eq!(session.dump().unwrap(), before);
}

#[test]
fn create_at_front_of_sequence() {
    let mut session = open(
        "import javax.swing.*;\n\
         public class View extends JPanel {\n\
         \tpublic View() {\n\
         \t\tJButton first = new JButton(\"1\");\n\
         \t\tadd(first);\n\
         \t\tJButton second = new JButton(\"2\");\n\
         \t\tadd(second);\n\
         \t}\n\
         }\n",
    );
    let root = session.root().unwrap();
    let old = session.children(root).unwrap().to_vec();

    let mut sequence = session.sequence_container(root).unwrap();
    let created = sequence
        .insert(CreateRequest::new("javax.swing.JLabel").with_name("title"), 0)
        .unwrap();
    assert_eq!(sequence.list().unwrap(), vec![created, old[0], old[1]]);

    let source = session.source();
    let new_call = source.find("add(title);").unwrap();
    assert!(new_call < source.find("add(first);").unwrap());
    assert!(new_call < source.find("add(second);").unwrap());
    assert!(source.contains("\t\tJLabel title = new JLabel();\n\t\tadd(title);\n"));
}

#[test]
fn exposed_child_cannot_be_deleted() {
    let source = "import javax.swing.*;\n\
         public class MainFrame extends JFrame {\n\
         \tpublic MainFrame() {\n\
         \t\tgetContentPane().add(new JLabel(\"x\"));\n\
         \t}\n\
         }\n";
    let mut session = open(source);
    let root = session.root().unwrap();
    let content = session.children(root).unwrap()[0];
    let nodes = session.tree().len();

    let err = session.delete(content).unwrap_err();
    assert!(matches!(
        err,
        DesignerError::Capability(CapabilityError::NotDeletable { node, .. }) if node == content
    ));
    assert_eq!(session.source(), source);
    assert_eq!(session.tree().len(), nodes);
    assert_eq!(session.children(root).unwrap(), &[content]);
    assert_eq!(session.last_operation_state(), Some(OperationState::Aborted));
}

#[test]
fn move_into_occupied_slot_needs_clear() {
    let source = "import javax.swing.*;\n\
         public class View extends JPanel {\n\
         \tpublic View() {\n\
         \t\tJScrollPane scroll = new JScrollPane();\n\
         \t\tadd(scroll);\n\
         \t\tJTextArea notes = new JTextArea();\n\
         \t\tscroll.setViewportView(notes);\n\
         \t\tJTextField query = new JTextField();\n\
         \t\tadd(query);\n\
         \t}\n\
         }\n";
    let mut session = open(source);
    let root = session.root().unwrap();
    let [scroll, query] = session.children(root).unwrap() else {
        panic!("expected two children");
    };
    let (scroll, query) = (*scroll, *query);

    let err = session.move_component(query, scroll, 1).unwrap_err();
    assert!(matches!(
        err,
        DesignerError::StructuralEdit(StructuralEditError::SlotOccupied { parent, .. }) if parent == scroll
    ));
    let err = session.slot_container(scroll).unwrap().set(query).unwrap_err();
    assert!(matches!(
        err,
        DesignerError::StructuralEdit(StructuralEditError::SlotOccupied { .. })
    ));
    assert_eq!(session.source(), source);

    let mut viewport = session.slot_container(scroll).unwrap();
    assert!(viewport.clear().unwrap());
    viewport.set(query).unwrap();
    assert_eq!(viewport.get().unwrap(), Some(query));
    let source = session.source();
    assert!(source.contains("\t\tscroll.setViewportView(query);\n"));
    assert!(!source.contains("notes"));
    assert_eq!(session.children(root).unwrap(), &[scroll]);
}

#[test]
fn unknown_construction_becomes_one_bad_node() {
    let source = "import javax.swing.*;\n\
         public class View extends JPanel {\n\
         \tpublic View() {\n\
         \t\tJButton ok = new JButton(\"OK\");\n\
         \t\tadd(ok);\n\
         \t\tGauge gauge = new Gauge(42);\n\
         \t\tgauge.add(new JLabel(\"inside\"));\n\
         \t\tadd(gauge);\n\
         \t}\n\
         }\n";
    let mut session = open(source);
    let root = session.root().unwrap();
    assert_eq!(session.children(root).unwrap().len(), 1);
    assert_eq!(session.tree().len(), 2);

    let bad = session.bad_nodes();
    assert_eq!(bad.len(), 1);
    assert!(matches!(bad[0].error, ParseError::UnknownType { .. }));
    assert!(source[bad[0].span.range()].contains("Gauge"));

    let diagnostics = SharedDiagnostics::new();
    session.set_diagnostics_sink(Box::new(diagnostics.clone()));
    assert_eq!(diagnostics.snapshot().len(), 1);
}
