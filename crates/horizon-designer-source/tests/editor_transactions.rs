//! Integration tests for editing a parsed file and keeping spans in sync.

use horizon_designer_source::syntax::{StmtKind, walk_statements};
use horizon_designer_source::{Fragment, MalformedEditError, SourceEditor, StatementTarget};

const PANEL: &str = r#"package demo;

import javax.swing.JPanel;

public class Demo extends JPanel {
	private JButton ok;

	public Demo() {
		ok = new JButton("OK");
		add(ok);
		JLabel label = new JLabel("Name");
		add(label);
	}
}
"#;

fn setup() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_designer_source=trace")
        .with_test_writer()
        .try_init();
}

fn statement_fragments(editor: &mut SourceEditor) -> Vec<Fragment> {
    let unit = editor.reparse().unwrap();
    let class = unit.class.as_ref().unwrap();
    let body = class.method("Demo").unwrap().body.as_ref().unwrap();
    let mut fragments = Vec::new();
    walk_statements(body, &mut |stmt| fragments.push(Fragment::new(stmt.span)));
    fragments
}

#[test]
fn fragments_survive_unrelated_edits() {
    setup();
    let mut editor = SourceEditor::new(PANEL);
    let mut fragments = statement_fragments(&mut editor);
    assert_eq!(fragments.len(), 4);

    let map = editor.ensure_import("javax.swing.JButton").unwrap().unwrap();
    fragments.iter_mut().for_each(|f| f.apply(&map));

    let texts: Vec<String> = fragments
        .iter()
        .map(|f| editor.read(f.get().unwrap()).unwrap())
        .collect();
    assert_eq!(texts[0], "ok = new JButton(\"OK\");");
    assert_eq!(texts[3], "add(label);");
}

#[test]
fn moving_a_group_keeps_it_intact() {
    setup();
    let mut editor = SourceEditor::new(PANEL);
    let mut fragments = statement_fragments(&mut editor);
    let group: Vec<_> = fragments[2..4].iter().map(|f| f.get().unwrap()).collect();
    let first = fragments[0].get().unwrap();

    let (map, moved) = editor
        .relocate_statements(&group, StatementTarget::Before(first))
        .unwrap();
    fragments.iter_mut().for_each(|f| f.apply(&map));

    assert!(editor.text().contains(
        "\t\tJLabel label = new JLabel(\"Name\");\n\t\tadd(label);\n\t\tok = new JButton(\"OK\");\n\t\tadd(ok);\n"
    ));
    assert_eq!(editor.read(moved[1]).unwrap(), "add(label);");
    assert_eq!(fragments[3].get(), Some(moved[1]));
    assert_eq!(editor.read(fragments[1].get().unwrap()).unwrap(), "add(ok);");

    let reparsed = statement_fragments(&mut editor);
    assert_eq!(reparsed.len(), 4);
}

#[test]
fn failed_transaction_leaves_text_untouched() {
    setup();
    let mut editor = SourceEditor::new(PANEL);
    let fragments = statement_fragments(&mut editor);
    let label_decl = fragments[2].get().unwrap();
    editor.protect(label_decl).unwrap();

    let marker = editor.begin_transaction();
    let first = fragments[0].get().unwrap();
    editor
        .insert_statements(StatementTarget::Before(first), &["setOpaque(false);".to_string()])
        .unwrap();
    let shifted = editor.protected_regions()[0];
    let err = editor.remove_statement(shifted).unwrap_err();
    assert!(matches!(err, MalformedEditError::ProtectedRegion { .. }));

    editor.rollback_to(marker).unwrap();
    assert_eq!(editor.text(), PANEL);
    assert_eq!(editor.protected_regions(), &[label_decl]);
}

#[test]
fn opaque_code_round_trips() {
    let source = "class A {\n\tstatic { init(); }\n\tvoid m() {\n\t\tfor (;;) { break; }\n\t\tswitch (x) { default: y(); }\n\t}\n}\n";
    let mut editor = SourceEditor::new(source);
    let unit = editor.reparse().unwrap();
    let body = unit.class.as_ref().unwrap().method("m").unwrap().body.clone().unwrap();
    assert!(body.statements.iter().all(|s| matches!(s.kind, StmtKind::Other)));
    assert_eq!(editor.text(), source);
}
