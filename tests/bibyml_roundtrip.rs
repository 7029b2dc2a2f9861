//! Property-based tests for the bibyml parser and writer
//!
//! Generated trees use unique sibling keys, keys without `:`, and values that are non-empty and
//! trimmed: the text form cannot represent anything else.

use cryptobib::bibyml::{parse, write_str, BibYmlError, BibYmlNode, WriterOptions};
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_]{1,6}",
        "[a-zA-Z0-9_][a-zA-Z0-9_ '-]{0,10}[a-zA-Z0-9_]",
    ]
}

fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9]{1,8}",
        "[a-zA-Z0-9][a-zA-Z0-9 .,:/()=-]{0,20}[a-zA-Z0-9.)]",
    ]
}

fn node_with(value: Option<String>, children: Vec<(String, BibYmlNode)>) -> BibYmlNode {
    let mut node = BibYmlNode::new();
    node.set_value(value);
    for (key, child) in children {
        node.insert(key, child);
    }
    node
}

fn node_strategy() -> impl Strategy<Value = BibYmlNode> {
    let leaf = proptest::option::of(value_strategy()).prop_map(|value| node_with(value, vec![]));
    leaf.prop_recursive(4, 48, 4, |inner| {
        (
            proptest::option::of(value_strategy()),
            prop::collection::btree_map(key_strategy(), inner, 0..4),
        )
            .prop_map(|(value, children)| node_with(value, children.into_iter().collect()))
    })
}

fn document_strategy() -> impl Strategy<Value = BibYmlNode> {
    prop::collection::btree_map(key_strategy(), node_strategy(), 0..5)
        .prop_map(|children| node_with(None, children.into_iter().collect()))
}

fn options_strategy() -> impl Strategy<Value = WriterOptions> {
    (1usize..8, 0usize..40).prop_map(|(indent_width, value_column)| WriterOptions {
        indent_width,
        value_column,
    })
}

proptest! {
    #[test]
    fn parse_inverts_write(tree in document_strategy(), options in options_strategy()) {
        let text = write_str(&tree, &options);
        let parsed = parse(&text).expect("written text to parse");
        prop_assert_eq!(parsed, tree);
    }

    #[test]
    fn write_is_idempotent(tree in document_strategy()) {
        let options = WriterOptions::default();
        let once = write_str(&tree, &options);
        let twice = write_str(&parse(&once).expect("written text to parse"), &options);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn alignment_does_not_change_the_tree(tree in document_strategy(), extra in 1usize..6) {
        // Re-indent every line with a wider step: same tree
        let text = write_str(&tree, &WriterOptions::default());
        let wide: String = text
            .lines()
            .map(|line| {
                let depth = (line.len() - line.trim_start().len()) / 4;
                format!("{}{}\n", " ".repeat(depth * (4 + extra)), line.trim_start())
            })
            .collect();
        prop_assert_eq!(parse(&wide).expect("re-indented text to parse"), tree);
    }

    #[test]
    fn arbitrary_input_never_panics(source in "[ a-z:\n\t]{0,80}") {
        let _ = parse(&source);
    }
}

#[test]
fn mixed_value_and_children() {
    let root = parse("eurocrypt: test\n    2013: aa\n    2015: bb\n").unwrap();
    let expected = BibYmlNode::new().child(
        "eurocrypt",
        BibYmlNode::with_value("test")
            .child("2013", BibYmlNode::with_value("aa"))
            .child("2015", BibYmlNode::with_value("bb")),
    );
    assert_eq!(root, expected);
}

#[test]
fn closing_several_levels_at_once() {
    let source = "\
a:
  b:
    c: 1
    d: 2
e: 3
";
    let root = parse(source).unwrap();
    assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "e"]);
    assert_eq!(root.get_path(&["a", "b", "d"]).unwrap().value(), Some("2"));
    assert_eq!(root.value_of("e"), Some("3"));
}

#[test]
fn dedent_to_unknown_column_is_rejected() {
    let err = parse("a:\n    b: 1\n  c: 2\n").unwrap_err();
    assert!(matches!(err, BibYmlError::Indentation { line_number: 3, .. }));
    assert_eq!(err.line(), "  c: 2");
}

#[test]
fn tab_indentation_is_rejected() {
    let err = parse("a:\n\tb: 1\n").unwrap_err();
    assert!(matches!(err, BibYmlError::MalformedLine { line_number: 2, .. }));
}

#[test]
fn line_without_colon_is_rejected() {
    let err = parse("a: 1\njust some text\n").unwrap_err();
    assert_eq!(err.line_number(), 2);
    assert!(err.to_string().contains("just some text"));
}

#[test]
fn conference_registry_document() {
    let source = "\
EC:
    name:               Eurocrypt
    type:               conf
C:
    name:               Crypto
JC:
    name:               Journal of Cryptology
    type:               journal
    missing_years:      1990
";
    let root = parse(source).unwrap();
    // Containers are written as `key: ` with a trailing space
    let expected = source.replace(":\n", ": \n");
    assert_eq!(write_str(&root, &WriterOptions::default()), expected);
}
