use onigtree::{Node, NodeKind, PrettyPrintVisitor, parse, pretty::Doc};
use proptest::prelude::*;

fn parse_ok(pattern: &str) -> Node {
    parse(pattern).unwrap_or_else(|err| panic!("Parser failed for pattern {pattern:?}: {err}"))
}

#[test]
fn test_short_trees_stay_on_one_line() {
    assert_eq!(
        parse_ok("a|b").pretty_print(),
        r#"alternation(string("a"), string("b"))"#
    );
    assert_eq!(parse_ok("\\A").pretty_print(), "anchorBufferBegin()");
    assert_eq!(parse_ok(".").pretty_print(), "any");
    assert_eq!(parse_ok("\\w").pretty_print(), "word()");
}

#[test]
fn test_wide_trees_break_per_argument() {
    assert_eq!(
        parse_ok("(abcdefghij)(klmnopqrst)(uvwxyz0123)").pretty_print(),
        concat!(
            "list(\n",
            "  encloseMemory(1, string(\"abcdefghij\")),\n",
            "  encloseMemory(2, string(\"klmnopqrst\")),\n",
            "  encloseMemory(3, string(\"uvwxyz0123\"))\n",
            ")",
        )
    );
}

#[test]
fn test_narrow_width() {
    let node = parse_ok("a*");
    let expected = concat!(
        "quantifier(\n",
        "  lower: 0,\n",
        "  upper: -1,\n",
        "  greedy: true,\n",
        "  string(\"a\")\n",
        ")",
    );
    assert_eq!(node.pretty_print_width(20), expected);
    assert_eq!(format!("{node:20}"), expected);
    assert_eq!(
        node.to_string(),
        r#"quantifier(lower: 0, upper: -1, greedy: true, string("a"))"#
    );
}

#[test]
fn test_range_lists_break_between_items() {
    assert_eq!(
        parse_ok("[a-cx]").pretty_print_width(20),
        "cclass(\n  [[97, 99],\n   [120, 120]]\n)"
    );
}

#[test]
fn test_strings_are_escaped() {
    assert_eq!(parse_ok("\\t").pretty_print(), r#"string("\t")"#);
    assert_eq!(parse_ok("a#{b").pretty_print(), r#"string("a\#{b")"#);
    assert_eq!(parse_ok("\\\\").pretty_print(), r#"string("\\")"#);
    assert_eq!(parse_ok("\\e").pretty_print(), r#"string("\e")"#);
    assert_eq!(parse_ok("\\x01").pretty_print(), r#"string("\u{1}")"#);
    assert_eq!(parse_ok("#a").pretty_print(), r##"string("#a")"##);
}

#[test]
fn test_references_print_null_for_missing_parts() {
    assert_eq!(parse_ok("\\g<x>").pretty_print(), r#"call(null, "x")"#);
    assert_eq!(parse_ok("\\g<0>").pretty_print(), "call(0, null)");
    assert_eq!(parse_ok("\\k<x>").pretty_print(), r#"backref("x")"#);
}

#[test]
fn test_visitor_output_is_a_document() {
    let node = parse_ok("ab");
    let doc: Doc = node.accept(&mut PrettyPrintVisitor);
    assert_eq!(doc.render(80), r#"string("ab")"#);
}

#[test]
fn test_doc_layout() {
    let doc = Doc::group(Doc::concat(vec![
        Doc::text("["),
        Doc::nest(
            1,
            Doc::comma_separated([Doc::text("aaaa"), Doc::text("bbbb")]),
        ),
        Doc::text("]"),
    ]));
    assert_eq!(doc.render(80), "[aaaa, bbbb]");
    assert_eq!(doc.render(8), "[aaaa,\n bbbb]");
    assert_eq!(Doc::Nil.render(80), "");
}

fn node_count(node: &Node) -> usize {
    1 + node.child_nodes().iter().map(node_count).sum::<usize>()
}

/// Counts printed node names. `any` is the only name printed without
/// arguments.
fn printed_nodes(text: &str) -> usize {
    NodeKind::ALL
        .iter()
        .map(|kind| match kind {
            NodeKind::Any => text.matches("any").count(),
            kind => text.matches(&format!("{}(", kind.tag())).count(),
        })
        .sum()
}

const ATOMS: &[&str] = &[
    "a", "b", ".", "\\w", "\\W", "\\d", "[a-z]", "[^x]", "\\A", "\\b", "$", "(", "(?:",
    "(?<n>", "(?=", "(?<!", "(?>", "(?~", "(?i)", ")", "|", "*", "+?", "{2,3}", "\\k<n>",
    "\\g<n>",
];

proptest! {
    #[test]
    fn every_node_is_printed_once(
        parts in prop::collection::vec(prop::sample::select(ATOMS.to_vec()), 0..16),
        width in 10usize..100,
    ) {
        let pattern = parts.concat();
        if let Ok(node) = parse(&pattern) {
            let flat = node.pretty_print_width(usize::MAX);
            prop_assert_eq!(printed_nodes(&flat), node_count(&node));
            prop_assert!(!flat.contains('\n'));

            let wrapped = node.pretty_print_width(width);
            prop_assert_eq!(printed_nodes(&wrapped), node_count(&node));
        }
    }
}
