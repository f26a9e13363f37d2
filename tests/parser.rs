use onigtree::{
    Error, Node, NodeKind, Options, SyntaxError, parse, parse_tree, parse_with_options,
};

fn parse_ok(pattern: &str) -> Node {
    parse(pattern).unwrap_or_else(|err| panic!("Parser failed for pattern {pattern:?}: {err}"))
}

/// The tree on a single line.
fn tree(pattern: &str) -> String {
    parse_ok(pattern).pretty_print_width(usize::MAX)
}

fn syntax_error(pattern: &str) -> (usize, SyntaxError) {
    match parse(pattern) {
        Err(Error::Syntax { pos, kind }) => (pos, kind),
        other => panic!("expected a syntax error for {pattern:?}, got {other:?}"),
    }
}

#[test]
fn test_every_node_kind_is_reachable() {
    let cases = [
        ("a|b", NodeKind::Alternation),
        ("\\A", NodeKind::AnchorBufferBegin),
        ("\\z", NodeKind::AnchorBufferEnd),
        ("\\K", NodeKind::AnchorKeep),
        ("^", NodeKind::AnchorLineBegin),
        ("$", NodeKind::AnchorLineEnd),
        ("\\G", NodeKind::AnchorPositionBegin),
        ("\\Z", NodeKind::AnchorSemiEnd),
        ("\\b", NodeKind::AnchorWordBoundary),
        ("\\B", NodeKind::AnchorWordBoundaryInvert),
        (".", NodeKind::Any),
        ("\\1", NodeKind::Backref),
        ("\\g<name>", NodeKind::Call),
        ("[a-z]", NodeKind::CClass),
        ("[^a-z]", NodeKind::CClassInvert),
        ("(?~a)", NodeKind::EncloseAbsent),
        ("(?(1)a)", NodeKind::EncloseCondition),
        ("(a)", NodeKind::EncloseMemory),
        ("(?i)", NodeKind::EncloseOptions),
        ("(?>a)", NodeKind::EncloseStopBacktrack),
        ("a.b", NodeKind::List),
        ("(?=a)", NodeKind::LookAhead),
        ("(?!a)", NodeKind::LookAheadInvert),
        ("(?<=a)", NodeKind::LookBehind),
        ("(?<!a)", NodeKind::LookBehindInvert),
        ("a*", NodeKind::Quantifier),
        ("abc", NodeKind::String),
        ("\\w", NodeKind::Word),
        ("\\W", NodeKind::WordInvert),
    ];
    assert_eq!(cases.len(), NodeKind::ALL.len());
    for (pattern, kind) in cases {
        assert_eq!(parse_ok(pattern).kind(), kind, "pattern {pattern:?}");
    }
}

#[test]
fn test_string_parsing() {
    assert_eq!(tree("abc"), r#"string("abc")"#);
    assert_eq!(tree("a\\.b"), r#"string("a.b")"#);
    assert_eq!(tree("x{a}"), r#"string("x{a}")"#);
    assert_eq!(tree(""), r#"string("")"#);
    assert_eq!(tree("\\\""), r#"string("\"")"#);
}

#[test]
fn test_alternation_parsing() {
    assert_eq!(tree("a|b"), r#"alternation(string("a"), string("b"))"#);
    assert_eq!(tree("a|"), r#"alternation(string("a"), string(""))"#);
    assert_eq!(
        tree("ab|c.|d"),
        r#"alternation(string("ab"), list(string("c"), any), string("d"))"#
    );
}

#[test]
fn test_quantifier_parsing() {
    assert_eq!(
        tree("ab*"),
        r#"list(string("a"), quantifier(lower: 0, upper: -1, greedy: true, string("b")))"#
    );
    assert_eq!(
        tree("a+?"),
        r#"quantifier(lower: 1, upper: -1, greedy: false, string("a"))"#
    );
    assert_eq!(
        tree("a{2,3}"),
        r#"quantifier(lower: 2, upper: 3, greedy: true, string("a"))"#
    );
    assert_eq!(
        tree("a{,2}"),
        r#"quantifier(lower: 0, upper: 2, greedy: true, string("a"))"#
    );
    assert_eq!(
        tree("\\x41{2}"),
        r#"quantifier(lower: 2, upper: 2, greedy: true, string("A"))"#
    );
    assert_eq!(
        tree("é+"),
        r#"quantifier(lower: 1, upper: -1, greedy: true, string("é"))"#
    );
    assert_eq!(
        tree("a**"),
        r#"quantifier(lower: 0, upper: -1, greedy: true, quantifier(lower: 0, upper: -1, greedy: true, string("a")))"#
    );
}

#[test]
fn test_possessive_quantifier_is_atomic() {
    assert_eq!(
        tree("a*+"),
        r#"encloseStopBacktrack(quantifier(lower: 0, upper: -1, greedy: true, string("a")))"#
    );
}

#[test]
fn test_group_parsing() {
    assert_eq!(
        tree("(a)(?:b)(?<n>c)"),
        r#"list(encloseMemory(1, string("a")), string("b"), encloseMemory(2, string("c")))"#
    );
    assert_eq!(tree("()"), r#"encloseMemory(1, string(""))"#);
    assert_eq!(
        tree("(?=a)(?!b)(?<=c)(?<!d)"),
        r#"list(lookAhead(string("a")), lookAheadInvert(string("b")), lookBehind(string("c")), lookBehindInvert(string("d")))"#
    );
    assert_eq!(
        tree("(?>a)(?~b)"),
        r#"list(encloseStopBacktrack(string("a")), encloseAbsent(string("b")))"#
    );
    assert_eq!(
        tree("(a)(?(1)b|c)"),
        r#"list(encloseMemory(1, string("a")), encloseCondition(1, alternation(string("b"), string("c"))))"#
    );
    assert_eq!(
        tree("(?<n>a)(?(<n>)b)"),
        r#"list(encloseMemory(1, string("a")), encloseCondition("n", string("b")))"#
    );
}

#[test]
fn test_option_groups_parsing() {
    assert_eq!(tree("(?i)"), r#"encloseOptions(1, string(""))"#);
    assert_eq!(
        tree("(?i)a|b"),
        r#"encloseOptions(1, alternation(string("a"), string("b")))"#
    );
    assert_eq!(
        tree("a(?i)b"),
        r#"list(string("a"), encloseOptions(1, string("b")))"#
    );
    assert_eq!(
        tree("(?i:a)b"),
        r#"list(encloseOptions(1, string("a")), string("b"))"#
    );
    assert_eq!(tree("(?im-i:a)"), r#"encloseOptions(4, string("a"))"#);
    assert_eq!(
        tree("(a(?m)b)c"),
        r#"list(encloseMemory(1, list(string("a"), encloseOptions(4, string("b")))), string("c"))"#
    );
    assert_eq!(
        parse_with_options("(?-i:a)", Options::IGNORECASE)
            .unwrap()
            .pretty_print(),
        r#"encloseOptions(0, string("a"))"#
    );
}

#[test]
fn test_extended_mode_parsing() {
    assert_eq!(tree("(?x: a b )"), r#"encloseOptions(2, string("ab"))"#);
    assert_eq!(tree("(?x)a b#c\nd"), r#"encloseOptions(2, string("abd"))"#);
    assert_eq!(
        parse_with_options("a b", Options::EXTEND)
            .unwrap()
            .pretty_print(),
        r#"string("ab")"#
    );
}

#[test]
fn test_reference_parsing() {
    assert_eq!(tree("\\1"), "backref(1)");
    assert_eq!(tree("\\k<name>"), r#"backref("name")"#);
    assert_eq!(
        tree("(a)\\k<-1>"),
        r#"list(encloseMemory(1, string("a")), backref(1))"#
    );
    assert_eq!(tree("\\g<name>"), r#"call(null, "name")"#);
    assert_eq!(tree("\\g<1>"), "call(1, null)");
    assert_eq!(tree("\\g<0>"), "call(0, null)");
    assert_eq!(
        tree("(a)\\g<-1>"),
        r#"list(encloseMemory(1, string("a")), call(1, null))"#
    );
    assert_eq!(
        tree("\\g<+1>(a)"),
        r#"list(call(1, null), encloseMemory(1, string("a")))"#
    );
}

#[test]
fn test_char_class_parsing() {
    assert_eq!(tree("[a-z]"), "cclass([[97, 122]])");
    assert_eq!(tree("[^a-z]"), "cclassInvert([[97, 122]])");
    assert_eq!(tree("[a-cx]"), "cclass([[97, 99], [120, 120]])");
    assert_eq!(tree("[]a]"), "cclass([[93, 93], [97, 97]])");
    assert_eq!(tree("[a-]"), "cclass([[45, 45], [97, 97]])");
    assert_eq!(tree("[[:digit:]x]"), "cclass([[48, 57], [120, 120]])");
    assert_eq!(tree("[\\d]"), "cclass([[48, 57]])");
    assert_eq!(tree("[\\d-]"), "cclass([[45, 45], [48, 57]])");
    assert_eq!(tree("[a[xy]]"), "cclass([[97, 97], [120, 121]])");
    assert_eq!(
        tree("[a-z&&[^aeiou]]"),
        "cclass([[98, 100], [102, 104], [106, 110], [112, 116], [118, 122]])"
    );
}

#[test]
fn test_class_escape_parsing() {
    assert_eq!(tree("\\d"), "cclass([[48, 57]])");
    assert_eq!(tree("\\D"), "cclassInvert([[48, 57]])");
    assert_eq!(tree("\\h"), "cclass([[48, 57], [65, 70], [97, 102]])");
    assert_eq!(tree("\\w\\W"), "list(word(), wordInvert())");
}

#[test]
fn test_posix_classes_are_ascii() {
    let alpha = "cclass([[65, 90], [97, 122]])";
    assert_eq!(tree("[[:alpha:]]"), alpha);
    assert_eq!(tree("\\p{Alpha}"), alpha);
    assert_eq!(tree("(?a)[[:alpha:]]"), format!("encloseOptions(8192, {alpha})"));
    assert_eq!(tree("(?u)[[:alpha:]]"), format!("encloseOptions(0, {alpha})"));
    assert_eq!(tree("[[:print:]]"), "cclass([[32, 126]])");
}

#[test]
fn test_anchor_parsing() {
    assert_eq!(
        tree("\\A\\z\\K^$\\G\\Z\\b\\B"),
        "list(anchorBufferBegin(), anchorBufferEnd(), anchorKeep(), anchorLineBegin(), \
         anchorLineEnd(), anchorPositionBegin(), anchorSemiEnd(), anchorWordBoundary(), \
         anchorWordBoundaryInvert())"
    );
}

#[test]
fn test_linebreak_and_grapheme_expansion() {
    assert_eq!(
        tree("\\R"),
        r#"encloseStopBacktrack(alternation(string("\r\n"), cclass([[10, 13], [133, 133], [8232, 8233]])))"#
    );
    assert_eq!(
        tree("\\X"),
        r#"encloseStopBacktrack(alternation(string("\r\n"), encloseOptions(4, any)))"#
    );
}

#[test]
fn test_group_table() {
    let root = parse_tree("(a)(?<x>b)(?<x>c)(?<y>d)", Options::NONE).unwrap();
    assert_eq!(root.capture_count(), 4);
    assert_eq!(root.kind(), NodeKind::List);
    let names: Vec<_> = root.names().iter().map(|group| group.name()).collect();
    assert_eq!(names, ["x", "y"]);
    assert_eq!(root.name("x").unwrap().numbers(), &[2, 3]);
    assert!(root.name("z").is_none());
    assert_eq!(root.clone().into_node(), *root);
}

#[test]
fn test_parser_throw_errors() {
    assert_eq!(syntax_error("*"), (0, SyntaxError::TargetOfRepeatNotSpecified));
    assert_eq!(syntax_error("a|*"), (2, SyntaxError::TargetOfRepeatNotSpecified));
    assert_eq!(syntax_error("(*)"), (1, SyntaxError::TargetOfRepeatNotSpecified));
    assert_eq!(syntax_error("^*"), (1, SyntaxError::TargetOfRepeatInvalid));
    assert_eq!(syntax_error("("), (0, SyntaxError::UnmatchedParenthesis));
    assert_eq!(syntax_error("a(b"), (1, SyntaxError::UnmatchedParenthesis));
    assert_eq!(syntax_error("a)"), (1, SyntaxError::UnmatchedCloseParenthesis));
    assert_eq!(syntax_error("(?<>)"), (0, SyntaxError::EmptyGroupName));
    assert_eq!(syntax_error("\\k<0>"), (0, SyntaxError::InvalidBackref));
    assert_eq!(syntax_error("\\k<+1>"), (0, SyntaxError::InvalidBackref));
    assert_eq!(syntax_error("\\k<-1>"), (0, SyntaxError::InvalidBackref));
    assert_eq!(syntax_error("\\g<-1>"), (0, SyntaxError::InvalidBackref));
    assert_eq!(
        syntax_error("(?(1)a|b|c)"),
        (0, SyntaxError::InvalidConditionPattern)
    );
}

#[test]
fn test_char_class_errors() {
    assert_eq!(syntax_error("[]"), (0, SyntaxError::EmptyCharClass));
    assert_eq!(syntax_error("[a"), (0, SyntaxError::PrematureEndOfCharClass));
    assert_eq!(syntax_error("x[a-"), (2, SyntaxError::PrematureEndOfCharClass));
    assert_eq!(syntax_error("[z-a]"), (1, SyntaxError::EmptyRangeInCharClass));
    assert_eq!(
        syntax_error("[a-\\d]"),
        (1, SyntaxError::CharClassValueAtEndOfRange)
    );
    assert_eq!(
        syntax_error("[\\d-a]"),
        (1, SyntaxError::CharClassValueAtStartOfRange)
    );
    assert_eq!(
        syntax_error("[[:foo:]]"),
        (1, SyntaxError::InvalidPosixBracketType)
    );
}

#[test]
fn test_error_accessors() {
    let err = parse("a)").unwrap_err();
    assert!(err.is_syntax_error());
    assert_eq!(err.pos(), Some(1));
    assert_eq!(
        err.syntax_error(),
        Some(&SyntaxError::UnmatchedCloseParenthesis)
    );
    assert_eq!(err.to_string(), "unmatched close parenthesis at 1");
}
