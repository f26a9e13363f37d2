use super::Visitor;
use crate::{
    ast::{
        Alternation, Backref, Call, CharClass, Enclose, EncloseCondition, EncloseMemory,
        EncloseOptions, GroupRef, List, Literal, Node, Quantifier,
    },
    pretty::{DEFAULT_WIDTH, Doc},
};
use std::fmt;

/// Lays nodes out as `name(arg, ...)` calls.
///
/// The visitor keeps no state between nodes, so a single value can format any
/// number of trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyPrintVisitor;

const INDENT: usize = 2;

/// `name(` args `)`, breaking after `(` and between arguments when too wide.
fn call(name: &str, args: Vec<Doc>) -> Doc {
    Doc::group(Doc::concat(vec![
        Doc::text(format!("{name}(")),
        Doc::nest(
            INDENT,
            Doc::concat(vec![Doc::softline(), Doc::comma_separated(args)]),
        ),
        Doc::softline(),
        Doc::text(")"),
    ]))
}

fn int(value: impl Into<i64>) -> Doc {
    Doc::text(value.into().to_string())
}

fn list(items: impl IntoIterator<Item = Doc>) -> Doc {
    Doc::group(Doc::concat(vec![
        Doc::text("["),
        Doc::nest(1, Doc::comma_separated(items)),
        Doc::text("]"),
    ]))
}

fn group_ref(value: &GroupRef) -> Doc {
    match value {
        GroupRef::Number(number) => int(*number),
        GroupRef::Name(name) => quoted(name),
    }
}

/// A double-quoted string with control characters, quotes and backslashes
/// escaped.
fn quoted(value: &str) -> Doc {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            '\x0b' => out.push_str("\\v"),
            '\x07' => out.push_str("\\a"),
            '\x1b' => out.push_str("\\e"),
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{{{:x}}}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    Doc::Text(out)
}

fn ranges(node: &CharClass) -> Doc {
    list(
        node.ranges()
            .iter()
            .map(|&(low, high)| list([int(low), int(high)])),
    )
}

impl PrettyPrintVisitor {
    fn enclosed(&mut self, name: &str, node: &Node) -> Doc {
        call(name, vec![node.accept(self)])
    }

    fn nodes(&mut self, name: &str, nodes: &[Node]) -> Doc {
        let args = nodes.iter().map(|node| node.accept(self)).collect();
        call(name, args)
    }
}

impl Visitor for PrettyPrintVisitor {
    type Output = Doc;

    fn visit_alternation(&mut self, node: &Alternation) -> Doc {
        self.nodes("alternation", node.nodes())
    }

    fn visit_anchor_buffer_begin(&mut self) -> Doc {
        Doc::text("anchorBufferBegin()")
    }

    fn visit_anchor_buffer_end(&mut self) -> Doc {
        Doc::text("anchorBufferEnd()")
    }

    fn visit_anchor_keep(&mut self) -> Doc {
        Doc::text("anchorKeep()")
    }

    fn visit_anchor_line_begin(&mut self) -> Doc {
        Doc::text("anchorLineBegin()")
    }

    fn visit_anchor_line_end(&mut self) -> Doc {
        Doc::text("anchorLineEnd()")
    }

    fn visit_anchor_position_begin(&mut self) -> Doc {
        Doc::text("anchorPositionBegin()")
    }

    fn visit_anchor_semi_end(&mut self) -> Doc {
        Doc::text("anchorSemiEnd()")
    }

    fn visit_anchor_word_boundary(&mut self) -> Doc {
        Doc::text("anchorWordBoundary()")
    }

    fn visit_anchor_word_boundary_invert(&mut self) -> Doc {
        Doc::text("anchorWordBoundaryInvert()")
    }

    fn visit_any(&mut self) -> Doc {
        Doc::text("any")
    }

    fn visit_backref(&mut self, node: &Backref) -> Doc {
        call("backref", node.values().iter().map(group_ref).collect())
    }

    fn visit_call(&mut self, node: &Call) -> Doc {
        let number = node.number().map_or_else(|| Doc::text("null"), int);
        let name = node.name().map_or_else(|| Doc::text("null"), quoted);
        call("call", vec![number, name])
    }

    fn visit_cclass(&mut self, node: &CharClass) -> Doc {
        call("cclass", vec![ranges(node)])
    }

    fn visit_cclass_invert(&mut self, node: &CharClass) -> Doc {
        call("cclassInvert", vec![ranges(node)])
    }

    fn visit_enclose_absent(&mut self, node: &Enclose) -> Doc {
        self.enclosed("encloseAbsent", node.node())
    }

    fn visit_enclose_condition(&mut self, node: &EncloseCondition) -> Doc {
        let body = node.node().accept(self);
        call("encloseCondition", vec![group_ref(node.number()), body])
    }

    fn visit_enclose_memory(&mut self, node: &EncloseMemory) -> Doc {
        let body = node.node().accept(self);
        call("encloseMemory", vec![int(node.number()), body])
    }

    fn visit_enclose_options(&mut self, node: &EncloseOptions) -> Doc {
        let body = node.node().accept(self);
        call("encloseOptions", vec![int(node.options().bits()), body])
    }

    fn visit_enclose_stop_backtrack(&mut self, node: &Enclose) -> Doc {
        self.enclosed("encloseStopBacktrack", node.node())
    }

    fn visit_list(&mut self, node: &List) -> Doc {
        self.nodes("list", node.nodes())
    }

    fn visit_look_ahead(&mut self, node: &Enclose) -> Doc {
        self.enclosed("lookAhead", node.node())
    }

    fn visit_look_ahead_invert(&mut self, node: &Enclose) -> Doc {
        self.enclosed("lookAheadInvert", node.node())
    }

    fn visit_look_behind(&mut self, node: &Enclose) -> Doc {
        self.enclosed("lookBehind", node.node())
    }

    fn visit_look_behind_invert(&mut self, node: &Enclose) -> Doc {
        self.enclosed("lookBehindInvert", node.node())
    }

    fn visit_quantifier(&mut self, node: &Quantifier) -> Doc {
        let body = node.node().accept(self);
        call(
            "quantifier",
            vec![
                Doc::text(format!("lower: {}", node.lower())),
                Doc::text(format!("upper: {}", node.upper().to_i64())),
                Doc::text(format!("greedy: {}", node.greedy())),
                body,
            ],
        )
    }

    fn visit_string(&mut self, node: &Literal) -> Doc {
        call("string", vec![quoted(node.value())])
    }

    fn visit_word(&mut self) -> Doc {
        Doc::text("word()")
    }

    fn visit_word_invert(&mut self) -> Doc {
        Doc::text("wordInvert()")
    }
}

impl Node {
    /// Formats this node as nested calls, breaking lines past 80 columns.
    ///
    /// ```
    /// let node = onigtree::parse("a*")?;
    /// assert_eq!(
    ///     node.pretty_print(),
    ///     r#"quantifier(lower: 0, upper: -1, greedy: true, string("a"))"#
    /// );
    /// # Ok::<(), onigtree::Error>(())
    /// ```
    #[must_use]
    pub fn pretty_print(&self) -> String {
        self.pretty_print_width(DEFAULT_WIDTH)
    }

    #[must_use]
    pub fn pretty_print_width(&self, width: usize) -> String {
        self.accept(&mut PrettyPrintVisitor).render(width)
    }
}

/// Pretty-prints the node. A width given in the format string, as in
/// `{node:40}`, sets the line width.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty_print_width(f.width().unwrap_or(DEFAULT_WIDTH)))
    }
}
