//! Double dispatch over [`Node`] variants.

use crate::ast::{
    Alternation, Backref, Call, CharClass, Enclose, EncloseCondition, EncloseMemory,
    EncloseOptions, List, Literal, Node, Quantifier,
};

mod deconstruct;
mod json;
mod pretty;

pub use self::{
    deconstruct::{DeconstructVisitor, Fields, Value},
    json::JsonVisitor,
    pretty::PrettyPrintVisitor,
};

/// An operation over every node variant.
///
/// Each method defaults to [`Visitor::visit_child_nodes`], so a visitor only
/// overrides the variants it cares about. Overrides that still want to
/// descend call `visit_child_nodes` themselves.
///
/// ```
/// use onigtree::{Visitor, ast::Literal};
///
/// #[derive(Default)]
/// struct Strings(Vec<String>);
///
/// impl Visitor for Strings {
///     type Output = ();
///
///     fn visit_string(&mut self, node: &Literal) {
///         self.0.push(node.value().to_owned());
///     }
/// }
///
/// let mut strings = Strings::default();
/// onigtree::parse("ab*(c|d)")?.accept(&mut strings);
/// assert_eq!(strings.0, ["a", "b", "c", "d"]);
/// # Ok::<(), onigtree::Error>(())
/// ```
pub trait Visitor {
    type Output: Default;

    /// Visits `nodes` left to right and discards their results.
    fn visit_child_nodes(&mut self, nodes: &[Node]) -> Self::Output {
        for node in nodes {
            node.accept(self);
        }
        Self::Output::default()
    }

    fn visit_alternation(&mut self, node: &Alternation) -> Self::Output {
        self.visit_child_nodes(node.nodes())
    }

    fn visit_anchor_buffer_begin(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_buffer_end(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_keep(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_line_begin(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_line_end(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_position_begin(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_semi_end(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_word_boundary(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_anchor_word_boundary_invert(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_any(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_backref(&mut self, _node: &Backref) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_call(&mut self, _node: &Call) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_cclass(&mut self, _node: &CharClass) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_cclass_invert(&mut self, _node: &CharClass) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_enclose_absent(&mut self, node: &Enclose) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_enclose_condition(&mut self, node: &EncloseCondition) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_enclose_memory(&mut self, node: &EncloseMemory) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_enclose_options(&mut self, node: &EncloseOptions) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_enclose_stop_backtrack(&mut self, node: &Enclose) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_list(&mut self, node: &List) -> Self::Output {
        self.visit_child_nodes(node.nodes())
    }

    fn visit_look_ahead(&mut self, node: &Enclose) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_look_ahead_invert(&mut self, node: &Enclose) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_look_behind(&mut self, node: &Enclose) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_look_behind_invert(&mut self, node: &Enclose) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_quantifier(&mut self, node: &Quantifier) -> Self::Output {
        self.visit_child_nodes(std::slice::from_ref(node.node()))
    }

    fn visit_string(&mut self, _node: &Literal) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_word(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }

    fn visit_word_invert(&mut self) -> Self::Output {
        self.visit_child_nodes(&[])
    }
}

impl Node {
    /// Calls the method of `visitor` for this node's variant.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Node::Alternation(node) => visitor.visit_alternation(node),
            Node::AnchorBufferBegin => visitor.visit_anchor_buffer_begin(),
            Node::AnchorBufferEnd => visitor.visit_anchor_buffer_end(),
            Node::AnchorKeep => visitor.visit_anchor_keep(),
            Node::AnchorLineBegin => visitor.visit_anchor_line_begin(),
            Node::AnchorLineEnd => visitor.visit_anchor_line_end(),
            Node::AnchorPositionBegin => visitor.visit_anchor_position_begin(),
            Node::AnchorSemiEnd => visitor.visit_anchor_semi_end(),
            Node::AnchorWordBoundary => visitor.visit_anchor_word_boundary(),
            Node::AnchorWordBoundaryInvert => visitor.visit_anchor_word_boundary_invert(),
            Node::Any => visitor.visit_any(),
            Node::Backref(node) => visitor.visit_backref(node),
            Node::Call(node) => visitor.visit_call(node),
            Node::CClass(node) => visitor.visit_cclass(node),
            Node::CClassInvert(node) => visitor.visit_cclass_invert(node),
            Node::EncloseAbsent(node) => visitor.visit_enclose_absent(node),
            Node::EncloseCondition(node) => visitor.visit_enclose_condition(node),
            Node::EncloseMemory(node) => visitor.visit_enclose_memory(node),
            Node::EncloseOptions(node) => visitor.visit_enclose_options(node),
            Node::EncloseStopBacktrack(node) => visitor.visit_enclose_stop_backtrack(node),
            Node::List(node) => visitor.visit_list(node),
            Node::LookAhead(node) => visitor.visit_look_ahead(node),
            Node::LookAheadInvert(node) => visitor.visit_look_ahead_invert(node),
            Node::LookBehind(node) => visitor.visit_look_behind(node),
            Node::LookBehindInvert(node) => visitor.visit_look_behind_invert(node),
            Node::Quantifier(node) => visitor.visit_quantifier(node),
            Node::String(node) => visitor.visit_string(node),
            Node::Word => visitor.visit_word(),
            Node::WordInvert => visitor.visit_word_invert(),
        }
    }
}
