use super::{
    Visitor,
    deconstruct::{self, Fields, Value},
};
use crate::ast::{
    Alternation, Backref, Call, CharClass, Enclose, EncloseCondition, EncloseMemory,
    EncloseOptions, List, Literal, Node, NodeKind, Quantifier,
};
use serde::{Serialize, Serializer};

/// Deconstructs nodes like [`DeconstructVisitor`](super::DeconstructVisitor)
/// and adds a leading `type` field with the variant's tag to every map.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonVisitor;

fn tagged(kind: NodeKind, mut fields: Fields) -> Fields {
    fields.prepend("type", Value::Str(kind.tag().to_owned()));
    fields
}

impl Visitor for JsonVisitor {
    type Output = Fields;

    fn visit_alternation(&mut self, node: &Alternation) -> Fields {
        tagged(NodeKind::Alternation, deconstruct::nodes(self, node.nodes()))
    }

    fn visit_anchor_buffer_begin(&mut self) -> Fields {
        tagged(NodeKind::AnchorBufferBegin, Fields::new())
    }

    fn visit_anchor_buffer_end(&mut self) -> Fields {
        tagged(NodeKind::AnchorBufferEnd, Fields::new())
    }

    fn visit_anchor_keep(&mut self) -> Fields {
        tagged(NodeKind::AnchorKeep, Fields::new())
    }

    fn visit_anchor_line_begin(&mut self) -> Fields {
        tagged(NodeKind::AnchorLineBegin, Fields::new())
    }

    fn visit_anchor_line_end(&mut self) -> Fields {
        tagged(NodeKind::AnchorLineEnd, Fields::new())
    }

    fn visit_anchor_position_begin(&mut self) -> Fields {
        tagged(NodeKind::AnchorPositionBegin, Fields::new())
    }

    fn visit_anchor_semi_end(&mut self) -> Fields {
        tagged(NodeKind::AnchorSemiEnd, Fields::new())
    }

    fn visit_anchor_word_boundary(&mut self) -> Fields {
        tagged(NodeKind::AnchorWordBoundary, Fields::new())
    }

    fn visit_anchor_word_boundary_invert(&mut self) -> Fields {
        tagged(NodeKind::AnchorWordBoundaryInvert, Fields::new())
    }

    fn visit_any(&mut self) -> Fields {
        tagged(NodeKind::Any, Fields::new())
    }

    fn visit_backref(&mut self, node: &Backref) -> Fields {
        tagged(NodeKind::Backref, deconstruct::backref(node))
    }

    fn visit_call(&mut self, node: &Call) -> Fields {
        tagged(NodeKind::Call, deconstruct::call(node))
    }

    fn visit_cclass(&mut self, node: &CharClass) -> Fields {
        tagged(NodeKind::CClass, deconstruct::cclass(node))
    }

    fn visit_cclass_invert(&mut self, node: &CharClass) -> Fields {
        tagged(NodeKind::CClassInvert, deconstruct::cclass(node))
    }

    fn visit_enclose_absent(&mut self, node: &Enclose) -> Fields {
        tagged(NodeKind::EncloseAbsent, deconstruct::enclosed(self, node.node()))
    }

    fn visit_enclose_condition(&mut self, node: &EncloseCondition) -> Fields {
        tagged(
            NodeKind::EncloseCondition,
            deconstruct::enclose_condition(self, node),
        )
    }

    fn visit_enclose_memory(&mut self, node: &EncloseMemory) -> Fields {
        tagged(NodeKind::EncloseMemory, deconstruct::enclose_memory(self, node))
    }

    fn visit_enclose_options(&mut self, node: &EncloseOptions) -> Fields {
        tagged(
            NodeKind::EncloseOptions,
            deconstruct::enclose_options(self, node),
        )
    }

    fn visit_enclose_stop_backtrack(&mut self, node: &Enclose) -> Fields {
        tagged(
            NodeKind::EncloseStopBacktrack,
            deconstruct::enclosed(self, node.node()),
        )
    }

    fn visit_list(&mut self, node: &List) -> Fields {
        tagged(NodeKind::List, deconstruct::nodes(self, node.nodes()))
    }

    fn visit_look_ahead(&mut self, node: &Enclose) -> Fields {
        tagged(NodeKind::LookAhead, deconstruct::enclosed(self, node.node()))
    }

    fn visit_look_ahead_invert(&mut self, node: &Enclose) -> Fields {
        tagged(
            NodeKind::LookAheadInvert,
            deconstruct::enclosed(self, node.node()),
        )
    }

    fn visit_look_behind(&mut self, node: &Enclose) -> Fields {
        tagged(NodeKind::LookBehind, deconstruct::enclosed(self, node.node()))
    }

    fn visit_look_behind_invert(&mut self, node: &Enclose) -> Fields {
        tagged(
            NodeKind::LookBehindInvert,
            deconstruct::enclosed(self, node.node()),
        )
    }

    fn visit_quantifier(&mut self, node: &Quantifier) -> Fields {
        tagged(NodeKind::Quantifier, deconstruct::quantifier(self, node))
    }

    fn visit_string(&mut self, node: &Literal) -> Fields {
        tagged(NodeKind::String, deconstruct::string(node))
    }

    fn visit_word(&mut self) -> Fields {
        tagged(NodeKind::Word, Fields::new())
    }

    fn visit_word_invert(&mut self) -> Fields {
        tagged(NodeKind::WordInvert, Fields::new())
    }
}

impl Node {
    /// Returns the JSON form of this node: its deconstruction with a `type`
    /// tag in every object.
    #[must_use]
    pub fn as_json(&self) -> serde_json::Value {
        Value::Map(self.accept(&mut JsonVisitor)).into()
    }

    /// Serializes the JSON form of this node to a compact string.
    #[must_use]
    pub fn to_json(&self) -> String {
        self.as_json().to_string()
    }
}

/// Nodes serialize as their JSON form.
impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.accept(&mut JsonVisitor).serialize(serializer)
    }
}
