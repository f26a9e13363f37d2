use super::{Options, Quantifier};
use std::{fmt, slice};

/// A node of a parsed pattern.
///
/// The set of variants is closed. Trees are built by the parser, are never
/// mutated afterwards, and every internal node exclusively owns its children.
///
/// There is no abstract node to construct or dispatch on; every `Node` is one
/// of the concrete variants:
///
/// ```compile_fail
/// let node = onigtree::Node::new();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// `a|b|c`
    Alternation(Alternation),
    /// `\A`
    AnchorBufferBegin,
    /// `\z`
    AnchorBufferEnd,
    /// `\K`
    AnchorKeep,
    /// `^`
    AnchorLineBegin,
    /// `$`
    AnchorLineEnd,
    /// `\G`
    AnchorPositionBegin,
    /// `\Z`
    AnchorSemiEnd,
    /// `\b`
    AnchorWordBoundary,
    /// `\B`
    AnchorWordBoundaryInvert,
    /// `.`
    Any,
    /// `\1`, `\k<name>`
    Backref(Backref),
    /// `\g<name>`, `\g<1>`
    Call(Call),
    /// `[a-z]`
    CClass(CharClass),
    /// `[^a-z]`
    CClassInvert(CharClass),
    /// `(?~subexp)`
    EncloseAbsent(Enclose),
    /// `(?(cond)subexp)`
    EncloseCondition(EncloseCondition),
    /// `(subexp)`, `(?<name>subexp)`
    EncloseMemory(EncloseMemory),
    /// `(?i:subexp)`, `(?i)subexp`
    EncloseOptions(EncloseOptions),
    /// `(?>subexp)`
    EncloseStopBacktrack(Enclose),
    /// `a.b`
    List(List),
    /// `(?=subexp)`
    LookAhead(Enclose),
    /// `(?!subexp)`
    LookAheadInvert(Enclose),
    /// `(?<=subexp)`
    LookBehind(Enclose),
    /// `(?<!subexp)`
    LookBehindInvert(Enclose),
    /// `a*`, `a{1,2}`
    Quantifier(Quantifier),
    /// `abc`
    String(Literal),
    /// `\w`
    Word,
    /// `\W`
    WordInvert,
}

impl Node {
    /// Returns the variant of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Alternation(_) => NodeKind::Alternation,
            Node::AnchorBufferBegin => NodeKind::AnchorBufferBegin,
            Node::AnchorBufferEnd => NodeKind::AnchorBufferEnd,
            Node::AnchorKeep => NodeKind::AnchorKeep,
            Node::AnchorLineBegin => NodeKind::AnchorLineBegin,
            Node::AnchorLineEnd => NodeKind::AnchorLineEnd,
            Node::AnchorPositionBegin => NodeKind::AnchorPositionBegin,
            Node::AnchorSemiEnd => NodeKind::AnchorSemiEnd,
            Node::AnchorWordBoundary => NodeKind::AnchorWordBoundary,
            Node::AnchorWordBoundaryInvert => NodeKind::AnchorWordBoundaryInvert,
            Node::Any => NodeKind::Any,
            Node::Backref(_) => NodeKind::Backref,
            Node::Call(_) => NodeKind::Call,
            Node::CClass(_) => NodeKind::CClass,
            Node::CClassInvert(_) => NodeKind::CClassInvert,
            Node::EncloseAbsent(_) => NodeKind::EncloseAbsent,
            Node::EncloseCondition(_) => NodeKind::EncloseCondition,
            Node::EncloseMemory(_) => NodeKind::EncloseMemory,
            Node::EncloseOptions(_) => NodeKind::EncloseOptions,
            Node::EncloseStopBacktrack(_) => NodeKind::EncloseStopBacktrack,
            Node::List(_) => NodeKind::List,
            Node::LookAhead(_) => NodeKind::LookAhead,
            Node::LookAheadInvert(_) => NodeKind::LookAheadInvert,
            Node::LookBehind(_) => NodeKind::LookBehind,
            Node::LookBehindInvert(_) => NodeKind::LookBehindInvert,
            Node::Quantifier(_) => NodeKind::Quantifier,
            Node::String(_) => NodeKind::String,
            Node::Word => NodeKind::Word,
            Node::WordInvert => NodeKind::WordInvert,
        }
    }

    /// Returns the direct children of this node in source order.
    #[must_use]
    pub fn child_nodes(&self) -> &[Node] {
        match self {
            Node::Alternation(Alternation { nodes }) | Node::List(List { nodes }) => nodes,
            Node::EncloseAbsent(enclose)
            | Node::EncloseStopBacktrack(enclose)
            | Node::LookAhead(enclose)
            | Node::LookAheadInvert(enclose)
            | Node::LookBehind(enclose)
            | Node::LookBehindInvert(enclose) => slice::from_ref(enclose.node()),
            Node::EncloseCondition(condition) => slice::from_ref(condition.node()),
            Node::EncloseMemory(memory) => slice::from_ref(memory.node()),
            Node::EncloseOptions(options) => slice::from_ref(options.node()),
            Node::Quantifier(quantifier) => slice::from_ref(quantifier.node()),
            Node::AnchorBufferBegin
            | Node::AnchorBufferEnd
            | Node::AnchorKeep
            | Node::AnchorLineBegin
            | Node::AnchorLineEnd
            | Node::AnchorPositionBegin
            | Node::AnchorSemiEnd
            | Node::AnchorWordBoundary
            | Node::AnchorWordBoundaryInvert
            | Node::Any
            | Node::Backref(_)
            | Node::Call(_)
            | Node::CClass(_)
            | Node::CClassInvert(_)
            | Node::String(_)
            | Node::Word
            | Node::WordInvert => &[],
        }
    }

    /// Returns `true` if this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.child_nodes().is_empty()
    }

    pub(crate) fn empty() -> Self {
        Node::String(Literal::new(String::new()))
    }

    pub(crate) fn enclose(node: Node) -> Enclose {
        Enclose {
            node: Box::new(node),
        }
    }
}

/// The variant of a [`Node`], without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Alternation,
    AnchorBufferBegin,
    AnchorBufferEnd,
    AnchorKeep,
    AnchorLineBegin,
    AnchorLineEnd,
    AnchorPositionBegin,
    AnchorSemiEnd,
    AnchorWordBoundary,
    AnchorWordBoundaryInvert,
    Any,
    Backref,
    Call,
    CClass,
    CClassInvert,
    EncloseAbsent,
    EncloseCondition,
    EncloseMemory,
    EncloseOptions,
    EncloseStopBacktrack,
    List,
    LookAhead,
    LookAheadInvert,
    LookBehind,
    LookBehindInvert,
    Quantifier,
    String,
    Word,
    WordInvert,
}

impl NodeKind {
    /// Every variant, in declaration order.
    pub const ALL: [NodeKind; 29] = [
        NodeKind::Alternation,
        NodeKind::AnchorBufferBegin,
        NodeKind::AnchorBufferEnd,
        NodeKind::AnchorKeep,
        NodeKind::AnchorLineBegin,
        NodeKind::AnchorLineEnd,
        NodeKind::AnchorPositionBegin,
        NodeKind::AnchorSemiEnd,
        NodeKind::AnchorWordBoundary,
        NodeKind::AnchorWordBoundaryInvert,
        NodeKind::Any,
        NodeKind::Backref,
        NodeKind::Call,
        NodeKind::CClass,
        NodeKind::CClassInvert,
        NodeKind::EncloseAbsent,
        NodeKind::EncloseCondition,
        NodeKind::EncloseMemory,
        NodeKind::EncloseOptions,
        NodeKind::EncloseStopBacktrack,
        NodeKind::List,
        NodeKind::LookAhead,
        NodeKind::LookAheadInvert,
        NodeKind::LookBehind,
        NodeKind::LookBehindInvert,
        NodeKind::Quantifier,
        NodeKind::String,
        NodeKind::Word,
        NodeKind::WordInvert,
    ];

    /// The camelCase name used as the JSON `type` tag and by the pretty
    /// printer.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            NodeKind::Alternation => "alternation",
            NodeKind::AnchorBufferBegin => "anchorBufferBegin",
            NodeKind::AnchorBufferEnd => "anchorBufferEnd",
            NodeKind::AnchorKeep => "anchorKeep",
            NodeKind::AnchorLineBegin => "anchorLineBegin",
            NodeKind::AnchorLineEnd => "anchorLineEnd",
            NodeKind::AnchorPositionBegin => "anchorPositionBegin",
            NodeKind::AnchorSemiEnd => "anchorSemiEnd",
            NodeKind::AnchorWordBoundary => "anchorWordBoundary",
            NodeKind::AnchorWordBoundaryInvert => "anchorWordBoundaryInvert",
            NodeKind::Any => "any",
            NodeKind::Backref => "backref",
            NodeKind::Call => "call",
            NodeKind::CClass => "cclass",
            NodeKind::CClassInvert => "cclassInvert",
            NodeKind::EncloseAbsent => "encloseAbsent",
            NodeKind::EncloseCondition => "encloseCondition",
            NodeKind::EncloseMemory => "encloseMemory",
            NodeKind::EncloseOptions => "encloseOptions",
            NodeKind::EncloseStopBacktrack => "encloseStopBacktrack",
            NodeKind::List => "list",
            NodeKind::LookAhead => "lookAhead",
            NodeKind::LookAheadInvert => "lookAheadInvert",
            NodeKind::LookBehind => "lookBehind",
            NodeKind::LookBehindInvert => "lookBehindInvert",
            NodeKind::Quantifier => "quantifier",
            NodeKind::String => "string",
            NodeKind::Word => "word",
            NodeKind::WordInvert => "wordInvert",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A reference to a capture group, by number or by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupRef {
    Number(u32),
    Name(String),
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupRef::Number(n) => write!(f, "{n}"),
            GroupRef::Name(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Alternation {
    nodes: Vec<Node>,
}

impl Alternation {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        debug_assert!(nodes.len() >= 2);
        Self { nodes }
    }

    /// The alternatives, left to right.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct List {
    nodes: Vec<Node>,
}

impl List {
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        debug_assert!(nodes.len() >= 2);
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Backref {
    values: Vec<GroupRef>,
}

impl Backref {
    pub(crate) fn new(values: Vec<GroupRef>) -> Self {
        Self { values }
    }

    /// The referenced groups, in the order written.
    #[must_use]
    pub fn values(&self) -> &[GroupRef] {
        &self.values
    }
}

/// A subexpression call. Exactly one of `number` and `name` is present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Call {
    number: Option<u32>,
    name: Option<String>,
}

impl Call {
    pub(crate) fn by_number(number: u32) -> Self {
        Self {
            number: Some(number),
            name: None,
        }
    }

    pub(crate) fn by_name(name: String) -> Self {
        Self {
            number: None,
            name: Some(name),
        }
    }

    /// The called group number. `\g<0>` calls the whole pattern.
    #[must_use]
    pub fn number(&self) -> Option<u32> {
        self.number
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// The codepoint ranges of a bracket expression or a class escape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharClass {
    ranges: Vec<(u32, u32)>,
}

impl CharClass {
    pub(crate) fn new(ranges: Vec<(u32, u32)>) -> Self {
        debug_assert!(ranges.iter().all(|(low, high)| low <= high));
        Self { ranges }
    }

    /// Inclusive `(low, high)` codepoint pairs. For [`Node::CClassInvert`]
    /// these are the ranges before inversion.
    #[must_use]
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }
}

/// A group whose only data is its subexpression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Enclose {
    node: Box<Node>,
}

impl Enclose {
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncloseCondition {
    number: GroupRef,
    node: Box<Node>,
}

impl EncloseCondition {
    pub(crate) fn new(number: GroupRef, node: Node) -> Self {
        Self {
            number,
            node: Box::new(node),
        }
    }

    /// The group whose match decides the branch.
    #[must_use]
    pub fn number(&self) -> &GroupRef {
        &self.number
    }

    /// Either the single branch or an [`Alternation`] of the yes and no
    /// branches.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncloseMemory {
    number: u32,
    node: Box<Node>,
}

impl EncloseMemory {
    pub(crate) fn new(number: u32, node: Node) -> Self {
        debug_assert!(number > 0);
        Self {
            number,
            node: Box::new(node),
        }
    }

    /// The group number, unique within the tree and counted from 1.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncloseOptions {
    options: Options,
    node: Box<Node>,
}

impl EncloseOptions {
    pub(crate) fn new(options: Options, node: Node) -> Self {
        Self {
            options,
            node: Box::new(node),
        }
    }

    /// The options in effect inside the group.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }
}

/// Literal text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    value: String,
}

impl Literal {
    pub(crate) fn new(value: String) -> Self {
        Self { value }
    }

    /// The text, possibly empty for an empty subexpression.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}
