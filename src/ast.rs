pub mod node;
pub mod options;
pub mod quantifier;

pub use self::{
    node::{
        Alternation, Backref, Call, CharClass, Enclose, EncloseCondition, EncloseMemory,
        EncloseOptions, GroupRef, List, Literal, Node, NodeKind,
    },
    options::Options,
    quantifier::{Quantifier, UpperBound},
};

/// A capture group name and the numbers of every group defined with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedGroup {
    name: String,
    numbers: Vec<u32>,
}

impl NamedGroup {
    pub(crate) fn new(name: String, numbers: Vec<u32>) -> Self {
        Self { name, numbers }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group numbers in definition order. More than one number means the name
    /// is defined several times.
    #[must_use]
    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }
}

/// A parsed pattern: the root node together with its group table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstRoot {
    root: Node,
    capture_count: u32,
    names: Vec<NamedGroup>,
}

impl AstRoot {
    #[must_use]
    pub(crate) fn new(root: Node, capture_count: u32, names: Vec<(String, Vec<u32>)>) -> Self {
        Self {
            root,
            capture_count,
            names: names
                .into_iter()
                .map(|(name, numbers)| NamedGroup::new(name, numbers))
                .collect(),
        }
    }

    /// The number of `EncloseMemory` nodes in the tree.
    #[must_use]
    pub fn capture_count(&self) -> u32 {
        self.capture_count
    }

    /// Named groups in order of first definition.
    #[must_use]
    pub fn names(&self) -> &[NamedGroup] {
        &self.names
    }

    #[must_use]
    pub fn name(&self, name: &str) -> Option<&NamedGroup> {
        self.names.iter().find(|group| group.name == name)
    }

    #[must_use]
    pub fn into_node(self) -> Node {
        self.root
    }
}

impl std::ops::Deref for AstRoot {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.root
    }
}

impl PartialEq<Node> for AstRoot {
    fn eq(&self, other: &Node) -> bool {
        self.root == *other
    }
}
