use super::Node;

/// The upper bound of a repetition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpperBound {
    /// `a{,3}`, `a?`
    Finite(u32),
    /// `a*`, `a+`, `a{2,}`
    Infinite,
}

impl UpperBound {
    /// The external encoding of an unbounded upper bound.
    pub const INFINITE_SENTINEL: i64 = -1;

    /// Returns the bound as an integer, [`Self::INFINITE_SENTINEL`] when
    /// unbounded.
    #[must_use]
    pub fn to_i64(self) -> i64 {
        match self {
            UpperBound::Finite(n) => i64::from(n),
            UpperBound::Infinite => Self::INFINITE_SENTINEL,
        }
    }

    #[must_use]
    pub const fn finite(self) -> Option<u32> {
        match self {
            UpperBound::Finite(n) => Some(n),
            UpperBound::Infinite => None,
        }
    }

    #[must_use]
    pub const fn is_infinite(self) -> bool {
        matches!(self, UpperBound::Infinite)
    }
}

/// A repeated subexpression: `a*`, `a+?`, `a{1,2}`.
///
/// `lower <= upper` holds whenever the upper bound is finite.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quantifier {
    lower: u32,
    upper: UpperBound,
    greedy: bool,
    node: Box<Node>,
}

impl Quantifier {
    pub(crate) fn new(lower: u32, upper: UpperBound, greedy: bool, node: Node) -> Self {
        debug_assert!(upper.finite().is_none_or(|upper| lower <= upper));
        Self {
            lower,
            upper,
            greedy,
            node: Box::new(node),
        }
    }

    #[must_use]
    pub fn lower(&self) -> u32 {
        self.lower
    }

    #[must_use]
    pub fn upper(&self) -> UpperBound {
        self.upper
    }

    /// Returns `false` for lazy quantifiers (`a*?`).
    #[must_use]
    pub fn greedy(&self) -> bool {
        self.greedy
    }

    /// The repeated subexpression.
    #[must_use]
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// `?` and `??`
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.lower == 0 && self.upper == UpperBound::Finite(1)
    }
}
