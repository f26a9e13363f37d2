use crate::{
    ast::{Options, UpperBound},
    charset::CharSet,
};

/// A pattern token outside of a bracket expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A literal character, either written as is or escaped.
    Char(char),
    /// `.`
    Any,
    /// `^`
    Caret,
    /// `$`
    Dollar,
    /// `|`
    Alt,
    /// `(` together with whatever follows it up to the subexpression.
    Open(Group),
    /// `)`
    Close,
    /// `[`. The bracket contents are read with
    /// [`Lexer::next_class_token`](super::Lexer::next_class_token).
    OpenBracket,
    /// `*`, `+`, `?`, `{n,m}`, with any lazy or possessive suffix.
    Repeat(Repeat),
    /// `\A`, `\z`, `\Z`, `\b`, `\B`, `\G`, `\K`
    Anchor(Anchor),
    /// `\w`, or `\W` when inverted.
    Word { inverted: bool },
    /// `\d`, `\s`, `\h`, `\p{...}` and their inverted forms.
    Class { set: CharSet, inverted: bool },
    /// `\1`, `\k<name>`, `\k<-1>`
    Backref(Reference),
    /// `\g<name>`, `\g<1>`, `\g<-1>`, `\g<+1>`
    Call(Reference),
    /// `\R`
    Linebreak,
    /// `\X`
    GraphemeCluster,
}

/// The kind of group opened by `(`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Group {
    /// `(`
    Capture,
    /// `(?:`
    NonCapture,
    /// `(?<name>` or `(?'name'`
    Named(String),
    /// `(?=`
    LookAhead,
    /// `(?!`
    LookAheadInvert,
    /// `(?<=`
    LookBehind,
    /// `(?<!`
    LookBehindInvert,
    /// `(?>`
    Atomic,
    /// `(?~`
    Absent,
    /// `(?(1)`, `(?(<name>)`
    Condition(Reference),
    /// `(?imx-imx:` when `scoped`, otherwise `(?imx-imx)`.
    Options {
        on: Options,
        off: Options,
        scoped: bool,
    },
}

/// A group reference as written in a backref, call or condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Absolute(u32),
    /// `-1` is the closest preceding group, `+1` the next group to open.
    Relative(i32),
    Name(String),
}

/// A repetition operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Repeat {
    pub lower: u32,
    pub upper: UpperBound,
    pub greedy: bool,
    /// `*+`, `++`, `?+`
    pub possessive: bool,
}

/// A zero-width escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    BufferBegin,
    BufferEnd,
    SemiEnd,
    WordBoundary,
    WordBoundaryInvert,
    PositionBegin,
    Keep,
}

/// A token inside a bracket expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassToken {
    Char(char),
    /// An unescaped `-`.
    Hyphen,
    /// A class escape or POSIX bracket, already inverted if it was negated.
    Set(CharSet),
    /// A nested `[`.
    Open,
    /// `&&`
    And,
    /// `]`
    Close,
}

/// A token with associated position information.
#[derive(Clone, Debug, Eq)]
pub struct PosToken<T = Token> {
    /// The start byte offset of the token in the pattern string.
    pub pos: usize,
    /// The token.
    pub token: T,
}

impl<T> core::ops::Deref for PosToken<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl<T: PartialEq> PartialEq for PosToken<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}
