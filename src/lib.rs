//! Syntax trees for Onigmo (Ruby) regular expressions, with visitors that
//! deconstruct them into plain data, serialize them as JSON and pretty-print
//! them.
//!
//! ```
//! let node = onigtree::parse("a|b")?;
//! assert_eq!(node.pretty_print(), r#"alternation(string("a"), string("b"))"#);
//! assert_eq!(
//!     node.to_json(),
//!     r#"{"type":"alternation","nodes":[{"type":"string","value":"a"},{"type":"string","value":"b"}]}"#
//! );
//! # Ok::<(), onigtree::Error>(())
//! ```

#![warn(clippy::pedantic, rust_2018_idioms)]
#![allow(clippy::missing_errors_doc, clippy::too_many_lines)]

pub mod ast;
pub mod charset;
pub mod compile;
pub mod lexer;
pub mod parser;
pub mod pretty;
pub mod visit;

pub use self::{
    ast::{AstRoot, GroupRef, Node, NodeKind, Options, UpperBound},
    charset::CharSet,
    compile::{Insn, Program, Regex, compile, compile_with_options},
    lexer::{Lexer, Token},
    parser::{parse, parse_tree, parse_with_options},
    visit::{
        DeconstructVisitor, Fields, JsonVisitor, PrettyPrintVisitor, Value, Visitor,
    },
};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The pattern text is not a well-formed regular expression.
    #[error("{kind} at {pos}")]
    Syntax { pos: usize, kind: SyntaxError },

    /// The pattern parsed, but the compiler rejects what it refers to or how
    /// it nests.
    #[error("{0}")]
    Compile(SyntaxError),

    /// The pattern is valid but exceeds what the engine supports.
    #[error(transparent)]
    EngineLimit(#[from] EngineLimit),
}

impl Error {
    /// The reason a pattern was rejected as malformed, whether by the parser
    /// or by the compiler.
    #[must_use]
    pub fn syntax_error(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax { kind, .. } | Error::Compile(kind) => Some(kind),
            Error::EngineLimit(_) => None,
        }
    }

    #[must_use]
    pub fn is_syntax_error(&self) -> bool {
        self.syntax_error().is_some()
    }

    /// The byte offset in the pattern, for errors found while parsing.
    #[must_use]
    pub fn pos(&self) -> Option<usize> {
        match self {
            Error::Syntax { pos, .. } => Some(*pos),
            Error::Compile(_) | Error::EngineLimit(_) => None,
        }
    }
}

/// Reasons a pattern is malformed. Messages are Onigmo's.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("end pattern at escape")]
    EndPatternAtEscape,
    #[error("end pattern at control")]
    EndPatternAtControl,
    #[error("end pattern at meta")]
    EndPatternAtMeta,
    #[error("invalid control-code syntax")]
    InvalidControlCode,
    #[error("invalid meta-code syntax")]
    InvalidMetaCode,
    #[error("end pattern in group")]
    EndPatternInGroup,
    #[error("end pattern with unmatched parenthesis")]
    UnmatchedParenthesis,
    #[error("unmatched close parenthesis")]
    UnmatchedCloseParenthesis,
    #[error("premature end of char-class")]
    PrematureEndOfCharClass,
    #[error("empty char-class")]
    EmptyCharClass,
    #[error("empty range in char class")]
    EmptyRangeInCharClass,
    #[error("char-class value at end of range")]
    CharClassValueAtEndOfRange,
    #[error("char-class value at start of range")]
    CharClassValueAtStartOfRange,
    #[error("invalid POSIX bracket type")]
    InvalidPosixBracketType,
    #[error("target of repeat operator is not specified")]
    TargetOfRepeatNotSpecified,
    #[error("target of repeat operator is invalid")]
    TargetOfRepeatInvalid,
    #[error("too big number for repeat range")]
    TooBigRepeatRange,
    #[error("upper is smaller than lower in repeat range")]
    UpperSmallerThanLower,
    #[error("group name is empty")]
    EmptyGroupName,
    #[error("invalid group name <{0}>")]
    InvalidGroupName(String),
    #[error("undefined group option")]
    UndefinedGroupOption,
    #[error("invalid conditional pattern")]
    InvalidConditionPattern,
    #[error("invalid backref number/name")]
    InvalidBackref,
    #[error("invalid character property name {{{0}}}")]
    InvalidCharPropertyName(String),
    #[error("invalid hex escape")]
    InvalidHexEscape,
    #[error("invalid Unicode escape")]
    InvalidUnicodeEscape,
    #[error("invalid code point value")]
    InvalidCodePoint,
    #[error("undefined name <{0}> reference")]
    UndefinedNameReference(String),
    #[error("undefined group <{0}> reference")]
    UndefinedGroupReference(u32),
    #[error("multiplex definition name <{0}> call")]
    MultiplexDefinitionNameCall(String),
    #[error("numbered backref/call is not allowed. (use name)")]
    NumberedReferenceNotAllowed,
    #[error("invalid pattern in look-behind")]
    InvalidLookBehind,
}

/// Limits of the compiled representation.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EngineLimit {
    #[error("too many capture groups are specified ({0} > {MAX_CAPTURE_GROUPS})")]
    CaptureGroups(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The largest number of capture groups a compiled pattern may have.
pub const MAX_CAPTURE_GROUPS: u32 = 32_767;
