//! Compilation of parsed patterns: the reference and shape checks Onigmo runs
//! after parsing, and lowering to an instruction listing.

use super::{
    Result,
    ast::{AstRoot, NamedGroup, Options},
    parser::parse_tree,
};
use tracing::{debug, trace};

mod check;
mod lower;
mod program;

pub use program::{Insn, Program};

/// A checked and compiled pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    tree: AstRoot,
    capture_count: u32,
    names: Vec<NamedGroup>,
    program: Program,
}

impl Regex {
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The parsed tree, with groups numbered as written.
    #[must_use]
    pub fn tree(&self) -> &AstRoot {
        &self.tree
    }

    /// The number of capturing groups. When the pattern has named groups only
    /// those capture.
    #[must_use]
    pub fn capture_count(&self) -> u32 {
        self.capture_count
    }

    /// Named groups with their capture numbers.
    #[must_use]
    pub fn names(&self) -> &[NamedGroup] {
        &self.names
    }

    #[must_use]
    pub fn program(&self) -> &Program {
        &self.program
    }
}

/// Parses and compiles a pattern.
///
/// ```
/// let regex = onigtree::compile("ab*")?;
/// assert_eq!(
///     regex.program().names().collect::<Vec<_>>(),
///     ["exact1", "push", "exact1", "jump", "end"]
/// );
/// assert!(onigtree::compile("(?<>)").is_err());
/// # Ok::<(), onigtree::Error>(())
/// ```
///
/// # Errors
///
/// Returns [`Error::Syntax`](crate::Error::Syntax) for anything [`parse`]
/// rejects, [`Error::Compile`](crate::Error::Compile) for invalid references
/// and look-behinds, and [`Error::EngineLimit`](crate::Error::EngineLimit)
/// for too many groups.
///
/// [`parse`]: crate::parse
pub fn compile(pattern: &str) -> Result<Regex> {
    compile_with_options(pattern, Options::NONE)
}

pub fn compile_with_options(pattern: &str, options: Options) -> Result<Regex> {
    debug!(pattern, ?options, "compiling pattern");
    let result = compile_tree(pattern, options);
    match &result {
        Ok(regex) => trace!(pattern, insns = regex.program.len(), "compiled"),
        Err(err) => debug!(pattern, %err, "compile failed"),
    }
    result
}

fn compile_tree(pattern: &str, options: Options) -> Result<Regex> {
    let tree = parse_tree(pattern, options)?;
    let groups = check::check(&tree)?;
    let program = lower::lower(&tree, &groups, options)?;

    Ok(Regex {
        pattern: pattern.to_owned(),
        capture_count: groups.capture_count(),
        names: groups.names().to_vec(),
        tree,
        program,
    })
}
