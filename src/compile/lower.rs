//! Lowering of a checked tree to instructions.

use super::{
    check::{Groups, check_look_behind, fixed_length},
    program::{Insn, Program},
};
use crate::{
    Error, Result, SyntaxError,
    ast::{
        Alternation, CharClass, EncloseCondition, EncloseMemory, Node, Options, Quantifier,
        UpperBound,
    },
    charset::CharSet,
};
use std::collections::HashMap;

/// The longest finite repetition of a single-instruction body that is written
/// out instead of using a repeat counter.
const EXPAND_LIMIT: u32 = 3;

pub(crate) fn lower(root: &Node, groups: &Groups, options: Options) -> Result<Program> {
    let mut lowering = Lowering {
        groups,
        options,
        insns: Vec::new(),
        repeats: 0,
        null_checks: 0,
        entries: HashMap::new(),
        calls: Vec::new(),
    };

    if groups.is_called(0) {
        lowering.subroutine(0, |lowering| lowering.node(root))?;
    } else {
        lowering.node(root)?;
    }
    lowering.emit(Insn::End);

    for (at, group) in std::mem::take(&mut lowering.calls) {
        let entry = *lowering
            .entries
            .get(&group)
            .ok_or(Error::Compile(SyntaxError::UndefinedGroupReference(group)))?;
        let patched = lowering.insns[at].set_target(entry);
        debug_assert!(patched, "call at {at} has no target");
    }

    Ok(Program::new(lowering.insns))
}

struct Lowering<'a> {
    groups: &'a Groups,
    options: Options,
    insns: Vec<Insn>,
    repeats: usize,
    null_checks: usize,
    /// Subroutine entry addresses by parsed group number.
    entries: HashMap<u32, usize>,
    /// Call instructions waiting for their target, by parsed group number.
    calls: Vec<(usize, u32)>,
}

impl Lowering<'_> {
    fn emit(&mut self, insn: Insn) -> usize {
        self.insns.push(insn);
        self.insns.len() - 1
    }

    fn here(&self) -> usize {
        self.insns.len()
    }

    /// Points the instruction at `at` to the next address.
    fn patch_here(&mut self, at: usize) {
        let here = self.here();
        let patched = self.insns[at].set_target(here);
        debug_assert!(patched, "{} has no target", self.insns[at].name());
    }

    fn ignorecase(&self) -> bool {
        self.options.contains(Options::IGNORECASE)
    }

    fn node(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Alternation(alternation) => self.alternation(alternation.nodes(), Self::node)?,
            Node::List(list) => {
                for node in list.nodes() {
                    self.node(node)?;
                }
            }
            Node::String(literal) => {
                let value = literal.value();
                if !value.is_empty() {
                    self.emit(if self.ignorecase() {
                        Insn::ExactIc(value.to_owned())
                    } else {
                        Insn::Exact(value.to_owned())
                    });
                }
            }
            Node::CClass(class) => {
                let ranges = self.class_ranges(class);
                self.emit(Insn::CClass(ranges));
            }
            Node::CClassInvert(class) => {
                let ranges = self.class_ranges(class);
                self.emit(Insn::CClassNot(ranges));
            }
            Node::Any => {
                self.emit(if self.options.contains(Options::MULTILINE) {
                    Insn::AnyCharMl
                } else {
                    Insn::AnyChar
                });
            }
            Node::Word => {
                self.emit(Insn::Word);
            }
            Node::WordInvert => {
                self.emit(Insn::NotWord);
            }
            Node::AnchorBufferBegin => {
                self.emit(Insn::BeginBuf);
            }
            Node::AnchorBufferEnd => {
                self.emit(Insn::EndBuf);
            }
            Node::AnchorSemiEnd => {
                self.emit(Insn::SemiEndBuf);
            }
            Node::AnchorLineBegin => {
                self.emit(Insn::BeginLine);
            }
            Node::AnchorLineEnd => {
                self.emit(Insn::EndLine);
            }
            Node::AnchorPositionBegin => {
                self.emit(Insn::BeginPosition);
            }
            Node::AnchorWordBoundary => {
                self.emit(Insn::WordBound);
            }
            Node::AnchorWordBoundaryInvert => {
                self.emit(Insn::NotWordBound);
            }
            Node::AnchorKeep => {
                self.emit(Insn::Keep);
            }
            Node::Backref(backref) => {
                let numbers: Vec<u32> = backref
                    .values()
                    .iter()
                    .flat_map(|target| self.groups.resolve(target))
                    .collect();
                let insn = match (numbers.as_slice(), self.ignorecase()) {
                    ([], _) => Insn::Fail,
                    ([number], false) => Insn::Backref(*number),
                    ([number], true) => Insn::BackrefIc(*number),
                    (_, false) => Insn::BackrefMulti(numbers),
                    (_, true) => Insn::BackrefMultiIc(numbers),
                };
                self.emit(insn);
            }
            Node::Call(call) => {
                let group = self.groups.call_target(call);
                let at = self.emit(Insn::Call(0));
                self.calls.push((at, group));
            }
            Node::EncloseMemory(memory) => self.memory(memory)?,
            Node::EncloseOptions(options) => {
                let outer = self.options;
                self.options = options.options();
                let result = self.node(options.node());
                self.options = outer;
                result?;
            }
            Node::EncloseStopBacktrack(enclose) => {
                self.emit(Insn::PushStopBt);
                self.node(enclose.node())?;
                self.emit(Insn::PopStopBt);
            }
            Node::EncloseAbsent(enclose) => {
                self.emit(Insn::PushAbsentPos);
                let absent = self.emit(Insn::Absent(0));
                self.node(enclose.node())?;
                self.emit(Insn::AbsentEnd);
                self.patch_here(absent);
            }
            Node::EncloseCondition(condition) => self.condition(condition)?,
            Node::LookAhead(enclose) => {
                self.emit(Insn::PushPos);
                self.node(enclose.node())?;
                self.emit(Insn::PopPos);
            }
            Node::LookAheadInvert(enclose) => {
                let push = self.emit(Insn::PushPosNot(0));
                self.node(enclose.node())?;
                self.emit(Insn::FailPos);
                self.patch_here(push);
            }
            Node::LookBehind(enclose) => self.look_behind(enclose.node(), false)?,
            Node::LookBehindInvert(enclose) => self.look_behind(enclose.node(), true)?,
            Node::Quantifier(quantifier) => self.quantifier(quantifier)?,
        }
        Ok(())
    }

    fn class_ranges(&self, class: &CharClass) -> Vec<(u32, u32)> {
        if !self.ignorecase() {
            return class.ranges().to_vec();
        }
        let mut set = CharSet::new();
        for &(low, high) in class.ranges() {
            set.add_range(low, high).ok();
        }
        set.fold_ascii_case();
        set.into_ranges()
    }

    /// `push next; branch; jump end; next: ...`, with the last branch falling
    /// through.
    fn alternation(
        &mut self,
        branches: &[Node],
        mut branch: impl FnMut(&mut Self, &Node) -> Result<()>,
    ) -> Result<()> {
        let Some((last, rest)) = branches.split_last() else {
            return Ok(());
        };

        let mut exits = Vec::with_capacity(rest.len());
        for node in rest {
            let push = self.emit(Insn::Push(0));
            branch(self, node)?;
            exits.push(self.emit(Insn::Jump(0)));
            self.patch_here(push);
        }
        branch(self, last)?;
        for exit in exits {
            self.patch_here(exit);
        }
        Ok(())
    }

    /// Emits `call entry; jump end; entry: body; return; end:`.
    fn subroutine(
        &mut self,
        group: u32,
        body: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        let call = self.emit(Insn::Call(0));
        let jump = self.emit(Insn::Jump(0));
        self.patch_here(call);
        self.entries.insert(group, self.here());
        body(self)?;
        self.emit(Insn::Return);
        self.patch_here(jump);
        Ok(())
    }

    fn memory(&mut self, memory: &EncloseMemory) -> Result<()> {
        let parsed = memory.number();
        let Some(number) = self.groups.capture(parsed) else {
            return self.node(memory.node());
        };

        if self.groups.is_called(parsed) {
            return self.subroutine(parsed, |lowering| {
                lowering.emit(Insn::MemoryStartPush(number));
                lowering.node(memory.node())?;
                lowering.emit(Insn::MemoryEndPush(number));
                Ok(())
            });
        }

        if self.groups.is_referenced(parsed) {
            self.emit(Insn::MemoryStartPush(number));
            self.node(memory.node())?;
            self.emit(Insn::MemoryEndPush(number));
        } else {
            self.emit(Insn::MemoryStart(number));
            self.node(memory.node())?;
            self.emit(Insn::MemoryEnd(number));
        }
        Ok(())
    }

    /// `condition group, no; yes; jump end; no: no; end:`
    fn condition(&mut self, condition: &EncloseCondition) -> Result<()> {
        let group = self
            .groups
            .resolve(condition.number())
            .first()
            .copied()
            .unwrap_or(0);
        let (yes, no) = match condition.node() {
            Node::Alternation(branches) => match branches.nodes() {
                [yes, no] => (yes, Some(no)),
                _ => return Err(Error::Compile(SyntaxError::InvalidConditionPattern)),
            },
            yes => (yes, None),
        };

        let at = self.emit(Insn::Condition {
            group,
            otherwise: 0,
        });
        self.node(yes)?;
        let jump = self.emit(Insn::Jump(0));
        self.patch_here(at);
        if let Some(no) = no {
            self.node(no)?;
        }
        self.patch_here(jump);
        Ok(())
    }

    /// Look-behinds step back a fixed number of characters. A top-level
    /// alternation of differing fixed lengths becomes one look-behind per
    /// branch.
    fn look_behind(&mut self, body: &Node, negative: bool) -> Result<()> {
        check_look_behind(body, negative)?;

        if let Some(len) = fixed_length(body) {
            return self.look_behind_fixed(body, len, negative);
        }

        if let Node::Alternation(alternation) = body
            && let Some(lengths) = branch_lengths(alternation)
        {
            let branches = alternation.nodes();
            if negative {
                // (?<!a|bc) is (?<!a)(?<!bc).
                for (branch, len) in branches.iter().zip(lengths) {
                    self.look_behind_fixed(branch, len, true)?;
                }
            } else {
                let mut lengths = lengths.into_iter();
                self.alternation(branches, |lowering, branch| {
                    let len = lengths.next().unwrap_or_default();
                    lowering.look_behind_fixed(branch, len, false)
                })?;
            }
            return Ok(());
        }

        Err(Error::Compile(SyntaxError::InvalidLookBehind))
    }

    fn look_behind_fixed(&mut self, body: &Node, len: u32, negative: bool) -> Result<()> {
        if negative {
            let push = self.emit(Insn::PushLookBehindNot { exit: 0, len });
            self.node(body)?;
            self.emit(Insn::FailLookBehindNot);
            self.patch_here(push);
        } else {
            self.emit(Insn::LookBehind(len));
            self.node(body)?;
        }
        Ok(())
    }

    fn quantifier(&mut self, quantifier: &Quantifier) -> Result<()> {
        let lower = quantifier.lower();
        let upper = quantifier.upper();
        let greedy = quantifier.greedy();
        let body = quantifier.node();

        if upper == UpperBound::Finite(0) {
            // `(?<name>...){0}` defines a subroutine without matching it.
            if self.defines_called_group(body) {
                let jump = self.emit(Insn::Jump(0));
                self.node(body)?;
                self.patch_here(jump);
            }
            return Ok(());
        }

        if matches!(body, Node::Any) && lower == 0 && upper.is_infinite() && greedy {
            self.emit(if self.options.contains(Options::MULTILINE) {
                Insn::AnyCharMlStar
            } else {
                Insn::AnyCharStar
            });
            return Ok(());
        }

        let single = is_single_insn(body);
        match upper {
            UpperBound::Finite(1) if lower == 0 => self.optional(body, greedy),
            UpperBound::Finite(1) => self.node(body),
            UpperBound::Infinite if lower <= 1 || (single && lower <= EXPAND_LIMIT) => {
                for _ in 0..lower {
                    self.node(body)?;
                }
                self.star(body, greedy)
            }
            UpperBound::Finite(upper) if single && greedy && upper <= EXPAND_LIMIT => {
                for _ in 0..lower {
                    self.node(body)?;
                }
                let mut pushes = Vec::new();
                for _ in lower..upper {
                    pushes.push(self.emit(Insn::Push(0)));
                    self.node(body)?;
                }
                for push in pushes {
                    self.patch_here(push);
                }
                Ok(())
            }
            _ => self.repeat(body, lower, upper, greedy),
        }
    }

    fn defines_called_group(&self, node: &Node) -> bool {
        matches!(node, Node::EncloseMemory(memory) if self.groups.is_called(memory.number()))
            || node
                .child_nodes()
                .iter()
                .any(|child| self.defines_called_group(child))
    }

    /// Greedy: `push end; body; end:`. Lazy: `push body; jump end; body:
    /// body; end:`.
    fn optional(&mut self, body: &Node, greedy: bool) -> Result<()> {
        if greedy {
            let push = self.emit(Insn::Push(0));
            self.node(body)?;
            self.patch_here(push);
        } else {
            let push = self.emit(Insn::Push(0));
            let jump = self.emit(Insn::Jump(0));
            self.patch_here(push);
            self.node(body)?;
            self.patch_here(jump);
        }
        Ok(())
    }

    /// Greedy: `loop: push end; body; jump loop; end:`. Lazy: `jump test;
    /// loop: body; test: push loop`.
    fn star(&mut self, body: &Node, greedy: bool) -> Result<()> {
        let null_check = (min_length(body) == 0).then(|| {
            self.null_checks += 1;
            self.null_checks - 1
        });

        if greedy {
            let top = self.here();
            let push = self.emit(Insn::Push(0));
            self.checked_body(body, null_check)?;
            self.emit(Insn::Jump(top));
            self.patch_here(push);
        } else {
            let jump = self.emit(Insn::Jump(0));
            let top = self.here();
            self.checked_body(body, null_check)?;
            self.patch_here(jump);
            self.emit(Insn::Push(top));
        }
        Ok(())
    }

    /// A loop body that may match nothing is bracketed by null checks, which
    /// end the loop when an iteration does not advance.
    fn checked_body(&mut self, body: &Node, null_check: Option<usize>) -> Result<()> {
        if let Some(id) = null_check {
            self.emit(Insn::NullCheckStart(id));
        }
        self.node(body)?;
        if let Some(id) = null_check {
            self.emit(Insn::NullCheckEnd(id));
        }
        Ok(())
    }

    fn repeat(&mut self, body: &Node, lower: u32, upper: UpperBound, greedy: bool) -> Result<()> {
        let id = self.repeats;
        self.repeats += 1;

        let at = self.emit(if greedy {
            Insn::Repeat {
                id,
                lower,
                upper,
                exit: 0,
            }
        } else {
            Insn::RepeatNg {
                id,
                lower,
                upper,
                exit: 0,
            }
        });
        self.node(body)?;
        self.emit(if greedy {
            Insn::RepeatInc(id)
        } else {
            Insn::RepeatIncNg(id)
        });
        self.patch_here(at);
        Ok(())
    }
}

fn branch_lengths(alternation: &Alternation) -> Option<Vec<u32>> {
    alternation.nodes().iter().map(fixed_length).collect()
}

/// Nodes that lower to exactly one instruction.
fn is_single_insn(node: &Node) -> bool {
    match node {
        Node::String(literal) => !literal.value().is_empty(),
        Node::CClass(_) | Node::CClassInvert(_) | Node::Any | Node::Word | Node::WordInvert => {
            true
        }
        _ => false,
    }
}

/// The fewest characters `node` can match.
fn min_length(node: &Node) -> u32 {
    match node {
        Node::String(literal) => {
            u32::try_from(literal.value().chars().count()).unwrap_or(u32::MAX)
        }
        Node::CClass(_) | Node::CClassInvert(_) | Node::Any | Node::Word | Node::WordInvert => 1,
        Node::List(list) => list
            .nodes()
            .iter()
            .fold(0, |total, node| total.saturating_add(min_length(node))),
        Node::Alternation(alternation) => alternation
            .nodes()
            .iter()
            .map(min_length)
            .min()
            .unwrap_or(0),
        Node::Quantifier(quantifier) => {
            min_length(quantifier.node()).saturating_mul(quantifier.lower())
        }
        Node::EncloseMemory(memory) => min_length(memory.node()),
        Node::EncloseOptions(options) => min_length(options.node()),
        Node::EncloseStopBacktrack(enclose) => min_length(enclose.node()),
        _ => 0,
    }
}
