use crate::ast::UpperBound;
use std::fmt;

/// One instruction of a compiled pattern, named after Onigmo's opcodes.
///
/// Addresses are indices into the [`Program`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insn {
    End,
    Exact(String),
    ExactIc(String),
    CClass(Vec<(u32, u32)>),
    CClassNot(Vec<(u32, u32)>),
    AnyChar,
    AnyCharMl,
    AnyCharStar,
    AnyCharMlStar,
    Word,
    NotWord,
    WordBound,
    NotWordBound,
    BeginBuf,
    EndBuf,
    SemiEndBuf,
    BeginLine,
    EndLine,
    BeginPosition,
    Backref(u32),
    BackrefIc(u32),
    BackrefMulti(Vec<u32>),
    BackrefMultiIc(Vec<u32>),
    MemoryStart(u32),
    MemoryStartPush(u32),
    MemoryEnd(u32),
    MemoryEndPush(u32),
    Keep,
    Fail,
    Jump(usize),
    /// Saves a backtrack point at the address and continues.
    Push(usize),
    Pop,
    Repeat {
        id: usize,
        lower: u32,
        upper: UpperBound,
        exit: usize,
    },
    RepeatNg {
        id: usize,
        lower: u32,
        upper: UpperBound,
        exit: usize,
    },
    RepeatInc(usize),
    RepeatIncNg(usize),
    NullCheckStart(usize),
    NullCheckEnd(usize),
    PushPos,
    PopPos,
    PushPosNot(usize),
    FailPos,
    PushStopBt,
    PopStopBt,
    /// Steps back the given number of characters.
    LookBehind(u32),
    PushLookBehindNot {
        exit: usize,
        len: u32,
    },
    FailLookBehindNot,
    PushAbsentPos,
    Absent(usize),
    AbsentEnd,
    Call(usize),
    Return,
    Condition {
        group: u32,
        otherwise: usize,
    },
}

impl Insn {
    /// The Onigmo opcode name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Insn::End => "end",
            Insn::Exact(text) => match text.chars().count() {
                1 => "exact1",
                2 => "exact2",
                3 => "exact3",
                4 => "exact4",
                5 => "exact5",
                _ => "exactn",
            },
            Insn::ExactIc(text) => {
                if text.chars().count() == 1 {
                    "exact1_ic"
                } else {
                    "exactn_ic"
                }
            }
            Insn::CClass(_) => "cclass",
            Insn::CClassNot(_) => "cclass_not",
            Insn::AnyChar => "anychar",
            Insn::AnyCharMl => "anychar_ml",
            Insn::AnyCharStar => "anychar_star",
            Insn::AnyCharMlStar => "anychar_ml_star",
            Insn::Word => "word",
            Insn::NotWord => "not_word",
            Insn::WordBound => "word_bound",
            Insn::NotWordBound => "not_word_bound",
            Insn::BeginBuf => "begin_buf",
            Insn::EndBuf => "end_buf",
            Insn::SemiEndBuf => "semi_end_buf",
            Insn::BeginLine => "begin_line",
            Insn::EndLine => "end_line",
            Insn::BeginPosition => "begin_position",
            Insn::Backref(1) => "backref1",
            Insn::Backref(2) => "backref2",
            Insn::Backref(_) => "backrefn",
            Insn::BackrefIc(_) => "backrefn_ic",
            Insn::BackrefMulti(_) => "backref_multi",
            Insn::BackrefMultiIc(_) => "backref_multi_ic",
            Insn::MemoryStart(_) => "memory_start",
            Insn::MemoryStartPush(_) => "memory_start_push",
            Insn::MemoryEnd(_) => "memory_end",
            Insn::MemoryEndPush(_) => "memory_end_push",
            Insn::Keep => "keep",
            Insn::Fail => "fail",
            Insn::Jump(_) => "jump",
            Insn::Push(_) => "push",
            Insn::Pop => "pop",
            Insn::Repeat { .. } => "repeat",
            Insn::RepeatNg { .. } => "repeat_ng",
            Insn::RepeatInc(_) => "repeat_inc",
            Insn::RepeatIncNg(_) => "repeat_inc_ng",
            Insn::NullCheckStart(_) => "null_check_start",
            Insn::NullCheckEnd(_) => "null_check_end",
            Insn::PushPos => "push_pos",
            Insn::PopPos => "pop_pos",
            Insn::PushPosNot(_) => "push_pos_not",
            Insn::FailPos => "fail_pos",
            Insn::PushStopBt => "push_stop_bt",
            Insn::PopStopBt => "pop_stop_bt",
            Insn::LookBehind(_) => "look_behind",
            Insn::PushLookBehindNot { .. } => "push_look_behind_not",
            Insn::FailLookBehindNot => "fail_look_behind_not",
            Insn::PushAbsentPos => "push_absent_pos",
            Insn::Absent(_) => "absent",
            Insn::AbsentEnd => "absent_end",
            Insn::Call(_) => "call",
            Insn::Return => "return",
            Insn::Condition { .. } => "condition",
        }
    }

    /// Points a forward jump or exit at `target`. Returns `false` for
    /// instructions without one.
    #[must_use]
    pub(crate) fn set_target(&mut self, target: usize) -> bool {
        match self {
            Insn::Jump(addr)
            | Insn::Push(addr)
            | Insn::PushPosNot(addr)
            | Insn::Absent(addr)
            | Insn::Call(addr)
            | Insn::Repeat { exit: addr, .. }
            | Insn::RepeatNg { exit: addr, .. }
            | Insn::PushLookBehindNot { exit: addr, .. }
            | Insn::Condition {
                otherwise: addr, ..
            } => {
                *addr = target;
                true
            }
            _ => false,
        }
    }
}

fn write_ranges(f: &mut fmt::Formatter<'_>, ranges: &[(u32, u32)]) -> fmt::Result {
    f.write_str("[")?;
    for (i, &(low, high)) in ranges.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        if low == high {
            write!(f, "{low:#x}")?;
        } else {
            write!(f, "{low:#x}-{high:#x}")?;
        }
    }
    f.write_str("]")
}

fn write_bounds(f: &mut fmt::Formatter<'_>, lower: u32, upper: UpperBound) -> fmt::Result {
    match upper {
        UpperBound::Finite(upper) => write!(f, "{{{lower},{upper}}}"),
        UpperBound::Infinite => write!(f, "{{{lower},}}"),
    }
}

impl fmt::Display for Insn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        match self {
            Insn::Exact(text) | Insn::ExactIc(text) => write!(f, " {text:?}"),
            Insn::CClass(ranges) | Insn::CClassNot(ranges) => {
                f.write_str(" ")?;
                write_ranges(f, ranges)
            }
            Insn::Backref(group)
            | Insn::BackrefIc(group)
            | Insn::MemoryStart(group)
            | Insn::MemoryStartPush(group)
            | Insn::MemoryEnd(group)
            | Insn::MemoryEndPush(group)
            | Insn::LookBehind(group) => write!(f, " {group}"),
            Insn::BackrefMulti(groups) | Insn::BackrefMultiIc(groups) => {
                for group in groups {
                    write!(f, " {group}")?;
                }
                Ok(())
            }
            Insn::Jump(addr)
            | Insn::Push(addr)
            | Insn::PushPosNot(addr)
            | Insn::Absent(addr)
            | Insn::Call(addr) => write!(f, " @{addr}"),
            Insn::RepeatInc(id)
            | Insn::RepeatIncNg(id)
            | Insn::NullCheckStart(id)
            | Insn::NullCheckEnd(id) => write!(f, " {id}"),
            Insn::Repeat {
                id,
                lower,
                upper,
                exit,
            }
            | Insn::RepeatNg {
                id,
                lower,
                upper,
                exit,
            } => {
                write!(f, " {id} ")?;
                write_bounds(f, *lower, *upper)?;
                write!(f, " @{exit}")
            }
            Insn::PushLookBehindNot { exit, len } => write!(f, " {len} @{exit}"),
            Insn::Condition { group, otherwise } => write!(f, " {group} @{otherwise}"),
            _ => Ok(()),
        }
    }
}

/// A compiled pattern as a list of instructions ending in [`Insn::End`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    insns: Vec<Insn>,
}

impl Program {
    pub(crate) fn new(insns: Vec<Insn>) -> Self {
        Self { insns }
    }

    #[must_use]
    pub fn insns(&self) -> &[Insn] {
        &self.insns
    }

    /// The opcode names, in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.insns.iter().map(Insn::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.insns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insns.is_empty()
    }
}

impl std::ops::Index<usize> for Program {
    type Output = Insn;

    fn index(&self, index: usize) -> &Self::Output {
        &self.insns[index]
    }
}

/// A numbered listing, one instruction per line.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (addr, insn) in self.insns.iter().enumerate() {
            writeln!(f, "{addr:>4}: {insn}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_names_follow_length() {
        assert_eq!(Insn::Exact("a".to_owned()).name(), "exact1");
        assert_eq!(Insn::Exact("abcde".to_owned()).name(), "exact5");
        assert_eq!(Insn::Exact("abcdef".to_owned()).name(), "exactn");
        assert_eq!(Insn::ExactIc("ab".to_owned()).name(), "exactn_ic");
    }

    #[test]
    fn targets_are_set_only_on_branches() {
        let mut jump = Insn::Jump(0);
        assert!(jump.set_target(4));
        assert_eq!(jump, Insn::Jump(4));

        let mut condition = Insn::Condition {
            group: 1,
            otherwise: 0,
        };
        assert!(condition.set_target(2));
        assert_eq!(
            condition,
            Insn::Condition {
                group: 1,
                otherwise: 2
            }
        );

        let mut end = Insn::End;
        assert!(!end.set_target(4));
        assert_eq!(end, Insn::End);
    }

    #[test]
    fn listing() {
        let program = Program::new(vec![
            Insn::Push(3),
            Insn::Exact("a".to_owned()),
            Insn::Jump(0),
            Insn::CClass(vec![(0x30, 0x39), (0x5f, 0x5f)]),
            Insn::End,
        ]);
        assert_eq!(
            program.to_string(),
            "   0: push @3\n   1: exact1 \"a\"\n   2: jump @0\n   3: cclass [0x30-0x39, 0x5f]\n   4: end\n"
        );
    }

    #[test]
    fn repeat_operands() {
        let insn = Insn::Repeat {
            id: 0,
            lower: 2,
            upper: UpperBound::Infinite,
            exit: 4,
        };
        assert_eq!(insn.to_string(), "repeat 0 {2,} @4");
    }
}
