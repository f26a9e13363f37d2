//! Reference resolution and shape checks that Onigmo performs after parsing.

use crate::{
    Error, MAX_CAPTURE_GROUPS, Result, SyntaxError,
    ast::{
        AstRoot, Backref, Call, EncloseCondition, EncloseMemory, GroupRef, NamedGroup, Node,
        UpperBound,
    },
    visit::Visitor,
};

/// The capture groups of a checked pattern.
#[derive(Debug, Clone)]
pub(crate) struct Groups {
    /// The capture number for each parsed group number, `None` if the group
    /// does not capture. Index 0 is the whole pattern.
    numbers: Vec<Option<u32>>,
    /// Parsed group numbers that are called, including 0.
    called: Vec<bool>,
    /// Parsed group numbers that are backreferenced.
    referenced: Vec<bool>,
    capture_count: u32,
    names: Vec<NamedGroup>,
    parsed_names: Vec<NamedGroup>,
}

impl Groups {
    /// The number of capturing groups.
    pub(crate) fn capture_count(&self) -> u32 {
        self.capture_count
    }

    pub(crate) fn names(&self) -> &[NamedGroup] {
        &self.names
    }

    /// The capture number of a parsed group, if it captures.
    pub(crate) fn capture(&self, parsed: u32) -> Option<u32> {
        self.numbers.get(parsed as usize).copied().flatten()
    }

    pub(crate) fn is_called(&self, parsed: u32) -> bool {
        self.called.get(parsed as usize).copied().unwrap_or(false)
    }

    pub(crate) fn is_referenced(&self, parsed: u32) -> bool {
        self.referenced.get(parsed as usize).copied().unwrap_or(false)
    }

    fn parsed_numbers(&self, name: &str) -> &[u32] {
        self.parsed_names
            .iter()
            .find(|group| group.name() == name)
            .map(NamedGroup::numbers)
            .unwrap_or_default()
    }

    /// The capture numbers a backref or condition refers to.
    pub(crate) fn resolve(&self, target: &GroupRef) -> Vec<u32> {
        match target {
            GroupRef::Number(number) => self.capture(*number).into_iter().collect(),
            GroupRef::Name(name) => self
                .parsed_numbers(name)
                .iter()
                .filter_map(|&number| self.capture(number))
                .collect(),
        }
    }

    /// The parsed group number a call jumps to.
    pub(crate) fn call_target(&self, call: &Call) -> u32 {
        match (call.number(), call.name()) {
            (Some(number), _) => number,
            (None, Some(name)) => self.parsed_numbers(name).first().copied().unwrap_or(0),
            (None, None) => 0,
        }
    }
}

/// Walks the tree in pattern order, recording references and the first
/// reference error.
struct Scan<'a> {
    names: &'a [NamedGroup],
    opened: u32,
    numbered: bool,
    error: Option<SyntaxError>,
    referenced: Vec<u32>,
    calls: Vec<Call>,
}

impl<'a> Scan<'a> {
    fn fail(&mut self, error: SyntaxError) {
        self.error.get_or_insert(error);
    }

    fn name(&self, name: &str) -> Option<&'a NamedGroup> {
        self.names.iter().find(|group| group.name() == name)
    }

    fn reference(&mut self, target: &GroupRef) {
        match target {
            GroupRef::Number(number) => {
                self.numbered = true;
                if *number > self.opened {
                    self.fail(SyntaxError::InvalidBackref);
                } else {
                    self.referenced.push(*number);
                }
            }
            GroupRef::Name(name) => match self.name(name) {
                Some(group) => self.referenced.extend_from_slice(group.numbers()),
                None => self.fail(SyntaxError::UndefinedNameReference(name.clone())),
            },
        }
    }
}

impl Visitor for Scan<'_> {
    type Output = ();

    fn visit_backref(&mut self, node: &Backref) {
        for target in node.values() {
            self.reference(target);
        }
    }

    fn visit_call(&mut self, node: &Call) {
        if node.number().is_some_and(|number| number != 0) {
            self.numbered = true;
        }
        self.calls.push(node.clone());
    }

    fn visit_enclose_condition(&mut self, node: &EncloseCondition) {
        self.reference(node.number());
        node.node().accept(self);
    }

    fn visit_enclose_memory(&mut self, node: &EncloseMemory) {
        self.opened = self.opened.max(node.number());
        node.node().accept(self);
    }
}

/// Resolves the references of a parsed pattern and numbers its capture
/// groups.
///
/// When the pattern has named groups, only named groups capture and they are
/// renumbered from 1 in order, and numbered references are rejected.
pub(crate) fn check(tree: &AstRoot) -> Result<Groups> {
    let parsed_count = tree.capture_count();
    if parsed_count > MAX_CAPTURE_GROUPS {
        return Err(crate::EngineLimit::CaptureGroups(parsed_count).into());
    }

    let mut scan = Scan {
        names: tree.names(),
        opened: 0,
        numbered: false,
        error: None,
        referenced: Vec::new(),
        calls: Vec::new(),
    };
    tree.accept(&mut scan);

    if let Some(error) = scan.error {
        return Err(Error::Compile(error));
    }
    if scan.numbered && !tree.names().is_empty() {
        return Err(Error::Compile(SyntaxError::NumberedReferenceNotAllowed));
    }

    for call in &scan.calls {
        match (call.number(), call.name()) {
            (Some(number), _) if number > parsed_count => {
                return Err(Error::Compile(SyntaxError::UndefinedGroupReference(number)));
            }
            (None, Some(name)) => match scan.name(name) {
                None => {
                    return Err(Error::Compile(SyntaxError::UndefinedNameReference(
                        name.to_owned(),
                    )));
                }
                Some(group) if group.numbers().len() > 1 => {
                    return Err(Error::Compile(SyntaxError::MultiplexDefinitionNameCall(
                        name.to_owned(),
                    )));
                }
                Some(_) => {}
            },
            _ => {}
        }
    }

    let size = parsed_count as usize + 1;
    let mut numbers = vec![None; size];
    let mut capture_count = 0;
    if tree.names().is_empty() {
        for number in 1..=parsed_count {
            numbers[number as usize] = Some(number);
        }
        capture_count = parsed_count;
    } else {
        let mut named: Vec<u32> = tree
            .names()
            .iter()
            .flat_map(|group| group.numbers().iter().copied())
            .collect();
        named.sort_unstable();
        for number in named {
            capture_count += 1;
            numbers[number as usize] = Some(capture_count);
        }
    }

    let names = tree
        .names()
        .iter()
        .map(|group| {
            let renumbered = group
                .numbers()
                .iter()
                .filter_map(|&number| numbers[number as usize])
                .collect();
            NamedGroup::new(group.name().to_owned(), renumbered)
        })
        .collect();

    let mut groups = Groups {
        numbers,
        called: vec![false; size],
        referenced: vec![false; size],
        capture_count,
        names,
        parsed_names: tree.names().to_vec(),
    };
    for number in scan.referenced {
        groups.referenced[number as usize] = true;
    }
    for call in &scan.calls {
        let target = groups.call_target(call);
        groups.called[target as usize] = true;
    }

    Ok(groups)
}

/// Checks that a look-behind body only contains what Onigmo can match
/// backwards. Negative look-behinds additionally reject captures and `\K`.
pub(crate) fn check_look_behind(node: &Node, negative: bool) -> Result<()> {
    let allowed = match node {
        Node::Alternation(_) | Node::List(_) | Node::Quantifier(_) | Node::EncloseOptions(_) => {
            return node
                .child_nodes()
                .iter()
                .try_for_each(|child| check_look_behind(child, negative));
        }
        Node::EncloseMemory(memory) if !negative => {
            return check_look_behind(memory.node(), negative);
        }
        Node::AnchorKeep => !negative,
        Node::String(_)
        | Node::CClass(_)
        | Node::CClassInvert(_)
        | Node::Any
        | Node::Word
        | Node::WordInvert
        | Node::Call(_)
        | Node::AnchorBufferBegin
        | Node::AnchorLineBegin
        | Node::AnchorLineEnd
        | Node::AnchorPositionBegin
        | Node::AnchorWordBoundary
        | Node::AnchorWordBoundaryInvert
        | Node::LookBehind(_)
        | Node::LookBehindInvert(_) => true,
        Node::AnchorBufferEnd
        | Node::AnchorSemiEnd
        | Node::Backref(_)
        | Node::EncloseAbsent(_)
        | Node::EncloseCondition(_)
        | Node::EncloseMemory(_)
        | Node::EncloseStopBacktrack(_)
        | Node::LookAhead(_)
        | Node::LookAheadInvert(_) => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(Error::Compile(SyntaxError::InvalidLookBehind))
    }
}

/// The number of characters `node` always matches, if that is fixed.
pub(crate) fn fixed_length(node: &Node) -> Option<u32> {
    match node {
        Node::String(literal) => u32::try_from(literal.value().chars().count()).ok(),
        Node::CClass(_) | Node::CClassInvert(_) | Node::Any | Node::Word | Node::WordInvert => {
            Some(1)
        }
        Node::AnchorBufferBegin
        | Node::AnchorBufferEnd
        | Node::AnchorKeep
        | Node::AnchorLineBegin
        | Node::AnchorLineEnd
        | Node::AnchorPositionBegin
        | Node::AnchorSemiEnd
        | Node::AnchorWordBoundary
        | Node::AnchorWordBoundaryInvert
        | Node::LookAhead(_)
        | Node::LookAheadInvert(_)
        | Node::LookBehind(_)
        | Node::LookBehindInvert(_) => Some(0),
        Node::List(list) => list
            .nodes()
            .iter()
            .try_fold(0u32, |total, node| total.checked_add(fixed_length(node)?)),
        Node::Alternation(alternation) => {
            let mut lengths = alternation.nodes().iter().map(fixed_length);
            let first = lengths.next()??;
            lengths
                .all(|length| length == Some(first))
                .then_some(first)
        }
        Node::Quantifier(quantifier) => match quantifier.upper() {
            UpperBound::Finite(upper) if upper == quantifier.lower() => {
                fixed_length(quantifier.node())?.checked_mul(upper)
            }
            _ => None,
        },
        Node::EncloseMemory(memory) => fixed_length(memory.node()),
        Node::EncloseOptions(options) => fixed_length(options.node()),
        Node::EncloseStopBacktrack(enclose) => fixed_length(enclose.node()),
        Node::Backref(_) | Node::Call(_) | Node::EncloseAbsent(_) | Node::EncloseCondition(_) => {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Options, parse, parse_tree};

    fn length(pattern: &str) -> Option<u32> {
        fixed_length(&parse(pattern).unwrap())
    }

    #[test]
    fn fixed_lengths() {
        assert_eq!(length("abc"), Some(3));
        assert_eq!(length("a[bc]\\w."), Some(4));
        assert_eq!(length("ab|cd"), Some(2));
        assert_eq!(length("ab|c"), None);
        assert_eq!(length("a{3}"), Some(3));
        assert_eq!(length("a{2,3}"), None);
        assert_eq!(length("(?:ab){2}\\b"), Some(4));
        assert_eq!(length("a*"), None);
        assert_eq!(length("(a)\\1"), None);
    }

    #[test]
    fn named_groups_are_renumbered() {
        let tree = parse_tree("(a)(?<x>b)(c)(?<y>d)", Options::NONE).unwrap();
        let groups = check(&tree).unwrap();
        assert_eq!(groups.capture_count(), 2);
        assert_eq!(groups.capture(1), None);
        assert_eq!(groups.capture(2), Some(1));
        assert_eq!(groups.capture(4), Some(2));
        assert_eq!(groups.names()[1].numbers(), &[2]);
    }

    #[test]
    fn references_are_recorded() {
        let tree = parse_tree("(a)(b)\\2\\g<1>", Options::NONE).unwrap();
        let groups = check(&tree).unwrap();
        assert!(groups.is_referenced(2));
        assert!(!groups.is_referenced(1));
        assert!(groups.is_called(1));
        assert!(!groups.is_called(0));
    }
}
