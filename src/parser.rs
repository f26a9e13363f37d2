use super::{
    Error, Result, SyntaxError,
    ast::{
        Alternation, AstRoot, Backref, Call, CharClass, EncloseCondition, EncloseMemory,
        EncloseOptions, GroupRef, List, Literal, Node, Options, Quantifier,
    },
    charset::CharSet,
    lexer::{Anchor, ClassToken, Group, Lexer, PosToken, Reference, Repeat, Token},
};
use tracing::debug;

/// Parses an Onigmo (Ruby syntax) pattern string into a tree.
///
/// ```
/// let node = onigtree::parse("abc")?;
/// assert_eq!(node.pretty_print(), r#"string("abc")"#);
/// # Ok::<(), onigtree::Error>(())
/// ```
///
/// # Errors
///
/// If the pattern string cannot be parsed, an [`Error::Syntax`] is returned.
pub fn parse(pattern: &str) -> Result<Node> {
    parse_with_options(pattern, Options::NONE)
}

/// Parses a pattern with an initial option set, as if the whole pattern
/// were written inside `(?opts:...)`.
pub fn parse_with_options(pattern: &str, options: Options) -> Result<Node> {
    parse_tree(pattern, options).map(AstRoot::into_node)
}

/// Parses a pattern and keeps its group table alongside the tree.
pub fn parse_tree(pattern: &str, options: Options) -> Result<AstRoot> {
    debug!(pattern, ?options, "parsing pattern");
    let result = Parser::new(pattern, options).parse();
    if let Err(err) = &result {
        debug!(pattern, %err, "pattern rejected");
    }
    result
}

/// Converts a pattern string into a tree.
struct Parser<'a> {
    lexer: Lexer<'a>,
    options: Options,
    capture_count: u32,
    names: Vec<(String, Vec<u32>)>,
}

impl<'a> Parser<'a> {
    fn new(pattern: &'a str, options: Options) -> Self {
        let mut lexer = Lexer::new(pattern);
        lexer.set_extended(options.contains(Options::EXTEND));
        Parser {
            lexer,
            options,
            capture_count: 0,
            names: Vec::new(),
        }
    }

    /// Converts the pattern into an [`AstRoot`], consuming the parser.
    fn parse(mut self) -> Result<AstRoot> {
        let root = self.parse_alternation()?;

        if let Some(PosToken { pos, .. }) = self.lexer.next_token()? {
            return Err(Error::Syntax {
                pos,
                kind: SyntaxError::UnmatchedCloseParenthesis,
            });
        }

        Ok(AstRoot::new(root, self.capture_count, self.names))
    }

    fn error<T>(pos: usize, kind: SyntaxError) -> Result<T> {
        Err(Error::Syntax { pos, kind })
    }

    /// Runs `f` with `options` in effect, restoring the outer options after.
    fn with_options<T>(
        &mut self,
        options: Options,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let outer = self.options;
        self.options = options;
        self.lexer.set_extended(options.contains(Options::EXTEND));
        let result = f(self);
        self.options = outer;
        self.lexer.set_extended(outer.contains(Options::EXTEND));
        result
    }

    /// Reads branches up to the end of the pattern or an unconsumed `)`.
    fn parse_alternation(&mut self) -> Result<Node> {
        let mut branches = vec![self.parse_sequence()?];

        while let Some(PosToken {
            token: Token::Alt, ..
        }) = self.lexer.peek()?
        {
            self.lexer.next_token()?;
            branches.push(self.parse_sequence()?);
        }

        Ok(if branches.len() == 1 {
            branches.pop().unwrap_or_else(Node::empty)
        } else {
            Node::Alternation(Alternation::new(branches))
        })
    }

    fn parse_sequence(&mut self) -> Result<Node> {
        let mut items = Vec::new();
        // Consecutive literal characters, not yet pushed to `items`.
        let mut text = String::new();

        while let Some(PosToken { pos, token }) = self.lexer.peek()? {
            match token {
                Token::Alt | Token::Close => break,
                Token::Char(c) => {
                    self.lexer.next_token()?;
                    text.push(c);
                }
                Token::Repeat(repeat) => {
                    self.lexer.next_token()?;
                    let target = if let Some(last) = text.pop() {
                        flush_text(&mut items, &mut text);
                        Node::String(Literal::new(last.to_string()))
                    } else {
                        match items.pop() {
                            Some(node) => node,
                            None => {
                                return Self::error(pos, SyntaxError::TargetOfRepeatNotSpecified);
                            }
                        }
                    };
                    items.push(Self::quantify(pos, target, repeat)?);
                }
                Token::Open(Group::Options {
                    on,
                    off,
                    scoped: false,
                }) => {
                    self.lexer.next_token()?;
                    flush_text(&mut items, &mut text);
                    // (?i) applies to the rest of the enclosing group.
                    let options = self.options.union(on).difference(off);
                    let body = self.with_options(options, Self::parse_alternation)?;
                    items.push(Node::EncloseOptions(EncloseOptions::new(options, body)));
                    break;
                }
                _ => {
                    let PosToken { pos, token } = self.next_token(pos)?;
                    flush_text(&mut items, &mut text);
                    items.push(self.parse_atom(pos, token)?);
                }
            }
        }
        flush_text(&mut items, &mut text);

        Ok(match items.len() {
            0 => Node::empty(),
            1 => items.pop().unwrap_or_else(Node::empty),
            _ => Node::List(List::new(items)),
        })
    }

    fn next_token(&mut self, pos: usize) -> Result<PosToken> {
        match self.lexer.next_token()? {
            Some(token) => Ok(token),
            None => Self::error(pos, SyntaxError::EndPatternAtMeta),
        }
    }

    fn quantify(pos: usize, target: Node, repeat: Repeat) -> Result<Node> {
        if matches!(
            target,
            Node::AnchorBufferBegin
                | Node::AnchorBufferEnd
                | Node::AnchorKeep
                | Node::AnchorLineBegin
                | Node::AnchorLineEnd
                | Node::AnchorPositionBegin
                | Node::AnchorSemiEnd
                | Node::AnchorWordBoundary
                | Node::AnchorWordBoundaryInvert
        ) {
            return Self::error(pos, SyntaxError::TargetOfRepeatInvalid);
        }

        let quantifier =
            Node::Quantifier(Quantifier::new(repeat.lower, repeat.upper, repeat.greedy, target));
        Ok(if repeat.possessive {
            Node::EncloseStopBacktrack(Node::enclose(quantifier))
        } else {
            quantifier
        })
    }

    fn parse_atom(&mut self, pos: usize, token: Token) -> Result<Node> {
        let node = match token {
            Token::Any => Node::Any,
            Token::Caret => Node::AnchorLineBegin,
            Token::Dollar => Node::AnchorLineEnd,
            Token::Anchor(anchor) => match anchor {
                Anchor::BufferBegin => Node::AnchorBufferBegin,
                Anchor::BufferEnd => Node::AnchorBufferEnd,
                Anchor::SemiEnd => Node::AnchorSemiEnd,
                Anchor::WordBoundary => Node::AnchorWordBoundary,
                Anchor::WordBoundaryInvert => Node::AnchorWordBoundaryInvert,
                Anchor::PositionBegin => Node::AnchorPositionBegin,
                Anchor::Keep => Node::AnchorKeep,
            },
            Token::Word { inverted: false } => Node::Word,
            Token::Word { inverted: true } => Node::WordInvert,
            Token::Class { set, inverted } => class_node(set, inverted),
            Token::OpenBracket => self.parse_bracket(pos)?,
            Token::Backref(reference) => {
                Node::Backref(Backref::new(vec![self.backref_target(pos, reference)?]))
            }
            Token::Call(reference) => Node::Call(self.call_target(pos, reference)?),
            // (?>\r\n|[\n\v\f\r\x{85}\x{2028}\x{2029}])
            Token::Linebreak => {
                let mut breaks = CharSet::new();
                breaks.add_range(0x0a, 0x0d).ok();
                breaks.add_char(0x85);
                breaks.add_range(0x2028, 0x2029).ok();
                Node::EncloseStopBacktrack(Node::enclose(Node::Alternation(Alternation::new(
                    vec![
                        Node::String(Literal::new("\r\n".to_owned())),
                        class_node(breaks, false),
                    ],
                ))))
            }
            // (?>\r\n|(?m:.))
            Token::GraphemeCluster => {
                Node::EncloseStopBacktrack(Node::enclose(Node::Alternation(Alternation::new(
                    vec![
                        Node::String(Literal::new("\r\n".to_owned())),
                        Node::EncloseOptions(EncloseOptions::new(
                            self.options.union(Options::MULTILINE),
                            Node::Any,
                        )),
                    ],
                ))))
            }
            Token::Open(group) => self.parse_group(pos, group)?,
            Token::Char(c) => Node::String(Literal::new(c.to_string())),
            Token::Alt | Token::Close | Token::Repeat(_) => {
                return Self::error(pos, SyntaxError::TargetOfRepeatNotSpecified);
            }
        };
        Ok(node)
    }

    /// Reads a group body and its closing `)`.
    fn parse_group_body(&mut self, pos: usize) -> Result<Node> {
        let body = self.parse_alternation()?;
        match self.lexer.next_token()? {
            Some(PosToken {
                token: Token::Close,
                ..
            }) => Ok(body),
            _ => Self::error(pos, SyntaxError::UnmatchedParenthesis),
        }
    }

    fn open_capture(&mut self) -> u32 {
        self.capture_count += 1;
        self.lexer.set_capture_count(self.capture_count);
        self.capture_count
    }

    fn parse_group(&mut self, pos: usize, group: Group) -> Result<Node> {
        let node = match group {
            Group::Capture => {
                let number = self.open_capture();
                Node::EncloseMemory(EncloseMemory::new(number, self.parse_group_body(pos)?))
            }
            Group::Named(name) => {
                let number = self.open_capture();
                match self.names.iter_mut().find(|(defined, _)| *defined == name) {
                    Some((_, numbers)) => numbers.push(number),
                    None => self.names.push((name, vec![number])),
                }
                Node::EncloseMemory(EncloseMemory::new(number, self.parse_group_body(pos)?))
            }
            Group::NonCapture => self.parse_group_body(pos)?,
            Group::LookAhead => Node::LookAhead(Node::enclose(self.parse_group_body(pos)?)),
            Group::LookAheadInvert => {
                Node::LookAheadInvert(Node::enclose(self.parse_group_body(pos)?))
            }
            Group::LookBehind => Node::LookBehind(Node::enclose(self.parse_group_body(pos)?)),
            Group::LookBehindInvert => {
                Node::LookBehindInvert(Node::enclose(self.parse_group_body(pos)?))
            }
            Group::Atomic => Node::EncloseStopBacktrack(Node::enclose(self.parse_group_body(pos)?)),
            Group::Absent => Node::EncloseAbsent(Node::enclose(self.parse_group_body(pos)?)),
            Group::Condition(reference) => {
                let target = self.backref_target(pos, reference)?;
                let body = self.parse_group_body(pos)?;
                if let Node::Alternation(branches) = &body
                    && branches.nodes().len() > 2
                {
                    return Self::error(pos, SyntaxError::InvalidConditionPattern);
                }
                Node::EncloseCondition(EncloseCondition::new(target, body))
            }
            Group::Options { on, off, .. } => {
                let options = self.options.union(on).difference(off);
                let body = self.with_options(options, |parser| parser.parse_group_body(pos))?;
                Node::EncloseOptions(EncloseOptions::new(options, body))
            }
        };
        Ok(node)
    }

    /// Resolves a backref or condition reference. Relative references count
    /// back from the last group opened.
    fn backref_target(&self, pos: usize, reference: Reference) -> Result<GroupRef> {
        match reference {
            Reference::Absolute(0) => Self::error(pos, SyntaxError::InvalidBackref),
            Reference::Absolute(number) => Ok(GroupRef::Number(number)),
            Reference::Relative(offset) if offset < 0 => {
                match self.capture_count.checked_add_signed(offset + 1) {
                    Some(number) if number > 0 => Ok(GroupRef::Number(number)),
                    _ => Self::error(pos, SyntaxError::InvalidBackref),
                }
            }
            Reference::Relative(_) => Self::error(pos, SyntaxError::InvalidBackref),
            Reference::Name(name) => Ok(GroupRef::Name(name)),
        }
    }

    /// Resolves a call target. `\g<0>` calls the whole pattern and `\g<+1>`
    /// the next group to open.
    fn call_target(&self, pos: usize, reference: Reference) -> Result<Call> {
        match reference {
            Reference::Absolute(number) => Ok(Call::by_number(number)),
            Reference::Relative(0) => Self::error(pos, SyntaxError::InvalidBackref),
            Reference::Relative(offset) => {
                let offset = if offset < 0 { offset + 1 } else { offset };
                match self.capture_count.checked_add_signed(offset) {
                    Some(number) if number > 0 => Ok(Call::by_number(number)),
                    _ => Self::error(pos, SyntaxError::InvalidBackref),
                }
            }
            Reference::Name(name) => Ok(Call::by_name(name)),
        }
    }

    /// Reads a bracket expression after its `[`.
    fn parse_bracket(&mut self, pos: usize) -> Result<Node> {
        let inverted = self.lexer.consume('^');
        let set = self.parse_class_body(pos)?;
        Ok(class_node(set, inverted))
    }

    /// Reads the contents of a bracket expression up to and including its
    /// `]`, after any leading `^`.
    fn parse_class_body(&mut self, open: usize) -> Result<CharSet> {
        // Everything before the last `&&`, already intersected.
        let mut intersection: Option<CharSet> = None;
        let mut set = CharSet::new();
        let mut first = true;

        loop {
            let Some(PosToken { pos, token }) = self.lexer.next_class_token()? else {
                return Self::error(open, SyntaxError::PrematureEndOfCharClass);
            };

            match token {
                // []] and [^]] start with a literal `]`.
                ClassToken::Close if first => {
                    if !self.lexer.has_close_bracket() {
                        return Self::error(open, SyntaxError::EmptyCharClass);
                    }
                    self.parse_class_value(pos, ']', &mut set)?;
                }
                ClassToken::Close => break,
                ClassToken::And => {
                    intersection = Some(match intersection {
                        Some(mut outer) => {
                            outer.intersect(&set);
                            outer
                        }
                        None => set,
                    });
                    set = CharSet::new();
                }
                ClassToken::Open => {
                    let inverted = self.lexer.consume('^');
                    let mut nested = self.parse_class_body(pos)?;
                    if inverted {
                        nested.invert();
                    }
                    set.add_set(&nested);
                }
                ClassToken::Set(class) => {
                    set.add_set(&class);
                    if let Some(PosToken {
                        token: ClassToken::Hyphen,
                        ..
                    }) = self.lexer.peek_class_token()?
                    {
                        let mut after = self.lexer.clone();
                        after.next_class_token()?;
                        match after.next_class_token()? {
                            // [\d-] ends with a literal `-`.
                            Some(PosToken {
                                token: ClassToken::Close,
                                ..
                            }) => {}
                            _ => return Self::error(pos, SyntaxError::CharClassValueAtStartOfRange),
                        }
                    }
                }
                ClassToken::Hyphen => self.parse_class_value(pos, '-', &mut set)?,
                ClassToken::Char(c) => self.parse_class_value(pos, c, &mut set)?,
            }
            first = false;
        }

        Ok(match intersection {
            Some(mut outer) => {
                outer.intersect(&set);
                outer
            }
            None => set,
        })
    }

    /// Adds `c`, or the range starting at `c` if a `-` and an end value
    /// follow.
    fn parse_class_value(&mut self, pos: usize, c: char, set: &mut CharSet) -> Result<()> {
        let Some(PosToken {
            token: ClassToken::Hyphen,
            ..
        }) = self.lexer.peek_class_token()?
        else {
            set.add_char(c.into());
            return Ok(());
        };

        let mut after = self.lexer.clone();
        after.next_class_token()?;
        let end = match after.next_class_token()? {
            Some(PosToken {
                token: ClassToken::Char(end),
                ..
            }) => end,
            Some(PosToken {
                token: ClassToken::Hyphen,
                ..
            }) => '-',
            // [a-] and [a-&&b] end with a literal `-`.
            Some(PosToken {
                token: ClassToken::Close | ClassToken::And,
                ..
            }) => {
                set.add_char(c.into());
                return Ok(());
            }
            Some(PosToken {
                token: ClassToken::Set(_) | ClassToken::Open,
                ..
            }) => return Self::error(pos, SyntaxError::CharClassValueAtEndOfRange),
            None => return Self::error(pos, SyntaxError::PrematureEndOfCharClass),
        };

        self.lexer = after;
        set.add_range(c.into(), end.into())
            .or_else(|_| Self::error(pos, SyntaxError::EmptyRangeInCharClass))
    }
}

fn flush_text(items: &mut Vec<Node>, text: &mut String) {
    if !text.is_empty() {
        items.push(Node::String(Literal::new(std::mem::take(text))));
    }
}

fn class_node(set: CharSet, inverted: bool) -> Node {
    let class = CharClass::new(set.into_ranges());
    if inverted {
        Node::CClassInvert(class)
    } else {
        Node::CClass(class)
    }
}
