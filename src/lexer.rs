use super::{
    Error, Result, SyntaxError,
    ast::{Options, UpperBound},
    charset::CharSet,
};

pub mod token;

pub use token::{Anchor, ClassToken, Group, PosToken, Reference, Repeat, Token};

/// The largest repetition count accepted in an interval.
pub const MAX_REPEAT: u32 = 100_000;

/// Splits a pattern string into tokens.
///
/// The lexer is driven by the parser: bracket expressions are read with
/// [`Lexer::next_class_token`], and extended mode and the number of groups
/// opened so far are set from the parser because they change how later text
/// is read.
#[derive(Clone, Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    extended: bool,
    captures: u32,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            extended: false,
            captures: 0,
        }
    }

    /// The byte offset of the next unread character.
    #[must_use]
    pub fn tell(&self) -> usize {
        self.pos
    }

    /// Turns whitespace and `#` comment skipping on or off.
    pub fn set_extended(&mut self, extended: bool) {
        self.extended = extended;
    }

    /// Tells the lexer how many groups have been opened, which decides whether
    /// `\10` is a backref or an octal escape.
    pub fn set_capture_count(&mut self, captures: u32) {
        self.captures = captures;
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consumes the next character if it is `c`.
    pub fn consume(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(pos: usize, kind: SyntaxError) -> Error {
        Error::Syntax { pos, kind }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&self) -> Result<Option<PosToken>> {
        self.clone().next_token()
    }

    fn skip_extended(&mut self) {
        if !self.extended {
            return;
        }
        while let Some(c) = self.peek_char() {
            match c {
                ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c' => {
                    self.advance();
                }
                '#' => {
                    while let Some(c) = self.advance() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Option<PosToken>> {
        loop {
            self.skip_extended();
            let pos = self.pos;
            let Some(c) = self.advance() else {
                return Ok(None);
            };

            let token = match c {
                '.' => Token::Any,
                '^' => Token::Caret,
                '$' => Token::Dollar,
                '|' => Token::Alt,
                ')' => Token::Close,
                '[' => Token::OpenBracket,
                '(' => match self.group(pos)? {
                    Some(group) => Token::Open(group),
                    // (?#...)
                    None => continue,
                },
                '*' => Token::Repeat(self.repeat_suffix(0, UpperBound::Infinite, true)),
                '+' => Token::Repeat(self.repeat_suffix(1, UpperBound::Infinite, true)),
                '?' => Token::Repeat(self.repeat_suffix(0, UpperBound::Finite(1), true)),
                '{' => match self.interval()? {
                    Some(repeat) => Token::Repeat(repeat),
                    None => Token::Char('{'),
                },
                '\\' => self.escape(pos)?,
                c => Token::Char(c),
            };

            return Ok(Some(PosToken { pos, token }));
        }
    }

    fn repeat_suffix(&mut self, lower: u32, upper: UpperBound, possessive: bool) -> Repeat {
        let mut repeat = Repeat {
            lower,
            upper,
            greedy: true,
            possessive: false,
        };
        if self.consume('?') {
            repeat.greedy = false;
        } else if possessive && self.consume('+') {
            repeat.possessive = true;
        }
        repeat
    }

    fn number(&mut self) -> Result<Option<u32>> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(digit) = self.peek_char().and_then(|c| c.to_digit(10)) {
            self.advance();
            value = value.saturating_mul(10).saturating_add(digit);
        }
        if self.pos == start {
            return Ok(None);
        }
        if value > MAX_REPEAT {
            return Err(Self::error(start, SyntaxError::TooBigRepeatRange));
        }
        Ok(Some(value))
    }

    /// Reads `{n}`, `{n,}`, `{,m}` or `{n,m}` after the `{`. Anything else is
    /// not an interval and leaves the lexer where it was.
    fn interval(&mut self) -> Result<Option<Repeat>> {
        let start = self.pos;
        let lower = self.number()?;
        let (lower, upper) = if self.consume(',') {
            let upper = self.number()?;
            match (lower, upper) {
                (None, None) => {
                    self.pos = start;
                    return Ok(None);
                }
                (lower, Some(upper)) => (lower.unwrap_or(0), UpperBound::Finite(upper)),
                (Some(lower), None) => (lower, UpperBound::Infinite),
            }
        } else if let Some(lower) = lower {
            (lower, UpperBound::Finite(lower))
        } else {
            self.pos = start;
            return Ok(None);
        };

        if !self.consume('}') {
            self.pos = start;
            return Ok(None);
        }

        if upper.finite().is_some_and(|upper| upper < lower) {
            return Err(Self::error(start - 1, SyntaxError::UpperSmallerThanLower));
        }

        Ok(Some(self.repeat_suffix(lower, upper, false)))
    }

    fn group(&mut self, start: usize) -> Result<Option<Group>> {
        if !self.consume('?') {
            return Ok(Some(Group::Capture));
        }
        let Some(c) = self.advance() else {
            return Err(Self::error(start, SyntaxError::EndPatternInGroup));
        };

        let group = match c {
            ':' => Group::NonCapture,
            '=' => Group::LookAhead,
            '!' => Group::LookAheadInvert,
            '>' => Group::Atomic,
            '~' => Group::Absent,
            '#' => {
                loop {
                    match self.advance() {
                        Some(')') => return Ok(None),
                        Some('\\') => {
                            self.advance();
                        }
                        Some(_) => {}
                        None => return Err(Self::error(start, SyntaxError::EndPatternInGroup)),
                    }
                }
            }
            '<' if self.consume('=') => Group::LookBehind,
            '<' if self.consume('!') => Group::LookBehindInvert,
            '<' => Group::Named(self.group_name(start, '>')?),
            '\'' => Group::Named(self.group_name(start, '\'')?),
            '(' => Group::Condition(self.condition(start)?),
            c => self.options(start, c)?,
        };

        Ok(Some(group))
    }

    /// Reads a name up to `close`, which is consumed.
    fn delimited(&mut self, start: usize, close: char) -> Result<&'a str> {
        let name_start = self.pos;
        loop {
            match self.advance() {
                Some(c) if c == close => break,
                Some(_) => {}
                None => {
                    return Err(Self::error(
                        start,
                        SyntaxError::InvalidGroupName(self.input[name_start..].to_owned()),
                    ));
                }
            }
        }
        Ok(&self.input[name_start..self.pos - close.len_utf8()])
    }

    fn group_name(&mut self, start: usize, close: char) -> Result<String> {
        let name = self.delimited(start, close)?;
        if name.is_empty() {
            return Err(Self::error(start, SyntaxError::EmptyGroupName));
        }
        if !is_group_name(name) {
            return Err(Self::error(
                start,
                SyntaxError::InvalidGroupName(name.to_owned()),
            ));
        }
        Ok(name.to_owned())
    }

    /// Reads the body of `\k<...>`, `\g'...'` and friends, after the escape
    /// letter.
    fn reference(&mut self, start: usize) -> Result<Reference> {
        let close = if self.consume('<') {
            '>'
        } else {
            self.advance();
            '\''
        };
        let name = self.delimited(start, close)?;
        if name.is_empty() {
            return Err(Self::error(start, SyntaxError::EmptyGroupName));
        }

        let (sign, digits) = match name.as_bytes()[0] {
            b'-' => (Some(-1), &name[1..]),
            b'+' => (Some(1), &name[1..]),
            _ => (None, name),
        };
        if digits.bytes().next().is_some_and(|b| b.is_ascii_digit()) {
            let number = digits
                .parse::<i32>()
                .map_err(|_| Self::error(start, SyntaxError::InvalidGroupName(name.to_owned())))?;
            return Ok(match sign {
                Some(sign) => Reference::Relative(sign * number),
                None => Reference::Absolute(number.unsigned_abs()),
            });
        }

        if sign.is_some() || !is_group_name(name) {
            return Err(Self::error(
                start,
                SyntaxError::InvalidGroupName(name.to_owned()),
            ));
        }
        Ok(Reference::Name(name.to_owned()))
    }

    fn condition(&mut self, start: usize) -> Result<Reference> {
        let reference = match self.peek_char() {
            Some('<' | '\'') => self.reference(start)?,
            Some(c) if c.is_ascii_digit() => {
                let mut number: u32 = 0;
                while let Some(digit) = self.peek_char().and_then(|c| c.to_digit(10)) {
                    self.advance();
                    number = number.saturating_mul(10).saturating_add(digit);
                }
                Reference::Absolute(number)
            }
            _ => return Err(Self::error(start, SyntaxError::InvalidConditionPattern)),
        };
        if !self.consume(')') {
            return Err(Self::error(start, SyntaxError::InvalidConditionPattern));
        }
        Ok(reference)
    }

    fn options(&mut self, start: usize, first: char) -> Result<Group> {
        let mut on = Options::NONE;
        let mut off = Options::NONE;
        let mut negative = false;
        let mut c = first;

        loop {
            match c {
                '-' if !negative => negative = true,
                ':' | ')' => {
                    return Ok(Group::Options {
                        on,
                        off,
                        scoped: c == ':',
                    });
                }
                'i' | 'm' | 'x' => {
                    let option = Options::from_flag(c).unwrap_or_default();
                    if negative {
                        off |= option;
                    } else {
                        on |= option;
                    }
                }
                'a' if !negative => on |= Options::ASCII_RANGE,
                'd' | 'u' if !negative => off |= Options::ASCII_RANGE,
                _ => return Err(Self::error(start, SyntaxError::UndefinedGroupOption)),
            }
            c = self
                .advance()
                .ok_or_else(|| Self::error(start, SyntaxError::EndPatternInGroup))?;
        }
    }

    fn escape(&mut self, start: usize) -> Result<Token> {
        let Some(c) = self.advance() else {
            return Err(Self::error(start, SyntaxError::EndPatternAtEscape));
        };

        let token = match c {
            'A' => Token::Anchor(Anchor::BufferBegin),
            'z' => Token::Anchor(Anchor::BufferEnd),
            'Z' => Token::Anchor(Anchor::SemiEnd),
            'b' => Token::Anchor(Anchor::WordBoundary),
            'B' => Token::Anchor(Anchor::WordBoundaryInvert),
            'G' => Token::Anchor(Anchor::PositionBegin),
            'K' => Token::Anchor(Anchor::Keep),
            'w' => Token::Word { inverted: false },
            'W' => Token::Word { inverted: true },
            'd' | 'D' | 's' | 'S' | 'h' | 'H' => Token::Class {
                set: class_escape(c),
                inverted: c.is_ascii_uppercase(),
            },
            'p' | 'P' => {
                let (set, inverted) = self.property(start, c == 'P')?;
                Token::Class { set, inverted }
            }
            'R' => Token::Linebreak,
            'X' => Token::GraphemeCluster,
            'k' if matches!(self.peek_char(), Some('<' | '\'')) => {
                Token::Backref(self.reference(start)?)
            }
            'g' if matches!(self.peek_char(), Some('<' | '\'')) => {
                Token::Call(self.reference(start)?)
            }
            '1'..='9' => self.numbered(start, c),
            '0' => Token::Char(self.octal(start, 0, 2)?),
            c => Token::Char(self.char_escape(start, c)?),
        };

        Ok(token)
    }

    /// `\nn`: a backref when the group exists (or `n < 10`), otherwise an
    /// octal escape, otherwise a literal digit.
    fn numbered(&mut self, start: usize, first: char) -> Token {
        let digits_start = self.pos - 1;
        let mut number: u32 = 0;
        let mut end = digits_start;
        for (offset, c) in self.input[digits_start..].char_indices() {
            let Some(digit) = c.to_digit(10) else {
                break;
            };
            number = number.saturating_mul(10).saturating_add(digit);
            end = digits_start + offset + 1;
        }

        if number <= 9 || number <= self.captures {
            self.pos = end;
            return Token::Backref(Reference::Absolute(number));
        }

        if let Some(value) = first.to_digit(8) {
            self.pos = digits_start + 1;
            // Two more octal digits at most, so this cannot fail.
            return Token::Char(self.octal(start, value, 2).unwrap_or(first));
        }

        Token::Char(first)
    }

    /// Reads up to `max` further octal digits onto `value`.
    fn octal(&mut self, start: usize, mut value: u32, max: usize) -> Result<char> {
        for _ in 0..max {
            let Some(digit) = self.peek_char().and_then(|c| c.to_digit(8)) else {
                break;
            };
            self.advance();
            value = value * 8 + digit;
        }
        char::from_u32(value).ok_or_else(|| Self::error(start, SyntaxError::InvalidCodePoint))
    }

    fn hex(&mut self, max: usize) -> Option<u32> {
        let mut value: Option<u32> = None;
        for _ in 0..max {
            let Some(digit) = self.peek_char().and_then(|c| c.to_digit(16)) else {
                break;
            };
            self.advance();
            value = Some(value.unwrap_or(0) * 16 + digit);
        }
        value
    }

    fn braced_hex(&mut self, start: usize) -> Result<char> {
        let value = self.hex(8);
        if !self.consume('}') {
            return Err(Self::error(start, SyntaxError::InvalidCodePoint));
        }
        value
            .and_then(char::from_u32)
            .ok_or_else(|| Self::error(start, SyntaxError::InvalidCodePoint))
    }

    /// Escapes that stand for a single character, valid both inside and
    /// outside of brackets. Unknown escapes are the character itself.
    fn char_escape(&mut self, start: usize, c: char) -> Result<char> {
        let c = match c {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\x0c',
            'v' => '\x0b',
            'a' => '\x07',
            'e' => '\x1b',
            'x' => {
                if self.consume('{') {
                    return self.braced_hex(start);
                }
                let value = self
                    .hex(2)
                    .ok_or_else(|| Self::error(start, SyntaxError::InvalidHexEscape))?;
                char::from_u32(value)
                    .ok_or_else(|| Self::error(start, SyntaxError::InvalidCodePoint))?
            }
            'u' => {
                if self.consume('{') {
                    return self.braced_hex(start);
                }
                let digits_start = self.pos;
                let value = self.hex(4);
                if self.pos - digits_start != 4 {
                    return Err(Self::error(start, SyntaxError::InvalidUnicodeEscape));
                }
                value
                    .and_then(char::from_u32)
                    .ok_or_else(|| Self::error(start, SyntaxError::InvalidCodePoint))?
            }
            'c' => self.control(start)?,
            'C' => {
                if !self.consume('-') {
                    return Err(Self::error(start, SyntaxError::InvalidControlCode));
                }
                self.control(start)?
            }
            'M' => {
                if !self.consume('-') {
                    return Err(Self::error(start, SyntaxError::InvalidMetaCode));
                }
                let Some(c) = self.advance() else {
                    return Err(Self::error(start, SyntaxError::EndPatternAtMeta));
                };
                char::from_u32(u32::from(c) | 0x80)
                    .ok_or_else(|| Self::error(start, SyntaxError::InvalidCodePoint))?
            }
            c => c,
        };
        Ok(c)
    }

    fn control(&mut self, start: usize) -> Result<char> {
        let Some(c) = self.advance() else {
            return Err(Self::error(start, SyntaxError::EndPatternAtControl));
        };
        let value = if c == '?' { 0x7f } else { u32::from(c) & 0x9f };
        char::from_u32(value).ok_or_else(|| Self::error(start, SyntaxError::InvalidCodePoint))
    }

    /// Reads `{Name}` or `{^Name}` after `\p`. Returns the set and whether it
    /// is inverted.
    fn property(&mut self, start: usize, mut inverted: bool) -> Result<(CharSet, bool)> {
        if !self.consume('{') {
            return Err(Self::error(
                start,
                SyntaxError::InvalidCharPropertyName(String::new()),
            ));
        }
        if self.consume('^') {
            inverted = !inverted;
        }
        let name = self.delimited(start, '}').map_err(|_| {
            Self::error(
                start,
                SyntaxError::InvalidCharPropertyName(self.input[start..].to_owned()),
            )
        })?;
        let set = CharSet::posix(name).ok_or_else(|| {
            Self::error(start, SyntaxError::InvalidCharPropertyName(name.to_owned()))
        })?;
        Ok((set, inverted))
    }

    /// Returns `true` if an unescaped `]` appears later in the pattern.
    #[must_use]
    pub fn has_close_bracket(&self) -> bool {
        let mut chars = self.input[self.pos..].chars();
        while let Some(c) = chars.next() {
            match c {
                ']' => return true,
                '\\' => {
                    chars.next();
                }
                _ => {}
            }
        }
        false
    }

    /// Returns the next bracket expression token without consuming it.
    pub fn peek_class_token(&self) -> Result<Option<PosToken<ClassToken>>> {
        self.clone().next_class_token()
    }

    /// Reads the next token of a bracket expression.
    pub fn next_class_token(&mut self) -> Result<Option<PosToken<ClassToken>>> {
        let pos = self.pos;
        let Some(c) = self.advance() else {
            return Ok(None);
        };

        let token = match c {
            ']' => ClassToken::Close,
            '-' => ClassToken::Hyphen,
            '&' if self.consume('&') => ClassToken::And,
            '[' if self.peek_char() == Some(':') => match self.posix_bracket(pos)? {
                Some(set) => ClassToken::Set(set),
                None => ClassToken::Open,
            },
            '[' => ClassToken::Open,
            '\\' => {
                let Some(c) = self.advance() else {
                    return Err(Self::error(pos, SyntaxError::EndPatternAtEscape));
                };
                match c {
                    'w' | 'W' | 'd' | 'D' | 's' | 'S' | 'h' | 'H' => {
                        let mut set = class_escape(c);
                        if c.is_ascii_uppercase() {
                            set.invert();
                        }
                        ClassToken::Set(set)
                    }
                    'p' | 'P' => {
                        let (mut set, inverted) = self.property(pos, c == 'P')?;
                        if inverted {
                            set.invert();
                        }
                        ClassToken::Set(set)
                    }
                    'b' => ClassToken::Char('\x08'),
                    '0'..='7' => {
                        let value = c.to_digit(8).unwrap_or_default();
                        ClassToken::Char(self.octal(pos, value, 2)?)
                    }
                    c => ClassToken::Char(self.char_escape(pos, c)?),
                }
            }
            c => ClassToken::Char(c),
        };

        Ok(Some(PosToken { pos, token }))
    }

    /// Reads `[:name:]` or `[:^name:]` after the `[`. Text that does not have
    /// that shape is not a POSIX bracket and leaves the lexer where it was.
    fn posix_bracket(&mut self, start: usize) -> Result<Option<CharSet>> {
        let rest = &self.input[self.pos + 1..];
        let (inverted, rest) = match rest.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, rest),
        };
        let name_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if !rest[name_len..].starts_with(":]") {
            return Ok(None);
        }

        let name = &rest[..name_len];
        let mut set = CharSet::posix(name)
            .ok_or_else(|| Self::error(start, SyntaxError::InvalidPosixBracketType))?;
        if inverted {
            set.invert();
        }
        self.pos += 1 + usize::from(inverted) + name_len + 2;
        Ok(Some(set))
    }
}

fn class_escape(c: char) -> CharSet {
    match c.to_ascii_lowercase() {
        'd' => CharSet::digit(),
        's' => CharSet::space(),
        'h' => CharSet::hex_digit(),
        _ => CharSet::word(),
    }
}

/// Group names start with a letter or `_` and continue with word characters.
fn is_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}

impl Iterator for Lexer<'_> {
    type Item = Result<PosToken>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}
