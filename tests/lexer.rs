use onigtree::{
    CharSet, Error, Options, Result, SyntaxError, UpperBound,
    lexer::{Anchor, ClassToken, Group, Lexer, Reference, Repeat, Token},
};

fn lex_all(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token_result) = lexer.next_token()? {
        tokens.push(token_result.token);
    }
    Ok(tokens)
}

fn lex_class(input: &str) -> Result<Vec<ClassToken>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token_result) = lexer.next_class_token()? {
        tokens.push(token_result.token);
    }
    Ok(tokens)
}

fn syntax_error(input: &str) -> (usize, SyntaxError) {
    match lex_all(input) {
        Err(Error::Syntax { pos, kind }) => (pos, kind),
        other => panic!("expected a syntax error for {input:?}, got {other:?}"),
    }
}

fn repeat(lower: u32, upper: UpperBound, greedy: bool, possessive: bool) -> Token {
    Token::Repeat(Repeat {
        lower,
        upper,
        greedy,
        possessive,
    })
}

#[test]
fn test_basic_tokens_lexer() -> Result<()> {
    assert_eq!(
        lex_all("abc")?,
        vec![Token::Char('a'), Token::Char('b'), Token::Char('c')]
    );
    assert_eq!(
        lex_all("a.c")?,
        vec![Token::Char('a'), Token::Any, Token::Char('c')]
    );
    assert_eq!(
        lex_all("^$|")?,
        vec![Token::Caret, Token::Dollar, Token::Alt]
    );
    assert_eq!(
        lex_all("()")?,
        vec![Token::Open(Group::Capture), Token::Close]
    );
    assert_eq!(lex_all("[")?, vec![Token::OpenBracket]);
    assert_eq!(lex_all("é")?, vec![Token::Char('é')]);
    assert_eq!(lex_all("")?, vec![]);
    Ok(())
}

#[test]
fn test_repeat_tokens_lexer() -> Result<()> {
    assert_eq!(
        lex_all("*")?,
        vec![repeat(0, UpperBound::Infinite, true, false)]
    );
    assert_eq!(
        lex_all("+?")?,
        vec![repeat(1, UpperBound::Infinite, false, false)]
    );
    assert_eq!(
        lex_all("?+")?,
        vec![repeat(0, UpperBound::Finite(1), true, true)]
    );
    assert_eq!(
        lex_all("{2,3}")?,
        vec![repeat(2, UpperBound::Finite(3), true, false)]
    );
    assert_eq!(
        lex_all("{,3}")?,
        vec![repeat(0, UpperBound::Finite(3), true, false)]
    );
    assert_eq!(
        lex_all("{2,}?")?,
        vec![repeat(2, UpperBound::Infinite, false, false)]
    );
    // Intervals have no possessive form, so the `+` is a repeat of its own.
    assert_eq!(
        lex_all("{2}+")?,
        vec![
            repeat(2, UpperBound::Finite(2), true, false),
            repeat(1, UpperBound::Infinite, true, false)
        ]
    );
    Ok(())
}

#[test]
fn test_braces_without_interval_are_literal() -> Result<()> {
    assert_eq!(
        lex_all("{a}")?,
        vec![Token::Char('{'), Token::Char('a'), Token::Char('}')]
    );
    assert_eq!(
        lex_all("{,}")?,
        vec![Token::Char('{'), Token::Char(','), Token::Char('}')]
    );
    assert_eq!(
        lex_all("{1")?,
        vec![Token::Char('{'), Token::Char('1')]
    );
    Ok(())
}

#[test]
fn test_group_tokens_lexer() -> Result<()> {
    assert_eq!(lex_all("(?:")?, vec![Token::Open(Group::NonCapture)]);
    assert_eq!(
        lex_all("(?<name>")?,
        vec![Token::Open(Group::Named("name".to_owned()))]
    );
    assert_eq!(
        lex_all("(?'n'")?,
        vec![Token::Open(Group::Named("n".to_owned()))]
    );
    assert_eq!(
        lex_all("(?=(?!(?<=(?<!(?>(?~")?,
        vec![
            Token::Open(Group::LookAhead),
            Token::Open(Group::LookAheadInvert),
            Token::Open(Group::LookBehind),
            Token::Open(Group::LookBehindInvert),
            Token::Open(Group::Atomic),
            Token::Open(Group::Absent),
        ]
    );
    assert_eq!(
        lex_all("(?(1)")?,
        vec![Token::Open(Group::Condition(Reference::Absolute(1)))]
    );
    assert_eq!(
        lex_all("(?(<n>)")?,
        vec![Token::Open(Group::Condition(Reference::Name(
            "n".to_owned()
        )))]
    );
    Ok(())
}

#[test]
fn test_option_groups_lexer() -> Result<()> {
    assert_eq!(
        lex_all("(?i-m)")?,
        vec![Token::Open(Group::Options {
            on: Options::IGNORECASE,
            off: Options::MULTILINE,
            scoped: false,
        })]
    );
    assert_eq!(
        lex_all("(?x:")?,
        vec![Token::Open(Group::Options {
            on: Options::EXTEND,
            off: Options::NONE,
            scoped: true,
        })]
    );
    assert_eq!(
        lex_all("(?mi)")?,
        vec![Token::Open(Group::Options {
            on: Options::IGNORECASE | Options::MULTILINE,
            off: Options::NONE,
            scoped: false,
        })]
    );
    Ok(())
}

#[test]
fn test_comment_groups_are_skipped() -> Result<()> {
    assert_eq!(lex_all("(?#comment)a")?, vec![Token::Char('a')]);
    assert_eq!(lex_all("(?#\\))b")?, vec![Token::Char('b')]);
    Ok(())
}

#[test]
fn test_char_escapes_lexer() -> Result<()> {
    assert_eq!(
        lex_all("\\t\\n\\x41\\u0042\\x{43}\\cA\\.")?,
        vec![
            Token::Char('\t'),
            Token::Char('\n'),
            Token::Char('A'),
            Token::Char('B'),
            Token::Char('C'),
            Token::Char('\x01'),
            Token::Char('.'),
        ]
    );
    assert_eq!(lex_all("\\0")?, vec![Token::Char('\0')]);
    assert_eq!(lex_all("\\012")?, vec![Token::Char('\n')]);
    assert_eq!(lex_all("\\M-a")?, vec![Token::Char('\u{e1}')]);
    Ok(())
}

#[test]
fn test_numbered_escapes_lexer() -> Result<()> {
    assert_eq!(
        lex_all("\\1\\8")?,
        vec![
            Token::Backref(Reference::Absolute(1)),
            Token::Backref(Reference::Absolute(8))
        ]
    );
    // No group 101, so this is octal 101.
    assert_eq!(lex_all("\\101")?, vec![Token::Char('A')]);
    assert_eq!(lex_all("\\12")?, vec![Token::Char('\n')]);
    // 8 is not an octal digit.
    assert_eq!(
        lex_all("\\81")?,
        vec![Token::Char('8'), Token::Char('1')]
    );

    let mut lexer = Lexer::new("\\12");
    lexer.set_capture_count(12);
    assert_eq!(
        lexer.next_token()?.map(|token| token.token),
        Some(Token::Backref(Reference::Absolute(12)))
    );
    Ok(())
}

#[test]
fn test_class_escapes_lexer() -> Result<()> {
    assert_eq!(
        lex_all("\\d\\S")?,
        vec![
            Token::Class {
                set: CharSet::digit(),
                inverted: false
            },
            Token::Class {
                set: CharSet::space(),
                inverted: true
            },
        ]
    );
    assert_eq!(
        lex_all("\\w\\W")?,
        vec![
            Token::Word { inverted: false },
            Token::Word { inverted: true }
        ]
    );
    assert_eq!(
        lex_all("\\p{^Digit}\\P{^digit}")?,
        vec![
            Token::Class {
                set: CharSet::digit(),
                inverted: true
            },
            Token::Class {
                set: CharSet::digit(),
                inverted: false
            },
        ]
    );
    assert_eq!(
        lex_all("\\R\\X")?,
        vec![Token::Linebreak, Token::GraphemeCluster]
    );
    Ok(())
}

#[test]
fn test_anchor_escapes_lexer() -> Result<()> {
    assert_eq!(
        lex_all("\\A\\z\\Z\\b\\B\\G\\K")?,
        vec![
            Token::Anchor(Anchor::BufferBegin),
            Token::Anchor(Anchor::BufferEnd),
            Token::Anchor(Anchor::SemiEnd),
            Token::Anchor(Anchor::WordBoundary),
            Token::Anchor(Anchor::WordBoundaryInvert),
            Token::Anchor(Anchor::PositionBegin),
            Token::Anchor(Anchor::Keep),
        ]
    );
    Ok(())
}

#[test]
fn test_reference_escapes_lexer() -> Result<()> {
    assert_eq!(
        lex_all("\\k<name>\\k<-1>\\k'2'")?,
        vec![
            Token::Backref(Reference::Name("name".to_owned())),
            Token::Backref(Reference::Relative(-1)),
            Token::Backref(Reference::Absolute(2)),
        ]
    );
    assert_eq!(
        lex_all("\\g<+2>\\g'name'\\g<0>")?,
        vec![
            Token::Call(Reference::Relative(2)),
            Token::Call(Reference::Name("name".to_owned())),
            Token::Call(Reference::Absolute(0)),
        ]
    );
    // Without a bracket these are plain letters.
    assert_eq!(
        lex_all("\\k\\g")?,
        vec![Token::Char('k'), Token::Char('g')]
    );
    Ok(())
}

#[test]
fn test_extended_mode_skips_space_and_comments() -> Result<()> {
    let mut lexer = Lexer::new("a b # c\n d");
    lexer.set_extended(true);
    let tokens = lexer
        .map(|token| token.map(|token| token.token))
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(
        tokens,
        vec![Token::Char('a'), Token::Char('b'), Token::Char('d')]
    );
    Ok(())
}

#[test]
fn test_token_positions() -> Result<()> {
    let positions = Lexer::new("a(?:bé)\\d")
        .map(|token| token.map(|token| token.pos))
        .collect::<Result<Vec<_>>>()?;
    assert_eq!(positions, vec![0, 1, 4, 5, 7, 8]);

    let mut lexer = Lexer::new("ab");
    assert!(lexer.peek()?.is_some());
    assert_eq!(lexer.tell(), 0);
    lexer.next_token()?;
    assert_eq!(lexer.tell(), 1);
    Ok(())
}

#[test]
fn test_class_tokens_lexer() -> Result<()> {
    assert_eq!(
        lex_class("a-z]")?,
        vec![
            ClassToken::Char('a'),
            ClassToken::Hyphen,
            ClassToken::Char('z'),
            ClassToken::Close
        ]
    );
    assert_eq!(
        lex_class("[:alpha:]")?,
        vec![ClassToken::Set(CharSet::posix("alpha").unwrap())]
    );

    let mut not_digit = CharSet::digit();
    not_digit.invert();
    assert_eq!(
        lex_class("[:^digit:]\\D")?,
        vec![ClassToken::Set(not_digit.clone()), ClassToken::Set(not_digit)]
    );
    assert_eq!(
        lex_class("[a&&\\b")?,
        vec![
            ClassToken::Open,
            ClassToken::Char('a'),
            ClassToken::And,
            ClassToken::Char('\x08')
        ]
    );
    // Not shaped like a POSIX bracket.
    assert_eq!(
        lex_class("[:a")?,
        vec![ClassToken::Open, ClassToken::Char(':'), ClassToken::Char('a')]
    );
    Ok(())
}

#[test]
fn test_close_bracket_lookahead() {
    assert!(Lexer::new("a]").has_close_bracket());
    assert!(!Lexer::new("a\\]").has_close_bracket());
    assert!(!Lexer::new("abc").has_close_bracket());
}

#[test]
fn test_lexer_throw_errors() {
    assert_eq!(syntax_error("\\"), (0, SyntaxError::EndPatternAtEscape));
    assert_eq!(syntax_error("a{3,2}"), (1, SyntaxError::UpperSmallerThanLower));
    assert_eq!(syntax_error("a{100001}"), (2, SyntaxError::TooBigRepeatRange));
    assert_eq!(syntax_error("(?<>)"), (0, SyntaxError::EmptyGroupName));
    assert_eq!(syntax_error("(?z)"), (0, SyntaxError::UndefinedGroupOption));
    assert_eq!(syntax_error("(?"), (0, SyntaxError::EndPatternInGroup));
    assert_eq!(syntax_error("(?#abc"), (0, SyntaxError::EndPatternInGroup));
    assert_eq!(syntax_error("(?(x)"), (0, SyntaxError::InvalidConditionPattern));
    assert_eq!(syntax_error("\\xg"), (0, SyntaxError::InvalidHexEscape));
    assert_eq!(syntax_error("\\u12"), (0, SyntaxError::InvalidUnicodeEscape));
    assert_eq!(syntax_error("\\x{110000}"), (0, SyntaxError::InvalidCodePoint));
    assert_eq!(syntax_error("\\c"), (0, SyntaxError::EndPatternAtControl));
    assert_eq!(syntax_error("\\Ca"), (0, SyntaxError::InvalidControlCode));
    assert_eq!(syntax_error("\\Ma"), (0, SyntaxError::InvalidMetaCode));
    assert_eq!(syntax_error("\\M-"), (0, SyntaxError::EndPatternAtMeta));
    assert_eq!(
        syntax_error("x\\p{Foo}"),
        (1, SyntaxError::InvalidCharPropertyName("Foo".to_owned()))
    );
    assert_eq!(
        syntax_error("(?<1a>"),
        (0, SyntaxError::InvalidGroupName("1a".to_owned()))
    );
    assert_eq!(
        syntax_error("\\k<1a>"),
        (0, SyntaxError::InvalidGroupName("1a".to_owned()))
    );
    assert!(matches!(
        lex_class("[:foo:]"),
        Err(Error::Syntax {
            kind: SyntaxError::InvalidPosixBracketType,
            ..
        })
    ));
}
