//! A small document language for width-aware layout.
//!
//! A [`Doc`] is built from text, breakable lines, nesting and groups. When
//! rendered, each group is laid out flat if it fits in the remaining width and
//! otherwise has every line directly inside it broken. Nested groups decide
//! for themselves.

/// The default line width.
pub const DEFAULT_WIDTH: usize = 80;

/// A layout document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Doc {
    #[default]
    Nil,
    Text(String),
    /// A line break, or the given text when its group is laid out flat.
    Line(&'static str),
    Concat(Vec<Doc>),
    /// Indents lines broken inside the document by the given amount.
    Nest(usize, Box<Doc>),
    Group(Box<Doc>),
}

impl Doc {
    pub fn text(text: impl Into<String>) -> Self {
        Doc::Text(text.into())
    }

    /// A line that is a space when flat.
    #[must_use]
    pub const fn line() -> Self {
        Doc::Line(" ")
    }

    /// A line that is nothing when flat.
    #[must_use]
    pub const fn softline() -> Self {
        Doc::Line("")
    }

    #[must_use]
    pub fn concat(docs: Vec<Doc>) -> Self {
        Doc::Concat(docs)
    }

    #[must_use]
    pub fn nest(indent: usize, doc: Doc) -> Self {
        Doc::Nest(indent, Box::new(doc))
    }

    #[must_use]
    pub fn group(doc: Doc) -> Self {
        Doc::Group(Box::new(doc))
    }

    /// Joins `docs` with a `,` and a breakable space.
    #[must_use]
    pub fn comma_separated(docs: impl IntoIterator<Item = Doc>) -> Self {
        let mut parts = Vec::new();
        for doc in docs {
            if !parts.is_empty() {
                parts.push(Doc::text(","));
                parts.push(Doc::line());
            }
            parts.push(doc);
        }
        Doc::Concat(parts)
    }

    /// Lays the document out within `width` columns.
    #[must_use]
    pub fn render(&self, width: usize) -> String {
        let mut out = String::new();
        let mut column = 0;
        let mut stack = vec![Command {
            indent: 0,
            mode: Mode::Break,
            doc: self,
        }];

        while let Some(Command { indent, mode, doc }) = stack.pop() {
            match doc {
                Doc::Nil => {}
                Doc::Text(text) => {
                    out.push_str(text);
                    column += text.chars().count();
                }
                Doc::Line(flat) => match mode {
                    Mode::Flat => {
                        out.push_str(flat);
                        column += flat.len();
                    }
                    Mode::Break => {
                        out.push('\n');
                        out.extend(std::iter::repeat_n(' ', indent));
                        column = indent;
                    }
                },
                Doc::Concat(docs) => {
                    stack.extend(docs.iter().rev().map(|doc| Command { indent, mode, doc }));
                }
                Doc::Nest(by, doc) => stack.push(Command {
                    indent: indent + by,
                    mode,
                    doc,
                }),
                Doc::Group(doc) => {
                    let flat = Command {
                        indent,
                        mode: Mode::Flat,
                        doc,
                    };
                    let mode = if mode == Mode::Flat
                        || fits(flat, &stack, width.saturating_sub(column))
                    {
                        Mode::Flat
                    } else {
                        Mode::Break
                    };
                    stack.push(Command { indent, mode, doc });
                }
            }
        }

        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

#[derive(Debug, Clone, Copy)]
struct Command<'a> {
    indent: usize,
    mode: Mode,
    doc: &'a Doc,
}

/// Returns `true` if `next`, followed by whatever is on `rest` up to its
/// first broken line, takes no more than `width` columns.
fn fits(next: Command<'_>, rest: &[Command<'_>], mut width: usize) -> bool {
    let mut stack = vec![next];
    let mut rest = rest.iter().rev();

    loop {
        let Some(Command { indent, mode, doc }) = stack.pop().or_else(|| rest.next().copied())
        else {
            return true;
        };

        let used = match doc {
            Doc::Nil => 0,
            Doc::Text(text) => text.chars().count(),
            Doc::Line(flat) => match mode {
                Mode::Flat => flat.len(),
                Mode::Break => return true,
            },
            Doc::Concat(docs) => {
                stack.extend(docs.iter().rev().map(|doc| Command { indent, mode, doc }));
                0
            }
            Doc::Nest(by, doc) => {
                stack.push(Command {
                    indent: indent + by,
                    mode,
                    doc,
                });
                0
            }
            Doc::Group(doc) => {
                stack.push(Command { indent, mode, doc });
                0
            }
        };

        match width.checked_sub(used) {
            Some(remaining) => width = remaining,
            None => return false,
        }
    }
}
