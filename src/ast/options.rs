use std::{fmt, ops};

/// A set of regex options, as toggled by `(?imx-imx)` groups.
///
/// Bit values are Onigmo's `ONIG_OPTION_*` constants, so the integer form
/// produced by [`Options::bits`] matches what the C engine reports.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Options(u32);

impl Options {
    pub const NONE: Self = Self(0);
    /// `i`
    pub const IGNORECASE: Self = Self(1);
    /// `x`
    pub const EXTEND: Self = Self(1 << 1);
    /// `m`. In Ruby syntax this makes `.` match a newline.
    pub const MULTILINE: Self = Self(1 << 2);
    /// `a`. `\w`, `\d`, `\s` and POSIX brackets are restricted to ASCII.
    pub const ASCII_RANGE: Self = Self(1 << 13);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Returns the option for a group option letter, if it is one.
    #[must_use]
    pub const fn from_flag(flag: char) -> Option<Self> {
        match flag {
            'i' => Some(Self::IGNORECASE),
            'x' => Some(Self::EXTEND),
            'm' => Some(Self::MULTILINE),
            'a' => Some(Self::ASCII_RANGE),
            _ => None,
        }
    }
}

impl ops::BitOr for Options {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl ops::BitOrAssign for Options {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Options, &str); 4] = [
            (Options::IGNORECASE, "IGNORECASE"),
            (Options::EXTEND, "EXTEND"),
            (Options::MULTILINE, "MULTILINE"),
            (Options::ASCII_RANGE, "ASCII_RANGE"),
        ];

        if self.is_empty() {
            return f.write_str("Options(NONE)");
        }

        f.write_str("Options(")?;
        let mut first = true;
        let mut rest = *self;
        for (option, name) in NAMES {
            if self.contains(option) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
                rest = rest.difference(option);
            }
        }
        if !rest.is_empty() {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "{:#x}", rest.0)?;
        }
        f.write_str(")")
    }
}
