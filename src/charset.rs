//! Codepoint sets for character classes.

/// The largest Unicode scalar value.
pub const MAX_CODEPOINT: u32 = 0x10_FFFF;

/// The error type used by [`CharSet`].
#[derive(Debug, Eq, thiserror::Error, PartialEq)]
pub enum Error {
    /// An invalid range was given.
    #[error("invalid range ({0:#x} > {1:#x})")]
    Range(u32, u32),
}

/// A set of codepoints, kept as sorted, non-overlapping, non-adjacent
/// inclusive ranges.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct CharSet {
    ranges: Vec<(u32, u32)>,
}

impl CharSet {
    /// Creates a new empty character set.
    #[must_use]
    pub const fn new() -> Self {
        CharSet { ranges: Vec::new() }
    }

    /// Builds a set from alternating on/off boundaries, e.g.
    /// `[b'0', b'9' + 1]` for the digits.
    fn from_boundaries(boundaries: &[u8]) -> Self {
        debug_assert!(boundaries.len() % 2 == 0);
        CharSet {
            ranges: boundaries
                .chunks_exact(2)
                .map(|pair| (u32::from(pair[0]), u32::from(pair[1]) - 1))
                .collect(),
        }
    }

    /// `\d`
    #[must_use]
    pub fn digit() -> Self {
        Self::from_boundaries(&[b'0', b'9' + 1])
    }

    /// `\s`
    #[must_use]
    pub fn space() -> Self {
        Self::from_boundaries(&[b'\t', b'\r' + 1, b' ', b' ' + 1])
    }

    /// `\h`
    #[must_use]
    pub fn hex_digit() -> Self {
        Self::from_boundaries(&[b'0', b'9' + 1, b'A', b'F' + 1, b'a', b'f' + 1])
    }

    /// `\w`
    #[must_use]
    pub fn word() -> Self {
        Self::from_boundaries(&[b'0', b'9' + 1, b'A', b'Z' + 1, b'_', b'_' + 1, b'a', b'z' + 1])
    }

    /// Returns the set for a POSIX bracket or property name such as `alpha`.
    /// Names are matched case-insensitively. Every set is ASCII.
    #[must_use]
    pub fn posix(name: &str) -> Option<Self> {
        let set = match name.to_ascii_lowercase().as_str() {
            "alnum" => Self::from_boundaries(&[b'0', b'9' + 1, b'A', b'Z' + 1, b'a', b'z' + 1]),
            "alpha" => Self::from_boundaries(&[b'A', b'Z' + 1, b'a', b'z' + 1]),
            "ascii" => Self::from_boundaries(&[0x00, 0x7f + 1]),
            "blank" => Self::from_boundaries(&[b'\t', b'\t' + 1, b' ', b' ' + 1]),
            "cntrl" => Self::from_boundaries(&[0x00, 0x1f + 1, 0x7f, 0x7f + 1]),
            "digit" => Self::digit(),
            "graph" => Self::from_boundaries(&[0x21, 0x7e + 1]),
            "lower" => Self::from_boundaries(&[b'a', b'z' + 1]),
            "print" => Self::from_boundaries(&[0x20, 0x7e + 1]),
            "punct" => Self::from_boundaries(&[
                b'!',
                b'/' + 1,
                b':',
                b'@' + 1,
                b'[',
                b'`' + 1,
                b'{',
                b'~' + 1,
            ]),
            "space" => Self::space(),
            "upper" => Self::from_boundaries(&[b'A', b'Z' + 1]),
            "xdigit" => Self::hex_digit(),
            "word" => Self::word(),
            _ => return None,
        };
        Some(set)
    }

    /// Adds the given codepoint to the character set.
    pub fn add_char(&mut self, c: u32) {
        self.insert(c, c);
    }

    /// Adds a range of codepoints to the character set.
    ///
    /// # Errors
    ///
    /// If the start of the range is after the end of the range, an [`Error`]
    /// is returned.
    pub fn add_range(&mut self, start: u32, end: u32) -> Result<(), Error> {
        if start <= end {
            self.insert(start, end);
            Ok(())
        } else {
            Err(Error::Range(start, end))
        }
    }

    /// Adds every codepoint of `other`.
    pub fn add_set(&mut self, other: &CharSet) {
        for &(start, end) in &other.ranges {
            self.insert(start, end);
        }
    }

    fn insert(&mut self, start: u32, end: u32) {
        let at = self.ranges.partition_point(|&(_, high)| high.saturating_add(1) < start);
        let mut low = start;
        let mut high = end;
        let mut last = at;
        while let Some(&(s, e)) = self.ranges.get(last) {
            if s > high.saturating_add(1) {
                break;
            }
            low = low.min(s);
            high = high.max(e);
            last += 1;
        }
        self.ranges.splice(at..last, [(low, high)]);
    }

    /// Keeps only the codepoints that are also in `other`.
    pub fn intersect(&mut self, other: &CharSet) {
        let mut result = Vec::new();
        let (mut i, mut j) = (0, 0);
        while let (Some(&(a_low, a_high)), Some(&(b_low, b_high))) =
            (self.ranges.get(i), other.ranges.get(j))
        {
            let low = a_low.max(b_low);
            let high = a_high.min(b_high);
            if low <= high {
                result.push((low, high));
            }
            if a_high < b_high {
                i += 1;
            } else {
                j += 1;
            }
        }
        self.ranges = result;
    }

    /// Inverts the character set over `0..=MAX_CODEPOINT`.
    pub fn invert(&mut self) {
        let mut result = Vec::with_capacity(self.ranges.len() + 1);
        let mut next = 0;
        for &(low, high) in &self.ranges {
            if low > next {
                result.push((next, low - 1));
            }
            next = high + 1;
        }
        if next <= MAX_CODEPOINT {
            result.push((next, MAX_CODEPOINT));
        }
        self.ranges = result;
    }

    /// Adds the other-case counterpart of every ASCII letter in the set.
    pub fn fold_ascii_case(&mut self) {
        let mut folded = CharSet::new();
        for &(low, high) in &self.ranges {
            for (from, to) in [(b'A', b'a'), (b'a', b'A')] {
                let (from, to) = (u32::from(from), u32::from(to));
                let start = low.max(from);
                let end = high.min(from + 25);
                if start <= end {
                    folded.insert(start - from + to, end - from + to);
                }
            }
        }
        self.add_set(&folded);
    }

    /// Returns `true` if the character set contains the given codepoint.
    #[must_use]
    pub fn contains(&self, c: u32) -> bool {
        let at = self.ranges.partition_point(|&(_, high)| high < c);
        self.ranges.get(at).is_some_and(|&(low, _)| low <= c)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// The inclusive ranges of the set, in ascending order.
    #[must_use]
    pub fn ranges(&self) -> &[(u32, u32)] {
        &self.ranges
    }

    #[must_use]
    pub fn into_ranges(self) -> Vec<(u32, u32)> {
        self.ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ranges: &[(u32, u32)]) -> CharSet {
        let mut set = CharSet::new();
        for &(low, high) in ranges {
            set.add_range(low, high).unwrap();
        }
        set
    }

    #[test]
    fn ranges_are_merged() {
        assert_eq!(set(&[(5, 9), (1, 2), (3, 4)]).ranges(), &[(1, 9)]);
        assert_eq!(set(&[(1, 2), (10, 12), (4, 11)]).ranges(), &[(1, 2), (4, 12)]);
        assert_eq!(set(&[(1, 1), (1, 1)]).ranges(), &[(1, 1)]);
        assert_eq!(set(&[(10, 20), (1, 3)]).ranges(), &[(1, 3), (10, 20)]);
    }

    #[test]
    fn invalid_range() {
        assert_eq!(CharSet::new().add_range(9, 1), Err(Error::Range(9, 1)));
    }

    #[test]
    fn invert_round_trips() {
        let mut s = set(&[(0, 4), (10, 20)]);
        s.invert();
        assert_eq!(s.ranges(), &[(5, 9), (21, MAX_CODEPOINT)]);
        s.invert();
        assert_eq!(s.ranges(), &[(0, 4), (10, 20)]);
    }

    #[test]
    fn intersection() {
        let mut s = set(&[(u32::from(b'a'), u32::from(b'z'))]);
        let mut vowels = CharSet::new();
        for c in "aeiou".chars() {
            vowels.add_char(c.into());
        }
        vowels.invert();
        s.intersect(&vowels);
        assert!(s.contains('b'.into()));
        assert!(!s.contains('e'.into()));
        assert_eq!(s.ranges().len(), 5);
    }

    #[test]
    fn posix_classes() {
        assert_eq!(CharSet::posix("digit"), Some(CharSet::digit()));
        assert_eq!(CharSet::posix("Alpha").unwrap().ranges(), &[(65, 90), (97, 122)]);
        assert_eq!(CharSet::posix("print").unwrap().ranges(), &[(0x20, 0x7e)]);
        assert_eq!(CharSet::posix("nope"), None);
    }

    #[test]
    fn ascii_case_folding() {
        let mut s = set(&[(u32::from(b'x'), u32::from(b'}'))]);
        s.fold_ascii_case();
        assert_eq!(s.ranges(), &[(88, 90), (120, 125)]);
    }
}
