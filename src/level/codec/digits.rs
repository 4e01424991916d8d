//! Base-100 digits, length indicators and fixed-width numbers
//!
//! Every number in a level string is written with an alphabet of 100 symbols.
//! Length indicators are self-describing: a non-zero digit is the value itself,
//! while digit 0 escapes to "a length indicator saying how many digits follow".

use crate::level::LevelError;

pub const BASE: u64 = 100;
/// Digit reserved as the length-indicator escape
pub const ESCAPE: u32 = 0;
/// Nested escapes deeper than this cannot describe a value that fits in u64
const MAX_ESCAPE_DEPTH: usize = 3;

/// An ordered set of 100 symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alphabet(&'static str);

/// Symbols of formats 4 and 5
pub const MODERN: Alphabet = Alphabet(
    "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+,-./:;<=>?@[]^_{|}~'\"`\\¡¢£¤¥¦",
);

/// Symbols of formats 1 to 3
pub const LEGACY: Alphabet = Alphabet(
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!#$%&()*+,-./:;<=>?@[]^_{|}~'\"`\\¡¢£¤¥¦",
);

impl Alphabet {
    pub fn symbol(self, digit: u32) -> char {
        self.0.chars().nth(digit as usize).unwrap_or('?')
    }

    pub fn digit(self, symbol: char) -> Option<u32> {
        self.0.chars().position(|c| c == symbol).map(|p| p as u32)
    }

    pub fn symbols(self) -> impl Iterator<Item = char> {
        self.0.chars()
    }
}

/// Digits (most significant first) of `value` in base 100; zero is `[0]`
pub fn base100(mut value: u64) -> Vec<u32> {
    let mut digits = vec![(value % BASE) as u32];
    value /= BASE;
    while value > 0 {
        digits.push((value % BASE) as u32);
        value /= BASE;
    }
    digits.reverse();
    digits
}

/// Fewest base-100 digits that can hold `max`
pub fn width_for(max: u64) -> usize {
    base100(max).len()
}

/// Signed to unsigned interleaving: 0, -1, 1, -2, 2 ...
pub fn zigzag(v: i32) -> u64 {
    let v = v as i64;
    if v >= 0 { (v as u64) * 2 } else { (-v as u64) * 2 - 1 }
}

pub fn unzigzag(z: u64) -> Option<i32> {
    let v = if z % 2 == 0 { (z / 2) as i64 } else { -(((z + 1) / 2) as i64) };
    i32::try_from(v).ok()
}

/// Appends symbols to a level string
pub struct Writer {
    alphabet: Alphabet,
    out: String,
}

impl Writer {
    pub fn new(alphabet: Alphabet) -> Self {
        Self {
            alphabet,
            out: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn raw(&mut self, c: char) {
        self.out.push(c);
    }

    pub fn digit(&mut self, d: u32) {
        debug_assert!((d as u64) < BASE);
        self.out.push(self.alphabet.symbol(d));
    }

    /// `value` as exactly `width` digits; callers size the width
    pub fn number(&mut self, value: u64, width: usize) {
        let digits = base100(value);
        debug_assert!(digits.len() <= width || (value == 0 && width == 0));
        for _ in digits.len()..width {
            self.digit(0);
        }
        if width > 0 {
            for d in digits.iter().skip(digits.len().saturating_sub(width)) {
                self.digit(*d);
            }
        }
    }

    /// Self-describing variable-width integer
    pub fn length(&mut self, value: u64) {
        if (1..BASE).contains(&value) {
            self.digit(value as u32);
            return;
        }
        let digits = base100(value);
        self.digit(ESCAPE);
        self.length(digits.len() as u64);
        for d in digits {
            self.digit(d);
        }
    }

    /// Length-prefixed characters written verbatim
    pub fn text(&mut self, s: &str) {
        self.length(s.chars().count() as u64);
        self.out.push_str(s);
    }
}

/// Consumes symbols from a level string; every failure is a corrupt payload
pub struct Reader {
    chars: Vec<char>,
    pos: usize,
    alphabet: Alphabet,
}

impl Reader {
    pub fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            alphabet: MODERN,
        }
    }

    pub fn set_alphabet(&mut self, alphabet: Alphabet) {
        self.alphabet = alphabet;
    }

    pub fn offset(&self) -> usize {
        self.pos
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn corrupt(&self, reason: &'static str) -> LevelError {
        LevelError::corrupt(self.pos, reason)
    }

    pub fn raw(&mut self) -> Result<char, LevelError> {
        let c = self.peek().ok_or_else(|| self.corrupt("unexpected end of data"))?;
        self.pos += 1;
        Ok(c)
    }

    pub fn digit(&mut self) -> Result<u32, LevelError> {
        let c = self.raw()?;
        self.alphabet
            .digit(c)
            .ok_or_else(|| LevelError::corrupt(self.pos - 1, "symbol outside the alphabet"))
    }

    /// Digit that must be below `limit`
    pub fn digit_below(&mut self, limit: u32, reason: &'static str) -> Result<u32, LevelError> {
        let d = self.digit()?;
        if d < limit {
            Ok(d)
        } else {
            Err(LevelError::corrupt(self.pos - 1, reason))
        }
    }

    pub fn number(&mut self, width: usize) -> Result<u64, LevelError> {
        let mut value: u64 = 0;
        for _ in 0..width {
            let d = self.digit()? as u64;
            value = value
                .checked_mul(BASE)
                .and_then(|v| v.checked_add(d))
                .ok_or_else(|| self.corrupt("number overflows"))?;
        }
        Ok(value)
    }

    pub fn length(&mut self) -> Result<u64, LevelError> {
        self.length_at(0)
    }

    fn length_at(&mut self, depth: usize) -> Result<u64, LevelError> {
        let d = self.digit()?;
        if d != ESCAPE {
            return Ok(d as u64);
        }
        if depth >= MAX_ESCAPE_DEPTH {
            return Err(self.corrupt("length escapes nested too deeply"));
        }
        let width = self.length_at(depth + 1)?;
        let width = usize::try_from(width).map_err(|_| self.corrupt("length too wide"))?;
        self.number(width)
    }

    /// A length indicator used as a count or index
    pub fn count(&mut self) -> Result<usize, LevelError> {
        let n = self.length()?;
        // Each counted item takes at least one symbol
        if n > self.chars.len() as u64 {
            return Err(self.corrupt("count exceeds remaining data"));
        }
        Ok(n as usize)
    }

    /// Exactly `n` verbatim characters
    pub fn chars(&mut self, n: usize) -> Result<String, LevelError> {
        if self.pos + n > self.chars.len() {
            return Err(self.corrupt("text runs past end of data"));
        }
        let s: String = self.chars[self.pos..self.pos + n].iter().collect();
        self.pos += n;
        Ok(s)
    }

    pub fn text(&mut self) -> Result<String, LevelError> {
        let n = self.count()?;
        self.chars(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn alphabets_hold_one_hundred_distinct_symbols() {
        for alphabet in [MODERN, LEGACY] {
            let set: HashSet<char> = alphabet.symbols().collect();
            assert_eq!(alphabet.symbols().count(), 100);
            assert_eq!(set.len(), 100);
            assert!(!set.contains(&'\n'));
        }
    }

    #[test]
    fn small_lengths_take_one_symbol() {
        let mut w = Writer::new(MODERN);
        w.length(5);
        w.length(99);
        assert_eq!(w.finish(), "5¦");
    }

    #[test]
    fn zero_and_large_lengths_escape() {
        let mut w = Writer::new(MODERN);
        w.length(0);
        assert_eq!(w.finish(), "010");

        let mut w = Writer::new(MODERN);
        w.length(12_345);
        // escape, 3 digits, then 01 23 45
        assert_eq!(w.finish(), "031Nj");

        for value in [0, 1, 99, 100, 12_345, 1_000_000, u64::MAX] {
            let mut w = Writer::new(MODERN);
            w.length(value);
            let text = w.finish();
            let mut r = Reader::new(&text);
            assert_eq!(r.length().unwrap(), value, "{text}");
            assert!(r.at_end());
        }
    }

    #[test]
    fn fixed_width_numbers_pad_with_zero_digits() {
        let mut w = Writer::new(MODERN);
        w.number(7, 3);
        w.number(0, 0);
        assert_eq!(w.finish(), "007");
        assert_eq!(width_for(0), 1);
        assert_eq!(width_for(99), 1);
        assert_eq!(width_for(100), 2);
    }

    #[test]
    fn zigzag_interleaves_signs() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(-1), 1);
        assert_eq!(zigzag(1), 2);
        assert_eq!(zigzag(-2), 3);
        for v in [0, 1, -1, 49, -50, i32::MAX, i32::MIN] {
            assert_eq!(unzigzag(zigzag(v)), Some(v));
        }
    }

    #[test]
    fn reader_reports_truncation_as_corrupt() {
        let mut r = Reader::new("0");
        assert!(matches!(r.length(), Err(LevelError::Corrupt { .. })));
        let mut r = Reader::new("\u{263A}");
        assert!(matches!(r.digit(), Err(LevelError::Corrupt { offset: 0, .. })));
        let mut r = Reader::new("0000000");
        assert!(matches!(r.length(), Err(LevelError::Corrupt { .. })));
    }
}
