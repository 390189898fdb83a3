//! Immutable JavaScript strings with several internal encodings.
//!
//! All encodings are indistinguishable from the outside: equality,
//! ordering and hashing are defined over UTF-16 code units.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::number::string_to_number;

/// A JavaScript string value.
///
/// - `Ascii` is the fast path for pure 7-bit content.
/// - `Unicode` stores UTF-16 code units, including lone surrogates.
/// - `Imported` holds text handed over by the host without re-encoding it.
///
/// # Examples
///
/// ```
/// use core_types::JsString;
///
/// let a = JsString::from("héllo");
/// let b = JsString::imported("héllo".to_string());
/// assert_eq!(a, b);
/// assert_eq!(a.len(), 5);
/// ```
#[derive(Clone)]
pub enum JsString {
    /// Pure ASCII content
    Ascii(Rc<str>),
    /// UTF-16 code units
    Unicode(Rc<[u16]>),
    /// Host-provided UTF-8 text
    Imported(Rc<str>),
}

/// Iterator over the UTF-16 code units of a [`JsString`].
pub enum CodeUnits<'a> {
    /// Bytes of an ASCII string
    Ascii(std::slice::Iter<'a, u8>),
    /// Stored code units
    Unicode(std::slice::Iter<'a, u16>),
    /// UTF-16 encoding of imported text
    Imported(std::str::EncodeUtf16<'a>),
}

impl Iterator for CodeUnits<'_> {
    type Item = u16;

    #[inline]
    fn next(&mut self) -> Option<u16> {
        match self {
            CodeUnits::Ascii(it) => it.next().map(|b| *b as u16),
            CodeUnits::Unicode(it) => it.next().copied(),
            CodeUnits::Imported(it) => it.next(),
        }
    }
}

impl JsString {
    /// The empty string.
    pub fn empty() -> Self {
        JsString::Ascii(Rc::from(""))
    }

    /// Wraps host text without converting it to UTF-16.
    pub fn imported(s: String) -> Self {
        JsString::Imported(Rc::from(s))
    }

    /// Builds a string from UTF-16 code units, picking the ASCII
    /// representation when possible.
    pub fn from_utf16(units: &[u16]) -> Self {
        if units.iter().all(|u| *u < 0x80) {
            let s: String = units.iter().map(|u| *u as u8 as char).collect();
            JsString::Ascii(Rc::from(s))
        } else {
            JsString::Unicode(Rc::from(units))
        }
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        match self {
            JsString::Ascii(s) => s.len(),
            JsString::Unicode(u) => u.len(),
            JsString::Imported(s) => s.encode_utf16().count(),
        }
    }

    /// Returns true if the string has no code units.
    pub fn is_empty(&self) -> bool {
        match self {
            JsString::Ascii(s) | JsString::Imported(s) => s.is_empty(),
            JsString::Unicode(u) => u.is_empty(),
        }
    }

    /// Number of bytes held by the current representation.
    pub fn payload_bytes(&self) -> usize {
        match self {
            JsString::Ascii(s) | JsString::Imported(s) => s.len(),
            JsString::Unicode(u) => u.len() * 2,
        }
    }

    /// True for the ASCII fast-path representation.
    pub fn is_ascii(&self) -> bool {
        matches!(self, JsString::Ascii(_))
    }

    /// Borrowed UTF-8 view when the representation already is UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsString::Ascii(s) | JsString::Imported(s) => Some(s),
            JsString::Unicode(_) => None,
        }
    }

    /// Iterates over UTF-16 code units.
    pub fn code_units(&self) -> CodeUnits<'_> {
        match self {
            JsString::Ascii(s) => CodeUnits::Ascii(s.as_bytes().iter()),
            JsString::Unicode(u) => CodeUnits::Unicode(u.iter()),
            JsString::Imported(s) => CodeUnits::Imported(s.encode_utf16()),
        }
    }

    /// Code unit at `index`, if in range.
    pub fn code_unit_at(&self, index: usize) -> Option<u16> {
        match self {
            JsString::Ascii(s) => s.as_bytes().get(index).map(|b| *b as u16),
            JsString::Unicode(u) => u.get(index).copied(),
            JsString::Imported(s) => s.encode_utf16().nth(index),
        }
    }

    /// Code units `start..end`, clamped to the string bounds.
    pub fn substring(&self, start: usize, end: usize) -> JsString {
        let len = self.len();
        let end = end.min(len);
        let start = start.min(end);
        match self {
            JsString::Ascii(s) => JsString::Ascii(Rc::from(&s[start..end])),
            _ => {
                let units: Vec<u16> = self.code_units().skip(start).take(end - start).collect();
                JsString::from_utf16(&units)
            }
        }
    }

    /// Concatenates two strings into a new one.
    pub fn concat(&self, other: &JsString) -> JsString {
        match (self, other) {
            (JsString::Ascii(a), JsString::Ascii(b)) => {
                let mut s = String::with_capacity(a.len() + b.len());
                s.push_str(a);
                s.push_str(b);
                JsString::Ascii(Rc::from(s))
            }
            _ => {
                let units: Vec<u16> = self.code_units().chain(other.code_units()).collect();
                JsString::from_utf16(&units)
            }
        }
    }

    /// `ToNumber` applied to this string.
    pub fn to_number(&self) -> f64 {
        match self.as_str() {
            Some(s) => string_to_number(s),
            None => string_to_number(&self.to_string()),
        }
    }

    /// Parses the string as a canonical array index (`"0"`, `"17"`, not `"01"`).
    /// Every representation of the same code units yields the same index.
    pub fn as_array_index(&self) -> Option<usize> {
        let mut units = self.code_units();
        let first = units.next()?;
        let mut index = u64::from(ascii_digit(first)?);
        if index == 0 {
            return units.next().is_none().then_some(0);
        }
        for unit in units {
            index = index * 10 + u64::from(ascii_digit(unit)?);
            if index >= u64::from(u32::MAX) {
                return None;
            }
        }
        usize::try_from(index).ok()
    }
}

fn ascii_digit(unit: u16) -> Option<u8> {
    u8::try_from(unit)
        .ok()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        if s.is_ascii() {
            JsString::Ascii(Rc::from(s))
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            JsString::Unicode(Rc::from(units))
        }
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString::from(s.as_str())
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_str(), other.as_str()) {
            (Some(a), Some(b)) => a == b,
            _ => self.code_units().eq(other.code_units()),
        }
    }
}

impl Eq for JsString {}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        match self.as_str() {
            Some(s) => s == other,
            None => self.code_units().eq(other.encode_utf16()),
        }
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0usize;
        for unit in self.code_units() {
            state.write_u16(unit);
            len += 1;
        }
        state.write_usize(len);
    }
}

impl PartialOrd for JsString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JsString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code_units().cmp(other.code_units())
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsString::Ascii(s) | JsString::Imported(s) => f.write_str(s),
            JsString::Unicode(u) => {
                for c in char::decode_utf16(u.iter().copied()) {
                    write!(f, "{}", c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}
