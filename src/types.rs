//! Common types used throughout cursor-pages
//!
//! Cursors, page number coercion and the reasons a page can be out of range.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Cursor
// ============================================================================

/// Opaque continuation token handed out by an object source.
///
/// A cursor is only valid for resuming a fetch at the position where it was
/// captured. The paginator never inspects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a raw token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

// ============================================================================
// Out Of Range
// ============================================================================

/// Why a page number was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutOfRange {
    /// The number was zero or negative
    LessThanOne,
    /// The page holds no items after filtering
    NoResults,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutOfRange::LessThanOne => f.write_str("page number is less than 1"),
            OutOfRange::NoResults => f.write_str("that page contains no results"),
        }
    }
}

// ============================================================================
// Page Number Coercion
// ============================================================================

/// Anything that can be turned into a validated 1-based page number.
///
/// Integers are checked for being at least 1. Strings are trimmed and parsed
/// as a decimal integer first, so `"3"` works and `"x"` or `"1.5"` fail with
/// [`Error::InvalidPageNumber`].
pub trait IntoPageNumber {
    /// Validate and convert
    fn into_page_number(self) -> Result<u64>;
}

fn check_signed(number: i64) -> Result<u64> {
    if number < 1 {
        return Err(Error::out_of_range(number, OutOfRange::LessThanOne));
    }
    Ok(number as u64)
}

macro_rules! signed_page_number {
    ($($ty:ty),*) => {
        $(
            impl IntoPageNumber for $ty {
                fn into_page_number(self) -> Result<u64> {
                    check_signed(i64::from(self))
                }
            }
        )*
    };
}

macro_rules! unsigned_page_number {
    ($($ty:ty),*) => {
        $(
            impl IntoPageNumber for $ty {
                fn into_page_number(self) -> Result<u64> {
                    if self == 0 {
                        return Err(Error::out_of_range(0, OutOfRange::LessThanOne));
                    }
                    u64::try_from(self).map_err(|_| Error::invalid_page(self.to_string()))
                }
            }
        )*
    };
}

signed_page_number!(i8, i16, i32, i64);
unsigned_page_number!(u8, u16, u32, u64, usize);

impl IntoPageNumber for &str {
    fn into_page_number(self) -> Result<u64> {
        let number: i64 = self
            .trim()
            .parse()
            .map_err(|_| Error::invalid_page(self))?;
        check_signed(number)
    }
}

impl IntoPageNumber for String {
    fn into_page_number(self) -> Result<u64> {
        self.as_str().into_page_number()
    }
}

impl IntoPageNumber for &String {
    fn into_page_number(self) -> Result<u64> {
        self.as_str().into_page_number()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1 => 1; "one")]
    #[test_case(42 => 42; "forty two")]
    fn test_signed_page_numbers(n: i64) -> u64 {
        n.into_page_number().unwrap()
    }

    #[test_case("1" => 1; "plain")]
    #[test_case(" 7 " => 7; "padded")]
    #[test_case("+3" => 3; "explicit sign")]
    fn test_string_page_numbers(s: &str) -> u64 {
        s.into_page_number().unwrap()
    }

    #[test_case("x"; "letters")]
    #[test_case(""; "empty")]
    #[test_case("1.5"; "decimal")]
    #[test_case("2 pages"; "trailing text")]
    fn test_invalid_page_numbers(s: &str) {
        let err = s.into_page_number().unwrap_err();
        assert!(matches!(err, Error::InvalidPageNumber { .. }));
    }

    #[test_case(0; "zero")]
    #[test_case(-1; "negative")]
    fn test_page_numbers_below_one(n: i32) {
        let err = n.into_page_number().unwrap_err();
        assert!(matches!(
            err,
            Error::PageOutOfRange {
                reason: OutOfRange::LessThanOne,
                ..
            }
        ));
    }

    #[test]
    fn test_unsigned_zero_rejected() {
        assert!(matches!(
            0usize.into_page_number(),
            Err(Error::PageOutOfRange { number: 0, .. })
        ));
        assert_eq!(5u32.into_page_number().unwrap(), 5);
    }

    #[test]
    fn test_negative_string_is_out_of_range() {
        let err = "-2".into_page_number().unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange { number: -2, .. }));
    }

    #[test]
    fn test_cursor_serializes_transparently() {
        let cursor = Cursor::new("abc");
        assert_eq!(serde_json::to_value(&cursor).unwrap(), "abc");
        let back: Cursor = serde_json::from_value(serde_json::json!("abc")).unwrap();
        assert_eq!(back, cursor);
        assert_eq!(cursor.to_string(), "abc");
    }
}
