//! Two-digit code derivation.
//!
//! Pure text manipulation over the scraped decimal strings:
//!
//! - digit A = last digit of the **fractional** part of the index value
//!   (or of the whole string when there is no decimal point)
//! - digit B = last digit of the **integral** part of the traded value
//!
//! Grouping commas and surrounding whitespace are removed first. Nothing is
//! ever parsed to a float: `"1278.50"` must yield `0`, not `5`.

use std::fmt;

use crate::snapshot::DerivedCode;

/// Which scraped field a derivation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteField {
    IndexValue,
    TradedValue,
}

impl fmt::Display for QuoteField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QuoteField::IndexValue => "index_value",
            QuoteField::TradedValue => "traded_value",
        })
    }
}

/// Which slice of the number the digit was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberPart {
    Integral,
    Fractional,
    Whole,
}

impl fmt::Display for NumberPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumberPart::Integral => "integral",
            NumberPart::Fractional => "fractional",
            NumberPart::Whole => "whole",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DerivationError {
    #[error("{field}: {part} part is empty")]
    EmptyPart { field: QuoteField, part: NumberPart },
    #[error("{field}: {part} part contains no digit")]
    NoDigit { field: QuoteField, part: NumberPart },
}

/// Derive the two-digit code from the raw index and traded-value strings.
pub fn derive(index_value: &str, traded_value: &str) -> Result<DerivedCode, DerivationError> {
    let index = strip_separators(index_value);
    let (part, which) = match index.split_once('.') {
        Some((_, frac)) => (frac, NumberPart::Fractional),
        None => (index.as_str(), NumberPart::Whole),
    };
    let a = last_digit(part, QuoteField::IndexValue, which)?;

    let traded = strip_separators(traded_value);
    let (part, which) = match traded.split_once('.') {
        Some((int, _)) => (int, NumberPart::Integral),
        None => (traded.as_str(), NumberPart::Whole),
    };
    let b = last_digit(part, QuoteField::TradedValue, which)?;

    Ok(DerivedCode::from_digits(a, b))
}

fn strip_separators(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != ',').collect()
}

/// Last ASCII digit in `part`; stray markers such as `*` or `M` are skipped.
fn last_digit(part: &str, field: QuoteField, which: NumberPart) -> Result<char, DerivationError> {
    if part.is_empty() {
        return Err(DerivationError::EmptyPart { field, part: which });
    }
    part.chars()
        .rev()
        .find(char::is_ascii_digit)
        .ok_or(DerivationError::NoDigit { field, part: which })
}
