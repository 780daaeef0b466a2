//! Exact parsing of Kubernetes resource quantities
//!
//! `Quantity` is a bare string in k8s-openapi, and one value has many
//! spellings ("1", "1000m", "1e3m"; "1Gi", "1024Mi"). Quantities are parsed
//! into `sign * mantissa * 10^exponent` with an integer mantissa, binary
//! suffixes folded in as exact powers of two, and trailing zeros normalized
//! away, so equal values compare equal without floating point.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use thiserror::Error;

/// Why a quantity string could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number in quantity '{0}'")]
    InvalidNumber(String),

    #[error("invalid suffix in quantity '{0}'")]
    InvalidSuffix(String),

    #[error("quantity '{0}' out of range")]
    Overflow(String),
}

/// A quantity in canonical form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParsedQuantity {
    negative: bool,
    mantissa: u128,
    exponent: i64,
}

enum Suffix {
    Binary(u32),
    Decimal(i64),
}

impl ParsedQuantity {
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        if input.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, rest) = match input.as_bytes()[0] {
            b'-' => (true, &input[1..]),
            b'+' => (false, &input[1..]),
            _ => (false, input),
        };

        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, suffix) = rest.split_at(number_len);

        let (integer, fraction) = number.split_once('.').unwrap_or((number, ""));
        if integer.is_empty() && fraction.is_empty() {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }
        if fraction.contains('.') {
            return Err(QuantityError::InvalidNumber(input.to_string()));
        }

        let overflow = || QuantityError::Overflow(input.to_string());

        // Zeros around the significant digits only move the exponent
        let digits: String = integer.chars().chain(fraction.chars()).collect();
        let without_trailing = digits.trim_end_matches('0');
        let significant = without_trailing.trim_start_matches('0');
        let trailing_zeros = i64::try_from(digits.len() - without_trailing.len()).map_err(|_| overflow())?;
        let fraction_len = i64::try_from(fraction.len()).map_err(|_| overflow())?;
        let mut exponent = trailing_zeros.checked_sub(fraction_len).ok_or_else(overflow)?;

        let mut mantissa: u128 = 0;
        for digit in significant.bytes() {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(digit - b'0')))
                .ok_or_else(overflow)?;
        }

        match parse_suffix(suffix).ok_or_else(|| QuantityError::InvalidSuffix(input.to_string()))? {
            Suffix::Binary(power) => {
                mantissa = mantissa.checked_mul(1u128 << power).ok_or_else(overflow)?;
            }
            Suffix::Decimal(scale) => {
                exponent = exponent.checked_add(scale).ok_or_else(overflow)?;
            }
        }

        Self::canonical(negative, mantissa, exponent).ok_or_else(overflow)
    }

    /// Strip trailing zeros into the exponent; `None` if the exponent overflows
    fn canonical(negative: bool, mut mantissa: u128, mut exponent: i64) -> Option<Self> {
        if mantissa == 0 {
            return Some(Self {
                negative: false,
                mantissa: 0,
                exponent: 0,
            });
        }
        while mantissa % 10 == 0 {
            mantissa /= 10;
            exponent = exponent.checked_add(1)?;
        }
        Some(Self {
            negative,
            mantissa,
            exponent,
        })
    }
}

fn parse_suffix(suffix: &str) -> Option<Suffix> {
    let parsed = match suffix {
        "" => Suffix::Decimal(0),
        "Ki" => Suffix::Binary(10),
        "Mi" => Suffix::Binary(20),
        "Gi" => Suffix::Binary(30),
        "Ti" => Suffix::Binary(40),
        "Pi" => Suffix::Binary(50),
        "Ei" => Suffix::Binary(60),
        "n" => Suffix::Decimal(-9),
        "u" => Suffix::Decimal(-6),
        "m" => Suffix::Decimal(-3),
        "k" => Suffix::Decimal(3),
        "M" => Suffix::Decimal(6),
        "G" => Suffix::Decimal(9),
        "T" => Suffix::Decimal(12),
        "P" => Suffix::Decimal(15),
        "E" => Suffix::Decimal(18),
        _ => {
            // Decimal exponent: e3, E-2, e+6
            let digits = suffix.strip_prefix(['e', 'E'])?;
            let unsigned = digits.strip_prefix(['+', '-']).unwrap_or(digits);
            if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            Suffix::Decimal(digits.parse().ok()?)
        }
    };
    Some(parsed)
}

/// True if `a` and `b` denote the same amount.
///
/// Falls back to exact text equality when either side does not parse.
pub fn quantities_equal(a: &Quantity, b: &Quantity) -> bool {
    match (ParsedQuantity::parse(&a.0), ParsedQuantity::parse(&b.0)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.0 == b.0,
    }
}
