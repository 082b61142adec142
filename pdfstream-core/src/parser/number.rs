//! PDF Numeric Values
//!
//! Exact-decimal representation of numbers found in PDF syntax
//! (ISO 32000-1 Section 7.3.3). Values built from `f32` go through the
//! shortest round-trip decimal string of the float, so `0.1` stays `0.1`
//! instead of growing the binary expansion `0.100000001490116...`.

use super::{ParseError, ParseResult};
use num_bigint::{BigInt, BigUint, Sign};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use tracing::warn;

/// A PDF number with an arbitrary-precision decimal value and a canonical
/// rendering.
#[derive(Debug, Clone)]
pub struct PdfNumber {
    /// The value is `mantissa * 10^-scale`, kept without trailing zeros.
    mantissa: BigInt,
    scale: u32,
    /// The source literal had no decimal point
    integer: bool,
    rendered: String,
}

impl PdfNumber {
    /// Build a number from a float.
    ///
    /// The decimal is derived from the shortest string that round-trips to
    /// `value`, never from its binary expansion. Whole values render with a
    /// single `.0` (`3.0`), fractions lose trailing zeros (`3.14`).
    /// Non-finite floats cannot be written in PDF syntax and become `0.0`.
    pub fn from_float(value: f32) -> Self {
        let value = if value.is_finite() {
            value
        } else {
            warn!("Non-finite number {value} replaced by 0.0");
            0.0
        };

        // Display for f32 is the shortest round-trip form and never uses an exponent
        let text = value.to_string();
        let (mantissa, scale) = parse_decimal(&text).unwrap_or_default();
        Self::build(mantissa, scale, false)
    }

    /// Build a number from a decimal literal found in source text.
    ///
    /// Accepts an optional sign, digits and at most one `.`; at least one
    /// digit is required. Exponents are not part of PDF syntax.
    pub fn from_literal(literal: &str) -> ParseResult<Self> {
        let (mantissa, scale) =
            parse_decimal(literal).ok_or_else(|| ParseError::MalformedNumber {
                literal: literal.to_string(),
            })?;
        let integer = !literal.contains('.');
        Ok(Self::build(mantissa, scale, integer))
    }

    /// Build an integer number.
    pub fn from_integer(value: i64) -> Self {
        Self::build(BigInt::from(value), 0, true)
    }

    /// Replace the value with `value`, re-deriving the rendering with the
    /// same rules as [`PdfNumber::from_float`].
    pub fn set_float(&mut self, value: f32) {
        *self = Self::from_float(value);
    }

    fn build(mantissa: BigInt, scale: u32, integer: bool) -> Self {
        let (mantissa, scale) = strip_trailing_zeros(mantissa, scale);
        let rendered = render_decimal(&mantissa, scale, integer);
        Self {
            mantissa,
            scale,
            integer,
            rendered,
        }
    }

    /// Whether the number was written without a decimal point
    pub fn is_integer(&self) -> bool {
        self.integer
    }

    /// Narrow to `f32`; values beyond the `f32` range become infinite.
    pub fn as_float(&self) -> f32 {
        render_decimal(&self.mantissa, self.scale, true)
            .parse::<f32>()
            .unwrap_or(0.0)
    }

    /// Truncate toward zero and keep the low-order 64 bits.
    pub fn as_long(&self) -> i64 {
        let truncated = &self.mantissa / BigInt::from(10u32).pow(self.scale);
        let low = truncated.magnitude().iter_u64_digits().next().unwrap_or(0) as i64;
        if truncated.sign() == Sign::Minus {
            low.wrapping_neg()
        } else {
            low
        }
    }

    /// Truncate toward zero and keep the low-order 32 bits.
    pub fn as_integer(&self) -> i32 {
        self.as_long() as i32
    }

    /// The canonical string rendering
    pub fn render(&self) -> &str {
        &self.rendered
    }

    /// Write the rendering as PDF bytes
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.rendered.as_bytes())
    }
}

fn parse_decimal(literal: &str) -> Option<(BigInt, u32)> {
    let (sign, body) = match literal.as_bytes().first() {
        Some(b'-') => (Sign::Minus, &literal[1..]),
        Some(b'+') => (Sign::Plus, &literal[1..]),
        _ => (Sign::Plus, literal),
    };

    let (int_digits, frac_digits) = body.split_once('.').unwrap_or((body, ""));
    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }
    if !int_digits.bytes().chain(frac_digits.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut digits = String::with_capacity(int_digits.len() + frac_digits.len());
    digits.push_str(int_digits);
    digits.push_str(frac_digits);
    let magnitude = BigUint::parse_bytes(digits.as_bytes(), 10)?;
    let scale = u32::try_from(frac_digits.len()).ok()?;

    Some((BigInt::from_biguint(sign, magnitude), scale))
}

fn strip_trailing_zeros(mut mantissa: BigInt, mut scale: u32) -> (BigInt, u32) {
    let ten = BigInt::from(10u32);
    while scale > 0 && mantissa.sign() != Sign::NoSign {
        let remainder = &mantissa % &ten;
        if remainder.sign() != Sign::NoSign {
            break;
        }
        mantissa /= &ten;
        scale -= 1;
    }
    if mantissa.sign() == Sign::NoSign {
        scale = 0;
    }
    (mantissa, scale)
}

fn render_decimal(mantissa: &BigInt, scale: u32, integer: bool) -> String {
    let digits = mantissa.magnitude().to_string();
    let scale = scale as usize;
    let mut out = String::with_capacity(digits.len() + 3);

    if mantissa.sign() == Sign::Minus {
        out.push('-');
    }

    if scale == 0 {
        out.push_str(&digits);
        if !integer {
            out.push_str(".0");
        }
    } else {
        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale - digits.len() + 1), digits)
        } else {
            digits
        };
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
    }

    out
}

impl PartialEq for PdfNumber {
    fn eq(&self, other: &Self) -> bool {
        self.scale == other.scale && self.mantissa == other.mantissa
    }
}

impl Eq for PdfNumber {}

impl fmt::Display for PdfNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rendered)
    }
}

impl FromStr for PdfNumber {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_literal(s)
    }
}

impl From<f32> for PdfNumber {
    fn from(value: f32) -> Self {
        Self::from_float(value)
    }
}

impl From<i64> for PdfNumber {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for PdfNumber {
    fn from(value: i32) -> Self {
        Self::from_integer(i64::from(value))
    }
}
