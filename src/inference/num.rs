use ordered_float::OrderedFloat;

use super::Ty;
use crate::error::{InferError, Result};

/// Observed `[min, max]` of integral literals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

/// Observed `[min, max]` of fractional literals (and any integers folded in).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FloatRange {
    pub min: OrderedFloat<f64>,
    pub max: OrderedFloat<f64>,
}

impl IntRange {
    pub fn point(value: i64) -> Self {
        Self { min: value, max: value }
    }

    pub fn new(min: i64, max: i64) -> Self {
        Self { min: min.min(max), max: max.max(min) }
    }

    pub(super) fn join(a: Self, b: Self) -> Self {
        Self { min: a.min.min(b.min), max: a.max.max(b.max) }
    }

    /// Smallest Hive integer type covering the whole range.
    pub fn hive_name(&self) -> &'static str {
        let fits = |lo: i64, hi: i64| self.min >= lo && self.max <= hi;
        if fits(i8::MIN.into(), i8::MAX.into()) {
            "tinyint"
        } else if fits(i16::MIN.into(), i16::MAX.into()) {
            "smallint"
        } else if fits(i32::MIN.into(), i32::MAX.into()) {
            "int"
        } else {
            "bigint"
        }
    }
}

impl FloatRange {
    pub fn point(value: f64) -> Self {
        Self { min: OrderedFloat(value), max: OrderedFloat(value) }
    }

    pub fn new(min: f64, max: f64) -> Self {
        Self::join(Self::point(min), Self::point(max))
    }

    pub(super) fn join(a: Self, b: Self) -> Self {
        Self { min: a.min.min(b.min), max: a.max.max(b.max) }
    }

    /// Cover an integer range too. Integers map onto doubles monotonically, so
    /// widening before or after an integer join lands on the same bounds.
    pub(super) fn widen(self, ints: IntRange) -> Self {
        Self::join(self, Self::new(ints.min as f64, ints.max as f64))
    }

    pub fn hive_name(&self) -> &'static str {
        let magnitude = self.max.0.abs().max(self.min.0.abs());
        if magnitude > f64::from(f32::MAX) { "double" } else { "float" }
    }
}

// ------------------------------ Literals ---------------------------------- //

/// Exact decimal view of a JSON number literal: `digits × 10^-scale`.
struct Decimal<'a> {
    negative: bool,
    int_digits: &'a str,
    frac_digits: &'a str,
    scale: i64,
}

impl<'a> Decimal<'a> {
    fn parse(literal: &'a str) -> Option<Self> {
        let (negative, rest) = match literal.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, literal),
        };
        let (mantissa, exponent) = match rest.find(['e', 'E']) {
            Some(at) => (&rest[..at], parse_exponent(&rest[at + 1..])?),
            None => (rest, 0),
        };
        let (int_digits, frac_digits) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int_digits.is_empty() || !all_digits(int_digits) || !all_digits(frac_digits) {
            return None;
        }
        let scale = i64::try_from(frac_digits.len()).ok()?.saturating_sub(exponent);
        Some(Self { negative, int_digits, frac_digits, scale })
    }

    /// Exact integral value; `None` when it does not fit an `i64`.
    fn to_i64(&self) -> Option<i64> {
        let digits = format!("{}{}", self.int_digits, self.frac_digits);
        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Some(0);
        }
        let zeros = usize::try_from(-self.scale).ok()?;
        // i64::MAX has 19 digits
        if significant.len().checked_add(zeros)? > 19 {
            return None;
        }
        let magnitude: i128 = format!("{significant}{}", "0".repeat(zeros)).parse().ok()?;
        i64::try_from(if self.negative { -magnitude } else { magnitude }).ok()
    }
}

/// Exponent digits with an optional sign. Exponents past `i64` saturate: only
/// their sign still matters for the scale.
fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Classify a number from its literal text. Zero fractional digits after the
/// exponent is applied means Integer (`1e2` → 100); anything else is a
/// FloatingPoint point range (`1.0`, `2.5e-1`).
pub(super) fn observe_number(literal: &str) -> Result<Ty> {
    let Some(decimal) = Decimal::parse(literal) else {
        return Err(InferError::MalformedNumber { literal: literal.to_owned() });
    };
    if decimal.scale > 0 {
        let value: f64 = literal
            .parse()
            .map_err(|_| InferError::MalformedNumber { literal: literal.to_owned() })?;
        if !value.is_finite() {
            return Err(InferError::FloatOutOfRange { literal: literal.to_owned() });
        }
        return Ok(Ty::Float(FloatRange::point(value)));
    }
    decimal
        .to_i64()
        .map(|value| Ty::Int(IntRange::point(value)))
        .ok_or_else(|| InferError::IntegerOutOfRange { literal: literal.to_owned() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(literal: &str) -> i64 {
        match observe_number(literal).unwrap() {
            Ty::Int(r) => {
                assert_eq!(r.min, r.max);
                r.min
            }
            other => panic!("{literal} classified as {other:?}"),
        }
    }

    fn float(literal: &str) -> f64 {
        match observe_number(literal).unwrap() {
            Ty::Float(r) => r.min.0,
            other => panic!("{literal} classified as {other:?}"),
        }
    }

    #[test]
    fn integral_literals_are_exact() {
        assert_eq!(int("0"), 0);
        assert_eq!(int("-0"), 0);
        assert_eq!(int("42"), 42);
        assert_eq!(int("-17"), -17);
        assert_eq!(int("1e2"), 100);
        assert_eq!(int("9223372036854775807"), i64::MAX);
        assert_eq!(int("-9223372036854775808"), i64::MIN);
        assert_eq!(int("0e999"), 0);
    }

    #[test]
    fn fractional_digits_mean_floating_point() {
        assert_eq!(float("1.0"), 1.0);
        assert_eq!(float("2.5"), 2.5);
        assert_eq!(float("-0.125"), -0.125);
        assert_eq!(float("15e-1"), 1.5);
        // two fractional digits against an exponent of one: scale stays positive
        assert_eq!(float("1.50e1"), 15.0);
    }

    #[test]
    fn exponent_can_make_fraction_integral() {
        assert_eq!(int("1.5e1"), 15);
        assert_eq!(int("1.25E+2"), 125);
    }

    #[test]
    fn out_of_range_integers_fail_instead_of_truncating() {
        assert!(matches!(
            observe_number("9223372036854775808"),
            Err(InferError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            observe_number("-9223372036854775809"),
            Err(InferError::IntegerOutOfRange { .. })
        ));
        assert!(matches!(
            observe_number("1e40"),
            Err(InferError::IntegerOutOfRange { .. })
        ));
    }

    #[test]
    fn overflowing_fraction_fails() {
        let huge = format!("{}.5", "1".repeat(400));
        assert!(matches!(
            observe_number(&huge),
            Err(InferError::FloatOutOfRange { .. })
        ));
    }

    #[test]
    fn huge_exponents_keep_their_sign() {
        assert_eq!(float("1.5e-99999999999999999999"), 0.0);
        assert_eq!(float("-2e-99999999999999999999"), -0.0);
        assert!(matches!(
            observe_number("1e99999999999999999999"),
            Err(InferError::IntegerOutOfRange { .. })
        ));
        assert_eq!(int("0e99999999999999999999"), 0);
        assert_eq!(int("0.0e+99999999999999999999"), 0);
    }

    #[test]
    fn malformed_exponent_is_reported() {
        assert!(matches!(
            observe_number("1e"),
            Err(InferError::MalformedNumber { .. })
        ));
        assert!(matches!(
            observe_number("1e+-2"),
            Err(InferError::MalformedNumber { .. })
        ));
    }

    #[test]
    fn integer_names_follow_range() {
        assert_eq!(IntRange::new(-128, 127).hive_name(), "tinyint");
        assert_eq!(IntRange::new(-129, 0).hive_name(), "smallint");
        assert_eq!(IntRange::new(0, 40_000).hive_name(), "int");
        assert_eq!(IntRange::new(0, 1 << 40).hive_name(), "bigint");
    }

    #[test]
    fn float_names_follow_magnitude() {
        assert_eq!(FloatRange::new(-1.5, 3.25).hive_name(), "float");
        assert_eq!(FloatRange::new(-1e300, 0.0).hive_name(), "double");
    }

    #[test]
    fn widen_covers_integer_bounds() {
        let r = FloatRange::point(1.5).widen(IntRange::point(5));
        assert_eq!(r, FloatRange::new(1.5, 5.0));
    }
}
