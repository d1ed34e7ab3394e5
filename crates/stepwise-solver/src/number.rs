use std::cmp::Ordering;
use std::ops::{Add, Neg, Sub};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use thiserror::Error;

/// Exact number used for every tableau entry
pub type Rational = BigRational;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseNumberError {
    #[error("Empty number")]
    Empty,
    #[error("Invalid number: {0}")]
    Invalid(String),
    #[error("Zero denominator in {0}")]
    ZeroDenominator(String),
    #[error("{0} cannot be read exactly, write it as a string")]
    Inexact(String),
}

/// Build an exact number from an integer
pub fn int(value: i64) -> Rational {
    Rational::from_integer(BigInt::from(value))
}

/// Build an exact fraction `numer / denom`
///
/// The denominator must be non-zero.
pub fn ratio(numer: i64, denom: i64) -> Rational {
    Rational::new(BigInt::from(numer), BigInt::from(denom))
}

pub fn from_ints(values: &[i64]) -> Vec<Rational> {
    values.iter().map(|&v| int(v)).collect()
}

/// Parse an integer (`-3`), a fraction (`7/2`) or a terminating decimal
/// (`0.25`) into an exact number.
pub fn parse_rational(text: &str) -> Result<Rational, ParseNumberError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseNumberError::Empty);
    }

    if let Some((numer, denom)) = text.split_once('/') {
        let numer = parse_decimal(numer.trim()).ok_or_else(|| ParseNumberError::Invalid(text.to_string()))?;
        let denom = parse_decimal(denom.trim()).ok_or_else(|| ParseNumberError::Invalid(text.to_string()))?;
        if denom.is_zero() {
            return Err(ParseNumberError::ZeroDenominator(text.to_string()));
        }
        return Ok(numer / denom);
    }

    parse_decimal(text).ok_or_else(|| ParseNumberError::Invalid(text.to_string()))
}

fn parse_decimal(text: &str) -> Option<Rational> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let mantissa: BigInt = format!("{whole}{fraction}").parse().ok()?;
    let scale = num_traits::pow(BigInt::from(10), fraction.len());
    let value = Rational::new(mantissa, scale);
    Some(if negative { -value } else { value })
}

/// A value of the form `coefficient * S + constant` for a free positive
/// parameter `S` (the Big-M penalty or a priority symbol `Pk`).
///
/// Ordering is lexicographic on `(coefficient, constant)`, which is exactly the
/// ordering of such values when `S` is arbitrarily large.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub coefficient: Rational,
    pub constant: Rational,
}

impl Param {
    pub fn constant(value: Rational) -> Self {
        Self {
            coefficient: Rational::zero(),
            constant: value,
        }
    }

    pub fn symbolic(coefficient: Rational) -> Self {
        Self {
            coefficient,
            constant: Rational::zero(),
        }
    }

    pub fn is_positive(&self) -> bool {
        *self > Self::zero()
    }

    pub fn is_negative(&self) -> bool {
        *self < Self::zero()
    }

    pub fn is_symbolic(&self) -> bool {
        !self.coefficient.is_zero()
    }

    /// Multiply both parts by an exact number
    pub fn scale(&self, by: &Rational) -> Self {
        Self {
            coefficient: &self.coefficient * by,
            constant: &self.constant * by,
        }
    }

    /// Render with `symbol` standing for the free parameter, e.g. `3M - 2`.
    pub fn render(&self, symbol: &str) -> String {
        if self.coefficient.is_zero() {
            return self.constant.to_string();
        }

        let term = symbolic_term(&self.coefficient, symbol);
        if self.constant.is_zero() {
            term
        } else if self.constant.is_negative() {
            format!("{} - {}", term, -&self.constant)
        } else {
            format!("{} + {}", term, self.constant)
        }
    }
}

fn symbolic_term(coefficient: &Rational, symbol: &str) -> String {
    let magnitude = coefficient.abs();
    let sign = if coefficient.is_negative() { "-" } else { "" };
    if magnitude.is_integer() && magnitude.numer() == &BigInt::from(1) {
        format!("{sign}{symbol}")
    } else if magnitude.is_integer() {
        format!("{sign}{magnitude}{symbol}")
    } else {
        format!("{sign}({magnitude}){symbol}")
    }
}

impl Zero for Param {
    fn zero() -> Self {
        Self::constant(Rational::zero())
    }

    fn is_zero(&self) -> bool {
        self.coefficient.is_zero() && self.constant.is_zero()
    }
}

impl From<Rational> for Param {
    fn from(value: Rational) -> Self {
        Self::constant(value)
    }
}

impl PartialOrd for Param {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Param {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coefficient
            .cmp(&other.coefficient)
            .then_with(|| self.constant.cmp(&other.constant))
    }
}

impl Add for Param {
    type Output = Param;

    fn add(self, rhs: Param) -> Param {
        &self + &rhs
    }
}

impl<'a> Add<&'a Param> for &'a Param {
    type Output = Param;

    fn add(self, rhs: &'a Param) -> Param {
        Param {
            coefficient: &self.coefficient + &rhs.coefficient,
            constant: &self.constant + &rhs.constant,
        }
    }
}

impl Sub for Param {
    type Output = Param;

    fn sub(self, rhs: Param) -> Param {
        &self - &rhs
    }
}

impl<'a> Sub<&'a Param> for &'a Param {
    type Output = Param;

    fn sub(self, rhs: &'a Param) -> Param {
        Param {
            coefficient: &self.coefficient - &rhs.coefficient,
            constant: &self.constant - &rhs.constant,
        }
    }
}

impl Neg for Param {
    type Output = Param;

    fn neg(self) -> Param {
        Param {
            coefficient: -self.coefficient,
            constant: -self.constant,
        }
    }
}

impl Neg for &Param {
    type Output = Param;

    fn neg(self) -> Param {
        -self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integers_fractions_and_decimals() {
        assert_eq!(parse_rational("12").unwrap(), int(12));
        assert_eq!(parse_rational(" -3 ").unwrap(), int(-3));
        assert_eq!(parse_rational("7/2").unwrap(), ratio(7, 2));
        assert_eq!(parse_rational("0.25").unwrap(), ratio(1, 4));
        assert_eq!(parse_rational("-.5").unwrap(), ratio(-1, 2));
        assert_eq!(parse_rational("1.5/3").unwrap(), ratio(1, 2));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_rational(""), Err(ParseNumberError::Empty));
        assert!(matches!(parse_rational("abc"), Err(ParseNumberError::Invalid(_))));
        assert!(matches!(parse_rational("1e5"), Err(ParseNumberError::Invalid(_))));
        assert!(matches!(parse_rational("-"), Err(ParseNumberError::Invalid(_))));
        assert!(matches!(parse_rational("3/0"), Err(ParseNumberError::ZeroDenominator(_))));
    }

    #[test]
    fn test_param_ordering_is_lexicographic() {
        let big_negative = Param {
            coefficient: int(-1),
            constant: int(1000),
        };
        let small_constant = Param::constant(int(-1000));
        // -M + 1000 is below -1000 for any large enough M
        assert!(big_negative < small_constant);
        assert!(big_negative.is_negative());

        let m_minus_two = Param {
            coefficient: int(1),
            constant: int(-2),
        };
        assert!(m_minus_two.is_positive());
        assert!(Param::constant(int(3)) < m_minus_two);
    }

    #[test]
    fn test_param_arithmetic() {
        let a = Param {
            coefficient: int(2),
            constant: int(3),
        };
        let b = Param::symbolic(int(2));
        assert_eq!(&a - &b, Param::constant(int(3)));
        assert_eq!((&a + &b).coefficient, int(4));
        assert_eq!(a.scale(&ratio(1, 2)).constant, ratio(3, 2));
        assert!((&a - &a).is_zero());
        assert_eq!(-b, Param::symbolic(int(-2)));
    }

    #[test]
    fn test_param_render() {
        let p = Param {
            coefficient: int(3),
            constant: int(-2),
        };
        assert_eq!(p.render("M"), "3M - 2");
        assert_eq!(Param::symbolic(int(-1)).render("P1"), "-P1");
        assert_eq!(Param::symbolic(ratio(1, 2)).render("M"), "(1/2)M");
        assert_eq!(Param::constant(ratio(-5, 3)).render("M"), "-5/3");
        let q = Param {
            coefficient: int(1),
            constant: ratio(1, 2),
        };
        assert_eq!(q.render("M"), "M + 1/2");
    }
}
