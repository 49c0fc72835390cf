// ==============================================================================
// Decimal: IEEE 754-2008 decimal128 values
// ==============================================================================
//
// 34 significant digits, half-even rounding, adjusted exponent within
// [-6176, 6144]. Every constructor and operation rounds first and then checks
// the range, so a `Decimal` always holds a representable value.

use std::{
    fmt,
    hash::{Hash, Hasher},
    num::NonZeroU64,
    ops::Neg,
    str::FromStr,
};

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use thiserror::Error;

/// Significant digits of a decimal128.
pub const PRECISION: u64 = 34;
/// Largest adjusted exponent (`d.ddd…E+6144`).
pub const MAX_EXPONENT: i64 = 6144;
/// Smallest adjusted exponent a non-zero value can have (subnormals included).
pub const MIN_EXPONENT: i64 = -6176;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("`{0}` is not a decimal number")]
    Syntax(String),
    #[error("`{0}` is outside the decimal range")]
    OutOfRange(String),
}

/// Equality and ordering are numeric: `0.30` equals `0.3`. The scale is kept
/// for display.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal(BigDecimal);

impl Decimal {
    pub fn zero() -> Self {
        Decimal(BigDecimal::zero())
    }

    /// `mantissa * 10^-scale`, rounded to the decimal128 grid.
    pub fn new(mantissa: i64, scale: i64) -> Option<Self> {
        Self::rounded(BigDecimal::new(mantissa.into(), scale))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Round to [`PRECISION`] digits and reject values whose exponent does
    /// not fit.
    fn rounded(value: BigDecimal) -> Option<Self> {
        let precision = NonZeroU64::new(PRECISION)?;
        let value = if value.digits() > PRECISION {
            value.with_precision_round(precision, RoundingMode::HalfEven)
        } else {
            value
        };
        if value.is_zero() {
            return Some(Decimal(value));
        }
        let (_, scale) = value.as_bigint_and_exponent();
        let adjusted = value.digits() as i64 - 1 - scale;
        (MIN_EXPONENT..=MAX_EXPONENT)
            .contains(&adjusted)
            .then_some(Decimal(value))
    }

    pub fn checked_add(&self, rhs: &Decimal) -> Option<Decimal> {
        Self::rounded(&self.0 + &rhs.0)
    }

    pub fn checked_sub(&self, rhs: &Decimal) -> Option<Decimal> {
        Self::rounded(&self.0 - &rhs.0)
    }

    pub fn checked_mul(&self, rhs: &Decimal) -> Option<Decimal> {
        Self::rounded(&self.0 * &rhs.0)
    }

    /// None on division by zero.
    pub fn checked_div(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        Self::rounded(&self.0 / &rhs.0)
    }

    /// Remainder truncated toward zero, the sign follows the dividend.
    pub fn checked_rem(&self, rhs: &Decimal) -> Option<Decimal> {
        if rhs.is_zero() {
            return None;
        }
        Self::rounded(&self.0 % &rhs.0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        // at most 19 digits, always representable
        Decimal(BigDecimal::from(value))
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let value =
            BigDecimal::from_str(text).map_err(|_| DecimalError::Syntax(text.to_owned()))?;
        Self::rounded(value).ok_or_else(|| DecimalError::OutOfRange(text.to_owned()))
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0.clone())
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // numerically equal values must hash alike
        self.0.normalized().as_bigint_and_exponent().hash(state);
    }
}

/// Plain notation while the adjusted exponent is in `[-6, 33]`, scientific
/// (`1.5E+40`) outside of it.
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (coefficient, scale) = self.0.as_bigint_and_exponent();
        let text = coefficient.to_string();
        let (sign, digits) = match text.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", text.as_str()),
        };
        let adjusted = digits.len() as i64 - 1 - scale;

        if scale >= 0 && adjusted >= -6 {
            let scale = scale as usize;
            if scale == 0 {
                write!(f, "{sign}{digits}")
            } else if digits.len() > scale {
                let (int, frac) = digits.split_at(digits.len() - scale);
                write!(f, "{sign}{int}.{frac}")
            } else {
                let zeros = "0".repeat(scale - digits.len());
                write!(f, "{sign}0.{zeros}{digits}")
            }
        } else if scale < 0 && adjusted < PRECISION as i64 {
            let zeros = "0".repeat(scale.unsigned_abs() as usize);
            write!(f, "{sign}{digits}{zeros}")
        } else {
            let (lead, rest) = digits.split_at(1);
            let point = if rest.is_empty() { "" } else { "." };
            write!(f, "{sign}{lead}{point}{rest}E{adjusted:+}")
        }
    }
}

impl fmt::Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
