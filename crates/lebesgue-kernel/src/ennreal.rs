//! Extended nonnegative reals over exact rationals.
//!
//! `ENNReal` is `ℚ≥0 ∪ {∞}` as a closed algebra: `+`, `·`, `max`, `min` and
//! truncated subtraction are defined for every pair of inputs. The usual
//! measure-theoretic conventions hold exactly:
//!
//! - `0 · ∞ = 0` (IEEE-754 would give NaN here)
//! - `x · ∞ = ∞` for `x > 0`
//! - `∞ + x = ∞`
//! - `a - b = max(a - b, 0)`, `∞ - x = ∞` for finite `x`, `x - ∞ = 0`
//!
//! Finite parts are arbitrary-precision rationals, so sums of simple-function
//! terms never round.

use crate::error::{KernelError, Result};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

/// A nonnegative rational number.
///
/// Stored in lowest terms with a positive denominator; never negative.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NNRat(BigRational);

impl NNRat {
    /// Build `numer / denom`, rejecting zero denominators and negative results.
    pub fn new(numer: BigInt, denom: BigInt) -> Result<Self> {
        if denom.is_zero() {
            return Err(KernelError::ParseValue(format!("{numer}/0")));
        }
        Self::try_from_rational(BigRational::new(numer, denom))
    }

    /// Wrap a rational, rejecting negative values.
    pub fn try_from_rational(q: BigRational) -> Result<Self> {
        if q.is_negative() {
            return Err(KernelError::NegativeValue(q.to_string()));
        }
        Ok(Self(q))
    }

    /// `numer / denom` from machine integers.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[must_use]
    pub fn ratio(numer: u64, denom: u64) -> Self {
        assert!(denom != 0, "denominator cannot be zero");
        Self(BigRational::new(BigInt::from(numer), BigInt::from(denom)))
    }

    #[must_use]
    pub fn from_integer(n: u64) -> Self {
        Self(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn as_rational(&self) -> &BigRational {
        &self.0
    }

    pub fn numer(&self) -> &BigInt {
        self.0.numer()
    }

    pub fn denom(&self) -> &BigInt {
        self.0.denom()
    }

    /// `max(self - other, 0)`.
    #[must_use]
    pub fn saturating_sub(&self, other: &Self) -> Self {
        if other >= self {
            Self::zero()
        } else {
            Self(&self.0 - &other.0)
        }
    }
}

impl Default for NNRat {
    fn default() -> Self {
        Self::zero()
    }
}

impl Zero for NNRat {
    fn zero() -> Self {
        Self(BigRational::zero())
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl One for NNRat {
    fn one() -> Self {
        Self(BigRational::one())
    }
}

impl Add for NNRat {
    type Output = NNRat;

    fn add(self, rhs: NNRat) -> NNRat {
        NNRat(self.0 + rhs.0)
    }
}

impl Add<&NNRat> for &NNRat {
    type Output = NNRat;

    fn add(self, rhs: &NNRat) -> NNRat {
        NNRat(&self.0 + &rhs.0)
    }
}

impl Mul for NNRat {
    type Output = NNRat;

    fn mul(self, rhs: NNRat) -> NNRat {
        NNRat(self.0 * rhs.0)
    }
}

impl Mul<&NNRat> for &NNRat {
    type Output = NNRat;

    fn mul(self, rhs: &NNRat) -> NNRat {
        NNRat(&self.0 * &rhs.0)
    }
}

impl fmt::Debug for NNRat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NNRat({})", self.0)
    }
}

impl fmt::Display for NNRat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.denom().is_one() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl FromStr for NNRat {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parse_int = |text: &str| {
            text.trim()
                .parse::<BigInt>()
                .map_err(|_| KernelError::ParseValue(s.to_string()))
        };
        match s.split_once('/') {
            Some((n, d)) => Self::new(parse_int(n)?, parse_int(d)?),
            None => Self::new(parse_int(s)?, BigInt::one()),
        }
    }
}

impl From<u64> for NNRat {
    fn from(n: u64) -> Self {
        Self::from_integer(n)
    }
}

/// An extended nonnegative rational: a finite `NNRat` or `∞`.
///
/// The derived order places every `Finite` below `Top`, which is the order
/// of `ℝ≥0∞`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ENNReal {
    Finite(NNRat),
    Top,
}

impl ENNReal {
    #[must_use]
    pub fn top() -> Self {
        Self::Top
    }

    #[must_use]
    pub fn finite(q: NNRat) -> Self {
        Self::Finite(q)
    }

    /// `numer / denom` as a finite value.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[must_use]
    pub fn ratio(numer: u64, denom: u64) -> Self {
        Self::Finite(NNRat::ratio(numer, denom))
    }

    pub fn is_top(&self) -> bool {
        matches!(self, Self::Top)
    }

    pub fn is_finite(&self) -> bool {
        !self.is_top()
    }

    /// The finite part, if any.
    pub fn as_finite(&self) -> Option<&NNRat> {
        match self {
            Self::Finite(q) => Some(q),
            Self::Top => None,
        }
    }

    /// Truncated subtraction `max(self - other, 0)`.
    ///
    /// `∞ - x = ∞` for finite `x`; `x - ∞ = 0` for every `x` including `∞`.
    #[must_use]
    pub fn truncated_sub(&self, other: &Self) -> Self {
        match (self, other) {
            (_, Self::Top) => Self::zero(),
            (Self::Top, Self::Finite(_)) => Self::Top,
            (Self::Finite(a), Self::Finite(b)) => Self::Finite(a.saturating_sub(b)),
        }
    }

    /// Subtraction that refuses to go below zero.
    ///
    /// Returns `None` when `other > self`; otherwise the truncated difference.
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        if other > self {
            None
        } else {
            Some(self.truncated_sub(other))
        }
    }
}

impl Default for ENNReal {
    fn default() -> Self {
        Self::zero()
    }
}

impl Zero for ENNReal {
    fn zero() -> Self {
        Self::Finite(NNRat::zero())
    }

    fn is_zero(&self) -> bool {
        matches!(self, Self::Finite(q) if q.is_zero())
    }
}

impl One for ENNReal {
    fn one() -> Self {
        Self::Finite(NNRat::one())
    }
}

impl Add<&ENNReal> for &ENNReal {
    type Output = ENNReal;

    fn add(self, rhs: &ENNReal) -> ENNReal {
        match (self, rhs) {
            (ENNReal::Finite(a), ENNReal::Finite(b)) => ENNReal::Finite(a + b),
            _ => ENNReal::Top,
        }
    }
}

impl Add for ENNReal {
    type Output = ENNReal;

    fn add(self, rhs: ENNReal) -> ENNReal {
        match (self, rhs) {
            (ENNReal::Finite(a), ENNReal::Finite(b)) => ENNReal::Finite(a + b),
            _ => ENNReal::Top,
        }
    }
}

impl AddAssign<&ENNReal> for ENNReal {
    fn add_assign(&mut self, rhs: &ENNReal) {
        *self = &*self + rhs;
    }
}

impl Mul<&ENNReal> for &ENNReal {
    type Output = ENNReal;

    fn mul(self, rhs: &ENNReal) -> ENNReal {
        match (self, rhs) {
            (ENNReal::Finite(a), ENNReal::Finite(b)) => ENNReal::Finite(a * b),
            // 0 · ∞ = 0, in either order
            (x, y) if x.is_zero() || y.is_zero() => ENNReal::zero(),
            _ => ENNReal::Top,
        }
    }
}

impl Mul for ENNReal {
    type Output = ENNReal;

    fn mul(self, rhs: ENNReal) -> ENNReal {
        &self * &rhs
    }
}

impl Sum for ENNReal {
    fn sum<I: Iterator<Item = ENNReal>>(iter: I) -> Self {
        iter.fold(ENNReal::zero(), Add::add)
    }
}

impl<'a> Sum<&'a ENNReal> for ENNReal {
    fn sum<I: Iterator<Item = &'a ENNReal>>(iter: I) -> Self {
        iter.fold(ENNReal::zero(), |acc, x| &acc + x)
    }
}

impl From<NNRat> for ENNReal {
    fn from(q: NNRat) -> Self {
        Self::Finite(q)
    }
}

impl From<u64> for ENNReal {
    fn from(n: u64) -> Self {
        Self::Finite(NNRat::from_integer(n))
    }
}

impl fmt::Display for ENNReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(q) => write!(f, "{q}"),
            Self::Top => write!(f, "∞"),
        }
    }
}

impl FromStr for ENNReal {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "inf" | "infinity" | "top" | "∞" => Ok(Self::Top),
            _ => s.parse::<NNRat>().map(Self::Finite),
        }
    }
}

impl Serialize for ENNReal {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Top => serializer.serialize_str("inf"),
            Self::Finite(q) => serializer.collect_str(q),
        }
    }
}

impl<'de> Deserialize<'de> for ENNReal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct ENNRealVisitor;

        impl Visitor<'_> for ENNRealVisitor {
            type Value = ENNReal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a nonnegative integer, a rational \"p/q\", or \"inf\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<ENNReal, E> {
                Ok(ENNReal::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<ENNReal, E> {
                u64::try_from(v)
                    .map(ENNReal::from)
                    .map_err(|_| E::custom(format!("negative value: {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<ENNReal, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ENNRealVisitor)
    }
}
