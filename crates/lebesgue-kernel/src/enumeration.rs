//! Enumerations of the nonnegative rationals.
//!
//! The approximator only ever looks at the values `nth(0), nth(1), …`; the
//! limit of the approximation reaches every finite target value exactly when
//! the enumeration hits every nonnegative rational. `CalkinWilf` is the
//! canonical choice: a computable bijection ℕ → ℚ≥0 with a computable inverse.

use crate::ennreal::NNRat;
use num_traits::ToPrimitive;
use serde::{Deserialize, Serialize};

/// A fixed, deterministic map ℕ → ℚ≥0.
///
/// An enumeration is *dense* when it is surjective onto ℚ≥0 (or at least onto
/// a dense subset of it). It is *unbounded* when its values exceed every
/// bound; dense implies unbounded. The integral engine needs an unbounded
/// enumeration to certify `∞` on a set of positive measure.
pub trait Enumeration: Send + Sync {
    /// Name of this enumeration (for diagnostics).
    fn name(&self) -> &str;

    /// The `n`-th enumerated value.
    fn nth(&self, n: usize) -> NNRat;

    /// Whether this enumeration is surjective onto a dense subset of ℚ≥0.
    fn is_dense(&self) -> bool {
        false
    }

    /// Whether the values exceed every bound.
    fn is_unbounded(&self) -> bool {
        self.is_dense()
    }

    /// The first `n` values.
    fn prefix(&self, n: usize) -> Vec<NNRat> {
        (0..n).map(|k| self.nth(k)).collect()
    }
}

impl<E: Enumeration + ?Sized> Enumeration for &E {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn nth(&self, n: usize) -> NNRat {
        (**self).nth(n)
    }

    fn is_dense(&self) -> bool {
        (**self).is_dense()
    }

    fn is_unbounded(&self) -> bool {
        (**self).is_unbounded()
    }
}

impl<E: Enumeration + ?Sized> Enumeration for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn nth(&self, n: usize) -> NNRat {
        (**self).nth(n)
    }

    fn is_dense(&self) -> bool {
        (**self).is_dense()
    }

    fn is_unbounded(&self) -> bool {
        (**self).is_unbounded()
    }
}

/// Stern's diatomic sequence: `fusc(2n) = fusc(n)`, `fusc(2n+1) = fusc(n) + fusc(n+1)`.
fn fusc(n: u128) -> u128 {
    let (mut a, mut b) = (1u128, 0u128);
    let mut m = n;
    while m > 0 {
        if m & 1 == 1 {
            b += a;
        } else {
            a += b;
        }
        m >>= 1;
    }
    b
}

/// Calkin–Wilf enumeration with `0` prepended.
///
/// `nth(0) = 0` and `nth(n) = fusc(n) / fusc(n+1)` for `n ≥ 1`, which walks the
/// Calkin–Wilf tree breadth-first: `0, 1, 1/2, 2, 1/3, 3/2, 2/3, 3, …`.
/// Every nonnegative rational appears exactly once.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalkinWilf;

impl CalkinWilf {
    /// Position of `q` in the enumeration, if it fits in a `usize`.
    ///
    /// Walks from `q` up to the root `1/1`: `a/b` with `a < b` is the left
    /// child of `a/(b-a)`, with `a > b` the right child of `(a-b)/b`. Runs of
    /// identical moves are taken in one division.
    pub fn index_of(&self, q: &NNRat) -> Option<usize> {
        let mut a = q.numer().to_u128()?;
        let mut b = q.denom().to_u128()?;
        if a == 0 {
            return Some(0);
        }

        // (bit, run length) from the leaf upwards
        let mut runs: Vec<(u8, u128)> = Vec::new();
        while a != b {
            if a < b {
                let k = if b % a == 0 { b / a - 1 } else { b / a };
                runs.push((0, k));
                b -= k * a;
            } else {
                let k = if a % b == 0 { a / b - 1 } else { a / b };
                runs.push((1, k));
                a -= k * b;
            }
        }

        let mut index: usize = 1;
        for (bit, len) in runs.into_iter().rev() {
            for _ in 0..len {
                index = index.checked_mul(2)?.checked_add(usize::from(bit))?;
            }
        }
        Some(index)
    }
}

impl Enumeration for CalkinWilf {
    fn name(&self) -> &str {
        "calkin_wilf"
    }

    fn nth(&self, n: usize) -> NNRat {
        if n == 0 {
            return NNRat::from_integer(0);
        }
        let n = n as u128;
        let numer = fusc(n);
        let denom = fusc(n + 1);
        NNRat::try_from_rational(num_rational::BigRational::new(numer.into(), denom.into()))
            .unwrap_or_default()
    }

    fn is_dense(&self) -> bool {
        true
    }
}

/// Cantor-pairing enumeration: `n ↦ a / (b + 1)` where `(a, b)` unpairs `n`.
///
/// Surjective onto ℚ≥0 with repetitions (`1/1`, `2/2`, … all appear).
#[derive(Debug, Clone, Copy, Default)]
pub struct CantorPairs;

impl CantorPairs {
    fn unpair(n: usize) -> (u64, u64) {
        let n = n as u128;
        let w = ((8 * n + 1).isqrt() - 1) / 2;
        let t = w * (w + 1) / 2;
        let b = n - t;
        let a = w - b;
        (a as u64, b as u64)
    }
}

impl Enumeration for CantorPairs {
    fn name(&self) -> &str {
        "cantor_pairs"
    }

    fn nth(&self, n: usize) -> NNRat {
        let (a, b) = Self::unpair(n);
        NNRat::ratio(a, b + 1)
    }

    fn is_dense(&self) -> bool {
        true
    }
}

/// `nth(k) = k`. Unbounded but not dense.
#[derive(Debug, Clone, Copy, Default)]
pub struct Naturals;

impl Enumeration for Naturals {
    fn name(&self) -> &str {
        "naturals"
    }

    fn nth(&self, n: usize) -> NNRat {
        NNRat::from_integer(n as u64)
    }

    fn is_unbounded(&self) -> bool {
        true
    }
}

/// An enumeration backed by a closure.
pub struct FromFn<F> {
    name: String,
    dense: bool,
    unbounded: bool,
    f: F,
}

impl<F> FromFn<F>
where
    F: Fn(usize) -> NNRat + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            dense: false,
            unbounded: false,
            f,
        }
    }

    /// Declare the closure surjective onto a dense subset of ℚ≥0.
    pub fn dense(mut self) -> Self {
        self.dense = true;
        self
    }

    /// Declare the closure's values unbounded without claiming density.
    pub fn unbounded(mut self) -> Self {
        self.unbounded = true;
        self
    }
}

impl<F> Enumeration for FromFn<F>
where
    F: Fn(usize) -> NNRat + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn nth(&self, n: usize) -> NNRat {
        (self.f)(n)
    }

    fn is_dense(&self) -> bool {
        self.dense
    }

    fn is_unbounded(&self) -> bool {
        self.dense || self.unbounded
    }
}

/// The built-in enumerations, selectable from configuration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationKind {
    #[default]
    CalkinWilf,
    CantorPairs,
    Naturals,
}

impl EnumerationKind {
    pub fn build(self) -> Box<dyn Enumeration> {
        match self {
            Self::CalkinWilf => Box::new(CalkinWilf),
            Self::CantorPairs => Box::new(CantorPairs),
            Self::Naturals => Box::new(Naturals),
        }
    }
}

impl std::str::FromStr for EnumerationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calkin_wilf" | "calkin-wilf" => Ok(Self::CalkinWilf),
            "cantor_pairs" | "cantor-pairs" => Ok(Self::CantorPairs),
            "naturals" => Ok(Self::Naturals),
            _ => Err(format!("unknown enumeration: {s}")),
        }
    }
}

/// A prefix of an enumeration, serialized for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumerationPrefix {
    pub name: String,
    pub values: Vec<String>,
}

impl EnumerationPrefix {
    pub fn of(enumeration: &dyn Enumeration, n: usize) -> Self {
        Self {
            name: enumeration.name().to_string(),
            values: enumeration
                .prefix(n)
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn fusc_prefix() {
        let got: Vec<u128> = (0..10).map(fusc).collect();
        assert_eq!(got, vec![0, 1, 1, 2, 1, 3, 2, 3, 1, 4]);
    }

    #[test]
    fn calkin_wilf_prefix() {
        let prefix = EnumerationPrefix::of(&CalkinWilf, 8);
        insta::assert_snapshot!(prefix.values.join(" "), @"0 1 1/2 2 1/3 3/2 2/3 3");
    }

    #[test]
    fn calkin_wilf_is_injective_on_prefix() {
        let values: Vec<NNRat> = CalkinWilf.prefix(2048);
        let distinct: BTreeSet<&NNRat> = values.iter().collect();
        assert_eq!(distinct.len(), values.len());
    }

    #[test]
    fn calkin_wilf_index_inverts_nth() {
        for n in 0..2048 {
            let q = CalkinWilf.nth(n);
            assert_eq!(CalkinWilf.index_of(&q), Some(n), "round trip failed at {n} ({q})");
        }
    }

    #[test]
    fn calkin_wilf_reaches_given_rationals() {
        for (a, b) in [(3u64, 2u64), (7, 5), (1, 10), (22, 7)] {
            let q = NNRat::ratio(a, b);
            let idx = CalkinWilf.index_of(&q).unwrap();
            assert_eq!(CalkinWilf.nth(idx), q);
        }
    }

    #[test]
    fn cantor_pairs_unpairs_diagonals() {
        let prefix: Vec<String> = CantorPairs.prefix(6).iter().map(ToString::to_string).collect();
        assert_eq!(prefix, vec!["0", "1", "0", "2", "1/2", "0"]);
        assert_eq!(CantorPairs.nth(8), NNRat::ratio(1, 3));
        assert_eq!(CantorPairs.nth(12), NNRat::ratio(2, 3));
    }

    #[test]
    fn naturals_and_closures() {
        assert_eq!(Naturals.nth(5), NNRat::from_integer(5));
        assert!(!Naturals.is_dense());
        assert!(Naturals.is_unbounded());
        assert!(CalkinWilf.is_unbounded());
        assert!((&Naturals as &dyn Enumeration).is_unbounded());

        let halves = FromFn::new("halves", |n| NNRat::ratio(n as u64, 2));
        assert_eq!(halves.nth(3), NNRat::ratio(3, 2));
        assert_eq!(halves.name(), "halves");
        assert!(!halves.is_unbounded());
        assert!(halves.unbounded().is_unbounded());
        assert!(FromFn::new("cw", |n| CalkinWilf.nth(n)).dense().is_unbounded());
    }

    #[test]
    fn kind_parse_and_build() {
        let kind: EnumerationKind = "calkin-wilf".parse().unwrap();
        assert_eq!(kind, EnumerationKind::CalkinWilf);
        assert!(kind.build().is_dense());
        assert!("bogus".parse::<EnumerationKind>().is_err());
    }
}
