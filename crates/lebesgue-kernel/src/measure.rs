//! Measures over finitely generated measurable spaces.
//!
//! The kernel consumes measures through one call, `measure(set)`. Everything
//! else here is either a concrete realization (`AtomicMeasure`) or a
//! combinator that builds new measures from old ones:
//!
//! ```text
//! μ.restrict(s)   t ↦ μ(t ∩ s)
//! μ.scale(c)      t ↦ c · μ(t)
//! μ.add(ν)        t ↦ μ(t) + ν(t)
//! Σ μ_i           t ↦ Σ_i μ_i(t)
//! ```

use crate::ennreal::ENNReal;
use crate::error::{KernelError, Result};
use crate::space::{MeasurableSpace, PointSet};
use num_traits::Zero;
use std::marker::PhantomData;

/// A measure: zero on `∅`, additive over disjoint measurable sets.
///
/// On non-measurable sets implementations return the outer measure.
pub trait Measure {
    type Point: Clone + Ord;

    fn measure(&self, s: &PointSet<Self::Point>) -> ENNReal;

    /// Whether `s` is a null set.
    fn is_null(&self, s: &PointSet<Self::Point>) -> bool {
        self.measure(s).is_zero()
    }
}

impl<M: Measure + ?Sized> Measure for &M {
    type Point = M::Point;

    fn measure(&self, s: &PointSet<M::Point>) -> ENNReal {
        (**self).measure(s)
    }
}

impl<M: Measure + ?Sized> Measure for Box<M> {
    type Point = M::Point;

    fn measure(&self, s: &PointSet<M::Point>) -> ENNReal {
        (**self).measure(s)
    }
}

/// A measure given by one weight per atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomicMeasure<P: Ord> {
    weights: Vec<(PointSet<P>, ENNReal)>,
}

impl<P: Clone + Ord> AtomicMeasure<P> {
    /// One weight per atom of `space`, in atom order.
    pub fn new<S>(space: &S, weights: Vec<ENNReal>) -> Result<Self>
    where
        S: MeasurableSpace<Point = P>,
    {
        let atoms = space.atoms();
        if atoms.len() != weights.len() {
            return Err(KernelError::InvalidMeasure {
                description: format!(
                    "{} has {} atoms but {} weights were given",
                    space.name(),
                    atoms.len(),
                    weights.len()
                ),
            });
        }
        Ok(Self {
            weights: atoms.iter().cloned().zip(weights).collect(),
        })
    }

    /// Weight each atom by `f(atom)`.
    pub fn from_fn<S>(space: &S, f: impl Fn(&PointSet<P>) -> ENNReal) -> Self
    where
        S: MeasurableSpace<Point = P>,
    {
        Self {
            weights: space
                .atoms()
                .iter()
                .map(|atom| (atom.clone(), f(atom)))
                .collect(),
        }
    }

    /// Counting measure: each atom weighs its number of points.
    pub fn counting<S>(space: &S) -> Self
    where
        S: MeasurableSpace<Point = P>,
    {
        Self::from_fn(space, |atom| ENNReal::from(atom.len() as u64))
    }

    /// Unit mass on the atom containing `x`.
    pub fn dirac<S>(space: &S, x: &P) -> Result<Self>
    where
        S: MeasurableSpace<Point = P>,
    {
        if !space.carrier().contains(x) {
            return Err(KernelError::InvalidMeasure {
                description: format!("dirac point is outside {}", space.name()),
            });
        }
        Ok(Self::from_fn(space, |atom| {
            if atom.contains(x) {
                ENNReal::from(1)
            } else {
                ENNReal::zero()
            }
        }))
    }

    pub fn zero<S>(space: &S) -> Self
    where
        S: MeasurableSpace<Point = P>,
    {
        Self::from_fn(space, |_| ENNReal::zero())
    }

    pub fn weights(&self) -> &[(PointSet<P>, ENNReal)] {
        &self.weights
    }
}

impl<P: Clone + Ord> Measure for AtomicMeasure<P> {
    type Point = P;

    fn measure(&self, s: &PointSet<P>) -> ENNReal {
        self.weights
            .iter()
            .filter(|(atom, _)| !atom.is_disjoint(s))
            .map(|(_, w)| w)
            .sum()
    }
}

/// The zero measure.
#[derive(Debug, Clone, Copy)]
pub struct ZeroMeasure<P>(PhantomData<P>);

impl<P> ZeroMeasure<P> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<P> Default for ZeroMeasure<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone + Ord> Measure for ZeroMeasure<P> {
    type Point = P;

    fn measure(&self, _s: &PointSet<P>) -> ENNReal {
        ENNReal::zero()
    }
}

/// `μ.restrict(s)`: `t ↦ μ(t ∩ s)`.
#[derive(Debug, Clone)]
pub struct Restricted<M: Measure> {
    inner: M,
    set: PointSet<M::Point>,
}

impl<M: Measure> Restricted<M> {
    pub fn set(&self) -> &PointSet<M::Point> {
        &self.set
    }
}

impl<M: Measure> Measure for Restricted<M> {
    type Point = M::Point;

    fn measure(&self, t: &PointSet<M::Point>) -> ENNReal {
        let meet: PointSet<M::Point> = t.intersection(&self.set).cloned().collect();
        self.inner.measure(&meet)
    }
}

/// `c · μ`.
#[derive(Debug, Clone)]
pub struct Scaled<M> {
    factor: ENNReal,
    inner: M,
}

impl<M: Measure> Measure for Scaled<M> {
    type Point = M::Point;

    fn measure(&self, s: &PointSet<M::Point>) -> ENNReal {
        &self.factor * &self.inner.measure(s)
    }
}

/// `μ + ν`.
#[derive(Debug, Clone)]
pub struct Added<A, B> {
    left: A,
    right: B,
}

impl<A, B> Measure for Added<A, B>
where
    A: Measure,
    B: Measure<Point = A::Point>,
{
    type Point = A::Point;

    fn measure(&self, s: &PointSet<A::Point>) -> ENNReal {
        self.left.measure(s) + self.right.measure(s)
    }
}

/// `Σ_i μ_i` over a countable family.
///
/// The family is held by its finitely many nonzero terms; the omitted tail
/// consists of zero measures. Terms are summed in order, but since `+` on
/// `ENNReal` is exact the order does not affect the result.
#[derive(Debug, Clone)]
pub struct SumMeasure<M> {
    terms: Vec<M>,
}

impl<M> SumMeasure<M> {
    pub fn new(terms: impl IntoIterator<Item = M>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    pub fn terms(&self) -> &[M] {
        &self.terms
    }
}

impl<M: Measure> Measure for SumMeasure<M> {
    type Point = M::Point;

    fn measure(&self, s: &PointSet<M::Point>) -> ENNReal {
        self.terms.iter().map(|m| m.measure(s)).sum()
    }
}

/// Combinators available on every measure.
pub trait MeasureExt: Measure + Sized {
    fn restrict(self, s: PointSet<Self::Point>) -> Restricted<Self> {
        Restricted {
            inner: self,
            set: s,
        }
    }

    fn scale(self, factor: ENNReal) -> Scaled<Self> {
        Scaled {
            factor,
            inner: self,
        }
    }

    fn add_measure<N: Measure<Point = Self::Point>>(self, other: N) -> Added<Self, N> {
        Added {
            left: self,
            right: other,
        }
    }
}

impl<M: Measure> MeasureExt for M {}

/// `μ ≤ ν` as set functions.
///
/// Measurable sets are unions of atoms and both measures are additive, so
/// comparing atom by atom decides the inequality on every measurable set.
pub fn measure_le<S, M, N>(space: &S, mu: &M, nu: &N) -> bool
where
    S: MeasurableSpace,
    M: Measure<Point = S::Point>,
    N: Measure<Point = S::Point>,
{
    space
        .atoms()
        .iter()
        .all(|atom| mu.measure(atom) <= nu.measure(atom))
}

/// `μ(univ)`.
pub fn total_mass<S, M>(space: &S, mu: &M) -> ENNReal
where
    S: MeasurableSpace,
    M: Measure<Point = S::Point>,
{
    mu.measure(space.carrier())
}
