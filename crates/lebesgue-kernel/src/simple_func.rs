//! Simple functions.
//!
//! A simple function on a measurable space is a finite table
//!
//! ```text
//! value_1 ↦ preimage_1
//! value_2 ↦ preimage_2
//! …
//! ```
//!
//! with distinct values and preimages that are nonempty, measurable,
//! pairwise disjoint, and together cover the carrier. Every operation below
//! preserves that shape; values that collide are merged by union, never
//! overwritten.

use crate::config::RestrictPolicy;
use crate::ennreal::ENNReal;
use crate::error::{KernelError, Result};
use crate::space::{MeasurableSpace, PointSet};
use num_traits::Zero;
use std::collections::BTreeMap;
use std::fmt;

/// A finite-valued measurable function from `P` to `V`.
///
/// Immutable once constructed. Every point of `domain` lies in exactly one
/// preimage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleFunc<P, V> {
    domain: PointSet<P>,
    parts: BTreeMap<V, PointSet<P>>,
}

impl<P, V> SimpleFunc<P, V>
where
    P: Clone + Ord + fmt::Debug,
    V: Clone + Ord + fmt::Debug,
{
    /// Build a simple function from `(value, preimage)` pairs.
    ///
    /// Pairs sharing a value are merged by union and empty preimages are
    /// dropped. Fails unless the preimages are measurable, pairwise disjoint,
    /// and cover the carrier of `space`.
    pub fn new<S>(space: &S, parts: impl IntoIterator<Item = (V, PointSet<P>)>) -> Result<Self>
    where
        S: MeasurableSpace<Point = P>,
    {
        let carrier = space.carrier();
        let mut merged: BTreeMap<V, PointSet<P>> = BTreeMap::new();
        let mut covered: PointSet<P> = PointSet::new();

        for (value, preimage) in parts {
            if preimage.is_empty() {
                continue;
            }
            if !preimage.is_subset(carrier) {
                return Err(KernelError::invalid_partition(format!(
                    "preimage of {value:?} leaves the carrier of {}",
                    space.name()
                )));
            }
            space.require_measurable(&preimage)?;
            if !covered.is_disjoint(&preimage) {
                return Err(KernelError::invalid_partition(format!(
                    "preimage of {value:?} overlaps an earlier preimage"
                )));
            }
            covered.extend(preimage.iter().cloned());
            merged.entry(value).or_default().extend(preimage);
        }

        if covered != *carrier {
            let missing: Vec<&P> = carrier.difference(&covered).collect();
            return Err(KernelError::invalid_partition(format!(
                "preimages miss {missing:?}"
            )));
        }

        Ok(Self {
            domain: covered,
            parts: merged,
        })
    }

    /// The constant function `v`.
    pub fn constant<S>(space: &S, value: V) -> Self
    where
        S: MeasurableSpace<Point = P>,
    {
        Self::constant_on(space.carrier().clone(), value)
    }

    fn constant_on(domain: PointSet<P>, value: V) -> Self {
        let mut parts = BTreeMap::new();
        if !domain.is_empty() {
            parts.insert(value, domain.clone());
        }
        Self { domain, parts }
    }

    /// Tabulate a measurable function over the carrier.
    pub fn from_fn<S>(space: &S, f: impl Fn(&P) -> V) -> Result<Self>
    where
        S: MeasurableSpace<Point = P>,
    {
        if !space.is_measurable_fn::<V>(&f) {
            return Err(KernelError::non_measurable(format!(
                "function is not constant on the atoms of {}",
                space.name()
            )));
        }
        let mut parts: BTreeMap<V, PointSet<P>> = BTreeMap::new();
        for x in space.carrier() {
            parts.entry(f(x)).or_default().insert(x.clone());
        }
        Ok(Self {
            domain: space.carrier().clone(),
            parts,
        })
    }

    pub fn domain(&self) -> &PointSet<P> {
        &self.domain
    }

    /// The distinct values, in increasing order.
    pub fn range(&self) -> impl Iterator<Item = &V> {
        self.parts.keys()
    }

    pub fn range_len(&self) -> usize {
        self.parts.len()
    }

    /// `(value, preimage)` pairs.
    pub fn parts(&self) -> &BTreeMap<V, PointSet<P>> {
        &self.parts
    }

    /// `f⁻¹(v)`; empty when `v` is not attained.
    pub fn preimage(&self, value: &V) -> PointSet<P> {
        self.parts.get(value).cloned().unwrap_or_default()
    }

    /// `f⁻¹({v : select(v)})`.
    pub fn preimage_of(&self, select: impl Fn(&V) -> bool) -> PointSet<P> {
        self.parts
            .iter()
            .filter(|(v, _)| select(v))
            .flat_map(|(_, pre)| pre.iter().cloned())
            .collect()
    }

    /// `f(x)`, or `None` outside the domain.
    pub fn eval(&self, x: &P) -> Option<&V> {
        self.parts
            .iter()
            .find(|(_, pre)| pre.contains(x))
            .map(|(v, _)| v)
    }

    /// Post-compose with `g`, merging preimages of values `g` identifies.
    pub fn map<W>(&self, g: impl Fn(&V) -> W) -> SimpleFunc<P, W>
    where
        W: Clone + Ord + fmt::Debug,
    {
        let mut parts: BTreeMap<W, PointSet<P>> = BTreeMap::new();
        for (v, pre) in &self.parts {
            parts
                .entry(g(v))
                .or_default()
                .extend(pre.iter().cloned());
        }
        SimpleFunc {
            domain: self.domain.clone(),
            parts,
        }
    }

    /// `x ↦ (f(x), g(x))`.
    ///
    /// The preimage of `(v, w)` is `f⁻¹(v) ∩ g⁻¹(w)`; only nonempty
    /// intersections appear in the range.
    pub fn pair<W>(&self, other: &SimpleFunc<P, W>) -> Result<SimpleFunc<P, (V, W)>>
    where
        W: Clone + Ord + fmt::Debug,
    {
        self.require_same_domain(&other.domain)?;
        let mut parts = BTreeMap::new();
        for (v, pre_v) in &self.parts {
            for (w, pre_w) in &other.parts {
                let meet: PointSet<P> = pre_v.intersection(pre_w).cloned().collect();
                if !meet.is_empty() {
                    parts.insert((v.clone(), w.clone()), meet);
                }
            }
        }
        Ok(SimpleFunc {
            domain: self.domain.clone(),
            parts,
        })
    }

    /// `self` on `s`, `other` off `s`.
    ///
    /// `s` must be measurable; there is no fallback here.
    pub fn piecewise<S>(space: &S, s: &PointSet<P>, on: &Self, off: &Self) -> Result<Self>
    where
        S: MeasurableSpace<Point = P>,
    {
        space.require_measurable(s)?;
        on.require_same_domain(space.carrier())?;
        off.require_same_domain(space.carrier())?;

        let mut parts: BTreeMap<V, PointSet<P>> = BTreeMap::new();
        for (v, pre) in &on.parts {
            parts
                .entry(v.clone())
                .or_default()
                .extend(pre.intersection(s).cloned());
        }
        for (v, pre) in &off.parts {
            parts
                .entry(v.clone())
                .or_default()
                .extend(pre.difference(s).cloned());
        }
        parts.retain(|_, pre| !pre.is_empty());
        Ok(Self {
            domain: on.domain.clone(),
            parts,
        })
    }

    pub(crate) fn require_same_domain(&self, domain: &PointSet<P>) -> Result<()> {
        if self.domain == *domain {
            Ok(())
        } else {
            Err(KernelError::domain_mismatch(format!(
                "{:?} vs {:?}",
                self.domain, domain
            )))
        }
    }
}

impl<P, V> SimpleFunc<P, V>
where
    P: Clone + Ord + fmt::Debug,
    V: Clone + Ord + fmt::Debug + Zero,
{
    /// The function on `s`, zero off `s`.
    ///
    /// When `s` is not measurable, `RestrictPolicy::Strict` fails and
    /// `RestrictPolicy::ZeroFallback` returns the zero function.
    pub fn restrict<S>(&self, space: &S, s: &PointSet<P>, policy: RestrictPolicy) -> Result<Self>
    where
        S: MeasurableSpace<Point = P>,
    {
        self.require_same_domain(space.carrier())?;
        if !space.is_measurable(s) {
            return match policy {
                RestrictPolicy::Strict => Err(KernelError::non_measurable(format!(
                    "cannot restrict to {s:?} in {}",
                    space.name()
                ))),
                RestrictPolicy::ZeroFallback => {
                    tracing::warn!(
                        space = space.name(),
                        set = ?s,
                        "restrict to non-measurable set, falling back to zero"
                    );
                    Ok(Self::constant_on(self.domain.clone(), V::zero()))
                }
            };
        }
        let zero = Self::constant_on(self.domain.clone(), V::zero());
        Self::piecewise(space, s, self, &zero)
    }

    /// `c` on `s`, zero elsewhere.
    pub fn indicator<S>(
        space: &S,
        s: &PointSet<P>,
        value: V,
        policy: RestrictPolicy,
    ) -> Result<Self>
    where
        S: MeasurableSpace<Point = P>,
    {
        Self::constant(space, value).restrict(space, s, policy)
    }

    /// Points where the function is nonzero.
    pub fn support(&self) -> PointSet<P> {
        self.preimage_of(|v| !v.is_zero())
    }
}

impl<P> SimpleFunc<P, ENNReal>
where
    P: Clone + Ord + fmt::Debug,
{
    pub fn zero<S>(space: &S) -> Self
    where
        S: MeasurableSpace<Point = P>,
    {
        Self::constant(space, ENNReal::zero())
    }

    /// Pointwise binary operation through `pair`.
    fn combine(&self, other: &Self, op: impl Fn(&ENNReal, &ENNReal) -> ENNReal) -> Result<Self> {
        Ok(self.pair(other)?.map(|(a, b)| op(a, b)))
    }

    /// `f + g`.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a + b)
    }

    /// `c · f`.
    pub fn scale(&self, c: &ENNReal) -> Self {
        self.map(|v| c * v)
    }

    /// `f ⊔ g`.
    pub fn sup(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a.max(b).clone())
    }

    /// `f ⊓ g`.
    pub fn inf(&self, other: &Self) -> Result<Self> {
        self.combine(other, |a, b| a.min(b).clone())
    }

    /// Pointwise truncated difference `max(f - g, 0)`.
    pub fn truncated_sub(&self, other: &Self) -> Result<Self> {
        self.combine(other, ENNReal::truncated_sub)
    }

    /// `f ≤ g` pointwise.
    pub fn le(&self, other: &Self) -> Result<bool> {
        Ok(self.pair(other)?.range().all(|(a, b)| a <= b))
    }

    pub fn is_zero(&self) -> bool {
        self.range().all(Zero::is_zero)
    }
}

impl<P: fmt::Debug, V: fmt::Display> fmt::Display for SimpleFunc<P, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (v, pre)) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            let points: Vec<&P> = pre.iter().collect();
            write!(f, "{v} on {points:?}")?;
        }
        write!(f, "}}")
    }
}
