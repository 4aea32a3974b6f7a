//! Lower integrals of simple functions.
//!
//! ```text
//! lintegral(f, μ) = Σ_{v ∈ range f} v · μ(f⁻¹(v))
//! ```
//!
//! Terms use `0 · ∞ = 0`, so a value of zero on a set of infinite measure
//! (or a value of `∞` on a null set) contributes nothing. The terms are
//! independent; large ranges are evaluated on the rayon pool and reduced with
//! exact `+`, so the result does not depend on evaluation order.
//!
//! The algebra this satisfies, exactly:
//!
//! - `lintegral(f + g, μ) = lintegral(f, μ) + lintegral(g, μ)`
//! - `lintegral(c · f, μ) = c · lintegral(f, μ)`
//! - `lintegral(f, μ + ν) = lintegral(f, μ) + lintegral(f, ν)`, and over `Σ μ_i`
//! - `lintegral(restrict(f, s), μ) = lintegral(f, μ.restrict(s))`
//! - `f ≤ g`, `μ ≤ ν` ⟹ `lintegral(f, μ) ≤ lintegral(g, ν)`
//! - `f = g` μ-a.e. ⟹ equal lintegrals

use crate::config::EngineConfig;
use crate::ennreal::ENNReal;
use crate::measure::{Measure, MeasureExt};
use crate::simple_func::SimpleFunc;
use crate::space::{MeasurableSpace, PointSet};
use num_traits::Zero;
use rayon::prelude::*;
use std::fmt;

fn term<M: Measure>(value: &ENNReal, preimage: &PointSet<M::Point>, mu: &M) -> ENNReal {
    let mass = mu.measure(preimage);
    let t = value * &mass;
    tracing::trace!(%value, %mass, term = %t, "lintegral term");
    t
}

impl<P> SimpleFunc<P, ENNReal>
where
    P: Clone + Ord + fmt::Debug + Send + Sync,
{
    /// `Σ v · μ(f⁻¹(v))` with the default engine configuration.
    pub fn lintegral<M>(&self, mu: &M) -> ENNReal
    where
        M: Measure<Point = P> + Sync,
    {
        self.lintegral_with(mu, &EngineConfig::default())
    }

    /// `Σ v · μ(f⁻¹(v))`, parallel over terms once the range exceeds
    /// `config.parallel_threshold`.
    pub fn lintegral_with<M>(&self, mu: &M, config: &EngineConfig) -> ENNReal
    where
        M: Measure<Point = P> + Sync,
    {
        let parts: Vec<(&ENNReal, &PointSet<P>)> = self.parts().iter().collect();
        if parts.len() > config.parallel_threshold {
            parts
                .par_iter()
                .map(|(v, pre)| term(v, pre, mu))
                .reduce(ENNReal::zero, |a, b| a + b)
        } else {
            parts.iter().map(|(v, pre)| term(v, pre, mu)).sum()
        }
    }

    /// `∫_s f dμ = lintegral(f, μ.restrict(s))`.
    pub fn set_lintegral<M>(&self, s: &PointSet<P>, mu: &M) -> ENNReal
    where
        M: Measure<Point = P> + Sync,
    {
        self.lintegral(&mu.restrict(s.clone()))
    }

    /// Whether the support of `f` has finite measure.
    pub fn fin_meas_supp<M>(&self, mu: &M) -> bool
    where
        M: Measure<Point = P>,
    {
        mu.measure(&self.support()).is_finite()
    }

    /// Whether `lintegral(f, μ) < ∞`.
    ///
    /// Holds iff every value of `∞` sits on a null set and every nonzero
    /// value sits on a set of finite measure.
    pub fn lintegral_lt_top<M>(&self, mu: &M) -> bool
    where
        M: Measure<Point = P>,
    {
        self.parts()
            .iter()
            .all(|(v, pre)| (v * &mu.measure(pre)).is_finite())
    }
}

/// `lintegral(f, μ)`.
pub fn lintegral<P, M>(f: &SimpleFunc<P, ENNReal>, mu: &M) -> ENNReal
where
    P: Clone + Ord + fmt::Debug + Send + Sync,
    M: Measure<Point = P> + Sync,
{
    f.lintegral(mu)
}

/// `lintegral(const c, μ) = c · μ(univ)`.
pub fn const_lintegral<S, M>(space: &S, c: &ENNReal, mu: &M) -> ENNReal
where
    S: MeasurableSpace,
    M: Measure<Point = S::Point>,
{
    c * &mu.measure(space.carrier())
}
