//! Monotone approximation by simple functions.
//!
//! Given an enumeration `q_0, q_1, …` of ℚ≥0 and a target `f: X → ℝ≥0∞`,
//!
//! ```text
//! approx(n)(x) = max { q_k : k < n, q_k ≤ f(x) }      (max ∅ = 0)
//!             = sup_{k<n} (q_k on {x : q_k ≤ f(x)}, 0 elsewhere)
//! ```
//!
//! Each step adds one level set, so `approx(n) ≤ approx(n+1)`. With a dense
//! enumeration every finite rational value `f(x)` is hit exactly after
//! finitely many steps, and `f(x) = ∞` drives `approx(n)(x)` past every bound.
//!
//! The telescoping differences `eapprox_diff(k)` sum back to `approx(n)`.

use crate::config::RestrictPolicy;
use crate::ennreal::ENNReal;
use crate::enumeration::Enumeration;
use crate::error::{KernelError, Result};
use crate::simple_func::SimpleFunc;
use crate::space::MeasurableSpace;
use num_traits::Zero;

/// The approximation sequence of one target function.
pub struct Approximator<'a, S, E, F> {
    space: &'a S,
    enumeration: E,
    target: F,
    policy: RestrictPolicy,
}

impl<'a, S, E, F> Approximator<'a, S, E, F>
where
    S: MeasurableSpace,
    E: Enumeration,
    F: Fn(&S::Point) -> ENNReal,
{
    pub fn new(space: &'a S, enumeration: E, target: F) -> Self {
        Self {
            space,
            enumeration,
            target,
            policy: RestrictPolicy::Strict,
        }
    }

    /// How level sets that turn out non-measurable are handled.
    pub fn with_policy(mut self, policy: RestrictPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn space(&self) -> &'a S {
        self.space
    }

    pub fn enumeration(&self) -> &E {
        &self.enumeration
    }

    pub fn target_at(&self, x: &S::Point) -> ENNReal {
        (self.target)(x)
    }

    /// Fail unless the target is measurable.
    pub fn check_target(&self) -> Result<()> {
        if self.space.is_measurable_fn::<ENNReal>(&self.target) {
            Ok(())
        } else {
            Err(KernelError::non_measurable(format!(
                "target is not constant on the atoms of {}",
                self.space.name()
            )))
        }
    }

    /// `q_k` on `{x : q_k ≤ f(x)}`, zero elsewhere.
    fn level(&self, k: usize) -> Result<SimpleFunc<S::Point, ENNReal>> {
        let q = ENNReal::from(self.enumeration.nth(k));
        let level_set = self.space.select(&|x| q <= (self.target)(x));
        SimpleFunc::indicator(self.space, &level_set, q, self.policy)
    }

    /// `approx(n)`, built as the supremum of the first `n` level functions.
    pub fn approx(&self, n: usize) -> Result<SimpleFunc<S::Point, ENNReal>> {
        (0..n).try_fold(SimpleFunc::zero(self.space), |acc, k| {
            acc.sup(&self.level(k)?)
        })
    }

    /// `approx(n)(x)` straight from the definition, without building sets.
    pub fn approx_at(&self, x: &S::Point, n: usize) -> ENNReal {
        let fx = (self.target)(x);
        (0..n)
            .map(|k| ENNReal::from(self.enumeration.nth(k)))
            .filter(|q| *q <= fx)
            .max()
            .unwrap_or_else(ENNReal::zero)
    }

    /// The lazy sequence `approx(0), approx(1), …`.
    pub fn iter(&self) -> ApproxIter<'_, 'a, S, E, F> {
        ApproxIter {
            approximator: self,
            next: 0,
            current: None,
            failed: false,
        }
    }

    /// `diff(0) = approx(0)`, `diff(n+1) = approx(n+1) − approx(n)`.
    pub fn eapprox_diff(&self, n: usize) -> Result<SimpleFunc<S::Point, ENNReal>> {
        if n == 0 {
            return self.approx(0);
        }
        let upper = self.approx(n)?;
        let lower = self.approx(n - 1)?;
        monotone_diff(&upper, &lower)
    }

    /// `Σ_{k ≤ n} diff(k)`, which telescopes to `approx(n)`.
    pub fn sum_eapprox_diff(&self, n: usize) -> Result<SimpleFunc<S::Point, ENNReal>> {
        (0..=n).try_fold(SimpleFunc::zero(self.space), |acc, k| {
            acc.add(&self.eapprox_diff(k)?)
        })
    }
}

/// `upper − lower` for `lower ≤ upper`.
///
/// A point where `lower > upper` breaks the monotonicity invariant of the
/// approximation: debug builds panic, release builds clamp to zero and log.
pub(crate) fn monotone_diff<P>(
    upper: &SimpleFunc<P, ENNReal>,
    lower: &SimpleFunc<P, ENNReal>,
) -> Result<SimpleFunc<P, ENNReal>>
where
    P: Clone + Ord + std::fmt::Debug,
{
    Ok(upper.pair(lower)?.map(|(hi, lo)| {
        debug_assert!(lo <= hi, "approximation decreased from {lo} to {hi}");
        hi.checked_sub(lo).unwrap_or_else(|| {
            tracing::error!(%hi, %lo, "approximation decreased, clamping difference to zero");
            ENNReal::zero()
        })
    }))
}

/// Lazy iterator over an approximation sequence.
///
/// Each item is derived from the previous one plus a single new level set.
/// Dropping the iterator is all the cancellation there is.
pub struct ApproxIter<'r, 'a, S: MeasurableSpace, E, F> {
    approximator: &'r Approximator<'a, S, E, F>,
    next: usize,
    current: Option<SimpleFunc<S::Point, ENNReal>>,
    failed: bool,
}

impl<'r, 'a, S, E, F> ApproxIter<'r, 'a, S, E, F>
where
    S: MeasurableSpace,
{
    /// Index of the next approximant.
    pub fn position(&self) -> usize {
        self.next
    }
}

impl<S, E, F> Iterator for ApproxIter<'_, '_, S, E, F>
where
    S: MeasurableSpace,
    E: Enumeration,
    F: Fn(&S::Point) -> ENNReal,
{
    type Item = Result<SimpleFunc<S::Point, ENNReal>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let n = self.next;
        let step = match self.current.take() {
            None => Ok(SimpleFunc::zero(self.approximator.space)),
            Some(prev) => self
                .approximator
                .level(n - 1)
                .and_then(|level| prev.sup(&level)),
        };
        match step {
            Ok(f) => {
                tracing::trace!(step = n, range = f.range_len(), "approximation step");
                self.current = Some(f.clone());
                self.next += 1;
                Some(Ok(f))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enumeration::{CalkinWilf, Naturals};
    use crate::space::{FiniteSpace, point_set};

    fn n(v: u64) -> ENNReal {
        ENNReal::from(v)
    }

    fn abc() -> FiniteSpace<char> {
        FiniteSpace::discrete("abc", ['a', 'b', 'c'])
    }

    fn target(x: &char) -> ENNReal {
        match x {
            'a' => ENNReal::ratio(3, 2),
            'b' => n(0),
            _ => ENNReal::Top,
        }
    }

    #[test]
    fn approx_zero_is_zero() {
        let space = abc();
        let a = Approximator::new(&space, CalkinWilf, target);
        assert!(a.approx(0).unwrap().is_zero());
    }

    #[test]
    fn approx_matches_pointwise_definition() {
        let space = abc();
        let a = Approximator::new(&space, CalkinWilf, target);
        for step in 0..24 {
            let f = a.approx(step).unwrap();
            for x in space.carrier() {
                assert_eq!(f.eval(x), Some(&a.approx_at(x, step)), "x={x} n={step}");
            }
        }
    }

    #[test]
    fn approx_is_monotone() {
        let space = abc();
        let a = Approximator::new(&space, CalkinWilf, target);
        let seq: Vec<_> = a.iter().take(32).map(|f| f.unwrap()).collect();
        for pair in seq.windows(2) {
            assert!(pair[0].le(&pair[1]).unwrap());
        }
    }

    #[test]
    fn iter_agrees_with_approx() {
        let space = abc();
        let a = Approximator::new(&space, CalkinWilf, target);
        for (step, f) in a.iter().take(12).enumerate() {
            assert_eq!(f.unwrap(), a.approx(step).unwrap());
        }
    }

    #[test]
    fn exact_once_value_enumerated() {
        let space = abc();
        let a = Approximator::new(&space, CalkinWilf, target);
        let idx = CalkinWilf.index_of(&crate::ennreal::NNRat::ratio(3, 2)).unwrap();
        let before = a.approx(idx).unwrap();
        let after = a.approx(idx + 1).unwrap();
        assert!(before.eval(&'a') < Some(&ENNReal::ratio(3, 2)));
        assert_eq!(after.eval(&'a'), Some(&ENNReal::ratio(3, 2)));
        assert_eq!(a.approx(idx + 40).unwrap().eval(&'a'), Some(&ENNReal::ratio(3, 2)));
    }

    #[test]
    fn naturals_under_infinite_target() {
        let space = abc();
        let a = Approximator::new(&space, Naturals, |_: &char| ENNReal::Top);
        for step in 1..10u64 {
            let f = a.approx(step as usize).unwrap();
            assert_eq!(f.range().cloned().collect::<Vec<_>>(), vec![n(step - 1)]);
        }
    }

    #[test]
    fn diffs_telescope() {
        let space = abc();
        let a = Approximator::new(&space, CalkinWilf, target);
        for step in 0..16 {
            assert_eq!(a.sum_eapprox_diff(step).unwrap(), a.approx(step).unwrap());
        }
        assert_eq!(a.eapprox_diff(0).unwrap(), a.approx(0).unwrap());
    }

    #[test]
    fn non_measurable_target_detected() {
        let space =
            FiniteSpace::from_atoms("coarse", vec![point_set(&['a', 'b']), point_set(&['c'])])
                .unwrap();
        let a = Approximator::new(&space, CalkinWilf, target);
        assert!(matches!(a.check_target(), Err(KernelError::NonMeasurable { .. })));
        assert!(a.approx(4).is_err());

        let lenient = Approximator::new(&space, CalkinWilf, target)
            .with_policy(RestrictPolicy::ZeroFallback);
        assert!(lenient.approx(4).is_ok());

        let strict = Approximator::new(&space, CalkinWilf, target);
        let mut it = strict.iter();
        assert!(it.next().unwrap().is_ok());
        assert!(it.by_ref().take(8).any(|f| f.is_err()));
        assert!(it.next().is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "approximation decreased")]
    fn decreasing_difference_panics_in_debug() {
        let space = abc();
        let lo = SimpleFunc::constant(&space, n(2));
        let hi = SimpleFunc::constant(&space, n(1));
        let _ = monotone_diff(&hi, &lo);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn decreasing_difference_clamps_in_release() {
        let space = abc();
        let lo = SimpleFunc::constant(&space, n(2));
        let hi = SimpleFunc::constant(&space, n(1));
        assert!(monotone_diff(&hi, &lo).unwrap().is_zero());
    }
}
