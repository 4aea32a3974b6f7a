//! The lower Lebesgue integral of a measurable function.
//!
//! ```text
//! integral(f, μ) = sup_n lintegral(approx(n), μ)
//! ```
//!
//! Over a finitely generated σ-algebra the supremum is decided after finitely
//! many steps: once every finite value of `f` has been enumerated, the
//! approximation agrees with `f` off `{f = ∞}`, and the set `{f = ∞}`
//! contributes `∞` exactly when it has positive measure. With an unbounded
//! enumeration that set is pushed past every bound, so the supremum is `∞`.
//!
//! The same sequence drives the induction scheme: a property shown for
//! indicators, closed under disjoint sums and monotone suprema, holds for the
//! integral. [`IntegralProperty`] is that scheme as a visitor.

use crate::approx::Approximator;
use crate::config::EngineConfig;
use crate::ennreal::ENNReal;
use crate::enumeration::Enumeration;
use crate::error::{KernelError, Result};
use crate::measure::Measure;
use crate::simple_func::SimpleFunc;
use crate::space::{MeasurableSpace, PointSet};
use num_traits::Zero;
use serde::Serialize;
use std::fmt;

/// How `integral` reached its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Convergence {
    /// `{f = ∞}` is null; the value is the supremum of finite approximants.
    Attained,

    /// `{f = ∞}` has positive measure.
    Divergent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Integral {
    pub value: ENNReal,

    /// First approximant that agrees with the target off `{f = ∞}`, if one
    /// was reached within `max_steps`.
    pub steps: Option<usize>,

    pub convergence: Convergence,
}

/// `sup_n lintegral(approx(n), μ)`.
///
/// With a dense enumeration `approx(n)` converges to the target on every
/// atom, so the supremum is the lintegral of the target read as a simple
/// function; the step loop only records where it was first attained.
/// Otherwise the value is decided by the loop: once every finite value is
/// attained, `{f = ∞}` contributes `∞` if it has positive measure and the
/// enumeration is unbounded.
///
/// Fails with `NonMeasurable` for a target that is not constant on atoms,
/// and with `StepBudgetExhausted` when a non-dense enumeration does not
/// decide the supremum within `config.max_steps` approximants.
pub fn integral<S, E, F, M>(
    space: &S,
    enumeration: E,
    target: F,
    mu: &M,
    config: &EngineConfig,
) -> Result<Integral>
where
    S: MeasurableSpace,
    E: Enumeration,
    F: Fn(&S::Point) -> ENNReal,
    M: Measure<Point = S::Point> + Sync,
{
    let approximator =
        Approximator::new(space, enumeration, target).with_policy(config.restrict_policy);
    approximator.check_target()?;

    let mut infinite = PointSet::new();
    let mut finite = Vec::new();
    for x in space.carrier() {
        let fx = approximator.target_at(x);
        if fx.is_top() {
            infinite.insert(x.clone());
        } else {
            finite.push((x, fx));
        }
    }
    let diverges = !mu.is_null(&infinite);
    let dense = approximator.enumeration().is_dense();
    let unbounded = approximator.enumeration().is_unbounded();

    // A bounded enumeration cannot decide a divergent sup; run it to the
    // budget so the reported lower bound is the last approximant's.
    let decides = dense || unbounded || !diverges;
    let mut settled = None;
    let mut last = None;
    for (step, f) in approximator.iter().take(config.max_steps.saturating_add(1)).enumerate() {
        let f = f?;
        tracing::trace!(step, "integral step");
        if settled.is_none() && finite.iter().all(|(x, fx)| f.eval(x) == Some(fx)) {
            settled = Some(step);
        }
        last = Some(f);
        if settled.is_some() && decides {
            break;
        }
    }

    let convergence = if diverges {
        Convergence::Divergent
    } else {
        Convergence::Attained
    };

    if dense {
        let value = SimpleFunc::from_fn(space, |x| approximator.target_at(x))?
            .lintegral_with(mu, config);
        tracing::debug!(steps = ?settled, value = %value, "integral of dense approximation");
        return Ok(Integral {
            value,
            steps: settled,
            convergence,
        });
    }

    let lower = last
        .map(|f| f.lintegral_with(mu, config))
        .unwrap_or_else(ENNReal::zero);
    match settled {
        Some(step) if decides => {
            let value = if diverges { ENNReal::Top } else { lower };
            tracing::debug!(steps = step, value = %value, "integral decided");
            Ok(Integral {
                value,
                steps: Some(step),
                convergence,
            })
        }
        _ => Err(KernelError::StepBudgetExhausted {
            steps: config.max_steps,
            lower_bound: lower,
        }),
    }
}

/// [`integral`] with the enumeration named in `config`.
pub fn lintegral_of_fn<S, F, M>(
    space: &S,
    target: F,
    mu: &M,
    config: &EngineConfig,
) -> Result<Integral>
where
    S: MeasurableSpace,
    F: Fn(&S::Point) -> ENNReal,
    M: Measure<Point = S::Point> + Sync,
{
    integral(space, config.enumeration.build(), target, mu, config)
}

/// A property proved by induction over measurable functions.
///
/// `fold_simple` evaluates a simple function as a disjoint sum of
/// indicators; `fold_measurable` evaluates a target as the monotone
/// supremum of its folded approximants.
pub trait IntegralProperty<P> {
    type Output;

    /// `value` on `set`, zero elsewhere.
    fn on_indicator(&self, value: &ENNReal, set: &PointSet<P>) -> Result<Self::Output>;

    /// Two functions with disjoint supports.
    fn on_disjoint_sum(&self, left: Self::Output, right: Self::Output) -> Result<Self::Output>;

    /// An increasing sequence of stages.
    fn on_monotone_sup(&self, stages: Vec<Self::Output>) -> Result<Self::Output>;
}

/// Fold one simple function through `visitor`.
///
/// A function with an empty domain folds as the zero indicator on `∅`.
pub fn fold_simple<P, T>(f: &SimpleFunc<P, ENNReal>, visitor: &T) -> Result<T::Output>
where
    P: Clone + Ord + fmt::Debug,
    T: IntegralProperty<P> + ?Sized,
{
    let mut parts = f.parts().iter();
    let Some((v, pre)) = parts.next() else {
        return visitor.on_indicator(&ENNReal::zero(), &PointSet::new());
    };
    parts.try_fold(visitor.on_indicator(v, pre)?, |acc, (v, pre)| {
        let next = visitor.on_indicator(v, pre)?;
        visitor.on_disjoint_sum(acc, next)
    })
}

/// Fold the first `steps` approximants of a target and take their
/// monotone supremum.
pub fn fold_measurable<S, E, F, T>(
    approximator: &Approximator<'_, S, E, F>,
    steps: usize,
    visitor: &T,
) -> Result<T::Output>
where
    S: MeasurableSpace,
    E: Enumeration,
    F: Fn(&S::Point) -> ENNReal,
    T: IntegralProperty<S::Point> + ?Sized,
{
    let stages = approximator
        .iter()
        .take(steps)
        .map(|f| fold_simple(&f?, visitor))
        .collect::<Result<Vec<_>>>()?;
    visitor.on_monotone_sup(stages)
}

/// The lintegral itself, as an [`IntegralProperty`].
#[derive(Debug, Clone)]
pub struct LIntegralOf<M> {
    measure: M,
}

impl<M> LIntegralOf<M> {
    pub fn new(measure: M) -> Self {
        Self { measure }
    }
}

impl<M: Measure> IntegralProperty<M::Point> for LIntegralOf<M> {
    type Output = ENNReal;

    fn on_indicator(&self, value: &ENNReal, set: &PointSet<M::Point>) -> Result<ENNReal> {
        Ok(value * &self.measure.measure(set))
    }

    fn on_disjoint_sum(&self, left: ENNReal, right: ENNReal) -> Result<ENNReal> {
        Ok(left + right)
    }

    fn on_monotone_sup(&self, stages: Vec<ENNReal>) -> Result<ENNReal> {
        Ok(stages.into_iter().max().unwrap_or_else(ENNReal::zero))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ennreal::NNRat;
    use crate::enumeration::{CalkinWilf, CantorPairs, FromFn, Naturals};
    use crate::measure::AtomicMeasure;
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
            _ => ENNReal::ratio(2, 3),
        }
    }

    #[test]
    fn attains_exact_value() {
        let space = abc();
        let mu = AtomicMeasure::counting(&space);
        let result = integral(&space, CalkinWilf, target, &mu, &EngineConfig::default()).unwrap();
        assert_eq!(result.value, ENNReal::ratio(13, 6));
        assert_eq!(result.convergence, Convergence::Attained);
    }

    #[test]
    fn independent_of_dense_enumeration() {
        let space = abc();
        let mu = AtomicMeasure::new(&space, vec![n(2), ENNReal::Top, n(3)]).unwrap();
        let config = EngineConfig::default();
        let cw = integral(&space, CalkinWilf, target, &mu, &config).unwrap();
        let cp = integral(&space, CantorPairs, target, &mu, &config).unwrap();
        assert_eq!(cw.value, cp.value);
        assert_eq!(cw.value, n(5));
    }

    #[test]
    fn infinite_values_on_null_and_positive_sets() {
        let space = FiniteSpace::discrete("pq", ['p', 'q']);
        let mu = AtomicMeasure::new(&space, vec![n(1), n(0)]).unwrap();
        let config = EngineConfig::default();

        let on_null = integral(
            &space,
            CalkinWilf,
            |x: &char| if *x == 'q' { ENNReal::Top } else { n(2) },
            &mu,
            &config,
        )
        .unwrap();
        assert_eq!(on_null.value, n(2));
        assert_eq!(on_null.convergence, Convergence::Attained);

        let on_mass = integral(&space, CalkinWilf, |_: &char| ENNReal::Top, &mu, &config).unwrap();
        assert_eq!(on_mass.value, ENNReal::Top);
        assert_eq!(on_mass.convergence, Convergence::Divergent);
    }

    #[test]
    fn naturals_never_reach_three_halves() {
        let space = abc();
        let mu = AtomicMeasure::counting(&space);
        let config = EngineConfig::default().with_max_steps(16);
        let err = integral(&space, Naturals, |_: &char| ENNReal::ratio(3, 2), &mu, &config)
            .unwrap_err();
        match err {
            KernelError::StepBudgetExhausted { steps, lower_bound } => {
                assert_eq!(steps, 16);
                assert_eq!(lower_bound, n(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dense_value_does_not_wait_for_enumeration() {
        let space = abc();
        let mu = AtomicMeasure::counting(&space);
        let config = EngineConfig::default().with_max_steps(4);
        let result = integral(&space, CalkinWilf, target, &mu, &config).unwrap();
        assert_eq!(result.value, ENNReal::ratio(13, 6));
        assert_eq!(result.steps, None);
        assert_eq!(result.convergence, Convergence::Attained);
    }

    #[test]
    fn naturals_decide_integers_and_divergence() {
        let space = abc();
        let mu = AtomicMeasure::counting(&space);
        let config = EngineConfig::default();

        let twenty = integral(&space, Naturals, |_: &char| n(20), &mu, &config).unwrap();
        assert_eq!(twenty.value, n(60));
        assert_eq!(twenty.steps, Some(21));

        let top = integral(&space, Naturals, |_: &char| ENNReal::Top, &mu, &config).unwrap();
        assert_eq!(top.value, ENNReal::Top);
        assert_eq!(top.convergence, Convergence::Divergent);
        assert_eq!(top.steps, Some(0));
    }

    #[test]
    fn bounded_enumeration_cannot_certify_divergence() {
        let space = abc();
        let mu = AtomicMeasure::counting(&space);
        let config = EngineConfig::default().with_max_steps(8);
        let bits = FromFn::new("bits", |k| NNRat::from_integer((k % 2) as u64));
        let err = integral(&space, bits, |_: &char| ENNReal::Top, &mu, &config).unwrap_err();
        assert!(matches!(
            err,
            KernelError::StepBudgetExhausted { lower_bound, .. } if lower_bound == n(3)
        ));
    }

    #[test]
    fn non_measurable_target_rejected() {
        let space =
            FiniteSpace::from_atoms("coarse", vec![point_set(&['a', 'b']), point_set(&['c'])])
                .unwrap();
        let mu = AtomicMeasure::counting(&space);
        let err = lintegral_of_fn(&space, target, &mu, &EngineConfig::default()).unwrap_err();
        assert!(matches!(err, KernelError::NonMeasurable { .. }));
    }

    #[test]
    fn visitor_reproduces_lintegral() {
        let space = abc();
        let mu = AtomicMeasure::counting(&space);
        let visitor = LIntegralOf::new(&mu);

        let f = SimpleFunc::from_fn(&space, target).unwrap();
        assert_eq!(fold_simple(&f, &visitor).unwrap(), f.lintegral(&mu));

        let empty = FiniteSpace::<char>::discrete("empty", []);
        let none = SimpleFunc::zero(&empty);
        assert_eq!(fold_simple(&none, &visitor).unwrap(), n(0));

        let config = EngineConfig::default();
        let result = integral(&space, CalkinWilf, target, &mu, &config).unwrap();
        let approximator = Approximator::new(&space, CalkinWilf, target);
        let folded = fold_measurable(&approximator, result.steps.unwrap() + 1, &visitor).unwrap();
        assert_eq!(folded, result.value);
        assert_eq!(fold_measurable(&approximator, 0, &visitor).unwrap(), n(0));
    }

    /// Counts indicator leaves; checks the fold visits every part once.
    struct Leaves;

    impl IntegralProperty<char> for Leaves {
        type Output = usize;

        fn on_indicator(&self, _value: &ENNReal, set: &PointSet<char>) -> Result<usize> {
            Ok(usize::from(!set.is_empty()))
        }

        fn on_disjoint_sum(&self, left: usize, right: usize) -> Result<usize> {
            Ok(left + right)
        }

        fn on_monotone_sup(&self, stages: Vec<usize>) -> Result<usize> {
            Ok(stages.into_iter().max().unwrap_or(0))
        }
    }

    #[test]
    fn fold_visits_each_part() {
        let space = abc();
        let f = SimpleFunc::from_fn(&space, target).unwrap();
        assert_eq!(fold_simple(&f, &Leaves).unwrap(), 3);
    }
}
