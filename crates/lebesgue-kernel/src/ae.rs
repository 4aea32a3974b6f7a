//! Almost-everywhere equality.
//!
//! Two simple functions are μ-a.e. equal when the set where they differ is
//! μ-null. An [`AeClass`] carries one representative together with the
//! measure it is taken against; membership is the predicate `ae_eq`, so two
//! classes compare by their representatives without ever materializing the
//! quotient.

use crate::ennreal::ENNReal;
use crate::error::Result;
use crate::measure::Measure;
use crate::simple_func::SimpleFunc;
use std::fmt;

/// `μ({x : f(x) ≠ g(x)}) = 0`.
pub fn ae_eq<P, V, M>(f: &SimpleFunc<P, V>, g: &SimpleFunc<P, V>, mu: &M) -> Result<bool>
where
    P: Clone + Ord + fmt::Debug,
    V: Clone + Ord + fmt::Debug,
    M: Measure<Point = P>,
{
    let differ = f.pair(g)?.preimage_of(|(a, b)| a != b);
    Ok(mu.is_null(&differ))
}

/// `μ({x : f(x) > g(x)}) = 0`.
pub fn ae_le<P, M>(
    f: &SimpleFunc<P, ENNReal>,
    g: &SimpleFunc<P, ENNReal>,
    mu: &M,
) -> Result<bool>
where
    P: Clone + Ord + fmt::Debug,
    M: Measure<Point = P>,
{
    let above = f.pair(g)?.preimage_of(|(a, b)| a > b);
    Ok(mu.is_null(&above))
}

/// The μ-a.e. class of a simple function.
#[derive(Debug, Clone)]
pub struct AeClass<P, M> {
    representative: SimpleFunc<P, ENNReal>,
    measure: M,
}

impl<P, M> AeClass<P, M>
where
    P: Clone + Ord + fmt::Debug + Send + Sync,
    M: Measure<Point = P> + Sync,
{
    pub fn new(representative: SimpleFunc<P, ENNReal>, measure: M) -> Self {
        Self {
            representative,
            measure,
        }
    }

    pub fn representative(&self) -> &SimpleFunc<P, ENNReal> {
        &self.representative
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Whether `f` belongs to this class.
    pub fn contains(&self, f: &SimpleFunc<P, ENNReal>) -> Result<bool> {
        ae_eq(&self.representative, f, &self.measure)
    }

    /// Whether two classes over the same measure coincide.
    pub fn equiv(&self, other: &Self) -> Result<bool> {
        self.contains(&other.representative)
    }

    /// The lintegral of any member; independent of the representative.
    pub fn lintegral(&self) -> ENNReal {
        self.representative.lintegral(&self.measure)
    }
}
