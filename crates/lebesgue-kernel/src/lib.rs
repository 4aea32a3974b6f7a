//! # Lebesgue Kernel
//!
//! The lower Lebesgue integral of a nonnegative measurable function, built
//! the classical way: approximate from below by simple functions, integrate
//! each simple function as a finite sum, take the supremum.
//!
//! This crate is **measure-agnostic**: it does not prescribe where measures
//! come from. It consumes them through `Measure::measure` and prescribes how
//! simple functions and their integrals must behave against them. All
//! arithmetic is exact over extended nonnegative rationals.
//!
//! ## Architecture
//!
//! ```text
//! ENNReal               ← [0, ∞] over exact rationals, 0 · ∞ = 0
//!     │
//! Enumeration           ← q_0, q_1, … of ℚ≥0 (Calkin–Wilf, Cantor pairs)
//!     │
//! MeasurableSpace       ← Carrier + generating atoms; Measure on top
//!     │
//! SimpleFunc<P, V>      ← Finite value ↦ preimage table
//!     │
//! Approximator          ← approx(n) = sup_{k<n} q_k · 1{q_k ≤ f}
//!     │
//! lintegral / integral  ← Σ v · μ(f⁻¹ v), then sup_n over approx(n)
//! ```

pub mod ae;
pub mod approx;
pub mod config;
pub mod ennreal;
pub mod enumeration;
pub mod error;
pub mod integral;
pub mod lintegral;
pub mod measure;
pub mod simple_func;
pub mod space;
pub mod toy;

pub use ae::{AeClass, ae_eq, ae_le};
pub use approx::{ApproxIter, Approximator};
pub use config::{EngineConfig, RestrictPolicy};
pub use ennreal::{ENNReal, NNRat};
pub use enumeration::{
    CalkinWilf, CantorPairs, Enumeration, EnumerationKind, EnumerationPrefix, FromFn, Naturals,
};
pub use error::{KernelError, Result};
pub use integral::{
    Convergence, Integral, IntegralProperty, LIntegralOf, fold_measurable, fold_simple, integral,
    lintegral_of_fn,
};
pub use lintegral::{const_lintegral, lintegral};
pub use measure::{
    AtomicMeasure, Measure, MeasureExt, SumMeasure, ZeroMeasure, measure_le, total_mass,
};
pub use simple_func::SimpleFunc;
pub use space::{FiniteSpace, MeasurableSpace, PointSet, point_set};
