//! Measurable spaces.
//!
//! A measurable space is a carrier of points plus a σ-algebra of measurable
//! subsets. The kernel works over finitely generated σ-algebras: the
//! measurable sets are exactly the unions of a fixed partition of the carrier
//! into *atoms*. Every finite σ-algebra has this shape, and it makes both
//! `is_measurable` and measurability of functions decidable.
//!
//! ```text
//! carrier  = {a, b, c, d}
//! atoms    = {a, b} | {c} | {d}
//! {a, b, d}  measurable      (union of atoms)
//! {a, c}     not measurable  (splits the atom {a, b})
//! ```

use crate::error::{KernelError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// A finite set of points.
pub type PointSet<P> = BTreeSet<P>;

/// The measurable-space interface consumed by simple functions and measures.
///
/// Implementations supply the carrier and a generating partition; the
/// measurability predicates have default implementations in terms of those.
pub trait MeasurableSpace {
    type Point: Clone + Ord + fmt::Debug + Send + Sync;

    /// Name of this space (for diagnostics).
    fn name(&self) -> &str;

    /// Every point of the space.
    fn carrier(&self) -> &PointSet<Self::Point>;

    /// The atoms: a partition of the carrier generating the σ-algebra.
    fn atoms(&self) -> &[PointSet<Self::Point>];

    /// Whether `s` is a measurable subset of the carrier.
    fn is_measurable(&self, s: &PointSet<Self::Point>) -> bool {
        s.is_subset(self.carrier())
            && self
                .atoms()
                .iter()
                .all(|atom| atom.is_subset(s) || atom.is_disjoint(s))
    }

    /// Whether `f` is measurable, i.e. constant on every atom.
    fn is_measurable_fn<V: PartialEq>(&self, f: &dyn Fn(&Self::Point) -> V) -> bool {
        self.atoms().iter().all(|atom| {
            let mut values = atom.iter().map(f);
            match values.next() {
                Some(first) => values.all(|v| v == first),
                None => true,
            }
        })
    }

    /// `{x ∈ carrier : pred(x)}`.
    fn select(&self, pred: &dyn Fn(&Self::Point) -> bool) -> PointSet<Self::Point> {
        self.carrier().iter().filter(|x| pred(x)).cloned().collect()
    }

    /// `carrier \ s`.
    fn complement(&self, s: &PointSet<Self::Point>) -> PointSet<Self::Point> {
        self.carrier().difference(s).cloned().collect()
    }

    /// Fail with `NonMeasurable` unless `s` is measurable.
    fn require_measurable(&self, s: &PointSet<Self::Point>) -> Result<()> {
        if self.is_measurable(s) {
            Ok(())
        } else {
            Err(KernelError::non_measurable(format!(
                "{s:?} is not a measurable subset of {}",
                self.name()
            )))
        }
    }
}

impl<S: MeasurableSpace + ?Sized> MeasurableSpace for &S {
    type Point = S::Point;

    fn name(&self) -> &str {
        (**self).name()
    }

    fn carrier(&self) -> &PointSet<Self::Point> {
        (**self).carrier()
    }

    fn atoms(&self) -> &[PointSet<Self::Point>] {
        (**self).atoms()
    }
}

/// A finite carrier with an explicit atom partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiniteSpace<P: Ord> {
    name: String,
    carrier: PointSet<P>,
    atoms: Vec<PointSet<P>>,
}

impl<P> FiniteSpace<P>
where
    P: Clone + Ord + fmt::Debug + Send + Sync,
{
    /// Every subset is measurable: the atoms are the singletons.
    pub fn discrete(name: impl Into<String>, points: impl IntoIterator<Item = P>) -> Self {
        let carrier: PointSet<P> = points.into_iter().collect();
        let atoms = carrier
            .iter()
            .map(|x| PointSet::from([x.clone()]))
            .collect();
        Self {
            name: name.into(),
            carrier,
            atoms,
        }
    }

    /// Only `∅` and the carrier are measurable.
    pub fn trivial(name: impl Into<String>, points: impl IntoIterator<Item = P>) -> Self {
        let carrier: PointSet<P> = points.into_iter().collect();
        let atoms = if carrier.is_empty() {
            Vec::new()
        } else {
            vec![carrier.clone()]
        };
        Self {
            name: name.into(),
            carrier,
            atoms,
        }
    }

    /// Generated by the given atoms, which must be nonempty and pairwise
    /// disjoint. The carrier is their union.
    pub fn from_atoms(
        name: impl Into<String>,
        atoms: impl IntoIterator<Item = PointSet<P>>,
    ) -> Result<Self> {
        let name = name.into();
        let atoms: Vec<PointSet<P>> = atoms.into_iter().collect();
        let mut carrier = PointSet::new();
        for (i, atom) in atoms.iter().enumerate() {
            if atom.is_empty() {
                return Err(KernelError::invalid_partition(format!(
                    "atom {i} of {name} is empty"
                )));
            }
            if !atom.is_disjoint(&carrier) {
                return Err(KernelError::invalid_partition(format!(
                    "atom {i} of {name} overlaps an earlier atom"
                )));
            }
            carrier.extend(atom.iter().cloned());
        }
        Ok(Self {
            name,
            carrier,
            atoms,
        })
    }

    /// The atom containing `x`, if `x` is in the carrier.
    pub fn atom_of(&self, x: &P) -> Option<&PointSet<P>> {
        self.atoms.iter().find(|atom| atom.contains(x))
    }
}

impl<P> MeasurableSpace for FiniteSpace<P>
where
    P: Clone + Ord + fmt::Debug + Send + Sync,
{
    type Point = P;

    fn name(&self) -> &str {
        &self.name
    }

    fn carrier(&self) -> &PointSet<P> {
        &self.carrier
    }

    fn atoms(&self) -> &[PointSet<P>] {
        &self.atoms
    }
}

/// Build a `PointSet` from a slice of points.
pub fn point_set<P: Clone + Ord>(points: &[P]) -> PointSet<P> {
    points.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coarse() -> FiniteSpace<char> {
        FiniteSpace::from_atoms(
            "coarse",
            vec![point_set(&['a', 'b']), point_set(&['c']), point_set(&['d'])],
        )
        .unwrap()
    }

    #[test]
    fn unions_of_atoms_are_measurable() {
        let space = coarse();
        assert!(space.is_measurable(&point_set(&['a', 'b', 'd'])));
        assert!(space.is_measurable(&PointSet::new()));
        assert!(space.is_measurable(space.carrier()));
        assert!(!space.is_measurable(&point_set(&['a', 'c'])));
        assert!(!space.is_measurable(&point_set(&['z'])));
    }

    #[test]
    fn discrete_space_measures_everything() {
        let space = FiniteSpace::discrete("abc", ['a', 'b', 'c']);
        assert_eq!(space.atoms().len(), 3);
        assert!(space.is_measurable(&point_set(&['a', 'c'])));
    }

    #[test]
    fn trivial_space_has_one_atom() {
        let space = FiniteSpace::trivial("abc", ['a', 'b', 'c']);
        assert!(!space.is_measurable(&point_set(&['a'])));
        assert!(space.is_measurable(&point_set(&['a', 'b', 'c'])));
        assert!(FiniteSpace::<char>::trivial("empty", []).atoms().is_empty());
    }

    #[test]
    fn overlapping_atoms_rejected() {
        let err = FiniteSpace::from_atoms("bad", vec![point_set(&[1, 2]), point_set(&[2, 3])])
            .unwrap_err();
        assert!(matches!(err, KernelError::InvalidPartition { .. }));
        assert!(FiniteSpace::from_atoms("bad", vec![PointSet::<u8>::new()]).is_err());
    }

    #[test]
    fn measurable_functions_are_constant_on_atoms() {
        let space = coarse();
        assert!(space.is_measurable_fn(&|x: &char| if *x == 'd' { 1 } else { 0 }));
        assert!(!space.is_measurable_fn(&|x: &char| if *x == 'a' { 1 } else { 0 }));
    }

    #[test]
    fn select_and_complement() {
        let space = coarse();
        let s = space.select(&|x| *x > 'b');
        assert_eq!(s, point_set(&['c', 'd']));
        assert_eq!(space.complement(&s), point_set(&['a', 'b']));
        assert_eq!(space.atom_of(&'b'), Some(&point_set(&['a', 'b'])));
    }
}
