//! Toy measure worlds for fixture-driven testing.
//!
//! Each world is a small finite space with string-named points and an atomic
//! measure. Fixtures name a world and a check; `run_toy_check` evaluates the
//! check and renders the outcome as JSON so it can be compared against an
//! expected vector.
//!
//! ## Worlds
//!
//! - **three_points**: discrete `{a, b, c}` under counting measure.
//!
//! - **null_infinite**: discrete `{p, q}` with `μ{p} = ∞`, `μ{q} = 0`.
//!   Exercises `0 · ∞ = 0` from both sides.
//!
//! - **coarse**: atoms `{a, b} | {c, d}` weighted 2 and 3. Only unions of
//!   the two atoms are measurable, so functions must be constant on each.
//!
//! ## Function encoding
//!
//! Functions are JSON objects from point name to value (`"3/2"`, `4`,
//! `"inf"`). Points not listed take the value 0.

use crate::approx::Approximator;
use crate::config::{EngineConfig, RestrictPolicy};
use crate::ennreal::ENNReal;
use crate::enumeration::EnumerationKind;
use crate::error::{KernelError, Result};
use crate::integral::integral;
use crate::measure::{AtomicMeasure, MeasureExt};
use crate::simple_func::SimpleFunc;
use crate::space::{FiniteSpace, PointSet, point_set};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Point-name to value table.
pub type ValueTable = BTreeMap<String, ENNReal>;

/// A named finite space with its measure.
#[derive(Debug, Clone)]
pub struct ToyWorld {
    pub space: FiniteSpace<String>,
    pub measure: AtomicMeasure<String>,
}

fn names(points: &[&str]) -> PointSet<String> {
    let owned: Vec<String> = points.iter().map(|p| p.to_string()).collect();
    point_set(&owned)
}

/// Get a toy world by name (matching fixture "world" field).
pub fn get_world(name: &str) -> Option<ToyWorld> {
    let (space, weights) = match name {
        "three_points" => {
            let space = FiniteSpace::discrete(name, ["a", "b", "c"].map(String::from));
            let measure = AtomicMeasure::counting(&space);
            return Some(ToyWorld { space, measure });
        }
        "null_infinite" => (
            FiniteSpace::discrete(name, ["p", "q"].map(String::from)),
            vec![ENNReal::Top, ENNReal::from(0)],
        ),
        "coarse" => (
            FiniteSpace::from_atoms(name, vec![names(&["a", "b"]), names(&["c", "d"])]).ok()?,
            vec![ENNReal::from(2), ENNReal::from(3)],
        ),
        _ => return None,
    };
    let measure = AtomicMeasure::new(&space, weights).ok()?;
    Some(ToyWorld { space, measure })
}

/// A check to run against a toy world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToyCheck {
    /// `lintegral(f, μ)`.
    Lintegral { values: ValueTable },

    /// `lintegral(restrict(f, s), μ)` against `lintegral(f, μ.restrict(s))`.
    RestrictLintegral {
        values: ValueTable,
        set: PointSet<String>,
        policy: RestrictPolicy,
    },

    /// `approx(steps)` of a target.
    Approx {
        target: ValueTable,
        enumeration: EnumerationKind,
        steps: usize,
    },

    /// `integral(target, μ)`.
    Integral {
        target: ValueTable,
        enumeration: EnumerationKind,
        max_steps: Option<usize>,
    },
}

fn table(v: &Value) -> Option<ValueTable> {
    serde_json::from_value(v.clone()).ok()
}

fn enumeration_of(check: &Value) -> Option<EnumerationKind> {
    match check.get("enumeration") {
        Some(v) => v.as_str()?.parse().ok(),
        None => Some(EnumerationKind::default()),
    }
}

impl ToyCheck {
    /// Parse a check from a fixture's `check` object.
    pub fn from_fixture(check: &Value) -> Option<Self> {
        let kind = check.get("kind")?.as_str()?;

        match kind {
            "lintegral" => Some(ToyCheck::Lintegral {
                values: table(check.get("values")?)?,
            }),
            "restrictLintegral" => {
                let set = check
                    .get("set")?
                    .as_array()?
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect();
                let policy = match check.get("policy") {
                    Some(v) => serde_json::from_value(v.clone()).ok()?,
                    None => RestrictPolicy::default(),
                };
                Some(ToyCheck::RestrictLintegral {
                    values: table(check.get("values")?)?,
                    set,
                    policy,
                })
            }
            "approx" => Some(ToyCheck::Approx {
                target: table(check.get("target")?)?,
                enumeration: enumeration_of(check)?,
                steps: usize::try_from(check.get("steps")?.as_u64()?).ok()?,
            }),
            "integral" => Some(ToyCheck::Integral {
                target: table(check.get("target")?)?,
                enumeration: enumeration_of(check)?,
                max_steps: check
                    .get("maxSteps")
                    .and_then(Value::as_u64)
                    .and_then(|n| usize::try_from(n).ok()),
            }),
            _ => None,
        }
    }
}

fn lookup(values: &ValueTable) -> impl Fn(&String) -> ENNReal + '_ {
    move |x| values.get(x).cloned().unwrap_or_default()
}

fn rejected(err: &KernelError) -> Value {
    let mut out = json!({ "status": "rejected", "error": err.kind() });
    if let KernelError::StepBudgetExhausted { lower_bound, .. } = err {
        out["lowerBound"] = json!(lower_bound);
    }
    out
}

/// Run a check and render its outcome.
///
/// Kernel errors are part of the outcome (`"status": "rejected"`), not
/// failures of the runner.
pub fn run_toy_check(world: &ToyWorld, check: &ToyCheck, config: &EngineConfig) -> Value {
    let outcome = match check {
        ToyCheck::Lintegral { values } => check_lintegral(world, values, config),
        ToyCheck::RestrictLintegral {
            values,
            set,
            policy,
        } => check_restrict(world, values, set, *policy),
        ToyCheck::Approx {
            target,
            enumeration,
            steps,
        } => check_approx(world, target, *enumeration, *steps, config),
        ToyCheck::Integral {
            target,
            enumeration,
            max_steps,
        } => {
            let config = match max_steps {
                Some(n) => config.clone().with_max_steps(*n),
                None => config.clone(),
            };
            check_integral(world, target, *enumeration, &config)
        }
    };
    outcome.unwrap_or_else(|err| {
        tracing::debug!(error = %err, "toy check rejected");
        rejected(&err)
    })
}

fn check_lintegral(world: &ToyWorld, values: &ValueTable, config: &EngineConfig) -> Result<Value> {
    let f = SimpleFunc::from_fn(&world.space, lookup(values))?;
    Ok(json!({
        "status": "ok",
        "value": f.lintegral_with(&world.measure, config),
    }))
}

fn check_restrict(
    world: &ToyWorld,
    values: &ValueTable,
    set: &PointSet<String>,
    policy: RestrictPolicy,
) -> Result<Value> {
    let f = SimpleFunc::from_fn(&world.space, lookup(values))?;
    let restricted = f.restrict(&world.space, set, policy)?.lintegral(&world.measure);
    let by_measure = f.lintegral(&(&world.measure).restrict(set.clone()));
    Ok(json!({
        "status": "ok",
        "restricted": restricted,
        "measureRestricted": by_measure,
        "agree": restricted == by_measure,
    }))
}

fn check_approx(
    world: &ToyWorld,
    target: &ValueTable,
    enumeration: EnumerationKind,
    steps: usize,
    config: &EngineConfig,
) -> Result<Value> {
    let approximator = Approximator::new(&world.space, enumeration.build(), lookup(target))
        .with_policy(config.restrict_policy);
    let f = approximator.approx(steps)?;
    let range: Vec<String> = f.range().map(ToString::to_string).collect();
    Ok(json!({
        "status": "ok",
        "range": range,
        "lintegral": f.lintegral_with(&world.measure, config),
    }))
}

fn check_integral(
    world: &ToyWorld,
    target: &ValueTable,
    enumeration: EnumerationKind,
    config: &EngineConfig,
) -> Result<Value> {
    let result = integral(
        &world.space,
        enumeration.build(),
        lookup(target),
        &world.measure,
        config,
    )?;
    Ok(json!({
        "status": "ok",
        "value": result.value,
        "steps": result.steps,
        "convergence": result.convergence,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::MeasurableSpace;

    #[test]
    fn worlds_by_name() {
        for name in ["three_points", "null_infinite", "coarse"] {
            let world = get_world(name).unwrap();
            assert_eq!(world.measure.weights().len(), world.space.atoms().len());
        }
        assert!(get_world("nope").is_none());
    }

    #[test]
    fn parse_and_run_lintegral() {
        let world = get_world("three_points").unwrap();
        let check = ToyCheck::from_fixture(&json!({
            "kind": "lintegral",
            "values": { "a": 5, "b": "5" }
        }))
        .unwrap();
        let out = run_toy_check(&world, &check, &EngineConfig::default());
        assert_eq!(out, json!({ "status": "ok", "value": "10" }));
    }

    #[test]
    fn malformed_checks_do_not_parse() {
        assert!(ToyCheck::from_fixture(&json!({ "kind": "lintegral" })).is_none());
        assert!(ToyCheck::from_fixture(&json!({ "kind": "bogus", "values": {} })).is_none());
        assert!(
            ToyCheck::from_fixture(&json!({
                "kind": "approx",
                "target": {},
                "steps": 2,
                "enumeration": "farey"
            }))
            .is_none()
        );
    }

    #[test]
    fn rejection_carries_error_kind() {
        let world = get_world("coarse").unwrap();
        let check = ToyCheck::Lintegral {
            values: BTreeMap::from([("a".to_string(), ENNReal::from(1))]),
        };
        let out = run_toy_check(&world, &check, &EngineConfig::default());
        assert_eq!(out["status"], "rejected");
        assert_eq!(out["error"], "non_measurable");
    }
}
