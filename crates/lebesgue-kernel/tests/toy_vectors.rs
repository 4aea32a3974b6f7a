//! Integration tests: run the toy-world test vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: the world name and the check input
//! - expect.json: the expected rendered outcome
//!
//! These tests load the fixtures, parse the check, run it against the named
//! world, and compare the output to the expected result, including exact
//! rational values and rejection kinds.

use lebesgue_kernel::EngineConfig;
use lebesgue_kernel::toy::{ToyCheck, get_world, run_toy_check};
use serde_json::Value;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);

    let case_path = dir.join("case.json");
    let expect_path = dir.join("expect.json");

    let case_str = std::fs::read_to_string(&case_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", case_path.display()));
    let expect_str = std::fs::read_to_string(&expect_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", expect_path.display()));

    let case: Value = serde_json::from_str(&case_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", case_path.display()));
    let expected: Value = serde_json::from_str(&expect_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", expect_path.display()));

    let world_name = case["world"].as_str().expect("missing world field");
    let world = get_world(world_name).unwrap_or_else(|| panic!("unknown world: {world_name}"));

    let check = ToyCheck::from_fixture(&case["check"])
        .unwrap_or_else(|| panic!("failed to parse check from {}", case_path.display()));

    let result = run_toy_check(&world, &check, &EngineConfig::default());

    assert_eq!(
        result,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&result).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn golden_lintegral_three_points() {
    run_fixture("golden_lintegral_three_points");
}

#[test]
fn golden_lintegral_zero_times_top() {
    run_fixture("golden_lintegral_zero_times_top");
}

#[test]
fn golden_restrict_lintegral_coarse() {
    run_fixture("golden_restrict_lintegral_coarse");
}

#[test]
fn golden_approx_calkin_wilf() {
    run_fixture("golden_approx_calkin_wilf");
}

#[test]
fn golden_integral_attained() {
    run_fixture("golden_integral_attained");
}

#[test]
fn golden_integral_finite_value_on_infinite_mass() {
    run_fixture("golden_integral_finite_value_on_infinite_mass");
}

#[test]
fn golden_integral_top_on_null_set() {
    run_fixture("golden_integral_top_on_null_set");
}

#[test]
fn golden_integral_beyond_step_budget() {
    run_fixture("golden_integral_beyond_step_budget");
}

#[test]
fn golden_integral_divergent() {
    run_fixture("golden_integral_divergent");
}

#[test]
fn adversarial_restrict_non_measurable_coarse() {
    run_fixture("adversarial_restrict_non_measurable_coarse");
}

#[test]
fn adversarial_integral_non_measurable_target() {
    run_fixture("adversarial_integral_non_measurable_target");
}

#[test]
fn adversarial_integral_budget_naturals() {
    run_fixture("adversarial_integral_budget_naturals");
}
