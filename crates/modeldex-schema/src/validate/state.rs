use crate::{
    error::{IntegrityRule, Violations},
    node::{ModelDescriptor, State, StateChart},
};
use std::collections::BTreeMap;

pub(super) fn validate_state_charts(
    models: &BTreeMap<String, ModelDescriptor>,
    errs: &mut Violations,
) {
    for (model_key, model) in models {
        let route = format!("{model_key}.stateChart");
        let chart = &model.state_chart;

        validate_birth_place(chart, model_key, &route, errs);
        validate_initial_children(chart, model_key, &route, errs);
    }
}

// Exactly one top-level birth place, and none below the top level.
fn validate_birth_place(chart: &StateChart, model_key: &str, route: &str, errs: &mut Violations) {
    let top: Vec<&State> = chart.roots().filter(|s| s.is_record_birth_place).collect();

    match top.as_slice() {
        [] => errs.add(
            IntegrityRule::MissingBirthPlace,
            route,
            model_key,
            format!("state chart of '{model_key}' has no top-level birth place state"),
        ),
        [_] => {}
        many => {
            let keys: Vec<&str> = many.iter().map(|s| s.key.as_str()).collect();
            errs.add(
                IntegrityRule::MultipleBirthPlaces,
                route,
                model_key,
                format!(
                    "state chart of '{model_key}' has {} birth places: {}",
                    keys.len(),
                    keys.join(", ")
                ),
            );
        }
    }

    for state in chart
        .states()
        .iter()
        .filter(|s| s.is_record_birth_place && !s.is_top_level())
    {
        errs.add(
            IntegrityRule::MisplacedBirthPlace,
            format!("{route}.{}", state.key),
            state.key.as_str(),
            format!(
                "nested state '{}' is marked as a birth place; only top-level states may be",
                state.key
            ),
        );
    }
}

// Every initialChildState pointer names one of that node's own children.
fn validate_initial_children(
    chart: &StateChart,
    model_key: &str,
    route: &str,
    errs: &mut Violations,
) {
    if let Some(initial) = chart.initial_child_state()
        && !chart.roots().any(|s| s.key == initial)
    {
        errs.add(
            IntegrityRule::DanglingInitialChildState,
            route,
            initial,
            format!(
                "initial child state '{initial}' of '{model_key}' is not a top-level state"
            ),
        );
    }

    for state in chart.states() {
        let Some(initial) = state.initial_child_state.as_deref() else {
            continue;
        };

        if !chart.children(state).any(|child| child.key == initial) {
            errs.add(
                IntegrityRule::DanglingInitialChildState,
                format!("{route}.{}", state.key),
                initial,
                format!(
                    "initial child state '{initial}' of '{}' is not one of its children",
                    state.key
                ),
            );
        }
    }
}
