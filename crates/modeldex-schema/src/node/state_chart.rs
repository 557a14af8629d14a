use crate::{
    error::{IntegrityRule, Violations},
    raw::{RawState, RawStateChart},
};
use convert_case::{Case, Casing};
use serde::Serialize;
use std::{collections::HashMap, iter::FusedIterator};

///
/// StateId
/// Position of a state in its chart's arena.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct StateId(usize);

impl StateId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

///
/// State
///

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    pub key: String,
    pub name: String,

    /// `customApiIdentifier` when set, otherwise the camelCase of `name`.
    pub api_identifier: String,

    pub is_record_birth_place: bool,
    pub is_undeleteable_system_state: bool,
    pub restore_history: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_child_state: Option<String>,

    id: StateId,
    parent: Option<StateId>,
    children: Vec<StateId>,
    depth: usize,
}

impl State {
    #[must_use]
    pub const fn id(&self) -> StateId {
        self.id
    }

    #[must_use]
    pub const fn parent(&self) -> Option<StateId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    /// Nesting level; top-level states are at depth 1.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn is_compound(&self) -> bool {
        !self.children.is_empty()
    }
}

///
/// StateChart
///
/// Lifecycle states of one model, stored as an arena in pre-order. Built
/// iteratively so that hostile nesting cannot exhaust the stack; depth beyond
/// the configured cap is reported instead of stored.
///

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChart {
    key: String,
    initial_child_state: Option<String>,
    state_in_action_code: bool,
    states: Vec<State>,
    roots: Vec<StateId>,

    #[serde(skip)]
    by_key: HashMap<String, StateId>,
}

impl StateChart {
    pub(crate) fn build(
        raw: RawStateChart,
        max_depth: usize,
        route: &str,
        errs: &mut Violations,
    ) -> Self {
        let mut chart = Self {
            key: raw.key,
            initial_child_state: raw.initial_child_state,
            state_in_action_code: raw.state_in_action_code,
            ..Self::default()
        };

        let mut stack: Vec<(RawState, Option<StateId>, usize)> = raw
            .child_states
            .into_iter()
            .rev()
            .map(|state| (state, None, 1))
            .collect();

        while let Some((mut raw, parent, depth)) = stack.pop() {
            if depth > max_depth {
                // first level past the cap is reported once per branch
                if depth == max_depth + 1 {
                    errs.add(
                        IntegrityRule::StateChartTooDeep,
                        format!("{route}.{}", raw.key),
                        raw.key.clone(),
                        format!(
                            "state '{}' is nested {depth} levels deep (limit {max_depth})",
                            raw.key
                        ),
                    );
                }

                // unwound onto the stack so the subtree drops one node at a time
                stack.extend(
                    std::mem::take(&mut raw.child_states)
                        .into_iter()
                        .map(|child| (child, parent, depth + 1)),
                );
                continue;
            }

            let id = StateId(chart.states.len());
            if chart.by_key.contains_key(&raw.key) {
                errs.add(
                    IntegrityRule::DuplicateStateKey,
                    format!("{route}.{}", raw.key),
                    raw.key.clone(),
                    format!("state key '{}' is used more than once in the chart", raw.key),
                );
            } else {
                chart.by_key.insert(raw.key.clone(), id);
            }

            match parent {
                Some(parent) => chart.states[parent.0].children.push(id),
                None => chart.roots.push(id),
            }

            let api_identifier = raw
                .custom_api_identifier
                .filter(|custom| !custom.is_empty())
                .unwrap_or_else(|| raw.name.to_case(Case::Camel));

            chart.states.push(State {
                key: raw.key,
                name: raw.name,
                api_identifier,
                is_record_birth_place: raw.is_record_birth_place,
                is_undeleteable_system_state: raw.is_undeleteable_system_state,
                restore_history: raw.restore_history,
                initial_child_state: raw.initial_child_state,
                id,
                parent,
                children: Vec::new(),
                depth,
            });

            stack.extend(
                raw.child_states
                    .into_iter()
                    .rev()
                    .map(|child| (child, Some(id), depth + 1)),
            );
        }

        chart
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn state_in_action_code(&self) -> bool {
        self.state_in_action_code
    }

    /// The chart-level `initialChildState` key, if declared.
    #[must_use]
    pub fn initial_child_state(&self) -> Option<&str> {
        self.initial_child_state.as_deref()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&State> {
        self.by_key.get(key).map(|id| &self.states[id.0])
    }

    #[must_use]
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.get(id.0)
    }

    /// Every state in pre-order.
    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn roots(&self) -> impl Iterator<Item = &State> {
        self.roots.iter().map(|id| &self.states[id.0])
    }

    pub fn children<'a>(&'a self, state: &'a State) -> impl Iterator<Item = &'a State> {
        state.children.iter().map(|id| &self.states[id.0])
    }

    /// The top-level state new records are born into.
    #[must_use]
    pub fn birth_place(&self) -> Option<&State> {
        self.roots().find(|s| s.is_record_birth_place)
    }

    pub fn system_states(&self) -> impl Iterator<Item = &State> {
        self.states.iter().filter(|s| s.is_undeleteable_system_state)
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.states.iter().map(|s| s.depth).max().unwrap_or(0)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Pre-order walk over the whole chart.
    #[must_use]
    pub fn walk(&self) -> StateWalk<'_> {
        StateWalk {
            chart: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Pre-order walk over the subtree rooted at `key`, including it.
    #[must_use]
    pub fn walk_from(&self, key: &str) -> Option<StateWalk<'_>> {
        let id = self.by_key.get(key)?;

        Some(StateWalk {
            chart: self,
            stack: vec![*id],
        })
    }
}

///
/// StateWalk
/// Lazy pre-order traversal; clone it to restart from the same point.
///

#[derive(Clone, Debug)]
pub struct StateWalk<'a> {
    chart: &'a StateChart,
    stack: Vec<StateId>,
}

impl<'a> Iterator for StateWalk<'a> {
    type Item = &'a State;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let state = &self.chart.states[id.0];
        self.stack.extend(state.children.iter().rev().copied());

        Some(state)
    }
}

impl FusedIterator for StateWalk<'_> {}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn state(key: &str, children: Vec<RawState>) -> RawState {
        RawState {
            key: key.to_string(),
            name: key.to_string(),
            child_states: children,
            ..RawState::default()
        }
    }

    fn chart(states: Vec<RawState>) -> RawStateChart {
        RawStateChart {
            key: "StateChart-Test".to_string(),
            child_states: states,
            ..RawStateChart::default()
        }
    }

    fn build(raw: RawStateChart, max_depth: usize) -> (StateChart, Violations) {
        let mut errs = Violations::new();
        let chart = StateChart::build(raw, max_depth, "DataModel-Test.stateChart", &mut errs);

        (chart, errs)
    }

    #[test]
    fn walk_is_pre_order_and_restartable() {
        let raw = chart(vec![
            state("A", vec![state("A1", vec![state("A1a", vec![])]), state("A2", vec![])]),
            state("B", vec![]),
        ]);
        let (chart, errs) = build(raw, 8);
        assert!(errs.is_empty());

        let walk = chart.walk();
        let keys: Vec<_> = walk.clone().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["A", "A1", "A1a", "A2", "B"]);
        assert_eq!(walk.count(), 5);

        // arena order is the walk order
        let arena: Vec<_> = chart.states().iter().map(|s| s.key.as_str()).collect();
        assert_eq!(arena, keys);

        let depths: Vec<_> = chart.walk().map(State::depth).collect();
        assert_eq!(depths, vec![1, 2, 3, 2, 1]);
        assert_eq!(chart.max_depth(), 3);
    }

    #[test]
    fn subtree_walk_starts_at_the_named_state() {
        let raw = chart(vec![
            state("A", vec![state("A1", vec![]), state("A2", vec![])]),
            state("B", vec![]),
        ]);
        let (chart, _) = build(raw, 8);

        let keys: Vec<_> = chart
            .walk_from("A")
            .expect("A exists")
            .map(|s| s.key.as_str())
            .collect();
        assert_eq!(keys, vec!["A", "A1", "A2"]);
        assert!(chart.walk_from("Z").is_none());
    }

    #[test]
    fn parent_and_children_links_agree() {
        let raw = chart(vec![state("A", vec![state("A1", vec![])])]);
        let (chart, _) = build(raw, 8);

        let a = chart.get("A").expect("A");
        let a1 = chart.get("A1").expect("A1");
        assert!(a.is_top_level());
        assert!(a.is_compound());
        assert_eq!(a1.parent(), Some(a.id()));
        assert_eq!(
            chart.children(a).map(|s| s.key.as_str()).collect::<Vec<_>>(),
            vec!["A1"]
        );
    }

    #[test]
    fn deep_nesting_is_reported_not_stored() {
        let mut nested = state("L5", vec![]);
        for level in (1..5).rev() {
            nested = state(&format!("L{level}"), vec![nested]);
        }
        let (chart, errs) = build(chart(vec![nested]), 3);

        let err = errs.result().expect_err("depth cap exceeded");
        assert!(err.has_rule(IntegrityRule::StateChartTooDeep));
        assert!(err.mentions("L4"));
        assert_eq!(chart.len(), 3);
        assert!(chart.get("L4").is_none());
    }

    #[test]
    fn duplicate_keys_anywhere_in_the_tree_are_reported() {
        let raw = chart(vec![state("A", vec![state("B", vec![])]), state("B", vec![])]);
        let (_, errs) = build(raw, 8);

        let err = errs.result().expect_err("duplicate key");
        assert_eq!(err.rules(), vec![IntegrityRule::DuplicateStateKey]);
        assert!(err.mentions("B"));
    }

    #[test]
    fn api_identifier_prefers_custom_override() {
        let mut logged_out = state("S-1", vec![]);
        logged_out.name = "Logged Out".to_string();
        let mut logged_in = state("S-2", vec![]);
        logged_in.name = "Logged In".to_string();
        logged_in.custom_api_identifier = Some("signedIn".to_string());
        let mut blank = state("S-3", vec![]);
        blank.name = "Expired".to_string();
        blank.custom_api_identifier = Some(String::new());

        let (chart, _) = build(chart(vec![logged_out, logged_in, blank]), 8);
        let ids: Vec<_> = chart.walk().map(|s| s.api_identifier.as_str()).collect();

        assert_eq!(ids, vec!["loggedOut", "signedIn", "expired"]);
    }
}
