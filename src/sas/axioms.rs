use std::collections::BTreeMap;

use super::conditions::SimpleConditions;
use super::state::{Assignment, State, Variable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxiomRule {
    pub body: SimpleConditions,
    pub head: Assignment,
}

/// Closure over the derived variables, recomputed after every operator application.
#[derive(Debug, Clone, Default)]
pub struct AxiomRules {
    defaults: Vec<Assignment>,
    layers: BTreeMap<u32, Vec<AxiomRule>>,
}

impl AxiomRules {
    /// Default values of the derived variables are taken from `initial_state`.
    pub fn new(rules: Vec<AxiomRule>, variables: &[Variable], initial_state: &State) -> Self {
        let defaults = variables
            .iter()
            .enumerate()
            .filter(|(_, variable)| variable.is_axiomatic())
            .map(|(index, _)| Assignment::new(index, initial_state.value(index)))
            .collect();

        let mut layers: BTreeMap<u32, Vec<AxiomRule>> = BTreeMap::new();
        for rule in rules {
            let layer = variables[rule.head.variable].axiom_layer.unwrap_or(0);
            layers.entry(layer).or_default().push(rule);
        }

        AxiomRules { defaults, layers }
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.values().map(Vec::len).sum()
    }

    pub fn apply(&self, state: &mut State) {
        if self.is_empty() {
            return;
        }
        for default in &self.defaults {
            state.set(*default);
        }
        // Lower layers are settled before higher layers read them.
        for rules in self.layers.values() {
            loop {
                let mut changed = false;
                for rule in rules {
                    if !state.satisfies(&rule.head) && rule.body.evaluate(state) {
                        state.set(rule.head);
                        changed = true;
                    }
                }
                if !changed {
                    break;
                }
            }
        }
    }
}
