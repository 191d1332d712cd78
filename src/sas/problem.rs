use anyhow::{bail, ensure};
use tracing::debug;

use super::axioms::{AxiomRule, AxiomRules};
use super::conditions::{Conditions, EffectRelevance, SimpleConditions};
use super::decision_tree::OperatorDecisionTree;
use super::effects::Effect;
use super::operator::Operator;
use super::state::{Assignment, MutexGroup, RelativeState, State, Variable};

/// Grounded SAS+ planning problem.
///
/// The decision trees are built once here and only read afterwards, so a
/// problem can be shared by any number of searches.
#[derive(Debug, Clone)]
pub struct SasProblem {
    variables: Vec<Variable>,
    mutex_groups: Vec<MutexGroup>,
    operators: Vec<Operator>,
    initial_state: State,
    goal: SimpleConditions,
    axioms: AxiomRules,
    applicability_tree: OperatorDecisionTree,
    relevance_tree: OperatorDecisionTree,
}

impl SasProblem {
    pub fn new(
        variables: Vec<Variable>,
        mutex_groups: Vec<MutexGroup>,
        operators: Vec<Operator>,
        initial_state: State,
        goal: SimpleConditions,
        axiom_rules: Vec<AxiomRule>,
    ) -> anyhow::Result<Self> {
        ensure!(
            initial_state.len() == variables.len(),
            "initial state has {} values but there are {} variables",
            initial_state.len(),
            variables.len()
        );
        for (variable, value) in initial_state.values().iter().enumerate() {
            check_assignment(&variables, &Assignment::new(variable, *value), "initial state")?;
        }
        for assignment in goal.iter() {
            check_assignment(&variables, &assignment, "goal")?;
        }
        for (index, operator) in operators.iter().enumerate() {
            if operator.id != index {
                bail!(
                    "operator {} has id {} but is stored at index {index}",
                    operator.name,
                    operator.id
                );
            }
            for assignment in operator.preconditions.iter() {
                check_assignment(&variables, &assignment, &operator.name)?;
            }
            for effect in &operator.effects {
                check_assignment(&variables, &effect.assignment(), &operator.name)?;
                if let Effect::Conditional { conditions, .. } = effect {
                    for assignment in conditions.iter() {
                        check_assignment(&variables, &assignment, &operator.name)?;
                    }
                }
            }
        }
        for group in &mutex_groups {
            for assignment in group.iter() {
                check_assignment(&variables, assignment, "mutex group")?;
            }
        }
        for rule in &axiom_rules {
            check_assignment(&variables, &rule.head, "axiom head")?;
            ensure!(
                variables[rule.head.variable].is_axiomatic(),
                "axiom rule derives non-axiomatic variable {}",
                variables[rule.head.variable].name
            );
            for assignment in rule.body.iter() {
                check_assignment(&variables, &assignment, "axiom body")?;
            }
        }

        let axioms = AxiomRules::new(axiom_rules, &variables, &initial_state);
        let mut initial_state = initial_state;
        axioms.apply(&mut initial_state);

        let applicability_tree = OperatorDecisionTree::applicability(&operators, &variables);
        let relevance_tree = OperatorDecisionTree::relevance(&operators, &variables);
        debug!(
            "built decision trees: applicability depth {}, relevance depth {}",
            applicability_tree.depth(),
            relevance_tree.depth()
        );

        Ok(SasProblem {
            variables,
            mutex_groups,
            operators,
            initial_state,
            goal,
            axioms,
            applicability_tree,
            relevance_tree,
        })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn mutex_groups(&self) -> &[MutexGroup] {
        &self.mutex_groups
    }

    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    pub fn initial_state(&self) -> &State {
        &self.initial_state
    }

    pub fn goal(&self) -> &SimpleConditions {
        &self.goal
    }

    pub fn goal_conditions(&self) -> Conditions {
        Conditions::Simple(self.goal.clone())
    }

    pub fn goal_relative_state(&self) -> RelativeState {
        RelativeState::from_conditions(self.variables.len(), &self.goal)
    }

    pub fn axioms(&self) -> &AxiomRules {
        &self.axioms
    }

    pub fn is_goal_state(&self, state: &State) -> bool {
        self.goal.evaluate(state)
    }

    pub fn applicable_operators(&self, state: &State) -> Vec<&Operator> {
        self.applicability_tree
            .applicable_candidates(state)
            .into_iter()
            .map(|id| &self.operators[id])
            .filter(|operator| operator.is_applicable(state))
            .collect()
    }

    pub fn relevant_operators(&self, conditions: &Conditions) -> Vec<&Operator> {
        self.relevance_tree
            .relevant_candidates(conditions)
            .into_iter()
            .map(|id| &self.operators[id])
            .filter(|operator| operator.is_relevant(conditions))
            .collect()
    }

    pub fn relevant_operators_relative(&self, state: &RelativeState) -> Vec<&Operator> {
        self.relevance_tree
            .relevant_candidates_relative(state)
            .into_iter()
            .map(|id| &self.operators[id])
            .filter(|operator| operator.relevance_relative(state) == EffectRelevance::Relevant)
            .collect()
    }

    pub fn is_compatible_with_mutex_groups(&self, conditions: &Conditions) -> bool {
        self.mutex_groups
            .iter()
            .all(|group| conditions.is_compatible_with_mutex_constraints(group))
    }

    pub fn is_relative_compatible_with_mutex_groups(&self, state: &RelativeState) -> bool {
        self.mutex_groups
            .iter()
            .all(|group| state.is_compatible_with_mutex_constraints(group))
    }

    /// Replays `plan` from the initial state and checks that it ends in a goal state.
    pub fn validate_plan(&self, plan: &[&Operator]) -> bool {
        let mut state = self.initial_state.clone();
        for operator in plan {
            if !operator.is_applicable(&state) {
                debug!("{} is not applicable in {state}", operator.name);
                return false;
            }
            operator.apply_in_place(&mut state, &self.axioms);
        }
        self.is_goal_state(&state)
    }
}

fn check_assignment(
    variables: &[Variable],
    assignment: &Assignment,
    context: &str,
) -> anyhow::Result<()> {
    let Some(variable) = variables.get(assignment.variable) else {
        bail!("{context}: unknown variable {}", assignment.variable);
    };
    ensure!(
        assignment.value < variable.domain_range,
        "{context}: value {} out of range for variable {} (range {})",
        assignment.value,
        variable.name,
        variable.domain_range
    );
    Ok(())
}
