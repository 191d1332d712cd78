use super::conditions::Conditions;
use super::effects::Effect;
use super::operator::Operator;
use super::state::{OperatorId, RelativeState, State, ValueId, VarId, Variable};

/// Index over the operator set branching on variable values.
///
/// Lookups return candidates only: every operator that passes the precise
/// check is among them, but callers still have to run that check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorDecisionTree {
    Empty,
    Leaf(Vec<OperatorId>),
    Decision {
        variable: VarId,
        by_value: Vec<OperatorDecisionTree>,
        /// Operators that do not commit to a single value of `variable`.
        unaffected: Box<OperatorDecisionTree>,
    },
}

impl OperatorDecisionTree {
    /// Builds the tree. `evaluator` reports the value an operator is bound to
    /// on a variable, or `None` when it is indifferent to it.
    ///
    /// Operators are looked up by id, so `operators[id].id == id` must hold.
    pub fn build<F>(operators: &[Operator], variables: &[Variable], evaluator: F) -> Self
    where
        F: Fn(&Operator, VarId) -> Option<ValueId>,
    {
        let ids = operators.iter().map(|operator| operator.id).collect();
        let decision_variables = (0..variables.len()).collect();
        build_node(operators, variables, &evaluator, ids, decision_variables)
    }

    /// Tree over preconditions, used to find applicable operators.
    pub fn applicability(operators: &[Operator], variables: &[Variable]) -> Self {
        Self::build(operators, variables, |operator, variable| {
            operator.preconditions.value(variable)
        })
    }

    /// Tree over effect assignments, used to find relevant operators.
    pub fn relevance(operators: &[Operator], variables: &[Variable]) -> Self {
        Self::build(operators, variables, effect_value)
    }

    pub fn applicable_candidates(&self, state: &State) -> Vec<OperatorId> {
        let mut candidates = Vec::new();
        self.collect(&|variable| Some(state.value(variable)), &mut candidates);
        candidates
    }

    pub fn relevant_candidates(&self, conditions: &Conditions) -> Vec<OperatorId> {
        let mut candidates = Vec::new();
        for disjunct in conditions.disjuncts() {
            self.collect(&|variable| disjunct.value(variable), &mut candidates);
        }
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }

    pub fn relevant_candidates_relative(&self, state: &RelativeState) -> Vec<OperatorId> {
        let mut candidates = Vec::new();
        self.collect(&|variable| state.value(variable), &mut candidates);
        candidates
    }

    /// Descends into the subtree of the queried value and into the unaffected
    /// subtree; an unconstrained variable visits every subtree.
    fn collect<Q>(&self, query: &Q, candidates: &mut Vec<OperatorId>)
    where
        Q: Fn(VarId) -> Option<ValueId>,
    {
        match self {
            OperatorDecisionTree::Empty => {}
            OperatorDecisionTree::Leaf(operators) => candidates.extend_from_slice(operators),
            OperatorDecisionTree::Decision {
                variable,
                by_value,
                unaffected,
            } => {
                match query(*variable) {
                    Some(value) => {
                        if let Some(subtree) = by_value.get(value) {
                            subtree.collect(query, candidates);
                        }
                    }
                    None => {
                        for subtree in by_value {
                            subtree.collect(query, candidates);
                        }
                    }
                }
                unaffected.collect(query, candidates);
            }
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            OperatorDecisionTree::Empty | OperatorDecisionTree::Leaf(_) => 0,
            OperatorDecisionTree::Decision {
                by_value,
                unaffected,
                ..
            } => {
                1 + by_value
                    .iter()
                    .chain(std::iter::once(unaffected.as_ref()))
                    .map(OperatorDecisionTree::depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

/// The single value an operator writes to `variable`, if there is exactly one.
fn effect_value(operator: &Operator, variable: VarId) -> Option<ValueId> {
    let mut values = operator
        .effects
        .iter()
        .map(Effect::assignment)
        .filter(|assignment| assignment.variable == variable)
        .map(|assignment| assignment.value);
    let first = values.next()?;
    if values.all(|value| value == first) {
        Some(first)
    } else {
        None
    }
}

fn build_node<F>(
    operators: &[Operator],
    variables: &[Variable],
    evaluator: &F,
    ids: Vec<OperatorId>,
    mut decision_variables: Vec<VarId>,
) -> OperatorDecisionTree
where
    F: Fn(&Operator, VarId) -> Option<ValueId>,
{
    loop {
        if ids.is_empty() {
            return OperatorDecisionTree::Empty;
        }
        if decision_variables.is_empty() {
            return OperatorDecisionTree::Leaf(ids);
        }

        // Widest domain first keeps the tree shallow.
        let mut position = 0;
        for (index, &variable) in decision_variables.iter().enumerate() {
            if variables[variable].domain_range > variables[decision_variables[position]].domain_range
            {
                position = index;
            }
        }
        let variable = decision_variables.remove(position);
        let domain_range = variables[variable].domain_range;

        let mut by_value: Vec<Vec<OperatorId>> = vec![Vec::new(); domain_range];
        let mut unaffected = Vec::new();
        for &id in &ids {
            match evaluator(&operators[id], variable) {
                Some(value) => by_value[value].push(id),
                None => unaffected.push(id),
            }
        }

        // Nobody discriminates on this variable, so it gets no node.
        if unaffected.len() == ids.len() {
            continue;
        }

        return OperatorDecisionTree::Decision {
            variable,
            by_value: by_value
                .into_iter()
                .map(|subset| {
                    build_node(
                        operators,
                        variables,
                        evaluator,
                        subset,
                        decision_variables.clone(),
                    )
                })
                .collect(),
            unaffected: Box::new(build_node(
                operators,
                variables,
                evaluator,
                unaffected,
                decision_variables,
            )),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::{Assignment, SimpleConditions};

    fn simple(assignments: &[(usize, usize)]) -> SimpleConditions {
        SimpleConditions::from_assignments(
            assignments
                .iter()
                .map(|&(variable, value)| Assignment::new(variable, value)),
        )
        .unwrap()
    }

    fn operator(id: usize, pre: &[(usize, usize)], eff: &[(usize, usize)]) -> Operator {
        Operator::new(
            id,
            &format!("op{id}"),
            simple(pre),
            eff.iter()
                .map(|&(variable, value)| Effect::Primitive(Assignment::new(variable, value)))
                .collect(),
            1,
        )
    }

    fn variables() -> Vec<Variable> {
        vec![
            Variable::new("a", 2),
            Variable::new("b", 3),
            Variable::new("c", 2),
        ]
    }

    fn operators() -> Vec<Operator> {
        vec![
            operator(0, &[(0, 0)], &[(0, 1)]),
            operator(1, &[(1, 2)], &[(1, 0)]),
            operator(2, &[(0, 1), (1, 0)], &[(2, 1)]),
            operator(3, &[], &[(2, 0)]),
            operator(4, &[(2, 1)], &[(0, 0), (1, 1)]),
        ]
    }

    fn all_states() -> Vec<State> {
        let mut states = Vec::new();
        for a in 0..2 {
            for b in 0..3 {
                for c in 0..2 {
                    states.push(State::new(vec![a, b, c]));
                }
            }
        }
        states
    }

    #[test]
    fn test_empty_operator_set() {
        let tree = OperatorDecisionTree::applicability(&[], &variables());
        assert_eq!(tree, OperatorDecisionTree::Empty);
    }

    #[test]
    fn test_no_decision_variables_gives_leaf() {
        let tree = OperatorDecisionTree::applicability(&operators(), &[]);
        assert_eq!(tree, OperatorDecisionTree::Leaf(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_branches_on_widest_domain_first() {
        let tree = OperatorDecisionTree::applicability(&operators(), &variables());
        match &tree {
            OperatorDecisionTree::Decision {
                variable, by_value, ..
            } => {
                assert_eq!(*variable, 1);
                assert_eq!(by_value.len(), 3);
            }
            other => panic!("expected a decision node, got {other:?}"),
        }
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_indifferent_variable_is_skipped() {
        let operators = vec![operator(0, &[(1, 0)], &[]), operator(1, &[(1, 1)], &[])];
        let variables = vec![Variable::new("wide", 5), Variable::new("used", 2)];
        let tree = OperatorDecisionTree::applicability(&operators, &variables);
        match tree {
            OperatorDecisionTree::Decision { variable, .. } => assert_eq!(variable, 1),
            other => panic!("expected a decision node, got {other:?}"),
        }
    }

    #[test]
    fn test_applicability_is_sound() {
        let operators = operators();
        let tree = OperatorDecisionTree::applicability(&operators, &variables());
        for state in all_states() {
            let candidates = tree.applicable_candidates(&state);
            for operator in &operators {
                if operator.is_applicable(&state) {
                    assert!(
                        candidates.contains(&operator.id),
                        "{} missing for {state}",
                        operator.name
                    );
                }
            }
            // The tree resolves every precondition here, so nothing extra comes back.
            assert!(candidates
                .iter()
                .all(|&id| operators[id].is_applicable(&state)));
        }
    }

    #[test]
    fn test_relevance_is_sound() {
        let operators = operators();
        let tree = OperatorDecisionTree::relevance(&operators, &variables());
        let targets = vec![
            Conditions::from_assignments([Assignment::new(0, 1)]),
            Conditions::from_assignments([Assignment::new(1, 0), Assignment::new(2, 1)]),
            Conditions::from_assignments([Assignment::new(0, 0)]).disjunction_with(
                &Conditions::from_assignments([Assignment::new(2, 0)]),
            ),
        ];
        for target in targets {
            let candidates = tree.relevant_candidates(&target);
            for operator in &operators {
                if operator.is_relevant(&target) {
                    assert!(candidates.contains(&operator.id), "{} missing", operator.name);
                }
            }
        }

        let relative = RelativeState::new(vec![Some(0), None, None]);
        let candidates = tree.relevant_candidates_relative(&relative);
        assert!(candidates.contains(&4));
        assert!(!candidates.contains(&0));
    }
}
