use super::conditions::{Conditions, EffectRelevance, SimpleConditions};
use super::state::{Assignment, RelativeState, State};

/// Single effect of an operator.
///
/// Guards of conditional effects are always evaluated against the state before
/// the operator is applied, see [`Operator::apply`](super::Operator::apply).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Effect {
    Primitive(Assignment),
    Conditional {
        conditions: SimpleConditions,
        assignment: Assignment,
    },
}

impl Effect {
    pub fn assignment(&self) -> Assignment {
        match self {
            Effect::Primitive(assignment) | Effect::Conditional { assignment, .. } => *assignment,
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Effect::Conditional { .. })
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        match self {
            Effect::Primitive(_) => true,
            Effect::Conditional { conditions, .. } => conditions.evaluate(state),
        }
    }

    /// Writes the assignment without checking the guard.
    pub fn apply(&self, state: &mut State) {
        state.set(self.assignment());
    }

    pub fn relevance(&self, target: &Conditions) -> EffectRelevance {
        match self {
            Effect::Primitive(assignment) => target.effect_relevance(assignment),
            Effect::Conditional {
                conditions,
                assignment,
            } => match target.effect_relevance(assignment) {
                EffectRelevance::Relevant => {
                    // The guard has to be satisfiable together with everything
                    // the assignment does not produce.
                    let mut rest = target.clone();
                    rest.remove_constraint(assignment);
                    if rest.is_conflicted_with(&Conditions::Simple(conditions.clone())) {
                        EffectRelevance::Irrelevant
                    } else {
                        EffectRelevance::Relevant
                    }
                }
                relevance => relevance,
            },
        }
    }

    /// Weakest conditions before this effect under which `target` holds afterwards.
    ///
    /// Only exact for an operator with this single effect; sibling effects are
    /// combined by [`Operator::apply_backwards`](super::Operator::apply_backwards).
    pub fn apply_backwards(&self, target: &Conditions) -> Conditions {
        match self {
            Effect::Primitive(assignment) => {
                if target.is_conflicted_with_assignment(assignment) {
                    return Conditions::Contradiction;
                }
                let mut result = target.clone();
                result.remove_constraint(assignment);
                result
            }
            Effect::Conditional {
                conditions,
                assignment,
            } => {
                if self.relevance(target) != EffectRelevance::Relevant {
                    return target.clone();
                }
                let mut fired = target.clone();
                fired.remove_constraint(assignment);
                let fired = fired.conjunction_with(&Conditions::Simple(conditions.clone()));
                // Either the effect did not fire and the target already held,
                // or the guard held and the effect produced the assignment.
                target.disjunction_with(&fired)
            }
        }
    }

    pub fn relevance_relative(&self, target: &RelativeState) -> EffectRelevance {
        let assignment = self.assignment();
        let relevance = match target.value(assignment.variable) {
            None => EffectRelevance::Irrelevant,
            Some(value) if value == assignment.value => EffectRelevance::Relevant,
            Some(_) => EffectRelevance::AntiRelevant,
        };
        match self {
            Effect::Conditional { conditions, .. } if relevance == EffectRelevance::Relevant => {
                let guard_conflicts = conditions.iter().any(|guard| {
                    guard.variable != assignment.variable
                        && matches!(target.value(guard.variable), Some(value) if value != guard.value)
                });
                if guard_conflicts {
                    EffectRelevance::Irrelevant
                } else {
                    EffectRelevance::Relevant
                }
            }
            _ => relevance,
        }
    }

    /// Regresses a relative state; a relevant conditional effect yields both the
    /// "not fired" and the "fired" predecessor.
    pub fn apply_backwards_relative(&self, target: &RelativeState) -> Vec<RelativeState> {
        if self.relevance_relative(target) != EffectRelevance::Relevant {
            return vec![target.clone()];
        }
        let assignment = self.assignment();
        match self {
            Effect::Primitive(_) => {
                let mut result = target.clone();
                result.set(assignment.variable, None);
                vec![result]
            }
            Effect::Conditional { conditions, .. } => {
                let mut fired = target.clone();
                fired.set(assignment.variable, None);
                if conditions.iter().all(|guard| fired.restrict(&guard)) {
                    vec![target.clone(), fired]
                } else {
                    vec![target.clone()]
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions(assignments: &[(usize, usize)]) -> Conditions {
        Conditions::from_assignments(
            assignments
                .iter()
                .map(|&(variable, value)| Assignment::new(variable, value)),
        )
    }

    fn guard(assignments: &[(usize, usize)]) -> SimpleConditions {
        SimpleConditions::from_assignments(
            assignments
                .iter()
                .map(|&(variable, value)| Assignment::new(variable, value)),
        )
        .unwrap()
    }

    #[test]
    fn test_conditional_effect_applicability() {
        let effect = Effect::Conditional {
            conditions: guard(&[(1, 0)]),
            assignment: Assignment::new(0, 1),
        };
        assert!(effect.is_applicable(&State::new(vec![0, 0])));
        assert!(!effect.is_applicable(&State::new(vec![0, 1])));
    }

    #[test]
    fn test_primitive_regression() {
        let effect = Effect::Primitive(Assignment::new(0, 1));
        assert_eq!(
            effect.apply_backwards(&conditions(&[(0, 1), (1, 0)])),
            conditions(&[(1, 0)])
        );
        assert!(effect
            .apply_backwards(&conditions(&[(0, 0)]))
            .is_contradiction());
    }

    #[test]
    fn test_primitive_regression_round_trip() {
        let effect = Effect::Primitive(Assignment::new(0, 1));
        let target = conditions(&[(0, 1), (1, 1)]);
        let regressed = effect.apply_backwards(&target);
        for values in [[0, 1], [1, 1], [2, 1]] {
            let mut state = State::new(values.to_vec());
            assert!(regressed.evaluate(&state));
            effect.apply(&mut state);
            assert!(target.evaluate(&state));
        }
    }

    #[test]
    fn test_conditional_regression_yields_disjunction() {
        let effect = Effect::Conditional {
            conditions: guard(&[(1, 0)]),
            assignment: Assignment::new(0, 1),
        };
        let target = conditions(&[(0, 1)]);
        assert_eq!(effect.relevance(&target), EffectRelevance::Relevant);

        let regressed = effect.apply_backwards(&target);
        let expected = conditions(&[(0, 1)]).disjunction_with(&conditions(&[(1, 0)]));
        assert_eq!(regressed, expected);
        assert!(matches!(regressed, Conditions::Clause(_)));
    }

    #[test]
    fn test_conditional_effect_with_conflicting_guard_is_irrelevant() {
        let effect = Effect::Conditional {
            conditions: guard(&[(1, 0)]),
            assignment: Assignment::new(0, 1),
        };
        let target = conditions(&[(0, 1), (1, 1)]);
        assert_eq!(effect.relevance(&target), EffectRelevance::Irrelevant);
        assert_eq!(effect.apply_backwards(&target), target);
    }

    #[test]
    fn test_relative_regression() {
        let primitive = Effect::Primitive(Assignment::new(0, 1));
        let target = RelativeState::new(vec![Some(1), Some(0)]);
        assert_eq!(
            primitive.apply_backwards_relative(&target),
            vec![RelativeState::new(vec![None, Some(0)])]
        );
        assert_eq!(
            primitive.relevance_relative(&RelativeState::new(vec![Some(0), None])),
            EffectRelevance::AntiRelevant
        );

        let conditional = Effect::Conditional {
            conditions: guard(&[(1, 0)]),
            assignment: Assignment::new(0, 1),
        };
        let target = RelativeState::new(vec![Some(1), None]);
        assert_eq!(
            conditional.apply_backwards_relative(&target),
            vec![
                RelativeState::new(vec![Some(1), None]),
                RelativeState::new(vec![None, Some(0)]),
            ]
        );
    }
}
