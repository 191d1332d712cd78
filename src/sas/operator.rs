use std::fmt;

use super::axioms::AxiomRules;
use super::conditions::{Conditions, EffectRelevance, SimpleConditions};
use super::effects::Effect;
use super::state::{Assignment, MutexGroup, OperatorId, RelativeState, State};

/// Grounded SAS+ operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    pub preconditions: SimpleConditions,
    pub effects: Vec<Effect>,
    pub cost: u32,
}

impl Operator {
    pub fn new(
        id: OperatorId,
        name: &str,
        preconditions: SimpleConditions,
        effects: Vec<Effect>,
        cost: u32,
    ) -> Self {
        Operator {
            id,
            name: name.to_string(),
            preconditions,
            effects,
            cost,
        }
    }

    pub fn is_applicable(&self, state: &State) -> bool {
        self.preconditions.evaluate(state)
    }

    /// Applies the operator to a copy of `state`.
    pub fn apply(&self, state: &State, axioms: &AxiomRules) -> State {
        let mut successor = state.clone();
        self.apply_in_place(&mut successor, axioms);
        successor
    }

    /// Applies the operator to `state` itself.
    pub fn apply_in_place(&self, state: &mut State, axioms: &AxiomRules) {
        // Every guard sees the state as it was before the operator.
        let firing: Vec<&Effect> = self
            .effects
            .iter()
            .filter(|effect| effect.is_applicable(state))
            .collect();
        for effect in firing {
            effect.apply(state);
        }
        axioms.apply(state);
    }

    /// Aggregated relevance: one anti-relevant effect vetoes the operator.
    pub fn relevance(&self, target: &Conditions) -> EffectRelevance {
        aggregate_relevance(self.effects.iter().map(|effect| effect.relevance(target)))
    }

    pub fn is_relevant(&self, target: &Conditions) -> bool {
        self.relevance(target) == EffectRelevance::Relevant
    }

    /// Regresses `target` through the operator, one disjunct at a time.
    pub fn apply_backwards(&self, target: &Conditions) -> Conditions {
        if self.relevance(target) == EffectRelevance::AntiRelevant {
            return Conditions::Contradiction;
        }
        let mut result = Conditions::Contradiction;
        for disjunct in target.disjuncts() {
            result = result.disjunction_with(&self.regress_disjunct(disjunct));
        }
        result.conjunction_with(&Conditions::Simple(self.preconditions.clone()))
    }

    /// Conditions on the state before the operator under which `target` holds
    /// afterwards, preconditions aside.
    ///
    /// A constrained variable that conditional effects write either holds its
    /// value already or one of the guards producing it holds. Guards are read
    /// in the state before the operator, so they are only ever conjoined and
    /// never regressed through a sibling effect.
    fn regress_disjunct(&self, target: &SimpleConditions) -> Conditions {
        if self
            .effects
            .iter()
            .any(|effect| target.is_conflicted_with_assignment(&effect.assignment()))
        {
            return Conditions::Contradiction;
        }

        let mut untouched = target.clone();
        for effect in self.effects.iter().filter(|effect| !effect.is_conditional()) {
            untouched.remove_constraint(&effect.assignment());
        }

        let achieved = self.achievers(untouched.iter());
        for (assignment, _) in &achieved {
            untouched.remove_constraint(assignment);
        }

        let mut result = Conditions::Simple(untouched);
        for (assignment, guards) in achieved {
            let mut options = Conditions::from_assignments([assignment]);
            for guard in guards {
                options = options.disjunction_with(&Conditions::Simple(guard.clone()));
            }
            result = result.conjunction_with(&options);
        }
        result
    }

    /// Pairs every assignment some conditional effect produces with the guards
    /// of those effects.
    fn achievers<I>(&self, assignments: I) -> Vec<(Assignment, Vec<&SimpleConditions>)>
    where
        I: IntoIterator<Item = Assignment>,
    {
        assignments
            .into_iter()
            .filter_map(|assignment| {
                let guards: Vec<&SimpleConditions> = self
                    .effects
                    .iter()
                    .filter_map(|effect| match effect {
                        Effect::Conditional {
                            conditions,
                            assignment: produced,
                        } if *produced == assignment => Some(conditions),
                        _ => None,
                    })
                    .collect();
                (!guards.is_empty()).then_some((assignment, guards))
            })
            .collect()
    }

    pub fn relevance_relative(&self, target: &RelativeState) -> EffectRelevance {
        aggregate_relevance(
            self.effects
                .iter()
                .map(|effect| effect.relevance_relative(target)),
        )
    }

    /// Regresses a relative state; several results mean the regression split
    /// on conditional effects. Empty if the operator cannot precede `target`.
    pub fn apply_backwards_relative(&self, target: &RelativeState) -> Vec<RelativeState> {
        if self.relevance_relative(target) != EffectRelevance::Relevant {
            return Vec::new();
        }
        let mut base = target.clone();
        for effect in self.effects.iter().filter(|effect| !effect.is_conditional()) {
            base.set(effect.assignment().variable, None);
        }
        let achieved = self.achievers(base.constrained().collect::<Vec<_>>());
        for (assignment, _) in &achieved {
            base.set(assignment.variable, None);
        }

        let mut results = vec![base];
        for (assignment, guards) in &achieved {
            let mut next = Vec::new();
            for state in &results {
                let mut held = state.clone();
                if held.restrict(assignment) {
                    next.push(held);
                }
                for guard in guards {
                    let mut fired = state.clone();
                    if guard.iter().all(|condition| fired.restrict(&condition)) {
                        next.push(fired);
                    }
                }
            }
            results = next;
        }

        results.retain_mut(|state| {
            self.preconditions
                .iter()
                .all(|precondition| state.restrict(&precondition))
        });
        results.sort();
        results.dedup();
        results
    }

    /// Checks that neither the preconditions nor the unconditional outcome
    /// of the operator hold two members of a mutex group.
    pub fn is_compatible_with_mutex_constraints(&self, groups: &[MutexGroup]) -> bool {
        let mut outcome = self.preconditions.clone();
        for effect in self.effects.iter().filter(|effect| !effect.is_conditional()) {
            let assignment: Assignment = effect.assignment();
            outcome.remove_constraint(&assignment);
            outcome.insert(assignment);
        }
        groups.iter().all(|group| {
            self.preconditions.is_compatible_with_mutex_constraints(group)
                && outcome.is_compatible_with_mutex_constraints(group)
        })
    }
}

fn aggregate_relevance<I>(relevances: I) -> EffectRelevance
where
    I: IntoIterator<Item = EffectRelevance>,
{
    let mut relevant = false;
    for relevance in relevances {
        match relevance {
            EffectRelevance::AntiRelevant => return EffectRelevance::AntiRelevant,
            EffectRelevance::Relevant => relevant = true,
            EffectRelevance::Irrelevant => {}
        }
    }
    if relevant {
        EffectRelevance::Relevant
    } else {
        EffectRelevance::Irrelevant
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
