use super::conditions::Conditions;
use super::problem::SasProblem;
use super::space::{ConditionsSpace, RelativeStateSpace, StateSpace};
use super::state::{Assignment, RelativeState, State};
use crate::search::Heuristic;

/// Number of constraints still open between the node and the other end of
/// the search.
///
/// Forward it counts the goal assignments a state misses. Backward it counts
/// the constraints of a node the initial state does not satisfy, taking the
/// best disjunct of a clause. Not admissible once an operator can achieve
/// several constraints at a time.
#[derive(Debug, Clone, Copy)]
pub struct GoalCountHeuristic<'p> {
    problem: &'p SasProblem,
}

impl<'p> GoalCountHeuristic<'p> {
    pub fn new(problem: &'p SasProblem) -> Self {
        GoalCountHeuristic { problem }
    }

    fn unsatisfied_by_initial_state<I>(&self, assignments: I) -> f64
    where
        I: Iterator<Item = Assignment>,
    {
        let initial_state = self.problem.initial_state();
        assignments
            .filter(|assignment| !initial_state.satisfies(assignment))
            .count() as f64
    }
}

impl<'p> Heuristic<StateSpace<'p>> for GoalCountHeuristic<'p> {
    fn value(&self, state: &State) -> f64 {
        self.problem
            .goal()
            .iter()
            .filter(|assignment| !state.satisfies(assignment))
            .count() as f64
    }

    fn description(&self) -> String {
        "goal count".to_string()
    }
}

impl<'p> Heuristic<ConditionsSpace<'p>> for GoalCountHeuristic<'p> {
    fn value(&self, conditions: &Conditions) -> f64 {
        if conditions.is_contradiction() {
            return f64::INFINITY;
        }
        conditions
            .disjuncts()
            .into_iter()
            .map(|disjunct| self.unsatisfied_by_initial_state(disjunct.iter()))
            .fold(f64::INFINITY, f64::min)
    }

    fn description(&self) -> String {
        "goal count".to_string()
    }
}

impl<'p> Heuristic<RelativeStateSpace<'p>> for GoalCountHeuristic<'p> {
    fn value(&self, state: &RelativeState) -> f64 {
        self.unsatisfied_by_initial_state(state.constrained())
    }

    fn description(&self) -> String {
        "goal count".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::{Effect, Operator, SimpleConditions, Variable};

    fn problem() -> SasProblem {
        let goal = SimpleConditions::from_assignments([
            Assignment::new(0, 1),
            Assignment::new(1, 1),
            Assignment::new(2, 0),
        ])
        .unwrap();
        SasProblem::new(
            vec![
                Variable::new("a", 2),
                Variable::new("b", 2),
                Variable::new("c", 2),
            ],
            Vec::new(),
            vec![Operator::new(
                0,
                "set-a",
                SimpleConditions::new(),
                vec![Effect::Primitive(Assignment::new(0, 1))],
                1,
            )],
            State::new(vec![0, 0, 0]),
            goal,
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_forward_goal_count() {
        let problem = problem();
        let heuristic = GoalCountHeuristic::new(&problem);
        let h = |state: Vec<usize>| {
            Heuristic::<StateSpace>::value(&heuristic, &State::new(state))
        };
        assert_eq!(h(vec![0, 0, 0]), 2.0);
        assert_eq!(h(vec![1, 0, 1]), 2.0);
        assert_eq!(h(vec![1, 1, 0]), 0.0);
    }

    #[test]
    fn test_backward_goal_count() {
        let problem = problem();
        let heuristic = GoalCountHeuristic::new(&problem);

        let goal = problem.goal_conditions();
        assert_eq!(Heuristic::<ConditionsSpace>::value(&heuristic, &goal), 2.0);
        assert_eq!(
            Heuristic::<ConditionsSpace>::value(&heuristic, &Conditions::Contradiction),
            f64::INFINITY
        );
        assert_eq!(
            Heuristic::<ConditionsSpace>::value(&heuristic, &Conditions::tautology()),
            0.0
        );

        // The cheaper disjunct counts.
        let clause = goal.disjunction_with(&Conditions::from_assignments([Assignment::new(1, 1)]));
        assert_eq!(Heuristic::<ConditionsSpace>::value(&heuristic, &clause), 1.0);

        let relative = problem.goal_relative_state();
        assert_eq!(
            Heuristic::<RelativeStateSpace>::value(&heuristic, &relative),
            2.0
        );
        assert_eq!(
            Heuristic::<RelativeStateSpace>::value(&heuristic, &RelativeState::new(vec![None; 3])),
            0.0
        );
    }
}
