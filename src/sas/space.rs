use tracing::trace;

use super::conditions::Conditions;
use super::operator::Operator;
use super::problem::SasProblem;
use super::state::{RelativeState, State};
use crate::search::{SearchDirection, SearchProblem, Transition};

/// Progression over complete states.
#[derive(Debug, Clone, Copy)]
pub struct StateSpace<'p> {
    problem: &'p SasProblem,
}

impl<'p> StateSpace<'p> {
    pub fn new(problem: &'p SasProblem) -> Self {
        StateSpace { problem }
    }

    pub fn problem(&self) -> &'p SasProblem {
        self.problem
    }
}

impl<'p> SearchProblem for StateSpace<'p> {
    type Node = State;
    type Operator = &'p Operator;

    fn direction(&self) -> SearchDirection {
        SearchDirection::Forward
    }

    fn initial_node(&self) -> State {
        self.problem.initial_state().clone()
    }

    fn is_goal_node(&self, state: &State) -> bool {
        self.problem.is_goal_state(state)
    }

    fn transitions(&self, state: &State) -> Vec<Transition<State, &'p Operator>> {
        let problem = self.problem;
        problem
            .applicable_operators(state)
            .into_iter()
            .map(|operator| {
                let successor = operator.apply(state, problem.axioms());
                Transition::new(operator, operator.cost, successor)
            })
            .collect()
    }
}

/// Regression over conditions, starting from the goal.
///
/// A regression that splits into a disjunction becomes a complex transition
/// with one node per disjunct. Contradictions and results violating a mutex
/// group are pruned.
#[derive(Debug, Clone, Copy)]
pub struct ConditionsSpace<'p> {
    problem: &'p SasProblem,
}

impl<'p> ConditionsSpace<'p> {
    pub fn new(problem: &'p SasProblem) -> Self {
        ConditionsSpace { problem }
    }

    pub fn problem(&self) -> &'p SasProblem {
        self.problem
    }
}

impl<'p> SearchProblem for ConditionsSpace<'p> {
    type Node = Conditions;
    type Operator = &'p Operator;

    fn direction(&self) -> SearchDirection {
        SearchDirection::Backward
    }

    fn initial_node(&self) -> Conditions {
        self.problem.goal_conditions()
    }

    fn is_goal_node(&self, conditions: &Conditions) -> bool {
        conditions.evaluate(self.problem.initial_state())
    }

    fn transitions(&self, conditions: &Conditions) -> Vec<Transition<Conditions, &'p Operator>> {
        let problem = self.problem;
        let mut transitions = Vec::new();
        for operator in problem.relevant_operators(conditions) {
            let regressed = operator.apply_backwards(conditions);
            if regressed.is_contradiction() {
                trace!("{operator} regresses {conditions} to a contradiction");
                continue;
            }
            let mut predecessors: Vec<Conditions> = regressed
                .disjuncts()
                .into_iter()
                .map(|disjunct| Conditions::Simple(disjunct.clone()))
                .filter(|predecessor| problem.is_compatible_with_mutex_groups(predecessor))
                .collect();
            match predecessors.len() {
                0 => {}
                1 => transitions.push(Transition::new(
                    operator,
                    operator.cost,
                    predecessors.swap_remove(0),
                )),
                _ => transitions.push(Transition::complex(operator, operator.cost, predecessors)),
            }
        }
        transitions
    }
}

/// Regression over partial states with wildcards.
#[derive(Debug, Clone, Copy)]
pub struct RelativeStateSpace<'p> {
    problem: &'p SasProblem,
}

impl<'p> RelativeStateSpace<'p> {
    pub fn new(problem: &'p SasProblem) -> Self {
        RelativeStateSpace { problem }
    }

    pub fn problem(&self) -> &'p SasProblem {
        self.problem
    }
}

impl<'p> SearchProblem for RelativeStateSpace<'p> {
    type Node = RelativeState;
    type Operator = &'p Operator;

    fn direction(&self) -> SearchDirection {
        SearchDirection::Backward
    }

    fn initial_node(&self) -> RelativeState {
        self.problem.goal_relative_state()
    }

    fn is_goal_node(&self, state: &RelativeState) -> bool {
        state.matches(self.problem.initial_state())
    }

    fn transitions(&self, state: &RelativeState) -> Vec<Transition<RelativeState, &'p Operator>> {
        let problem = self.problem;
        let mut transitions = Vec::new();
        for operator in problem.relevant_operators_relative(state) {
            let mut predecessors = operator.apply_backwards_relative(state);
            predecessors
                .retain(|predecessor| problem.is_relative_compatible_with_mutex_groups(predecessor));
            match predecessors.len() {
                0 => {}
                1 => transitions.push(Transition::new(
                    operator,
                    operator.cost,
                    predecessors.swap_remove(0),
                )),
                _ => transitions.push(Transition::complex(operator, operator.cost, predecessors)),
            }
        }
        transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sas::{Assignment, Effect, MutexGroup, SimpleConditions, Variable};
    use crate::search::{
        AStarSearch, BinaryHeapQueue, BlindHeuristic, HeuristicSearch, ResultStatus, SearchLimits,
        SolutionPlan,
    };

    fn simple(assignments: &[(usize, usize)]) -> SimpleConditions {
        SimpleConditions::from_assignments(
            assignments
                .iter()
                .map(|&(variable, value)| Assignment::new(variable, value)),
        )
        .unwrap()
    }

    /// var0 walks 0 -> 1 -> 2; var1 is switched on by a conditional effect
    /// that needs var0 = 2.
    fn chain_problem(mutex_groups: Vec<MutexGroup>) -> SasProblem {
        SasProblem::new(
            vec![Variable::new("var0", 3), Variable::new("var1", 2)],
            mutex_groups,
            vec![
                Operator::new(
                    0,
                    "step-1",
                    simple(&[(0, 0)]),
                    vec![Effect::Primitive(Assignment::new(0, 1))],
                    1,
                ),
                Operator::new(
                    1,
                    "step-2",
                    simple(&[(0, 1)]),
                    vec![Effect::Primitive(Assignment::new(0, 2))],
                    1,
                ),
                Operator::new(
                    2,
                    "switch",
                    SimpleConditions::new(),
                    vec![Effect::Conditional {
                        conditions: simple(&[(0, 2)]),
                        assignment: Assignment::new(1, 1),
                    }],
                    1,
                ),
            ],
            State::new(vec![0, 0]),
            simple(&[(0, 2), (1, 1)]),
            Vec::new(),
        )
        .unwrap()
    }

    fn plan_names<P>(search: &AStarSearch<'_, P>) -> Vec<String>
    where
        P: SearchProblem<Operator = &'static Operator>,
    {
        match search.solution_plan().unwrap() {
            SolutionPlan::Operators(operators) => {
                operators.iter().map(|operator| operator.name.clone()).collect()
            }
            SolutionPlan::Nodes(_) => panic!("expected an operator plan"),
        }
    }

    fn run<P>(space: &P) -> (ResultStatus, f64, Vec<String>)
    where
        P: SearchProblem<Operator = &'static Operator>,
    {
        let mut search = AStarSearch::new(
            space,
            &BlindHeuristic,
            Box::new(BinaryHeapQueue::new()),
            SearchLimits::unlimited(),
        );
        let status = search.start();
        let names = if status == ResultStatus::SolutionFound {
            plan_names(&search)
        } else {
            Vec::new()
        };
        (status, search.solution_cost(), names)
    }

    fn leak(problem: SasProblem) -> &'static SasProblem {
        Box::leak(Box::new(problem))
    }

    #[test]
    fn test_forward_space() {
        let problem = leak(chain_problem(Vec::new()));
        let (status, cost, names) = run(&StateSpace::new(problem));
        assert_eq!(status, ResultStatus::SolutionFound);
        assert_eq!(cost, 3.0);
        assert_eq!(names, vec!["step-1", "step-2", "switch"]);
    }

    #[test]
    fn test_conditions_space() {
        let problem = leak(chain_problem(Vec::new()));
        let (status, cost, names) = run(&ConditionsSpace::new(problem));
        assert_eq!(status, ResultStatus::SolutionFound);
        assert_eq!(cost, 3.0);
        assert_eq!(names, vec!["step-1", "step-2", "switch"]);
        let plan: Vec<&Operator> = names
            .iter()
            .map(|name| problem.operators().iter().find(|op| &op.name == name).unwrap())
            .collect();
        assert!(problem.validate_plan(&plan));
    }

    #[test]
    fn test_relative_state_space() {
        let problem = leak(chain_problem(Vec::new()));
        let (status, cost, names) = run(&RelativeStateSpace::new(problem));
        assert_eq!(status, ResultStatus::SolutionFound);
        assert_eq!(cost, 3.0);
        assert_eq!(names, vec!["step-1", "step-2", "switch"]);
    }

    #[test]
    fn test_conditional_regression_is_complex_transition() {
        let problem = chain_problem(Vec::new());
        let space = ConditionsSpace::new(&problem);
        let transitions = space.transitions(&space.initial_node());
        let switch = transitions
            .iter()
            .find(|transition| transition.applied_operator().unwrap().name == "switch")
            .unwrap();
        assert!(switch.is_complex_transition());

        let space = RelativeStateSpace::new(&problem);
        let transitions = space.transitions(&space.initial_node());
        let switch = transitions
            .iter()
            .find(|transition| transition.applied_operator().unwrap().name == "switch")
            .unwrap();
        assert!(switch.is_complex_transition());
    }

    #[test]
    fn test_mutex_groups_prune_regressions() {
        // var0 = 1 and var1 = 1 can never hold together, which rules out the
        // predecessor step-2 regresses the goal to.
        let problem = chain_problem(vec![MutexGroup::new(vec![
            Assignment::new(0, 1),
            Assignment::new(1, 1),
        ])]);
        let space = ConditionsSpace::new(&problem);
        let transitions = space.transitions(&space.initial_node());
        assert!(transitions
            .iter()
            .all(|transition| transition.applied_operator().unwrap().name != "step-2"));

        let space = RelativeStateSpace::new(&problem);
        let transitions = space.transitions(&space.initial_node());
        assert!(transitions
            .iter()
            .all(|transition| transition.applied_operator().unwrap().name != "step-2"));
    }

    #[test]
    fn test_backward_goal_nodes() {
        let problem = chain_problem(Vec::new());
        let space = ConditionsSpace::new(&problem);
        assert!(!space.is_goal_node(&space.initial_node()));
        assert!(space.is_goal_node(&Conditions::tautology()));
        assert!(!space.is_goal_node(&Conditions::Contradiction));

        let space = RelativeStateSpace::new(&problem);
        assert!(space.is_goal_node(&RelativeState::new(vec![Some(0), None])));
        assert!(!space.is_goal_node(&RelativeState::new(vec![Some(1), None])));
    }
}
