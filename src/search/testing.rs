//! Small explicit graphs for exercising the search algorithms.
use super::heuristic::Heuristic;
use super::problem::{SearchDirection, SearchProblem, Transition};

#[derive(Debug, Clone)]
pub(crate) struct GraphProblem {
    pub(crate) edges: Vec<(usize, usize, u32)>,
    /// Operator-labelled fan-out edges `(from, targets, cost)`.
    pub(crate) fans: Vec<(usize, Vec<usize>, u32)>,
    pub(crate) initial: usize,
    pub(crate) goals: Vec<usize>,
    pub(crate) direction: SearchDirection,
    pub(crate) labelled: bool,
}

impl GraphProblem {
    pub(crate) fn new(edges: &[(usize, usize, u32)], initial: usize, goals: &[usize]) -> Self {
        GraphProblem {
            edges: edges.to_vec(),
            fans: Vec::new(),
            initial,
            goals: goals.to_vec(),
            direction: SearchDirection::Forward,
            labelled: true,
        }
    }
}

impl SearchProblem for GraphProblem {
    type Node = usize;
    type Operator = String;

    fn direction(&self) -> SearchDirection {
        self.direction
    }

    fn initial_node(&self) -> usize {
        self.initial
    }

    fn is_goal_node(&self, node: &usize) -> bool {
        self.goals.contains(node)
    }

    fn transitions(&self, node: &usize) -> Vec<Transition<usize, String>> {
        let mut transitions: Vec<_> = self
            .edges
            .iter()
            .filter(|(from, _, _)| from == node)
            .map(|&(from, to, cost)| {
                if self.labelled {
                    Transition::new(format!("{from}->{to}"), cost, to)
                } else {
                    Transition::unlabelled(cost, to)
                }
            })
            .collect();
        transitions.extend(
            self.fans
                .iter()
                .filter(|(from, _, _)| from == node)
                .map(|(from, targets, cost)| {
                    Transition::complex(format!("{from}->*"), *cost, targets.clone())
                }),
        );
        transitions
    }
}

/// Per-node heuristic values; missing nodes get zero.
pub(crate) struct TableHeuristic(pub(crate) Vec<f64>);

impl Heuristic<GraphProblem> for TableHeuristic {
    fn value(&self, node: &usize) -> f64 {
        self.0.get(*node).copied().unwrap_or(0.0)
    }

    fn description(&self) -> String {
        "table".to_string()
    }
}

/// Six nodes, two routes to the goal 5:
/// 0 -1-> 1 -1-> 2 -5-> 5 (cost 7) and 0 -2-> 3 -2-> 4 -2-> 5 (cost 6).
pub(crate) fn two_routes() -> GraphProblem {
    GraphProblem::new(
        &[
            (0, 1, 1),
            (1, 2, 1),
            (2, 5, 5),
            (0, 3, 2),
            (3, 4, 2),
            (4, 5, 2),
            (1, 0, 1),
            (4, 3, 1),
        ],
        0,
        &[5],
    )
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("trace")
        .with_test_writer()
        .try_init();
}
