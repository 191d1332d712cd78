use std::fmt::Debug;
use std::hash::Hash;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult<N> {
    Single(N),
    /// Fan-out into several nodes reached by the same operator.
    Complex(Vec<N>),
}

/// Edge from an expanded node to its successor(s).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition<N, O> {
    applied_operator: Option<O>,
    cost: u32,
    result: TransitionResult<N>,
}

impl<N, O> Transition<N, O> {
    pub fn new(operator: O, cost: u32, node: N) -> Self {
        Transition {
            applied_operator: Some(operator),
            cost,
            result: TransitionResult::Single(node),
        }
    }

    pub fn complex(operator: O, cost: u32, nodes: Vec<N>) -> Self {
        Transition {
            applied_operator: Some(operator),
            cost,
            result: TransitionResult::Complex(nodes),
        }
    }

    /// Transition that is not labelled by an operator.
    pub fn unlabelled(cost: u32, node: N) -> Self {
        Transition {
            applied_operator: None,
            cost,
            result: TransitionResult::Single(node),
        }
    }

    pub fn applied_operator(&self) -> Option<&O> {
        self.applied_operator.as_ref()
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn is_complex_transition(&self) -> bool {
        matches!(self.result, TransitionResult::Complex(_))
    }

    pub fn result(&self) -> &TransitionResult<N> {
        &self.result
    }

    pub fn into_parts(self) -> (Option<O>, Vec<N>) {
        let nodes = match self.result {
            TransitionResult::Single(node) => vec![node],
            TransitionResult::Complex(nodes) => nodes,
        };
        (self.applied_operator, nodes)
    }
}

/// The state space a search runs over.
///
/// Nodes are stored by value in the search's node table, so they have to be
/// hashable. A backward problem starts from the goal side; its initial node is
/// the goal description and its goal nodes are satisfied by the initial state.
pub trait SearchProblem {
    type Node: Clone + Eq + Hash + Debug;
    type Operator: Clone + Debug;

    fn direction(&self) -> SearchDirection;

    fn initial_node(&self) -> Self::Node;

    fn is_goal_node(&self, node: &Self::Node) -> bool;

    fn transitions(&self, node: &Self::Node) -> Vec<Transition<Self::Node, Self::Operator>>;
}
