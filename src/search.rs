mod astar;
mod heap;
mod heuristic;
mod idastar;
mod mhastar;
mod node;
mod problem;
#[cfg(test)]
pub(crate) mod testing;

pub use astar::AStarSearch;
pub use heap::{BTreeQueue, BinaryHeapQueue, Heap, HeapKind, LifoStack};
pub use heuristic::{BlindHeuristic, Heuristic};
pub use idastar::IdaStarSearch;
pub use mhastar::MultiHeuristicAStarSearch;
pub use node::NodeId;
pub use problem::{SearchDirection, SearchProblem, Transition, TransitionResult};

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::stat::Stats;

/// Divisor of the heuristic part of the open list key; large enough that it
/// only breaks ties between equal `g + h` values.
pub(crate) const TIE_BREAK_SCALE: f64 = 1_000_000.0;

/// Terminal status of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultStatus {
    SolutionFound,
    NoSolutionFound,
    TimeLimitExceeded,
    MemoryLimitExceeded,
}

/// Budgets checked once per iteration of the search loop. Memory is measured
/// in tracked nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchLimits {
    pub time_limit: Option<Duration>,
    pub memory_limit: Option<usize>,
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        SearchLimits::default()
    }

    pub(crate) fn check(&self, started: Instant, tracked_nodes: usize) -> Option<ResultStatus> {
        if let Some(time_limit) = self.time_limit {
            if started.elapsed() >= time_limit {
                return Some(ResultStatus::TimeLimitExceeded);
            }
        }
        if let Some(memory_limit) = self.memory_limit {
            if tracked_nodes > memory_limit {
                return Some(ResultStatus::MemoryLimitExceeded);
            }
        }
        None
    }
}

/// A found plan: the applied operators, or the visited nodes when the
/// transitions carried no operators. Always in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionPlan<N, O> {
    Operators(Vec<O>),
    Nodes(Vec<N>),
}

impl<N, O> SolutionPlan<N, O> {
    pub fn len(&self) -> usize {
        match self {
            SolutionPlan::Operators(operators) => operators.len(),
            SolutionPlan::Nodes(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn operators(&self) -> Option<&[O]> {
        match self {
            SolutionPlan::Operators(operators) => Some(operators),
            SolutionPlan::Nodes(_) => None,
        }
    }
}

/// Surface shared by all search algorithms.
///
/// `start` resets all bookkeeping, so an engine can be restarted. The
/// solution accessors are only meaningful after [`ResultStatus::SolutionFound`];
/// otherwise the plan is `None` and the cost is NaN.
pub trait HeuristicSearch<P: SearchProblem> {
    fn start(&mut self) -> ResultStatus;

    fn solution_plan(&self) -> Option<SolutionPlan<P::Node, P::Operator>>;

    fn solution_cost(&self) -> f64;

    fn open_nodes_count(&self) -> usize;

    fn closed_nodes_count(&self) -> usize;

    fn name(&self) -> String;

    fn stats(&self) -> &Stats;
}

pub(crate) fn search_key(g_value: f64, h_value: f64) -> f64 {
    g_value + h_value + h_value / TIE_BREAK_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_prefers_lower_heuristic_on_ties() {
        assert!(search_key(3.0, 1.0) < search_key(2.0, 2.0));
        assert!(search_key(2.0, 2.0) < search_key(1.0, 4.0));
        // The tie break never overtakes a real difference in f.
        assert!(search_key(0.0, 1000.0) < search_key(1001.0, 0.0));
    }

    #[test]
    fn test_limits() {
        let started = Instant::now();
        assert_eq!(SearchLimits::unlimited().check(started, 1_000_000), None);

        let memory = SearchLimits {
            time_limit: None,
            memory_limit: Some(10),
        };
        assert_eq!(memory.check(started, 10), None);
        assert_eq!(
            memory.check(started, 11),
            Some(ResultStatus::MemoryLimitExceeded)
        );

        let time = SearchLimits {
            time_limit: Some(Duration::ZERO),
            memory_limit: None,
        };
        assert_eq!(
            time.check(started, 0),
            Some(ResultStatus::TimeLimitExceeded)
        );
    }
}
