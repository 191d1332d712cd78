use super::astar::AStarSearch;
use super::heap::LifoStack;
use super::heuristic::Heuristic;
use super::problem::SearchProblem;
use super::{HeuristicSearch, ResultStatus, SearchLimits, SolutionPlan};
use crate::stat::Stats;

use std::time::Instant;
use tracing::{debug, instrument};

/// Iterative-deepening A*.
///
/// Each pass is a depth-first run of the A* expansion over a stack that only
/// admits nodes with `g + h` within the current limit. The next limit is the
/// smallest `g + h` rejected in the pass before, starting from `h(initial)`.
pub struct IdaStarSearch<'a, P: SearchProblem> {
    search: AStarSearch<'a, P>,
}

impl<'a, P: SearchProblem> IdaStarSearch<'a, P> {
    pub fn new(problem: &'a P, heuristic: &'a dyn Heuristic<P>, limits: SearchLimits) -> Self {
        IdaStarSearch {
            search: AStarSearch::new(problem, heuristic, Box::new(LifoStack::new()), limits),
        }
    }

    /// Limit used by the last pass.
    pub fn limit(&self) -> Option<f64> {
        self.search.bound
    }
}

impl<'a, P: SearchProblem> HeuristicSearch<P> for IdaStarSearch<'a, P> {
    #[instrument(skip_all, name = "ida_star", fields(heuristic = self.search.heuristic.description()), level = "debug")]
    fn start(&mut self) -> ResultStatus {
        let started = Instant::now();
        self.search.stats = Stats::default();

        // A dead-end initial node is never admitted, so the first pass fails
        // with no finite limit to raise to.
        let initial = self.search.problem.initial_node();
        let mut limit = self.search.heuristic.value(&initial);

        loop {
            self.search.bound = Some(limit);
            self.search.next_bound = f64::INFINITY;
            self.search.stats.iterations += 1;
            self.search.init();

            let status = self.search.search(started);
            let next_limit = self.search.next_bound;
            if status == ResultStatus::NoSolutionFound && next_limit.is_finite() {
                debug!("raising limit from {limit} to {next_limit}");
                limit = next_limit;
                continue;
            }

            self.search.finish("IDA*", status, started);
            return status;
        }
    }

    fn solution_plan(&self) -> Option<SolutionPlan<P::Node, P::Operator>> {
        self.search.solution_plan()
    }

    fn solution_cost(&self) -> f64 {
        self.search.solution_cost()
    }

    fn open_nodes_count(&self) -> usize {
        self.search.open_nodes_count()
    }

    fn closed_nodes_count(&self) -> usize {
        self.search.closed_nodes_count()
    }

    fn name(&self) -> String {
        format!("IDA* ({})", self.search.heuristic.description())
    }

    fn stats(&self) -> &Stats {
        &self.search.stats
    }
}
