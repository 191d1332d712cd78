use super::heap::Heap;
use super::heuristic::Heuristic;
use super::node::{NodeId, NodeTable};
use super::problem::SearchProblem;
use super::{search_key, HeuristicSearch, ResultStatus, SearchLimits, SolutionPlan};
use crate::stat::Stats;

use std::time::Instant;
use tracing::{debug, instrument, trace};

/// A* over an abstract open list.
///
/// The open list is keyed by `g + h` plus a small tie break towards lower `h`.
/// With an admission bound set (see [`IdaStarSearch`](super::IdaStarSearch))
/// nodes with `g + h` above the bound are rejected and the smallest rejected
/// value is remembered.
pub struct AStarSearch<'a, P: SearchProblem> {
    pub(super) problem: &'a P,
    pub(super) heuristic: &'a dyn Heuristic<P>,
    pub(super) open: Box<dyn Heap<NodeId>>,
    pub(super) nodes: NodeTable<P::Node, P::Operator>,
    pub(super) limits: SearchLimits,
    pub(super) stats: Stats,
    pub(super) goal: Option<NodeId>,
    pub(super) bound: Option<f64>,
    pub(super) next_bound: f64,
}

impl<'a, P: SearchProblem> AStarSearch<'a, P> {
    pub fn new(
        problem: &'a P,
        heuristic: &'a dyn Heuristic<P>,
        open: Box<dyn Heap<NodeId>>,
        limits: SearchLimits,
    ) -> Self {
        AStarSearch {
            problem,
            heuristic,
            open,
            nodes: NodeTable::new(),
            limits,
            stats: Stats::default(),
            goal: None,
            bound: None,
            next_bound: f64::INFINITY,
        }
    }

    /// Clears the open list and node table and seeds them with the initial node.
    pub(super) fn init(&mut self) {
        self.open.clear();
        self.nodes.clear();
        self.goal = None;

        let initial = self.problem.initial_node();
        let h_value = self.heuristic.value(&initial);
        let id = self.nodes.insert_initial(initial);
        if let Some(key) = self.admission_key(0.0, h_value) {
            self.open.add(key, id);
        }
    }

    pub(super) fn search(&mut self, started: Instant) -> ResultStatus {
        loop {
            if let Some(status) = self.limits.check(started, self.nodes.len()) {
                debug!("search aborted: {status:?}");
                return status;
            }

            let Some(id) = self.open.remove_min() else {
                return ResultStatus::NoSolutionFound;
            };

            // Stale entry of a node expanded before.
            if !self.nodes.close(id) {
                continue;
            }

            if self.problem.is_goal_node(self.nodes.node(id)) {
                debug!(
                    "goal reached with g {}: {:?}",
                    self.nodes.info(id).g_value,
                    self.nodes.node(id)
                );
                self.goal = Some(id);
                return ResultStatus::SolutionFound;
            }

            self.expand(id);
        }
    }

    fn expand(&mut self, id: NodeId) {
        self.stats.expanded_nodes += 1;
        let g_value = self.nodes.info(id).g_value;
        let node = self.nodes.node(id).clone();
        trace!("expand node: {node:?} g {g_value}");

        for transition in self.problem.transitions(&node) {
            let g_new = g_value + f64::from(transition.cost());
            let (operator, successors) = transition.into_parts();
            for successor in successors {
                self.stats.generated_nodes += 1;
                let Some(successor_id) = self.nodes.relax(successor, g_new, id, operator.clone())
                else {
                    continue;
                };
                let h_value = self.heuristic.value_after(
                    self.nodes.node(successor_id),
                    &node,
                    operator.as_ref(),
                );
                if let Some(key) = self.admission_key(g_new, h_value) {
                    self.open.add(key, successor_id);
                }
            }
        }
    }

    fn admission_key(&mut self, g_value: f64, h_value: f64) -> Option<f64> {
        if h_value == f64::INFINITY {
            return None;
        }
        if let Some(bound) = self.bound {
            let f_value = g_value + h_value;
            if f_value > bound {
                self.next_bound = self.next_bound.min(f_value);
                return None;
            }
        }
        Some(search_key(g_value, h_value))
    }

    pub(super) fn finish(&mut self, name: &str, status: ResultStatus, started: Instant) {
        self.stats.time_us = started.elapsed().as_micros() as usize;
        self.stats.open_nodes = self.open.size();
        self.stats.closed_nodes = self.nodes.closed_count();
        self.stats.cost = self.solution_cost();
        debug!("{name} finished: {status:?}");
        self.stats.print(name);
    }
}

impl<'a, P: SearchProblem> HeuristicSearch<P> for AStarSearch<'a, P> {
    #[instrument(skip_all, name = "a_star", fields(heuristic = self.heuristic.description(), open = self.open.name()), level = "debug")]
    fn start(&mut self) -> ResultStatus {
        let started = Instant::now();
        self.stats = Stats {
            iterations: 1,
            ..Stats::default()
        };
        self.bound = None;
        self.init();
        let status = self.search(started);
        self.finish("A*", status, started);
        status
    }

    fn solution_plan(&self) -> Option<SolutionPlan<P::Node, P::Operator>> {
        self.goal
            .map(|goal| self.nodes.reconstruct_plan(goal, self.problem.direction()))
    }

    fn solution_cost(&self) -> f64 {
        self.goal
            .map(|goal| self.nodes.info(goal).g_value)
            .unwrap_or(f64::NAN)
    }

    fn open_nodes_count(&self) -> usize {
        self.open.size()
    }

    fn closed_nodes_count(&self) -> usize {
        self.nodes.closed_count()
    }

    fn name(&self) -> String {
        format!("A* ({})", self.heuristic.description())
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
