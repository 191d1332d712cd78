use super::heap::{Heap, HeapKind};
use super::heuristic::Heuristic;
use super::node::{NodeId, NodeTable};
use super::problem::SearchProblem;
use super::{search_key, HeuristicSearch, ResultStatus, SearchLimits, SolutionPlan};
use crate::stat::Stats;

use std::time::Instant;
use tracing::{debug, instrument, trace};

/// Multi-heuristic A*.
///
/// One open list per heuristic, served in a fixed round-robin order. The
/// closed set is shared: a node closed through any list is closed for all.
pub struct MultiHeuristicAStarSearch<'a, P: SearchProblem> {
    problem: &'a P,
    heuristics: Vec<&'a dyn Heuristic<P>>,
    open_lists: Vec<Box<dyn Heap<NodeId>>>,
    nodes: NodeTable<P::Node, P::Operator>,
    limits: SearchLimits,
    stats: Stats,
    goal: Option<NodeId>,
    turn: usize,
}

impl<'a, P: SearchProblem> MultiHeuristicAStarSearch<'a, P> {
    /// Panics when `heuristics` is empty.
    pub fn new(
        problem: &'a P,
        heuristics: Vec<&'a dyn Heuristic<P>>,
        heap_kind: HeapKind,
        limits: SearchLimits,
    ) -> Self {
        assert!(
            !heuristics.is_empty(),
            "multi-heuristic search needs at least one heuristic"
        );
        let open_lists = heuristics.iter().map(|_| heap_kind.create()).collect();
        MultiHeuristicAStarSearch {
            problem,
            heuristics,
            open_lists,
            nodes: NodeTable::new(),
            limits,
            stats: Stats::default(),
            goal: None,
            turn: 0,
        }
    }

    fn init(&mut self) {
        for open in &mut self.open_lists {
            open.clear();
        }
        self.nodes.clear();
        self.goal = None;
        self.turn = 0;

        let initial = self.problem.initial_node();
        let h_values: Vec<f64> = self
            .heuristics
            .iter()
            .map(|heuristic| heuristic.value(&initial))
            .collect();
        let id = self.nodes.insert_initial(initial);
        self.push(id, 0.0, &h_values);
    }

    fn push(&mut self, id: NodeId, g_value: f64, h_values: &[f64]) {
        for (open, &h_value) in self.open_lists.iter_mut().zip(h_values) {
            if h_value != f64::INFINITY {
                open.add(search_key(g_value, h_value), id);
            }
        }
    }

    /// Pops from the next non-empty list in rotation order.
    fn pop(&mut self) -> Option<NodeId> {
        let count = self.open_lists.len();
        for offset in 0..count {
            let index = (self.turn + offset) % count;
            if let Some(id) = self.open_lists[index].remove_min() {
                self.turn = (index + 1) % count;
                return Some(id);
            }
        }
        None
    }

    fn search(&mut self, started: Instant) -> ResultStatus {
        loop {
            if let Some(status) = self.limits.check(started, self.nodes.len()) {
                debug!("search aborted: {status:?}");
                return status;
            }

            let Some(id) = self.pop() else {
                return ResultStatus::NoSolutionFound;
            };

            if !self.nodes.close(id) {
                continue;
            }

            if self.problem.is_goal_node(self.nodes.node(id)) {
                debug!("goal reached with g {}", self.nodes.info(id).g_value);
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
                let successor = self.nodes.node(successor_id);
                let h_values: Vec<f64> = self
                    .heuristics
                    .iter()
                    .map(|heuristic| heuristic.value_after(successor, &node, operator.as_ref()))
                    .collect();
                self.push(successor_id, g_new, &h_values);
            }
        }
    }

    fn open_size(&self) -> usize {
        self.open_lists.iter().map(|open| open.size()).sum()
    }
}

impl<'a, P: SearchProblem> HeuristicSearch<P> for MultiHeuristicAStarSearch<'a, P> {
    #[instrument(skip_all, name = "mha_star", fields(heuristics = self.heuristics.len()), level = "debug")]
    fn start(&mut self) -> ResultStatus {
        let started = Instant::now();
        self.stats = Stats {
            iterations: 1,
            ..Stats::default()
        };
        self.init();
        let status = self.search(started);

        self.stats.time_us = started.elapsed().as_micros() as usize;
        self.stats.open_nodes = self.open_size();
        self.stats.closed_nodes = self.nodes.closed_count();
        self.stats.cost = self.solution_cost();
        debug!("MHA* finished: {status:?}");
        self.stats.print("MHA*");
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
        self.open_size()
    }

    fn closed_nodes_count(&self) -> usize {
        self.nodes.closed_count()
    }

    fn name(&self) -> String {
        let descriptions: Vec<String> = self
            .heuristics
            .iter()
            .map(|heuristic| heuristic.description())
            .collect();
        format!("MHA* ({})", descriptions.join(", "))
    }

    fn stats(&self) -> &Stats {
        &self.stats
    }
}
