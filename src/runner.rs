use anyhow::Context;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::{Algorithm, Config, Direction, HeuristicKind};
use crate::sas::{
    ConditionsSpace, GoalCountHeuristic, Operator, RelativeStateSpace, SasProblem, StateSpace,
};
use crate::search::{
    AStarSearch, BlindHeuristic, Heuristic, HeuristicSearch, IdaStarSearch,
    MultiHeuristicAStarSearch, ResultStatus, SearchProblem, SolutionPlan,
};
use crate::stat::Stats;

/// Outcome of one planner run, written out as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub search: String,
    pub direction: Direction,
    pub status: ResultStatus,
    pub cost: Option<f64>,
    /// Operator names in execution order.
    pub plan: Option<Vec<String>>,
    /// Nodes on the solution path, for plans that carry no operators.
    pub nodes: Option<Vec<String>>,
    /// Whether the plan reaches the goal when replayed from the initial state.
    pub valid: Option<bool>,
    pub stats: Stats,
}

/// Runs the search `config` asks for on `problem`.
pub fn solve(problem: &SasProblem, config: &Config) -> anyhow::Result<PlanReport> {
    config.validate().context("invalid search configuration")?;
    let report = match config.direction {
        Direction::Forward => run(&StateSpace::new(problem), problem, config),
        Direction::Backward => run(&ConditionsSpace::new(problem), problem, config),
        Direction::Relative => run(&RelativeStateSpace::new(problem), problem, config),
    };
    Ok(report)
}

fn run<'p, P>(space: &P, problem: &'p SasProblem, config: &Config) -> PlanReport
where
    P: SearchProblem<Operator = &'p Operator>,
    GoalCountHeuristic<'p>: Heuristic<P>,
{
    let blind = BlindHeuristic;
    let goal_count = GoalCountHeuristic::new(problem);
    let heuristics: Vec<&dyn Heuristic<P>> = config
        .heuristics
        .iter()
        .map(|kind| match kind {
            HeuristicKind::Blind => &blind as &dyn Heuristic<P>,
            HeuristicKind::GoalCount => &goal_count as &dyn Heuristic<P>,
        })
        .collect();

    let limits = config.limits();
    let mut search: Box<dyn HeuristicSearch<P> + '_> = match config.algorithm {
        Algorithm::AStar => Box::new(AStarSearch::new(
            space,
            heuristics[0],
            config.heap.create(),
            limits,
        )),
        Algorithm::IdaStar => Box::new(IdaStarSearch::new(space, heuristics[0], limits)),
        Algorithm::MhaStar => Box::new(MultiHeuristicAStarSearch::new(
            space,
            heuristics,
            config.heap,
            limits,
        )),
    };

    let status = search.start();
    info!("{} finished with {status:?}", search.name());

    let mut report = PlanReport {
        search: search.name(),
        direction: config.direction,
        status,
        cost: None,
        plan: None,
        nodes: None,
        valid: None,
        stats: search.stats().clone(),
    };
    if status != ResultStatus::SolutionFound {
        return report;
    }

    report.cost = Some(search.solution_cost());
    match search.solution_plan() {
        Some(SolutionPlan::Operators(operators)) => {
            let valid = problem.validate_plan(&operators);
            if !valid {
                warn!("plan found by {} does not reach the goal", search.name());
            }
            report.valid = Some(valid);
            report.plan = Some(
                operators
                    .iter()
                    .map(|operator| operator.name.clone())
                    .collect(),
            );
        }
        Some(SolutionPlan::Nodes(nodes)) => {
            report.nodes = Some(nodes.iter().map(|node| format!("{node:?}")).collect());
        }
        None => {}
    }
    report
}
