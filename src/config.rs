use anyhow::{anyhow, Context};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::search::{HeapKind, SearchLimits};

#[derive(Parser, Debug)]
#[command(
    name = "SAS search",
    about = "Forward and backward heuristic search over grounded SAS+ problems.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file; flags given here override it")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the YAML problem file")]
    pub problem_path: Option<String>,

    #[arg(long, help = "Write the result as JSON to this file")]
    pub output_path: Option<String>,

    #[arg(long, value_enum, help = "Search algorithm")]
    pub algorithm: Option<Algorithm>,

    #[arg(long, value_enum, help = "Search direction and node representation")]
    pub direction: Option<Direction>,

    #[arg(
        long,
        value_enum,
        value_delimiter = ',',
        help = "Heuristic(s); mhastar takes a comma separated list"
    )]
    pub heuristic: Vec<HeuristicKind>,

    #[arg(long, value_enum, help = "Open list implementation")]
    pub heap: Option<HeapKind>,

    #[arg(long, help = "Wall-clock limit of the search in seconds")]
    pub time_limit_secs: Option<f64>,

    #[arg(long, help = "Maximum number of tracked search nodes")]
    pub memory_limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    #[value(name = "astar")]
    AStar,
    #[value(name = "idastar")]
    IdaStar,
    #[value(name = "mhastar")]
    MhaStar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Progression over complete states.
    #[default]
    Forward,
    /// Regression over conditions.
    Backward,
    /// Regression over relative states.
    Relative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum HeuristicKind {
    #[default]
    Blind,
    GoalCount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub problem_path: String,
    pub output_path: Option<String>,
    pub algorithm: Algorithm,
    pub direction: Direction,
    pub heuristics: Vec<HeuristicKind>,
    pub heap: HeapKind,
    pub time_limit_secs: Option<f64>,
    pub memory_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            problem_path: "problems/toggle.yaml".to_string(),
            output_path: None,
            algorithm: Algorithm::default(),
            direction: Direction::default(),
            heuristics: vec![HeuristicKind::default()],
            heap: HeapKind::default(),
            time_limit_secs: None,
            memory_limit: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid config")
    }

    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(problem_path) = &cli.problem_path {
            self.problem_path = problem_path.clone();
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(direction) = cli.direction {
            self.direction = direction;
        }
        if !cli.heuristic.is_empty() {
            self.heuristics = cli.heuristic.clone();
        }
        if let Some(heap) = cli.heap {
            self.heap = heap;
        }
        if cli.time_limit_secs.is_some() {
            self.time_limit_secs = cli.time_limit_secs;
        }
        if cli.memory_limit.is_some() {
            self.memory_limit = cli.memory_limit;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.problem_path.is_empty() {
            return Err(anyhow!("No problem file given"));
        }
        if self.heuristics.is_empty() {
            return Err(anyhow!("At least one heuristic is required"));
        }
        if self.algorithm != Algorithm::MhaStar && self.heuristics.len() > 1 {
            return Err(anyhow!(
                "{:?} takes a single heuristic, got {}",
                self.algorithm,
                self.heuristics.len()
            ));
        }
        if let Some(time_limit_secs) = self.time_limit_secs {
            if !time_limit_secs.is_finite() || time_limit_secs < 0.0 {
                return Err(anyhow!(
                    "Time limit must be a non-negative number of seconds, got {time_limit_secs}"
                ));
            }
        }
        Ok(())
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            time_limit: self.time_limit_secs.map(Duration::from_secs_f64),
            memory_limit: self.memory_limit,
        }
    }
}
