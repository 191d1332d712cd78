mod axioms;
mod conditions;
mod decision_tree;
mod effects;
mod heuristic;
mod operator;
mod problem;
mod space;
mod state;

pub use axioms::{AxiomRule, AxiomRules};
pub use conditions::{Conditions, ConditionsClause, EffectRelevance, SimpleConditions};
pub use decision_tree::OperatorDecisionTree;
pub use effects::Effect;
pub use heuristic::GoalCountHeuristic;
pub use operator::Operator;
pub use problem::SasProblem;
pub use space::{ConditionsSpace, RelativeStateSpace, StateSpace};
pub use state::{Assignment, MutexGroup, OperatorId, RelativeState, State, ValueId, VarId, Variable};
