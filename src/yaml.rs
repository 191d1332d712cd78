use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use tracing::info;

use crate::sas::{
    Assignment, AxiomRule, Effect, MutexGroup, Operator, SasProblem, SimpleConditions, State,
    Variable,
};

/// `[variable, value]` pair as written in problem files.
pub type AssignmentYaml = [usize; 2];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableYaml {
    pub name: String,
    pub range: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axiom_layer: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectYaml {
    pub assignment: AssignmentYaml,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<AssignmentYaml>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorYaml {
    pub name: String,
    #[serde(default = "default_cost")]
    pub cost: u32,
    #[serde(default)]
    pub preconditions: Vec<AssignmentYaml>,
    pub effects: Vec<EffectYaml>,
}

fn default_cost() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxiomYaml {
    #[serde(default)]
    pub body: Vec<AssignmentYaml>,
    pub head: AssignmentYaml,
}

/// Grounded SAS+ problem as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemYaml {
    pub variables: Vec<VariableYaml>,
    #[serde(default)]
    pub mutex_groups: Vec<Vec<AssignmentYaml>>,
    pub initial_state: Vec<usize>,
    pub goal: Vec<AssignmentYaml>,
    pub operators: Vec<OperatorYaml>,
    #[serde(default)]
    pub axioms: Vec<AxiomYaml>,
}

impl ProblemYaml {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid problem description")
    }

    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
        let reader = BufReader::new(file);
        let problem: ProblemYaml = serde_yaml::from_reader(reader)
            .with_context(|| format!("invalid problem description in {path}"))?;
        info!(
            "loaded {path}: {} variables, {} operators",
            problem.variables.len(),
            problem.operators.len()
        );
        Ok(problem)
    }
}

fn assignment(pair: &AssignmentYaml) -> Assignment {
    Assignment::new(pair[0], pair[1])
}

fn conditions(pairs: &[AssignmentYaml], context: &str) -> anyhow::Result<SimpleConditions> {
    match SimpleConditions::from_assignments(pairs.iter().map(assignment)) {
        Some(conditions) => Ok(conditions),
        None => bail!("{context}: two different values for the same variable"),
    }
}

impl SasProblem {
    pub fn from_yaml(yaml: ProblemYaml) -> anyhow::Result<Self> {
        let variables = yaml
            .variables
            .into_iter()
            .map(|variable| Variable {
                name: variable.name,
                domain_range: variable.range,
                axiom_layer: variable.axiom_layer,
                value_names: variable.values,
            })
            .collect();

        let mutex_groups = yaml
            .mutex_groups
            .iter()
            .map(|group| MutexGroup::new(group.iter().map(assignment).collect()))
            .collect();

        let mut operators = Vec::with_capacity(yaml.operators.len());
        for (id, operator) in yaml.operators.iter().enumerate() {
            let preconditions = conditions(&operator.preconditions, &operator.name)?;
            let mut effects = Vec::with_capacity(operator.effects.len());
            for effect in &operator.effects {
                if effect.conditions.is_empty() {
                    effects.push(Effect::Primitive(assignment(&effect.assignment)));
                } else {
                    effects.push(Effect::Conditional {
                        conditions: conditions(&effect.conditions, &operator.name)?,
                        assignment: assignment(&effect.assignment),
                    });
                }
            }
            operators.push(Operator::new(
                id,
                &operator.name,
                preconditions,
                effects,
                operator.cost,
            ));
        }

        let goal = conditions(&yaml.goal, "goal")?;
        let mut axioms = Vec::with_capacity(yaml.axioms.len());
        for axiom in &yaml.axioms {
            axioms.push(AxiomRule {
                body: conditions(&axiom.body, "axiom body")?,
                head: assignment(&axiom.head),
            });
        }

        SasProblem::new(
            variables,
            mutex_groups,
            operators,
            State::new(yaml.initial_state),
            goal,
            axioms,
        )
    }

    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let yaml = ProblemYaml::load_from_file(path)?;
        SasProblem::from_yaml(yaml).with_context(|| format!("invalid problem in {path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOGGLE: &str = r#"
variables:
  - name: var0
    range: 2
  - name: var1
    range: 2
    values: [off, on]
initial_state: [0, 0]
goal: [[0, 1]]
operators:
  - name: op0
    preconditions: [[0, 0]]
    effects:
      - assignment: [0, 1]
  - name: op1
    cost: 3
    effects:
      - assignment: [1, 1]
        conditions: [[0, 1]]
mutex_groups:
  - [[0, 0], [1, 1]]
"#;

    #[test]
    fn test_load_problem() {
        let yaml = ProblemYaml::from_yaml_str(TOGGLE).unwrap();
        assert_eq!(yaml.operators[0].cost, 1);
        let problem = SasProblem::from_yaml(yaml).unwrap();

        assert_eq!(problem.variables().len(), 2);
        assert_eq!(problem.variables()[1].value_names, vec!["off", "on"]);
        assert_eq!(problem.operators()[1].cost, 3);
        assert!(problem.operators()[1].effects[0].is_conditional());
        assert_eq!(problem.mutex_groups().len(), 1);
        assert_eq!(problem.initial_state(), &State::new(vec![0, 0]));
        assert!(problem.validate_plan(&[&problem.operators()[0]]));
    }

    #[test]
    fn test_conflicting_preconditions_are_rejected() {
        let yaml = TOGGLE.replace("preconditions: [[0, 0]]", "preconditions: [[0, 0], [0, 1]]");
        let yaml = ProblemYaml::from_yaml_str(&yaml).unwrap();
        let error = SasProblem::from_yaml(yaml).unwrap_err();
        assert!(error.to_string().contains("op0"));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(ProblemYaml::from_yaml_str("variables: 3").is_err());
        assert!(SasProblem::load_from_file("does/not/exist.yaml").is_err());
    }
}
