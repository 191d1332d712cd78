use std::fmt;

use serde::{Deserialize, Serialize};

use super::conditions::SimpleConditions;

pub type VarId = usize;
pub type ValueId = usize;
pub type OperatorId = usize;

/// A single `variable = value` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    pub variable: VarId,
    pub value: ValueId,
}

impl Assignment {
    pub fn new(variable: VarId, value: ValueId) -> Self {
        Assignment { variable, value }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}={}", self.variable, self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub domain_range: usize,
    /// Set for derived variables, which are recomputed by the axiom rules.
    pub axiom_layer: Option<u32>,
    pub value_names: Vec<String>,
}

impl Variable {
    pub fn new(name: &str, domain_range: usize) -> Self {
        Variable {
            name: name.to_string(),
            domain_range,
            axiom_layer: None,
            value_names: Vec::new(),
        }
    }

    pub fn is_axiomatic(&self) -> bool {
        self.axiom_layer.is_some()
    }
}

/// Assignments of which at most one can hold in any reachable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutexGroup {
    assignments: Vec<Assignment>,
}

impl MutexGroup {
    pub fn new(assignments: Vec<Assignment>) -> Self {
        MutexGroup { assignments }
    }

    pub fn contains(&self, assignment: &Assignment) -> bool {
        self.assignments.contains(assignment)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> + '_ {
        self.assignments.iter()
    }
}

/// Complete assignment of a value to every variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct State {
    values: Vec<ValueId>,
}

impl State {
    pub fn new(values: Vec<ValueId>) -> Self {
        State { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, variable: VarId) -> ValueId {
        self.values[variable]
    }

    pub fn values(&self) -> &[ValueId] {
        &self.values
    }

    pub fn set(&mut self, assignment: Assignment) {
        self.values[assignment.variable] = assignment.value;
    }

    pub fn satisfies(&self, assignment: &Assignment) -> bool {
        self.values[assignment.variable] == assignment.value
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.values)
    }
}

/// Partial state used by backward search; `None` entries are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativeState {
    values: Vec<Option<ValueId>>,
}

impl RelativeState {
    pub fn new(values: Vec<Option<ValueId>>) -> Self {
        RelativeState { values }
    }

    pub fn from_conditions(variable_count: usize, conditions: &SimpleConditions) -> Self {
        let mut values = vec![None; variable_count];
        for assignment in conditions.iter() {
            values[assignment.variable] = Some(assignment.value);
        }
        RelativeState { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value(&self, variable: VarId) -> Option<ValueId> {
        self.values[variable]
    }

    pub fn set(&mut self, variable: VarId, value: Option<ValueId>) {
        self.values[variable] = value;
    }

    /// Iterates the non-wildcard entries.
    pub fn constrained(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(variable, value)| value.map(|value| Assignment::new(variable, value)))
    }

    pub fn matches(&self, state: &State) -> bool {
        self.constrained().all(|assignment| state.satisfies(&assignment))
    }

    /// Imposes `assignment` unless it contradicts a fixed value. A wildcard always accepts.
    pub fn restrict(&mut self, assignment: &Assignment) -> bool {
        match self.values[assignment.variable] {
            None => {
                self.values[assignment.variable] = Some(assignment.value);
                true
            }
            Some(value) => value == assignment.value,
        }
    }

    pub fn is_compatible_with_mutex_constraints(&self, group: &MutexGroup) -> bool {
        group
            .iter()
            .filter(|assignment| self.values[assignment.variable] == Some(assignment.value))
            .count()
            < 2
    }
}

impl fmt::Display for RelativeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, value) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            match value {
                Some(value) => write!(f, "{value}")?,
                None => write!(f, "*")?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_state_matches_ignores_wildcards() {
        let relative = RelativeState::new(vec![Some(1), None, Some(0)]);
        assert!(relative.matches(&State::new(vec![1, 0, 0])));
        assert!(relative.matches(&State::new(vec![1, 5, 0])));
        assert!(!relative.matches(&State::new(vec![0, 0, 0])));
    }

    #[test]
    fn test_relative_state_restrict() {
        let mut relative = RelativeState::new(vec![Some(1), None]);
        assert!(relative.restrict(&Assignment::new(1, 3)));
        assert_eq!(relative.value(1), Some(3));
        assert!(relative.restrict(&Assignment::new(0, 1)));
        assert!(!relative.restrict(&Assignment::new(0, 2)));
        assert_eq!(relative.to_string(), "[1, 3]");
    }

    #[test]
    fn test_relative_state_mutex() {
        let group = MutexGroup::new(vec![Assignment::new(0, 1), Assignment::new(1, 1)]);
        assert!(RelativeState::new(vec![Some(1), None]).is_compatible_with_mutex_constraints(&group));
        assert!(
            !RelativeState::new(vec![Some(1), Some(1)]).is_compatible_with_mutex_constraints(&group)
        );
    }
}
