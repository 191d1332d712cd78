use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::state::{Assignment, MutexGroup, State, ValueId, VarId};

/// How an effect assignment relates to a set of constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectRelevance {
    /// The assignment produces a value the constraints ask for.
    Relevant,
    /// The variable is not constrained.
    Irrelevant,
    /// The assignment overwrites a constrained variable with a different value.
    AntiRelevant,
}

/// Conjunction of assignments, at most one per variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SimpleConditions {
    assignments: BTreeMap<VarId, ValueId>,
}

impl SimpleConditions {
    pub fn new() -> Self {
        SimpleConditions::default()
    }

    /// Returns `None` if two of the assignments contradict each other.
    pub fn from_assignments<I>(assignments: I) -> Option<Self>
    where
        I: IntoIterator<Item = Assignment>,
    {
        let mut conditions = SimpleConditions::new();
        for assignment in assignments {
            if !conditions.insert(assignment) {
                return None;
            }
        }
        Some(conditions)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn value(&self, variable: VarId) -> Option<ValueId> {
        self.assignments.get(&variable).copied()
    }

    pub fn contains(&self, assignment: &Assignment) -> bool {
        self.value(assignment.variable) == Some(assignment.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = Assignment> + '_ {
        self.assignments
            .iter()
            .map(|(&variable, &value)| Assignment::new(variable, value))
    }

    /// Adds the assignment; leaves `self` untouched and returns `false` on a conflict.
    pub fn insert(&mut self, assignment: Assignment) -> bool {
        match self.assignments.get(&assignment.variable) {
            Some(&value) => value == assignment.value,
            None => {
                self.assignments
                    .insert(assignment.variable, assignment.value);
                true
            }
        }
    }

    pub fn evaluate(&self, state: &State) -> bool {
        self.iter().all(|assignment| state.satisfies(&assignment))
    }

    pub fn is_conflicted_with_assignment(&self, assignment: &Assignment) -> bool {
        matches!(self.value(assignment.variable), Some(value) if value != assignment.value)
    }

    pub fn is_conflicted_with(&self, other: &SimpleConditions) -> bool {
        // Iterate the smaller side.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .iter()
            .any(|assignment| large.is_conflicted_with_assignment(&assignment))
    }

    /// Union of both constraint sets, `None` when they conflict.
    pub fn conjunction(&self, other: &SimpleConditions) -> Option<SimpleConditions> {
        if self.is_conflicted_with(other) {
            return None;
        }
        let mut result = self.clone();
        result.assignments.extend(other.assignments.iter());
        Some(result)
    }

    /// Drops whatever constraint exists on the assignment's variable.
    pub fn remove_constraint(&mut self, assignment: &Assignment) -> bool {
        self.assignments.remove(&assignment.variable).is_some()
    }

    pub fn effect_relevance(&self, assignment: &Assignment) -> EffectRelevance {
        match self.value(assignment.variable) {
            None => EffectRelevance::Irrelevant,
            Some(value) if value == assignment.value => EffectRelevance::Relevant,
            Some(_) => EffectRelevance::AntiRelevant,
        }
    }

    pub fn is_compatible_with_mutex_constraints(&self, group: &MutexGroup) -> bool {
        group
            .iter()
            .filter(|assignment| self.contains(assignment))
            .count()
            < 2
    }
}

impl fmt::Display for SimpleConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (index, assignment) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{assignment}")?;
        }
        write!(f, "}}")
    }
}

/// Disjunction of simple conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConditionsClause {
    disjuncts: BTreeSet<SimpleConditions>,
}

impl ConditionsClause {
    pub fn len(&self) -> usize {
        self.disjuncts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disjuncts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimpleConditions> + '_ {
        self.disjuncts.iter()
    }
}

/// Constraint algebra over assignments.
///
/// The three shapes are normalized on construction: a clause always holds at
/// least two disjuncts, none of them empty. An empty `Simple` is the tautology
/// and `Contradiction` is satisfied by nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Conditions {
    Simple(SimpleConditions),
    Clause(ConditionsClause),
    Contradiction,
}

impl Default for Conditions {
    fn default() -> Self {
        Conditions::tautology()
    }
}

impl From<SimpleConditions> for Conditions {
    fn from(conditions: SimpleConditions) -> Self {
        Conditions::Simple(conditions)
    }
}

impl Conditions {
    pub fn tautology() -> Self {
        Conditions::Simple(SimpleConditions::new())
    }

    /// Builds simple conditions, or a contradiction if two assignments clash.
    pub fn from_assignments<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = Assignment>,
    {
        SimpleConditions::from_assignments(assignments)
            .map(Conditions::Simple)
            .unwrap_or(Conditions::Contradiction)
    }

    fn from_disjuncts(disjuncts: BTreeSet<SimpleConditions>) -> Self {
        if disjuncts.iter().any(SimpleConditions::is_empty) {
            return Conditions::tautology();
        }
        match disjuncts.len() {
            0 => Conditions::Contradiction,
            1 => Conditions::Simple(disjuncts.into_iter().next().unwrap_or_default()),
            _ => Conditions::Clause(ConditionsClause { disjuncts }),
        }
    }

    pub fn is_contradiction(&self) -> bool {
        matches!(self, Conditions::Contradiction)
    }

    pub fn is_tautology(&self) -> bool {
        matches!(self, Conditions::Simple(conditions) if conditions.is_empty())
    }

    /// The disjuncts of this formula; a contradiction has none.
    pub fn disjuncts(&self) -> Vec<&SimpleConditions> {
        match self {
            Conditions::Simple(conditions) => vec![conditions],
            Conditions::Clause(clause) => clause.iter().collect(),
            Conditions::Contradiction => Vec::new(),
        }
    }

    pub fn evaluate(&self, state: &State) -> bool {
        match self {
            Conditions::Simple(conditions) => conditions.evaluate(state),
            Conditions::Clause(clause) => clause.iter().any(|disjunct| disjunct.evaluate(state)),
            Conditions::Contradiction => false,
        }
    }

    pub fn conjunction_with(&self, other: &Conditions) -> Conditions {
        match (self, other) {
            (Conditions::Contradiction, _) | (_, Conditions::Contradiction) => {
                Conditions::Contradiction
            }
            (Conditions::Simple(lhs), Conditions::Simple(rhs)) => lhs
                .conjunction(rhs)
                .map(Conditions::Simple)
                .unwrap_or(Conditions::Contradiction),
            _ => {
                // Distribute over the disjuncts, dropping every conflicted pair.
                let mut disjuncts = BTreeSet::new();
                for lhs in self.disjuncts() {
                    for rhs in other.disjuncts() {
                        if let Some(conjunction) = lhs.conjunction(rhs) {
                            disjuncts.insert(conjunction);
                        }
                    }
                }
                Conditions::from_disjuncts(disjuncts)
            }
        }
    }

    /// Disjunction of both formulas.
    ///
    /// An empty simple conditions object is a tautology and absorbs the other
    /// operand entirely.
    pub fn disjunction_with(&self, other: &Conditions) -> Conditions {
        if self.is_tautology() || other.is_tautology() {
            return Conditions::tautology();
        }
        match (self, other) {
            (Conditions::Contradiction, _) => other.clone(),
            (_, Conditions::Contradiction) => self.clone(),
            _ => {
                let disjuncts = self
                    .disjuncts()
                    .into_iter()
                    .chain(other.disjuncts())
                    .cloned()
                    .collect();
                Conditions::from_disjuncts(disjuncts)
            }
        }
    }

    /// True iff no disjunct of `self` is compatible with any disjunct of `other`.
    pub fn is_conflicted_with(&self, other: &Conditions) -> bool {
        let others = other.disjuncts();
        self.disjuncts()
            .into_iter()
            .all(|lhs| others.iter().all(|rhs| lhs.is_conflicted_with(rhs)))
    }

    pub fn is_conflicted_with_assignment(&self, assignment: &Assignment) -> bool {
        self.disjuncts()
            .into_iter()
            .all(|disjunct| disjunct.is_conflicted_with_assignment(assignment))
    }

    /// Removes the constraint on the assignment's variable in place.
    ///
    /// For a clause only the disjuncts compatible with the assignment lose the
    /// constraint. Should one of them end up empty the whole clause becomes the
    /// tautology.
    pub fn remove_constraint(&mut self, assignment: &Assignment) -> bool {
        match self {
            Conditions::Simple(conditions) => conditions.remove_constraint(assignment),
            Conditions::Contradiction => false,
            Conditions::Clause(clause) => {
                let mut removed = false;
                let mut disjuncts = BTreeSet::new();
                for mut disjunct in std::mem::take(&mut clause.disjuncts) {
                    if !disjunct.is_conflicted_with_assignment(assignment) {
                        removed |= disjunct.remove_constraint(assignment);
                    }
                    disjuncts.insert(disjunct);
                }
                *self = Conditions::from_disjuncts(disjuncts);
                removed
            }
        }
    }

    pub fn effect_relevance(&self, assignment: &Assignment) -> EffectRelevance {
        let mut anti_relevant = false;
        for disjunct in self.disjuncts() {
            match disjunct.effect_relevance(assignment) {
                EffectRelevance::Relevant => return EffectRelevance::Relevant,
                EffectRelevance::AntiRelevant => anti_relevant = true,
                EffectRelevance::Irrelevant => {}
            }
        }
        if anti_relevant {
            EffectRelevance::AntiRelevant
        } else {
            EffectRelevance::Irrelevant
        }
    }

    pub fn is_compatible_with_mutex_constraints(&self, group: &MutexGroup) -> bool {
        self.disjuncts()
            .into_iter()
            .any(|disjunct| disjunct.is_compatible_with_mutex_constraints(group))
    }

    /// Number of constrained assignments over all disjuncts.
    pub fn size(&self) -> usize {
        self.disjuncts().into_iter().map(SimpleConditions::len).sum()
    }
}

impl fmt::Display for Conditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conditions::Simple(conditions) => write!(f, "{conditions}"),
            Conditions::Clause(clause) => {
                for (index, disjunct) in clause.iter().enumerate() {
                    if index > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{disjunct}")?;
                }
                Ok(())
            }
            Conditions::Contradiction => write!(f, "<contradiction>"),
        }
    }
}
