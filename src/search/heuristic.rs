use super::problem::SearchProblem;

/// Estimate of the remaining cost; `f64::INFINITY` marks a proven dead end.
pub trait Heuristic<P: SearchProblem> {
    fn value(&self, node: &P::Node) -> f64;

    /// Value of a freshly generated node. Heuristics that depend on the search
    /// history override this; everything else falls back to [`Heuristic::value`].
    fn value_after(
        &self,
        node: &P::Node,
        _predecessor: &P::Node,
        _operator: Option<&P::Operator>,
    ) -> f64 {
        self.value(node)
    }

    fn description(&self) -> String;
}

/// Zero everywhere. Turns A* into uniform cost search.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlindHeuristic;

impl<P: SearchProblem> Heuristic<P> for BlindHeuristic {
    fn value(&self, _node: &P::Node) -> f64 {
        0.0
    }

    fn description(&self) -> String {
        "blind".to_string()
    }
}
