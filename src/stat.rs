use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub cost: f64,
    pub time_us: usize,
    pub expanded_nodes: usize,
    pub generated_nodes: usize,
    pub open_nodes: usize,
    pub closed_nodes: usize,
    /// Full passes for IDA*, one for the other algorithms.
    pub iterations: usize,
}

impl Stats {
    pub(crate) fn print(&self, name: &str) {
        info!(
            "{name}: Cost {:?} Time(microseconds) {:?} Expanded nodes {:?} Generated nodes {:?} Open {:?} Closed {:?} Iterations {:?}",
            self.cost,
            self.time_us,
            self.expanded_nodes,
            self.generated_nodes,
            self.open_nodes,
            self.closed_nodes,
            self.iterations
        );
    }
}
