use std::hash::Hash;

use rustc_hash::FxHashMap as HashMap;

use super::problem::SearchDirection;
use super::SolutionPlan;

/// Index of a node in the node table of the running search.
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub(crate) struct NodeInfo<O> {
    pub(crate) g_value: f64,
    pub(crate) is_closed: bool,
    pub(crate) predecessor: Option<(NodeId, Option<O>)>,
}

/// Bookkeeping of one search run. Nodes are interned and referred to by
/// [`NodeId`] everywhere else, open lists included.
#[derive(Debug)]
pub(crate) struct NodeTable<N, O> {
    ids: HashMap<N, NodeId>,
    nodes: Vec<N>,
    infos: Vec<NodeInfo<O>>,
    closed: usize,
}

impl<N, O> NodeTable<N, O>
where
    N: Clone + Eq + Hash,
    O: Clone,
{
    pub(crate) fn new() -> Self {
        NodeTable {
            ids: HashMap::default(),
            nodes: Vec::new(),
            infos: Vec::new(),
            closed: 0,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.ids.clear();
        self.nodes.clear();
        self.infos.clear();
        self.closed = 0;
    }

    /// Number of tracked nodes, the measure for the memory limit.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn closed_count(&self) -> usize {
        self.closed
    }

    pub(crate) fn node(&self, id: NodeId) -> &N {
        &self.nodes[id]
    }

    pub(crate) fn info(&self, id: NodeId) -> &NodeInfo<O> {
        &self.infos[id]
    }

    pub(crate) fn insert_initial(&mut self, node: N) -> NodeId {
        let id = self.nodes.len();
        self.ids.insert(node.clone(), id);
        self.nodes.push(node);
        self.infos.push(NodeInfo {
            g_value: 0.0,
            is_closed: false,
            predecessor: None,
        });
        id
    }

    /// Marks the node closed; `false` if it already was.
    pub(crate) fn close(&mut self, id: NodeId) -> bool {
        let info = &mut self.infos[id];
        if info.is_closed {
            return false;
        }
        info.is_closed = true;
        self.closed += 1;
        true
    }

    /// Records `node` as reached with cost `g_value`. Returns its id if it is
    /// new or strictly improved, reopening it when it was closed.
    pub(crate) fn relax(
        &mut self,
        node: N,
        g_value: f64,
        predecessor: NodeId,
        operator: Option<O>,
    ) -> Option<NodeId> {
        if let Some(&id) = self.ids.get(&node) {
            let info = &mut self.infos[id];
            if g_value >= info.g_value {
                return None;
            }
            if info.is_closed {
                info.is_closed = false;
                self.closed -= 1;
            }
            info.g_value = g_value;
            info.predecessor = Some((predecessor, operator));
            return Some(id);
        }

        let id = self.nodes.len();
        self.ids.insert(node.clone(), id);
        self.nodes.push(node);
        self.infos.push(NodeInfo {
            g_value,
            is_closed: false,
            predecessor: Some((predecessor, operator)),
        });
        Some(id)
    }

    /// Walks the predecessor links back from `goal`.
    ///
    /// The plan is a list of operators unless some link carries none, in which
    /// case it is the list of nodes. Either way it is in execution order: a
    /// forward search is reversed, a backward search already ends at the goal.
    pub(crate) fn reconstruct_plan(
        &self,
        goal: NodeId,
        direction: SearchDirection,
    ) -> SolutionPlan<N, O> {
        let mut operators = Vec::new();
        let mut nodes = vec![self.nodes[goal].clone()];
        let mut labelled = true;

        let mut current = goal;
        while let Some((predecessor, operator)) = &self.infos[current].predecessor {
            match operator {
                Some(operator) => operators.push(operator.clone()),
                None => labelled = false,
            }
            nodes.push(self.nodes[*predecessor].clone());
            current = *predecessor;
        }

        if direction == SearchDirection::Forward {
            operators.reverse();
            nodes.reverse();
        }

        if labelled {
            SolutionPlan::Operators(operators)
        } else {
            SolutionPlan::Nodes(nodes)
        }
    }
}
