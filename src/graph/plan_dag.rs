use crate::schedule::ScheduleError;
use crate::task::{Task, TaskId};
use log::debug;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Dependency graph over a plan; node weights are positions in the task slice.
pub struct PlanDag {
    graph: DiGraph<usize, ()>,
    ids: Vec<TaskId>,
}

impl PlanDag {
    /// Edges run dependency -> dependent. References to unknown ids are
    /// dropped; they never constrain a start date.
    pub fn build(tasks: &[Task]) -> Self {
        let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(tasks.len(), tasks.len());
        let mut id_to_index: HashMap<TaskId, NodeIndex> = HashMap::with_capacity(tasks.len());
        let mut ids = Vec::with_capacity(tasks.len());

        for (position, task) in tasks.iter().enumerate() {
            let node_ix = graph.add_node(position);
            id_to_index.entry(task.id.clone()).or_insert(node_ix);
            ids.push(task.id.clone());
        }

        for (position, task) in tasks.iter().enumerate() {
            let node_ix = NodeIndex::new(position);
            for dep_id in &task.depends_on {
                match id_to_index.get(dep_id) {
                    Some(&dep_ix) => {
                        graph.add_edge(dep_ix, node_ix, ());
                    }
                    None => debug!("task {} depends on unknown task {dep_id}", task.id),
                }
            }
        }

        Self { graph, ids }
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Task positions ordered so every dependency precedes its dependents.
    pub fn topological_order(&self) -> Result<Vec<usize>, ScheduleError> {
        if let Some(edge) = self
            .graph
            .edge_references()
            .find(|edge| edge.source() == edge.target())
        {
            return Err(self.cycle_at(edge.source()));
        }
        let order = toposort(&self.graph, None).map_err(|cycle| self.cycle_at(cycle.node_id()))?;
        Ok(order.into_iter().map(|node_ix| self.graph[node_ix]).collect())
    }

    fn cycle_at(&self, node_ix: NodeIndex) -> ScheduleError {
        ScheduleError::CycleDetected {
            task_id: self.ids[self.graph[node_ix]].clone(),
        }
    }
}
