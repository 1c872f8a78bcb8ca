//! Foreign-key dependency graph between declared tables

use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use crate::table_spec::TableSpec;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};

/// A directed acyclic graph of table dependencies.
///
/// An edge runs from a referenced (parent) table to the table holding the
/// foreign key, so a topological order lists parents first. Node indices
/// follow declaration order, which is also the tie-break between independent
/// tables.
#[derive(Debug)]
pub struct TableDag {
    graph: DiGraph<TableName, ()>,

    node_map: HashMap<TableName, NodeIndex>,
}

impl TableDag {
    /// Create a new empty DAG
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a table to the DAG
    pub fn add_table(&mut self, name: &TableName) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(name) {
            idx
        } else {
            let idx = self.graph.add_node(name.clone());
            self.node_map.insert(name.clone(), idx);
            idx
        }
    }

    /// Add a dependency edge (`child` references `parent`)
    pub fn add_dependency(&mut self, child: &TableName, parent: &TableName) {
        let child_idx = self.add_table(child);
        let parent_idx = self.add_table(parent);
        if !self.graph.contains_edge(parent_idx, child_idx) {
            self.graph.add_edge(parent_idx, child_idx, ());
        }
    }

    /// Build the DAG from declared tables.
    ///
    /// Self-references and references to tables outside `specs` are ignored.
    pub fn build(specs: &[TableSpec]) -> CoreResult<Self> {
        let mut dag = Self::new();

        for spec in specs {
            if dag.contains(&spec.name) {
                return Err(CoreError::DuplicateTable {
                    name: spec.name.to_string(),
                });
            }
            dag.add_table(&spec.name);
        }

        for spec in specs {
            for parent in spec.referenced_tables() {
                if dag.contains(parent) {
                    dag.add_dependency(&spec.name, parent);
                }
            }
        }

        dag.validate()?;

        Ok(dag)
    }

    /// Validate the DAG has no cycles
    pub fn validate(&self) -> CoreResult<()> {
        match toposort(&self.graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(CoreError::CircularDependency {
                cycle: self.find_cycle_path(cycle.node_id()),
            }),
        }
    }

    /// Find a cycle path starting from a node for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let mut path: Vec<String> = vec![self.graph[start].to_string()];
        let mut current = start;
        let mut visited = HashSet::new();
        visited.insert(current);

        while let Some(edge) = self.graph.edges(current).next() {
            let target = edge.target();
            path.push(self.graph[target].to_string());

            if target == start || visited.contains(&target) {
                break;
            }

            visited.insert(target);
            current = target;
        }

        path.join(" -> ")
    }

    /// Tables in topological order (parents first)
    pub fn topological_order(&self) -> CoreResult<Vec<TableName>> {
        self.validate()?;

        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|idx| self.graph.edges_directed(idx, Direction::Incoming).count())
            .collect();
        let mut ready: BTreeSet<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|idx| in_degree[idx.index()] == 0)
            .collect();

        let mut order = Vec::with_capacity(self.graph.node_count());
        while let Some(idx) = ready.pop_first() {
            order.push(self.graph[idx].clone());
            for edge in self.graph.edges_directed(idx, Direction::Outgoing) {
                let target = edge.target();
                in_degree[target.index()] -= 1;
                if in_degree[target.index()] == 0 {
                    ready.insert(target);
                }
            }
        }

        Ok(order)
    }

    /// Direct parents of a table
    pub fn dependencies(&self, table: &str) -> Vec<TableName> {
        self.neighbors(table, Direction::Incoming)
    }

    /// Direct children of a table
    pub fn dependents(&self, table: &str) -> Vec<TableName> {
        self.neighbors(table, Direction::Outgoing)
    }

    fn neighbors(&self, table: &str, direction: Direction) -> Vec<TableName> {
        let Some(idx) = self.index_of(table) else {
            return Vec::new();
        };
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| match direction {
                Direction::Incoming => e.source(),
                Direction::Outgoing => e.target(),
            })
            .collect();
        out.sort();
        out.into_iter().map(|i| self.graph[i].clone()).collect()
    }

    /// All transitive parents of a table
    pub fn ancestors(&self, table: &str) -> Vec<TableName> {
        self.reachable(table, Direction::Incoming)
    }

    /// All transitive children of a table
    pub fn descendants(&self, table: &str) -> Vec<TableName> {
        self.reachable(table, Direction::Outgoing)
    }

    fn reachable(&self, table: &str, direction: Direction) -> Vec<TableName> {
        let Some(start) = self.index_of(table) else {
            return Vec::new();
        };
        let mut visited = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            for edge in self.graph.edges_directed(idx, direction) {
                let neighbor = match direction {
                    Direction::Incoming => edge.source(),
                    Direction::Outgoing => edge.target(),
                };
                if visited.insert(neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        visited.into_iter().map(|i| self.graph[i].clone()).collect()
    }

    /// Tables matching a selector, in topological order.
    ///
    /// Supports `+table` (table and its parents) and `table+` (table and its
    /// children).
    pub fn select(&self, selector: &str) -> CoreResult<Vec<TableName>> {
        let prefix = selector.starts_with('+');
        let suffix = selector.ends_with('+');
        let name = selector.trim_start_matches('+').trim_end_matches('+');

        if !self.contains(name) {
            return Err(CoreError::UnknownTable {
                name: name.to_string(),
            });
        }

        let mut selected: HashSet<TableName> = HashSet::new();
        selected.extend(TableName::try_new(name));
        if prefix {
            selected.extend(self.ancestors(name));
        }
        if suffix {
            selected.extend(self.descendants(name));
        }

        Ok(self
            .topological_order()?
            .into_iter()
            .filter(|t| selected.contains(t))
            .collect())
    }

    /// Whether a table is in the DAG
    pub fn contains(&self, table: &str) -> bool {
        self.index_of(table).is_some()
    }

    fn index_of(&self, table: &str) -> Option<NodeIndex> {
        let key = TableName::try_new(table)?;
        self.node_map.get(&key).copied()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether the DAG has no tables
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

impl Default for TableDag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "dag_test.rs"]
mod tests;
