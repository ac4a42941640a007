//! On-demand cycle detection for the frozen graph.
//!
//! The construction pass assumes the reference graph is acyclic and does not
//! pay for a check on every build. Hosts that want fail-fast behavior call
//! [`DependencyGraph::verify_acyclic`] once after construction; on failure it
//! reports a concrete cycle path for diagnostics.

use std::collections::{BTreeSet, HashMap, HashSet};

use lineage_model::CellId;

use super::dependency_graph::{DependencyGraph, GraphNode, RangeId};
use crate::error::{CyclePath, GraphError};

/// Internal node id used during elimination. Ranges stay as compact ids and
/// are only widened to [`GraphNode`] when a path is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum Node {
    Cell(CellId),
    Range(RangeId),
}

impl DependencyGraph {
    /// True when the reference graph contains a cycle.
    #[must_use]
    pub fn contains_loop(&self) -> bool {
        self.verify_acyclic().is_err()
    }

    /// Check the documented acyclicity precondition.
    ///
    /// Runs a Kahn-style elimination over formula-cell and range nodes; if
    /// any node survives, a cycle exists and an iterative coloring DFS over
    /// the survivors recovers one concrete path, returned as
    /// [`GraphError::CyclicDependency`].
    ///
    /// Edges point from precedent to dependent: data flows cell -> containing
    /// range, cell -> directly-reading formula, range -> reading formula.
    pub fn verify_acyclic(&self) -> Result<(), GraphError> {
        // In-degree of each formula cell: its direct precedent cells that are
        // themselves formulas, plus its precedent ranges. Non-formula
        // precedents hold raw data and can never be part of a cycle.
        let mut cell_in: HashMap<CellId, usize> = HashMap::with_capacity(self.formulas.len());
        for &formula in self.formulas.keys() {
            let formula_precedents = self
                .formula_cells
                .forward(&formula)
                .filter(|cell| self.formulas.contains_key(cell))
                .count();
            let deg = formula_precedents + self.formula_ranges.forward_len(&formula);
            cell_in.insert(formula, deg);
        }

        // In-degree of each range: the formula cells among its components.
        let mut range_in: HashMap<RangeId, usize> = HashMap::with_capacity(self.ranges.len());
        for index in 0..self.ranges.len() {
            let id = RangeId(index as u32);
            let deg = self
                .range_components
                .forward(&id)
                .filter(|cell| self.formulas.contains_key(cell))
                .count();
            range_in.insert(id, deg);
        }

        let total_nodes = cell_in.len() + range_in.len();

        let mut ready: BTreeSet<Node> = BTreeSet::new();
        ready.extend(
            cell_in
                .iter()
                .filter(|(_, &deg)| deg == 0)
                .map(|(&cell, _)| Node::Cell(cell)),
        );
        ready.extend(
            range_in
                .iter()
                .filter(|(_, &deg)| deg == 0)
                .map(|(&id, _)| Node::Range(id)),
        );

        let mut processed = 0usize;
        while let Some(node) = ready.pop_first() {
            processed += 1;
            match node {
                Node::Cell(cell) => {
                    for dependent in self.formula_cells.inverse(&cell) {
                        if let Some(deg) = cell_in.get_mut(&dependent) {
                            *deg = deg.saturating_sub(1);
                            if *deg == 0 {
                                ready.insert(Node::Cell(dependent));
                            }
                        }
                    }
                    for range in self.range_components.inverse(&cell) {
                        if let Some(deg) = range_in.get_mut(&range) {
                            *deg = deg.saturating_sub(1);
                            if *deg == 0 {
                                ready.insert(Node::Range(range));
                            }
                        }
                    }
                }
                Node::Range(range) => {
                    for dependent in self.formula_ranges.inverse(&range) {
                        if let Some(deg) = cell_in.get_mut(&dependent) {
                            *deg = deg.saturating_sub(1);
                            if *deg == 0 {
                                ready.insert(Node::Cell(dependent));
                            }
                        }
                    }
                }
            }
        }

        if processed == total_nodes {
            return Ok(());
        }

        let remaining_cells: HashSet<CellId> = cell_in
            .into_iter()
            .filter_map(|(cell, deg)| (deg > 0).then_some(cell))
            .collect();
        let remaining_ranges: HashSet<RangeId> = range_in
            .into_iter()
            .filter_map(|(id, deg)| (deg > 0).then_some(id))
            .collect();

        let path = self
            .find_cycle(&remaining_cells, &remaining_ranges)
            .unwrap_or_default()
            .into_iter()
            .map(|node| match node {
                Node::Cell(cell) => GraphNode::Cell(cell),
                Node::Range(id) => GraphNode::Range(self.range(id)),
            })
            .collect();
        Err(GraphError::CyclicDependency {
            path: CyclePath(path),
        })
    }

    /// Recover one cycle among the nodes Kahn elimination could not clear.
    /// Iterative white/gray/black DFS with an explicit frame stack; hitting a
    /// gray node closes the cycle.
    fn find_cycle(
        &self,
        remaining_cells: &HashSet<CellId>,
        remaining_ranges: &HashSet<RangeId>,
    ) -> Option<Vec<Node>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        struct Frame {
            node: Node,
            neighbors: Vec<Node>,
            idx: usize,
        }

        let mut color: HashMap<Node, Color> = HashMap::new();
        for &cell in remaining_cells {
            color.insert(Node::Cell(cell), Color::White);
        }
        for &range in remaining_ranges {
            color.insert(Node::Range(range), Color::White);
        }

        let mut starts: Vec<Node> = color.keys().copied().collect();
        starts.sort_unstable();

        let mut stack: Vec<Node> = Vec::new();
        let mut pos_in_stack: HashMap<Node, usize> = HashMap::new();

        for start in starts {
            if color.get(&start) != Some(&Color::White) {
                continue;
            }

            let mut frames = vec![Frame {
                node: start,
                neighbors: self.remaining_neighbors(start, remaining_cells, remaining_ranges),
                idx: 0,
            }];
            stack.push(start);
            pos_in_stack.insert(start, stack.len() - 1);
            color.insert(start, Color::Gray);

            while let Some(frame) = frames.last_mut() {
                if frame.idx >= frame.neighbors.len() {
                    color.insert(frame.node, Color::Black);
                    pos_in_stack.remove(&frame.node);
                    stack.pop();
                    frames.pop();
                    continue;
                }

                let next = frame.neighbors[frame.idx];
                frame.idx += 1;

                match color.get(&next).copied().unwrap_or(Color::Black) {
                    Color::White => {
                        color.insert(next, Color::Gray);
                        stack.push(next);
                        pos_in_stack.insert(next, stack.len() - 1);
                        let neighbors =
                            self.remaining_neighbors(next, remaining_cells, remaining_ranges);
                        frames.push(Frame {
                            node: next,
                            neighbors,
                            idx: 0,
                        });
                    }
                    Color::Gray => {
                        let start_idx = pos_in_stack.get(&next).copied().unwrap_or(0);
                        let mut cycle: Vec<Node> = stack[start_idx..].to_vec();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Color::Black => {}
                }
            }
        }

        None
    }

    fn remaining_neighbors(
        &self,
        node: Node,
        remaining_cells: &HashSet<CellId>,
        remaining_ranges: &HashSet<RangeId>,
    ) -> Vec<Node> {
        let mut out = Vec::new();
        match node {
            Node::Cell(cell) => {
                for dependent in self.formula_cells.inverse(&cell) {
                    if remaining_cells.contains(&dependent) {
                        out.push(Node::Cell(dependent));
                    }
                }
                for range in self.range_components.inverse(&cell) {
                    if remaining_ranges.contains(&range) {
                        out.push(Node::Range(range));
                    }
                }
            }
            Node::Range(range) => {
                for dependent in self.formula_ranges.inverse(&range) {
                    if remaining_cells.contains(&dependent) {
                        out.push(Node::Cell(dependent));
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}
