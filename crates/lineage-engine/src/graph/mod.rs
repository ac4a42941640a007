mod cycles;
mod dependency_graph;
mod terminals;

pub use dependency_graph::{DependencyGraph, GraphBuilder, GraphNode, GraphStats, RangeId};
