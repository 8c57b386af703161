
/// Twin max-heaps over active edges keyed by the induced costs
pub mod edge_heap;
/// The greedy induced-cost cluster editing solver
pub mod induced_cost_heuristic;
/// Dynamic edge-list builder and the static solver view of the graph
pub mod sparse_graph;
