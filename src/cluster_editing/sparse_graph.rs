
use rustc_hash::{FxHashMap, FxHashSet};

/// Node identifier in `[0, node_count)`
pub type NodeId = usize;
/// Dense edge handle; 0 is reserved for the unstored "zero edge" of weight 0
pub type RankId = usize;
/// Finite weight, or the `PERMANENT` / `FORBIDDEN` sentinels
pub type EdgeWeight = f64;

/// Absorbing state for edges that must end up inside a cluster
pub const PERMANENT: EdgeWeight = f64::INFINITY;
/// Absorbing state for edges that must end up between clusters
pub const FORBIDDEN: EdgeWeight = f64::NEG_INFINITY;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GraphError {
    #[error("edge weight must not be NaN")]
    InvalidWeight,
    #[error("node {node} is out of range for {node_count} nodes")]
    UnknownNode { node: NodeId, node_count: usize },
    #[error("self loop on node {node} is not a valid edge")]
    SelfLoop { node: NodeId }
}

/// An unordered node pair in canonical form, `u < v`
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId
}

impl Edge {
    /// Creates the canonical edge for two distinct nodes
    pub fn new(a: NodeId, b: NodeId) -> Edge {
        if a < b {
            Edge { u: a, v: b }
        } else {
            Edge { u: b, v: a }
        }
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.u, self.v)
    }
}

/// Growable weighted-graph builder. Zero weights are never stored, so setting a
/// weight to exactly 0 removes the edge; this keeps the "zero edge" convention of
/// the solver intact from the start.
#[derive(Clone, Debug, Default)]
pub struct DynamicSparseGraph {
    node_count: usize,
    weights: FxHashMap<Edge, EdgeWeight>
}

impl DynamicSparseGraph {
    /// Creates a graph over the given number of isolated nodes
    pub fn new(node_count: usize) -> DynamicSparseGraph {
        DynamicSparseGraph {
            node_count,
            weights: FxHashMap::default()
        }
    }

    /// Builds a graph from a weighted edge list.
    /// # Errors
    /// * if any edge is invalid (NaN weight, out-of-range node, self loop)
    pub fn from_edge_list(node_count: usize, edges: &[(NodeId, NodeId, EdgeWeight)]) -> Result<DynamicSparseGraph, GraphError> {
        let mut graph = DynamicSparseGraph::new(node_count);
        for &(u, v, weight) in edges.iter() {
            graph.set_weight(u, v, weight)?;
        }
        Ok(graph)
    }

    /// Sets the weight of an edge; weight 0 removes it.
    /// # Errors
    /// * if the weight is NaN, a node is out of range, or the nodes coincide
    pub fn set_weight(&mut self, u: NodeId, v: NodeId, weight: EdgeWeight) -> Result<(), GraphError> {
        if weight.is_nan() {
            return Err(GraphError::InvalidWeight);
        }
        for node in [u, v] {
            if node >= self.node_count {
                return Err(GraphError::UnknownNode { node, node_count: self.node_count });
            }
        }
        if u == v {
            return Err(GraphError::SelfLoop { node: u });
        }

        let edge = Edge::new(u, v);
        if weight == 0.0 {
            self.weights.remove(&edge);
        } else {
            self.weights.insert(edge, weight);
        }
        Ok(())
    }

    /// Returns the weight of an edge, 0 for unstored edges
    pub fn get_weight(&self, u: NodeId, v: NodeId) -> EdgeWeight {
        self.weights.get(&Edge::new(u, v)).copied().unwrap_or(0.0)
    }

    // getters
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (Edge, EdgeWeight)> + '_ {
        self.weights.iter().map(|(&edge, &weight)| (edge, weight))
    }
}

/// The solver's view of the graph: rank-indexed weights, sorted per-node adjacency
/// for O(log degree) lookup, clique bookkeeping for permanent components, and
/// forbidden-neighbor sets.
///
/// Invariants maintained together with the induced-cost heuristic: permanent edges
/// form disjoint cliques; forbidden-ness is symmetric between cliques; once an edge
/// is permanent or forbidden it never reverts.
#[derive(Clone, Debug)]
pub struct StaticSparseGraph {
    node_count: usize,
    /// Rank-indexed endpoints; slot 0 is the zero-edge sentinel
    edges: Vec<Edge>,
    /// Rank-indexed weights; slot 0 stays 0.0
    weights: Vec<EdgeWeight>,
    /// Per canonical lower node: (neighbor, rank), sorted by neighbor
    rank_index: Vec<Vec<(NodeId, RankId)>>,
    /// Per node: neighbors through finite-weight, uncommitted edges
    unpruned: Vec<Vec<NodeId>>,
    /// Per node: neighbors through forbidden pairs, including unstored zero edges
    forbidden: Vec<FxHashSet<NodeId>>,
    /// Per node: the id of its permanent clique
    clique_id: Vec<usize>,
    /// Per clique id: current members; merged cliques leave empty husks behind
    cliques: Vec<Vec<NodeId>>
}

impl StaticSparseGraph {
    /// Compiles a dynamic graph into the solver representation. Permanent seed
    /// edges immediately merge their endpoint cliques; forbidden seeds populate
    /// the forbidden-neighbor sets.
    pub fn compile(dynamic: &DynamicSparseGraph) -> StaticSparseGraph {
        let node_count = dynamic.node_count();
        let mut edge_list: Vec<(Edge, EdgeWeight)> = dynamic.edges().collect();
        edge_list.sort_by_key(|(edge, _)| *edge);

        let mut graph = StaticSparseGraph {
            node_count,
            edges: vec![Edge { u: 0, v: 0 }],
            weights: vec![0.0],
            rank_index: vec![vec![]; node_count],
            unpruned: vec![vec![]; node_count],
            forbidden: vec![FxHashSet::default(); node_count],
            clique_id: (0..node_count).collect(),
            cliques: (0..node_count).map(|node| vec![node]).collect()
        };

        for (edge, weight) in edge_list.into_iter() {
            let rank = graph.edges.len();
            graph.edges.push(edge);
            graph.weights.push(weight);
            graph.rank_index[edge.u].push((edge.v, rank));

            if weight == PERMANENT {
                graph.merge_cliques(edge.u, edge.v);
            } else if weight == FORBIDDEN {
                graph.forbidden[edge.u].insert(edge.v);
                graph.forbidden[edge.v].insert(edge.u);
            } else {
                graph.unpruned[edge.u].push(edge.v);
                graph.unpruned[edge.v].push(edge.u);
            }
        }

        for neighbors in graph.unpruned.iter_mut() {
            neighbors.sort_unstable();
        }
        graph
    }

    /// Returns the rank of an edge, 0 if it is an unstored zero edge
    pub fn find_index(&self, edge: Edge) -> RankId {
        match self.rank_index[edge.u].binary_search_by_key(&edge.v, |&(neighbor, _)| neighbor) {
            Ok(slot) => self.rank_index[edge.u][slot].1,
            Err(_) => 0
        }
    }

    /// Returns the weight of an edge, 0 for unstored edges
    pub fn get_weight(&self, edge: Edge) -> EdgeWeight {
        self.weights[self.find_index(edge)]
    }

    /// Returns the weight behind a rank handle
    pub fn weight_of(&self, rank: RankId) -> EdgeWeight {
        self.weights[rank]
    }

    /// Returns the endpoints behind a rank handle
    pub fn edge_of(&self, rank: RankId) -> Edge {
        self.edges[rank]
    }

    /// Overwrites the weight behind a rank handle; used by edge bundling
    pub(crate) fn set_weight_rank(&mut self, rank: RankId, weight: EdgeWeight) {
        self.weights[rank] = weight;
    }

    /// Makes an edge permanent: merges the endpoint cliques and, for stored edges,
    /// installs the sentinel weight and prunes the adjacency
    pub fn set_permanent(&mut self, edge: Edge) {
        let rank = self.find_index(edge);
        if rank > 0 {
            self.weights[rank] = PERMANENT;
            self.prune_adjacency(edge);
        }
        self.merge_cliques(edge.u, edge.v);
    }

    /// Makes an edge forbidden. Zero edges are recorded in the forbidden-neighbor
    /// sets even though they have no stored weight, so later clique merges can
    /// propagate the forbidden-ness.
    pub fn set_forbidden(&mut self, edge: Edge) {
        let rank = self.find_index(edge);
        if rank > 0 {
            self.weights[rank] = FORBIDDEN;
            self.prune_adjacency(edge);
        }
        self.forbidden[edge.u].insert(edge.v);
        self.forbidden[edge.v].insert(edge.u);
    }

    /// Removes a bundled-away edge from the unpruned adjacency and zeroes it
    pub(crate) fn prune_bundled(&mut self, rank: RankId) {
        let edge = self.edges[rank];
        self.weights[rank] = 0.0;
        self.prune_adjacency(edge);
    }

    fn prune_adjacency(&mut self, edge: Edge) {
        self.unpruned[edge.u].retain(|&neighbor| neighbor != edge.v);
        self.unpruned[edge.v].retain(|&neighbor| neighbor != edge.u);
    }

    fn merge_cliques(&mut self, u: NodeId, v: NodeId) {
        let (id_u, id_v) = (self.clique_id[u], self.clique_id[v]);
        if id_u == id_v {
            return;
        }
        // relabel the smaller clique into the larger one
        let (keep, absorb) = if self.cliques[id_u].len() >= self.cliques[id_v].len() {
            (id_u, id_v)
        } else {
            (id_v, id_u)
        };
        let members = std::mem::take(&mut self.cliques[absorb]);
        for &member in members.iter() {
            self.clique_id[member] = keep;
        }
        self.cliques[keep].extend(members);
    }

    /// Returns true if the pair is forbidden
    pub fn is_forbidden(&self, edge: Edge) -> bool {
        self.forbidden[edge.u].contains(&edge.v)
    }

    /// Returns true if the pair is permanent
    pub fn is_permanent(&self, edge: Edge) -> bool {
        self.clique_id[edge.u] == self.clique_id[edge.v]
    }

    /// Returns all members of the node's permanent clique, including the node
    pub fn clique_of(&self, node: NodeId) -> &[NodeId] {
        &self.cliques[self.clique_id[node]]
    }

    /// Returns the clique id of a node
    pub fn clique_id_of(&self, node: NodeId) -> usize {
        self.clique_id[node]
    }

    /// Returns the neighbors reachable through finite-weight, uncommitted edges
    pub fn unpruned_neighbours(&self, node: NodeId) -> &[NodeId] {
        &self.unpruned[node]
    }

    /// Returns the neighbors this node is forbidden against, in sorted order
    pub fn forbidden_neighbours(&self, node: NodeId) -> Vec<NodeId> {
        let mut neighbors: Vec<NodeId> = self.forbidden[node].iter().copied().collect();
        neighbors.sort_unstable();
        neighbors
    }

    /// Returns the number of stored edges
    pub fn edge_count(&self) -> usize {
        self.edges.len() - 1
    }

    // getters
    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> StaticSparseGraph {
        let dynamic = DynamicSparseGraph::from_edge_list(5, &[
            (0, 1, 1.0),
            (0, 2, -2.0),
            (1, 2, 3.0),
            (3, 4, PERMANENT),
            (2, 3, FORBIDDEN)
        ]).unwrap();
        StaticSparseGraph::compile(&dynamic)
    }

    #[test]
    fn test_builder_validation() {
        let mut dynamic = DynamicSparseGraph::new(3);
        assert_eq!(dynamic.set_weight(0, 1, f64::NAN), Err(GraphError::InvalidWeight));
        assert_eq!(dynamic.set_weight(0, 3, 1.0), Err(GraphError::UnknownNode { node: 3, node_count: 3 }));
        assert_eq!(dynamic.set_weight(1, 1, 1.0), Err(GraphError::SelfLoop { node: 1 }));

        dynamic.set_weight(2, 0, 4.0).unwrap();
        assert_eq!(dynamic.get_weight(0, 2), 4.0);
        assert_eq!(dynamic.edge_count(), 1);

        // zero weight removes the edge
        dynamic.set_weight(0, 2, 0.0).unwrap();
        assert_eq!(dynamic.edge_count(), 0);
        assert_eq!(dynamic.get_weight(0, 2), 0.0);
    }

    #[test]
    fn test_find_index_and_weights() {
        let graph = small_graph();
        assert_eq!(graph.edge_count(), 5);

        // stored edges have distinct non-zero ranks
        let rank01 = graph.find_index(Edge::new(0, 1));
        let rank02 = graph.find_index(Edge::new(2, 0));
        assert!(rank01 > 0 && rank02 > 0 && rank01 != rank02);
        assert_eq!(graph.weight_of(rank01), 1.0);
        assert_eq!(graph.get_weight(Edge::new(0, 2)), -2.0);

        // zero edges report rank 0 and weight 0
        assert_eq!(graph.find_index(Edge::new(0, 4)), 0);
        assert_eq!(graph.get_weight(Edge::new(0, 4)), 0.0);
        assert_eq!(graph.weight_of(0), 0.0);
    }

    #[test]
    fn test_seed_cliques_and_forbidden() {
        let graph = small_graph();

        // the permanent seed merged 3 and 4
        assert_eq!(graph.clique_id_of(3), graph.clique_id_of(4));
        let mut clique = graph.clique_of(3).to_vec();
        clique.sort_unstable();
        assert_eq!(clique, vec![3, 4]);
        assert!(graph.is_permanent(Edge::new(3, 4)));

        // the forbidden seed is symmetric and excluded from the unpruned adjacency
        assert!(graph.is_forbidden(Edge::new(2, 3)));
        assert!(graph.is_forbidden(Edge::new(3, 2)));
        assert_eq!(graph.forbidden_neighbours(3), vec![2]);
        assert!(!graph.unpruned_neighbours(3).contains(&2));

        // finite edges form the unpruned adjacency
        assert_eq!(graph.unpruned_neighbours(0), &[1, 2]);
        assert_eq!(graph.unpruned_neighbours(2), &[0, 1]);
    }

    #[test]
    fn test_commit_operations() {
        let mut graph = small_graph();

        graph.set_permanent(Edge::new(0, 1));
        assert_eq!(graph.get_weight(Edge::new(0, 1)), PERMANENT);
        assert!(graph.is_permanent(Edge::new(0, 1)));
        assert!(!graph.unpruned_neighbours(0).contains(&1));

        graph.set_forbidden(Edge::new(1, 2));
        assert_eq!(graph.get_weight(Edge::new(1, 2)), FORBIDDEN);
        assert!(graph.is_forbidden(Edge::new(1, 2)));
        assert!(!graph.unpruned_neighbours(2).contains(&1));

        // forbidding a zero edge records the adjacency without storing a weight
        graph.set_forbidden(Edge::new(0, 4));
        assert!(graph.is_forbidden(Edge::new(0, 4)));
        assert_eq!(graph.find_index(Edge::new(0, 4)), 0);
    }

    #[test]
    fn test_clique_merging() {
        let dynamic = DynamicSparseGraph::new(6);
        let mut graph = StaticSparseGraph::compile(&dynamic);

        graph.set_permanent(Edge::new(0, 1));
        graph.set_permanent(Edge::new(2, 3));
        graph.set_permanent(Edge::new(1, 2));

        let mut clique = graph.clique_of(0).to_vec();
        clique.sort_unstable();
        assert_eq!(clique, vec![0, 1, 2, 3]);
        assert_eq!(graph.clique_of(4), &[4]);
    }
}
