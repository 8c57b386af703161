
use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::cluster_editing::edge_heap::EdgeHeap;
use crate::cluster_editing::sparse_graph::{
    DynamicSparseGraph, Edge, EdgeWeight, GraphError, NodeId, RankId, StaticSparseGraph
};

/// The result of a cluster editing run: the clusters (sorted node ids each) and
/// the total weight of the edits that produced them. An infeasible instance is a
/// successful result with no clusters and infinite cost.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ClusterEditingSolution {
    total_cost: EdgeWeight,
    clusters: Vec<Vec<NodeId>>
}

impl ClusterEditingSolution {
    /// Constructor
    pub fn new(total_cost: EdgeWeight, clusters: Vec<Vec<NodeId>>) -> Self {
        Self { total_cost, clusters }
    }

    /// Returns true if the permanent/forbidden seeds contradicted each other
    pub fn is_infeasible(&self) -> bool {
        self.total_cost.is_infinite()
    }

    // getters
    pub fn total_cost(&self) -> EdgeWeight {
        self.total_cost
    }

    pub fn clusters(&self) -> &[Vec<NodeId>] {
        &self.clusters
    }
}

/// Greedy cluster editing: repeatedly commit the edge whose opposite decision has
/// the highest induced cost, close the implications on the clique structure, and
/// read the clusters off the permanent components.
///
/// Construction resolves the permanent/forbidden seeds (detecting contradictions)
/// and initializes the induced costs; `solve` runs the commit loop. With
/// `bundle_edges`, parallel edges from a freshly merged clique towards the same
/// external clique are collapsed into one representative so the clique acts as a
/// single node in the heap.
pub struct InducedCostHeuristic {
    graph: StaticSparseGraph,
    edge_heap: EdgeHeap,
    bundle_edges: bool,
    total_cost: EdgeWeight,
    total_edges: usize
}

impl InducedCostHeuristic {
    /// Builds the solver state: seed closure plus induced-cost initialization.
    /// A contradiction among the seeds leaves the total cost infinite.
    pub fn new(graph: StaticSparseGraph, bundle_edges: bool) -> InducedCostHeuristic {
        let mut heuristic = InducedCostHeuristic {
            graph,
            edge_heap: EdgeHeap::new(),
            bundle_edges,
            total_cost: 0.0,
            total_edges: 0
        };
        if !heuristic.resolve_permanent_forbidden() {
            heuristic.total_cost = f64::INFINITY;
        }
        heuristic.edge_heap.init_induced_costs(&heuristic.graph);
        heuristic.total_edges = heuristic.edge_heap.num_unprocessed();
        heuristic
    }

    /// Runs the greedy loop and extracts the clusters
    pub fn solve(mut self) -> ClusterEditingSolution {
        if self.total_cost.is_infinite() {
            debug!("Instance is infeasible, permanent and forbidden seeds contradict");
            return ClusterEditingSolution::new(f64::INFINITY, vec![]);
        }
        debug!("Running induced cost heuristic on {} active edges", self.total_edges);

        loop {
            let (Some(icf_rank), Some(icp_rank)) = (self.edge_heap.max_icf_edge(), self.edge_heap.max_icp_edge()) else {
                break;
            };
            let max_icf = self.edge_heap.icf(icf_rank).unwrap_or(0.0);
            let max_icp = self.edge_heap.icp(icp_rank).unwrap_or(0.0);

            if max_icf >= max_icp {
                // forbidding this edge would be the most expensive decision left,
                // so make it permanent
                self.choose_permanent_edge(self.graph.edge_of(icf_rank));
            } else {
                self.choose_forbidden_edge(self.graph.edge_of(icp_rank));
            }
        }

        // clusters are the permanent components; untouched zero edges count as
        // forbidden, so every remaining singleton stays on its own
        let node_count = self.graph.node_count();
        let mut cluster_of: Vec<Option<usize>> = vec![None; node_count];
        let mut clusters: Vec<Vec<NodeId>> = vec![];
        for node in 0..node_count {
            if cluster_of[node].is_some() {
                continue;
            }
            let cluster_id = clusters.len();
            let mut members = self.graph.clique_of(node).to_vec();
            members.sort_unstable();
            for &member in members.iter() {
                cluster_of[member] = Some(cluster_id);
            }
            clusters.push(members);
        }

        debug!("Clustering done: {} clusters, total cost {}", clusters.len(), self.total_cost);
        ClusterEditingSolution::new(self.total_cost, clusters)
    }

    /// Makes an edge and all its implications permanent, then bundles the merged
    /// clique's outgoing edges if requested
    fn choose_permanent_edge(&mut self, edge: Edge) {
        trace!("Setting edge {edge} to permanent");
        let u_clique = self.graph.clique_of(edge.u).to_vec();
        let v_clique = self.graph.clique_of(edge.v).to_vec();

        // connecting two cliques makes every cross pair permanent; zero edges are
        // covered implicitly by the clique merge, so only stored edges are listed
        let mut implications = vec![];
        for &x in u_clique.iter() {
            for &y in v_clique.iter() {
                let cross = Edge::new(x, y);
                if x == y || cross == edge || self.graph.find_index(cross) == 0 {
                    continue;
                }
                implications.push(cross);
            }
        }

        // cliques already forbidden against one endpoint become forbidden against
        // the other endpoint's clique as well
        let mut forbidden_implications = vec![];
        for &f in self.graph.forbidden_neighbours(edge.u).iter() {
            for &x in v_clique.iter() {
                let cross = Edge::new(f, x);
                if self.graph.find_index(cross) != 0 && !self.graph.is_forbidden(cross) {
                    forbidden_implications.push(cross);
                }
            }
        }
        for &f in self.graph.forbidden_neighbours(edge.v).iter() {
            for &x in u_clique.iter() {
                let cross = Edge::new(f, x);
                if self.graph.find_index(cross) != 0 && !self.graph.is_forbidden(cross) {
                    forbidden_implications.push(cross);
                }
            }
        }

        self.set_permanent(edge);
        self.edge_heap.remove_edge(self.graph.find_index(edge));
        for cross in implications.into_iter() {
            self.set_permanent(cross);
            self.edge_heap.remove_edge(self.graph.find_index(cross));
        }
        for cross in forbidden_implications.into_iter() {
            self.set_forbidden(cross);
            self.edge_heap.remove_edge(self.graph.find_index(cross));
        }

        if self.bundle_edges {
            self.bundle_clique_edges(edge.u);
        }
    }

    /// Makes an edge and all its cross-clique implications forbidden
    fn choose_forbidden_edge(&mut self, edge: Edge) {
        trace!("Setting edge {edge} to forbidden");
        let u_clique = self.graph.clique_of(edge.u).to_vec();
        let v_clique = self.graph.clique_of(edge.v).to_vec();

        // separating two cliques forbids every cross pair; zero edges need no
        // bookkeeping beyond the forbidden-neighbor sets updated in set_forbidden
        let mut implications = vec![];
        for &x in u_clique.iter() {
            for &y in v_clique.iter() {
                let cross = Edge::new(x, y);
                if x == y || cross == edge || self.graph.find_index(cross) == 0 {
                    continue;
                }
                implications.push(cross);
            }
        }

        self.set_forbidden(edge);
        self.edge_heap.remove_edge(self.graph.find_index(edge));
        for cross in implications.into_iter() {
            self.set_forbidden(cross);
            self.edge_heap.remove_edge(self.graph.find_index(cross));
        }
    }

    /// Collapses all edges from the freshly merged clique of `node` towards each
    /// external clique into one representative edge
    fn bundle_clique_edges(&mut self, node: NodeId) {
        let merged: Vec<NodeId> = self.graph.clique_of(node).to_vec();
        let clique_id = self.graph.clique_id_of(node);
        let mut representative: FxHashMap<usize, RankId> = FxHashMap::default();

        for &member in merged.iter() {
            for neighbor in self.graph.unpruned_neighbours(member).to_vec() {
                let outgoing = Edge::new(member, neighbor);
                let neighbor_clique = self.graph.clique_id_of(neighbor);
                if neighbor_clique == clique_id {
                    // internal edges are all permanent by now and pruned; an
                    // unpruned internal edge would mean a missed implication
                    continue;
                }
                let rank = self.graph.find_index(outgoing);
                if rank == 0 {
                    continue;
                }

                match representative.get(&neighbor_clique).copied() {
                    None => {
                        representative.insert(neighbor_clique, rank);
                    },
                    Some(kept_rank) => {
                        let weight_from = self.graph.weight_of(rank);
                        let weight_into = self.graph.weight_of(kept_rank);
                        trace!("Bundling edge {outgoing} into {}", self.graph.edge_of(kept_rank));
                        // parallel edges of opposite sign partially cancel in the
                        // summed weight; the cancelled share is an edit the final
                        // commit can no longer charge, so it is paid here
                        self.total_cost += EdgeHeap::icp_single(weight_from, weight_into);
                        self.edge_heap.merge_edges(rank, kept_rank, weight_from, weight_into);
                        self.graph.set_weight_rank(kept_rank, weight_from + weight_into);
                        self.graph.prune_bundled(rank);
                    }
                }
            }
        }
    }

    /// Commits an edge permanent: updates the induced costs of every triangle
    /// through it, accounts the insertion cost, and mutates the graph
    fn set_permanent(&mut self, edge: Edge) {
        let rank = self.graph.find_index(edge);
        // an implicitly committed zero edge carries weight 0
        let weight = self.graph.weight_of(rank);

        for w in self.graph.unpruned_neighbours(edge.u).to_vec() {
            if w == edge.v {
                continue;
            }
            let other_rank = self.graph.find_index(Edge::new(edge.v, w));
            if other_rank > 0 {
                let third_weight = self.graph.weight_of(other_rank);
                self.update_triple_permanent(weight, Edge::new(edge.u, w), third_weight);
            }
        }
        for w in self.graph.unpruned_neighbours(edge.v).to_vec() {
            if w == edge.u {
                continue;
            }
            let other_rank = self.graph.find_index(Edge::new(edge.u, w));
            if other_rank > 0 {
                let third_weight = self.graph.weight_of(other_rank);
                self.update_triple_permanent(weight, Edge::new(edge.v, w), third_weight);
            }
        }

        if weight < 0.0 {
            self.total_cost -= weight;
        }
        self.graph.set_permanent(edge);
    }

    /// Commits an edge forbidden: updates the induced costs of every triangle
    /// through it, accounts the deletion cost, and mutates the graph
    fn set_forbidden(&mut self, edge: Edge) {
        let rank = self.graph.find_index(edge);
        let weight = self.graph.weight_of(rank);

        for w in self.graph.unpruned_neighbours(edge.u).to_vec() {
            if w == edge.v {
                continue;
            }
            let other_rank = self.graph.find_index(Edge::new(edge.v, w));
            if other_rank > 0 {
                let third_weight = self.graph.weight_of(other_rank);
                self.update_triple_forbidden(weight, Edge::new(edge.u, w), third_weight);
            }
        }
        for w in self.graph.unpruned_neighbours(edge.v).to_vec() {
            if w == edge.u {
                continue;
            }
            let other_rank = self.graph.find_index(Edge::new(edge.u, w));
            if other_rank > 0 {
                let third_weight = self.graph.weight_of(other_rank);
                self.update_triple_forbidden(weight, Edge::new(edge.v, w), third_weight);
            }
        }

        if weight > 0.0 {
            self.total_cost += weight;
        }
        self.graph.set_forbidden(edge);
    }

    /// Replaces the contribution of a triangle whose committed side became
    /// permanent: the remaining side now binds directly
    fn update_triple_permanent(&mut self, committed_weight: EdgeWeight, updated: Edge, third_weight: EdgeWeight) {
        let rank = self.graph.find_index(updated);
        let icf_old = EdgeHeap::icf_single(committed_weight, third_weight);
        let icf_new = third_weight.max(0.0);
        let icp_old = EdgeHeap::icp_single(committed_weight, third_weight);
        let icp_new = (-third_weight).max(0.0);
        if icf_new != icf_old {
            self.edge_heap.increase_icf(rank, icf_new - icf_old);
        }
        if icp_new != icp_old {
            self.edge_heap.increase_icp(rank, icp_new - icp_old);
        }
    }

    /// Replaces the contribution of a triangle whose committed side became
    /// forbidden: the constraint disappears for forbidding and flips for permitting
    fn update_triple_forbidden(&mut self, committed_weight: EdgeWeight, updated: Edge, third_weight: EdgeWeight) {
        let rank = self.graph.find_index(updated);
        let icf_old = EdgeHeap::icf_single(committed_weight, third_weight);
        let icf_new = 0.0;
        let icp_old = EdgeHeap::icp_single(committed_weight, third_weight);
        let icp_new = third_weight.max(0.0);
        if icf_new != icf_old {
            self.edge_heap.increase_icf(rank, icf_new - icf_old);
        }
        if icp_new != icp_old {
            self.edge_heap.increase_icp(rank, icp_new - icp_old);
        }
    }

    /// Closes the permanent and forbidden seed edges: intra-clique pairs become
    /// permanent (paying for negative weights), clique pairs with any forbidden
    /// cross edge become fully forbidden (paying for positive weights). Returns
    /// false on a contradiction.
    fn resolve_permanent_forbidden(&mut self) -> bool {
        // seed permanent edges already merged their cliques during compilation
        let mut cliques: Vec<Vec<NodeId>> = vec![];
        let mut processed = vec![false; self.graph.node_count()];
        for node in 0..self.graph.node_count() {
            if processed[node] {
                continue;
            }
            let members = self.graph.clique_of(node).to_vec();
            for &member in members.iter() {
                processed[member] = true;
            }
            cliques.push(members);
        }

        for members in cliques.iter() {
            for (i, &x) in members.iter().enumerate() {
                for &y in members.iter().skip(i + 1) {
                    let pair = Edge::new(x, y);
                    let weight = self.graph.get_weight(pair);
                    if weight == f64::NEG_INFINITY {
                        return false;
                    }
                    if weight != f64::INFINITY {
                        if weight < 0.0 {
                            self.total_cost -= weight;
                        }
                        trace!("Making {pair} permanent due to seed implication");
                        self.graph.set_permanent(pair);
                    }
                }
            }
        }

        // disconnect clique pairs with any forbidden edge between them; pairs of
        // singletons carry their single forbidden edge already
        let multi_cliques: Vec<usize> = (0..cliques.len()).filter(|&c| cliques[c].len() > 1).collect();
        for k in 0..cliques.len() {
            for &l in multi_cliques.iter() {
                if k == l {
                    continue;
                }
                let found = cliques[k].iter().any(|&u| cliques[l].iter()
                    .any(|&v| self.graph.get_weight(Edge::new(u, v)) == f64::NEG_INFINITY));
                if !found {
                    continue;
                }
                for &u in cliques[k].iter() {
                    for &v in cliques[l].iter() {
                        let pair = Edge::new(u, v);
                        let weight = self.graph.get_weight(pair);
                        if weight != f64::NEG_INFINITY {
                            if weight == f64::INFINITY {
                                // a permanent edge between distinct cliques
                                // contradicts the seeds
                                return false;
                            }
                            if weight > 0.0 {
                                self.total_cost += weight;
                            }
                            trace!("Making {pair} forbidden due to seed implication");
                            self.graph.set_forbidden(pair);
                        }
                    }
                }
            }
        }
        true
    }
}

/// Convenience entry point: builds the graph from a weighted edge list and solves
/// it. Weights of `+inf` and `-inf` seed permanent and forbidden edges.
/// # Errors
/// * if the edge list is invalid (NaN weight, out-of-range node, self loop)
pub fn solve_edge_list(
    node_count: usize, edges: &[(NodeId, NodeId, EdgeWeight)], bundle_edges: bool
) -> Result<ClusterEditingSolution, GraphError> {
    let dynamic = DynamicSparseGraph::from_edge_list(node_count, edges)?;
    let graph = StaticSparseGraph::compile(&dynamic);
    Ok(InducedCostHeuristic::new(graph, bundle_edges).solve())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    /// Checks that the clusters partition the node set with sorted members
    fn assert_valid_partition(solution: &ClusterEditingSolution, node_count: usize) {
        let mut seen = vec![false; node_count];
        for cluster in solution.clusters() {
            assert!(cluster.windows(2).all(|w| w[0] < w[1]));
            for &node in cluster.iter() {
                assert!(!seen[node]);
                seen[node] = true;
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    /// Recomputes the editing cost from the input weights and the final clusters:
    /// positive cross-cluster edges are deleted, negative intra-cluster edges
    /// are inserted
    fn edited_cost(edges: &[(NodeId, NodeId, EdgeWeight)], solution: &ClusterEditingSolution) -> EdgeWeight {
        let cluster_of = |node: NodeId| solution.clusters().iter().position(|c| c.contains(&node)).unwrap();
        let mut cost = 0.0;
        for &(u, v, weight) in edges.iter() {
            if !weight.is_finite() {
                continue;
            }
            let same = cluster_of(u) == cluster_of(v);
            if same && weight < 0.0 {
                cost -= weight;
            } else if !same && weight > 0.0 {
                cost += weight;
            }
        }
        cost
    }

    #[test]
    fn test_conflict_triangle() {
        let edges = [(0, 1, 1.0), (0, 2, 1.0), (1, 2, -1.0)];
        for bundle_edges in [false, true] {
            let solution = solve_edge_list(3, &edges, bundle_edges).unwrap();
            assert!(!solution.is_infeasible());
            assert_approx_eq!(solution.total_cost(), 1.0);
            assert_valid_partition(&solution, 3);
            assert_approx_eq!(edited_cost(&edges, &solution), solution.total_cost());
        }
    }

    #[test]
    fn test_two_clean_clusters() {
        // two tight triangles joined by a single repulsive edge
        let edges = [
            (0, 1, 5.0), (0, 2, 5.0), (1, 2, 5.0),
            (3, 4, 5.0), (3, 5, 5.0), (4, 5, 5.0),
            (2, 3, -2.0)
        ];
        for bundle_edges in [false, true] {
            let solution = solve_edge_list(6, &edges, bundle_edges).unwrap();
            assert_eq!(solution.total_cost(), 0.0);
            assert_valid_partition(&solution, 6);

            let mut clusters = solution.clusters().to_vec();
            clusters.sort();
            assert!(clusters.contains(&vec![0, 1, 2]));
            assert!(clusters.contains(&vec![3, 4, 5]));
        }
    }

    #[test]
    fn test_weak_link_is_cut() {
        // a cheap bridge between two repulsion-separated pairs must be deleted
        let edges = [
            (0, 1, 10.0), (2, 3, 10.0), (1, 2, 1.0),
            (0, 2, -5.0), (0, 3, -5.0), (1, 3, -5.0)
        ];
        for bundle_edges in [false, true] {
            let solution = solve_edge_list(4, &edges, bundle_edges).unwrap();
            assert_approx_eq!(solution.total_cost(), 1.0);
            assert_valid_partition(&solution, 4);
            assert_approx_eq!(edited_cost(&edges, &solution), solution.total_cost());

            let mut clusters = solution.clusters().to_vec();
            clusters.sort();
            assert_eq!(clusters, vec![vec![0, 1], vec![2, 3]]);
        }
    }

    #[test]
    fn test_seed_infeasible() {
        // permanent path 0-1-2 with a forbidden chord is a contradiction
        let edges = [
            (0, 1, f64::INFINITY),
            (1, 2, f64::INFINITY),
            (0, 2, f64::NEG_INFINITY)
        ];
        let solution = solve_edge_list(3, &edges, false).unwrap();
        assert!(solution.is_infeasible());
        assert!(solution.total_cost().is_infinite());
        assert!(solution.clusters().is_empty());
    }

    #[test]
    fn test_permanent_seed_closure_pays_negative_weights() {
        // the permanent path forces 0-2 into the clique against its -3 weight
        let edges = [
            (0, 1, f64::INFINITY),
            (1, 2, f64::INFINITY),
            (0, 2, -3.0)
        ];
        let solution = solve_edge_list(3, &edges, false).unwrap();
        assert_approx_eq!(solution.total_cost(), 3.0);
        assert_eq!(solution.clusters(), &[vec![0, 1, 2]]);
    }

    #[test]
    fn test_forbidden_seed_closure_pays_positive_weights() {
        // 0-1 is a permanent clique, 2 is forbidden against 0, so the positive
        // edge 1-2 must be deleted during seed resolution
        let edges = [
            (0, 1, f64::INFINITY),
            (0, 2, f64::NEG_INFINITY),
            (1, 2, 4.0)
        ];
        let solution = solve_edge_list(3, &edges, false).unwrap();
        assert_approx_eq!(solution.total_cost(), 4.0);
        let mut clusters = solution.clusters().to_vec();
        clusters.sort();
        assert_eq!(clusters, vec![vec![0, 1], vec![2]]);
    }

    #[test]
    fn test_zero_edges_stay_separate() {
        // nodes without any stored edge form singleton clusters
        let edges = [(0, 1, 2.0)];
        let solution = solve_edge_list(4, &edges, false).unwrap();
        assert_eq!(solution.total_cost(), 0.0);
        assert_eq!(solution.clusters().len(), 3);
        assert_valid_partition(&solution, 4);
    }

    #[test]
    fn test_negative_only_graph() {
        // all edges repulsive: nothing to edit, everyone stays alone
        let edges = [(0, 1, -1.0), (1, 2, -2.0), (0, 2, -3.0)];
        let solution = solve_edge_list(3, &edges, false).unwrap();
        assert_eq!(solution.total_cost(), 0.0);
        assert_eq!(solution.clusters().len(), 3);
    }

    #[test]
    fn test_bundling_matches_unbundled_cost() {
        // a denser instance where cliques merge while outside edges remain
        let edges = [
            (0, 1, 4.0), (0, 2, 4.0), (1, 2, 4.0),
            (0, 3, 1.0), (1, 3, 1.0), (2, 3, -1.5),
            (3, 4, 3.0), (2, 4, -1.0)
        ];
        let plain = solve_edge_list(5, &edges, false).unwrap();
        let bundled = solve_edge_list(5, &edges, true).unwrap();

        assert_valid_partition(&plain, 5);
        assert_valid_partition(&bundled, 5);
        assert_approx_eq!(edited_cost(&edges, &plain), plain.total_cost());
        assert_approx_eq!(edited_cost(&edges, &bundled), bundled.total_cost());
    }

    #[test]
    fn test_total_cost_equals_edited_weights() {
        // mixed instance exercising both permanent and forbidden commits
        let edges = [
            (0, 1, 3.0), (1, 2, 2.0), (0, 2, -1.0),
            (2, 3, 1.0), (3, 4, 4.0), (1, 4, -2.0),
            (0, 4, 0.5)
        ];
        for bundle_edges in [false, true] {
            let solution = solve_edge_list(5, &edges, bundle_edges).unwrap();
            assert_valid_partition(&solution, 5);
            assert_approx_eq!(edited_cost(&edges, &solution), solution.total_cost());
        }
    }
}
