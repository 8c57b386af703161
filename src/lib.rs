
/*!
# Echidna-bio
Echidna-bio is the underlying library that supports the Echidna tools.
It provides two in-memory combinatorial engines from genomics: pedigree-aware read
phasing via the weighted minimum error correction (wMEC) dynamic program, and
weighted cluster editing via an induced-cost greedy heuristic.

## Example phasing usage
```rust
use echidna_bio::data_types::pedigree::Pedigree;
use echidna_bio::data_types::read::Read;
use echidna_bio::data_types::read_set::ReadSet;
use echidna_bio::phasing::dp_table::{PedigreeDpTable, PhasingConfig};

// two error-free reads from opposite haplotypes over three variants
let mut read_set = ReadSet::new();
for (name, allele) in [("read0", 1), ("read1", 0)] {
    let mut read = Read::new(name, 60, 0);
    for position in [100, 200, 300] {
        read.add_variant(position, 'N', allele, 30).unwrap();
    }
    read_set.add(read).unwrap();
}
read_set.finalize().unwrap();

// a single individual expected to be heterozygous at every variant
let mut pedigree = Pedigree::new();
pedigree.add_individual(0, vec![1, 1, 1], vec![None, None, None]).unwrap();

// phase with a flat recombination cost
let config = PhasingConfig::default();
let table = PedigreeDpTable::new(&read_set, &[1, 1, 1], &pedigree, &config).unwrap();

// the reads split cleanly, so nothing needs to be corrected
assert_eq!(table.total_cost(), 0);
let partitioning = table.optimal_partitioning();
assert_ne!(partitioning[0], partitioning[1]);

// the super reads recover the two haplotypes
let pair = &table.super_reads()[0];
let hap1: Vec<u8> = pair.haplotype1.variants().map(|v| v.entry().allele().unwrap()).collect();
let hap2: Vec<u8> = pair.haplotype2.variants().map(|v| v.entry().allele().unwrap()).collect();
assert!(hap1 == vec![1, 1, 1] || hap1 == vec![0, 0, 0]);
assert_ne!(hap1, hap2);
```

## Example cluster editing usage
```rust
use echidna_bio::cluster_editing::induced_cost_heuristic::solve_edge_list;

// a conflict triangle: two attractive edges, one repulsive
let edges = [(0, 1, 1.0), (0, 2, 1.0), (1, 2, -1.0)];
let solution = solve_edge_list(3, &edges, false).unwrap();

// resolving the conflict costs exactly one unit of edit weight
assert!(!solution.is_infeasible());
assert_eq!(solution.total_cost(), 1.0);

// contradictory permanent/forbidden seeds are reported as infeasible
let seeds = [(0, 1, f64::INFINITY), (1, 2, f64::INFINITY), (0, 2, f64::NEG_INFINITY)];
let infeasible = solve_edge_list(3, &seeds, false).unwrap();
assert!(infeasible.is_infeasible());
assert!(infeasible.clusters().is_empty());
```
*/

/// Weighted cluster editing: sparse graph, edge heap, and the greedy solver
pub mod cluster_editing;
/// Shared data types: entries, reads, read sets, and pedigrees
pub mod data_types;
/// The wMEC phasing and genotyping DPs with their column machinery
pub mod phasing;
/// Phred to probability conversion helpers
pub mod util;
