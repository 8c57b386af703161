
/// Integer wMEC column costs with incremental single-read updates
pub mod column_cost_computer;
/// Gray-code enumeration of column bipartitions with neighbor projections
pub mod column_indexing;
/// Forward and backward views of a read set as variant columns
pub mod column_iterator;
/// The pedigree-aware wMEC phasing DP
pub mod dp_table;
/// Log-domain column likelihoods for the genotyping DP
pub mod genotype_cost_computer;
/// The forward-backward genotyping DP
pub mod genotype_dp_table;
/// Transmission-vector to haplotype-partition maps
pub mod pedigree_partitions;
/// Transition probabilities between transmission vectors
pub mod transition_probability;
