
use crate::data_types::entry::Entry;
use crate::phasing::column_iterator::ColumnEntry;
use crate::phasing::pedigree_partitions::PedigreePartitions;

/// Sentinel for states with no genotype-consistent allele assignment
pub const INFEASIBLE_COST: u64 = u64::MAX;

/// Integer wMEC cost computer for one column under one transmission vector.
///
/// For every haplotype partition it tracks the summed phred weight of the
/// observations that would have to be corrected if the partition were assigned
/// REF resp. ALT. A bipartition change moves a single read between partitions in
/// O(1); the column cost for a state is the minimum over the supplied
/// genotype-consistent per-partition allele masks.
pub struct ColumnCostComputer<'a> {
    column: &'a [ColumnEntry],
    /// Per read (global index): the pedigree individual it belongs to
    read_sources: &'a [usize],
    partitions: &'a PedigreePartitions,
    /// Per partition: weight of correcting all entries if assigned [REF, ALT]
    partition_weights: Vec<[u64; 2]>,
    partitioning: usize
}

impl<'a> ColumnCostComputer<'a> {
    /// Creates a cost computer positioned at bipartition 0
    pub fn new(column: &'a [ColumnEntry], read_sources: &'a [usize], partitions: &'a PedigreePartitions) -> Self {
        let mut computer = Self {
            column,
            read_sources,
            partitions,
            partition_weights: vec![[0; 2]; partitions.count()],
            partitioning: 0
        };
        computer.set_partitioning(0);
        computer
    }

    /// Correction weights of an entry when its partition is assigned [REF, ALT]
    fn entry_weights(entry: Entry) -> [u64; 2] {
        match entry {
            Entry::RefAllele(quality) => [0, quality as u64],
            Entry::AltAllele(quality) => [quality as u64, 0],
            Entry::Blank => [0, 0]
        }
    }

    /// Installs a bipartition from scratch in O(k)
    pub fn set_partitioning(&mut self, partitioning: usize) {
        self.partition_weights.iter_mut().for_each(|w| *w = [0; 2]);
        for (slot, column_entry) in self.column.iter().enumerate() {
            let haplotype_bit = (partitioning >> slot) & 1;
            let partition = self.partitions.partition_for_bit(self.read_sources[column_entry.read_index], haplotype_bit);
            let weights = Self::entry_weights(column_entry.entry);
            self.partition_weights[partition][0] += weights[0];
            self.partition_weights[partition][1] += weights[1];
        }
        self.partitioning = partitioning;
    }

    /// Flips the haplotype of the read at the given bit in O(1)
    pub fn update_partitioning(&mut self, bit: usize) {
        let column_entry = &self.column[bit];
        let source = self.read_sources[column_entry.read_index];
        let old_bit = (self.partitioning >> bit) & 1;
        let old_partition = self.partitions.partition_for_bit(source, old_bit);
        let new_partition = self.partitions.partition_for_bit(source, old_bit ^ 1);

        let weights = Self::entry_weights(column_entry.entry);
        self.partition_weights[old_partition][0] -= weights[0];
        self.partition_weights[old_partition][1] -= weights[1];
        self.partition_weights[new_partition][0] += weights[0];
        self.partition_weights[new_partition][1] += weights[1];
        self.partitioning ^= 1 << bit;
    }

    /// Cost of assigning alleles to partitions according to the given bitmask
    fn mask_cost(&self, mask: usize) -> u64 {
        self.partition_weights.iter().enumerate()
            .map(|(partition, weights)| weights[(mask >> partition) & 1])
            .sum()
    }

    /// Column cost for the current bipartition: the minimum over the
    /// genotype-consistent allele masks, or `INFEASIBLE_COST` if none exist
    pub fn cost(&self, compatible_masks: &[usize]) -> u64 {
        compatible_masks.iter()
            .map(|&mask| self.mask_cost(mask))
            .min()
            .unwrap_or(INFEASIBLE_COST)
    }

    /// The cheapest compatible allele mask together with its cost, used for
    /// super-read assembly after the backtrace
    pub fn best_mask(&self, compatible_masks: &[usize]) -> Option<(usize, u64)> {
        compatible_masks.iter()
            .map(|&mask| (mask, self.mask_cost(mask)))
            .min_by_key(|&(mask, cost)| (cost, mask))
    }

    /// Summed correction weights of a partition when assigned [REF, ALT]
    pub fn partition_weights(&self, partition: usize) -> [u64; 2] {
        self.partition_weights[partition]
    }

    // getters
    pub fn partitioning(&self) -> usize {
        self.partitioning
    }
}
