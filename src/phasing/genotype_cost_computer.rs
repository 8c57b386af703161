
use crate::data_types::entry::Entry;
use crate::phasing::column_iterator::ColumnEntry;
use crate::phasing::pedigree_partitions::PedigreePartitions;
use crate::util::phred_to_log_probs;

/// Likelihood computer for one column under one transmission vector.
///
/// For every haplotype partition it tracks the log-probability of the partition's
/// observations given a REF resp. ALT assignment:
/// `P(entry | a)` is `1 - 10^(-q/10)` when the observed allele equals `a` and
/// `10^(-q/10)` otherwise; blank entries contribute a factor of one. The sums
/// live in log space so long columns cannot underflow; `get_cost` exponentiates
/// on demand.
pub struct GenotypeColumnCostComputer<'a> {
    column: &'a [ColumnEntry],
    /// Per read (global index): the pedigree individual it belongs to
    read_sources: &'a [usize],
    partitions: &'a PedigreePartitions,
    /// Per partition: ln P(observations | REF) and ln P(observations | ALT)
    log_weights: Vec<[f64; 2]>,
    partitioning: usize
}

impl<'a> GenotypeColumnCostComputer<'a> {
    /// Creates a cost computer positioned at bipartition 0
    pub fn new(column: &'a [ColumnEntry], read_sources: &'a [usize], partitions: &'a PedigreePartitions) -> Self {
        let mut computer = Self {
            column,
            read_sources,
            partitions,
            log_weights: vec![[0.0; 2]; partitions.count()],
            partitioning: 0
        };
        computer.set_partitioning(0);
        computer
    }

    /// Log-likelihood factors of an entry under a [REF, ALT] assignment
    fn entry_log_factors(entry: Entry) -> [f64; 2] {
        match entry {
            Entry::RefAllele(quality) => {
                let (log_correct, log_wrong) = phred_to_log_probs(quality);
                [log_correct, log_wrong]
            },
            Entry::AltAllele(quality) => {
                let (log_correct, log_wrong) = phred_to_log_probs(quality);
                [log_wrong, log_correct]
            },
            Entry::Blank => [0.0, 0.0]
        }
    }

    /// Installs a bipartition from scratch in O(k)
    pub fn set_partitioning(&mut self, partitioning: usize) {
        self.log_weights.iter_mut().for_each(|w| *w = [0.0; 2]);
        for (slot, column_entry) in self.column.iter().enumerate() {
            let haplotype_bit = (partitioning >> slot) & 1;
            let partition = self.partitions.partition_for_bit(self.read_sources[column_entry.read_index], haplotype_bit);
            let factors = Self::entry_log_factors(column_entry.entry);
            self.log_weights[partition][0] += factors[0];
            self.log_weights[partition][1] += factors[1];
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

        let factors = Self::entry_log_factors(column_entry.entry);
        self.log_weights[old_partition][0] -= factors[0];
        self.log_weights[old_partition][1] -= factors[1];
        self.log_weights[new_partition][0] += factors[0];
        self.log_weights[new_partition][1] += factors[1];
        self.partitioning ^= 1 << bit;
    }

    /// Likelihood of the column for an allele pair over the first two partitions:
    /// `(allele_a, allele_b) = ((index >> 1) & 1, index & 1)`. This is the
    /// single-individual view, where partitions 0 and 1 are the two haplotypes.
    pub fn get_cost(&self, allele_pair_index: usize) -> f64 {
        let allele_a = (allele_pair_index >> 1) & 1;
        let allele_b = allele_pair_index & 1;
        (self.log_weights[0][allele_a] + self.log_weights[1][allele_b]).exp()
    }

    /// Log-likelihood of the column under a full per-partition allele mask
    pub fn assignment_log_likelihood(&self, mask: usize) -> f64 {
        self.log_weights.iter().enumerate()
            .map(|(partition, weights)| weights[(mask >> partition) & 1])
            .sum()
    }

    /// Linear-space likelihood of a per-partition allele mask
    pub fn assignment_likelihood(&self, mask: usize) -> f64 {
        self.assignment_log_likelihood(mask).exp()
    }

    // getters
    pub fn partitioning(&self) -> usize {
        self.partitioning
    }
}
