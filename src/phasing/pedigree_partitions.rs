
use crate::data_types::entry::Haplotype;
use crate::data_types::pedigree::{Pedigree, PedigreeError};

/// Maps every individual's two haplotypes onto haplotype partitions for one fixed
/// transmission vector. Founders own two fresh partitions each; a trio child's
/// maternal haplotype lands in the mother's transmitted partition and the paternal
/// haplotype in the father's, resolved transitively through the generations.
///
/// The transmission vector packs two bits per trio: the low bit selects the
/// transmitted maternal haplotype, the high bit the paternal one.
#[derive(Clone, Debug)]
pub struct PedigreePartitions {
    /// Per individual: the partitions of haplotype 1 and haplotype 2
    partition_of: Vec<[usize; 2]>,
    /// Total number of partitions, twice the founder count
    count: usize
}

impl PedigreePartitions {
    /// Builds the partition map for one transmission vector.
    /// # Arguments
    /// * `pedigree` - the pedigree to map
    /// * `transmission` - transmission vector in `[0, 4^triple_count)`
    /// # Errors
    /// * if the trio relationships cannot be resolved (cyclic pedigree)
    pub fn new(pedigree: &Pedigree, transmission: usize) -> Result<Self, PedigreeError> {
        let individual_count = pedigree.individual_count();
        let mut partition_of: Vec<Option<[usize; 2]>> = vec![None; individual_count];

        // founders first, two partitions each, in individual order
        let mut count = 0;
        for individual in 0..individual_count {
            if pedigree.is_founder(individual) {
                partition_of[individual] = Some([count, count + 1]);
                count += 2;
            }
        }

        // children inherit the transmitted parental partitions; repeat passes until
        // the generations are resolved
        let mut unresolved = individual_count - count / 2;
        while unresolved > 0 {
            let mut progressed = false;
            for (trio_index, trio) in pedigree.trios().iter().enumerate() {
                if partition_of[trio.child].is_some() {
                    continue;
                }
                let (Some(mother), Some(father)) = (partition_of[trio.mother], partition_of[trio.father]) else {
                    continue;
                };

                let maternal_bit = (transmission >> (2 * trio_index)) & 1;
                let paternal_bit = (transmission >> (2 * trio_index + 1)) & 1;
                partition_of[trio.child] = Some([mother[maternal_bit], father[paternal_bit]]);
                unresolved -= 1;
                progressed = true;
            }
            if !progressed {
                return Err(PedigreeError::CyclicPedigree);
            }
        }

        Ok(Self {
            partition_of: partition_of.into_iter().flatten().collect(),
            count
        })
    }

    /// Returns the partition holding the given haplotype of an individual
    pub fn haplotype_to_partition(&self, individual: usize, haplotype: Haplotype) -> usize {
        self.partition_of[individual][haplotype.to_bit()]
    }

    /// Returns the partition for an individual and a raw haplotype bit, as used by
    /// bipartition bit values
    pub fn partition_for_bit(&self, individual: usize, haplotype_bit: usize) -> usize {
        self.partition_of[individual][haplotype_bit & 1]
    }

    /// Returns the number of partitions
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the ALT copy count an individual receives under a per-partition
    /// allele assignment mask
    pub fn genotype_of_mask(&self, individual: usize, mask: usize) -> u8 {
        let [hap1, hap2] = self.partition_of[individual];
        (((mask >> hap1) & 1) + ((mask >> hap2) & 1)) as u8
    }
}
