
use derive_builder::Builder;
use log::debug;

use crate::data_types::pedigree::{Pedigree, PedigreeError};
use crate::data_types::read::Read;
use crate::data_types::read_set::{ReadSet, ReadSetError};
use crate::phasing::column_cost_computer::{ColumnCostComputer, INFEASIBLE_COST};
use crate::phasing::column_indexing::{ColumnIndexingIterator, ColumnIndexingScheme};
use crate::phasing::column_iterator::{Column, ColumnIterator};
use crate::phasing::pedigree_partitions::PedigreePartitions;

#[derive(thiserror::Error, Debug)]
pub enum PhasingError {
    #[error("column {column} has {coverage} active reads, exceeding the maximum of {max_coverage}")]
    ReadsetTooDense { column: usize, coverage: usize, max_coverage: usize },
    #[error("pedigree has {trios} trios, exceeding the maximum of {max_trios}")]
    PedigreeTooLarge { trios: usize, max_trios: usize },
    #[error("column {column} admits no genotype-consistent bipartition")]
    UnphasableColumn { column: usize },
    #[error("expected {expected} recombination costs, got {actual}")]
    RecombinationCostCount { expected: usize, actual: usize },
    #[error("individual {id} has {actual} genotypes for {expected} variant columns")]
    GenotypeCountMismatch { id: u32, expected: usize, actual: usize },
    #[error("read {name} references sample id {sample_id}, which is not in the pedigree")]
    UnknownSample { name: String, sample_id: u32 },
    #[error(transparent)]
    ReadSet(#[from] ReadSetError),
    #[error(transparent)]
    Pedigree(#[from] PedigreeError)
}

/// Controls the resource caps and the genotype constraint mode of the phasing DP
#[derive(Builder, Clone, Copy, Debug)]
#[builder(default)]
pub struct PhasingConfig {
    /// if true, every individual is constrained to a heterozygous genotype at every
    /// column instead of the pedigree's expected genotypes
    pub all_heterozygous: bool,
    /// maximum number of active reads in any column
    pub max_coverage: usize,
    /// maximum number of trios in the pedigree
    pub max_trios: usize
}

impl Default for PhasingConfig {
    fn default() -> Self {
        // caps chosen so the bit-indexed state spaces stay tractable
        Self {
            all_heterozygous: false,
            max_coverage: 25,
            max_trios: 4
        }
    }
}

/// Validated, preprocessed inputs shared by the wMEC and the genotype DP
pub(crate) struct PhasingProblem<'a> {
    pub pedigree: &'a Pedigree,
    pub positions: Vec<u32>,
    pub columns: Vec<Column>,
    pub schemes: Vec<ColumnIndexingScheme>,
    /// Per read (global index): the pedigree individual it belongs to
    pub read_sources: Vec<usize>,
    /// One partition map per transmission vector
    pub partitions: Vec<PedigreePartitions>,
    pub transmission_count: usize,
    /// Expected genotypes, indexed [individual][column]
    pub genotypes: Vec<Vec<u8>>
}

impl<'a> PhasingProblem<'a> {
    /// Validates the inputs and precomputes the column machinery.
    /// # Errors
    /// * if the read set is not finalized, a cap is exceeded, genotype vectors have
    ///   the wrong length, or a read references an unknown sample
    pub fn build(read_set: &'a ReadSet, pedigree: &'a Pedigree, config: &PhasingConfig) -> Result<Self, PhasingError> {
        let positions = read_set.positions()?.to_vec();
        let column_count = positions.len();

        let trios = pedigree.triple_count();
        if trios > config.max_trios {
            return Err(PhasingError::PedigreeTooLarge { trios, max_trios: config.max_trios });
        }

        let mut genotypes = Vec::with_capacity(pedigree.individual_count());
        for individual in 0..pedigree.individual_count() {
            let genotype_count = pedigree.genotype_count(individual);
            if genotype_count != column_count {
                return Err(PhasingError::GenotypeCountMismatch {
                    id: pedigree.index_to_id(individual).unwrap_or(u32::MAX),
                    expected: column_count,
                    actual: genotype_count
                });
            }
            genotypes.push((0..column_count)
                .map(|column| pedigree.genotype(individual, column).unwrap_or(1))
                .collect());
        }

        let read_sources = read_set.reads()
            .map(|read| pedigree.id_to_index(read.sample_id()).ok_or_else(|| PhasingError::UnknownSample {
                name: read.name().to_string(),
                sample_id: read.sample_id()
            }))
            .collect::<Result<Vec<usize>, PhasingError>>()?;

        let schemes = ColumnIndexingScheme::build(read_set)?;
        for (column, scheme) in schemes.iter().enumerate() {
            if scheme.read_count() > config.max_coverage {
                return Err(PhasingError::ReadsetTooDense {
                    column,
                    coverage: scheme.read_count(),
                    max_coverage: config.max_coverage
                });
            }
        }

        let columns: Vec<Column> = ColumnIterator::new(read_set)?.collect();
        let transmission_count = pedigree.transmission_count();
        let partitions = (0..transmission_count)
            .map(|transmission| PedigreePartitions::new(pedigree, transmission))
            .collect::<Result<Vec<PedigreePartitions>, PedigreeError>>()?;

        Ok(Self {
            pedigree,
            positions,
            columns,
            schemes,
            read_sources,
            partitions,
            transmission_count,
            genotypes
        })
    }

    /// Enumerates the per-partition allele masks consistent with every individual's
    /// genotype at a column (or with forced heterozygosity)
    pub fn compatible_masks(&self, column: usize, transmission: usize, all_heterozygous: bool) -> Vec<usize> {
        let partitions = &self.partitions[transmission];
        (0..1_usize << partitions.count())
            .filter(|&mask| (0..self.pedigree.individual_count()).all(|individual| {
                let genotype = if all_heterozygous { 1 } else { self.genotypes[individual][column] };
                partitions.genotype_of_mask(individual, mask) == genotype
            }))
            .collect()
    }
}

/// One super-read pair: the two reconstructed haplotypes of an individual
#[derive(Clone, Debug, serde::Serialize)]
pub struct SuperReadPair {
    /// External id of the individual
    pub individual_id: u32,
    /// Consensus of the first haplotype partition
    pub haplotype1: Read,
    /// Consensus of the second haplotype partition
    pub haplotype2: Read
}

/// The pedigree-aware wMEC phasing DP.
///
/// Solves the weighted minimum error correction problem over the columns of a
/// finalized read set, jointly over all individuals of a pedigree: the state space
/// per column is (bipartition of the active reads) x (transmission vector), columns
/// are linked through the projections onto their shared reads, and transmission
/// changes pay the per-column recombination cost per flipped bit. Only two column
/// slices of costs are alive at any time; per-column backpointers are kept in
/// compact arrays for the backtrace.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PedigreeDpTable {
    positions: Vec<u32>,
    total_cost: u64,
    /// Haplotype bit of every input read under the optimal bipartition trajectory
    optimal_partitioning: Vec<u8>,
    /// Optimal transmission vector per column
    optimal_transmission: Vec<usize>,
    super_reads: Vec<SuperReadPair>
}

/// Per-column backtrace data: the optimal previous transmission per state and the
/// optimal bipartition per forward-projected state
struct ColumnBacktrack {
    best_prev_transmission: Vec<u8>,
    projected_source: Vec<u32>
}

impl PedigreeDpTable {
    /// Runs the phasing DP.
    /// # Arguments
    /// * `read_set` - finalized read set
    /// * `recombination_costs` - phred-scaled recombination cost per column
    /// * `pedigree` - pedigree with expected genotypes per column
    /// * `config` - caps and genotype constraint mode
    /// # Errors
    /// * if validation fails, a resource cap is exceeded, or a column admits no
    ///   genotype-consistent bipartition
    pub fn new(
        read_set: &ReadSet, recombination_costs: &[u32], pedigree: &Pedigree, config: &PhasingConfig
    ) -> Result<PedigreeDpTable, PhasingError> {
        let problem = PhasingProblem::build(read_set, pedigree, config)?;
        let column_count = problem.positions.len();
        if recombination_costs.len() != column_count {
            return Err(PhasingError::RecombinationCostCount {
                expected: column_count,
                actual: recombination_costs.len()
            });
        }

        if column_count == 0 {
            // no variants: nothing to phase, produce empty super reads
            let super_reads = (0..pedigree.individual_count())
                .map(|individual| empty_super_read_pair(pedigree, individual))
                .collect();
            return Ok(PedigreeDpTable {
                positions: vec![],
                total_cost: 0,
                optimal_partitioning: vec![0; read_set.len()],
                optimal_transmission: vec![],
                super_reads
            });
        }

        let transmission_count = problem.transmission_count;
        debug!(
            "Phasing {} columns over {} reads, {} transmission vectors, {} partitions",
            column_count, read_set.len(), transmission_count, problem.partitions[0].count()
        );

        // forward pass
        let mut previous_projection: Vec<u64> = vec![];
        let mut backtracks: Vec<ColumnBacktrack> = Vec::with_capacity(column_count);
        let mut final_costs: Vec<u64> = vec![];

        for column in 0..column_count {
            let scheme = &problem.schemes[column];
            let state_count = scheme.partition_count();

            let masks: Vec<Vec<usize>> = (0..transmission_count)
                .map(|transmission| problem.compatible_masks(column, transmission, config.all_heterozygous))
                .collect();

            let mut cost_computers: Vec<ColumnCostComputer> = problem.partitions.iter()
                .map(|partitions| ColumnCostComputer::new(&problem.columns[column], &problem.read_sources, partitions))
                .collect();

            let mut costs = vec![INFEASIBLE_COST; state_count * transmission_count];
            let mut best_prev_transmission = vec![0u8; if column > 0 { state_count * transmission_count } else { 0 }];

            let mut iterator = ColumnIndexingIterator::new(scheme);
            while iterator.has_next() {
                if let Some((bit, _)) = iterator.advance() {
                    for computer in cost_computers.iter_mut() {
                        computer.update_partitioning(bit);
                    }
                }
                let bipartition = iterator.get_partition();
                let backward_projection = iterator.get_backward_projection();

                for transmission in 0..transmission_count {
                    let column_cost = cost_computers[transmission].cost(&masks[transmission]);
                    if column_cost == INFEASIBLE_COST {
                        continue;
                    }

                    let state = bipartition * transmission_count + transmission;
                    if column == 0 {
                        costs[state] = column_cost;
                        continue;
                    }

                    // minimize over the previous transmission, paying per flipped bit
                    let mut best = INFEASIBLE_COST;
                    let mut best_transmission = 0u8;
                    for prev_transmission in 0..transmission_count {
                        let prev_cost = previous_projection[backward_projection * transmission_count + prev_transmission];
                        if prev_cost == INFEASIBLE_COST {
                            continue;
                        }
                        let switches = (transmission ^ prev_transmission).count_ones() as u64;
                        let candidate = prev_cost + recombination_costs[column] as u64 * switches;
                        if candidate < best {
                            best = candidate;
                            best_transmission = prev_transmission as u8;
                        }
                    }
                    if best == INFEASIBLE_COST {
                        continue;
                    }
                    best_prev_transmission[state] = best_transmission;
                    costs[state] = column_cost + best;
                }
            }

            if costs.iter().all(|&cost| cost == INFEASIBLE_COST) {
                // typically the all-heterozygous constraint colliding with a
                // column that forces a homozygous genotype
                return Err(PhasingError::UnphasableColumn { column });
            }

            // reduce onto the intersection with the next column
            let projection_count = scheme.forward_projection_count();
            let mut projected_cost = vec![INFEASIBLE_COST; projection_count * transmission_count];
            let mut projected_source = vec![0u32; projection_count * transmission_count];
            for bipartition in 0..state_count {
                let projection = scheme.forward_projection(bipartition);
                for transmission in 0..transmission_count {
                    let cost = costs[bipartition * transmission_count + transmission];
                    let slot = projection * transmission_count + transmission;
                    if cost < projected_cost[slot] {
                        projected_cost[slot] = cost;
                        projected_source[slot] = bipartition as u32;
                    }
                }
            }

            backtracks.push(ColumnBacktrack { best_prev_transmission, projected_source });
            if column + 1 == column_count {
                final_costs = costs;
            }
            previous_projection = projected_cost;
        }

        // best final state and backtrace
        let (best_state, &total_cost) = final_costs.iter().enumerate()
            .min_by_key(|&(state, &cost)| (cost, state))
            .ok_or(PhasingError::UnphasableColumn { column: column_count - 1 })?;
        debug!("Optimal phasing cost: {total_cost}");

        let mut bipartition = best_state / transmission_count;
        let mut transmission = best_state % transmission_count;
        let mut trajectory = vec![(0usize, 0usize); column_count];
        for column in (0..column_count).rev() {
            trajectory[column] = (bipartition, transmission);
            if column > 0 {
                let state = bipartition * transmission_count + transmission;
                let prev_transmission = backtracks[column].best_prev_transmission[state] as usize;
                let projection = problem.schemes[column].backward_projection(bipartition);
                let prev_bipartition =
                    backtracks[column - 1].projected_source[projection * transmission_count + prev_transmission] as usize;
                bipartition = prev_bipartition;
                transmission = prev_transmission;
            }
        }

        Self::assemble(read_set, &problem, config, trajectory, total_cost)
    }

    /// Reconstructs the per-read partitioning and the super reads from the optimal
    /// per-column (bipartition, transmission) trajectory
    fn assemble(
        read_set: &ReadSet, problem: &PhasingProblem, config: &PhasingConfig,
        trajectory: Vec<(usize, usize)>, total_cost: u64
    ) -> Result<PedigreeDpTable, PhasingError> {
        let column_count = problem.positions.len();
        let individual_count = problem.pedigree.individual_count();
        let mut optimal_partitioning = vec![0u8; read_set.len()];
        let mut optimal_transmission = Vec::with_capacity(column_count);
        // per individual and haplotype: (allele, quality) per column
        let mut haplotype_entries: Vec<[Vec<(i8, u32)>; 2]> =
            (0..individual_count).map(|_| [vec![], vec![]]).collect();

        for (column, &(bipartition, transmission)) in trajectory.iter().enumerate() {
            optimal_transmission.push(transmission);
            let partitions = &problem.partitions[transmission];
            let mut computer = ColumnCostComputer::new(&problem.columns[column], &problem.read_sources, partitions);
            computer.set_partitioning(bipartition);

            let masks = problem.compatible_masks(column, transmission, config.all_heterozygous);
            let (mask, _cost) = computer.best_mask(&masks)
                .ok_or(PhasingError::UnphasableColumn { column })?;

            for (slot, column_entry) in problem.columns[column].iter().enumerate() {
                optimal_partitioning[column_entry.read_index] = ((bipartition >> slot) & 1) as u8;
            }

            for (individual, haplotype_pair) in haplotype_entries.iter_mut().enumerate() {
                for (haplotype, haplotype_columns) in haplotype_pair.iter_mut().enumerate() {
                    let partition = partitions.partition_for_bit(individual, haplotype);
                    let allele = (mask >> partition) & 1;
                    let weights = computer.partition_weights(partition);
                    // summed evidence for the chosen allele minus the evidence against it
                    let quality = weights[1 - allele].saturating_sub(weights[allele]);
                    haplotype_columns.push((allele as i8, quality.min(u32::MAX as u64) as u32));
                }
            }
        }

        let mut super_reads = Vec::with_capacity(individual_count);
        for (individual, entries) in haplotype_entries.iter().enumerate() {
            let individual_id = problem.pedigree.index_to_id(individual).unwrap_or(u32::MAX);
            let mut haplotypes = Vec::with_capacity(2);
            for (haplotype, entries) in entries.iter().enumerate() {
                let mut read = Read::new(&format!("superread_{}_hap{}", individual_id, haplotype + 1), 60, individual_id);
                for (column, &(allele, quality)) in entries.iter().enumerate() {
                    read.add_variant(problem.positions[column], 'N', allele, quality)
                        .map_err(|_| PhasingError::UnphasableColumn { column })?;
                }
                haplotypes.push(read);
            }
            let haplotype2 = haplotypes.pop().unwrap_or_else(|| Read::new("", 0, individual_id));
            let haplotype1 = haplotypes.pop().unwrap_or_else(|| Read::new("", 0, individual_id));
            super_reads.push(SuperReadPair { individual_id, haplotype1, haplotype2 });
        }

        Ok(PedigreeDpTable {
            positions: problem.positions.clone(),
            total_cost,
            optimal_partitioning,
            optimal_transmission,
            super_reads
        })
    }

    // getters
    /// The optimal wMEC plus recombination cost
    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }

    /// The haplotype bit assigned to every input read
    pub fn optimal_partitioning(&self) -> &[u8] {
        &self.optimal_partitioning
    }

    /// The optimal transmission vector per column
    pub fn optimal_transmission_vectors(&self) -> &[usize] {
        &self.optimal_transmission
    }

    /// The reconstructed haplotype pair per individual, in pedigree order
    pub fn super_reads(&self) -> &[SuperReadPair] {
        &self.super_reads
    }

    /// The variant positions the super reads are defined over
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }
}

/// Super reads for an individual when there are no variant columns
fn empty_super_read_pair(pedigree: &Pedigree, individual: usize) -> SuperReadPair {
    let individual_id = pedigree.index_to_id(individual).unwrap_or(u32::MAX);
    SuperReadPair {
        individual_id,
        haplotype1: Read::new(&format!("superread_{individual_id}_hap1"), 60, individual_id),
        haplotype2: Read::new(&format!("superread_{individual_id}_hap2"), 60, individual_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::read_set::read_set_from_strings;

    fn het_pedigree(column_count: usize) -> Pedigree {
        let mut pedigree = Pedigree::new();
        pedigree.add_individual(0, vec![1; column_count], vec![None; column_count]).unwrap();
        pedigree
    }

    fn phase_single(matrix: &str, weights: &str) -> PedigreeDpTable {
        let read_set = read_set_from_strings(matrix, weights);
        let pedigree = het_pedigree(read_set.column_count());
        let recombination_costs = vec![1; read_set.column_count()];
        let config = PhasingConfig::default();
        PedigreeDpTable::new(&read_set, &recombination_costs, &pedigree, &config).unwrap()
    }

    #[test]
    fn test_perfect_split() {
        // two conflict-free haplotypes: no corrections needed
        let table = phase_single("111\n000", "111\n111");
        assert_eq!(table.total_cost(), 0);

        let partitioning = table.optimal_partitioning();
        assert_ne!(partitioning[0], partitioning[1]);

        let pair = &table.super_reads()[0];
        let hap1: Vec<i8> = pair.haplotype1.variants().map(|v| v.entry().allele().unwrap() as i8).collect();
        let hap2: Vec<i8> = pair.haplotype2.variants().map(|v| v.entry().allele().unwrap() as i8).collect();
        assert_ne!(hap1, hap2);
        assert!(hap1 == vec![1, 1, 1] || hap1 == vec![0, 0, 0]);
        assert_eq!(pair.haplotype1.variant_count(), 3);
    }

    #[test]
    fn test_single_error_correction() {
        // four reads supporting 111|000 with one flipped observation of weight 1
        let table = phase_single("111\n110\n000\n000", "111\n111\n111\n111");
        assert_eq!(table.total_cost(), 1);

        let partitioning = table.optimal_partitioning();
        assert_eq!(partitioning[0], partitioning[1]);
        assert_eq!(partitioning[2], partitioning[3]);
        assert_ne!(partitioning[0], partitioning[2]);
    }

    #[test]
    fn test_weights_drive_correction() {
        // keeping both reads on one haplotype costs a weight-1 correction at
        // column 1; splitting them would cost a weight-5 correction at column 0
        let table = phase_single("11\n10", "52\n51");
        assert_eq!(table.total_cost(), 1);

        let partitioning = table.optimal_partitioning();
        assert_eq!(partitioning[0], partitioning[1]);
    }

    #[test]
    fn test_super_read_quality_sums_evidence() {
        // three reads agree on column 0 allele 1 in one partition (weights 1+2),
        // opposing read in the other partition
        let table = phase_single("11\n11\n00", "12\n11\n33");
        assert_eq!(table.total_cost(), 0);

        let pair = &table.super_reads()[0];
        let (alt_hap, ref_hap) = if pair.haplotype1.variant(0).unwrap().entry().allele() == Some(1) {
            (&pair.haplotype1, &pair.haplotype2)
        } else {
            (&pair.haplotype2, &pair.haplotype1)
        };
        // ALT haplotype at column 0 is supported by weights 1 and 1 across reads 0 and 1
        assert_eq!(alt_hap.variant(0).unwrap().entry().quality(), Some(2));
        assert_eq!(ref_hap.variant(0).unwrap().entry().quality(), Some(3));
    }

    #[test]
    fn test_all_heterozygous_mode() {
        // both reads support ALT at both columns
        let read_set = read_set_from_strings("11\n11", "55\n55");
        let mut pedigree = Pedigree::new();
        pedigree.add_individual(0, vec![2, 2], vec![None, None]).unwrap();

        // with trusted genotypes (2 copies) both haplotypes end up ALT
        let config = PhasingConfig::default();
        let table = PedigreeDpTable::new(&read_set, &[1, 1], &pedigree, &config).unwrap();
        assert_eq!(table.total_cost(), 0);
        let pair = &table.super_reads()[0];
        assert_eq!(pair.haplotype1.variant(0).unwrap().entry().allele(), Some(1));
        assert_eq!(pair.haplotype2.variant(0).unwrap().entry().allele(), Some(1));

        // forcing heterozygosity keeps the reads on one haplotype and infers the
        // complementary alleles for the other, still at cost 0
        let config = PhasingConfigBuilder::default()
            .all_heterozygous(true)
            .build()
            .unwrap();
        let table = PedigreeDpTable::new(&read_set, &[1, 1], &pedigree, &config).unwrap();
        assert_eq!(table.total_cost(), 0);
        let pair = &table.super_reads()[0];
        let alleles: Vec<_> = [&pair.haplotype1, &pair.haplotype2].iter()
            .map(|h| h.variant(0).unwrap().entry().allele())
            .collect();
        assert!(alleles.contains(&Some(0)));
        assert!(alleles.contains(&Some(1)));
    }

    #[test]
    fn test_mendelian_conflict_is_unphasable() {
        // both parents are homozygous REF while the child is homozygous ALT:
        // the child's partitions are shared with its parents, so no allele
        // assignment can satisfy all genotypes at column 0
        let mut read_set = crate::data_types::read_set::ReadSet::new();
        for (row, sample) in [0u32, 1, 2].iter().enumerate() {
            let mut read = Read::new(&format!("read{row}"), 50, *sample);
            read.add_variant(10, 'N', 0, 10).unwrap();
            read_set.add(read).unwrap();
        }
        read_set.finalize().unwrap();

        let mut pedigree = Pedigree::new();
        pedigree.add_individual(0, vec![2], vec![None]).unwrap();
        pedigree.add_individual(1, vec![0], vec![None]).unwrap();
        pedigree.add_individual(2, vec![0], vec![None]).unwrap();
        pedigree.add_relationship(0, 1, 2).unwrap();

        let result = PedigreeDpTable::new(&read_set, &[1], &pedigree, &PhasingConfig::default());
        assert!(matches!(result, Err(PhasingError::UnphasableColumn { column: 0 })));
    }

    #[test]
    fn test_readset_too_dense() {
        let read_set = read_set_from_strings("1\n1\n1", "1\n1\n1");
        let pedigree = het_pedigree(1);
        let config = PhasingConfigBuilder::default()
            .max_coverage(2)
            .build()
            .unwrap();

        let result = PedigreeDpTable::new(&read_set, &[1], &pedigree, &config);
        assert!(matches!(
            result,
            Err(PhasingError::ReadsetTooDense { column: 0, coverage: 3, max_coverage: 2 })
        ));
    }

    #[test]
    fn test_pedigree_too_large() {
        let read_set = read_set_from_strings("1", "1");
        let mut pedigree = Pedigree::new();
        for id in 0..11 {
            pedigree.add_individual(id, vec![1], vec![None]).unwrap();
        }
        for trio in 0..5u32 {
            pedigree.add_relationship(trio * 2 + 1, trio * 2 + 2, 0).unwrap();
        }

        let result = PedigreeDpTable::new(&read_set, &[1], &pedigree, &PhasingConfig::default());
        assert!(matches!(
            result,
            Err(PhasingError::PedigreeTooLarge { trios: 5, max_trios: 4 })
        ));
    }

    #[test]
    fn test_recombination_cost_length() {
        let read_set = read_set_from_strings("11\n00", "11\n11");
        let pedigree = het_pedigree(2);
        let result = PedigreeDpTable::new(&read_set, &[1], &pedigree, &PhasingConfig::default());
        assert!(matches!(
            result,
            Err(PhasingError::RecombinationCostCount { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_trio_phasing() {
        // child reads agree with one maternal and one paternal haplotype
        let mut read_set = crate::data_types::read_set::ReadSet::default();
        let rows: [(&str, u32); 6] = [
            ("110", 1), ("001", 1), // mother haplotypes: 110 / 001
            ("101", 2), ("010", 2), // father haplotypes: 101 / 010
            ("110", 0), ("101", 0)  // child: maternal 110, paternal 101
        ];
        for (row, &(alleles, sample)) in rows.iter().enumerate() {
            let mut read = Read::new(&format!("read{row}"), 50, sample);
            for (i, symbol) in alleles.chars().enumerate() {
                read.add_variant((i as u32 + 1) * 10, 'N', symbol.to_digit(10).unwrap() as i8, 10).unwrap();
            }
            read_set.add(read).unwrap();
        }
        read_set.finalize().unwrap();

        let mut pedigree = Pedigree::new();
        // the child inherits 110 and 101, so its genotypes are 2, 1, 1
        pedigree.add_individual(0, vec![2, 1, 1], vec![None; 3]).unwrap();
        pedigree.add_individual(1, vec![1, 1, 1], vec![None; 3]).unwrap();
        pedigree.add_individual(2, vec![1, 1, 1], vec![None; 3]).unwrap();
        pedigree.add_relationship(0, 1, 2).unwrap();

        let table = PedigreeDpTable::new(&read_set, &[10, 10, 10], &pedigree, &PhasingConfig::default()).unwrap();
        assert_eq!(table.total_cost(), 0);

        // every column keeps the same transmission vector at cost 0
        let transmissions = table.optimal_transmission_vectors();
        assert!(transmissions.windows(2).all(|w| w[0] == w[1]));

        // the child haplotypes must match one haplotype of each parent
        let child = &table.super_reads()[pedigree.id_to_index(0).unwrap()];
        let child_haps: Vec<Vec<u8>> = [&child.haplotype1, &child.haplotype2].iter()
            .map(|hap| hap.variants().map(|v| v.entry().allele().unwrap()).collect())
            .collect();
        assert!(child_haps.contains(&vec![1, 1, 0]));
        assert!(child_haps.contains(&vec![1, 0, 1]));
    }

    #[test]
    fn test_empty_read_set() {
        let mut read_set = crate::data_types::read_set::ReadSet::new();
        read_set.finalize().unwrap();
        let pedigree = het_pedigree(0);

        let table = PedigreeDpTable::new(&read_set, &[], &pedigree, &PhasingConfig::default()).unwrap();
        assert_eq!(table.total_cost(), 0);
        assert_eq!(table.super_reads().len(), 1);
        assert_eq!(table.super_reads()[0].haplotype1.variant_count(), 0);
    }
}
