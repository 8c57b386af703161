
use log::debug;

use crate::data_types::pedigree::Pedigree;
use crate::data_types::read_set::ReadSet;
use crate::phasing::column_indexing::ColumnIndexingIterator;
use crate::phasing::column_iterator::BackwardColumnIterator;
use crate::phasing::dp_table::{PhasingConfig, PhasingError, PhasingProblem};
use crate::phasing::genotype_cost_computer::GenotypeColumnCostComputer;
use crate::phasing::transition_probability::TransitionProbabilityComputer;

/// The forward-backward genotyping DP.
///
/// Instead of constraining each column to the pedigree's expected genotypes, this
/// table sums over every per-partition allele assignment, weighted by the
/// individuals' genotype likelihood priors where available, and produces posterior
/// genotype likelihoods per individual and column. The forward pass stores one
/// scaled projection slice per column boundary; the backward pass walks the columns
/// in reverse through a `BackwardColumnIterator` and emits the posteriors on the fly.
#[derive(Clone, Debug, serde::Serialize)]
pub struct GenotypeDpTable {
    positions: Vec<u32>,
    /// Normalized posterior [P(0), P(1), P(2)], indexed [individual][column]
    genotype_likelihoods: Vec<Vec<[f64; 3]>>
}

impl GenotypeDpTable {
    /// Runs the forward-backward genotyping DP.
    /// # Arguments
    /// * `read_set` - finalized read set
    /// * `recombination_costs` - phred-scaled recombination cost per column
    /// * `pedigree` - pedigree; expected genotypes are ignored here, only the
    ///   genotype likelihoods act as priors
    /// * `config` - resource caps; the genotype constraint mode is not used
    /// # Errors
    /// * if validation fails or a column has zero total probability mass
    pub fn new(
        read_set: &ReadSet, recombination_costs: &[u32], pedigree: &Pedigree, config: &PhasingConfig
    ) -> Result<GenotypeDpTable, PhasingError> {
        let problem = PhasingProblem::build(read_set, pedigree, config)?;
        let column_count = problem.positions.len();
        if recombination_costs.len() != column_count {
            return Err(PhasingError::RecombinationCostCount {
                expected: column_count,
                actual: recombination_costs.len()
            });
        }

        let individual_count = pedigree.individual_count();
        if column_count == 0 {
            return Ok(GenotypeDpTable {
                positions: vec![],
                genotype_likelihoods: vec![vec![]; individual_count]
            });
        }

        let transmission_count = problem.transmission_count;
        let trios = pedigree.triple_count();
        debug!(
            "Genotyping {} columns over {} reads, {} transmission vectors",
            column_count, read_set.len(), transmission_count
        );

        let transitions: Vec<TransitionProbabilityComputer> = recombination_costs.iter()
            .map(|&cost| TransitionProbabilityComputer::new(cost, trios, transmission_count))
            .collect();

        // per-mask priors for every column and transmission
        let mask_priors = |column: usize, transmission: usize| -> Vec<f64> {
            let partitions = &problem.partitions[transmission];
            (0..1_usize << partitions.count())
                .map(|mask| (0..individual_count)
                    .map(|individual| match pedigree.genotype_likelihoods(individual, column) {
                        Some(likelihoods) => {
                            likelihoods.normalized()[partitions.genotype_of_mask(individual, mask) as usize]
                        },
                        None => 1.0
                    })
                    .product())
                .collect()
        };

        // forward pass: one scaled projection slice per column
        let mut forward_projections: Vec<Vec<f64>> = Vec::with_capacity(column_count);
        for column in 0..column_count {
            let scheme = &problem.schemes[column];
            let priors: Vec<Vec<f64>> = (0..transmission_count)
                .map(|transmission| mask_priors(column, transmission))
                .collect();

            let mut computers: Vec<GenotypeColumnCostComputer> = problem.partitions.iter()
                .map(|partitions| GenotypeColumnCostComputer::new(&problem.columns[column], &problem.read_sources, partitions))
                .collect();

            let projection_count = scheme.forward_projection_count();
            let mut projected = vec![0.0; projection_count * transmission_count];

            let mut iterator = ColumnIndexingIterator::new(scheme);
            while iterator.has_next() {
                if let Some((bit, _)) = iterator.advance() {
                    for computer in computers.iter_mut() {
                        computer.update_partitioning(bit);
                    }
                }
                let backward_projection = iterator.get_backward_projection();
                let forward_projection = iterator.get_forward_projection();

                for transmission in 0..transmission_count {
                    let emission: f64 = priors[transmission].iter().enumerate()
                        .map(|(mask, prior)| prior * computers[transmission].assignment_likelihood(mask))
                        .sum();

                    let incoming = if column == 0 {
                        1.0 / transmission_count as f64
                    } else {
                        let previous = &forward_projections[column - 1];
                        (0..transmission_count)
                            .map(|prev| previous[backward_projection * transmission_count + prev]
                                * transitions[column].get(prev, transmission))
                            .sum()
                    };

                    projected[forward_projection * transmission_count + transmission] += emission * incoming;
                }
            }

            // scale the slice to keep long runs away from the underflow range
            let total: f64 = projected.iter().sum();
            if total <= 0.0 {
                return Err(PhasingError::UnphasableColumn { column });
            }
            projected.iter_mut().for_each(|p| *p /= total);
            forward_projections.push(projected);
        }

        // backward pass, emitting posteriors per column
        let mut genotype_likelihoods = vec![vec![[0.0_f64; 3]; column_count]; individual_count];
        // message over (forward projection of the current column) x transmission
        let mut backward: Vec<f64> = vec![];
        let mut backward_iterator = BackwardColumnIterator::new(read_set)?;

        for column in (0..column_count).rev() {
            backward_iterator.jump_to_column(column)?;
            let column_entries = backward_iterator.get_next()
                .ok_or(PhasingError::UnphasableColumn { column })?;
            let scheme = &problem.schemes[column];
            let priors: Vec<Vec<f64>> = (0..transmission_count)
                .map(|transmission| mask_priors(column, transmission))
                .collect();

            let mut computers: Vec<GenotypeColumnCostComputer> = problem.partitions.iter()
                .map(|partitions| GenotypeColumnCostComputer::new(&column_entries, &problem.read_sources, partitions))
                .collect();

            let projection_count = scheme.backward_projection_count();
            let mut next_backward = vec![0.0; projection_count * transmission_count];

            let mut iterator = ColumnIndexingIterator::new(scheme);
            while iterator.has_next() {
                if let Some((bit, _)) = iterator.advance() {
                    for computer in computers.iter_mut() {
                        computer.update_partitioning(bit);
                    }
                }
                let backward_projection = iterator.get_backward_projection();
                let forward_projection = iterator.get_forward_projection();

                for transmission in 0..transmission_count {
                    // probability of everything right of this column; the transition
                    // across the boundary is already folded into the message
                    let outgoing = if column + 1 == column_count {
                        1.0
                    } else {
                        backward[forward_projection * transmission_count + transmission]
                    };
                    // probability of everything left of this column
                    let incoming = if column == 0 {
                        1.0 / transmission_count as f64
                    } else {
                        let previous = &forward_projections[column - 1];
                        (0..transmission_count)
                            .map(|prev| previous[backward_projection * transmission_count + prev]
                                * transitions[column].get(prev, transmission))
                            .sum()
                    };

                    let coefficient = incoming * outgoing;
                    let partitions = &problem.partitions[transmission];
                    let mut emission = 0.0;
                    for (mask, prior) in priors[transmission].iter().enumerate() {
                        let term = prior * computers[transmission].assignment_likelihood(mask);
                        emission += term;

                        // posterior mass of this assignment, per individual
                        let weighted = coefficient * term;
                        for (individual, posteriors) in genotype_likelihoods.iter_mut().enumerate() {
                            let genotype = partitions.genotype_of_mask(individual, mask);
                            posteriors[column][genotype as usize] += weighted;
                        }
                    }

                    // fold this column into the message for the next boundary to the left
                    if column > 0 {
                        let contribution = emission * outgoing;
                        for prev in 0..transmission_count {
                            next_backward[backward_projection * transmission_count + prev] +=
                                transitions[column].get(prev, transmission) * contribution;
                        }
                    }
                }
            }

            // normalize the posteriors of this column per individual
            for posteriors in genotype_likelihoods.iter_mut() {
                let total: f64 = posteriors[column].iter().sum();
                if total <= 0.0 {
                    return Err(PhasingError::UnphasableColumn { column });
                }
                posteriors[column].iter_mut().for_each(|p| *p /= total);
            }

            // scale the backward message like the forward slices
            if column > 0 {
                let total: f64 = next_backward.iter().sum();
                if total <= 0.0 {
                    return Err(PhasingError::UnphasableColumn { column });
                }
                next_backward.iter_mut().for_each(|p| *p /= total);
            }
            backward = next_backward;
        }

        Ok(GenotypeDpTable {
            positions: problem.positions.clone(),
            genotype_likelihoods
        })
    }

    /// Returns the posterior [P(0), P(1), P(2)] of an individual at a column
    pub fn genotype_likelihoods(&self, individual: usize, column: usize) -> Option<[f64; 3]> {
        self.genotype_likelihoods.get(individual)
            .and_then(|columns| columns.get(column))
            .copied()
    }

    /// Returns the maximum-posterior genotype of an individual at a column
    pub fn called_genotype(&self, individual: usize, column: usize) -> Option<u8> {
        self.genotype_likelihoods(individual, column).map(|posteriors| {
            posteriors.iter().enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(genotype, _)| genotype as u8)
                .unwrap_or(0)
        })
    }

    /// The variant positions the posteriors are defined over
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }
}
