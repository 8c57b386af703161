
use crate::util::phred_to_error_prob;

/// Transition probabilities between transmission vectors across two neighboring
/// columns. A transmission vector carries two independent bits per trio, so the
/// probability of moving from `a` to `b` depends only on the number of flipped
/// bits `h = popcount(a XOR b)`:
///
/// `get(a, b) = p^h * (1 - p)^(2t - h) / n`
///
/// with `p` the per-bit recombination probability from the phred-scaled
/// recombination cost and `n` the caller-supplied normalization (the number of
/// transmission vectors). Every row then satisfies `sum_b get(a, b) * n = 1`.
/// With no trios the matrix is uniform `1/n`.
#[derive(Clone, Debug)]
pub struct TransitionProbabilityComputer {
    /// Probability per flipped-bit count, already divided by the normalization
    probability_by_flips: Vec<f64>
}

impl TransitionProbabilityComputer {
    /// Constructor.
    /// # Arguments
    /// * `recombination_cost` - phred-scaled cost of a single recombination event
    /// * `triple_count` - number of trios in the pedigree
    /// * `normalization` - number of transmission vectors, `4^triple_count`
    pub fn new(recombination_cost: u32, triple_count: usize, normalization: usize) -> Self {
        let recombination_prob = phred_to_error_prob(recombination_cost);
        let bit_count = 2 * triple_count;

        let probability_by_flips = (0..=bit_count)
            .map(|flips| {
                recombination_prob.powi(flips as i32)
                    * (1.0 - recombination_prob).powi((bit_count - flips) as i32)
                    / normalization as f64
            })
            .collect();

        Self { probability_by_flips }
    }

    /// Returns the transition probability from transmission vector `a` to `b`
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.probability_by_flips[(a ^ b).count_ones() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx_eq::assert_approx_eq;

    #[test]
    fn test_single_individual() {
        let trans = TransitionProbabilityComputer::new(10, 0, 4);
        assert_approx_eq!(trans.get(0, 0), 0.25);
    }

    #[test]
    fn test_one_trio() {
        let trans = TransitionProbabilityComputer::new(10, 1, 16);
        let expected = [0.9 * 0.9, 0.1 * 0.9, 0.1 * 0.1];

        for a in 0..4 {
            let mut row_sum = 0.0;
            for b in 0..4_usize {
                let flips = (a ^ b).count_ones() as usize;
                assert_approx_eq!(trans.get(a, b), expected[flips] / 16.0);
                row_sum += trans.get(a, b) * 16.0;
            }
            assert_approx_eq!(row_sum, 1.0);
        }
    }

    #[test]
    fn test_row_stochastic() {
        // rows sum to 1 (scaled by the normalization) for any recombination cost and size
        for (cost, trios) in [(1, 1), (15, 2), (30, 3)] {
            let size = 1 << (2 * trios);
            let trans = TransitionProbabilityComputer::new(cost, trios, size);
            for a in 0..size {
                let row_sum: f64 = (0..size).map(|b| trans.get(a, b)).sum();
                assert_approx_eq!(row_sum * size as f64, 1.0, 1e-9);
            }
        }
    }
}
