
use indexmap::IndexMap;

use crate::util::phred_to_error_prob;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PedigreeError {
    #[error("individual {id} was already added")]
    DuplicateIndividual { id: u32 },
    #[error("individual {id} is not part of the pedigree")]
    UnknownIndividual { id: u32 },
    #[error("individual {id} is already the child of a trio")]
    DuplicateChild { id: u32 },
    #[error("genotype {genotype} is not a valid ALT copy count")]
    InvalidGenotype { genotype: u8 },
    #[error("individual {id} has {likelihoods} genotype likelihood entries for {genotypes} genotypes")]
    LikelihoodCountMismatch { id: u32, genotypes: usize, likelihoods: usize },
    #[error("pedigree relationships contain a cycle")]
    CyclicPedigree
}

/// Phred-scaled likelihoods for the three biallelic genotypes (0, 1, 2 copies of ALT)
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PhredGenotypeLikelihoods {
    phred: [f64; 3]
}

impl PhredGenotypeLikelihoods {
    /// Constructor from phred-scaled values, smaller meaning more likely
    pub fn new(phred: [f64; 3]) -> Self {
        Self { phred }
    }

    /// Returns the linear-space likelihood for a genotype (0, 1, or 2)
    pub fn likelihood(&self, genotype: usize) -> f64 {
        10.0_f64.powf(-self.phred[genotype] / 10.0)
    }

    /// Returns the three likelihoods normalized to sum to one
    pub fn normalized(&self) -> [f64; 3] {
        let linear = [self.likelihood(0), self.likelihood(1), self.likelihood(2)];
        let total: f64 = linear.iter().sum();
        [linear[0] / total, linear[1] / total, linear[2] / total]
    }

    /// Builds likelihoods from a single phred-scaled genotyping error rate:
    /// the given genotype gets probability 1 - e, the other two e / 2 each.
    pub fn from_genotype(genotype: u8, error_quality: u32) -> Self {
        let error_prob = phred_to_error_prob(error_quality);
        let mut linear = [error_prob / 2.0; 3];
        linear[genotype as usize] = 1.0 - error_prob;
        Self {
            phred: linear.map(|p| -10.0 * p.log10())
        }
    }
}

/// One individual of the pedigree with its per-variant expected genotypes
#[derive(Clone, Debug)]
struct Individual {
    /// Expected number of ALT copies (0, 1, or 2) per variant
    genotypes: Vec<u8>,
    /// Optional genotype likelihoods per variant, parallel to `genotypes`
    genotype_likelihoods: Vec<Option<PhredGenotypeLikelihoods>>
}

/// A trio relationship, stored as indices into the individual list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trio {
    pub child: usize,
    pub mother: usize,
    pub father: usize
}

/// A pedigree: an insertion-ordered set of individuals plus trio relationships.
/// Individuals are referenced externally by id (matching `Read::sample_id`) and
/// internally by their insertion index.
#[derive(Clone, Debug, Default)]
pub struct Pedigree {
    individuals: IndexMap<u32, Individual>,
    trios: Vec<Trio>
}

impl Pedigree {
    /// Creates an empty pedigree
    pub fn new() -> Pedigree {
        Default::default()
    }

    /// Adds an individual with its expected genotypes and optional per-site likelihoods.
    /// # Arguments
    /// * `id` - external identifier, must be unique
    /// * `genotypes` - expected ALT copy count (0, 1, or 2) per variant
    /// * `genotype_likelihoods` - optional likelihoods, parallel to `genotypes`
    /// # Errors
    /// * if the id was already added, a genotype is out of range, or the lengths differ
    pub fn add_individual(
        &mut self, id: u32, genotypes: Vec<u8>, genotype_likelihoods: Vec<Option<PhredGenotypeLikelihoods>>
    ) -> Result<(), PedigreeError> {
        if self.individuals.contains_key(&id) {
            return Err(PedigreeError::DuplicateIndividual { id });
        }
        if let Some(&genotype) = genotypes.iter().find(|&&g| g > 2) {
            return Err(PedigreeError::InvalidGenotype { genotype });
        }
        if genotypes.len() != genotype_likelihoods.len() {
            return Err(PedigreeError::LikelihoodCountMismatch {
                id,
                genotypes: genotypes.len(),
                likelihoods: genotype_likelihoods.len()
            });
        }

        self.individuals.insert(id, Individual { genotypes, genotype_likelihoods });
        Ok(())
    }

    /// Adds a trio relationship by external ids.
    /// # Errors
    /// * if any id is unknown or the child already has parents
    pub fn add_relationship(&mut self, child_id: u32, mother_id: u32, father_id: u32) -> Result<(), PedigreeError> {
        let child = self.id_to_index(child_id).ok_or(PedigreeError::UnknownIndividual { id: child_id })?;
        let mother = self.id_to_index(mother_id).ok_or(PedigreeError::UnknownIndividual { id: mother_id })?;
        let father = self.id_to_index(father_id).ok_or(PedigreeError::UnknownIndividual { id: father_id })?;
        if self.trios.iter().any(|t| t.child == child) {
            return Err(PedigreeError::DuplicateChild { id: child_id });
        }

        self.trios.push(Trio { child, mother, father });
        Ok(())
    }

    /// Translates an external id into the individual index
    pub fn id_to_index(&self, id: u32) -> Option<usize> {
        self.individuals.get_index_of(&id)
    }

    /// Returns the external id of the individual at the given index
    pub fn index_to_id(&self, index: usize) -> Option<u32> {
        self.individuals.get_index(index).map(|(&id, _)| id)
    }

    /// Returns the expected genotype of an individual at a variant, if in bounds
    pub fn genotype(&self, individual: usize, variant: usize) -> Option<u8> {
        self.individuals.get_index(individual)
            .and_then(|(_, ind)| ind.genotypes.get(variant))
            .copied()
    }

    /// Returns the genotype likelihoods of an individual at a variant, if present
    pub fn genotype_likelihoods(&self, individual: usize, variant: usize) -> Option<&PhredGenotypeLikelihoods> {
        self.individuals.get_index(individual)
            .and_then(|(_, ind)| ind.genotype_likelihoods.get(variant))
            .and_then(|gl| gl.as_ref())
    }

    /// Returns the number of genotypes stored for an individual
    pub fn genotype_count(&self, individual: usize) -> usize {
        self.individuals.get_index(individual)
            .map(|(_, ind)| ind.genotypes.len())
            .unwrap_or(0)
    }

    /// Returns the number of individuals
    pub fn individual_count(&self) -> usize {
        self.individuals.len()
    }

    /// Returns the number of trio relationships
    pub fn triple_count(&self) -> usize {
        self.trios.len()
    }

    /// Returns the number of transmission vectors, 4 to the power of the trio count
    pub fn transmission_count(&self) -> usize {
        1_usize << (2 * self.triple_count())
    }

    /// Returns the trio relationships
    pub fn trios(&self) -> &[Trio] {
        &self.trios
    }

    /// Returns true if the individual is not the child of any trio
    pub fn is_founder(&self, individual: usize) -> bool {
        !self.trios.iter().any(|t| t.child == individual)
    }
}
