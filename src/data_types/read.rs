
use crate::data_types::entry::Entry;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ReadError {
    #[error("variant position {position} must be greater than the previous position {previous}")]
    UnorderedVariant { position: u32, previous: u32 },
    #[error("allele must be 0, 1, or -1 (got {allele})")]
    InvalidAllele { allele: i8 }
}

/// A single variant observation inside a read
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ReadVariant {
    /// The variant position on the chromosome
    position: u32,
    /// The sequenced base supporting the call
    base: char,
    /// The observation with its quality
    entry: Entry
}

impl ReadVariant {
    // getters
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn base(&self) -> char {
        self.base
    }

    pub fn entry(&self) -> Entry {
        self.entry
    }
}

/// A sequenced read reduced to its variant observations.
/// Positions are strictly increasing; alleles outside {0, 1, -1} are rejected.
/// Allele -1 marks a masked observation and is stored as a blank entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Read {
    /// Read name, unique within a read set
    name: String,
    /// Mapping quality of the source alignment
    mapping_quality: u8,
    /// Identifier of the individual this read was sequenced from
    sample_id: u32,
    /// The variant observations, sorted by position
    variants: Vec<ReadVariant>
}

impl Read {
    /// Creates an empty read.
    /// # Arguments
    /// * `name` - the read name
    /// * `mapping_quality` - mapping quality of the source alignment
    /// * `sample_id` - the individual this read belongs to; must match a pedigree id when phasing with a pedigree
    pub fn new(name: &str, mapping_quality: u8, sample_id: u32) -> Read {
        Read {
            name: name.to_string(),
            mapping_quality,
            sample_id,
            variants: vec![]
        }
    }

    /// Appends a variant observation to the read.
    /// # Arguments
    /// * `position` - variant position; must exceed the previous position
    /// * `base` - the sequenced base supporting the call
    /// * `allele` - 0 (REF), 1 (ALT), or -1 (masked)
    /// * `quality` - phred-scaled quality of the observation
    /// # Errors
    /// * if `position` is not strictly increasing
    /// * if `allele` is outside {0, 1, -1}
    pub fn add_variant(&mut self, position: u32, base: char, allele: i8, quality: u32) -> Result<(), ReadError> {
        if let Some(last) = self.variants.last() {
            if position <= last.position {
                return Err(ReadError::UnorderedVariant { position, previous: last.position });
            }
        }

        let entry = match allele {
            0 => Entry::RefAllele(quality),
            1 => Entry::AltAllele(quality),
            -1 => Entry::Blank,
            _ => return Err(ReadError::InvalidAllele { allele })
        };

        self.variants.push(ReadVariant { position, base, entry });
        Ok(())
    }

    /// Returns the number of variant observations
    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Returns the variant at the given index, if in bounds
    pub fn variant(&self, index: usize) -> Option<&ReadVariant> {
        self.variants.get(index)
    }

    /// Returns the first covered variant position, or None for an empty read
    pub fn first_position(&self) -> Option<u32> {
        self.variants.first().map(|v| v.position)
    }

    /// Returns the last covered variant position, or None for an empty read
    pub fn last_position(&self) -> Option<u32> {
        self.variants.last().map(|v| v.position)
    }

    /// Returns true if the read span covers the given position
    pub fn covers(&self, position: u32) -> bool {
        match (self.first_position(), self.last_position()) {
            (Some(first), Some(last)) => first <= position && position <= last,
            _ => false
        }
    }

    /// Iterates the variant observations in position order
    pub fn variants(&self) -> impl Iterator<Item = &ReadVariant> {
        self.variants.iter()
    }

    // getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapping_quality(&self) -> u8 {
        self.mapping_quality
    }

    pub fn sample_id(&self) -> u32 {
        self.sample_id
    }
}
