
/// Simple enum to restrict things to the first or second haplotype of an individual
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Haplotype {
    Hap1,
    Hap2
}

impl Haplotype {
    /// Converts into the bit value used by bipartitions and partition maps
    pub fn to_bit(&self) -> usize {
        match self {
            Haplotype::Hap1 => 0,
            Haplotype::Hap2 => 1,
        }
    }
}

/// A single observation of a read at a variant column
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, serde::Serialize)]
pub enum Entry {
    /// The read supports the reference allele with the given phred-scaled quality
    RefAllele(u32),
    /// The read supports the alternate allele with the given phred-scaled quality
    AltAllele(u32),
    /// The read spans the column without a usable observation; contributes nothing to any cost
    Blank
}

impl Entry {
    /// Returns the observed allele (0 for REF, 1 for ALT), or None for a blank entry
    pub fn allele(&self) -> Option<u8> {
        match self {
            Entry::RefAllele(_) => Some(0),
            Entry::AltAllele(_) => Some(1),
            Entry::Blank => None,
        }
    }

    /// Returns the phred-scaled quality of the observation, or None for a blank entry
    pub fn quality(&self) -> Option<u32> {
        match self {
            Entry::RefAllele(quality) |
            Entry::AltAllele(quality) => Some(*quality),
            Entry::Blank => None,
        }
    }

    /// Returns true if this entry carries an observation
    pub fn is_observation(&self) -> bool {
        !matches!(self, Entry::Blank)
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::RefAllele(_) => write!(f, "0"),
            Entry::AltAllele(_) => write!(f, "1"),
            Entry::Blank => write!(f, "-"),
        }
    }
}
