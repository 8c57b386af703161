
use rustc_hash::FxHashMap;

use crate::data_types::entry::Entry;
use crate::data_types::read::Read;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ReadSetError {
    #[error("read set is finalized and cannot be modified")]
    Finalized,
    #[error("read set must be finalized before use")]
    NotFinalized,
    #[error("column {column} is out of range for {count} columns")]
    ColumnOutOfRange { column: usize, count: usize }
}

/// An owning collection of reads over a shared set of variant positions.
/// The set is built with `add` and then frozen with `finalize`, which computes the
/// sorted union of variant positions, the per-read column maps, and the per-column
/// active read lists. After finalization the set is immutable.
#[derive(Clone, Debug, Default)]
pub struct ReadSet {
    reads: Vec<Read>,
    /// Sorted union of all variant positions; empty until finalized
    positions: Vec<u32>,
    /// Per read: global column index -> index into the read's variant list
    column_maps: Vec<FxHashMap<usize, usize>>,
    /// Per column: read indices whose span covers the column, ascending
    column_reads: Vec<Vec<usize>>,
    finalized: bool
}

impl ReadSet {
    /// Creates an empty read set
    pub fn new() -> ReadSet {
        Default::default()
    }

    /// Adds a read to the set.
    /// # Errors
    /// * if the set was already finalized
    pub fn add(&mut self, read: Read) -> Result<(), ReadSetError> {
        if self.finalized {
            return Err(ReadSetError::Finalized);
        }
        self.reads.push(read);
        Ok(())
    }

    /// Freezes the set: computes the sorted position union and the column lookup tables.
    /// Calling it twice is an error.
    /// # Errors
    /// * if the set was already finalized
    pub fn finalize(&mut self) -> Result<(), ReadSetError> {
        if self.finalized {
            return Err(ReadSetError::Finalized);
        }

        // sorted union of all observed positions
        let mut positions: Vec<u32> = self.reads.iter()
            .flat_map(|r| r.variants().map(|v| v.position()))
            .collect();
        positions.sort_unstable();
        positions.dedup();

        // per-read column maps and spans
        let mut column_maps = Vec::with_capacity(self.reads.len());
        let mut column_spans = Vec::with_capacity(self.reads.len());
        for read in self.reads.iter() {
            let mut column_map = FxHashMap::default();
            for (variant_index, variant) in read.variants().enumerate() {
                // positions are strictly increasing within a read, so this cannot collide
                let column = positions.binary_search(&variant.position()).unwrap();
                column_map.insert(column, variant_index);
            }

            let span = match (read.first_position(), read.last_position()) {
                (Some(first), Some(last)) => {
                    let first_column = positions.binary_search(&first).unwrap();
                    let last_column = positions.binary_search(&last).unwrap();
                    Some((first_column, last_column))
                },
                _ => None
            };

            column_maps.push(column_map);
            column_spans.push(span);
        }

        // per-column active reads; a read is active in every column its span covers
        let mut column_reads = vec![vec![]; positions.len()];
        for (read_index, span) in column_spans.iter().enumerate() {
            if let Some((first_column, last_column)) = span {
                for column in column_reads.iter_mut().take(last_column + 1).skip(*first_column) {
                    column.push(read_index);
                }
            }
        }

        self.positions = positions;
        self.column_maps = column_maps;
        self.column_reads = column_reads;
        self.finalized = true;
        Ok(())
    }

    /// Returns the sorted union of variant positions.
    /// # Errors
    /// * if the set is not finalized
    pub fn positions(&self) -> Result<&[u32], ReadSetError> {
        if !self.finalized {
            return Err(ReadSetError::NotFinalized);
        }
        Ok(&self.positions)
    }

    /// Returns the number of variant columns (0 until finalized)
    pub fn column_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the read indices active in the given column, ascending.
    /// Active means the read span covers the column position.
    pub(crate) fn active_reads(&self, column: usize) -> &[usize] {
        &self.column_reads[column]
    }

    /// Returns the entry of a read at a column: the observation if the read has one,
    /// blank if the read merely spans the column.
    pub(crate) fn entry_at(&self, read_index: usize, column: usize) -> Entry {
        match self.column_maps[read_index].get(&column) {
            Some(&variant_index) => self.reads[read_index].variant(variant_index)
                .map(|v| v.entry())
                .unwrap_or(Entry::Blank),
            None => Entry::Blank
        }
    }

    /// Returns true if `finalize` has been called
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Returns the number of reads
    pub fn len(&self) -> usize {
        self.reads.len()
    }

    /// Returns true if the set holds no reads
    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Returns the read at the given index, if in bounds
    pub fn get(&self, index: usize) -> Option<&Read> {
        self.reads.get(index)
    }

    /// Iterates the reads in insertion order
    pub fn reads(&self) -> impl Iterator<Item = &Read> {
        self.reads.iter()
    }
}

/// Builds a read set from a compact matrix notation: one row per read, one
/// character per column ('0' REF, '1' ALT, ' ' absent), with matching weights.
/// Positions are 10, 20, 30, ... as in the small hand-checked examples.
#[cfg(test)]
pub(crate) fn read_set_from_strings(matrix: &str, weights: &str) -> ReadSet {
    let mut read_set = ReadSet::new();
    for (row, (line, weight_line)) in matrix.lines().zip(weights.lines()).enumerate() {
        let mut read = Read::new(&format!("read{row}"), 50, 0);
        for (i, (symbol, weight)) in line.chars().zip(weight_line.chars()).enumerate() {
            if symbol == ' ' {
                continue;
            }
            let allele = symbol.to_digit(10).unwrap() as i8;
            let quality = weight.to_digit(10).unwrap();
            read.add_variant((i as u32 + 1) * 10, 'N', allele, quality).unwrap();
        }
        read_set.add(read).unwrap();
    }
    read_set.finalize().unwrap();
    read_set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_positions() {
        let read_set = read_set_from_strings("10 \n010\n000", "11 \n111\n111");
        assert_eq!(read_set.positions().unwrap(), &[10, 20, 30]);
        assert_eq!(read_set.column_count(), 3);
        assert_eq!(read_set.len(), 3);
    }

    #[test]
    fn test_active_reads_span() {
        // read 0 observes columns 0 and 1, so it is active in 0..=1 only
        let read_set = read_set_from_strings("10 \n010\n000", "11 \n111\n111");
        assert_eq!(read_set.active_reads(0), &[0, 1, 2]);
        assert_eq!(read_set.active_reads(1), &[0, 1, 2]);
        assert_eq!(read_set.active_reads(2), &[1, 2]);
    }

    #[test]
    fn test_entry_lookup() {
        let read_set = read_set_from_strings("1 1\n010", "1 1\n111");
        assert_eq!(read_set.entry_at(0, 0), Entry::AltAllele(1));
        // read 0 spans column 1 without an observation
        assert_eq!(read_set.entry_at(0, 1), Entry::Blank);
        assert_eq!(read_set.entry_at(0, 2), Entry::AltAllele(1));
        assert_eq!(read_set.entry_at(1, 1), Entry::AltAllele(1));
    }

    #[test]
    fn test_immutability_after_finalize() {
        let mut read_set = ReadSet::new();
        read_set.add(Read::new("read0", 50, 0)).unwrap();
        read_set.finalize().unwrap();

        assert_eq!(read_set.add(Read::new("read1", 50, 0)), Err(ReadSetError::Finalized));
        assert_eq!(read_set.finalize(), Err(ReadSetError::Finalized));
    }

    #[test]
    fn test_positions_require_finalize() {
        let read_set = ReadSet::new();
        assert_eq!(read_set.positions().unwrap_err(), ReadSetError::NotFinalized);
    }
}
