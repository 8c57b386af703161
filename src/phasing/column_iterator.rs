
use crate::data_types::entry::Entry;
use crate::data_types::read_set::{ReadSet, ReadSetError};

/// One read's entry within a column
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnEntry {
    /// Index of the read within its read set
    pub read_index: usize,
    /// The read's observation at this column, blank if it merely spans it
    pub entry: Entry
}

/// The view of a single variant column: the entries of all reads active there
pub type Column = Vec<ColumnEntry>;

fn build_column(read_set: &ReadSet, column: usize) -> Column {
    read_set.active_reads(column).iter()
        .map(|&read_index| ColumnEntry {
            read_index,
            entry: read_set.entry_at(read_index, column)
        })
        .collect()
}

/// Iterates the columns of a finalized read set from the first variant position to the last
pub struct ColumnIterator<'a> {
    read_set: &'a ReadSet,
    next_column: usize
}

impl<'a> ColumnIterator<'a> {
    /// Creates a forward column iterator over a finalized read set.
    /// # Errors
    /// * if the read set is not finalized
    pub fn new(read_set: &'a ReadSet) -> Result<Self, ReadSetError> {
        if !read_set.is_finalized() {
            return Err(ReadSetError::NotFinalized);
        }
        Ok(ColumnIterator {
            read_set,
            next_column: 0
        })
    }
}

impl Iterator for ColumnIterator<'_> {
    type Item = Column;

    fn next(&mut self) -> Option<Column> {
        if self.next_column >= self.read_set.column_count() {
            return None;
        }
        let column = build_column(self.read_set, self.next_column);
        self.next_column += 1;
        Some(column)
    }
}

/// Iterates the columns of a finalized read set from the last variant position to the first.
/// `jump_to_column` repositions the cursor so that the next `get_next` returns exactly
/// that column, regardless of any prior iteration state.
pub struct BackwardColumnIterator<'a> {
    read_set: &'a ReadSet,
    /// Column returned by the next `get_next`; `column_count` means exhausted
    next_column: usize
}

impl<'a> BackwardColumnIterator<'a> {
    /// Creates a backward column iterator positioned at the last column.
    /// # Errors
    /// * if the read set is not finalized
    pub fn new(read_set: &'a ReadSet) -> Result<Self, ReadSetError> {
        if !read_set.is_finalized() {
            return Err(ReadSetError::NotFinalized);
        }
        Ok(BackwardColumnIterator {
            read_set,
            next_column: read_set.column_count().saturating_sub(1)
        })
    }

    /// Returns true if `get_next` will yield a column
    pub fn has_next(&self) -> bool {
        self.next_column < self.read_set.column_count() && self.read_set.column_count() > 0
    }

    /// Yields the column under the cursor and moves the cursor one column towards the start
    pub fn get_next(&mut self) -> Option<Column> {
        if !self.has_next() {
            return None;
        }
        let column = build_column(self.read_set, self.next_column);
        if self.next_column == 0 {
            // exhausted, park the cursor past the end
            self.next_column = self.read_set.column_count();
        } else {
            self.next_column -= 1;
        }
        Some(column)
    }

    /// Repositions the cursor so that the next `get_next` returns column `column`.
    /// # Errors
    /// * if `column` is out of bounds
    pub fn jump_to_column(&mut self, column: usize) -> Result<(), ReadSetError> {
        if column >= self.read_set.column_count() {
            return Err(ReadSetError::ColumnOutOfRange {
                column,
                count: self.read_set.column_count()
            });
        }
        self.next_column = column;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_types::read_set::read_set_from_strings;

    /// Compares a column against its expected allele string, skipping blank entries
    /// the way the original matrix notation leaves gaps.
    fn assert_column_matches(column: &Column, expected: &str) {
        let observed: String = column.iter()
            .filter(|e| e.entry.is_observation())
            .map(|e| e.entry.to_string())
            .collect();
        assert_eq!(observed, expected);
    }

    const MATRICES: [(&str, &str, [&str; 3]); 3] = [
        ("10 \n010\n000", "11 \n111\n111", ["100", "010", "00"]),
        ("01 \n000\n111", "11 \n111\n111", ["001", "101", "01"]),
        ("0 1\n1 0\n 11", "1 1\n1 1\n 11", ["01", "1", "101"])
    ];

    #[test]
    fn test_forward_iteration() {
        for (matrix, weights, expected) in MATRICES.iter() {
            let read_set = read_set_from_strings(matrix, weights);
            let columns: Vec<Column> = ColumnIterator::new(&read_set).unwrap().collect();
            assert_eq!(columns.len(), 3);
            for (column, expected) in columns.iter().zip(expected.iter()) {
                assert_column_matches(column, expected);
            }
        }
    }

    #[test]
    fn test_backward_iteration() {
        for (matrix, weights, expected) in MATRICES.iter() {
            let read_set = read_set_from_strings(matrix, weights);
            let mut iterator = BackwardColumnIterator::new(&read_set).unwrap();

            // iterate back to front
            for j in (0..3).rev() {
                assert!(iterator.has_next());
                let column = iterator.get_next().unwrap();
                assert_column_matches(&column, expected[j]);
                assert_eq!(iterator.has_next(), j > 0);
            }
        }
    }

    #[test]
    fn test_jump_to_column() {
        for (matrix, weights, expected) in MATRICES.iter() {
            let read_set = read_set_from_strings(matrix, weights);
            let mut iterator = BackwardColumnIterator::new(&read_set).unwrap();

            // jumping must not depend on prior iteration state
            for j in (0..3).rev() {
                iterator.jump_to_column(j).unwrap();
                let column = iterator.get_next().unwrap();
                assert_column_matches(&column, expected[j]);
                assert_eq!(iterator.has_next(), j > 0);
            }

            // and front to back as well
            for j in 0..3 {
                iterator.jump_to_column(j).unwrap();
                let column = iterator.get_next().unwrap();
                assert_column_matches(&column, expected[j]);
            }

            assert!(iterator.jump_to_column(3).is_err());
        }
    }

    #[test]
    fn test_span_blanks() {
        // read 0 observes columns 0 and 2 and spans column 1 blank
        let read_set = read_set_from_strings("1 1\n010", "1 1\n111");
        let columns: Vec<Column> = ColumnIterator::new(&read_set).unwrap().collect();

        assert_eq!(columns[1].len(), 2);
        assert_eq!(columns[1][0], ColumnEntry { read_index: 0, entry: Entry::Blank });
        assert_eq!(columns[1][1], ColumnEntry { read_index: 1, entry: Entry::AltAllele(1) });
    }
}
