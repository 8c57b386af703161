
use crate::data_types::read_set::{ReadSet, ReadSetError};

/// Per-column bookkeeping for the bipartition state space: which reads are active,
/// and how a bipartition projects onto the read intersections with the neighboring
/// columns. Projections compact the shared reads' bits to the low bits in
/// active-read order, so a projected value indexes the neighbor's shared state space.
#[derive(Clone, Debug)]
pub struct ColumnIndexingScheme {
    /// Read indices active in this column, ascending
    active_reads: Vec<usize>,
    /// Per active read: its bit within the intersection with the next column
    forward_bits: Vec<Option<u8>>,
    /// Per active read: its bit within the intersection with the previous column
    backward_bits: Vec<Option<u8>>,
    /// Number of reads shared with the next column
    forward_width: u8,
    /// Number of reads shared with the previous column
    backward_width: u8
}

impl ColumnIndexingScheme {
    fn new(active_reads: Vec<usize>) -> Self {
        let read_count = active_reads.len();
        Self {
            active_reads,
            forward_bits: vec![None; read_count],
            backward_bits: vec![None; read_count],
            forward_width: 0,
            backward_width: 0
        }
    }

    /// Builds the schemes for all columns of a finalized read set and links the
    /// projection maps between neighbors.
    /// # Errors
    /// * if the read set is not finalized
    pub fn build(read_set: &ReadSet) -> Result<Vec<ColumnIndexingScheme>, ReadSetError> {
        if !read_set.is_finalized() {
            return Err(ReadSetError::NotFinalized);
        }

        let mut schemes: Vec<ColumnIndexingScheme> = (0..read_set.column_count())
            .map(|column| ColumnIndexingScheme::new(read_set.active_reads(column).to_vec()))
            .collect();

        // link neighbors: shared reads get matching intersection bits on both sides
        for column in 1..schemes.len() {
            let (left, right) = schemes.split_at_mut(column);
            let previous = &mut left[column - 1];
            let current = &mut right[0];

            let mut shared_bit = 0u8;
            // both lists are ascending, walk them in lockstep
            let mut current_iter = current.active_reads.iter().enumerate().peekable();
            for (previous_slot, read) in previous.active_reads.iter().enumerate() {
                while let Some((_, &ahead)) = current_iter.peek() {
                    if ahead < *read {
                        current_iter.next();
                    } else {
                        break;
                    }
                }
                if let Some(&(current_slot, &ahead)) = current_iter.peek() {
                    if ahead == *read {
                        previous.forward_bits[previous_slot] = Some(shared_bit);
                        current.backward_bits[current_slot] = Some(shared_bit);
                        shared_bit += 1;
                        current_iter.next();
                    }
                }
            }
            previous.forward_width = shared_bit;
            current.backward_width = shared_bit;
        }

        Ok(schemes)
    }

    /// Projects a bipartition onto the intersection with the next column
    pub fn forward_projection(&self, partition: usize) -> usize {
        self.project(partition, &self.forward_bits)
    }

    /// Projects a bipartition onto the intersection with the previous column
    pub fn backward_projection(&self, partition: usize) -> usize {
        self.project(partition, &self.backward_bits)
    }

    fn project(&self, partition: usize, bits: &[Option<u8>]) -> usize {
        let mut projection = 0;
        for (slot, bit) in bits.iter().enumerate() {
            if let Some(bit) = bit {
                projection |= ((partition >> slot) & 1) << bit;
            }
        }
        projection
    }

    /// Returns the read indices active in this column, ascending
    pub fn active_reads(&self) -> &[usize] {
        &self.active_reads
    }

    /// Returns the number of active reads
    pub fn read_count(&self) -> usize {
        self.active_reads.len()
    }

    /// Returns the number of bipartitions, two to the power of the read count
    pub fn partition_count(&self) -> usize {
        1 << self.active_reads.len()
    }

    /// Returns the number of states shared with the next column
    pub fn forward_projection_count(&self) -> usize {
        1 << self.forward_width
    }

    /// Returns the number of states shared with the previous column
    pub fn backward_projection_count(&self) -> usize {
        1 << self.backward_width
    }
}

/// Enumerates all bipartitions of a column in binary-reflected Gray-code order, so
/// consecutive bipartitions differ in exactly one read. The iterator tracks the
/// projections onto both neighboring columns incrementally, one bit flip at a time.
pub struct ColumnIndexingIterator<'a> {
    scheme: &'a ColumnIndexingScheme,
    /// Enumeration step, `None` before the first `advance`
    index: Option<usize>,
    partition: usize,
    forward_projection: usize,
    backward_projection: usize
}

impl<'a> ColumnIndexingIterator<'a> {
    /// Creates an iterator positioned before the first bipartition
    pub fn new(scheme: &'a ColumnIndexingScheme) -> Self {
        Self {
            scheme,
            index: None,
            partition: 0,
            forward_projection: 0,
            backward_projection: 0
        }
    }

    /// Returns true while fewer than 2^k bipartitions have been yielded
    pub fn has_next(&self) -> bool {
        match self.index {
            None => true,
            Some(index) => index + 1 < self.scheme.partition_count()
        }
    }

    /// Moves to the next bipartition. Returns the flipped read's bit position and its
    /// new value, or `None` on the initial step where every bit is freshly zero.
    pub fn advance(&mut self) -> Option<(usize, u8)> {
        match self.index {
            None => {
                self.index = Some(0);
                // partition 0, projections 0: nothing flipped yet
                None
            },
            Some(index) => {
                let next_index = index + 1;
                debug_assert!(next_index < self.scheme.partition_count());

                // gray(i) ^ gray(i+1) is exactly the lowest set bit of i+1
                let flipped_bit = next_index.trailing_zeros() as usize;
                self.partition ^= 1 << flipped_bit;
                if let Some(bit) = self.scheme.forward_bits[flipped_bit] {
                    self.forward_projection ^= 1 << bit;
                }
                if let Some(bit) = self.scheme.backward_bits[flipped_bit] {
                    self.backward_projection ^= 1 << bit;
                }
                self.index = Some(next_index);

                let new_value = ((self.partition >> flipped_bit) & 1) as u8;
                Some((flipped_bit, new_value))
            }
        }
    }

    /// Returns the current enumeration step
    pub fn get_index(&self) -> usize {
        self.index.unwrap_or(0)
    }

    /// Returns the current bipartition as a bit vector over the active reads
    pub fn get_partition(&self) -> usize {
        self.partition
    }

    /// Returns the current bipartition projected onto the intersection with the next column
    pub fn get_forward_projection(&self) -> usize {
        self.forward_projection
    }

    /// Returns the current bipartition projected onto the intersection with the previous column
    pub fn get_backward_projection(&self) -> usize {
        self.backward_projection
    }

    /// Projects an arbitrary bipartition onto the next-column intersection without iterating to it
    pub fn index_forward_projection(&self, partition: usize) -> usize {
        self.scheme.forward_projection(partition)
    }

    /// Projects an arbitrary bipartition onto the previous-column intersection without iterating to it
    pub fn index_backward_projection(&self, partition: usize) -> usize {
        self.scheme.backward_projection(partition)
    }

    /// Returns the bipartition obtained from `partition` by moving the read at bit
    /// `read` to `new_value`, masked to the given used bits. This evaluates a single
    /// partition change outside the enumeration order.
    pub fn switch_read(&self, partition: usize, read: usize, new_value: usize, used_bits: usize) -> usize {
        ((partition & !(1 << read)) | ((new_value & 1) << read)) & used_bits
    }
}
