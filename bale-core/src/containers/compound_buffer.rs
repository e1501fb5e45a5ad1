use std::ops::Range;

use log::{debug, trace};

use crate::error::{BufferError, Result};

/// A storage type that can hold the content of many logical sub-buffers back to back. This trait decides how
/// sub-buffers are measured, copied into and out of the backing, and how new backings are allocated. Lengths
/// and positions are expressed in the units of the backing (e.g. bytes of a `String`, tuples of a `TupleView`).
///
/// All fallible operations must leave the backing unchanged when they return an error.
pub trait CompoundBacking: Sized {
    /// The borrowed type that gets appended as one sub-buffer
    type Logical: ?Sized;
    /// The owned type that a sub-buffer is materialized into
    type Owned;

    /// Current length of the backing
    fn len(&self) -> usize;
    /// Length of `value` once it is appended to a backing
    fn logical_len(value: &Self::Logical) -> usize;
    /// Appends `value` to the end of the backing
    fn try_append(&mut self, value: &Self::Logical) -> Result<()>;
    /// Copies the content in `range` out of the backing
    fn to_owned_range(&self, range: Range<usize>) -> Result<Self::Owned>;
    /// Creates a new, empty backing of the same flavor (element kind, allocation mode etc.) with room for
    /// `capacity` units
    fn empty_like(&self, capacity: usize) -> Result<Self>;
    /// Appends the content in `range` of `source` to the end of the backing
    fn try_append_range(&mut self, source: &Self, range: Range<usize>) -> Result<()>;
    /// Reserves room for `additional` more units
    fn try_reserve(&mut self, additional: usize) -> Result<()>;
    /// Removes all content while keeping the allocated memory
    fn clear(&mut self);
}

fn reserve_indices(indices: &mut Vec<usize>, capacity: usize) -> Result<()> {
    let additional = capacity.saturating_sub(indices.len());
    indices
        .try_reserve_exact(additional)
        .map_err(|_| BufferError::AllocationFailure {
            requested_bytes: capacity.saturating_mul(std::mem::size_of::<usize>()),
        })
}

/// A buffer that packs many variable-length sub-buffers into one contiguous backing `B`. Sub-buffer `i` covers
/// the range `sub_positions[i]..sub_positions[i] + sub_lengths[i]` of the backing. Appending a sub-buffer copies
/// its content to the end of the backing and records its position and length in two parallel index arrays,
/// which grow geometrically as needed.
///
/// A failed operation leaves the buffer in the state it had before the call.
#[derive(Debug, Clone)]
pub struct CompoundBuffer<B: CompoundBacking> {
    backing: B,
    sub_positions: Vec<usize>,
    sub_lengths: Vec<usize>,
    num_sub_buffers: usize,
}

impl<B: CompoundBacking> CompoundBuffer<B> {
    /// Creates an empty `CompoundBuffer` over `backing` with index arrays sized for `initial_capacity`
    /// sub-buffers. `backing` must be empty
    pub fn with_backing(initial_capacity: usize, backing: B) -> Result<Self> {
        if backing.len() != 0 {
            return Err(BufferError::invalid_argument(
                "backing of a new compound buffer must be empty, use from_parts for existing content",
            ));
        }
        let mut sub_positions = vec![];
        let mut sub_lengths = vec![];
        reserve_indices(&mut sub_positions, initial_capacity)?;
        reserve_indices(&mut sub_lengths, initial_capacity)?;
        sub_positions.resize(initial_capacity, 0);
        sub_lengths.resize(initial_capacity, 0);
        Ok(Self {
            backing,
            sub_positions,
            sub_lengths,
            num_sub_buffers: 0,
        })
    }

    /// Wraps existing content. The first `num_sub_buffers` entries of `sub_positions` and `sub_lengths` describe
    /// the sub-buffers, any further entries are spare capacity. Sub-buffers may overlap or leave gaps, but each
    /// one must lie within `backing`
    /// ```
    /// # use bale_core::containers::*;
    /// let buffer = CompoundStringBuffer::from_parts("abcdef".to_owned(), vec![4, 0], vec![2, 3], 2).unwrap();
    /// assert_eq!("ef", buffer.get_sub_string(0).unwrap());
    /// assert_eq!("abc", buffer.get_sub_string(1).unwrap());
    /// ```
    pub fn from_parts(
        backing: B,
        sub_positions: Vec<usize>,
        sub_lengths: Vec<usize>,
        num_sub_buffers: usize,
    ) -> Result<Self> {
        if sub_positions.len() != sub_lengths.len() {
            return Err(BufferError::invalid_argument(format!(
                "got {} sub-buffer positions but {} lengths",
                sub_positions.len(),
                sub_lengths.len()
            )));
        }
        if num_sub_buffers > sub_positions.len() {
            return Err(BufferError::invalid_argument(format!(
                "{} sub-buffers don't fit into index arrays of length {}",
                num_sub_buffers,
                sub_positions.len()
            )));
        }
        let backing_len = backing.len();
        let out_of_range = sub_positions
            .iter()
            .zip(sub_lengths.iter())
            .take(num_sub_buffers)
            .position(|(&position, &length)| {
                position
                    .checked_add(length)
                    .map_or(true, |end| end > backing_len)
            });
        if let Some(index) = out_of_range {
            return Err(BufferError::invalid_argument(format!(
                "sub-buffer {} at {} with length {} exceeds the backing length {}",
                index, sub_positions[index], sub_lengths[index], backing_len
            )));
        }
        Ok(Self {
            backing,
            sub_positions,
            sub_lengths,
            num_sub_buffers,
        })
    }

    /// Returns the backing and the index arrays of this buffer. The index arrays include spare capacity, only
    /// the first `num_sub_buffers` entries are meaningful
    pub fn into_parts(self) -> (B, Vec<usize>, Vec<usize>, usize) {
        (
            self.backing,
            self.sub_positions,
            self.sub_lengths,
            self.num_sub_buffers,
        )
    }

    pub fn num_sub_buffers(&self) -> usize {
        self.num_sub_buffers
    }

    pub fn is_empty(&self) -> bool {
        self.num_sub_buffers == 0
    }

    /// Number of sub-buffers that fit into the index arrays before they have to grow
    pub fn capacity(&self) -> usize {
        self.sub_positions.len()
    }

    /// Length of the backing, in the units of the backing
    pub fn total_buffer_size(&self) -> usize {
        self.backing.len()
    }

    /// Borrows the backing that holds the content of all sub-buffers
    pub fn backing_buffer(&self) -> &B {
        &self.backing
    }

    pub fn sub_positions(&self) -> &[usize] {
        &self.sub_positions[..self.num_sub_buffers]
    }

    pub fn sub_lengths(&self) -> &[usize] {
        &self.sub_lengths[..self.num_sub_buffers]
    }

    /// The range of the backing that sub-buffer `index` covers
    pub fn sub_range(&self, index: usize) -> Result<Range<usize>> {
        BufferError::check_index(index, self.num_sub_buffers)?;
        let start = self.sub_positions[index];
        Ok(start..start + self.sub_lengths[index])
    }

    /// Appends `value` as a new sub-buffer and returns its index
    pub fn append_sub_buffer(&mut self, value: &B::Logical) -> Result<usize> {
        let length = B::logical_len(value);
        let position = self.backing.len();
        let capacity = self.reserve_for_append()?;
        self.backing.try_append(value)?;
        Ok(self.record(position, length, capacity))
    }

    /// Appends a sub-buffer of length zero and returns its index
    pub fn append_empty_sub_buffer(&mut self) -> Result<usize> {
        let capacity = self.reserve_for_append()?;
        let position = self.backing.len();
        Ok(self.record(position, 0, capacity))
    }

    /// Makes sure that `record` can't fail and returns the capacity that `record` has to grow to. Only reserves
    /// memory, so the observable state stays the same
    fn reserve_for_append(&mut self) -> Result<usize> {
        if self.num_sub_buffers < self.capacity() {
            return Ok(self.capacity());
        }
        let min_capacity = self.num_sub_buffers + 1;
        let new_capacity = min_capacity.max(min_capacity.saturating_mul(3) / 2);
        debug!(
            "Growing compound buffer index arrays from {} to {} sub-buffers",
            self.capacity(),
            new_capacity
        );
        reserve_indices(&mut self.sub_positions, new_capacity)?;
        reserve_indices(&mut self.sub_lengths, new_capacity)?;
        Ok(new_capacity)
    }

    fn record(&mut self, position: usize, length: usize, new_capacity: usize) -> usize {
        let index = self.num_sub_buffers;
        if new_capacity > self.sub_positions.len() {
            self.sub_positions.resize(new_capacity, 0);
            self.sub_lengths.resize(new_capacity, 0);
        }
        self.sub_positions[index] = position;
        self.sub_lengths[index] = length;
        self.num_sub_buffers += 1;
        index
    }

    /// Returns a copy of the content of sub-buffer `index`
    pub fn get_sub_buffer(&self, index: usize) -> Result<B::Owned> {
        let range = self.sub_range(index)?;
        self.backing.to_owned_range(range)
    }

    /// Iterates over copies of all sub-buffers, in index order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Result<B::Owned>> + ExactSizeIterator + '_ {
        (0..self.num_sub_buffers).map(move |index| self.get_sub_buffer(index))
    }

    /// Creates a new `CompoundBuffer` that holds copies of the sub-buffers at `indices`, in that order. Indices
    /// may repeat. The new buffer has its own backing, so it is unaffected by later changes to this buffer
    /// ```
    /// # use bale_core::containers::*;
    /// let buffer = ["first", "second", "third"].iter().collect::<CompoundStringBuffer>();
    /// let subset = buffer.subset(&[2, 0]).unwrap();
    /// assert_eq!(2, subset.num_sub_buffers());
    /// assert_eq!("third", subset.get_sub_string(0).unwrap());
    /// assert_eq!("first", subset.get_sub_string(1).unwrap());
    /// ```
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        for &index in indices {
            BufferError::check_index(index, self.num_sub_buffers)?;
        }
        let total_length = indices
            .iter()
            .try_fold(0usize, |total, &index| {
                total.checked_add(self.sub_lengths[index])
            })
            .ok_or(BufferError::AllocationFailure {
                requested_bytes: usize::MAX,
            })?;
        trace!(
            "Extracting {} of {} sub-buffers ({} units)",
            indices.len(),
            self.num_sub_buffers,
            total_length
        );

        let mut backing = self.backing.empty_like(total_length)?;
        let mut sub_positions = Vec::with_capacity(indices.len());
        let mut sub_lengths = Vec::with_capacity(indices.len());
        for &index in indices {
            let position = self.sub_positions[index];
            let length = self.sub_lengths[index];
            sub_positions.push(backing.len());
            sub_lengths.push(length);
            backing.try_append_range(&self.backing, position..position + length)?;
        }
        Ok(Self {
            backing,
            sub_positions,
            sub_lengths,
            num_sub_buffers: indices.len(),
        })
    }

    /// Like [`subset`](Self::subset), for the contiguous index range `range`
    pub fn subset_range(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end {
            return Err(BufferError::invalid_argument(format!(
                "range {:?} is decreasing",
                range
            )));
        }
        if range.end > self.num_sub_buffers {
            return Err(BufferError::IndexOutOfBounds {
                index: range.end,
                len: self.num_sub_buffers,
            });
        }
        self.subset(&range.collect::<Vec<_>>())
    }

    /// Reserves room in the backing for `additional` more units
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.backing.try_reserve(additional)
    }

    /// Removes all sub-buffers. The index arrays and the backing keep their memory
    pub fn clear(&mut self) {
        self.backing.clear();
        self.num_sub_buffers = 0;
    }
}

impl<B: CompoundBacking + PartialEq> PartialEq for CompoundBuffer<B> {
    fn eq(&self, other: &Self) -> bool {
        self.backing == other.backing
            && self.sub_positions() == other.sub_positions()
            && self.sub_lengths() == other.sub_lengths()
    }
}
