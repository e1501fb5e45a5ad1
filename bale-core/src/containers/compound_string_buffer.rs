use std::{iter::FromIterator, ops::Range};

use super::{CompoundBacking, CompoundBuffer};
use crate::error::{BufferError, Result};

/// A [`CompoundBuffer`] that packs many strings into one `String`. Positions and lengths are measured in bytes.
/// Leading and trailing whitespace is stripped when a sub-string is read, but kept in the backing
/// ```
/// # use bale_core::containers::*;
/// let mut buffer = CompoundStringBuffer::new(4, 8).unwrap();
/// buffer.append_sub_buffer("  Point A  ").unwrap();
/// buffer.append_sub_buffer("Point B").unwrap();
/// assert_eq!("Point A", buffer.get_sub_string(0).unwrap());
/// assert_eq!(18, buffer.total_buffer_size());
/// ```
pub type CompoundStringBuffer = CompoundBuffer<String>;

fn str_range(content: &str, range: Range<usize>) -> Result<&str> {
    content.get(range.clone()).ok_or_else(|| {
        BufferError::invalid_argument(format!(
            "range {:?} is not on character boundaries of a string with {} bytes",
            range,
            content.len()
        ))
    })
}

fn try_reserve_bytes(content: &mut String, additional: usize) -> Result<()> {
    content
        .try_reserve(additional)
        .map_err(|_| BufferError::AllocationFailure {
            requested_bytes: additional,
        })
}

impl CompoundBacking for String {
    type Logical = str;
    type Owned = String;

    fn len(&self) -> usize {
        String::len(self)
    }

    fn logical_len(value: &str) -> usize {
        value.len()
    }

    fn try_append(&mut self, value: &str) -> Result<()> {
        try_reserve_bytes(self, value.len())?;
        self.push_str(value);
        Ok(())
    }

    fn to_owned_range(&self, range: Range<usize>) -> Result<String> {
        Ok(str_range(self, range)?.trim().to_owned())
    }

    fn empty_like(&self, capacity: usize) -> Result<Self> {
        let mut content = String::new();
        try_reserve_bytes(&mut content, capacity)?;
        Ok(content)
    }

    fn try_append_range(&mut self, source: &Self, range: Range<usize>) -> Result<()> {
        let value = str_range(source, range)?;
        self.try_append(value)
    }

    fn try_reserve(&mut self, additional: usize) -> Result<()> {
        try_reserve_bytes(self, additional)
    }

    fn clear(&mut self) {
        String::clear(self)
    }
}

impl CompoundBuffer<String> {
    /// Creates an empty `CompoundStringBuffer` for `initial_capacity` strings, presizing the backing for strings of
    /// about `sub_sequence_length` bytes each
    pub fn new(initial_capacity: usize, sub_sequence_length: usize) -> Result<Self> {
        let bytes = initial_capacity
            .checked_mul(sub_sequence_length)
            .ok_or(BufferError::AllocationFailure {
                requested_bytes: usize::MAX,
            })?;
        let mut backing = String::new();
        try_reserve_bytes(&mut backing, bytes)?;
        Self::with_backing(initial_capacity, backing)
    }

    /// Returns a trimmed copy of the sub-string at `index`
    pub fn get_sub_string(&self, index: usize) -> Result<String> {
        self.get_sub_buffer(index)
    }

    /// Borrows the trimmed sub-string at `index`
    pub fn sub_str(&self, index: usize) -> Result<&str> {
        let range = self.sub_range(index)?;
        Ok(str_range(self.backing_buffer(), range)?.trim())
    }

    /// Iterates over all trimmed sub-strings. Sub-strings that don't lie on character boundaries, which is only
    /// possible for buffers built with `from_parts`, are skipped
    pub fn sub_strs(&self) -> impl Iterator<Item = &str> + '_ {
        (0..self.num_sub_buffers()).filter_map(move |index| self.sub_str(index).ok())
    }
}

/// # Panics
///
/// Panics if the backing string can't grow, like `String` does in this situation
impl<S: AsRef<str>> Extend<S> for CompoundBuffer<String> {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for value in iter {
            if let Err(err) = self.append_sub_buffer(value.as_ref()) {
                panic!("Could not append sub-string: {}", err);
            }
        }
    }
}

impl<S: AsRef<str>> FromIterator<S> for CompoundBuffer<String> {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower_bound, _) = iter.size_hint();
        let mut buffer = match Self::new(lower_bound, 0) {
            Ok(buffer) => buffer,
            Err(err) => panic!("Could not create CompoundStringBuffer: {}", err),
        };
        buffer.extend(iter);
        buffer
    }
}
