use std::ops::Range;

use nalgebra::Vector3;

use super::{tuple_view::as_vectors3, CompoundBacking, CompoundBuffer, TupleView, TupleViewFactory};
use crate::{
    error::{BufferError, Result},
    layout::{ElementKind, PrimitiveElement},
};

/// A [`CompoundBuffer`] that packs the tuples of many polylines or polygons into a single [`TupleView`].
/// Positions and lengths are measured in tuples, so they can be used directly as vertex offsets and counts
/// for draw calls:
/// ```
/// # use bale_core::containers::*;
/// let factory = TupleViewFactory::float32(2);
/// let mut buffer = CompoundTupleBuffer::new(factory, 2, 4).unwrap();
///
/// let mut triangle = factory.new_buffer(0).unwrap();
/// triangle.push_tuple(&[0.0f32, 0.0]).unwrap();
/// triangle.push_tuple(&[1.0f32, 0.0]).unwrap();
/// triangle.push_tuple(&[0.0f32, 1.0]).unwrap();
/// buffer.append_sub_buffer(&triangle).unwrap();
/// buffer.append_sub_buffer(&triangle).unwrap();
///
/// assert_eq!(vec![(0, 3), (3, 3)], buffer.draw_ranges().collect::<Vec<_>>());
/// assert_eq!(6 * 2 * 4, buffer.backing_buffer().as_bytes().len());
/// ```
pub type CompoundTupleBuffer = CompoundBuffer<TupleView>;

impl CompoundBacking for TupleView {
    type Logical = TupleView;
    type Owned = TupleView;

    fn len(&self) -> usize {
        TupleView::len(self)
    }

    fn logical_len(value: &TupleView) -> usize {
        value.len()
    }

    fn try_append(&mut self, value: &TupleView) -> Result<()> {
        self.append_view(value)
    }

    fn to_owned_range(&self, range: Range<usize>) -> Result<TupleView> {
        self.sub_view(range)
    }

    fn empty_like(&self, capacity: usize) -> Result<Self> {
        TupleView::with_capacity(self.tuple_size(), &self.store_factory(), capacity)
    }

    fn try_append_range(&mut self, source: &Self, range: Range<usize>) -> Result<()> {
        self.append_range(source, range)
    }

    fn try_reserve(&mut self, additional: usize) -> Result<()> {
        self.reserve(additional)
    }

    fn clear(&mut self) {
        TupleView::clear(self)
    }
}

impl CompoundBuffer<TupleView> {
    /// Creates an empty `CompoundTupleBuffer` for `initial_capacity` sub-buffers, presizing the backing for
    /// sub-buffers of about `sub_buffer_length` tuples each. Tuple size, element kind and allocation mode are
    /// taken from `factory`
    pub fn new(
        factory: TupleViewFactory,
        initial_capacity: usize,
        sub_buffer_length: usize,
    ) -> Result<Self> {
        let tuples = initial_capacity
            .checked_mul(sub_buffer_length)
            .ok_or(BufferError::AllocationFailure {
                requested_bytes: usize::MAX,
            })?;
        let backing = factory.new_buffer_with_capacity(tuples)?;
        Self::with_backing(initial_capacity, backing)
    }

    pub fn tuple_size(&self) -> usize {
        self.backing_buffer().tuple_size()
    }

    pub fn element_kind(&self) -> ElementKind {
        self.backing_buffer().element_kind()
    }

    /// Borrows the tuple components of sub-buffer `index` as a flat slice. `T` must match the element kind
    pub fn sub_elements<T: PrimitiveElement>(&self, index: usize) -> Result<&[T]> {
        let range = self.sub_range(index)?;
        let tuple_size = self.tuple_size();
        let elements = self.backing_buffer().elements::<T>()?;
        Ok(&elements[range.start * tuple_size..range.end * tuple_size])
    }

    /// Iterates over the tuples of all sub-buffers, in sub-buffer order, as `f64` coordinates padded with zeros
    /// to at least `min_coords` values
    pub fn coords(&self, min_coords: usize) -> impl DoubleEndedIterator<Item = Vec<f64>> + '_ {
        let backing = self.backing_buffer();
        self.sub_positions()
            .iter()
            .zip(self.sub_lengths().iter())
            .flat_map(move |(&position, &length)| {
                (position..position + length)
                    .map(move |index| backing.coords_unchecked(index, min_coords))
            })
    }

    /// Like [`coords`](Self::coords), starting with the last tuple of the last sub-buffer
    pub fn reverse_coords(&self, min_coords: usize) -> impl Iterator<Item = Vec<f64>> + '_ {
        self.coords(min_coords).rev()
    }

    /// Iterates over the tuples of all sub-buffers as `Vector3<T>`. Requires a tuple size of 3 and `T` matching
    /// the element kind
    pub fn vectors3<T: PrimitiveElement>(
        &self,
    ) -> Result<impl DoubleEndedIterator<Item = Vector3<T>> + '_> {
        let backing = self.backing_buffer();
        let elements = backing.vector3_elements::<T>(0..backing.len())?;
        Ok(self
            .sub_positions()
            .iter()
            .zip(self.sub_lengths().iter())
            .flat_map(move |(&position, &length)| {
                as_vectors3(&elements[position * 3..(position + length) * 3])
            }))
    }

    /// Component-wise minimum and maximum of the tuples of sub-buffer `index`, or `None` if it is empty
    pub fn sub_bounds<T: PrimitiveElement>(
        &self,
        index: usize,
    ) -> Result<Option<(Vector3<T>, Vector3<T>)>> {
        let range = self.sub_range(index)?;
        self.backing_buffer().bounds::<T>(range)
    }

    /// `(first, count)` pairs of all sub-buffers, as expected by multi-draw APIs
    pub fn draw_ranges(&self) -> impl ExactSizeIterator<Item = (usize, usize)> + '_ {
        self.sub_positions()
            .iter()
            .copied()
            .zip(self.sub_lengths().iter().copied())
    }
}
