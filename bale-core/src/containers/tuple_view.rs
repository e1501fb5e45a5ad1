use std::ops::Range;

use nalgebra::Vector3;

use crate::{
    error::{BufferError, Result},
    layout::{convert_element, AllocationMode, ElementKind, PrimitiveElement},
    math::MinMax,
    storage::{PrimitiveStore, StoreFactory},
};

fn element_count(tuple_size: usize, tuple_count: usize) -> Result<usize> {
    tuple_size
        .checked_mul(tuple_count)
        .ok_or(BufferError::AllocationFailure {
            requested_bytes: usize::MAX,
        })
}

/// Interprets a [`PrimitiveStore`] as a sequence of tuples with `tuple_size` components each. Tuple `i` occupies
/// the elements `[i * tuple_size, (i + 1) * tuple_size)` of the store. Typical uses are 2D or 3D vertex
/// positions, normals or texture coordinates.
///
/// Tuples can be read and written using any [`PrimitiveElement`] type. Values are converted into the element
/// kind of the underlying store, e.g. a `TupleView` over `f32` elements can be filled from `f64` tuples.
/// ```
/// # use bale_core::containers::*;
/// let mut view = TupleViewFactory::float32(3).new_buffer(2).unwrap();
/// view.set_tuple(0, &[1.0f32, 2.0, 3.0]).unwrap();
/// view.set_tuple(1, &[4.0f64, 5.0, 6.0]).unwrap();
/// assert_eq!(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], view.elements::<f32>().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TupleView {
    tuple_size: usize,
    len: usize,
    store: PrimitiveStore,
}

impl TupleView {
    /// Creates a `TupleView` over an existing `store`. The length of `store` must be a multiple of `tuple_size`.
    /// Tuples of size zero are not supported here, since their count can't be derived from the store
    pub fn from_store(tuple_size: usize, store: PrimitiveStore) -> Result<Self> {
        if tuple_size == 0 || store.len() % tuple_size != 0 {
            return Err(BufferError::invalid_argument(format!(
                "a store with {} elements can't be split into tuples of size {}",
                store.len(),
                tuple_size
            )));
        }
        Ok(Self {
            tuple_size,
            len: store.len() / tuple_size,
            store,
        })
    }

    /// Creates a new `TupleView` with `tuple_count` zero-initialized tuples
    pub(crate) fn allocate(
        tuple_size: usize,
        factory: &StoreFactory,
        tuple_count: usize,
    ) -> Result<Self> {
        let store = factory.new_store(element_count(tuple_size, tuple_count)?)?;
        Ok(Self {
            tuple_size,
            len: tuple_count,
            store,
        })
    }

    /// Creates a new, empty `TupleView` that can hold `tuple_capacity` tuples before it has to grow
    pub(crate) fn with_capacity(
        tuple_size: usize,
        factory: &StoreFactory,
        tuple_capacity: usize,
    ) -> Result<Self> {
        let store = factory.new_store_with_capacity(element_count(tuple_size, tuple_capacity)?)?;
        Ok(Self {
            tuple_size,
            len: 0,
            store,
        })
    }

    /// Number of components per tuple
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    /// Number of tuples
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn element_kind(&self) -> ElementKind {
        self.store.kind()
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.store.allocation_mode()
    }

    /// The underlying store holding all tuple components back to back
    pub fn store(&self) -> &PrimitiveStore {
        &self.store
    }

    /// A `StoreFactory` that creates stores just like the one of this view
    pub fn store_factory(&self) -> StoreFactory {
        StoreFactory::new(self.store.kind(), self.store.allocation_mode())
    }

    /// All tuple components as a flat slice. `T` must match the element kind
    pub fn elements<T: PrimitiveElement>(&self) -> Result<&[T]> {
        self.store.as_slice::<T>()
    }

    /// The raw memory of all tuples, ready to be handed to APIs that expect interleaved vertex data
    pub fn as_bytes(&self) -> &[u8] {
        self.store.as_bytes()
    }

    fn element_range(&self, index: usize) -> Range<usize> {
        index * self.tuple_size..(index + 1) * self.tuple_size
    }

    fn check_arity(&self, components: usize) -> Result<()> {
        if components != self.tuple_size {
            Err(BufferError::invalid_argument(format!(
                "tuple has {} components, but the view expects {}",
                components, self.tuple_size
            )))
        } else {
            Ok(())
        }
    }

    pub(crate) fn check_range(&self, range: &Range<usize>) -> Result<()> {
        if range.start > range.end {
            return Err(BufferError::invalid_argument(format!(
                "range {:?} is decreasing",
                range
            )));
        }
        if range.end > self.len {
            return Err(BufferError::IndexOutOfBounds {
                index: range.end,
                len: self.len,
            });
        }
        Ok(())
    }

    /// Returns a copy of the tuple at `index`, converted into `T`
    pub fn get_tuple<T: PrimitiveElement>(&self, index: usize) -> Result<Vec<T>> {
        BufferError::check_index(index, self.len)?;
        self.element_range(index)
            .map(|element| self.store.get::<T>(element))
            .collect()
    }

    /// Borrows the tuple at `index`. Unlike [`get_tuple`](Self::get_tuple), `T` must match the element kind
    pub fn tuple<T: PrimitiveElement>(&self, index: usize) -> Result<&[T]> {
        BufferError::check_index(index, self.len)?;
        let elements = self.store.as_slice::<T>()?;
        Ok(&elements[self.element_range(index)])
    }

    /// Overwrites the tuple at `index` with `values`. The tuple is left unchanged if `values` has the wrong
    /// number of components or if any value is not representable in the element kind of this view
    pub fn set_tuple<T: PrimitiveElement>(&mut self, index: usize, values: &[T]) -> Result<()> {
        self.check_arity(values.len())?;
        BufferError::check_index(index, self.len)?;
        let range = self.element_range(index);
        match_element_kind!(self.store.kind(), S => {
            let converted = values
                .iter()
                .map(|&value| convert_element::<T, S>(value))
                .collect::<Result<Vec<S>>>()?;
            self.store.as_mut_slice::<S>()?[range].copy_from_slice(&converted);
            Ok(())
        })
    }

    /// Appends a new tuple and returns its index
    pub fn push_tuple<T: PrimitiveElement>(&mut self, values: &[T]) -> Result<usize> {
        self.check_arity(values.len())?;
        self.store.extend_converted(values)?;
        self.len += 1;
        Ok(self.len - 1)
    }

    /// Resizes this view to `tuple_count` tuples. New tuples are zero-initialized
    pub fn resize(&mut self, tuple_count: usize) -> Result<()> {
        self.store
            .resize(element_count(self.tuple_size, tuple_count)?)?;
        self.len = tuple_count;
        Ok(())
    }

    /// Reserves room for `additional` more tuples
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        self.store
            .reserve(element_count(self.tuple_size, additional)?)
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.len = 0;
    }

    /// Returns a new `TupleView` with copies of the tuples in `range`. The copy uses the same element kind and
    /// allocation mode as this view
    pub fn sub_view(&self, range: Range<usize>) -> Result<TupleView> {
        self.check_range(&range)?;
        let mut view =
            TupleView::with_capacity(self.tuple_size, &self.store_factory(), range.len())?;
        view.append_range(self, range)?;
        Ok(view)
    }

    /// Appends all tuples of `other` to this view. Both views need the same tuple size, their element kinds may
    /// differ
    pub fn append_view(&mut self, other: &TupleView) -> Result<()> {
        self.append_range(other, 0..other.len)
    }

    /// Appends the tuples in `range` of `other` to this view
    pub fn append_range(&mut self, other: &TupleView, range: Range<usize>) -> Result<()> {
        if other.tuple_size != self.tuple_size {
            return Err(BufferError::invalid_argument(format!(
                "can't append tuples of size {} to a view with tuple size {}",
                other.tuple_size, self.tuple_size
            )));
        }
        other.check_range(&range)?;
        let elements = range.start * self.tuple_size..range.end * self.tuple_size;
        self.store.extend_from_store(&other.store, elements)?;
        self.len += range.len();
        Ok(())
    }

    /// Iterates over all tuples as slices. `T` must match the element kind and the tuple size must not be zero
    pub fn tuples<T: PrimitiveElement>(&self) -> Result<std::slice::ChunksExact<'_, T>> {
        if self.tuple_size == 0 {
            return Err(BufferError::invalid_argument(
                "tuples of size 0 can't be iterated as slices",
            ));
        }
        Ok(self.store.as_slice::<T>()?.chunks_exact(self.tuple_size))
    }

    /// The tuple at `index` as `f64` values, padded with zeros to at least `min_coords` values. `index` must be
    /// smaller than `len`
    pub(crate) fn coords_unchecked(&self, index: usize, min_coords: usize) -> Vec<f64> {
        let mut coords = Vec::with_capacity(self.tuple_size.max(min_coords));
        self.store
            .extend_f64_into(self.element_range(index), &mut coords);
        if coords.len() < min_coords {
            coords.resize(min_coords, 0.0);
        }
        coords
    }

    /// Iterates over all tuples as `f64` coordinates. Tuples with fewer than `min_coords` components are padded
    /// with zeros, so that e.g. 2D positions can be consumed as 3D positions
    /// ```
    /// # use bale_core::containers::*;
    /// let mut view = TupleViewFactory::int16(2).new_buffer(0).unwrap();
    /// view.push_tuple(&[1i16, 2]).unwrap();
    /// view.push_tuple(&[3i16, 4]).unwrap();
    /// let coords = view.coords(3).rev().collect::<Vec<_>>();
    /// assert_eq!(vec![vec![3.0, 4.0, 0.0], vec![1.0, 2.0, 0.0]], coords);
    /// ```
    pub fn coords(
        &self,
        min_coords: usize,
    ) -> impl DoubleEndedIterator<Item = Vec<f64>> + ExactSizeIterator + '_ {
        (0..self.len).map(move |index| self.coords_unchecked(index, min_coords))
    }

    fn check_vector3(&self) -> Result<()> {
        if self.tuple_size != 3 {
            Err(BufferError::invalid_argument(format!(
                "tuples of size {} can't be read as 3D vectors",
                self.tuple_size
            )))
        } else {
            Ok(())
        }
    }

    /// Borrows the tuples in `range` as a flat slice of 3D vector components
    pub(crate) fn vector3_elements<T: PrimitiveElement>(&self, range: Range<usize>) -> Result<&[T]> {
        self.check_vector3()?;
        self.check_range(&range)?;
        let elements = self.store.as_slice::<T>()?;
        Ok(&elements[range.start * 3..range.end * 3])
    }

    /// Iterates over all tuples as `Vector3<T>`. Requires a tuple size of 3 and `T` matching the element kind
    pub fn vectors3<T: PrimitiveElement>(
        &self,
    ) -> Result<impl DoubleEndedIterator<Item = Vector3<T>> + ExactSizeIterator + '_> {
        Ok(as_vectors3(self.vector3_elements::<T>(0..self.len)?))
    }

    /// Computes the component-wise minimum and maximum of the tuples in `range`, or `None` if the range is empty
    pub fn bounds<T: PrimitiveElement>(
        &self,
        range: Range<usize>,
    ) -> Result<Option<(Vector3<T>, Vector3<T>)>> {
        let vectors = as_vectors3(self.vector3_elements::<T>(range)?);
        Ok(vectors.fold(None, |bounds, v| match bounds {
            None => Some((v.clone(), v)),
            Some((min, max)) => Some((min.infimum(&v), max.supremum(&v))),
        }))
    }
}

pub(crate) fn as_vectors3<T: PrimitiveElement>(
    elements: &[T],
) -> impl DoubleEndedIterator<Item = Vector3<T>> + ExactSizeIterator + '_ {
    elements
        .chunks_exact(3)
        .map(|components| Vector3::new(components[0], components[1], components[2]))
}
