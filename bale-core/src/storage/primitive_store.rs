use std::{fmt::Debug, ops::Range};

use float_ord::FloatOrd;
use itertools::{Itertools, MinMaxResult};
use log::debug;
use num_traits::AsPrimitive;

use super::raw_block::RawBlock;
use crate::{
    error::{BufferError, Result},
    layout::{convert_element, AllocationMode, ElementKind, PrimitiveElement},
};

/// Returns the number of bytes that `count` elements of `kind` occupy, or an `AllocationFailure` if that
/// number does not fit into a `usize`
fn size_in_bytes_of(kind: ElementKind, count: usize) -> Result<usize> {
    count
        .checked_mul(kind.size())
        .ok_or(BufferError::AllocationFailure {
            requested_bytes: usize::MAX,
        })
}

/// A resizable, contiguous store of primitive values of a single [`ElementKind`]. The element kind is chosen at
/// runtime and never changes. Values can be accessed through any [`PrimitiveElement`] type: Typed slice access
/// requires the exact type, element access converts between element kinds.
///
/// Memory is either a plain `Vec` or a cache-line aligned block from the global allocator, depending on the
/// [`AllocationMode`]. The two modes behave identically for every operation of this type; stores with equal
/// element kinds and equal values compare equal regardless of their allocation mode.
///
/// Growing beyond the current capacity allocates a new block, copies the existing elements over and then
/// releases the old block. If the allocation fails, the store is left unchanged.
pub struct PrimitiveStore {
    kind: ElementKind,
    len: usize,
    block: RawBlock,
}

impl PrimitiveStore {
    /// Allocates a new store holding `len` zero-initialized elements of the given `kind`
    /// ```
    /// # use bale_core::layout::*;
    /// # use bale_core::storage::*;
    /// let store = PrimitiveStore::allocate(ElementKind::F32, 4, AllocationMode::Direct).unwrap();
    /// assert_eq!(4, store.len());
    /// assert_eq!(&[0.0f32; 4], store.as_slice::<f32>().unwrap());
    /// ```
    pub fn allocate(kind: ElementKind, len: usize, mode: AllocationMode) -> Result<Self> {
        let mut store = Self::with_capacity(kind, len, mode)?;
        store.len = len;
        Ok(store)
    }

    /// Allocates a new empty store with room for at least `capacity` elements of the given `kind`
    pub fn with_capacity(kind: ElementKind, capacity: usize, mode: AllocationMode) -> Result<Self> {
        let block = RawBlock::zeroed(mode, size_in_bytes_of(kind, capacity)?)?;
        Ok(Self {
            kind,
            len: 0,
            block,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.block.mode()
    }

    /// Returns the number of elements in this store
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements this store can hold without reallocating
    pub fn capacity(&self) -> usize {
        self.block.capacity_in_bytes() / self.kind.size()
    }

    /// Returns the size in bytes of all elements in this store
    pub fn size_in_bytes(&self) -> usize {
        self.len * self.kind.size()
    }

    /// Returns the raw memory of all elements in this store, in native byte order. This is the layout that
    /// graphics APIs expect for vertex data, so it can be uploaded without any conversion
    pub fn as_bytes(&self) -> &[u8] {
        &self.block.as_bytes()[..self.size_in_bytes()]
    }

    fn check_kind<T: PrimitiveElement>(&self) -> Result<()> {
        if T::KIND != self.kind {
            Err(BufferError::invalid_argument(format!(
                "store holds elements of type {}, but they were accessed as {}",
                self.kind,
                T::KIND
            )))
        } else {
            Ok(())
        }
    }

    /// Typed view of all elements, without checking the element kind
    fn typed<S: PrimitiveElement>(&self) -> &[S] {
        debug_assert_eq!(S::KIND, self.kind);
        bytemuck::cast_slice(self.as_bytes())
    }

    /// Typed mutable view of the whole capacity, including the elements past `len`
    fn typed_capacity_mut<S: PrimitiveElement>(&mut self) -> &mut [S] {
        debug_assert_eq!(S::KIND, self.kind);
        let capacity_in_bytes = self.capacity() * self.kind.size();
        bytemuck::cast_slice_mut(&mut self.block.as_bytes_mut()[..capacity_in_bytes])
    }

    /// Returns all elements as a slice of `T`. Fails if `T` does not match the element kind of this store
    pub fn as_slice<T: PrimitiveElement>(&self) -> Result<&[T]> {
        self.check_kind::<T>()?;
        Ok(self.typed::<T>())
    }

    /// Returns all elements as a mutable slice of `T`. Fails if `T` does not match the element kind of this store
    pub fn as_mut_slice<T: PrimitiveElement>(&mut self) -> Result<&mut [T]> {
        self.check_kind::<T>()?;
        let len = self.len;
        Ok(&mut self.typed_capacity_mut::<T>()[..len])
    }

    /// Reads the element at `index`, converted into `T`
    /// ```
    /// # use bale_core::layout::*;
    /// # use bale_core::storage::*;
    /// let mut store = PrimitiveStore::allocate(ElementKind::I16, 2, AllocationMode::Managed).unwrap();
    /// store.set(1, -7i16).unwrap();
    /// assert_eq!(-7.0, store.get::<f64>(1).unwrap());
    /// assert!(store.get::<f64>(2).is_err());
    /// ```
    pub fn get<T: PrimitiveElement>(&self, index: usize) -> Result<T> {
        BufferError::check_index(index, self.len)?;
        match_element_kind!(self.kind, S => convert_element::<S, T>(self.typed::<S>()[index]))
    }

    /// Writes `value` at `index`, converting it into the element kind of this store. Fails without modifying the
    /// store if `index` is out of bounds or if `value` is not representable in the element kind
    pub fn set<T: PrimitiveElement>(&mut self, index: usize, value: T) -> Result<()> {
        BufferError::check_index(index, self.len)?;
        match_element_kind!(self.kind, S => {
            let converted = convert_element::<T, S>(value)?;
            self.typed_capacity_mut::<S>()[index] = converted;
            Ok(())
        })
    }

    pub fn get_f64(&self, index: usize) -> Result<f64> {
        self.get::<f64>(index)
    }

    pub fn set_f64(&mut self, index: usize, value: f64) -> Result<()> {
        self.set(index, value)
    }

    /// Returns a copy of all elements, converted to `f64`. Every element kind is exactly representable as `f64`
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match_element_kind!(self.kind, S => self.typed::<S>()
            .iter()
            .map(|&v| AsPrimitive::<f64>::as_(v))
            .collect())
    }

    /// Appends the elements in `range` to `target`, converted to `f64`. `range` must lie within `0..len`
    pub(crate) fn extend_f64_into(&self, range: Range<usize>, target: &mut Vec<f64>) {
        match_element_kind!(self.kind, S => target.extend(
            self.typed::<S>()[range]
                .iter()
                .map(|&v| AsPrimitive::<f64>::as_(v))
        ))
    }

    /// Makes sure that at least `required_len` elements fit into this store, over-allocating to amortize the
    /// cost of repeated growth
    fn grow_amortized(&mut self, required_len: usize) -> Result<()> {
        if required_len <= self.capacity() {
            return Ok(());
        }
        let new_capacity = required_len.max(required_len.saturating_mul(3) / 2);
        self.grow_exact(new_capacity)
    }

    fn grow_exact(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        debug!(
            "Growing {} store from {} to {} elements ({:?})",
            self.kind,
            self.capacity(),
            new_capacity,
            self.allocation_mode()
        );
        let new_size = size_in_bytes_of(self.kind, new_capacity)?;
        let used = self.size_in_bytes();
        self.block.grow(new_size, used)
    }

    /// Reserves capacity for exactly `additional` more elements
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(BufferError::AllocationFailure {
                requested_bytes: usize::MAX,
            })?;
        self.grow_exact(required)
    }

    /// Resizes this store to `new_len` elements. New elements are zero-initialized
    pub fn resize(&mut self, new_len: usize) -> Result<()> {
        if new_len > self.len {
            self.grow_amortized(new_len)?;
            let element_size = self.kind.size();
            let (old_end, new_end) = (self.len * element_size, new_len * element_size);
            // Truncating does not clear memory, so the region might contain stale values
            self.block.as_bytes_mut()[old_end..new_end].fill(0);
        }
        self.len = new_len;
        Ok(())
    }

    /// Shortens this store to `new_len` elements. Has no effect if `new_len` is not smaller than the current length.
    /// The capacity stays the same
    pub fn truncate(&mut self, new_len: usize) {
        if new_len < self.len {
            self.len = new_len;
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Appends all `values` to this store. `T` must match the element kind of this store
    pub fn extend_from_slice<T: PrimitiveElement>(&mut self, values: &[T]) -> Result<()> {
        self.check_kind::<T>()?;
        let old_len = self.len;
        let new_len = old_len
            .checked_add(values.len())
            .ok_or(BufferError::AllocationFailure {
                requested_bytes: usize::MAX,
            })?;
        self.grow_amortized(new_len)?;
        self.typed_capacity_mut::<T>()[old_len..new_len].copy_from_slice(values);
        self.len = new_len;
        Ok(())
    }

    /// Appends all `values` to this store, converting them into the element kind of this store. All values are
    /// converted before anything is written, so the store is unchanged if any value is not representable
    pub fn extend_converted<T: PrimitiveElement>(&mut self, values: &[T]) -> Result<()> {
        if T::KIND == self.kind {
            return self.extend_from_slice(values);
        }
        match_element_kind!(self.kind, S => {
            let converted = values
                .iter()
                .map(|value| convert_element::<T, S>(*value))
                .collect::<Result<Vec<S>>>()?;
            self.extend_from_slice(&converted)
        })
    }

    /// Appends the elements in `range` of `other` to this store, converting them if the element kinds differ
    pub fn extend_from_store(&mut self, other: &PrimitiveStore, range: Range<usize>) -> Result<()> {
        if range.start > range.end {
            return Err(BufferError::invalid_argument(format!(
                "range {:?} is decreasing",
                range
            )));
        }
        if range.end > other.len {
            return Err(BufferError::IndexOutOfBounds {
                index: range.end,
                len: other.len,
            });
        }
        match_element_kind!(other.kind, S => self.extend_converted(&other.typed::<S>()[range]))
    }

    /// Computes the minimum and maximum element of this store, ignoring `NaN` values and all elements equal
    /// to `missing_data_signal`. Returns `None` if no element remains
    pub fn extreme_values(&self, missing_data_signal: Option<f64>) -> Option<(f64, f64)> {
        let values = self.to_f64_vec();
        let minmax = values
            .into_iter()
            .filter(|value| !value.is_nan() && Some(*value) != missing_data_signal)
            .map(FloatOrd)
            .minmax();
        match minmax {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(value) => Some((value.0, value.0)),
            MinMaxResult::MinMax(min, max) => Some((min.0, max.0)),
        }
    }
}

impl Clone for PrimitiveStore {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            len: self.len,
            block: self.block.clone(),
        }
    }
}

impl PartialEq for PrimitiveStore {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.len == other.len
            && match_element_kind!(self.kind, S => self.typed::<S>() == other.typed::<S>())
    }
}

impl Debug for PrimitiveStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimitiveStore")
            .field("kind", &self.kind)
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("allocation_mode", &self.allocation_mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODES: [AllocationMode; 2] = [AllocationMode::Direct, AllocationMode::Managed];

    #[test]
    fn test_allocate_zeroed() {
        for mode in MODES.iter().copied() {
            for kind in ElementKind::ALL.iter().copied() {
                let store = PrimitiveStore::allocate(kind, 5, mode).unwrap();
                assert_eq!(kind, store.kind());
                assert_eq!(5, store.len());
                assert!(store.capacity() >= 5);
                assert_eq!(vec![0.0; 5], store.to_f64_vec());
                assert_eq!(5 * kind.size(), store.as_bytes().len());
            }
        }
    }

    #[test]
    fn test_typed_access_requires_matching_kind() {
        let store = PrimitiveStore::allocate(ElementKind::I32, 3, AllocationMode::Managed).unwrap();
        assert!(store.as_slice::<i32>().is_ok());
        assert!(matches!(
            store.as_slice::<f32>(),
            Err(BufferError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_get_set_converts() {
        for mode in MODES.iter().copied() {
            let mut store = PrimitiveStore::allocate(ElementKind::I8, 4, mode).unwrap();
            store.set(0, 12.0f64).unwrap();
            store.set(3, -100i32).unwrap();
            assert_eq!(12i8, store.get::<i8>(0).unwrap());
            assert_eq!(-100.0f32, store.get::<f32>(3).unwrap());
            assert!(matches!(
                store.set(1, 1000i32),
                Err(BufferError::InvalidArgument { .. })
            ));
            assert_eq!(0, store.get::<i8>(1).unwrap());
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let mut store = PrimitiveStore::allocate(ElementKind::F64, 2, AllocationMode::Direct).unwrap();
        assert!(store.get_f64(1).is_ok());
        assert_eq!(
            Err(BufferError::IndexOutOfBounds { index: 2, len: 2 }),
            store.get_f64(2)
        );
        assert_eq!(
            Err(BufferError::IndexOutOfBounds { index: 2, len: 2 }),
            store.set_f64(2, 1.0)
        );
    }

    #[test]
    fn test_extend_grows_and_keeps_content() {
        for mode in MODES.iter().copied() {
            let mut store = PrimitiveStore::with_capacity(ElementKind::F32, 2, mode).unwrap();
            let mut expected = vec![];
            for idx in 0..100 {
                let value = idx as f32 * 0.5;
                store.extend_from_slice(&[value]).unwrap();
                expected.push(value);
                assert_eq!(expected.as_slice(), store.as_slice::<f32>().unwrap());
            }
            assert!(store.capacity() >= 100);
        }
    }

    #[test]
    fn test_extend_converted_is_all_or_nothing() {
        let mut store = PrimitiveStore::allocate(ElementKind::I8, 1, AllocationMode::Direct).unwrap();
        let result = store.extend_converted(&[1i32, 2, 500]);
        assert!(result.is_err());
        assert_eq!(1, store.len());

        store.extend_converted(&[1i32, 2, 3]).unwrap();
        assert_eq!(&[0i8, 1, 2, 3], store.as_slice::<i8>().unwrap());
    }

    #[test]
    fn test_extend_from_store() {
        let mut source = PrimitiveStore::allocate(ElementKind::F64, 0, AllocationMode::Managed).unwrap();
        source.extend_from_slice(&[1.0f64, 2.0, 3.0, 4.0]).unwrap();

        let mut target = PrimitiveStore::allocate(ElementKind::I16, 0, AllocationMode::Direct).unwrap();
        target.extend_from_store(&source, 1..3).unwrap();
        assert_eq!(&[2i16, 3], target.as_slice::<i16>().unwrap());

        assert!(matches!(
            target.extend_from_store(&source, 2..5),
            Err(BufferError::IndexOutOfBounds { index: 5, len: 4 })
        ));
        assert_eq!(2, target.len());
    }

    #[test]
    fn test_resize_zeroes_stale_memory() {
        let mut store = PrimitiveStore::allocate(ElementKind::I32, 0, AllocationMode::Direct).unwrap();
        store.extend_from_slice(&[5i32, 6, 7]).unwrap();
        store.truncate(1);
        assert_eq!(&[5], store.as_slice::<i32>().unwrap());
        store.resize(3).unwrap();
        assert_eq!(&[5, 0, 0], store.as_slice::<i32>().unwrap());
    }

    #[test]
    fn test_modes_compare_equal() {
        let mut direct = PrimitiveStore::allocate(ElementKind::F32, 0, AllocationMode::Direct).unwrap();
        let mut managed =
            PrimitiveStore::allocate(ElementKind::F32, 0, AllocationMode::Managed).unwrap();
        for store in [&mut direct, &mut managed].iter_mut() {
            store.extend_from_slice(&[1.0f32, 2.0, 3.0]).unwrap();
            store.set(1, 7.5f32).unwrap();
            store.resize(5).unwrap();
        }
        assert_eq!(direct, managed);
        assert_eq!(direct.as_bytes(), managed.as_bytes());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut store = PrimitiveStore::allocate(ElementKind::I16, 2, AllocationMode::Direct).unwrap();
        let cloned = store.clone();
        store.set(0, 9i16).unwrap();
        assert_eq!(0, cloned.get::<i16>(0).unwrap());
        assert_eq!(AllocationMode::Direct, cloned.allocation_mode());
    }

    #[test]
    fn test_extreme_values() {
        let mut store = PrimitiveStore::allocate(ElementKind::F64, 0, AllocationMode::Managed).unwrap();
        assert_eq!(None, store.extreme_values(None));
        store
            .extend_from_slice(&[3.0f64, -9999.0, f64::NAN, -2.0, 8.0])
            .unwrap();
        assert_eq!(Some((-9999.0, 8.0)), store.extreme_values(None));
        assert_eq!(Some((-2.0, 8.0)), store.extreme_values(Some(-9999.0)));
    }

    #[test]
    fn test_capacity_overflow_is_allocation_failure() {
        for mode in [AllocationMode::Direct, AllocationMode::Managed].iter().copied() {
            for (kind, capacity) in [
                (ElementKind::F64, usize::MAX / 4),
                (ElementKind::I8, usize::MAX),
                (ElementKind::I16, usize::MAX / 2),
            ]
            .iter()
            .copied()
            {
                let result = PrimitiveStore::allocate(kind, capacity, mode);
                assert!(matches!(
                    result,
                    Err(BufferError::AllocationFailure { .. })
                ));
            }
        }
    }
}
