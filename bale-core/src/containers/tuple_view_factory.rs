use super::TupleView;
use crate::{
    error::Result,
    layout::{AllocationMode, ElementKind, PrimitiveElement},
    storage::StoreFactory,
};

/// Creates [`TupleView`]s with a fixed tuple size, element kind and allocation mode. The element kind is a
/// runtime value, so a single factory type covers all supported primitive types:
/// ```
/// # use bale_core::containers::*;
/// # use bale_core::layout::*;
/// for kind in ElementKind::ALL.iter().copied() {
///     let view = TupleViewFactory::for_kind(2, kind).new_buffer(8).unwrap();
///     assert_eq!(kind, view.element_kind());
///     assert_eq!(8, view.len());
/// }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TupleViewFactory {
    tuple_size: usize,
    store_factory: StoreFactory,
}

impl TupleViewFactory {
    pub fn new(tuple_size: usize, store_factory: StoreFactory) -> Self {
        Self {
            tuple_size,
            store_factory,
        }
    }

    /// Factory for tuples of `T` in direct memory
    pub fn of<T: PrimitiveElement>(tuple_size: usize) -> Self {
        Self::new(tuple_size, StoreFactory::direct::<T>())
    }

    /// Factory for tuples of the given element `kind` in direct memory
    pub fn for_kind(tuple_size: usize, kind: ElementKind) -> Self {
        Self::new(tuple_size, StoreFactory::new(kind, AllocationMode::Direct))
    }

    /// Returns a copy of this factory that allocates with the given `mode`
    pub fn with_allocation_mode(self, mode: AllocationMode) -> Self {
        Self::new(
            self.tuple_size,
            StoreFactory::new(self.store_factory.kind(), mode),
        )
    }

    pub fn int8(tuple_size: usize) -> Self {
        Self::of::<i8>(tuple_size)
    }

    pub fn int16(tuple_size: usize) -> Self {
        Self::of::<i16>(tuple_size)
    }

    pub fn int32(tuple_size: usize) -> Self {
        Self::of::<i32>(tuple_size)
    }

    pub fn float32(tuple_size: usize) -> Self {
        Self::of::<f32>(tuple_size)
    }

    pub fn float64(tuple_size: usize) -> Self {
        Self::of::<f64>(tuple_size)
    }

    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    pub fn element_kind(&self) -> ElementKind {
        self.store_factory.kind()
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.store_factory.allocation_mode()
    }

    /// Creates a new `TupleView` holding `tuple_count` zero-initialized tuples
    pub fn new_buffer(&self, tuple_count: usize) -> Result<TupleView> {
        TupleView::allocate(self.tuple_size, &self.store_factory, tuple_count)
    }

    /// Creates a new, empty `TupleView` with room for `tuple_capacity` tuples
    pub fn new_buffer_with_capacity(&self, tuple_capacity: usize) -> Result<TupleView> {
        TupleView::with_capacity(self.tuple_size, &self.store_factory, tuple_capacity)
    }
}

/// Creates a new `TupleView` of `tuple_count` zero-initialized tuples with `tuple_size` components of the given
/// element `kind`
/// ```
/// # use bale_core::containers::*;
/// # use bale_core::layout::*;
/// let view = new_tuple_buffer(3, ElementKind::F64, AllocationMode::Managed, 10).unwrap();
/// assert_eq!(30, view.store().len());
/// ```
pub fn new_tuple_buffer(
    tuple_size: usize,
    kind: ElementKind,
    mode: AllocationMode,
    tuple_count: usize,
) -> Result<TupleView> {
    TupleViewFactory::new(tuple_size, StoreFactory::new(kind, mode)).new_buffer(tuple_count)
}
