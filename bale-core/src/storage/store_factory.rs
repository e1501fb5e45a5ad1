use super::PrimitiveStore;
use crate::{
    error::Result,
    layout::{AllocationMode, ElementKind, PrimitiveElement},
};

/// Creates [`PrimitiveStore`]s of a fixed element kind and allocation mode. This is the single point where
/// the allocation policy of a buffer hierarchy gets decided
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StoreFactory {
    kind: ElementKind,
    allocation_mode: AllocationMode,
}

impl StoreFactory {
    pub fn new(kind: ElementKind, allocation_mode: AllocationMode) -> Self {
        Self {
            kind,
            allocation_mode,
        }
    }

    /// Factory for stores of the element kind of `T`, using direct memory
    pub fn direct<T: PrimitiveElement>() -> Self {
        Self::new(T::KIND, AllocationMode::Direct)
    }

    /// Factory for stores of the element kind of `T`, using managed memory
    pub fn managed<T: PrimitiveElement>() -> Self {
        Self::new(T::KIND, AllocationMode::Managed)
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.allocation_mode
    }

    /// Creates a new store holding `len` zero-initialized elements
    /// ```
    /// # use bale_core::layout::*;
    /// # use bale_core::storage::*;
    /// let factory = StoreFactory::managed::<i32>();
    /// let store = factory.new_store(3).unwrap();
    /// assert_eq!(&[0, 0, 0], store.as_slice::<i32>().unwrap());
    /// assert_eq!(AllocationMode::Managed, store.allocation_mode());
    /// ```
    pub fn new_store(&self, len: usize) -> Result<PrimitiveStore> {
        PrimitiveStore::allocate(self.kind, len, self.allocation_mode)
    }

    /// Creates a new, empty store that can hold `capacity` elements before it has to grow
    pub fn new_store_with_capacity(&self, capacity: usize) -> Result<PrimitiveStore> {
        PrimitiveStore::with_capacity(self.kind, capacity, self.allocation_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_produces_configured_stores() {
        for kind in ElementKind::ALL.iter().copied() {
            for mode in [AllocationMode::Direct, AllocationMode::Managed].iter().copied() {
                let factory = StoreFactory::new(kind, mode);
                let store = factory.new_store(7).unwrap();
                assert_eq!(kind, store.kind());
                assert_eq!(mode, store.allocation_mode());
                assert_eq!(7, store.len());

                let empty = factory.new_store_with_capacity(16).unwrap();
                assert!(empty.is_empty());
                assert!(empty.capacity() >= 16);
            }
        }
    }

    #[test]
    fn test_typed_constructors() {
        assert_eq!(
            StoreFactory::new(ElementKind::F32, AllocationMode::Direct),
            StoreFactory::direct::<f32>()
        );
        assert_eq!(
            StoreFactory::new(ElementKind::I8, AllocationMode::Managed),
            StoreFactory::managed::<i8>()
        );
    }
}
