//! Untyped primitive storage. A [`PrimitiveStore`] holds elements of one [`ElementKind`](crate::layout::ElementKind)
//! that is only known at runtime, and a [`StoreFactory`] decides how the memory of new stores is obtained.

mod primitive_store;
pub use self::primitive_store::*;

mod raw_block;
pub use self::raw_block::DIRECT_ALIGNMENT;

mod store_factory;
pub use self::store_factory::*;
