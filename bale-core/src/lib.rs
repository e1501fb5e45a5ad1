#![warn(clippy::all)]

//! Core data structures for packing many variable-length records into contiguous memory
//!
//! Bale stores strings or fixed-size numeric tuples (vertex positions, normals, texture coordinates) of many
//! logical records in one backing buffer, instead of allocating memory for each record on its own. The
//! [containers](crate::containers) module is the best place to get started, in particular the
//! [CompoundBuffer](crate::containers::CompoundBuffer) type. The primitive data types and the memory that
//! backs the buffers are described in the [layout](crate::layout) and [storage](crate::storage) modules.

#[macro_use]
mod macros;

pub extern crate nalgebra;

pub mod containers;
mod error;
pub use self::error::*;
/// Primitive element kinds and allocation modes
pub mod layout;
/// Math helpers for computing bounds of tuple data
pub mod math;
/// Type-tagged primitive stores and the factories that allocate them
pub mod storage;

#[cfg(test)]
mod test_utils;

static_assertions::assert_impl_all!(storage::PrimitiveStore: Send, Sync, Clone);
static_assertions::assert_impl_all!(containers::TupleView: Send, Sync, Clone);
static_assertions::assert_impl_all!(containers::CompoundStringBuffer: Send, Sync);
static_assertions::assert_impl_all!(containers::CompoundTupleBuffer: Send, Sync);
static_assertions::assert_impl_all!(BufferError: std::error::Error, Send, Sync);
