use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use nalgebra::Scalar;
use num_traits::{AsPrimitive, NumCast, ToPrimitive};
use static_assertions::const_assert;

use crate::{
    error::{BufferError, Result},
    math::MinMax,
};

/// The primitive data types that a [`PrimitiveStore`](crate::storage::PrimitiveStore) can hold
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    I8,
    I16,
    I32,
    F32,
    F64,
}

impl ElementKind {
    /// All supported element kinds, ordered by their size
    pub const ALL: [ElementKind; 5] = [
        ElementKind::I8,
        ElementKind::I16,
        ElementKind::I32,
        ElementKind::F32,
        ElementKind::F64,
    ];

    /// Returns the size in bytes of a single element of this kind
    /// ```
    /// # use bale_core::layout::*;
    /// assert_eq!(2, ElementKind::I16.size());
    /// assert_eq!(8, ElementKind::F64.size());
    /// ```
    pub fn size(&self) -> usize {
        match self {
            ElementKind::I8 => 1,
            ElementKind::I16 => 2,
            ElementKind::I32 => 4,
            ElementKind::F32 => 4,
            ElementKind::F64 => 8,
        }
    }

    /// Returns `true` for the floating point kinds `F32` and `F64`
    pub fn is_floating_point(&self) -> bool {
        matches!(self, ElementKind::F32 | ElementKind::F64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::I8 => "i8",
            ElementKind::I16 => "i16",
            ElementKind::I32 => "i32",
            ElementKind::F32 => "f32",
            ElementKind::F64 => "f64",
        }
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementKind {
    type Err = BufferError;

    /// Parses the names returned by [`ElementKind::name`]
    fn from_str(s: &str) -> Result<Self> {
        ElementKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| BufferError::invalid_argument(format!("unknown element kind {}", s)))
    }
}

/// How the memory of a store is obtained
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllocationMode {
    /// A single block with cache-line alignment, taken directly from the global allocator. Intended for
    /// memory that gets handed to native or GPU APIs without a copy
    Direct,
    /// Ordinary `Vec` storage
    Managed,
}

impl Default for AllocationMode {
    fn default() -> Self {
        AllocationMode::Direct
    }
}

/// Trait that marks a Rust type as the static counterpart of one of the [`ElementKind`] variants. This allows
/// typed access to stores whose element kind is only known at runtime
pub trait PrimitiveElement:
    bytemuck::Pod
    + NumCast
    + ToPrimitive
    + AsPrimitive<f64>
    + Scalar
    + PartialOrd
    + MinMax
    + Default
    + Debug
    + Send
    + Sync
{
    const KIND: ElementKind;
}

macro_rules! impl_primitive_element {
    ($type:ty, $kind:ident) => {
        impl PrimitiveElement for $type {
            const KIND: ElementKind = ElementKind::$kind;
        }
    };
}

impl_primitive_element! {i8, I8}
impl_primitive_element! {i16, I16}
impl_primitive_element! {i32, I32}
impl_primitive_element! {f32, F32}
impl_primitive_element! {f64, F64}

// The raw memory of every store is 8-byte aligned, which must be enough for all element types
const_assert!(std::mem::align_of::<f64>() <= 8);
const_assert!(std::mem::size_of::<i16>() == 2);
const_assert!(std::mem::size_of::<i32>() == 4);
const_assert!(std::mem::size_of::<f32>() == 4);

/// Converts `value` into the primitive type `T`. Fails if the value is not representable in `T`, e.g. when
/// converting `300` into an `i8` or `NaN` into an integer type
/// ```
/// # use bale_core::layout::*;
/// assert_eq!(42i8, convert_element::<i32, i8>(42).unwrap());
/// assert!(convert_element::<i32, i8>(300).is_err());
/// ```
pub fn convert_element<S: PrimitiveElement, T: PrimitiveElement>(value: S) -> Result<T> {
    <T as NumCast>::from(value).ok_or_else(|| {
        BufferError::invalid_argument(format!(
            "value {:?} of type {} is not representable as {}",
            value,
            S::KIND,
            T::KIND
        ))
    })
}
