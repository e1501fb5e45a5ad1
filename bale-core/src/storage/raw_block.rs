use std::{
    alloc::{self, Layout},
    ptr::NonNull,
};

use crate::{
    error::{BufferError, Result},
    layout::AllocationMode,
};

/// Alignment of direct allocations. One cache line, which also satisfies the alignment requirements of
/// common GPU upload paths
pub const DIRECT_ALIGNMENT: usize = 64;

/// An untyped, fully initialized block of bytes that is at least 8-byte aligned, so that it can be
/// reinterpreted as a slice of any [`PrimitiveElement`](crate::layout::PrimitiveElement) type
pub(crate) enum RawBlock {
    /// `u64` words guarantee the 8-byte alignment
    Managed(Vec<u64>),
    Direct(DirectBlock),
}

impl RawBlock {
    /// Allocates a new zeroed block with room for at least `size_in_bytes` bytes
    pub(crate) fn zeroed(mode: AllocationMode, size_in_bytes: usize) -> Result<Self> {
        match mode {
            AllocationMode::Managed => {
                let num_words = size_in_bytes
                    .checked_add(7)
                    .ok_or(BufferError::AllocationFailure {
                        requested_bytes: size_in_bytes,
                    })?
                    / 8;
                let mut words = Vec::new();
                words
                    .try_reserve_exact(num_words)
                    .map_err(|_| BufferError::AllocationFailure {
                        requested_bytes: size_in_bytes,
                    })?;
                words.resize(num_words, 0);
                Ok(RawBlock::Managed(words))
            }
            AllocationMode::Direct => DirectBlock::zeroed(size_in_bytes).map(RawBlock::Direct),
        }
    }

    pub(crate) fn mode(&self) -> AllocationMode {
        match self {
            RawBlock::Managed(_) => AllocationMode::Managed,
            RawBlock::Direct(_) => AllocationMode::Direct,
        }
    }

    pub(crate) fn capacity_in_bytes(&self) -> usize {
        match self {
            RawBlock::Managed(words) => words.len() * 8,
            RawBlock::Direct(block) => block.size,
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        match self {
            RawBlock::Managed(words) => bytemuck::cast_slice(words.as_slice()),
            RawBlock::Direct(block) => block.as_bytes(),
        }
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            RawBlock::Managed(words) => bytemuck::cast_slice_mut(words.as_mut_slice()),
            RawBlock::Direct(block) => block.as_bytes_mut(),
        }
    }

    /// Replaces this block with a new block of at least `new_size_in_bytes` bytes, carrying over the first
    /// `used_bytes` bytes. The old block is released only after the copy has completed. If the new block
    /// can't be allocated, `self` is left untouched
    pub(crate) fn grow(&mut self, new_size_in_bytes: usize, used_bytes: usize) -> Result<()> {
        let mut new_block = RawBlock::zeroed(self.mode(), new_size_in_bytes)?;
        new_block.as_bytes_mut()[..used_bytes].copy_from_slice(&self.as_bytes()[..used_bytes]);
        *self = new_block;
        Ok(())
    }
}

impl Clone for RawBlock {
    fn clone(&self) -> Self {
        match self {
            RawBlock::Managed(words) => RawBlock::Managed(words.clone()),
            RawBlock::Direct(block) => RawBlock::Direct(block.clone()),
        }
    }
}

/// Heap memory obtained directly from the global allocator with [`DIRECT_ALIGNMENT`]
pub(crate) struct DirectBlock {
    ptr: NonNull<u8>,
    size: usize,
}

impl DirectBlock {
    fn layout(size: usize) -> Result<Layout> {
        Layout::from_size_align(size, DIRECT_ALIGNMENT).map_err(|_| BufferError::AllocationFailure {
            requested_bytes: size,
        })
    }

    fn dangling() -> NonNull<u8> {
        // Safe because DIRECT_ALIGNMENT is not zero. An aligned dangling pointer keeps empty slices castable
        // to every element type
        unsafe { NonNull::new_unchecked(DIRECT_ALIGNMENT as *mut u8) }
    }

    fn zeroed(size: usize) -> Result<Self> {
        if size == 0 {
            return Ok(Self {
                ptr: Self::dangling(),
                size: 0,
            });
        }
        let layout = Self::layout(size)?;
        // Safe because layout has a non-zero size
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or(BufferError::AllocationFailure {
            requested_bytes: size,
        })?;
        Ok(Self { ptr, size })
    }

    fn as_bytes(&self) -> &[u8] {
        // Safe because the block owns `size` initialized bytes (alloc_zeroed), or `size` is zero
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        // Safe for the same reasons as `as_bytes`, and `&mut self` guarantees exclusive access
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }
}

impl Clone for DirectBlock {
    fn clone(&self) -> Self {
        if self.size == 0 {
            return Self {
                ptr: Self::dangling(),
                size: 0,
            };
        }
        // The layout was valid when self was allocated, so it is valid now
        let layout = match Self::layout(self.size) {
            Ok(layout) => layout,
            Err(_) => unreachable!("layout of an existing DirectBlock is always valid"),
        };
        let ptr = unsafe { alloc::alloc(layout) };
        let ptr = match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => alloc::handle_alloc_error(layout),
        };
        // alloc() returns uninitialized memory, so write through the raw pointer before any slice is formed
        unsafe {
            std::ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.size);
        }
        Self {
            ptr,
            size: self.size,
        }
    }
}

impl Drop for DirectBlock {
    fn drop(&mut self) {
        if self.size == 0 {
            return;
        }
        if let Ok(layout) = Self::layout(self.size) {
            // Safe because ptr was allocated with exactly this layout
            unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
        }
    }
}

// DirectBlock uniquely owns its allocation, just like a Vec<u8>
unsafe impl Send for DirectBlock {}
unsafe impl Sync for DirectBlock {}
