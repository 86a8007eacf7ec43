use alloc::{boxed::Box, sync::Arc, vec::Vec};

/// A contiguous block of bytes that segments can borrow windows of.
///
/// The owner is borrowed, never owned, by the chain: segments hold the
/// `&'a [u8]` returned by [`memory`](MemoryOwner::memory), so the owner must
/// outlive every segment, position and buffer that points into it.
pub trait MemoryOwner {
    /// The whole block.
    fn memory(&self) -> &[u8];

    /// Number of addressable bytes.
    fn capacity(&self) -> usize {
        self.memory().len()
    }

    /// Borrowed view of `[offset, offset + length)`, or `None` if it does not
    /// fit in the block.
    fn bytes(&self, offset: usize, length: usize) -> Option<&[u8]> {
        let end = offset.checked_add(length)?;
        self.memory().get(offset..end)
    }
}

impl MemoryOwner for [u8] {
    fn memory(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> MemoryOwner for [u8; N] {
    fn memory(&self) -> &[u8] {
        self
    }
}

impl MemoryOwner for Vec<u8> {
    fn memory(&self) -> &[u8] {
        self
    }
}

impl MemoryOwner for Box<[u8]> {
    fn memory(&self) -> &[u8] {
        self
    }
}

impl MemoryOwner for Arc<[u8]> {
    fn memory(&self) -> &[u8] {
        self
    }
}

impl<T: MemoryOwner + ?Sized> MemoryOwner for &T {
    fn memory(&self) -> &[u8] {
        (**self).memory()
    }
}
