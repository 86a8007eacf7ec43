//! Segment arena and the polymorphic segment slot held by positions.
//!
//! A [`SegmentChain`] is an append-only arena of [`Segment`]s. Each segment
//! borrows a window `[start, end)` of some owner's memory, addressed with
//! absolute offsets so several segments can share one larger block. Links are
//! stored as [`SegmentId`]s and may only point forward in allocation order,
//! which keeps every chain acyclic.
//!
//! Positions do not point at `Segment` directly. They hold a [`SegmentRef`],
//! which is either a node of a chain or a synthetic [`ArraySegment`] wrapping a
//! single flat slice. Callers narrow the slot with [`SegmentKind`].

use alloc::vec::Vec;
use core::{fmt, ptr};

use bstr::BStr;

use crate::{BufferError, MemoryOwner, Position, ReadOnlyBuffer, error::Result};

/// Index of a segment inside its [`SegmentChain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentId(usize);

impl SegmentId {
    /// Arena slot of this id.
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of a chain: a window of an owner's memory plus a link.
#[derive(Clone, Copy)]
pub struct Segment<'a> {
    memory: &'a [u8],
    start: usize,
    end: usize,
    next: Option<SegmentId>,
}

impl<'a> Segment<'a> {
    /// The owner's whole block.
    #[must_use]
    pub fn memory(&self) -> &'a [u8] {
        self.memory
    }

    /// Inclusive absolute start offset.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive absolute end offset.
    #[must_use]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of bytes in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Following segment, if linked.
    #[must_use]
    pub fn next(&self) -> Option<SegmentId> {
        self.next
    }

    /// The window's bytes.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        &self.memory[self.start..self.end]
    }
}

impl fmt::Debug for Segment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("range", &(self.start..self.end))
            .field("next", &self.next)
            .field("bytes", &BStr::new(self.bytes()))
            .finish()
    }
}

/// Append-only arena of linked segments.
///
/// The chain is built through `&mut self` and then shared; every
/// [`Position`] and [`ReadOnlyBuffer`] borrows it, so it cannot change while
/// views exist.
#[derive(Default, Clone)]
pub struct SegmentChain<'a> {
    segments: Vec<Segment<'a>>,
}

impl<'a> SegmentChain<'a> {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Builds a chain with one segment per chunk, linked in order.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        let mut chain = Self::new();
        let mut previous: Option<SegmentId> = None;
        for chunk in chunks {
            let id = chain.insert(chunk, 0, chunk.len());
            if let Some(previous) = previous {
                // Each id is newer than the one before it and still unlinked.
                chain.segments[previous.0].next = Some(id);
                log::trace!("linked segment {previous} -> {id}");
            }
            previous = Some(id);
        }
        chain
    }

    /// Allocates an unlinked segment over `owner[start..end]`.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] unless `start <= end <= owner.capacity()`.
    pub fn push<O>(&mut self, owner: &'a O, start: usize, end: usize) -> Result<SegmentId>
    where
        O: MemoryOwner + ?Sized,
    {
        let memory = owner.memory();
        if start > end || end > memory.len() {
            log::debug!(
                "rejected segment range {start}..{end} over {} bytes",
                memory.len()
            );
            return Err(BufferError::InvalidRange(
                "segment range is outside its owner",
            ));
        }
        Ok(self.insert(memory, start, end))
    }

    fn insert(&mut self, memory: &'a [u8], start: usize, end: usize) -> SegmentId {
        let id = SegmentId(self.segments.len());
        self.segments.push(Segment {
            memory,
            start,
            end,
            next: None,
        });
        log::trace!("allocated segment {id} over {start}..{end}");
        id
    }

    /// Links `segment` to `next`. A segment can be linked once.
    ///
    /// # Errors
    ///
    /// - [`BufferError::UnknownSegment`] if either id is not in this chain.
    /// - [`BufferError::SegmentAlreadyLinked`] if `segment` already has a
    ///   successor.
    /// - [`BufferError::InvalidLink`] unless `next` was allocated after
    ///   `segment`.
    pub fn set_next(&mut self, segment: SegmentId, next: SegmentId) -> Result<()> {
        if next.0 >= self.segments.len() {
            return Err(BufferError::UnknownSegment(next));
        }
        if next <= segment {
            return Err(BufferError::InvalidLink {
                from: segment,
                to: next,
            });
        }
        let node = self
            .segments
            .get_mut(segment.0)
            .ok_or(BufferError::UnknownSegment(segment))?;
        if node.next.is_some() {
            return Err(BufferError::SegmentAlreadyLinked(segment));
        }
        node.next = Some(next);
        log::trace!("linked segment {segment} -> {next}");
        Ok(())
    }

    /// Allocates a segment and links it after the [`tail`](Self::tail) of
    /// the chain. Segments pushed but never linked are not followed.
    ///
    /// # Errors
    ///
    /// Same as [`push`](Self::push).
    pub fn append<O>(&mut self, owner: &'a O, start: usize, end: usize) -> Result<SegmentId>
    where
        O: MemoryOwner + ?Sized,
    {
        let tail = self.tail();
        let id = self.push(owner, start, end)?;
        if let Some(tail) = tail {
            // The tail has no successor and `id` is the newest slot.
            self.set_next(tail, id)?;
        }
        Ok(id)
    }

    /// Number of allocated segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no segment has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The segment stored under `id`.
    #[must_use]
    pub fn get(&self, id: SegmentId) -> Option<&Segment<'a>> {
        self.segments.get(id.0)
    }

    /// Bytes of the segment stored under `id`.
    ///
    /// # Errors
    ///
    /// [`BufferError::UnknownSegment`] for a foreign id.
    pub fn bytes(&self, id: SegmentId) -> Result<&'a [u8]> {
        self.get(id)
            .map(Segment::bytes)
            .ok_or(BufferError::UnknownSegment(id))
    }

    /// First allocated segment.
    #[must_use]
    pub fn head(&self) -> Option<SegmentId> {
        (!self.segments.is_empty()).then_some(SegmentId(0))
    }

    /// Last segment reachable from the head.
    #[must_use]
    pub fn tail(&self) -> Option<SegmentId> {
        let mut current = self.head()?;
        while let Some(next) = self.segments[current.0].next {
            current = next;
        }
        Some(current)
    }

    /// Segment slot for `id`, suitable for building positions.
    ///
    /// # Errors
    ///
    /// [`BufferError::UnknownSegment`] for a foreign id.
    pub fn segment(&self, id: SegmentId) -> Result<SegmentRef<'_>> {
        if id.0 < self.segments.len() {
            Ok(SegmentRef::Chain(ChainSegment { chain: self, id }))
        } else {
            Err(BufferError::UnknownSegment(id))
        }
    }

    /// Position at the first byte of `id`.
    ///
    /// # Errors
    ///
    /// [`BufferError::UnknownSegment`] for a foreign id.
    pub fn start_position(&self, id: SegmentId) -> Result<Position<'_>> {
        self.segment(id).map(Position::at_start)
    }

    /// Position one past the last byte of `id`.
    ///
    /// # Errors
    ///
    /// [`BufferError::UnknownSegment`] for a foreign id.
    pub fn end_position(&self, id: SegmentId) -> Result<Position<'_>> {
        self.segment(id)
            .map(|segment| Position::new(segment, segment.end()))
    }

    /// View from the head's first byte to the tail's last byte.
    #[must_use]
    pub fn buffer(&self) -> ReadOnlyBuffer<'_> {
        match (self.head(), self.tail()) {
            (Some(head), Some(tail)) => {
                let start = Position::at_start(SegmentRef::Chain(ChainSegment {
                    chain: self,
                    id: head,
                }));
                let tail = ChainSegment { chain: self, id: tail };
                let end = Position::new(SegmentRef::Chain(tail), tail.segment().end);
                ReadOnlyBuffer::new_unchecked(start, end)
            }
            _ => ReadOnlyBuffer::empty(),
        }
    }
}

impl fmt::Debug for SegmentChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.segments).finish()
    }
}

/// A chain node as seen from a [`Position`].
#[derive(Clone, Copy)]
pub struct ChainSegment<'a> {
    chain: &'a SegmentChain<'a>,
    id: SegmentId,
}

impl<'a> ChainSegment<'a> {
    /// Id of the node.
    #[must_use]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Chain the node lives in.
    #[must_use]
    pub fn chain(&self) -> &'a SegmentChain<'a> {
        self.chain
    }

    /// The node itself.
    #[must_use]
    pub fn segment(&self) -> &'a Segment<'a> {
        // Ids are only minted by the chain that stores them.
        &self.chain.segments[self.id.0]
    }

    /// Following node, if linked.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        self.segment().next.map(|id| Self {
            chain: self.chain,
            id,
        })
    }
}

impl fmt::Debug for ChainSegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ChainSegment").field(&self.id).finish()
    }
}

/// A synthetic segment wrapping one flat slice, with no successor.
#[derive(Clone, Copy)]
pub struct ArraySegment<'a> {
    memory: &'a [u8],
    start: usize,
    end: usize,
}

impl<'a> ArraySegment<'a> {
    /// Wraps `memory[start..end]`.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] unless `start <= end <= memory.len()`.
    pub fn new(memory: &'a [u8], start: usize, end: usize) -> Result<Self> {
        if start > end || end > memory.len() {
            return Err(BufferError::InvalidRange(
                "array range is outside its memory",
            ));
        }
        Ok(Self { memory, start, end })
    }

    /// Wraps all of `memory`.
    #[must_use]
    pub fn from_slice(memory: &'a [u8]) -> Self {
        Self {
            memory,
            start: 0,
            end: memory.len(),
        }
    }

    /// The wrapped bytes.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        &self.memory[self.start..self.end]
    }
}

impl fmt::Debug for ArraySegment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ArraySegment")
            .field(&(self.start..self.end))
            .finish()
    }
}

/// The segment slot of a [`Position`].
///
/// Equality is identity: two chain slots are equal when they name the same
/// node of the same chain, two array slots when they wrap the same range of
/// the same memory. Byte content is never compared.
#[derive(Debug, Clone, Copy)]
pub enum SegmentRef<'a> {
    /// A node of a [`SegmentChain`].
    Chain(ChainSegment<'a>),
    /// A flat slice wrapped as a single segment.
    Array(ArraySegment<'a>),
}

impl<'a> SegmentRef<'a> {
    /// The backing block; positions index into it.
    #[must_use]
    pub fn memory(&self) -> &'a [u8] {
        match self {
            Self::Chain(c) => c.segment().memory,
            Self::Array(a) => a.memory,
        }
    }

    /// Inclusive absolute start.
    #[must_use]
    pub fn start(&self) -> usize {
        match self {
            Self::Chain(c) => c.segment().start,
            Self::Array(a) => a.start,
        }
    }

    /// Exclusive absolute end.
    #[must_use]
    pub fn end(&self) -> usize {
        match self {
            Self::Chain(c) => c.segment().end,
            Self::Array(a) => a.end,
        }
    }

    /// Window length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The window's bytes.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        &self.memory()[self.start()..self.end()]
    }

    /// Following segment. Array segments never have one.
    #[must_use]
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Chain(c) => c.next().map(Self::Chain),
            Self::Array(_) => None,
        }
    }

    /// Name of the backing kind, as reported in
    /// [`BufferError::UnexpectedSegmentType`].
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Chain(_) => ChainSegment::NAME,
            Self::Array(_) => ArraySegment::NAME,
        }
    }

    /// Address-derived hash of the segment identity.
    pub(crate) fn identity_hash(&self) -> u64 {
        match self {
            Self::Chain(c) => {
                let addr = ptr::from_ref(c.chain) as usize as u64;
                addr.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ c.id.0 as u64
            }
            Self::Array(a) => {
                let addr = a.memory.as_ptr() as usize as u64;
                addr.wrapping_mul(0x9E37_79B9_7F4A_7C15)
                    ^ (a.start as u64).rotate_left(17)
                    ^ a.end as u64
            }
        }
    }
}

impl PartialEq for SegmentRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Chain(a), Self::Chain(b)) => ptr::eq(a.chain, b.chain) && a.id == b.id,
            (Self::Array(a), Self::Array(b)) => {
                ptr::eq(a.memory, b.memory) && a.start == b.start && a.end == b.end
            }
            _ => false,
        }
    }
}

impl Eq for SegmentRef<'_> {}

/// A concrete backing kind a [`SegmentRef`] can be narrowed to.
pub trait SegmentKind<'a>: Sized {
    /// Kind name used in error messages.
    const NAME: &'static str;

    /// Returns the concrete segment when `segment` is of this kind.
    fn narrow(segment: SegmentRef<'a>) -> Option<Self>;
}

impl<'a> SegmentKind<'a> for ChainSegment<'a> {
    const NAME: &'static str = "ChainSegment";

    fn narrow(segment: SegmentRef<'a>) -> Option<Self> {
        match segment {
            SegmentRef::Chain(c) => Some(c),
            SegmentRef::Array(_) => None,
        }
    }
}

impl<'a> SegmentKind<'a> for ArraySegment<'a> {
    const NAME: &'static str = "ArraySegment";

    fn narrow(segment: SegmentRef<'a>) -> Option<Self> {
        match segment {
            SegmentRef::Array(a) => Some(a),
            SegmentRef::Chain(_) => None,
        }
    }
}
