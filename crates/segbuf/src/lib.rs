//! Zero-copy, read-only views over chains of discontiguous byte segments.
//!
//! Streaming parsers rarely receive their input in one piece. This crate lets
//! them address bytes spread over many chunks without first copying them into
//! one array:
//!
//! - a [`SegmentChain`] links windows of caller-owned memory,
//! - a [`Position`] names a byte within that chain,
//! - a [`ReadOnlyBuffer`] is a `(start, end)` pair of positions with length,
//!   slicing and cursor movement,
//! - a [`BufferReader`] walks a buffer span by span.
//!
//! ```rust
//! use segbuf::{BufferReader, SegmentChain};
//!
//! let first = b"GET /ind".to_vec();
//! let second = b"ex.html HTTP/1.1".to_vec();
//! let mut chain = SegmentChain::new();
//! chain.append(&first, 0, first.len()).unwrap();
//! chain.append(&second, 0, second.len()).unwrap();
//!
//! let buffer = chain.buffer();
//! let space = buffer.position_of(b' ').unwrap();
//! let path = buffer.slice_from(4).unwrap();
//! let path = path.slice_between(path.start(), path.position_of(b' ').unwrap()).unwrap();
//! assert_eq!(path.to_vec(), b"/index.html");
//! assert_eq!(buffer.slice_between(buffer.start(), space).unwrap().to_vec(), b"GET");
//!
//! let mut reader = BufferReader::new(buffer);
//! reader.advance(9).unwrap();
//! assert_eq!(reader.unread_span(), b"x.html HTTP/1.1");
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod chunk_utils;
mod error;
mod owner;
mod position;
mod reader;
mod segment;


pub use buffer::{ReadOnlyBuffer, Spans};
pub use chunk_utils::{produce_chunks, split_at_offsets};
pub use error::{BufferError, ErrorKind, Result};
pub use owner::MemoryOwner;
pub use position::Position;
pub use reader::{BufferReader, Bytes};
pub use segment::{
    ArraySegment, ChainSegment, Segment, SegmentChain, SegmentId, SegmentKind, SegmentRef,
};
