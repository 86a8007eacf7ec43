use alloc::{borrow::Cow, vec, vec::Vec};

use rstest::rstest;

use super::*;
use crate::{ErrorKind, SegmentChain, SegmentId};

static CHUNKS: [&[u8]; 3] = [b"abc", b"", b"defg"];

fn ids(chain: &SegmentChain<'_>) -> Vec<SegmentId> {
    let mut out = Vec::new();
    let mut current = chain.head();
    while let Some(id) = current {
        out.push(id);
        current = chain.get(id).and_then(|s| s.next());
    }
    out
}

#[test]
fn segment_start_is_considered_in_length_and_moves() {
    // 0          50         100    0          50         100
    // [           ###########] -> [###########           ]
    //                  ^c1              ^c2
    let owner1 = [1u8; 100];
    let owner2 = [2u8; 100];
    let mut chain = SegmentChain::new();
    let first = chain.push(&owner1, 50, 100).unwrap();
    let second = chain.push(&owner2, 0, 50).unwrap();
    chain.set_next(first, second).unwrap();

    let start = chain.start_position(first).unwrap();
    let end = chain.start_position(second).unwrap() + 50;
    let buffer = ReadOnlyBuffer::new(start, end).unwrap();
    assert_eq!(start.index(), 50);
    assert_eq!(buffer.len(), 100);

    let c1 = buffer.move_by(start, 25).unwrap();
    let c2 = buffer.move_by(start, 55).unwrap();
    assert_eq!(c1, Position::new(chain.segment(first).unwrap(), 75));
    assert_eq!(c2, Position::new(chain.segment(second).unwrap(), 5));

    let sliced = buffer.slice_between(c1, c2).unwrap();
    assert_eq!(sliced.len(), 30);
    assert_eq!(sliced.to_vec(), [&[1u8; 25][..], &[2u8; 5][..]].concat());
}

#[test]
fn move_to_segment_end_prefers_the_next_segment() {
    let owner = [9u8; 100];
    let mut chain = SegmentChain::new();
    let first = chain.push(&owner, 49, 99).unwrap();
    let second = chain.push(&owner, 0, 0).unwrap();
    chain.set_next(first, second).unwrap();

    let buffer = ReadOnlyBuffer::new(
        chain.start_position(first).unwrap(),
        chain.start_position(second).unwrap(),
    )
    .unwrap();
    assert_eq!(buffer.len(), 50);

    let moved = buffer.move_by(buffer.start(), 50).unwrap();
    assert_eq!(moved, Position::new(chain.segment(second).unwrap(), 0));
    assert_ne!(moved, Position::new(chain.segment(first).unwrap(), 99));
}

#[test]
fn interior_boundaries_normalize_but_the_end_does_not() {
    let chain = SegmentChain::from_chunks([&b"abc"[..], &b"def"[..]]);
    let [first, second] = ids(&chain)[..] else {
        panic!("expected two segments");
    };
    let buffer = chain.buffer();

    assert_eq!(
        buffer.move_by(buffer.start(), 3).unwrap(),
        chain.start_position(second).unwrap()
    );
    let end = buffer.move_by(buffer.start(), 6).unwrap();
    assert_eq!(end, buffer.end());
    assert_eq!(end, chain.end_position(second).unwrap());

    // A view ending on the first segment's end keeps that representation.
    let head = ReadOnlyBuffer::new(buffer.start(), chain.end_position(first).unwrap()).unwrap();
    assert_eq!(
        head.move_by(head.start(), 3).unwrap(),
        chain.end_position(first).unwrap()
    );
}

#[test]
fn empty_interior_segments_are_skipped_when_normalizing() {
    let chain = SegmentChain::from_chunks(CHUNKS);
    let ids = ids(&chain);
    let buffer = chain.buffer();
    assert_eq!(buffer.len(), 7);
    assert_eq!(
        buffer.move_by(buffer.start(), 3).unwrap(),
        chain.start_position(ids[2]).unwrap()
    );
}

#[test]
fn move_rejects_negative_and_overlong_counts() {
    let chain = SegmentChain::from_chunks(CHUNKS);
    let buffer = chain.buffer();
    let length = isize::try_from(buffer.len()).unwrap();

    assert_eq!(
        buffer.move_by(buffer.start(), -1),
        Err(BufferError::ArgumentOutOfRange {
            name: "count",
            value: -1
        })
    );
    assert_eq!(buffer.move_by(buffer.start(), length).unwrap(), buffer.end());
    assert_eq!(
        buffer.move_by(buffer.start(), length + 1).unwrap_err().kind(),
        ErrorKind::InvalidOperation
    );
}

#[test]
fn trusted_seek_skips_bound_validation() {
    let a = [1u8, 2, 3];
    let b = [4u8, 5, 6];
    let first = ReadOnlyBuffer::from_slice(&a, 0, 3).unwrap();
    let second = ReadOnlyBuffer::from_slice(&b, 0, 3).unwrap();

    let trusted = ReadOnlyBuffer::seek(first.start(), second.end(), 2, true).unwrap();
    assert_eq!(trusted, first.start() + 2);

    let checked = ReadOnlyBuffer::seek(first.start(), second.end(), 2, false);
    assert_eq!(checked.unwrap_err().kind(), ErrorKind::InvalidOperation);
}

#[test]
fn trusted_seek_can_pass_the_bound() {
    let chain = SegmentChain::from_chunks([&b"abc"[..], &b"def"[..]]);
    let second = ids(&chain)[1];
    let sub = chain.buffer().slice(0, 4).unwrap();
    assert_eq!(sub.end(), chain.start_position(second).unwrap() + 1);

    assert!(ReadOnlyBuffer::seek(sub.start(), sub.end(), 5, false).is_err());
    let past = ReadOnlyBuffer::seek(sub.start(), sub.end(), 5, true).unwrap();
    assert_eq!(past, chain.start_position(second).unwrap() + 2);

    // Running off the chain has no position to return in either mode.
    assert!(ReadOnlyBuffer::seek(sub.start(), sub.end(), 7, true).is_err());
}

#[test]
fn seek_from_unset_origin() {
    let unset = Position::default();
    assert_eq!(ReadOnlyBuffer::seek(unset, unset, 0, false), Ok(unset));
    assert!(ReadOnlyBuffer::seek(unset, unset, 1, true).is_err());
}

#[rstest]
#[case::one_byte(vec![42])]
#[case::eight_bytes(vec![1, 2, 3, 4, 5, 6, 7, 8])]
fn flat_array_round_trips(#[case] bytes: Vec<u8>) {
    let buffer = ReadOnlyBuffer::from_slice(&bytes, 0, bytes.len()).unwrap();
    assert!(buffer.is_single_span());
    assert_eq!(buffer.len(), bytes.len());
    assert_eq!(buffer.to_vec(), bytes);
    assert!(matches!(buffer.to_span(), Cow::Borrowed(b) if b == bytes.as_slice()));
}

#[test]
fn owner_windows_use_absolute_indexes() {
    let owner = vec![0u8, 1, 2, 3, 4, 5];
    let buffer = ReadOnlyBuffer::from_owner(&owner, 2, 3).unwrap();
    assert_eq!(buffer.start().index(), 2);
    assert_eq!(buffer.end().index(), 5);
    assert_eq!(buffer.to_vec(), [2, 3, 4]);
    assert_eq!(
        ReadOnlyBuffer::from_owner(&owner, 4, 3).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
    assert!(ReadOnlyBuffer::from_slice(&owner, usize::MAX, 2).is_err());
}

#[test]
fn multi_segment_materialization_copies_in_order() {
    let chain = SegmentChain::from_chunks(CHUNKS);
    let buffer = chain.buffer();
    assert!(!buffer.is_single_span());
    assert_eq!(buffer.to_vec(), b"abcdefg");
    assert!(matches!(buffer.to_span(), Cow::Owned(_)));
    assert_eq!(buffer.spans().collect::<Vec<_>>(), CHUNKS);
    assert_eq!(buffer.first(), b"abc");

    let mut dst = [0u8; 8];
    assert_eq!(buffer.copy_to(&mut dst), Ok(7));
    assert_eq!(&dst[..7], b"abcdefg");
    let mut short = [0u8; 6];
    assert!(buffer.copy_to(&mut short).is_err());
    assert_eq!(short, [0u8; 6]);
}

#[test]
fn new_validates_positions() {
    let chain = SegmentChain::from_chunks([&b"abc"[..], &b"def"[..]]);
    let [first, second] = ids(&chain)[..] else {
        panic!("expected two segments");
    };
    let a = chain.start_position(first).unwrap();
    let b = chain.start_position(second).unwrap();

    assert_eq!(ReadOnlyBuffer::new(b, a).unwrap_err().kind(), ErrorKind::InvalidRange);
    assert!(ReadOnlyBuffer::new(a + 2, a + 1).is_err());
    assert!(ReadOnlyBuffer::new(a, b + 4).is_err());
    assert!(ReadOnlyBuffer::new(a, Position::default()).is_err());
    assert_eq!(ReadOnlyBuffer::new(a + 1, b + 2).unwrap().to_vec(), b"bcde");
    assert_eq!(
        ReadOnlyBuffer::new(Position::default(), Position::default()),
        Ok(ReadOnlyBuffer::empty())
    );
}

#[test]
fn empty_buffer_behaves() {
    let buffer = ReadOnlyBuffer::empty();
    assert!(buffer.is_empty());
    assert!(buffer.is_single_span());
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.move_by(buffer.start(), 0).unwrap(), buffer.end());
    assert_eq!(buffer.slice(0, 0).unwrap(), buffer);
    assert!(buffer.slice(0, 1).is_err());
    assert!(buffer.to_vec().is_empty());
    assert_eq!(buffer.first(), b"");
}

#[test]
fn is_empty_walks_past_empty_windows() {
    let chain = SegmentChain::from_chunks([&b""[..], &b""[..], &b"x"[..]]);
    let buffer = chain.buffer();
    assert!(!buffer.is_empty());
    assert!(buffer.slice(0, 0).unwrap().is_empty());
}

#[test]
fn position_of_finds_bytes_across_segments() {
    let chain = SegmentChain::from_chunks(CHUNKS);
    let ids = ids(&chain);
    let buffer = chain.buffer();
    assert_eq!(
        buffer.position_of(b'e'),
        Some(chain.start_position(ids[2]).unwrap() + 1)
    );
    assert_eq!(buffer.position_of(b'a'), Some(buffer.start()));
    assert_eq!(buffer.position_of(b'z'), None);

    let tail = buffer.slice_from(4).unwrap();
    assert_eq!(tail.position_of(b'a'), None);
}

#[test]
fn slices_select_the_expected_bytes() {
    let chain = SegmentChain::from_chunks(CHUNKS);
    let buffer = chain.buffer();

    assert_eq!(buffer.slice_from(2).unwrap().to_vec(), b"cdefg");
    assert_eq!(buffer.slice(2, 3).unwrap().to_vec(), b"cde");
    assert_eq!(buffer.slice(7, 0).unwrap().len(), 0);

    let c = buffer.position_of(b'c').unwrap();
    let f = buffer.position_of(b'f').unwrap();
    assert_eq!(buffer.slice_from_position(c).unwrap().to_vec(), b"cdefg");
    assert_eq!(buffer.slice_between(c, f).unwrap().to_vec(), b"cde");
    assert_eq!(buffer.slice_from_position_len(c, 2).unwrap().to_vec(), b"cd");
    assert_eq!(buffer.slice_from_position_len(f, 2).unwrap().to_vec(), b"fg");
}

#[test]
fn slice_between_orders_boundary_positions() {
    let chain = SegmentChain::from_chunks([&b"abc"[..], &b"def"[..]]);
    let [first, second] = ids(&chain)[..] else {
        panic!("expected two segments");
    };
    let buffer = chain.buffer();
    let end_of_first = chain.end_position(first).unwrap();
    let start_of_second = chain.start_position(second).unwrap();

    assert!(buffer.slice_between(end_of_first, start_of_second).unwrap().is_empty());
    assert_eq!(
        buffer.slice_between(start_of_second, end_of_first).unwrap_err().kind(),
        ErrorKind::InvalidRange
    );
}

type SliceOp = for<'a> fn(&ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>>;

fn offset_past_end<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice_from(8)
}

fn negative_offset<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice_from(-1)
}

fn length_past_end<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice(3, 5)
}

fn negative_length<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice(0, -1)
}

fn start_position_past_end<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice_from_position(b.end() + 1)
}

fn end_position_past_end<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice_between(b.start(), b.end() + 1)
}

fn end_before_start<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice_between(b.start() + 1, b.start())
}

fn position_length_past_end<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice_from_position_len(b.start() + 1, 7)
}

fn position_negative_length<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    b.slice_from_position_len(b.start(), -3)
}

fn parent_end_on_sub_slice<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    let sub = b.slice(0, 2)?;
    sub.slice_from_position(b.end())
}

fn parent_end_between_on_sub_slice<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    let sub = b.slice(1, 5)?;
    sub.slice_between(sub.start(), b.end())
}

fn parent_start_on_sub_slice<'a>(b: &ReadOnlyBuffer<'a>) -> Result<ReadOnlyBuffer<'a>> {
    let sub = b.slice_from(1)?;
    sub.slice_from_position_len(b.start(), 1)
}

#[rstest]
#[case::offset_past_end(offset_past_end)]
#[case::negative_offset(negative_offset)]
#[case::length_past_end(length_past_end)]
#[case::negative_length(negative_length)]
#[case::start_position_past_end(start_position_past_end)]
#[case::end_position_past_end(end_position_past_end)]
#[case::end_before_start(end_before_start)]
#[case::position_length_past_end(position_length_past_end)]
#[case::position_negative_length(position_negative_length)]
#[case::parent_end_on_sub_slice(parent_end_on_sub_slice)]
#[case::parent_end_between_on_sub_slice(parent_end_between_on_sub_slice)]
#[case::parent_start_on_sub_slice(parent_start_on_sub_slice)]
fn slices_reject_out_of_range_input(
    #[case] op: SliceOp,
    #[values(false, true)] chained: bool,
) {
    let flat = b"abcdefg";
    let chain = SegmentChain::from_chunks(CHUNKS);
    let buffer = if chained {
        chain.buffer()
    } else {
        ReadOnlyBuffer::from(&flat[..])
    };
    assert_eq!(buffer.len(), 7);
    assert_eq!(op(&buffer).unwrap_err().kind(), ErrorKind::InvalidRange);
}
