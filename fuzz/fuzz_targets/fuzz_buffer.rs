#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use segbuf::{BufferReader, ReadOnlyBuffer, SegmentChain, split_at_offsets};

/// Operation applied to both the chained buffer and a flat copy.
#[derive(Debug, Arbitrary)]
enum Op {
    SliceFrom(i16),
    Slice(i16, i16),
    Move(i16),
    PositionOf(u8),
    Advance(u8),
}

#[derive(Debug, Arbitrary)]
struct Input {
    payload: Vec<u8>,
    cuts: Vec<u16>,
    lead: u8,
    ops: Vec<Op>,
}

fn checked_range(len: usize, offset: i16, length: Option<i16>) -> Option<(usize, usize)> {
    let offset = usize::try_from(offset).ok().filter(|&o| o <= len)?;
    let end = match length {
        Some(length) => offset.checked_add(usize::try_from(length).ok()?)?,
        None => len,
    };
    (end <= len).then_some((offset, end))
}

fn run(input: &Input) {
    let cuts: Vec<usize> = input.cuts.iter().map(|&c| usize::from(c)).collect();
    let lead = usize::from(input.lead % 8);

    // Each chunk lives inside its own padded block, so segments start at
    // non-zero offsets into their owners.
    let owners: Vec<Vec<u8>> = split_at_offsets(&input.payload, &cuts)
        .into_iter()
        .map(|chunk| {
            let mut block = vec![0xEE; lead];
            block.extend_from_slice(chunk);
            block.push(0xEE);
            block
        })
        .collect();
    let mut chain = SegmentChain::new();
    for block in &owners {
        chain.append(block, lead, block.len() - 1).unwrap();
    }

    let mut buffer = chain.buffer();
    let mut flat: &[u8] = &input.payload;
    assert_eq!(buffer.len(), flat.len());

    for op in &input.ops {
        match *op {
            Op::SliceFrom(offset) => {
                let expected = checked_range(flat.len(), offset, None);
                let actual = buffer.slice_from(isize::from(offset));
                assert_eq!(actual.is_ok(), expected.is_some(), "{op:?}");
                if let (Ok(sliced), Some((start, end))) = (actual, expected) {
                    buffer = sliced;
                    flat = &flat[start..end];
                }
            }
            Op::Slice(offset, length) => {
                let expected = checked_range(flat.len(), offset, Some(length));
                let actual = buffer.slice(isize::from(offset), isize::from(length));
                assert_eq!(actual.is_ok(), expected.is_some(), "{op:?}");
                if let (Ok(sliced), Some((start, end))) = (actual, expected) {
                    buffer = sliced;
                    flat = &flat[start..end];
                }
            }
            Op::Move(count) => {
                let expected = checked_range(flat.len(), count, None);
                let actual = buffer.move_by(buffer.start(), isize::from(count));
                assert_eq!(actual.is_ok(), expected.is_some(), "{op:?}");
                if let (Ok(position), Some((start, _))) = (actual, expected) {
                    let rest = buffer.slice_from_position(position).unwrap();
                    assert_eq!(rest.to_vec(), &flat[start..]);
                }
            }
            Op::PositionOf(byte) => {
                let expected = flat.iter().position(|&b| b == byte);
                let actual = buffer.position_of(byte);
                assert_eq!(actual.is_some(), expected.is_some());
                if let (Some(position), Some(offset)) = (actual, expected) {
                    let prefix = buffer.slice_between(buffer.start(), position).unwrap();
                    assert_eq!(prefix.len(), offset);
                }
            }
            Op::Advance(step) => {
                let step = usize::from(step);
                let mut reader = BufferReader::new(buffer);
                let result = reader.advance(step);
                assert_eq!(result.is_ok(), step <= flat.len());
                if result.is_ok() {
                    assert_eq!(reader.rest().to_vec(), &flat[step..]);
                    assert_eq!(reader.peek(), flat.get(step).copied());
                }
            }
        }
        assert_eq!(buffer.len(), flat.len());
        assert_eq!(buffer.to_span().as_ref(), flat);
    }

    let copy = ReadOnlyBuffer::from(flat);
    assert_eq!(copy.to_vec(), buffer.to_vec());
}

fuzz_target!(|input: Input| run(&input));
