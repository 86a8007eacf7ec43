#![allow(missing_docs, dead_code)]

use segbuf::{BufferReader, ReadOnlyBuffer, SegmentChain};

pub const ORIGINAL: &[u8] =
    b"POST /v1/frames HTTP/1.1\r\nHost: example.com\r\nContent-Length: 11\r\n\r\nhello world";

// An HTTP request as it might arrive from a socket. Chunks are cut inside
// tokens and between the CR and LF of a line ending, with one empty read.
#[rustfmt::skip]
pub const STREAM: [&[u8]; 8] = [
    b"POST /v1/fr",               // inside the request target
    b"ames HTTP/1.1\r",           // ends between CR and LF
    b"\nHost: exa",               // starts with the LF
    b"",                          // empty read
    b"mple.com\r\nContent-Len",   // whole line ending inside the chunk
    b"gth: 11\r\n\r",             // ends inside the blank line
    b"\nhello",                   // body starts after the LF
    b" world",
];

pub fn stream_chain() -> SegmentChain<'static> {
    SegmentChain::from_chunks(STREAM)
}

/// Encodes each payload as a big-endian `u16` length followed by its bytes.
pub fn encode_frames(payloads: &[&[u8]]) -> Vec<u8> {
    let mut out = Vec::new();
    for payload in payloads {
        let length = u16::try_from(payload.len()).expect("frame fits in u16");
        out.extend_from_slice(&length.to_be_bytes());
        out.extend_from_slice(payload);
    }
    out
}

/// Splits a buffer of length-prefixed frames into views of their payloads.
pub fn parse_frames(buffer: ReadOnlyBuffer<'_>) -> segbuf::Result<Vec<ReadOnlyBuffer<'_>>> {
    let mut reader = BufferReader::new(buffer);
    let mut frames = Vec::new();
    while !reader.is_end() {
        let mut header = [0u8; 2];
        reader.read_exact(&mut header)?;
        let length = u16::from_be_bytes(header);
        let count = isize::try_from(length).expect("u16 fits in isize");
        let frame = reader.rest().slice(0, count)?;
        reader.advance(usize::from(length))?;
        frames.push(frame);
    }
    Ok(frames)
}

#[test]
fn assert_stream_example() {
    assert_eq!(STREAM.concat(), ORIGINAL);
}
