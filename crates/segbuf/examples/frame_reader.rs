//! Reads HTTP/1.1 requests out of a stream of socket reads without copying
//! them into one buffer first.
//!
//! Each read is a separate allocation, as it would be when a network layer
//! hands out pooled blocks. The reads are linked into a [`SegmentChain`] and
//! the request is parsed from a [`ReadOnlyBuffer`] view over it: header lines
//! are located with `position_of`, the body is sliced by its
//! `Content-Length`, and only the pieces that span two reads are copied when
//! printed.
//!
//! Run with
//!
//! ```bash
//! cargo run -p segbuf --example frame_reader
//! ```

use segbuf::{BufferReader, ReadOnlyBuffer, SegmentChain};

/// Parsed view of one request. Every field borrows from the chain.
struct Request<'a> {
    request_line: ReadOnlyBuffer<'a>,
    headers: Vec<(ReadOnlyBuffer<'a>, ReadOnlyBuffer<'a>)>,
    body: ReadOnlyBuffer<'a>,
}

/// Splits off one CRLF-terminated line, returning the line and the rest.
fn split_line(
    buffer: ReadOnlyBuffer<'_>,
) -> segbuf::Result<Option<(ReadOnlyBuffer<'_>, ReadOnlyBuffer<'_>)>> {
    let Some(newline) = buffer.position_of(b'\n') else {
        return Ok(None);
    };
    let mut line = buffer.slice_between(buffer.start(), newline)?;
    let length = isize::try_from(line.len()).unwrap_or(isize::MAX);
    if length > 0 && line.slice_from(length - 1)?.first() == b"\r" {
        line = line.slice(0, length - 1)?;
    }
    let rest = buffer.slice_from_position(buffer.move_by(newline, 1)?)?;
    Ok(Some((line, rest)))
}

fn parse_request(
    buffer: ReadOnlyBuffer<'_>,
) -> segbuf::Result<Option<(Request<'_>, ReadOnlyBuffer<'_>)>> {
    let Some((request_line, mut rest)) = split_line(buffer)? else {
        return Ok(None);
    };

    let mut headers = Vec::new();
    let mut content_length = 0;
    loop {
        let Some((line, after)) = split_line(rest)? else {
            return Ok(None);
        };
        rest = after;
        if line.is_empty() {
            break;
        }
        let Some(colon) = line.position_of(b':') else {
            continue;
        };
        let name = line.slice_between(line.start(), colon)?;
        let mut value = line.slice_from_position(line.move_by(colon, 1)?)?;
        while value.first().first() == Some(&b' ') {
            value = value.slice_from(1)?;
        }
        if name.to_span().eq_ignore_ascii_case(b"content-length") {
            content_length = std::str::from_utf8(&value.to_span())
                .ok()
                .and_then(|v| v.parse::<isize>().ok())
                .unwrap_or(0);
        }
        headers.push((name, value));
    }

    if usize::try_from(content_length).unwrap_or(usize::MAX) > rest.len() {
        return Ok(None);
    }
    let body = rest.slice(0, content_length)?;
    let rest = rest.slice_from(content_length)?;
    Ok(Some((
        Request {
            request_line,
            headers,
            body,
        },
        rest,
    )))
}

fn show(buffer: ReadOnlyBuffer<'_>) -> String {
    String::from_utf8_lossy(&buffer.to_span()).into_owned()
}

fn main() -> segbuf::Result<()> {
    // Two pipelined requests, cut wherever the reads happened to end.
    let reads: Vec<Vec<u8>> = [
        &b"POST /v1/frames HTTP/1.1\r\nHo"[..],
        b"st: example.com\r\nContent-Le",
        b"ngth: 11\r\n\r\nhello",
        b"",
        b" worldGET /health HTTP/1.1\r",
        b"\nHost: example.com\r\n\r\n",
    ]
    .iter()
    .map(|read| read.to_vec())
    .collect();

    let mut chain = SegmentChain::new();
    for read in &reads {
        chain.append(read, 0, read.len())?;
    }

    let mut pending = chain.buffer();
    while let Some((request, rest)) = parse_request(pending)? {
        println!("{}", show(request.request_line));
        for (name, value) in &request.headers {
            println!("  {} = {}", show(*name), show(*value));
        }
        let spans = request.body.spans().filter(|s| !s.is_empty()).count();
        println!(
            "  body: {:?} ({} bytes in {spans} reads)",
            show(request.body),
            request.body.len()
        );
        pending = rest;
    }

    // Anything left over waits for the next read.
    let mut reader = BufferReader::new(pending);
    println!("{} bytes pending", reader.remaining());
    while let Some(byte) = reader.take() {
        print!("{}", byte.escape_ascii());
    }
    Ok(())
}
