use alloc::vec::Vec;

/// Split `payload` into approximately equal-sized chunks.
///
/// An empty payload yields no chunks.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &[u8], parts: usize) -> Vec<&[u8]> {
    assert!(parts > 0);
    let chunk_size = payload.len().div_ceil(parts).max(1);
    payload.chunks(chunk_size).collect()
}

/// Split `payload` at each offset in `cuts`.
///
/// Offsets are taken modulo `payload.len() + 1` and sorted, so any sequence of
/// numbers describes a valid partition. Repeated offsets produce empty chunks,
/// which is useful for exercising zero-length segments.
#[must_use]
pub fn split_at_offsets<'a>(payload: &'a [u8], cuts: &[usize]) -> Vec<&'a [u8]> {
    let mut offsets: Vec<usize> = cuts.iter().map(|c| c % (payload.len() + 1)).collect();
    offsets.sort_unstable();

    let mut chunks = Vec::with_capacity(offsets.len() + 1);
    let mut start = 0;
    for end in offsets {
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks.push(&payload[start..]);
    chunks
}
