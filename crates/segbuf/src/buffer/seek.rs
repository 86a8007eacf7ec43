use crate::{BufferError, Position, ReadOnlyBuffer, error::Result, segment::SegmentRef};

const PAST_BOUND: BufferError = BufferError::InvalidOperation("walk passed the end of the buffer");
const UNREACHABLE_BOUND: BufferError =
    BufferError::InvalidOperation("end of the buffer is not reachable from the origin");
const END_OF_CHAIN: BufferError =
    BufferError::InvalidOperation("walk ran off the end of the chain");

impl<'a> ReadOnlyBuffer<'a> {
    /// Advances `origin` by exactly `count` bytes, crossing segments as
    /// needed and never passing [`end`](Self::end).
    ///
    /// Landing exactly on a segment's end yields the start of the next
    /// segment, unless that point is the end of this buffer.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ArgumentOutOfRange`] if `count` is negative.
    /// - [`BufferError::InvalidOperation`] if the walk would pass the end.
    pub fn move_by(&self, origin: Position<'a>, count: isize) -> Result<Position<'a>> {
        let count = usize::try_from(count).map_err(|_| BufferError::ArgumentOutOfRange {
            name: "count",
            value: count,
        })?;
        Self::seek(origin, self.end, count, false)
    }

    /// Walks forward from `origin` by `count` bytes; the primitive behind
    /// [`move_by`](Self::move_by).
    ///
    /// With `trust_end == false` the walk stops at `bound` and also checks
    /// that `bound` is reachable from `origin` at all, which may cost a walk
    /// to the bound's segment.
    ///
    /// With `trust_end == true` none of that happens: `bound` is consulted only
    /// so that landing exactly on it returns it unchanged. If the caller's
    /// claim that the destination lies before `bound` is wrong, the returned
    /// position lies beyond the intended region and no error is raised. Use
    /// it only when a previous check already established the range, such as
    /// a reader that tracks its remaining length.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidOperation`] if a checked walk would pass `bound`
    /// or cannot reach it, or if either walk runs off the end of the chain.
    pub fn seek(
        origin: Position<'a>,
        bound: Position<'a>,
        count: usize,
        trust_end: bool,
    ) -> Result<Position<'a>> {
        let Some(mut segment) = origin.segment() else {
            if count == 0 && (trust_end || bound.is_unset()) {
                return Ok(origin);
            }
            return Err(END_OF_CHAIN);
        };
        let mut index = origin.index();
        let mut remaining = count;

        let found = loop {
            if bound.segment() == Some(segment) {
                let limit = bound.index();
                if index <= limit && limit - index == remaining {
                    return Ok(bound);
                }
                if !trust_end {
                    if index > limit || remaining > limit - index {
                        log::debug!("seek of {count} from {origin:?} passes {bound:?}");
                        return Err(PAST_BOUND);
                    }
                    return Ok(Position::new(segment, index + remaining));
                }
            }

            let available = segment.end().saturating_sub(index);
            if remaining < available {
                break Position::new(segment, index + remaining);
            }
            remaining -= available;

            match segment.next() {
                Some(next) => {
                    segment = next;
                    index = next.start();
                }
                None if remaining == 0 && trust_end => {
                    return Ok(Position::new(segment, segment.end()));
                }
                None if remaining == 0 => {
                    log::debug!("seek from {origin:?} never reached {bound:?}");
                    return Err(UNREACHABLE_BOUND);
                }
                None => return Err(END_OF_CHAIN),
            }
        };

        if !trust_end {
            ensure_reachable(segment, bound)?;
        }
        Ok(found)
    }
}

/// Checks that `bound`'s segment follows `from`.
fn ensure_reachable(from: SegmentRef<'_>, bound: Position<'_>) -> Result<()> {
    let mut current = from.next();
    while let Some(segment) = current {
        if bound.segment() == Some(segment) {
            return Ok(());
        }
        current = segment.next();
    }
    log::debug!("seek bound {bound:?} is not reachable");
    Err(UNREACHABLE_BOUND)
}
