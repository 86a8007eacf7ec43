use crate::{BufferError, Position, ReadOnlyBuffer, error::Result};

impl<'a> ReadOnlyBuffer<'a> {
    /// The view from byte `offset` to the end.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if `offset` is negative or exceeds
    /// [`len`](Self::len).
    pub fn slice_from(&self, offset: isize) -> Result<Self> {
        let begin = self.resolve(self.start(), offset)?;
        Ok(Self::new_unchecked(begin, self.end()))
    }

    /// `length` bytes starting at byte `offset`.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if either argument is negative or the
    /// range does not fit in the view.
    pub fn slice(&self, offset: isize, length: isize) -> Result<Self> {
        let begin = self.resolve(self.start(), offset)?;
        let end = self.resolve(begin, length)?;
        Ok(Self::new_unchecked(begin, end))
    }

    /// The view from `start` to the end.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if `start` is not inside this view.
    pub fn slice_from_position(&self, start: Position<'a>) -> Result<Self> {
        self.locate(start)?;
        Ok(Self::new_unchecked(start, self.end()))
    }

    /// The view from `start` to `end`.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if either position is not inside this
    /// view or `end` precedes `start`.
    pub fn slice_between(&self, start: Position<'a>, end: Position<'a>) -> Result<Self> {
        let from = self.locate(start)?;
        let to = self.locate(end)?;
        if to < from {
            return Err(BufferError::InvalidRange("end precedes start"));
        }
        Ok(Self::new_unchecked(start, end))
    }

    /// `length` bytes starting at `start`.
    ///
    /// # Errors
    ///
    /// [`BufferError::InvalidRange`] if `start` is not inside this view,
    /// `length` is negative, or the range does not fit.
    pub fn slice_from_position_len(&self, start: Position<'a>, length: isize) -> Result<Self> {
        self.locate(start)?;
        let end = self.resolve(start, length)?;
        Ok(Self::new_unchecked(start, end))
    }

    /// Walks `count` bytes from `origin` without passing the end.
    fn resolve(&self, origin: Position<'a>, count: isize) -> Result<Position<'a>> {
        let count = usize::try_from(count)
            .map_err(|_| BufferError::InvalidRange("negative offset or length"))?;
        Self::seek(origin, self.end(), count, false).map_err(|err| {
            log::debug!("slice of {count} bytes from {origin:?} rejected: {err}");
            BufferError::InvalidRange("range exceeds the buffer")
        })
    }

    /// Byte offset of `position` from the start of the view, paired with the
    /// ordinal of its window so that a segment boundary orders correctly.
    fn locate(&self, position: Position<'a>) -> Result<(usize, usize)> {
        let outside = BufferError::InvalidRange("position is outside the buffer");
        let Some(target) = position.segment() else {
            return if self.start().is_unset() {
                Ok((0, 0))
            } else {
                Err(outside)
            };
        };

        let mut offset = 0;
        for (ordinal, window) in self.windows().enumerate() {
            if window.segment == target && (window.start..=window.end).contains(&position.index()) {
                return Ok((offset + position.index() - window.start, ordinal));
            }
            offset += window.end - window.start;
        }
        Err(outside)
    }
}
