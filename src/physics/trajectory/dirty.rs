//! Ring slot ranges written since the last renderer sync

use core::ops::RangeInclusive;

/// Inclusive range of ring slots `[start, end]` written by one or more steps.
///
/// When `end < start` the writes wrapped past the last slot and the range covers
/// `[start, depth - 1]` followed by `[0, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirtyRange {
    start: usize,
    end: usize,
    depth: usize,
}

impl DirtyRange {
    /// A single written slot
    pub fn single(slot: usize, depth: usize) -> Self {
        debug_assert!(slot < depth);
        Self {
            start: slot,
            end: slot,
            depth,
        }
    }

    /// Every slot of the ring
    pub fn full(depth: usize) -> Self {
        debug_assert!(depth > 0);
        Self {
            start: 0,
            end: depth - 1,
            depth,
        }
    }

    /// Range covering `writes` consecutive slots starting at `start`.
    ///
    /// Returns the full ring once `writes` reaches `depth`, since every slot has been
    /// overwritten at least once.
    pub fn spanning(start: usize, writes: usize, depth: usize) -> Self {
        debug_assert!(writes > 0 && start < depth);
        if writes >= depth {
            return Self::full(depth);
        }
        Self {
            start,
            end: (start + writes - 1) % depth,
            depth,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn wraps(&self) -> bool {
        self.end < self.start
    }

    pub fn is_full(&self) -> bool {
        self.start == 0 && self.end + 1 == self.depth
    }

    /// Number of slots covered
    pub fn len(&self) -> usize {
        if self.wraps() {
            self.depth - self.start + self.end + 1
        } else {
            self.end - self.start + 1
        }
    }

    /// Always false: a range covers at least one slot.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, slot: usize) -> bool {
        if self.wraps() {
            slot >= self.start || slot <= self.end
        } else {
            (self.start..=self.end).contains(&slot)
        }
    }

    /// The one or two contiguous slot runs, in write order
    pub fn segments(&self) -> impl Iterator<Item = RangeInclusive<usize>> + use<> {
        let (first, second) = if self.wraps() {
            (self.start..=self.depth - 1, Some(0..=self.end))
        } else {
            (self.start..=self.end, None)
        };
        core::iter::once(first).chain(second)
    }
}
