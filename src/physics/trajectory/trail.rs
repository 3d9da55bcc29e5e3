//! Read access to a single particle's ring of samples

use bevy::math::Vec3;

/// Floats per stored sample
pub const COMPONENTS: usize = 3;

/// Borrowed view of a flattened `[particle][slot][xyz]` trail buffer.
///
/// Shared by the store and by renderer-side mirrors so both walk the ring the same way.
#[derive(Debug, Clone, Copy)]
pub struct TrailLayout<'a> {
    pub buffer: &'a [f32],
    pub depth: usize,
    pub cursor: usize,
}

impl<'a> TrailLayout<'a> {
    /// Slot holding the most recent sample of every particle
    pub fn newest_slot(&self) -> usize {
        (self.cursor + self.depth - 1) % self.depth
    }

    /// Offset of `slot` of `particle` in the flattened buffer
    pub fn offset(&self, particle: usize, slot: usize) -> usize {
        (particle * self.depth + slot) * COMPONENTS
    }

    pub fn sample(&self, particle: usize, slot: usize) -> Vec3 {
        let base = self.offset(particle, slot);
        Vec3::from_slice(&self.buffer[base..base + COMPONENTS])
    }

    /// Samples of `particle` from newest to oldest, limited to its `length` valid entries
    pub fn walk(&self, particle: usize, length: usize) -> TrailIter<'a> {
        TrailIter {
            layout: *self,
            particle,
            slot: self.newest_slot(),
            remaining: length.min(self.depth),
        }
    }
}

/// Iterator walking a ring backward from the newest sample
#[derive(Debug, Clone)]
pub struct TrailIter<'a> {
    layout: TrailLayout<'a>,
    particle: usize,
    slot: usize,
    remaining: usize,
}

impl Iterator for TrailIter<'_> {
    type Item = Vec3;

    fn next(&mut self) -> Option<Vec3> {
        if self.remaining == 0 {
            return None;
        }
        let sample = self.layout.sample(self.particle, self.slot);
        self.slot = (self.slot + self.layout.depth - 1) % self.layout.depth;
        self.remaining -= 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for TrailIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(depth: usize, particles: usize) -> Vec<f32> {
        // sample value encodes (particle, slot) so positions are easy to check
        (0..particles * depth)
            .flat_map(|i| {
                let (particle, slot) = (i / depth, i % depth);
                [particle as f32, slot as f32, 0.0]
            })
            .collect()
    }

    #[test]
    fn test_walk_wraps_backward() {
        let buffer = ring(4, 2);
        let layout = TrailLayout {
            buffer: &buffer,
            depth: 4,
            cursor: 1,
        };

        assert_eq!(layout.newest_slot(), 0);
        let slots: Vec<f32> = layout.walk(1, 4).map(|sample| sample.y).collect();
        assert_eq!(slots, vec![0.0, 3.0, 2.0, 1.0]);
        assert!(layout.walk(1, 4).all(|sample| sample.x == 1.0));
    }

    #[test]
    fn test_walk_respects_length() {
        let buffer = ring(8, 1);
        let layout = TrailLayout {
            buffer: &buffer,
            depth: 8,
            cursor: 5,
        };

        let slots: Vec<f32> = layout.walk(0, 3).map(|sample| sample.y).collect();
        assert_eq!(slots, vec![4.0, 3.0, 2.0]);
        assert_eq!(layout.walk(0, 0).count(), 0);
        assert_eq!(layout.walk(0, 100).len(), 8);
    }
}
