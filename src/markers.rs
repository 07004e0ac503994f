use crate::alpha_count::{AlphaCount16, AlphaCount64};

/// Absolute symbol counts at a position that is a multiple of the large sample rate.
///
/// `counts` holds the number of occurrences of every symbol strictly before the marker,
/// so their sum is the position of the marker in the BWT. The compressed segment that
/// starts at this position begins at `byte_offset`. The trailing marker at the end of
/// the BWT may point one byte past the compressed string.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LargeMarker {
    byte_offset: u64,
    counts: AlphaCount64,
}

impl LargeMarker {
    pub(crate) fn new(byte_offset: u64, counts: AlphaCount64) -> Self {
        Self {
            byte_offset,
            counts,
        }
    }

    pub fn byte_offset(&self) -> u64 {
        self.byte_offset
    }

    pub fn counts(&self) -> &AlphaCount64 {
        &self.counts
    }

    /// Number of BWT symbols before this marker.
    pub fn position(&self) -> u64 {
        self.counts.sum()
    }
}

/// Symbol counts and compressed size of everything between the governing large marker
/// and the start of one segment.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmallMarker {
    byte_count: u16,
    counts: AlphaCount16,
}

impl SmallMarker {
    pub(crate) fn new(byte_count: u16, counts: AlphaCount16) -> Self {
        Self { byte_count, counts }
    }

    /// Compressed bytes between the governing large marker and this segment.
    pub fn byte_count(&self) -> u16 {
        self.byte_count
    }

    pub fn counts(&self) -> &AlphaCount16 {
        &self.counts
    }
}

// a large marker with a small marker added on top
#[derive(Debug, Clone, Copy)]
pub(crate) struct InterpolatedMarker {
    pub(crate) counts: AlphaCount64,
    pub(crate) byte_offset: usize,
    pub(crate) position: usize,
}

impl InterpolatedMarker {
    pub(crate) fn new(large: &LargeMarker, small: &SmallMarker, position: usize) -> Self {
        let mut counts = large.counts;
        counts.add_relative(&small.counts);

        debug_assert_eq!(counts.sum(), position as u64);

        Self {
            counts,
            byte_offset: large.byte_offset as usize + small.byte_count as usize,
            position,
        }
    }
}

/// Size in bytes of one small marker record: byte count and five 16-bit counts.
pub(crate) const SMALL_MARKER_RECORD_BYTES: usize = 2 + 5 * 2;

/// Size in bytes of one large marker record: byte offset and five 64-bit counts.
pub(crate) const LARGE_MARKER_RECORD_BYTES: usize = 8 + 5 * 8;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Symbol;

    #[test]
    fn interpolation() {
        let mut absolute = AlphaCount64::new();
        absolute.set(Symbol::A, 100);
        absolute.set(Symbol::T, 28);
        let large = LargeMarker::new(40, absolute);

        let mut relative = AlphaCount16::new();
        relative.set(Symbol::C, 64);
        relative.set(Symbol::Sentinel, 1);
        relative.set(Symbol::T, 63);
        let small = SmallMarker::new(31, relative);

        let marker = InterpolatedMarker::new(&large, &small, 256);

        assert_eq!(large.position(), 128);
        assert_eq!(marker.byte_offset, 71);
        assert_eq!(marker.counts.get(Symbol::T), 91);
        assert_eq!(marker.counts.get(Symbol::A), 100);
        assert_eq!(marker.counts.sum(), 256);
    }
}
