/// Tiles that must be zeroed up front instead of lazily.
///
/// The Hamiltonian is built tile by tile in increasing index order and each
/// tile is zeroed right before it is filled. A defect rooted in a lower tile
/// that writes into a higher tile would be wiped by that later zeroing, so
/// such higher tiles are listed here and initialized once before the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MosaicFlags {
    unflagged: Vec<bool>,
    cross_mosaic: Vec<usize>,
}

impl MosaicFlags {
    pub fn new(tile_count: usize) -> Self {
        MosaicFlags {
            unflagged: vec![true; tile_count],
            cross_mosaic: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.unflagged.iter_mut().for_each(|f| *f = true);
        self.cross_mosaic.clear();
    }

    pub fn tile_count(&self) -> usize {
        self.unflagged.len()
    }

    pub fn is_unflagged(&self, tile: usize) -> bool {
        self.unflagged[tile]
    }

    /// Tiles in the order they were flagged.
    pub fn cross_mosaic_indexes(&self) -> &[usize] {
        &self.cross_mosaic
    }

    /// Record that a defect rooted in `source` writes into `target`.
    ///
    /// Only strictly higher, still unflagged targets are listed. Returns true
    /// if `target` was newly flagged.
    pub fn mark(&mut self, source: usize, target: usize) -> bool {
        if target > source && self.unflagged[target] {
            self.unflagged[target] = false;
            self.cross_mosaic.push(target);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_each_tile_once() {
        let mut flags = MosaicFlags::new(6);
        assert!(flags.mark(2, 5));
        assert!(!flags.mark(2, 5));
        assert!(!flags.mark(3, 5));
        assert!(!flags.is_unflagged(5));
        assert_eq!(flags.cross_mosaic_indexes(), &[5]);
    }

    #[test]
    fn ignores_lower_and_equal_tiles() {
        let mut flags = MosaicFlags::new(6);
        assert!(!flags.mark(3, 3));
        assert!(!flags.mark(4, 1));
        assert!(flags.is_unflagged(3));
        assert!(flags.is_unflagged(1));
        assert!(flags.cross_mosaic_indexes().is_empty());
    }

    #[test]
    fn reset_restores_all_flags() {
        let mut flags = MosaicFlags::new(4);
        flags.mark(0, 1);
        flags.mark(0, 3);
        flags.reset();
        assert_eq!(flags, MosaicFlags::new(4));
    }
}
