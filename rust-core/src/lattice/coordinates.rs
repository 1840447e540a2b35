/// Mixed-radix conversion between flat indices and coordinates.
///
/// Digit 0 varies fastest. Lattice spaces put the orbital in the last
/// (slowest) digit, so `index = c0 + L0 * (c1 + L1 * (... + orbital))`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    sizes: Vec<usize>,
    strides: Vec<usize>,
}

impl Coordinates {
    pub fn new(sizes: &[usize]) -> Self {
        let mut strides = Vec::with_capacity(sizes.len());
        let mut acc = 1usize;
        for &size in sizes {
            strides.push(acc);
            acc *= size;
        }
        Coordinates {
            sizes: sizes.to_vec(),
            strides,
        }
    }

    /// Number of digits.
    pub fn rank(&self) -> usize {
        self.sizes.len()
    }

    /// Number of distinct indices.
    pub fn volume(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn index(&self, coord: &[usize]) -> usize {
        debug_assert_eq!(coord.len(), self.rank());
        coord.iter().zip(&self.strides).map(|(c, s)| c * s).sum()
    }

    /// Flat offset for a signed displacement; digits may be negative.
    pub fn signed_index(&self, coord: &[isize]) -> isize {
        debug_assert_eq!(coord.len(), self.rank());
        coord
            .iter()
            .zip(&self.strides)
            .map(|(&c, &s)| c * s as isize)
            .sum()
    }

    pub fn coord(&self, index: usize) -> Vec<usize> {
        let mut rest = index;
        self.sizes
            .iter()
            .map(|&size| {
                let c = rest % size;
                rest /= size;
                c
            })
            .collect()
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.volume()
    }
}
