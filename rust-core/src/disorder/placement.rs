use std::collections::BTreeSet;

use log::trace;
use rand::Rng;

use crate::config::{DEFAULT_ATTEMPTS_PER_DEFECT, MIN_PLACEMENT_ATTEMPTS};
use crate::error::{DisorderError, Result};
use crate::lattice::DomainView;

/// Defect roots of one domain, grouped by the tile that holds them.
///
/// Roots are padded indices of orbital 0; each tile keeps them sorted and
/// free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacedDefectSet {
    tiles: Vec<BTreeSet<usize>>,
}

impl PlacedDefectSet {
    pub fn new(tile_count: usize) -> Self {
        PlacedDefectSet {
            tiles: vec![BTreeSet::new(); tile_count],
        }
    }

    pub fn clear(&mut self) {
        self.tiles.iter_mut().for_each(BTreeSet::clear);
    }

    /// Returns false if the root was already present in that tile.
    pub fn insert(&mut self, tile: usize, root: usize) -> bool {
        self.tiles[tile].insert(root)
    }

    pub fn tile(&self, tile: usize) -> impl Iterator<Item = usize> + '_ {
        self.tiles[tile].iter().copied()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// `(tile, root)` pairs, tile by tile, roots ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .flat_map(|(tile, roots)| roots.iter().map(move |&root| (tile, root)))
    }

    pub fn len(&self) -> usize {
        self.tiles.iter().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of defects requested for `cells` owned cells: `⌊p·N⌋`.
///
/// The product is truncated as computed in floating point, so `0.29 * 100`
/// requests 28 defects.
pub fn target_count(concentration: f64, cells: usize) -> usize {
    (concentration * cells as f64).floor() as usize
}

/// Rejection sampling budget used when none is configured.
pub fn default_attempt_budget(target: usize) -> usize {
    target
        .saturating_mul(DEFAULT_ATTEMPTS_PER_DEFECT)
        .saturating_add(MIN_PLACEMENT_ATTEMPTS)
}

/// Draw distinct defect roots uniformly over the owned cells of `domain`
/// until `⌊p·N⌋` are placed. Returns the number of draws used.
pub fn place_defects<R: Rng + ?Sized>(
    placed: &mut PlacedDefectSet,
    domain: &DomainView,
    concentration: f64,
    max_attempts: Option<usize>,
    rng: &mut R,
) -> Result<usize> {
    let cells = domain.cell_count();
    let requested = target_count(concentration, cells);
    let budget = max_attempts.unwrap_or_else(|| default_attempt_budget(requested));

    let mut count = 0;
    let mut attempts = 0;
    while count < requested {
        if attempts == budget {
            return Err(DisorderError::PlacementExhaustion {
                requested,
                placed: count,
                attempts,
            });
        }
        attempts += 1;

        let cell = rng.gen_range(0..cells);
        let tile = domain.index_to_tile(cell);
        if placed.insert(tile, domain.local_to_padded(cell)) {
            count += 1;
        }
    }

    trace!(
        "domain {}: placed {requested} defects in {attempts} draws",
        domain.id()
    );
    Ok(attempts)
}
