use crate::interfaces::{Boundary, IndexSpace};
use crate::lattice::lattice_structure::LatticeStructure;
use crate::scalar::Scalar;

/// One domain of a [`LatticeStructure`]: index conversions and ownership tests.
#[derive(Debug, Clone)]
pub struct DomainView<'a> {
    lattice: &'a LatticeStructure,
    id: usize,
    /// Global cell coordinates of the first owned cell.
    origin: Vec<usize>,
}

impl<'a> DomainView<'a> {
    pub(crate) fn new(lattice: &'a LatticeStructure, id: usize, origin: Vec<usize>) -> Self {
        DomainView {
            lattice,
            id,
            origin,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn lattice(&self) -> &'a LatticeStructure {
        self.lattice
    }

    pub fn origin(&self) -> &[usize] {
        &self.origin
    }

    pub fn cell_count(&self) -> usize {
        self.lattice.cells_per_domain()
    }

    /// Padded index (orbital 0) of an owned cell.
    pub fn local_to_padded(&self, local_cell: usize) -> usize {
        let ghosts = self.lattice.ghosts();
        let mut coord: Vec<usize> = self
            .lattice
            .local_coordinates()
            .coord(local_cell)
            .into_iter()
            .map(|c| c + ghosts)
            .collect();
        coord.push(0);
        self.lattice.padded_coordinates().index(&coord)
    }

    /// Owned cell behind a padded index, `None` in the ghost layer.
    pub fn padded_to_local(&self, padded: usize) -> Option<usize> {
        let cells = self.owned_cell(padded)?;
        Some(self.lattice.local_coordinates().index(&cells))
    }

    /// Tile holding an owned cell.
    pub fn index_to_tile(&self, local_cell: usize) -> usize {
        let coord = self.lattice.local_coordinates().coord(local_cell);
        self.tile_of_cell(&coord)
    }

    /// Tile of a padded index, `None` in the ghost layer.
    pub fn tile_of_padded(&self, padded: usize) -> Option<usize> {
        let cells = self.owned_cell(padded)?;
        Some(self.tile_of_cell(&cells))
    }

    /// True when the padded index lies in the ghost layer, i.e. outside
    /// the cells this domain owns.
    pub fn is_ghost(&self, padded: usize) -> bool {
        let ghosts = self.lattice.ghosts();
        let coord = self.lattice.padded_coordinates().coord(padded);
        let sizes = self.lattice.padded_coordinates().sizes();
        (0..self.lattice.dimension()).any(|d| coord[d] < ghosts || coord[d] >= sizes[d] - ghosts)
    }

    /// Global index of a padded index. Ghost cells wrap around periodic
    /// directions; `None` when the cell falls off an open edge.
    pub fn padded_to_global(&self, padded: usize) -> Option<usize> {
        let lattice = self.lattice;
        let ghosts = lattice.ghosts() as isize;
        let coord = lattice.padded_coordinates().coord(padded);
        let sizes = lattice.global_coordinates().sizes();

        let mut global = Vec::with_capacity(coord.len());
        for d in 0..lattice.dimension() {
            let size = sizes[d] as isize;
            let g = self.origin[d] as isize + coord[d] as isize - ghosts;
            let wrapped = match lattice.boundary()[d] {
                Boundary::Periodic => g.rem_euclid(size),
                Boundary::Open if (0..size).contains(&g) => g,
                Boundary::Open => return None,
            };
            global.push(wrapped as usize);
        }
        global.push(coord[lattice.dimension()]);
        Some(lattice.global_coordinates().index(&global))
    }

    /// Padded image of a global index owned by this domain.
    pub fn global_to_padded(&self, global: usize) -> Option<usize> {
        if !self.owns_global(global) {
            return None;
        }
        let lattice = self.lattice;
        let ghosts = lattice.ghosts();
        let mut coord = lattice.global_coordinates().coord(global);
        for d in 0..lattice.dimension() {
            coord[d] = coord[d] - self.origin[d] + ghosts;
        }
        Some(lattice.padded_coordinates().index(&coord))
    }

    pub fn owns_global(&self, global: usize) -> bool {
        self.lattice.owner_domain(global) == self.id
    }

    /// `base + offset` in padded space, `None` if it leaves the padded domain.
    pub fn node_index(&self, base: usize, offset: isize) -> Option<usize> {
        base.checked_add_signed(offset)
            .filter(|&index| self.lattice.padded_coordinates().contains(index))
    }

    /// Convert an index between index spaces; `None` when the target space
    /// has no image of it (ghosts, other domains, open edges).
    pub fn convert(&self, index: usize, from: IndexSpace, to: IndexSpace) -> Option<usize> {
        use IndexSpace::*;
        match (from, to) {
            (a, b) if a == b => Some(index),
            (LocalCell, Padded) => Some(self.local_to_padded(index)),
            (LocalCell, Tile) => Some(self.index_to_tile(index)),
            (LocalCell, Global) => self.padded_to_global(self.local_to_padded(index)),
            (Padded, LocalCell) => self.padded_to_local(index),
            (Padded, Tile) => self.tile_of_padded(index),
            (Padded, Global) => self.padded_to_global(index),
            (Global, Padded) => self.global_to_padded(index),
            (Global, LocalCell) => self
                .global_to_padded(index)
                .and_then(|p| self.padded_to_local(p)),
            (Global, Tile) => self
                .global_to_padded(index)
                .and_then(|p| self.tile_of_padded(p)),
            // a tile is a block of cells, not a single index
            _ => None,
        }
    }

    /// Domain vector filled from a whole-lattice vector, ghosts included.
    pub fn gather<T: Scalar>(&self, global: &[T]) -> Vec<T> {
        debug_assert_eq!(global.len(), self.lattice.global_volume());
        (0..self.lattice.padded_volume())
            .map(|p| {
                self.padded_to_global(p)
                    .map_or_else(T::zero, |g| global[g])
            })
            .collect()
    }

    /// Write the owned entries of a domain vector back into a whole-lattice vector.
    pub fn scatter_owned<T: Scalar>(&self, local: &[T], global: &mut [T]) {
        debug_assert_eq!(local.len(), self.lattice.padded_volume());
        for (p, value) in local.iter().enumerate() {
            if self.is_ghost(p) {
                continue;
            }
            if let Some(g) = self.padded_to_global(p) {
                global[g] = *value;
            }
        }
    }

    /// Owned cell coordinates (no orbital) of a padded index.
    fn owned_cell(&self, padded: usize) -> Option<Vec<usize>> {
        if self.is_ghost(padded) {
            return None;
        }
        let ghosts = self.lattice.ghosts();
        let coord = self.lattice.padded_coordinates().coord(padded);
        Some(
            coord[..self.lattice.dimension()]
                .iter()
                .map(|c| c - ghosts)
                .collect(),
        )
    }

    fn tile_of_cell(&self, cells: &[usize]) -> usize {
        let tile: Vec<usize> = cells
            .iter()
            .zip(self.lattice.stride())
            .map(|(c, s)| c / s)
            .collect();
        self.lattice.tile_coordinates().index(&tile)
    }
}
