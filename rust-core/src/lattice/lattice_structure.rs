use log::debug;

use crate::config::{LatticeConfig, MAX_DIMENSION};
use crate::error::{DisorderError, Result};
use crate::interfaces::Boundary;
use crate::lattice::base_matrix::LatticeBasis;
use crate::lattice::coordinates::Coordinates;
use crate::lattice::domain::DomainView;

/// A lattice split into equally sized domains, each split into tiles.
///
/// Every domain works in its own padded space: the owned cells surrounded by
/// a ghost layer of width `ghosts`, with the orbital as the slowest digit.
/// All domains share the same padded shape, so a flat offset between two
/// nodes means the same thing in every domain.
#[derive(Debug, Clone)]
pub struct LatticeStructure {
    dimension: usize,
    orbitals: usize,
    ghosts: usize,
    /// Whole lattice, cells then orbital.
    global: Coordinates,
    /// Owned cells of one domain.
    local: Coordinates,
    /// Owned cells plus ghosts, then orbital.
    padded: Coordinates,
    /// Domain grid.
    domains: Coordinates,
    /// Tile grid inside one domain.
    tiles: Coordinates,
    stride: Vec<usize>,
    boundary: Vec<Boundary>,
    basis: LatticeBasis,
}

impl LatticeStructure {
    pub fn from_config(config: &LatticeConfig) -> Result<Self> {
        let dimension = config.dimension();
        if dimension == 0 || dimension > MAX_DIMENSION {
            return Err(DisorderError::config(format!(
                "lattice dimension must be 1, 2 or 3, got {dimension}"
            )));
        }

        let divisions = config.divisions();
        let stride = config.stride();
        let boundary = config.boundary();
        for (name, len) in [
            ("divisions", divisions.len()),
            ("stride", stride.len()),
            ("boundary", boundary.len()),
        ] {
            if len != dimension {
                return Err(DisorderError::config(format!(
                    "{name} has {len} entries for a {dimension}-dimensional lattice"
                )));
            }
        }
        if config.orbitals == 0 {
            return Err(DisorderError::config("at least one orbital per cell is required"));
        }
        if config.ghosts == 0 {
            return Err(DisorderError::config(
                "the ghost layer must be at least one cell wide",
            ));
        }

        let mut local_size = Vec::with_capacity(dimension);
        let mut tiles_per_dim = Vec::with_capacity(dimension);
        for d in 0..dimension {
            let (size, parts, block) = (config.size[d], divisions[d], stride[d]);
            if size == 0 || parts == 0 || block == 0 {
                return Err(DisorderError::config(format!(
                    "size, divisions and stride must be positive along direction {d}"
                )));
            }
            if size % parts != 0 {
                return Err(DisorderError::config(format!(
                    "{size} cells cannot be split evenly into {parts} domains along direction {d}"
                )));
            }
            let local = size / parts;
            if local % block != 0 {
                return Err(DisorderError::config(format!(
                    "{local} cells per domain are not a multiple of the stride {block} along direction {d}"
                )));
            }
            local_size.push(local);
            tiles_per_dim.push(local / block);
        }

        let basis = LatticeBasis::from_vectors(&config.vectors(), &config.orbital_positions())
            .map_err(|e| DisorderError::config(e.to_string()))?;
        if basis.orbitals() != config.orbitals {
            return Err(DisorderError::config(format!(
                "{} orbitals declared but {} positions given",
                config.orbitals,
                basis.orbitals()
            )));
        }

        let with_orbital = |cells: &[usize]| {
            let mut sizes = cells.to_vec();
            sizes.push(config.orbitals);
            Coordinates::new(&sizes)
        };
        let padded_size: Vec<usize> = local_size.iter().map(|l| l + 2 * config.ghosts).collect();

        let lattice = LatticeStructure {
            dimension,
            orbitals: config.orbitals,
            ghosts: config.ghosts,
            global: with_orbital(&config.size),
            local: Coordinates::new(&local_size),
            padded: with_orbital(&padded_size),
            domains: Coordinates::new(&divisions),
            tiles: Coordinates::new(&tiles_per_dim),
            stride,
            boundary,
            basis,
        };
        debug!(
            "lattice {:?} split into {} domains of {:?} cells, {} tiles each",
            config.size,
            lattice.domain_count(),
            local_size,
            lattice.tile_count()
        );
        Ok(lattice)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn orbitals(&self) -> usize {
        self.orbitals
    }

    pub fn ghosts(&self) -> usize {
        self.ghosts
    }

    pub fn basis(&self) -> &LatticeBasis {
        &self.basis
    }

    pub fn boundary(&self) -> &[Boundary] {
        &self.boundary
    }

    pub fn stride(&self) -> &[usize] {
        &self.stride
    }

    pub fn global_coordinates(&self) -> &Coordinates {
        &self.global
    }

    pub fn local_coordinates(&self) -> &Coordinates {
        &self.local
    }

    pub fn padded_coordinates(&self) -> &Coordinates {
        &self.padded
    }

    pub fn tile_coordinates(&self) -> &Coordinates {
        &self.tiles
    }

    pub fn domain_coordinates(&self) -> &Coordinates {
        &self.domains
    }

    pub fn domain_count(&self) -> usize {
        self.domains.volume()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.volume()
    }

    /// Owned cells per domain (orbital 0 only).
    pub fn cells_per_domain(&self) -> usize {
        self.local.volume()
    }

    /// Length of a domain vector, ghosts and orbitals included.
    pub fn padded_volume(&self) -> usize {
        self.padded.volume()
    }

    /// Length of a whole-lattice vector, orbitals included.
    pub fn global_volume(&self) -> usize {
        self.global.volume()
    }

    /// Domain that owns a global index.
    ///
    /// Pure function of the index: the domains partition the lattice.
    pub fn owner_domain(&self, global_index: usize) -> usize {
        let coord = self.global.coord(global_index);
        let local = self.local.sizes();
        let domain: Vec<usize> = (0..self.dimension).map(|d| coord[d] / local[d]).collect();
        self.domains.index(&domain)
    }

    pub fn domain(&self, id: usize) -> DomainView<'_> {
        assert!(
            id < self.domain_count(),
            "domain {id} out of range (lattice has {} domains)",
            self.domain_count()
        );
        let grid = self.domains.coord(id);
        let origin = grid
            .iter()
            .zip(self.local.sizes())
            .map(|(g, l)| g * l)
            .collect();
        DomainView::new(self, id, origin)
    }

    pub fn domains(&self) -> impl Iterator<Item = DomainView<'_>> {
        (0..self.domain_count()).map(move |id| self.domain(id))
    }
}
