// Lattice module: geometry and index bookkeeping of a domain-decomposed lattice
// Every index space (global, padded domain, local cell, tile) is a mixed-radix coordinate system

// ======================== MODULE DECLARATIONS ========================
pub mod base_matrix;
pub mod coordinates;
pub mod domain;
pub mod lattice_structure;

// Test modules
mod _tests_base_matrix;
mod _tests_lattice_structure;

// ======================== GEOMETRY ========================
pub use base_matrix::LatticeBasis;  // struct - primitive vectors and orbital positions embedded in 3D
// LatticeBasis impl methods:
//   from_vectors(vectors, orbital_positions) -> anyhow::Result<Self>
//   translation(&self, cells: &[isize]) -> Vector3<f64>              - cartesian vector of a cell shift
//   displacement(&self, from_cell, from_orb, to_cell, to_orb) -> Vector3<f64>

// ======================== INDEX SPACES ========================
pub use coordinates::Coordinates;   // struct - mixed-radix flat index <-> coordinate conversion, digit 0 fastest

// ======================== DOMAIN DECOMPOSITION ========================
pub use lattice_structure::LatticeStructure; // struct - lattice split into domains and tiles
// LatticeStructure impl methods:
//   from_config(&LatticeConfig) -> Result<Self>
//   owner_domain(&self, global: usize) -> usize                      - domain owning a global index
//   domain(&self, id) -> DomainView                                   - view of one domain
pub use domain::DomainView;         // struct - per-domain index conversions and ghost tests
// DomainView impl methods:
//   local_to_padded / padded_to_local / index_to_tile / tile_of_padded
//   padded_to_global / global_to_padded / owns_global / is_ghost
//   node_index(&self, base, offset) -> Option<usize>                  - padded index of base + offset
//   gather / scatter_owned                                            - whole-lattice <-> domain vectors
