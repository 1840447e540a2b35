// Definitions that are used throughout all modules

use serde::{Deserialize, Serialize};

// Boundary condition along one lattice direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    #[default]
    Periodic,
    Open,
}

// Enumeration to track which index space a flat lattice index lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSpace {
    /// Cells owned by one domain, no ghost layer, orbital 0.
    LocalCell,
    /// Domain-local working space: owned cells plus ghost layer, orbitals last.
    Padded,
    /// Whole lattice, orbitals last.
    Global,
    /// Stride blocks ("tiles") of one domain.
    Tile,
}

// Floating point width of the scalar type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Single,
    #[default]
    Double,
}
