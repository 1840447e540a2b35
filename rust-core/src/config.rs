//! Configuration: tolerances and defaults, plus the TOML input format.
//!
//! A simulation file has one `[lattice]` table, an optional `[simulation]`
//! table and any number of `[[defect]]` entries:
//!
//! ```toml
//! [lattice]
//! size = [64, 64]
//! divisions = [2, 2]
//! orbitals = 2
//! stride = [4, 1]
//! vectors = [[1.0, 0.0], [0.5, 0.8660254037844386]]
//! orbital_positions = [[0.0, 0.0], [0.5, 0.2886751345948129]]
//!
//! [simulation]
//! seed = 7
//! realizations = 10
//!
//! [[defect]]
//! concentration = 0.01
//! num_nodes = 2
//! node_position = [13, 23]
//! bonds = { from = [0, 1], to = [1, 0], hopping = [-0.5, -0.5] }
//! onsite = { node = [0], energy = [2.0] }
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DisorderError, Result};
use crate::interfaces::{Boundary, Precision};

// Constants

// Tolerances
pub const BASE_VECTOR_TOLERANCE: f64 = 1e-10; // For construction of the lattice basis

// Defaults
pub const DEFAULT_GHOSTS: usize = 1; // Width of the ghost layer around each domain
pub const DEFAULT_ATTEMPTS_PER_DEFECT: usize = 64; // Rejection sampling budget per requested defect
pub const MIN_PLACEMENT_ATTEMPTS: usize = 1024; // Floor of the rejection sampling budget
pub const MAX_DIMENSION: usize = 3;

// ============================================================================
// Lattice
// ============================================================================

/// Geometry and domain decomposition of the lattice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Number of unit cells along each direction of the whole lattice.
    pub size: Vec<usize>,
    /// Number of domains along each direction (default: 1 everywhere).
    #[serde(default)]
    pub divisions: Option<Vec<usize>>,
    /// Orbitals per unit cell.
    #[serde(default = "default_orbitals")]
    pub orbitals: usize,
    /// Width of the ghost layer.
    #[serde(default = "default_ghosts")]
    pub ghosts: usize,
    /// Tile extent along each direction (default: 1 everywhere).
    #[serde(default)]
    pub stride: Option<Vec<usize>>,
    /// Boundary condition along each direction (default: periodic).
    #[serde(default)]
    pub boundary: Option<Vec<Boundary>>,
    /// Primitive vectors, one row per vector (default: unit vectors).
    #[serde(default)]
    pub vectors: Option<Vec<Vec<f64>>>,
    /// Orbital positions inside the unit cell (default: origin).
    #[serde(default)]
    pub orbital_positions: Option<Vec<Vec<f64>>>,
}

fn default_orbitals() -> usize {
    1
}

fn default_ghosts() -> usize {
    DEFAULT_GHOSTS
}

impl LatticeConfig {
    /// Single-orbital lattice with one domain, unit tiles and periodic boundaries.
    pub fn new(size: Vec<usize>) -> Self {
        Self {
            size,
            divisions: None,
            orbitals: 1,
            ghosts: DEFAULT_GHOSTS,
            stride: None,
            boundary: None,
            vectors: None,
            orbital_positions: None,
        }
    }

    pub fn with_divisions(mut self, divisions: Vec<usize>) -> Self {
        self.divisions = Some(divisions);
        self
    }

    pub fn with_stride(mut self, stride: Vec<usize>) -> Self {
        self.stride = Some(stride);
        self
    }

    pub fn with_boundary(mut self, boundary: Vec<Boundary>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    pub fn with_orbitals(mut self, positions: Vec<Vec<f64>>) -> Self {
        self.orbitals = positions.len();
        self.orbital_positions = Some(positions);
        self
    }

    pub fn with_vectors(mut self, vectors: Vec<Vec<f64>>) -> Self {
        self.vectors = Some(vectors);
        self
    }

    pub fn dimension(&self) -> usize {
        self.size.len()
    }

    pub fn divisions(&self) -> Vec<usize> {
        self.divisions
            .clone()
            .unwrap_or_else(|| vec![1; self.dimension()])
    }

    pub fn stride(&self) -> Vec<usize> {
        self.stride.clone().unwrap_or_else(|| vec![1; self.dimension()])
    }

    pub fn boundary(&self) -> Vec<Boundary> {
        self.boundary
            .clone()
            .unwrap_or_else(|| vec![Boundary::Periodic; self.dimension()])
    }

    pub fn vectors(&self) -> Vec<Vec<f64>> {
        self.vectors.clone().unwrap_or_else(|| {
            let d = self.dimension();
            (0..d)
                .map(|i| (0..d).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
                .collect()
        })
    }

    pub fn orbital_positions(&self) -> Vec<Vec<f64>> {
        self.orbital_positions
            .clone()
            .unwrap_or_else(|| vec![vec![0.0; self.dimension()]; self.orbitals])
    }
}

// ============================================================================
// Run parameters
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_realizations")]
    pub realizations: usize,
    #[serde(default)]
    pub precision: Precision,
    /// Use complex hoppings and energies.
    #[serde(default)]
    pub complex: bool,
    /// Rejection sampling budget per defect type and domain.
    #[serde(default)]
    pub max_attempts: Option<usize>,
}

fn default_realizations() -> usize {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            realizations: 1,
            precision: Precision::Double,
            complex: false,
            max_attempts: None,
        }
    }
}

// ============================================================================
// Defects
// ============================================================================

/// Raw arrays describing one defect motif.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefectConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub concentration: f64,
    pub num_nodes: usize,
    /// Packed node offsets: one base-3 digit per direction, then the orbital.
    pub node_position: Vec<u64>,
    #[serde(default)]
    pub bonds: BondConfig,
    #[serde(default)]
    pub onsite: OnsiteConfig,
}

/// Parallel arrays of intra-motif hoppings `from -> to`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondConfig {
    pub from: Vec<usize>,
    pub to: Vec<usize>,
    pub hopping: Vec<f64>,
    #[serde(default)]
    pub hopping_im: Option<Vec<f64>>,
}

/// Parallel arrays of on-site energies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnsiteConfig {
    pub node: Vec<usize>,
    pub energy: Vec<f64>,
    #[serde(default)]
    pub energy_im: Option<Vec<f64>>,
}

impl DefectConfig {
    pub fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("defect{index}"))
    }

    /// Check array lengths and node references.
    pub fn validate(&self) -> Result<()> {
        if !(self.concentration > 0.0 && self.concentration <= 1.0) {
            return Err(DisorderError::config(format!(
                "concentration must lie in (0, 1], got {}",
                self.concentration
            )));
        }
        if self.num_nodes == 0 {
            return Err(DisorderError::config("a defect needs at least one node"));
        }
        if self.node_position.len() != self.num_nodes {
            return Err(DisorderError::config(format!(
                "num_nodes is {} but node_position has {} entries",
                self.num_nodes,
                self.node_position.len()
            )));
        }

        let bonds = &self.bonds;
        if bonds.from.len() != bonds.hopping.len() || bonds.to.len() != bonds.hopping.len() {
            return Err(DisorderError::config(format!(
                "bond arrays differ in length: from {}, to {}, hopping {}",
                bonds.from.len(),
                bonds.to.len(),
                bonds.hopping.len()
            )));
        }
        if let Some(im) = &bonds.hopping_im {
            if im.len() != bonds.hopping.len() {
                return Err(DisorderError::config("hopping_im must match hopping in length"));
            }
        }
        if let Some(&node) = bonds
            .from
            .iter()
            .chain(bonds.to.iter())
            .find(|&&n| n >= self.num_nodes)
        {
            return Err(DisorderError::config(format!(
                "bond refers to node {node} of a {}-node defect",
                self.num_nodes
            )));
        }

        let onsite = &self.onsite;
        if onsite.node.len() != onsite.energy.len() {
            return Err(DisorderError::config(format!(
                "on-site arrays differ in length: node {}, energy {}",
                onsite.node.len(),
                onsite.energy.len()
            )));
        }
        if let Some(im) = &onsite.energy_im {
            if im.len() != onsite.energy.len() {
                return Err(DisorderError::config("energy_im must match energy in length"));
            }
        }
        if let Some(&node) = onsite.node.iter().find(|&&n| n >= self.num_nodes) {
            return Err(DisorderError::config(format!(
                "on-site term refers to node {node} of a {}-node defect",
                self.num_nodes
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Whole file
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub lattice: LatticeConfig,
    #[serde(default)]
    pub simulation: RunConfig,
    #[serde(default, rename = "defect")]
    pub defects: Vec<DefectConfig>,
}

impl SimulationConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        content.parse()
    }

    /// Checks that do not need the lattice to be built.
    pub fn validate(&self) -> Result<()> {
        let dim = self.lattice.dimension();
        if dim == 0 || dim > MAX_DIMENSION {
            return Err(DisorderError::config(format!(
                "lattice dimension must be 1, 2 or 3, got {dim}"
            )));
        }
        if self.simulation.realizations == 0 {
            return Err(DisorderError::config("realizations must be at least 1"));
        }
        for defect in &self.defects {
            defect.validate()?;
        }
        Ok(())
    }
}

impl FromStr for SimulationConfig {
    type Err = DisorderError;

    fn from_str(s: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const GRAPHENE_VACANCY: &str = r#"
[lattice]
size = [8, 8]
divisions = [2, 1]
orbitals = 2
stride = [2, 1]
vectors = [[1.0, 0.0], [0.5, 0.8660254037844386]]
orbital_positions = [[0.0, 0.0], [0.5, 0.2886751345948129]]

[simulation]
seed = 42
realizations = 3

[[defect]]
name = "vacancy"
concentration = 0.05
num_nodes = 1
node_position = [4]
onsite = { node = [0], energy = [100.0] }
"#;

    #[test]
    fn parses_full_file() {
        let config: SimulationConfig = GRAPHENE_VACANCY.parse().unwrap();
        assert_eq!(config.lattice.dimension(), 2);
        assert_eq!(config.lattice.divisions(), vec![2, 1]);
        assert_eq!(config.lattice.orbitals, 2);
        assert_eq!(config.lattice.ghosts, DEFAULT_GHOSTS);
        assert_eq!(config.lattice.boundary(), vec![Boundary::Periodic; 2]);
        assert_eq!(config.simulation.seed, 42);
        assert_eq!(config.simulation.precision, Precision::Double);
        assert_eq!(config.defects.len(), 1);
        assert_eq!(config.defects[0].label(0), "vacancy");
        assert!(config.defects[0].bonds.from.is_empty());
    }

    #[test]
    fn defaults_fill_missing_tables() {
        let config: SimulationConfig = "[lattice]\nsize = [10]\n".parse().unwrap();
        assert_eq!(config.simulation, RunConfig::default());
        assert!(config.defects.is_empty());
        assert_eq!(config.lattice.vectors(), vec![vec![1.0]]);
        assert_eq!(config.lattice.orbital_positions(), vec![vec![0.0]]);
    }

    #[test]
    fn rejects_mismatched_node_count() {
        let content = r#"
[lattice]
size = [10]

[[defect]]
concentration = 0.1
num_nodes = 2
node_position = [1]
"#;
        let result = content.parse::<SimulationConfig>();
        assert!(matches!(result, Err(DisorderError::Configuration(_))));
    }

    #[test]
    fn rejects_bond_to_unknown_node() {
        let content = r#"
[lattice]
size = [10]

[[defect]]
concentration = 0.1
num_nodes = 2
node_position = [1, 2]
bonds = { from = [0], to = [2], hopping = [1.0] }
"#;
        let result = content.parse::<SimulationConfig>();
        assert!(matches!(result, Err(DisorderError::Configuration(_))));
    }

    #[test]
    fn rejects_concentration_out_of_range() {
        for p in ["0.0", "1.5", "-0.2"] {
            let content = format!(
                "[lattice]\nsize = [10]\n[[defect]]\nconcentration = {p}\nnum_nodes = 1\nnode_position = [1]\n"
            );
            assert!(content.parse::<SimulationConfig>().is_err(), "accepted p = {p}");
        }
    }

    #[test]
    fn rejects_four_dimensions() {
        let result = "[lattice]\nsize = [2, 2, 2, 2]\n".parse::<SimulationConfig>();
        assert!(matches!(result, Err(DisorderError::Configuration(_))));
    }

    #[test]
    fn toml_syntax_error_is_reported() {
        let result = "[lattice\nsize = [10]".parse::<SimulationConfig>();
        assert!(matches!(result, Err(DisorderError::Toml(_))));
    }
}
