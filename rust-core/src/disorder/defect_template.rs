use log::debug;
use nalgebra::Vector3;

use crate::config::DefectConfig;
use crate::error::{DisorderError, Result};
use crate::lattice::{Coordinates, LatticeStructure};
use crate::scalar::Scalar;

/// One node of a defect motif, relative to the motif root (orbital 0).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOffset {
    /// Cell shift in {-1, 0, 1} along each direction.
    pub shift: Vec<isize>,
    pub orbital: usize,
    /// Flat offset in padded domain space.
    pub delta: isize,
}

/// Hopping added between two motif nodes; the term lands in the row of `from`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bond<T> {
    pub from: usize,
    pub to: usize,
    pub hopping: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OnsiteTerm<T> {
    pub node: usize,
    pub energy: T,
}

/// Displacement-weighted hoppings, one entry per bond.
///
/// `first[a][b] = t_b·Δr_a` and `second[a][c][b] = t_b·Δr_a·Δr_c`; these feed
/// the velocity and current operators.
#[derive(Debug, Clone, PartialEq)]
pub struct Moments<T> {
    first: Vec<Vec<T>>,
    second: Vec<Vec<Vec<T>>>,
}

impl<T: Scalar> Moments<T> {
    pub fn new(dimension: usize) -> Self {
        Moments {
            first: vec![Vec::new(); dimension],
            second: vec![vec![Vec::new(); dimension]; dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.first.len()
    }

    pub fn push(&mut self, hopping: T, dr: &Vector3<f64>) {
        let dim = self.dimension();
        for a in 0..dim {
            self.first[a].push(hopping * T::from_real(dr[a]));
            for c in 0..dim {
                self.second[a][c].push(hopping * T::from_real(dr[a]) * T::from_real(dr[c]));
            }
        }
    }

    pub fn first(&self, axis: usize) -> &[T] {
        &self.first[axis]
    }

    pub fn second(&self, a: usize, b: usize) -> &[T] {
        &self.second[a][b]
    }

    pub fn len(&self) -> usize {
        self.first.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.first.iter_mut().for_each(Vec::clear);
        self.second.iter_mut().flatten().for_each(Vec::clear);
    }
}

/// A defect motif: node offsets, intra-motif bonds and on-site terms.
///
/// Built once from configuration and immutable afterwards.
#[derive(Debug, Clone)]
pub struct DefectTemplate<T> {
    concentration: f64,
    nodes: Vec<NodeOffset>,
    bonds: Vec<Bond<T>>,
    onsite: Vec<OnsiteTerm<T>>,
    moments: Moments<T>,
}

impl<T: Scalar> DefectTemplate<T> {
    /// Build a template from packed node offsets.
    ///
    /// Each packed offset holds one base-3 digit per direction followed by
    /// the orbital; digits 0, 1, 2 stand for cell shifts -1, 0, +1.
    pub fn new(
        concentration: f64,
        node_positions: &[u64],
        bonds: Vec<Bond<T>>,
        onsite: Vec<OnsiteTerm<T>>,
        lattice: &LatticeStructure,
    ) -> Result<Self> {
        if !(concentration > 0.0 && concentration <= 1.0) {
            return Err(DisorderError::config(format!(
                "concentration must lie in (0, 1], got {concentration}"
            )));
        }
        if node_positions.is_empty() {
            return Err(DisorderError::config("a defect needs at least one node"));
        }
        let nodes = node_positions
            .iter()
            .map(|&packed| decode_offset(lattice, packed))
            .collect::<Result<Vec<_>>>()?;

        let node_count = nodes.len();
        if let Some(bond) = bonds
            .iter()
            .find(|b| b.from >= node_count || b.to >= node_count)
        {
            return Err(DisorderError::config(format!(
                "bond {} -> {} refers to a node outside the {node_count}-node motif",
                bond.from, bond.to
            )));
        }
        if let Some(term) = onsite.iter().find(|t| t.node >= node_count) {
            return Err(DisorderError::config(format!(
                "on-site term refers to node {} of a {node_count}-node motif",
                term.node
            )));
        }
        // Border bonds are resolved inside the receiving domain's padded space.
        let ghosts = lattice.ghosts() as isize;
        if let Some(bond) = bonds.iter().find(|b| {
            let (from, to) = (&nodes[b.from].shift, &nodes[b.to].shift);
            from.iter().zip(to).any(|(f, t)| (t - f).abs() > ghosts)
        }) {
            return Err(DisorderError::config(format!(
                "bond {} -> {} spans more cells than the ghost layer ({ghosts}) is wide",
                bond.from, bond.to
            )));
        }

        let basis = lattice.basis();
        let mut moments = Moments::new(lattice.dimension());
        for bond in &bonds {
            let (from, to) = (&nodes[bond.from], &nodes[bond.to]);
            let dr = basis.displacement(&from.shift, from.orbital, &to.shift, to.orbital);
            moments.push(bond.hopping, &dr);
        }

        debug!(
            "defect template: p = {concentration}, {} nodes, {} bonds, {} on-site terms",
            node_count,
            bonds.len(),
            onsite.len()
        );

        Ok(DefectTemplate {
            concentration,
            nodes,
            bonds,
            onsite,
            moments,
        })
    }

    pub fn from_config(config: &DefectConfig, lattice: &LatticeStructure) -> Result<Self> {
        config.validate()?;

        let b = &config.bonds;
        let bonds = (0..b.hopping.len())
            .map(|i| {
                let im = b.hopping_im.as_ref().map_or(0.0, |im| im[i]);
                let hopping = T::from_parts(b.hopping[i], im).ok_or_else(|| {
                    DisorderError::config(format!(
                        "bond {i} has a complex hopping but the simulation is real"
                    ))
                })?;
                Ok(Bond {
                    from: b.from[i],
                    to: b.to[i],
                    hopping,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let o = &config.onsite;
        let onsite = (0..o.energy.len())
            .map(|i| {
                let im = o.energy_im.as_ref().map_or(0.0, |im| im[i]);
                let energy = T::from_parts(o.energy[i], im).ok_or_else(|| {
                    DisorderError::config(format!(
                        "on-site term {i} has a complex energy but the simulation is real"
                    ))
                })?;
                Ok(OnsiteTerm {
                    node: o.node[i],
                    energy,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(
            config.concentration,
            &config.node_position,
            bonds,
            onsite,
            lattice,
        )
    }

    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[NodeOffset] {
        &self.nodes
    }

    pub fn bonds(&self) -> &[Bond<T>] {
        &self.bonds
    }

    pub fn onsite(&self) -> &[OnsiteTerm<T>] {
        &self.onsite
    }

    pub fn moments(&self) -> &Moments<T> {
        &self.moments
    }

    /// Bonds (with their position in the bond list) whose row is `node`.
    pub fn bonds_from(&self, node: usize) -> impl Iterator<Item = (usize, &Bond<T>)> {
        self.bonds
            .iter()
            .enumerate()
            .filter(move |(_, bond)| bond.from == node)
    }

    pub fn onsite_at(&self, node: usize) -> impl Iterator<Item = &OnsiteTerm<T>> {
        self.onsite.iter().filter(move |term| term.node == node)
    }

    /// Padded-space offset from node `from` to node `to`.
    pub fn relative_offset(&self, from: usize, to: usize) -> isize {
        self.nodes[to].delta - self.nodes[from].delta
    }
}

fn packed_coordinates(lattice: &LatticeStructure) -> Coordinates {
    let mut radices = vec![3; lattice.dimension()];
    radices.push(lattice.orbitals());
    Coordinates::new(&radices)
}

/// Decode a packed base-3 + orbital offset into a padded-space node offset.
pub fn decode_offset(lattice: &LatticeStructure, packed: u64) -> Result<NodeOffset> {
    let packed_coords = packed_coordinates(lattice);
    let packed = usize::try_from(packed)
        .ok()
        .filter(|&p| packed_coords.contains(p))
        .ok_or_else(|| {
            DisorderError::config(format!(
                "node position {packed} is outside the {} possible offsets",
                packed_coords.volume()
            ))
        })?;

    let digits = packed_coords.coord(packed);
    let dim = lattice.dimension();
    let shift: Vec<isize> = digits[..dim].iter().map(|&t| t as isize - 1).collect();
    let orbital = digits[dim];

    let mut signed = shift.clone();
    signed.push(orbital as isize);
    let delta = lattice.padded_coordinates().signed_index(&signed);

    Ok(NodeOffset {
        shift,
        orbital,
        delta,
    })
}

/// Inverse of [`decode_offset`]: packed offset of a padded-space delta, if it
/// is a valid motif offset.
pub fn encode_offset(lattice: &LatticeStructure, delta: isize) -> Option<u64> {
    let padded = lattice.padded_coordinates();
    let dim = lattice.dimension();
    // Move every digit up by one so the shifted index has digits in 0..=2.
    let recentre: isize = padded.strides()[..dim].iter().map(|&s| s as isize).sum();
    let shifted = usize::try_from(delta + recentre)
        .ok()
        .filter(|&i| padded.contains(i))?;

    let digits = padded.coord(shifted);
    if digits[..dim].iter().any(|&t| t > 2) {
        return None;
    }
    Some(packed_coordinates(lattice).index(&digits) as u64)
}
