use crate::disorder::defect_operator::DefectOperator;
use crate::error::{DisorderError, Result};
use crate::lattice::DomainView;
use crate::scalar::Scalar;

/// Displacement-weighted hopping used in place of the plain hopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    /// `t·Δr_a`, the velocity along `a`.
    First(usize),
    /// `t·Δr_a·Δr_b`.
    Second(usize, usize),
}

impl<T: Scalar> DefectOperator<T> {
    /// `phi += H_defect·psi` on one domain's padded vectors.
    ///
    /// `psi` must hold valid ghost values; only owned rows of `phi` are
    /// written.
    pub fn apply_hamiltonian(&self, domain: &DomainView, psi: &[T], phi: &mut [T]) -> Result<()> {
        let template = self.template();
        let border = self.border();
        self.apply_bonds(domain, psi, phi, |b| template.bonds()[b].hopping, |b| {
            border.bonds()[b].hopping
        })?;

        for (_, root) in self.positions().iter() {
            for (i, node) in template.nodes().iter().enumerate() {
                let index = resolve(domain, root, node.delta)?;
                if domain.is_ghost(index) {
                    continue;
                }
                for term in template.onsite_at(i) {
                    phi[index] += term.energy * psi[index];
                }
            }
        }
        for term in border.onsite() {
            phi[term.index] += term.energy * psi[term.index];
        }
        Ok(())
    }

    /// `phi += M·psi` where `M` carries the moment coefficients of every bond.
    /// On-site terms have no displacement and do not contribute.
    pub fn apply_moment(
        &self,
        moment: Moment,
        domain: &DomainView,
        psi: &[T],
        phi: &mut [T],
    ) -> Result<()> {
        let dim = domain.lattice().dimension();
        let (interior, border) = (self.template().moments(), self.border().moments());
        match moment {
            Moment::First(a) if a < dim => {
                self.apply_bonds(domain, psi, phi, |b| interior.first(a)[b], |b| border.first(a)[b])
            }
            Moment::Second(a, c) if a < dim && c < dim => self.apply_bonds(
                domain,
                psi,
                phi,
                |b| interior.second(a, c)[b],
                |b| border.second(a, c)[b],
            ),
            _ => Err(DisorderError::config(format!(
                "{moment:?} is out of range for a {dim}-dimensional lattice"
            ))),
        }
    }

    /// Shared bond loop: motif bonds with an owned row, then border bonds.
    /// The closures give the coefficient of a bond from its position in the
    /// template or border list.
    fn apply_bonds(
        &self,
        domain: &DomainView,
        psi: &[T],
        phi: &mut [T],
        interior: impl Fn(usize) -> T,
        border: impl Fn(usize) -> T,
    ) -> Result<()> {
        let volume = domain.lattice().padded_volume();
        if psi.len() != volume || phi.len() != volume {
            return Err(DisorderError::config(format!(
                "domain vectors must hold {volume} entries, got {} and {}",
                psi.len(),
                phi.len()
            )));
        }

        let template = self.template();
        let nodes = template.nodes();
        for (_, root) in self.positions().iter() {
            for (i, node) in nodes.iter().enumerate() {
                let row = resolve(domain, root, node.delta)?;
                if domain.is_ghost(row) {
                    continue;
                }
                for (b, bond) in template.bonds_from(i) {
                    let col = resolve(domain, root, nodes[bond.to].delta)?;
                    phi[row] += interior(b) * psi[col];
                }
            }
        }
        for (b, bond) in self.border().bonds().iter().enumerate() {
            phi[bond.row] += border(b) * psi[bond.col];
        }
        Ok(())
    }
}

fn resolve(domain: &DomainView, root: usize, delta: isize) -> Result<usize> {
    domain
        .node_index(root, delta)
        .ok_or(DisorderError::GhostOverflow {
            index: root,
            offset: delta,
        })
}
