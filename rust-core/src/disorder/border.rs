use crate::disorder::defect_template::Moments;
use crate::disorder::ledger::CrossDomainLedger;
use crate::error::{DisorderError, Result};
use crate::lattice::DomainView;
use crate::scalar::Scalar;

/// Border bond in padded space: `row` is owned, `col` may be a ghost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderBond<T> {
    pub row: usize,
    pub col: usize,
    pub hopping: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderOnsite<T> {
    pub index: usize,
    pub energy: T,
}

/// Halves of defects rooted in another domain (or wrapped around a periodic
/// edge) that land on cells owned by this domain.
#[derive(Debug, Clone, PartialEq)]
pub struct BorderContribution<T> {
    bonds: Vec<BorderBond<T>>,
    moments: Moments<T>,
    onsite: Vec<BorderOnsite<T>>,
}

impl<T: Scalar> BorderContribution<T> {
    pub fn new(dimension: usize) -> Self {
        BorderContribution {
            bonds: Vec::new(),
            moments: Moments::new(dimension),
            onsite: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.bonds.clear();
        self.moments.clear();
        self.onsite.clear();
    }

    pub fn bonds(&self) -> &[BorderBond<T>] {
        &self.bonds
    }

    pub fn moments(&self) -> &Moments<T> {
        &self.moments
    }

    pub fn onsite(&self) -> &[BorderOnsite<T>] {
        &self.onsite
    }

    pub fn is_empty(&self) -> bool {
        self.bonds.is_empty() && self.onsite.is_empty()
    }

    /// Claim every ledger entry whose node this domain owns.
    ///
    /// Must run while the caller holds the ledger exclusively. Returns the
    /// number of entries claimed.
    pub fn reconcile(&mut self, ledger: &mut CrossDomainLedger<T>, domain: &DomainView) -> Result<usize> {
        let lattice = domain.lattice();
        let padded = lattice.padded_coordinates();
        let dim = lattice.dimension();
        let mut claimed = 0;

        for entry in 0..ledger.bonds().len() {
            let bond = ledger.bonds()[entry];
            let Some(row) = domain.global_to_padded(bond.global_from) else {
                continue;
            };
            let col = domain
                .node_index(row, bond.relative_to)
                .ok_or(DisorderError::GhostOverflow {
                    index: row,
                    offset: bond.relative_to,
                })?;

            let (a, b) = (padded.coord(row), padded.coord(col));
            let cell = |c: &[usize]| -> Vec<isize> { c[..dim].iter().map(|&x| x as isize).collect() };
            let dr = lattice
                .basis()
                .displacement(&cell(&a[..]), a[dim], &cell(&b[..]), b[dim]);

            self.bonds.push(BorderBond {
                row,
                col,
                hopping: bond.hopping,
            });
            self.moments.push(bond.hopping, &dr);
            ledger.claim_bond(entry);
            claimed += 1;
        }

        for entry in 0..ledger.onsite().len() {
            let term = ledger.onsite()[entry];
            if let Some(index) = domain.global_to_padded(term.global_index) {
                self.onsite.push(BorderOnsite {
                    index,
                    energy: term.energy,
                });
                ledger.claim_onsite(entry);
                claimed += 1;
            }
        }

        Ok(claimed)
    }
}
