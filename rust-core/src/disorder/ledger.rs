use std::fmt;

use crate::error::{DisorderError, Result};
use crate::scalar::Scalar;

/// Bond published by a domain whose motif node sits in its ghost layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerBond<T> {
    /// Global index of the node receiving the term.
    pub global_from: usize,
    /// Padded-space offset to the other end of the bond.
    pub relative_to: isize,
    pub hopping: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerOnsite<T> {
    pub global_index: usize,
    pub energy: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerEntryKind {
    Bond,
    Onsite,
}

impl fmt::Display for LedgerEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bond => write!(f, "bond"),
            Self::Onsite => write!(f, "onsite"),
        }
    }
}

/// Defect contributions that cross a domain border.
///
/// Append-only while domains route their motifs, read while they reconcile,
/// cleared at the start of the next realization. Each entry counts the
/// domains that claimed it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossDomainLedger<T> {
    bonds: Vec<LedgerBond<T>>,
    onsite: Vec<LedgerOnsite<T>>,
    bond_claims: Vec<usize>,
    onsite_claims: Vec<usize>,
}

impl<T: Scalar> CrossDomainLedger<T> {
    pub fn new() -> Self {
        CrossDomainLedger {
            bonds: Vec::new(),
            onsite: Vec::new(),
            bond_claims: Vec::new(),
            onsite_claims: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.bonds.clear();
        self.onsite.clear();
        self.bond_claims.clear();
        self.onsite_claims.clear();
    }

    pub fn add_bond(&mut self, global_from: usize, relative_to: isize, hopping: T) {
        self.bonds.push(LedgerBond {
            global_from,
            relative_to,
            hopping,
        });
        self.bond_claims.push(0);
    }

    pub fn add_onsite(&mut self, global_index: usize, energy: T) {
        self.onsite.push(LedgerOnsite {
            global_index,
            energy,
        });
        self.onsite_claims.push(0);
    }

    /// Move all entries of `batch` to the end of this ledger.
    pub fn append(&mut self, batch: CrossDomainLedger<T>) {
        self.bond_claims.extend(std::iter::repeat(0).take(batch.bonds.len()));
        self.onsite_claims
            .extend(std::iter::repeat(0).take(batch.onsite.len()));
        self.bonds.extend(batch.bonds);
        self.onsite.extend(batch.onsite);
    }

    pub fn bonds(&self) -> &[LedgerBond<T>] {
        &self.bonds
    }

    pub fn onsite(&self) -> &[LedgerOnsite<T>] {
        &self.onsite
    }

    pub fn len(&self) -> usize {
        self.bonds.len() + self.onsite.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn claim_bond(&mut self, entry: usize) {
        self.bond_claims[entry] += 1;
    }

    pub fn claim_onsite(&mut self, entry: usize) {
        self.onsite_claims[entry] += 1;
    }

    pub fn bond_claims(&self) -> &[usize] {
        &self.bond_claims
    }

    pub fn onsite_claims(&self) -> &[usize] {
        &self.onsite_claims
    }

    /// Every entry must have been claimed by exactly one domain.
    pub fn audit(&self) -> Result<()> {
        let tallies = [
            (LedgerEntryKind::Bond, &self.bond_claims),
            (LedgerEntryKind::Onsite, &self.onsite_claims),
        ];
        for (kind, claims) in tallies {
            if let Some((entry, &claims)) = claims.iter().enumerate().find(|&(_, &c)| c != 1) {
                return Err(DisorderError::OwnershipInconsistency {
                    kind,
                    entry,
                    claims,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_claims_aligned() {
        let mut ledger = CrossDomainLedger::<f64>::new();
        ledger.add_bond(3, -1, 1.0);

        let mut batch = CrossDomainLedger::new();
        batch.add_bond(7, 2, 0.5);
        batch.add_onsite(7, 2.0);
        ledger.append(batch);

        assert_eq!(ledger.bonds().len(), 2);
        assert_eq!(ledger.onsite().len(), 1);
        assert_eq!(ledger.bond_claims(), &[0, 0]);
        assert_eq!(ledger.onsite_claims(), &[0]);
        assert_eq!(ledger.bonds()[1].global_from, 7);
    }

    #[test]
    fn audit_requires_exactly_one_claim() {
        let mut ledger = CrossDomainLedger::<f64>::new();
        ledger.add_bond(0, 1, 1.0);
        ledger.add_onsite(4, 1.0);

        assert!(matches!(
            ledger.audit(),
            Err(DisorderError::OwnershipInconsistency {
                kind: LedgerEntryKind::Bond,
                entry: 0,
                claims: 0
            })
        ));

        ledger.claim_bond(0);
        ledger.claim_onsite(0);
        assert!(ledger.audit().is_ok());

        ledger.claim_onsite(0);
        assert!(matches!(
            ledger.audit(),
            Err(DisorderError::OwnershipInconsistency {
                kind: LedgerEntryKind::Onsite,
                claims: 2,
                ..
            })
        ));
    }

    #[test]
    fn clear_empties_everything() {
        let mut ledger = CrossDomainLedger::<f64>::new();
        ledger.add_bond(0, 1, 1.0);
        ledger.add_onsite(0, 1.0);
        ledger.claim_bond(0);
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.bond_claims().is_empty());
        assert!(ledger.audit().is_ok());
    }
}
