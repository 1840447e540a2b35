//! Typed errors for defect generation.
//!
//! Configuration problems are fatal at construction time. Placement and
//! ownership failures abort the disorder realization in which they occur.

use thiserror::Error;

use crate::disorder::ledger::LedgerEntryKind;

/// Errors arising from configuration loading or from a disorder realization.
#[derive(Debug, Error)]
pub enum DisorderError {
    /// Malformed or missing configuration field.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The rejection sampler ran out of attempts before reaching the target.
    #[error("placed {placed} of {requested} defects after {attempts} attempts")]
    PlacementExhaustion {
        requested: usize,
        placed: usize,
        attempts: usize,
    },

    /// A ledger entry was not claimed by exactly one domain.
    #[error("ledger {kind} entry {entry} was claimed by {claims} domains")]
    OwnershipInconsistency {
        kind: LedgerEntryKind,
        entry: usize,
        claims: usize,
    },

    /// A defect node landed outside the padded domain.
    #[error("defect node at padded index {index} with offset {offset} leaves the ghost layer")]
    GhostOverflow { index: usize, offset: isize },

    /// Another domain failed; this one stopped at the next barrier.
    #[error("realization aborted in domain {domain}")]
    Aborted { domain: usize },
}

impl DisorderError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// True for the secondary error reported by domains that did not fail themselves.
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

pub type Result<T> = std::result::Result<T, DisorderError>;
