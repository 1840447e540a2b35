use std::fmt;

use log::info;

use crate::config::SimulationConfig;
use crate::disorder::{run_realization, DefectOperator, Moment, RealizationContext, StructuralDisorder};
use crate::error::{DisorderError, Result};
use crate::lattice::{DomainView, LatticeStructure};
use crate::scalar::Scalar;

/// Counters of one realization, summed over all domains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealizationSummary {
    pub realization: usize,
    pub defects: usize,
    pub ledger_entries: usize,
    pub border_bonds: usize,
    pub border_onsite: usize,
    pub cross_mosaic_tiles: usize,
}

impl fmt::Display for RealizationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "realization {}: {} defects, {} ledger entries, {} border bonds, {} border on-site terms, {} cross-mosaic tiles",
            self.realization,
            self.defects,
            self.ledger_entries,
            self.border_bonds,
            self.border_onsite,
            self.cross_mosaic_tiles
        )
    }
}

/// A lattice, its domains and their defects, driven realization by realization.
#[derive(Debug)]
pub struct Simulation<T> {
    lattice: LatticeStructure,
    disorders: Vec<StructuralDisorder<T>>,
    context: RealizationContext<T>,
    seed: u64,
    realizations: usize,
}

impl<T: Scalar> Simulation<T> {
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        let lattice = LatticeStructure::from_config(&config.lattice)?;
        let disorder = StructuralDisorder::from_config(&config.defects, &config.simulation, &lattice)?;
        let domains = lattice.domain_count();

        info!(
            "{} defect types on {} domains, {} realizations",
            config.defects.len(),
            domains,
            config.simulation.realizations
        );
        Ok(Simulation {
            disorders: vec![disorder; domains],
            context: RealizationContext::new(domains),
            seed: config.simulation.seed,
            realizations: config.simulation.realizations,
            lattice,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_realizations(mut self, realizations: usize) -> Self {
        self.realizations = realizations;
        self
    }

    pub fn lattice(&self) -> &LatticeStructure {
        &self.lattice
    }

    pub fn disorders(&self) -> &[StructuralDisorder<T>] {
        &self.disorders
    }

    pub fn context(&self) -> &RealizationContext<T> {
        &self.context
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn realizations(&self) -> usize {
        self.realizations
    }

    /// Generate realization number `realization` on every domain.
    pub fn generate(&mut self, realization: usize) -> Result<RealizationSummary> {
        run_realization(
            &self.lattice,
            &mut self.disorders,
            &mut self.context,
            self.seed,
            realization,
        )?;

        let mut summary = RealizationSummary {
            realization,
            ledger_entries: self.context.with_ledger(|ledger| ledger.len()),
            ..Default::default()
        };
        for disorder in &self.disorders {
            let domain = disorder.summary();
            summary.defects += domain.defects.iter().sum::<usize>();
            summary.border_bonds += domain.border_bonds;
            summary.border_onsite += domain.border_onsite;
            summary.cross_mosaic_tiles += domain.cross_mosaic_tiles;
        }
        Ok(summary)
    }

    pub fn run(&mut self) -> Result<Vec<RealizationSummary>> {
        (0..self.realizations).map(|r| self.generate(r)).collect()
    }

    /// Whole-lattice `H_defect·psi` for the current realization.
    pub fn apply_hamiltonian(&self, psi: &[T]) -> Result<Vec<T>> {
        self.apply_domains(psi, |op, domain, local, phi| {
            op.apply_hamiltonian(domain, local, phi)
        })
    }

    /// Whole-lattice moment operator applied to `psi`.
    pub fn apply_moment(&self, moment: Moment, psi: &[T]) -> Result<Vec<T>> {
        self.apply_domains(psi, |op, domain, local, phi| {
            op.apply_moment(moment, domain, local, phi)
        })
    }

    fn apply_domains<F>(&self, psi: &[T], apply: F) -> Result<Vec<T>>
    where
        F: Fn(&DefectOperator<T>, &DomainView, &[T], &mut [T]) -> Result<()>,
    {
        let lattice = &self.lattice;
        if psi.len() != lattice.global_volume() {
            return Err(DisorderError::config(format!(
                "state vector must hold {} entries, got {}",
                lattice.global_volume(),
                psi.len()
            )));
        }
        let mut out = vec![T::zero(); lattice.global_volume()];
        for (domain, disorder) in lattice.domains().zip(&self.disorders) {
            let local = domain.gather(psi);
            let mut phi = vec![T::zero(); lattice.padded_volume()];
            for op in disorder.operators() {
                apply(op, &domain, &local, &mut phi)?;
            }
            domain.scatter_owned(&phi, &mut out);
        }
        Ok(out)
    }
}
