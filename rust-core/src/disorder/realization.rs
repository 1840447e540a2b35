use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread;

use log::{debug, error, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{DefectConfig, RunConfig};
use crate::disorder::defect_operator::DefectOperator;
use crate::disorder::defect_template::DefectTemplate;
use crate::disorder::ledger::CrossDomainLedger;
use crate::disorder::mosaic::MosaicFlags;
use crate::error::{DisorderError, Result};
use crate::lattice::{DomainView, LatticeStructure};
use crate::scalar::Scalar;

#[derive(Debug, Default)]
struct PhaseState {
    arrived: usize,
    generation: u64,
    broken: bool,
}

/// Reusable barrier that can be broken open when a worker dies.
#[derive(Debug)]
struct PhaseBarrier {
    parties: usize,
    state: Mutex<PhaseState>,
    released: Condvar,
}

impl PhaseBarrier {
    fn new(parties: usize) -> Self {
        PhaseBarrier {
            parties,
            state: Mutex::new(PhaseState::default()),
            released: Condvar::new(),
        }
    }

    fn wait(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.broken {
            return;
        }
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return;
        }
        let generation = state.generation;
        while state.generation == generation && !state.broken {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Release every waiter now and turn later waits into no-ops.
    fn break_open(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .broken = true;
        self.released.notify_all();
    }

    fn is_broken(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .broken
    }

    fn reset(&mut self) {
        *self.state.get_mut().unwrap_or_else(PoisonError::into_inner) = PhaseState::default();
    }
}

/// State shared by all domain workers of one realization.
///
/// Owned by the caller that drives the realizations and lent to every
/// worker; `reset` must run between realizations. Each domain publishes its
/// routed batch into its own slot; `merge_batches` appends the slots to the
/// ledger in domain order, so the ledger does not depend on thread timing.
#[derive(Debug)]
pub struct RealizationContext<T> {
    ledger: Mutex<CrossDomainLedger<T>>,
    batches: Mutex<Vec<Option<CrossDomainLedger<T>>>>,
    barrier: PhaseBarrier,
    domains: usize,
    aborted: AtomicBool,
}

impl<T: Scalar> RealizationContext<T> {
    pub fn new(domains: usize) -> Self {
        RealizationContext {
            ledger: Mutex::new(CrossDomainLedger::new()),
            batches: Mutex::new(vec![None; domains]),
            barrier: PhaseBarrier::new(domains),
            domains,
            aborted: AtomicBool::new(false),
        }
    }

    pub fn domains(&self) -> usize {
        self.domains
    }

    /// Block until every domain worker reaches the same point. Returns at
    /// once after a worker panicked.
    pub fn wait(&self) {
        self.barrier.wait();
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Abort and release every worker blocked in `wait`.
    pub fn break_barrier(&self) {
        self.abort();
        self.barrier.break_open();
    }

    pub fn is_broken(&self) -> bool {
        self.barrier.is_broken()
    }

    pub fn reset(&mut self) {
        self.ledger
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.batches
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .iter_mut()
            .for_each(|slot| *slot = None);
        self.barrier.reset();
        *self.aborted.get_mut() = false;
    }

    pub fn clear_ledger(&self) {
        self.with_ledger(|ledger| ledger.clear());
        self.with_batches(|slots| slots.iter_mut().for_each(|slot| *slot = None));
    }

    /// Store the routed batch of `domain`, replacing any earlier one.
    pub fn publish(&self, domain: usize, batch: CrossDomainLedger<T>) {
        self.with_batches(|slots| {
            if let Some(slot) = slots.get_mut(domain) {
                *slot = Some(batch);
            }
        });
    }

    /// Append the published batches to the ledger, lowest domain first.
    pub fn merge_batches(&self) {
        let batches: Vec<_> = self.with_batches(|slots| slots.iter_mut().filter_map(Option::take).collect());
        self.with_ledger(|ledger| {
            for batch in batches {
                ledger.append(batch);
            }
        });
    }

    fn with_batches<R>(&self, f: impl FnOnce(&mut Vec<Option<CrossDomainLedger<T>>>) -> R) -> R {
        let mut guard = self.batches.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&mut CrossDomainLedger<T>) -> R) -> R {
        let mut guard = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn ledger_snapshot(&self) -> CrossDomainLedger<T> {
        self.with_ledger(|ledger| ledger.clone())
    }

    pub fn audit(&self) -> Result<()> {
        self.with_ledger(|ledger| ledger.audit())
    }
}

/// Run one domain worker. A panic is caught, breaks the barrier so the
/// other workers can finish, and is handed back to the caller.
pub fn guard_worker<T: Scalar>(
    ctx: &RealizationContext<T>,
    domain: usize,
    work: impl FnOnce() -> Result<()>,
) -> thread::Result<Result<()>> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(work));
    if outcome.is_err() {
        error!("domain {domain}: worker panicked, releasing the other domains");
        ctx.break_barrier();
    }
    outcome
}

/// Per-domain counters after one realization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisorderSummary {
    pub defects: Vec<usize>,
    pub border_bonds: usize,
    pub border_onsite: usize,
    pub cross_mosaic_tiles: usize,
}

/// All defect types of a simulation, as seen by one domain.
#[derive(Debug, Clone)]
pub struct StructuralDisorder<T> {
    operators: Vec<DefectOperator<T>>,
    mosaic: MosaicFlags,
}

impl<T: Scalar> StructuralDisorder<T> {
    pub fn new(operators: Vec<DefectOperator<T>>, lattice: &LatticeStructure) -> Self {
        StructuralDisorder {
            operators,
            mosaic: MosaicFlags::new(lattice.tile_count()),
        }
    }

    pub fn from_config(
        defects: &[DefectConfig],
        run: &RunConfig,
        lattice: &LatticeStructure,
    ) -> Result<Self> {
        let operators = defects
            .iter()
            .enumerate()
            .map(|(i, config)| {
                let template = DefectTemplate::from_config(config, lattice).map_err(|e| match e {
                    DisorderError::Configuration(msg) => {
                        DisorderError::Configuration(format!("{}: {msg}", config.label(i)))
                    }
                    other => other,
                })?;
                Ok(DefectOperator::new(template, lattice).with_max_attempts(run.max_attempts))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(operators, lattice))
    }

    pub fn operators(&self) -> &[DefectOperator<T>] {
        &self.operators
    }

    pub fn operators_mut(&mut self) -> &mut [DefectOperator<T>] {
        &mut self.operators
    }

    pub fn mosaic(&self) -> &MosaicFlags {
        &self.mosaic
    }

    /// Run every defect type in order. All domains must hold the same
    /// templates in the same order. Later types still run after a failure
    /// so the barrier schedule stays aligned; the first error is returned.
    pub fn generate_disorder<R: Rng + ?Sized>(
        &mut self,
        ctx: &RealizationContext<T>,
        domain: &DomainView,
        rng: &mut R,
    ) -> Result<()> {
        self.mosaic.reset();
        let mut first_error = None;
        for operator in &mut self.operators {
            if let Err(e) = operator.generate_disorder(ctx, domain, &mut self.mosaic, rng) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn summary(&self) -> DisorderSummary {
        DisorderSummary {
            defects: self.operators.iter().map(|op| op.positions().len()).collect(),
            border_bonds: self.operators.iter().map(|op| op.border().bonds().len()).sum(),
            border_onsite: self.operators.iter().map(|op| op.border().onsite().len()).sum(),
            cross_mosaic_tiles: self.mosaic.cross_mosaic_indexes().len(),
        }
    }
}

/// Seed of one domain's generator in one realization.
pub fn realization_seed(seed: u64, realization: usize, domain: usize) -> u64 {
    const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;
    let stream = ((realization as u64) << 32) ^ domain as u64;
    seed ^ stream.wrapping_add(1).wrapping_mul(GOLDEN)
}

/// Generate one realization on every domain concurrently, one scoped thread
/// per domain.
///
/// When several domains fail, an error that caused the abort is preferred
/// over the `Aborted` reports of the domains that merely followed it.
pub fn run_realization<T: Scalar>(
    lattice: &LatticeStructure,
    disorders: &mut [StructuralDisorder<T>],
    ctx: &mut RealizationContext<T>,
    seed: u64,
    realization: usize,
) -> Result<()> {
    let domains = lattice.domain_count();
    if disorders.len() != domains || ctx.domains() != domains {
        return Err(DisorderError::config(format!(
            "{} disorder sets and a {}-domain context for a {domains}-domain lattice",
            disorders.len(),
            ctx.domains()
        )));
    }
    ctx.reset();
    let ctx = &*ctx;

    let outcomes: Vec<thread::Result<Result<()>>> = thread::scope(|scope| {
        let handles: Vec<_> = disorders
            .iter_mut()
            .enumerate()
            .map(|(id, disorder)| {
                scope.spawn(move || {
                    guard_worker(ctx, id, || {
                        let domain = lattice.domain(id);
                        let mut rng = StdRng::seed_from_u64(realization_seed(seed, realization, id));
                        disorder.generate_disorder(ctx, &domain, &mut rng)
                    })
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(Err))
            .collect()
    });
    let results: Vec<Result<()>> = outcomes
        .into_iter()
        .map(|outcome| outcome.unwrap_or_else(|panic| panic::resume_unwind(panic)))
        .collect();

    let mut errors: Vec<DisorderError> = results.into_iter().filter_map(|r| r.err()).collect();
    if errors.is_empty() {
        debug!("realization {realization} generated on {domains} domains");
        return Ok(());
    }
    let cause = errors.iter().position(|e| !e.is_aborted()).unwrap_or(0);
    let error = errors.swap_remove(cause);
    warn!("realization {realization} failed: {error}");
    Err(error)
}
