use log::{debug, trace};
use rand::Rng;

use crate::disorder::border::BorderContribution;
use crate::disorder::defect_template::DefectTemplate;
use crate::disorder::ledger::CrossDomainLedger;
use crate::disorder::mosaic::MosaicFlags;
use crate::disorder::placement::{place_defects, PlacedDefectSet};
use crate::disorder::realization::RealizationContext;
use crate::error::{DisorderError, Result};
use crate::lattice::{DomainView, LatticeStructure};
use crate::scalar::Scalar;

/// Per-domain state of one defect type: the motif, where it was placed this
/// realization and which border terms this domain received from others.
#[derive(Debug, Clone)]
pub struct DefectOperator<T> {
    template: DefectTemplate<T>,
    positions: PlacedDefectSet,
    border: BorderContribution<T>,
    max_attempts: Option<usize>,
}

impl<T: Scalar> DefectOperator<T> {
    pub fn new(template: DefectTemplate<T>, lattice: &LatticeStructure) -> Self {
        DefectOperator {
            template,
            positions: PlacedDefectSet::new(lattice.tile_count()),
            border: BorderContribution::new(lattice.dimension()),
            max_attempts: None,
        }
    }

    /// Bound the number of placement draws; `None` uses the default budget.
    pub fn with_max_attempts(mut self, max_attempts: Option<usize>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn template(&self) -> &DefectTemplate<T> {
        &self.template
    }

    pub fn positions(&self) -> &PlacedDefectSet {
        &self.positions
    }

    /// Direct access to the placed roots, for replaying a known placement.
    pub fn positions_mut(&mut self) -> &mut PlacedDefectSet {
        &mut self.positions
    }

    pub fn border(&self) -> &BorderContribution<T> {
        &self.border
    }

    pub fn reset(&mut self) {
        self.positions.clear();
        self.border.clear();
    }

    pub fn place<R: Rng + ?Sized>(&mut self, domain: &DomainView, rng: &mut R) -> Result<usize> {
        place_defects(
            &mut self.positions,
            domain,
            self.template.concentration(),
            self.max_attempts,
            rng,
        )
    }

    /// Padded index of every node of every placed motif, with the tile of
    /// its root and the node number.
    fn nodes<'s>(
        &'s self,
        domain: &'s DomainView<'s>,
    ) -> impl Iterator<Item = Result<(usize, usize, usize)>> + 's {
        self.positions.iter().flat_map(move |(tile, root)| {
            self.template
                .nodes()
                .iter()
                .enumerate()
                .map(move |(i, node)| {
                    domain
                        .node_index(root, node.delta)
                        .map(|index| (tile, i, index))
                        .ok_or(DisorderError::GhostOverflow {
                            index: root,
                            offset: node.delta,
                        })
                })
        })
    }

    /// Collect the contributions of motif nodes that fall in the ghost layer.
    ///
    /// Owned nodes are left to this domain's own Hamiltonian pass. Ghost
    /// nodes are mapped to their global index and handed to whichever domain
    /// owns them; nodes that fall off an open edge are dropped.
    pub fn route_nodes(&self, domain: &DomainView) -> Result<CrossDomainLedger<T>> {
        let mut batch = CrossDomainLedger::new();
        for node in self.nodes(domain) {
            let (_, i, index) = node?;
            if !domain.is_ghost(index) {
                continue;
            }
            let Some(global) = domain.padded_to_global(index) else {
                continue;
            };
            for (_, bond) in self.template.bonds_from(i) {
                batch.add_bond(global, self.template.relative_offset(i, bond.to), bond.hopping);
            }
            for term in self.template.onsite_at(i) {
                batch.add_onsite(global, term.energy);
            }
        }
        trace!(
            "domain {}: {} ledger entries routed",
            domain.id(),
            batch.len()
        );
        Ok(batch)
    }

    /// Flag the tiles that motifs rooted in lower tiles write into.
    pub fn mark_mosaic(&self, domain: &DomainView, mosaic: &mut MosaicFlags) -> Result<usize> {
        let mut flagged = 0;
        for node in self.nodes(domain) {
            let (source, _, index) = node?;
            if let Some(target) = domain.tile_of_padded(index) {
                if mosaic.mark(source, target) {
                    flagged += 1;
                }
            }
        }
        Ok(flagged)
    }

    /// Exchange border contributions with every other domain.
    ///
    /// Every domain of the realization must call this with the same context;
    /// each call passes the same five barriers even after a failure, so a
    /// failing domain never strands the others. Batches reach the ledger in
    /// domain order, which fixes the order of every border contribution.
    pub fn synchronize(
        &mut self,
        ctx: &RealizationContext<T>,
        domain: &DomainView,
        mosaic: &mut MosaicFlags,
    ) -> Result<()> {
        let id = domain.id();
        let mut failure = None;

        if id == 0 {
            ctx.clear_ledger();
        }
        ctx.wait();

        if !ctx.is_aborted() {
            match self.route_nodes(domain) {
                Ok(batch) => ctx.publish(id, batch),
                Err(e) => {
                    ctx.abort();
                    failure = Some(e);
                }
            }
        }
        ctx.wait();

        if id == 0 && !ctx.is_aborted() {
            ctx.merge_batches();
        }
        ctx.wait();

        if !ctx.is_aborted() {
            if let Err(e) = ctx.with_ledger(|ledger| self.border.reconcile(ledger, domain)) {
                ctx.abort();
                failure = Some(e);
            }
        }
        ctx.wait();

        if id == 0 && !ctx.is_aborted() {
            if let Err(e) = ctx.audit() {
                ctx.abort();
                failure = Some(e);
            }
        }
        ctx.wait();

        if let Some(e) = failure {
            return Err(e);
        }
        if ctx.is_aborted() {
            return Err(DisorderError::Aborted { domain: id });
        }

        let flagged = self.mark_mosaic(domain, mosaic)?;
        debug!(
            "domain {id}: {} defects, {} border bonds, {} border on-site terms, {flagged} tiles flagged",
            self.positions.len(),
            self.border.bonds().len(),
            self.border.onsite().len()
        );
        Ok(())
    }

    /// One realization of this defect type in one domain: place, route,
    /// reconcile and flag mosaic tiles.
    pub fn generate_disorder<R: Rng + ?Sized>(
        &mut self,
        ctx: &RealizationContext<T>,
        domain: &DomainView,
        mosaic: &mut MosaicFlags,
        rng: &mut R,
    ) -> Result<()> {
        self.reset();
        let placed = if ctx.is_aborted() {
            Ok(0)
        } else {
            self.place(domain, rng)
        };
        if placed.is_err() {
            ctx.abort();
        }
        let synced = self.synchronize(ctx, domain, mosaic);
        placed.and(synced)
    }
}
