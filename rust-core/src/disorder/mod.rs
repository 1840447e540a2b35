// Disorder module: random defect placement and cross-domain synchronization
// Each domain places its own defects; terms that land outside the domain go through a shared ledger

// ======================== MODULE DECLARATIONS ========================
pub mod apply;
pub mod border;
pub mod defect_operator;
pub mod defect_template;
pub mod ledger;
pub mod mosaic;
pub mod placement;
pub mod realization;

mod _tests_placement;

// ======================== DEFECT MOTIFS ========================
pub use defect_template::{
    Bond,                           // struct - hopping between two motif nodes
    DefectTemplate,                 // struct - immutable motif with concentration, bonds and on-site terms
    Moments,                        // struct - displacement-weighted hoppings per bond
    NodeOffset,                     // struct - decoded node offset (cell shift, orbital, padded delta)
    OnsiteTerm,                     // struct - on-site energy of a motif node
    decode_offset,                  // fn(&LatticeStructure, u64) -> Result<NodeOffset>
    encode_offset,                  // fn(&LatticeStructure, isize) -> Option<u64>
};

// ======================== PLACEMENT ========================
pub use placement::{
    PlacedDefectSet,                // struct - per-tile sorted roots of placed defects
    place_defects,                  // fn - rejection sampling of distinct roots
    target_count,                   // fn(p, N) -> floor(p*N)
};

// ======================== SYNCHRONIZATION ========================
pub use ledger::{CrossDomainLedger, LedgerEntryKind};   // shared border ledger with claim counters
pub use border::{BorderBond, BorderContribution, BorderOnsite};
pub use mosaic::MosaicFlags;                            // tiles exempt from lazy zeroing
pub use defect_operator::DefectOperator;                // one defect type in one domain
pub use realization::{
    DisorderSummary,                // struct - per-domain counters
    RealizationContext,             // struct - ledger, barrier and abort flag shared by all domains
    StructuralDisorder,             // struct - all defect types of one domain
    realization_seed,               // fn(seed, realization, domain) -> u64
    run_realization,                // fn - one realization on every domain, one thread each
};

// ======================== OPERATOR APPLICATION ========================
pub use apply::Moment;              // enum - First(a) | Second(a, b)
