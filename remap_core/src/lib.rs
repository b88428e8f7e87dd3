//! Core engine for re-indexing the 32-slot layer space.
//!
//! Eight slots are fixed, twenty-four are editable. A finalized
//! [`LayerMapModel`] describes how the editable slots were renamed, reordered,
//! deleted, or redirected; [`build_tables`] derives the two old-to-new lookup
//! tables from it; and a [`RemapSession`] rewrites every stored layer index,
//! layer mask, and collision matrix row in the host's corpus to match, one
//! item per [`RemapSession::tick`].

pub mod corpus;
pub mod layer_map;
pub mod matrix;
pub mod pipeline;
pub mod report;
pub mod rewrite;
pub mod tables;

pub use corpus::{
    BagItem, CompositeItem, CompositeOrigin, CorpusHost, ItemId, ItemKind, ItemPayload, LeafKind,
    ObjectNode, OverrideMod, OverrideSet, PropertyLeaf, PropertyTree, SettingsStore, StoreError,
};
pub use layer_map::{
    LayerMapEntry, LayerMapModel, EDITABLE_LAYER_COUNT, FIXED_LAYER_COUNT, LAYER_COUNT,
};
pub use matrix::{CollisionMatrixEngine, MatrixAxis, MatrixStore};
pub use pipeline::{PipelineState, RemapHost, RemapSession, SetupError, StepResult};
pub use report::{CompletionReport, ProcessError, RemapCounters};
pub use tables::{build_tables, RemapTable, RemapTables};
