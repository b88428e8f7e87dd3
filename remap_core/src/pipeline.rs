//! Incremental corpus-rewrite pipeline.
//!
//! A [`RemapSession`] owns the host boundary and drives one remap run:
//! `begin` performs the setup phase (matrix capture, label rename, table
//! build, matrix apply), then each `tick` processes exactly one corpus item
//! so the host can interleave progress rendering between calls. Per-item
//! failures are recorded and skipped; nothing short of a setup error stops a
//! run, and a session dropped mid-run drains itself to completion rather than
//! leave the corpus half-migrated.

use thiserror::Error;

use crate::corpus::{
    CompositeOrigin, CorpusHost, ItemId, ItemPayload, ObjectNode, SettingsStore, StoreError,
};
use crate::layer_map::LayerMapModel;
use crate::matrix::{CollisionMatrixEngine, MatrixAxis, MatrixStore};
use crate::report::{CompletionReport, ProcessError, RemapCounters};
use crate::rewrite::{rewrite_overrides, rewrite_tree};
use crate::tables::{build_tables, RemapTables};
use remap_schema::LayerMapArtifact;

/// Everything a session needs from its host.
pub trait RemapHost: SettingsStore + CorpusHost + MatrixStore {}

impl<T: SettingsStore + CorpusHost + MatrixStore> RemapHost for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Processing,
    Complete,
}

/// Outcome of one `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// More items remain; call `tick` again.
    Continue,
    /// The run is finished (or no run is active).
    Done,
}

/// Fatal setup failure. No corpus mutation has occurred when this is
/// returned; the session stays idle.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("layer map is invalid; resolve deleted layers before applying")]
    InvalidMap,
    #[error("layer map has no pending modifications")]
    NothingToApply,
    #[error("failed to update layer name settings: {0}")]
    LabelStore(#[source] StoreError),
}

/// One remap run over a host's corpus.
pub struct RemapSession<H: RemapHost> {
    host: H,
    state: PipelineState,
    tables: Option<RemapTables>,
    queue: Vec<ItemId>,
    cursor: usize,
    counters: RemapCounters,
    errors: Vec<ProcessError>,
    physics: CollisionMatrixEngine,
    physics_2d: CollisionMatrixEngine,
    report: Option<CompletionReport>,
}

impl<H: RemapHost> RemapSession<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            state: PipelineState::Idle,
            tables: None,
            queue: Vec::new(),
            cursor: 0,
            counters: RemapCounters::default(),
            errors: Vec::new(),
            physics: CollisionMatrixEngine::new(MatrixAxis::Physics),
            physics_2d: CollisionMatrixEngine::new(MatrixAxis::Physics2d),
            report: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn counters(&self) -> RemapCounters {
        self.counters
    }

    pub fn errors(&self) -> &[ProcessError] {
        &self.errors
    }

    /// Available once the run has completed.
    pub fn report(&self) -> Option<&CompletionReport> {
        self.report.as_ref()
    }

    /// Items processed so far and the total queued for this run.
    pub fn progress(&self) -> (usize, usize) {
        (self.cursor.min(self.queue.len()), self.queue.len())
    }

    /// Export the finalized redirected table so other tools can apply the
    /// same transform later. Available once processing has begun.
    pub fn export_map(&self) -> Option<LayerMapArtifact> {
        let tables = self.tables.as_ref()?;
        let mut map = [0u32; 32];
        for (slot, &target) in tables.redirected.slots().iter().enumerate() {
            map[slot] = target as u32;
        }
        Some(LayerMapArtifact::from_slots(map))
    }

    /// Run the setup phase and enter `Processing`.
    ///
    /// The map must be finalized: valid, and actually changed. Matrix capture
    /// happens before the label rename because unused-row detection needs the
    /// old names; the rename itself is the one fatal step, since a corpus
    /// rewritten against names that failed to persist would be inconsistent.
    pub fn begin(&mut self, map: &LayerMapModel) -> Result<(), SetupError> {
        debug_assert!(
            self.state == PipelineState::Idle,
            "begin called while a run is active"
        );
        if !map.is_valid() {
            return Err(SetupError::InvalidMap);
        }
        if !map.dirty() {
            return Err(SetupError::NothingToApply);
        }

        self.counters = RemapCounters::default();
        self.errors.clear();
        self.report = None;
        self.physics = CollisionMatrixEngine::new(MatrixAxis::Physics);
        self.physics_2d = CollisionMatrixEngine::new(MatrixAxis::Physics2d);

        let old_names = map.old_layer_names();
        self.physics.capture(&self.host, &old_names, &mut self.errors);
        self.physics_2d
            .capture(&self.host, &old_names, &mut self.errors);

        self.host
            .write_editable_layer_names(&map.new_editable_names())
            .map_err(SetupError::LabelStore)?;

        let tables = build_tables(map);
        self.physics.apply(&mut self.host, &tables, &mut self.errors);
        self.physics_2d
            .apply(&mut self.host, &tables, &mut self.errors);
        self.tables = Some(tables);

        self.queue = self.host.list_items();
        self.cursor = 0;
        self.state = PipelineState::Processing;
        tracing::info!(items = self.queue.len(), "layer remap processing started");
        Ok(())
    }

    /// Process at most one corpus item. Returns `Done` once the run is
    /// complete; the final call also assembles the report.
    pub fn tick(&mut self) -> StepResult {
        if self.state != PipelineState::Processing {
            return StepResult::Done;
        }

        if self.cursor < self.queue.len() {
            let item = self.queue[self.cursor];
            self.cursor += 1;
            if let Err(err) = self.process_item(item) {
                let label = self.host.item_label(item);
                tracing::warn!(item = %label, error = %err, "failed to process corpus item");
                self.errors.push(ProcessError::new(label, err.to_string()));
            }
        }

        if self.cursor >= self.queue.len() {
            self.finish();
            StepResult::Done
        } else {
            StepResult::Continue
        }
    }

    /// Synchronously process every remaining item.
    pub fn drain(&mut self) {
        while self.tick() == StepResult::Continue {}
    }

    /// Return to idle, discarding run state. An active run is drained first:
    /// the remap tables are single-use, so abandoning items mid-run would
    /// leave the corpus referencing a mix of old and new indices.
    pub fn reset(&mut self) {
        if self.state == PipelineState::Processing {
            self.drain();
        }
        self.state = PipelineState::Idle;
        self.tables = None;
        self.queue.clear();
        self.cursor = 0;
        self.counters = RemapCounters::default();
        self.errors.clear();
        self.physics = CollisionMatrixEngine::new(MatrixAxis::Physics);
        self.physics_2d = CollisionMatrixEngine::new(MatrixAxis::Physics2d);
        self.report = None;
    }

    fn process_item(&mut self, item: ItemId) -> Result<(), StoreError> {
        let tables = *self
            .tables
            .as_ref()
            .expect("tables are built before processing starts");
        let before = self.counters;
        let mut item_changed = false;

        match self.host.payload_mut(item)? {
            ItemPayload::Composite(composite) => {
                for root in &mut composite.roots {
                    process_node(root, &tables, &mut self.counters, &mut item_changed);
                }
                let counted = self.counters.objects > before.objects
                    || self.counters.components > before.components;
                if counted {
                    match composite.origin {
                        CompositeOrigin::Scene => self.counters.scenes += 1,
                        CompositeOrigin::Prefab => self.counters.prefabs += 1,
                    }
                }
            }
            ItemPayload::Overrides(set) => {
                if rewrite_overrides(set, &tables) {
                    item_changed = true;
                }
            }
            ItemPayload::Bag(bag) => {
                for tree in &mut bag.objects {
                    let rewritten = rewrite_tree(tree, &tables.redirected);
                    if rewritten > 0 {
                        self.counters.masks += rewritten as u32;
                        self.counters.assets += 1;
                        item_changed = true;
                    }
                }
            }
        }

        if item_changed {
            self.host.commit(item)?;
        }
        tracing::debug!(item = %item, changed = item_changed, "processed corpus item");
        Ok(())
    }

    fn finish(&mut self) {
        if self.state != PipelineState::Processing {
            return;
        }
        self.state = PipelineState::Complete;
        self.report = Some(CompletionReport {
            counters: self.counters,
            physics_matrix_completed: self.physics.completed(),
            physics_2d_matrix_completed: self.physics_2d.completed(),
            errors: self.errors.clone(),
        });
        tracing::info!(
            objects = self.counters.objects,
            masks = self.counters.masks,
            errors = self.errors.len(),
            "layer remap processing complete"
        );
    }
}

impl<H: RemapHost> Drop for RemapSession<H> {
    fn drop(&mut self) {
        if self.state == PipelineState::Processing {
            tracing::warn!("remap session dropped mid-run, draining remaining items");
            self.drain();
        }
    }
}

/// Rewrite one graph node, children before the node itself.
///
/// Nodes instancing a shared base only get their override deltas rewritten;
/// the base graph is processed wherever it is stored. The node's own layer
/// assignment follows user redirects, so it goes through the redirected
/// table like every leaf value.
fn process_node(
    node: &mut ObjectNode,
    tables: &RemapTables,
    counters: &mut RemapCounters,
    item_changed: &mut bool,
) {
    if let Some(overrides) = node.overrides.as_mut() {
        if rewrite_overrides(overrides, tables) {
            *item_changed = true;
        }
        return;
    }

    for child in &mut node.children {
        process_node(child, tables, counters, item_changed);
    }

    let new_layer = tables.redirected.transform_index(node.layer);
    if new_layer != node.layer {
        node.layer = new_layer;
        counters.objects += 1;
        *item_changed = true;
    }

    for component in &mut node.components {
        let rewritten = rewrite_tree(component, &tables.redirected);
        if rewritten > 0 {
            counters.masks += rewritten as u32;
            counters.components += 1;
            *item_changed = true;
        }
    }
}
