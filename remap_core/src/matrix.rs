//! Collision matrix engine.
//!
//! The pairwise layer interaction table is stored as 32 row bitmasks. Each
//! physics axis gets its own engine instance that captures the matrix before
//! the label space changes, repairs it (unused rows, asymmetry), transforms it
//! under the new indexing, and writes it back. Failures are recorded against
//! the run but never stop the rest of the pipeline.

use std::fmt;

use crate::corpus::StoreError;
use crate::layer_map::LAYER_COUNT;
use crate::report::ProcessError;
use crate::tables::RemapTables;

/// Physics axis owning an independent collision matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatrixAxis {
    Physics,
    Physics2d,
}

impl MatrixAxis {
    /// Identity used in error records.
    pub fn label(self) -> &'static str {
        match self {
            MatrixAxis::Physics => "physics collision matrix",
            MatrixAxis::Physics2d => "physics 2D collision matrix",
        }
    }
}

impl fmt::Display for MatrixAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Access to the host's collision matrix storage.
pub trait MatrixStore {
    /// Read the 32 row masks for an axis. `StoreError::NotFound` means the
    /// host has no matrix for this axis, which disables the axis silently.
    fn read_matrix(&self, axis: MatrixAxis) -> Result<[u32; LAYER_COUNT], StoreError>;

    fn write_matrix(
        &mut self,
        axis: MatrixAxis,
        masks: &[u32; LAYER_COUNT],
    ) -> Result<(), StoreError>;
}

impl<T: MatrixStore + ?Sized> MatrixStore for &mut T {
    fn read_matrix(&self, axis: MatrixAxis) -> Result<[u32; LAYER_COUNT], StoreError> {
        (**self).read_matrix(axis)
    }

    fn write_matrix(
        &mut self,
        axis: MatrixAxis,
        masks: &[u32; LAYER_COUNT],
    ) -> Result<(), StoreError> {
        (**self).write_matrix(axis, masks)
    }
}

/// Force every row whose layer has no name to collide with everything.
///
/// Unused slots carry no semantic meaning, so the conservative default keeps
/// whatever later lands on them interacting with all layers.
pub fn fix_unused_rows(masks: &mut [u32; LAYER_COUNT], old_names: &[String; LAYER_COUNT]) {
    for (mask, name) in masks.iter_mut().zip(old_names) {
        if name.is_empty() {
            *mask = u32::MAX;
        }
    }
}

/// Repair asymmetry left behind by legacy partial storage: if either side of
/// a pair records the collision, both sides do afterwards.
pub fn symmetrize(masks: &mut [u32; LAYER_COUNT]) {
    for i in 0..LAYER_COUNT {
        for j in 0..LAYER_COUNT {
            if i == j {
                continue;
            }
            let referenced = masks[j] >> i & 1;
            masks[i] |= referenced << j;
        }
    }
}

/// Transform a repaired matrix under the new indexing.
///
/// Rows relocate through the plain table, since every physical layer still
/// owns exactly one row after reindexing. Bit content relocates through the
/// redirected table, so the collision semantics of redirected-away layers
/// move onto their targets.
pub fn transform_matrix(
    masks: &[u32; LAYER_COUNT],
    tables: &RemapTables,
) -> [u32; LAYER_COUNT] {
    let mut result = [0u32; LAYER_COUNT];
    for (old_row, &mask) in masks.iter().enumerate() {
        let new_row = tables.plain.transform_index(old_row as i32) as usize;
        result[new_row] = tables.redirected.transform_mask(mask);
    }
    result
}

/// Per-axis capture/apply driver with a completion flag for the report.
#[derive(Debug, Clone)]
pub struct CollisionMatrixEngine {
    axis: MatrixAxis,
    masks: Option<[u32; LAYER_COUNT]>,
    completed: bool,
}

impl CollisionMatrixEngine {
    pub fn new(axis: MatrixAxis) -> Self {
        Self {
            axis,
            masks: None,
            completed: false,
        }
    }

    pub fn axis(&self) -> MatrixAxis {
        self.axis
    }

    /// True once the transformed matrix has been written back.
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Read and repair the matrix. Must run before the label space changes,
    /// because unused-row detection needs the old names.
    pub fn capture<S: MatrixStore>(
        &mut self,
        store: &S,
        old_names: &[String; LAYER_COUNT],
        errors: &mut Vec<ProcessError>,
    ) {
        self.masks = None;
        match store.read_matrix(self.axis) {
            Ok(mut masks) => {
                fix_unused_rows(&mut masks, old_names);
                symmetrize(&mut masks);
                self.masks = Some(masks);
            }
            Err(StoreError::NotFound(_)) => {
                tracing::debug!(axis = %self.axis, "no matrix stored for axis, skipping");
            }
            Err(err) => {
                tracing::warn!(axis = %self.axis, error = %err, "matrix read failed");
                errors.push(ProcessError::new(
                    self.axis.label(),
                    format!("failed to read {}: {}", self.axis, err),
                ));
            }
        }
    }

    /// Transform the captured matrix and write it back.
    pub fn apply<S: MatrixStore>(
        &mut self,
        store: &mut S,
        tables: &RemapTables,
        errors: &mut Vec<ProcessError>,
    ) {
        let Some(masks) = self.masks else {
            return;
        };
        let transformed = transform_matrix(&masks, tables);
        match store.write_matrix(self.axis, &transformed) {
            Ok(()) => {
                self.completed = true;
                tracing::info!(axis = %self.axis, "matrix remapped");
            }
            Err(err) => {
                tracing::warn!(axis = %self.axis, error = %err, "matrix write failed");
                errors.push(ProcessError::new(
                    self.axis.label(),
                    format!("failed to write {}: {}", self.axis, err),
                ));
            }
        }
    }
}
