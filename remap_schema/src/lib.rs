//! Shared serializable artifacts for the layer remap tools.
//!
//! The engine crate produces a [`LayerMapArtifact`] once a remap run has been
//! finalized. Downstream tools load the artifact and apply the same index and
//! mask transforms later, without re-running the interactive editing flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Total number of layer slots covered by an exported map.
pub const LAYER_COUNT: usize = 32;

/// Exported old-slot to new-slot lookup, resolved through redirects.
///
/// Index the array with an old slot to get the slot the same data lives on
/// after the remap. Deleted layers point at their redirect target, so applying
/// the map to stale data folds it onto the surviving slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerMapArtifact {
    map: [u32; LAYER_COUNT],
}

/// Error returned when decoding an exported layer map.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to parse layer map artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("layer map artifact sends slot {slot} to out-of-range slot {target}")]
    TargetRange { slot: usize, target: u32 },
}

impl LayerMapArtifact {
    /// Wrap a finished lookup table. Every target must be a valid slot.
    pub fn from_slots(map: [u32; LAYER_COUNT]) -> Self {
        debug_assert!(
            map.iter().all(|&target| (target as usize) < LAYER_COUNT),
            "layer map targets must stay within the 32-slot space"
        );
        Self { map }
    }

    /// The raw old-to-new slot table.
    pub fn slots(&self) -> &[u32; LAYER_COUNT] {
        &self.map
    }

    /// Transform a single layer index. Out-of-range input falls back to
    /// slot 0, keeping the function total for legacy data.
    pub fn transform_layer(&self, old: i32) -> i32 {
        let slot = if (0..LAYER_COUNT as i32).contains(&old) {
            old as usize
        } else {
            0
        };
        self.map[slot] as i32
    }

    /// Transform a 32-bit layer mask. Each set source bit sets the destination
    /// bit the map names; bits folded onto the same destination OR-combine.
    pub fn transform_mask(&self, old: u32) -> u32 {
        let mut result = 0u32;
        for bit in 0..LAYER_COUNT {
            if old >> bit & 1 == 1 {
                result |= 1 << self.map[bit];
            }
        }
        result
    }

    /// Serialize the artifact as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate an artifact from JSON.
    pub fn from_json(text: &str) -> Result<Self, ArtifactError> {
        let artifact: LayerMapArtifact = serde_json::from_str(text)?;
        for (slot, &target) in artifact.map.iter().enumerate() {
            if target as usize >= LAYER_COUNT {
                return Err(ArtifactError::TargetRange { slot, target });
            }
        }
        Ok(artifact)
    }
}
