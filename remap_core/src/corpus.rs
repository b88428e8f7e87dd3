//! Corpus data model and the trait boundary to the owning host.
//!
//! The engine never loads or saves anything itself: the host hands it item
//! handles, materializes each item's property data on demand, and persists
//! whatever the engine rewrote. Items come in exactly three storage shapes,
//! modeled as a closed variant so every traversal path is spelled out.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layer_map::{EDITABLE_LAYER_COUNT, LAYER_COUNT};

/// Identifier for one corpus item supplied by the host. Stable for one run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classification of a corpus item's storage shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    CompositeGraph,
    OverrideDelta,
    PropertyBag,
}

/// Semantic type of one property leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafKind {
    /// A single layer index assignment.
    LayerIndex,
    /// A 32-bit layer membership mask.
    LayerMask,
    /// Anything else. Never rewritten.
    Other,
}

/// One leaf in a property tree: a path, a semantic kind, and the raw value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyLeaf {
    pub path: String,
    pub kind: LeafKind,
    pub value: i64,
}

impl PropertyLeaf {
    pub fn new(path: impl Into<String>, kind: LeafKind, value: i64) -> Self {
        Self {
            path: path.into(),
            kind,
            value,
        }
    }
}

/// A flat sequence of leaves in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyTree {
    pub leaves: Vec<PropertyLeaf>,
}

impl PropertyTree {
    pub fn new(leaves: Vec<PropertyLeaf>) -> Self {
        Self { leaves }
    }
}

/// One node of a composite object graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectNode {
    pub name: String,
    /// The node's single-index layer assignment.
    pub layer: i32,
    /// Property trees of the components attached to this node.
    pub components: Vec<PropertyTree>,
    pub children: Vec<ObjectNode>,
    /// Present when this node instances a shared base stored elsewhere. Such
    /// nodes are rewritten through their override deltas only; the base is
    /// processed wherever it lives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<OverrideSet>,
}

impl ObjectNode {
    pub fn new(name: impl Into<String>, layer: i32) -> Self {
        Self {
            name: name.into(),
            layer,
            components: Vec::new(),
            children: Vec::new(),
            overrides: None,
        }
    }
}

/// One sparse property override: which base tree it targets, the path of the
/// overridden property, and the override value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideMod {
    /// Index into the owning set's target trees.
    pub target: usize,
    pub path: String,
    pub value: i64,
}

/// Sparse overrides layered on shared base definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverrideSet {
    /// Base property trees the modifications are layered on, read-only here.
    pub targets: Vec<PropertyTree>,
    pub mods: Vec<OverrideMod>,
}

/// Where a composite item came from; the report attributes counts by origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositeOrigin {
    Scene,
    Prefab,
}

/// A composite object graph item: one root for prefabs, several for scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeItem {
    pub origin: CompositeOrigin,
    pub roots: Vec<ObjectNode>,
}

/// A standalone data asset: flat property trees, no hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BagItem {
    pub objects: Vec<PropertyTree>,
}

/// The three storage shapes a corpus item can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemPayload {
    Composite(CompositeItem),
    Overrides(OverrideSet),
    Bag(BagItem),
}

impl ItemPayload {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemPayload::Composite(_) => ItemKind::CompositeGraph,
            ItemPayload::Overrides(_) => ItemKind::OverrideDelta,
            ItemPayload::Bag(_) => ItemKind::PropertyBag,
        }
    }
}

/// Error surfaced by host-backed stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store entry not found: {0}")]
    NotFound(String),
    #[error("malformed store entry: {0}")]
    Malformed(String),
    #[error("{0}")]
    Backend(String),
}

/// Access to the host's layer-name settings.
pub trait SettingsStore {
    /// Snapshot of all 32 layer names, taken at session start.
    fn read_layer_names(&self) -> Result<[String; LAYER_COUNT], StoreError>;

    /// Persist the 24 editable names in their new order. Called once during
    /// setup, before any corpus item is touched.
    fn write_editable_layer_names(
        &mut self,
        names: &[String; EDITABLE_LAYER_COUNT],
    ) -> Result<(), StoreError>;
}

// Hosts are commonly borrowed for the lifetime of one session, so the store
// traits pass through mutable references.
impl<T: SettingsStore + ?Sized> SettingsStore for &mut T {
    fn read_layer_names(&self) -> Result<[String; LAYER_COUNT], StoreError> {
        (**self).read_layer_names()
    }

    fn write_editable_layer_names(
        &mut self,
        names: &[String; EDITABLE_LAYER_COUNT],
    ) -> Result<(), StoreError> {
        (**self).write_editable_layer_names(names)
    }
}

/// Access to the object corpus.
pub trait CorpusHost {
    /// The items to visit, in a stable order for the duration of one run.
    fn list_items(&self) -> Vec<ItemId>;

    /// Human-readable identity used in error records and logs.
    fn item_label(&self, item: ItemId) -> String;

    /// Materialize an item's property data for rewriting.
    fn payload_mut(&mut self, item: ItemId) -> Result<&mut ItemPayload, StoreError>;

    /// Flush a rewritten item. Called only for items that changed.
    fn commit(&mut self, item: ItemId) -> Result<(), StoreError>;
}

impl<T: CorpusHost + ?Sized> CorpusHost for &mut T {
    fn list_items(&self) -> Vec<ItemId> {
        (**self).list_items()
    }

    fn item_label(&self, item: ItemId) -> String {
        (**self).item_label(item)
    }

    fn payload_mut(&mut self, item: ItemId) -> Result<&mut ItemPayload, StoreError> {
        (**self).payload_mut(item)
    }

    fn commit(&mut self, item: ItemId) -> Result<(), StoreError> {
        (**self).commit(item)
    }
}
