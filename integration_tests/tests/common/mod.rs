use std::collections::HashMap;

use remap_core::{
    CorpusHost, ItemId, ItemPayload, LeafKind, MatrixAxis, MatrixStore, PropertyLeaf,
    PropertyTree, SettingsStore, StoreError, EDITABLE_LAYER_COUNT, LAYER_COUNT,
};

/// In-memory host backing a full pipeline run: layer-name settings, collision
/// matrices, and a small corpus with per-item commit tracking.
pub struct MemoryHost {
    pub names: [String; LAYER_COUNT],
    pub matrices: HashMap<MatrixAxis, [u32; LAYER_COUNT]>,
    pub items: Vec<(String, ItemPayload)>,
    pub committed: Vec<ItemId>,
    pub fail_commit_for: Vec<ItemId>,
    pub fail_names_write: bool,
    pub fail_matrix_write: bool,
}

impl MemoryHost {
    pub fn new(names: [String; LAYER_COUNT]) -> Self {
        Self {
            names,
            matrices: HashMap::new(),
            items: Vec::new(),
            committed: Vec::new(),
            fail_commit_for: Vec::new(),
            fail_names_write: false,
            fail_matrix_write: false,
        }
    }

    pub fn add_item(&mut self, label: &str, payload: ItemPayload) -> ItemId {
        self.items.push((label.to_string(), payload));
        ItemId(self.items.len() as u32 - 1)
    }

    pub fn payload(&self, item: ItemId) -> &ItemPayload {
        &self.items[item.0 as usize].1
    }
}

impl SettingsStore for MemoryHost {
    fn read_layer_names(&self) -> Result<[String; LAYER_COUNT], StoreError> {
        Ok(self.names.clone())
    }

    fn write_editable_layer_names(
        &mut self,
        names: &[String; EDITABLE_LAYER_COUNT],
    ) -> Result<(), StoreError> {
        if self.fail_names_write {
            return Err(StoreError::Backend("settings store unavailable".to_string()));
        }
        for (offset, name) in names.iter().enumerate() {
            self.names[8 + offset] = name.clone();
        }
        Ok(())
    }
}

impl MatrixStore for MemoryHost {
    fn read_matrix(&self, axis: MatrixAxis) -> Result<[u32; LAYER_COUNT], StoreError> {
        self.matrices
            .get(&axis)
            .copied()
            .ok_or_else(|| StoreError::NotFound(axis.label().to_string()))
    }

    fn write_matrix(
        &mut self,
        axis: MatrixAxis,
        masks: &[u32; LAYER_COUNT],
    ) -> Result<(), StoreError> {
        if self.fail_matrix_write {
            return Err(StoreError::Backend("matrix store is read-only".to_string()));
        }
        self.matrices.insert(axis, *masks);
        Ok(())
    }
}

impl CorpusHost for MemoryHost {
    fn list_items(&self) -> Vec<ItemId> {
        (0..self.items.len() as u32).map(ItemId).collect()
    }

    fn item_label(&self, item: ItemId) -> String {
        self.items[item.0 as usize].0.clone()
    }

    fn payload_mut(&mut self, item: ItemId) -> Result<&mut ItemPayload, StoreError> {
        match self.items.get_mut(item.0 as usize) {
            Some((_, payload)) => Ok(payload),
            None => Err(StoreError::NotFound(format!("item {item}"))),
        }
    }

    fn commit(&mut self, item: ItemId) -> Result<(), StoreError> {
        if self.fail_commit_for.contains(&item) {
            return Err(StoreError::Backend("commit refused by host".to_string()));
        }
        self.committed.push(item);
        Ok(())
    }
}

/// Layer-name fixture: a handful of named editable slots over the fixed set.
pub fn project_names() -> [String; LAYER_COUNT] {
    let mut names: [String; LAYER_COUNT] = std::array::from_fn(|_| String::new());
    for (slot, name) in ["Default", "Effects", "Raycast", "", "Water", "Overlay"]
        .iter()
        .enumerate()
    {
        names[slot] = (*name).to_string();
    }
    names[8] = "Terrain".to_string();
    names[9] = "Props".to_string();
    names[10] = "Actors".to_string();
    names[12] = "Projectiles".to_string();
    names[15] = "Triggers".to_string();
    names
}

pub fn mask_leaf(path: &str, value: i64) -> PropertyLeaf {
    PropertyLeaf::new(path, LeafKind::LayerMask, value)
}

pub fn mask_tree(path: &str, value: i64) -> PropertyTree {
    PropertyTree::new(vec![mask_leaf(path, value)])
}
