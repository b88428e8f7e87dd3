//! Editable layer map model.
//!
//! Holds the 24 renamable slots layered over the 8 fixed slots, tracks the
//! redirect graph between entries, and enforces the validity rules an applied
//! map must satisfy. Entries are ordered; an entry's position defines the new
//! slot it lands on (position + 8), while `old_index` records the slot it
//! came from.

use std::collections::{HashMap, HashSet};

/// Total number of layer slots.
pub const LAYER_COUNT: usize = 32;
/// Slots 0..8 are fixed and cannot be renamed or moved.
pub const FIXED_LAYER_COUNT: usize = 8;
/// Slots 8..32 are editable.
pub const EDITABLE_LAYER_COUNT: usize = 24;

/// One editable slot: current name, the pre-edit snapshot, and an optional
/// redirect for slots being deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerMapEntry {
    name: String,
    old_name: String,
    old_index: usize,
    redirect: Option<usize>,
}

impl LayerMapEntry {
    fn new(name: String, old_index: usize) -> Self {
        Self {
            old_name: name.clone(),
            name,
            old_index,
            redirect: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name the slot carried before editing began. Empty for slots that were
    /// unused at session start.
    pub fn old_name(&self) -> &str {
        &self.old_name
    }

    pub fn old_index(&self) -> usize {
        self.old_index
    }

    /// Redirect target: a fixed slot index or another entry's `old_index`.
    pub fn redirect(&self) -> Option<usize> {
        self.redirect
    }
}

/// The 24-entry editable map plus the fixed-layer names it sits on.
///
/// Mutations keep the redirect graph consistent through a reverse-adjacency
/// map (`target old_index` to the entries pointing at it), so group
/// propagation never rescans the whole collection.
#[derive(Debug, Clone)]
pub struct LayerMapModel {
    fixed_names: [String; FIXED_LAYER_COUNT],
    entries: Vec<LayerMapEntry>,
    dependents: HashMap<usize, HashSet<usize>>,
    dirty: bool,
}

impl LayerMapModel {
    /// Build the map from the host's live layer-name snapshot.
    pub fn from_names(names: &[String; LAYER_COUNT]) -> Self {
        let fixed_names: [String; FIXED_LAYER_COUNT] =
            std::array::from_fn(|slot| names[slot].clone());
        let entries = (FIXED_LAYER_COUNT..LAYER_COUNT)
            .map(|old_index| LayerMapEntry::new(names[old_index].clone(), old_index))
            .collect();
        Self {
            fixed_names,
            entries,
            dependents: HashMap::new(),
            dirty: false,
        }
    }

    pub fn entries(&self) -> &[LayerMapEntry] {
        &self.entries
    }

    /// Entry at a position in the edited order. Out-of-range positions are a
    /// caller bug and panic.
    pub fn entry(&self, index: usize) -> &LayerMapEntry {
        &self.entries[index]
    }

    /// Look an entry up by the slot it occupied before editing.
    pub fn entry_by_old_index(&self, old_index: usize) -> Option<&LayerMapEntry> {
        self.entries.iter().find(|e| e.old_index == old_index)
    }

    pub fn fixed_name(&self, index: usize) -> &str {
        &self.fixed_names[index]
    }

    /// True once any mutation has been applied since construction.
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    /// Rename the entry at `index`. Clearing the name marks the slot deleted
    /// and drops every redirect that pointed at it.
    pub fn set_name(&mut self, index: usize, name: impl Into<String>) {
        let name = name.into();
        let cleared = name.is_empty();
        let old_index = self.entries[index].old_index;
        self.entries[index].name = name;
        if cleared {
            if let Some(deps) = self.dependents.remove(&old_index) {
                for dep in deps {
                    if let Some(pos) = self.position_by_old_index(dep) {
                        self.entries[pos].redirect = None;
                    }
                }
            }
        }
        self.dirty = true;
    }

    /// Point the entry at `index` at a redirect target, or clear it.
    ///
    /// Redirect groups move together: every entry that redirected at this
    /// entry's old slot follows it to the new target. Clearing the redirect on
    /// a deleted slot clears its whole group.
    pub fn set_redirect(&mut self, index: usize, target: Option<usize>) {
        let old_index = self.entries[index].old_index;

        if let Some(previous) = self.entries[index].redirect {
            if let Some(deps) = self.dependents.get_mut(&previous) {
                deps.remove(&old_index);
                if deps.is_empty() {
                    self.dependents.remove(&previous);
                }
            }
        }
        self.entries[index].redirect = target;

        match target {
            Some(target) => {
                self.dependents
                    .entry(target)
                    .or_default()
                    .insert(old_index);
                if let Some(deps) = self.dependents.remove(&old_index) {
                    for dep in deps {
                        if let Some(pos) = self.position_by_old_index(dep) {
                            self.entries[pos].redirect = Some(target);
                        }
                        self.dependents.entry(target).or_default().insert(dep);
                    }
                }
            }
            None => {
                if self.entries[index].old_name.is_empty() {
                    if let Some(deps) = self.dependents.remove(&old_index) {
                        for dep in deps {
                            if let Some(pos) = self.position_by_old_index(dep) {
                                self.entries[pos].redirect = None;
                            }
                        }
                    }
                }
            }
        }
        self.dirty = true;
    }

    /// Relocate an entry to a new position in the edited order.
    pub fn move_entry(&mut self, from: usize, to: usize) {
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.dirty = true;
    }

    /// An entry is valid unless it represents an unresolved deletion (no name,
    /// no redirect, but a non-empty old name) or its name collides with
    /// another entry's.
    pub fn is_entry_valid(&self, index: usize) -> bool {
        let entry = &self.entries[index];
        if !entry.name.is_empty() {
            let collides = self
                .entries
                .iter()
                .enumerate()
                .any(|(other, e)| other != index && e.name == entry.name);
            if collides {
                return false;
            }
        }
        entry.redirect.is_some() || !entry.name.is_empty() || entry.old_name.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        (0..self.entries.len()).all(|index| self.is_entry_valid(index))
    }

    /// Names of all 32 slots as they were before editing, indexed by old slot.
    /// The matrix engine uses this to spot unused slots.
    pub fn old_layer_names(&self) -> [String; LAYER_COUNT] {
        let mut names: [String; LAYER_COUNT] = std::array::from_fn(|_| String::new());
        for (index, name) in self.fixed_names.iter().enumerate() {
            names[index] = name.clone();
        }
        for entry in &self.entries {
            names[entry.old_index] = entry.old_name.clone();
        }
        names
    }

    /// The 24 editable names in their new order, ready for the label store.
    pub fn new_editable_names(&self) -> [String; EDITABLE_LAYER_COUNT] {
        std::array::from_fn(|position| self.entries[position].name.clone())
    }

    fn position_by_old_index(&self, old_index: usize) -> Option<usize> {
        self.entries.iter().position(|e| e.old_index == old_index)
    }
}
