//! Leaf-level rewriting: layer masks in property trees, and override deltas
//! cross-referenced against their base trees.

use crate::corpus::{LeafKind, OverrideSet, PropertyTree};
use crate::tables::{RemapTable, RemapTables};

/// Rewrite every layer-mask leaf in the tree, returning how many changed.
///
/// Walks each leaf exactly once and touches nothing but mask-kind leaves;
/// single-index layer assignments live on graph nodes and are handled by the
/// traversal. Calling this twice on the same tree with the same table
/// double-transforms, so callers invoke it at most once per tree per run.
pub fn rewrite_tree(tree: &mut PropertyTree, table: &RemapTable) -> usize {
    let mut changed = 0;
    for leaf in &mut tree.leaves {
        if leaf.kind != LeafKind::LayerMask {
            continue;
        }
        let old = leaf.value as u32;
        let new = table.transform_mask(old);
        if new != old {
            leaf.value = new as i64;
            changed += 1;
        }
    }
    changed
}

/// Apply the remap to a set of override deltas layered on shared base trees.
///
/// For each modification, the base tree is walked in traversal order and the
/// first leaf whose path matches decides the interpretation: a layer-index
/// leaf is remapped directly through the redirected table, and a leaf
/// immediately preceded by a layer-mask leaf is treated as the mask value.
/// Later leaves matching the same path are never considered.
///
/// Returns whether any override value changed.
pub fn rewrite_overrides(set: &mut OverrideSet, tables: &RemapTables) -> bool {
    let OverrideSet { targets, mods } = set;
    let mut changed = false;
    for modification in mods.iter_mut() {
        let Some(target) = targets.get(modification.target) else {
            continue;
        };
        let mut previous_kind = None;
        for leaf in &target.leaves {
            if leaf.path == modification.path {
                match leaf.kind {
                    LeafKind::LayerIndex => {
                        let old = modification.value as i32;
                        let new = tables.redirected.transform_index(old);
                        if new != old {
                            modification.value = new as i64;
                            changed = true;
                        }
                    }
                    _ => {
                        if previous_kind == Some(LeafKind::LayerMask) {
                            let old = modification.value as u32;
                            let new = tables.redirected.transform_mask(old);
                            if new != old {
                                modification.value = new as i64;
                                changed = true;
                            }
                        }
                    }
                }
                break;
            }
            previous_kind = Some(leaf.kind);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{OverrideMod, PropertyLeaf};
    use crate::layer_map::{LayerMapModel, LAYER_COUNT};
    use crate::tables::build_tables;

    fn swap_tables() -> RemapTables {
        // Old slots 8 and 9 trade places; slot 12 redirects onto fixed slot 4.
        let mut names: [String; LAYER_COUNT] = std::array::from_fn(|_| String::new());
        names[0] = "Default".to_string();
        names[4] = "Water".to_string();
        names[8] = "Terrain".to_string();
        names[9] = "Props".to_string();
        names[12] = "Projectiles".to_string();
        let mut map = LayerMapModel::from_names(&names);
        map.move_entry(0, 1);
        map.set_name(4, "");
        map.set_redirect(4, Some(4));
        build_tables(&map)
    }

    #[test]
    fn only_mask_leaves_are_rewritten() {
        let tables = swap_tables();
        let mut tree = PropertyTree::new(vec![
            PropertyLeaf::new("speed", LeafKind::Other, 7),
            PropertyLeaf::new("vision.mask", LeafKind::LayerMask, 1 << 8),
            PropertyLeaf::new("home_layer", LeafKind::LayerIndex, 8),
        ]);
        let changed = rewrite_tree(&mut tree, &tables.redirected);
        assert_eq!(changed, 1);
        assert_eq!(tree.leaves[0].value, 7);
        assert_eq!(tree.leaves[1].value, 1 << 9);
        // Index leaves are the traversal's concern, not the rewriter's.
        assert_eq!(tree.leaves[2].value, 8);
    }

    #[test]
    fn unchanged_masks_do_not_count() {
        let tables = swap_tables();
        let mut tree = PropertyTree::new(vec![PropertyLeaf::new(
            "vision.mask",
            LeafKind::LayerMask,
            1 << 3,
        )]);
        assert_eq!(rewrite_tree(&mut tree, &tables.redirected), 0);
        assert_eq!(tree.leaves[0].value, 1 << 3);
    }

    #[test]
    fn negative_mask_values_transform_as_full_masks() {
        let tables = swap_tables();
        let mut tree = PropertyTree::new(vec![PropertyLeaf::new(
            "vision.mask",
            LeafKind::LayerMask,
            -1,
        )]);
        // All bits set stays all bits set under a permutation with a redirect
        // folding one slot away and freeing none outside the 32-slot space.
        rewrite_tree(&mut tree, &tables.redirected);
        let result = tree.leaves[0].value as u32;
        assert_eq!(result >> 4 & 1, 1);
        assert_eq!(result >> 8 & 1, 1);
    }

    #[test]
    fn override_index_rewrites_through_redirects() {
        let tables = swap_tables();
        let base = PropertyTree::new(vec![
            PropertyLeaf::new("name", LeafKind::Other, 0),
            PropertyLeaf::new("layer", LeafKind::LayerIndex, 0),
        ]);
        let mut set = OverrideSet {
            targets: vec![base],
            mods: vec![OverrideMod {
                target: 0,
                path: "layer".to_string(),
                value: 12,
            }],
        };
        assert!(rewrite_overrides(&mut set, &tables));
        // Slot 12 redirected onto fixed slot 4.
        assert_eq!(set.mods[0].value, 4);
    }

    #[test]
    fn override_mask_requires_preceding_mask_leaf() {
        let tables = swap_tables();
        let base = PropertyTree::new(vec![
            PropertyLeaf::new("vision", LeafKind::LayerMask, 0),
            PropertyLeaf::new("vision.bits", LeafKind::Other, 0),
            PropertyLeaf::new("radius", LeafKind::Other, 0),
        ]);
        let mut set = OverrideSet {
            targets: vec![base],
            mods: vec![
                OverrideMod {
                    target: 0,
                    path: "vision.bits".to_string(),
                    value: 1 << 8,
                },
                OverrideMod {
                    target: 0,
                    path: "radius".to_string(),
                    value: 1 << 8,
                },
            ],
        };
        assert!(rewrite_overrides(&mut set, &tables));
        assert_eq!(set.mods[0].value, 1 << 9);
        // Not preceded by a mask leaf, so not a mask: untouched.
        assert_eq!(set.mods[1].value, 1 << 8);
    }

    #[test]
    fn first_path_match_wins() {
        let tables = swap_tables();
        // Two leaves share a path; the first is not mask-preceded, so the
        // modification is left alone even though the second would qualify.
        let base = PropertyTree::new(vec![
            PropertyLeaf::new("dup", LeafKind::Other, 0),
            PropertyLeaf::new("vision", LeafKind::LayerMask, 0),
            PropertyLeaf::new("dup", LeafKind::Other, 0),
        ]);
        let mut set = OverrideSet {
            targets: vec![base],
            mods: vec![OverrideMod {
                target: 0,
                path: "dup".to_string(),
                value: 1 << 8,
            }],
        };
        assert!(!rewrite_overrides(&mut set, &tables));
        assert_eq!(set.mods[0].value, 1 << 8);
    }

    #[test]
    fn missing_target_tree_is_skipped() {
        let tables = swap_tables();
        let mut set = OverrideSet {
            targets: Vec::new(),
            mods: vec![OverrideMod {
                target: 3,
                path: "layer".to_string(),
                value: 8,
            }],
        };
        assert!(!rewrite_overrides(&mut set, &tables));
        assert_eq!(set.mods[0].value, 8);
    }
}
