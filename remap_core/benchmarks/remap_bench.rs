use criterion::{black_box, criterion_group, criterion_main, Criterion};

use remap_core::{
    build_tables, rewrite::rewrite_tree, LayerMapModel, LeafKind, PropertyLeaf, PropertyTree,
    RemapTables, LAYER_COUNT,
};

fn reversed_tables() -> RemapTables {
    let names: [String; LAYER_COUNT] = std::array::from_fn(|slot| format!("layer{slot}"));
    let mut map = LayerMapModel::from_names(&names);
    for position in 0..12 {
        map.move_entry(23, position);
    }
    build_tables(&map)
}

fn bench_transform_mask(c: &mut Criterion) {
    let tables = reversed_tables();
    c.bench_function("transform_mask", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for seed in 0u32..1024 {
                acc ^= tables
                    .redirected
                    .transform_mask(black_box(seed.wrapping_mul(0x9E37_79B9)));
            }
            acc
        })
    });
}

fn bench_rewrite_tree(c: &mut Criterion) {
    let tables = reversed_tables();
    let template = PropertyTree::new(
        (0..256)
            .map(|index| {
                let kind = if index % 3 == 0 {
                    LeafKind::LayerMask
                } else {
                    LeafKind::Other
                };
                PropertyLeaf::new(format!("prop{index}"), kind, 1 << (index % 32))
            })
            .collect(),
    );
    c.bench_function("rewrite_tree_256_leaves", |b| {
        b.iter(|| {
            let mut tree = template.clone();
            rewrite_tree(&mut tree, &tables.redirected)
        })
    });
}

criterion_group!(benches, bench_transform_mask, bench_rewrite_tree);
criterion_main!(benches);
