//! Performance benchmarks for DocMesh core operations
//!
//! Run with: `cargo bench -p docmesh-core`
//!
//! These benchmarks measure critical path performance:
//! - Snapshot mutations on a large mesh (structural sharing)
//! - Full validation of a large mesh
//! - Index document generation and archive packaging
//! - Encode/decode of the persistence format

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use docmesh_core::db::{decode, encode};
use docmesh_core::{
    export_to_archive, generate_index_document, validate_tree, Content, ExportSettings,
    InMemoryContentStore, Mesh, NewNode,
};

/// Generate a mesh of `roots` roots, each with `fanout` children that each
/// have `fanout` children of their own
fn generate_mesh(roots: usize, fanout: usize) -> (Mesh, InMemoryContentStore) {
    let mut mesh = Mesh::new("bench");
    let mut store = InMemoryContentStore::new();
    let mut counter = 0usize;
    let mut next_content = |store: &mut InMemoryContentStore| {
        counter += 1;
        let id = format!("content-{}", counter);
        store.insert(Content::html(
            &id,
            format!("Page {}", counter),
            format!("<h2>Page {}</h2><p>{}</p>", counter, "lorem ipsum ".repeat(20)),
        ));
        id
    };

    for _ in 0..roots {
        let content_id = next_content(&mut store);
        let (next, root) = mesh.add_node(NewNode::new(content_id)).unwrap();
        mesh = next;
        for _ in 0..fanout {
            let content_id = next_content(&mut store);
            let (next, child) = mesh.add_node(NewNode::new(content_id).under(&root)).unwrap();
            mesh = next;
            for _ in 0..fanout {
                let content_id = next_content(&mut store);
                let (next, _) = mesh.add_node(NewNode::new(content_id).under(&child)).unwrap();
                mesh = next;
            }
        }
    }

    (mesh, store)
}

/// Benchmark single mutations against a ~1000-node mesh
fn bench_mutations(c: &mut Criterion) {
    let (mesh, _) = generate_mesh(10, 10);
    let roots: Vec<String> = mesh.root_nodes().iter().map(|n| n.id.clone()).collect();
    let first_child = mesh.children_of(&roots[0]).unwrap()[0].id.clone();

    let mut group = c.benchmark_group("mutation_1110_nodes");

    group.bench_function("add_node", |b| {
        b.iter(|| black_box(mesh.add_node(NewNode::new("extra").under(&roots[3])).unwrap()))
    });

    group.bench_function("move_subtree_across_roots", |b| {
        b.iter(|| black_box(mesh.move_node(&first_child, Some(&roots[9]), 0).unwrap()))
    });

    group.bench_function("delete_cascade", |b| {
        b.iter(|| black_box(mesh.delete_node(&roots[5], true).unwrap()))
    });

    group.bench_function("move_rejected_as_cycle", |b| {
        b.iter(|| black_box(mesh.move_node(&roots[0], Some(&first_child), 0).unwrap_err()))
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let (mesh, _) = generate_mesh(10, 10);

    c.bench_function("validate_tree_1110_nodes", |b| {
        b.iter(|| black_box(validate_tree(black_box(&mesh))))
    });
}

fn bench_export(c: &mut Criterion) {
    let (mesh, store) = generate_mesh(10, 10);
    let settings = ExportSettings::default();

    let mut group = c.benchmark_group("export_1110_nodes");
    group.sample_size(10); // Fewer samples for expensive operations

    group.bench_function("index_document", |b| {
        b.iter(|| black_box(generate_index_document(&mesh, &store, &settings).unwrap()))
    });

    group.bench_function("archive", |b| {
        b.iter(|| black_box(export_to_archive(&mesh, &store, &settings).unwrap()))
    });

    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let (mesh, _) = generate_mesh(10, 10);
    let encoded = encode(&mesh).unwrap();

    c.bench_function("encode_1110_nodes", |b| {
        b.iter(|| black_box(encode(black_box(&mesh)).unwrap()))
    });

    c.bench_function("decode_1110_nodes", |b| {
        b.iter(|| black_box(decode(black_box(&encoded)).unwrap()))
    });
}

criterion_group!(benches, bench_mutations, bench_validation, bench_export, bench_codec);
criterion_main!(benches);
