//! Benchmarks for the flat/topological converters.

use criterion::{criterion_group, criterion_main, Criterion};
use meshbridge::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> FlatMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut polygons = Vec::with_capacity(n * n);

    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f32, j as f32, 0.0));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            polygons.push([v00, v10, v11, v01]);
        }
    }

    build_flat_mesh(&vertices, &polygons).unwrap()
}

/// A prism with `n`-gon caps, which forces tessellation of the caps.
fn create_prism_mesh(n: usize) -> TopoMesh {
    let mut vertices = Vec::with_capacity(2 * n);
    for z in [0.0, 1.0] {
        for i in 0..n {
            let t = i as f32 / n as f32 * std::f32::consts::TAU;
            vertices.push(Point3::new(t.cos(), t.sin(), z));
        }
    }

    let mut polygons: Vec<Vec<usize>> = vec![(0..n).rev().collect(), (n..2 * n).collect()];
    for i in 0..n {
        let j = (i + 1) % n;
        polygons.push(vec![i, j, j + n, i + n]);
    }

    let flat = build_flat_mesh(&vertices, &polygons).unwrap();
    flat_to_topo(&flat, &ReadOptions::default()).unwrap()
}

fn bench_read(c: &mut Criterion) {
    let flat = create_grid_mesh(100);

    c.bench_function("read_grid", |b| {
        b.iter(|| {
            let mesh: TopoMesh = flat_to_topo(&flat, &ReadOptions::default()).unwrap();
            mesh
        });
    });
}

fn bench_write(c: &mut Criterion) {
    let mesh: TopoMesh = flat_to_topo(&create_grid_mesh(100), &ReadOptions::default()).unwrap();

    c.bench_function("write_grid", |b| {
        b.iter(|| topo_to_flat(&mesh, &WriteOptions::default()).unwrap());
    });

    c.bench_function("write_grid_sequential", |b| {
        b.iter(|| topo_to_flat(&mesh, &WriteOptions::default().sequential()).unwrap());
    });

    let prism = create_prism_mesh(256);
    c.bench_function("write_ngon_prism", |b| {
        b.iter(|| {
            let options = WriteOptions::default().with_tessellation(TessellationMethod::EarClip);
            topo_to_flat(&prism, &options).unwrap()
        });
    });
}

criterion_group!(benches, bench_read, bench_write);
criterion_main!(benches);
