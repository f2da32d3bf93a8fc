//! Encode and decode throughput on a generated grid mesh.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mesh_ply::{BufferMesh, MeshStore, Triangle, Vertex};

/// A flat `side` x `side` vertex grid, two triangles per cell.
fn grid_mesh(side: usize) -> BufferMesh {
    let mut mesh = BufferMesh::with_capacity(side * side, 2 * (side - 1) * (side - 1));
    let mut refs = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let (x, y) = (col as f32, row as f32);
            let vertex = Vertex::new([x, y, (x * 0.1).sin() * (y * 0.1).cos()], [0.0, 0.0, 1.0])
                .with_uv([x / side as f32, y / side as f32]);
            refs.push(mesh.add_vertex(vertex));
        }
    }
    for row in 0..side - 1 {
        for col in 0..side - 1 {
            let i = row * side + col;
            let [a, b, c, d] = [refs[i], refs[i + 1], refs[i + side], refs[i + side + 1]];
            mesh.add_triangle(Triangle::new([a, b, d])).unwrap();
            mesh.add_triangle(Triangle::new([a, d, c])).unwrap();
        }
    }
    mesh
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let mesh = grid_mesh(100);

    let binary_len = mesh_ply::write_binary(&mesh).unwrap().len();
    group.throughput(Throughput::Bytes(binary_len as u64));
    group.bench_function("binary", |b| {
        b.iter(|| mesh_ply::write_binary(black_box(&mesh)).unwrap());
    });

    let ascii_len = mesh_ply::write_ascii(&mesh).unwrap().len();
    group.throughput(Throughput::Bytes(ascii_len as u64));
    group.bench_function("ascii", |b| {
        b.iter(|| mesh_ply::write_ascii(black_box(&mesh)).unwrap());
    });

    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    let mesh = grid_mesh(100);

    let binary = mesh_ply::write_binary(&mesh).unwrap();
    group.throughput(Throughput::Bytes(binary.len() as u64));
    group.bench_function("binary", |b| {
        b.iter(|| {
            let decoded = mesh_ply::open(black_box(binary.as_slice())).unwrap();
            assert_eq!(decoded.vertex_count(), mesh.vertex_count());
        });
    });

    let ascii = mesh_ply::write_ascii(&mesh).unwrap();
    group.throughput(Throughput::Bytes(ascii.len() as u64));
    group.bench_function("ascii", |b| {
        b.iter(|| mesh_ply::open(black_box(ascii.as_slice())).unwrap());
    });

    group.finish();
}

criterion_group!(benches, benchmark_encode, benchmark_decode);
criterion_main!(benches);
