use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use rectify_image::Image;
use rectify_imgproc::{
    compositor::CpuCompositor, interpolation::InterpolationMode, parallel::ExecutionStrategy,
};
use rectify_mesh::{Extent, Mesh, Point2D, Triangle, TriangleWarper, WarpParams};

/// A regular grid of `n x n` cells, two triangles per cell, with a slight shear on the
/// target side.
fn grid_mesh(n: usize, extent: f64, canvas: f64) -> Mesh {
    let step = extent / n as f64;
    let target_step = canvas / n as f64;
    let point = |i: usize, j: usize| {
        let (x, y) = (i as f64 * step, j as f64 * step);
        let (u, v) = (i as f64 * target_step, j as f64 * target_step);
        ([x, y], [u + 0.05 * v, canvas - v])
    };

    let mut triangles = Vec::with_capacity(2 * n * n);
    for j in 0..n {
        for i in 0..n {
            let (s00, t00) = point(i, j);
            let (s10, t10) = point(i + 1, j);
            let (s01, t01) = point(i, j + 1);
            let (s11, t11) = point(i + 1, j + 1);
            triangles.push(Triangle::new([s00, s10, s01], [t00, t10, t01]));
            triangles.push(Triangle::new([s10, s11, s01], [t10, t11, t01]));
        }
    }
    Mesh::new(triangles)
}

fn bench_warp_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("WarpMesh");

    for (size, cells) in [(256, 4), (512, 8), (1024, 16)].iter() {
        group.throughput(criterion::Throughput::Elements((*size * *size) as u64));

        let parameter_string = format!("{}x{}_{}cells", size, size, cells * cells);

        let stitch = Image::<u8, 4>::new(
            [*size, *size].into(),
            (0..size * size * 4).map(|v| (v % 255) as u8).collect(),
        )
        .unwrap();
        let canvas = Image::<u8, 4>::from_size_pixel([*size, *size].into(), [255, 0, 0, 255])
            .unwrap();

        let extent = *size as f64;
        let mesh = grid_mesh(*cells, extent, extent);
        let params = WarpParams {
            pixel_ratio: 1.0,
            target_top_left: Point2D::new(0.0, extent),
            target_resolution: 1.0,
            source_extent: Extent::from([0.0, 0.0, extent, extent]),
            source_resolution: 1.0,
        };

        for (name, strategy) in [
            ("serial", ExecutionStrategy::Serial),
            ("parallel", ExecutionStrategy::Parallel),
        ] {
            let warper = TriangleWarper::new(params).unwrap().with_strategy(strategy);
            group.bench_with_input(
                BenchmarkId::new(name, &parameter_string),
                &(&stitch, &canvas),
                |b, i| {
                    let (src, mut dst) = (i.0, i.1.clone());
                    b.iter(|| {
                        let mut compositor = CpuCompositor::new(&mut dst)
                            .with_interpolation(InterpolationMode::Bilinear)
                            .with_strategy(strategy);
                        warper.warp(
                            black_box(&mesh),
                            black_box(src),
                            black_box(&mut compositor),
                            None,
                        )
                    })
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_warp_mesh);
criterion_main!(benches);
