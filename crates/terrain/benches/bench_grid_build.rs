use std::hint::black_box;
use std::time::Instant;

use outrun_terrain::{GridMeshBuilder, WireOverlayBuilder};

fn bench_grid(width: u32, height: u32, iterations: usize) {
    let builder = GridMeshBuilder::new(width, height).expect("valid grid");

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(builder.build());
    }
    let elapsed = start.elapsed();
    println!(
        "grid {width}x{height}: {iterations} builds in {elapsed:?} ({:.2} us/build)",
        elapsed.as_secs_f64() * 1e6 / iterations as f64
    );
}

fn bench_wire(width: u32, height: u32, iterations: usize) {
    let mesh = GridMeshBuilder::new(width, height).expect("valid grid").build();

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(WireOverlayBuilder::build(black_box(&mesh)));
    }
    let elapsed = start.elapsed();
    println!(
        "wire {width}x{height}: {iterations} builds in {elapsed:?} ({:.2} us/build)",
        elapsed.as_secs_f64() * 1e6 / iterations as f64
    );
}

fn main() {
    for (w, h) in [(8, 10), (64, 64), (256, 512)] {
        bench_grid(w, h, 200);
        bench_wire(w, h, 200);
    }
}
