// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Full-block throughput per truecolor tier

use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polyraster::core::raster::{
    classify, Backend, BlendKind, ClipRect, FrameBuffer, SamplerKind, Texture,
    TriDrawTriangleArgs, TriDrawer, Uniforms, Vertex,
};

const SIZE: usize = 256;

fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(2))
        .sample_size(30)
}

/// Two triangles covering the frame, so classification yields full spans only
fn quad() -> [[Vertex; 3]; 2] {
    let v = |x: f32, y: f32, w: f32, u: f32, v: f32| Vertex {
        x,
        y,
        w,
        u,
        v,
        ..Vertex::default()
    };
    let s = SIZE as f32;
    let tl = v(0.0, 0.0, 0.5, 0.0, 0.0);
    let tr = v(s, 0.0, 0.5, 4.0, 0.0);
    let bl = v(0.0, s, 1.0, 0.0, 4.0);
    let br = v(s, s, 1.0, 4.0, 4.0);
    [[tl, tr, bl], [tr, br, bl]]
}

fn bench_full_blocks(c: &mut Criterion) {
    let texels: Vec<u32> = (0..64 * 64u32)
        .map(|i| 0xC000_0000 | i.wrapping_mul(0x0001_0307))
        .collect();
    let uniforms = Uniforms {
        light: 180,
        glob_vis: 4.0,
        texture: Some(Texture::bgra(64, 64, &texels)),
        ..Uniforms::default()
    };

    let modes = [
        (SamplerKind::Texture, BlendKind::Opaque),
        (SamplerKind::Texture, BlendKind::AddClamp),
        (SamplerKind::Stencil, BlendKind::Shaded),
    ];

    let mut group = c.benchmark_group("full_blocks");
    group.throughput(Throughput::Elements((SIZE * SIZE) as u64));

    for tier in Backend::TIERS {
        if !tier.is_supported() {
            continue;
        }
        for (sampler, blend) in modes {
            let draws: Vec<_> = quad()
                .into_iter()
                .map(|vertices| {
                    let args = TriDrawTriangleArgs::new(
                        vertices,
                        &uniforms,
                        sampler,
                        blend,
                        ClipRect::full(SIZE, SIZE),
                    )
                    .unwrap();
                    let work = classify(&args, SIZE, SIZE, 1);
                    (TriDrawer::<u32>::new(&args, tier).unwrap(), work)
                })
                .collect();

            let mut frame = FrameBuffer::<u32>::new(SIZE, SIZE);
            let id = BenchmarkId::new(tier.name(), format!("{sampler:?}/{blend:?}"));
            group.bench_function(id, |b| {
                b.iter(|| {
                    let mut bands = frame.split_bands(1);
                    for (drawer, work) in &draws {
                        drawer.execute(&work[0], &mut bands[0]);
                    }
                    black_box(&bands);
                })
            });
        }
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_full_blocks
}
criterion_main!(benches);
