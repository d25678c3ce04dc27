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

//! Unit tests for row-band work partitioning

use std::thread;

use super::{coverage, draw, full_clip, quad, supported_tiers, vertex};
use crate::core::raster::{
    classify, Backend, BlendKind, ClipRect, FrameBuffer, PartialBlock, SamplerKind, Texture,
    TriDrawTriangleArgs, TriDrawer, Uniforms, Vertex, WorkerThreadData,
};

const WIDTH: usize = 48;
const HEIGHT: usize = 40;

fn slanted() -> [Vertex; 3] {
    [
        vertex(2.5, 1.25, 1.0, 0.0, 0.0),
        vertex(45.0, 9.5, 0.5, 3.0, 0.5),
        vertex(11.0, 38.75, 0.8, 0.25, 2.0),
    ]
}

#[test]
fn test_worker_count_does_not_change_image() {
    let texels: Vec<u32> = (0..64u32)
        .map(|i| 0xFF00_0000 | i.wrapping_mul(0x0102_0305))
        .collect();
    let uniforms = Uniforms {
        texture: Some(Texture::bgra(8, 8, &texels)),
        ..Uniforms::default()
    };

    for tier in supported_tiers() {
        let render = |cores: usize| {
            let mut frame = FrameBuffer::<u32>::new(WIDTH, HEIGHT);
            frame.fill(0xFF30_3030);
            let args = TriDrawTriangleArgs::new(
                slanted(),
                &uniforms,
                SamplerKind::Texture,
                BlendKind::Shaded,
                full_clip(&frame),
            )
            .unwrap();
            draw(&mut frame, &args, tier, cores).unwrap();
            frame
        };

        let single = render(1);
        for cores in [2, 3, 5] {
            assert_eq!(render(cores), single, "{cores} cores on {tier}");
        }
    }
}

#[test]
fn test_threads_draw_disjoint_bands() {
    let uniforms = Uniforms {
        color: 0xFF5A_A55A,
        ..Uniforms::default()
    };
    let mut reference = FrameBuffer::<u32>::new(WIDTH, HEIGHT);
    let mut frame = FrameBuffer::<u32>::new(WIDTH, HEIGHT);
    let args = TriDrawTriangleArgs::new(
        slanted(),
        &uniforms,
        SamplerKind::Fill,
        BlendKind::Opaque,
        full_clip(&frame),
    )
    .unwrap();
    draw(&mut reference, &args, Backend::Auto, 1).unwrap();

    let drawer = TriDrawer::<u32>::new(&args, Backend::Auto).unwrap();
    let threads = classify(&args, WIDTH, HEIGHT, 4);
    let bands = frame.split_bands(4);
    thread::scope(|scope| {
        for (work, mut band) in threads.iter().zip(bands) {
            let drawer = &drawer;
            scope.spawn(move || drawer.execute(work, &mut band));
        }
    });

    assert_eq!(frame, reference);
}

#[test]
fn test_classifier_union_matches_single_core() {
    let uniforms = Uniforms::default();
    let args = TriDrawTriangleArgs::new(
        slanted(),
        &uniforms,
        SamplerKind::Fill,
        BlendKind::Opaque,
        ClipRect::full(WIDTH, HEIGHT),
    )
    .unwrap();

    let single = coverage(&classify(&args, WIDTH, HEIGHT, 1), WIDTH, HEIGHT);
    for cores in 2..=6 {
        let threads = classify(&args, WIDTH, HEIGHT, cores);
        assert_eq!(coverage(&threads, WIDTH, HEIGHT), single);
        for (core, work) in threads.iter().enumerate() {
            assert_eq!(work.core, core);
            for span in &work.full_spans {
                assert_eq!(usize::from(span.y) / 8 % cores, core);
            }
            for block in &work.partial_blocks {
                assert_eq!(usize::from(block.y) / 8 % cores, core);
            }
        }
    }
}

#[test]
fn test_shared_edge_blends_once() {
    let uniforms = Uniforms {
        color: 0xFF20_2020,
        ..Uniforms::default()
    };

    for tier in supported_tiers() {
        let mut frame = FrameBuffer::<u32>::new(32, 32);
        frame.fill(0xFF00_0000);
        for tri in quad(32.0, 32.0) {
            let args = TriDrawTriangleArgs::new(
                tri,
                &uniforms,
                SamplerKind::Fill,
                BlendKind::AddClamp,
                full_clip(&frame),
            )
            .unwrap();
            draw(&mut frame, &args, tier, 3).unwrap();
        }
        assert!(
            frame.pixels().iter().all(|&c| c == 0xFF20_2020),
            "pixel blended twice or skipped on {tier}"
        );
    }
}

#[test]
#[should_panic(expected = "not owned by core 0/2")]
fn test_unaligned_block_cannot_reach_other_band() {
    let uniforms = Uniforms {
        color: 0xFF00_FF00,
        ..Uniforms::default()
    };
    let mut frame = FrameBuffer::<u32>::new(16, 32);
    let args = TriDrawTriangleArgs::new(
        quad(16.0, 32.0)[0],
        &uniforms,
        SamplerKind::Fill,
        BlendKind::Opaque,
        full_clip(&frame),
    )
    .unwrap();
    let drawer = TriDrawer::<u32>::new(&args, Backend::Scalar).unwrap();

    // Rows 4..12 straddle band 0 (core 0) and band 1 (core 1)
    let mut thread = WorkerThreadData::new(0, 2);
    thread.partial_blocks.push(PartialBlock {
        x: 0,
        y: 4,
        mask0: u32::MAX,
        mask1: u32::MAX,
    });
    let mut bands = frame.split_bands(2);
    drawer.execute(&thread, &mut bands[0]);
}
