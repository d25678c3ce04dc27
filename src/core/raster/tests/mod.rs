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

//! Draw-level tests for the rasterizer
//!
//! These go through the public entry points only: build a request, classify it, split
//! the frame into bands and execute every worker.

mod partition;
mod perspective;

use super::{
    classify, Backend, ClipRect, FrameBuffer, Pixel, TriDrawTriangleArgs, TriDrawer, Vertex,
    WorkerThreadData,
};
use crate::core::error::Result;

/// Vertex with `w`, texture coordinates and nothing else
pub(super) fn vertex(x: f32, y: f32, w: f32, u: f32, v: f32) -> Vertex {
    Vertex {
        x,
        y,
        w,
        u,
        v,
        ..Vertex::default()
    }
}

/// Two triangles covering a `width` x `height` target with the texture stretched once
pub(super) fn quad(width: f32, height: f32) -> [[Vertex; 3]; 2] {
    let tl = vertex(0.0, 0.0, 1.0, 0.0, 0.0);
    let tr = vertex(width, 0.0, 1.0, 1.0, 0.0);
    let bl = vertex(0.0, height, 1.0, 0.0, 1.0);
    let br = vertex(width, height, 1.0, 1.0, 1.0);
    [[tl, tr, bl], [tr, br, bl]]
}

/// Every tier the current CPU can run
pub(super) fn supported_tiers() -> Vec<Backend> {
    Backend::TIERS
        .into_iter()
        .filter(|tier| tier.is_supported())
        .collect()
}

/// Classify and draw one triangle, running the workers one after another
pub(super) fn draw<P: Pixel>(
    frame: &mut FrameBuffer<P>,
    args: &TriDrawTriangleArgs<'_>,
    backend: Backend,
    num_cores: usize,
) -> Result<()> {
    let drawer = TriDrawer::<P>::new(args, backend)?;
    let threads = classify(args, frame.width(), frame.height(), num_cores);
    let mut bands = frame.split_bands(num_cores);
    for (thread, band) in threads.iter().zip(bands.iter_mut()) {
        drawer.execute(thread, band);
    }
    Ok(())
}

/// Per-pixel coverage of a set of worker assignments, row-major
pub(super) fn coverage(threads: &[WorkerThreadData], width: usize, height: usize) -> Vec<bool> {
    let mut covered = vec![false; width * height];
    for thread in threads {
        for span in &thread.full_spans {
            let (x0, y0) = (usize::from(span.x), usize::from(span.y));
            for y in y0..(y0 + 8).min(height) {
                for x in x0..(x0 + 8 * span.length as usize).min(width) {
                    covered[y * width + x] = true;
                }
            }
        }
        for block in &thread.partial_blocks {
            let (x0, y0) = (usize::from(block.x), usize::from(block.y));
            for py in 0..8 {
                for px in 0..8 {
                    let (x, y) = (x0 + px, y0 + py);
                    if x < width && y < height && block.covers(px, py) {
                        covered[y * width + x] = true;
                    }
                }
            }
        }
    }
    covered
}

/// Largest per-channel difference between two truecolor pixels
pub(super) fn channel_delta(a: u32, b: u32) -> u32 {
    (0..4)
        .map(|shift| {
            let ca = (a >> (shift * 8)) & 0xFF;
            let cb = (b >> (shift * 8)) & 0xFF;
            ca.abs_diff(cb)
        })
        .max()
        .unwrap_or(0)
}

/// Full-target clip rectangle for a frame
pub(super) fn full_clip<P: Copy + Default>(frame: &FrameBuffer<P>) -> ClipRect {
    ClipRect::full(frame.width(), frame.height())
}
