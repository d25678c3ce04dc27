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

//! Reference coverage classifier
//!
//! Turns a triangle into per-worker lists of fully covered spans and partially covered
//! 8x8 blocks. Coverage is evaluated with edge functions at pixel centers; both
//! windings are accepted and the top-left fill rule decides pixels exactly on an edge,
//! so two triangles sharing an edge never both cover a pixel on it.

use super::gradient::TriDrawTriangleArgs;
use super::primitives::{FullSpan, PartialBlock, Vertex, WorkerThreadData, BLOCK_SIZE};

/// Stencil buffer view used to restrict coverage
///
/// A pixel passes when `values[y * pitch + x] == test_value`; pixels outside the
/// slice fail.
#[derive(Debug, Clone, Copy)]
pub struct StencilView<'a> {
    pub values: &'a [u8],
    pub pitch: usize,
    pub test_value: u8,
}

impl<'a> StencilView<'a> {
    pub fn new(values: &'a [u8], pitch: usize, test_value: u8) -> Self {
        Self {
            values,
            pitch,
            test_value,
        }
    }

    #[inline]
    pub fn passes(&self, x: usize, y: usize) -> bool {
        self.values.get(y * self.pitch + x) == Some(&self.test_value)
    }
}

/// One triangle edge, oriented so the interior is on the positive side
#[derive(Debug, Clone, Copy)]
struct Edge {
    ax: f32,
    ay: f32,
    dx: f32,
    dy: f32,
    /// Pixels exactly on the edge are covered
    inclusive: bool,
}

impl Edge {
    fn new(a: &Vertex, b: &Vertex, sign: f32) -> Self {
        let dx = (b.x - a.x) * sign;
        let dy = (b.y - a.y) * sign;
        // With y pointing down, a top edge runs right and a left edge runs up
        let top = dy == 0.0 && dx > 0.0;
        let left = dy < 0.0;
        Self {
            ax: a.x,
            ay: a.y,
            dx,
            dy,
            inclusive: top || left,
        }
    }

    #[inline]
    fn covers(&self, px: f32, py: f32) -> bool {
        let w = self.dx * (py - self.ay) - self.dy * (px - self.ax);
        w > 0.0 || (w == 0.0 && self.inclusive)
    }
}

/// Coverage masks of one 8x8 block, in [`PartialBlock`] bit order
fn block_masks(
    edges: &[Edge; 3],
    args: &TriDrawTriangleArgs<'_>,
    bounds: (usize, usize, usize, usize),
    bx: usize,
    by: usize,
) -> (u32, u32) {
    let (x0, y0, x1, y1) = bounds;
    let mut masks = [0u32; 2];
    for row in 0..BLOCK_SIZE {
        let y = by + row;
        if y < y0 || y >= y1 {
            continue;
        }
        let py = y as f32 + 0.5;
        for col in 0..BLOCK_SIZE {
            let x = bx + col;
            if x < x0 || x >= x1 {
                continue;
            }
            let px = x as f32 + 0.5;
            if !edges.iter().all(|edge| edge.covers(px, py)) {
                continue;
            }
            if let Some(stencil) = &args.stencil {
                if !stencil.passes(x, y) {
                    continue;
                }
            }
            masks[row / 4] |= 1 << (31 - ((row & 3) * BLOCK_SIZE + col));
        }
    }
    (masks[0], masks[1])
}

/// Classify a triangle into per-worker spans and blocks
///
/// Band `y / 8` is assigned to core `(y / 8) % num_cores`, matching
/// [`FrameBuffer::split_bands`](super::FrameBuffer::split_bands).
///
/// # Arguments
///
/// * `args` - Triangle draw request (vertices, clip rectangle and optional stencil)
/// * `width`, `height` - Destination size in pixels
/// * `num_cores` - Number of workers (at least one is produced)
///
/// # Returns
///
/// One [`WorkerThreadData`] per core, in core order
///
/// # Examples
///
/// ```
/// use polyraster::core::raster::{
///     classify, BlendKind, ClipRect, SamplerKind, TriDrawTriangleArgs, Uniforms, Vertex,
/// };
///
/// let uniforms = Uniforms::default();
/// let v = |x: f32, y: f32| Vertex { x, y, w: 1.0, ..Vertex::default() };
/// let args = TriDrawTriangleArgs::new(
///     [v(0.0, 0.0), v(32.0, 0.0), v(0.0, 32.0)],
///     &uniforms,
///     SamplerKind::Fill,
///     BlendKind::Opaque,
///     ClipRect::full(32, 32),
/// )?;
///
/// let threads = classify(&args, 32, 32, 2);
/// assert_eq!(threads.len(), 2);
/// // The top-left block is fully covered and belongs to core 0
/// assert_eq!((threads[0].full_spans[0].x, threads[0].full_spans[0].y), (0, 0));
/// # Ok::<(), polyraster::RasterError>(())
/// ```
pub fn classify(
    args: &TriDrawTriangleArgs<'_>,
    width: usize,
    height: usize,
    num_cores: usize,
) -> Vec<WorkerThreadData> {
    let num_cores = num_cores.max(1);
    let mut threads: Vec<WorkerThreadData> = (0..num_cores)
        .map(|core| WorkerThreadData::new(core, num_cores))
        .collect();

    let (v1, v2, v3) = (&args.v1, &args.v2, &args.v3);
    let area = (v2.x - v1.x) * (v3.y - v1.y) - (v2.y - v1.y) * (v3.x - v1.x);
    if area == 0.0 || !area.is_finite() {
        return threads;
    }
    let sign = if area < 0.0 { -1.0 } else { 1.0 };
    let edges = [
        Edge::new(v1, v2, sign),
        Edge::new(v2, v3, sign),
        Edge::new(v3, v1, sign),
    ];

    let clip = args.clip.intersect(width, height);
    if clip.is_empty() {
        return threads;
    }
    let min_x = v1.x.min(v2.x).min(v3.x).floor().max(clip.left as f32) as usize;
    let min_y = v1.y.min(v2.y).min(v3.y).floor().max(clip.top as f32) as usize;
    let max_x = v1.x.max(v2.x).max(v3.x).ceil().min(clip.right as f32) as usize;
    let max_y = v1.y.max(v2.y).max(v3.y).ceil().min(clip.bottom as f32) as usize;
    if max_x <= min_x || max_y <= min_y {
        return threads;
    }
    let bounds = (
        clip.left as usize,
        clip.top as usize,
        clip.right as usize,
        clip.bottom as usize,
    );

    let first_bx = min_x / BLOCK_SIZE * BLOCK_SIZE;
    for by in (min_y / BLOCK_SIZE * BLOCK_SIZE..max_y).step_by(BLOCK_SIZE) {
        let thread = &mut threads[(by / BLOCK_SIZE) % num_cores];
        let mut span: Option<FullSpan> = None;

        for bx in (first_bx..max_x).step_by(BLOCK_SIZE) {
            let (mask0, mask1) = block_masks(&edges, args, bounds, bx, by);
            if mask0 == u32::MAX && mask1 == u32::MAX {
                if let Some(run) = span.as_mut() {
                    run.length += 1;
                } else {
                    span = Some(FullSpan {
                        x: bx as u16,
                        y: by as u16,
                        length: 1,
                    });
                }
                continue;
            }

            thread.full_spans.extend(span.take());
            if mask0 != 0 || mask1 != 0 {
                thread.partial_blocks.push(PartialBlock {
                    x: bx as u16,
                    y: by as u16,
                    mask0,
                    mask1,
                });
            }
        }
        thread.full_spans.extend(span.take());
    }

    for thread in &threads {
        log::trace!(
            "Classified core {}: {} full span(s), {} partial block(s)",
            thread.core,
            thread.full_spans.len(),
            thread.partial_blocks.len()
        );
    }
    threads
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::raster::{BlendKind, ClipRect, SamplerKind, Uniforms};

    /// Covers every pixel of targets up to 64x64
    const BIG: [(f32, f32); 3] = [(-64.0, -64.0), (192.0, -64.0), (-64.0, 192.0)];

    fn args<'a>(
        uniforms: &'a Uniforms<'a>,
        v: [(f32, f32); 3],
        clip: ClipRect,
    ) -> TriDrawTriangleArgs<'a> {
        let vertex = |(x, y): (f32, f32)| Vertex {
            x,
            y,
            w: 1.0,
            ..Vertex::default()
        };
        TriDrawTriangleArgs::new(
            v.map(vertex),
            uniforms,
            SamplerKind::Fill,
            BlendKind::Opaque,
            clip,
        )
        .unwrap()
    }

    fn run(
        v: [(f32, f32); 3],
        width: usize,
        height: usize,
        cores: usize,
    ) -> Vec<WorkerThreadData> {
        let uniforms = Uniforms::default();
        classify(
            &args(&uniforms, v, ClipRect::full(width, height)),
            width,
            height,
            cores,
        )
    }

    fn covered(threads: &[WorkerThreadData]) -> usize {
        threads
            .iter()
            .map(|t| {
                let full: usize = t.full_spans.iter().map(|s| s.length as usize * 64).sum();
                let partial: usize = t
                    .partial_blocks
                    .iter()
                    .map(|b| (b.mask0.count_ones() + b.mask1.count_ones()) as usize)
                    .sum();
                full + partial
            })
            .sum()
    }

    #[test]
    fn test_both_windings() {
        let cw = run([(0.0, 0.0), (16.0, 0.0), (0.0, 16.0)], 16, 16, 1);
        let ccw = run([(0.0, 0.0), (0.0, 16.0), (16.0, 0.0)], 16, 16, 1);
        assert_eq!(cw, ccw);
        // Pixel centres strictly above the diagonal x + y = 16
        assert_eq!(covered(&cw), 120);
    }

    #[test]
    fn test_shared_edge_covered_once() {
        let a = run([(0.0, 0.0), (16.0, 0.0), (0.0, 16.0)], 16, 16, 1);
        let b = run([(16.0, 0.0), (16.0, 16.0), (0.0, 16.0)], 16, 16, 1);
        assert_eq!(covered(&a) + covered(&b), 256);

        let lower = run([(0.0, 0.0), (32.0, 16.0), (0.0, 16.0)], 32, 16, 1);
        let upper = run([(0.0, 0.0), (32.0, 0.0), (32.0, 16.0)], 32, 16, 1);
        assert_eq!(covered(&lower) + covered(&upper), 32 * 16);
    }

    #[test]
    fn test_full_cover_is_one_span_per_band() {
        let threads = run(BIG, 32, 16, 2);
        assert_eq!(
            threads[0].full_spans,
            vec![FullSpan {
                x: 0,
                y: 0,
                length: 4
            }]
        );
        assert_eq!(
            threads[1].full_spans,
            vec![FullSpan {
                x: 0,
                y: 8,
                length: 4
            }]
        );
        assert!(threads.iter().all(|t| t.partial_blocks.is_empty()));
    }

    #[test]
    fn test_partial_edge_blocks() {
        // 20 pixels wide: the last block column is cut by the target edge
        let threads = run(BIG, 20, 8, 1);
        assert_eq!(threads[0].full_spans[0].length, 2);
        assert_eq!(threads[0].partial_blocks.len(), 1);
        assert_eq!(threads[0].partial_blocks[0].mask0, 0xF0F0_F0F0);
        assert_eq!(covered(&threads), 20 * 8);
    }

    #[test]
    fn test_clip_limits_coverage() {
        let uniforms = Uniforms::default();
        let clip = ClipRect::new(4, 4, 12, 12);
        let threads = classify(&args(&uniforms, BIG, clip), 16, 16, 1);
        assert_eq!(covered(&threads), 64);
        for block in &threads[0].partial_blocks {
            for py in 0..8 {
                for px in 0..8 {
                    if block.covers(px, py) {
                        let x = i32::from(block.x) + px as i32;
                        let y = i32::from(block.y) + py as i32;
                        assert!(clip.contains(x, y));
                    }
                }
            }
        }
    }

    #[test]
    fn test_stencil_restricts_coverage() {
        let uniforms = Uniforms::default();
        let mut stencil = vec![0u8; 8 * 8];
        stencil[3 * 8 + 5] = 1;
        let args = args(&uniforms, BIG, ClipRect::full(8, 8))
            .with_stencil(StencilView::new(&stencil, 8, 1));
        let threads = classify(&args, 8, 8, 1);
        assert_eq!(threads[0].partial_blocks.len(), 1);
        assert!(threads[0].partial_blocks[0].covers(5, 3));
        assert_eq!(covered(&threads), 1);
    }

    #[test]
    fn test_offscreen_triangle() {
        assert!(run([(40.0, 40.0), (60.0, 40.0), (40.0, 60.0)], 32, 32, 2)
            .iter()
            .all(WorkerThreadData::is_empty));
    }
}
