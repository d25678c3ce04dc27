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

//! Screen-aligned rectangle drawer
//!
//! Rects run through the same sample, shade and blend stages as triangles, with
//! linear (not perspective) texture stepping, nearest filtering and a fixed light
//! level. Rows are partitioned between workers exactly like triangle bands.

use std::marker::PhantomData;

use super::backend::Backend;
use super::drawer::{
    leading_mask, resolve_backend, Pixel, PixelState, PolicyKinds, PolicyVisitor, RowInputs,
    RowWriter,
};
use super::framebuffer::RowBands;
use super::modes::{
    BlendKind, BlendPolicy, FilterKind, FilterPolicy, SamplerKind, SamplerPolicy, ShadePolicy,
};
use super::primitives::{WorkerThreadData, BLOCK_SIZE};
use super::sampler::{fuzz_origin, skip_fuzz, to_fixed};
use super::uniforms::Uniforms;
use crate::core::error::Result;

/// 1.0 in the 8.24 texture coordinate format
const TEXCOORD_ONE: f32 = 16_777_216.0;

/// Rect draw request
///
/// Screen coordinates are in pixels (`x1`/`y1` exclusive), texture coordinates in
/// texture repeats. `u0`/`v0` map to the top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct RectDrawArgs<'a> {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
    pub uniforms: &'a Uniforms<'a>,
    pub sampler: SamplerKind,
    pub blend: BlendKind,
}

impl<'a> RectDrawArgs<'a> {
    /// Rect covering `[x0, x1) x [y0, y1)` with the whole texture stretched over it
    pub fn new(
        (x0, y0): (f32, f32),
        (x1, y1): (f32, f32),
        uniforms: &'a Uniforms<'a>,
        sampler: SamplerKind,
        blend: BlendKind,
    ) -> Self {
        Self {
            x0,
            y0,
            x1,
            y1,
            u0: 0.0,
            v0: 0.0,
            u1: 1.0,
            v1: 1.0,
            uniforms,
            sampler,
            blend,
        }
    }

    /// Replace the texture coordinates of the top-left and bottom-right corner
    pub fn with_texcoords(mut self, (u0, v0): (f32, f32), (u1, v1): (f32, f32)) -> Self {
        self.u0 = u0;
        self.v0 = v0;
        self.u1 = u1;
        self.v1 = v1;
        self
    }
}

/// Resolved rect drawer entry point
pub type RectFn<P> = fn(&RectContext<'_>, &WorkerThreadData, &mut RowBands<'_, P>);

/// Everything a rect drawer reads, resolved once per draw call
#[derive(Debug, Clone, Copy)]
pub struct RectContext<'a> {
    pub args: RectDrawArgs<'a>,
    pub state: PixelState<'a>,
}

/// Pixel bounds and fixed-point stepping of a rect clipped to the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RectSetup {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
    start_u: i32,
    start_v: i32,
    step_u: i32,
    step_v: i32,
}

impl RectSetup {
    /// Returns `None` for a rect that covers no pixel of a `width` x `height` target
    fn new(args: &RectDrawArgs<'_>, width: usize, height: usize) -> Option<Self> {
        let pixel = |c: f32, max: usize| ((c + 0.5) as i32).clamp(0, max as i32) as usize;
        let x0 = pixel(args.x0, width);
        let x1 = pixel(args.x1, width);
        let y0 = pixel(args.y0, height);
        let y1 = pixel(args.y1, height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let fstep_u = (args.u1 - args.u0) / (args.x1 - args.x0);
        let fstep_v = (args.v1 - args.v0) / (args.y1 - args.y0);
        let start_u = args.u0 + (x0 as f32 + 0.5 - args.x0) * fstep_u;
        let start_v = args.v0 + (y0 as f32 + 0.5 - args.y0) * fstep_v;

        Some(Self {
            x0,
            y0,
            x1,
            y1,
            start_u: to_fixed(start_u * TEXCOORD_ONE),
            start_v: to_fixed(start_v * TEXCOORD_ONE),
            step_u: to_fixed(fstep_u * TEXCOORD_ONE),
            step_v: to_fixed(fstep_v * TEXCOORD_ONE),
        })
    }
}

/// Draw the rows of a rect owned by one worker
pub(crate) fn draw_rect<P, W, S, F, Sh, B>(
    ctx: &RectContext<'_>,
    thread: &WorkerThreadData,
    bands: &mut RowBands<'_, P>,
) where
    W: RowWriter<P>,
    S: SamplerPolicy,
    F: FilterPolicy,
    Sh: ShadePolicy,
    B: BlendPolicy,
{
    let Some(rect) = RectSetup::new(&ctx.args, bands.width(), bands.height()) else {
        return;
    };

    let count = rect.x1 - rect.x0;
    let light = ctx.state.light.level();
    let mut fuzzpos = fuzz_origin(ctx.state.fuzz_start, rect.x0, rect.y0);
    let mut pos_v = rect.start_v;

    for y in rect.y0..rect.y1 {
        if !thread.owns_row(y) {
            skip_fuzz(&mut fuzzpos, count);
            pos_v = pos_v.wrapping_add(rect.step_v);
            continue;
        }

        let line = bands.row_mut(y);
        let mut pos_u = rect.start_u;
        for x in (rect.x0..rect.x1).step_by(BLOCK_SIZE) {
            let len = (rect.x1 - x).min(BLOCK_SIZE);
            let mut inputs = RowInputs {
                len,
                light: [light; BLOCK_SIZE],
                ..RowInputs::default()
            };
            for i in 0..len {
                inputs.u[i] = pos_u;
                inputs.v[i] = pos_v;
                pos_u = pos_u.wrapping_add(rect.step_u);
            }
            W::write_row::<S, F, Sh, B>(
                &ctx.state,
                &inputs,
                &mut line[x..x + len],
                leading_mask(len),
                &mut fuzzpos,
            );
        }

        pos_v = pos_v.wrapping_add(rect.step_v);
    }
}

/// Rect drawer visitor
pub(crate) struct RectFns<P, W>(PhantomData<(P, W)>);

impl<P, W: RowWriter<P>> PolicyVisitor for RectFns<P, W> {
    type Output = RectFn<P>;

    fn visit<S, F, Sh, B>() -> RectFn<P>
    where
        S: SamplerPolicy,
        F: FilterPolicy,
        Sh: ShadePolicy,
        B: BlendPolicy,
    {
        draw_rect::<P, W, S, F, Sh, B>
    }
}

/// Resolved, shareable drawer for one rect
pub struct RectDrawer<'a, P: Pixel> {
    ctx: RectContext<'a>,
    backend: Backend,
    draw: RectFn<P>,
}

impl<'a, P: Pixel> RectDrawer<'a, P> {
    /// Resolve the drawer for a rect request
    ///
    /// # Examples
    ///
    /// ```
    /// use polyraster::core::raster::{
    ///     Backend, BlendKind, FrameBuffer, RectDrawArgs, RectDrawer, SamplerKind, Uniforms,
    ///     WorkerThreadData,
    /// };
    ///
    /// let uniforms = Uniforms { color: 0xFF12_3456, ..Uniforms::default() };
    /// let args = RectDrawArgs::new(
    ///     (2.0, 2.0),
    ///     (6.0, 4.0),
    ///     &uniforms,
    ///     SamplerKind::Fill,
    ///     BlendKind::Opaque,
    /// );
    /// let drawer = RectDrawer::<u32>::new(&args, Backend::Scalar)?;
    ///
    /// let mut frame = FrameBuffer::<u32>::new(8, 8);
    /// let mut bands = frame.split_bands(1);
    /// drawer.execute(&WorkerThreadData::new(0, 1), &mut bands[0]);
    /// drop(bands);
    ///
    /// assert_eq!(frame.pixel(2, 2), 0xFF12_3456);
    /// assert_eq!(frame.pixel(5, 3), 0xFF12_3456);
    /// assert_eq!(frame.pixel(6, 3), 0);
    /// # Ok::<(), polyraster::RasterError>(())
    /// ```
    pub fn new(args: &RectDrawArgs<'a>, backend: Backend) -> Result<Self> {
        args.uniforms
            .validate(args.sampler, P::FORMAT.texture_format())?;
        let backend = resolve_backend::<P>(backend)?;
        let kinds = PolicyKinds {
            filter: FilterKind::Nearest,
            ..PolicyKinds::new(args.sampler, args.blend, args.uniforms)
        };

        log::debug!(
            "Resolved rect drawer: format={:?} backend={} sampler={:?} shade={:?} blend={:?}",
            P::FORMAT,
            backend,
            kinds.sampler,
            kinds.shade,
            kinds.blend
        );

        Ok(Self {
            ctx: RectContext {
                args: *args,
                state: PixelState::new(args.uniforms),
            },
            backend,
            draw: P::rect_fn(&kinds, backend),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Draw the rows of the rect owned by `thread`
    pub fn execute(&self, thread: &WorkerThreadData, bands: &mut RowBands<'_, P>) {
        debug_assert_eq!(thread.core, bands.core(), "worker and band view disagree");
        (self.draw)(&self.ctx, thread, bands);
    }
}

impl<P: Pixel> std::fmt::Debug for RectDrawer<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RectDrawer")
            .field("format", &P::FORMAT)
            .field("backend", &self.backend)
            .field("sampler", &self.ctx.args.sampler)
            .field("blend", &self.ctx.args.blend)
            .finish_non_exhaustive()
    }
}
