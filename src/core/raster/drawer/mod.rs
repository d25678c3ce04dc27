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

//! Block and span drawer
//!
//! A [`TriDrawer`] is resolved once per draw call: the uniforms are validated, the
//! back-end is selected and the sampler/filter/shade/blend combination is turned into a
//! single monomorphized function pointer. Executing it walks the spans and blocks of
//! one [`WorkerThreadData`] and writes only into that worker's [`RowBands`].
//!
//! # Row walk
//!
//! For each 8-pixel row of a block the perspective divide is done twice, at the row
//! start and 8 pixels further, and the texture coordinates, light level and dynamic
//! light are stepped linearly in between. The pixel format decides what happens to
//! the resulting [`RowInputs`]:
//!
//! - truecolor rows run through a [`PixelKernel`](truecolor::PixelKernel) (scalar, SSE2
//!   or AVX2) for the shade and blend stages
//! - palette rows are shaded through the colormaps one pixel at a time

mod pal8;
mod scalar;
mod truecolor;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
mod sse2;

use std::marker::PhantomData;

use super::backend::Backend;
use super::blend::BlendParams;
use super::framebuffer::RowBands;
use super::gradient::{ScreenTriangleStepVariables, TriDrawTriangleArgs};
use super::light::{calc_dynamic_light, resolve_normal, LightParams};
use super::modes::*;
use super::primitives::{BgraColor, PolyLight, WorkerThreadData, BLOCK_SIZE};
use super::rect::{RectFn, RectFns};
use super::sampler::{fuzz_origin, skip_fuzz, to_fixed, TexelSource};
use super::shade::ShadeParams;
use super::uniforms::{PaletteTables, TextureFormat, Uniforms};
use crate::core::error::Result;

pub(crate) use pal8::Palette;
pub(crate) use truecolor::Truecolor;

/// Destination pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 0xAARRGGBB, alpha written as 0xFF
    Bgra8888,
    /// 8-bit palette index
    Pal8,
}

impl PixelFormat {
    /// Texel format the texture-backed samplers read for this output
    pub fn texture_format(self) -> TextureFormat {
        match self {
            PixelFormat::Bgra8888 => TextureFormat::Bgra,
            PixelFormat::Pal8 => TextureFormat::Indexed,
        }
    }
}

/// Destination pixel type, implemented for `u32` (truecolor) and `u8` (palette)
pub trait Pixel: Copy + Default + Send + Sync + 'static + private::Sealed {
    const FORMAT: PixelFormat;
}

mod private {
    use super::{Backend, DrawFn, PolicyKinds, RectFn};

    pub trait Sealed: Sized {
        fn triangle_fn(kinds: &PolicyKinds, backend: Backend) -> DrawFn<Self>;
        fn rect_fn(kinds: &PolicyKinds, backend: Backend) -> RectFn<Self>;
    }
}

impl Pixel for u32 {
    const FORMAT: PixelFormat = PixelFormat::Bgra8888;
}

impl private::Sealed for u32 {
    fn triangle_fn(kinds: &PolicyKinds, backend: Backend) -> DrawFn<u32> {
        match backend {
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => select::<TriangleFns<u32, Truecolor<avx2::Avx2Kernel>>>(kinds),
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => select::<TriangleFns<u32, Truecolor<sse2::Sse2Kernel>>>(kinds),
            _ => select::<TriangleFns<u32, Truecolor<scalar::ScalarKernel>>>(kinds),
        }
    }

    fn rect_fn(kinds: &PolicyKinds, backend: Backend) -> RectFn<u32> {
        match backend {
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => select::<RectFns<u32, Truecolor<avx2::Avx2Kernel>>>(kinds),
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => select::<RectFns<u32, Truecolor<sse2::Sse2Kernel>>>(kinds),
            _ => select::<RectFns<u32, Truecolor<scalar::ScalarKernel>>>(kinds),
        }
    }
}

impl Pixel for u8 {
    const FORMAT: PixelFormat = PixelFormat::Pal8;
}

impl private::Sealed for u8 {
    fn triangle_fn(kinds: &PolicyKinds, _backend: Backend) -> DrawFn<u8> {
        select::<TriangleFns<u8, Palette>>(kinds)
    }

    fn rect_fn(kinds: &PolicyKinds, _backend: Backend) -> RectFn<u8> {
        select::<RectFns<u8, Palette>>(kinds)
    }
}

/// Resolve the back-end tier a pixel format runs on
///
/// Palette output has a single scalar tier, so the request is ignored there.
pub(crate) fn resolve_backend<P: Pixel>(requested: Backend) -> Result<Backend> {
    match P::FORMAT {
        PixelFormat::Bgra8888 => requested.resolve(),
        PixelFormat::Pal8 => {
            if requested != Backend::Auto && requested != Backend::Scalar {
                log::debug!("Palette output ignores backend request {requested}");
            }
            Ok(Backend::Scalar)
        }
    }
}

/// Mode combination of one draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyKinds {
    pub sampler: SamplerKind,
    pub filter: FilterKind,
    pub shade: ShadeKind,
    pub blend: BlendKind,
}

impl PolicyKinds {
    pub(crate) fn new(sampler: SamplerKind, blend: BlendKind, uniforms: &Uniforms<'_>) -> Self {
        Self {
            sampler,
            filter: sampler.filter_kind(uniforms),
            shade: sampler.shade_kind(uniforms),
            blend,
        }
    }
}

/// Turns a statically known mode combination into a value (a drawer function)
pub(crate) trait PolicyVisitor {
    type Output;

    fn visit<S, F, Sh, B>() -> Self::Output
    where
        S: SamplerPolicy,
        F: FilterPolicy,
        Sh: ShadePolicy,
        B: BlendPolicy;
}

/// Resolve a runtime mode combination through a visitor
///
/// Only the texture sampler is instantiated with linear filtering and only the fuzz
/// sampler without shading.
pub(crate) fn select<V: PolicyVisitor>(kinds: &PolicyKinds) -> V::Output {
    match kinds.sampler {
        SamplerKind::Texture => match kinds.filter {
            FilterKind::Nearest => select_shade::<V, TextureSampler, NearestFilter>(kinds),
            FilterKind::Linear => select_shade::<V, TextureSampler, LinearFilter>(kinds),
        },
        SamplerKind::Fill => select_shade::<V, FillSampler, NearestFilter>(kinds),
        SamplerKind::Shaded => select_shade::<V, ShadedSampler, NearestFilter>(kinds),
        SamplerKind::Stencil => select_shade::<V, StencilSampler, NearestFilter>(kinds),
        SamplerKind::Translated => select_shade::<V, TranslatedSampler, NearestFilter>(kinds),
        SamplerKind::Skycap => select_shade::<V, SkycapSampler, NearestFilter>(kinds),
        SamplerKind::FogBoundary => select_shade::<V, FogBoundarySampler, NearestFilter>(kinds),
        SamplerKind::Fuzz => select_blend::<V, FuzzSampler, NearestFilter, NoShade>(kinds),
    }
}

fn select_shade<V, S, F>(kinds: &PolicyKinds) -> V::Output
where
    V: PolicyVisitor,
    S: SamplerPolicy,
    F: FilterPolicy,
{
    match kinds.shade {
        ShadeKind::None => select_blend::<V, S, F, NoShade>(kinds),
        ShadeKind::Simple => select_blend::<V, S, F, SimpleShade>(kinds),
        ShadeKind::Advanced => select_blend::<V, S, F, AdvancedShade>(kinds),
    }
}

fn select_blend<V, S, F, Sh>(kinds: &PolicyKinds) -> V::Output
where
    V: PolicyVisitor,
    S: SamplerPolicy,
    F: FilterPolicy,
    Sh: ShadePolicy,
{
    match kinds.blend {
        BlendKind::Opaque => V::visit::<S, F, Sh, OpaqueBlend>(),
        BlendKind::Masked => V::visit::<S, F, Sh, MaskedBlend>(),
        BlendKind::AddSrcColorOneMinusSrcColor => V::visit::<S, F, Sh, AddSrcColorBlend>(),
        BlendKind::Shaded => V::visit::<S, F, Sh, ShadedBlend>(),
        BlendKind::AddClampShaded => V::visit::<S, F, Sh, AddClampShadedBlend>(),
        BlendKind::AddClamp => V::visit::<S, F, Sh, AddClampBlend>(),
        BlendKind::SubClamp => V::visit::<S, F, Sh, SubClampBlend>(),
        BlendKind::RevSubClamp => V::visit::<S, F, Sh, RevSubClampBlend>(),
    }
}

const NO_PALETTE: PaletteTables<'static> = PaletteTables {
    colormaps: &[],
    base_colors: &[],
    rgb256k: &[],
};

/// Per-draw-call state shared by the triangle and rect drawers
#[derive(Debug, Clone, Copy)]
pub struct PixelState<'a> {
    pub texels: TexelSource<'a>,
    pub shade: ShadeParams,
    pub blend: BlendParams,
    pub light: LightParams,
    pub palette: PaletteTables<'a>,
    pub fuzz_start: u32,
}

impl<'a> PixelState<'a> {
    pub(crate) fn new(uniforms: &Uniforms<'a>) -> Self {
        Self {
            texels: TexelSource::new(uniforms),
            shade: ShadeParams::new(&uniforms.shade_constants),
            blend: BlendParams::new(uniforms.src_alpha, uniforms.dest_alpha),
            light: LightParams::new(uniforms),
            palette: uniforms.palette.unwrap_or(NO_PALETTE),
            fuzz_start: uniforms.fuzz_start,
        }
    }
}

/// Interpolated inputs of one row of up to 8 pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowInputs {
    /// Number of pixels to sample
    pub len: usize,
    /// 8.24 texture coordinates
    pub u: [i32; BLOCK_SIZE],
    pub v: [i32; BLOCK_SIZE],
    /// Light level, 0..=256
    pub light: [u32; BLOCK_SIZE],
    /// Dynamic light per channel, 0..=256
    pub dynlight: [BgraColor; BLOCK_SIZE],
}

impl Default for RowInputs {
    fn default() -> Self {
        Self {
            len: BLOCK_SIZE,
            u: [0; BLOCK_SIZE],
            v: [0; BLOCK_SIZE],
            light: [0; BLOCK_SIZE],
            dynlight: [BgraColor::default(); BLOCK_SIZE],
        }
    }
}

/// Coverage bit of pixel `i` in a row mask (bit 7 is the leftmost pixel)
#[inline(always)]
pub(crate) fn covers(mask: u8, i: usize) -> bool {
    mask & (0x80 >> i) != 0
}

/// Row mask with the first `n` pixels set
#[inline(always)]
pub(crate) fn leading_mask(n: usize) -> u8 {
    (0xFF00u16 >> n.min(BLOCK_SIZE)) as u8
}

/// Coverage of block row `row` from the two half-block masks
#[inline(always)]
fn row_mask(mask0: u32, mask1: u32, row: usize) -> u8 {
    let half = if row < 4 { mask0 } else { mask1 };
    (half >> (24 - (row & 3) * 8)) as u8
}

/// Writes one row of pixels for a given pixel format
pub trait RowWriter<P> {
    /// Sample, shade and blend `inputs.len` pixels into `dest`
    ///
    /// Every pixel is sampled (so the fuzz position advances uniformly), but only the
    /// pixels whose `mask` bit is set are read from or written to `dest`.
    fn write_row<S, F, Sh, B>(
        state: &PixelState<'_>,
        inputs: &RowInputs,
        dest: &mut [P],
        mask: u8,
        fuzzpos: &mut usize,
    ) where
        S: SamplerPolicy,
        F: FilterPolicy,
        Sh: ShadePolicy,
        B: BlendPolicy;
}

/// Resolved triangle drawer entry point
pub type DrawFn<P> = fn(&DrawContext<'_>, &WorkerThreadData, &mut RowBands<'_, P>);

/// Everything a triangle drawer reads, resolved once per draw call
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub args: TriDrawTriangleArgs<'a>,
    pub state: PixelState<'a>,
    pub normal: [f32; 3],
    pub lights: &'a [PolyLight],
    pub dyn_light_color: u32,
    /// Dynamic light when the light list is empty
    pub ambient: BgraColor,
}

impl<'a> DrawContext<'a> {
    fn new(args: &TriDrawTriangleArgs<'a>) -> Self {
        let uniforms = args.uniforms;
        Self {
            args: *args,
            state: PixelState::new(uniforms),
            normal: resolve_normal(uniforms, &args.v1, &args.v2, &args.v3),
            lights: uniforms.lights,
            dyn_light_color: uniforms.dyn_light_color,
            ambient: calc_dynamic_light(&[], [0.0; 3], [0.0; 3], uniforms.dyn_light_color),
        }
    }

    /// Dynamic light at an interpolated position
    #[inline(always)]
    fn dynamic_light(&self, pos: &ScreenTriangleStepVariables) -> BgraColor {
        if self.lights.is_empty() {
            return self.ambient;
        }
        let world = [
            pos.world_x / pos.w,
            pos.world_y / pos.w,
            pos.world_z / pos.w,
        ];
        calc_dynamic_light(self.lights, world, self.normal, self.dyn_light_color)
    }
}

/// Steps the interpolants of one 8x8 block row by row
struct BlockWalker {
    pos: ScreenTriangleStepVariables,
    step_x: ScreenTriangleStepVariables,
    step_y: ScreenTriangleStepVariables,
}

impl BlockWalker {
    fn new(args: &TriDrawTriangleArgs<'_>, x: usize, y: usize) -> Self {
        Self {
            pos: args.start_at(x as f32, y as f32),
            step_x: args.gradient_x * BLOCK_SIZE as f32,
            step_y: args.gradient_y,
        }
    }

    #[inline(always)]
    fn skip_row(&mut self) {
        self.pos += self.step_y;
    }

    #[inline(always)]
    fn row(&mut self, ctx: &DrawContext<'_>) -> RowInputs {
        let start = self.pos;
        let end = start + self.step_x;

        let rcp_w = 16_777_216.0 / start.w;
        let mut u = to_fixed(start.u * rcp_w);
        let mut v = to_fixed(start.v * rcp_w);
        let rcp_w = 16_777_216.0 / end.w;
        let next_u = to_fixed(end.u * rcp_w);
        let next_v = to_fixed(end.v * rcp_w);
        let step_u = next_u.wrapping_sub(u) / 8;
        let step_v = next_v.wrapping_sub(v) / 8;

        let (mut lightpos, lightstep) = ctx.state.light.row(start.w, end.w);

        let mut dynlight = ctx.dynamic_light(&start);
        let dynlight_next = ctx.dynamic_light(&end);
        let dyn_step = |cur: u32, next: u32| (next as i32 - cur as i32) >> 3;
        let step_r = dyn_step(dynlight.r, dynlight_next.r);
        let step_g = dyn_step(dynlight.g, dynlight_next.g);
        let step_b = dyn_step(dynlight.b, dynlight_next.b);

        let mut inputs = RowInputs::default();
        for i in 0..BLOCK_SIZE {
            inputs.u[i] = u;
            inputs.v[i] = v;
            u = u.wrapping_add(step_u);
            v = v.wrapping_add(step_v);

            inputs.light[i] = (lightpos >> 8).clamp(0, 256) as u32;
            lightpos = lightpos.wrapping_add(lightstep);

            inputs.dynlight[i] = dynlight;
            dynlight.r = (dynlight.r as i32 + step_r).max(0) as u32;
            dynlight.g = (dynlight.g as i32 + step_g).max(0) as u32;
            dynlight.b = (dynlight.b as i32 + step_b).max(0) as u32;
        }

        self.pos += self.step_y;
        inputs
    }
}

/// Draw every span and block assigned to one worker
pub(crate) fn draw_triangle<P, W, S, F, Sh, B>(
    ctx: &DrawContext<'_>,
    thread: &WorkerThreadData,
    bands: &mut RowBands<'_, P>,
) where
    W: RowWriter<P>,
    S: SamplerPolicy,
    F: FilterPolicy,
    Sh: ShadePolicy,
    B: BlendPolicy,
{
    for span in &thread.full_spans {
        let y = usize::from(span.y);
        for block in 0..span.length as usize {
            let x = usize::from(span.x) + block * BLOCK_SIZE;
            draw_block::<P, W, S, F, Sh, B>(ctx, bands, x, y, u32::MAX, u32::MAX);
        }
    }

    for block in &thread.partial_blocks {
        draw_block::<P, W, S, F, Sh, B>(
            ctx,
            bands,
            usize::from(block.x),
            usize::from(block.y),
            block.mask0,
            block.mask1,
        );
    }
}

#[inline(always)]
fn draw_block<P, W, S, F, Sh, B>(
    ctx: &DrawContext<'_>,
    bands: &mut RowBands<'_, P>,
    x: usize,
    y: usize,
    mask0: u32,
    mask1: u32,
) where
    W: RowWriter<P>,
    S: SamplerPolicy,
    F: FilterPolicy,
    Sh: ShadePolicy,
    B: BlendPolicy,
{
    let mut fuzzpos = fuzz_origin(ctx.state.fuzz_start, x, y);
    let mut walker = BlockWalker::new(&ctx.args, x, y);

    for row in 0..BLOCK_SIZE {
        let mask = row_mask(mask0, mask1, row);
        if mask == 0 {
            walker.skip_row();
            if S::KIND == SamplerKind::Fuzz {
                skip_fuzz(&mut fuzzpos, BLOCK_SIZE);
            }
            continue;
        }

        let inputs = walker.row(ctx);
        let line = bands.row_mut(y + row);
        let end = (x + BLOCK_SIZE).min(line.len());
        debug_assert!(x < end, "block at x = {x} starts outside the frame");
        W::write_row::<S, F, Sh, B>(&ctx.state, &inputs, &mut line[x..end], mask, &mut fuzzpos);
    }
}

/// Triangle drawer visitor
pub(crate) struct TriangleFns<P, W>(PhantomData<(P, W)>);

impl<P, W: RowWriter<P>> PolicyVisitor for TriangleFns<P, W> {
    type Output = DrawFn<P>;

    fn visit<S, F, Sh, B>() -> DrawFn<P>
    where
        S: SamplerPolicy,
        F: FilterPolicy,
        Sh: ShadePolicy,
        B: BlendPolicy,
    {
        draw_triangle::<P, W, S, F, Sh, B>
    }
}

/// Resolved, shareable drawer for one triangle
///
/// Construction validates the uniforms against the sampler and pixel format, resolves
/// the back-end and picks the drawer function. [`execute`](Self::execute) is then
/// called once per worker, typically from several threads at once.
pub struct TriDrawer<'a, P: Pixel> {
    ctx: DrawContext<'a>,
    kinds: PolicyKinds,
    backend: Backend,
    draw: DrawFn<P>,
}

impl<'a, P: Pixel> TriDrawer<'a, P> {
    /// Resolve the drawer for a draw request
    ///
    /// # Arguments
    ///
    /// * `args` - Triangle draw request
    /// * `backend` - Requested truecolor tier (ignored for palette output)
    ///
    /// # Returns
    ///
    /// The drawer, or an error if a table the sampler needs is missing or the
    /// requested tier is unavailable
    pub fn new(args: &TriDrawTriangleArgs<'a>, backend: Backend) -> Result<Self> {
        args.uniforms
            .validate(args.sampler, P::FORMAT.texture_format())?;
        let backend = resolve_backend::<P>(backend)?;
        let kinds = PolicyKinds::new(args.sampler, args.blend, args.uniforms);

        log::debug!(
            "Resolved triangle drawer: format={:?} backend={} sampler={:?} filter={:?} shade={:?} blend={:?}",
            P::FORMAT,
            backend,
            kinds.sampler,
            kinds.filter,
            kinds.shade,
            kinds.blend
        );

        Ok(Self {
            ctx: DrawContext::new(args),
            kinds,
            backend,
            draw: P::triangle_fn(&kinds, backend),
        })
    }

    /// Concrete tier the drawer runs on
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn sampler(&self) -> SamplerKind {
        self.kinds.sampler
    }

    pub fn blend(&self) -> BlendKind {
        self.kinds.blend
    }

    pub fn shade(&self) -> ShadeKind {
        self.kinds.shade
    }

    pub fn filter(&self) -> FilterKind {
        self.kinds.filter
    }

    /// Draw the spans and blocks of one worker
    ///
    /// `bands` must be the view of the same core as `thread`.
    pub fn execute(&self, thread: &WorkerThreadData, bands: &mut RowBands<'_, P>) {
        debug_assert_eq!(thread.core, bands.core(), "worker and band view disagree");
        log::trace!(
            "Core {}/{}: {} full span(s), {} partial block(s)",
            thread.core,
            thread.num_cores,
            thread.full_spans.len(),
            thread.partial_blocks.len()
        );
        (self.draw)(&self.ctx, thread, bands);
    }
}

impl<P: Pixel> std::fmt::Debug for TriDrawer<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TriDrawer")
            .field("format", &P::FORMAT)
            .field("backend", &self.backend)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mask_order() {
        let mask0 = 0x8000_0001;
        let mask1 = 0x00FF_0000;
        assert_eq!(row_mask(mask0, mask1, 0), 0x80);
        assert_eq!(row_mask(mask0, mask1, 3), 0x01);
        assert_eq!(row_mask(mask0, mask1, 4), 0x00);
        assert_eq!(row_mask(mask0, mask1, 5), 0xFF);
    }

    #[test]
    fn test_leading_mask() {
        assert_eq!(leading_mask(8), 0xFF);
        assert_eq!(leading_mask(3), 0xE0);
        assert_eq!(leading_mask(0), 0x00);
        assert!(covers(leading_mask(1), 0));
        assert!(!covers(leading_mask(1), 1));
    }

    #[test]
    fn test_policy_kinds_follow_uniforms() {
        let uniforms = Uniforms {
            flags: crate::core::raster::UniformFlags::SIMPLE_SHADE,
            ..Uniforms::default()
        };
        let kinds = PolicyKinds::new(SamplerKind::Texture, BlendKind::Masked, &uniforms);
        assert_eq!(kinds.filter, FilterKind::Linear);
        assert_eq!(kinds.shade, ShadeKind::Simple);
        let kinds = PolicyKinds::new(SamplerKind::Fuzz, BlendKind::Shaded, &uniforms);
        assert_eq!(kinds.shade, ShadeKind::None);
    }

    struct KindOf;

    impl PolicyVisitor for KindOf {
        type Output = (SamplerKind, FilterKind, ShadeKind, BlendKind);

        fn visit<S, F, Sh, B>() -> Self::Output
        where
            S: SamplerPolicy,
            F: FilterPolicy,
            Sh: ShadePolicy,
            B: BlendPolicy,
        {
            (S::KIND, F::KIND, Sh::KIND, B::KIND)
        }
    }

    #[test]
    fn test_select_reaches_every_combination() {
        for sampler in SamplerKind::ALL {
            for blend in BlendKind::ALL {
                for shade in [ShadeKind::Simple, ShadeKind::Advanced] {
                    let kinds = PolicyKinds {
                        sampler,
                        filter: FilterKind::Nearest,
                        shade,
                        blend,
                    };
                    let (s, f, sh, b) = select::<KindOf>(&kinds);
                    assert_eq!((s, f, b), (sampler, FilterKind::Nearest, blend));
                    let expected = if sampler == SamplerKind::Fuzz {
                        ShadeKind::None
                    } else {
                        shade
                    };
                    assert_eq!(sh, expected);
                }
            }
        }
        let linear = PolicyKinds {
            sampler: SamplerKind::Texture,
            filter: FilterKind::Linear,
            shade: ShadeKind::Simple,
            blend: BlendKind::Opaque,
        };
        assert_eq!(select::<KindOf>(&linear).1, FilterKind::Linear);
    }
}
