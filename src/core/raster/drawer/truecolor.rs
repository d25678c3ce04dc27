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

//! Truecolor row writer
//!
//! Sampling is shared by every tier; a [`PixelKernel`] runs the shade and blend stages
//! for a batch of 8 pixels.

use std::marker::PhantomData;

use super::{covers, PixelState, RowInputs, RowWriter};
use crate::core::raster::blend::BlendParams;
use crate::core::raster::modes::{
    BlendPolicy, FilterPolicy, SamplerKind, SamplerPolicy, ShadePolicy,
};
use crate::core::raster::primitives::{BgraColor, BLOCK_SIZE};
use crate::core::raster::shade::ShadeParams;

#[cfg(target_arch = "x86_64")]
use crate::core::raster::{
    modes::{BlendKind, ShadeKind},
    shade::intensity,
};

/// Sampled inputs of the shade and blend stages for one row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelBatch {
    /// Raw sampled color, also the texel for the masking and alpha blends
    pub material: [u32; BLOCK_SIZE],
    /// Sampler shade value, 0..=256
    pub shade: [u32; BLOCK_SIZE],
    /// Light level, 0..=256
    pub light: [u32; BLOCK_SIZE],
    /// Destination pixels (zero where not read)
    pub bg: [u32; BLOCK_SIZE],
    pub dynlight: [BgraColor; BLOCK_SIZE],
}

/// Shade and blend stage of one truecolor tier
pub trait PixelKernel {
    /// Shade and blend all 8 pixels of `batch` into `out`
    ///
    /// # Safety
    ///
    /// The CPU must support the instruction set the kernel is compiled for.
    unsafe fn shade_blend<Sh: ShadePolicy, B: BlendPolicy>(
        batch: &PixelBatch,
        shade: &ShadeParams,
        blend: &BlendParams,
        out: &mut [u32; BLOCK_SIZE],
    );
}

/// Row writer for 32-bit output on kernel `K`
pub struct Truecolor<K>(PhantomData<K>);

impl<K: PixelKernel> RowWriter<u32> for Truecolor<K> {
    #[inline(always)]
    fn write_row<S, F, Sh, B>(
        state: &PixelState<'_>,
        inputs: &RowInputs,
        dest: &mut [u32],
        mask: u8,
        fuzzpos: &mut usize,
    ) where
        S: SamplerPolicy,
        F: FilterPolicy,
        Sh: ShadePolicy,
        B: BlendPolicy,
    {
        let reads_bg = B::KIND.reads_destination() || S::KIND == SamplerKind::FogBoundary;

        let mut batch = PixelBatch::default();
        for i in 0..inputs.len {
            if reads_bg && covers(mask, i) && i < dest.len() {
                batch.bg[i] = dest[i];
            }
            let texel = state
                .texels
                .fetch::<S, F>(inputs.u[i], inputs.v[i], batch.bg[i], fuzzpos);
            batch.material[i] = texel.color;
            batch.shade[i] = texel.shade;
            batch.light[i] = inputs.light[i];
            batch.dynlight[i] = inputs.dynlight[i];
        }

        let mut out = [0u32; BLOCK_SIZE];
        // SAFETY: SIMD kernels are only selected after runtime feature detection
        unsafe { K::shade_blend::<Sh, B>(&batch, &state.shade, &state.blend, &mut out) };

        for (i, (pixel, value)) in dest.iter_mut().zip(out).enumerate().take(inputs.len) {
            if covers(mask, i) {
                *pixel = value;
            }
        }
    }
}

/// Lanes per batch when every pixel takes four 16-bit channels
#[cfg(target_arch = "x86_64")]
pub(crate) const LANES: usize = BLOCK_SIZE * 4;

/// 16-bit operands of a batch for the SIMD tiers, laid out B, G, R, A per pixel
///
/// Everything that needs a division or a per-pixel scalar decision is done here, so the
/// kernels only multiply, add and shift.
#[cfg(target_arch = "x86_64")]
#[derive(Debug, Clone)]
pub(crate) struct Lanes {
    pub light: [i16; LANES],
    pub inv_light: [i16; LANES],
    pub intensity: [i16; LANES],
    pub dynlight: [i16; LANES],
    pub fade: [i16; LANES],
    pub tint: [i16; LANES],
    pub inv_desaturate: i16,
    /// Foreground weight of the alpha blends
    pub fg_alpha: [i16; LANES],
    /// Background weight of the alpha blends
    pub bg_alpha: [i16; LANES],
}

#[cfg(target_arch = "x86_64")]
impl Lanes {
    pub(crate) fn new<Sh: ShadePolicy, B: BlendPolicy>(
        batch: &PixelBatch,
        shade: &ShadeParams,
        blend: &BlendParams,
    ) -> Self {
        let per_pixel = |f: &dyn Fn(usize) -> u32| -> [i16; LANES] {
            std::array::from_fn(|lane| f(lane / 4) as i16)
        };
        let per_channel = |f: &dyn Fn(usize) -> BgraColor| -> [i16; LANES] {
            std::array::from_fn(|lane| {
                let c = f(lane / 4);
                [c.b, c.g, c.r, 0][lane % 4] as i16
            })
        };

        let advanced = Sh::KIND == ShadeKind::Advanced;
        let intensity = if advanced {
            per_pixel(&|i| intensity(BgraColor::unpack(batch.material[i]), shade.desaturate))
        } else {
            [0; LANES]
        };
        let (fade, tint) = if advanced {
            (
                per_channel(&|_| BgraColor::rgb(shade.fade.r, shade.fade.g, shade.fade.b)),
                per_channel(&|_| BgraColor::rgb(shade.light.r, shade.light.g, shade.light.b)),
            )
        } else {
            ([0; LANES], [0; LANES])
        };

        let (fg_alpha, bg_alpha) = match B::KIND {
            BlendKind::Shaded | BlendKind::AddClampShaded => (
                per_pixel(&|i| blend.shade_alpha(batch.shade[i])),
                per_pixel(&|i| 256 - blend.shade_alpha(batch.shade[i])),
            ),
            BlendKind::AddClamp | BlendKind::SubClamp | BlendKind::RevSubClamp => (
                per_pixel(&|i| blend.texel_alphas(batch.material[i]).0),
                per_pixel(&|i| blend.texel_alphas(batch.material[i]).1),
            ),
            _ => ([0; LANES], [0; LANES]),
        };

        Self {
            light: per_pixel(&|i| batch.light[i]),
            inv_light: per_pixel(&|i| 256 - batch.light[i]),
            intensity,
            dynlight: per_channel(&|i| batch.dynlight[i]),
            fade,
            tint,
            inv_desaturate: shade.inv_desaturate as i16,
            fg_alpha,
            bg_alpha,
        }
    }
}
