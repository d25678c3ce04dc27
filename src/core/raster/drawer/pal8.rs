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

//! 8-bit palette row writer
//!
//! Shading is a colormap lookup; blends go through the base colors and back through
//! the RGB to index table.

use super::{covers, PixelState, RowInputs, RowWriter};
use crate::core::raster::blend::blend;
use crate::core::raster::modes::{
    BlendKind, BlendPolicy, FilterPolicy, SamplerKind, SamplerPolicy, ShadeKind, ShadePolicy,
};
use crate::core::raster::primitives::BgraColor;
use crate::core::raster::sampler::{rgb256k_index, IndexTexel};
use crate::core::raster::uniforms::{PaletteTables, NUM_COLORMAPS};

/// Row writer for 8-bit palette output
pub struct Palette;

impl RowWriter<u8> for Palette {
    #[inline(always)]
    fn write_row<S, F, Sh, B>(
        state: &PixelState<'_>,
        inputs: &RowInputs,
        dest: &mut [u8],
        mask: u8,
        fuzzpos: &mut usize,
    ) where
        S: SamplerPolicy,
        F: FilterPolicy,
        Sh: ShadePolicy,
        B: BlendPolicy,
    {
        let palette = &state.palette;
        for i in 0..inputs.len {
            let texel = state
                .texels
                .fetch_index::<S>(inputs.u[i], inputs.v[i], palette, fuzzpos);
            if !covers(mask, i) || i >= dest.len() {
                continue;
            }
            dest[i] = shade_pixel::<S, Sh, B>(
                state,
                texel,
                dest[i],
                inputs.light[i],
                inputs.dynlight[i],
            );
        }
    }
}

/// Colormap lookup for light level `light` (0..=256)
#[inline(always)]
fn shade_index(palette: &PaletteTables<'_>, index: u8, light: u32) -> u8 {
    let map = ((256 - light.min(256)) >> 3).min(NUM_COLORMAPS as u32 - 1) as usize;
    palette.colormaps[(map << 8) + usize::from(index)]
}

#[inline(always)]
fn base_color(palette: &PaletteTables<'_>, index: u8) -> BgraColor {
    BgraColor::unpack(palette.base_colors[usize::from(index)])
}

#[inline(always)]
fn shade_pixel<S, Sh, B>(
    state: &PixelState<'_>,
    texel: IndexTexel,
    bg: u8,
    light: u32,
    dynlight: BgraColor,
) -> u8
where
    S: SamplerPolicy,
    Sh: ShadePolicy,
    B: BlendPolicy,
{
    let palette = &state.palette;

    match S::KIND {
        SamplerKind::FogBoundary => return shade_index(palette, bg, light),
        SamplerKind::Fuzz => {
            if texel.shade == 0 {
                return bg;
            }
            let a = 256 - texel.shade.min(256);
            let c = base_color(palette, bg);
            return rgb256k_index(
                palette,
                BgraColor::rgb((c.r * a) >> 8, (c.g * a) >> 8, (c.b * a) >> 8),
            );
        }
        _ => {}
    }

    let mut shaded = match Sh::KIND {
        ShadeKind::None => texel.index,
        ShadeKind::Simple | ShadeKind::Advanced => shade_index(palette, texel.index, light),
    };

    if dynlight.r != 0 || dynlight.g != 0 || dynlight.b != 0 {
        let material = base_color(palette, texel.index);
        let lit = base_color(palette, shaded);
        let channel = |m: u32, d: u32, l: u32| (((m * d) >> 8) + l).min(255);
        shaded = rgb256k_index(
            palette,
            BgraColor::rgb(
                channel(material.r, dynlight.r, lit.r),
                channel(material.g, dynlight.g, lit.g),
                channel(material.b, dynlight.b, lit.b),
            ),
        );
    }

    match B::KIND {
        BlendKind::Opaque => shaded,
        BlendKind::Masked
        | BlendKind::AddSrcColorOneMinusSrcColor
        | BlendKind::AddClamp
        | BlendKind::SubClamp
        | BlendKind::RevSubClamp
            if texel.texel == 0 =>
        {
            bg
        }
        BlendKind::Masked => shaded,
        _ => {
            let out = blend::<B>(
                base_color(palette, shaded),
                base_color(palette, bg),
                0xFF00_0000,
                texel.shade,
                &state.blend,
            );
            rgb256k_index(palette, BgraColor::unpack(out))
        }
    }
}
