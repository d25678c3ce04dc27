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

//! SSE2 truecolor tier
//!
//! Two pixels per 128-bit register, one 16-bit lane per channel. Every product of the
//! shade and blend stages stays below 2^16, so `mullo` followed by a logical shift is
//! exact; only the add/sub alpha family widens to 32-bit lanes for its signed sum.

#[allow(clippy::wildcard_imports)]
use std::arch::x86_64::*;

use super::truecolor::{Lanes, PixelBatch, PixelKernel, LANES};
use crate::core::raster::blend::BlendParams;
use crate::core::raster::modes::{BlendKind, BlendPolicy, ShadeKind, ShadePolicy};
use crate::core::raster::primitives::BLOCK_SIZE;
use crate::core::raster::shade::ShadeParams;

pub struct Sse2Kernel;

impl PixelKernel for Sse2Kernel {
    #[inline]
    unsafe fn shade_blend<Sh: ShadePolicy, B: BlendPolicy>(
        batch: &PixelBatch,
        shade: &ShadeParams,
        blend: &BlendParams,
        out: &mut [u32; BLOCK_SIZE],
    ) {
        shade_blend_sse2::<Sh, B>(batch, shade, blend, out);
    }
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn load(lanes: &[i16; LANES], at: usize) -> __m128i {
    _mm_loadu_si128(lanes[at..at + 8].as_ptr().cast())
}

/// Signed sum of the weighted foreground and background, 32-bit lanes
#[inline]
#[target_feature(enable = "sse2")]
unsafe fn combine<B: BlendPolicy>(fg: __m128i, bg: __m128i) -> __m128i {
    match B::KIND {
        BlendKind::SubClamp => _mm_sub_epi32(fg, bg),
        BlendKind::RevSubClamp => _mm_sub_epi32(bg, fg),
        _ => _mm_add_epi32(fg, bg),
    }
}

#[target_feature(enable = "sse2")]
unsafe fn shade_blend_sse2<Sh: ShadePolicy, B: BlendPolicy>(
    batch: &PixelBatch,
    shade: &ShadeParams,
    blend: &BlendParams,
    out: &mut [u32; BLOCK_SIZE],
) {
    let lanes = Lanes::new::<Sh, B>(batch, shade, blend);
    let zero = _mm_setzero_si128();
    let max = _mm_set1_epi16(255);
    let opaque = _mm_set1_epi32(0xFF00_0000u32 as i32);

    for px in (0..BLOCK_SIZE).step_by(2) {
        let at = px * 4;

        let texels = _mm_loadl_epi64(batch.material[px..px + 2].as_ptr().cast());
        let bg_packed = _mm_loadl_epi64(batch.bg[px..px + 2].as_ptr().cast());
        let material = _mm_unpacklo_epi8(texels, zero);
        let bg = _mm_unpacklo_epi8(bg_packed, zero);

        let shaded = match Sh::KIND {
            ShadeKind::None => material,
            ShadeKind::Simple => {
                _mm_srli_epi16(_mm_mullo_epi16(material, load(&lanes.light, at)), 8)
            }
            ShadeKind::Advanced => {
                let inv_desaturate = _mm_set1_epi16(lanes.inv_desaturate);
                let desaturated = _mm_srli_epi16(
                    _mm_add_epi16(
                        _mm_mullo_epi16(material, inv_desaturate),
                        load(&lanes.intensity, at),
                    ),
                    8,
                );
                let faded = _mm_srli_epi16(
                    _mm_add_epi16(
                        _mm_mullo_epi16(load(&lanes.fade, at), load(&lanes.inv_light, at)),
                        _mm_mullo_epi16(desaturated, load(&lanes.light, at)),
                    ),
                    8,
                );
                _mm_srli_epi16(_mm_mullo_epi16(faded, load(&lanes.tint, at)), 8)
            }
        };
        let dynlight = _mm_srli_epi16(_mm_mullo_epi16(material, load(&lanes.dynlight, at)), 8);
        let fg = _mm_min_epi16(_mm_add_epi16(shaded, dynlight), max);

        let result = match B::KIND {
            BlendKind::Opaque => _mm_packus_epi16(fg, zero),
            BlendKind::Masked => {
                let transparent = _mm_cmpeq_epi32(texels, zero);
                _mm_or_si128(
                    _mm_and_si128(transparent, bg_packed),
                    _mm_andnot_si128(transparent, _mm_packus_epi16(fg, zero)),
                )
            }
            BlendKind::AddSrcColorOneMinusSrcColor => {
                let weight = _mm_sub_epi16(
                    _mm_set1_epi16(256),
                    _mm_add_epi16(fg, _mm_srli_epi16(fg, 7)),
                );
                let sum = _mm_add_epi16(fg, _mm_srli_epi16(_mm_mullo_epi16(bg, weight), 8));
                _mm_packus_epi16(_mm_min_epi16(sum, max), zero)
            }
            BlendKind::Shaded => {
                let sum = _mm_add_epi16(
                    _mm_mullo_epi16(fg, load(&lanes.fg_alpha, at)),
                    _mm_mullo_epi16(bg, load(&lanes.bg_alpha, at)),
                );
                _mm_packus_epi16(_mm_srli_epi16(sum, 8), zero)
            }
            BlendKind::AddClampShaded => {
                let lit = _mm_srli_epi16(_mm_mullo_epi16(fg, load(&lanes.fg_alpha, at)), 8);
                _mm_packus_epi16(_mm_min_epi16(_mm_add_epi16(lit, bg), max), zero)
            }
            BlendKind::AddClamp | BlendKind::SubClamp | BlendKind::RevSubClamp => {
                let fg = _mm_mullo_epi16(fg, load(&lanes.fg_alpha, at));
                let bg = _mm_mullo_epi16(bg, load(&lanes.bg_alpha, at));
                let lo = combine::<B>(_mm_unpacklo_epi16(fg, zero), _mm_unpacklo_epi16(bg, zero));
                let hi = combine::<B>(_mm_unpackhi_epi16(fg, zero), _mm_unpackhi_epi16(bg, zero));
                let sum = _mm_packs_epi32(_mm_srai_epi32(lo, 8), _mm_srai_epi32(hi, 8));
                _mm_packus_epi16(sum, zero)
            }
        };

        _mm_storel_epi64(
            out[px..px + 2].as_mut_ptr().cast(),
            _mm_or_si128(result, opaque),
        );
    }
}
