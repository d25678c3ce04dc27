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

//! AVX2 truecolor tier
//!
//! Four pixels per 256-bit register. The arithmetic is the SSE2 tier's, widened; packing
//! goes back through 128-bit halves because the 256-bit pack instructions work per lane.

#[allow(clippy::wildcard_imports)]
use std::arch::x86_64::*;

use super::truecolor::{Lanes, PixelBatch, PixelKernel, LANES};
use crate::core::raster::blend::BlendParams;
use crate::core::raster::modes::{BlendKind, BlendPolicy, ShadeKind, ShadePolicy};
use crate::core::raster::primitives::BLOCK_SIZE;
use crate::core::raster::shade::ShadeParams;

pub struct Avx2Kernel;

impl PixelKernel for Avx2Kernel {
    #[inline]
    unsafe fn shade_blend<Sh: ShadePolicy, B: BlendPolicy>(
        batch: &PixelBatch,
        shade: &ShadeParams,
        blend: &BlendParams,
        out: &mut [u32; BLOCK_SIZE],
    ) {
        shade_blend_avx2::<Sh, B>(batch, shade, blend, out);
    }
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn load(lanes: &[i16; LANES], at: usize) -> __m256i {
    _mm256_loadu_si256(lanes[at..at + 16].as_ptr().cast())
}

/// Saturate 16 lanes (4 pixels) back to packed 8-bit channels
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn pack(v: __m256i) -> __m128i {
    _mm_packus_epi16(_mm256_castsi256_si128(v), _mm256_extracti128_si256::<1>(v))
}

/// Narrow 8 signed 32-bit lanes to 16 bits with signed saturation
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn narrow(v: __m256i) -> __m128i {
    _mm_packs_epi32(_mm256_castsi256_si128(v), _mm256_extracti128_si256::<1>(v))
}

/// Zero-extend the lanes of pixels 0-1 (`HALF = 0`) or 2-3 (`HALF = 1`) to 32 bits
#[inline]
#[target_feature(enable = "avx2")]
unsafe fn widen<const HALF: i32>(v: __m256i) -> __m256i {
    _mm256_cvtepu16_epi32(_mm256_extracti128_si256::<HALF>(v))
}

#[inline]
#[target_feature(enable = "avx2")]
unsafe fn combine<B: BlendPolicy>(fg: __m256i, bg: __m256i) -> __m256i {
    match B::KIND {
        BlendKind::SubClamp => _mm256_sub_epi32(fg, bg),
        BlendKind::RevSubClamp => _mm256_sub_epi32(bg, fg),
        _ => _mm256_add_epi32(fg, bg),
    }
}

#[target_feature(enable = "avx2")]
unsafe fn shade_blend_avx2<Sh: ShadePolicy, B: BlendPolicy>(
    batch: &PixelBatch,
    shade: &ShadeParams,
    blend: &BlendParams,
    out: &mut [u32; BLOCK_SIZE],
) {
    let lanes = Lanes::new::<Sh, B>(batch, shade, blend);
    let max = _mm256_set1_epi16(255);
    let opaque = _mm_set1_epi32(0xFF00_0000u32 as i32);

    for px in (0..BLOCK_SIZE).step_by(4) {
        let at = px * 4;

        let texels = _mm_loadu_si128(batch.material[px..px + 4].as_ptr().cast());
        let bg_packed = _mm_loadu_si128(batch.bg[px..px + 4].as_ptr().cast());
        let material = _mm256_cvtepu8_epi16(texels);
        let bg = _mm256_cvtepu8_epi16(bg_packed);

        let shaded = match Sh::KIND {
            ShadeKind::None => material,
            ShadeKind::Simple => {
                _mm256_srli_epi16(_mm256_mullo_epi16(material, load(&lanes.light, at)), 8)
            }
            ShadeKind::Advanced => {
                let inv_desaturate = _mm256_set1_epi16(lanes.inv_desaturate);
                let desaturated = _mm256_srli_epi16(
                    _mm256_add_epi16(
                        _mm256_mullo_epi16(material, inv_desaturate),
                        load(&lanes.intensity, at),
                    ),
                    8,
                );
                let faded = _mm256_srli_epi16(
                    _mm256_add_epi16(
                        _mm256_mullo_epi16(load(&lanes.fade, at), load(&lanes.inv_light, at)),
                        _mm256_mullo_epi16(desaturated, load(&lanes.light, at)),
                    ),
                    8,
                );
                _mm256_srli_epi16(_mm256_mullo_epi16(faded, load(&lanes.tint, at)), 8)
            }
        };
        let dynlight =
            _mm256_srli_epi16(_mm256_mullo_epi16(material, load(&lanes.dynlight, at)), 8);
        let fg = _mm256_min_epi16(_mm256_add_epi16(shaded, dynlight), max);

        let result = match B::KIND {
            BlendKind::Opaque => pack(fg),
            BlendKind::Masked => {
                let transparent = _mm_cmpeq_epi32(texels, _mm_setzero_si128());
                _mm_or_si128(
                    _mm_and_si128(transparent, bg_packed),
                    _mm_andnot_si128(transparent, pack(fg)),
                )
            }
            BlendKind::AddSrcColorOneMinusSrcColor => {
                let weight = _mm256_sub_epi16(
                    _mm256_set1_epi16(256),
                    _mm256_add_epi16(fg, _mm256_srli_epi16(fg, 7)),
                );
                let sum =
                    _mm256_add_epi16(fg, _mm256_srli_epi16(_mm256_mullo_epi16(bg, weight), 8));
                pack(_mm256_min_epi16(sum, max))
            }
            BlendKind::Shaded => {
                let sum = _mm256_add_epi16(
                    _mm256_mullo_epi16(fg, load(&lanes.fg_alpha, at)),
                    _mm256_mullo_epi16(bg, load(&lanes.bg_alpha, at)),
                );
                pack(_mm256_srli_epi16(sum, 8))
            }
            BlendKind::AddClampShaded => {
                let lit =
                    _mm256_srli_epi16(_mm256_mullo_epi16(fg, load(&lanes.fg_alpha, at)), 8);
                pack(_mm256_min_epi16(_mm256_add_epi16(lit, bg), max))
            }
            BlendKind::AddClamp | BlendKind::SubClamp | BlendKind::RevSubClamp => {
                let fg = _mm256_mullo_epi16(fg, load(&lanes.fg_alpha, at));
                let bg = _mm256_mullo_epi16(bg, load(&lanes.bg_alpha, at));
                let lo = _mm256_srai_epi32(combine::<B>(widen::<0>(fg), widen::<0>(bg)), 8);
                let hi = _mm256_srai_epi32(combine::<B>(widen::<1>(fg), widen::<1>(bg)), 8);
                _mm_packus_epi16(narrow(lo), narrow(hi))
            }
        };

        _mm_storeu_si128(
            out[px..px + 4].as_mut_ptr().cast(),
            _mm_or_si128(result, opaque),
        );
    }
}
