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

//! Texel sampling
//!
//! Texture coordinates arrive as 8.24 fixed point, where `0x0100_0000` is one texture
//! repeat. Integer texel indices are derived by dropping the repeat count and scaling
//! the remaining 16-bit fraction by the texture size, so coordinates outside the
//! texture wrap instead of reading out of range.

use super::modes::{FilterKind, FilterPolicy, SamplerKind, SamplerPolicy};
use super::primitives::BgraColor;
use super::uniforms::{
    PaletteTables, TexturePixels, Translation, Uniforms, FUZZ_COLORMAP, FUZZ_TABLE,
};

/// Sampled foreground for the truecolor path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Texel {
    /// Material color, 0xAARRGGBB
    pub color: u32,
    /// Shade value (0..=256) for the shaded blend modes
    pub shade: u32,
}

/// Sampled foreground for the palette path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct IndexTexel {
    /// Palette index to be shaded
    pub index: u8,
    /// Raw sampled index; zero is transparent for the masking blends
    pub texel: u8,
    pub shade: u32,
}

/// Nearest texel index along one axis
#[inline(always)]
fn wrap(coord: i32, size: u32) -> u32 {
    ((((coord as u32) << 8) >> 16) * size) >> 16
}

/// Truncate a texture coordinate already scaled to 8.24 fixed point
///
/// Whole repeats outside the `i32` range wrap rather than saturate, so far tiled
/// coordinates sample the same texels as their in-range equivalents.
#[inline(always)]
pub(crate) fn to_fixed(scaled: f32) -> i32 {
    scaled as i64 as i32
}

/// Advance the fuzz table position
#[inline(always)]
pub(crate) fn next_fuzz(fuzzpos: &mut usize) -> u32 {
    let value = FUZZ_COLORMAP[*fuzzpos];
    *fuzzpos += 1;
    if *fuzzpos >= FUZZ_TABLE {
        *fuzzpos = 0;
    }
    value
}

/// Advance the fuzz table position past `count` pixels that are not sampled
#[inline]
pub(crate) fn skip_fuzz(fuzzpos: &mut usize, count: usize) {
    *fuzzpos = (*fuzzpos + count) % FUZZ_TABLE;
}

/// Fuzz table position for a block or rect origin
#[inline]
pub(crate) fn fuzz_origin(fuzz_start: u32, x: usize, y: usize) -> usize {
    (fuzz_start as usize + x * 123 + y) % FUZZ_TABLE
}

/// Read-only view of everything the samplers touch, resolved once per draw call
#[derive(Debug, Clone, Copy)]
pub struct TexelSource<'a> {
    width: u32,
    height: u32,
    bgra: &'a [u32],
    indexed: &'a [u8],
    translation: &'a [u32],
    translation_index: &'a [u8],
    color: u32,
    one_u: u32,
    one_v: u32,
}

impl<'a> TexelSource<'a> {
    pub(crate) fn new(uniforms: &Uniforms<'a>) -> Self {
        let (width, height, bgra, indexed): (u32, u32, &'a [u32], &'a [u8]) =
            match uniforms.texture {
                Some(texture) => match texture.pixels {
                    TexturePixels::Bgra(pixels) => (texture.width, texture.height, pixels, &[]),
                    TexturePixels::Indexed(pixels) => {
                        (texture.width, texture.height, &[], pixels)
                    }
                },
                None => (0, 0, &[], &[]),
            };
        let (translation, translation_index): (&'a [u32], &'a [u8]) = match uniforms.translation
        {
            Some(Translation::Bgra(table)) => (table, &[]),
            Some(Translation::Indexed(table)) => (&[], table),
            None => (&[], &[]),
        };

        // One texel in 8.24, rounded up and made odd so the two bilinear taps straddle
        // the sample point
        let one = |size: u32| {
            if size == 0 {
                0
            } else {
                ((0x80_0000 + size - 1) / size) * 2 + 1
            }
        };

        Self {
            width,
            height,
            bgra,
            indexed,
            translation,
            translation_index,
            color: uniforms.color,
            one_u: one(width),
            one_v: one(height),
        }
    }

    #[inline(always)]
    fn nearest(&self, u: i32, v: i32) -> usize {
        let x = wrap(u, self.width);
        let y = wrap(v, self.height);
        (x * self.height + y) as usize
    }

    /// Bilinear BGRA lookup
    ///
    /// # Returns
    ///
    /// The filtered texel and the biased `v`, which the skycap fade uses
    #[inline(always)]
    fn bilinear(&self, u: i32, v: i32) -> (u32, i32) {
        let u = u.wrapping_sub((self.one_u >> 1) as i32);
        let v = v.wrapping_sub((self.one_v >> 1) as i32);

        // The second tap sits one texel further along, in the 0.32 repeat fraction
        let frac_x0 = (((u as u32) << 8) >> 16) * self.width;
        let frac_x1 = ((((u as u32) << 8).wrapping_add(self.one_u << 8)) >> 16) * self.width;
        let frac_y0 = (((v as u32) << 8) >> 16) * self.height;
        let frac_y1 = ((((v as u32) << 8).wrapping_add(self.one_v << 8)) >> 16) * self.height;
        let x0 = frac_x0 >> 16;
        let x1 = frac_x1 >> 16;
        let y0 = frac_y0 >> 16;
        let y1 = frac_y1 >> 16;

        let p00 = BgraColor::unpack(self.bgra[(x0 * self.height + y0) as usize]);
        let p01 = BgraColor::unpack(self.bgra[(x0 * self.height + y1) as usize]);
        let p10 = BgraColor::unpack(self.bgra[(x1 * self.height + y0) as usize]);
        let p11 = BgraColor::unpack(self.bgra[(x1 * self.height + y1) as usize]);

        let inv_a = (frac_x1 >> 12) & 15;
        let inv_b = (frac_y1 >> 12) & 15;
        let a = 16 - inv_a;
        let b = 16 - inv_b;

        // pXY is the tap at (xX, yY)
        let mix = |c00: u32, c01: u32, c10: u32, c11: u32| {
            (c00 * (a * b) + c10 * (inv_a * b) + c01 * (a * inv_b) + c11 * (inv_a * inv_b) + 127)
                >> 8
        };
        let texel = BgraColor {
            b: mix(p00.b, p01.b, p10.b, p11.b),
            g: mix(p00.g, p01.g, p10.g, p11.g),
            r: mix(p00.r, p01.r, p10.r, p11.r),
            a: mix(p00.a, p01.a, p10.a, p11.a),
        };
        (texel.pack(), v)
    }

    /// Sample the foreground color and shade value for one truecolor pixel
    ///
    /// # Arguments
    ///
    /// * `u`, `v` - 8.24 texture coordinates
    /// * `bg` - Destination pixel (only read by the fog boundary sampler)
    /// * `fuzzpos` - Fuzz table position, advanced by the fuzz sampler
    #[inline(always)]
    pub(crate) fn fetch<S: SamplerPolicy, F: FilterPolicy>(
        &self,
        u: i32,
        v: i32,
        bg: u32,
        fuzzpos: &mut usize,
    ) -> Texel {
        match S::KIND {
            SamplerKind::Fill => Texel {
                color: self.color,
                shade: 0,
            },
            SamplerKind::FogBoundary => Texel { color: bg, shade: 0 },
            SamplerKind::Shaded => {
                let s = u32::from(self.indexed[self.nearest(u, v)]);
                Texel {
                    color: self.color,
                    shade: s + (s >> 7),
                }
            }
            SamplerKind::Stencil => {
                let s = self.bgra[self.nearest(u, v)] >> 24;
                Texel {
                    color: self.color,
                    shade: s + (s >> 7),
                }
            }
            SamplerKind::Fuzz => {
                let s = self.bgra[self.nearest(u, v)] >> 24;
                let s = s + (s >> 7);
                Texel {
                    color: self.color,
                    shade: (s * next_fuzz(fuzzpos)) >> 5,
                }
            }
            SamplerKind::Translated => {
                let index = self.indexed[self.nearest(u, v)];
                Texel {
                    color: self.translation[usize::from(index)],
                    shade: 0,
                }
            }
            SamplerKind::Texture | SamplerKind::Skycap => {
                let (texel, v) = match F::KIND {
                    FilterKind::Nearest => (self.bgra[self.nearest(u, v)], v),
                    FilterKind::Linear => self.bilinear(u, v),
                };
                let color = if S::KIND == SamplerKind::Skycap {
                    skycap_fade(BgraColor::unpack(texel), BgraColor::unpack(self.color), v)
                        .pack()
                } else {
                    texel
                };
                Texel { color, shade: 0 }
            }
        }
    }

    /// Sample the foreground palette index for one palette pixel
    ///
    /// Indexed data is never filtered.
    #[inline(always)]
    pub(crate) fn fetch_index<S: SamplerPolicy>(
        &self,
        u: i32,
        v: i32,
        palette: &PaletteTables<'_>,
        fuzzpos: &mut usize,
    ) -> IndexTexel {
        let fill = self.color as u8;
        match S::KIND {
            SamplerKind::Fill => IndexTexel {
                index: fill,
                texel: fill,
                shade: 0,
            },
            // The destination is re-shaded by the palette writer
            SamplerKind::FogBoundary => IndexTexel::default(),
            SamplerKind::Shaded => {
                let s = self.indexed[self.nearest(u, v)];
                IndexTexel {
                    index: fill,
                    texel: s,
                    shade: u32::from(s) + (u32::from(s) >> 7),
                }
            }
            SamplerKind::Stencil => {
                let s = self.indexed[self.nearest(u, v)];
                IndexTexel {
                    index: fill,
                    texel: s,
                    shade: if s != 0 { 256 } else { 0 },
                }
            }
            SamplerKind::Fuzz => {
                let s = self.indexed[self.nearest(u, v)];
                let coverage = if s != 0 { 256 } else { 0 };
                IndexTexel {
                    index: fill,
                    texel: s,
                    shade: (coverage * next_fuzz(fuzzpos)) >> 5,
                }
            }
            SamplerKind::Translated => {
                let texel = self.indexed[self.nearest(u, v)];
                IndexTexel {
                    index: self.translation_index[usize::from(texel)],
                    texel,
                    shade: 0,
                }
            }
            SamplerKind::Texture => {
                let texel = self.indexed[self.nearest(u, v)];
                IndexTexel {
                    index: texel,
                    texel,
                    shade: 0,
                }
            }
            SamplerKind::Skycap => {
                let texel = self.indexed[self.nearest(u, v)];
                let a = skycap_alpha(v);
                let index = if a == 256 {
                    texel
                } else {
                    let rgb = BgraColor::unpack(palette.base_colors[usize::from(texel)]);
                    let cap = BgraColor::unpack(palette.base_colors[usize::from(fill)]);
                    rgb256k_index(palette, skycap_blend(rgb, cap, a))
                };
                IndexTexel {
                    index,
                    texel,
                    shade: 0,
                }
            }
        }
    }
}

/// Fade weight toward the cap color: 256 in the middle, 0 at the top and bottom edge
#[inline(always)]
fn skycap_alpha(v: i32) -> u32 {
    const START_FADE: u32 = 2;
    let top = (v >> (16 - START_FADE)).clamp(0, 256);
    let bottom = ((2i32 << 24).wrapping_sub(v) >> (16 - START_FADE)).clamp(0, 256);
    top.min(bottom) as u32
}

#[inline(always)]
fn skycap_blend(texel: BgraColor, cap: BgraColor, a: u32) -> BgraColor {
    let inv_a = 256 - a;
    BgraColor {
        b: (texel.b * a + cap.b * inv_a + 127) >> 8,
        g: (texel.g * a + cap.g * inv_a + 127) >> 8,
        r: (texel.r * a + cap.r * inv_a + 127) >> 8,
        a: texel.a,
    }
}

/// Fade a texel toward the cap color near the top and bottom of the texture
#[inline(always)]
pub(crate) fn skycap_fade(texel: BgraColor, cap: BgraColor, v: i32) -> BgraColor {
    skycap_blend(texel, cap, skycap_alpha(v))
}

/// Nearest palette index for an RGB color
#[inline(always)]
pub(crate) fn rgb256k_index(palette: &PaletteTables<'_>, c: BgraColor) -> u8 {
    palette.rgb256k[(((c.r >> 2) << 12) | ((c.g >> 2) << 6) | (c.b >> 2)) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::raster::modes::{
        FillSampler, FuzzSampler, LinearFilter, NearestFilter, ShadedSampler, SkycapSampler,
        TextureSampler, TranslatedSampler,
    };
    use crate::core::raster::{Texture, Translation};

    const ONE: i32 = 0x0100_0000;

    fn source<'a>(uniforms: &Uniforms<'a>) -> TexelSource<'a> {
        TexelSource::new(uniforms)
    }

    #[test]
    fn test_far_coordinates_wrap() {
        let one = ONE as f32;
        assert_eq!(wrap(to_fixed(200.25 * one), 4), wrap(to_fixed(0.25 * one), 4));
        assert_eq!(wrap(to_fixed(-0.75 * one), 4), 1);
        assert_eq!(wrap(to_fixed(-300.75 * one), 4), 1);
        assert_eq!(wrap(to_fixed(1000.5 * one), 2), 1);
    }

    #[test]
    fn test_nearest_wraps() {
        // 2x2, column-major: (0,0)=1 (0,1)=2 (1,0)=3 (1,1)=4
        let texels = [1, 2, 3, 4];
        let uniforms = Uniforms {
            texture: Some(Texture::bgra(2, 2, &texels)),
            ..Uniforms::default()
        };
        let src = source(&uniforms);
        let mut fuzz = 0;
        let at = |u: i32, v: i32, fuzz: &mut usize| {
            src.fetch::<TextureSampler, NearestFilter>(u, v, 0, fuzz).color
        };
        assert_eq!(at(0, 0, &mut fuzz), 1);
        assert_eq!(at(ONE / 2, 0, &mut fuzz), 3);
        assert_eq!(at(0, ONE / 2, &mut fuzz), 2);
        assert_eq!(at(ONE + ONE / 2, ONE * 3 + ONE / 2, &mut fuzz), 4);
        assert_eq!(at(-ONE / 4, 0, &mut fuzz), 3);
    }

    #[test]
    fn test_bilinear_uniform_texture() {
        let texels = [0xFF40_8020u32; 16];
        let uniforms = Uniforms {
            texture: Some(Texture::bgra(4, 4, &texels)),
            ..Uniforms::default()
        };
        let src = source(&uniforms);
        let mut fuzz = 0;
        for u in [0, ONE / 3, ONE / 2, ONE - 1] {
            let t = src.fetch::<TextureSampler, LinearFilter>(u, u, 0, &mut fuzz);
            assert_eq!(t.color, 0xFF40_8020);
        }
    }

    #[test]
    fn test_bilinear_midpoint() {
        // Two columns: black and white; the centre between texel centres is grey
        let texels = [0xFF00_0000, 0xFFFF_FFFF];
        let uniforms = Uniforms {
            texture: Some(Texture::bgra(2, 1, &texels)),
            ..Uniforms::default()
        };
        let src = source(&uniforms);
        let mut fuzz = 0;
        let c = src.fetch::<TextureSampler, LinearFilter>(ONE / 2, 0, 0, &mut fuzz);
        let r = (c.color >> 16) & 0xFF;
        assert!((120..=136).contains(&r), "r = {r}");
    }

    #[test]
    fn test_fill_and_shaded() {
        let mask = [255u8, 0, 128, 1];
        let uniforms = Uniforms {
            color: 0xFF12_3456,
            texture: Some(Texture::indexed(2, 2, &mask)),
            ..Uniforms::default()
        };
        let src = source(&uniforms);
        let mut fuzz = 0;
        let fill = src.fetch::<FillSampler, NearestFilter>(ONE / 2, 0, 0, &mut fuzz);
        assert_eq!(fill.color, 0xFF12_3456);
        let shaded = src.fetch::<ShadedSampler, NearestFilter>(0, 0, 0, &mut fuzz);
        assert_eq!(shaded.color, 0xFF12_3456);
        assert_eq!(shaded.shade, 256);
        let shaded = src.fetch::<ShadedSampler, NearestFilter>(ONE / 2, 0, 0, &mut fuzz);
        assert_eq!(shaded.shade, 129);
    }

    #[test]
    fn test_translated() {
        let texels = [3u8];
        let mut table = [0u32; 256];
        table[3] = 0xFFAB_CDEF;
        let uniforms = Uniforms {
            texture: Some(Texture::indexed(1, 1, &texels)),
            translation: Some(Translation::Bgra(&table)),
            ..Uniforms::default()
        };
        let src = source(&uniforms);
        let mut fuzz = 0;
        let t = src.fetch::<TranslatedSampler, LinearFilter>(ONE / 2, ONE / 2, 0, &mut fuzz);
        assert_eq!(t.color, 0xFFAB_CDEF);
    }

    #[test]
    fn test_skycap_fades_at_edges() {
        let texels = [0xFFFF_FFFFu32; 4];
        let uniforms = Uniforms {
            color: 0xFF00_0000,
            texture: Some(Texture::bgra(2, 2, &texels)),
            ..Uniforms::default()
        };
        let src = source(&uniforms);
        let mut fuzz = 0;
        let top = src.fetch::<SkycapSampler, NearestFilter>(0, 0, 0, &mut fuzz);
        assert_eq!(top.color, 0xFF00_0000);
        let middle = src.fetch::<SkycapSampler, NearestFilter>(0, ONE / 2, 0, &mut fuzz);
        assert_eq!(middle.color, 0xFFFF_FFFF);
    }

    #[test]
    fn test_fuzz_advances_and_wraps() {
        let texels = [0xFF00_0000u32];
        let uniforms = Uniforms {
            texture: Some(Texture::bgra(1, 1, &texels)),
            ..Uniforms::default()
        };
        let src = source(&uniforms);
        let mut fuzz = FUZZ_TABLE - 1;
        let t = src.fetch::<FuzzSampler, NearestFilter>(0, 0, 0, &mut fuzz);
        assert_eq!(t.shade, (256 * FUZZ_COLORMAP[FUZZ_TABLE - 1]) >> 5);
        assert_eq!(fuzz, 0);
    }

    #[test]
    fn test_fuzz_origin() {
        assert_eq!(fuzz_origin(0, 0, 0), 0);
        assert_eq!(fuzz_origin(1, 1, 2), (1 + 123 + 2) % FUZZ_TABLE);
    }

    #[test]
    fn test_skip_fuzz_matches_sampling() {
        let mut skipped = 45;
        skip_fuzz(&mut skipped, 8);
        let mut sampled = 45;
        for _ in 0..8 {
            next_fuzz(&mut sampled);
        }
        assert_eq!(skipped, sampled);
        assert_eq!(skipped, 3);
    }
}
