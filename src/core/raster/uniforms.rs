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

//! Shading state shared by every thread drawing one primitive
//!
//! [`Uniforms`] borrows its texture, translation, light and palette data from the caller;
//! it is read-only for the whole draw call and is `Sync`, so all workers share one copy.

use bitflags::bitflags;

use super::modes::SamplerKind;
use super::primitives::PolyLight;
use crate::core::error::{RasterError, Result};

/// Number of light levels in a palette colormap table
pub const NUM_COLORMAPS: usize = 32;

/// Entries in the 6-bit-per-channel RGB to palette index table
pub const RGB256K_SIZE: usize = 64 * 64 * 64;

/// Length of the fuzz modulation table
pub(crate) const FUZZ_TABLE: usize = 50;

/// Fuzz modulation table (out of 32), derived from the classic +1/-1 fuzz pattern
pub const FUZZ_COLORMAP: [u32; FUZZ_TABLE] = [
    24, 16, 24, 16, 24, 24, 16, 24, 24, 16, 24, 24, 24, 16, 24, 24, 24, 16, 16, 16, 16, 24, 16,
    16, 24, 24, 24, 24, 16, 24, 16, 24, 24, 16, 16, 24, 24, 16, 16, 16, 16, 24, 24, 24, 24, 16,
    24, 24, 16, 24,
];

bitflags! {
    /// Boolean uniform switches
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UniformFlags: u32 {
        /// Use the simple shade policy instead of the advanced one
        const SIMPLE_SHADE = 1 << 0;
        /// Disable bilinear filtering for the texture sampler
        const NEAREST_FILTER = 1 << 1;
        /// Use the uniform light level everywhere instead of distance fog
        const FIXED_LIGHT = 1 << 2;
    }
}

/// Texel storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    /// 32-bit 0xAARRGGBB texels
    Bgra,
    /// 8-bit palette indices or mask values
    Indexed,
}

/// Borrowed texel data
#[derive(Debug, Clone, Copy)]
pub enum TexturePixels<'a> {
    Bgra(&'a [u32]),
    Indexed(&'a [u8]),
}

impl TexturePixels<'_> {
    pub fn format(&self) -> TextureFormat {
        match self {
            TexturePixels::Bgra(_) => TextureFormat::Bgra,
            TexturePixels::Indexed(_) => TextureFormat::Indexed,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TexturePixels::Bgra(p) => p.len(),
            TexturePixels::Indexed(p) => p.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Texture view
///
/// Texels are stored column-major: texel `(x, y)` lives at `x * height + y`.
#[derive(Debug, Clone, Copy)]
pub struct Texture<'a> {
    pub width: u32,
    pub height: u32,
    pub pixels: TexturePixels<'a>,
}

impl<'a> Texture<'a> {
    pub fn bgra(width: u32, height: u32, pixels: &'a [u32]) -> Self {
        Self {
            width,
            height,
            pixels: TexturePixels::Bgra(pixels),
        }
    }

    pub fn indexed(width: u32, height: u32, pixels: &'a [u8]) -> Self {
        Self {
            width,
            height,
            pixels: TexturePixels::Indexed(pixels),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::EmptyTexture {
                width: self.width,
                height: self.height,
            });
        }
        let expected = self.width as usize * self.height as usize;
        if self.pixels.len() < expected {
            return Err(RasterError::TextureTooSmall {
                expected,
                actual: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// 256-entry palette translation table
#[derive(Debug, Clone, Copy)]
pub enum Translation<'a> {
    /// Index to 0xAARRGGBB, for 32-bit output
    Bgra(&'a [u32]),
    /// Index to index, for 8-bit output
    Indexed(&'a [u8]),
}

impl Translation<'_> {
    fn len(&self) -> usize {
        match self {
            Translation::Bgra(t) => t.len(),
            Translation::Indexed(t) => t.len(),
        }
    }
}

/// Per-channel value triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl Rgb {
    pub const fn new(r: u32, g: u32, b: u32) -> Self {
        Self { r, g, b }
    }

    pub const fn splat(v: u32) -> Self {
        Self { r: v, g: v, b: v }
    }
}

/// Advanced shading parameters
///
/// `fade` is the color the surface fades toward as light drops (0..=255 per channel),
/// `light` is a multiplicative tint (0..=256) and `desaturate` blends toward luma
/// (0 = full color, 256 = grayscale).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadeConstants {
    pub fade: Rgb,
    pub light: Rgb,
    pub desaturate: u32,
}

impl Default for ShadeConstants {
    fn default() -> Self {
        Self {
            fade: Rgb::splat(0),
            light: Rgb::splat(256),
            desaturate: 0,
        }
    }
}

/// Lookup tables for 8-bit palette output
#[derive(Debug, Clone, Copy)]
pub struct PaletteTables<'a> {
    /// `NUM_COLORMAPS` rows of 256 entries, row 0 brightest
    pub colormaps: &'a [u8],
    /// Palette index to 0xAARRGGBB
    pub base_colors: &'a [u32],
    /// `((r >> 2) << 12) | ((g >> 2) << 6) | (b >> 2)` to nearest palette index
    pub rgb256k: &'a [u8],
}

impl PaletteTables<'_> {
    pub(crate) fn validate(&self) -> Result<()> {
        check_table("colormaps", self.colormaps.len(), NUM_COLORMAPS * 256)?;
        check_table("base colors", self.base_colors.len(), 256)?;
        check_table("rgb256k", self.rgb256k.len(), RGB256K_SIZE)
    }
}

fn check_table(table: &'static str, actual: usize, expected: usize) -> Result<()> {
    if actual < expected {
        return Err(RasterError::TableTooSmall {
            table,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Shading state for one draw call
///
/// # Examples
///
/// ```
/// use polyraster::core::raster::{UniformFlags, Uniforms};
///
/// let uniforms = Uniforms {
///     flags: UniformFlags::SIMPLE_SHADE | UniformFlags::FIXED_LIGHT,
///     light: 128,
///     ..Uniforms::default()
/// };
/// assert!(uniforms.simple_shade());
/// assert!(!uniforms.nearest_filter());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Uniforms<'a> {
    pub flags: UniformFlags,
    /// Light level, 0..=255
    pub light: u32,
    /// Distance fog density
    pub glob_vis: f32,
    /// Fill color; cap color for skycap; palette index for 8-bit output
    pub color: u32,
    /// Source blend weight, 0..=256
    pub src_alpha: u32,
    /// Destination blend weight, 0..=256
    pub dest_alpha: u32,
    pub shade_constants: ShadeConstants,
    pub texture: Option<Texture<'a>>,
    pub translation: Option<Translation<'a>>,
    pub lights: &'a [PolyLight],
    /// Ambient dynamic light, 0xAARRGGBB (alpha ignored)
    pub dyn_light_color: u32,
    /// Surface normal; zero requests the face normal
    pub normal: [f32; 3],
    pub palette: Option<PaletteTables<'a>>,
    /// Fuzz table phase
    pub fuzz_start: u32,
}

impl Default for Uniforms<'_> {
    fn default() -> Self {
        Self {
            flags: UniformFlags::empty(),
            light: 255,
            glob_vis: 0.0,
            color: 0xFF00_0000,
            src_alpha: 256,
            dest_alpha: 256,
            shade_constants: ShadeConstants::default(),
            texture: None,
            translation: None,
            lights: &[],
            dyn_light_color: 0,
            normal: [0.0; 3],
            palette: None,
            fuzz_start: 0,
        }
    }
}

impl<'a> Uniforms<'a> {
    #[inline]
    pub fn simple_shade(&self) -> bool {
        self.flags.contains(UniformFlags::SIMPLE_SHADE)
    }

    #[inline]
    pub fn nearest_filter(&self) -> bool {
        self.flags.contains(UniformFlags::NEAREST_FILTER)
    }

    #[inline]
    pub fn fixed_light(&self) -> bool {
        self.flags.contains(UniformFlags::FIXED_LIGHT)
    }

    /// Check that every table the sampler reads is present and large enough
    ///
    /// # Arguments
    ///
    /// * `sampler` - Sampler mode the draw call uses
    /// * `output` - `Bgra` for 32-bit output, `Indexed` for 8-bit palette output
    ///
    /// # Returns
    ///
    /// `Ok(())` if the draw call can run without out-of-range table reads
    pub fn validate(&self, sampler: SamplerKind, output: TextureFormat) -> Result<()> {
        if let Some(expected) = sampler.texture_format(output) {
            let texture = self
                .texture
                .as_ref()
                .ok_or(RasterError::MissingTexture { sampler })?;
            if texture.pixels.format() != expected {
                return Err(RasterError::TextureFormat { sampler, expected });
            }
            texture.validate()?;
        }

        if sampler == SamplerKind::Translated {
            let translation = self.translation.ok_or(RasterError::MissingTranslation)?;
            let matches = matches!(
                (translation, output),
                (Translation::Bgra(_), TextureFormat::Bgra)
                    | (Translation::Indexed(_), TextureFormat::Indexed)
            );
            if !matches {
                return Err(RasterError::MissingTranslation);
            }
            check_table("translation", translation.len(), 256)?;
        }

        if output == TextureFormat::Indexed {
            self.palette.ok_or(RasterError::MissingPalette)?.validate()?;
        }

        Ok(())
    }
}
