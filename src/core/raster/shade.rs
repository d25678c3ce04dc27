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

//! Light application
//!
//! Shading scales the sampled material color by the per-pixel light level (0..=256)
//! and then adds the dynamic light contribution. All products stay below 2^16, which
//! is what lets the SIMD tiers run this stage in 16-bit lanes without loss.

use super::modes::{ShadeKind, ShadePolicy};
use super::primitives::BgraColor;
use super::uniforms::{Rgb, ShadeConstants};

/// Advanced shading constants, resolved once per draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadeParams {
    pub fade: Rgb,
    pub light: Rgb,
    pub desaturate: u32,
    pub inv_desaturate: u32,
}

impl ShadeParams {
    pub(crate) fn new(constants: &ShadeConstants) -> Self {
        let clamp = |c: Rgb, max: u32| Rgb::new(c.r.min(max), c.g.min(max), c.b.min(max));
        let desaturate = constants.desaturate.min(256);
        Self {
            fade: clamp(constants.fade, 255),
            light: clamp(constants.light, 256),
            desaturate,
            inv_desaturate: 256 - desaturate,
        }
    }
}

impl Default for ShadeParams {
    fn default() -> Self {
        Self::new(&ShadeConstants::default())
    }
}

/// Luma-weighted intensity scaled by the desaturation factor
#[inline(always)]
pub(crate) fn intensity(c: BgraColor, desaturate: u32) -> u32 {
    ((c.r * 77 + c.g * 143 + c.b * 37) >> 8) * desaturate
}

/// Add the dynamic light contribution, saturating at 255
#[inline(always)]
pub(crate) fn add_lights(material: BgraColor, fg: BgraColor, dynlight: BgraColor) -> BgraColor {
    BgraColor {
        b: (fg.b + ((material.b * dynlight.b) >> 8)).min(255),
        g: (fg.g + ((material.g * dynlight.g) >> 8)).min(255),
        r: (fg.r + ((material.r * dynlight.r) >> 8)).min(255),
        a: fg.a,
    }
}

/// Shade one material color
///
/// # Arguments
///
/// * `material` - Unshaded sampled color
/// * `light` - Light level, 0..=256
/// * `dynlight` - Dynamic light per channel, 0..=256
/// * `params` - Advanced shading constants
#[inline(always)]
pub(crate) fn shade<Sh: ShadePolicy>(
    material: BgraColor,
    light: u32,
    dynlight: BgraColor,
    params: &ShadeParams,
) -> BgraColor {
    let fg = match Sh::KIND {
        ShadeKind::None => material,
        ShadeKind::Simple => BgraColor {
            b: (material.b * light) >> 8,
            g: (material.g * light) >> 8,
            r: (material.r * light) >> 8,
            a: material.a,
        },
        ShadeKind::Advanced => {
            let intensity = intensity(material, params.desaturate);
            let inv_light = 256 - light;
            let channel = |c: u32, fade: u32, tint: u32| {
                let desaturated = (c * params.inv_desaturate + intensity) >> 8;
                (((fade * inv_light + desaturated * light) >> 8) * tint) >> 8
            };
            BgraColor {
                b: channel(material.b, params.fade.b, params.light.b),
                g: channel(material.g, params.fade.g, params.light.g),
                r: channel(material.r, params.fade.r, params.light.r),
                a: material.a,
            }
        }
    };
    add_lights(material, fg, dynlight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::raster::modes::{AdvancedShade, NoShade, SimpleShade};

    const NO_LIGHT: BgraColor = BgraColor::rgb(0, 0, 0);

    #[test]
    fn test_simple_full_light_is_identity() {
        let c = BgraColor::unpack(0xFF00_FF00);
        let out = shade::<SimpleShade>(c, 256, NO_LIGHT, &ShadeParams::default());
        assert_eq!(out.pack_opaque(), 0xFF00_FF00);
    }

    #[test]
    fn test_simple_half_light() {
        let c = BgraColor::unpack(0xFF80_4020);
        let out = shade::<SimpleShade>(c, 128, NO_LIGHT, &ShadeParams::default());
        assert_eq!((out.r, out.g, out.b), (0x40, 0x20, 0x10));
    }

    #[test]
    fn test_advanced_fades_to_fade_color() {
        let params = ShadeParams::new(&ShadeConstants {
            fade: Rgb::new(200, 100, 50),
            light: Rgb::splat(256),
            desaturate: 0,
        });
        let c = BgraColor::unpack(0xFFFF_FFFF);
        let dark = shade::<AdvancedShade>(c, 0, NO_LIGHT, &params);
        assert_eq!((dark.r, dark.g, dark.b), (200, 100, 50));
        let lit = shade::<AdvancedShade>(c, 256, NO_LIGHT, &params);
        assert_eq!((lit.r, lit.g, lit.b), (255, 255, 255));
    }

    #[test]
    fn test_advanced_full_desaturation_is_gray() {
        let params = ShadeParams::new(&ShadeConstants {
            desaturate: 256,
            ..ShadeConstants::default()
        });
        let c = BgraColor::rgb(255, 0, 0);
        let out = shade::<AdvancedShade>(c, 256, NO_LIGHT, &params);
        assert_eq!(out.r, out.g);
        assert_eq!(out.g, out.b);
        assert_eq!(out.r, (255 * 77) >> 8);
    }

    #[test]
    fn test_dynamic_light_saturates() {
        let c = BgraColor::rgb(200, 200, 200);
        let out = shade::<NoShade>(c, 0, BgraColor::rgb(256, 256, 256), &ShadeParams::default());
        assert_eq!((out.r, out.g, out.b), (255, 255, 255));
        let out = shade::<SimpleShade>(c, 0, BgraColor::rgb(128, 0, 0), &ShadeParams::default());
        assert_eq!((out.r, out.g, out.b), (100, 0, 0));
    }
}
