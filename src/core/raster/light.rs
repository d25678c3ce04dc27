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

//! Dynamic light accumulation and light levels
//!
//! Dynamic lights produce an additive per-channel contribution (0..=256) from the
//! world-space position and surface normal. The light level itself comes from the
//! uniform light and, unless fixed, the distance fog falloff.

use super::primitives::{BgraColor, PolyLight, Vertex, FRACUNIT};
use super::uniforms::Uniforms;

/// Accumulate the dynamic light at a world-space position
///
/// Starts from the ambient `dyn_light_color` and adds every light's color weighted by
/// its attenuation. Each channel of the result is clamped to 256, no matter how many
/// lights overlap.
///
/// # Arguments
///
/// * `lights` - Light list
/// * `world` - World-space position of the pixel
/// * `normal` - Unit surface normal (used by point lights)
/// * `ambient` - Ambient dynamic light, 0xAARRGGBB (alpha ignored)
///
/// # Examples
///
/// ```
/// use polyraster::core::raster::{calc_dynamic_light, PolyLight};
///
/// let light = PolyLight::simple([0.0, 0.0, 0.0], 100.0, 0xFF80_8080);
/// let lit = calc_dynamic_light(&[light], [0.0, 0.0, 0.0], [0.0, 0.0, 1.0], 0);
/// assert_eq!((lit.r, lit.g, lit.b), (128, 128, 128));
///
/// let out_of_range = calc_dynamic_light(&[light], [200.0, 0.0, 0.0], [0.0, 0.0, 1.0], 0);
/// assert_eq!(out_of_range.r, 0);
/// ```
pub fn calc_dynamic_light(
    lights: &[PolyLight],
    world: [f32; 3],
    normal: [f32; 3],
    ambient: u32,
) -> BgraColor {
    let mut lit = BgraColor::unpack(ambient);

    for light in lights {
        let l = [light.x - world[0], light.y - world[1], light.z - world[2]];
        let dist = dot(l, l).sqrt();
        let rcp_dist = 1.0 / dist;
        let radius = light.radius.abs();

        let distance_attenuation = 256.0 - (dist * (256.0 / radius)).min(256.0);
        let attenuation = if light.is_point() {
            let dot_nl = dot(normal, [l[0] * rcp_dist, l[1] * rcp_dist, l[2] * rcp_dist]);
            dot_nl.max(0.0) * distance_attenuation
        } else {
            distance_attenuation
        };
        // Saturating float to int cast; NaN (zero radius or distance) adds nothing
        let attenuation = (attenuation as i32).max(0) as u32;

        let color = BgraColor::unpack(light.color);
        lit.r += (color.r * attenuation) >> 8;
        lit.g += (color.g * attenuation) >> 8;
        lit.b += (color.b * attenuation) >> 8;
    }

    BgraColor {
        b: lit.b.min(256),
        g: lit.g.min(256),
        r: lit.r.min(256),
        a: 0,
    }
}

#[inline(always)]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline(always)]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Unit normal of the triangle's world-space plane
///
/// Returns the zero vector for a triangle that is degenerate in world space.
pub fn face_normal(v1: &Vertex, v2: &Vertex, v3: &Vertex) -> [f32; 3] {
    let a = sub(v2.world(), v1.world());
    let b = sub(v3.world(), v1.world());
    let n = [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ];
    let len = dot(n, n).sqrt();
    if len > 0.0 && len.is_finite() {
        [n[0] / len, n[1] / len, n[2] / len]
    } else {
        [0.0; 3]
    }
}

/// Surface normal for a draw call: the uniform normal, or the face normal when zero
pub(crate) fn resolve_normal(
    uniforms: &Uniforms<'_>,
    v1: &Vertex,
    v2: &Vertex,
    v3: &Vertex,
) -> [f32; 3] {
    if uniforms.normal == [0.0; 3] {
        face_normal(v1, v2, v3)
    } else {
        uniforms.normal
    }
}

/// Light level parameters, resolved once per draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    fixed: bool,
    /// Uniform light level, 0..=256
    light: u32,
    shade: f32,
    vis: f32,
}

impl LightParams {
    pub(crate) fn new(uniforms: &Uniforms<'_>) -> Self {
        let light = uniforms.light.min(255);
        Self {
            fixed: uniforms.fixed_light(),
            light: light + (light >> 7),
            shade: 2.0 - (light as f32 + 12.0) / 128.0,
            vis: uniforms.glob_vis / 32.0,
        }
    }

    /// Uniform light level, 0..=256
    pub(crate) fn level(&self) -> u32 {
        self.light
    }

    /// Light position (16.16, `>> 8` gives the 0..=256 level) at inverse depth `w`
    #[inline(always)]
    pub(crate) fn position(&self, w: f32) -> i32 {
        if self.fixed {
            (self.light << 8) as i32
        } else {
            let fog = (self.shade - (24.0f32 / 32.0).min(self.vis * w)).clamp(0.0, 31.0 / 32.0);
            FRACUNIT - (fog * FRACUNIT as f32) as i32
        }
    }

    /// Light position and per-pixel step across an 8-pixel row
    #[inline(always)]
    pub(crate) fn row(&self, w_start: f32, w_end: f32) -> (i32, i32) {
        let pos = self.position(w_start);
        if self.fixed {
            (pos, 0)
        } else {
            (pos, (self.position(w_end) - pos) / 8)
        }
    }
}
