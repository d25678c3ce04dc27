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

//! Step-variable solver
//!
//! Computes the screen-space gradients of 1/w and of every interpolated attribute for a
//! triangle. All attributes are carried pre-multiplied by `w` so they interpolate
//! linearly in screen space; the drawers recover the perspective-correct value by
//! multiplying with the reciprocal of the interpolated `w`.
//!
//! # Gradient formula
//!
//! For an attribute with values `c0, c1, c2` at `(x0, y0), (x1, y1), (x2, y2)`:
//!
//! ```text
//! dc/dx = ((c1-c2)(y0-y2) - (c0-c2)(y1-y2)) / ((x1-x2)(y0-y2) - (x0-x2)(y1-y2))
//! dc/dy = ((c1-c2)(x0-x2) - (c0-c2)(x1-x2)) / ((x0-x2)(y1-y2) - (x1-x2)(y0-y2))
//! ```

use std::ops::{Add, AddAssign, Mul};

use super::modes::{BlendKind, SamplerKind};
use super::primitives::{ClipRect, Vertex};
use super::setup::StencilView;
use super::uniforms::Uniforms;
use crate::core::error::{RasterError, Result};

/// Interpolated attribute set: start values or per-pixel gradients
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenTriangleStepVariables {
    pub w: f32,
    pub u: f32,
    pub v: f32,
    pub world_x: f32,
    pub world_y: f32,
    pub world_z: f32,
}

impl Add for ScreenTriangleStepVariables {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self {
            w: self.w + rhs.w,
            u: self.u + rhs.u,
            v: self.v + rhs.v,
            world_x: self.world_x + rhs.world_x,
            world_y: self.world_y + rhs.world_y,
            world_z: self.world_z + rhs.world_z,
        }
    }
}

impl AddAssign for ScreenTriangleStepVariables {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f32> for ScreenTriangleStepVariables {
    type Output = Self;

    #[inline(always)]
    fn mul(self, s: f32) -> Self {
        Self {
            w: self.w * s,
            u: self.u * s,
            v: self.v * s,
            world_x: self.world_x * s,
            world_y: self.world_y * s,
            world_z: self.world_z * s,
        }
    }
}

/// Gradient of an attribute along screen x
///
/// Undefined (non-finite) for zero-area triangles.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn find_gradient_x(
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    c0: f32,
    c1: f32,
    c2: f32,
) -> f32 {
    let top = (c1 - c2) * (y0 - y2) - (c0 - c2) * (y1 - y2);
    let bottom = (x1 - x2) * (y0 - y2) - (x0 - x2) * (y1 - y2);
    top / bottom
}

/// Gradient of an attribute along screen y
///
/// Undefined (non-finite) for zero-area triangles.
#[allow(clippy::too_many_arguments)]
#[inline]
pub fn find_gradient_y(
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    c0: f32,
    c1: f32,
    c2: f32,
) -> f32 {
    let top = (c1 - c2) * (x0 - x2) - (c0 - c2) * (x1 - x2);
    let bottom = (x0 - x2) * (y1 - y2) - (x1 - x2) * (y0 - y2);
    top / bottom
}

impl ScreenTriangleStepVariables {
    /// Screen-space x and y gradients for a triangle
    ///
    /// # Returns
    ///
    /// `(gradient_x, gradient_y)`, each attribute pre-multiplied by `w`
    pub fn gradients(v1: &Vertex, v2: &Vertex, v3: &Vertex) -> (Self, Self) {
        let gx = |c1: f32, c2: f32, c3: f32| {
            find_gradient_x(v1.x, v1.y, v2.x, v2.y, v3.x, v3.y, c1, c2, c3)
        };
        let gy = |c1: f32, c2: f32, c3: f32| {
            find_gradient_y(v1.x, v1.y, v2.x, v2.y, v3.x, v3.y, c1, c2, c3)
        };

        let w = [v1.w, v2.w, v3.w];
        let pre = |a: [f32; 3]| [a[0] * w[0], a[1] * w[1], a[2] * w[2]];
        let u = pre([v1.u, v2.u, v3.u]);
        let v = pre([v1.v, v2.v, v3.v]);
        let wx = pre([v1.world_x, v2.world_x, v3.world_x]);
        let wy = pre([v1.world_y, v2.world_y, v3.world_y]);
        let wz = pre([v1.world_z, v2.world_z, v3.world_z]);

        let gradient_x = Self {
            w: gx(w[0], w[1], w[2]),
            u: gx(u[0], u[1], u[2]),
            v: gx(v[0], v[1], v[2]),
            world_x: gx(wx[0], wx[1], wx[2]),
            world_y: gx(wy[0], wy[1], wy[2]),
            world_z: gx(wz[0], wz[1], wz[2]),
        };
        let gradient_y = Self {
            w: gy(w[0], w[1], w[2]),
            u: gy(u[0], u[1], u[2]),
            v: gy(v[0], v[1], v[2]),
            world_x: gy(wx[0], wx[1], wx[2]),
            world_y: gy(wy[0], wy[1], wy[2]),
            world_z: gy(wz[0], wz[1], wz[2]),
        };
        (gradient_x, gradient_y)
    }

    /// Attribute values (pre-multiplied by `w`) at screen position `(x, y)`
    #[inline]
    pub fn at(v1: &Vertex, gradient_x: &Self, gradient_y: &Self, x: f32, y: f32) -> Self {
        let dx = x - v1.x;
        let dy = y - v1.y;
        Self {
            w: v1.w + gradient_x.w * dx + gradient_y.w * dy,
            u: v1.u * v1.w + gradient_x.u * dx + gradient_y.u * dy,
            v: v1.v * v1.w + gradient_x.v * dx + gradient_y.v * dy,
            world_x: v1.world_x * v1.w + gradient_x.world_x * dx + gradient_y.world_x * dy,
            world_y: v1.world_y * v1.w + gradient_x.world_y * dx + gradient_y.world_y * dy,
            world_z: v1.world_z * v1.w + gradient_x.world_z * dx + gradient_y.world_z * dy,
        }
    }
}

/// Twice the signed screen-space area of a triangle
pub(crate) fn signed_area(v1: &Vertex, v2: &Vertex, v3: &Vertex) -> f32 {
    (v2.x - v1.x) * (v3.y - v1.y) - (v3.x - v1.x) * (v2.y - v1.y)
}

/// Immutable per-triangle draw request
///
/// Holds the vertices, shading state, selected policies and the precomputed gradients.
/// The destination is passed to each worker separately, so one request can be shared
/// by every thread drawing the triangle.
#[derive(Debug, Clone, Copy)]
pub struct TriDrawTriangleArgs<'a> {
    pub v1: Vertex,
    pub v2: Vertex,
    pub v3: Vertex,
    pub clip: ClipRect,
    pub stencil: Option<StencilView<'a>>,
    pub uniforms: &'a Uniforms<'a>,
    pub sampler: SamplerKind,
    pub blend: BlendKind,
    pub gradient_x: ScreenTriangleStepVariables,
    pub gradient_y: ScreenTriangleStepVariables,
}

impl<'a> TriDrawTriangleArgs<'a> {
    /// Build a draw request and solve its step variables
    ///
    /// # Arguments
    ///
    /// * `vertices` - Projected vertices; the first one is the gradient origin
    /// * `uniforms` - Shading state
    /// * `sampler` - Sampler mode
    /// * `blend` - Blend mode
    /// * `clip` - Clip rectangle (right/bottom exclusive)
    ///
    /// # Returns
    ///
    /// `Err(RasterError::DegenerateTriangle)` if the triangle has zero area
    ///
    /// # Examples
    ///
    /// ```
    /// use polyraster::core::raster::{
    ///     BlendKind, ClipRect, SamplerKind, TriDrawTriangleArgs, Uniforms, Vertex,
    /// };
    ///
    /// let uniforms = Uniforms::default();
    /// let v = |x: f32, y: f32, u: f32| Vertex { x, y, w: 1.0, u, ..Vertex::default() };
    /// let args = TriDrawTriangleArgs::new(
    ///     [v(0.0, 0.0, 0.0), v(16.0, 0.0, 1.0), v(0.0, 16.0, 0.0)],
    ///     &uniforms,
    ///     SamplerKind::Fill,
    ///     BlendKind::Opaque,
    ///     ClipRect::full(16, 16),
    /// )
    /// .unwrap();
    /// assert!((args.gradient_x.u - 1.0 / 16.0).abs() < 1e-6);
    /// assert_eq!(args.gradient_y.u, 0.0);
    /// ```
    pub fn new(
        vertices: [Vertex; 3],
        uniforms: &'a Uniforms<'a>,
        sampler: SamplerKind,
        blend: BlendKind,
        clip: ClipRect,
    ) -> Result<Self> {
        let [v1, v2, v3] = vertices;
        let area = signed_area(&v1, &v2, &v3);
        if area == 0.0 || !area.is_finite() {
            return Err(RasterError::DegenerateTriangle);
        }

        let (gradient_x, gradient_y) = ScreenTriangleStepVariables::gradients(&v1, &v2, &v3);

        Ok(Self {
            v1,
            v2,
            v3,
            clip,
            stencil: None,
            uniforms,
            sampler,
            blend,
            gradient_x,
            gradient_y,
        })
    }

    /// Attach a stencil test used by the coverage classifier
    pub fn with_stencil(mut self, stencil: StencilView<'a>) -> Self {
        self.stencil = Some(stencil);
        self
    }

    /// Step-variable start values at a screen position
    #[inline]
    pub fn start_at(&self, x: f32, y: f32) -> ScreenTriangleStepVariables {
        ScreenTriangleStepVariables::at(&self.v1, &self.gradient_x, &self.gradient_y, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(x: f32, y: f32, w: f32, u: f32, v: f32) -> Vertex {
        Vertex {
            x,
            y,
            w,
            u,
            v,
            ..Vertex::default()
        }
    }

    #[test]
    fn test_gradient_of_linear_field() {
        // c = 2x + 3y + 1 must be reproduced exactly by the gradient formulas
        let f = |x: f32, y: f32| 2.0 * x + 3.0 * y + 1.0;
        let (x0, y0, x1, y1, x2, y2) = (1.0, 2.0, 9.0, 4.0, 3.0, 11.0);
        let gx = find_gradient_x(x0, y0, x1, y1, x2, y2, f(x0, y0), f(x1, y1), f(x2, y2));
        let gy = find_gradient_y(x0, y0, x1, y1, x2, y2, f(x0, y0), f(x1, y1), f(x2, y2));
        assert!((gx - 2.0).abs() < 1e-5);
        assert!((gy - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_start_values_hit_vertices() {
        let uniforms = Uniforms::default();
        let args = TriDrawTriangleArgs::new(
            [
                vertex(0.0, 0.0, 1.0, 0.0, 0.0),
                vertex(32.0, 0.0, 0.5, 1.0, 0.0),
                vertex(0.0, 32.0, 0.25, 0.0, 1.0),
            ],
            &uniforms,
            SamplerKind::Texture,
            BlendKind::Opaque,
            ClipRect::full(32, 32),
        )
        .unwrap();

        let at_v2 = args.start_at(32.0, 0.0);
        assert!((at_v2.w - 0.5).abs() < 1e-6);
        // u*w at v2, so u = 1.0 after division
        assert!((at_v2.u / at_v2.w - 1.0).abs() < 1e-5);

        let at_v3 = args.start_at(0.0, 32.0);
        assert!((at_v3.w - 0.25).abs() < 1e-6);
        assert!((at_v3.v / at_v3.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_degenerate_rejected() {
        let uniforms = Uniforms::default();
        let result = TriDrawTriangleArgs::new(
            [
                vertex(0.0, 0.0, 1.0, 0.0, 0.0),
                vertex(8.0, 8.0, 1.0, 0.0, 0.0),
                vertex(16.0, 16.0, 1.0, 0.0, 0.0),
            ],
            &uniforms,
            SamplerKind::Fill,
            BlendKind::Opaque,
            ClipRect::full(32, 32),
        );
        assert!(matches!(result, Err(RasterError::DegenerateTriangle)));
    }

    #[test]
    fn test_step_variable_ops() {
        let a = ScreenTriangleStepVariables {
            w: 1.0,
            u: 2.0,
            ..Default::default()
        };
        let mut b = a * 8.0;
        assert_eq!(b.u, 16.0);
        b += a;
        assert_eq!(b.w, 9.0);
    }
}
