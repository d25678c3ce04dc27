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

//! Unit tests for perspective-correct interpolation

use super::{draw, full_clip, supported_tiers, vertex};
use crate::core::raster::{
    Backend, BlendKind, FrameBuffer, SamplerKind, Texture, TriDrawTriangleArgs, UniformFlags,
    Uniforms,
};

const LEFT: u32 = 0xFFFF_0000;
const RIGHT: u32 = 0xFF00_00FF;
const WIDTH: usize = 64;

/// Row 0 of a 64-pixel wide triangle whose `u` runs `u0..u1` left to right, per tier
fn first_row(
    texture: Texture<'_>,
    far_w: f32,
    (u0, u1): (f32, f32),
) -> Vec<(Backend, Vec<u32>)> {
    let uniforms = Uniforms {
        flags: UniformFlags::NEAREST_FILTER
            | UniformFlags::SIMPLE_SHADE
            | UniformFlags::FIXED_LIGHT,
        texture: Some(texture),
        ..Uniforms::default()
    };

    supported_tiers()
        .into_iter()
        .map(|tier| {
            let mut frame = FrameBuffer::<u32>::new(WIDTH, 8);
            let args = TriDrawTriangleArgs::new(
                [
                    vertex(0.0, 0.0, 1.0, u0, 0.0),
                    vertex(WIDTH as f32, 0.0, far_w, u1, 0.0),
                    vertex(0.0, WIDTH as f32, 1.0, u0, 0.0),
                ],
                &uniforms,
                SamplerKind::Texture,
                BlendKind::Opaque,
                full_clip(&frame),
            )
            .unwrap();
            draw(&mut frame, &args, tier, 1).unwrap();
            (tier, frame.row(0).to_vec())
        })
        .collect()
}

fn two_texels(texels: &[u32; 2]) -> Texture<'_> {
    Texture::bgra(2, 1, texels)
}

/// Perspective-correct `u` at pixel `x` for `u` running 0..1 and `w` running 1..far_w
fn analytic_u(x: f64, far_w: f64) -> f64 {
    let t = x / WIDTH as f64;
    t * far_w / (1.0 - t + t * far_w)
}

/// `u` at pixel `x` when the divide happens every 8 pixels and is stepped linearly between
fn subdivided_u(x: usize, far_w: f64) -> f64 {
    let knot = x / 8 * 8;
    let a = analytic_u(knot as f64, far_w);
    let b = analytic_u((knot + 8) as f64, far_w);
    a + (b - a) * (x - knot) as f64 / 8.0
}

#[test]
fn test_affine_when_depth_is_constant() {
    let texels = [LEFT, RIGHT];
    for (tier, row) in first_row(two_texels(&texels), 1.0, (0.0, 1.0)) {
        assert_eq!(row[4], LEFT, "{tier}");
        assert_eq!(row[28], LEFT, "{tier}");
        assert_eq!(row[36], RIGHT, "{tier}");
        assert_eq!(row[60], RIGHT, "{tier}");
    }
}

#[test]
fn test_texture_follows_depth() {
    // With w falling to 1/4 across the row, u = 0.5 sits at 80% of the width rather
    // than at the middle
    let texels = [LEFT, RIGHT];
    for (tier, row) in first_row(two_texels(&texels), 0.25, (0.0, 1.0)) {
        assert_eq!(row[36], LEFT, "{tier}");
        assert_eq!(row[44], LEFT, "{tier}");
        assert_eq!(row[56], RIGHT, "{tier}");
    }
}

#[test]
fn test_far_texture_coordinates_wrap() {
    let texels = [LEFT, RIGHT];
    for far_w in [1.0, 0.5] {
        let near = first_row(two_texels(&texels), far_w, (0.0, 1.0));
        let far = first_row(two_texels(&texels), far_w, (200.0, 201.0));
        let behind = first_row(two_texels(&texels), far_w, (-300.0, -299.0));
        for (((tier, near), (_, far)), (_, behind)) in near.iter().zip(&far).zip(&behind) {
            assert!(near.contains(&LEFT) && near.contains(&RIGHT), "{tier}");
            assert_eq!(far, near, "u in 200..201 on {tier} at far_w {far_w}");
            assert_eq!(behind, near, "u in -300..-299 on {tier} at far_w {far_w}");
        }
    }
}

#[test]
fn test_sampled_column_tracks_analytic_u() {
    // Each texel stores its own column in the blue channel
    let texels: Vec<u32> = (0..256u32).map(|c| 0xFF00_0000 | c).collect();

    for far_w in [1.0f32, 0.5, 0.25] {
        let far = f64::from(far_w);
        let column = |u: f64| (u * 256.0).floor() as i32;
        // Worst deviation the 8-pixel subdivision itself introduces, in texels
        let allowed = (0..WIDTH - 1)
            .map(|x| (subdivided_u(x, far) - analytic_u(x as f64, far)).abs() * 256.0)
            .fold(0.0f64, f64::max)
            .ceil() as i32
            + 1;

        for (tier, row) in first_row(Texture::bgra(256, 1, &texels), far_w, (0.0, 1.0)) {
            let mut worst = 0;
            for x in 0..WIDTH - 1 {
                let sampled = (row[x] & 0xFF) as i32;
                let exact = column(analytic_u(x as f64, far));
                let stepped = column(subdivided_u(x, far));
                assert!(
                    (sampled - stepped).abs() <= 1,
                    "x = {x} on {tier} at far_w {far_w}: {sampled} vs stepped {stepped}"
                );
                if x % 8 == 0 {
                    assert!(
                        (sampled - exact).abs() <= 1,
                        "x = {x} on {tier} at far_w {far_w}: {sampled} vs exact {exact}"
                    );
                }
                worst = worst.max((sampled - exact).abs());
            }
            assert!(worst <= allowed, "{tier} at far_w {far_w}: {worst} > {allowed}");
            if far_w == 1.0 {
                assert!(worst <= 1, "{tier}: affine row off by {worst}");
            }
        }
    }
}
