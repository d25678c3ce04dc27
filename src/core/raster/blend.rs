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

//! Framebuffer blending
//!
//! Combines the shaded foreground with the destination pixel. Every truecolor mode
//! writes alpha 0xFF because the destination carries no alpha channel.

use super::modes::{BlendKind, BlendPolicy};
use super::primitives::BgraColor;

/// Blend weights, resolved once per draw call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendParams {
    /// Source weight, 0..=256
    pub src_alpha: u32,
    /// Destination weight, 0..=256
    pub dest_alpha: u32,
}

impl BlendParams {
    pub(crate) fn new(src_alpha: u32, dest_alpha: u32) -> Self {
        Self {
            src_alpha: src_alpha.min(256),
            dest_alpha: dest_alpha.min(256),
        }
    }

    /// Coverage weight of the shaded blend modes
    #[inline(always)]
    pub(crate) fn shade_alpha(&self, shade: u32) -> u32 {
        (shade * self.src_alpha + 128) >> 8
    }

    /// Foreground and background weights of the add/sub family for a texel
    #[inline(always)]
    pub(crate) fn texel_alphas(&self, texel: u32) -> (u32, u32) {
        let alpha = texel >> 24;
        let alpha = alpha + (alpha >> 7);
        let inv_alpha = 256 - alpha;
        let fg_alpha = (self.src_alpha * alpha + 128) >> 8;
        let bg_alpha = (self.dest_alpha * alpha + (inv_alpha << 8) + 128) >> 8;
        (fg_alpha, bg_alpha)
    }
}

/// Blend one pixel
///
/// # Arguments
///
/// * `fg` - Shaded foreground
/// * `bg` - Destination pixel
/// * `texel` - Raw sampled color (alpha and zero test)
/// * `shade` - Sampler shade value, 0..=256
///
/// # Returns
///
/// The output pixel, 0xFFRRGGBB
#[inline(always)]
pub(crate) fn blend<B: BlendPolicy>(
    fg: BgraColor,
    bg: BgraColor,
    texel: u32,
    shade: u32,
    params: &BlendParams,
) -> u32 {
    let out = match B::KIND {
        BlendKind::Opaque => fg,
        BlendKind::Masked => {
            if texel == 0 {
                bg
            } else {
                fg
            }
        }
        BlendKind::AddSrcColorOneMinusSrcColor => {
            let channel = |f: u32, b: u32| (f + ((b * (256 - (f + (f >> 7)))) >> 8)).min(255);
            BgraColor::rgb(channel(fg.r, bg.r), channel(fg.g, bg.g), channel(fg.b, bg.b))
        }
        BlendKind::Shaded => {
            let alpha = params.shade_alpha(shade);
            let inv_alpha = 256 - alpha;
            let channel = |f: u32, b: u32| (f * alpha + b * inv_alpha) >> 8;
            BgraColor::rgb(channel(fg.r, bg.r), channel(fg.g, bg.g), channel(fg.b, bg.b))
        }
        BlendKind::AddClampShaded => {
            let alpha = params.shade_alpha(shade);
            let channel = |f: u32, b: u32| (((f * alpha) >> 8) + b).min(255);
            BgraColor::rgb(channel(fg.r, bg.r), channel(fg.g, bg.g), channel(fg.b, bg.b))
        }
        BlendKind::AddClamp | BlendKind::SubClamp | BlendKind::RevSubClamp => {
            let (fg_alpha, bg_alpha) = params.texel_alphas(texel);
            let channel = |f: u32, b: u32| {
                let f = (f * fg_alpha) as i32;
                let b = (b * bg_alpha) as i32;
                let sum = match B::KIND {
                    BlendKind::AddClamp => f + b,
                    BlendKind::SubClamp => f - b,
                    _ => b - f,
                };
                (sum >> 8).clamp(0, 255) as u32
            };
            BgraColor::rgb(channel(fg.r, bg.r), channel(fg.g, bg.g), channel(fg.b, bg.b))
        }
    };
    out.pack_opaque()
}
