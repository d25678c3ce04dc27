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

//! Pipeline policy modes
//!
//! Each pipeline stage has a closed enum of modes (used at the API boundary and for
//! dispatch) and a set of zero-sized marker types implementing a policy trait whose
//! associated `KIND` constant names the mode. Drawer functions are generic over the
//! marker types, so every `match P::KIND` inside a pixel loop is resolved at compile time.

use serde::{Deserialize, Serialize};

use super::uniforms::{TextureFormat, Uniforms};

/// How the foreground color (and shade value) is produced for a pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Texel from a BGRA (or, for 8-bit output, indexed) texture
    Texture,
    /// Constant uniform color
    Fill,
    /// Uniform color; shade value from an 8-bit mask texture
    Shaded,
    /// Uniform color; shade value from the texture's alpha channel
    Stencil,
    /// Indexed texel remapped through a translation table
    Translated,
    /// Texture faded toward the uniform color near the top and bottom edge
    Skycap,
    /// Uniform color; shade value from texture alpha modulated by the fuzz table
    Fuzz,
    /// The destination pixel itself, re-shaded
    FogBoundary,
}

impl SamplerKind {
    /// Every sampler mode
    pub const ALL: [SamplerKind; 8] = [
        SamplerKind::Texture,
        SamplerKind::Fill,
        SamplerKind::Shaded,
        SamplerKind::Stencil,
        SamplerKind::Translated,
        SamplerKind::Skycap,
        SamplerKind::Fuzz,
        SamplerKind::FogBoundary,
    ];

    /// Texel format this sampler reads for the given output path, if any
    ///
    /// The 8-bit path reads indexed texels for every texture-backed sampler.
    pub fn texture_format(self, output: TextureFormat) -> Option<TextureFormat> {
        match self {
            SamplerKind::Fill | SamplerKind::FogBoundary => None,
            SamplerKind::Shaded | SamplerKind::Translated => Some(TextureFormat::Indexed),
            SamplerKind::Texture
            | SamplerKind::Stencil
            | SamplerKind::Skycap
            | SamplerKind::Fuzz => Some(output),
        }
    }

    /// Shade mode used with this sampler under the given uniforms
    pub fn shade_kind(self, uniforms: &Uniforms<'_>) -> ShadeKind {
        match self {
            SamplerKind::Fuzz => ShadeKind::None,
            _ if uniforms.simple_shade() => ShadeKind::Simple,
            _ => ShadeKind::Advanced,
        }
    }

    /// Filter mode used with this sampler under the given uniforms
    ///
    /// Only the texture sampler honors linear filtering.
    pub fn filter_kind(self, uniforms: &Uniforms<'_>) -> FilterKind {
        match self {
            SamplerKind::Texture if !uniforms.nearest_filter() => FilterKind::Linear,
            _ => FilterKind::Nearest,
        }
    }
}

/// How the shaded foreground is combined with the destination pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendKind {
    /// Overwrite
    Opaque,
    /// Overwrite unless the sampled texel is zero
    Masked,
    /// Screen-style additive: fg + bg * (1 - fg)
    AddSrcColorOneMinusSrcColor,
    /// Translucency by sampler shade value scaled by source alpha
    Shaded,
    /// Additive by sampler shade value scaled by source alpha
    AddClampShaded,
    /// fg * srcalpha + bg * destalpha, saturated
    AddClamp,
    /// fg * srcalpha - bg * destalpha, saturated
    SubClamp,
    /// bg * destalpha - fg * srcalpha, saturated
    RevSubClamp,
}

impl BlendKind {
    /// Every blend mode
    pub const ALL: [BlendKind; 8] = [
        BlendKind::Opaque,
        BlendKind::Masked,
        BlendKind::AddSrcColorOneMinusSrcColor,
        BlendKind::Shaded,
        BlendKind::AddClampShaded,
        BlendKind::AddClamp,
        BlendKind::SubClamp,
        BlendKind::RevSubClamp,
    ];

    /// True if the mode reads the destination pixel
    pub fn reads_destination(self) -> bool {
        self != BlendKind::Opaque
    }
}

/// How light level and shade constants are applied to the sampled color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadeKind {
    /// Color passes through; only dynamic light is added (fuzz)
    None,
    /// color * light / 256
    Simple,
    /// Desaturate, light, fade and tint
    Advanced,
}

/// Texture filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Nearest,
    Linear,
}

/// Compile-time sampler selection
pub trait SamplerPolicy {
    const KIND: SamplerKind;
}

/// Compile-time blend selection
pub trait BlendPolicy {
    const KIND: BlendKind;
}

/// Compile-time shade selection
pub trait ShadePolicy {
    const KIND: ShadeKind;
}

/// Compile-time filter selection
pub trait FilterPolicy {
    const KIND: FilterKind;
}

macro_rules! policy {
    ($trait:ident, $kind:ident, $($name:ident => $variant:ident),+ $(,)?) => {
        $(
            pub(crate) struct $name;

            impl $trait for $name {
                const KIND: $kind = $kind::$variant;
            }
        )+
    };
}

policy!(
    SamplerPolicy,
    SamplerKind,
    TextureSampler => Texture,
    FillSampler => Fill,
    ShadedSampler => Shaded,
    StencilSampler => Stencil,
    TranslatedSampler => Translated,
    SkycapSampler => Skycap,
    FuzzSampler => Fuzz,
    FogBoundarySampler => FogBoundary,
);

policy!(
    BlendPolicy,
    BlendKind,
    OpaqueBlend => Opaque,
    MaskedBlend => Masked,
    AddSrcColorBlend => AddSrcColorOneMinusSrcColor,
    ShadedBlend => Shaded,
    AddClampShadedBlend => AddClampShaded,
    AddClampBlend => AddClamp,
    SubClampBlend => SubClamp,
    RevSubClampBlend => RevSubClamp,
);

policy!(
    ShadePolicy,
    ShadeKind,
    NoShade => None,
    SimpleShade => Simple,
    AdvancedShade => Advanced,
);

policy!(
    FilterPolicy,
    FilterKind,
    NearestFilter => Nearest,
    LinearFilter => Linear,
);
