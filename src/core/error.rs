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

//! Error types
//!
//! Draw requests are validated once, when a drawer is resolved for them. Everything
//! downstream of validation (interpolation, sampling, shading, blending) is infallible
//! arithmetic, so the variants here describe malformed requests and harness failures only.

use thiserror::Error;

use super::raster::{Backend, SamplerKind, TextureFormat};

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RasterError>;

/// Errors reported while building draw requests or running the harness
#[derive(Debug, Error)]
pub enum RasterError {
    /// The three vertices span zero screen-space area
    #[error("degenerate triangle: zero screen-space area")]
    DegenerateTriangle,

    /// The sampler reads texels but the uniforms carry no texture
    #[error("sampler {sampler:?} requires a texture")]
    MissingTexture { sampler: SamplerKind },

    /// The texture is in the wrong texel format for the sampler and output path
    #[error("sampler {sampler:?} requires {expected:?} texels")]
    TextureFormat {
        sampler: SamplerKind,
        expected: TextureFormat,
    },

    /// A texture dimension is zero
    #[error("empty texture: {width}x{height}")]
    EmptyTexture { width: u32, height: u32 },

    /// The texel slice is shorter than width * height
    #[error("texture too small: expected {expected} texels, got {actual}")]
    TextureTooSmall { expected: usize, actual: usize },

    /// The translated sampler was selected without a translation table
    #[error("translated sampler requires a translation table")]
    MissingTranslation,

    /// The 8-bit output path was selected without palette tables
    #[error("8-bit output requires palette tables")]
    MissingPalette,

    /// A lookup table is shorter than its fixed size
    #[error("{table} table too small: expected {expected} entries, got {actual}")]
    TableTooSmall {
        table: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The requested back-end is not available on this CPU or architecture
    #[error("backend {0:?} is not supported on this CPU")]
    UnsupportedBackend(Backend),

    /// A backend name could not be parsed
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// Configuration could not be read, parsed or written
    #[error("config error: {0}")]
    Config(String),

    /// I/O failure in the harness
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
