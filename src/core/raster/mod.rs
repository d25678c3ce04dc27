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

//! Software triangle rasterization and pixel shading
//!
//! This module turns screen-space triangles (already transformed, projected and clipped)
//! into pixels on a CPU-owned framebuffer. Each covered pixel runs through the same
//! fixed pipeline:
//!
//! ```text
//! step variables -> interpolants -> { sampler, dynamic light } -> shade -> blend -> store
//! ```
//!
//! # Policies
//!
//! The pipeline stages are selected per draw call from closed sets of modes:
//!
//! - [`SamplerKind`]: how a texel is produced (texture, fill, shaded mask, stencil,
//!   translated, skycap, fuzz, fog boundary)
//! - [`FilterKind`]: nearest or bilinear (texture sampler only)
//! - [`ShadeKind`]: simple light scaling or advanced fade/desaturate shading
//! - [`BlendKind`]: how the shaded color is composited with the destination
//!
//! The mode combination is resolved once into a monomorphized drawer function, so the
//! per-pixel loops never branch on a mode.
//!
//! # Back-ends
//!
//! 32-bit output runs on one of three tiers ([`Backend::Scalar`], [`Backend::Sse2`],
//! [`Backend::Avx2`]) that produce the same pixels. 8-bit palette output always runs on
//! the scalar palette tier.
//!
//! # Threading
//!
//! Work is partitioned by 8-row bands: band `y / 8` belongs to core
//! `(y / 8) % num_cores`. [`FrameBuffer::split_bands`] hands each core exclusive slices
//! of its own bands, so two threads can never write the same pixel.

mod backend;
mod blend;
mod drawer;
mod framebuffer;
mod gradient;
mod light;
mod modes;
mod primitives;
mod rect;
mod sampler;
mod setup;
mod shade;
mod uniforms;
#[cfg(test)]
mod tests;

// Public re-exports
pub use backend::Backend;
pub use drawer::{Pixel, PixelFormat, TriDrawer};
pub use framebuffer::{FrameBuffer, RowBands};
pub use gradient::{find_gradient_x, find_gradient_y, ScreenTriangleStepVariables, TriDrawTriangleArgs};
pub use light::{calc_dynamic_light, face_normal};
pub use modes::{BlendKind, FilterKind, SamplerKind, ShadeKind};
pub use primitives::{
    BgraColor, ClipRect, FullSpan, PartialBlock, PolyLight, Vertex, WorkerThreadData, FRACUNIT,
};
pub use rect::{RectDrawArgs, RectDrawer};
pub use setup::{classify, StencilView};
pub use uniforms::{
    PaletteTables, Rgb, ShadeConstants, Texture, TextureFormat, TexturePixels, Translation,
    UniformFlags, Uniforms, FUZZ_COLORMAP, NUM_COLORMAPS, RGB256K_SIZE,
};
