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

//! polyraster: a software triangle rasterizer and pixel-shading core
//!
//! This crate renders screen-space triangles onto a CPU-owned framebuffer without a GPU.
//! It performs perspective-correct interpolation, texture sampling, light/fog shading,
//! dynamic point lights and blending, with three interchangeable implementation tiers
//! (scalar, SSE2, AVX2) for 32-bit truecolor output and a scalar 8-bit palette tier.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`core`]: Rasterization core, configuration and error types
//!
//! # Example
//!
//! ```
//! use polyraster::core::raster::{
//!     classify, Backend, BlendKind, ClipRect, FrameBuffer, SamplerKind, TriDrawTriangleArgs,
//!     TriDrawer, UniformFlags, Uniforms, Vertex,
//! };
//!
//! let mut frame = FrameBuffer::<u32>::new(64, 64);
//! let uniforms = Uniforms {
//!     flags: UniformFlags::SIMPLE_SHADE | UniformFlags::FIXED_LIGHT,
//!     color: 0xFF20_40FF,
//!     ..Uniforms::default()
//! };
//!
//! let v = |x: f32, y: f32| Vertex { x, y, w: 1.0, ..Vertex::default() };
//! let args = TriDrawTriangleArgs::new(
//!     [v(0.0, 0.0), v(64.0, 0.0), v(0.0, 64.0)],
//!     &uniforms,
//!     SamplerKind::Fill,
//!     BlendKind::Opaque,
//!     ClipRect::full(64, 64),
//! )?;
//!
//! let drawer = TriDrawer::<u32>::new(&args, Backend::Auto)?;
//! let threads = classify(&args, 64, 64, 1);
//! for (thread, mut bands) in threads.iter().zip(frame.split_bands(1)) {
//!     drawer.execute(thread, &mut bands);
//! }
//! assert_eq!(frame.pixel(1, 1) & 0x00FF_FFFF, 0x0020_40FF);
//! # Ok::<(), polyraster::RasterError>(())
//! ```
//!
//! # Error Handling
//!
//! Draw requests are validated once when they are built; all fallible operations
//! return [`core::error::Result<T>`], an alias for `Result<T, RasterError>`.
//! The per-pixel loops themselves never fail.

pub mod core;

// Re-export commonly used types
pub use crate::core::error::{RasterError, Result};
