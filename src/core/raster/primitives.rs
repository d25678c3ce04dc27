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

//! Rasterizer primitive data structures
//!
//! Vertices, colors, lights and the per-thread work descriptors consumed by the drawers.

/// Number of fractional bits in the 16.16 light position
pub const FRACBITS: u32 = 16;

/// 1.0 in 16.16 fixed point
pub const FRACUNIT: i32 = 1 << FRACBITS;

/// Width and height of a drawer block in pixels
pub(crate) const BLOCK_SIZE: usize = 8;

/// Projected triangle vertex
///
/// Coordinates are in screen space after projection. `w` is the reciprocal depth used
/// for perspective correction, `u`/`v` are texture coordinates in texture repeats and
/// the world-space position feeds the dynamic light accumulator.
///
/// # Examples
///
/// ```
/// use polyraster::core::raster::Vertex;
///
/// let v = Vertex { x: 10.0, y: 20.0, w: 1.0, u: 0.5, ..Vertex::default() };
/// assert_eq!(v.v, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub u: f32,
    pub v: f32,
    pub world_x: f32,
    pub world_y: f32,
    pub world_z: f32,
}

impl Vertex {
    /// World-space position as an array
    #[inline]
    pub fn world(&self) -> [f32; 3] {
        [self.world_x, self.world_y, self.world_z]
    }
}

/// Unpacked 0xAARRGGBB color with one u32 per channel
///
/// Channels are kept wide so intermediate shading results (light values up to 256,
/// products before the final shift) fit without repacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BgraColor {
    pub b: u32,
    pub g: u32,
    pub r: u32,
    pub a: u32,
}

impl BgraColor {
    /// Unpack a 0xAARRGGBB pixel
    ///
    /// # Examples
    ///
    /// ```
    /// use polyraster::core::raster::BgraColor;
    ///
    /// let c = BgraColor::unpack(0x80FF_4020);
    /// assert_eq!((c.a, c.r, c.g, c.b), (0x80, 0xFF, 0x40, 0x20));
    /// assert_eq!(c.pack(), 0x80FF_4020);
    /// ```
    #[inline(always)]
    pub const fn unpack(c: u32) -> Self {
        Self {
            b: c & 0xFF,
            g: (c >> 8) & 0xFF,
            r: (c >> 16) & 0xFF,
            a: c >> 24,
        }
    }

    /// Build a color from red, green and blue with alpha 0
    #[inline(always)]
    pub const fn rgb(r: u32, g: u32, b: u32) -> Self {
        Self { b, g, r, a: 0 }
    }

    /// Pack back into 0xAARRGGBB
    ///
    /// Channels must already be in 0..=255.
    #[inline(always)]
    pub const fn pack(self) -> u32 {
        (self.a << 24) | (self.r << 16) | (self.g << 8) | self.b
    }

    /// Pack with alpha forced to 0xFF
    #[inline(always)]
    pub const fn pack_opaque(self) -> u32 {
        0xFF00_0000 | (self.r << 16) | (self.g << 8) | self.b
    }
}

impl From<u32> for BgraColor {
    fn from(c: u32) -> Self {
        Self::unpack(c)
    }
}

impl From<BgraColor> for u32 {
    fn from(c: BgraColor) -> Self {
        c.pack()
    }
}

/// Dynamic light source
///
/// The sign of `radius` selects the light type: a positive radius is a simple light
/// that only falls off with distance, a negative radius is a point light that also
/// falls off with the angle between the surface normal and the light direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolyLight {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub radius: f32,
    /// Light color, 0xAARRGGBB (alpha ignored)
    pub color: u32,
}

impl PolyLight {
    /// Distance-attenuated light
    pub fn simple(position: [f32; 3], radius: f32, color: u32) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            radius: radius.abs(),
            color,
        }
    }

    /// Distance- and angle-attenuated light
    pub fn point(position: [f32; 3], radius: f32, color: u32) -> Self {
        Self {
            x: position[0],
            y: position[1],
            z: position[2],
            radius: -radius.abs(),
            color,
        }
    }

    /// True if the light uses N·L falloff
    #[inline]
    pub fn is_point(&self) -> bool {
        self.radius.is_sign_negative()
    }
}

/// Clip rectangle in pixels
///
/// `left`/`top` are inclusive, `right`/`bottom` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ClipRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Clip rectangle covering a whole `width` x `height` target
    pub fn full(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Intersection with a `width` x `height` target
    pub fn intersect(&self, width: usize, height: usize) -> Self {
        Self {
            left: self.left.max(0),
            top: self.top.max(0),
            right: self.right.min(width as i32),
            bottom: self.bottom.min(height as i32),
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// Horizontal run of fully covered 8x8 blocks
///
/// The span starts at pixel `(x, y)`, covers 8 rows and `length` blocks (so
/// `8 * length` pixels per row). No per-pixel coverage test is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullSpan {
    pub x: u16,
    pub y: u16,
    pub length: u32,
}

/// Partially covered 8x8 block
///
/// `mask0` covers rows 0-3 and `mask1` rows 4-7. In each mask the most significant
/// bit is the top-left pixel of the half; bits run left to right, then down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialBlock {
    pub x: u16,
    pub y: u16,
    pub mask0: u32,
    pub mask1: u32,
}

impl PartialBlock {
    /// Both halves fully covered
    #[inline]
    pub fn is_full(&self) -> bool {
        self.mask0 == u32::MAX && self.mask1 == u32::MAX
    }

    /// Coverage bit for the pixel at block-local `(px, py)`
    ///
    /// # Examples
    ///
    /// ```
    /// use polyraster::core::raster::PartialBlock;
    ///
    /// let block = PartialBlock { x: 0, y: 0, mask0: 0x8000_0000, mask1: 0x0000_0001 };
    /// assert!(block.covers(0, 0));
    /// assert!(block.covers(7, 7));
    /// assert!(!block.covers(1, 0));
    /// ```
    #[inline]
    pub fn covers(&self, px: usize, py: usize) -> bool {
        let mask = if py < 4 { self.mask0 } else { self.mask1 };
        let bit = 31 - ((py & 3) * 8 + px);
        mask & (1 << bit) != 0
    }
}

/// Per-thread work assignment
///
/// Produced by a scheduler (see [`classify`](super::classify)) and consumed read-only by
/// the drawers. Every span and block listed here lies in a row band owned by `core`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerThreadData {
    pub core: usize,
    pub num_cores: usize,
    pub full_spans: Vec<FullSpan>,
    pub partial_blocks: Vec<PartialBlock>,
}

impl WorkerThreadData {
    pub fn new(core: usize, num_cores: usize) -> Self {
        Self {
            core,
            num_cores: num_cores.max(1),
            ..Self::default()
        }
    }

    /// True if row `y` lies in a band owned by this thread
    #[inline]
    pub fn owns_row(&self, y: usize) -> bool {
        (y / BLOCK_SIZE) % self.num_cores.max(1) == self.core
    }

    /// Number of 8x8 blocks assigned to this thread
    pub fn block_count(&self) -> usize {
        self.partial_blocks.len()
            + self
                .full_spans
                .iter()
                .map(|span| span.length as usize)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.full_spans.is_empty() && self.partial_blocks.is_empty()
    }
}
