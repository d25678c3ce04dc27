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

//! Destination pixel storage and row-band partitioning
//!
//! A [`FrameBuffer`] owns the destination pixels. Before a multi-threaded draw it is
//! split into one [`RowBands`] view per core: band `y / 8` goes to core
//! `(y / 8) % num_cores`, and each view holds exclusive `&mut` slices of its bands only.

use super::primitives::BLOCK_SIZE;

/// CPU-owned destination image
///
/// `P` is `u32` (0xAARRGGBB truecolor) or `u8` (palette index). Pixel `(x, y)` lives at
/// `y * pitch + x`.
///
/// # Examples
///
/// ```
/// use polyraster::core::raster::FrameBuffer;
///
/// let mut frame = FrameBuffer::<u32>::new(16, 16);
/// frame.fill(0xFF10_2030);
/// assert_eq!(frame.pixel(15, 15), 0xFF10_2030);
///
/// let bands = frame.split_bands(2);
/// assert!(bands[0].owns_row(0));
/// assert!(bands[1].owns_row(8));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer<P> {
    width: usize,
    height: usize,
    pitch: usize,
    pixels: Vec<P>,
}

impl<P: Copy + Default> FrameBuffer<P> {
    /// Create a frame with `pitch == width`, filled with `P::default()`
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_pitch(width, height, width)
    }

    /// Create a frame with an explicit row pitch (in pixels)
    ///
    /// A pitch smaller than `width` is raised to `width`.
    pub fn with_pitch(width: usize, height: usize, pitch: usize) -> Self {
        let pitch = pitch.max(width);
        Self {
            width,
            height,
            pitch,
            pixels: vec![P::default(); pitch * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Set every pixel (including pitch padding) to `value`
    pub fn fill(&mut self, value: P) {
        self.pixels.fill(value);
    }

    /// Read the pixel at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the frame.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> P {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of range");
        self.pixels[y * self.pitch + x]
    }

    /// Write the pixel at `(x, y)`
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the frame.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, value: P) {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of range");
        self.pixels[y * self.pitch + x] = value;
    }

    /// Visible part of row `y`
    pub fn row(&self, y: usize) -> &[P] {
        let start = y * self.pitch;
        &self.pixels[start..start + self.width]
    }

    /// Raw pixel storage, `pitch * height` entries
    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    /// Split the frame into one exclusive row-band view per core
    ///
    /// # Arguments
    ///
    /// * `num_cores` - Number of worker threads (0 is treated as 1)
    ///
    /// # Returns
    ///
    /// `num_cores` views; view `i` owns every band `b` with `b % num_cores == i`
    pub fn split_bands(&mut self, num_cores: usize) -> Vec<RowBands<'_, P>> {
        let num_cores = num_cores.max(1);
        let mut views: Vec<RowBands<'_, P>> = (0..num_cores)
            .map(|core| RowBands {
                core,
                num_cores,
                width: self.width,
                height: self.height,
                pitch: self.pitch,
                bands: Vec::new(),
            })
            .collect();

        let band_len = (self.pitch * BLOCK_SIZE).max(1);
        for (index, band) in self.pixels.chunks_mut(band_len).enumerate() {
            views[index % num_cores].bands.push(band);
        }

        log::trace!(
            "Split {}x{} frame into {} band set(s)",
            self.width,
            self.height,
            num_cores
        );
        views
    }
}

/// Exclusive view of the 8-row bands owned by one core
#[derive(Debug)]
pub struct RowBands<'a, P> {
    core: usize,
    num_cores: usize,
    width: usize,
    height: usize,
    pitch: usize,
    bands: Vec<&'a mut [P]>,
}

impl<P> RowBands<'_, P> {
    pub fn core(&self) -> usize {
        self.core
    }

    pub fn num_cores(&self) -> usize {
        self.num_cores
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// True if row `y` is inside the frame and in a band owned by this view
    #[inline]
    pub fn owns_row(&self, y: usize) -> bool {
        y < self.height && (y / BLOCK_SIZE) % self.num_cores == self.core
    }

    /// Visible part of row `y`
    ///
    /// # Panics
    ///
    /// Panics if `y` is outside the frame or in a band owned by another core.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [P] {
        let block = y / BLOCK_SIZE;
        assert!(
            self.owns_row(y),
            "row {y} is not owned by core {}/{}",
            self.core,
            self.num_cores
        );
        let start = (y % BLOCK_SIZE) * self.pitch;
        let band = &mut self.bands[block / self.num_cores];
        &mut band[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands_round_robin() {
        let mut frame = FrameBuffer::<u8>::new(4, 40);
        let bands = frame.split_bands(3);
        assert_eq!(bands.len(), 3);
        // 5 bands: 0,3 -> core 0; 1,4 -> core 1; 2 -> core 2
        assert_eq!(bands[0].bands.len(), 2);
        assert_eq!(bands[1].bands.len(), 2);
        assert_eq!(bands[2].bands.len(), 1);
        assert!(bands[1].owns_row(39));
        assert!(!bands[1].owns_row(40));
    }

    #[test]
    fn test_row_mut_writes_through() {
        let mut frame = FrameBuffer::<u32>::with_pitch(5, 20, 8);
        {
            let mut bands = frame.split_bands(2);
            bands[1].row_mut(9)[4] = 7;
            bands[0].row_mut(17)[0] = 9;
            assert_eq!(bands[0].row_mut(17).len(), 5);
        }
        assert_eq!(frame.pixel(4, 9), 7);
        assert_eq!(frame.pixel(0, 17), 9);
        assert_eq!(frame.pixels().len(), 8 * 20);
    }

    #[test]
    fn test_partial_last_band() {
        let mut frame = FrameBuffer::<u32>::new(3, 10);
        let mut bands = frame.split_bands(1);
        bands[0].row_mut(9).fill(1);
        drop(bands);
        assert_eq!(frame.row(9), &[1, 1, 1]);
    }

    #[test]
    #[should_panic(expected = "not owned by core 1/2")]
    fn test_row_of_other_core_panics() {
        let mut frame = FrameBuffer::<u8>::new(4, 16);
        let mut bands = frame.split_bands(2);
        bands[1].row_mut(3);
    }

    #[test]
    #[should_panic]
    fn test_pixel_out_of_range() {
        let frame = FrameBuffer::<u32>::new(2, 2);
        frame.pixel(2, 0);
    }
}
