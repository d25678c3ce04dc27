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

//! Portable truecolor tier

use super::truecolor::{PixelBatch, PixelKernel};
use crate::core::raster::blend::{blend, BlendParams};
use crate::core::raster::modes::{BlendPolicy, ShadePolicy};
use crate::core::raster::primitives::{BgraColor, BLOCK_SIZE};
use crate::core::raster::shade::{shade, ShadeParams};

/// One pixel at a time in `u32` arithmetic
pub struct ScalarKernel;

impl PixelKernel for ScalarKernel {
    #[inline(always)]
    unsafe fn shade_blend<Sh: ShadePolicy, B: BlendPolicy>(
        batch: &PixelBatch,
        shade_params: &ShadeParams,
        blend_params: &BlendParams,
        out: &mut [u32; BLOCK_SIZE],
    ) {
        for (i, pixel) in out.iter_mut().enumerate() {
            let material = BgraColor::unpack(batch.material[i]);
            let fg = shade::<Sh>(material, batch.light[i], batch.dynlight[i], shade_params);
            *pixel = blend::<B>(
                fg,
                BgraColor::unpack(batch.bg[i]),
                batch.material[i],
                batch.shade[i],
                blend_params,
            );
        }
    }
}
