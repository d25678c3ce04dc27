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

//! Truecolor back-end selection
//!
//! The three truecolor tiers share interpolation and sampling and differ only in how
//! the shade and blend stages are computed. Runtime CPU feature detection decides
//! which tiers may run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::{RasterError, Result};

/// Truecolor implementation tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Fastest tier the CPU supports
    #[default]
    Auto,
    /// One pixel at a time, portable
    Scalar,
    /// Two pixels per 128-bit register (x86_64)
    Sse2,
    /// Four pixels per 256-bit register (x86_64 with AVX2)
    Avx2,
}

impl Backend {
    /// Every concrete tier, slowest first
    pub const TIERS: [Backend; 3] = [Backend::Scalar, Backend::Sse2, Backend::Avx2];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Auto => "auto",
            Backend::Scalar => "scalar",
            Backend::Sse2 => "sse2",
            Backend::Avx2 => "avx2",
        }
    }

    /// True if this tier can run on the current CPU
    pub fn is_supported(self) -> bool {
        match self {
            Backend::Auto | Backend::Scalar => true,
            #[cfg(target_arch = "x86_64")]
            Backend::Sse2 => is_x86_feature_detected!("sse2"),
            #[cfg(target_arch = "x86_64")]
            Backend::Avx2 => is_x86_feature_detected!("avx2"),
            #[cfg(not(target_arch = "x86_64"))]
            Backend::Sse2 | Backend::Avx2 => false,
        }
    }

    /// Fastest supported tier
    pub fn detect() -> Backend {
        Self::TIERS
            .into_iter()
            .rev()
            .find(|tier| tier.is_supported())
            .unwrap_or(Backend::Scalar)
    }

    /// Resolve `Auto` to a concrete tier and reject unsupported explicit requests
    ///
    /// # Returns
    ///
    /// A concrete tier (never `Auto`), or `RasterError::UnsupportedBackend`
    ///
    /// # Examples
    ///
    /// ```
    /// use polyraster::core::raster::Backend;
    ///
    /// let tier = Backend::Auto.resolve().unwrap();
    /// assert_ne!(tier, Backend::Auto);
    /// assert!(tier.is_supported());
    /// assert_eq!(Backend::Scalar.resolve().unwrap(), Backend::Scalar);
    /// ```
    pub fn resolve(self) -> Result<Backend> {
        match self {
            Backend::Auto => Ok(Self::detect()),
            tier if tier.is_supported() => Ok(tier),
            tier => Err(RasterError::UnsupportedBackend(tier)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "scalar" => Ok(Backend::Scalar),
            "sse2" => Ok(Backend::Sse2),
            "avx2" => Ok(Backend::Avx2),
            _ => Err(RasterError::UnknownBackend(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("AVX2".parse::<Backend>().unwrap(), Backend::Avx2);
        assert_eq!(" scalar ".parse::<Backend>().unwrap(), Backend::Scalar);
        assert!(matches!(
            "neon".parse::<Backend>(),
            Err(RasterError::UnknownBackend(name)) if name == "neon"
        ));
        for tier in Backend::TIERS {
            assert_eq!(tier.name().parse::<Backend>().unwrap(), tier);
        }
    }

    #[test]
    fn test_auto_resolves_to_supported_tier() {
        let tier = Backend::Auto.resolve().unwrap();
        assert!(Backend::TIERS.contains(&tier));
        assert!(tier.is_supported());
        assert_eq!(Backend::detect(), tier);
    }

    #[test]
    fn test_unsupported_rejected() {
        for tier in Backend::TIERS {
            match tier.resolve() {
                Ok(resolved) => assert_eq!(resolved, tier),
                Err(err) => {
                    assert!(!tier.is_supported());
                    assert!(matches!(err, RasterError::UnsupportedBackend(t) if t == tier));
                }
            }
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse2_baseline_on_x86_64() {
        assert!(Backend::Sse2.is_supported());
    }
}
