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

//! Render harness configuration
//!
//! Settings come from three layers, each overriding the previous one: a TOML file,
//! `POLYRASTER_*` environment variables (a `.env` file is honored) and command-line
//! flags applied by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{RasterError, Result};
use super::raster::Backend;

/// Environment variable selecting the truecolor tier
pub const ENV_BACKEND: &str = "POLYRASTER_BACKEND";

/// Environment variable selecting the worker count
pub const ENV_THREADS: &str = "POLYRASTER_THREADS";

/// Harness settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Truecolor tier (`auto`, `scalar`, `sse2`, `avx2`)
    pub backend: Backend,
    /// Worker threads; 0 uses every available core
    pub threads: usize,
    /// Frame width in pixels
    pub width: usize,
    /// Frame height in pixels
    pub height: usize,
    /// Frames rendered per run
    pub frames: u32,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            threads: 0,
            width: 640,
            height: 480,
            frames: 60,
        }
    }
}

impl RasterConfig {
    /// Load configuration from a TOML file
    ///
    /// Missing keys keep their default values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RasterError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents)
            .map_err(|e| RasterError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)
            .map_err(|e| RasterError::Config(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration with the environment applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Apply `POLYRASTER_BACKEND` and `POLYRASTER_THREADS`, reading `.env` first
    pub fn with_env(self) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = var(ENV_BACKEND) {
            self.backend = value.parse()?;
        }
        if let Some(value) = var(ENV_THREADS) {
            self.threads = value.trim().parse().map_err(|_| {
                RasterError::Config(format!("{ENV_THREADS} is not a thread count: {value}"))
            })?;
        }
        Ok(self)
    }

    /// Concrete tier to render with
    ///
    /// An explicit tier the CPU lacks falls back to the fastest supported one.
    pub fn resolved_backend(&self) -> Backend {
        match self.backend.resolve() {
            Ok(tier) => tier,
            Err(e) => {
                let fallback = Backend::detect();
                log::warn!("{}, falling back to {}", e, fallback);
                fallback
            }
        }
    }

    /// Worker count, with 0 resolved to the available parallelism
    pub fn thread_count(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
