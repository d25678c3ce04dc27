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

//! polyraster frame harness
//!
//! Renders a lit, perspective-textured floor under a scrolling skycap strip for a
//! number of frames, one scoped thread per band set, and reports the frame rate.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use polyraster::core::config::RasterConfig;
use polyraster::core::raster::{
    classify, Backend, BlendKind, ClipRect, FrameBuffer, PolyLight, RectDrawArgs, RectDrawer,
    Rgb, SamplerKind, ShadeConstants, Texture, TriDrawTriangleArgs, TriDrawer, UniformFlags,
    Uniforms, Vertex, WorkerThreadData,
};

/// Side of one floor grid cell in pixels
const CELL: usize = 64;

/// Texture side for both procedural textures
const TEXTURE_SIZE: u32 = 64;

#[derive(Parser, Debug)]
#[command(name = "polyraster-bench", version, about = "Software rasterizer frame harness")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Truecolor tier: auto, scalar, sse2 or avx2
    #[arg(long)]
    backend: Option<Backend>,

    /// Worker threads (0 = all cores)
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    width: Option<usize>,

    #[arg(long)]
    height: Option<usize>,

    /// Frames to render
    #[arg(long)]
    frames: Option<u32>,

    /// Write the last frame as a binary PPM
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> polyraster::Result<(RasterConfig, Option<PathBuf>)> {
        let config = match &self.config {
            Some(path) => RasterConfig::load(path)?,
            None => RasterConfig::default(),
        };
        let mut config = config.with_env()?;
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(frames) = self.frames {
            config.frames = frames;
        }
        Ok((config, self.output))
    }
}

/// Procedural textures shared by every frame
struct Scene {
    checker: Vec<u32>,
    sky: Vec<u32>,
}

impl Scene {
    fn new() -> Self {
        let size = TEXTURE_SIZE as usize;
        let checker = (0..size * size)
            .map(|i| {
                let (x, y) = (i / size, i % size);
                if (x / 8 + y / 8) % 2 == 0 {
                    0xFFC8_B080
                } else {
                    0xFF50_6070
                }
            })
            .collect();
        let sky = (0..size * size)
            .map(|i| {
                let (x, y) = ((i / size) as u32, (i % size) as u32);
                0xFF00_0000 | ((x * 2) << 16) | ((96 + y) << 8) | (160 + y)
            })
            .collect();
        Self { checker, sky }
    }
}

/// Triangles of the floor grid below `horizon`, farther rows with smaller `w`
fn floor_grid(width: usize, height: usize, horizon: usize) -> Vec<[Vertex; 3]> {
    let depth = |y: usize| {
        let t = (y - horizon) as f32 / (height - horizon).max(1) as f32;
        0.2 + 0.8 * t
    };
    let vertex = |x: usize, y: usize, col: usize, row: usize| {
        let w = depth(y);
        Vertex {
            x: x as f32,
            y: y as f32,
            w,
            u: col as f32 * 0.5,
            v: row as f32 * 0.5,
            world_x: x as f32,
            world_y: y as f32,
            world_z: 40.0 / w,
            ..Vertex::default()
        }
    };

    let mut triangles = Vec::new();
    let rows: Vec<usize> = (horizon..height).step_by(CELL).chain([height]).collect();
    let cols: Vec<usize> = (0..width).step_by(CELL).chain([width]).collect();
    for (row, ys) in rows.windows(2).enumerate() {
        for (col, xs) in cols.windows(2).enumerate() {
            if xs[0] == xs[1] || ys[0] == ys[1] {
                continue;
            }
            let tl = vertex(xs[0], ys[0], col, row);
            let tr = vertex(xs[1], ys[0], col + 1, row);
            let bl = vertex(xs[0], ys[1], col, row + 1);
            let br = vertex(xs[1], ys[1], col + 1, row + 1);
            triangles.push([tl, tr, bl]);
            triangles.push([tr, br, bl]);
        }
    }
    triangles
}

fn render_frame(
    scene: &Scene,
    frame: &mut FrameBuffer<u32>,
    backend: Backend,
    num_cores: usize,
    index: u32,
) -> polyraster::Result<()> {
    let (width, height) = (frame.width(), frame.height());
    let horizon = height / 4;
    let t = index as f32 * 0.05;

    let lights = [
        PolyLight::point(
            [
                width as f32 * (0.5 + 0.4 * t.cos()),
                height as f32 * 0.7,
                20.0,
            ],
            width as f32 * 0.5,
            0xFFFF_C080,
        ),
        PolyLight::simple(
            [width as f32 * 0.5, height as f32 * (0.6 + 0.3 * t.sin()), 60.0],
            width as f32 * 0.3,
            0xFF40_80FF,
        ),
    ];
    let floor = Uniforms {
        light: 200,
        glob_vis: 6.0,
        shade_constants: ShadeConstants {
            fade: Rgb::new(24, 24, 40),
            ..ShadeConstants::default()
        },
        texture: Some(Texture::bgra(TEXTURE_SIZE, TEXTURE_SIZE, &scene.checker)),
        lights: &lights,
        dyn_light_color: 0x0010_1010,
        ..Uniforms::default()
    };
    let sky = Uniforms {
        flags: UniformFlags::SIMPLE_SHADE | UniformFlags::FIXED_LIGHT,
        color: 0xFF30_4060,
        texture: Some(Texture::bgra(TEXTURE_SIZE, TEXTURE_SIZE, &scene.sky)),
        ..Uniforms::default()
    };

    let clip = ClipRect::full(width, height);
    let mut draws = Vec::new();
    for vertices in floor_grid(width, height, horizon) {
        let args = TriDrawTriangleArgs::new(
            vertices,
            &floor,
            SamplerKind::Texture,
            BlendKind::Opaque,
            clip,
        )?;
        let work = classify(&args, width, height, num_cores);
        draws.push((TriDrawer::<u32>::new(&args, backend)?, work));
    }

    let sky_args = RectDrawArgs::new(
        (0.0, 0.0),
        (width as f32, horizon as f32),
        &sky,
        SamplerKind::Skycap,
        BlendKind::Opaque,
    )
    .with_texcoords((t, 0.0), (t + 2.0, 1.0));
    let sky_drawer = RectDrawer::<u32>::new(&sky_args, backend)?;

    let bands = frame.split_bands(num_cores);
    thread::scope(|scope| {
        for (core, mut band) in bands.into_iter().enumerate() {
            let (draws, sky_drawer) = (&draws, &sky_drawer);
            scope.spawn(move || {
                sky_drawer.execute(&WorkerThreadData::new(core, num_cores), &mut band);
                for (drawer, work) in draws {
                    drawer.execute(&work[core], &mut band);
                }
            });
        }
    });

    log::trace!("Frame {} drew {} triangles", index, draws.len());
    Ok(())
}

/// Write a truecolor frame as binary PPM (alpha dropped)
fn write_ppm(path: &Path, frame: &FrameBuffer<u32>) -> polyraster::Result<()> {
    let mut out = format!("P6\n{} {}\n255\n", frame.width(), frame.height()).into_bytes();
    out.reserve(frame.width() * frame.height() * 3);
    for y in 0..frame.height() {
        for &c in frame.row(y) {
            out.extend_from_slice(&[(c >> 16) as u8, (c >> 8) as u8, c as u8]);
        }
    }
    std::fs::write(path, out)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let (config, output) = Cli::parse().into_config()?;
    let backend = config.resolved_backend();
    let num_cores = config.thread_count();
    log::info!(
        "Rendering {} frame(s) at {}x{} on {} with {} thread(s)",
        config.frames,
        config.width,
        config.height,
        backend,
        num_cores
    );

    let scene = Scene::new();
    let mut frame = FrameBuffer::<u32>::new(config.width, config.height);
    let mut total = Duration::ZERO;
    for index in 0..config.frames {
        let start = Instant::now();
        render_frame(&scene, &mut frame, backend, num_cores, index)?;
        let elapsed = start.elapsed();
        log::debug!("Frame {} took {:.2?}", index, elapsed);
        total += elapsed;
    }

    if config.frames > 0 {
        let fps = config.frames as f64 / total.as_secs_f64().max(f64::EPSILON);
        log::info!(
            "Rendered {} frame(s) in {:.2?} ({:.1} fps)",
            config.frames,
            total,
            fps
        );
    }

    if let Some(path) = output {
        write_ppm(&path, &frame)?;
        log::info!("Wrote {}", path.display());
    }

    Ok(())
}
