use super::error::ConfigError;
use super::escape::{self, ExitPolicy, IterationResult};
use super::numerics::{Df, PrecisionMode, Qf, Real};
use super::signals::{FrameDiagnostics, LogObserver};
use super::viewport::{Resolution, Viewport};

use rug::Float;
use log::{trace, debug, log_enabled, Level};
use std::time;

pub const DEFAULT_MAX_ITERATIONS: u32 = 500;
pub const INIT_RUG_PRECISION: u32 = 128;
// Each zoom step in (out) raises (lowers) the iteration budget by this much
pub const ZOOM_ITERATION_STEP: u32 = 5;

#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    pub precision: PrecisionMode,
    pub max_iterations: u32,
    pub escape_radius: f64,
    pub exit_policy: ExitPolicy,
}

impl RenderConfig {
    pub fn new(
        precision: PrecisionMode,
        max_iterations: u32,
        escape_radius: f64,
        exit_policy: ExitPolicy,
    ) -> Result<RenderConfig, ConfigError> {
        let config = RenderConfig { precision, max_iterations, escape_radius, exit_policy };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !self.escape_radius.is_finite() || self.escape_radius <= 0.0 {
            return Err(ConfigError::InvalidEscapeRadius(self.escape_radius));
        }
        Ok(())
    }
}

/// Escape-time results of one frame, row-major with row 0 first.
#[derive(Clone, Debug)]
pub struct Frame {
    pub resolution: Resolution,
    pub max_iterations: u32,
    pub results: Vec<IterationResult>,
    pub diagnostics: FrameDiagnostics,
}

impl Frame {
    pub fn get(&self, px: u32, py: u32) -> Option<&IterationResult> {
        if px >= self.resolution.width() || py >= self.resolution.height() {
            return None;
        }
        self.results.get(py as usize * self.resolution.width() as usize + px as usize)
    }

    pub fn escaped_count(&self) -> usize {
        self.results.iter()
            .filter(|r| r.has_escaped(self.max_iterations))
            .count()
    }
}

// CPU evaluation of a whole viewport with the same per-pixel arithmetic the
// shaders run.
#[derive(Clone, Debug)]
pub struct Scene {
    frame_id: u64,
    viewport: Viewport,
    resolution: Resolution,
    config: RenderConfig,
}

impl Scene {
    pub fn new(
        viewport: Viewport,
        resolution: Resolution,
        config: RenderConfig,
    ) -> Result<Scene, ConfigError> {
        config.validate()?;
        debug!("Scene created {}x{} precision={} max_iter={} radius={}",
            resolution.width(), resolution.height(), config.precision,
            config.max_iterations, config.escape_radius);

        Ok(Scene { frame_id: 0, viewport, resolution, config })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn set_max_iterations(&mut self, max_iterations: u32) -> Result<(), ConfigError> {
        if max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        self.config.max_iterations = max_iterations;
        Ok(())
    }

    pub fn set_precision(&mut self, precision: PrecisionMode) {
        self.config.precision = precision;
    }

    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = resolution;
        debug!("Resolution changed w={} h={}", resolution.width(), resolution.height());
    }

    pub fn evaluate(&self, px: u32, py: u32) -> IterationResult {
        match self.config.precision {
            PrecisionMode::Native => self.evaluate_as::<f32>(px, py),
            PrecisionMode::DoubleSingle => self.evaluate_as::<Df>(px, py),
            PrecisionMode::QuadSingle => self.evaluate_as::<Qf>(px, py),
        }
    }

    fn evaluate_as<R: Real>(&self, px: u32, py: u32) -> IterationResult {
        let c = self.viewport.coordinate::<R>(px, py, self.resolution);
        let (max_iter, threshold, policy) =
            (self.config.max_iterations, self.threshold::<R>(), self.config.exit_policy);

        let result = if log_enabled!(Level::Trace) {
            let label = format!("{} ({}, {})", self.config.precision, px, py);
            let mut observer = LogObserver::new(label);
            escape::iterate_observed(c, max_iter, threshold, policy, &mut observer)
        } else {
            escape::iterate(c, max_iter, threshold, policy)
        };

        trace!("Pixel ({}, {}) c={:?} -> {:?}", px, py, c, result);
        result
    }

    // Squared radius rounded once from the viewport precision
    fn threshold<R: Real>(&self) -> R {
        let mut r2 = Float::with_val(self.viewport.prec(), self.config.escape_radius);
        r2.square_mut();
        R::from_float(&r2)
    }

    pub fn render(&mut self) -> Frame {
        let start = time::Instant::now();
        let (width, height) = (self.resolution.width(), self.resolution.height());

        let mut results = Vec::with_capacity(self.resolution.pixels());
        for py in 0..height {
            for px in 0..width {
                results.push(self.evaluate(px, py));
            }
        }

        self.frame_id += 1;
        let mut frame = Frame {
            resolution: self.resolution,
            max_iterations: self.config.max_iterations,
            results,
            diagnostics: FrameDiagnostics {
                frame_id: self.frame_id,
                precision: self.config.precision,
                pixels: self.resolution.pixels(),
                escaped: 0,
                elapsed: time::Duration::ZERO,
            },
        };
        frame.diagnostics.escaped = frame.escaped_count();
        frame.diagnostics.elapsed = start.elapsed();

        debug!("Frame {} rendered {}x{} precision={} escaped={}/{} in {:?}",
            frame.diagnostics.frame_id, width, height, frame.diagnostics.precision,
            frame.diagnostics.escaped, frame.diagnostics.pixels, frame.diagnostics.elapsed);
        frame
    }

    // Zooming in needs more iterations to resolve the boundary, zooming out
    // hands them back. The budget never drops below one.
    pub fn zoom_at(&mut self, px: u32, py: u32, factor: f64) -> Result<(), ConfigError> {
        self.viewport.zoom_at(px, py, self.resolution, factor)?;

        let max_iter = self.config.max_iterations;
        if factor > 1.0 {
            self.config.max_iterations = max_iter.saturating_add(ZOOM_ITERATION_STEP);
        } else if factor < 1.0 {
            self.config.max_iterations = max_iter.saturating_sub(ZOOM_ITERATION_STEP).max(1);
        }

        debug!("Scale changed by {} --- max_iter={}", factor, self.config.max_iterations);
        Ok(())
    }

    pub fn pan(&mut self, dx_pixels: f64, dy_pixels: f64) -> Result<(), ConfigError> {
        self.viewport.pan(dx_pixels, dy_pixels, self.resolution)
    }
}
