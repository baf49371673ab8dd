use mandelbrot_emu::{reference, ConfigError, ExitPolicy, PrecisionMode, RenderConfig, Resolution, Scene, Viewport};
use mandelbrot_emu::numerics::DEFAULT_ESCAPE_RADIUS;
use mandelbrot_emu::scene::{DEFAULT_MAX_ITERATIONS, INIT_RUG_PRECISION};

use rug::{Complex, Float};
use log::{debug, info};

use std::env;

const OVERVIEW_WIDTH: u32 = 96;
const OVERVIEW_HEIGHT: u32 = 64;
const DEEP_ZOOM_ITERATIONS: u32 = 50_000;

// Renders the classic overview at every requested precision, then checks a
// point just outside the cusp at 0.25 that only the emulated representations
// can tell apart from the cusp itself.
pub fn main() -> Result<(), ConfigError> {
    env_logger::init();

    let modes = env::args().skip(1)
        .map(|arg| arg.parse::<PrecisionMode>())
        .collect::<Result<Vec<_>, _>>()?;
    let modes = if modes.is_empty() { PrecisionMode::ALL.to_vec() } else { modes };

    let resolution = Resolution::new(OVERVIEW_WIDTH, OVERVIEW_HEIGHT)?;
    let center = Complex::with_val(INIT_RUG_PRECISION, (-0.75, 0.0));
    let scale = Float::with_val(INIT_RUG_PRECISION, 3.5);
    let viewport = Viewport::from_center(&center, &scale, resolution.aspect(), INIT_RUG_PRECISION)?;

    for &mode in &modes {
        let config = RenderConfig::new(mode, DEFAULT_MAX_ITERATIONS, DEFAULT_ESCAPE_RADIUS, ExitPolicy::EarlyExit)?;
        let mut scene = Scene::new(viewport.clone(), resolution, config)?;
        let frame = scene.render();
        info!("Overview precision={} escaped={}/{} in {:?}",
            mode, frame.diagnostics.escaped, frame.diagnostics.pixels, frame.diagnostics.elapsed);
    }

    deep_zoom_check(&modes)
}

fn deep_zoom_check(modes: &[PrecisionMode]) -> Result<(), ConfigError> {
    let mut re = Float::with_val(INIT_RUG_PRECISION, 1);
    re /= 100_000_000u32;
    re += 0.25;
    let c = Complex::with_val(INIT_RUG_PRECISION, (re, 0.0));

    let threshold = DEFAULT_ESCAPE_RADIUS * DEFAULT_ESCAPE_RADIUS;
    let expected = reference::iterate(&c, DEEP_ZOOM_ITERATIONS, threshold, INIT_RUG_PRECISION);
    info!("Reference at c={} -> {:?}", c.to_string_radix(10, Some(12)), expected);

    // A single pixel centered on c
    let resolution = Resolution::new(1, 1)?;
    let scale = Float::with_val(INIT_RUG_PRECISION, 1e-20);
    let viewport = Viewport::from_center(&c, &scale, 1.0, INIT_RUG_PRECISION)?;

    for &mode in modes {
        let config = RenderConfig::new(mode, DEEP_ZOOM_ITERATIONS, DEFAULT_ESCAPE_RADIUS, ExitPolicy::EarlyExit)?;
        let scene = Scene::new(viewport.clone(), resolution, config)?;
        let result = scene.evaluate(0, 0);
        let escaped = result.has_escaped(DEEP_ZOOM_ITERATIONS);

        let agrees = match expected {
            Some(step) => escaped && result.step(DEEP_ZOOM_ITERATIONS).abs_diff(step) <= 2,
            None => !escaped,
        };
        debug!("Deep zoom precision={} result={:?}", mode, result);
        info!("Deep zoom precision={} step={} escaped={} agrees_with_reference={}",
            mode, result.step(DEEP_ZOOM_ITERATIONS), escaped, agrees);
    }

    Ok(())
}
