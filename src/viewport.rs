use super::error::ConfigError;
use super::numerics::{ComplexCoord, Real};

use rug::{Complex, Float};
use log::debug;

/// Pixel dimensions of a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Resolution {
    width: u32,
    height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroResolution(width, height));
        }
        Ok(Resolution { width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Rectangle of the complex plane held in arbitrary precision, so a deep zoom
/// never loses the position the GPU representations are later rounded from.
///
/// Row 0 of a frame maps to `im_min`, matching a bottom-up GL framebuffer.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    re_min: Float,
    im_min: Float,
    re_max: Float,
    im_max: Float,
    prec: u32,
}

impl Viewport {
    pub fn new(re_min: Float, im_min: Float, re_max: Float, im_max: Float, prec: u32) -> Result<Self, ConfigError> {
        let vp = Viewport {
            re_min: Float::with_val(prec, re_min),
            im_min: Float::with_val(prec, im_min),
            re_max: Float::with_val(prec, re_max),
            im_max: Float::with_val(prec, im_max),
            prec,
        };
        vp.validate()?;
        Ok(vp)
    }

    // Camera style construction: `scale` is the visible height, the width
    // follows from the aspect ratio.
    pub fn from_center(center: &Complex, scale: &Float, aspect: f64, prec: u32) -> Result<Self, ConfigError> {
        let half_h = Float::with_val(prec, scale / 2u32);
        let mut half_w = Float::with_val(prec, scale * aspect);
        half_w /= 2u32;

        Viewport::new(
            Float::with_val(prec, center.real() - &half_w),
            Float::with_val(prec, center.imag() - &half_h),
            Float::with_val(prec, center.real() + &half_w),
            Float::with_val(prec, center.imag() + &half_h),
            prec,
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let finite = self.re_min.is_finite() && self.im_min.is_finite()
            && self.re_max.is_finite() && self.im_max.is_finite();

        if !finite || !(self.re_min < self.re_max) || !(self.im_min < self.im_max) {
            return Err(ConfigError::EmptyViewport(
                self.re_min.to_f64(), self.re_max.to_f64(),
                self.im_min.to_f64(), self.im_max.to_f64(),
            ));
        }
        Ok(())
    }

    pub fn re_min(&self) -> &Float {
        &self.re_min
    }

    pub fn im_min(&self) -> &Float {
        &self.im_min
    }

    pub fn re_max(&self) -> &Float {
        &self.re_max
    }

    pub fn im_max(&self) -> &Float {
        &self.im_max
    }

    pub fn prec(&self) -> u32 {
        self.prec
    }

    pub fn width(&self) -> Float {
        Float::with_val(self.prec, &self.re_max - &self.re_min)
    }

    pub fn height(&self) -> Float {
        Float::with_val(self.prec, &self.im_max - &self.im_min)
    }

    pub fn center(&self) -> Complex {
        let mut re = Float::with_val(self.prec, &self.re_min + &self.re_max);
        let mut im = Float::with_val(self.prec, &self.im_min + &self.im_max);
        re /= 2u32;
        im /= 2u32;
        Complex::with_val(self.prec, (re, im))
    }

    /// Complex value at the center of pixel (px, py).
    pub fn pixel_to_complex(&self, px: u32, py: u32, resolution: Resolution) -> Complex {
        let re = lerp(&self.re_min, &self.re_max, px, resolution.width, self.prec);
        let im = lerp(&self.im_min, &self.im_max, py, resolution.height, self.prec);
        Complex::with_val(self.prec, (re, im))
    }

    /// Pixel center rounded into the representation the iterator runs on.
    pub fn coordinate<R: Real>(&self, px: u32, py: u32, resolution: Resolution) -> ComplexCoord<R> {
        ComplexCoord::from_complex(&self.pixel_to_complex(px, py, resolution))
    }

    // Shrinks the rectangle by `factor` (grows it for factor < 1) around the
    // center of pixel (px, py), which maps to the same complex value after.
    pub fn zoom_at(&mut self, px: u32, py: u32, resolution: Resolution, factor: f64) -> Result<(), ConfigError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ConfigError::InvalidZoomFactor(factor));
        }

        let anchor = self.pixel_to_complex(px, py, resolution);
        let (re, im) = anchor.into_real_imag();

        let mut zoomed = self.clone();
        zoomed.re_min = toward(&re, &self.re_min, factor, self.prec);
        zoomed.re_max = toward(&re, &self.re_max, factor, self.prec);
        zoomed.im_min = toward(&im, &self.im_min, factor, self.prec);
        zoomed.im_max = toward(&im, &self.im_max, factor, self.prec);

        // Zooming out far enough to overflow leaves the old view in place
        zoomed.validate()?;
        *self = zoomed;

        debug!("Viewport zoomed by {} at ({}, {}) --- width={}",
            factor, px, py, self.width().to_string_radix(10, Some(8)));
        Ok(())
    }

    /// Translates the rectangle by (dx, dy) pixels of the given resolution.
    pub fn pan(
        &mut self,
        dx_pixels: f64,
        dy_pixels: f64,
        resolution: Resolution,
    ) -> Result<(), ConfigError> {
        if !dx_pixels.is_finite() || !dy_pixels.is_finite() {
            return Err(ConfigError::InvalidPanOffset(dx_pixels, dy_pixels));
        }

        let mut dx = self.width();
        dx *= dx_pixels;
        dx /= resolution.width;

        let mut dy = self.height();
        dy *= dy_pixels;
        dy /= resolution.height;

        let mut panned = self.clone();
        panned.re_min += &dx;
        panned.re_max += &dx;
        panned.im_min += &dy;
        panned.im_max += &dy;

        // A shift that swallows the width at this precision leaves the old view
        panned.validate()?;
        *self = panned;

        debug!("Viewport panned by ({}, {}) pixels --- center={}",
            dx_pixels, dy_pixels, self.center().to_string_radix(10, Some(20)));
        Ok(())
    }
}

// min + ((p + 0.5) / size) * (max - min)
fn lerp(min: &Float, max: &Float, p: u32, size: u32, prec: u32) -> Float {
    let mut t = Float::with_val(prec, p);
    t += 0.5;
    t /= size;
    t *= Float::with_val(prec, max - min);
    t += min;
    t
}

// anchor + (edge - anchor) / factor
fn toward(anchor: &Float, edge: &Float, factor: f64, prec: u32) -> Float {
    let mut d = Float::with_val(prec, edge - anchor);
    d /= factor;
    d += anchor;
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerics::Qf;

    const PREC: u32 = 128;

    fn fl(x: f64) -> Float {
        Float::with_val(PREC, x)
    }

    fn rect(re_min: f64, im_min: f64, re_max: f64, im_max: f64) -> Result<Viewport, ConfigError> {
        Viewport::new(fl(re_min), fl(im_min), fl(re_max), fl(im_max), PREC)
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(Resolution::new(0, 10), Err(ConfigError::ZeroResolution(0, 10)));
        assert!(Resolution::new(10, 0).is_err());

        assert!(rect(1.0, 0.0, 0.0, 1.0).is_err());
        assert!(rect(0.0, 0.0, 1.0, 0.0).is_err());
        assert!(rect(f64::NAN, 0.0, 1.0, 1.0).is_err());
        assert!(rect(0.0, 0.0, f64::INFINITY, 1.0).is_err());
        assert!(rect(0.0, 0.0, 1.0, 1.0).is_ok());
    }

    #[test]
    fn pixel_centers() {
        let vp = rect(0.0, 0.0, 4.0, 2.0).unwrap();
        let res = Resolution::new(4, 2).unwrap();

        let c = vp.pixel_to_complex(0, 0, res);
        assert_eq!(*c.real(), 0.5);
        assert_eq!(*c.imag(), 0.5);

        let c = vp.pixel_to_complex(3, 1, res);
        assert_eq!(*c.real(), 3.5);
        assert_eq!(*c.imag(), 1.5);
    }

    #[test]
    fn center_and_scale() {
        let center = Complex::with_val(PREC, (-0.75, 0.0));
        let vp = Viewport::from_center(&center, &fl(3.5), 2.0, PREC).unwrap();
        assert_eq!(*vp.re_min(), -4.25);
        assert_eq!(*vp.re_max(), 2.75);
        assert_eq!(*vp.im_min(), -1.75);
        assert_eq!(*vp.im_max(), 1.75);
        assert_eq!(vp.center(), center);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vp = rect(-2.0, -2.0, 2.0, 2.0).unwrap();
        let res = Resolution::new(8, 8).unwrap();
        let before = vp.pixel_to_complex(5, 2, res);

        vp.zoom_at(5, 2, res, 2.0).unwrap();
        assert_eq!(vp.pixel_to_complex(5, 2, res), before);
        assert_eq!(vp.width(), 2.0);
        assert_eq!(vp.height(), 2.0);

        vp.zoom_at(5, 2, res, 0.5).unwrap();
        assert_eq!(vp, rect(-2.0, -2.0, 2.0, 2.0).unwrap());

        assert!(vp.zoom_at(0, 0, res, 0.0).is_err());
        assert!(vp.zoom_at(0, 0, res, f64::NAN).is_err());
    }

    #[test]
    fn pan_by_pixels() {
        let mut vp = rect(0.0, 0.0, 4.0, 2.0).unwrap();
        let res = Resolution::new(4, 2).unwrap();
        vp.pan(1.0, -1.0, res).unwrap();
        assert_eq!(vp, rect(1.0, -1.0, 5.0, 1.0).unwrap());
    }

    #[test]
    fn pan_rejects_non_finite_offsets() {
        let mut vp = rect(0.0, 0.0, 4.0, 2.0).unwrap();
        let res = Resolution::new(4, 2).unwrap();
        let before = vp.clone();

        assert!(matches!(vp.pan(f64::NAN, 0.0, res), Err(ConfigError::InvalidPanOffset(..))));
        assert!(matches!(vp.pan(0.0, f64::INFINITY, res), Err(ConfigError::InvalidPanOffset(..))));
        assert!(matches!(vp.pan(f64::NEG_INFINITY, 1.0, res), Err(ConfigError::InvalidPanOffset(..))));

        // At 128 bits a shift of 1e60 rounds both edges to the same value
        assert!(matches!(vp.pan(1e60, 0.0, res), Err(ConfigError::EmptyViewport(..))));
        assert_eq!(vp, before);

        // Still a usable view afterwards
        let c = vp.pixel_to_complex(0, 0, res);
        assert_eq!(*c.real(), 0.5);
        assert_eq!(*c.imag(), 0.5);
    }

    #[test]
    fn coordinate_keeps_precision_the_native_float_drops() {
        // 1e-8 is below half an f32 ulp of 0.25
        let mut re = fl(1.0);
        re /= 100_000_000u32;
        re += 0.25;
        let center = Complex::with_val(PREC, (re, 0.0));
        let vp = Viewport::from_center(&center, &fl(1e-12), 1.0, PREC).unwrap();
        let res = Resolution::new(1, 1).unwrap();

        let native = vp.coordinate::<f32>(0, 0, res);
        assert_eq!(native.re, 0.25);

        let quad = vp.coordinate::<Qf>(0, 0, res);
        assert!((quad.re.to_f64() - (0.25 + 1e-8)).abs() < 1e-16);
        assert!(quad.re.to_f64() > 0.25);
    }
}
