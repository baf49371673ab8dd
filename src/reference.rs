// Arbitrary precision evaluation of the same recurrence the GPU side runs in
// Df/Qf. Slow, but the ground truth the emulated representations are judged
// against.

use rug::{Assign, Complex, Float};
use log::debug;

// Escape step of c with the early exit convention of escape::iterate:
// Some(step) of the last update applied below the threshold, None when the
// point stays bounded for the whole budget.
pub fn iterate(c: &Complex, max_iterations: u32, escape_radius_squared: f64, prec: u32) -> Option<u32> {
    let mut re = Float::with_val(prec, 0);
    let mut im = Float::with_val(prec, 0);
    let mut re2 = Float::with_val(prec, 0);
    let mut im2 = Float::with_val(prec, 0);
    let mut mag2 = Float::with_val(prec, 0);
    let mut step = 0;

    for i in 0..max_iterations {
        re2.assign(re.square_ref());
        im2.assign(im.square_ref());
        mag2.assign(&re2 + &im2);

        if !(mag2 < escape_radius_squared) {
            debug!("Reference escape for c={} at step={} |z|^2={}", c, step, mag2.to_f64());
            return Some(step);
        }

        // im <- 2 re im + c.im, using the old re
        im *= &re;
        im *= 2;
        im += c.imag();

        // re <- re^2 - im^2 + c.re
        re.assign(&re2 - &im2);
        re += c.real();

        step = i;
    }

    debug!("Reference for c={} stayed bounded for {} iterations", c, max_iterations);
    None
}
