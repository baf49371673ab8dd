use super::eft::{quick_two_sum, two_product};

use bytemuck::{Pod, Zeroable};
use rug::Float;

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

// Double-float, which is our 'bypass' of a GPU's lack of f64.
// On that note, using two floats in this way is far more robust
// accross a wider set of GPUs. While not giving 53 bits of precision,
// this can theoreticly give us up to 48 bits - i.e. 24+24 as f32
// has 24 bits.
//
// Invariant: the value is exactly hi + lo, with |lo| <= ulp(hi) / 2.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Pod, Zeroable)]
pub struct Df {
    pub hi: f32,
    pub lo: f32,
}

impl Df {
    pub const ZERO: Df = Df { hi: 0.0, lo: 0.0 };

    pub fn from_scalar(x: f32) -> Self {
        Self { hi: x, lo: 0.0 }
    }

    // Keeps the leading 48 of the 53 f64 mantissa bits.
    pub fn from_f64(x: f64) -> Self {
        let hi = x as f32;
        let lo = (x - hi as f64) as f32;
        Self { hi, lo }
    }

    // Convert a Rug Float to double-float.
    // First rounds the arbitary precision to fit into an f32, and then
    // preserves what's lost with that rounding in a second f32.
    pub fn from_float(x: &Float) -> Self {
        let hi = x.to_f32();

        // residual = x - hi
        let mut residual = Float::with_val(x.prec(), x);
        residual -= hi as f64;

        Self { hi, lo: residual.to_f32() }
    }

    pub fn to_scalar(self) -> f32 {
        self.hi + self.lo
    }

    pub fn to_f64(self) -> f64 {
        self.hi as f64 + self.lo as f64
    }

    // Lexicographic on (hi, lo). A NaN high limb compares Greater, which makes
    // a NaN magnitude count as escaped.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.hi < other.hi {
            Ordering::Less
        } else if self.hi == other.hi {
            if self.lo < other.lo {
                Ordering::Less
            } else if self.lo == other.lo {
                Ordering::Equal
            } else {
                Ordering::Greater
            }
        } else {
            Ordering::Greater
        }
    }
}

impl From<f32> for Df {
    fn from(x: f32) -> Self {
        Df::from_scalar(x)
    }
}

impl Neg for Df {
    type Output = Df;

    fn neg(self) -> Df {
        Df { hi: -self.hi, lo: -self.lo }
    }
}

// Emulation based on D.H. Bailey's Fortran-90 double-single package.
// The rounding error of the high limb sum is recovered exactly, folded in with
// both low limbs and renormalized with one final quick_two_sum.
impl Add for Df {
    type Output = Df;

    fn add(self, rhs: Df) -> Df {
        let t1 = self.hi + rhs.hi;
        let e = t1 - self.hi;
        let t2 = ((rhs.hi - e) + (self.hi - (t1 - e))) + self.lo + rhs.lo;

        let (hi, lo) = quick_two_sum(t1, t2);
        Df { hi, lo }
    }
}

impl Sub for Df {
    type Output = Df;

    fn sub(self, rhs: Df) -> Df {
        let t1 = self.hi - rhs.hi;
        let e = t1 - self.hi;
        let t2 = ((-rhs.hi - e) + (self.hi - (t1 - e))) + self.lo - rhs.lo;

        let (hi, lo) = quick_two_sum(t1, t2);
        Df { hi, lo }
    }
}

impl Mul for Df {
    type Output = Df;

    fn mul(self, rhs: Df) -> Df {
        // Exact product of the high limbs via the split pieces
        let (c11, c21) = two_product(self.hi, rhs.hi);

        // Cross terms
        let c2 = self.hi * rhs.lo + self.lo * rhs.hi;

        let t1 = c11 + c2;
        let e = t1 - c11;
        let t2 = self.lo * rhs.lo + ((c2 - e) + (c11 - (t1 - e))) + c21;

        let (hi, lo) = quick_two_sum(t1, t2);
        Df { hi, lo }
    }
}
