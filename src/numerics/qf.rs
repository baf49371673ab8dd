use super::df::Df;
use super::eft::{renorm, three_sum, three_sum2, two_product, two_sum};

use bytemuck::{Pod, Zeroable};
use rug::Float;

use std::cmp::Ordering;
use std::ops::{Add, Mul, Neg, Sub};

/// Quad-float: a four term non-overlapping expansion of f32 limbs, ordered
/// by decreasing magnitude. Roughly 96 bits of mantissa for the price of
/// plain f32 arithmetic.
///
/// Limbs of a `Qf` held by a caller are always non-overlapping. Arithmetic and
/// the general constructors finish with [`renorm`]; `from_scalar`, `From<Df>`
/// and negation start from limbs that already are.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Pod, Zeroable)]
pub struct Qf(pub [f32; 4]);

impl Qf {
    pub const ZERO: Qf = Qf([0.0; 4]);

    /// Builds from arbitrary limbs, renormalizing them.
    pub fn new(c0: f32, c1: f32, c2: f32, c3: f32) -> Self {
        Qf(renorm(c0, c1, c2, c3, 0.0))
    }

    pub fn from_scalar(x: f32) -> Self {
        Qf([x, 0.0, 0.0, 0.0])
    }

    // Three limbs cover the full 53 bit mantissa, every subtraction below
    // is exact in f64.
    pub fn from_f64(x: f64) -> Self {
        let c0 = x as f32;
        let r = x - c0 as f64;
        let c1 = r as f32;
        let r = r - c1 as f64;
        let c2 = r as f32;
        let r = r - c2 as f64;
        Qf::new(c0, c1, c2, r as f32)
    }

    // Peels four f32 limbs off a Rug Float, each one taken from the residual
    // left by the previous.
    pub fn from_float(x: &Float) -> Self {
        let mut residual = Float::with_val(x.prec(), x);
        let mut limbs = [0.0f32; 4];
        for limb in limbs.iter_mut() {
            *limb = residual.to_f32();
            residual -= *limb as f64;
        }
        Qf::new(limbs[0], limbs[1], limbs[2], limbs[3])
    }

    pub fn to_scalar(self) -> f32 {
        self.0[0] + self.0[1]
    }

    pub fn to_f64(self) -> f64 {
        let [c0, c1, c2, c3] = self.0;
        ((c3 as f64 + c2 as f64) + c1 as f64) + c0 as f64
    }

    /// Limbs 0-1 as a double-float.
    pub fn hi(self) -> Df {
        Df { hi: self.0[0], lo: self.0[1] }
    }

    /// Limbs 2-3 as a double-float.
    pub fn lo(self) -> Df {
        Df { hi: self.0[2], lo: self.0[3] }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match self.hi().compare(&other.hi()) {
            Ordering::Equal => self.lo().compare(&other.lo()),
            ord => ord,
        }
    }
}

impl From<f32> for Qf {
    fn from(x: f32) -> Self {
        Qf::from_scalar(x)
    }
}

impl From<Df> for Qf {
    fn from(x: Df) -> Self {
        Qf([x.hi, x.lo, 0.0, 0.0])
    }
}

impl Neg for Qf {
    type Output = Qf;

    fn neg(self) -> Qf {
        let [c0, c1, c2, c3] = self.0;
        Qf([-c0, -c1, -c2, -c3])
    }
}

// Sloppy addition: limbs are summed pairwise and the error terms folded down,
// which gives up the last few bits of a fully accurate sum when the operands
// cancel, in exchange for far fewer operations.
impl Add for Qf {
    type Output = Qf;

    fn add(self, rhs: Qf) -> Qf {
        let [a0, a1, a2, a3] = self.0;
        let [b0, b1, b2, b3] = rhs.0;

        let (s0, t0) = two_sum(a0, b0);
        let (s1, t1) = two_sum(a1, b1);
        let (s2, t2) = two_sum(a2, b2);
        let (s3, t3) = two_sum(a3, b3);

        let (s1, t0) = two_sum(s1, t0);
        let (s2, t0, t1) = three_sum(s2, t0, t1);
        let (s3, t0) = three_sum2(s3, t0, t2);
        let t0 = t0 + t1 + t3;

        Qf(renorm(s0, s1, s2, s3, t0))
    }
}

impl Sub for Qf {
    type Output = Qf;

    fn sub(self, rhs: Qf) -> Qf {
        self + (-rhs)
    }
}

impl Mul for Qf {
    type Output = Qf;

    fn mul(self, rhs: Qf) -> Qf {
        let [a0, a1, a2, a3] = self.0;
        let [b0, b1, b2, b3] = rhs.0;

        // O(1), O(eps) and O(eps^2) terms, all exact
        let (p0, q0) = two_product(a0, b0);
        let (p1, q1) = two_product(a0, b1);
        let (p2, q2) = two_product(a1, b0);
        let (p3, q3) = two_product(a0, b2);
        let (p4, q4) = two_product(a1, b1);
        let (p5, q5) = two_product(a2, b0);

        let (p1, p2, q0) = three_sum(p1, p2, q0);

        // Six-three sum of p2, q1, q2, p3, p4, p5
        let (p2, q1, q2) = three_sum(p2, q1, q2);
        let (p3, p4, p5) = three_sum(p3, p4, p5);

        // (s0, s1, s2) = (p2, q1, q2) + (p3, p4, p5)
        let (s0, t0) = two_sum(p2, p3);
        let (s1, t1) = two_sum(q1, p4);
        let s2 = q2 + p5;
        let (s1, t0) = two_sum(s1, t0);
        let s2 = s2 + (t0 + t1);

        // O(eps^3) terms only need plain float accuracy
        let s1 = s1 + (a0 * b3 + a1 * b2 + a2 * b1 + a3 * b0 + q0 + q3 + q4 + q5);

        Qf(renorm(p0, p1, s0, s1, s2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(e: i32) -> f32 {
        2f32.powi(e)
    }

    #[test]
    fn scalar_round_trip() {
        for x in [0.0f32, 1.0, -2.5, 3.0e-20, 1.0e30] {
            assert_eq!(Qf::from_scalar(x).to_scalar(), x);
        }
    }

    #[test]
    fn from_f64_is_exact() {
        for x in [0.1f64, -1.0 / 3.0, std::f64::consts::E, 0.25 + 1e-8, 1234.5678e-9] {
            assert_eq!(Qf::from_f64(x).to_f64(), x);
        }
    }

    #[test]
    fn from_float_keeps_more_than_f64() {
        let third = Float::with_val(256, 1) / 3;
        let q = Qf::from_float(&third);

        let mut exact = Float::with_val(256, 0);
        for limb in q.0 {
            exact += limb as f64;
        }
        exact -= &third;
        // Four limbs hold over 90 bits of 1/3
        assert!(exact.to_f64().abs() < 2f64.powi(-90));
    }

    #[test]
    fn add_keeps_tiny_terms() {
        let sum = Qf::from_scalar(1.0) + Qf::from_scalar(p(-70));
        assert_eq!(sum, Qf([1.0, p(-70), 0.0, 0.0]));

        let back = sum - Qf::from_scalar(1.0);
        assert_eq!(back.0[0], p(-70));
    }

    #[test]
    fn mul_square_of_one_plus_eps() {
        let a = Qf([1.0, p(-40), 0.0, 0.0]);
        // (1 + 2^-40)^2 = 1 + 2^-39 + 2^-80
        assert_eq!(a * a, Qf([1.0, p(-39), p(-80), 0.0]));
    }

    #[test]
    fn compare_uses_low_half_on_ties() {
        let a = Qf([1.0, p(-30), p(-60), 0.0]);
        let b = Qf([1.0, p(-30), p(-60), p(-90)]);
        assert_eq!(a.compare(&b), Ordering::Less);
        assert_eq!(b.compare(&a), Ordering::Greater);
        assert_eq!(b.compare(&b), Ordering::Equal);

        let c = Qf([1.0, p(-29), 0.0, 0.0]);
        assert_eq!(b.compare(&c), Ordering::Less);
    }

    #[test]
    fn halves_convert_to_df() {
        let q = Qf([1.0, p(-30), p(-60), p(-90)]);
        assert_eq!(q.hi(), Df { hi: 1.0, lo: p(-30) });
        assert_eq!(q.lo(), Df { hi: p(-60), lo: p(-90) });
        assert_eq!(Qf::from(q.hi()), Qf([1.0, p(-30), 0.0, 0.0]));
    }

    #[test]
    fn construction_without_renorm_is_already_normalized() {
        let d = Df::from_f64(1.0 + 2f64.powi(-30));
        let q = Qf::from(d);
        assert_eq!(q, Qf(renorm(d.hi, d.lo, 0.0, 0.0, 0.0)));

        let s = Qf::from_scalar(-0.375);
        assert_eq!(s, Qf(renorm(-0.375, 0.0, 0.0, 0.0, 0.0)));

        let n = -Qf::from_f64(0.1);
        let [c0, c1, c2, c3] = n.0;
        assert_eq!(n, Qf(renorm(c0, c1, c2, c3, 0.0)));
    }
}

