// Error-free transformations on f32, the building blocks of the Df and Qf
// expansions. Every function here only uses f32 operations, so the exact same
// sequence can be lowered into a shader without f64 or fma support.
//
// Naming and algorithms follow Hida, Li & Bailey's QD library, scaled down
// from a 53 bit to a 24 bit mantissa.

// Veltkamp splitter for a 24 bit mantissa: 2^ceil(24/2) + 1.
// Each half of a split f32 carries at most 12 significant bits, so the
// product of any two halves fits in an f32 without rounding.
pub const SPLITTER: f32 = 4097.0;

// Sum with exact error, requires |a| >= |b| (or a == 0).
#[inline]
pub fn quick_two_sum(a: f32, b: f32) -> (f32, f32) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

// Knuth's branch free two-sum, no ordering precondition.
#[inline]
pub fn two_sum(a: f32, b: f32) -> (f32, f32) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

// Same as two_sum but for a - b
#[inline]
pub fn two_diff(a: f32, b: f32) -> (f32, f32) {
    let s = a - b;
    let bb = s - a;
    let e = (a - (s - bb)) - (b + bb);
    (s, e)
}

/// Splits `a` into `(hi, lo)` with `hi + lo == a` exactly and each half
/// holding no more than 12 significant bits.
///
/// Overflows for |a| above roughly 2^115, the caller keeps inputs bounded.
#[inline]
pub fn split(a: f32) -> (f32, f32) {
    let t = SPLITTER * a;
    let hi = t - (t - a);
    let lo = a - hi;
    (hi, lo)
}

/// Product with exact error: `p + e == a * b` in infinite precision.
#[inline]
pub fn two_product(a: f32, b: f32) -> (f32, f32) {
    let p = a * b;
    let (a_hi, a_lo) = split(a);
    let (b_hi, b_lo) = split(b);
    let e = ((a_hi * b_hi - p) + a_hi * b_lo + a_lo * b_hi) + a_lo * b_lo;
    (p, e)
}

// Exact square, saves one split over two_product(a, a)
#[inline]
pub fn two_square(a: f32) -> (f32, f32) {
    let p = a * a;
    let (hi, lo) = split(a);
    let e = ((hi * hi - p) + 2.0 * hi * lo) + lo * lo;
    (p, e)
}

// Reduces three terms to a three term expansion with the same exact sum.
#[inline]
pub fn three_sum(a: f32, b: f32, c: f32) -> (f32, f32, f32) {
    let (t1, t2) = two_sum(a, b);
    let (a, t3) = two_sum(c, t1);
    let (b, c) = two_sum(t2, t3);
    (a, b, c)
}

// Like three_sum but only keeps two terms, the third is folded into the
// second with a plain add.
#[inline]
pub fn three_sum2(a: f32, b: f32, c: f32) -> (f32, f32) {
    let (t1, t2) = two_sum(a, b);
    let (a, t3) = two_sum(c, t1);
    (a, t2 + t3)
}

/// Renormalizes a five term, possibly overlapping, expansion into four
/// non-overlapping terms of decreasing magnitude.
///
/// The first pass carries from `c4` upward. The second pass compacts downward:
/// whenever an error term comes out exactly zero the next input is folded
/// into the same slot instead of opening a new one. Only the very last fold
/// (`s3 + c4` on the fully populated path) is a rounded addition, every other
/// branch keeps the sum exact.
pub fn renorm(c0: f32, c1: f32, c2: f32, c3: f32, c4: f32) -> [f32; 4] {
    if c0.is_infinite() {
        return [c0, c1, c2, c3];
    }

    let (s, c4) = quick_two_sum(c3, c4);
    let (s, c3) = quick_two_sum(c2, s);
    let (s, c2) = quick_two_sum(c1, s);
    let (c0, c1) = quick_two_sum(c0, s);

    let mut s2 = 0.0;
    let mut s3 = 0.0;

    let (mut s0, mut s1) = quick_two_sum(c0, c1);
    if s1 != 0.0 {
        (s1, s2) = quick_two_sum(s1, c2);
        if s2 != 0.0 {
            (s2, s3) = quick_two_sum(s2, c3);
            if s3 != 0.0 {
                s3 += c4;
            } else {
                (s2, s3) = quick_two_sum(s2, c4);
            }
        } else {
            (s1, s2) = quick_two_sum(s1, c3);
            if s2 != 0.0 {
                (s2, s3) = quick_two_sum(s2, c4);
            } else {
                (s1, s2) = quick_two_sum(s1, c4);
            }
        }
    } else {
        (s0, s1) = quick_two_sum(s0, c2);
        if s1 != 0.0 {
            (s1, s2) = quick_two_sum(s1, c3);
            if s2 != 0.0 {
                (s2, s3) = quick_two_sum(s2, c4);
            } else {
                (s1, s2) = quick_two_sum(s1, c4);
            }
        } else {
            (s0, s1) = quick_two_sum(s0, c3);
            if s1 != 0.0 {
                (s1, s2) = quick_two_sum(s1, c4);
            } else {
                (s0, s1) = quick_two_sum(s0, c4);
            }
        }
    }

    [s0, s1, s2, s3]
}
