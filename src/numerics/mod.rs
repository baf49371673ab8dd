pub mod df;
pub mod eft;
pub mod qf;

pub use df::Df;
pub use qf::Qf;

use crate::error::ConfigError;

use rug::{Complex, Float};

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ESCAPE_RADIUS: f64 = 2.0;

/// The arithmetic surface shared by every real-number representation the
/// escape-time iterator can run on.
///
/// All operations are total: infinities and NaNs propagate as the underlying
/// f32 arithmetic produces them, nothing panics or traps.
pub trait Real: Copy + fmt::Debug + Send + Sync + 'static {
    /// Number of f32 limbs a value occupies on the GPU. f64 never goes there,
    /// it reports the two limbs of the double-float that carries it instead.
    const LIMBS: usize;

    fn from_scalar(x: f32) -> Self;
    fn from_f64(x: f64) -> Self;
    fn from_float(x: &Float) -> Self;

    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    fn compare(&self, other: &Self) -> Ordering;

    fn to_scalar(self) -> f32;
    fn to_f64(self) -> f64;
}

// Same NaN rule as the Df/Qf compare: NaN sorts above everything.
fn compare_native<T: PartialOrd>(a: T, b: T) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a == b {
        Ordering::Equal
    } else {
        Ordering::Greater
    }
}

impl Real for f32 {
    const LIMBS: usize = 1;

    fn from_scalar(x: f32) -> Self {
        x
    }

    fn from_f64(x: f64) -> Self {
        x as f32
    }

    fn from_float(x: &Float) -> Self {
        x.to_f32()
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }

    fn compare(&self, other: &Self) -> Ordering {
        compare_native(*self, *other)
    }

    fn to_scalar(self) -> f32 {
        self
    }

    fn to_f64(self) -> f64 {
        self as f64
    }
}

// Wide native type, only used as a cheap CPU reference.
impl Real for f64 {
    // Same slot count as Df, the representation a shader would use for it
    const LIMBS: usize = 2;

    fn from_scalar(x: f32) -> Self {
        x as f64
    }

    fn from_f64(x: f64) -> Self {
        x
    }

    fn from_float(x: &Float) -> Self {
        x.to_f64()
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }

    fn compare(&self, other: &Self) -> Ordering {
        compare_native(*self, *other)
    }

    fn to_scalar(self) -> f32 {
        self as f32
    }

    fn to_f64(self) -> f64 {
        self
    }
}

impl Real for Df {
    const LIMBS: usize = 2;

    fn from_scalar(x: f32) -> Self {
        Df::from_scalar(x)
    }

    fn from_f64(x: f64) -> Self {
        Df::from_f64(x)
    }

    fn from_float(x: &Float) -> Self {
        Df::from_float(x)
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }

    fn compare(&self, other: &Self) -> Ordering {
        Df::compare(self, other)
    }

    fn to_scalar(self) -> f32 {
        Df::to_scalar(self)
    }

    fn to_f64(self) -> f64 {
        Df::to_f64(self)
    }
}

impl Real for Qf {
    const LIMBS: usize = 4;

    fn from_scalar(x: f32) -> Self {
        Qf::from_scalar(x)
    }

    fn from_f64(x: f64) -> Self {
        Qf::from_f64(x)
    }

    fn from_float(x: &Float) -> Self {
        Qf::from_float(x)
    }

    fn add(self, rhs: Self) -> Self {
        self + rhs
    }

    fn sub(self, rhs: Self) -> Self {
        self - rhs
    }

    fn mul(self, rhs: Self) -> Self {
        self * rhs
    }

    fn compare(&self, other: &Self) -> Ordering {
        Qf::compare(self, other)
    }

    fn to_scalar(self) -> f32 {
        Qf::to_scalar(self)
    }

    fn to_f64(self) -> f64 {
        Qf::to_f64(self)
    }
}

/// A point of the complex plane in one representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComplexCoord<R> {
    pub re: R,
    pub im: R,
}

pub type ComplexDf = ComplexCoord<Df>;
pub type ComplexQf = ComplexCoord<Qf>;

impl<R: Real> ComplexCoord<R> {
    pub fn new(re: R, im: R) -> Self {
        Self { re, im }
    }

    pub fn from_f64(re: f64, im: f64) -> Self {
        Self { re: R::from_f64(re), im: R::from_f64(im) }
    }

    pub fn from_complex(c: &Complex) -> Self {
        Self { re: R::from_float(c.real()), im: R::from_float(c.imag()) }
    }

    // Length through a native f64 conversion, only good enough for coloring
    pub fn norm_f64(&self) -> f64 {
        self.re.to_f64().hypot(self.im.to_f64())
    }
}

/// Which representation a frame is evaluated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrecisionMode {
    Native,
    DoubleSingle,
    QuadSingle,
}

impl PrecisionMode {
    pub const ALL: [PrecisionMode; 3] =
        [PrecisionMode::Native, PrecisionMode::DoubleSingle, PrecisionMode::QuadSingle];

    pub fn limbs(self) -> usize {
        match self {
            PrecisionMode::Native => <f32 as Real>::LIMBS,
            PrecisionMode::DoubleSingle => Df::LIMBS,
            PrecisionMode::QuadSingle => Qf::LIMBS,
        }
    }
}

impl fmt::Display for PrecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrecisionMode::Native => "native",
            PrecisionMode::DoubleSingle => "ds",
            PrecisionMode::QuadSingle => "qs",
        };
        f.write_str(name)
    }
}

impl FromStr for PrecisionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "f32" => Ok(PrecisionMode::Native),
            "ds" | "double-single" | "df" => Ok(PrecisionMode::DoubleSingle),
            "qs" | "quad-single" | "qf" => Ok(PrecisionMode::QuadSingle),
            _ => Err(ConfigError::UnknownPrecision(s.to_string())),
        }
    }
}
