use num::{Float, NumCast};
use rand::distributions::uniform::SampleUniform;
use std::{
    fmt::{Debug, Display, LowerExp},
    iter::Sum,
    ops::{AddAssign, SubAssign},
};

/// Floating point type a clustering run is calculated in.
pub trait Primitive: Float + NumCast + SampleUniform + Sum + AddAssign + SubAssign
                + Default + Display + Debug + LowerExp + Sync + Send + 'static
                + for<'a> AddAssign<&'a Self> {
    /// Lossless-enough conversion of a count (cluster sizes, sample counts) into this type.
    fn from_count(cnt: usize) -> Self;
    /// Widen to f64, used for error reporting.
    fn to_f64_lossy(self) -> f64;
}
impl Primitive for f32 {
    #[inline(always)] fn from_count(cnt: usize) -> Self { cnt as f32 }
    #[inline(always)] fn to_f64_lossy(self) -> f64 { self as f64 }
}
impl Primitive for f64 {
    #[inline(always)] fn from_count(cnt: usize) -> Self { cnt as f64 }
    #[inline(always)] fn to_f64_lossy(self) -> f64 { self }
}
