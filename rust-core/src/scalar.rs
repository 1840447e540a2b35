//! Scalar types accepted for hoppings and on-site energies.
//!
//! A simulation picks one of `f32`, `f64`, `Complex<f32>` or `Complex<f64>`
//! and uses it everywhere.

use std::fmt::Debug;
use std::ops::{AddAssign, Mul};

use num_complex::Complex;
use num_traits::Zero;

pub trait Scalar:
    Copy + Debug + Default + PartialEq + Zero + Mul<Output = Self> + AddAssign + Send + Sync + 'static
{
    const IS_COMPLEX: bool;

    /// Lift a real number (geometry factors, moments).
    fn from_real(value: f64) -> Self;

    /// Build from real and imaginary parts; `None` when a real type would
    /// have to drop a nonzero imaginary part.
    fn from_parts(re: f64, im: f64) -> Option<Self>;
}

macro_rules! impl_real_scalar {
    ($t:ty) => {
        impl Scalar for $t {
            const IS_COMPLEX: bool = false;

            #[inline]
            fn from_real(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn from_parts(re: f64, im: f64) -> Option<Self> {
                (im == 0.0).then_some(re as $t)
            }
        }
    };
}

macro_rules! impl_complex_scalar {
    ($t:ty) => {
        impl Scalar for Complex<$t> {
            const IS_COMPLEX: bool = true;

            #[inline]
            fn from_real(value: f64) -> Self {
                Complex::new(value as $t, 0.0)
            }

            #[inline]
            fn from_parts(re: f64, im: f64) -> Option<Self> {
                Some(Complex::new(re as $t, im as $t))
            }
        }
    };
}

impl_real_scalar!(f32);
impl_real_scalar!(f64);
impl_complex_scalar!(f32);
impl_complex_scalar!(f64);
