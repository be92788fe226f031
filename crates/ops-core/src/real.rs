use core::fmt::Debug;

use num_traits::{Bounded, Zero};

/// Real-valued sample type usable as op input, kernel or output.
///
/// Arithmetic inside the ops runs in `f64`. Converting back rounds and
/// saturates for integer types; `NaN` maps to zero.
pub trait RealType: Copy + Send + Sync + PartialOrd + Debug + Zero + Bounded + 'static {
    fn as_f64(self) -> f64;
    fn from_f64(v: f64) -> Self;
}

macro_rules! impl_real_int {
    ($($t:ty),*) => {
        $(
            impl RealType for $t {
                #[inline]
                fn as_f64(self) -> f64 {
                    self as f64
                }

                #[inline]
                fn from_f64(v: f64) -> Self {
                    // `as` saturates out-of-range floats and maps NaN to 0.
                    v.round() as $t
                }
            }
        )*
    };
}

impl_real_int!(u8, u16, i16, i32, u32);

impl RealType for f32 {
    #[inline]
    fn as_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl RealType for f64 {
    #[inline]
    fn as_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::RealType;

    #[test]
    fn integer_conversion_rounds_and_saturates() {
        assert_eq!(u8::from_f64(12.6), 13);
        assert_eq!(u8::from_f64(-4.0), 0);
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(i16::from_f64(-2.5), -3);
        assert_eq!(u16::from_f64(f64::NAN), 0);
        assert_eq!(i32::from_f64(1.0e12), i32::MAX);
    }

    #[test]
    fn float_conversion_is_direct() {
        assert_eq!(f32::from_f64(0.25), 0.25f32);
        assert_eq!(2.5f32.as_f64(), 2.5);
        assert_eq!(f64::from_f64(-1.0e-9), -1.0e-9);
        assert_eq!(200u8.as_f64(), 200.0);
    }
}
