//! Utilities to approximate equality of floating point values.
//!
//! Backward passes are compared against finite differences and closed forms,
//! which never agree bit for bit. These helpers grade how close two values are.

/// The max epsilon accepted on `f64`s.
pub const F64_MAX_ERROR: f64 = 1e-3;

/// The expected minimum epsilon accepted on `f64`s.
pub const F64_AVG_ERROR: f64 = 1e-6;

/// The best expected epsilon accepted on `f64`s.
pub const F64_MIN_ERROR: f64 = 1e-13;

/// The approximated equality enumerated.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ApproxEquality {
    /// Within [`F64_MIN_ERROR`].
    Precise = 0,

    /// Within [`F64_AVG_ERROR`].
    Partial = 1,

    /// Within [`F64_MAX_ERROR`].
    Relative = 2,

    /// No relative equality.
    Scarce = 3,
}

/// Checks the distance between values.
pub trait RelativeEq<Rhs: ?Sized = Self> {
    /// Grades the equality of `self` and `rhs`.
    fn approx_eq(&self, rhs: &Rhs) -> ApproxEquality;

    /// Whether every compared value is within `epsilon`.
    fn within(&self, rhs: &Rhs, epsilon: f64) -> bool;
}

impl RelativeEq for f64 {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        let dif = (self - rhs).abs();

        if dif < F64_MIN_ERROR {
            ApproxEquality::Precise
        } else if dif < F64_AVG_ERROR {
            ApproxEquality::Partial
        } else if dif < F64_MAX_ERROR {
            ApproxEquality::Relative
        } else {
            ApproxEquality::Scarce
        }
    }

    fn within(&self, rhs: &Self, epsilon: f64) -> bool {
        (self - rhs).abs() <= epsilon
    }
}

impl RelativeEq for [f64] {
    fn approx_eq(&self, rhs: &Self) -> ApproxEquality {
        if self.len() != rhs.len() {
            return ApproxEquality::Scarce;
        }
        // the slice is only as close as its worst element
        self.iter()
            .zip(rhs)
            .map(|(a, b)| a.approx_eq(b))
            .max()
            .unwrap_or(ApproxEquality::Precise)
    }

    fn within(&self, rhs: &Self, epsilon: f64) -> bool {
        self.len() == rhs.len() && self.iter().zip(rhs).all(|(a, b)| a.within(b, epsilon))
    }
}

/// Approximates equality: true only for [`ApproxEquality::Precise`].
pub fn approx_eq<A: RelativeEq<B> + ?Sized, B: ?Sized>(a: &A, b: &B) -> bool {
    a.approx_eq(b) == ApproxEquality::Precise
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grades_scalar_distance() {
        assert_eq!(1.0_f64.approx_eq(&1.0), ApproxEquality::Precise);
        assert_eq!(1.0_f64.approx_eq(&1.000_000_1), ApproxEquality::Partial);
        assert_eq!(1.0_f64.approx_eq(&1.0001), ApproxEquality::Relative);
        assert_eq!(1.0_f64.approx_eq(&1.1), ApproxEquality::Scarce);
    }

    #[test]
    fn slices_take_worst_grade() {
        let a: [f64; 3] = [1.0, 2.0, 3.0];
        let b: [f64; 3] = [1.0, 2.0001, 3.0];
        assert_eq!(a[..].approx_eq(&b[..]), ApproxEquality::Relative);
        assert!(!approx_eq(&a[..], &b[..]));
        assert!(a[..].within(&b[..], 1e-3));
        assert_eq!(a[..].approx_eq(&a[..2]), ApproxEquality::Scarce);
    }
}
