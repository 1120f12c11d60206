// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Miscellaneous helper functions that didn't fit elsewhere.

use crate::misc::type_aliases::{Float, Point3, Vec4};

/// Compute the quotient and remainder of x/y both at the same time.
pub fn div_rem<T>(x: T, y: T) -> (T, T)
where
    T: std::ops::Div<Output = T> + std::ops::Rem<Output = T> + Copy,
{
    (x / y, x % y)
}

/// Nearest integer pixel coordinate of a sub-pixel one.
///
/// Adds 0.5 then truncates toward zero, so that -0.7 is rounded to 0 and not -1.
/// The addition is done in `f64` so that values just below a half pixel,
/// like 0.49999997, are not rounded up. Non-finite values map to `None`.
#[allow(clippy::cast_possible_truncation)]
pub fn round_to_pixel(x: Float) -> Option<i64> {
    let rounded = (f64::from(x) + 0.5).trunc();
    if rounded.is_finite() {
        Some(rounded as i64)
    } else {
        None
    }
}

/// Homogeneous version of a point, with w = 1.
pub fn homogeneous(point: &Point3) -> Vec4 {
    point.to_homogeneous()
}

/// Point and homogeneous point filled with NaN, meaning "no depth".
pub fn nan_point() -> (Point3, Vec4) {
    (
        Point3::new(Float::NAN, Float::NAN, Float::NAN),
        Vec4::repeat(Float::NAN),
    )
}

// TESTS #############################################################

#[cfg(test)]
mod tests {

    use super::*;
    use quickcheck_macros;

    #[test]
    fn rounding_truncates_toward_zero() {
        assert_eq!(Some(0), round_to_pixel(-0.7));
        assert_eq!(Some(0), round_to_pixel(0.49));
        assert_eq!(Some(0), round_to_pixel(0.499_999_97));
        assert_eq!(Some(1), round_to_pixel(0.5));
        assert_eq!(Some(3), round_to_pixel(2.6));
        assert_eq!(None, round_to_pixel(Float::NAN));
        assert_eq!(None, round_to_pixel(Float::INFINITY));
    }

    #[test]
    fn nan_point_is_not_zero() {
        let (xyz, xyzw) = nan_point();
        assert!(xyz.iter().all(|x| x.is_nan()));
        assert!(xyzw.iter().all(|x| x.is_nan()));
    }

    #[quickcheck_macros::quickcheck]
    fn div_rem_recompose(x: u16, y: u16) -> bool {
        let y = y.max(1) as usize;
        let x = x as usize;
        let (q, r) = div_rem(x, y);
        q * y + r == x && r < y
    }

    #[quickcheck_macros::quickcheck]
    fn homogeneous_has_unit_w(x: Float, y: Float, z: Float) -> bool {
        let h = homogeneous(&Point3::new(x, y, z));
        h.w == 1.0 && h.x.to_bits() == x.to_bits() && h.z.to_bits() == z.to_bits()
    }
}
