//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
/// 
/// This function is taken from the std library as num is missing it.
///
/// Due to floating point round-off the result can equal `rhs.abs()` when `lhs` is a very small
/// negative number.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

/// Wrap an angle in radians into the range [0, 2pi).
pub fn wrap_2pi<T>(value: T) -> T
where
    T: Float
{
    let tau_t = match T::from(std::f64::consts::TAU) {
        Some(t) => t,
        None => return value
    };

    let wrapped = rem_euclid(value, tau_t);

    // Round-off can land exactly on tau
    if wrapped >= tau_t {
        T::zero()
    }
    else {
        wrapped
    }
}

/// Return the mean of a set of 2D points.
///
/// If the set is empty `None` is returned.
pub fn centroid<T>(points: &[[T; 2]]) -> Option<[T; 2]>
where
    T: Float
{
    if points.is_empty() {
        return None;
    }

    let mut sum = [T::zero(), T::zero()];
    for p in points {
        sum[0] = sum[0] + p[0];
        sum[1] = sum[1] + p[1];
    }

    let n = T::from(points.len())?;

    Some([sum[0] / n, sum[1] / n])
}
