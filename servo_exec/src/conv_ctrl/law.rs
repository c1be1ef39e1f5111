//! Convergence laws

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A law giving the desired velocity of the control point from its position and the goal.
pub trait ConvergenceLaw: Send {
    /// Desired control point velocity.
    ///
    /// Units: pixels/second
    fn point_vel(&self, point: &Vector2<f64>, goal: &Vector2<f64>) -> Vector2<f64>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Proportional convergence, `u = k (goal - point)`.
#[derive(Debug, Clone, Copy)]
pub struct PropLaw {
    /// Proportional gain
    pub gain: f64
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ConvergenceLaw for PropLaw {
    fn point_vel(&self, point: &Vector2<f64>, goal: &Vector2<f64>) -> Vector2<f64> {
        (goal - point) * self.gain
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_prop_law() {
        let law = PropLaw { gain: 2.0 };
        let u = law.point_vel(&Vector2::new(1.0, -1.0), &Vector2::new(4.0, 3.0));
        assert_eq!(u, Vector2::new(6.0, 8.0));

        // At the goal there's no demand
        let u = law.point_vel(&Vector2::new(5.0, 5.0), &Vector2::new(5.0, 5.0));
        assert_eq!(u, Vector2::zeros());
    }
}
