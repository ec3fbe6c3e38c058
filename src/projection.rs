//! Metric projections onto closed Euclidean balls.

use nalgebra::DVector;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{KmError, Result};
use crate::mapping::Mapping;

/// Nearest-point map onto the closed ball `{y : ‖y - center‖ ≤ radius}`.
///
/// Projections are firmly non-expansive, which makes them the building block for
/// the composite mappings in [`composite`](crate::composite).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BallProjection {
    center: DVector<f64>,
    radius: f64,
}

/// Unvalidated wire form; deserialization goes through [`BallProjection::new`].
#[derive(Deserialize)]
struct RawBall {
    center: DVector<f64>,
    radius: f64,
}

impl<'de> Deserialize<'de> for BallProjection {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawBall::deserialize(deserializer)?;
        Self::new(raw.center, raw.radius).map_err(serde::de::Error::custom)
    }
}

impl BallProjection {
    /// Creates a projection after checking that `radius` is finite and positive.
    pub fn new(center: DVector<f64>, radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(KmError::invalid_parameter("radius", radius));
        }
        Ok(Self { center, radius })
    }

    /// Centre of the ball.
    pub fn center(&self) -> &DVector<f64> {
        &self.center
    }

    /// Radius of the ball.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Dimension of the ambient space.
    pub fn dimension(&self) -> usize {
        self.center.len()
    }

    /// Returns `true` when `x` lies inside or on the ball.
    pub fn contains(&self, x: &DVector<f64>) -> bool {
        x.len() == self.center.len() && (x - &self.center).norm() <= self.radius
    }

    /// Projects `x` onto the ball.
    ///
    /// Points with `‖x - center‖ ≤ radius` are returned unchanged. Since the
    /// radius is strictly positive, a point at the centre always takes that
    /// branch, so the rescaling below never divides by zero.
    pub fn project(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        if x.len() != self.center.len() {
            return Err(KmError::dimension_mismatch(
                "projection input",
                self.center.len(),
                x.len(),
            ));
        }
        let offset = x - &self.center;
        let distance = offset.norm();
        if distance <= self.radius {
            return Ok(x.clone());
        }
        Ok(&self.center + offset * (self.radius / distance))
    }
}

impl Mapping for BallProjection {
    type Error = KmError;

    fn apply(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        self.project(x)
    }
}

/// Builds the projection onto the closed ball with the given `center` and `radius`.
pub fn make_projection(center: DVector<f64>, radius: f64) -> Result<BallProjection> {
    BallProjection::new(center, radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_ball() -> BallProjection {
        make_projection(DVector::from_vec(vec![1.0, 2.0]), 1.5).unwrap()
    }

    #[test]
    fn interior_points_are_fixed() {
        let p = unit_ball();
        let x = DVector::from_vec(vec![1.5, 2.5]);
        assert_eq!(p.project(&x).unwrap(), x);
        assert_eq!(p.project(p.center()).unwrap(), *p.center());
    }

    #[test]
    fn boundary_point_is_fixed() {
        let p = unit_ball();
        let x = DVector::from_vec(vec![2.5, 2.0]);
        assert_eq!(p.project(&x).unwrap(), x);
    }

    #[test]
    fn exterior_point_lands_on_sphere() {
        let p = unit_ball();
        let x = DVector::from_vec(vec![6.0, 2.0]);
        let y = p.project(&x).unwrap();
        assert_relative_eq!(y, DVector::from_vec(vec![2.5, 2.0]), epsilon = 1e-12);
        assert_relative_eq!((&y - p.center()).norm(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn rejects_non_positive_radius() {
        let center = DVector::zeros(2);
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = make_projection(center.clone(), radius);
            assert!(matches!(
                result,
                Err(KmError::InvalidParameter { name: "radius", .. })
            ));
        }
    }

    #[test]
    fn rejects_wrong_dimension() {
        let p = unit_ball();
        let result = p.project(&DVector::zeros(3));
        assert!(matches!(
            result,
            Err(KmError::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
        assert!(!p.contains(&DVector::zeros(3)));
    }

    #[test]
    fn deserialization_validates_radius() {
        let mut value = serde_json::to_value(unit_ball()).unwrap();
        let decoded: BallProjection = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(decoded, unit_ball());

        for radius in [0.0, -1.0] {
            value["radius"] = serde_json::json!(radius);
            let result = serde_json::from_value::<BallProjection>(value.clone());
            let err = result.unwrap_err().to_string();
            assert!(err.contains("radius"), "unexpected error: {err}");
        }
    }
}
