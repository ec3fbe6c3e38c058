//! Non-expansive mappings assembled from a family of ball projections.
//!
//! Given projections `P_1, ..., P_m`, two constructions are supported:
//!
//! - sequential: `T(x) = P_m(P_{m-1}(... P_1(x)))`,
//! - weighted: `T(x) = P_1(Σ_{i=2..m} w_i P_i(x))`.
//!
//! The weighted form is only non-expansive when the weights sum to one. That is
//! an obligation on the caller; the weights are not normalised or rejected.

use log::warn;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{KmError, Result};
use crate::mapping::Mapping;
use crate::projection::{make_projection, BallProjection};

const WEIGHT_SUM_SLACK: f64 = 1e-8;

/// Composite of ball projections, chosen once at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CompositeMapping {
    /// Applies every projection in input order, each consuming the previous result.
    Sequential { projections: Vec<BallProjection> },
    /// Projects the weighted sum of `P_2(x), ..., P_m(x)` with `P_1`.
    Weighted {
        projections: Vec<BallProjection>,
        /// `weights[i]` multiplies `projections[i + 1]`.
        weights: Vec<f64>,
    },
}

impl CompositeMapping {
    /// Projections in the order they were supplied.
    pub fn projections(&self) -> &[BallProjection] {
        match self {
            Self::Sequential { projections } | Self::Weighted { projections, .. } => projections,
        }
    }

    /// Weights of the weighted variant, `None` for the sequential one.
    pub fn weights(&self) -> Option<&[f64]> {
        match self {
            Self::Sequential { .. } => None,
            Self::Weighted { weights, .. } => Some(weights),
        }
    }

    /// Dimension shared by all balls in the family.
    pub fn dimension(&self) -> usize {
        self.projections()
            .first()
            .map(BallProjection::dimension)
            .unwrap_or(0)
    }

    /// Evaluates the composite at `x`.
    pub fn evaluate(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        match self {
            Self::Sequential { projections } => {
                let mut current = x.clone();
                for projection in projections {
                    current = projection.project(&current)?;
                }
                Ok(current)
            }
            Self::Weighted {
                projections,
                weights,
            } => {
                let (first, rest) = projections
                    .split_first()
                    .ok_or_else(|| KmError::dimension_mismatch("ball family", 1, 0))?;
                if weights.len() != rest.len() {
                    return Err(KmError::dimension_mismatch(
                        "weights length",
                        rest.len(),
                        weights.len(),
                    ));
                }
                let mut combined = DVector::zeros(x.len());
                for (projection, weight) in rest.iter().zip(weights) {
                    combined += projection.project(x)? * *weight;
                }
                first.project(&combined)
            }
        }
    }
}

impl Mapping for CompositeMapping {
    type Error = KmError;

    fn apply(&self, x: &DVector<f64>) -> Result<DVector<f64>> {
        self.evaluate(x)
    }
}

/// Builds the composite mapping for the balls `(centers[i], radii[i])`.
///
/// Without `weights` the sequential composite is returned. With `weights`, the
/// slice must hold exactly `centers.len() - 1` entries (for `P_2, ..., P_m`)
/// and the weighted composite is returned. Callers must make the weights sum to
/// one for the result to be non-expansive; debug builds log a warning otherwise.
pub fn make_mapping(
    centers: &[DVector<f64>],
    radii: &[f64],
    weights: Option<&[f64]>,
) -> Result<CompositeMapping> {
    if centers.len() != radii.len() {
        return Err(KmError::dimension_mismatch(
            "radii length",
            centers.len(),
            radii.len(),
        ));
    }
    if centers.is_empty() {
        return Err(KmError::dimension_mismatch("ball family", 1, 0));
    }
    if let Some(weights) = weights {
        if weights.len() != centers.len() - 1 {
            return Err(KmError::dimension_mismatch(
                "weights length",
                centers.len() - 1,
                weights.len(),
            ));
        }
    }

    let dimension = centers[0].len();
    let mut projections = Vec::with_capacity(centers.len());
    for (center, radius) in centers.iter().zip(radii) {
        if center.len() != dimension {
            return Err(KmError::dimension_mismatch(
                "ball centre dimension",
                dimension,
                center.len(),
            ));
        }
        projections.push(make_projection(center.clone(), *radius)?);
    }

    Ok(match weights {
        None => CompositeMapping::Sequential { projections },
        Some(weights) => {
            if cfg!(debug_assertions) {
                let total: f64 = weights.iter().sum();
                if (total - 1.0).abs() > WEIGHT_SUM_SLACK {
                    warn!("composite weights sum to {total}; the mapping may not be non-expansive");
                }
            }
            CompositeMapping::Weighted {
                projections,
                weights: weights.to_vec(),
            }
        }
    })
}
