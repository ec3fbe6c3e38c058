//! The Krasnoselskii–Mann iteration and the history it records.
//!
//! Starting from `x_0`, each step averages the current point with its image:
//!
//! ```text
//! x_{n+1} = alpha * x_n + (1 - alpha) * T(x_n),    0 < alpha < 1
//! ```
//!
//! For a non-expansive `T` with a fixed point the residual `‖x_n - T(x_n)‖`
//! tends to zero. The engine runs a fixed number of steps; it performs no
//! convergence test and no early termination.

use log::{debug, trace};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{KmError, Result};
use crate::mapping::Mapping;
use crate::naming::NameRegistry;

/// Number of iterations used by [`KrasnoselskiiMann::solve_default`].
pub const DEFAULT_ITERATIONS: usize = 10;

/// History of a single run.
///
/// For every `k`, `residuals[k] = ‖points[k] - T(points[k])‖`, and
/// `points[k + 1] = alpha * points[k] + (1 - alpha) * T(points[k])`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Name of the iterator that produced the record.
    pub name: String,
    /// Iterates `x_0, ..., x_n`.
    pub points: Vec<DVector<f64>>,
    /// Residuals `‖x_k - T(x_k)‖`, aligned with `points`.
    pub residuals: Vec<f64>,
    /// Last iterate `x_n`.
    #[serde(rename = "final")]
    pub final_point: DVector<f64>,
}

impl IterationRecord {
    /// Number of steps taken (`points.len() - 1`).
    pub fn iterations(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Dimension of the iterates.
    pub fn dimension(&self) -> usize {
        self.final_point.len()
    }

    /// Residual at the last iterate.
    pub fn final_residual(&self) -> f64 {
        self.residuals.last().copied().unwrap_or(f64::NAN)
    }
}

/// Lifecycle of a [`KrasnoselskiiMann`] instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterationState {
    /// No run has completed yet.
    Idle,
    /// A run is in progress.
    Running,
    /// At least one run has completed and its record is available.
    Complete,
}

/// Krasnoselskii–Mann iterator over a mapping `T`.
#[derive(Clone, Debug)]
pub struct KrasnoselskiiMann<M> {
    alpha: f64,
    mapping: M,
    name: String,
    state: IterationState,
    last_record: Option<IterationRecord>,
}

impl<M: Mapping> KrasnoselskiiMann<M> {
    /// Creates an iterator named from the process-wide [`NameRegistry`].
    ///
    /// Fails with [`KmError::InvalidParameter`] unless `0 < alpha < 1`.
    pub fn new(alpha: f64, mapping: M) -> Result<Self> {
        Self::with_registry(alpha, mapping, NameRegistry::global())
    }

    /// Creates an iterator named from `registry`.
    pub fn with_registry(alpha: f64, mapping: M, registry: &NameRegistry) -> Result<Self> {
        validate_alpha(alpha)?;
        Ok(Self::build(alpha, mapping, registry.next_name()))
    }

    /// Creates an iterator with an explicit name. No registry is consulted.
    pub fn named(alpha: f64, mapping: M, name: impl Into<String>) -> Result<Self> {
        validate_alpha(alpha)?;
        Ok(Self::build(alpha, mapping, name.into()))
    }

    fn build(alpha: f64, mapping: M, name: String) -> Self {
        Self {
            alpha,
            mapping,
            name,
            state: IterationState::Idle,
            last_record: None,
        }
    }

    /// Averaging parameter.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Name carried into every record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mapping being iterated.
    pub fn mapping(&self) -> &M {
        &self.mapping
    }

    /// Current lifecycle state.
    pub fn state(&self) -> IterationState {
        self.state
    }

    /// Record of the most recent successful run.
    pub fn last_record(&self) -> Option<&IterationRecord> {
        self.last_record.as_ref()
    }

    /// Runs [`DEFAULT_ITERATIONS`] steps from `x0`.
    pub fn solve_default(
        &mut self,
        x0: &DVector<f64>,
    ) -> std::result::Result<IterationRecord, M::Error> {
        self.solve(x0, DEFAULT_ITERATIONS)
    }

    /// Runs `n_iter` steps from `x0` and returns the resulting record.
    ///
    /// The record replaces any earlier one. Errors raised by the mapping are
    /// returned unchanged; in that case the previous record and state are kept.
    ///
    /// # Panics
    ///
    /// Panics if the mapping returns a vector whose dimension differs from its input.
    pub fn solve(
        &mut self,
        x0: &DVector<f64>,
        n_iter: usize,
    ) -> std::result::Result<IterationRecord, M::Error> {
        debug!(
            "{}: starting {} iterations with alpha = {}",
            self.name, n_iter, self.alpha
        );
        let previous = self.state;
        self.state = IterationState::Running;

        match self.run(x0, n_iter) {
            Ok(record) => {
                debug!(
                    "{}: finished with residual {:e}",
                    self.name,
                    record.final_residual()
                );
                self.last_record = Some(record.clone());
                self.state = IterationState::Complete;
                Ok(record)
            }
            Err(err) => {
                self.state = previous;
                Err(err)
            }
        }
    }

    fn run(
        &self,
        x0: &DVector<f64>,
        n_iter: usize,
    ) -> std::result::Result<IterationRecord, M::Error> {
        let alpha = self.alpha;
        let mut points = Vec::with_capacity(n_iter + 1);
        let mut residuals = Vec::with_capacity(n_iter + 1);

        // `image` always holds T(current); it is reused for the next step.
        let mut current = x0.clone();
        let mut image = self.mapping.apply(&current)?;
        check_image(&current, &image);
        residuals.push((&current - &image).norm());
        points.push(current.clone());

        for step in 0..n_iter {
            current = &current * alpha + &image * (1.0 - alpha);
            image = self.mapping.apply(&current)?;
            check_image(&current, &image);
            let residual = (&current - &image).norm();
            trace!("{}: step {} residual {:e}", self.name, step + 1, residual);
            residuals.push(residual);
            points.push(current.clone());
        }

        Ok(IterationRecord {
            name: self.name.clone(),
            points,
            residuals,
            final_point: current,
        })
    }
}

fn check_image(x: &DVector<f64>, image: &DVector<f64>) {
    assert_eq!(
        image.len(),
        x.len(),
        "mapping changed the dimension of its input from {} to {}",
        x.len(),
        image.len()
    );
}

fn validate_alpha(alpha: f64) -> Result<()> {
    if alpha > 0.0 && alpha < 1.0 {
        Ok(())
    } else {
        Err(KmError::invalid_parameter("alpha", alpha))
    }
}
