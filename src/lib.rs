//! Krasnoselskii–Mann fixed-point iteration for non-expansive mappings.
//!
//! Given a non-expansive mapping `T` and a parameter `0 < alpha < 1`, the
//! Krasnoselskii–Mann (KM) scheme
//!
//! ```text
//! x_{n+1} = alpha * x_n + (1 - alpha) * T(x_n)
//! ```
//!
//! approaches a fixed point of `T` whenever one exists. This crate offers tools to
//!
//! - build metric projections onto closed balls (`projection` module),
//! - combine a family of projections into one mapping (`composite` module),
//! - run the KM iteration and record its history (`iteration` module), and
//! - render trajectories and residual decay as SVG (`plot` module).
//!
//! Mappings are anything implementing [`Mapping`]; closures can be adapted with
//! [`mapping::from_fn`] and [`mapping::try_from_fn`].
//!
//! # Quick start
//!
//! ```no_run
//! use kmfix::{make_mapping, KrasnoselskiiMann};
//! use kmfix::plot::{show_residuals, PlotConfig, PlotTarget};
//! use nalgebra::DVector;
//!
//! let centers = vec![
//!     DVector::from_vec(vec![1.0, 2.0]),
//!     DVector::from_vec(vec![0.0, 3.0]),
//! ];
//! let radii = [1.5, 1.0];
//!
//! let mapping = make_mapping(&centers, &radii, None).expect("consistent ball family");
//! let mut km = KrasnoselskiiMann::new(0.5, mapping).expect("alpha in (0, 1)");
//!
//! let record = km
//!     .solve(&DVector::from_vec(vec![6.0, 4.0]), 30)
//!     .expect("projections of 2-D points");
//! println!("{} -> {:?}", record.name, record.final_point);
//!
//! show_residuals(&[record], &PlotTarget::directory("."), &PlotConfig::default())
//!     .expect("writable directory");
//! ```
//!
//! The iteration performs no convergence test: it always runs the requested
//! number of steps. Non-expansiveness of the mapping is never verified.

pub mod composite;
pub mod error;
pub mod iteration;
pub mod mapping;
pub mod naming;
pub mod plot;
pub mod projection;

pub use composite::{make_mapping, CompositeMapping};
pub use error::{KmError, Result};
pub use iteration::{IterationRecord, IterationState, KrasnoselskiiMann, DEFAULT_ITERATIONS};
pub use mapping::Mapping;
pub use naming::NameRegistry;
pub use projection::{make_projection, BallProjection};
