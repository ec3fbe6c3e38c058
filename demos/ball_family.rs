//! Runs the four-ball scenario with both composite mappings and two values of
//! alpha, then plots the trajectories and residuals.
//!
//! ```text
//! cargo run --example ball_family -- <output-dir>
//! ```
//!
//! Without an output directory the SVG documents are printed to stdout.

use std::error::Error;
use std::path::PathBuf;

use kmfix::plot::{show_residuals, show_result_2d, PlotConfig, PlotTarget};
use kmfix::{make_mapping, KrasnoselskiiMann};
use nalgebra::DVector;

fn main() -> Result<(), Box<dyn Error>> {
    let centers = vec![
        DVector::from_vec(vec![1.0, 2.0]),
        DVector::from_vec(vec![0.0, 3.0]),
        DVector::from_vec(vec![-1.0, 1.0]),
        DVector::from_vec(vec![0.0, 2.0]),
    ];
    let radii = [1.5, 1.0, 2.0, 1.0];
    let x0 = DVector::from_vec(vec![6.0, 4.0]);

    let sequential = make_mapping(&centers, &radii, None)?;
    let third = 1.0 / 3.0;
    let weighted = make_mapping(&centers, &radii, Some(&[third, third, third]))?;

    let mut runs = vec![
        KrasnoselskiiMann::new(0.5, &sequential)?,
        KrasnoselskiiMann::new(0.5, &weighted)?,
        KrasnoselskiiMann::new(0.9, &sequential)?,
        KrasnoselskiiMann::new(0.9, &weighted)?,
    ];

    let mut records = Vec::with_capacity(runs.len());
    for km in &mut runs {
        let record = km.solve(&x0, 30)?;
        eprintln!(
            "{} (alpha = {}): final {:?}, residual {:e}",
            record.name,
            km.alpha(),
            record.final_point.as_slice(),
            record.final_residual()
        );
        records.push(record);
    }

    let target = match std::env::args().nth(1) {
        Some(dir) => PlotTarget::directory(PathBuf::from(dir)),
        None => PlotTarget::Display,
    };
    let config = PlotConfig::default();
    show_result_2d(&centers, &radii, &records, &target, &config)?;
    show_residuals(&records, &target, &config)?;
    Ok(())
}
