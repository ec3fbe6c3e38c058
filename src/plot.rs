//! SVG rendering of iteration histories.
//!
//! Two figures are produced: the 2-D trajectories overlaid on the ball family,
//! and the residual `‖x_k - T(x_k)‖` against the iteration index on a log scale.
//! Both are plain SVG strings and can be written to a directory or standard output.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use log::debug;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::error::{KmError, Result};
use crate::iteration::IterationRecord;

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Canvas and output settings shared by both figures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    /// Blank border around the plotting area, in pixels.
    pub margin: f64,
    /// Radius of the markers drawn at each iterate.
    pub marker_radius: f64,
    /// File name used for the trajectory figure when none is given.
    pub trajectory_file: String,
    /// File name used for the residual figure when none is given.
    pub residual_file: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            margin: 48.0,
            marker_radius: 3.0,
            trajectory_file: "2d_fig.svg".to_string(),
            residual_file: "dist_fig.svg".to_string(),
        }
    }
}

impl PlotConfig {
    /// Override the canvas size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    /// Override the margin around the plotting area.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin.max(0.0);
        self
    }

    /// Override the marker radius.
    pub fn with_marker_radius(mut self, radius: f64) -> Self {
        self.marker_radius = radius.max(0.0);
        self
    }

    /// Override the default file names for the two figures.
    pub fn with_file_names(
        mut self,
        trajectory: impl Into<String>,
        residual: impl Into<String>,
    ) -> Self {
        self.trajectory_file = trajectory.into();
        self.residual_file = residual.into();
        self
    }
}

/// Where a rendered figure goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlotTarget {
    /// Write the SVG document to standard output.
    Display,
    /// Write the SVG document to `dir/name`; `None` selects the figure's default name.
    Directory { dir: PathBuf, name: Option<String> },
}

impl PlotTarget {
    /// Target a directory using the default file name.
    pub fn directory(dir: impl Into<PathBuf>) -> Self {
        Self::Directory {
            dir: dir.into(),
            name: None,
        }
    }

    /// Replace the file name of a directory target. No effect on [`PlotTarget::Display`].
    pub fn with_name(self, name: impl Into<String>) -> Self {
        match self {
            Self::Directory { dir, .. } => Self::Directory {
                dir,
                name: Some(name.into()),
            },
            Self::Display => Self::Display,
        }
    }
}

/// Renders the trajectories of 2-D records over the balls `(centers[i], radii[i])`.
///
/// Fails with [`KmError::DimensionMismatch`] if any iterate or centre is not 2-D,
/// or if `centers` and `radii` differ in length.
pub fn render_trajectories(
    centers: &[DVector<f64>],
    radii: &[f64],
    records: &[IterationRecord],
    config: &PlotConfig,
) -> Result<String> {
    if centers.len() != radii.len() {
        return Err(KmError::dimension_mismatch(
            "radii length",
            centers.len(),
            radii.len(),
        ));
    }
    if let Some(center) = centers.iter().find(|c| c.len() != 2) {
        return Err(KmError::dimension_mismatch(
            "ball centre dimension",
            2,
            center.len(),
        ));
    }
    for record in records {
        if let Some(point) = record.points.iter().find(|p| p.len() != 2) {
            return Err(KmError::dimension_mismatch(
                "trajectory dimension",
                2,
                point.len(),
            ));
        }
    }

    let mut bounds = Bounds::empty();
    for (center, radius) in centers.iter().zip(radii) {
        bounds.include(center[0] - radius, center[1] - radius);
        bounds.include(center[0] + radius, center[1] + radius);
    }
    for point in records.iter().flat_map(|r| r.points.iter()) {
        bounds.include(point[0], point[1]);
    }
    let frame = Frame::equal_aspect(bounds.or_unit(), config);

    let mut svg = open_document(config);
    frame.draw_axes(&mut svg);

    for (center, radius) in centers.iter().zip(radii) {
        let (cx, cy) = frame.to_canvas(center[0], center[1]);
        let _ = write!(
            svg,
            "<circle cx='{:.2}' cy='{:.2}' r='{:.2}' fill='none' stroke='#000000' stroke-width='1' />",
            cx,
            cy,
            radius * frame.x_scale
        );
    }

    for (index, record) in records.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let canvas: Vec<(f64, f64)> = record
            .points
            .iter()
            .map(|p| frame.to_canvas(p[0], p[1]))
            .collect();
        push_polyline(&mut svg, &canvas, color);
        for (x, y) in &canvas {
            let _ = write!(
                svg,
                "<circle cx='{:.2}' cy='{:.2}' r='{:.2}' fill='{}' />",
                x, y, config.marker_radius, color
            );
        }
    }

    push_legend(&mut svg, records, config);
    frame.draw_labels(&mut svg, "x₁", "x₂");
    svg.push_str("</svg>");
    Ok(svg)
}

/// Renders residual curves on a log10 vertical axis, one per record.
///
/// Non-positive residuals cannot be placed on a log axis and break the curve.
pub fn render_residuals(records: &[IterationRecord], config: &PlotConfig) -> String {
    let (mut low, mut high) = records
        .iter()
        .flat_map(|r| r.residuals.iter().copied())
        .filter(|v| *v > 0.0 && v.is_finite())
        .map(f64::log10)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !low.is_finite() {
        low = -1.0;
        high = 0.0;
    }
    low = low.floor();
    high = high.ceil();
    if high <= low {
        high = low + 1.0;
    }

    let steps = records
        .iter()
        .map(|r| r.residuals.len().saturating_sub(1))
        .max()
        .unwrap_or(0)
        .max(1);
    let frame = Frame::stretched(
        Bounds {
            x_min: 0.0,
            x_max: steps as f64,
            y_min: low,
            y_max: high,
        },
        config,
    );

    let mut svg = open_document(config);
    frame.draw_axes(&mut svg);

    let mut decade = low as i32;
    while decade <= high as i32 {
        let (x, y) = frame.to_canvas(0.0, decade as f64);
        let _ = write!(
            svg,
            "<text x='{:.2}' y='{:.2}' font-size='10' text-anchor='end'>1e{}</text>",
            x - 4.0,
            y + 3.0,
            decade
        );
        decade += 1;
    }
    let (x_end, y_end) = frame.to_canvas(steps as f64, low);
    let _ = write!(
        svg,
        "<text x='{:.2}' y='{:.2}' font-size='10' text-anchor='middle'>{}</text>",
        x_end,
        y_end + 14.0,
        steps
    );

    for (index, record) in records.iter().enumerate() {
        let color = PALETTE[index % PALETTE.len()];
        let mut segment = Vec::new();
        for (k, residual) in record.residuals.iter().enumerate() {
            if *residual > 0.0 && residual.is_finite() {
                segment.push(frame.to_canvas(k as f64, residual.log10()));
            } else {
                push_polyline(&mut svg, &segment, color);
                segment.clear();
            }
        }
        push_polyline(&mut svg, &segment, color);
    }

    push_legend(&mut svg, records, config);
    frame.draw_labels(&mut svg, "iteration", "‖x_k − T(x_k)‖");
    svg.push_str("</svg>");
    svg
}

/// Renders the trajectory figure and sends it to `target`.
///
/// Returns the written path for directory targets.
pub fn show_result_2d(
    centers: &[DVector<f64>],
    radii: &[f64],
    records: &[IterationRecord],
    target: &PlotTarget,
    config: &PlotConfig,
) -> Result<Option<PathBuf>> {
    let svg = render_trajectories(centers, radii, records, config)?;
    emit(&svg, target, &config.trajectory_file)
}

/// Renders the residual figure and sends it to `target`.
pub fn show_residuals(
    records: &[IterationRecord],
    target: &PlotTarget,
    config: &PlotConfig,
) -> Result<Option<PathBuf>> {
    let svg = render_residuals(records, config);
    emit(&svg, target, &config.residual_file)
}

fn emit(svg: &str, target: &PlotTarget, default_name: &str) -> Result<Option<PathBuf>> {
    match target {
        PlotTarget::Display => {
            let mut out = io::stdout().lock();
            out.write_all(svg.as_bytes())?;
            out.write_all(b"\n")?;
            out.flush()?;
            Ok(None)
        }
        PlotTarget::Directory { dir, name } => {
            let path = dir.join(name.as_deref().unwrap_or(default_name));
            fs::write(&path, svg)?;
            debug!("wrote plot to {}", path.display());
            Ok(Some(path))
        }
    }
}

/// Canvas size with zero dimensions raised to one pixel.
fn canvas_size(config: &PlotConfig) -> (u32, u32) {
    (config.width.max(1), config.height.max(1))
}

fn open_document(config: &PlotConfig) -> String {
    let (w, h) = canvas_size(config);
    format!(
        "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}'>\
         <rect width='{w}' height='{h}' fill='#ffffff' />"
    )
}

fn push_polyline(svg: &mut String, points: &[(f64, f64)], color: &str) {
    if points.is_empty() {
        return;
    }
    let coords: Vec<String> = points
        .iter()
        .map(|(x, y)| format!("{:.2},{:.2}", x, y))
        .collect();
    let _ = write!(
        svg,
        "<polyline points='{}' fill='none' stroke='{}' stroke-width='0.75' />",
        coords.join(" "),
        color
    );
}

fn push_legend(svg: &mut String, records: &[IterationRecord], config: &PlotConfig) {
    let x = canvas_size(config).0 as f64 - config.margin - 90.0;
    for (index, record) in records.iter().enumerate() {
        let y = config.margin + 14.0 * (index as f64 + 1.0);
        let color = PALETTE[index % PALETTE.len()];
        let _ = write!(
            svg,
            "<line x1='{:.2}' y1='{:.2}' x2='{:.2}' y2='{:.2}' stroke='{}' stroke-width='2' />\
             <text x='{:.2}' y='{:.2}' font-size='11'>{}</text>",
            x,
            y - 4.0,
            x + 18.0,
            y - 4.0,
            color,
            x + 24.0,
            y,
            escape_xml(&record.name)
        );
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[derive(Clone, Copy, Debug)]
struct Bounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl Bounds {
    fn empty() -> Self {
        Self {
            x_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_min: f64::INFINITY,
            y_max: f64::NEG_INFINITY,
        }
    }

    fn include(&mut self, x: f64, y: f64) {
        if x.is_finite() && y.is_finite() {
            self.x_min = self.x_min.min(x);
            self.x_max = self.x_max.max(x);
            self.y_min = self.y_min.min(y);
            self.y_max = self.y_max.max(y);
        }
    }

    fn or_unit(self) -> Self {
        if self.x_min.is_finite() {
            self
        } else {
            Self {
                x_min: -1.0,
                x_max: 1.0,
                y_min: -1.0,
                y_max: 1.0,
            }
        }
    }
}

/// Affine map from data coordinates to the canvas (y grows downwards).
#[derive(Clone, Copy, Debug)]
struct Frame {
    bounds: Bounds,
    x_scale: f64,
    y_scale: f64,
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
}

impl Frame {
    fn stretched(bounds: Bounds, config: &PlotConfig) -> Self {
        let (left, top, right, bottom) = Self::area(config);
        Self {
            bounds,
            x_scale: (right - left) / (bounds.x_max - bounds.x_min).max(1e-9),
            y_scale: (bottom - top) / (bounds.y_max - bounds.y_min).max(1e-9),
            left,
            bottom,
            right,
            top,
        }
    }

    /// Same scale on both axes; the shorter data span is centred.
    fn equal_aspect(bounds: Bounds, config: &PlotConfig) -> Self {
        let (left, top, right, bottom) = Self::area(config);
        let span_x = (bounds.x_max - bounds.x_min).max(1e-9);
        let span_y = (bounds.y_max - bounds.y_min).max(1e-9);
        let scale = ((right - left) / span_x).min((bottom - top) / span_y);
        let pad_x = ((right - left) / scale - span_x) / 2.0;
        let pad_y = ((bottom - top) / scale - span_y) / 2.0;
        Self {
            bounds: Bounds {
                x_min: bounds.x_min - pad_x,
                x_max: bounds.x_max + pad_x,
                y_min: bounds.y_min - pad_y,
                y_max: bounds.y_max + pad_y,
            },
            x_scale: scale,
            y_scale: scale,
            left,
            bottom,
            right,
            top,
        }
    }

    fn area(config: &PlotConfig) -> (f64, f64, f64, f64) {
        let (width, height) = canvas_size(config);
        let (width, height) = (width as f64, height as f64);
        let margin = config.margin.min(width / 2.0 - 1.0).min(height / 2.0 - 1.0).max(0.0);
        (margin, margin, width - margin, height - margin)
    }

    fn to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.left + (x - self.bounds.x_min) * self.x_scale,
            self.bottom - (y - self.bounds.y_min) * self.y_scale,
        )
    }

    fn draw_axes(&self, svg: &mut String) {
        let _ = write!(
            svg,
            "<rect x='{:.2}' y='{:.2}' width='{:.2}' height='{:.2}' fill='none' stroke='#444444' stroke-width='1' />",
            self.left,
            self.top,
            self.right - self.left,
            self.bottom - self.top
        );
    }

    fn draw_labels(&self, svg: &mut String, x_label: &str, y_label: &str) {
        let mid_x = (self.left + self.right) / 2.0;
        let mid_y = (self.top + self.bottom) / 2.0;
        let _ = write!(
            svg,
            "<text x='{:.2}' y='{:.2}' font-size='12' text-anchor='middle'>{}</text>\
             <text x='{:.2}' y='{:.2}' font-size='12' text-anchor='middle' transform='rotate(-90 {:.2} {:.2})'>{}</text>",
            mid_x,
            self.bottom + 32.0,
            escape_xml(x_label),
            self.left - 32.0,
            mid_y,
            self.left - 32.0,
            mid_y,
            escape_xml(y_label)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, points: Vec<DVector<f64>>, residuals: Vec<f64>) -> IterationRecord {
        let final_point = points.last().cloned().unwrap_or_else(|| DVector::zeros(0));
        IterationRecord {
            name: name.to_string(),
            points,
            residuals,
            final_point,
        }
    }

    #[test]
    fn equal_aspect_uses_one_scale() {
        let bounds = Bounds {
            x_min: 0.0,
            x_max: 4.0,
            y_min: 0.0,
            y_max: 1.0,
        };
        let frame = Frame::equal_aspect(bounds, &PlotConfig::default());
        assert_eq!(frame.x_scale, frame.y_scale);
        let (left, _) = frame.to_canvas(0.0, 0.5);
        let (right, _) = frame.to_canvas(4.0, 0.5);
        assert!((right - left - (640.0 - 96.0)).abs() < 1e-9);
    }

    #[test]
    fn trajectory_rejects_three_dimensional_points() {
        let r = record("KM", vec![DVector::zeros(3)], vec![0.0]);
        let result = render_trajectories(&[], &[], &[r], &PlotConfig::default());
        assert!(matches!(
            result,
            Err(KmError::DimensionMismatch {
                expected: 2,
                found: 3,
                ..
            })
        ));
    }

    #[test]
    fn trajectory_draws_balls_paths_and_legend() {
        let r = record(
            "KM<0>",
            vec![DVector::from_vec(vec![3.0, 0.0]), DVector::from_vec(vec![1.0, 0.0])],
            vec![2.0, 0.0],
        );
        let svg = render_trajectories(
            &[DVector::zeros(2)],
            &[1.0],
            &[r],
            &PlotConfig::default(),
        )
        .unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("stroke='#000000'"));
        assert_eq!(svg.matches("<polyline").count(), 1);
        assert!(svg.contains("KM&lt;0&gt;"));
    }

    #[test]
    fn residual_curve_breaks_at_zero() {
        let r = record(
            "KM",
            vec![DVector::zeros(1); 4],
            vec![1.0, 0.1, 0.0, 0.01],
        );
        let svg = render_residuals(&[r], &PlotConfig::default());
        assert_eq!(svg.matches("<polyline").count(), 2);
        assert!(svg.contains(">1e-2<"));
        assert!(svg.contains(">1e0<"));
    }

    #[test]
    fn residual_plot_handles_no_positive_values() {
        let r = record("KM", vec![DVector::zeros(1)], vec![0.0]);
        let svg = render_residuals(&[r], &PlotConfig::default());
        assert!(!svg.contains("<polyline"));
        assert!(svg.contains("KM"));
    }

    #[test]
    fn zero_sized_canvas_stays_finite() {
        let config = PlotConfig {
            width: 0,
            height: 0,
            ..PlotConfig::default()
        };
        let r = record(
            "KM",
            vec![DVector::from_vec(vec![3.0, 0.0]), DVector::from_vec(vec![1.0, 0.0])],
            vec![2.0, 0.5],
        );
        let trajectory =
            render_trajectories(&[DVector::zeros(2)], &[1.0], &[r.clone()], &config).unwrap();
        let residual = render_residuals(&[r], &config);
        for svg in [trajectory, residual] {
            assert!(!svg.contains("NaN"));
            assert!(!svg.contains("inf"));
            assert!(svg.contains("width='1'"));
        }
    }

    #[test]
    fn directory_target_name_override() {
        let target = PlotTarget::directory("/tmp").with_name("custom.svg");
        assert_eq!(
            target,
            PlotTarget::Directory {
                dir: PathBuf::from("/tmp"),
                name: Some("custom.svg".to_string())
            }
        );
        assert_eq!(PlotTarget::Display.with_name("x"), PlotTarget::Display);
    }
}
