//! Sampled parametric plots of embedded submanifolds.
//!
//! Plotting restricts the embedding to Cartesian ambient coordinates and
//! samples it over per-coordinate ranges. The output is plain serializable
//! geometry (polylines and sample grids) for a frontend to draw; no drawing
//! happens here.

use crate::error::GeometryError;
use crate::submanifold::Submanifold;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Sampling density for [`Submanifold::plot`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlotSettings {
    /// Number of samples per submanifold coordinate. At least 2.
    pub samples: usize,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self { samples: 100 }
    }
}

/// Sampled geometry of an embedded submanifold in Cartesian ambient
/// coordinates.
///
/// Curves are polylines in parameter order. Surfaces are `rows x cols` sample
/// grids stored row-major, rows following the first chart coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlotData {
    Curve2d {
        points: Vec<[f64; 2]>,
    },
    Curve3d {
        points: Vec<[f64; 3]>,
    },
    Surface2d {
        rows: usize,
        cols: usize,
        points: Vec<[f64; 2]>,
    },
    Surface3d {
        rows: usize,
        cols: usize,
        points: Vec<[f64; 3]>,
    },
}

impl PlotData {
    /// Number of sampled points.
    pub fn len(&self) -> usize {
        match self {
            PlotData::Curve2d { points } => points.len(),
            PlotData::Curve3d { points } => points.len(),
            PlotData::Surface2d { points, .. } => points.len(),
            PlotData::Surface3d { points, .. } => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Submanifold {
    /// Samples the embedding for drawing.
    ///
    /// The ambient manifold must be named exactly `"R2"` or `"R3"`, have the
    /// matching dimension, and carry a chart named `"cart"` that the
    /// embedding maps into; the submanifold dimension must be at most 2. One
    /// `(min, max)` range is required per submanifold coordinate, and ranges
    /// of coordinates restricted to positive values must stay positive.
    pub fn plot(
        &self,
        coord_ranges: &[(f64, f64)],
        chart_name: Option<&str>,
        settings: PlotSettings,
    ) -> Result<PlotData> {
        let chart = match chart_name {
            Some(name) => self.manifold().require_chart(name)?,
            None => self.default_chart(),
        };

        let ambient_name = self.ambient().name().unwrap_or_default();
        if ambient_name != "R2" && ambient_name != "R3" {
            return Err(GeometryError::UnsupportedAmbient(format!(
                "ambient manifold is {}",
                self.ambient()
            ))
            .into());
        }
        let expected_dim = if ambient_name == "R2" { 2 } else { 3 };
        if self.ambient().dim() != expected_dim {
            return Err(GeometryError::UnsupportedAmbient(format!(
                "'{}' has dimension {}",
                ambient_name,
                self.ambient().dim()
            ))
            .into());
        }
        if self.ambient().chart("cart").is_none() {
            return Err(GeometryError::UnsupportedAmbient(format!(
                "'{}' has no 'cart' chart",
                ambient_name
            ))
            .into());
        }
        if self.embedding().target_chart() != "cart" {
            return Err(GeometryError::UnsupportedAmbient(format!(
                "the embedding targets chart '{}', not 'cart'",
                self.embedding().target_chart()
            ))
            .into());
        }

        let dim = self.dim();
        if dim > 2 {
            return Err(GeometryError::UnsupportedDimension(dim).into());
        }
        if coord_ranges.len() != dim {
            return Err(GeometryError::ArityMismatch {
                expected: dim,
                got: coord_ranges.len(),
            }
            .into());
        }
        for (coordinate, &(min, max)) in chart.coordinates().iter().zip(coord_ranges) {
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(GeometryError::InvalidRange { min, max }.into());
            }
            if coordinate.positive && min <= 0.0 {
                return Err(GeometryError::OutsideDomain {
                    chart: chart.name().to_string(),
                    symbol: coordinate.symbol.clone(),
                }
                .into());
            }
        }
        if settings.samples < 2 {
            bail!("at least two samples per coordinate are required.");
        }

        let samples = settings.samples;
        let grid = |(min, max): (f64, f64), i: usize| {
            min + (max - min) * (i as f64) / ((samples - 1) as f64)
        };
        let chart_desc = chart.to_string();
        let sample = |coords: &[f64]| {
            self.embed_point(coords)
                .with_context(|| format!("failed to sample the embedding on {}", chart_desc))
        };

        if dim == 1 {
            let mut points2 = Vec::new();
            let mut points3 = Vec::new();
            for i in 0..samples {
                let image = sample(&[grid(coord_ranges[0], i)])?;
                if expected_dim == 2 {
                    points2.push([image[0], image[1]]);
                } else {
                    points3.push([image[0], image[1], image[2]]);
                }
            }
            if expected_dim == 2 {
                Ok(PlotData::Curve2d { points: points2 })
            } else {
                Ok(PlotData::Curve3d { points: points3 })
            }
        } else {
            let mut points2 = Vec::new();
            let mut points3 = Vec::new();
            for i in 0..samples {
                let u = grid(coord_ranges[0], i);
                for j in 0..samples {
                    let v = grid(coord_ranges[1], j);
                    let image = sample(&[u, v])?;
                    if expected_dim == 2 {
                        points2.push([image[0], image[1]]);
                    } else {
                        points3.push([image[0], image[1], image[2]]);
                    }
                }
            }
            if expected_dim == 2 {
                Ok(PlotData::Surface2d {
                    rows: samples,
                    cols: samples,
                    points: points2,
                })
            } else {
                Ok(PlotData::Surface3d {
                    rows: samples,
                    cols: samples,
                    points: points3,
                })
            }
        }
    }
}
