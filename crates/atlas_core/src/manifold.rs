//! Differentiable manifolds and their atlases.

use crate::chart::{parse_coord_spec, Chart};
use crate::error::{GeometryError, Result};
use std::fmt;
use std::ops::Range;

/// An abstract space of a given dimension, covered by coordinate charts.
///
/// The first chart registered becomes the default chart. Charts are
/// append-only: once a manifold is shared as an ambient space, nothing here
/// mutates it.
#[derive(Debug, Clone)]
pub struct Manifold {
    dim: usize,
    name: Option<String>,
    latex_name: Option<String>,
    start_index: i64,
    charts: Vec<Chart>,
}

impl Manifold {
    /// Creates a manifold of dimension `dim`. Zero dimension is rejected.
    pub fn new(dim: usize, name: Option<&str>) -> Result<Self> {
        if dim == 0 {
            return Err(GeometryError::ZeroDimension);
        }
        Ok(Self {
            dim,
            name: name.map(|n| n.to_string()),
            latex_name: None,
            start_index: 0,
            charts: Vec::new(),
        })
    }

    pub fn with_latex_name(mut self, latex_name: &str) -> Self {
        self.latex_name = Some(latex_name.to_string());
        self
    }

    /// Sets the lower bound of the coordinate index range.
    pub fn with_start_index(mut self, start_index: i64) -> Self {
        self.start_index = start_index;
        self
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn latex_name(&self) -> Option<&str> {
        self.latex_name.as_deref()
    }

    pub fn start_index(&self) -> i64 {
        self.start_index
    }

    /// Index range of the coordinates, honoring `start_index`.
    pub fn irange(&self) -> Range<i64> {
        self.start_index..self.start_index + self.dim as i64
    }

    /// Registers a chart from a coordinate-symbol string.
    ///
    /// The coordinate count must equal the manifold dimension, and the chart
    /// name must be new. The first registered chart becomes the default.
    pub fn add_chart(&mut self, coord_spec: &str, chart_name: &str) -> Result<&Chart> {
        let coordinates = parse_coord_spec(coord_spec)?;
        if coordinates.len() != self.dim {
            return Err(GeometryError::CoordCountMismatch {
                chart: chart_name.to_string(),
                expected: self.dim,
                got: coordinates.len(),
            });
        }
        if self.charts.iter().any(|c| c.name() == chart_name) {
            return Err(GeometryError::DuplicateChart(chart_name.to_string()));
        }
        self.charts.push(Chart::new(chart_name, coordinates));
        Ok(self.charts.last().unwrap())
    }

    /// The default chart: the first one registered.
    pub fn default_chart(&self) -> Option<&Chart> {
        self.charts.first()
    }

    pub(crate) fn require_default_chart(&self) -> Result<&Chart> {
        self.default_chart()
            .ok_or_else(|| GeometryError::EmptyAtlas(self.to_string()))
    }

    pub fn chart(&self, name: &str) -> Option<&Chart> {
        self.charts.iter().find(|c| c.name() == name)
    }

    pub(crate) fn require_chart(&self, name: &str) -> Result<&Chart> {
        self.chart(name)
            .ok_or_else(|| GeometryError::UnknownChart(name.to_string()))
    }

    /// All registered charts, in registration order.
    pub fn atlas(&self) -> &[Chart] {
        &self.charts
    }
}

impl fmt::Display for Manifold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}-dimensional manifold '{}'", self.dim, name),
            None => write!(f, "{}-dimensional manifold", self.dim),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Manifold;
    use crate::error::GeometryError;

    #[test]
    fn rejects_zero_dimension() {
        let err = Manifold::new(0, Some("M")).expect_err("expected error");
        assert!(matches!(err, GeometryError::ZeroDimension));
    }

    #[test]
    fn first_chart_becomes_default() {
        let mut m = Manifold::new(2, Some("M")).expect("should construct");
        assert!(m.default_chart().is_none());
        m.add_chart("x y", "cart").expect("should register");
        m.add_chart("r:positive ph", "polar").expect("should register");
        assert_eq!(m.default_chart().expect("default chart").name(), "cart");
        assert_eq!(m.atlas().len(), 2);
        assert_eq!(m.chart("polar").expect("registered").dim(), 2);
        assert!(m.chart("spher").is_none());
    }

    #[test]
    fn rejects_chart_with_wrong_coordinate_count() {
        let mut m = Manifold::new(3, Some("R3")).expect("should construct");
        let err = m.add_chart("x y", "cart").expect_err("expected error");
        assert!(matches!(
            err,
            GeometryError::CoordCountMismatch {
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn rejects_duplicate_chart_name() {
        let mut m = Manifold::new(2, Some("M")).expect("should construct");
        m.add_chart("x y", "cart").expect("should register");
        let err = m.add_chart("u v", "cart").expect_err("expected error");
        assert!(matches!(err, GeometryError::DuplicateChart(ref n) if n == "cart"));
    }

    #[test]
    fn display_includes_dimension_and_name() {
        let m = Manifold::new(3, Some("R3")).expect("should construct");
        assert_eq!(m.to_string(), "3-dimensional manifold 'R3'");
        let anon = Manifold::new(2, None).expect("should construct");
        assert_eq!(anon.to_string(), "2-dimensional manifold");
    }

    #[test]
    fn irange_honors_start_index() {
        let m = Manifold::new(3, Some("M"))
            .expect("should construct")
            .with_start_index(1);
        let indices: Vec<i64> = m.irange().collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }
}
