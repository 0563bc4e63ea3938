//! Parametrized curves: 1-dimensional embedded submanifolds.

use crate::chart::Chart;
use crate::diffmap::DiffMap;
use crate::error::Result;
use crate::expr::ExprSource;
use crate::manifold::Manifold;
use crate::plot::{PlotData, PlotSettings};
use crate::submanifold::{Submanifold, SubmanifoldOptions};
use nalgebra::DVector;
use std::fmt;
use std::sync::Arc;

/// A curve in an ambient manifold, parametrized by a single chart
/// coordinate.
pub struct Curve {
    inner: Submanifold,
}

impl Curve {
    /// Constructs a curve from a parameter declaration (`param_symbols`, the
    /// single-coordinate analogue of a chart spec) and one embedding function
    /// per ambient coordinate. `param_name` names the parametrization, i.e.
    /// the chart on the curve.
    pub fn new(
        param_symbols: &str,
        param_name: &str,
        ambient: Arc<Manifold>,
        embedding_functions: Vec<ExprSource>,
        options: SubmanifoldOptions,
    ) -> Result<Self> {
        let inner = Submanifold::new(
            1,
            param_symbols,
            param_name,
            ambient,
            embedding_functions,
            options,
        )?;
        Ok(Self { inner })
    }

    pub fn dim(&self) -> usize {
        self.inner.dim()
    }

    pub fn name(&self) -> Option<&str> {
        self.inner.name()
    }

    pub fn ambient(&self) -> &Manifold {
        self.inner.ambient()
    }

    pub fn embedding(&self) -> &DiffMap {
        self.inner.embedding()
    }

    /// The parametrization chart.
    pub fn default_chart(&self) -> &Chart {
        self.inner.default_chart()
    }

    /// The curve as a submanifold.
    pub fn as_submanifold(&self) -> &Submanifold {
        &self.inner
    }

    /// Ambient coordinates of the curve point at parameter `t`.
    pub fn embed_point(&self, t: f64) -> Result<Vec<f64>> {
        self.inner.embed_point(&[t])
    }

    /// Velocity of the curve at parameter `t`, in ambient coordinates.
    pub fn tangent_vector(&self, t: f64) -> Result<DVector<f64>> {
        let jacobian = self.inner.pushforward(&[t])?;
        Ok(jacobian.column(0).into_owned())
    }

    /// Samples the curve for drawing; see [`Submanifold::plot`].
    pub fn plot(
        &self,
        range: (f64, f64),
        chart_name: Option<&str>,
        settings: PlotSettings,
    ) -> anyhow::Result<PlotData> {
        self.inner.plot(&[range], chart_name, settings)
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "curve")?;
        if let Some(name) = self.inner.name() {
            write!(f, " '{}'", name)?;
        }
        write!(f, " on {}", self.inner.ambient())
    }
}

#[cfg(test)]
mod tests {
    use super::Curve;
    use crate::manifold::Manifold;
    use crate::submanifold::SubmanifoldOptions;
    use std::sync::Arc;

    fn r3() -> Arc<Manifold> {
        let mut m = Manifold::new(3, Some("R3")).expect("should construct");
        m.add_chart("x y z", "cart").expect("should register");
        Arc::new(m)
    }

    fn helix() -> Curve {
        Curve::new(
            "t",
            "t",
            r3(),
            vec!["cos(t)".into(), "sin(t)".into(), "t".into()],
            SubmanifoldOptions {
                name: Some("helix".to_string()),
                ..Default::default()
            },
        )
        .expect("helix should construct")
    }

    #[test]
    fn curves_are_one_dimensional() {
        let h = helix();
        assert_eq!(h.dim(), 1);
        assert_eq!(h.as_submanifold().dim(), 1);
        assert_eq!(h.default_chart().to_string(), "chart 't' (t)");
    }

    #[test]
    fn display_reads_as_curve_on_ambient() {
        let h = helix();
        assert_eq!(h.to_string(), "curve 'helix' on 3-dimensional manifold 'R3'");

        let anonymous = Curve::new(
            "t",
            "t",
            r3(),
            vec!["cos(t)".into(), "sin(t)".into(), "t".into()],
            SubmanifoldOptions::default(),
        )
        .expect("should construct");
        assert_eq!(anonymous.to_string(), "curve on 3-dimensional manifold 'R3'");
    }

    #[test]
    fn embeds_parameter_values() {
        let h = helix();
        let pi = std::f64::consts::PI;
        let image = h.embed_point(pi).expect("point should embed");
        assert!((image[0] + 1.0).abs() < 1e-12);
        assert!(image[1].abs() < 1e-12);
        assert!((image[2] - pi).abs() < 1e-12);
    }

    #[test]
    fn tangent_vector_matches_analytic_velocity() {
        let h = helix();
        let t = 0.6;
        let velocity = h.tangent_vector(t).expect("tangent should compute");
        assert_eq!(velocity.len(), 3);
        assert!((velocity[0] + t.sin()).abs() < 1e-12);
        assert!((velocity[1] - t.cos()).abs() < 1e-12);
        assert!((velocity[2] - 1.0).abs() < 1e-12);
    }
}
