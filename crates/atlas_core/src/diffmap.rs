//! Differentiable mappings between manifold charts.
//!
//! A [`DiffMap`] carries one symbolic coordinate function per target
//! coordinate, expressed in the source chart's coordinates, together with the
//! compiled bytecode for numeric evaluation. It is the embedding type stored
//! on submanifolds.

use crate::autodiff::Dual;
use crate::chart::Chart;
use crate::error::{GeometryError, Result};
use crate::expr::{Bytecode, Compiler, Expr, ExprSource, Vm};
use crate::manifold::Manifold;
use nalgebra::DMatrix;
use std::fmt;

/// One target-coordinate function: the symbolic expression and its compiled
/// form.
#[derive(Debug, Clone)]
pub struct CoordFunction {
    expr: Expr,
    code: Bytecode,
}

impl CoordFunction {
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// A differentiable mapping from a source manifold chart into a target
/// manifold chart.
#[derive(Debug, Clone)]
pub struct DiffMap {
    source_desc: String,
    target_desc: String,
    source_chart: Chart,
    target_chart: String,
    functions: Vec<CoordFunction>,
}

impl DiffMap {
    /// Builds the mapping, compiling each coordinate function against the
    /// source chart.
    ///
    /// The number of functions must equal the target manifold's dimension;
    /// both chart names must be registered on their manifolds.
    pub fn new(
        source: &Manifold,
        target: &Manifold,
        functions: Vec<ExprSource>,
        source_chart: &str,
        target_chart: &str,
    ) -> Result<Self> {
        let source_chart = source.require_chart(source_chart)?.clone();
        target.require_chart(target_chart)?;
        if functions.len() != target.dim() {
            return Err(GeometryError::DimensionMismatch {
                expected: target.dim(),
                got: functions.len(),
            });
        }

        let compiler = Compiler::new(&source_chart.symbols());
        let mut compiled = Vec::with_capacity(functions.len());
        for function in functions {
            let expr = function.into_expr()?;
            let code = compiler.compile(&expr)?;
            compiled.push(CoordFunction { expr, code });
        }

        Ok(Self {
            source_desc: source.to_string(),
            target_desc: target.to_string(),
            source_chart,
            target_chart: target_chart.to_string(),
            functions: compiled,
        })
    }

    /// The chart the coordinate functions are written in.
    pub fn source_chart(&self) -> &Chart {
        &self.source_chart
    }

    /// Name of the target manifold chart the functions map into.
    pub fn target_chart(&self) -> &str {
        &self.target_chart
    }

    /// The coordinate functions, in target-coordinate order.
    pub fn coord_functions(&self) -> &[CoordFunction] {
        &self.functions
    }

    /// The symbolic coordinate expressions, in target-coordinate order.
    pub fn coord_expressions(&self) -> Vec<&Expr> {
        self.functions.iter().map(|f| &f.expr).collect()
    }

    fn check_point(&self, coords: &[f64]) -> Result<()> {
        if coords.len() != self.source_chart.dim() {
            return Err(GeometryError::ArityMismatch {
                expected: self.source_chart.dim(),
                got: coords.len(),
            });
        }
        if let Some(coordinate) = self.source_chart.violated_restriction(coords) {
            return Err(GeometryError::OutsideDomain {
                chart: self.source_chart.name().to_string(),
                symbol: coordinate.symbol.clone(),
            });
        }
        Ok(())
    }

    /// Image of a source-chart point in target-chart coordinates.
    pub fn map_point(&self, coords: &[f64]) -> Result<Vec<f64>> {
        self.check_point(coords)?;
        let mut stack = Vec::with_capacity(16);
        Ok(self
            .functions
            .iter()
            .map(|f| Vm::eval(&f.code, coords, &mut stack))
            .collect())
    }

    /// Jacobian of the mapping at a source-chart point, computed by
    /// evaluating the compiled functions over dual numbers. Rows follow the
    /// target coordinates, columns the source coordinates.
    pub fn jacobian(&self, coords: &[f64]) -> Result<DMatrix<f64>> {
        self.check_point(coords)?;
        let n = self.source_chart.dim();
        let m = self.functions.len();

        let mut jacobian = DMatrix::zeros(m, n);
        let mut dual_coords = vec![Dual::constant(0.0); n];
        let mut stack: Vec<Dual> = Vec::with_capacity(16);

        for j in 0..n {
            for i in 0..n {
                dual_coords[i] = Dual::new(coords[i], if i == j { 1.0 } else { 0.0 });
            }
            for (i, function) in self.functions.iter().enumerate() {
                jacobian[(i, j)] = Vm::eval(&function.code, &dual_coords, &mut stack).eps;
            }
        }

        Ok(jacobian)
    }
}

impl fmt::Display for DiffMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "differentiable mapping from {} to {}",
            self.source_desc, self.target_desc
        )
    }
}

#[cfg(test)]
mod tests {
    use super::DiffMap;
    use crate::error::GeometryError;
    use crate::manifold::Manifold;

    fn sphere_embedding() -> (Manifold, Manifold) {
        let mut r3 = Manifold::new(3, Some("R3")).expect("should construct");
        r3.add_chart("x y z", "cart").expect("should register");
        let mut s2 = Manifold::new(2, Some("S2")).expect("should construct");
        s2.add_chart("u v", "spher").expect("should register");
        (s2, r3)
    }

    fn sphere_map(s2: &Manifold, r3: &Manifold) -> DiffMap {
        DiffMap::new(
            s2,
            r3,
            vec![
                "sin(u)*cos(v)".into(),
                "sin(u)*sin(v)".into(),
                "cos(u)".into(),
            ],
            "spher",
            "cart",
        )
        .expect("embedding should construct")
    }

    #[test]
    fn exposes_coordinate_expressions_in_order() {
        let (s2, r3) = sphere_embedding();
        let map = sphere_map(&s2, &r3);
        let rendered: Vec<String> = map
            .coord_expressions()
            .iter()
            .map(|e| e.to_string())
            .collect();
        assert_eq!(rendered, ["sin(u)*cos(v)", "sin(u)*sin(v)", "cos(u)"]);
    }

    #[test]
    fn rejects_wrong_function_count() {
        let (s2, r3) = sphere_embedding();
        let err = DiffMap::new(
            &s2,
            &r3,
            vec!["sin(u)".into(), "cos(u)".into()],
            "spher",
            "cart",
        )
        .expect_err("expected error");
        assert!(matches!(
            err,
            GeometryError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn rejects_unknown_charts_and_symbols() {
        let (s2, r3) = sphere_embedding();
        let err = DiffMap::new(&s2, &r3, vec!["u".into(), "v".into(), "u".into()], "spher", "polar")
            .expect_err("expected error");
        assert!(matches!(err, GeometryError::UnknownChart(ref n) if n == "polar"));

        let err = DiffMap::new(
            &s2,
            &r3,
            vec!["sin(w)".into(), "v".into(), "u".into()],
            "spher",
            "cart",
        )
        .expect_err("expected error");
        assert!(matches!(err, GeometryError::UnknownSymbol(ref s) if s == "w"));
    }

    #[test]
    fn maps_points_numerically() {
        let (s2, r3) = sphere_embedding();
        let map = sphere_map(&s2, &r3);

        let u = std::f64::consts::FRAC_PI_2;
        let v = 0.0;
        let image = map.map_point(&[u, v]).expect("point should map");
        assert!((image[0] - 1.0).abs() < 1e-12);
        assert!(image[1].abs() < 1e-12);
        assert!(image[2].abs() < 1e-12);

        let err = map.map_point(&[1.0]).expect_err("expected error");
        assert!(matches!(
            err,
            GeometryError::ArityMismatch {
                expected: 2,
                got: 1
            }
        ));
    }

    #[test]
    fn rejects_points_outside_restricted_domain() {
        let mut r2 = Manifold::new(2, Some("R2")).expect("should construct");
        r2.add_chart("x y", "cart").expect("should register");
        let mut half = Manifold::new(1, Some("H")).expect("should construct");
        half.add_chart("r:positive", "radial").expect("should register");

        let map = DiffMap::new(&half, &r2, vec!["r".into(), "r^2".into()], "radial", "cart")
            .expect("should construct");
        let err = map.map_point(&[-1.0]).expect_err("expected error");
        assert!(matches!(err, GeometryError::OutsideDomain { ref symbol, .. } if symbol == "r"));
    }

    #[test]
    fn jacobian_matches_analytic_sphere_derivatives() {
        let (s2, r3) = sphere_embedding();
        let map = sphere_map(&s2, &r3);

        let u = 0.8;
        let v = 1.1;
        let jac = map.jacobian(&[u, v]).expect("jacobian should compute");
        assert_eq!(jac.nrows(), 3);
        assert_eq!(jac.ncols(), 2);

        let expected = [
            [u.cos() * v.cos(), -u.sin() * v.sin()],
            [u.cos() * v.sin(), u.sin() * v.cos()],
            [-u.sin(), 0.0],
        ];
        for i in 0..3 {
            for j in 0..2 {
                assert!(
                    (jac[(i, j)] - expected[i][j]).abs() < 1e-12,
                    "entry ({i}, {j})"
                );
            }
        }
    }

    #[test]
    fn display_names_both_manifolds() {
        let (s2, r3) = sphere_embedding();
        let map = sphere_map(&s2, &r3);
        assert_eq!(
            map.to_string(),
            "differentiable mapping from 2-dimensional manifold 'S2' to 3-dimensional manifold 'R3'"
        );
    }
}
