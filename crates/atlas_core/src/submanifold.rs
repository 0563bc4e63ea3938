//! Embedded submanifolds.
//!
//! A submanifold is a manifold of its own, carrying a coordinate chart and an
//! embedding [`DiffMap`] into an ambient manifold. "Submanifold-ness" is
//! composition, not inheritance: the struct owns its manifold and embedding
//! and shares the ambient manifold.

use crate::chart::Chart;
use crate::diffmap::DiffMap;
use crate::error::Result;
use crate::expr::ExprSource;
use crate::manifold::Manifold;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Optional construction parameters for [`Submanifold::new`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmanifoldOptions {
    /// Name given to the submanifold.
    pub name: Option<String>,
    /// LaTeX symbol denoting the submanifold.
    pub latex_name: Option<String>,
    /// Ambient chart the embedding maps into; defaults to the ambient
    /// manifold's default chart.
    pub ambient_chart: Option<String>,
    /// Lower bound of the coordinate index range.
    pub start_index: i64,
}

/// A manifold embedded in an ambient manifold.
#[derive(Debug)]
pub struct Submanifold {
    manifold: Manifold,
    ambient: Arc<Manifold>,
    embedding: DiffMap,
}

impl Submanifold {
    /// Constructs a submanifold of dimension `dim` with a chart named
    /// `chart_name` declared by `coord_symbols`, embedded in `ambient` via
    /// one coordinate function per ambient coordinate.
    ///
    /// Fails when the coordinate spec is malformed, when the number of
    /// embedding functions differs from the ambient dimension, when a named
    /// ambient chart is not registered, or when an embedding expression does
    /// not parse or references a symbol outside the chart.
    pub fn new(
        dim: usize,
        coord_symbols: &str,
        chart_name: &str,
        ambient: Arc<Manifold>,
        embedding_functions: Vec<ExprSource>,
        options: SubmanifoldOptions,
    ) -> Result<Self> {
        let mut manifold =
            Manifold::new(dim, options.name.as_deref())?.with_start_index(options.start_index);
        if let Some(latex_name) = &options.latex_name {
            manifold = manifold.with_latex_name(latex_name);
        }
        manifold.add_chart(coord_symbols, chart_name)?;

        let ambient_chart = match &options.ambient_chart {
            Some(name) => ambient.require_chart(name)?.name().to_string(),
            None => ambient.require_default_chart()?.name().to_string(),
        };

        let embedding = DiffMap::new(
            &manifold,
            &ambient,
            embedding_functions,
            chart_name,
            &ambient_chart,
        )?;

        Ok(Self {
            manifold,
            ambient,
            embedding,
        })
    }

    pub fn dim(&self) -> usize {
        self.manifold.dim()
    }

    pub fn name(&self) -> Option<&str> {
        self.manifold.name()
    }

    /// The submanifold as a manifold in its own right.
    pub fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    /// The enclosing manifold.
    pub fn ambient(&self) -> &Manifold {
        &self.ambient
    }

    /// The embedding mapping into the ambient manifold.
    pub fn embedding(&self) -> &DiffMap {
        &self.embedding
    }

    /// The submanifold's chart.
    pub fn default_chart(&self) -> &Chart {
        self.embedding.source_chart()
    }

    /// Maps a point, given in the submanifold's chart, into ambient
    /// coordinates.
    pub fn embed_point(&self, coords: &[f64]) -> Result<Vec<f64>> {
        self.embedding.map_point(coords)
    }

    /// Pushforward (Jacobian of the embedding) at a point of the
    /// submanifold's chart.
    pub fn pushforward(&self, coords: &[f64]) -> Result<DMatrix<f64>> {
        self.embedding.jacobian(coords)
    }
}

impl fmt::Display for Submanifold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.manifold.fmt(f)
    }
}
