//! Error taxonomy for chart, manifold, and embedding construction.
//!
//! Construction failures are immediate and synchronous: a failed constructor
//! returns an error and leaves no partially built object behind.

use thiserror::Error;

/// Errors raised while building charts, manifolds, embeddings, or plots.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A manifold must have at least one dimension.
    #[error("manifold dimension must be positive")]
    ZeroDimension,

    /// The coordinate-symbol string could not be parsed.
    #[error("invalid coordinate specification: {0}")]
    CoordSpec(String),

    /// A chart declared a different number of coordinates than the manifold
    /// has dimensions.
    #[error("chart '{chart}' declares {got} coordinates but the manifold has dimension {expected}")]
    CoordCountMismatch {
        chart: String,
        expected: usize,
        got: usize,
    },

    /// A chart with this name is already registered on the manifold.
    #[error("a chart named '{0}' is already registered")]
    DuplicateChart(String),

    /// No chart with this name is registered on the manifold.
    #[error("no chart named '{0}' is registered")]
    UnknownChart(String),

    /// The manifold has no charts, so no default chart can be chosen.
    #[error("{0} has no charts registered")]
    EmptyAtlas(String),

    /// A coordinate expression string could not be parsed.
    #[error("failed to parse expression '{input}': {reason}")]
    Parse { input: String, reason: String },

    /// An expression references a symbol that is not a chart coordinate.
    #[error("unknown symbol '{0}' in coordinate expression")]
    UnknownSymbol(String),

    /// An expression calls a function the engine does not provide.
    #[error("unknown function '{0}' in coordinate expression")]
    UnknownFunction(String),

    /// The number of embedding coordinate functions does not match the
    /// ambient manifold's dimension.
    #[error("{expected} coordinate functions must be provided, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A point or range list has the wrong number of entries for the chart.
    #[error("expected {expected} coordinates, got {got}")]
    ArityMismatch { expected: usize, got: usize },

    /// A point violates a coordinate restriction of the chart.
    #[error("coordinate '{symbol}' of chart '{chart}' is restricted to positive values")]
    OutsideDomain { chart: String, symbol: String },

    /// Plotting is only available for submanifolds of R2 or R3 with
    /// Cartesian coordinates.
    #[error("plotting is implemented only for submanifolds of R2 or R3 with Cartesian coordinates: {0}")]
    UnsupportedAmbient(String),

    /// Plotting is only available for submanifolds of dimension 1 or 2.
    #[error("the dimension must be at most 2 for plotting, got {0}")]
    UnsupportedDimension(usize),

    /// A coordinate range is empty or non-finite.
    #[error("invalid coordinate range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, GeometryError>;
