pub mod autodiff;
pub mod chart;
pub mod curve;
pub mod diffmap;
pub mod error;
pub mod expr;
pub mod manifold;
pub mod plot;
pub mod submanifold;
/// The `atlas_core` crate provides embedded submanifolds of differentiable
/// manifolds, defined by symbolic coordinate expressions.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction shared by f64 and Dual).
/// - **Expression Engine**: parser and bytecode VM for chart coordinate functions.
/// - **Manifolds**: `Manifold` with an atlas of `Chart`s; `Submanifold` and
///   `Curve` carry an embedding `DiffMap` into an ambient manifold.
/// - **Autodiff**: Dual numbers for embedding Jacobians and curve tangents.
/// - **Plot**: sampling of embeddings into serializable 2-D/3-D geometry.
pub mod traits;
