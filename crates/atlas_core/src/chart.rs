//! Coordinate charts.
//!
//! A chart is a named coordinate system on a manifold. Its coordinates are
//! declared with a compact symbol string: coordinates are separated by
//! whitespace or `,`, and each coordinate has up to three `:`-separated
//! fields:
//!
//! 1. the coordinate symbol;
//! 2. (optional) either the keyword `positive` for a coordinate restricted to
//!    positive values, or the LaTeX spelling of the coordinate;
//! 3. (optional) the LaTeX spelling when the second field is `positive`.
//!
//! Examples: `"u v"`, `"r:positive ph:\\phi"`, `"th:\\theta"`.

use crate::error::{GeometryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single chart coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Symbol used in coordinate expressions.
    pub symbol: String,
    /// LaTeX spelling; defaults to the symbol.
    pub latex: String,
    /// Whether the coordinate is restricted to positive values.
    pub positive: bool,
}

/// Parses a coordinate-symbol string into its coordinates.
pub fn parse_coord_spec(spec: &str) -> Result<Vec<Coordinate>> {
    let entries: Vec<&str> = spec
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    if entries.is_empty() {
        return Err(GeometryError::CoordSpec(
            "no coordinates declared".to_string(),
        ));
    }

    let mut coordinates = Vec::with_capacity(entries.len());
    for entry in entries {
        let fields: Vec<&str> = entry.split(':').collect();
        if fields.iter().any(|f| f.is_empty()) {
            return Err(GeometryError::CoordSpec(format!(
                "empty field in '{}'",
                entry
            )));
        }
        let coordinate = match fields.as_slice() {
            [symbol] => Coordinate {
                symbol: symbol.to_string(),
                latex: symbol.to_string(),
                positive: false,
            },
            [symbol, "positive"] => Coordinate {
                symbol: symbol.to_string(),
                latex: symbol.to_string(),
                positive: true,
            },
            [symbol, latex] => Coordinate {
                symbol: symbol.to_string(),
                latex: latex.to_string(),
                positive: false,
            },
            [symbol, "positive", latex] => Coordinate {
                symbol: symbol.to_string(),
                latex: latex.to_string(),
                positive: true,
            },
            [_, second, _] => {
                return Err(GeometryError::CoordSpec(format!(
                    "second field of '{}' must be 'positive', got '{}'",
                    entry, second
                )))
            }
            _ => {
                return Err(GeometryError::CoordSpec(format!(
                    "too many fields in '{}'",
                    entry
                )))
            }
        };
        if coordinates
            .iter()
            .any(|c: &Coordinate| c.symbol == coordinate.symbol)
        {
            return Err(GeometryError::CoordSpec(format!(
                "duplicate coordinate symbol '{}'",
                coordinate.symbol
            )));
        }
        coordinates.push(coordinate);
    }
    Ok(coordinates)
}

/// A named coordinate system covering (part of) a manifold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    name: String,
    coordinates: Vec<Coordinate>,
}

impl Chart {
    pub(crate) fn new(name: &str, coordinates: Vec<Coordinate>) -> Self {
        Self {
            name: name.to_string(),
            coordinates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Number of coordinates.
    pub fn dim(&self) -> usize {
        self.coordinates.len()
    }

    /// Coordinate symbols, in declaration order.
    pub fn symbols(&self) -> Vec<String> {
        self.coordinates.iter().map(|c| c.symbol.clone()).collect()
    }

    /// First coordinate (by index) whose restriction the point violates.
    pub(crate) fn violated_restriction(&self, coords: &[f64]) -> Option<&Coordinate> {
        self.coordinates
            .iter()
            .zip(coords)
            .find(|(c, &value)| c.positive && value <= 0.0)
            .map(|(c, _)| c)
    }

    /// Whether the point has the right arity and satisfies all coordinate
    /// restrictions.
    pub fn contains(&self, coords: &[f64]) -> bool {
        coords.len() == self.dim() && self.violated_restriction(coords).is_none()
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.coordinates.iter().map(|c| c.symbol.as_str()).collect();
        write!(f, "chart '{}' ({})", self.name, symbols.join(", "))
    }
}
