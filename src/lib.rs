use std::cmp::Ordering;

pub mod beachline;
mod diagram;
mod error;
pub mod event;
mod fortune;
mod heap;

pub use beachline::{ArcId, Beachline, BreakpointId};
pub use diagram::{Diagram, Edge, EdgeShape, VertexIdx};
pub use error::VoronoiError;
pub use event::{CircleEvent, EventId, EventQueue, SiteEvent, VoronoiEvent};
pub use fortune::{
    compute, compute_with, fortune_algorithm, DuplicatePolicy, ProcessedEvent, Progress,
    SweepOptions, SweepStats,
};

#[cfg(test)]
mod test;

/// Trace output of the sweep. Compiled to `log::trace!`, so it costs nothing unless a logger is
/// installed with the trace level enabled.
#[macro_export]
macro_rules! debugln {
    ($($arg:tt)*) => {
        ::log::trace!($($arg)*)
    };
}

/// Absolute tolerance for "numerically equal" comparisons.
pub const EPSILON: f64 = 1e-9;

/// Largest accepted coordinate magnitude. The breakpoint quadratic has terms of the fourth power
/// of the coordinates, which must stay finite.
pub const MAX_COORDINATE: f64 = 1e50;

/// A point in 2D space. It is ordered in lexicographic order, by `y` first.
#[derive(PartialEq, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl std::ops::Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}
impl std::ops::Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}
impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// The z component of the cross product `self x other`.
    pub fn perp_dot(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// This vector rotated by 90 degrees counterclockwise.
    pub fn perp(&self) -> Self {
        Self::new(-self.y, self.x)
    }

    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    pub fn dist(&self, other: Self) -> f64 {
        (*self - other).length()
    }

    pub fn midpoint(&self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}
impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}
impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}
impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Point")
            .field(&self.x)
            .field(&self.y)
            .finish()
    }
}
impl std::hash::Hash for Point {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.x.to_bits().hash(state);
        self.y.to_bits().hash(state);
    }
}
impl Eq for Point {}
impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y
            .total_cmp(&other.y)
            .then_with(|| self.x.total_cmp(&other.x))
    }
}

pub type SiteIdx = u32;

/// Convert raw coordinate tuples into sites, rejecting any entry that is not exactly 2D.
pub fn sites_from_coordinates<C: AsRef<[f64]>>(coords: &[C]) -> Result<Vec<Point>, VoronoiError> {
    coords
        .iter()
        .enumerate()
        .map(|(index, c)| match *c.as_ref() {
            [x, y] => Ok(Point::new(x, y)),
            ref other => Err(VoronoiError::Dimension {
                index,
                dimension: other.len(),
            }),
        })
        .collect()
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON
}
