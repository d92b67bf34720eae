use thiserror::Error;

use crate::SiteIdx;

/// Input rejected before any sweep state is created.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoronoiError {
    #[error("the input contains no sites")]
    Empty,
    #[error("site {index} has {dimension} coordinates, expected exactly 2")]
    Dimension { index: usize, dimension: usize },
    #[error("site {index} has a non-finite coordinate")]
    NonFinite { index: SiteIdx },
    #[error("site {index} has a coordinate larger than {max} in magnitude")]
    OutOfRange { index: SiteIdx, max: f64 },
    #[error("site {index} coincides with site {first}")]
    Duplicate { index: SiteIdx, first: SiteIdx },
    #[error("too many sites: {count} exceeds the maximum of {max}")]
    TooManySites { count: usize, max: usize },
}
