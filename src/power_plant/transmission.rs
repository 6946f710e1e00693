//! The transmission line cost function.
//!
//! A straight trunk line is laid through the plant field and every plant is connected to it by
//! a perpendicular spur. For a north-south trunk at east-west position `line` the cost is
//!
//! ```text
//! cost(line) = sum |p.x - line| + (max p.y - min p.y)
//! ```
//!
//! The trunk length does not depend on `line`, so the cost is a convex piecewise linear function
//! of `line` whose minimum lies at a median of the plant x coordinates.

use crate::power_plant::loc::Loc;
use clap::ValueEnum;
use std::fmt::Display;

/// Direction in which the trunk line runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum Orientation {
    /// Trunk runs north-south, positioned along the x axis.
    #[default]
    NorthSouth,
    /// Trunk runs east-west, positioned along the y axis.
    EastWest,
}

impl Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NorthSouth => write!(f, "north-south"),
            Self::EastWest => write!(f, "east-west"),
        }
    }
}

impl Orientation {
    /// Coordinate along which the line is positioned, and the coordinate the trunk spans.
    const fn axes(self, loc: &Loc) -> (f64, f64) {
        match self {
            Self::NorthSouth => (loc.x, loc.y),
            Self::EastWest => (loc.y, loc.x),
        }
    }

    const fn point(self, line: f64, along: f64) -> Loc {
        match self {
            Self::NorthSouth => Loc::new(line, along),
            Self::EastWest => Loc::new(along, line),
        }
    }
}

/// Cost of a trunk at a given position, with the trunk end points.
///
/// For an east-west trunk `north` holds the eastern end and `south` the western end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineCost {
    /// Position of the trunk along the search axis.
    pub line: f64,
    /// Spur lengths plus trunk length.
    pub cost: f64,
    /// Northern end of the trunk.
    pub north: Loc,
    /// Southern end of the trunk.
    pub south: Loc,
}

impl Display for LineCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {} cost {} from {} to {}",
            self.line, self.cost, self.north, self.south
        )
    }
}

/// One sample of the cost curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostPoint {
    /// Trunk position.
    pub line: f64,
    /// Cost at that position.
    pub cost: f64,
}

impl From<&LineCost> for CostPoint {
    fn from(value: &LineCost) -> Self {
        Self {
            line: value.line,
            cost: value.cost,
        }
    }
}

/// Evaluates the cost of a trunk at `line`.
///
/// With no plants the cost is zero and both end points sit on the line at the origin.
#[must_use]
pub fn line_cost(plants: &[Loc], line: f64, orientation: Orientation) -> LineCost {
    let Some(first) = plants.first() else {
        let origin = orientation.point(line, 0.0);
        return LineCost {
            line,
            cost: 0.0,
            north: origin,
            south: origin,
        };
    };

    let (_, first_along) = orientation.axes(first);
    let mut most_north = first_along;
    let mut most_south = first_along;
    let mut spur_cost = 0.0;

    for plant in plants {
        let (across, along) = orientation.axes(plant);
        most_north = most_north.max(along);
        most_south = most_south.min(along);
        spur_cost += (across - line).abs();
    }

    LineCost {
        line,
        cost: spur_cost + (most_north - most_south),
        north: orientation.point(line, most_north),
        south: orientation.point(line, most_south),
    }
}

/// Most western and most eastern position of the plants along the search axis.
#[must_use]
pub fn search_bounds(plants: &[Loc], orientation: Orientation) -> Option<(f64, f64)> {
    plants
        .iter()
        .map(|p| orientation.axes(p).0)
        .fold(None, |bounds, v| match bounds {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
}
