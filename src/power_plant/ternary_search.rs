use crate::error::{KataError, Result};
use crate::power_plant::loc::Loc;
use crate::power_plant::transmission::{
    line_cost, search_bounds, CostPoint, LineCost, Orientation,
};

/// Default width at which the search interval is considered converged.
pub const DEFAULT_EPS: f64 = 1e-1;

/// Result of a ternary search, with every probe that was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct TernarySearch {
    /// Trunk at the western end of the final interval.
    pub best: LineCost,
    /// Probes at one third of the interval.
    pub left_probes: Vec<CostPoint>,
    /// Probes at two thirds of the interval.
    pub right_probes: Vec<CostPoint>,
    /// Number of times the interval was narrowed.
    pub iterations: usize,
}

/// Ternary search for the cheapest trunk position.
///
/// The search interval starts at the outermost plants and shrinks by a third every iteration,
/// dropping the side whose probe is more expensive, until it is at most `eps` wide. The cost
/// function is convex, so the interval always keeps a minimiser; the reported position is the
/// western end of the final interval. The search also stops once the interval no longer shrinks,
/// which happens when floating point spacing at the plants' coordinates exceeds `eps`.
///
/// # Errors
///
/// `KataError::EmptyInstance` for no plants, `KataError::InvalidParameter` if `eps` is not a
/// positive number.
pub fn ternary_search(plants: &[Loc], orientation: Orientation, eps: f64) -> Result<TernarySearch> {
    if eps.is_nan() || eps <= 0.0 {
        return Err(KataError::InvalidParameter(format!(
            "eps must be positive, got {eps}"
        )));
    }

    let (mut west, mut east) =
        search_bounds(plants, orientation).ok_or(KataError::EmptyInstance("plants"))?;

    let mut left_probes = Vec::new();
    let mut right_probes = Vec::new();
    let mut iterations = 0;

    while east - west > eps {
        // [west - mid1 - mid2 - east]
        let third = (east - west) / 3.0;
        let mid1 = line_cost(plants, west + third, orientation);
        let mid2 = line_cost(plants, east - third, orientation);
        left_probes.push(CostPoint::from(&mid1));
        right_probes.push(CostPoint::from(&mid2));

        let (next_west, next_east) = if mid1.cost < mid2.cost {
            (west, mid2.line)
        } else {
            (mid1.line, east)
        };
        iterations += 1;

        // Far from the origin adjacent floats can be further apart than eps.
        let stalled = next_east - next_west >= east - west;
        (west, east) = (next_west, next_east);
        if stalled {
            break;
        }
    }

    Ok(TernarySearch {
        best: line_cost(plants, west, orientation),
        left_probes,
        right_probes,
        iterations,
    })
}
