use crate::error::{KataError, Result};
use crate::power_plant::loc::Loc;
use crate::power_plant::transmission::{
    line_cost, search_bounds, CostPoint, LineCost, Orientation,
};

/// Most integer trunk positions [`brute_force`] will try.
pub const MAX_LINES: i64 = 10_000_000;

/// Result of trying every integer trunk position.
#[derive(Debug, Clone, PartialEq)]
pub struct BruteForce {
    /// Cheapest position found; ties keep the western-most one.
    pub best: LineCost,
    /// Every tried position, west to east.
    pub samples: Vec<CostPoint>,
}

/// Tries every integer trunk position between the most western and the most eastern plant.
///
/// If no integer lies between the bounds the western bound itself is the only candidate.
///
/// # Errors
///
/// `KataError::EmptyInstance` if there are no plants, and `KataError::InvalidParameter` if the
/// plants span more than [`MAX_LINES`] integer positions.
#[allow(clippy::cast_possible_truncation)]
pub fn brute_force(plants: &[Loc], orientation: Orientation) -> Result<BruteForce> {
    let (west, east) = search_bounds(plants, orientation).ok_or(KataError::EmptyInstance("plants"))?;

    let first = west.ceil() as i64;
    let last = east.floor() as i64;
    if last.saturating_sub(first) >= MAX_LINES {
        return Err(KataError::InvalidParameter(format!(
            "plants span {first}..={last}, more than {MAX_LINES} lines to try"
        )));
    }

    let mut best: Option<LineCost> = None;
    let mut samples = Vec::new();

    let mut consider = |line: f64| {
        let cost = line_cost(plants, line, orientation);
        samples.push(CostPoint::from(&cost));
        if best.is_none_or(|b| cost.cost < b.cost) {
            best = Some(cost);
        }
    };

    if first > last {
        consider(west);
    } else {
        for line in first..=last {
            #[allow(clippy::cast_precision_loss)]
            consider(line as f64);
        }
    }

    let best = best.ok_or(KataError::EmptyInstance("transmission lines"))?;
    Ok(BruteForce { best, samples })
}
