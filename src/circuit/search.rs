use crate::circuit::pit::Pit;

/// `net` of a pit, widened so that sums over a lap cannot overflow.
fn wide_net(pit: &Pit) -> i128 {
    i128::from(pit.fuel) - i128::from(pit.cost)
}

/// Index of the pit to start from so that the whole lap can be driven, or `None` if the circuit
/// burns more fuel than it supplies (or has no pits).
///
/// Single pass: whenever the tank would go negative on the way out of a pit, no pit between the
/// current start and this one can work, so the start moves to the next pit and the tank is
/// emptied. The start that survives is the first feasible one.
#[must_use]
pub fn search_start_pit(pits: &[Pit]) -> Option<usize> {
    let mut start = 0;
    let mut tank = 0;
    let mut total = 0;

    for (i, pit) in pits.iter().enumerate() {
        let net = wide_net(pit);
        if tank + net < 0 {
            start = i + 1;
            tank = 0;
        } else {
            tank += net;
        }
        total += net;
    }

    (total >= 0 && start < pits.len()).then_some(start)
}

/// Fuel in the tank on arrival at each pit of one lap from `start`, as `(label, fuel)`.
///
/// The first entry is the start pit with an empty tank. Tank levels beyond the `i64` range
/// saturate.
///
/// # Panics
///
/// If `start` is out of range for a non-empty circuit.
#[must_use]
pub fn fuel_trace(pits: &[Pit], start: usize) -> Vec<(usize, i64)> {
    if pits.is_empty() {
        return Vec::new();
    }
    assert!(start < pits.len(), "start pit {start} out of range");

    let mut tank: i64 = 0;
    pits.iter()
        .cycle()
        .skip(start)
        .take(pits.len())
        .map(|pit| {
            let arrival = (pit.label, tank);
            tank = tank.saturating_add(pit.fuel).saturating_sub(pit.cost);
            arrival
        })
        .collect()
}

/// Whether a lap from `start` never leaves a pit with a negative tank.
#[must_use]
pub fn is_feasible_start(pits: &[Pit], start: usize) -> bool {
    if start >= pits.len() {
        return false;
    }

    let mut tank = 0;
    pits.iter()
        .cycle()
        .skip(start)
        .take(pits.len())
        .all(|pit| {
            tank += wide_net(pit);
            tank >= 0
        })
}

/// The first feasible start, trying every pit in turn.
#[must_use]
pub fn brute_force_start(pits: &[Pit]) -> Option<usize> {
    (0..pits.len()).find(|&start| is_feasible_start(pits, start))
}
