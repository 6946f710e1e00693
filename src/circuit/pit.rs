use crate::error::{KataError, Result};
use crate::input::{data_lines, numbers};
use std::fmt::Display;
use std::io::{self, BufRead};
use std::path::Path;

/// A pit on the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pit {
    /// 1-based position on the circuit, used for display only.
    pub label: usize,
    /// Fuel taken on at this pit.
    pub fuel: i64,
    /// Fuel burnt driving to the next pit.
    pub cost: i64,
}

impl Pit {
    /// A pit at position `label` giving `fuel` and needing `cost` to reach the next pit.
    #[must_use]
    pub const fn new(label: usize, fuel: i64, cost: i64) -> Self {
        Self { label, fuel, cost }
    }

    /// Change in the tank from arriving at this pit to arriving at the next one.
    #[must_use]
    pub const fn net(&self) -> i64 {
        self.fuel - self.cost
    }
}

impl Display for Pit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pit {} (+{} -{})", self.label, self.fuel, self.cost)
    }
}

/// A 13 pit circuit that can be driven starting from pit 1.
pub const EXAMPLE_PITS_ONE: [Pit; 13] = [
    Pit::new(1, 9, 5),
    Pit::new(2, 1, 4),
    Pit::new(3, 9, 4),
    Pit::new(4, 5, 2),
    Pit::new(5, 7, 9),
    Pit::new(6, 3, 2),
    Pit::new(7, 2, 4),
    Pit::new(8, 6, 3),
    Pit::new(9, 1, 6),
    Pit::new(10, 2, 4),
    Pit::new(11, 7, 4),
    Pit::new(12, 0, 2),
    Pit::new(13, 1, 4),
];

/// The first circuit rotated so that the only possible start is pit 8.
pub const EXAMPLE_PITS_TWO: [Pit; 13] = [
    Pit::new(1, 2, 4),
    Pit::new(2, 6, 3),
    Pit::new(3, 1, 6),
    Pit::new(4, 2, 4),
    Pit::new(5, 7, 4),
    Pit::new(6, 0, 2),
    Pit::new(7, 1, 4),
    Pit::new(8, 9, 5),
    Pit::new(9, 1, 4),
    Pit::new(10, 9, 4),
    Pit::new(11, 5, 2),
    Pit::new(12, 7, 9),
    Pit::new(13, 3, 2),
];

/// Largest fuel amount accepted from a pit file. Tank sums over any circuit that fits in memory
/// stay far inside `i64`.
pub const MAX_FUEL: i64 = 1_000_000_000;

/// Parses a pit file: one `fuel cost` pair per line, in circuit order.
///
/// Labels are assigned from 1 in file order.
///
/// # Errors
///
/// `KataError::Parse` for lines that are not two integers or that hold amounts outside
/// `0..=MAX_FUEL`, and `KataError::Io` if reading fails.
pub fn parse_pits<R: BufRead>(reader: R) -> Result<Vec<Pit>> {
    data_lines(reader)?
        .into_iter()
        .enumerate()
        .map(|(idx, (line_no, line))| {
            let [fuel, cost]: [i64; 2] = numbers(line_no, &line)?;
            if fuel < 0 || cost < 0 {
                return Err(KataError::parse(line_no, "fuel amounts must not be negative"));
            }
            if fuel > MAX_FUEL || cost > MAX_FUEL {
                return Err(KataError::parse(
                    line_no,
                    format!("fuel amounts must not exceed {MAX_FUEL}"),
                ));
            }
            Ok(Pit::new(idx + 1, fuel, cost))
        })
        .collect()
}

/// Parses the pit file at `path`.
///
/// # Errors
///
/// See [`parse_pits`].
pub fn parse_pits_file(path: impl AsRef<Path>) -> Result<Vec<Pit>> {
    let file = std::fs::File::open(path)?;
    parse_pits(io::BufReader::new(file))
}

/// Writes `pits` in the format read by [`parse_pits`].
#[must_use]
pub fn format_pits(pits: &[Pit]) -> String {
    let body: String = pits
        .iter()
        .map(|pit| format!("{} {}\n", pit.fuel, pit.cost))
        .collect();
    format!("c {} pits\n{body}", pits.len())
}

/// A random circuit of `n` pits with amounts in `0..=9` that can always be completed.
///
/// If the drawn amounts burn more fuel than they supply, the deficit is added to one randomly
/// chosen pit.
#[must_use]
pub fn random_pits(rng: &mut fastrand::Rng, n: usize) -> Vec<Pit> {
    let mut pits: Vec<Pit> = (1..=n)
        .map(|label| Pit::new(label, rng.i64(0..=9), rng.i64(0..=9)))
        .collect();

    let total: i64 = pits.iter().map(Pit::net).sum();
    if total < 0 && !pits.is_empty() {
        let idx = rng.usize(..pits.len());
        pits[idx].fuel -= total;
    }
    pits
}
