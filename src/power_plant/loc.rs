use crate::error::{KataError, Result};
use crate::input::{data_lines, numbers};
use ordered_float::OrderedFloat;
use std::fmt::Display;
use std::hash::{Hash, Hasher};
use std::io::{self, BufRead};
use std::path::Path;

/// A location in the plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loc {
    /// East-west coordinate.
    pub x: f64,
    /// North-south coordinate.
    pub y: f64,
}

impl Loc {
    /// The point `(x, y)`.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    const fn key(&self) -> (OrderedFloat<f64>, OrderedFloat<f64>) {
        (OrderedFloat(self.x), OrderedFloat(self.y))
    }
}

impl PartialEq for Loc {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Loc {}

impl Hash for Loc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl From<(f64, f64)> for Loc {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A weighted edge between two locations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// One end.
    pub from: Loc,
    /// The other end.
    pub to: Loc,
    /// Length of the edge.
    pub cost: f64,
}

impl Edge {
    /// The straight edge from `from` to `to`, costing its length.
    #[must_use]
    pub fn between(from: Loc, to: Loc) -> Self {
        Self {
            from,
            to,
            cost: from.distance(&to),
        }
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} [{:.3}]", self.from, self.to, self.cost)
    }
}

/// Arithmetic mean of three locations.
#[must_use]
pub fn centroid(a: Loc, b: Loc, c: Loc) -> Loc {
    Loc::new((a.x + b.x + c.x) / 3.0, (a.y + b.y + c.y) / 3.0)
}

/// Eight example plants.
pub const EXAMPLE_PLANTS: [Loc; 8] = [
    Loc::new(12.0, 22.0),
    Loc::new(16.0, 38.0),
    Loc::new(18.0, 30.0),
    Loc::new(23.0, 23.0),
    Loc::new(22.0, 35.0),
    Loc::new(36.0, 26.0),
    Loc::new(32.0, 36.0),
    Loc::new(40.0, 35.0),
];

/// Parses plant locations, one `x y` pair per line.
///
/// Comment lines (`c`), blank lines and anything after a `%` line are ignored.
///
/// # Errors
///
/// `KataError::Parse` if a data line is not exactly two numbers, `KataError::Io` on read failure.
pub fn parse_plants<R: BufRead>(reader: R) -> Result<Vec<Loc>> {
    data_lines(reader)?
        .into_iter()
        .map(|(line_no, line)| {
            let [x, y]: [f64; 2] = numbers(line_no, &line)?;
            if x.is_finite() && y.is_finite() {
                Ok(Loc::new(x, y))
            } else {
                Err(KataError::parse(line_no, "coordinates must be finite"))
            }
        })
        .collect()
}

/// Parses a plant file.
///
/// # Errors
///
/// If the file cannot be opened or is malformed.
pub fn parse_plants_file(path: impl AsRef<Path>) -> Result<Vec<Loc>> {
    let file = std::fs::File::open(path)?;
    parse_plants(io::BufReader::new(file))
}

/// Formats plants in the format read by `parse_plants`.
#[must_use]
pub fn format_plants(plants: &[Loc]) -> String {
    let body: String = plants
        .iter()
        .map(|plant| format!("{} {}\n", plant.x, plant.y))
        .collect();
    format!("c {} plants\n{body}", plants.len())
}

/// Generates `n` random plants on an integer grid of the given extent.
pub fn random_plants(rng: &mut fastrand::Rng, n: usize, extent: u32) -> Vec<Loc> {
    (0..n)
        .map(|_| {
            Loc::new(
                f64::from(rng.u32(0..=extent)),
                f64::from(rng.u32(0..=extent)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;
    use std::io::Cursor;

    #[test]
    fn test_distance() {
        let a = Loc::new(0.0, 0.0);
        let b = Loc::new(3.0, 4.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance(&a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_loc_hash_and_eq() {
        let set: FxHashSet<Loc> = [Loc::new(1.0, 2.0), Loc::new(1.0, 2.0), Loc::new(2.0, 1.0)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_centroid() {
        let c = centroid(Loc::new(0.0, 0.0), Loc::new(3.0, 0.0), Loc::new(0.0, 3.0));
        assert_eq!(c, Loc::new(1.0, 1.0));
    }

    #[test]
    fn test_edge_display() {
        let edge = Edge::between(Loc::new(0.0, 0.0), Loc::new(3.0, 4.0));
        assert_eq!(edge.to_string(), "(0, 0) -> (3, 4) [5.000]");
    }

    #[test]
    fn test_parse_plants() {
        let content = "c power plants\n12 22\n16 38\n\n18.5 30\n%\nignored";
        let plants = parse_plants(Cursor::new(content)).unwrap();
        assert_eq!(
            plants,
            vec![
                Loc::new(12.0, 22.0),
                Loc::new(16.0, 38.0),
                Loc::new(18.5, 30.0)
            ]
        );
    }

    #[test]
    fn test_parse_plants_malformed() {
        let err = parse_plants(Cursor::new("1 2\n3\n")).unwrap_err();
        assert!(matches!(err, KataError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_format_round_trip_of_examples() {
        let text = format_plants(&EXAMPLE_PLANTS);
        let plants = parse_plants(Cursor::new(text)).unwrap();
        assert_eq!(plants, EXAMPLE_PLANTS.to_vec());
    }

    #[test]
    fn test_random_plants_within_extent() {
        let mut rng = fastrand::Rng::with_seed(7);
        let plants = random_plants(&mut rng, 20, 50);
        assert_eq!(plants.len(), 20);
        assert!(plants
            .iter()
            .all(|p| (0.0..=50.0).contains(&p.x) && (0.0..=50.0).contains(&p.y)));
    }
}
