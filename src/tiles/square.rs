use smallvec::SmallVec;
use std::fmt::Display;

/// A side colour, written as a single character (`w`, `y`, `b`, `r`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Colour(pub char);

impl Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four sides of a square, in the order colours are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Top edge.
    Top = 0,
    /// Right edge.
    Right = 1,
    /// Bottom edge.
    Bottom = 2,
    /// Left edge.
    Left = 3,
}

impl Side {
    /// Every side, in colour order.
    pub const ALL: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    /// The side that touches this one on a neighbouring square.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }
}

/// A square tile, colours always in the order top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Square {
    /// Top, right, bottom and left colour.
    pub colours: [Colour; 4],
}

impl Square {
    /// A square with the given colours, top first and clockwise.
    #[must_use]
    pub const fn new(colours: [Colour; 4]) -> Self {
        Self { colours }
    }

    /// Reads a four character code such as `"wybr"`.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let chars: SmallVec<[char; 4]> = code.chars().collect();
        let colours: [char; 4] = chars.into_inner().ok()?;
        if colours.iter().any(|c| c.is_whitespace()) {
            return None;
        }
        Some(Self::new(colours.map(Colour)))
    }

    /// The colours seen after `rotation` quarter turns, rotation `k` shifting the list left by
    /// `k`.
    #[must_use]
    pub fn rotated(&self, rotation: usize) -> [Colour; 4] {
        let mut colours = self.colours;
        colours.rotate_left(rotation % 4);
        colours
    }

    /// All four rotations, `wybr`, `ybrw`, `brwy`, `rwyb`.
    #[must_use]
    pub fn rotations(&self) -> [[Colour; 4]; 4] {
        [0, 1, 2, 3].map(|k| self.rotated(k))
    }

    /// Rotations that give a different colour order, smallest first. A single-colour square has
    /// one, a square with two alternating colours has two.
    #[must_use]
    pub fn distinct_rotations(&self) -> SmallVec<[usize; 4]> {
        let rotations = self.rotations();
        (0..4)
            .filter(|&k| !rotations[..k].contains(&rotations[k]))
            .collect()
    }

    /// Colour on `side` after `rotation` quarter turns.
    #[must_use]
    pub const fn side(&self, rotation: usize, side: Side) -> Colour {
        self.colours[(side as usize + rotation) % 4]
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.colours.iter().try_for_each(|c| write!(f, "{c}"))
    }
}

/// A square placed on the board: its index in the puzzle and how far it is rotated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    /// Index into the puzzle's squares.
    pub square: usize,
    /// Left shifts of the square's colours, `0..4`.
    pub rotation: usize,
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.square, self.rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(colours: [Colour; 4]) -> String {
        colours.iter().map(|c| c.0).collect()
    }

    #[test]
    fn test_rotations_shift_left() {
        let square = Square::parse("wybr").unwrap();
        let codes: Vec<String> = square.rotations().into_iter().map(code).collect();
        assert_eq!(codes, vec!["wybr", "ybrw", "brwy", "rwyb"]);
    }

    #[test]
    fn test_side_follows_rotation() {
        let square = Square::parse("wybr").unwrap();
        for rotation in 0..4 {
            let rotated = square.rotated(rotation);
            for side in Side::ALL {
                assert_eq!(square.side(rotation, side), rotated[side as usize]);
            }
        }
        assert_eq!(square.side(1, Side::Top), Colour('y'));
        assert_eq!(square.side(3, Side::Left), Colour('b'));
    }

    #[test]
    fn test_distinct_rotations() {
        assert_eq!(Square::parse("wybr").unwrap().distinct_rotations().as_slice(), &[0, 1, 2, 3]);
        assert_eq!(Square::parse("wbwb").unwrap().distinct_rotations().as_slice(), &[0, 1]);
        assert_eq!(Square::parse("kkkk").unwrap().distinct_rotations().as_slice(), &[0]);
    }

    #[test]
    fn test_parse_rejects_bad_codes() {
        assert!(Square::parse("wyb").is_none());
        assert!(Square::parse("wybrw").is_none());
        assert!(Square::parse("wy r").is_none());
        assert!(Square::parse("").is_none());
    }

    #[test]
    fn test_opposite_sides() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            assert_ne!(side.opposite(), side);
        }
    }

    #[test]
    fn test_display() {
        let square = Square::parse("wybr").unwrap();
        assert_eq!(square.to_string(), "wybr");
        assert_eq!(Placement { square: 3, rotation: 2 }.to_string(), "3@2");
    }
}
