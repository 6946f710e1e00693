use crate::error::{KataError, Result};
use crate::input::data_lines;
use crate::tiles::square::{Colour, Placement, Side, Square};
use bit_vec::BitVec;
use itertools::Itertools;
use std::fmt::Display;
use std::io::{self, BufRead};
use std::path::Path;

/// Colours handed out by [`random_tiles`], in order.
pub const PALETTE: [char; 8] = ['w', 'y', 'b', 'r', 'g', 'o', 'm', 'p'];

/// A 3 x 3 puzzle with a black (`k`) frame. It has four solutions, one for each way the
/// completed board can be turned.
pub const EXAMPLE_FRAMED: [&str; 9] = [
    "wwbk", "kryr", "wkkb", "rbkk", "bywk", "bkyw", "wyyw", "wykk", "kbrk",
];

/// A grid of optionally filled cells, stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// `rows * cols` cells, row by row.
    pub cells: Vec<Option<Placement>>,
}

impl Board {
    /// An empty `rows` x `cols` board.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    /// Placement at `(row, col)`; `None` for an empty or out of range cell.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<Placement> {
        self.cells.get(row * self.cols + col).copied().flatten()
    }

    /// Whether every cell is filled.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.len() == self.rows * self.cols && self.cells.iter().all(Option::is_some)
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.cols.max(1)) {
            let line = row
                .iter()
                .map(|cell| cell.map_or_else(|| ".".to_string(), |p| p.to_string()))
                .join(" ");
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Counters collected while searching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TileStats {
    /// Squares put down on the board.
    pub placements: usize,
    /// Squares taken back up again.
    pub backtracks: usize,
}

/// A set of squares to be laid out on a `rows` x `cols` grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    /// The squares to place, identified by index.
    pub squares: Vec<Square>,
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Colour every side on the border must show, if any.
    pub frame: Option<Colour>,
}

impl Puzzle {
    /// Puzzle over `squares`, laid out in a `rows` x `cols` grid without a frame.
    ///
    /// # Errors
    ///
    /// `KataError::InvalidParameter` if the grid has more cells than fit in a `usize`, and
    /// `KataError::InvalidBoard` unless there is exactly one square per cell.
    pub fn new(squares: Vec<Square>, rows: usize, cols: usize) -> Result<Self> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            KataError::InvalidParameter(format!("a {rows} x {cols} grid is too large"))
        })?;
        if squares.len() != expected {
            return Err(KataError::InvalidBoard {
                expected,
                got: squares.len(),
            });
        }
        Ok(Self {
            squares,
            rows,
            cols,
            frame: None,
        })
    }

    /// Sets the frame colour.
    #[must_use]
    pub const fn with_frame(mut self, frame: Option<Colour>) -> Self {
        self.frame = frame;
        self
    }

    /// The framed 3 x 3 example puzzle.
    #[must_use]
    pub fn example() -> Self {
        Self {
            squares: EXAMPLE_FRAMED.iter().filter_map(|c| Square::parse(c)).collect(),
            rows: 3,
            cols: 3,
            frame: Some(Colour('k')),
        }
    }

    fn colour_at(&self, placement: Placement, side: Side) -> Colour {
        self.squares[placement.square].side(placement.rotation, side)
    }

    /// Whether `placement` fits at `cell`, given the board filled in row-major order up to it.
    fn fits(&self, cells: &[Option<Placement>], cell: usize, placement: Placement) -> bool {
        let (row, col) = (cell / self.cols, cell % self.cols);
        let colour = |side| self.colour_at(placement, side);

        if row > 0 {
            if let Some(above) = cells[cell - self.cols] {
                if self.colour_at(above, Side::Bottom) != colour(Side::Top) {
                    return false;
                }
            }
        }
        if col > 0 {
            if let Some(left) = cells[cell - 1] {
                if self.colour_at(left, Side::Right) != colour(Side::Left) {
                    return false;
                }
            }
        }

        self.frame.is_none_or(|frame| {
            (row != 0 || colour(Side::Top) == frame)
                && (row + 1 != self.rows || colour(Side::Bottom) == frame)
                && (col != 0 || colour(Side::Left) == frame)
                && (col + 1 != self.cols || colour(Side::Right) == frame)
        })
    }

    /// First solution in search order, filling cells row by row and trying squares by index and
    /// rotations from 0.
    #[must_use]
    pub fn solve(&self) -> (Option<Board>, TileStats) {
        let mut search = Search::new(self);
        let mut found = None;
        search.fill(0, &mut |cells| {
            found = Some(cells.to_vec());
            true
        });

        let board = found.map(|cells| Board {
            rows: self.rows,
            cols: self.cols,
            cells,
        });
        (board, search.stats)
    }

    /// Number of solutions, counting at most `limit`.
    ///
    /// Squares with identical colours are told apart, so swapping them gives a new solution.
    #[must_use]
    pub fn count_solutions(&self, limit: usize) -> usize {
        if limit == 0 {
            return 0;
        }
        let mut search = Search::new(self);
        let mut count = 0;
        search.fill(0, &mut |_| {
            count += 1;
            count >= limit
        });
        count
    }

    /// Whether `board` is a complete solution: the right size, every square used exactly once and
    /// every neighbour and frame rule respected.
    #[must_use]
    pub fn verify(&self, board: &Board) -> bool {
        if board.rows != self.rows || board.cols != self.cols || !board.is_complete() {
            return false;
        }

        let mut used = BitVec::from_elem(self.squares.len(), false);
        for placement in board.cells.iter().flatten() {
            if placement.square >= self.squares.len()
                || placement.rotation >= 4
                || used[placement.square]
            {
                return false;
            }
            used.set(placement.square, true);
        }

        (0..board.cells.len()).all(|cell| {
            board.cells[cell].is_some_and(|placement| self.fits(&board.cells, cell, placement))
        })
    }
}

/// State of one backtracking run.
struct Search<'a> {
    puzzle: &'a Puzzle,
    cells: Vec<Option<Placement>>,
    used: BitVec,
    stats: TileStats,
}

impl<'a> Search<'a> {
    fn new(puzzle: &'a Puzzle) -> Self {
        Self {
            puzzle,
            cells: vec![None; puzzle.rows * puzzle.cols],
            used: BitVec::from_elem(puzzle.squares.len(), false),
            stats: TileStats::default(),
        }
    }

    /// Fills `cell` and everything after it. `on_complete` sees every full board and returns
    /// `true` to stop the search, which is then reported back up.
    fn fill(&mut self, cell: usize, on_complete: &mut impl FnMut(&[Option<Placement>]) -> bool) -> bool {
        if cell == self.cells.len() {
            return on_complete(&self.cells);
        }

        for square in 0..self.puzzle.squares.len() {
            if self.used[square] {
                continue;
            }
            for rotation in self.puzzle.squares[square].distinct_rotations() {
                let placement = Placement { square, rotation };
                if !self.puzzle.fits(&self.cells, cell, placement) {
                    continue;
                }

                self.cells[cell] = Some(placement);
                self.used.set(square, true);
                self.stats.placements += 1;

                if self.fill(cell + 1, on_complete) {
                    return true;
                }

                self.cells[cell] = None;
                self.used.set(square, false);
                self.stats.backtracks += 1;
            }
        }
        false
    }
}

/// Parses a tile file.
///
/// The first data line is `p tiles <rows> <cols> [frame]`; the rest hold whitespace separated
/// four character square codes, as many per line as convenient.
///
/// # Errors
///
/// `KataError::Parse` for a missing or malformed header or square code,
/// `KataError::InvalidBoard` if the number of squares does not match the grid, and
/// `KataError::Io` if reading fails.
pub fn parse_tiles<R: BufRead>(reader: R) -> Result<Puzzle> {
    let lines = data_lines(reader)?;
    let Some(((header_no, header), body)) = lines.split_first() else {
        return Err(KataError::parse(0, "missing 'p tiles' header"));
    };

    let fields: Vec<&str> = header.split_whitespace().collect();
    let (rows, cols, frame) = match fields.as_slice() {
        ["p", "tiles", rows, cols, rest @ ..] if rest.len() <= 1 => {
            let dim = |s: &str| {
                s.parse::<usize>()
                    .map_err(|_| KataError::parse(*header_no, format!("'{s}' is not a grid size")))
            };
            let frame = match rest {
                [] => None,
                [code] => {
                    let mut chars = code.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Some(Colour(c)),
                        _ => {
                            return Err(KataError::parse(
                                *header_no,
                                format!("frame colour '{code}' must be a single character"),
                            ));
                        }
                    }
                }
                _ => None,
            };
            let (rows, cols) = (dim(*rows)?, dim(*cols)?);
            if rows.checked_mul(cols).is_none() {
                return Err(KataError::parse(
                    *header_no,
                    format!("a {rows} x {cols} grid is too large"),
                ));
            }
            (rows, cols, frame)
        }
        _ => {
            return Err(KataError::parse(
                *header_no,
                "expected 'p tiles <rows> <cols> [frame]'",
            ));
        }
    };

    let mut squares = Vec::new();
    for (line_no, line) in body {
        for code in line.split_whitespace() {
            let square = Square::parse(code).ok_or_else(|| {
                KataError::parse(*line_no, format!("'{code}' is not a four colour square"))
            })?;
            squares.push(square);
        }
    }

    Ok(Puzzle::new(squares, rows, cols)?.with_frame(frame))
}

/// Parses the tile file at `path`.
///
/// # Errors
///
/// See [`parse_tiles`].
pub fn parse_tiles_file(path: impl AsRef<Path>) -> Result<Puzzle> {
    let file = std::fs::File::open(path)?;
    parse_tiles(io::BufReader::new(file))
}

/// Writes `puzzle` in the format read by [`parse_tiles`], one grid row of squares per line.
#[must_use]
pub fn format_tiles(puzzle: &Puzzle) -> String {
    let frame = puzzle.frame.map(|c| format!(" {c}")).unwrap_or_default();
    let mut out = format!("p tiles {} {}{frame}\n", puzzle.rows, puzzle.cols);
    for row in puzzle.squares.chunks(puzzle.cols.max(1)) {
        out.push_str(&row.iter().join(" "));
        out.push('\n');
    }
    out
}

/// A random solvable puzzle.
///
/// Every edge of a `rows` x `cols` grid gets a colour from the first `colours` entries of
/// [`PALETTE`], the squares are cut out, turned a random number of times and shuffled.
///
/// # Errors
///
/// `KataError::InvalidParameter` if `colours` is zero or larger than the palette, or if the grid
/// has more cells than fit in a `usize`.
pub fn random_tiles(rows: usize, cols: usize, colours: usize, rng: &mut fastrand::Rng) -> Result<Puzzle> {
    if colours == 0 || colours > PALETTE.len() {
        return Err(KataError::InvalidParameter(format!(
            "number of colours must be between 1 and {}, got {colours}",
            PALETTE.len()
        )));
    }
    if rows.checked_mul(cols).is_none() {
        return Err(KataError::InvalidParameter(format!(
            "a {rows} x {cols} grid is too large"
        )));
    }
    let mut pick = || Colour(PALETTE[rng.usize(..colours)]);

    // horizontal[r][c] is the edge above cell (r, c); vertical[r][c] the edge left of it.
    let horizontal: Vec<Vec<Colour>> = (0..=rows)
        .map(|_| (0..cols).map(|_| pick()).collect())
        .collect();
    let vertical: Vec<Vec<Colour>> = (0..rows)
        .map(|_| (0..=cols).map(|_| pick()).collect())
        .collect();

    let mut squares: Vec<Square> = (0..rows)
        .cartesian_product(0..cols)
        .map(|(r, c)| {
            let square = Square::new([
                horizontal[r][c],
                vertical[r][c + 1],
                horizontal[r + 1][c],
                vertical[r][c],
            ]);
            Square::new(square.rotated(rng.usize(..4)))
        })
        .collect();
    rng.shuffle(&mut squares);

    Puzzle::new(squares, rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn squares(codes: &[&str]) -> Vec<Square> {
        codes.iter().map(|c| Square::parse(c).unwrap()).collect()
    }

    fn unframed_two_by_two() -> Puzzle {
        Puzzle::new(squares(&["wybr", "rwyb", "bryw", "ybrw"]), 2, 2).unwrap()
    }

    fn placements(pairs: &[(usize, usize)]) -> Vec<Option<Placement>> {
        pairs
            .iter()
            .map(|&(square, rotation)| Some(Placement { square, rotation }))
            .collect()
    }

    #[test]
    fn test_solve_two_by_two() {
        let puzzle = unframed_two_by_two();
        let (board, stats) = puzzle.solve();
        let board = board.unwrap();

        assert_eq!(board.cells, placements(&[(0, 0), (1, 3), (2, 0), (3, 3)]));
        assert!(puzzle.verify(&board));
        assert!(stats.placements >= 4);
        assert_eq!(puzzle.count_solutions(usize::MAX), 24);
        assert_eq!(puzzle.count_solutions(5), 5);
        assert_eq!(puzzle.count_solutions(0), 0);
    }

    #[test]
    fn test_solve_framed_example() {
        let puzzle = Puzzle::example();
        let (board, _) = puzzle.solve();
        let board = board.unwrap();

        assert_eq!(
            board.cells,
            placements(&[
                (2, 2),
                (5, 1),
                (7, 2),
                (0, 0),
                (6, 0),
                (4, 2),
                (8, 1),
                (1, 2),
                (3, 1)
            ])
        );
        assert!(puzzle.verify(&board));
        assert_eq!(puzzle.count_solutions(usize::MAX), 4);
    }

    #[test]
    fn test_frame_is_enforced() {
        let puzzle = Puzzle::example();
        let (board, _) = puzzle.solve();
        let board = board.unwrap();

        let other_frame = puzzle.clone().with_frame(Some(Colour('w')));
        assert!(!other_frame.verify(&board));
        assert!(other_frame.solve().0.is_none());
    }

    #[test]
    fn test_unsolvable_counts_backtracks() {
        let puzzle = Puzzle::new(squares(&["wwww", "bbbb"]), 1, 2).unwrap();
        let (board, stats) = puzzle.solve();
        assert!(board.is_none());
        assert_eq!(stats.placements, stats.backtracks);
        assert_eq!(puzzle.count_solutions(10), 0);
    }

    #[test]
    fn test_verify_rejects_bad_boards() {
        let puzzle = unframed_two_by_two();
        let (board, _) = puzzle.solve();
        let board = board.unwrap();

        let mut reused = board.clone();
        reused.cells[1] = reused.cells[0];
        assert!(!puzzle.verify(&reused));

        let mut turned = board.clone();
        turned.cells[3] = Some(Placement {
            square: 3,
            rotation: 0,
        });
        assert!(!puzzle.verify(&turned));

        let mut partial = board;
        partial.cells[2] = None;
        assert!(!partial.is_complete());
        assert!(!puzzle.verify(&partial));

        assert!(!puzzle.verify(&Board::new(1, 4)));
    }

    #[test]
    fn test_wrong_square_count() {
        let err = Puzzle::new(squares(&["wybr"]), 2, 2).unwrap_err();
        assert!(matches!(
            err,
            KataError::InvalidBoard {
                expected: 4,
                got: 1
            }
        ));
    }

    #[test]
    fn test_oversized_grid() {
        assert!(matches!(
            Puzzle::new(squares(&["wybr"]), usize::MAX, 2),
            Err(KataError::InvalidParameter(_))
        ));

        let header = format!("p tiles {} {}\nwybr\n", usize::MAX, usize::MAX);
        assert!(matches!(
            parse_tiles(Cursor::new(header)),
            Err(KataError::Parse { line: 1, .. })
        ));

        // Large but representable: rejected by the square count without allocating the grid.
        assert!(matches!(
            parse_tiles(Cursor::new("p tiles 1000000000 1000000000\nwybr\n")),
            Err(KataError::InvalidBoard { got: 1, .. })
        ));

        let mut rng = fastrand::Rng::with_seed(1);
        assert!(matches!(
            random_tiles(usize::MAX, 2, 4, &mut rng),
            Err(KataError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_empty_puzzle_is_solved() {
        let puzzle = Puzzle::new(Vec::new(), 0, 0).unwrap();
        let (board, _) = puzzle.solve();
        assert!(board.unwrap().is_complete());
    }

    #[test]
    fn test_parse_tiles() {
        let content = "c framed example\np tiles 3 3 k\nwwbk kryr wkkb\nrbkk bywk bkyw\nwyyw wykk kbrk\n";
        let puzzle = parse_tiles(Cursor::new(content)).unwrap();
        assert_eq!(puzzle, Puzzle::example());
        assert_eq!(parse_tiles(Cursor::new(format_tiles(&puzzle))).unwrap(), puzzle);
    }

    #[test]
    fn test_parse_tiles_errors() {
        assert!(matches!(
            parse_tiles(Cursor::new("c nothing\n")),
            Err(KataError::Parse { line: 0, .. })
        ));
        assert!(matches!(
            parse_tiles(Cursor::new("p tiles 2\nwybr\n")),
            Err(KataError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_tiles(Cursor::new("p tiles 1 1 kk\nwybr\n")),
            Err(KataError::Parse { line: 1, .. })
        ));
        assert!(matches!(
            parse_tiles(Cursor::new("p tiles 1 2\nwybr wyb\n")),
            Err(KataError::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_tiles(Cursor::new("p tiles 1 2\nwybr\n")),
            Err(KataError::InvalidBoard { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn test_random_tiles_are_solvable() {
        let mut rng = fastrand::Rng::with_seed(31);
        for (rows, cols) in [(1, 1), (1, 4), (2, 3), (3, 2), (3, 3)] {
            let puzzle = random_tiles(rows, cols, 4, &mut rng).unwrap();
            assert_eq!(puzzle.squares.len(), rows * cols);
            let (board, _) = puzzle.solve();
            let board = board.unwrap();
            assert!(puzzle.verify(&board), "{rows} x {cols}");
        }
    }

    #[test]
    fn test_random_tiles_rejects_bad_colour_count() {
        let mut rng = fastrand::Rng::with_seed(1);
        assert!(matches!(
            random_tiles(2, 2, 0, &mut rng),
            Err(KataError::InvalidParameter(_))
        ));
        assert!(random_tiles(2, 2, PALETTE.len() + 1, &mut rng).is_err());
    }

    #[test]
    fn test_board_display() {
        let mut board = Board::new(2, 2);
        board.cells[0] = Some(Placement {
            square: 1,
            rotation: 3,
        });
        assert_eq!(board.to_string(), "1@3 .\n. .\n");
        assert_eq!(board.get(0, 0).map(|p| p.square), Some(1));
        assert_eq!(board.get(1, 1), None);
    }
}
