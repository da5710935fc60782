//! Board storage and group analysis.
//!
//! The board is a plain `size * size` grid of `Option<Color>` cells addressed
//! by zero-based `(row, col)` points. Row 0 is the top line of the board.
//! Groups and their liberties are never stored; [`group`] recomputes them
//! with a flood fill whenever they are needed.

use std::fmt;

use thiserror::Error;

use crate::constants::{COLUMN_LETTERS, MAX_SIZE};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// The other player.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }

    /// Diagram symbol used by [`Board`]'s `Display` and [`Board::from_rows`].
    pub fn symbol(self) -> char {
        match self {
            Color::Black => 'X',
            Color::White => 'O',
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// A zero-based `(row, col)` intersection.
pub type Point = (usize, usize);

/// Up to four in-bounds points around an intersection.
pub type Adjacent = std::iter::Flatten<std::array::IntoIter<Option<Point>, 4>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("point ({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
    #[error("board diagram row {row} has {found} points, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("invalid board diagram character '{0}'")]
    InvalidCell(char),
}

/// An N×N Go board.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    /// Build a board from a diagram, one string per row, top row first.
    ///
    /// `X`/`B` are black stones, `O`/`W` white stones, `.`/`+` empty points.
    /// Whitespace is ignored, so rows may be written as `". X O"`.
    pub fn from_rows(rows: &[&str]) -> Result<Self, BoardError> {
        let size = rows.len();
        let mut board = Board::new(size);
        for (row, line) in rows.iter().enumerate() {
            let cells: Vec<char> = line.chars().filter(|c| !c.is_whitespace()).collect();
            if cells.len() != size {
                return Err(BoardError::RaggedRow {
                    row,
                    found: cells.len(),
                    expected: size,
                });
            }
            for (col, ch) in cells.into_iter().enumerate() {
                let cell = match ch {
                    'X' | 'x' | 'B' | 'b' => Some(Color::Black),
                    'O' | 'o' | 'W' | 'w' => Some(Color::White),
                    '.' | '+' => None,
                    other => return Err(BoardError::InvalidCell(other)),
                };
                board.put((row, col), cell);
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of intersections.
    #[inline]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn contains(&self, (row, col): Point) -> bool {
        row < self.size && col < self.size
    }

    pub fn check(&self, point: Point) -> Result<(), BoardError> {
        if self.contains(point) {
            Ok(())
        } else {
            Err(BoardError::OutOfBounds {
                row: point.0,
                col: point.1,
                size: self.size,
            })
        }
    }

    pub fn get(&self, point: Point) -> Result<Option<Color>, BoardError> {
        self.check(point)?;
        Ok(self.at(point))
    }

    pub fn set(&mut self, point: Point, cell: Option<Color>) -> Result<(), BoardError> {
        self.check(point)?;
        self.put(point, cell);
        Ok(())
    }

    #[inline]
    fn idx(&self, (row, col): Point) -> usize {
        row * self.size + col
    }

    /// Cell lookup for points already known to be on the board.
    #[inline]
    pub(crate) fn at(&self, point: Point) -> Option<Color> {
        self.cells[self.idx(point)]
    }

    #[inline]
    pub(crate) fn put(&mut self, point: Point, cell: Option<Color>) {
        let i = self.idx(point);
        self.cells[i] = cell;
    }

    /// All intersections in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> + use<> {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| (row, col)))
    }

    /// In-bounds orthogonal neighbors (N, S, W, E).
    pub fn neighbors(&self, (row, col): Point) -> Adjacent {
        let s = self.size;
        [
            (row > 0).then(|| (row - 1, col)),
            (row + 1 < s).then(|| (row + 1, col)),
            (col > 0).then(|| (row, col - 1)),
            (col + 1 < s).then(|| (row, col + 1)),
        ]
        .into_iter()
        .flatten()
    }

    /// In-bounds diagonal neighbors (NW, NE, SW, SE).
    pub fn diagonals(&self, (row, col): Point) -> Adjacent {
        let s = self.size;
        let up = row > 0;
        let down = row + 1 < s;
        let left = col > 0;
        let right = col + 1 < s;
        [
            (up && left).then(|| (row - 1, col - 1)),
            (up && right).then(|| (row - 1, col + 1)),
            (down && left).then(|| (row + 1, col - 1)),
            (down && right).then(|| (row + 1, col + 1)),
        ]
        .into_iter()
        .flatten()
    }

    pub fn stone_count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }

    /// Total stones of both colors.
    pub fn stones(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

/// A connected set of same-colored stones and its liberties.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Group {
    pub stones: Vec<Point>,
    /// Distinct empty points orthogonally adjacent to the group.
    pub liberties: Vec<Point>,
}

impl Group {
    #[inline]
    pub fn len(&self) -> usize {
        self.stones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }

    #[inline]
    pub fn liberty_count(&self) -> usize {
        self.liberties.len()
    }
}

/// Flood-fill the group containing `point`.
///
/// An empty point yields an empty group with no liberties.
pub fn group(board: &Board, point: Point) -> Result<Group, BoardError> {
    board.check(point)?;
    Ok(group_at(board, point))
}

/// [`group`] for points already known to be on the board.
pub(crate) fn group_at(board: &Board, start: Point) -> Group {
    let Some(color) = board.at(start) else {
        return Group::default();
    };
    let mut stack = vec![start];
    let mut visited = vec![false; board.area()];
    let mut liberty_seen = vec![false; board.area()];
    let mut out = Group::default();

    while let Some(pt) = stack.pop() {
        let i = board.idx(pt);
        if visited[i] {
            continue;
        }
        visited[i] = true;
        out.stones.push(pt);

        for n in board.neighbors(pt) {
            let ni = board.idx(n);
            match board.at(n) {
                None => {
                    if !liberty_seen[ni] {
                        liberty_seen[ni] = true;
                        out.liberties.push(n);
                    }
                }
                Some(c) if c == color && !visited[ni] => stack.push(n),
                _ => {}
            }
        }
    }
    out
}

/// Clear every listed point. Returns the number of points cleared.
///
/// All points are bounds-checked before the board is touched.
pub fn remove_group(board: &mut Board, stones: &[Point]) -> Result<usize, BoardError> {
    for &pt in stones {
        board.check(pt)?;
    }
    for &pt in stones {
        board.put(pt, None);
    }
    Ok(stones.len())
}

/// Go-style vertex name, e.g. `(0, 0)` on a 9x9 board is `"A9"`.
pub fn point_name((row, col): Point, size: usize) -> String {
    match COLUMN_LETTERS.get(col) {
        Some(&letter) if row < size => format!("{}{}", letter as char, size - row),
        _ => format!("({row},{col})"),
    }
}

/// Parse a Go-style vertex name (case-insensitive). Returns `None` if the
/// name is malformed or off the board.
pub fn parse_point(s: &str, size: usize) -> Option<Point> {
    let s = s.trim();
    let mut chars = s.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !letter.is_ascii() {
        return None;
    }
    let col = COLUMN_LETTERS.iter().position(|&c| c == letter as u8)?;
    let number: usize = chars.as_str().parse().ok()?;
    if size > MAX_SIZE || number == 0 || number > size || col >= size {
        return None;
    }
    Some((size - number, col))
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels = self.size <= MAX_SIZE;
        if labels {
            write!(f, "   ")?;
            for &letter in &COLUMN_LETTERS[..self.size] {
                write!(f, "{} ", letter as char)?;
            }
            writeln!(f)?;
        }
        for row in 0..self.size {
            if labels {
                write!(f, "{:>2} ", self.size - row)?;
            }
            for col in 0..self.size {
                let ch = match self.at((row, col)) {
                    Some(color) => color.symbol(),
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_corner_edge_center() {
        let board = Board::new(9);
        assert_eq!(board.neighbors((0, 0)).count(), 2);
        assert_eq!(board.neighbors((0, 4)).count(), 3);
        assert_eq!(board.neighbors((4, 4)).count(), 4);
        assert_eq!(board.diagonals((0, 0)).count(), 1);
        assert_eq!(board.diagonals((8, 3)).count(), 2);
        assert_eq!(board.diagonals((4, 4)).count(), 4);
    }

    #[test]
    fn test_get_out_of_bounds() {
        let board = Board::new(9);
        assert_eq!(board.get((4, 4)), Ok(None));
        assert_eq!(
            board.get((9, 0)),
            Err(BoardError::OutOfBounds {
                row: 9,
                col: 0,
                size: 9
            })
        );
    }

    #[test]
    fn test_group_of_empty_point() {
        let board = Board::new(9);
        let g = group(&board, (3, 3)).unwrap();
        assert!(g.is_empty());
        assert_eq!(g.liberty_count(), 0);
    }

    #[test]
    fn test_group_liberties_are_distinct() {
        // Two stones share the liberty between their ends only once
        let board = Board::from_rows(&[
            ". . . . .",
            ". X X . .",
            ". . X . .",
            ". . . . .",
            ". . . . .",
        ])
        .unwrap();
        let g = group(&board, (1, 1)).unwrap();
        assert_eq!(g.len(), 3);
        // (0,1) (0,2) (1,0) (2,1) (1,3) (2,3) (3,2)
        assert_eq!(g.liberty_count(), 7);
    }

    #[test]
    fn test_remove_group() {
        let mut board = Board::from_rows(&["X X .", ". . .", ". . O"]).unwrap();
        let g = group(&board, (0, 0)).unwrap();
        assert_eq!(remove_group(&mut board, &g.stones), Ok(2));
        assert_eq!(board.stone_count(Color::Black), 0);
        assert_eq!(board.stone_count(Color::White), 1);
    }

    #[test]
    fn test_remove_group_rejects_out_of_bounds() {
        let mut board = Board::from_rows(&["X X .", ". . .", ". . ."]).unwrap();
        assert!(remove_group(&mut board, &[(0, 0), (5, 5)]).is_err());
        assert_eq!(board.stone_count(Color::Black), 2);
    }

    #[test]
    fn test_from_rows_errors() {
        assert!(matches!(
            Board::from_rows(&["X .", "."]),
            Err(BoardError::RaggedRow { row: 1, .. })
        ));
        assert_eq!(
            Board::from_rows(&["X ?", ". ."]),
            Err(BoardError::InvalidCell('?'))
        );
    }

    #[test]
    fn test_point_names() {
        assert_eq!(point_name((0, 0), 9), "A9");
        assert_eq!(point_name((8, 8), 9), "J1");
        assert_eq!(parse_point("j1", 9), Some((8, 8)));
        assert_eq!(parse_point("E5", 9), Some((4, 4)));
        assert_eq!(parse_point("I5", 9), None);
        assert_eq!(parse_point("A10", 9), None);
        assert_eq!(parse_point("A0", 9), None);
        assert_eq!(parse_point("", 9), None);
    }
}
