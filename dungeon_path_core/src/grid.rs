use serde::{Deserialize, Serialize};

use crate::Position;

/// Represents errors that can occur within grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Position ({row}, {col}) is out of bounds")]
    OutOfBounds { row: usize, col: usize },
}

/// Classification of a single dungeon cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    Wall,
    /// A locked door, `'A'` through `'F'`.
    Door(char),
    /// A collectible key, `'a'` through `'f'`.
    Key(char),
    Start,
    Exit,
    Free,
}

impl Symbol {
    /// Classifies a raw map character. Total: anything not recognized is
    /// `Free`, which matches how unknown ground is treated during traversal.
    ///
    /// `'E'` is the exit marker, not a door, even though it sits inside the
    /// `'A'..='F'` door range. It is matched first so the door arm never
    /// sees it.
    pub fn classify(c: char) -> Symbol {
        match c {
            '#' => Symbol::Wall,
            'S' => Symbol::Start,
            'E' => Symbol::Exit,
            'A'..='F' => Symbol::Door(c),
            'a'..='f' => Symbol::Key(c),
            _ => Symbol::Free,
        }
    }

    /// The display character for this symbol.
    pub fn as_char(self) -> char {
        match self {
            Symbol::Wall => '#',
            Symbol::Door(c) | Symbol::Key(c) => c,
            Symbol::Start => 'S',
            Symbol::Exit => 'E',
            Symbol::Free => ' ',
        }
    }
}

/// An immutable 2D dungeon map.
///
/// Rows are stored individually and may differ in length; a column past the
/// end of its own row is simply out of bounds rather than an error in the
/// map. All lookups are bounds-checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    rows: Vec<Vec<Symbol>>,
}

impl Dungeon {
    /// Builds a dungeon from a textual map, one line per row, one character
    /// per cell. Lines are taken verbatim: spaces are `Free` cells, so no
    /// trimming is applied.
    pub fn parse(input: &str) -> Self {
        let rows = input
            .lines()
            .map(|line| line.chars().map(Symbol::classify).collect())
            .collect();
        Dungeon { rows }
    }

    /// Number of rows in the dungeon.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of a specific row, or `None` for an out-of-range row index.
    pub fn row_len(&self, row: usize) -> Option<usize> {
        self.rows.get(row).map(Vec::len)
    }

    /// Checks if a position lies within the grid boundaries.
    pub fn in_bounds(&self, position: Position) -> bool {
        self.rows
            .get(position.row)
            .is_some_and(|row| position.col < row.len())
    }

    /// Looks up the symbol at a position.
    pub fn symbol_at(&self, position: Position) -> Result<Symbol, GridError> {
        self.rows
            .get(position.row)
            .and_then(|row| row.get(position.col))
            .copied()
            .ok_or(GridError::OutOfBounds {
                row: position.row,
                col: position.col,
            })
    }

    /// Finds the first cell holding `target`, scanning in row-major order.
    ///
    /// A map is expected to carry exactly one `Start` and one `Exit`; if it
    /// carries several, the first in scan order wins.
    pub fn locate(&self, target: Symbol) -> Option<Position> {
        self.enumerate()
            .find_map(|(pos, symbol)| (symbol == target).then_some(pos))
    }

    /// Iterates the rows of the dungeon in order.
    pub fn rows(&self) -> impl Iterator<Item = &[Symbol]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Iterates every cell as `(Position, Symbol)` in row-major order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Position, Symbol)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, symbols)| {
            symbols
                .iter()
                .enumerate()
                .map(move |(col, &symbol)| (Position::new(row, col), symbol))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_covers_the_symbol_alphabet() {
        assert_eq!(Symbol::classify('#'), Symbol::Wall);
        assert_eq!(Symbol::classify('S'), Symbol::Start);
        assert_eq!(Symbol::classify('A'), Symbol::Door('A'));
        assert_eq!(Symbol::classify('F'), Symbol::Door('F'));
        assert_eq!(Symbol::classify('a'), Symbol::Key('a'));
        assert_eq!(Symbol::classify('f'), Symbol::Key('f'));
        assert_eq!(Symbol::classify(' '), Symbol::Free);
        assert_eq!(Symbol::classify('.'), Symbol::Free);
        assert_eq!(Symbol::classify('g'), Symbol::Free);
        assert_eq!(Symbol::classify('G'), Symbol::Free);
    }

    #[test]
    fn exit_marker_is_not_a_door() {
        assert_eq!(Symbol::classify('E'), Symbol::Exit);
    }

    #[test]
    fn locate_returns_first_match_in_row_major_order() {
        let dungeon = Dungeon::parse("..E\nE.S");
        assert_eq!(dungeon.locate(Symbol::Exit), Some(Position::new(0, 2)));
        assert_eq!(dungeon.locate(Symbol::Start), Some(Position::new(1, 2)));
        assert_eq!(dungeon.locate(Symbol::Wall), None);
    }

    #[test]
    fn symbol_at_rejects_out_of_range_positions() {
        let dungeon = Dungeon::parse("S.\n.E");
        assert_eq!(dungeon.symbol_at(Position::new(0, 0)), Ok(Symbol::Start));
        assert_eq!(
            dungeon.symbol_at(Position::new(2, 0)),
            Err(GridError::OutOfBounds { row: 2, col: 0 })
        );
        assert_eq!(
            dungeon.symbol_at(Position::new(0, 2)),
            Err(GridError::OutOfBounds { row: 0, col: 2 })
        );
    }

    #[test]
    fn ragged_rows_bound_each_row_separately() {
        let dungeon = Dungeon::parse("S.#\n.E");
        assert!(dungeon.in_bounds(Position::new(0, 2)));
        assert!(!dungeon.in_bounds(Position::new(1, 2)));
        assert_eq!(dungeon.row_len(0), Some(3));
        assert_eq!(dungeon.row_len(1), Some(2));
        assert_eq!(dungeon.row_len(2), None);
        assert_eq!(
            dungeon.symbol_at(Position::new(1, 2)),
            Err(GridError::OutOfBounds { row: 1, col: 2 })
        );
    }

    #[test]
    fn enumerate_walks_row_major() {
        let dungeon = Dungeon::parse("S#\na.");
        let cells: Vec<_> = dungeon.enumerate().collect();
        assert_eq!(
            cells,
            vec![
                (Position::new(0, 0), Symbol::Start),
                (Position::new(0, 1), Symbol::Wall),
                (Position::new(1, 0), Symbol::Key('a')),
                (Position::new(1, 1), Symbol::Free),
            ]
        );
    }
}
