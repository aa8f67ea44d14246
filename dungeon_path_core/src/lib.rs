use std::fmt;

use serde::{Deserialize, Serialize};

pub mod grid;
pub mod rules;
pub mod search;

pub use grid::{Dungeon, GridError, Symbol};
pub use rules::{KeyRules, KeyState, PlainRules, TraversalRules};
pub use search::{
    SearchState, SolveOutcome, collectable_keys, shortest_path, solve_plain,
    solve_with_keys_and_doors,
};

/// A 2D grid coordinate, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The set of keys collected so far on a path.
///
/// Keys `'a'` through `'f'` map to bits 0 through 5. Updates return a new
/// set; a `KeySet` value is never mutated in place, so states that share a
/// history can share the value freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeySet(u8);

impl KeySet {
    pub const EMPTY: KeySet = KeySet(0);

    /// The bit position for a key letter, or `None` outside `'a'..='f'`.
    fn bit(key: char) -> Option<u8> {
        key.is_ascii_lowercase()
            .then(|| key as u8 - b'a')
            .filter(|&b| b < 6)
    }

    /// Returns a copy of this set with `key` added. Adding a key already
    /// held, or a character that is not a key letter, is a no-op.
    pub fn with(self, key: char) -> KeySet {
        match Self::bit(key) {
            Some(b) => KeySet(self.0 | 1 << b),
            None => self,
        }
    }

    pub fn contains(self, key: char) -> bool {
        Self::bit(key).is_some_and(|b| self.0 >> b & 1 == 1)
    }

    /// Whether this set holds the key matching door letter `door`
    /// (door `'A'` is opened by key `'a'`, and so on).
    pub fn opens(self, door: char) -> bool {
        self.contains(door.to_ascii_lowercase())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Whether every key in `other` is also in `self`.
    pub fn is_superset_of(self, other: KeySet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Iterates the held key letters in alphabetical order.
    pub fn keys(self) -> impl Iterator<Item = char> {
        (0..6u8)
            .filter(move |b| self.0 >> b & 1 == 1)
            .map(|b| (b'a' + b) as char)
    }
}

impl fmt::Display for KeySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        for (i, key) in self.keys().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_set_insert_is_idempotent() {
        let keys = KeySet::EMPTY.with('a').with('c');
        assert_eq!(keys.with('a'), keys);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains('a'));
        assert!(keys.contains('c'));
        assert!(!keys.contains('b'));
    }

    #[test]
    fn key_set_ignores_non_key_characters() {
        let keys = KeySet::EMPTY.with('g').with('#').with('A');
        assert!(keys.is_empty());
        assert!(!keys.contains('g'));
    }

    #[test]
    fn key_opens_matching_door_only() {
        let keys = KeySet::EMPTY.with('b');
        assert!(keys.opens('B'));
        assert!(!keys.opens('A'));
    }

    #[test]
    fn key_set_display() {
        assert_eq!(KeySet::EMPTY.to_string(), "none");
        assert_eq!(KeySet::EMPTY.with('c').with('a').to_string(), "a c");
    }

    #[test]
    fn superset_check() {
        let small = KeySet::EMPTY.with('a');
        let large = small.with('d');
        assert!(large.is_superset_of(small));
        assert!(large.is_superset_of(large));
        assert!(!small.is_superset_of(large));
    }
}
