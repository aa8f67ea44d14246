use serde::{Deserialize, Serialize};

use crate::{KeySet, Position, Symbol, search::SearchState};

/// A traversal rule strategy: decides which neighboring cells may be
/// stepped onto, and how stepping onto a cell changes the search state.
///
/// Rules are read-only during a search and can be shared across runs.
pub trait TraversalRules {
    type State: SearchState;

    /// The state a search begins in when standing on `start`.
    fn start_state(&self, start: Position) -> Self::State;

    /// Whether the cell holding `symbol` may be entered from `state`.
    /// Bounds have already been checked by the caller.
    fn is_traversable(&self, state: &Self::State, symbol: Symbol) -> bool;

    /// The successor state after stepping from `state` onto the cell at
    /// `to` holding `symbol`. Only called for traversable neighbors.
    fn advance(&self, state: &Self::State, to: Position, symbol: Symbol) -> Self::State;
}

/// Plain traversal: walls and doors are permanently impassable, and the
/// search state is the position alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainRules;

impl TraversalRules for PlainRules {
    type State = Position;

    fn start_state(&self, start: Position) -> Position {
        start
    }

    fn is_traversable(&self, _state: &Position, symbol: Symbol) -> bool {
        !matches!(symbol, Symbol::Wall | Symbol::Door(_))
    }

    fn advance(&self, _state: &Position, to: Position, _symbol: Symbol) -> Position {
        to
    }
}

/// A position together with the keys held on the path that reached it.
///
/// The key set is part of state identity: the same position reached with
/// different keys has different future reachability and is explored
/// separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyState {
    pub position: Position,
    pub keys: KeySet,
}

impl SearchState for KeyState {
    fn position(&self) -> Position {
        self.position
    }
}

/// Key-aware traversal: doors open when the matching key has been picked up
/// earlier on the path, and walking onto a key cell adds it to the set.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyRules;

impl TraversalRules for KeyRules {
    type State = KeyState;

    fn start_state(&self, start: Position) -> KeyState {
        KeyState {
            position: start,
            keys: KeySet::EMPTY,
        }
    }

    fn is_traversable(&self, state: &KeyState, symbol: Symbol) -> bool {
        match symbol {
            Symbol::Wall => false,
            Symbol::Door(door) => state.keys.opens(door),
            _ => true,
        }
    }

    fn advance(&self, state: &KeyState, to: Position, symbol: Symbol) -> KeyState {
        let keys = match symbol {
            Symbol::Key(key) => state.keys.with(key),
            _ => state.keys,
        };
        KeyState { position: to, keys }
    }
}
