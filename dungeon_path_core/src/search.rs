use std::{
    collections::{HashMap, HashSet, VecDeque},
    fmt::Debug,
    hash::Hash,
};

use crate::{
    Dungeon, KeySet, Position, Symbol,
    rules::{KeyRules, PlainRules, TraversalRules},
};

/// Neighbor expansion order: up, down, left, right. Fixed so that when
/// several shortest paths exist, repeated runs pick the same one.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// The unit of BFS exploration. Plain traversal explores bare positions;
/// key-aware traversal explores position-plus-keys composites.
pub trait SearchState: Copy + Eq + Hash + Debug {
    /// The grid cell this state occupies.
    fn position(&self) -> Position;
}

impl SearchState for Position {
    fn position(&self) -> Position {
        *self
    }
}

/// The result of a solve: either an ordered route from start to exit
/// (both inclusive), or no route at all. A missing route is a normal
/// outcome, distinct from any real path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    Path(Vec<Position>),
    NoPath,
}

impl SolveOutcome {
    /// The route as a slice, if one was found.
    pub fn path(&self) -> Option<&[Position]> {
        match self {
            SolveOutcome::Path(route) => Some(route),
            SolveOutcome::NoPath => None,
        }
    }
}

/// Breadth-first search for a minimum-edge-count path from `start` to any
/// state satisfying `is_goal`, over the graph spanned by `neighbors`.
///
/// `neighbors` appends the successor states of its first argument to the
/// supplied buffer. All edges count one step.
///
/// States are marked visited when enqueued, not when dequeued; a state
/// reachable by several equally short routes would otherwise be queued once
/// per route. The goal is tested at dequeue time, so a start that already
/// satisfies it yields the single-element path.
pub fn shortest_path<S, G, N>(start: S, is_goal: G, mut neighbors: N) -> SolveOutcome
where
    S: SearchState,
    G: Fn(&S) -> bool,
    N: FnMut(&S, &mut Vec<S>),
{
    let mut frontier = VecDeque::new();
    let mut visited = HashSet::new();
    let mut parents: HashMap<S, S> = HashMap::new();

    frontier.push_back(start);
    visited.insert(start);

    let mut successors = Vec::with_capacity(DIRECTIONS.len());
    while let Some(current) = frontier.pop_front() {
        if is_goal(&current) {
            return SolveOutcome::Path(reconstruct(&parents, start, current));
        }

        successors.clear();
        neighbors(&current, &mut successors);
        for &next in &successors {
            if visited.insert(next) {
                parents.insert(next, current);
                frontier.push_back(next);
            }
        }
    }

    SolveOutcome::NoPath
}

/// Walks predecessor links from `goal` back to `start`, collecting the
/// position of each state, then reverses into start-to-goal order.
///
/// Every dequeued non-start state has exactly one parent entry, so a
/// missing link here means the search bookkeeping is corrupt.
fn reconstruct<S: SearchState>(parents: &HashMap<S, S>, start: S, goal: S) -> Vec<Position> {
    let mut route = Vec::new();
    let mut current = goal;
    while current != start {
        route.push(current.position());
        current = match parents.get(&current) {
            Some(&previous) => previous,
            None => panic!("predecessor chain broken at {:?}", current),
        };
    }
    route.push(start.position());
    route.reverse();
    route
}

/// Appends the in-bounds, traversable successors of `state`, in the fixed
/// direction order. Out-of-bounds candidates are dropped here; bounds
/// failures never escape neighbor generation.
fn expand<R: TraversalRules>(
    dungeon: &Dungeon,
    rules: &R,
    state: &R::State,
    out: &mut Vec<R::State>,
) {
    let here = state.position();
    for (dr, dc) in DIRECTIONS {
        let Some(row) = here.row.checked_add_signed(dr) else {
            continue;
        };
        let Some(col) = here.col.checked_add_signed(dc) else {
            continue;
        };
        let next = Position::new(row, col);
        let Ok(symbol) = dungeon.symbol_at(next) else {
            continue;
        };
        if rules.is_traversable(state, symbol) {
            out.push(rules.advance(state, next, symbol));
        }
    }
}

fn solve<R: TraversalRules>(dungeon: &Dungeon, rules: &R) -> SolveOutcome {
    let (Some(start), Some(exit)) = (
        dungeon.locate(Symbol::Start),
        dungeon.locate(Symbol::Exit),
    ) else {
        // A dungeon without both markers has nothing to route between.
        return SolveOutcome::NoPath;
    };

    shortest_path(
        rules.start_state(start),
        |state| state.position() == exit,
        |state, out| expand(dungeon, rules, state, out),
    )
}

/// Finds a shortest route from `S` to `E` treating every door as
/// permanently locked.
pub fn solve_plain(dungeon: &Dungeon) -> SolveOutcome {
    solve(dungeon, &PlainRules)
}

/// Finds a shortest route from `S` to `E` where keys picked up along the
/// way unlock their matching doors. Reaching the exit needs no particular
/// key; any key set counts.
pub fn solve_with_keys_and_doors(dungeon: &Dungeon) -> SolveOutcome {
    solve(dungeon, &KeyRules)
}

/// Every key lying in the region reachable from `S` when doors are ignored
/// (only walls block). An upper bound on what any route could collect.
pub fn collectable_keys(dungeon: &Dungeon) -> KeySet {
    let Some(start) = dungeon.locate(Symbol::Start) else {
        return KeySet::EMPTY;
    };

    let mut keys = KeySet::EMPTY;
    let mut frontier = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);
    while let Some(current) = frontier.pop_front() {
        if let Ok(Symbol::Key(key)) = dungeon.symbol_at(current) {
            keys = keys.with(key);
        }
        for (dr, dc) in DIRECTIONS {
            let Some(row) = current.row.checked_add_signed(dr) else {
                continue;
            };
            let Some(col) = current.col.checked_add_signed(dc) else {
                continue;
            };
            let next = Position::new(row, col);
            match dungeon.symbol_at(next) {
                Ok(Symbol::Wall) | Err(_) => continue,
                Ok(_) => {}
            }
            if visited.insert(next) {
                frontier.push_back(next);
            }
        }
    }
    keys
}
