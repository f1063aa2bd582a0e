//! Walks around a ride's circuit.

use super::{TrackGraph, TrackPiece};

/// Forward walk over a circuit starting at a given piece.
///
/// The first call yields the start piece itself. Iteration stops at a gap or
/// when the walk arrives back at the start, in which case [`looped`] is set.
///
/// [`looped`]: CircuitIterator::looped
#[derive(Debug)]
pub struct CircuitIterator<'a, G: TrackGraph + ?Sized> {
    graph: &'a G,
    first: TrackPiece,
    current: TrackPiece,
    last: TrackPiece,
    first_iteration: bool,
    looped: bool,
}

// Manual impl: `derive(Clone)` would require `G: Clone`, but only `&G` is held.
impl<G: TrackGraph + ?Sized> Clone for CircuitIterator<'_, G> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            first: self.first,
            current: self.current,
            last: self.last,
            first_iteration: self.first_iteration,
            looped: self.looped,
        }
    }
}

impl<'a, G: TrackGraph + ?Sized> CircuitIterator<'a, G> {
    pub fn new(graph: &'a G, start: TrackPiece) -> Self {
        Self {
            graph,
            first: start,
            current: start,
            last: start,
            first_iteration: true,
            looped: false,
        }
    }

    /// Moves to the next piece. Returns false at a gap or back at the start.
    pub fn advance(&mut self) -> bool {
        if self.first_iteration {
            self.first_iteration = false;
            return true;
        }
        self.last = self.current;
        let Some(next) = self.graph.next_piece(&self.current) else {
            return false;
        };
        self.current = next;
        if self.current.is_same_piece(&self.first) {
            self.looped = true;
            return false;
        }
        true
    }

    pub fn current(&self) -> TrackPiece {
        self.current
    }

    /// Piece visited before `current`.
    pub fn last(&self) -> TrackPiece {
        self.last
    }

    pub fn looped(&self) -> bool {
        self.looped
    }

    fn matches(&self, other: &Self) -> bool {
        self.current.is_same_piece(&other.current)
    }
}

impl<G: TrackGraph + ?Sized> Iterator for CircuitIterator<'_, G> {
    type Item = TrackPiece;

    fn next(&mut self) -> Option<TrackPiece> {
        self.advance().then_some(self.current)
    }
}

/// Returns the piece at which the circuit starting at `start` is broken.
///
/// A walk that ends in a cycle not passing through `start` reports the piece
/// where the cycle was detected.
pub fn find_gap<G: TrackGraph + ?Sized>(graph: &G, start: TrackPiece) -> Option<TrackPiece> {
    let mut it = CircuitIterator::new(graph, start);
    let mut slow = it.clone();
    let mut move_slow = true;

    while it.advance() {
        move_slow = !move_slow;
        if move_slow {
            slow.advance();
            if it.matches(&slow) {
                return Some(it.current());
            }
        }
    }
    if !it.looped() {
        return Some(CircuitIterator::last(&it));
    }
    None
}

/// First piece on the circuit for which `predicate` holds.
///
/// Cycles that do not pass through `start` terminate the search.
pub fn find_piece<G, F>(graph: &G, start: TrackPiece, predicate: F) -> Option<TrackPiece>
where
    G: TrackGraph + ?Sized,
    F: Fn(&TrackPiece) -> bool,
{
    let mut it = CircuitIterator::new(graph, start);
    let mut slow = it.clone();
    let mut move_slow = true;

    while it.advance() {
        if predicate(&it.current()) {
            return Some(it.current());
        }
        move_slow = !move_slow;
        if move_slow {
            slow.advance();
            if it.matches(&slow) {
                return None;
            }
        }
    }
    None
}

/// Walks backwards from `start` to the first piece of the track.
pub fn track_back<G: TrackGraph + ?Sized>(
    graph: &G,
    start: TrackPiece,
    step_limit: usize,
) -> TrackPiece {
    let mut piece = start;
    for _ in 0..step_limit {
        match graph.previous_piece(&piece) {
            Some(previous) if !previous.is_same_piece(&start) => piece = previous,
            _ => break,
        }
    }
    piece
}

/// Walks forwards from `start` to the last piece of the track.
pub fn track_front<G: TrackGraph + ?Sized>(
    graph: &G,
    start: TrackPiece,
    step_limit: usize,
) -> TrackPiece {
    let mut piece = start;
    for _ in 0..step_limit {
        match graph.next_piece(&piece) {
            Some(next) if !next.is_same_piece(&start) => piece = next,
            _ => break,
        }
    }
    piece
}
