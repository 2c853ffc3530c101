//! Advisory markers drawn on top of the board.
//!
//! Nothing here is authoritative: the overlay is never consulted when deciding
//! whether a move is allowed, it only remembers what the last hint said and
//! which cells are flashing after a blocked reveal.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use logicsweeper_common::models::Pos;

use crate::board::Board;

#[derive(Debug, Clone, Default)]
pub struct HintOverlay {
    safe: BTreeSet<Pos>,
    suspected_mine: Option<Pos>,
    blocked: HashMap<Pos, Instant>,
}

impl HintOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every hint marker. Blocked flashes decay on their own.
    pub fn clear(&mut self) {
        self.safe.clear();
        self.suspected_mine = None;
    }

    /// Mark cells as provably safe, skipping any that were opened or flagged
    /// since the hint was requested. Returns how many were marked.
    pub fn mark(&mut self, cells: impl IntoIterator<Item = Pos>, board: &Board) -> usize {
        let before = self.safe.len();
        for pos in cells {
            if board.is_open_for_reveal(pos) {
                self.safe.insert(pos);
            }
        }
        self.safe.len() - before
    }

    /// Remember an advisory "provably a mine" hint. Ignored for open cells.
    pub fn suspect_mine(&mut self, pos: Pos, board: &Board) -> bool {
        if board.get(pos).is_some_and(|cell| cell.is_hidden()) {
            self.suspected_mine = Some(pos);
            true
        } else {
            false
        }
    }

    /// Forget any marker on a cell whose authoritative state just changed.
    pub fn forget(&mut self, pos: Pos) {
        self.safe.remove(&pos);
        if self.suspected_mine == Some(pos) {
            self.suspected_mine = None;
        }
        self.blocked.remove(&pos);
    }

    pub fn is_hinted(&self, pos: Pos) -> bool {
        self.safe.contains(&pos)
    }

    pub fn hinted(&self) -> impl Iterator<Item = Pos> + '_ {
        self.safe.iter().copied()
    }

    pub fn hinted_count(&self) -> usize {
        self.safe.len()
    }

    pub fn suspected_mine(&self) -> Option<Pos> {
        self.suspected_mine
    }

    /// Start the short "blocked" flash on a cell.
    pub fn flash_blocked(&mut self, pos: Pos, now: Instant, duration: Duration) {
        self.blocked.insert(pos, now + duration);
    }

    pub fn is_flashing(&self, pos: Pos, now: Instant) -> bool {
        self.blocked.get(&pos).is_some_and(|until| now < *until)
    }

    /// Remove flashes that have run out.
    pub fn prune(&mut self, now: Instant) {
        self.blocked.retain(|_, until| now < *until);
    }
}
