use logicsweeper_common::models::Pos;
use tracing::warn;

use crate::error::BoardError;

/// Highest neighbour count a cell can show.
pub const MAX_CLUE: u8 = 8;

/// Largest board the client will allocate.
pub const MAX_CELLS: usize = 1 << 16;

/// What is known about a cell's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Hidden,
    /// Opened and certified safe, showing its neighbour count.
    Revealed { clue: u8 },
    /// The mine that ended the game.
    Exploded,
    /// A mine disclosed after a loss.
    Mine,
}

/// A single board cell. `flagged` is only ever set while the cell is hidden.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cell {
    pub state: RevealState,
    pub flagged: bool,
}

impl Cell {
    pub fn is_hidden(&self) -> bool {
        self.state == RevealState::Hidden
    }

    /// Neighbour count, present only for revealed cells.
    pub fn clue(&self) -> Option<u8> {
        match self.state {
            RevealState::Revealed { clue } => Some(clue),
            _ => None,
        }
    }
}

/// Per-state tallies, mostly for status lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub hidden: usize,
    pub flagged: usize,
    pub revealed: usize,
    pub exploded: usize,
    pub mines: usize,
}

/// Authoritative cell grid for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    mines_total: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a board with every cell hidden and unflagged.
    pub fn new(rows: usize, cols: usize, mines_total: usize) -> Result<Self, BoardError> {
        let len = Self::cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            mines_total,
            cells: vec![Cell::default(); len],
        })
    }

    /// Number of cells in a `rows` x `cols` board, if that board is allowed.
    pub fn cell_count(rows: usize, cols: usize) -> Result<usize, BoardError> {
        rows.checked_mul(cols)
            .filter(|&len| len > 0 && len <= MAX_CELLS)
            .ok_or(BoardError::InvalidDimensions { rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mines_total(&self) -> usize {
        self.mines_total
    }

    pub fn contains(&self, pos: Pos) -> bool {
        pos.r < self.rows && pos.c < self.cols
    }

    /// Get the cell at the specified position
    pub fn get(&self, pos: Pos) -> Option<Cell> {
        if self.contains(pos) {
            self.cells.get(pos.r * self.cols + pos.c).copied()
        } else {
            None
        }
    }

    /// True for an in-bounds cell that is hidden and not flagged.
    pub fn is_open_for_reveal(&self, pos: Pos) -> bool {
        self.get(pos).is_some_and(|cell| cell.is_hidden() && !cell.flagged)
    }

    fn cell_mut(&mut self, pos: Pos) -> Result<&mut Cell, BoardError> {
        if !self.contains(pos) {
            return Err(BoardError::OutOfBounds(pos));
        }
        let cols = self.cols;
        self.cells
            .get_mut(pos.r * cols + pos.c)
            .ok_or(BoardError::OutOfBounds(pos))
    }

    /// Mark a hidden, unflagged cell as revealed with the given clue.
    pub fn apply_reveal(&mut self, pos: Pos, clue: u8) -> Result<(), BoardError> {
        if clue > MAX_CLUE {
            return Err(BoardError::InvalidClue { pos, clue });
        }
        let cell = self.cell_mut(pos)?;
        if !cell.is_hidden() {
            return Err(BoardError::NotHidden(pos));
        }
        if cell.flagged {
            return Err(BoardError::Flagged(pos));
        }
        cell.state = RevealState::Revealed { clue };
        Ok(())
    }

    /// Mark the cell that ended the game.
    pub fn apply_explode(&mut self, pos: Pos) -> Result<(), BoardError> {
        let cell = self.cell_mut(pos)?;
        if !cell.is_hidden() {
            return Err(BoardError::NotHidden(pos));
        }
        if cell.flagged {
            return Err(BoardError::Flagged(pos));
        }
        cell.state = RevealState::Exploded;
        Ok(())
    }

    /// Disclose the remaining mines after a loss. Flagged cells keep their flag
    /// and opened cells are left alone. Returns the cells that changed.
    pub fn apply_mine_reveal(&mut self, mines: &[Pos]) -> Vec<Pos> {
        let mut changed = Vec::new();
        for &pos in mines {
            match self.cell_mut(pos) {
                Ok(cell) if cell.is_hidden() && !cell.flagged => {
                    cell.state = RevealState::Mine;
                    changed.push(pos);
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping mine disclosure: {}", e),
            }
        }
        changed
    }

    /// Flip the flag on a hidden cell, returning the new flag state.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<bool, BoardError> {
        let cell = self.cell_mut(pos)?;
        if !cell.is_hidden() {
            return Err(BoardError::NotHidden(pos));
        }
        cell.flagged = !cell.flagged;
        Ok(cell.flagged)
    }

    /// Set the flag on a hidden cell. Returns whether anything changed.
    pub fn set_flag(&mut self, pos: Pos, flagged: bool) -> Result<bool, BoardError> {
        let cell = self.cell_mut(pos)?;
        if !cell.is_hidden() {
            return Err(BoardError::NotHidden(pos));
        }
        let changed = cell.flagged != flagged;
        cell.flagged = flagged;
        Ok(changed)
    }

    /// Iterate over every position with its cell, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (Pos, Cell)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (Pos::new(i / cols, i % cols), *cell))
    }

    /// Count the number of cells in each state
    pub fn count_cells(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for cell in &self.cells {
            match cell.state {
                RevealState::Hidden if cell.flagged => counts.flagged += 1,
                RevealState::Hidden => counts.hidden += 1,
                RevealState::Revealed { .. } => counts.revealed += 1,
                RevealState::Exploded => counts.exploded += 1,
                RevealState::Mine => counts.mines += 1,
            }
        }
        counts
    }
}
