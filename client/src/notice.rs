use std::fmt;

use logicsweeper_common::models::{Difficulty, Pos};

use crate::verdict::BlockReason;

/// Player-facing result of an action. Each variant is its own message class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    SessionStarted {
        difficulty: Difficulty,
        mines_total: usize,
    },
    Revealed {
        pos: Pos,
        clue: u8,
    },
    RevealBlocked {
        pos: Pos,
        reason: BlockReason,
        message: Option<String>,
    },
    FlagChanged {
        pos: Pos,
        flagged: bool,
    },
    /// A hint search ran and found this many safe cells (never zero).
    SafeCellsFound(usize),
    /// A hint search ran and found nothing.
    NoSafeCellsFound,
    /// The backend declined to give a hint.
    NoHint(Option<String>),
    MineSuspected(Pos),
    Consistent,
    Inconsistent,
    ConsistencyUnavailable(Option<String>),
    Solved(usize),
    Stuck,
    GameWon,
    GameLost,
    /// A game-over verdict arrived for a game already settled locally.
    AlreadyOver,
}

impl Notice {
    /// True for notices that should be shown as a warning rather than plain info.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Notice::RevealBlocked { .. } | Notice::Inconsistent | Notice::GameLost
        )
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SessionStarted {
                difficulty,
                mines_total,
            } => write!(f, "Started {difficulty} game. Mines: {mines_total}"),
            Notice::Revealed { .. } => f.write_str("Safe! Proved by logic."),
            Notice::RevealBlocked {
                pos,
                reason,
                message,
            } => {
                if let Some(message) = message {
                    return f.write_str(message);
                }
                match reason {
                    BlockReason::NotProvable => {
                        write!(f, "Logic cannot prove {pos} is safe yet.")
                    }
                    BlockReason::Flagged => write!(f, "{pos} is flagged, unflag it first."),
                    BlockReason::AlreadyRevealed => write!(f, "{pos} is already open."),
                    BlockReason::Unspecified => write!(f, "Reveal of {pos} was refused."),
                    BlockReason::Other(reason) => write!(f, "Reveal of {pos} was refused: {reason}"),
                }
            }
            Notice::FlagChanged { pos, flagged: true } => write!(f, "Flagged {pos}."),
            Notice::FlagChanged { pos, flagged: false } => write!(f, "Removed flag from {pos}."),
            Notice::SafeCellsFound(1) => f.write_str("Hint: 1 cell is provably safe."),
            Notice::SafeCellsFound(n) => write!(f, "Hint: {n} cells are provably safe."),
            Notice::NoSafeCellsFound => f.write_str("Hint: no cell is provably safe right now."),
            Notice::NoHint(Some(message)) => f.write_str(message),
            Notice::NoHint(None) => f.write_str("No logic hints available."),
            Notice::MineSuspected(pos) => write!(f, "Hint: {pos} is provably a mine."),
            Notice::Consistent => f.write_str("State is consistent."),
            Notice::Inconsistent => f.write_str("State is inconsistent: flags contradict clues."),
            Notice::ConsistencyUnavailable(Some(detail)) => {
                write!(f, "Consistency check unavailable: {detail}")
            }
            Notice::ConsistencyUnavailable(None) => f.write_str("Consistency check unavailable."),
            Notice::Solved(n) => write!(f, "Solver opened {n} provably safe cells."),
            Notice::Stuck => f.write_str("Solver is stuck: no further cells can be proved safe."),
            Notice::GameWon => f.write_str("You won! Every safe cell is open."),
            Notice::GameLost => f.write_str("Mine hit. Game over."),
            Notice::AlreadyOver => f.write_str("Game is already over."),
        }
    }
}
