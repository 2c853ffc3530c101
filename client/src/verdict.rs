//! Typed backend verdicts, decoded from the raw wire replies.

use logicsweeper_common::{
    models::{Outcome, Pos, RevealedCell},
    protocol::{
        ConsistencyResponse, FlagResponse, HintResponse, NewGameResponse, RevealResponse,
        SolveResponse,
    },
};

use crate::board::{Board, MAX_CLUE};
use crate::error::ClientError;

/// Dimensions and opening move of a freshly generated board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub rows: usize,
    pub cols: usize,
    pub mines_total: usize,
    pub revealed: Vec<RevealedCell>,
}

/// Why the backend refused to open a cell. Open ended: unknown reasons are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The prover could not show the cell is safe.
    NotProvable,
    Flagged,
    AlreadyRevealed,
    /// Older backends send no reason at all.
    Unspecified,
    Other(String),
}

impl BlockReason {
    pub fn from_wire(reason: Option<&str>) -> Self {
        match reason {
            None => BlockReason::Unspecified,
            Some("not_provable") => BlockReason::NotProvable,
            Some("flagged") => BlockReason::Flagged,
            Some("already") | Some("already_revealed") => BlockReason::AlreadyRevealed,
            Some(other) => BlockReason::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealVerdict {
    /// Certified safe. `outcome` is set when this reveal finished the game.
    Safe { clue: u8, outcome: Option<Outcome> },
    Blocked {
        reason: BlockReason,
        message: Option<String>,
    },
    Exploded { outcome: Outcome, mines: Vec<Pos> },
    Over(Outcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagVerdict {
    Flagged(bool),
    Over(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HintVerdict {
    SafeCells(Vec<Pos>),
    /// Advisory only, never changes the board.
    Mine(Pos),
    NoHint(Option<String>),
    Over(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyVerdict {
    Consistent(bool),
    /// The model checker could not be run. Not the same as inconsistent.
    Unavailable(Option<String>),
    Over(Outcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveVerdict {
    /// Newly certified cells, empty when the solver is stuck.
    Batch {
        cells: Vec<RevealedCell>,
        outcome: Option<Outcome>,
    },
    Over(Outcome),
}

fn terminal(game_over: bool, outcome: Option<Outcome>) -> Option<Outcome> {
    if game_over {
        Some(outcome.unwrap_or(Outcome::Win))
    } else {
        outcome
    }
}

fn check_clue(pos: Pos, clue: u8) -> Result<(), ClientError> {
    if clue > MAX_CLUE {
        return Err(ClientError::Protocol(format!("clue {clue} for {pos} out of range")));
    }
    Ok(())
}

impl TryFrom<NewGameResponse> for SessionStart {
    type Error = ClientError;

    fn try_from(response: NewGameResponse) -> Result<Self, Self::Error> {
        Board::cell_count(response.rows, response.cols)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        for cell in &response.revealed {
            check_clue(cell.pos(), cell.clue)?;
        }
        Ok(Self {
            rows: response.rows,
            cols: response.cols,
            mines_total: response.mines_total,
            revealed: response.revealed,
        })
    }
}

impl RevealVerdict {
    /// Decode the reply to a reveal of `requested`.
    pub fn decode(requested: Pos, response: RevealResponse) -> Result<Self, ClientError> {
        Ok(match response {
            RevealResponse::Safe {
                r,
                c,
                clue,
                game_over,
                outcome,
            } => {
                let answered = Pos::new(r.unwrap_or(requested.r), c.unwrap_or(requested.c));
                if answered != requested {
                    return Err(ClientError::Protocol(format!(
                        "reveal of {requested} answered for {answered}"
                    )));
                }
                check_clue(requested, clue)?;
                RevealVerdict::Safe {
                    clue,
                    outcome: terminal(game_over, outcome),
                }
            }
            RevealResponse::Blocked { reason, message } => RevealVerdict::Blocked {
                reason: BlockReason::from_wire(reason.as_deref()),
                message,
            },
            RevealResponse::Already => RevealVerdict::Blocked {
                reason: BlockReason::AlreadyRevealed,
                message: None,
            },
            RevealResponse::Boom { outcome, mines, .. } => RevealVerdict::Exploded {
                outcome: outcome.unwrap_or(Outcome::Lose),
                mines,
            },
            RevealResponse::Over { outcome, .. } => RevealVerdict::Over(outcome),
        })
    }
}

impl From<FlagResponse> for FlagVerdict {
    fn from(response: FlagResponse) -> Self {
        match response {
            FlagResponse::Over(over) => FlagVerdict::Over(over.outcome),
            FlagResponse::Toggled(toggled) => FlagVerdict::Flagged(toggled.flagged),
        }
    }
}

impl TryFrom<HintResponse> for HintVerdict {
    type Error = ClientError;

    fn try_from(response: HintResponse) -> Result<Self, Self::Error> {
        let payload = match response {
            HintResponse::Over(over) => return Ok(HintVerdict::Over(over.outcome)),
            HintResponse::Hint(payload) => payload,
        };

        let single = payload.r.zip(payload.c).map(|(r, c)| Pos::new(r, c));
        match payload.kind.as_str() {
            "safe" => {
                let mut cells = payload.cells;
                if cells.is_empty() {
                    cells.extend(single);
                }
                Ok(HintVerdict::SafeCells(cells))
            }
            "mine" => single.map(HintVerdict::Mine).ok_or_else(|| {
                ClientError::Protocol("mine hint without a coordinate".to_string())
            }),
            _ => Ok(HintVerdict::NoHint(payload.message)),
        }
    }
}

impl From<ConsistencyResponse> for ConsistencyVerdict {
    fn from(response: ConsistencyResponse) -> Self {
        match response {
            ConsistencyResponse::Over(over) => ConsistencyVerdict::Over(over.outcome),
            ConsistencyResponse::Verdict(payload) => match payload.consistent {
                Some(consistent) => ConsistencyVerdict::Consistent(consistent),
                None => ConsistencyVerdict::Unavailable(payload.error),
            },
        }
    }
}

impl TryFrom<SolveResponse> for SolveVerdict {
    type Error = ClientError;

    fn try_from(response: SolveResponse) -> Result<Self, Self::Error> {
        let payload = match response {
            SolveResponse::Over(over) => return Ok(SolveVerdict::Over(over.outcome)),
            SolveResponse::Batch(payload) => payload,
        };

        let cells = match (payload.status.as_deref(), payload.cells) {
            (Some("stuck"), cells) => cells.unwrap_or_default(),
            (None | Some("ok") | Some("solved"), Some(cells)) => cells,
            (status, _) => {
                return Err(ClientError::Protocol(format!(
                    "unrecognized solve reply (status {status:?})"
                )));
            }
        };
        for cell in &cells {
            check_clue(cell.pos(), cell.clue)?;
        }
        Ok(SolveVerdict::Batch {
            cells,
            outcome: terminal(payload.game_over, payload.outcome),
        })
    }
}
