use logicsweeper_common::models::Pos;
use thiserror::Error;

/// Local invariant violations. Raised before anything is sent to the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell {0} is outside the board")]
    OutOfBounds(Pos),
    #[error("cell {0} is already open")]
    NotHidden(Pos),
    #[error("cell {0} is flagged, unflag it first")]
    Flagged(Pos),
    #[error("clue {clue} at {pos} is not a neighbour count")]
    InvalidClue { pos: Pos, clue: u8 },
    #[error("a {rows}x{cols} board is not playable")]
    InvalidDimensions { rows: usize, cols: usize },
}

/// Failures talking to the reasoning backend. None of them touch local state.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Protocol(String),
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ClientError {
    pub fn is_protocol(&self) -> bool {
        matches!(self, ClientError::Protocol(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ClientError::Protocol(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Protocol(e.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::Transport(format!("invalid backend url: {e}"))
    }
}

/// Everything an action on [`crate::LogicGame`] can fail with.
#[derive(Error, Debug)]
pub enum GameError {
    #[error(transparent)]
    Precondition(#[from] BoardError),
    #[error("no game in progress, start a new one first")]
    NoSession,
    #[error("the game is over, start a new one")]
    GameOver,
    #[error("still waiting for the previous move to be checked")]
    Busy,
    #[error("response arrived for a game that has since been replaced")]
    StaleSession,
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl GameError {
    /// True when the action was refused without contacting the backend.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            GameError::Precondition(_) | GameError::NoSession | GameError::GameOver | GameError::Busy
        )
    }

    /// Text shown to the player. Transport and protocol failures share one message.
    pub fn user_message(&self) -> String {
        match self {
            GameError::Client(_) => "Error communicating with server.".to_string(),
            other => other.to_string(),
        }
    }
}
