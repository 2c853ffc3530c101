use serde::{Deserialize, Serialize};

use crate::models::{Difficulty, Outcome, Pos, RevealedCell};

/// Header carrying the client's session token on every request.
pub const SESSION_TOKEN_HEADER: &str = "X-Session-Token";

#[derive(Debug, Deserialize, Serialize)]
pub struct NewGameRequest {
    pub difficulty: Difficulty,
}

/// Body of the reveal and flag requests.
#[derive(Debug, Deserialize, Serialize)]
pub struct CellRequest {
    pub r: usize,
    pub c: usize,
}

impl From<Pos> for CellRequest {
    fn from(pos: Pos) -> Self {
        Self { r: pos.r, c: pos.c }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum OverTag {
    #[serde(rename = "over")]
    Over,
}

/// Sent for any action once the backend considers the game finished.
#[derive(Debug, Deserialize, Serialize)]
pub struct GameOverReply {
    pub status: OverTag,
    pub outcome: Outcome,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body of a non-success reply that is not a game-over notice.
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorReply {
    pub error: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NewGameResponse {
    pub rows: usize,
    pub cols: usize,
    #[serde(alias = "minesTotal")]
    pub mines_total: usize,
    #[serde(default)]
    pub revealed: Vec<RevealedCell>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "status")]
pub enum RevealResponse {
    #[serde(rename = "safe")]
    Safe {
        r: Option<usize>,
        c: Option<usize>,
        clue: u8,
        #[serde(default)]
        game_over: bool,
        outcome: Option<Outcome>,
    },
    #[serde(rename = "blocked")]
    Blocked {
        reason: Option<String>,
        message: Option<String>,
    },
    #[serde(rename = "boom")]
    Boom {
        outcome: Option<Outcome>,
        #[serde(default)]
        mines: Vec<Pos>,
        message: Option<String>,
    },
    #[serde(rename = "over")]
    Over {
        outcome: Outcome,
        message: Option<String>,
    },
    #[serde(rename = "already")]
    Already,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FlagToggled {
    pub flagged: bool,
    pub r: Option<usize>,
    pub c: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum FlagResponse {
    Over(GameOverReply),
    Toggled(FlagToggled),
}

/// `type` is `safe`, `mine`, or anything else for "no hint". Older backends
/// answer a safe hint with a single `r`/`c` instead of `cells`.
#[derive(Debug, Deserialize, Serialize)]
pub struct HintPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub cells: Vec<Pos>,
    pub r: Option<usize>,
    pub c: Option<usize>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum HintResponse {
    Over(GameOverReply),
    Hint(HintPayload),
}

/// `consistent: null` means the model checker could not run; `error` says why.
/// The key itself must be present.
#[derive(Debug, Deserialize, Serialize)]
pub struct ConsistencyPayload {
    #[serde(deserialize_with = "Option::deserialize")]
    pub consistent: Option<bool>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ConsistencyResponse {
    Over(GameOverReply),
    Verdict(ConsistencyPayload),
}

/// `cells` may only be left out when `status` is `stuck`.
#[derive(Debug, Deserialize, Serialize)]
pub struct SolvePayload {
    pub cells: Option<Vec<RevealedCell>>,
    pub status: Option<String>,
    #[serde(default)]
    pub game_over: bool,
    pub outcome: Option<Outcome>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SolveResponse {
    Over(GameOverReply),
    Batch(SolvePayload),
}
