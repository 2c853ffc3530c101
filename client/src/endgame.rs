//! Terminal-state transition.
//!
//! Only a verdict from the backend ends a game. Once a session is settled,
//! later game-over verdicts for it change nothing.

use logicsweeper_common::models::{Outcome, Pos};
use tracing::{debug, info};

use crate::game::{Session, SessionStatus};
use crate::notice::Notice;

/// What changed when a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conclusion {
    pub notice: Notice,
    /// Mines newly disclosed on the board.
    pub disclosed: Vec<Pos>,
}

/// Settle the session with the given outcome.
///
/// On a loss the given mines are disclosed. Returns `None` if the session was
/// already settled.
pub fn conclude(session: &mut Session, outcome: Outcome, mines: &[Pos]) -> Option<Conclusion> {
    if session.status != SessionStatus::Active {
        debug!(
            "Ignoring {:?} for session {} already {:?}",
            outcome, session.token, session.status
        );
        return None;
    }

    session.status = outcome.into();
    session.overlay.clear();

    let (notice, disclosed) = match outcome {
        Outcome::Win => (Notice::GameWon, Vec::new()),
        Outcome::Lose => (Notice::GameLost, session.board.apply_mine_reveal(mines)),
    };
    info!(
        "Session {} ended: {:?}, {} mines disclosed",
        session.token,
        outcome,
        disclosed.len()
    );

    Some(Conclusion { notice, disclosed })
}
