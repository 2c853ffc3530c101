//! Logicsweeper Client Library
//!
//! This library drives a minesweeper variant where guessing is not allowed:
//! every reveal is certified safe by a reasoning backend before the cell opens,
//! and a second oracle can tell whether the current flags agree with the clues.
//!
//! ## Usage
//!
//! ### High-Level Interface (Recommended)
//!
//! [`LogicGame`] owns the board, sends one request per player action and
//! applies the backend's verdict:
//!
//! ```rust,no_run
//! use logicsweeper_client::{Action, Difficulty, LogicGame, Pos};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let game = LogicGame::new("http://localhost:5000")?;
//!
//!     game.dispatch(Action::NewSession(Difficulty::Easy)).await?;
//!
//!     match game.dispatch(Action::Reveal(Pos::new(2, 3))).await {
//!         Ok(notice) => println!("{notice}"),
//!         Err(e) => println!("{}", e.user_message()),
//!     }
//!
//!     game.dispatch(Action::ToggleFlag(Pos::new(1, 1))).await?;
//!     game.dispatch(Action::RequestHint).await?;
//!
//!     if let Some(session) = game.get_state().await {
//!         println!("Game over: {}", session.is_game_over());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Low-Level Interface
//!
//! [`SessionClient`] exposes the raw round trips through the [`Backend`] trait,
//! which is also the seam for plugging in other transports:
//!
//! ```rust,no_run
//! use logicsweeper_client::{Backend, Difficulty, Pos, SessionClient, SessionToken};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let client = SessionClient::new("http://localhost:5000")?;
//!     let token = SessionToken(1);
//!
//!     let start = client.start_session(token, Difficulty::Medium).await?;
//!     println!("{}x{} with {} mines", start.rows, start.cols, start.mines_total);
//!
//!     let verdict = client.request_reveal(token, Pos::new(0, 0)).await?;
//!     println!("{verdict:?}");
//!     Ok(())
//! }
//! ```

mod board;
mod client;
mod config;
mod endgame;
mod error;
mod game;
mod notice;
mod overlay;
mod verdict;

pub use board::{Board, Cell, CellCounts, MAX_CELLS, MAX_CLUE, RevealState};
pub use client::{Backend, SessionClient};
pub use config::ClientConfig;
pub use error::{BoardError, ClientError, GameError};
pub use game::{Action, GameEvent, LogicGame, Session, SessionStatus};
pub use notice::Notice;
pub use overlay::HintOverlay;
pub use verdict::{
    BlockReason, ConsistencyVerdict, FlagVerdict, HintVerdict, RevealVerdict, SessionStart,
    SolveVerdict,
};

// Re-export common types for convenience
pub use logicsweeper_common::{models::*, protocol::*};

pub type Result<T> = std::result::Result<T, GameError>;
