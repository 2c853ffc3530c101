use std::sync::Arc;
use std::time::{Duration, Instant};

use logicsweeper_common::models::{Difficulty, Outcome, Pos, SessionToken};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock, mpsc};
use tracing::{debug, info, warn};

use crate::board::{Board, MAX_CLUE};
use crate::client::{Backend, SessionClient};
use crate::config::ClientConfig;
use crate::endgame;
use crate::error::{BoardError, ClientError, GameError};
use crate::notice::Notice;
use crate::overlay::HintOverlay;
use crate::verdict::{
    ConsistencyVerdict, FlagVerdict, HintVerdict, RevealVerdict, SessionStart, SolveVerdict,
};
use crate::Result;

/// Events emitted by the game after a verdict has been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A fresh board replaced the previous one
    SessionStarted {
        rows: usize,
        cols: usize,
        mines_total: usize,
    },
    /// Authoritative cell state changed
    BoardUpdated {
        /// List of cell positions that changed
        changed_positions: Vec<Pos>,
    },
    /// Hint markers or blocked flashes changed
    OverlayUpdated,
    /// The session was settled
    StatusChanged { status: SessionStatus },
    /// Message for the player
    Notice(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Won,
    Lost,
}

impl From<Outcome> for SessionStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => SessionStatus::Won,
            Outcome::Lose => SessionStatus::Lost,
        }
    }
}

/// Every player gesture the controller understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Reveal(Pos),
    ToggleFlag(Pos),
    RequestHint,
    CheckConsistency,
    AutoSolve,
    NewSession(Difficulty),
}

/// One game: the board, its overlay and where it stands.
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) token: SessionToken,
    pub(crate) difficulty: Difficulty,
    pub(crate) board: Board,
    pub(crate) overlay: HintOverlay,
    pub(crate) status: SessionStatus,
    /// Held by the move waiting for a verdict. Released on completion or when
    /// the move's future is dropped.
    busy: Arc<Mutex<()>>,
}

impl Session {
    pub(crate) fn new(token: SessionToken, difficulty: Difficulty, board: Board) -> Self {
        Self {
            token,
            difficulty,
            board,
            overlay: HintOverlay::new(),
            status: SessionStatus::Active,
            busy: Arc::new(Mutex::new(())),
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn overlay(&self) -> &HintOverlay {
        &self.overlay
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Check if the game is in a completed state (won or lost)
    pub fn is_game_over(&self) -> bool {
        self.status != SessionStatus::Active
    }

    /// True while a move is waiting for the backend.
    pub fn is_busy(&self) -> bool {
        self.busy.try_lock().is_err()
    }

    fn settle(&mut self, outcome: Outcome, mines: &[Pos], events: &mut Vec<GameEvent>) -> Notice {
        match endgame::conclude(self, outcome, mines) {
            Some(conclusion) => {
                if !conclusion.disclosed.is_empty() {
                    events.push(GameEvent::BoardUpdated {
                        changed_positions: conclusion.disclosed,
                    });
                }
                events.push(GameEvent::OverlayUpdated);
                events.push(GameEvent::StatusChanged {
                    status: self.status,
                });
                conclusion.notice
            }
            None => Notice::AlreadyOver,
        }
    }

    fn apply_reveal(
        &mut self,
        pos: Pos,
        verdict: RevealVerdict,
        flash: (Instant, Duration),
        events: &mut Vec<GameEvent>,
    ) -> Result<Notice> {
        match verdict {
            RevealVerdict::Safe { clue, outcome } => {
                self.board.apply_reveal(pos, clue)?;
                self.overlay.forget(pos);
                events.push(GameEvent::BoardUpdated {
                    changed_positions: vec![pos],
                });
                Ok(match outcome {
                    Some(outcome) => self.settle(outcome, &[], events),
                    None => Notice::Revealed { pos, clue },
                })
            }
            RevealVerdict::Blocked { reason, message } => {
                let (now, duration) = flash;
                self.overlay.flash_blocked(pos, now, duration);
                events.push(GameEvent::OverlayUpdated);
                Ok(Notice::RevealBlocked {
                    pos,
                    reason,
                    message,
                })
            }
            RevealVerdict::Exploded { outcome, mines } => {
                self.board.apply_explode(pos)?;
                self.overlay.forget(pos);
                events.push(GameEvent::BoardUpdated {
                    changed_positions: vec![pos],
                });
                Ok(self.settle(outcome, &mines, events))
            }
            RevealVerdict::Over(outcome) => Ok(self.settle(outcome, &[], events)),
        }
    }

    fn apply_flag(
        &mut self,
        pos: Pos,
        verdict: FlagVerdict,
        events: &mut Vec<GameEvent>,
    ) -> Result<Notice> {
        match verdict {
            FlagVerdict::Flagged(flagged) => {
                if self.board.set_flag(pos, flagged)? {
                    self.overlay.forget(pos);
                    events.push(GameEvent::BoardUpdated {
                        changed_positions: vec![pos],
                    });
                }
                Ok(Notice::FlagChanged { pos, flagged })
            }
            FlagVerdict::Over(outcome) => Ok(self.settle(outcome, &[], events)),
        }
    }

    fn apply_hint(&mut self, verdict: HintVerdict, events: &mut Vec<GameEvent>) -> Notice {
        // Stale markers go first, whatever the new hint says.
        self.overlay.clear();
        let notice = match verdict {
            HintVerdict::SafeCells(cells) => match self.overlay.mark(cells, &self.board) {
                0 => Notice::NoSafeCellsFound,
                n => Notice::SafeCellsFound(n),
            },
            HintVerdict::Mine(pos) => {
                self.overlay.suspect_mine(pos, &self.board);
                Notice::MineSuspected(pos)
            }
            HintVerdict::NoHint(message) => Notice::NoHint(message),
            HintVerdict::Over(outcome) => return self.settle(outcome, &[], events),
        };
        events.push(GameEvent::OverlayUpdated);
        notice
    }

    fn apply_consistency(
        &mut self,
        verdict: ConsistencyVerdict,
        events: &mut Vec<GameEvent>,
    ) -> Notice {
        match verdict {
            ConsistencyVerdict::Consistent(true) => Notice::Consistent,
            ConsistencyVerdict::Consistent(false) => Notice::Inconsistent,
            ConsistencyVerdict::Unavailable(detail) => Notice::ConsistencyUnavailable(detail),
            ConsistencyVerdict::Over(outcome) => self.settle(outcome, &[], events),
        }
    }

    /// Open one certified cell. The backend opens flagged cells too; the flag goes with it.
    fn open_solved(
        &mut self,
        pos: Pos,
        flagged: bool,
        clue: u8,
    ) -> std::result::Result<(), BoardError> {
        if flagged {
            self.board.set_flag(pos, false)?;
        }
        self.board.apply_reveal(pos, clue)?;
        self.overlay.forget(pos);
        Ok(())
    }

    fn apply_solve(&mut self, verdict: SolveVerdict, events: &mut Vec<GameEvent>) -> Result<Notice> {
        let (cells, outcome) = match verdict {
            SolveVerdict::Batch { cells, outcome } => (cells, outcome),
            SolveVerdict::Over(outcome) => return Ok(self.settle(outcome, &[], events)),
        };

        if let Some(bad) = cells.iter().find(|cell| cell.clue > MAX_CLUE) {
            return Err(report(ClientError::Protocol(format!(
                "solver sent clue {} for {}",
                bad.clue,
                bad.pos()
            ))));
        }

        let mut changed = Vec::new();
        let mut failure = None;
        for cell in &cells {
            let pos = cell.pos();
            match self.board.get(pos) {
                Some(current) if current.is_hidden() => {
                    match self.open_solved(pos, current.flagged, cell.clue) {
                        Ok(()) => changed.push(pos),
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
                _ => debug!("Skipping solved cell {} that is no longer hidden", pos),
            }
        }

        // Cells the player already opened do not count as progress.
        let notice = if changed.is_empty() {
            Notice::Stuck
        } else {
            Notice::Solved(changed.len())
        };
        if !changed.is_empty() {
            events.push(GameEvent::BoardUpdated {
                changed_positions: changed,
            });
        }
        if let Some(e) = failure {
            return Err(e.into());
        }

        Ok(match outcome {
            Some(outcome) => self.settle(outcome, &[], events),
            None => notice,
        })
    }
}

struct ControllerState {
    session: Option<Session>,
    /// Token handed to the most recent new-session request.
    last_token: SessionToken,
}

/// Drives one player's game against a reasoning backend.
///
/// Each action makes at most one backend call. While a move is waiting for
/// its verdict, further moves on the same session are refused with
/// [`GameError::Busy`]; starting a new game is always allowed and makes any
/// pending verdict for the old game stale.
pub struct LogicGame<B = SessionClient> {
    backend: B,
    config: ClientConfig,
    state: RwLock<ControllerState>,
    event_sender: RwLock<Option<mpsc::UnboundedSender<GameEvent>>>,
}

impl LogicGame<SessionClient> {
    /// Create a game talking to the backend at `server_url`
    pub fn new(server_url: &str) -> std::result::Result<Self, ClientError> {
        Self::from_config(ClientConfig {
            server_url: server_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: ClientConfig) -> std::result::Result<Self, ClientError> {
        let client = SessionClient::from_config(&config)?;
        Ok(Self::with_backend(client, config))
    }
}

impl<B: Backend> LogicGame<B> {
    pub fn with_backend(backend: B, config: ClientConfig) -> Self {
        Self {
            backend,
            config,
            state: RwLock::new(ControllerState {
                session: None,
                last_token: SessionToken::default(),
            }),
            event_sender: RwLock::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Subscribe to game events. Returns a receiver for game events.
    pub async fn subscribe_to_events(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (sender, receiver) = mpsc::unbounded_channel();
        *self.event_sender.write().await = Some(sender);
        receiver
    }

    /// Snapshot of the current session
    pub async fn get_state(&self) -> Option<Session> {
        self.state.read().await.session.clone()
    }

    /// Drop blocked flashes that have run their course.
    pub async fn prune_flashes(&self) {
        if let Some(session) = self.state.write().await.session.as_mut() {
            session.overlay.prune(Instant::now());
        }
    }

    /// Single entry point for player actions.
    pub async fn dispatch(&self, action: Action) -> Result<Notice> {
        match action {
            Action::Reveal(pos) => self.reveal(pos).await,
            Action::ToggleFlag(pos) => self.toggle_flag(pos).await,
            Action::RequestHint => self.hint().await,
            Action::CheckConsistency => self.check_consistency().await,
            Action::AutoSolve => self.auto_solve().await,
            Action::NewSession(difficulty) => self.new_session(difficulty).await,
        }
    }

    /// Start a new game, discarding the current one once the backend answers.
    ///
    /// A board only replaces one from an older request. If two starts overlap,
    /// the newer board wins once it arrives; if the newer start fails, the older
    /// one is still installed.
    pub async fn new_session(&self, difficulty: Difficulty) -> Result<Notice> {
        let token = {
            let mut state = self.state.write().await;
            state.last_token = state.last_token.next();
            state.last_token
        };
        info!("Starting new {} game as session {}", difficulty, token);

        let start = self.backend.start_session(token, difficulty).await;

        let mut events = Vec::new();
        let result = {
            let mut state = self.state.write().await;
            if state.session.as_ref().is_some_and(|current| current.token > token) {
                warn!("Discarding board for superseded session {}", token);
                Err(GameError::StaleSession)
            } else {
                match start.and_then(|start| Self::open_session(token, difficulty, start)) {
                    Ok((session, opened)) => {
                        let board = session.board();
                        events.push(GameEvent::SessionStarted {
                            rows: board.rows(),
                            cols: board.cols(),
                            mines_total: board.mines_total(),
                        });
                        if !opened.is_empty() {
                            events.push(GameEvent::BoardUpdated {
                                changed_positions: opened,
                            });
                        }
                        let notice = Notice::SessionStarted {
                            difficulty,
                            mines_total: board.mines_total(),
                        };
                        state.session = Some(session);
                        Ok(notice)
                    }
                    Err(e) => Err(report(e)),
                }
            }
        };

        self.publish(events, &result).await;
        result
    }

    fn open_session(
        token: SessionToken,
        difficulty: Difficulty,
        start: SessionStart,
    ) -> std::result::Result<(Session, Vec<Pos>), ClientError> {
        let board = Board::new(start.rows, start.cols, start.mines_total)
            .map_err(|e| ClientError::Protocol(e.to_string()))?;
        let mut session = Session::new(token, difficulty, board);

        let mut opened = Vec::new();
        for cell in &start.revealed {
            match session.board.apply_reveal(cell.pos(), cell.clue) {
                Ok(()) => opened.push(cell.pos()),
                Err(e) => warn!("Ignoring opening cell: {}", e),
            }
        }
        info!(
            "Session {}: {}x{} with {} mines, {} cells open",
            token,
            start.rows,
            start.cols,
            start.mines_total,
            opened.len()
        );
        Ok((session, opened))
    }

    /// Ask the backend to open a cell. Flagged or open cells are refused locally.
    pub async fn reveal(&self, pos: Pos) -> Result<Notice> {
        let (token, permit) = self
            .begin(|session| {
                let cell = session.board.get(pos).ok_or(BoardError::OutOfBounds(pos))?;
                if !cell.is_hidden() {
                    return Err(BoardError::NotHidden(pos));
                }
                if cell.flagged {
                    return Err(BoardError::Flagged(pos));
                }
                Ok(())
            })
            .await?;
        debug!("Revealing cell {} in session {}", pos, token);

        let verdict = self.backend.request_reveal(token, pos).await;
        let flash = (Instant::now(), self.config.blocked_flash);
        self.complete(token, permit, verdict, |session, verdict, events| {
            session.apply_reveal(pos, verdict, flash, events)
        })
        .await
    }

    /// Flag or unflag a hidden cell
    pub async fn toggle_flag(&self, pos: Pos) -> Result<Notice> {
        let (token, permit) = self
            .begin(|session| {
                let cell = session.board.get(pos).ok_or(BoardError::OutOfBounds(pos))?;
                if !cell.is_hidden() {
                    return Err(BoardError::NotHidden(pos));
                }
                Ok(())
            })
            .await?;
        debug!("Toggling flag on {} in session {}", pos, token);

        let verdict = self.backend.request_flag_toggle(token, pos).await;
        self.complete(token, permit, verdict, |session, verdict, events| {
            session.apply_flag(pos, verdict, events)
        })
        .await
    }

    /// Ask for the cells that are currently provably safe
    pub async fn hint(&self) -> Result<Notice> {
        let (token, permit) = self.begin(|_| Ok(())).await?;
        debug!("Requesting hint for session {}", token);

        let verdict = self.backend.request_hint(token).await;
        self.complete(token, permit, verdict, |session, verdict, events| {
            Ok(session.apply_hint(verdict, events))
        })
        .await
    }

    /// Ask whether flags and clues can all hold at once. Never changes the board.
    pub async fn check_consistency(&self) -> Result<Notice> {
        let (token, permit) = self.begin(|_| Ok(())).await?;
        debug!("Requesting consistency check for session {}", token);

        let verdict = self.backend.request_consistency_check(token).await;
        self.complete(token, permit, verdict, |session, verdict, events| {
            Ok(session.apply_consistency(verdict, events))
        })
        .await
    }

    /// Let the backend open every cell it can prove safe
    pub async fn auto_solve(&self) -> Result<Notice> {
        let (token, permit) = self.begin(|_| Ok(())).await?;
        debug!("Requesting auto-solve for session {}", token);

        let verdict = self.backend.request_auto_solve(token).await;
        self.complete(token, permit, verdict, |session, verdict, events| {
            session.apply_solve(verdict, events)
        })
        .await
    }

    /// Check the local preconditions of a move and mark the session busy.
    ///
    /// The session stays busy until the returned permit is dropped, which
    /// also happens when the caller abandons the move.
    async fn begin(
        &self,
        check: impl FnOnce(&Session) -> std::result::Result<(), BoardError>,
    ) -> Result<(SessionToken, OwnedMutexGuard<()>)> {
        let state = self.state.read().await;
        let session = state.session.as_ref().ok_or(GameError::NoSession)?;

        if session.status != SessionStatus::Active {
            debug!("Session {} is over, refusing move", session.token);
            return Err(GameError::GameOver);
        }
        let Ok(permit) = session.busy.clone().try_lock_owned() else {
            debug!("Session {} is waiting for a verdict, refusing move", session.token);
            return Err(GameError::Busy);
        };
        if let Err(e) = check(session) {
            debug!("Refusing move locally: {}", e);
            return Err(e.into());
        }

        Ok((session.token, permit))
    }

    /// Apply a verdict to the session it was issued for, if that session is still current.
    async fn complete<T, F>(
        &self,
        token: SessionToken,
        permit: OwnedMutexGuard<()>,
        verdict: std::result::Result<T, ClientError>,
        apply: F,
    ) -> Result<Notice>
    where
        F: FnOnce(&mut Session, T, &mut Vec<GameEvent>) -> Result<Notice>,
    {
        let mut events = Vec::new();
        let result = {
            let mut state = self.state.write().await;
            drop(permit);
            match state.session.as_mut() {
                Some(session) if session.token == token => match verdict {
                    Ok(verdict) => apply(session, verdict, &mut events),
                    Err(e) => Err(report(e)),
                },
                _ => {
                    warn!("Discarding verdict for replaced session {}", token);
                    Err(GameError::StaleSession)
                }
            }
        };

        self.publish(events, &result).await;
        result
    }

    async fn publish(&self, events: Vec<GameEvent>, result: &Result<Notice>) {
        let sender = self.event_sender.read().await;
        let Some(sender) = sender.as_ref() else {
            return;
        };
        for event in events {
            let _ = sender.send(event);
        }
        if let Ok(notice) = result {
            let _ = sender.send(GameEvent::Notice(notice.clone()));
        }
    }
}

fn report(e: ClientError) -> GameError {
    if e.is_protocol() {
        warn!("Protocol error from backend: {}", e);
    } else {
        warn!("Backend request failed: {}", e);
    }
    GameError::Client(e)
}
