//! Scripted backend for driving `LogicGame` without a network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use logicsweeper_client::{
    Backend, ClientConfig, ClientError, ConsistencyVerdict, Difficulty, FlagVerdict, HintVerdict,
    LogicGame, Pos, RevealVerdict, RevealedCell, SessionStart, SessionToken, SolveVerdict,
};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum Reply {
    Start(Result<SessionStart, ClientError>),
    Reveal(Result<RevealVerdict, ClientError>),
    Flag(Result<FlagVerdict, ClientError>),
    Hint(Result<HintVerdict, ClientError>),
    Check(Result<ConsistencyVerdict, ClientError>),
    Solve(Result<SolveVerdict, ClientError>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(SessionToken, Difficulty),
    Reveal(SessionToken, Pos),
    Flag(SessionToken, Pos),
    Hint(SessionToken),
    Check(SessionToken),
    Solve(SessionToken),
}

struct Step {
    reply: Reply,
    entered: Option<oneshot::Sender<()>>,
    release: Option<oneshot::Receiver<()>>,
}

/// Held by a test to observe a gated call and let it finish.
pub struct Gate {
    pub entered: oneshot::Receiver<()>,
    pub release: oneshot::Sender<()>,
}

/// Answers calls from a queue of replies, in order, recording every call.
#[derive(Default)]
pub struct ScriptedBackend {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) {
        self.steps.lock().unwrap().push_back(Step {
            reply,
            entered: None,
            release: None,
        });
    }

    /// Queue a reply that is held back until the returned gate is released.
    pub fn push_gated(&self, reply: Reply) -> Gate {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.steps.lock().unwrap().push_back(Step {
            reply,
            entered: Some(entered_tx),
            release: Some(release_rx),
        });
        Gate {
            entered: entered_rx,
            release: release_tx,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn pending(&self) -> usize {
        self.steps.lock().unwrap().len()
    }

    fn take(&self, call: Call) -> Step {
        self.calls.lock().unwrap().push(call.clone());
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply for {call:?}"))
    }

    async fn next(&self, call: Call) -> Reply {
        let step = self.take(call);
        if let Some(entered) = step.entered {
            let _ = entered.send(());
        }
        if let Some(release) = step.release {
            let _ = release.await;
        }
        step.reply
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn start_session(
        &self,
        token: SessionToken,
        difficulty: Difficulty,
    ) -> Result<SessionStart, ClientError> {
        match self.next(Call::Start(token, difficulty)).await {
            Reply::Start(reply) => reply,
            other => panic!("expected a start reply, got {other:?}"),
        }
    }

    async fn request_reveal(
        &self,
        token: SessionToken,
        pos: Pos,
    ) -> Result<RevealVerdict, ClientError> {
        match self.next(Call::Reveal(token, pos)).await {
            Reply::Reveal(reply) => reply,
            other => panic!("expected a reveal reply, got {other:?}"),
        }
    }

    async fn request_flag_toggle(
        &self,
        token: SessionToken,
        pos: Pos,
    ) -> Result<FlagVerdict, ClientError> {
        match self.next(Call::Flag(token, pos)).await {
            Reply::Flag(reply) => reply,
            other => panic!("expected a flag reply, got {other:?}"),
        }
    }

    async fn request_hint(&self, token: SessionToken) -> Result<HintVerdict, ClientError> {
        match self.next(Call::Hint(token)).await {
            Reply::Hint(reply) => reply,
            other => panic!("expected a hint reply, got {other:?}"),
        }
    }

    async fn request_consistency_check(
        &self,
        token: SessionToken,
    ) -> Result<ConsistencyVerdict, ClientError> {
        match self.next(Call::Check(token)).await {
            Reply::Check(reply) => reply,
            other => panic!("expected a consistency reply, got {other:?}"),
        }
    }

    async fn request_auto_solve(&self, token: SessionToken) -> Result<SolveVerdict, ClientError> {
        match self.next(Call::Solve(token)).await {
            Reply::Solve(reply) => reply,
            other => panic!("expected a solve reply, got {other:?}"),
        }
    }
}

pub fn start(rows: usize, cols: usize, mines_total: usize, revealed: Vec<RevealedCell>) -> Reply {
    Reply::Start(Ok(SessionStart {
        rows,
        cols,
        mines_total,
        revealed,
    }))
}

pub fn safe(clue: u8) -> Reply {
    Reply::Reveal(Ok(RevealVerdict::Safe { clue, outcome: None }))
}

pub fn cell(r: usize, c: usize, clue: u8) -> RevealedCell {
    RevealedCell { r, c, clue }
}

pub fn game() -> LogicGame<ScriptedBackend> {
    LogicGame::with_backend(ScriptedBackend::new(), ClientConfig::default())
}

/// A game with a started 9x9 easy session and nothing open.
pub async fn started_game() -> LogicGame<ScriptedBackend> {
    let game = game();
    game.backend().push(start(9, 9, 10, vec![]));
    game.new_session(Difficulty::Easy)
        .await
        .expect("scripted session start");
    game
}
