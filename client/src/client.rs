use async_trait::async_trait;
use logicsweeper_common::{
    models::{Difficulty, Pos, SessionToken},
    protocol::{
        CellRequest, ConsistencyResponse, ErrorReply, FlagResponse, GameOverReply, HintResponse,
        NewGameRequest, NewGameResponse, RevealResponse, SESSION_TOKEN_HEADER, SolveResponse,
    },
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::verdict::{
    ConsistencyVerdict, FlagVerdict, HintVerdict, RevealVerdict, SessionStart, SolveVerdict,
};

const NEW_GAME_PATH: &str = "/api/new_game";
const REVEAL_PATH: &str = "/api/click";
const FLAG_PATH: &str = "/api/flag";
const HINT_PATH: &str = "/api/hint";
const CHECK_PATH: &str = "/api/check";
const SOLVE_PATH: &str = "/api/solve";

fn empty_body() -> Value {
    Value::Object(serde_json::Map::new())
}

/// The reasoning backend as seen by the controller: one round trip per action.
///
/// Every call carries the token of the session it was issued for.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn start_session(
        &self,
        token: SessionToken,
        difficulty: Difficulty,
    ) -> Result<SessionStart, ClientError>;

    async fn request_reveal(
        &self,
        token: SessionToken,
        pos: Pos,
    ) -> Result<RevealVerdict, ClientError>;

    async fn request_flag_toggle(
        &self,
        token: SessionToken,
        pos: Pos,
    ) -> Result<FlagVerdict, ClientError>;

    async fn request_hint(&self, token: SessionToken) -> Result<HintVerdict, ClientError>;

    async fn request_consistency_check(
        &self,
        token: SessionToken,
    ) -> Result<ConsistencyVerdict, ClientError>;

    async fn request_auto_solve(&self, token: SessionToken) -> Result<SolveVerdict, ClientError>;
}

/// HTTP client for the reasoning backend's JSON API
pub struct SessionClient {
    client: Client,
    base_url: Url,
}

impl SessionClient {
    /// Create a new client connecting to the specified server URL
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::from_config(&ClientConfig {
            server_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.server_url)?;
        let client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        token: SessionToken,
        body: Value,
    ) -> Result<T, ClientError> {
        let url = self.base_url.join(path)?;

        let response = self
            .client
            .post(url)
            .header(SESSION_TOKEN_HEADER, token.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!("POST {} [session {}] -> {}: {}", path, token, status, text);

        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        // A finished game is reported with an error status but is still a verdict.
        if serde_json::from_str::<GameOverReply>(&text).is_ok() {
            return Ok(serde_json::from_str(&text)?);
        }

        let message = serde_json::from_str::<ErrorReply>(&text)
            .map(|reply| reply.error)
            .unwrap_or(text);
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn cell_body(pos: Pos) -> Result<Value, ClientError> {
        Ok(serde_json::to_value(CellRequest::from(pos))?)
    }
}

#[async_trait]
impl Backend for SessionClient {
    async fn start_session(
        &self,
        token: SessionToken,
        difficulty: Difficulty,
    ) -> Result<SessionStart, ClientError> {
        let body = serde_json::to_value(NewGameRequest { difficulty })?;
        let response: NewGameResponse = self.post(NEW_GAME_PATH, token, body).await?;
        response.try_into()
    }

    async fn request_reveal(
        &self,
        token: SessionToken,
        pos: Pos,
    ) -> Result<RevealVerdict, ClientError> {
        let response: RevealResponse = self.post(REVEAL_PATH, token, Self::cell_body(pos)?).await?;
        RevealVerdict::decode(pos, response)
    }

    async fn request_flag_toggle(
        &self,
        token: SessionToken,
        pos: Pos,
    ) -> Result<FlagVerdict, ClientError> {
        let response: FlagResponse = self.post(FLAG_PATH, token, Self::cell_body(pos)?).await?;
        Ok(response.into())
    }

    async fn request_hint(&self, token: SessionToken) -> Result<HintVerdict, ClientError> {
        let response: HintResponse = self.post(HINT_PATH, token, empty_body()).await?;
        response.try_into()
    }

    async fn request_consistency_check(
        &self,
        token: SessionToken,
    ) -> Result<ConsistencyVerdict, ClientError> {
        let response: ConsistencyResponse = self.post(CHECK_PATH, token, empty_body()).await?;
        Ok(response.into())
    }

    async fn request_auto_solve(&self, token: SessionToken) -> Result<SolveVerdict, ClientError> {
        let response: SolveResponse = self.post(SOLVE_PATH, token, empty_body()).await?;
        response.try_into()
    }
}
