//! Typed HTTP client for the Kickoff API.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types do not pull in `reqwest`.

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::objects::ApiEnvelope;
use crate::objects::auth::{LoginRequest, LoginResponse, UserResponse};
use crate::objects::market::{
    BuyPlayerRequest, BuyPlayerResponse, MarketListing, MarketQuery, Page, TeamPlayerResponse,
    ToggleSaleRequest,
};
use crate::objects::team::{TeamStatusResponse, UserTeamResponse};

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned a non-2xx status code.
    #[error("api error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// An authenticated endpoint was called before logging in.
    #[error("not logged in")]
    MissingToken,
}

/// Client for every endpoint under `/api`.
///
/// [`login`](Self::login) stores the returned session token, which is then
/// sent as a bearer token on every authenticated call.
#[derive(Debug, Clone)]
pub struct KickoffClient {
    http: Client,
    base_url: Url,
    token: Option<String>,
}

impl KickoffClient {
    /// Create a new client for the server rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: None,
        }
    }

    /// Replace the default `reqwest::Client` (e.g. to configure timeouts).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Use an already issued session token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The session token currently in use, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// `POST /api/auth/login` – log in or register, keeping the token.
    pub async fn login(
        &mut self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<LoginResponse, ClientError> {
        let body = LoginRequest {
            email: email.into(),
            password: password.into(),
        };
        let url = self.base_url.join("/api/auth/login")?;
        let response: LoginResponse = send(self.http.post(url).json(&body)).await?;
        self.token = Some(response.token.clone());
        Ok(response)
    }

    /// `GET /api/auth/me`.
    pub async fn profile(&self) -> Result<UserResponse, ClientError> {
        let url = self.base_url.join("/api/auth/me")?;
        send(self.authorized(self.http.get(url))?).await
    }

    /// `GET /api/team/status`.
    pub async fn team_status(&self) -> Result<TeamStatusResponse, ClientError> {
        let url = self.base_url.join("/api/team/status")?;
        send(self.authorized(self.http.get(url))?).await
    }

    /// `GET /api/team`.
    pub async fn team(&self) -> Result<UserTeamResponse, ClientError> {
        let url = self.base_url.join("/api/team")?;
        send(self.authorized(self.http.get(url))?).await
    }

    /// `GET /api/transfer/sell` – the caller's own roster links.
    pub async fn players_for_sale(&self) -> Result<Vec<TeamPlayerResponse>, ClientError> {
        let url = self.base_url.join("/api/transfer/sell")?;
        send(self.authorized(self.http.get(url))?).await
    }

    /// `POST /api/transfer/sell` – list or unlist a player.
    pub async fn toggle_sale(
        &self,
        request: &ToggleSaleRequest,
    ) -> Result<TeamPlayerResponse, ClientError> {
        let url = self.base_url.join("/api/transfer/sell")?;
        send(self.authorized(self.http.post(url).json(request))?).await
    }

    /// `POST /api/transfer/buy`.
    pub async fn buy_player(&self, team_player_id: i64) -> Result<BuyPlayerResponse, ClientError> {
        let url = self.base_url.join("/api/transfer/buy")?;
        let body = BuyPlayerRequest { team_player_id };
        send(self.authorized(self.http.post(url).json(&body))?).await
    }

    /// `GET /api/transfer/market`.
    pub async fn market(&self, query: &MarketQuery) -> Result<Page<MarketListing>, ClientError> {
        let url = self.base_url.join("/api/transfer/market")?;
        send(self.authorized(self.http.get(url).query(query))?).await
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let resp = request.send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    let bytes = resp.bytes().await?;
    let envelope: ApiEnvelope<T> = serde_json::from_slice(&bytes)?;
    Ok(envelope.data)
}
