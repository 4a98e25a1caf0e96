//! Bearer-token acquisition for both services.
//!
//! [`StaticToken`] hands out a token supplied up front. [`AuthorizationCodeFlow`]
//! runs the OAuth authorization-code grant: it prints the consent URL, waits for
//! the browser to hit the loopback redirect, then trades the code for a token.

use crate::domain::ports::Authenticator;
use crate::utils::error::{Result, Service, TransferError};
use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use rand::Rng;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use url::Url;

const STATE_LENGTH: usize = 32;

const CALLBACK_PAGE: &str = "<html><body><h3>Authentication complete.</h3>\
<p>You can close this window and return to the terminal.</p></body></html>";

#[derive(Debug, Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl Authenticator for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AuthorizationCodeFlow {
    service: Service,
    client_id: String,
    client_secret: String,
    authorize_url: String,
    token_url: String,
    redirect_uri: String,
    scopes: Vec<String>,
    http: Client,
}

impl AuthorizationCodeFlow {
    pub fn new(
        service: Service,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorize_url: impl Into<String>,
        token_url: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            service,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: authorize_url.into(),
            token_url: token_url.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            http: Client::new(),
        }
    }

    pub fn with_scopes<I, T>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Consent page the user has to open in a browser.
    pub fn consent_url(&self, state: &str) -> Result<Url> {
        let mut url = Url::parse(&self.authorize_url).map_err(|e| TransferError::InvalidConfigValue {
            field: format!("{} authorize url", self.service),
            value: self.authorize_url.clone(),
            reason: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("state", state);
            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scopes.join(" "));
            }
        }

        Ok(url)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        tracing::debug!("Exchanging authorization code at {}", self.token_url);

        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransferError::Authentication {
                service: self.service,
                message: format!("token endpoint returned {}: {}", status, body),
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    async fn wait_for_code(&self, state: &str) -> Result<String> {
        let redirect = Url::parse(&self.redirect_uri).map_err(|e| TransferError::InvalidConfigValue {
            field: format!("{} redirect uri", self.service),
            value: self.redirect_uri.clone(),
            reason: e.to_string(),
        })?;
        let port = redirect
            .port_or_known_default()
            .ok_or_else(|| TransferError::config("redirect uri has no port"))?;
        let host = match redirect.host_str() {
            Some("localhost") | None => "127.0.0.1",
            Some(other) => other.trim_start_matches('[').trim_end_matches(']'),
        };

        let listener = TcpListener::bind((host, port)).await?;
        tracing::debug!("Waiting for {} redirect on {}:{}", self.service, host, port);

        let (sender, receiver) = oneshot::channel();
        let callback = CallbackState {
            service: self.service,
            expected_state: state.to_string(),
            sender: Arc::new(Mutex::new(Some(sender))),
        };
        let app = Router::new()
            .route(redirect.path(), get(handle_callback))
            .with_state(callback);

        let received = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&received);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                if let Ok(outcome) = receiver.await {
                    *slot.lock().await = Some(outcome);
                }
            })
            .await?;

        let outcome = received.lock().await.take();
        outcome.unwrap_or_else(|| {
            Err(TransferError::Authentication {
                service: self.service,
                message: "redirect listener stopped before a code arrived".to_string(),
            })
        })
    }
}

#[derive(Clone)]
struct CallbackState {
    service: Service,
    expected_state: String,
    sender: Arc<Mutex<Option<oneshot::Sender<Result<String>>>>>,
}

async fn handle_callback(
    State(callback): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    // favicon 之類沒有 code 的請求直接忽略
    if !params.contains_key("code") && !params.contains_key("error") {
        return (StatusCode::NOT_FOUND, Html(String::new()));
    }

    let outcome = parse_callback(callback.service, &params, &callback.expected_state);
    let page = match &outcome {
        Ok(_) => CALLBACK_PAGE.to_string(),
        Err(e) => format!("<html><body><h3>Authentication failed</h3><p>{}</p></body></html>", e),
    };

    if let Some(sender) = callback.sender.lock().await.take() {
        let _ = sender.send(outcome);
    }
    (StatusCode::OK, Html(page))
}

#[async_trait]
impl Authenticator for AuthorizationCodeFlow {
    async fn access_token(&self) -> Result<String> {
        let state = new_state();
        let url = self.consent_url(&state)?;

        tracing::info!("🔑 Authenticating with {}...", self.service);
        println!("Open this URL in your browser to authorize {}:\n\n  {}\n", self.service, url);

        let code = self.wait_for_code(&state).await?;
        let token = self.exchange_code(&code).await?;
        if let Some(seconds) = token.expires_in {
            tracing::debug!("{} token valid for {}s", self.service, seconds);
        }

        tracing::info!("✅ {} authentication successful.", self.service);
        Ok(token.access_token)
    }
}

/// Random alphanumeric `state` for CSRF protection.
fn new_state() -> String {
    rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Pull the authorization code out of the redirect's query parameters.
pub fn parse_callback(
    service: Service,
    params: &HashMap<String, String>,
    expected_state: &str,
) -> Result<String> {
    if let Some(error) = params.get("error") {
        return Err(TransferError::Authentication {
            service,
            message: format!("authorization denied: {}", error),
        });
    }

    if params.get("state").map(String::as_str) != Some(expected_state) {
        return Err(TransferError::Authentication {
            service,
            message: "state mismatch in redirect".to_string(),
        });
    }

    params
        .get("code")
        .filter(|code| !code.is_empty())
        .cloned()
        .ok_or_else(|| TransferError::Authentication {
            service,
            message: "redirect carried no authorization code".to_string(),
        })
}
