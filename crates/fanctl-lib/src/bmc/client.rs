//! HTTPS session client for the BMC web API
//!
//! Login is a three-step handshake:
//! 1. fetch a per-session random tag,
//! 2. post the credentials together with the tag,
//! 3. lift the session id from `Set-Cookie` and the CSRF token from the body.
//!
//! Every later request carries both. A session never outlives its host.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use url::Url;

use super::types::{
    FanDutyRequest, FanDutyResponse, FanInfoResponse, FanModeRequest, LoginResponse,
    RandomTagResponse,
};
use super::FanController;
use crate::cookie;
use crate::error::{FanError, Result};
use crate::models::{FanMode, HostConfig, MAX_PERCENT};
use crate::settings::ClientSettings;

/// The BMC web UI rejects clients that do not look like a browser
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36 Edg/117.0.2045.60";

/// Credentials negotiated by [`BmcSession::login`]
#[derive(Debug, Clone)]
struct SessionAuth {
    session_id: String,
    csrf_token: String,
}

/// One authenticated conversation with one BMC
pub struct BmcSession {
    client: Client,
    host: String,
    base_url: Url,
    username: String,
    password: String,
    fans_count: u8,
    auth: Option<SessionAuth>,
    headers: HeaderMap,
}

impl BmcSession {
    /// Create an unauthenticated session with its own HTTP client
    pub fn new(config: &HostConfig, settings: &ClientSettings) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .danger_accept_invalid_certs(settings.accept_invalid_certs);

        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            host: config.bmc_host.clone(),
            base_url: config.base_url()?,
            username: config.username.clone(),
            password: config.password.clone(),
            fans_count: config.fan_count(),
            auth: None,
            headers: HeaderMap::new(),
        })
    }

    #[cfg(test)]
    fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    #[cfg(test)]
    fn session_id(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.session_id.as_str())
    }

    #[cfg(test)]
    fn csrf_token(&self) -> Option<&str> {
        self.auth.as_ref().map(|a| a.csrf_token.as_str())
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FanError::Config(format!("invalid BMC path {}: {}", path, e)))
    }

    /// Headers for calls that need an established session
    fn session_headers(&self) -> Result<HeaderMap> {
        if self.auth.is_none() {
            return Err(FanError::Auth(format!("not logged in to {}", self.host)));
        }
        Ok(self.headers.clone())
    }

    /// Fetch the per-session challenge token required by login
    pub async fn fetch_random_tag(&self) -> Result<String> {
        let response = self.client.get(self.url("api/randomtag")?).send().await?;
        let body: RandomTagResponse = json_body(ensure_success(response).await?).await?;

        let tag = body
            .tag()
            .ok_or_else(|| FanError::Protocol("randomtag response has no 'random' field".to_string()))?;

        debug!(bmc = %self.host, "Fetched login random tag");
        Ok(tag)
    }

    /// Perform the login handshake and arm the session headers
    pub async fn login(&mut self) -> Result<()> {
        let tag = self.fetch_random_tag().await?;

        let form = [
            ("encrypt_flag", "0"),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("login_tag", tag.as_str()),
        ];

        let response = self
            .client
            .post(self.url("api/session")?)
            .form(&form)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let session_id = cookie::session_id(response.headers()).ok_or_else(|| {
            FanError::Auth("login response carries no SESSION or QSESSIONID cookie".to_string())
        })?;

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| FanError::Auth(format!("unreadable login response: {}", e)))?;
        let csrf_token = body
            .token()
            .ok_or_else(|| FanError::Auth("login response carries no CSRFToken".to_string()))?;

        let cookie_header = format!("lang=zh-cn;QSESSIONID={}; refresh_disable=1", session_id);

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("x-csrftoken"), header_value(&csrf_token)?);
        headers.insert(COOKIE, header_value(&cookie_header)?);
        self.headers = headers;
        self.auth = Some(SessionAuth {
            session_id,
            csrf_token,
        });

        info!(bmc = %self.host, "Logged in to BMC");
        Ok(())
    }

    /// Switch between manual and BMC-driven fan control
    pub async fn set_fan_mode(&self, mode: FanMode) -> Result<()> {
        let headers = self.session_headers()?;

        let response = self
            .client
            .put(self.url("api/settings/fans-mode")?)
            .headers(headers)
            .json(&FanModeRequest { control_mode: mode })
            .send()
            .await?;
        ensure_success(response).await?;

        info!(bmc = %self.host, mode = %mode, "Fan control mode set");
        Ok(())
    }

    /// Apply `duty` to every fan and return how many accepted it.
    ///
    /// A failing fan is logged and skipped; exactly `fans_count` requests
    /// are issued.
    pub async fn set_fan_speed(&self, duty: u8) -> Result<usize> {
        let headers = self.session_headers()?;
        let duty = duty.min(MAX_PERCENT as u8);
        let mut succeeded = 0;

        for index in 0..self.fans_count {
            match self.put_fan_duty(index, duty, headers.clone()).await {
                Ok(applied) => {
                    info!(bmc = %self.host, fan = index, duty = applied, "Fan duty set");
                    succeeded += 1;
                }
                Err(e) => {
                    error!(bmc = %self.host, fan = index, error = %e, "Failed to set fan duty");
                }
            }
        }

        Ok(succeeded)
    }

    async fn put_fan_duty(&self, index: u8, duty: u8, headers: HeaderMap) -> Result<i64> {
        let response = self
            .client
            .put(self.url(&format!("api/settings/fan/{}", index))?)
            .headers(headers)
            .json(&FanDutyRequest { duty })
            .send()
            .await?;
        let body: FanDutyResponse = json_body(ensure_success(response).await?).await?;
        Ok(body.duty)
    }

    /// Fetch and log the current fan readings.
    ///
    /// Returns `None`, with a warning, when the BMC reports no fan list.
    pub async fn fan_status(&self) -> Result<Option<Vec<Value>>> {
        let headers = self.session_headers()?;

        let response = self
            .client
            .get(self.url("api/status/fan_info")?)
            .headers(headers)
            .send()
            .await?;
        let body: FanInfoResponse = json_body(ensure_success(response).await?).await?;

        match body.fans {
            Some(fans) => {
                info!(bmc = %self.host, fans = fans.len(), "Current fan status");
                for fan in &fans {
                    info!(bmc = %self.host, status = %fan, "Fan");
                }
                Ok(Some(fans))
            }
            None => {
                warn!(bmc = %self.host, "BMC returned no fan information");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl FanController for BmcSession {
    async fn login(&mut self) -> Result<()> {
        BmcSession::login(self).await
    }

    async fn set_fan_mode(&self, mode: FanMode) -> Result<()> {
        BmcSession::set_fan_mode(self, mode).await
    }

    async fn set_fan_speed(&self, duty: u8) -> Result<usize> {
        BmcSession::set_fan_speed(self, duty).await
    }

    async fn fan_status(&self) -> Result<Option<Vec<Value>>> {
        BmcSession::fan_status(self).await
    }
}

async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(FanError::Request { status, body })
}

async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().clone();
    response
        .json()
        .await
        .map_err(|e| FanError::Protocol(format!("unexpected response from {}: {}", url.path(), e)))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| FanError::Auth("session token is not a valid header value".to_string()))
}
