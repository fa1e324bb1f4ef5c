//! BMC web API payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::FanMode;

/// `GET /api/randomtag`
#[derive(Debug, Deserialize)]
pub struct RandomTagResponse {
    /// Some firmwares send a string, others a number
    #[serde(default)]
    pub random: Option<Value>,
}

impl RandomTagResponse {
    pub fn tag(&self) -> Option<String> {
        match self.random.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// `POST /api/session` body
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(rename = "CSRFToken", default)]
    pub csrf_token: Option<Value>,
}

impl LoginResponse {
    /// Non-empty string token, if present
    pub fn token(&self) -> Option<String> {
        match self.csrf_token.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// `PUT /api/settings/fans-mode`
#[derive(Debug, Serialize)]
pub struct FanModeRequest {
    pub control_mode: FanMode,
}

/// `PUT /api/settings/fan/{index}`
#[derive(Debug, Serialize)]
pub struct FanDutyRequest {
    pub duty: u8,
}

/// Echo of the applied duty
#[derive(Debug, Deserialize)]
pub struct FanDutyResponse {
    pub duty: i64,
}

/// `GET /api/status/fan_info`
#[derive(Debug, Deserialize)]
pub struct FanInfoResponse {
    /// Entry layout is firmware specific and only logged
    #[serde(default)]
    pub fans: Option<Vec<Value>>,
}
