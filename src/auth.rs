//! GitHub OAuth device flow.

use std::time::{Duration, Instant};

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{KanbanError, Result};

const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";
const TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Read/write access to issues, labels and milestones.
pub const SCOPE: &str = "repo";

/// Added to the poll interval each time GitHub answers `slow_down`.
const SLOW_DOWN_STEP: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum TokenPoll {
    Granted(String),
    Pending,
    SlowDown,
}

impl TokenResponse {
    pub fn into_poll(self) -> Result<TokenPoll> {
        if let Some(token) = self.access_token {
            return Ok(TokenPoll::Granted(token));
        }

        match self.error.as_deref() {
            Some("authorization_pending") => Ok(TokenPoll::Pending),
            Some("slow_down") => Ok(TokenPoll::SlowDown),
            Some(err) => Err(KanbanError::Auth(
                self.error_description.unwrap_or_else(|| err.to_string()),
            )),
            None => Err(KanbanError::Auth("unexpected response from GitHub".to_string())),
        }
    }
}

pub async fn request_device_code(http: &Client, client_id: &str) -> Result<DeviceCode> {
    let response = http
        .post(DEVICE_CODE_URL)
        .header(ACCEPT, "application/json")
        .form(&[("client_id", client_id), ("scope", SCOPE)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(KanbanError::Auth(format!(
            "GitHub rejected the OAuth client ID (status {}). Device flow must be enabled for the app",
            response.status().as_u16()
        )));
    }

    Ok(response.json().await?)
}

pub async fn poll_token(http: &Client, client_id: &str, device_code: &str) -> Result<TokenPoll> {
    let response: TokenResponse = http
        .post(TOKEN_URL)
        .header(ACCEPT, "application/json")
        .form(&[
            ("client_id", client_id),
            ("device_code", device_code),
            ("grant_type", DEVICE_GRANT_TYPE),
        ])
        .send()
        .await?
        .json()
        .await?;

    response.into_poll()
}

/// Poll until the user approves the device code, it expires, or GitHub refuses.
pub async fn wait_for_token(http: &Client, client_id: &str, code: &DeviceCode) -> Result<String> {
    let deadline = Instant::now() + Duration::from_secs(code.expires_in);
    let mut interval = Duration::from_secs(code.interval.max(1));

    loop {
        tokio::time::sleep(interval).await;
        if Instant::now() >= deadline {
            return Err(KanbanError::Auth("device code expired, run login again".to_string()));
        }

        match poll_token(http, client_id, &code.device_code).await? {
            TokenPoll::Granted(token) => return Ok(token),
            TokenPoll::Pending => tracing::debug!("authorization pending"),
            TokenPoll::SlowDown => {
                interval += SLOW_DOWN_STEP;
                tracing::debug!(interval_secs = interval.as_secs(), "GitHub asked to slow down");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(token: Option<&str>, error: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: token.map(String::from),
            error: error.map(String::from),
            error_description: None,
        }
    }

    #[test]
    fn test_token_granted() {
        assert_eq!(
            response(Some("gho_abc"), None).into_poll().unwrap(),
            TokenPoll::Granted("gho_abc".to_string())
        );
    }

    #[test]
    fn test_pending_and_slow_down() {
        assert_eq!(
            response(None, Some("authorization_pending")).into_poll().unwrap(),
            TokenPoll::Pending
        );
        assert_eq!(
            response(None, Some("slow_down")).into_poll().unwrap(),
            TokenPoll::SlowDown
        );
    }

    #[test]
    fn test_denied_is_error() {
        let denied = TokenResponse {
            access_token: None,
            error: Some("access_denied".to_string()),
            error_description: Some("The user has denied your application access.".to_string()),
        };
        let err = denied.into_poll().unwrap_err();
        assert!(err.to_string().contains("denied your application"));
    }

    #[test]
    fn test_empty_response_is_error() {
        assert!(matches!(
            response(None, None).into_poll(),
            Err(KanbanError::Auth(_))
        ));
    }

    #[test]
    fn test_device_code_parses() {
        let code: DeviceCode = serde_json::from_str(
            r#"{"device_code":"3584d83","user_code":"WDJB-MJHT","verification_uri":"https://github.com/login/device","expires_in":900,"interval":5}"#,
        )
        .unwrap();
        assert_eq!(code.user_code, "WDJB-MJHT");
        assert_eq!(code.interval, 5);
    }
}
