//! OAuth2 Authorization Code flow for the calendar collaborator.
//!
//! Opens the browser to the consent page, receives the redirect on a tiny
//! localhost listener, exchanges the code, and persists tokens in the OS
//! keyring under the service name. Process-wide credential state lives
//! entirely here; the scheduling core never touches it.

use std::io::{Read, Write};
use std::net::TcpListener;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::keyring_store;
use crate::error::OAuthError;

/// Seconds of slack before the recorded expiry at which a token is already
/// treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp of expiry, when the provider reported one.
    pub expires_at: Option<i64>,
    pub token_type: String,
}

impl OAuthTokens {
    /// Whether the access token is past (or within the margin of) expiry.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => chrono::Utc::now().timestamp() > exp - EXPIRY_MARGIN_SECS,
            None => false,
        }
    }

    fn from_token_response(body: &serde_json::Value, fallback_refresh: Option<&str>) -> Self {
        let expires_at = body
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .map(|secs| chrono::Utc::now().timestamp() + secs);
        Self {
            access_token: body["access_token"].as_str().unwrap_or_default().to_string(),
            refresh_token: body
                .get("refresh_token")
                .and_then(|v| v.as_str())
                .map(String::from)
                .or_else(|| fallback_refresh.map(String::from)),
            expires_at,
            token_type: body["token_type"].as_str().unwrap_or("Bearer").to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub service_name: String,
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
    pub redirect_port: u16,
}

impl OAuthConfig {
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    pub fn consent_url(&self) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri()),
            urlencoding::encode(&scopes),
        )
    }
}

/// Run the full flow: open browser, wait for the callback, exchange the
/// code, persist the tokens.
pub async fn authorize(config: &OAuthConfig) -> Result<OAuthTokens, OAuthError> {
    open::that(config.consent_url())
        .map_err(|e| OAuthError::AuthorizationFailed(e.to_string()))?;

    let code = wait_for_callback(config.redirect_port)?;
    let tokens = exchange_code(config, &code).await?;
    store_tokens(&config.service_name, &tokens)?;
    Ok(tokens)
}

/// Block on the localhost listener until the provider redirects back, and
/// pull the authorization code out of the request line.
fn wait_for_callback(port: u16) -> Result<String, OAuthError> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    let (mut stream, _) = listener.accept()?;

    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf)?;
    let request = String::from_utf8_lossy(&buf[..n]).to_string();

    let code = extract_code(&request)
        .ok_or_else(|| OAuthError::InvalidCallback("no code parameter".to_string()))?;

    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
        <html><body><h2>Authentication successful.</h2>\
        <p>You can close this tab and return to the terminal.</p></body></html>";
    stream.write_all(response.as_bytes())?;

    Ok(code)
}

/// Pull `code` from `GET /callback?code=...&scope=... HTTP/1.1`.
fn extract_code(request: &str) -> Option<String> {
    let path = request.lines().next()?.split_whitespace().nth(1)?;
    let query = path.split_once('?')?.1;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("code="))
        .map(|v| urlencoding::decode(v).map(|s| s.into_owned()).unwrap_or_else(|_| v.to_string()))
}

async fn exchange_code(config: &OAuthConfig, code: &str) -> Result<OAuthTokens, OAuthError> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("grant_type", "authorization_code"),
        ("redirect_uri", &config.redirect_uri()),
    ];

    let body: serde_json::Value = Client::new()
        .post(&config.token_url)
        .form(&params)
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = body.get("error") {
        return Err(OAuthError::TokenExchangeFailed(error.to_string()));
    }

    Ok(OAuthTokens::from_token_response(&body, None))
}

/// Trade a refresh token for a fresh access token and persist the result.
pub async fn refresh(config: &OAuthConfig, refresh_token: &str) -> Result<OAuthTokens, OAuthError> {
    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];

    let body: serde_json::Value = Client::new()
        .post(&config.token_url)
        .form(&params)
        .send()
        .await?
        .json()
        .await?;

    if let Some(error) = body.get("error") {
        return Err(OAuthError::TokenRefreshFailed(error.to_string()));
    }

    let tokens = OAuthTokens::from_token_response(&body, Some(refresh_token));
    store_tokens(&config.service_name, &tokens)?;
    Ok(tokens)
}

/// Load stored tokens, if the user has authenticated before.
pub fn load_tokens(service_name: &str) -> Option<OAuthTokens> {
    keyring_store::get(service_name)
        .ok()
        .flatten()
        .and_then(|json| serde_json::from_str(&json).ok())
}

fn store_tokens(service_name: &str, tokens: &OAuthTokens) -> Result<(), OAuthError> {
    let json = serde_json::to_string(tokens)
        .map_err(|e| OAuthError::Keyring(e.to_string()))?;
    keyring_store::set(service_name, &json).map_err(|e| OAuthError::Keyring(e.to_string()))
}

/// Drop stored tokens for the service.
pub fn clear_tokens(service_name: &str) -> Result<(), OAuthError> {
    keyring_store::delete(service_name).map_err(|e| OAuthError::Keyring(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_code_from_callback_request() {
        let request = "GET /callback?code=4%2FabcDEF&scope=calendar HTTP/1.1\r\nHost: localhost\r\n\r\n";
        assert_eq!(extract_code(request).as_deref(), Some("4/abcDEF"));
    }

    #[test]
    fn extract_code_missing_parameter() {
        let request = "GET /callback?error=access_denied HTTP/1.1\r\n\r\n";
        assert_eq!(extract_code(request), None);
    }

    #[test]
    fn tokens_without_expiry_never_expire() {
        let tokens = OAuthTokens {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at: None,
            token_type: "Bearer".to_string(),
        };
        assert!(!tokens.is_expired());
    }

    #[test]
    fn tokens_past_expiry_are_expired() {
        let tokens = OAuthTokens {
            access_token: "tok".to_string(),
            refresh_token: None,
            expires_at: Some(chrono::Utc::now().timestamp() - 10),
            token_type: "Bearer".to_string(),
        };
        assert!(tokens.is_expired());
    }

    #[test]
    fn consent_url_encodes_scopes() {
        let config = OAuthConfig {
            service_name: "google".to_string(),
            client_id: "id with space".to_string(),
            client_secret: "secret".to_string(),
            auth_url: "https://example.com/auth".to_string(),
            token_url: "https://example.com/token".to_string(),
            scopes: vec!["a b".to_string()],
            redirect_port: 9999,
        };
        let url = config.consent_url();
        assert!(url.starts_with("https://example.com/auth?client_id=id%20with%20space"));
        assert!(url.contains("scope=a%20b"));
    }
}
