//! Google Calendar collaborator.
//!
//! Implements the read and write seams over the Calendar v3 API using
//! OAuth2 with keyring-stored tokens. Raw event times are passed through
//! unparsed (`dateTime` or all-day `date`); normalization happens in
//! [`crate::calendar::BusyCalendar`].

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;

use super::keyring_store;
use super::oauth::{self, OAuthConfig};
use super::traits::{CalendarSource, CalendarWriter, CreatedEvent, EventDraft};
use crate::calendar::RawEvent;
use crate::error::OAuthError;

const API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const SERVICE: &str = "google";

/// Google Calendar client for busy-period reads and event inserts.
pub struct GoogleCalendar {
    client_id: String,
    client_secret: String,
}

impl GoogleCalendar {
    /// Load OAuth client credentials from the keyring. Empty strings mean
    /// credentials have not been configured yet.
    pub fn new() -> Self {
        let client_id = keyring_store::get("google_client_id")
            .ok()
            .flatten()
            .unwrap_or_default();
        let client_secret = keyring_store::get("google_client_secret")
            .ok()
            .flatten()
            .unwrap_or_default();

        Self {
            client_id,
            client_secret,
        }
    }

    /// Persist OAuth client credentials to the OS keyring.
    pub fn set_credentials(
        client_id: &str,
        client_secret: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        keyring_store::set("google_client_id", client_id)?;
        keyring_store::set("google_client_secret", client_secret)?;
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        oauth::load_tokens(SERVICE).is_some()
    }

    /// Run the browser OAuth flow and store the resulting tokens.
    pub fn authenticate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(Box::new(OAuthError::CredentialsNotConfigured {
                service: SERVICE.to_string(),
            }));
        }
        let config = self.oauth_config();
        super::block_on(oauth::authorize(&config))??;
        Ok(())
    }

    /// Remove stored tokens.
    pub fn disconnect(&self) -> Result<(), Box<dyn std::error::Error>> {
        oauth::clear_tokens(SERVICE)?;
        Ok(())
    }

    fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig {
            service_name: SERVICE.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar".to_string()],
            redirect_port: 19824,
        }
    }

    /// Return a valid access token, refreshing if expired.
    fn access_token(&self) -> Result<String, Box<dyn std::error::Error>> {
        let tokens = oauth::load_tokens(SERVICE).ok_or(OAuthError::NotAuthenticated {
            service: SERVICE.to_string(),
        })?;

        if !tokens.is_expired() {
            return Ok(tokens.access_token);
        }

        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or(OAuthError::TokenExpired)?;

        let config = self.oauth_config();
        let refreshed = super::block_on(oauth::refresh(&config, refresh_token))??;
        Ok(refreshed.access_token)
    }
}

impl Default for GoogleCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarSource for GoogleCalendar {
    fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, Box<dyn std::error::Error>> {
        let token = self.access_token()?;
        let url = format!(
            "{API_BASE}/calendars/{}/events?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime",
            urlencoding::encode(calendar_id),
            urlencoding::encode(&time_min.to_rfc3339()),
            urlencoding::encode(&time_max.to_rfc3339()),
        );

        let resp: serde_json::Value = super::block_on(async {
            Client::new()
                .get(&url)
                .bearer_auth(&token)
                .send()
                .await?
                .json()
                .await
        })??;

        if let Some(err) = resp.get("error") {
            return Err(format!("Google Calendar API error: {err}").into());
        }

        let items = resp["items"].as_array().cloned().unwrap_or_default();
        let events = items
            .iter()
            .map(|item| RawEvent {
                start: event_time(item, "start"),
                end: event_time(item, "end"),
            })
            .collect();

        Ok(events)
    }
}

impl CalendarWriter for GoogleCalendar {
    fn insert_event(
        &self,
        calendar_id: &str,
        draft: &EventDraft,
    ) -> Result<CreatedEvent, Box<dyn std::error::Error>> {
        let token = self.access_token()?;
        let url = format!(
            "{API_BASE}/calendars/{}/events",
            urlencoding::encode(calendar_id)
        );
        let body = insert_payload(draft);

        let resp: serde_json::Value = super::block_on(async {
            Client::new()
                .post(&url)
                .bearer_auth(&token)
                .json(&body)
                .send()
                .await?
                .json()
                .await
        })??;

        if let Some(err) = resp.get("error") {
            return Err(format!("Google Calendar API error: {err}").into());
        }

        let id = resp["id"]
            .as_str()
            .ok_or("missing event id in response")?
            .to_string();
        let html_link = resp["htmlLink"].as_str().map(String::from);

        Ok(CreatedEvent { id, html_link })
    }
}

/// `start.dateTime` with an all-day `start.date` fallback, unparsed.
fn event_time(item: &serde_json::Value, field: &str) -> Option<String> {
    item[field]["dateTime"]
        .as_str()
        .or_else(|| item[field]["date"].as_str())
        .map(String::from)
}

fn insert_payload(draft: &EventDraft) -> serde_json::Value {
    json!({
        "summary": draft.summary,
        "description": draft.description,
        "start": {
            "dateTime": draft.start.to_rfc3339(),
            "timeZone": draft.time_zone,
        },
        "end": {
            "dateTime": draft.end.to_rfc3339(),
            "timeZone": draft.time_zone,
        },
        "reminders": {
            "useDefault": false,
            "overrides": [
                { "method": "email", "minutes": 60 },
                { "method": "popup", "minutes": 15 },
            ],
        },
    })
}
