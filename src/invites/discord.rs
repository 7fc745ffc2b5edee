//! Discord REST invite provider.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::provider::{InviteProvider, InviteRequest, ProviderFailure};

const INVITE_BASE: &str = "https://discord.gg/";
const AUDIT_LOG_REASON: &str = "X-Audit-Log-Reason";

/// Creates channel invites through `POST /channels/{id}/invites`.
#[derive(Debug, Clone)]
pub struct DiscordProvider {
    client: Client,
    api_base: Url,
}

#[derive(Serialize)]
struct CreateInviteBody {
    max_age: u32,
    max_uses: u32,
    temporary: bool,
    unique: bool,
}

#[derive(Deserialize)]
struct InviteResponse {
    code: String,
}

#[derive(Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    retry_after: Option<f64>,
}

impl DiscordProvider {
    /// Build a client authenticated with the bot token.
    ///
    /// # Errors
    /// Returns error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(api_base: Url, token: &str) -> anyhow::Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bot {token}"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("modmail-invites/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, api_base })
    }

    fn invites_url(&self, channel_id: u64) -> Result<Url, ProviderFailure> {
        self.api_base
            .join(&format!("channels/{channel_id}/invites"))
            .map_err(|e| ProviderFailure::new(0, format!("invalid API URL: {e}")))
    }
}

#[async_trait]
impl InviteProvider for DiscordProvider {
    async fn create_invite(
        &self,
        channel_id: u64,
        request: &InviteRequest,
    ) -> Result<String, ProviderFailure> {
        let body = CreateInviteBody {
            max_age: request.max_age,
            max_uses: request.max_uses,
            temporary: request.temporary,
            unique: request.unique,
        };

        let mut call = self.client.post(self.invites_url(channel_id)?).json(&body);
        // Non-ASCII reasons are simply not attached.
        if let Ok(reason) = HeaderValue::from_str(&request.reason) {
            call = call.header(AUDIT_LOG_REASON, reason);
        }

        let response = call
            .send()
            .await
            .map_err(|e| ProviderFailure::new(0, e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let invite: InviteResponse = response
                .json()
                .await
                .map_err(|e| ProviderFailure::new(status.as_u16(), e.to_string()))?;
            debug!("Discord created invite {} on channel {}", invite.code, channel_id);
            return Ok(format!("{INVITE_BASE}{}", invite.code));
        }

        let header_retry = retry_after_header(response.headers());
        let error: ErrorResponse = response.json().await.unwrap_or_default();

        let message = if error.message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            error.message
        };

        let mut failure = ProviderFailure::new(status.as_u16(), message);
        if status == StatusCode::TOO_MANY_REQUESTS
            && let Some(secs) = error.retry_after.or(header_retry)
        {
            failure = failure.with_retry_after(secs);
        }
        Err(failure)
    }
}

fn retry_after_header(headers: &HeaderMap) -> Option<f64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
