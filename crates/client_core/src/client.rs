use async_trait::async_trait;
use reqwest::Client;
use shared::protocol::{ErrorBody, RsvpAccepted, RsvpRequest, RSVP_ROUTE};
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

pub const API_URL_ENV: &str = "RSVP_API_URL";
pub const DEFAULT_API_BASE_URL: &str = "https://anecdote-rsvp-backend-production.up.railway.app";

pub const GENERIC_SUBMISSION_ERROR: &str =
    "An error occurred while submitting your RSVP. Please try again.";
const DEFAULT_REJECTION: &str = "Failed to submit RSVP";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to reach RSVP service: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        details: Option<String>,
    },
    #[error("invalid RSVP service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Text for the dismissible banner above the form.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Rejected { message, .. } => message.clone(),
            ClientError::Transport(_) | ClientError::InvalidUrl(_) => {
                GENERIC_SUBMISSION_ERROR.to_string()
            }
        }
    }
}

#[async_trait]
pub trait RsvpTransport: Send + Sync {
    async fn submit_rsvp(&self, request: &RsvpRequest) -> Result<RsvpAccepted, ClientError>;
}

/// Picks the relay base URL: a valid override wins, otherwise the
/// production deployment.
pub fn resolve_base_url(override_url: Option<&str>) -> Url {
    let fallback = || parse_base_url(DEFAULT_API_BASE_URL).expect("default base url is valid");

    match override_url.map(str::trim).filter(|raw| !raw.is_empty()) {
        Some(raw) => parse_base_url(raw).unwrap_or_else(|error| {
            warn!(url = %raw, %error, "ignoring invalid RSVP API url");
            fallback()
        }),
        None => fallback(),
    }
}

pub fn base_url_from_env() -> Url {
    resolve_base_url(std::env::var(API_URL_ENV).ok().as_deref())
}

fn parse_base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut raw = raw.to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    let url = Url::parse(&raw)?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(url::ParseError::RelativeUrlWithCannotBeABaseBase);
    }
    Ok(url)
}

#[derive(Clone)]
pub struct RsvpClient {
    http: Client,
    base_url: Url,
}

impl RsvpClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn from_env() -> Self {
        Self::new(base_url_from_env())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl RsvpTransport for RsvpClient {
    async fn submit_rsvp(&self, request: &RsvpRequest) -> Result<RsvpAccepted, ClientError> {
        let url = self.base_url.join(RSVP_ROUTE.trim_start_matches('/'))?;
        let response = self.http.post(url).json(request).send().await?;
        let status = response.status();

        if status.is_success() {
            let accepted: RsvpAccepted = response.json().await?;
            info!(day = %request.day, guests = request.form_data.len(), "RSVP accepted");
            return Ok(accepted);
        }

        let body = response.json::<ErrorBody>().await.ok();
        let (message, details) = match body {
            Some(body) => (body.error, body.details),
            None => (DEFAULT_REJECTION.to_string(), None),
        };
        warn!(status = status.as_u16(), %message, "RSVP rejected");
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
            details,
        })
    }
}
