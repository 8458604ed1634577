use reqwest::StatusCode;
use thiserror::Error;

/// Message shown in place of a screen whose data could not be loaded.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load weather data. Please try again later.";

/// Failure of a request to one of the remote APIs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{what} request failed: {source}")]
    Request {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{what} request failed with status {status}: {body}")]
    Status {
        what: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse {what} JSON: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub(crate) fn request(what: &'static str, source: reqwest::Error) -> Self {
        Self::Request { what, source }
    }

    pub(crate) fn status(what: &'static str, status: StatusCode, body: &str) -> Self {
        Self::Status {
            what,
            status,
            body: truncate_body(body),
        }
    }

    pub(crate) fn parse(what: &'static str, source: serde_json::Error) -> Self {
        Self::Parse { what, source }
    }

    /// User-facing text; detail is only logged.
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILED_MESSAGE
    }
}

/// Send a GET built by the caller, check the status and decode the JSON body.
pub(crate) async fn fetch_json<T: serde::de::DeserializeOwned>(
    what: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, FetchError> {
    let res = request
        .send()
        .await
        .map_err(|e| FetchError::request(what, e))?;

    let status = res.status();
    let body = res.text().await.map_err(|e| FetchError::request(what, e))?;

    if !status.is_success() {
        return Err(FetchError::status(what, status, &body));
    }

    serde_json::from_str(&body).map_err(|e| FetchError::parse(what, e))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
