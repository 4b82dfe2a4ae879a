//! Shared HTTP plumbing for the Google REST services.

use cowork_core::error::ServiceError;
use cowork_core::session::SessionContext;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Query string pairs. Keys may repeat.
pub(crate) type Query<'a> = [(&'a str, String)];

/// Parse a configured API base URL.
pub(crate) fn base_url(raw: &str) -> Result<Url, ServiceError> {
    let url = Url::parse(raw)
        .map_err(|e| ServiceError::Network(format!("invalid base URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ServiceError::Network(format!("invalid base URL '{raw}'")));
    }
    Ok(url)
}

/// Append path segments to `base`. Each segment is percent-encoded as a
/// single segment, so ids containing `/`, `?` or `#` cannot change the route.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ServiceError> {
    if let Some(bad) = segments
        .iter()
        .find(|s| s.is_empty() || **s == "." || **s == "..")
    {
        return Err(ServiceError::NotFound(format!("invalid id '{bad}'")));
    }
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ServiceError::Network(format!("invalid base URL '{base}'")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// A downloaded file body, capped at a byte limit.
#[derive(Debug)]
pub(crate) struct Media {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// The body was longer than the limit.
    pub truncated: bool,
}

/// A thin authenticated client for one Google API.
#[derive(Clone)]
pub(crate) struct GoogleApi {
    client: reqwest::Client,
    service: &'static str,
}

impl GoogleApi {
    pub(crate) fn new(service: &'static str, timeout: Duration) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Network(format!("HTTP client: {e}")))?;
        Ok(Self { client, service })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        session: &SessionContext,
        url: Url,
        query: &Query<'_>,
    ) -> Result<T, ServiceError> {
        let response = self.send(self.client.get(url).query(query), session).await?;
        self.parse(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        session: &SessionContext,
        url: Url,
        query: &Query<'_>,
        body: &B,
    ) -> Result<T, ServiceError> {
        let request = self.client.post(url).query(query).json(body);
        let response = self.send(request, session).await?;
        self.parse(response).await
    }

    pub(crate) async fn get_text(
        &self,
        session: &SessionContext,
        url: Url,
        query: &Query<'_>,
    ) -> Result<String, ServiceError> {
        let response = self.send(self.client.get(url).query(query), session).await?;
        response
            .text()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("{}: {e}", self.service)))
    }

    /// Download raw bytes, reading at most `limit` of them.
    pub(crate) async fn get_media(
        &self,
        session: &SessionContext,
        url: Url,
        query: &Query<'_>,
        limit: usize,
    ) -> Result<Media, ServiceError> {
        let mut response = self.send(self.client.get(url).query(query), session).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let mut bytes = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ServiceError::Network(format!("{}: {e}", self.service)))?
        {
            let room = limit - bytes.len();
            if chunk.len() > room {
                bytes.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(Media {
            content_type,
            bytes,
            truncated,
        })
    }

    async fn send(
        &self,
        request: RequestBuilder,
        session: &SessionContext,
    ) -> Result<Response, ServiceError> {
        let response = request
            .header("Authorization", session.bearer())
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("{}: {e}", self.service)))?;

        let status = response.status().as_u16();
        debug!(service = self.service, status, "Service call completed");

        if response.status().is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(service = self.service, status, "Service call failed");
        Err(status_error(self.service, status, &body))
    }

    async fn parse<T: DeserializeOwned>(&self, response: Response) -> Result<T, ServiceError> {
        response
            .json()
            .await
            .map_err(|e| ServiceError::InvalidResponse(format!("{}: {e}", self.service)))
    }
}

/// Map a non-success status to a service error.
///
/// Google error bodies look like `{"error": {"code": 404, "message": "..."}}`;
/// the message is used when present.
pub(crate) fn status_error(service: &str, status: u16, body: &str) -> ServiceError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect());

    match status {
        401 | 403 => ServiceError::Unauthorized(format!("{service}: {message}")),
        404 => ServiceError::NotFound(format!("{service}: {message}")),
        429 => ServiceError::RateLimited(service.to_string()),
        _ => ServiceError::Api {
            service: service.to_string(),
            status,
            message,
        },
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_single_path_segments() {
        let base = base_url("https://gmail.googleapis.com/gmail/v1/").unwrap();
        let url = endpoint(&base, &["users", "me", "messages", "../../drafts"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages/..%2F..%2Fdrafts"
        );

        let url = endpoint(&base, &["users", "me", "messages", "a?alt=media#x"]).unwrap();
        assert_eq!(url.path_segments().unwrap().count(), 6);
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[test]
    fn dot_segments_are_rejected() {
        let base = base_url("https://www.googleapis.com/drive/v3").unwrap();
        for id in ["..", ".", ""] {
            assert!(matches!(
                endpoint(&base, &["files", id]),
                Err(ServiceError::NotFound(_))
            ));
        }
    }

    #[test]
    fn bad_base_url_is_an_error() {
        assert!(base_url("not a url").is_err());
        assert!(base_url("mailto:someone@x.com").is_err());
    }

    #[test]
    fn google_error_message_extracted() {
        let body = r#"{"error": {"code": 404, "message": "Requested entity was not found."}}"#;
        match status_error("gmail", 404, body) {
            ServiceError::NotFound(m) => assert!(m.contains("Requested entity")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn auth_and_rate_limit_statuses() {
        assert!(matches!(
            status_error("drive", 401, ""),
            ServiceError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error("drive", 403, "forbidden"),
            ServiceError::Unauthorized(_)
        ));
        assert!(matches!(
            status_error("calendar", 429, ""),
            ServiceError::RateLimited(_)
        ));
    }

    #[test]
    fn other_statuses_keep_raw_body() {
        match status_error("calendar", 500, "backend exploded") {
            ServiceError::Api {
                status, message, ..
            } => {
                assert_eq!(status, 500);
                assert_eq!(message, "backend exploded");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
