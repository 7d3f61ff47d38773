//! reqwest-backed implementation of the remote image service client.
//!
//! The wire contract is fixed by the external service: JSON over HTTPS,
//! success codes 200/201/204 depending on verb, and an inherited quirk in
//! credential transport - create authenticates with `Authorization:
//! Bearer`, every other verb with `X-API-Private-Token`. That asymmetry
//! is preserved exactly per verb.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, StatusCode};
use tracing::debug;

use super::types::PatchBody;
use super::{RemoteImage, RemoteImageApi, RemoteImagePayload};
use crate::error::{Error, Result};
use crate::model::ContentType;

/// Credential header used by every verb except create.
const PRIVATE_TOKEN_HEADER: &str = "X-API-Private-Token";

/// HTTP client for the remote image service.
///
/// No request timeout is set here; the transport's own bound is the only
/// one, and no retries are performed.
#[derive(Clone)]
pub struct HttpRemoteClient {
    client: reqwest::Client,
    api_base: String,
    public_base: String,
}

impl HttpRemoteClient {
    /// Create a client for the given API and public endpoint bases.
    ///
    /// Trailing slashes are trimmed so path joining stays predictable.
    pub fn new(api_base: &str, public_base: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            public_base: public_base.trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{path}", self.api_base)
    }

    fn public_url(&self, id: &str) -> String {
        format!("{}/{id}", self.public_base)
    }
}

/// Read the response body, mapping JSON parse failures to `Content`.
async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| Error::Content(format!("{e}: {body}")))
}

/// Read the response body for use as an error message.
async fn error_body(response: Response) -> Result<String> {
    Ok(response.text().await?)
}

#[async_trait]
impl RemoteImageApi for HttpRemoteClient {
    async fn create(&self, payload: &RemoteImagePayload, token: &str) -> Result<RemoteImage> {
        let response = self
            .client
            .post(self.api_url(""))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let message = error_body(response).await?;
            debug!(status = %status, "remote create failed");
            return Err(Error::remote(status.as_u16(), message));
        }
        parse_json(response).await
    }

    async fn list(&self, token: &str) -> Result<Vec<RemoteImage>> {
        let response = self
            .client
            .get(self.api_url("images"))
            .header(PRIVATE_TOKEN_HEADER, token)
            .send()
            .await?;

        // A non-JSON body is a content error regardless of status code.
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !content_type.contains("application/json") {
            debug!(content_type = %content_type, "remote list returned non-JSON content");
            return Err(Error::Content(content_type));
        }

        parse_json(response).await
    }

    async fn read(&self, id: &str, token: &str) -> Result<RemoteImage> {
        let response = self
            .client
            .get(self.public_url(id))
            .header(PRIVATE_TOKEN_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::FORBIDDEN => Err(Error::Forbidden),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            s if s.is_success() => parse_json(response).await,
            s => Err(Error::remote(s.as_u16(), error_body(response).await?)),
        }
    }

    async fn update(&self, id: &str, payload: &RemoteImagePayload, token: &str) -> Result<()> {
        let response = self
            .client
            .put(self.api_url(id))
            .header(PRIVATE_TOKEN_HEADER, token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::BAD_REQUEST => Err(Error::BadRequest(error_body(response).await?)),
            StatusCode::FORBIDDEN => Err(Error::Forbidden),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            s => Err(Error::remote(s.as_u16(), error_body(response).await?)),
        }
    }

    async fn patch_content_type(
        &self,
        id: &str,
        content_type: ContentType,
        token: &str,
    ) -> Result<()> {
        let response = self
            .client
            .patch(self.api_url(id))
            .header(PRIVATE_TOKEN_HEADER, token)
            .json(&PatchBody { content_type })
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::BAD_REQUEST => Err(Error::BadRequest(error_body(response).await?)),
            StatusCode::FORBIDDEN => Err(Error::Forbidden),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            s => Err(Error::remote(s.as_u16(), error_body(response).await?)),
        }
    }

    async fn delete(&self, id: &str, token: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.api_url(id))
            .header(PRIVATE_TOKEN_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::FORBIDDEN => Err(Error::Forbidden),
            StatusCode::NOT_FOUND => Err(Error::NotFound),
            // Any other status carries the parsed response body.
            s => Err(Error::remote(s.as_u16(), error_body(response).await?)),
        }
    }
}
