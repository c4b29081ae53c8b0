//! Google Secret Manager accessor.
//!
//! Talks to the Secret Manager REST API over HTTPS with a bearer token taken
//! from the environment. References are secret version resource names such
//! as `projects/PROJECT/secrets/NAME/versions/latest`.

use std::env;
use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{SecretAccessError, SecretAccessor};
use crate::context::ResolveContext;

const SECRET_MANAGER_ENDPOINT: &str = "https://secretmanager.googleapis.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Deserialize)]
struct AccessResponse {
    payload: Payload,
}

#[derive(Deserialize)]
struct Payload {
    data: String,
}

/// [`SecretAccessor`] backed by Google Secret Manager.
#[derive(Clone)]
pub struct GcpSecretManager {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl GcpSecretManager {
    /// Builds an accessor for `endpoint` authenticating with `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretAccessError::Initialization`] when the HTTP client
    /// cannot be built.
    pub fn new(
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, SecretAccessError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(SecretAccessError::initialization)?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_owned(),
            access_token: access_token.into(),
        })
    }

    /// Builds an accessor from `GOOGLE_OAUTH_ACCESS_TOKEN` (or
    /// `GCP_ACCESS_TOKEN`) and, when set, `SECRET_MANAGER_ENDPOINT`.
    ///
    /// # Errors
    ///
    /// Returns [`SecretAccessError::Initialization`] when no token is set.
    pub fn from_env() -> Result<Self, SecretAccessError> {
        let access_token = non_blank_var("GOOGLE_OAUTH_ACCESS_TOKEN")
            .or_else(|| non_blank_var("GCP_ACCESS_TOKEN"))
            .ok_or_else(|| {
                SecretAccessError::initialization(
                    "set GOOGLE_OAUTH_ACCESS_TOKEN (or GCP_ACCESS_TOKEN) with a valid bearer token",
                )
            })?;
        let endpoint = non_blank_var("SECRET_MANAGER_ENDPOINT")
            .unwrap_or_else(|| SECRET_MANAGER_ENDPOINT.to_owned());
        Self::new(endpoint, access_token)
    }

    fn access_url(&self, reference: &str) -> String {
        format!("{}/{reference}:access", self.endpoint)
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl SecretAccessor for GcpSecretManager {
    fn access(&self, ctx: &ResolveContext, reference: &str) -> Result<String, SecretAccessError> {
        ctx.check()?;
        let mut request = self
            .client
            .get(self.access_url(reference))
            .bearer_auth(&self.access_token);
        if let Some(remaining) = ctx.remaining() {
            request = request.timeout(remaining.min(DEFAULT_TIMEOUT));
        }
        let response = request.send().map_err(|err| {
            if err.is_timeout() {
                SecretAccessError::DeadlineExceeded
            } else {
                SecretAccessError::backend(format!("http request failed: {err}"))
            }
        })?;
        ctx.check()?;
        match response.status() {
            status if status.is_success() => {}
            StatusCode::NOT_FOUND => {
                return Err(SecretAccessError::NotFound {
                    reference: reference.to_owned(),
                });
            }
            status => {
                let body = response.text().unwrap_or_default();
                return Err(SecretAccessError::backend(format!(
                    "secret manager returned {status}: {body}"
                )));
            }
        }
        let parsed: AccessResponse = response
            .json()
            .map_err(|err| SecretAccessError::backend(format!("invalid response body: {err}")))?;
        decode_payload(&parsed.payload.data)
    }
}

fn decode_payload(data: &str) -> Result<String, SecretAccessError> {
    let bytes = STANDARD
        .decode(data)
        .map_err(|err| SecretAccessError::backend(format!("invalid payload encoding: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|_| SecretAccessError::backend("secret payload is not valid UTF-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_access_url_from_reference() -> Result<(), SecretAccessError> {
        let manager = GcpSecretManager::new("https://example.test/v1/", "token")?;
        assert_eq!(
            manager.access_url("projects/p/secrets/s/versions/1"),
            "https://example.test/v1/projects/p/secrets/s/versions/1:access"
        );
        Ok(())
    }

    #[test]
    fn decodes_base64_payloads() {
        assert_eq!(decode_payload("aHVudGVyMg=="), Ok(String::from("hunter2")));
        assert!(decode_payload("not base64!").is_err());
    }
}
