// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Status code and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// Blocking GET transport.
///
/// Implementations must not follow redirects.
pub trait HttpTransport {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Create a configured blocking HTTP client.
///
/// Redirects are surfaced to the caller instead of being followed.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(Policy::none())
        .build()
        .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))
}

/// `reqwest` backed transport.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::fetch(url, e))?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| AppError::fetch(url, e))?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_detection() {
        assert!(HttpResponse::new(301, "").is_redirect());
        assert!(HttpResponse::new(302, "").is_redirect());
        assert!(!HttpResponse::new(200, "").is_redirect());
        assert!(!HttpResponse::new(500, "").is_redirect());
    }

    #[test]
    fn client_builds_from_default_config() {
        assert!(create_client(&HttpConfig::default()).is_ok());
    }
}
