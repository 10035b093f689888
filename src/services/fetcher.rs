// src/services/fetcher.rs

//! Cache-first fetching of text and JSON resources.
//!
//! A cache hit is returned as-is and never revalidated. On a miss the URL is
//! fetched; anything but a plain `200` is a fetch error. A successfully decoded
//! body is written to the cache before it is returned.

use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::{ResponseCache, cache};
use crate::utils::http::{HttpTransport, ReqwestTransport};

pub struct Fetcher {
    transport: Box<dyn HttpTransport>,
    cache: Box<dyn ResponseCache>,
}

impl Fetcher {
    pub fn new(transport: Box<dyn HttpTransport>, cache: Box<dyn ResponseCache>) -> Self {
        Self { transport, cache }
    }

    /// Network transport and cache as described by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.http)?;
        Ok(Self::new(Box::new(transport), cache::from_config(&config.cache)))
    }

    /// Fetch a UTF-8 text body.
    pub fn fetch_text(&self, url: &str) -> Result<String> {
        self.fetch_with(url, |bytes| {
            String::from_utf8(bytes.to_vec()).map_err(|e| AppError::decode(url, e))
        })
    }

    /// Fetch and deserialize a JSON body.
    pub fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.fetch_with(url, |bytes| {
            serde_json::from_slice(bytes).map_err(|e| AppError::decode(url, e))
        })
    }

    fn fetch_with<T>(&self, url: &str, decode: impl Fn(&[u8]) -> Result<T>) -> Result<T> {
        if let Some(bytes) = self.cache.get(url)? {
            log::debug!("Cache hit: {}", url);
            return decode(&bytes);
        }

        log::debug!("Fetching {}", url);
        let response = self.transport.get(url)?;
        if response.is_redirect() {
            return Err(AppError::fetch(
                url,
                format!("unexpected redirect (status {})", response.status),
            ));
        }
        if response.status != 200 {
            return Err(AppError::fetch(
                url,
                format!("unexpected status {}", response.status),
            ));
        }

        let value = decode(&response.body)?;
        self.cache.put(url, &response.body)?;
        Ok(value)
    }
}
