//! Blocking client for the NASA APOD API.

use chrono::NaiveDate;
use reqwest::blocking::{Client, Response};
use reqwest::Url;
use std::time::Duration;

use super::{ApodMetadata, ApodProvider, FetchError};

/// Public APOD endpoint.
pub const DEFAULT_API_URL: &str = "https://api.nasa.gov/planetary/apod";

/// Rate-limited key accepted by api.nasa.gov without registration.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Connection settings for [`NasaClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Base URL of the APOD endpoint
    pub api_url: String,
    /// API key sent with every metadata request
    pub api_key: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: DEMO_API_KEY.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// APOD provider backed by api.nasa.gov.
///
/// Every call is a single blocking attempt; there are no retries.
pub struct NasaClient {
    client: Client,
    settings: ProviderSettings,
}

impl NasaClient {
    /// Build a client with the given settings.
    ///
    /// # Errors
    ///
    /// * [`FetchError::InvalidUrl`] if `api_url` is not an absolute URL
    /// * [`FetchError::Http`] if the TLS backend cannot be initialized
    pub fn new(settings: ProviderSettings) -> Result<Self, FetchError> {
        parse_url(&settings.api_url)?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("apod-desktop/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, settings })
    }

    fn check_status(url: &str, response: Response) -> Result<Response, FetchError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

impl ApodProvider for NasaClient {
    fn fetch_metadata(&self, date: NaiveDate) -> Result<ApodMetadata, FetchError> {
        let date = date.format("%Y-%m-%d").to_string();
        log::info!("Getting {} APOD information from NASA...", date);

        let response = self
            .client
            .get(&self.settings.api_url)
            .query(&[
                ("api_key", self.settings.api_key.as_str()),
                ("date", date.as_str()),
                ("thumbs", "true"),
            ])
            .send()?;
        let body = Self::check_status(&self.settings.api_url, response)?.text()?;

        let metadata = ApodMetadata::from_json(&body)?;
        log::info!("APOD title: {}", metadata.title);
        Ok(metadata)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        log::info!("Downloading image from {}", url);
        let response = self.client.get(parse_url(url)?).send()?;
        let bytes = Self::check_status(url, response)?.bytes()?;
        log::debug!("Downloaded {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
