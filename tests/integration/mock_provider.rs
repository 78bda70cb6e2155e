use apod_desktop::provider::{ApodMetadata, ApodProvider, FetchError};
use chrono::NaiveDate;
use serde_json::json;
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory provider serving canned API bodies and media bytes.
#[derive(Default)]
pub struct MockProvider {
    bodies: HashMap<NaiveDate, String>,
    media: HashMap<String, Vec<u8>>,
    downloads: RefCell<Vec<String>>,
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, day: &str, title: &str, hdurl: &str, bytes: &[u8]) -> Self {
        let body = json!({
            "date": day,
            "title": title,
            "explanation": format!("About {}", title),
            "media_type": "image",
            "url": hdurl.replace(".jpg", "_small.jpg"),
            "hdurl": hdurl,
        });
        self.bodies.insert(date(day), body.to_string());
        self.media.insert(hdurl.to_string(), bytes.to_vec());
        self
    }

    pub fn with_body(mut self, day: &str, body: &str) -> Self {
        self.bodies.insert(date(day), body.to_string());
        self
    }

    pub fn with_media(mut self, url: &str, bytes: &[u8]) -> Self {
        self.media.insert(url.to_string(), bytes.to_vec());
        self
    }

    pub fn download_count(&self) -> usize {
        self.downloads.borrow().len()
    }

    pub fn downloaded_urls(&self) -> Vec<String> {
        self.downloads.borrow().clone()
    }
}

impl ApodProvider for MockProvider {
    fn fetch_metadata(&self, day: NaiveDate) -> Result<ApodMetadata, FetchError> {
        match self.bodies.get(&day) {
            Some(body) => ApodMetadata::from_json(body),
            None => Err(FetchError::Status {
                url: "mock://apod".to_string(),
                status: 404,
            }),
        }
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.downloads.borrow_mut().push(url.to_string());
        self.media.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}
