//! NasaClient against a local mock server.
//!
//! The client is blocking, so each call runs on a `spawn_blocking` thread
//! (client construction included) while wiremock serves on the runtime.

use super::mock_provider::date;
use apod_desktop::provider::{
    ApodMetadata, ApodProvider, FetchError, MediaType, NasaClient, ProviderSettings,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        api_url: format!("{}/planetary/apod", server.uri()),
        api_key: "test-key".to_string(),
        timeout: Duration::from_secs(5),
    }
}

async fn fetch(settings: ProviderSettings, day: &str) -> Result<ApodMetadata, FetchError> {
    let day = date(day);
    tokio::task::spawn_blocking(move || NasaClient::new(settings)?.fetch_metadata(day))
        .await
        .unwrap()
}

async fn download(settings: ProviderSettings, url: String) -> Result<Vec<u8>, FetchError> {
    tokio::task::spawn_blocking(move || NasaClient::new(settings)?.download(&url))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_metadata_sends_query_and_decodes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .and(query_param("api_key", "test-key"))
        .and(query_param("date", "2022-05-01"))
        .and(query_param("thumbs", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "date": "2022-05-01",
            "title": "NGC 3521: Galaxy in a Bubble",
            "explanation": "Gorgeous spiral galaxy.",
            "media_type": "image",
            "url": "https://apod.nasa.gov/apod/image/2205/NGC3521_1024.jpg",
            "hdurl": "https://apod.nasa.gov/apod/image/2205/NGC3521LRGBHaAPOD-20.jpg",
            "service_version": "v1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let metadata = fetch(settings_for(&server), "2022-05-01").await.unwrap();
    assert_eq!(metadata.title, "NGC 3521: Galaxy in a Bubble");
    assert_eq!(metadata.media_type, MediaType::Image);
    assert_eq!(
        metadata.resolve_media_url().unwrap(),
        "https://apod.nasa.gov/apod/image/2205/NGC3521LRGBHaAPOD-20.jpg"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_metadata_maps_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "msg": "Date must be between Jun 16, 1995 and today."
        })))
        .mount(&server)
        .await;

    let err = fetch(settings_for(&server), "2022-05-01").await.unwrap_err();
    match err {
        FetchError::Status { url, status } => {
            assert_eq!(status, 400);
            assert!(url.ends_with("/planetary/apod"));
            assert!(!url.contains("test-key"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_metadata_rejects_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/planetary/apod"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = fetch(settings_for(&server), "2022-05-01").await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_returns_bytes() {
    let server = MockServer::start().await;
    let image: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    Mock::given(method("GET"))
        .and(path("/apod/image/2205/pic.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(image.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/apod/image/2205/pic.jpg", server.uri());
    let bytes = download(settings_for(&server), url).await.unwrap();
    assert_eq!(bytes, image);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_missing_media_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/apod/image/2205/gone.jpg", server.uri());
    let err = download(settings_for(&server), url.clone()).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, url: u } if u == url));
}
