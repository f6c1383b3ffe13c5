//! Exercises `SubtitleProviderClient` against a stubbed catalog API,
//! covering the "best entry per language" sort/truncate behavior and
//! the gzip-by-suffix download detection.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streamcore::infrastructure::external::subtitle_provider::SubtitleProviderClient;
use streamcore::interfaces::external_services::SubtitleProvider;

#[tokio::test]
async fn search_picks_highest_quality_rank_entry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "a", "language_name": "English", "score": 3, "download_link": "https://example.com/a.srt"},
            {"id": "b", "language_name": "English", "score": 9, "download_link": "https://example.com/b.srt"},
            {"id": "c", "language_name": "English", "score": 5, "download_link": "https://example.com/c.srt"},
        ])))
        .mount(&server)
        .await;

    let client = SubtitleProviderClient::new("test-key", server.uri()).unwrap();
    let results = client.search("tt1234567", "eng", None, None).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "b");
    assert_eq!(results[0].quality_rank, 9);
}

#[tokio::test]
async fn search_returns_empty_vec_on_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = SubtitleProviderClient::new("test-key", server.uri()).unwrap();
    let results = client.search("tt1234567", "eng", Some(1), Some(2)).await.unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn download_detects_gzip_by_filename_suffix() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subs/movie.srt.gz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x1f, 0x8b, 0x08, 0x00]))
        .mount(&server)
        .await;

    let client = SubtitleProviderClient::new("test-key", server.uri()).unwrap();
    let downloaded = client
        .download(&format!("{}/subs/movie.srt.gz", server.uri()))
        .await
        .unwrap();

    assert!(downloaded.is_gzip);
    assert_eq!(downloaded.body, vec![0x1f, 0x8b, 0x08, 0x00]);
}

#[tokio::test]
async fn download_detects_gzip_by_content_encoding_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subs/movie.srt"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .set_body_bytes(vec![1, 2, 3]),
        )
        .mount(&server)
        .await;

    let client = SubtitleProviderClient::new("test-key", server.uri()).unwrap();
    let downloaded = client
        .download(&format!("{}/subs/movie.srt", server.uri()))
        .await
        .unwrap();

    assert!(downloaded.is_gzip);
}
