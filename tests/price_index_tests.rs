//! Price-index client against a mock HTTP server
//!
//! Exercises the real transport path: query-string construction, JSON
//! decoding, minPrice snippet extraction, and the failure taxonomy for
//! non-success statuses and malformed payloads.

use std::time::Duration;

use mockito::Matcher;
use partwatch::domain::lookup::PriceLookup;
use partwatch::infrastructure::http_client::{FetchError, HttpClient, HttpClientConfig};
use partwatch::infrastructure::price_index::PriceIndexClient;

fn http_client() -> HttpClient {
    HttpClient::new(HttpClientConfig {
        timeout: Duration::from_secs(2),
        ..HttpClientConfig::default()
    })
    .unwrap()
}

fn keyword_query(keyword: &str) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("keyword".into(), keyword.into()),
        Matcher::UrlEncoded("output".into(), "json".into()),
    ])
}

#[tokio::test]
async fn search_decodes_matches_and_normalizes_prices() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/")
        .match_query(keyword_query("i9-12900k"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "entities": [
                    {
                        "link": "https://tweakers.net/pricewatch/100/p/",
                        "minPrice": "<a href=\"//tweakers.net/pricewatch/100/\">&euro; 1.234,56</a>"
                    },
                    {
                        "link": "https://tweakers.net/pricewatch/101/p/",
                        "minPrice": "<a href=\"//tweakers.net/pricewatch/101/\">n.v.t.</a>"
                    }
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = PriceIndexClient::new(http_client(), server.url());
    let matches = client.search("i9-12900k").await.unwrap();

    mock.assert_async().await;
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].link, "https://tweakers.net/pricewatch/100/p/");
    assert_eq!(matches[0].price, Some(1234.56));
    // Second entry carries no parseable amount: a match without a price.
    assert_eq!(matches[1].price, None);
}

#[tokio::test]
async fn empty_reply_yields_no_matches() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(keyword_query("nothing"))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "ok"}"#)
        .create_async()
        .await;

    let client = PriceIndexClient::new(http_client(), server.url());
    let matches = client.search("nothing").await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn non_success_status_surfaces_as_a_typed_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let client = PriceIndexClient::new(http_client(), server.url());
    let err = client.search("whatever").await.unwrap_err();

    match err.downcast_ref::<FetchError>() {
        Some(FetchError::Status { status, .. }) => assert_eq!(status.as_u16(), 503),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_payload_surfaces_as_a_decode_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json at all")
        .create_async()
        .await;

    let client = PriceIndexClient::new(http_client(), server.url());
    let err = client.search("whatever").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<FetchError>(),
        Some(FetchError::Decode { .. })
    ));
}
