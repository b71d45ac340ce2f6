//! reqwest transport against a local mock server.

use futures::StreamExt;
use mockito::{Matcher, Server};
use std::sync::Arc;
use std::time::Duration;
use twitter_stream::client::{Frame, FrameStream, StreamRequest};
use twitter_stream::{
    AccessCredentials, BearerToken, ClientConfig, FilterParams, HttpTransport, StreamClient,
    StreamError, Transport,
};

const FILTER_PATH: &str = "/1.1/statuses/filter.json";

fn config(server: &Server) -> ClientConfig {
    ClientConfig::default()
        .with_endpoint(format!("{}{}", server.url(), FILTER_PATH))
        .with_gzip(false)
}

fn signed_transport(config: &ClientConfig) -> HttpTransport {
    HttpTransport::with_config(config, Some(Arc::new(BearerToken::new("secret")))).unwrap()
}

#[tokio::test]
async fn test_perform_sends_signed_form() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", FILTER_PATH)
        .match_header("authorization", "Bearer secret")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("track".into(), "rust,tokio".into()),
            Matcher::UrlEncoded("stall_warnings".into(), "true".into()),
        ]))
        .with_status(200)
        .with_header("x-rate-limit-remaining", "10")
        .with_body("{\"text\":\"hello\"}\r\n\r\n")
        .create_async()
        .await;

    let config = config(&server);
    let transport = signed_transport(&config);
    let form = FilterParams::new()
        .track(["rust", "tokio"])
        .stall_warnings(true)
        .to_form();
    let response = transport
        .perform(StreamRequest::post(config.endpoint.clone(), form))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(
        response.headers.get("x-rate-limit-remaining").map(String::as_str),
        Some("10")
    );

    let frames: Vec<Frame> = FrameStream::new(response.body)
        .map(|frame| frame.unwrap())
        .collect()
        .await;
    assert_eq!(frames.len(), 2);
    assert!(matches!(&frames[0], Frame::Message(bytes) if bytes.as_ref() == b"{\"text\":\"hello\"}"));
    assert_eq!(frames[1], Frame::KeepAlive);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_200_status_is_returned_not_raised() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", FILTER_PATH)
        .with_status(503)
        .create_async()
        .await;

    let config = config(&server);
    let response = signed_transport(&config)
        .perform(StreamRequest::post(config.endpoint.clone(), vec![]))
        .await
        .unwrap();
    assert_eq!(response.status, 503);
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let config = ClientConfig::default()
        .with_endpoint("http://127.0.0.1:1/filter.json")
        .with_connect_timeout(Duration::from_secs(1));
    let err = signed_transport(&config)
        .perform(StreamRequest::post(config.endpoint.clone(), vec![]))
        .await
        .unwrap_err();
    assert!(matches!(err, StreamError::Transport(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_stream_delivers_tweets_from_server() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", FILTER_PATH)
        .match_body(Matcher::UrlEncoded("track".into(), "rust".into()))
        .with_status(200)
        .with_body("{\"text\":\"one\"}\r\n{\"limit\":{\"track\":4}}\r\n")
        .expect_at_least(1)
        .create_async()
        .await;

    let config = config(&server);
    let client = StreamClient::http(config, BearerToken::new("secret")).unwrap();
    let mut stream = client.filter(FilterParams::new().track(["rust"]), None);

    let first = stream.recv().await.unwrap();
    assert_eq!(first.as_tweet().unwrap().text, "one");
    assert_eq!(stream.recv().await.unwrap().kind(), "limit");

    assert_eq!(stream.close().await, Err(StreamError::Cancelled));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_forbidden_ends_stream() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", FILTER_PATH)
        .with_status(403)
        .expect(1)
        .create_async()
        .await;

    let client = StreamClient::http(config(&server), BearerToken::new("secret")).unwrap();
    let stream = client.filter(FilterParams::new().track(["rust"]), None);

    tokio::time::timeout(Duration::from_secs(5), stream.done())
        .await
        .unwrap();
    assert_eq!(stream.err(), Some(StreamError::http(403)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_signing_failure_ends_stream() {
    let server = Server::new_async().await;
    let client = StreamClient::http(config(&server), BearerToken::new("secret"))
        .unwrap()
        .with_credentials(AccessCredentials::new("token", "secret"));
    let stream = client.filter(FilterParams::new().track(["rust"]), None);

    tokio::time::timeout(Duration::from_secs(5), stream.done())
        .await
        .unwrap();
    assert!(matches!(stream.err(), Some(StreamError::Signing(_))));
}
