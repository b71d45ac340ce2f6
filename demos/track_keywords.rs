//! Print tweets matching a comma-separated keyword list.
//!
//! ```text
//! TWITTER_BEARER_TOKEN=... cargo run --example track_keywords -- rust,tokio
//! ```

use anyhow::{bail, Context};
use std::sync::Arc;
use tracing::{info, warn};
use twitter_stream::protocol::parse_list;
use twitter_stream::{
    Backoff, BearerToken, ClientConfig, ErrorCallback, FilterLevel, FilterParams, StreamClient,
    StreamError, StreamMessage,
};

/// Give up after this many reconnects without an established connection.
const MAX_RETRIES: u32 = 20;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let keywords = parse_list(&std::env::args().nth(1).unwrap_or_default());
    if keywords.is_empty() {
        bail!("usage: track_keywords <keyword,keyword,...>");
    }
    let token = std::env::var("TWITTER_BEARER_TOKEN").context("TWITTER_BEARER_TOKEN is not set")?;

    let config = ClientConfig::default().with_logging(false);
    let client = StreamClient::http(config, BearerToken::new(token))?;

    let on_error: ErrorCallback = Arc::new(|backoff: &Backoff, err: &StreamError| {
        warn!(
            "reconnecting in {:?} after {} retries: {}",
            backoff.next_wait(),
            backoff.retries(),
            err
        );
        (backoff.retries() >= MAX_RETRIES)
            .then(|| StreamError::Callback(format!("gave up after {MAX_RETRIES} retries")))
    });

    let params = FilterParams::new()
        .track(keywords.iter().cloned())
        .filter_level(FilterLevel::None)
        .stall_warnings(true);
    let (mut messages, handle) = client.filter(params, Some(on_error)).split();

    let ctrl_c = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, closing stream");
            let _ = ctrl_c.close().await;
        }
    });

    info!("tracking {}", keywords.join(", "));
    while let Some(message) = futures::StreamExt::next(&mut messages).await {
        match message {
            StreamMessage::Tweet(tweet) => {
                let author = tweet.user.as_ref().map_or("?", |u| u.screen_name.as_str());
                println!("@{}: {}", author, tweet.best_text());
            }
            StreamMessage::Limit(limit) => info!("{} tweets withheld by rate limit", limit.track),
            StreamMessage::Warning(warning) => {
                warn!("falling behind ({}% full): {}", warning.percent_full, warning.message)
            }
            StreamMessage::Disconnect(notice) => {
                warn!("server disconnecting: {} ({})", notice.reason, notice.code)
            }
            other => info!("{}", other.kind()),
        }
    }

    match handle.close().await {
        Err(err) if !err.is_cancelled() => Err(err.into()),
        _ => Ok(()),
    }
}
