use anyhow::{Result, bail};
use reqwest::{Client, StatusCode, Url};

use super::Connection;

/// GETs `url` and succeeds only on a 200. The body is read to the end before
/// returning in both cases, so a failed attempt leaves no half-read stream behind.
pub async fn probe_http(client: &Client, url: Url) -> Result<Connection> {
    let mut resp = client.get(url).send().await?;
    let status = resp.status();
    let mut drained = 0usize;
    while let Some(chunk) = resp.chunk().await? {
        drained += chunk.len();
    }
    if status != StatusCode::OK {
        bail!("unexpected status {status} ({drained} body bytes)");
    }
    tracing::trace!(drained, "http probe answered 200");
    Ok(Connection::Http(resp))
}
