pub(crate) mod backend;
pub(crate) mod football;
#[cfg(test)]
pub(crate) mod test_server;

use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{PlStatsError, Result};
use crate::utils::truncate;

/// How much of an error body is kept in [`PlStatsError::HttpStatus`].
const ERROR_BODY_LIMIT: usize = 180;

/// Join `base` and `path` without doubling or dropping slashes. Absolute
/// `path`s are returned unchanged.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    let lower = path.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Parse `url` and append `params` as query pairs, repeated keys allowed.
pub(crate) fn with_query(url: &str, params: &[(String, String)]) -> Result<Url> {
    let mut url = Url::parse(url)
        .map_err(|e| PlStatsError::InvalidArgument(format!("bad url {url:?}: {e}")))?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in params {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Send `request` and return the raw body of a successful response.
pub(crate) async fn send_text(request: RequestBuilder, url: &str) -> Result<String> {
    debug!(url, "sending request");

    let response = request.send().await.map_err(|e| PlStatsError::Network {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| PlStatsError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })?;

    if !status.is_success() {
        return Err(PlStatsError::HttpStatus {
            url: url.to_owned(),
            status,
            body: truncate(body.trim(), ERROR_BODY_LIMIT),
        });
    }
    Ok(body)
}

/// Decode a JSON body. An empty body (e.g. `204 No Content`) decodes as `null`.
pub(crate) fn decode<T: DeserializeOwned>(body: &str, url: &str) -> Result<T> {
    let body = body.trim();
    let body = if body.is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| PlStatsError::Decode {
        url: url.to_owned(),
        source: e,
    })
}

/// Send `request` and decode the JSON body of a successful response.
pub(crate) async fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T> {
    let body = send_text(request, url).await?;
    decode(&body, url)
}
