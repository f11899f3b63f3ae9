//! Shared request/response plumbing for Daraja calls.

use relay_core::{AccessToken, RelayError, RelayResult, UpstreamDetail};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

/// Maps an upstream failure into the error variant of the calling component
pub(crate) type ErrorKind = fn(UpstreamDetail) -> RelayError;

/// POST a JSON body with a bearer token and return the gateway's JSON reply.
pub(crate) async fn post_authorized<T: Serialize>(
    client: &Client,
    url: &str,
    token: &AccessToken,
    body: &T,
    kind: ErrorKind,
) -> RelayResult<Value> {
    let response = client
        .post(url)
        .header(AUTHORIZATION, token.bearer())
        .json(body)
        .send()
        .await
        .map_err(|e| kind(UpstreamDetail::Message(e.to_string())))?;

    read_json(response, kind).await
}

/// Read a response body, failing on non-2xx or non-JSON content.
pub(crate) async fn read_json(response: Response, kind: ErrorKind) -> RelayResult<Value> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| kind(UpstreamDetail::Message(e.to_string())))?;

    if !status.is_success() {
        error!("Daraja API error: status={}, body={}", status, body);
        return Err(kind(UpstreamDetail::from_response(status.as_u16(), &body)));
    }

    serde_json::from_str(&body).map_err(|e| {
        kind(UpstreamDetail::Message(format!(
            "Failed to parse Daraja response: {}",
            e
        )))
    })
}
