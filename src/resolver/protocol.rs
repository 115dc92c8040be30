//! Wire format of the Google News redirect exchange.
//!
//! Pure functions only: extracting the signed parameters from an article page,
//! building the `batchexecute` form body, and digging the destination URL out
//! of the RPC response.

use super::errors::DecodeError;
use crate::models::DecodingParams;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde_json::{Value, json};

/// RPC method that trades a signed token for its destination URL.
pub const RPC_ID: &str = "Fbv4je";

static PARAMS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("c-wiz > div[jscontroller]").expect("valid params selector"));

/// Fixed client descriptor the web app sends with every `garturlreq`.
const CLIENT_CONTEXT: &str = r#"[["X","X",["X","X"],null,null,1,1,"US:en",null,1,null,null,null,null,null,0,1],"X","X",1,[1,1,1],1,1,null,0,0,null,0]"#;

const SIGNATURE_ATTR: &str = "data-n-a-sg";
const TIMESTAMP_ATTR: &str = "data-n-a-ts";

/// Pull the signature and timestamp attributes out of an article page.
///
/// A missing container element and a container without both attributes are
/// the same failure: the page is not the one we expected.
pub fn parse_decoding_params(
    html: &str,
    token: &str,
    endpoint: &str,
) -> Result<DecodingParams, DecodeError> {
    let document = Html::parse_document(html);
    let missing = || DecodeError::MissingDataAttributes {
        endpoint: endpoint.to_string(),
    };

    let element = document.select(&PARAMS_SELECTOR).next().ok_or_else(missing)?;
    let signature = element.value().attr(SIGNATURE_ATTR).ok_or_else(missing)?;
    let timestamp = element.value().attr(TIMESTAMP_ATTR).ok_or_else(missing)?;

    Ok(DecodingParams {
        signature: signature.to_string(),
        timestamp: timestamp.to_string(),
        token: token.to_string(),
    })
}

/// Build the `application/x-www-form-urlencoded` body for the exchange call.
///
/// The inner `garturlreq` request is itself serialized to a JSON string and
/// embedded in the batch envelope `[[[RPC_ID, "<request>"]]]`.
pub fn exchange_body(params: &DecodingParams) -> Result<String, DecodeError> {
    let timestamp: u64 = params.timestamp.trim().parse().map_err(|e| {
        DecodeError::Parse(format!("timestamp {:?} is not numeric: {e}", params.timestamp))
    })?;

    let request = format!(
        "[\"garturlreq\",{CLIENT_CONTEXT},{},{timestamp},{}]",
        Value::from(params.token.as_str()),
        Value::from(params.signature.as_str()),
    );
    let envelope = json!([[[RPC_ID, request]]]);

    Ok(format!("f.req={}", urlencoding::encode(&envelope.to_string())))
}

/// Extract the destination URL from a `batchexecute` response body.
///
/// The body starts with an anti-JSON-hijacking guard line, followed by a JSON
/// array whose last two elements are bookkeeping sentinels. The first
/// remaining element carries the RPC result as a JSON string at index 2, and
/// the destination URL sits at index 1 of that nested array.
pub fn parse_exchange_response(body: &str) -> Result<String, DecodeError> {
    let (_, payload) = body
        .split_once('\n')
        .ok_or_else(|| DecodeError::UnexpectedStructure("missing response guard line".to_string()))?;

    let envelope: Value = serde_json::from_str(payload.trim())?;
    let items = envelope
        .as_array()
        .ok_or_else(|| DecodeError::UnexpectedStructure("envelope is not an array".to_string()))?;

    let results = &items[..items.len().saturating_sub(2)];
    let rpc_result = results
        .first()
        .and_then(|item| item.get(2))
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::UnexpectedStructure("missing rpc result payload".to_string()))?;

    let decoded: Value = serde_json::from_str(rpc_result)?;
    decoded
        .get(1)
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DecodeError::UnexpectedStructure("missing destination url".to_string()))
}
