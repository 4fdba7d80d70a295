use mockthereum_server::{
    JsonBodyFlexibleMatcher, MockResponse, RequestRule, StatusCode, Url, header,
};
use serde_json::{Value, json};

use crate::started_server;

#[tokio::test]
async fn forwards_unmatched_requests() -> anyhow::Result<()> {
    let (upstream, upstream_url) = started_server().await?;
    let upstream_endpoint = upstream.add_request_rule(RequestRule::new(
        MockResponse::json(&json!({ "jsonrpc": "2.0", "id": 1, "result": "0x10" }))
            .with_header(header::HeaderName::from_static("x-upstream"), "yes".parse()?),
    ));

    let (server, url) = started_server().await?;
    server.add_request_rule(
        RequestRule::new(MockResponse::json(&json!({ "result": "local" })))
            .with_matcher(JsonBodyFlexibleMatcher::new(json!({ "method": "eth_chainId" }))),
    );
    let fallback = server
        .for_unmatched_request()
        .then_forward_to(upstream_url);

    let client = reqwest::Client::new();

    let response = client
        .post(url.clone())
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "eth_chainId" }))
        .send()
        .await?;
    assert_eq!(response.json::<Value>().await?, json!({ "result": "local" }));
    assert!(upstream_endpoint.seen_requests().is_empty());

    let response = client
        .post(url)
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "eth_getBalance" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-upstream").map(|value| value.as_bytes()),
        Some(&b"yes"[..])
    );
    assert_eq!(
        response.json::<Value>().await?,
        json!({ "jsonrpc": "2.0", "id": 1, "result": "0x10" })
    );

    assert_eq!(fallback.seen_requests().len(), 1);
    let forwarded = upstream_endpoint.seen_requests();
    assert_eq!(forwarded.len(), 1);
    assert_eq!(
        forwarded[0].json().and_then(|body| body.get("method")),
        Some(&json!("eth_getBalance"))
    );

    upstream.stop().await?;
    server.stop().await?;
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() -> anyhow::Result<()> {
    let (server, url) = started_server().await?;
    // Nothing listens on the discard port.
    server
        .for_unmatched_request()
        .then_forward_to(Url::parse("http://127.0.0.1:9")?);

    let response = reqwest::Client::new().post(url).body("{}").send().await?;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    server.stop().await?;
    Ok(())
}
