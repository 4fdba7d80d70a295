use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use mockthereum_server::{
    CallbackMatcher, JsonBodyFlexibleMatcher, Method, MockResponse, RecordedRequest, RequestRule,
    RulePriority, StatusCode,
};
use serde_json::json;

use crate::started_server;

fn reply(text: &str) -> MockResponse {
    MockResponse::text(StatusCode::OK, text)
}

#[tokio::test]
async fn json_body_rule() -> anyhow::Result<()> {
    let (server, url) = started_server().await?;
    let client = reqwest::Client::new();

    let endpoint = server.add_request_rule(
        RequestRule::new(reply("matched"))
            .with_matcher(JsonBodyFlexibleMatcher::new(json!({ "method": "eth_chainId" }))),
    );

    let response = client
        .post(url.clone())
        .json(&json!({ "jsonrpc": "2.0", "id": 1, "method": "eth_chainId", "params": [] }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await?, "matched");

    let response = client
        .post(url)
        .json(&json!({ "jsonrpc": "2.0", "id": 2, "method": "eth_blockNumber" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert!(response.text().await?.contains("eth_blockNumber"));

    let seen = endpoint.seen_requests();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method(), Method::POST);
    assert_eq!(seen[0].json().and_then(|body| body.get("id")), Some(&json!(1)));

    server.stop().await?;
    Ok(())
}

#[tokio::test]
async fn most_recent_rule_wins() -> anyhow::Result<()> {
    let (server, url) = started_server().await?;

    server.add_request_rule(RequestRule::new(reply("first")));
    server.add_request_rule(RequestRule::new(reply("second")));

    let text = reqwest::Client::new().post(url).send().await?.text().await?;
    assert_eq!(text, "second");

    server.stop().await?;
    Ok(())
}

#[tokio::test]
async fn fallback_applies_last() -> anyhow::Result<()> {
    let (server, url) = started_server().await?;
    let client = reqwest::Client::new();

    server.add_request_rule(RequestRule::new(reply("normal")).with_matcher(
        CallbackMatcher::new("path is /normal", |request: &RecordedRequest| {
            request.path() == "/normal"
        }),
    ));
    // Registered later, but evaluated after every normal rule.
    server.add_request_rule(
        RequestRule::new(reply("fallback")).with_priority(RulePriority::Fallback),
    );

    let text = client
        .post(url.join("normal")?)
        .send()
        .await?
        .text()
        .await?;
    assert_eq!(text, "normal");

    let text = client
        .post(url.join("other")?)
        .send()
        .await?
        .text()
        .await?;
    assert_eq!(text, "fallback");

    server.stop().await?;
    Ok(())
}

#[tokio::test]
async fn listeners_see_every_request() -> anyhow::Result<()> {
    let (server, url) = started_server().await?;

    let count = Arc::new(AtomicUsize::new(0));
    server.on_request({
        let count = Arc::clone(&count);
        move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    });
    server.add_request_rule(RequestRule::new(reply("ok")).with_matcher(CallbackMatcher::new(
        "never",
        |_: &RecordedRequest| false,
    )));

    let client = reqwest::Client::new();
    client.post(url.clone()).send().await?;
    client.get(url).send().await?;

    assert_eq!(count.load(Ordering::SeqCst), 2);

    server.stop().await?;
    Ok(())
}

#[tokio::test]
async fn reset_removes_rules() -> anyhow::Result<()> {
    let (server, url) = started_server().await?;
    server.add_request_rule(RequestRule::new(reply("ok")));

    server.reset();

    let response = reqwest::Client::new().post(url).send().await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    server.stop().await?;
    Ok(())
}

#[tokio::test]
async fn unmatched_requests_get_canned_reply() -> anyhow::Result<()> {
    let (server, url) = started_server().await?;
    let client = reqwest::Client::new();

    server.add_request_rule(
        RequestRule::new(reply("matched"))
            .with_matcher(JsonBodyFlexibleMatcher::new(json!({ "method": "eth_chainId" }))),
    );
    let unmatched = server
        .for_unmatched_request()
        .then_reply(MockResponse::text(StatusCode::IM_A_TEAPOT, "unmatched"));

    let response = client
        .post(url.clone())
        .json(&json!({ "method": "eth_chainId" }))
        .send()
        .await?;
    assert_eq!(response.text().await?, "matched");

    let response = client
        .post(url)
        .json(&json!({ "method": "eth_gasPrice" }))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(response.text().await?, "unmatched");
    assert_eq!(unmatched.seen_requests().len(), 1);

    server.stop().await?;
    Ok(())
}
