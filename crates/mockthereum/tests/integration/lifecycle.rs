use mockthereum::{MockNode, NodeError, ServerConfig, U256};
use mockthereum_server::ServerError;
use serde_json::json;

use crate::started_node;

#[tokio::test]
async fn start_twice_fails() -> anyhow::Result<()> {
    let (node, _client) = started_node().await?;

    assert!(matches!(
        node.start().await,
        Err(NodeError::Server(ServerError::AlreadyStarted))
    ));

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn url_requires_running_node() {
    let node = MockNode::default();

    assert!(matches!(
        node.url(),
        Err(NodeError::Server(ServerError::NotRunning))
    ));
}

#[tokio::test]
async fn reset_restores_stub_behaviour() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    node.for_block_number().then_return(U256::from(100));
    assert_eq!(client.call("eth_blockNumber", json!([])).await?, json!("0x64"));

    node.reset();

    assert!(node.seen_requests().is_empty());
    assert_eq!(client.call("eth_blockNumber", json!([])).await?, json!("0x1"));
    assert_eq!(node.seen_method_calls("eth_blockNumber").len(), 1);

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn restart_clears_rules_and_requests() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    node.for_gas_price().then_return(U256::from(1));
    client.call("eth_gasPrice", json!([])).await?;
    node.stop().await?;

    // Requests stay inspectable after stopping.
    assert_eq!(node.seen_method_calls("eth_gasPrice").len(), 1);

    node.start().await?;
    let client = mockthereum_test_utils::RpcClient::new(node.url()?);

    assert!(node.seen_requests().is_empty());
    assert_eq!(client.call("eth_gasPrice", json!([])).await?, json!("0x3e8"));

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn records_requests_in_order() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    client.call("eth_blockNumber", json!([])).await?;
    client.call("eth_gasPrice", json!([])).await?;
    client.call("eth_blockNumber", json!([])).await?;

    let methods: Vec<_> = node
        .seen_requests()
        .into_iter()
        .map(|request| request.method)
        .collect();
    assert_eq!(methods, ["eth_blockNumber", "eth_gasPrice", "eth_blockNumber"]);
    assert_eq!(node.seen_method_calls("eth_blockNumber").len(), 2);

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn echoes_any_id_and_records_null_params() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    let response = client
        .send_raw(&json!({
            "jsonrpc": "2.0",
            "id": -7,
            "method": "eth_blockNumber",
            "params": [],
        }))
        .await?;
    assert_eq!(response, json!({ "jsonrpc": "2.0", "id": -7, "result": "0x1" }));

    let response = client
        .send_raw(&json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "eth_gasPrice",
            "params": null,
        }))
        .await?;
    assert_eq!(response, json!({ "jsonrpc": "2.0", "id": 3, "result": "0x3e8" }));

    let seen = node.seen_requests();
    assert_eq!(seen.len(), 2);
    assert_eq!(serde_json::to_value(&seen[0].id)?, json!(-7));
    assert_eq!(seen[1].method, "eth_gasPrice");
    assert!(seen[1].params.is_empty());

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn fixed_port() -> anyhow::Result<()> {
    // Find a free port, then release it for the node.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.local_addr()?.port()
    };

    let node = MockNode::new(mockthereum::NodeConfig {
        server: ServerConfig {
            port: Some(port),
            ..ServerConfig::default()
        },
        ..mockthereum::NodeConfig::default()
    });
    node.start().await?;

    assert_eq!(node.config().server.port, Some(port));
    assert_eq!(node.url()?.port(), Some(port));

    node.stop().await?;
    Ok(())
}
