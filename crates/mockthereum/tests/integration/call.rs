use mockthereum::{Address, DynSolValue, RuleError, U256};
use mockthereum_test_utils::RpcClientError;
use serde_json::{Value, json};

use crate::{CONTRACT, SENDER, call_data, started_node};

const FOOBAR: &str = "function foobar(bool, string) returns (int256)";

fn contract() -> Address {
    CONTRACT.parse().expect("valid address")
}

#[tokio::test]
async fn unmatched_call_returns_stub_error() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    let error = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": "0x12345678" }, "latest"]))
        .await
        .unwrap_err();

    let RpcClientError::JsonRpc { message, .. } = &error else {
        panic!("unexpected error: {error}");
    };
    assert_eq!(
        message,
        "No Mockthereum rules found matching Ethereum contract call"
    );

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn call_with_params() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    node.for_call(Some(contract()))
        .for_function(FOOBAR)?
        .with_params(&[json!(true), json!("test")])?
        .then_return_values(vec![json!(1234)])?;

    let data = call_data("foobar(bool,string)", &["bool", "string"], &[
        json!(true),
        json!("test"),
    ])?;
    let result = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": data }, "latest"]))
        .await?;
    assert_eq!(
        result,
        json!(mockthereum_abi::encode(&["int256"], &[json!(1234)])?)
    );

    // Different parameters fall through to the stub.
    let data = call_data("foobar(bool,string)", &["bool", "string"], &[
        json!(false),
        json!("test"),
    ])?;
    let result = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": data }, "latest"]))
        .await;
    assert!(matches!(result, Err(RpcClientError::JsonRpc { .. })));

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn call_data_in_input_field() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    node.for_call(None)
        .for_function("function getText(string key) view returns (string)")?
        .then_return_value(json!("mock text"))?;

    let data = call_data("getText(string)", &["string"], &[json!("key")])?;
    let result = client
        .call("eth_call", json!([{ "to": CONTRACT, "input": data }, "latest"]))
        .await?;

    let encoded = result.as_str().expect("hex string");
    assert_eq!(
        mockthereum_abi::decode(&["string"], encoded)?,
        vec![DynSolValue::String("mock text".to_owned())]
    );

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn call_with_explicit_return_types() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    node.for_call(Some(contract()))
        .then_return_typed(&["bool", "uint8"], vec![json!(true), json!(3)])?;

    let result = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": "0xabcdef01" }, "latest"]))
        .await?;
    assert_eq!(
        result,
        json!(mockthereum_abi::encode(&["bool", "uint8"], &[json!(true), json!(3)])?)
    );

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn untyped_return_without_signature_fails() -> anyhow::Result<()> {
    let (node, _client) = started_node().await?;

    let error = node
        .for_call(None)
        .for_function("function foobar(bool)")?
        .then_return_value(json!(true))
        .unwrap_err();
    assert!(matches!(error, RuleError::Argument(_)));

    let error = node
        .for_call(None)
        .with_params(&[json!(true)])
        .unwrap_err();
    assert!(matches!(error, RuleError::Argument(_)));

    let error = node
        .for_call(None)
        .then_return_typed_value("uint8", json!(256))
        .unwrap_err();
    assert!(matches!(error, RuleError::Encoding(_)));

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn call_revert() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    node.for_call(Some(contract()))
        .for_function(FOOBAR)?
        .then_revert("Mock error");

    let data = call_data("foobar(bool,string)", &["bool", "string"], &[
        json!(true),
        json!("test"),
    ])?;
    let error = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": data }, "latest"]))
        .await
        .unwrap_err();

    let RpcClientError::JsonRpc {
        message,
        data,
        name,
        ..
    } = &error
    else {
        panic!("unexpected error: {error}");
    };
    assert_eq!(
        message,
        "VM Exception while processing transaction: revert Mock error"
    );
    assert_eq!(name.as_deref(), Some("CallError"));
    assert_eq!(
        data.as_ref(),
        Some(&Value::String(mockthereum_abi::encode_revert_reason("Mock error")))
    );

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn mocked_contract_decodes_requests() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    let mocked = node
        .for_call(Some(contract()))
        .for_function(FOOBAR)?
        .then_return_value(json!(-1))?;

    let data = call_data("foobar(bool,string)", &["bool", "string"], &[
        json!(false),
        json!("hello"),
    ])?;
    client
        .call(
            "eth_call",
            json!([{ "from": SENDER, "to": CONTRACT, "data": data, "value": "0x10" }, "latest"]),
        )
        .await?;

    let requests = mocked.requests()?;
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.to, Some(contract()));
    assert_eq!(request.from, Some(SENDER.parse::<Address>()?));
    assert_eq!(request.value, Some(U256::from(16)));
    assert_eq!(
        request.params,
        Some(vec![
            DynSolValue::Bool(false),
            DynSolValue::String("hello".to_owned()),
        ])
    );

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn latest_rule_takes_precedence() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    node.for_call(Some(contract()))
        .then_return_typed_value("uint256", json!(1))?;
    node.for_call(Some(contract()))
        .then_return_typed_value("uint256", json!(2))?;

    let result = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": "0x" }, "latest"]))
        .await?;
    assert_eq!(
        result,
        json!(mockthereum_abi::encode(&["uint256"], &[json!(2)])?)
    );

    node.stop().await?;
    Ok(())
}

#[tokio::test]
async fn call_with_typed_params() -> anyhow::Result<()> {
    let (node, client) = started_node().await?;

    let contract = node
        .for_call(Some(contract()))
        .with_typed_params(&["bool", "string"], &[json!(true), json!("typed")])?
        .then_return_typed_value("bool", json!(true))?;
    assert_eq!(
        contract.param_types(),
        Some(&["bool".to_owned(), "string".to_owned()][..])
    );

    // Any selector matches when no function signature is given.
    let data = call_data("anything(bool,string)", &["bool", "string"], &[
        json!(true),
        json!("typed"),
    ])?;
    let result = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": data }, "latest"]))
        .await?;
    assert_eq!(result, json!(mockthereum_abi::encode(&["bool"], &[json!(true)])?));

    let data = call_data("anything(bool,string)", &["bool", "string"], &[
        json!(true),
        json!("other"),
    ])?;
    let result = client
        .call("eth_call", json!([{ "to": CONTRACT, "data": data }, "latest"]))
        .await;
    assert!(matches!(result, Err(RpcClientError::JsonRpc { .. })));

    let requests = contract.requests()?;
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].params,
        Some(vec![
            DynSolValue::Bool(true),
            DynSolValue::String("typed".to_owned()),
        ])
    );

    node.stop().await?;
    Ok(())
}
