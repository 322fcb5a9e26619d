//! Batched reads on a single chain
//!
//! Covers both dispatch strategies (aggregated and individual calls),
//! ordering, per-item failure capture and batch-level failures.

mod common;

use std::num::NonZeroUsize;
use std::time::Duration;

use alloy_dyn_abi::DynSolValue;
use omnicall::{BatchCallSpec, CallOutcome, ContractClient, EndpointError, Error, MulticallMode};

use common::*;

fn balance_spec(token: alloy_primitives::Address) -> BatchCallSpec {
    BatchCallSpec::new(token, "balanceOf", vec![DynSolValue::Address(HOLDER)])
}

fn supply_spec(token: alloy_primitives::Address) -> BatchCallSpec {
    BatchCallSpec::new(token, "totalSupply", vec![])
}

#[tokio::test]
async fn test_empty_batch_issues_no_rpc() {
    let endpoint = MockEndpoint::new(1).with_aggregation().shared();
    let client = ContractClient::new(token_abi(), endpoint.clone());

    let result = client.read_batch(vec![]).await.unwrap();

    assert!(result.is_empty());
    assert_eq!(result.chain_id.get(), 1);
    assert_eq!(endpoint.counters.total(), 0);
}

#[tokio::test]
async fn test_rpc_down_without_aggregation() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .respond(
            calldata(&abi, "balanceOf", &[DynSolValue::Address(HOLDER)]),
            encoded_uint(1_500),
        )
        .fail(calldata(&abi, "totalSupply", &[]), EndpointError::new("rpc down"))
        .shared();
    let client = ContractClient::new(abi, endpoint.clone());

    let result = client
        .read_batch(vec![balance_spec(TOKEN_A), supply_spec(TOKEN_B)])
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.results[0].value(), Some(&uint(1_500)));
    match &result.results[1] {
        CallOutcome::Failure(Error::Transport(err)) => assert_eq!(err.message(), "rpc down"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(Counters::get(&endpoint.counters.aggregate), 0);
    assert_eq!(Counters::get(&endpoint.counters.call), 2);

    let failures = result.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0.function, "totalSupply");
}

#[tokio::test]
async fn test_aggregated_batch_preserves_order() {
    let abi = token_abi();
    let mut endpoint = MockEndpoint::new(1).with_aggregation();
    let mut specs = Vec::new();
    for i in 0..5u8 {
        let holder = alloy_primitives::Address::repeat_byte(i + 1);
        let args = vec![DynSolValue::Address(holder)];
        endpoint = endpoint.respond(calldata(&abi, "balanceOf", &args), encoded_uint(i as u64 * 10));
        specs.push(BatchCallSpec::new(TOKEN_A, "balanceOf", args));
    }
    let endpoint = endpoint.shared();
    let client = ContractClient::new(abi, endpoint.clone());

    let result = client.read_batch(specs.clone()).await.unwrap();

    assert_eq!(Counters::get(&endpoint.counters.aggregate), 1);
    assert_eq!(Counters::get(&endpoint.counters.call), 0);
    assert_eq!(result.calls, specs);
    let values = result.into_values().unwrap();
    assert_eq!(values, (0..5).map(|i| uint(i * 10)).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_individual_batch_preserves_order() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .respond(calldata(&abi, "totalSupply", &[]), encoded_uint(9))
        .respond(
            calldata(&abi, "balanceOf", &[DynSolValue::Address(HOLDER)]),
            encoded_uint(3),
        )
        .shared();
    let client = ContractClient::new(abi, endpoint);

    let values = client
        .read_batch(vec![supply_spec(TOKEN_A), balance_spec(TOKEN_A), supply_spec(TOKEN_B)])
        .await
        .unwrap()
        .into_values()
        .unwrap();

    assert_eq!(values, vec![uint(9), uint(3), uint(9)]);
}

#[tokio::test]
async fn test_aggregated_item_revert_is_decoded() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .with_aggregation()
        .respond(calldata(&abi, "totalSupply", &[]), encoded_uint(1))
        .fail(
            calldata(&abi, "balanceOf", &[DynSolValue::Address(HOLDER)]),
            reverted(insufficient_balance(0, 1)),
        )
        .shared();
    let client =
        ContractClient::new(abi.clone(), endpoint).with_decoder(omnicall::DecoderChain::for_abi(&abi));

    let result = client
        .read_batch(vec![supply_spec(TOKEN_A), balance_spec(TOKEN_A)])
        .await
        .unwrap();

    assert!(result.results[0].is_success());
    match result.results[1].error() {
        Some(Error::Contract(fault)) => assert!(fault.is("InsufficientBalance")),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(matches!(
        result.into_values(),
        Err(Error::PartialBatchFailure { failed: 1, total: 2, .. })
    ));
}

#[tokio::test]
async fn test_aggregated_item_revert_without_decoder_is_unrecognized() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .with_aggregation()
        .fail(calldata(&abi, "totalSupply", &[]), reverted(vec![0x01, 0x02]))
        .shared();
    let client = ContractClient::new(abi, endpoint);

    let result = client.read_batch(vec![supply_spec(TOKEN_A)]).await.unwrap();

    match result.results[0].error() {
        Some(Error::Contract(fault)) => {
            assert_eq!(fault.reason, omnicall::RevertReason::Unrecognized);
            assert_eq!(fault.data.as_ref(), &[0x01, 0x02]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_aggregate_transport_failure_fails_whole_batch() {
    let endpoint = MockEndpoint::new(137)
        .with_aggregation()
        .fail_aggregate(EndpointError::new("gateway timeout"))
        .shared();
    let client = ContractClient::new(token_abi(), endpoint);

    let err = client
        .read_batch(vec![supply_spec(TOKEN_A), supply_spec(TOKEN_B)])
        .await
        .unwrap_err();

    match err {
        Error::BatchRequestFailed {
            chain_id,
            call_count,
            source,
        } => {
            assert_eq!(chain_id.get(), 137);
            assert_eq!(call_count, 2);
            assert_eq!(source.message(), "gateway timeout");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_disabled_mode_skips_aggregation() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .with_aggregation()
        .respond(calldata(&abi, "totalSupply", &[]), encoded_uint(1))
        .shared();
    let client = ContractClient::new(abi, endpoint.clone()).with_multicall(MulticallMode::Disabled);

    client
        .read_batch(vec![supply_spec(TOKEN_A), supply_spec(TOKEN_B)])
        .await
        .unwrap();

    assert_eq!(Counters::get(&endpoint.counters.aggregate), 0);
    assert_eq!(Counters::get(&endpoint.counters.call), 2);
}

#[tokio::test]
async fn test_chunked_mode_splits_requests() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .with_aggregation()
        .respond(calldata(&abi, "totalSupply", &[]), encoded_uint(5))
        .shared();
    let client = ContractClient::new(abi, endpoint.clone())
        .with_multicall(MulticallMode::Chunked(NonZeroUsize::new(2).unwrap()));

    let specs: Vec<_> = (0..5).map(|_| supply_spec(TOKEN_A)).collect();
    let result = client.read_batch(specs).await.unwrap();

    assert_eq!(result.len(), 5);
    assert!(result.is_complete());
    let mut sizes = endpoint.aggregate_sizes.lock().unwrap().clone();
    sizes.sort_unstable();
    assert_eq!(sizes, vec![1, 2, 2]);
}

#[tokio::test]
async fn test_unencodable_item_fails_alone() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .with_aggregation()
        .respond(calldata(&abi, "totalSupply", &[]), encoded_uint(5))
        .shared();
    let client = ContractClient::new(abi, endpoint.clone());

    let result = client
        .read_batch(vec![
            BatchCallSpec::new(TOKEN_A, "mint", vec![]),
            supply_spec(TOKEN_A),
        ])
        .await
        .unwrap();

    assert!(matches!(result.results[0].error(), Some(Error::Abi(_))));
    assert_eq!(result.results[1].value(), Some(&uint(5)));
    assert_eq!(endpoint.aggregate_sizes.lock().unwrap().clone(), vec![1]);
}

#[tokio::test]
async fn test_read_propagates_transport_error_unchanged() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .fail(calldata(&abi, "totalSupply", &[]), reverted(insufficient_balance(1, 2)))
        .shared();
    let client =
        ContractClient::new(abi.clone(), endpoint).with_decoder(omnicall::DecoderChain::for_abi(&abi));

    let err = client.read(TOKEN_A, "totalSupply", &[]).await.unwrap_err();

    match err {
        Error::Transport(err) => assert!(err.find_revert_data().is_some()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_revert_is_classified_the_same_on_both_paths() {
    let abi = token_abi();
    let mut kinds = Vec::new();

    for aggregation in [true, false] {
        let mut endpoint = MockEndpoint::new(1).fail(
            calldata(&abi, "totalSupply", &[]),
            reverted(insufficient_balance(0, 1)),
        );
        if aggregation {
            endpoint = endpoint.with_aggregation();
        }
        let endpoint = endpoint.shared();
        let client = ContractClient::new(abi.clone(), endpoint.clone())
            .with_decoder(omnicall::DecoderChain::for_abi(&abi));

        let result = client.read_batch(vec![supply_spec(TOKEN_A)]).await.unwrap();

        assert_eq!(Counters::get(&endpoint.counters.aggregate), aggregation as usize);
        match result.results[0].error() {
            Some(Error::Contract(fault)) => kinds.push(fault.name().map(str::to_string)),
            other => panic!("aggregation={}: unexpected error {:?}", aggregation, other),
        }
    }

    assert_eq!(
        kinds,
        vec![Some("InsufficientBalance".to_string()), Some("InsufficientBalance".to_string())]
    );
}

#[tokio::test]
async fn test_individual_revert_without_decoder_is_unrecognized() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .fail(calldata(&abi, "totalSupply", &[]), reverted(vec![0x01, 0x02]))
        .shared();
    let client = ContractClient::new(abi, endpoint);

    let result = client.read_batch(vec![supply_spec(TOKEN_A)]).await.unwrap();

    match result.results[0].error() {
        Some(Error::Contract(fault)) => {
            assert_eq!(fault.reason, omnicall::RevertReason::Unrecognized);
            assert_eq!(fault.data.as_ref(), &[0x01, 0x02]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_individual_calls_run_concurrently() {
    let abi = token_abi();
    let endpoint = MockEndpoint::new(1)
        .respond(calldata(&abi, "totalSupply", &[]), encoded_uint(1))
        .with_delay(Duration::from_millis(100))
        .shared();
    let client = ContractClient::new(abi, endpoint.clone());

    let started = tokio::time::Instant::now();
    let result = client
        .read_batch((0..5).map(|_| supply_spec(TOKEN_A)).collect())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(result.is_complete());
    assert_eq!(Counters::get(&endpoint.counters.call), 5);
    // Five sequential calls would take 500ms
    assert!(elapsed < Duration::from_millis(200), "took {:?}", elapsed);
}
