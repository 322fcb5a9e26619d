//! Concurrent per-chain dispatch with partitioned results

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::future::join_all;
use futures::FutureExt;
use tracing::warn;

use crate::domain::call::{ChainFailure, CrossChainBatchResult};
use crate::domain::chain::ChainId;
use crate::error::{Error, Result};

/// Run `op` for every requested chain concurrently
///
/// Duplicate ids are dropped (first occurrence kept). Every requested chain
/// ends up in exactly one of `results_by_chain` or `failed_chains`; a
/// failing or panicking chain never cancels its siblings.
pub async fn fan_out<T, F, Fut>(chain_ids: &[ChainId], op: F) -> CrossChainBatchResult<T>
where
    F: Fn(ChainId) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let requested = dedup(chain_ids);

    let pending = requested.iter().map(|&chain_id| {
        AssertUnwindSafe(op(chain_id))
            .catch_unwind()
            .map(move |settled| {
                let outcome = settled.unwrap_or_else(|panic| Err(Error::from_panic(panic)));
                (chain_id, outcome)
            })
    });

    let mut result = CrossChainBatchResult::default();
    for (chain_id, outcome) in join_all(pending).await {
        match outcome {
            Ok(value) => {
                result.results_by_chain.insert(chain_id, value);
            }
            Err(error) => {
                warn!(%chain_id, %error, "chain failed");
                result.failed_chains.push(ChainFailure { chain_id, error });
            }
        }
    }
    result
}

/// Group items by chain, keeping their relative order within each chain
pub fn group_by_chain<Q>(items: impl IntoIterator<Item = (ChainId, Q)>) -> BTreeMap<ChainId, Vec<Q>> {
    let mut groups: BTreeMap<ChainId, Vec<Q>> = BTreeMap::new();
    for (chain_id, item) in items {
        groups.entry(chain_id).or_default().push(item);
    }
    groups
}

fn dedup(chain_ids: &[ChainId]) -> Vec<ChainId> {
    let mut seen = BTreeSet::new();
    chain_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}
