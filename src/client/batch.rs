//! Batched reads: one aggregated round trip when the chain allows it,
//! otherwise concurrent individual calls

use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::Function;
use futures::future::{join_all, try_join_all};
use futures::FutureExt;
use tracing::{debug, warn};

use super::reader::ContractReader;
use crate::domain::call::{BatchCallSpec, BatchResult, CallOutcome};
use crate::domain::chain::{AggregateCall, AggregateOutcome};
use crate::error::{EndpointError, Error, Result};
use crate::infrastructure::abi::{decode_output, encode_call, resolve_function};

/// How a batch is dispatched when the endpoint supports aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MulticallMode {
    /// One aggregated request for the whole batch
    #[default]
    Auto,
    /// Always issue individual calls
    Disabled,
    /// Aggregated requests of at most N calls, dispatched concurrently
    Chunked(NonZeroUsize),
}

impl MulticallMode {
    /// Map a configured batch size: absent is `Auto`, zero disables
    pub fn from_batch_size(size: Option<usize>) -> Self {
        match size {
            None => MulticallMode::Auto,
            Some(n) => NonZeroUsize::new(n).map_or(MulticallMode::Disabled, MulticallMode::Chunked),
        }
    }

    fn chunk_size(self, total: usize) -> usize {
        match self {
            MulticallMode::Chunked(n) => n.get(),
            _ => total.max(1),
        }
    }
}

/// A batch entry that encoded successfully
struct Encoded<'a> {
    index: usize,
    function: &'a Function,
    call: AggregateCall,
}

impl ContractReader {
    /// Read many calls on this chain
    ///
    /// `results[i]` always belongs to `calls[i]`. Individual call failures
    /// are captured per item; the whole batch only fails when the
    /// aggregated request itself cannot be completed.
    pub async fn read_batch(&self, calls: Vec<BatchCallSpec>) -> Result<BatchResult> {
        if calls.is_empty() {
            return Ok(BatchResult::empty(self.chain_id));
        }

        let results = if self.uses_aggregation() {
            self.read_aggregated(&calls).await?
        } else {
            self.read_individually(&calls).await
        };

        let result = BatchResult {
            chain_id: self.chain_id,
            results,
            calls,
        };
        let failed = result.failure_count();
        if failed > 0 {
            warn!(chain_id = %self.chain_id, failed, total = result.len(), "batch completed with failures");
        }
        Ok(result)
    }

    fn uses_aggregation(&self) -> bool {
        self.endpoint.supports_aggregation() && self.multicall != MulticallMode::Disabled
    }

    async fn read_aggregated(&self, calls: &[BatchCallSpec]) -> Result<Vec<CallOutcome<DynSolValue>>> {
        let mut outcomes: Vec<Option<CallOutcome<DynSolValue>>> =
            std::iter::repeat_with(|| None).take(calls.len()).collect();
        let mut encoded = Vec::with_capacity(calls.len());

        // Encoding failures never reach the chain
        for (index, spec) in calls.iter().enumerate() {
            match self.encode(spec) {
                Ok((function, call)) => encoded.push(Encoded { index, function, call }),
                Err(err) => outcomes[index] = Some(CallOutcome::Failure(err)),
            }
        }

        if !encoded.is_empty() {
            let returned = self.dispatch(&encoded).await?;
            for (entry, outcome) in encoded.iter().zip(returned) {
                outcomes[entry.index] = Some(self.settle(entry.function, outcome));
            }
        }

        Ok(outcomes
            .into_iter()
            .map(|outcome| {
                outcome.unwrap_or_else(|| {
                    CallOutcome::Failure(Error::Transport(EndpointError::new(
                        "aggregated call returned no result for this entry",
                    )))
                })
            })
            .collect())
    }

    async fn dispatch(&self, encoded: &[Encoded<'_>]) -> Result<Vec<AggregateOutcome>> {
        let call_count = encoded.len();
        let chunk_size = self.multicall.chunk_size(call_count);
        let chunks: Vec<Vec<AggregateCall>> = encoded
            .chunks(chunk_size)
            .map(|chunk| chunk.iter().map(|entry| entry.call.clone()).collect())
            .collect();

        debug!(
            chain_id = %self.chain_id,
            calls = call_count,
            requests = chunks.len(),
            "aggregated batch read"
        );

        let batch_failed = |source: EndpointError| Error::BatchRequestFailed {
            chain_id: self.chain_id,
            call_count,
            source,
        };

        let responses = try_join_all(chunks.into_iter().map(|chunk| {
            let expected = chunk.len();
            async move {
                let outcomes = self.endpoint.aggregate(chunk, true).await?;
                if outcomes.len() != expected {
                    return Err(EndpointError::new(format!(
                        "aggregated call returned {} results for {} calls",
                        outcomes.len(),
                        expected
                    )));
                }
                Ok(outcomes)
            }
        }))
        .await
        .map_err(batch_failed)?;

        Ok(responses.into_iter().flatten().collect())
    }

    fn settle(&self, function: &Function, outcome: AggregateOutcome) -> CallOutcome<DynSolValue> {
        if outcome.success {
            decode_output(function, &outcome.return_data).into()
        } else {
            CallOutcome::Failure(Error::Contract(self.revert_fault(&outcome.return_data)))
        }
    }

    async fn read_individually(&self, calls: &[BatchCallSpec]) -> Vec<CallOutcome<DynSolValue>> {
        debug!(chain_id = %self.chain_id, calls = calls.len(), "individual batch read");

        let pending = calls.iter().map(|spec| {
            AssertUnwindSafe(self.read(spec.address, &spec.function, &spec.args))
                .catch_unwind()
                .map(|settled| settled.unwrap_or_else(|panic| Err(Error::from_panic(panic))))
        });

        join_all(pending)
            .await
            .into_iter()
            .map(|outcome| CallOutcome::from(outcome.map_err(|err| self.item_fault(err))))
            .collect()
    }

    /// A reverted item is a contract fault whichever path serviced it
    fn item_fault(&self, err: Error) -> Error {
        match err {
            Error::Transport(cause) => match cause.find_revert_data() {
                Some(data) => Error::Contract(self.revert_fault(data)),
                None => Error::Transport(cause),
            },
            other => other,
        }
    }

    fn encode<'a>(&'a self, spec: &BatchCallSpec) -> Result<(&'a Function, AggregateCall)> {
        let function = resolve_function(&self.abi, &spec.function, spec.args.len())?;
        let call_data = encode_call(function, &spec.args)?;
        Ok((
            function,
            AggregateCall {
                target: spec.address,
                call_data,
            },
        ))
    }
}
