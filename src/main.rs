use std::path::{Path, PathBuf};
use std::sync::Arc;

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use serde_json::{json, Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use omnicall::config::{self, ChainConfig, Config};
use omnicall::infrastructure::abi::{load_abi, parse_args, resolve_function, to_json};
use omnicall::infrastructure::ethereum::{canonical_address, AlloyEndpoint};
use omnicall::{
    ChainEndpoint, ChainId, ChainRegistry, ClientOptions, CrossChainBatchResult, DecoderChain,
    ExecuteOptions, Execution, LocalSigner, MultichainContract,
};

#[derive(Debug, Parser)]
#[command(
    name = "omnicall",
    version,
    about = "Omnicall: call one contract across many EVM chains"
)]
struct Args {
    /// Config file (defaults to $OMNICALL_CONFIG, then ~/.config/omnicall/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List configured chains
    Chains,

    /// Call a view function on every selected chain and print JSON
    Read {
        /// ABI JSON file (raw array or compiler artifact)
        #[arg(long)]
        abi: PathBuf,

        /// Contract address
        #[arg(long)]
        address: Address,

        /// Function name
        #[arg(long)]
        function: String,

        /// Chain id to query; repeatable (default: every configured chain)
        #[arg(long = "chain")]
        chains: Vec<u64>,

        /// Function arguments
        args: Vec<String>,
    },

    /// Send a transaction on every selected chain with the configured signer
    Send {
        /// ABI JSON file (raw array or compiler artifact)
        #[arg(long)]
        abi: PathBuf,

        /// Contract address
        #[arg(long)]
        address: Address,

        /// Function name
        #[arg(long)]
        function: String,

        /// Chain id to send on; repeatable (default: every configured chain)
        #[arg(long = "chain")]
        chains: Vec<u64>,

        /// Wait for each transaction to be mined
        #[arg(long)]
        wait: bool,

        /// Function arguments
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    }
    .context("Failed to load config")?;

    match args.command {
        Command::Chains => {
            list_chains(&config);
            Ok(())
        }
        Command::Read {
            abi,
            address,
            function,
            chains,
            args,
        } => read(&config, abi, address, &function, &chains, &args).await,
        Command::Send {
            abi,
            address,
            function,
            chains,
            wait,
            args,
        } => send(&config, abi, address, &function, &chains, wait, &args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("omnicall=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn list_chains(config: &Config) {
    if config.chains.is_empty() {
        println!("No chains configured ({})", config_location());
        return;
    }

    for chain in &config.chains {
        let endpoint = chain
            .provider_config()
            .map(|provider| provider.display())
            .unwrap_or_else(|err| format!("<{}>", err));
        let aggregation = match chain.multicall_address() {
            Ok(Some(address)) => address.to_checksum(None),
            Ok(None) if canonical_address(chain.chain_id()).is_some() => "canonical".to_string(),
            Ok(None) => "none".to_string(),
            Err(err) => format!("<{}>", err),
        };
        println!(
            "{:>10}  {:<16} {:<40} multicall={} mode={:?}",
            chain.chain_id,
            chain.display_name(),
            endpoint,
            aggregation,
            chain.multicall_mode()
        );
    }
}

fn config_location() -> String {
    config::config_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "no config path".to_string())
}

/// Contract bound to the selected chains, plus chains that failed to connect
struct Session {
    args: Vec<DynSolValue>,
    contract: MultichainContract,
    pending: Vec<ChainId>,
    failures: Map<String, Value>,
}

async fn open_session(
    config: &Config,
    abi_path: &Path,
    function: &str,
    chains: &[u64],
    raw_args: &[String],
    options: ClientOptions,
) -> Result<Session> {
    let abi = Arc::new(
        load_abi(abi_path).with_context(|| format!("Failed to load ABI {}", abi_path.display()))?,
    );
    let args = parse_args(resolve_function(&abi, function, raw_args.len())?, raw_args)?;

    let requested: Vec<ChainId> = if chains.is_empty() {
        config.chains.iter().map(ChainConfig::chain_id).collect()
    } else {
        chains.iter().copied().map(ChainId).collect()
    };
    let selected: Vec<&ChainConfig> = config
        .chains
        .iter()
        .filter(|chain| requested.contains(&chain.chain_id()))
        .collect();

    // A chain that fails to connect is reported, the rest still run
    let mut failures = Map::new();
    let mut endpoints: Vec<Arc<dyn ChainEndpoint>> = Vec::new();
    for (chain, connected) in selected
        .iter()
        .zip(join_all(selected.iter().map(|chain| AlloyEndpoint::connect(chain))).await)
    {
        match connected {
            Ok(endpoint) => endpoints.push(Arc::new(endpoint)),
            Err(err) => {
                failures.insert(chain.chain_id.to_string(), Value::String(err.to_string()));
            }
        }
    }

    let options = selected.iter().fold(
        options.with_decoder(DecoderChain::for_abi(&abi)),
        |options, chain| options.with_chain_multicall(chain.chain_id(), chain.multicall_mode()),
    );
    let registry = ChainRegistry::new(endpoints).context("Invalid chain set")?;
    let contract = MultichainContract::new(abi, registry, options);

    let pending = requested
        .into_iter()
        .filter(|id| !failures.contains_key(&id.to_string()))
        .collect();

    Ok(Session {
        args,
        contract,
        pending,
        failures,
    })
}

fn print_outcome<T>(
    function: &str,
    address: Address,
    outcome: CrossChainBatchResult<T>,
    mut failures: Map<String, Value>,
    render: impl Fn(&T) -> Value,
) -> Result<()> {
    let results: Map<String, Value> = outcome
        .results_by_chain
        .iter()
        .map(|(chain_id, value)| (chain_id.to_string(), render(value)))
        .collect();
    for failure in &outcome.failed_chains {
        failures.insert(
            failure.chain_id.to_string(),
            Value::String(failure.error.to_string()),
        );
    }

    let output = json!({
        "function": function,
        "address": address.to_checksum(None),
        "results": results,
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn read(
    config: &Config,
    abi_path: PathBuf,
    address: Address,
    function: &str,
    chains: &[u64],
    raw_args: &[String],
) -> Result<()> {
    let session = open_session(
        config,
        &abi_path,
        function,
        chains,
        raw_args,
        ClientOptions::default(),
    )
    .await?;
    let outcome = session
        .contract
        .read_across(&session.pending, address, function, &session.args)
        .await;
    print_outcome(function, address, outcome, session.failures, to_json)
}

async fn send(
    config: &Config,
    abi_path: PathBuf,
    address: Address,
    function: &str,
    chains: &[u64],
    wait: bool,
    raw_args: &[String],
) -> Result<()> {
    let signer_config = config
        .signer
        .as_ref()
        .context("No [signer] section in config")?;
    let signer = LocalSigner::from_config(signer_config).context("Failed to load signer")?;
    info!(account = %signer.address(), "signing with local key");

    let options = ClientOptions::default().with_signer(Arc::new(signer));
    let session = open_session(config, &abi_path, function, chains, raw_args, options).await?;

    let execute = if wait {
        ExecuteOptions::wait()
    } else {
        ExecuteOptions::default()
    };
    let outcome = session
        .contract
        .execute_across(&session.pending, address, function, &session.args, execute)
        .await;
    print_outcome(function, address, outcome, session.failures, |execution| match execution {
        Execution::Submitted(hash) => json!({ "hash": hash.to_string() }),
        Execution::Confirmed(receipt) => json!({
            "hash": receipt.transaction_hash.to_string(),
            "block": receipt.block_number,
            "gas_used": receipt.gas_used,
            "success": receipt.success,
        }),
    })
}
