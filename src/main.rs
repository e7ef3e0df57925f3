use std::fs;
use std::sync::Arc;

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use omnilink::config::{self, Config};
use omnilink::domain::message::{decode_call, MessageHeader};
use omnilink::resolver::HandleSummary;
use omnilink::store::{KeyValueStore, MemoryStore, PinStore};
use omnilink::{logging, EndpointResolver};

#[derive(Debug, Parser)]
#[command(
    name = "omnilink",
    version,
    about = "Omnilink: RPC endpoint failover and bridge message decoding"
)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List configured chains
    Chains,
    /// Resolve a healthy RPC endpoint for a chain
    Resolve { chain_id: u64 },
    /// Probe one URL against a chain
    Probe { chain_id: u64, url: String },
    /// Pin a preferred RPC URL for a chain
    Pin {
        chain_id: u64,
        url: String,
        /// Probe the URL before pinning it
        #[arg(long)]
        check: bool,
    },
    /// Remove the pinned RPC URL of a chain
    Unpin { chain_id: u64 },
    /// Decode the recipient of an encoded bridge message (hex)
    Decode { payload: String },
    /// Decode the AMB header of an encoded bridge message (hex)
    Header { payload: String },
    /// Reverse-resolve an address or forward-resolve a name
    Lookup { chain_id: u64, query: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let config = config::load();
    let json = args.json;
    match args.command {
        Command::Decode { payload } => decode(&payload, json),
        Command::Header { payload } => header(&payload, json),
        Command::Chains => chains(&build_resolver(&config), json),
        Command::Resolve { chain_id } => {
            let resolver = build_resolver(&config);
            let Some(handle) = resolver.resolve(chain_id).await else {
                bail!("no healthy RPC endpoint for chain {chain_id}");
            };
            print_handle(&HandleSummary::from(&handle), json)?;
            if !json {
                match handle.block_number().await {
                    Ok(block) => println!("head      {block}"),
                    Err(err) => tracing::warn!(error = %format!("{err:#}"), "head block query failed"),
                }
            }
            Ok(())
        }
        Command::Probe { chain_id, url } => {
            let handle = build_resolver(&config)
                .probe(&url, chain_id)
                .await
                .with_context(|| format!("probe {url}"))?;
            print_handle(&HandleSummary::from(&handle), json)
        }
        Command::Pin {
            chain_id,
            url,
            check,
        } => {
            let resolver = build_resolver(&config);
            if check {
                resolver
                    .probe(&url, chain_id)
                    .await
                    .with_context(|| format!("refusing to pin {url}"))?;
            }
            resolver.pin(chain_id, &url)?;
            println!("pinned {url} for chain {chain_id}");
            Ok(())
        }
        Command::Unpin { chain_id } => {
            build_resolver(&config).unpin(chain_id)?;
            println!("unpinned chain {chain_id}");
            Ok(())
        }
        Command::Lookup { chain_id, query } => lookup(&build_resolver(&config), chain_id, &query).await,
    }
}

fn build_resolver(config: &Config) -> EndpointResolver {
    EndpointResolver::builder(config.chain_registry())
        .pin_store(open_pin_store())
        .session_store(Arc::new(MemoryStore::new()))
        .probe_timeout(config.probe_timeout())
        .build()
}

fn open_pin_store() -> Arc<dyn KeyValueStore> {
    let Some(db_path) = config::pins_db_path() else {
        tracing::warn!("no data directory, pins will not persist");
        return Arc::new(MemoryStore::new());
    };
    if let Some(parent) = db_path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match PinStore::open(&db_path) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "pin DB disabled");
            Arc::new(MemoryStore::new())
        }
    }
}

fn chains(resolver: &EndpointResolver, json: bool) -> Result<()> {
    for chain in resolver.registry().iter() {
        let pinned = resolver.pinned(chain.chain_id);
        if json {
            println!("{}", serde_json::json!({ "chain": chain, "pinned": pinned }));
            continue;
        }
        println!(
            "{:>6}  {:<24} {} default(s){}{}",
            chain.chain_id,
            chain.name,
            chain.rpc_urls.len(),
            chain
                .ens_address
                .map(|registry| format!(", registry {registry}"))
                .unwrap_or_default(),
            pinned.map(|url| format!(", pinned {url}")).unwrap_or_default(),
        );
    }
    Ok(())
}

async fn lookup(resolver: &EndpointResolver, chain_id: u64, query: &str) -> Result<()> {
    let Some(handle) = resolver.resolve(chain_id).await else {
        bail!("no healthy RPC endpoint for chain {chain_id}");
    };
    if handle.ens_address().is_none() {
        bail!("chain {chain_id} has no name registry");
    }
    match query.parse::<Address>() {
        Ok(address) => match handle.lookup_address(address).await? {
            Some(name) => println!("{name}"),
            None => println!("no primary name for {address}"),
        },
        Err(_) => match handle.resolve_name(query).await? {
            Some(address) => println!("{address}"),
            None => println!("{query} does not resolve"),
        },
    }
    Ok(())
}

fn decode(payload: &str, json: bool) -> Result<()> {
    let bytes = parse_hex(payload)?;
    match decode_call(&bytes) {
        Some(call) if json => println!("{}", serde_json::to_string_pretty(&call)?),
        Some(call) => {
            println!("method     {} ({})", call.method, call.method.selector_hex());
            println!("recipient  {}", call.recipient);
        }
        None if json => println!("null"),
        None => println!("no recipient (truncated payload or unknown method)"),
    }
    Ok(())
}

fn header(payload: &str, json: bool) -> Result<()> {
    let bytes = parse_hex(payload)?;
    let header = MessageHeader::parse(&bytes)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&header)?);
        return Ok(());
    }
    println!("message id   {}", header.message_id);
    println!("sender       {}", header.sender);
    println!("executor     {}", header.executor);
    println!("gas limit    {}", header.gas_limit);
    println!("data type    {}", header.data_type);
    println!("source       {}", header.source_chain_id);
    println!("destination  {}", header.destination_chain_id);
    println!("header size  {} bytes", header.byte_len());
    if !header.is_compact() {
        println!("warning: multi-byte chain ids, fixed-offset recipient decoding does not apply");
    }
    Ok(())
}

fn print_handle(summary: &HandleSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }
    println!("chain     {} ({})", summary.chain_name, summary.chain_id);
    println!("url       {}", summary.url);
    println!("source    {}", summary.source);
    if let Some(registry) = summary.ens_address {
        println!("registry  {registry}");
    }
    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>> {
    let trimmed = input.trim();
    let payload = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(payload).context("payload is not valid hex")
}
