//! Run the staking oracle against a live cluster over JSON-RPC.

use clap::{value_parser, Arg, Command};
use commonware_cryptography::sha256::Digest;
use commonware_runtime::{tokio, Metrics, Runner};
use commonware_utils::from_hex_formatted;
use pledge_oracle::{Chain, Config, Engine, Error};
use serde_json::{json, Value};
use std::{collections::BTreeSet, time::Duration};
use tracing::{error, info, Level};

/// A [Chain] backed by a JSON-RPC endpoint.
#[derive(Clone)]
struct RpcChain {
    client: reqwest::Client,
    url: String,
}

impl RpcChain {
    fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, Error> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "method": method, "params": params }))
            .send()
            .await
            .map_err(|err| Error::Chain(err.to_string()))?;
        response
            .json()
            .await
            .map_err(|err| Error::Chain(err.to_string()))
    }
}

impl Chain for RpcChain {
    type Digest = Digest;

    async fn latest(&mut self) -> Result<(u64, Digest), Error> {
        let result = self.call("latest_block", json!({})).await?;
        let height = result["height"]
            .as_u64()
            .ok_or_else(|| Error::Chain("malformed height".to_string()))?;
        let hash = result["hash"]
            .as_str()
            .ok_or_else(|| Error::Chain("malformed hash".to_string()))?;
        let hash = from_hex_formatted(hash)
            .ok_or_else(|| Error::Chain("hash is not hex".to_string()))?;
        let digest = <[u8; 32]>::try_from(hash)
            .map(Digest::from)
            .map_err(|_| Error::Chain("hash is not a digest".to_string()))?;
        Ok((height, digest))
    }

    async fn submit(
        &mut self,
        relay: u32,
        validator: u32,
        amount: u128,
        nonce: u64,
        reference: Digest,
    ) -> Result<(), Error> {
        self.call(
            "submit_pledge",
            json!({
                "relay": relay,
                "validator": validator,
                "amount": amount.to_string(),
                "nonce": nonce,
                "reference": reference.to_string(),
            }),
        )
        .await?;
        Ok(())
    }

    async fn pledge(&mut self, validator: u32) -> Result<u128, Error> {
        let result = self.call("pledge", json!({ "validator": validator })).await?;
        result["pledge"]
            .as_str()
            .and_then(|pledge| pledge.parse().ok())
            .ok_or_else(|| Error::Chain("malformed pledge".to_string()))
    }

    async fn validators(&mut self) -> Result<BTreeSet<String>, Error> {
        let result = self.call("validators", json!({})).await?;
        let names = result["validators"]
            .as_array()
            .ok_or_else(|| Error::Chain("malformed validators".to_string()))?;
        names
            .iter()
            .map(|name| {
                name.as_str()
                    .map(String::from)
                    .ok_or_else(|| Error::Chain("malformed validator name".to_string()))
            })
            .collect()
    }
}

fn main() {
    // Parse arguments
    let matches = Command::new("pledge-oracle")
        .about("drive a validator cluster through a biphasic staking schedule")
        .arg(Arg::new("rpc").long("rpc").required(true))
        .arg(
            Arg::new("validators")
                .long("validators")
                .value_parser(value_parser!(u32))
                .default_value("3"),
        )
        .arg(
            Arg::new("epoch-length")
                .long("epoch-length")
                .value_parser(value_parser!(u64))
                .default_value("18"),
        )
        .arg(
            Arg::new("fake-offset")
                .long("fake-offset")
                .value_parser(value_parser!(u64))
                .default_value("6"),
        )
        .arg(
            Arg::new("real-offset")
                .long("real-offset")
                .value_parser(value_parser!(u64))
                .default_value("12"),
        )
        .arg(
            Arg::new("initial-nonce")
                .long("initial-nonce")
                .value_parser(value_parser!(u64))
                .default_value("3"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_parser(value_parser!(u64))
                .default_value("360"),
        )
        .arg(
            Arg::new("iteration-timeout")
                .long("iteration-timeout")
                .value_parser(value_parser!(u64))
                .default_value("30"),
        )
        .arg(
            Arg::new("poll-interval")
                .long("poll-interval")
                .value_parser(value_parser!(u64))
                .default_value("1"),
        )
        .get_matches();

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let rpc = matches.get_one::<String>("rpc").unwrap().clone();
    let config = Config {
        validators: *matches.get_one::<u32>("validators").unwrap(),
        epoch_length: *matches.get_one::<u64>("epoch-length").unwrap(),
        fake_offset: *matches.get_one::<u64>("fake-offset").unwrap(),
        real_offset: *matches.get_one::<u64>("real-offset").unwrap(),
        initial_nonce: *matches.get_one::<u64>("initial-nonce").unwrap(),
        timeout: Duration::from_secs(*matches.get_one::<u64>("timeout").unwrap()),
        iteration_timeout: Duration::from_secs(
            *matches.get_one::<u64>("iteration-timeout").unwrap(),
        ),
        poll_interval: Duration::from_secs(*matches.get_one::<u64>("poll-interval").unwrap()),
        sequence: Vec::new(),
    };
    info!(rpc, "starting oracle");

    // Start runtime
    let runner = tokio::Runner::default();
    runner.start(|context| async move {
        let engine = Engine::new(context.with_label("oracle"), RpcChain::new(rpc), config);
        match engine.start().await {
            Ok(Ok(())) => info!("run complete"),
            Ok(Err(err)) => {
                error!(?err, "run failed");
                std::process::exit(1);
            }
            Err(err) => {
                error!(?err, "task failed");
                std::process::exit(1);
            }
        }
    });
}
