//! Dice game client binary.
//!
//! Composition root for one end-to-end run: deploys a ledger on a local
//! coprocessor, plays a single round as a fresh player, reveals the result
//! through an authorized user decryption, prints the fairness record, and
//! finally withdraws the collected fee as the owner.
//!
//! # Examples
//!
//! ```bash
//! DICE_SEED=12345 DICE_GUESS=4 RUST_LOG=debug cargo run -p dice-client
//! ```

mod config;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use dice_client_core::{
    DiceSession, EncryptionGateway, FairnessRecord, GameReveal, IdentitySigner, LocalSigner,
    UserDecryptor,
};
use dice_coprocessor::Coprocessor;
use dice_core::{GameConfig, derive_seed};
use dice_runtime::{LedgerHandle, Runtime, RuntimeConfig};

use crate::config::ClientConfig;

/// Printed to stdout once the round is revealed.
#[derive(Serialize)]
struct RoundSummary<'a> {
    fairness: &'a FairnessRecord,
    reveal: &'a GameReveal,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = ClientConfig::from_env();
    let owner = LocalSigner::random();
    let player = LocalSigner::random();
    let coprocessor = Coprocessor::new();

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            command_buffer_size: config.command_buffer,
            ..RuntimeConfig::default()
        })
        .owner(owner.identity())
        .coprocessor(coprocessor.clone())
        .fund(player.identity(), GameConfig::WEI_PER_COIN)
        .build()
        .context("failed to deploy the dice ledger")?;

    tracing::info!(
        owner = %owner.identity(),
        player = %player.identity(),
        "Starting dice client"
    );

    let session = open_session(&runtime, &coprocessor, player, &config);
    let seed = config
        .seed
        .unwrap_or_else(|| derive_seed(&rand::random::<[u8; 32]>()));

    let record = session
        .play(seed, config.guess)
        .await
        .context("play was rejected")?;
    let reveal = session
        .reveal()
        .await
        .context("failed to reveal the latest game")?;

    let summary = RoundSummary {
        fairness: &record,
        reveal: &reveal,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    let owner_session = open_session(&runtime, &coprocessor, owner.clone(), &config);
    owner_session
        .withdraw()
        .await
        .context("owner withdraw failed")?;
    let owner_balance = runtime.handle().balance_of(owner.identity()).await?;
    tracing::info!(owner_balance, "Fees withdrawn");

    runtime.shutdown().await?;
    tracing::info!("Client shutdown complete");
    Ok(())
}

type Session = DiceSession<LedgerHandle, Coprocessor, Coprocessor, LocalSigner>;

fn open_session(
    runtime: &Runtime,
    coprocessor: &Coprocessor,
    signer: LocalSigner,
    config: &ClientConfig,
) -> Session {
    let protocol = config.protocol;
    DiceSession::new(
        runtime.handle(),
        EncryptionGateway::new(coprocessor.clone(), protocol.request_timeout),
        UserDecryptor::new(coprocessor.clone(), signer).with_config(protocol),
    )
}

/// Install a stderr subscriber honouring `RUST_LOG` (default `info`).
fn setup_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
