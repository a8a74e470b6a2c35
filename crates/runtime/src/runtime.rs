//! High-level runtime orchestrator.
//!
//! The runtime owns the ledger worker, wires up command/event channels, and
//! exposes a builder-based API for deploying one dice game instance.

use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::info;

use dice_coprocessor::Coprocessor;
use dice_core::{ADDRESS_LEN, Address, GameConfig, GameLedgerState, Scope};

use crate::api::{LedgerEvent, LedgerHandle, LedgerInfo, Result, RuntimeError};
use crate::workers::{Command, LedgerWorker, NativeAccounts};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

/// A deployed dice game served by a background worker.
///
/// [`LedgerHandle`] provides a cloneable façade for clients. The worker stops
/// when [`Runtime::shutdown`] is called or the runtime is dropped.
pub struct Runtime {
    handle: LedgerHandle,
    coprocessor: Coprocessor,
    worker: JoinHandle<()>,
    shutdown_tx: oneshot::Sender<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to the ledger
    pub fn handle(&self) -> LedgerHandle {
        self.handle.clone()
    }

    /// Coprocessor serving this ledger's encryption and decryption.
    pub fn coprocessor(&self) -> Coprocessor {
        self.coprocessor.clone()
    }

    /// Subscribe to ledger events
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.handle.subscribe()
    }

    /// Shutdown the runtime gracefully
    pub async fn shutdown(self) -> Result<()> {
        // The worker also stops if it already exited; ignore a closed receiver.
        let _ = self.shutdown_tx.send(());
        self.worker.await.map_err(RuntimeError::WorkerJoin)
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    owner: Option<Address>,
    scope: Option<Scope>,
    coprocessor: Option<Coprocessor>,
    funding: Vec<(Address, u128)>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            owner: None,
            scope: None,
            coprocessor: None,
            funding: Vec::new(),
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Deployer of the game; the only identity allowed to withdraw (required).
    pub fn owner(mut self, owner: Address) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Ledger address that ciphertexts are bound to.
    ///
    /// Defaults to an address derived from the owner.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Share an existing coprocessor instead of starting a fresh one.
    pub fn coprocessor(mut self, coprocessor: Coprocessor) -> Self {
        self.coprocessor = Some(coprocessor);
        self
    }

    /// Seed an identity with native value before the ledger opens.
    pub fn fund(mut self, account: Address, amount: u128) -> Self {
        self.funding.push((account, amount));
        self
    }

    /// Build the runtime and spawn its worker.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build(self) -> Result<Runtime> {
        let owner = self.owner.ok_or(RuntimeError::MissingOwner)?;
        let scope = self.scope.unwrap_or_else(|| derive_scope(owner));
        if scope.is_zero() {
            return Err(RuntimeError::InvalidScope);
        }

        let mut accounts = NativeAccounts::default();
        for (account, amount) in self.funding {
            accounts.credit(account, amount)?;
        }

        let state = GameLedgerState::new(owner, scope, &self.config.game_config);
        let info = LedgerInfo {
            owner,
            scope,
            entry_fee: state.entry_fee(),
        };
        let coprocessor = self.coprocessor.unwrap_or_default();

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let (event_tx, _event_rx) =
            broadcast::channel::<LedgerEvent>(self.config.event_buffer_size);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let handle = LedgerHandle::new(command_tx, event_tx.clone(), info);

        let worker = LedgerWorker::new(
            state,
            coprocessor.clone(),
            accounts,
            command_rx,
            shutdown_rx,
            event_tx,
        );
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        info!(target: "runtime", %owner, %scope, "dice ledger deployed");
        Ok(Runtime {
            handle,
            coprocessor,
            worker,
            shutdown_tx,
        })
    }
}

/// Deterministic ledger address for an owner's deployment.
fn derive_scope(owner: Address) -> Scope {
    let digest = Sha256::new()
        .chain_update(b"dice-ledger")
        .chain_update(owner.as_bytes())
        .finalize();
    let mut bytes = [0u8; ADDRESS_LEN];
    bytes.copy_from_slice(&digest[..ADDRESS_LEN]);
    Scope::new(Address::from_bytes(bytes))
}
