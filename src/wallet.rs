//! The administrative wallet service.
//!
//! # Lifecycle
//! ```text
//! Uninitialized ──initialize()──▶ Bound ──smoke check ok──▶ Ready
//!                                   └────smoke check err──▶ Degraded
//! ```
//! `initialize` selects the transport, loads the admin account, resolves
//! every contract, then checks the admin balances once. A resolution or
//! credential failure leaves the wallet `Uninitialized` and is returned. A
//! failed smoke check only degrades the wallet.
//!
//! The wallet is constructed explicitly and passed by reference
//! (`Arc<AdminWallet>`) to whatever serves requests.

use alloy::primitives::{Address, B256, U256};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::balance::BalanceQuery;
use crate::blockchain::{ChainRpc, Transport};
use crate::config::AgentConfig;
use crate::contracts::IdentityGateway;
use crate::deployments::Deployments;
use crate::error::{WalletError, WalletResult};
use crate::executor::TransactionExecutor;
use crate::registry::ContractRegistry;
use crate::signer::AdminAccount;
use crate::topup::{PendingTopUp, TopUpDecision, TopUpPolicy, TopUpRequest, TransferOptions};
use crate::transaction_monitor::{TransactionMonitor, TransactionReceipt};

const GWEI: u128 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletState {
    Uninitialized,
    /// Contracts bound, smoke check not yet run.
    Bound,
    Ready,
    /// Bound, but the startup balance check failed.
    Degraded(String),
}

impl WalletState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletState::Uninitialized => "uninitialized",
            WalletState::Bound => "bound",
            WalletState::Ready => "ready",
            WalletState::Degraded(_) => "degraded",
        }
    }

    /// Whether operations can be served.
    pub fn is_operational(&self) -> bool {
        matches!(self, WalletState::Bound | WalletState::Ready | WalletState::Degraded(_))
    }
}

struct WalletCore {
    account: AdminAccount,
    registry: ContractRegistry,
    executor: TransactionExecutor,
}

pub struct AdminWallet {
    config: AgentConfig,
    state: WalletState,
    core: Option<WalletCore>,
}

impl AdminWallet {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            state: WalletState::Uninitialized,
            core: None,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn state(&self) -> &WalletState {
        &self.state
    }

    /// Connect to the configured node and bind the deployed contracts.
    pub async fn initialize(&mut self) -> WalletResult<&WalletState> {
        if self.core.is_some() {
            return Ok(&self.state);
        }

        let result = self.connect().await;
        match result {
            Ok((chain, account, deployments)) => self.initialize_with(chain, account, &deployments).await,
            Err(e) => {
                tracing::error!(error = %e, "Wallet initialization failed");
                Err(e)
            }
        }
    }

    async fn connect(&self) -> WalletResult<(Arc<dyn ChainRpc>, AdminAccount, Deployments)> {
        let network = &self.config.network;
        let account = AdminAccount::from_settings(&self.config.account, network.id)?;
        let deployments = Deployments::load(&self.config.contracts)?;
        let transport = Transport::from_settings(network)?;
        let chain = transport.connect(account.wallet()).await?;
        Ok((Arc::new(chain), account, deployments))
    }

    /// Bind against an already connected chain; `initialize` ends here.
    pub async fn initialize_with(
        &mut self,
        chain: Arc<dyn ChainRpc>,
        account: AdminAccount,
        deployments: &Deployments,
    ) -> WalletResult<&WalletState> {
        let registry = match ContractRegistry::bind(deployments, &self.config.network, account.address()) {
            Ok(registry) => registry,
            Err(e) => {
                tracing::error!(error = %e, "Contract binding failed");
                return Err(e);
            }
        };

        let monitoring = &self.config.monitoring;
        let monitor = TransactionMonitor::new(
            chain.clone(),
            Duration::from_secs(monitoring.transaction_timeout_seconds),
            Duration::from_secs(monitoring.poll_interval_seconds),
        );

        self.core = Some(WalletCore {
            account,
            registry,
            executor: TransactionExecutor::new(chain, monitor),
        });
        self.state = WalletState::Bound;

        let check = self.smoke_check().await;
        self.state = match check {
            Ok(()) => WalletState::Ready,
            Err(reason) => {
                tracing::warn!(error = %reason, "Startup balance check failed, continuing degraded");
                WalletState::Degraded(reason)
            }
        };

        tracing::info!(state = self.state.as_str(), admin = ?self.admin_address(), "Wallet initialized");
        Ok(&self.state)
    }

    /// Read the admin token and native balances. Both are queried even when
    /// the first fails; every failure ends up in the returned reason.
    async fn smoke_check(&self) -> Result<(), String> {
        let balances = self.balances().map_err(|e| e.to_string())?;
        let mut failures = Vec::new();

        match balances.admin_token_balance().await {
            Ok(tokens) => tracing::info!(token_balance = %tokens, "Admin token balance"),
            Err(e) => failures.push(format!("token balance: {}", e)),
        }
        match balances.admin_balance().await {
            Ok(native) => tracing::info!(native_balance = %native, "Admin native balance"),
            Err(e) => failures.push(format!("native balance: {}", e)),
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }

    fn core(&self) -> WalletResult<&WalletCore> {
        self.core
            .as_ref()
            .ok_or_else(|| WalletError::NotReady("wallet has not been initialized".to_string()))
    }

    pub fn admin_address(&self) -> Option<Address> {
        self.core.as_ref().map(|core| core.account.address())
    }

    pub fn registry(&self) -> WalletResult<&ContractRegistry> {
        Ok(&self.core()?.registry)
    }

    pub fn identity(&self) -> WalletResult<IdentityGateway<'_>> {
        let core = self.core()?;
        Ok(IdentityGateway::new(core.registry.identity()?, &core.executor))
    }

    pub fn balances(&self) -> WalletResult<BalanceQuery<'_>> {
        let core = self.core()?;
        Ok(BalanceQuery::new(core.registry.token()?, &core.executor, core.account.address()))
    }

    pub fn top_up_policy(&self) -> WalletResult<TopUpPolicy<'_>> {
        let core = self.core()?;
        let network = &self.config.network;
        Ok(TopUpPolicy::new(
            self.identity()?,
            self.balances()?,
            &core.executor,
            &self.config.top_up,
            self.config.environment,
            TransferOptions {
                from: core.account.address(),
                gas: network.transfer_gas_limit,
                gas_price: u128::from(network.gas_price_gwei) * GWEI,
            },
        ))
    }

    pub async fn whitelist(&self, address: Address, external_id: &str) -> WalletResult<TransactionReceipt> {
        self.identity()?.whitelist(address, external_id).await
    }

    pub async fn blacklist(&self, address: Address) -> WalletResult<TransactionReceipt> {
        self.identity()?.blacklist(address).await
    }

    pub async fn is_verified(&self, address: Address) -> WalletResult<bool> {
        self.identity()?.is_verified(address).await
    }

    pub async fn top_up(
        &self,
        address: Address,
        last_topping: Option<DateTime<Utc>>,
        force: bool,
    ) -> WalletResult<PendingTopUp> {
        self.top_up_at(address, last_topping, force, Utc::now()).await
    }

    /// `top_up` evaluated at `now`.
    pub async fn top_up_at(
        &self,
        address: Address,
        last_topping: Option<DateTime<Utc>>,
        force: bool,
        now: DateTime<Utc>,
    ) -> WalletResult<PendingTopUp> {
        let request = TopUpRequest {
            address,
            last_topping,
            force,
        };
        self.top_up_policy()?.top_up(&request, now).await
    }

    /// The decision `top_up` would act on, without sending anything.
    pub async fn plan_top_up(&self, request: &TopUpRequest, now: DateTime<Utc>) -> WalletResult<TopUpDecision> {
        self.top_up_policy()?.decide(request, now).await
    }

    /// Wait for a submitted transaction, e.g. a top-up transfer.
    pub async fn wait_for_receipt(&self, tx_hash: B256) -> WalletResult<TransactionReceipt> {
        self.core()?.executor.confirm(tx_hash, "waitForReceipt").await
    }

    pub async fn address_balance(&self, address: Address) -> WalletResult<U256> {
        self.balances()?.address_balance(address).await
    }

    pub async fn admin_balance(&self) -> WalletResult<String> {
        self.balances()?.admin_balance().await
    }

    pub async fn token_balance(&self, address: Address) -> WalletResult<U256> {
        self.balances()?.token_balance(address).await
    }
}
