//! Native-currency top-ups for user addresses.
//!
//! A top-up is allowed once per day per address (outside development), only
//! for verified addresses unless forced, and only when the address is short
//! of the balance cap by at least the configured share of the cap. The
//! transfer brings the balance back up to the cap.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, B256, U256};
use alloy::rpc::types::TransactionRequest;
use chrono::{DateTime, Duration, Utc};

use crate::balance::BalanceQuery;
use crate::config::{Environment, TopUpSettings};
use crate::contracts::IdentityGateway;
use crate::error::{WalletError, WalletResult};
use crate::executor::TransactionExecutor;

const GWEI: u64 = 1_000_000_000;
const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpRequest {
    pub address: Address,
    /// Time of the previous top-up; one day ago when unknown.
    pub last_topping: Option<DateTime<Utc>>,
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopUpReason {
    Forced,
    Verified,
    NotVerified,
    BelowThreshold,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopUpDecision {
    pub eligible: bool,
    /// Wei to transfer; zero unless a transfer should be sent.
    pub amount_to_send: U256,
    /// Cap minus current balance; zero when not computed or above the cap.
    pub deficit: U256,
    pub reason: TopUpReason,
}

impl TopUpDecision {
    pub fn should_send(&self) -> bool {
        matches!(self.reason, TopUpReason::Forced | TopUpReason::Verified)
    }
}

/// Handle for a submitted top-up transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTopUp {
    pub tx_hash: B256,
    pub to: Address,
    pub amount: U256,
}

/// Transfer parameters shared by every top-up.
#[derive(Debug, Clone, Copy)]
pub struct TransferOptions {
    pub from: Address,
    pub gas: u64,
    pub gas_price: u128,
}

pub struct TopUpPolicy<'a> {
    identity: IdentityGateway<'a>,
    balances: BalanceQuery<'a>,
    executor: &'a TransactionExecutor,
    settings: &'a TopUpSettings,
    environment: Environment,
    transfer: TransferOptions,
}

impl<'a> TopUpPolicy<'a> {
    pub fn new(
        identity: IdentityGateway<'a>,
        balances: BalanceQuery<'a>,
        executor: &'a TransactionExecutor,
        settings: &'a TopUpSettings,
        environment: Environment,
        transfer: TransferOptions,
    ) -> Self {
        Self {
            identity,
            balances,
            executor,
            settings,
            environment,
            transfer,
        }
    }

    pub fn balance_cap(&self) -> U256 {
        U256::from(self.settings.balance_cap_gwei) * U256::from(GWEI)
    }

    pub fn threshold(&self) -> U256 {
        self.balance_cap() * U256::from(self.settings.min_deficit_bps) / U256::from(BPS_DENOMINATOR)
    }

    /// Everything short of sending: rate limit, eligibility, and deficit.
    ///
    /// Only the rate limit is reported as an error; the other outcomes are
    /// carried in the decision's reason.
    pub async fn decide(&self, request: &TopUpRequest, now: DateTime<Utc>) -> WalletResult<TopUpDecision> {
        self.check_rate_limit(request, now)?;

        let reason = if request.force {
            TopUpReason::Forced
        } else if self.identity.is_verified(request.address).await? {
            TopUpReason::Verified
        } else {
            return Ok(TopUpDecision {
                eligible: false,
                amount_to_send: U256::ZERO,
                deficit: U256::ZERO,
                reason: TopUpReason::NotVerified,
            });
        };

        let balance = self.balances.address_balance(request.address).await?;
        let deficit = self.balance_cap().saturating_sub(balance);

        if !deficit.is_zero() && deficit >= self.threshold() {
            Ok(TopUpDecision {
                eligible: true,
                amount_to_send: deficit,
                deficit,
                reason,
            })
        } else {
            Ok(TopUpDecision {
                eligible: true,
                amount_to_send: U256::ZERO,
                deficit,
                reason: TopUpReason::BelowThreshold,
            })
        }
    }

    /// Decide and, when warranted, submit the transfer.
    pub async fn top_up(&self, request: &TopUpRequest, now: DateTime<Utc>) -> WalletResult<PendingTopUp> {
        let result = self.try_top_up(request, now).await;
        if let Err(e) = &result {
            tracing::error!(address = %request.address, force = request.force, error = %e, "Top-up failed");
        }
        result
    }

    async fn try_top_up(&self, request: &TopUpRequest, now: DateTime<Utc>) -> WalletResult<PendingTopUp> {
        let decision = self.decide(request, now).await?;

        match decision.reason {
            TopUpReason::NotVerified => return Err(WalletError::NotVerified(request.address)),
            TopUpReason::BelowThreshold => {
                return Err(WalletError::NoTopUpNeeded {
                    address: request.address,
                    deficit: decision.deficit,
                    threshold: self.threshold(),
                })
            }
            TopUpReason::Forced | TopUpReason::Verified => {}
        }

        let tx = TransactionRequest::default()
            .with_from(self.transfer.from)
            .with_to(request.address)
            .with_value(decision.amount_to_send)
            .with_gas_limit(self.transfer.gas)
            .with_gas_price(self.transfer.gas_price);
        let tx_hash = self.executor.submit(tx, "topUp").await?;

        tracing::info!(
            address = %request.address,
            amount = %decision.amount_to_send,
            reason = ?decision.reason,
            tx_hash = %tx_hash,
            "Top-up submitted"
        );

        Ok(PendingTopUp {
            tx_hash,
            to: request.address,
            amount: decision.amount_to_send,
        })
    }

    fn check_rate_limit(&self, request: &TopUpRequest, now: DateTime<Utc>) -> WalletResult<()> {
        if self.environment.is_development() {
            return Ok(());
        }

        let last_topping = request.last_topping.unwrap_or(now - Duration::days(1));
        let elapsed = now.signed_duration_since(last_topping);
        if elapsed < Duration::days(1) {
            return Err(WalletError::RateLimited {
                address: request.address,
                elapsed_minutes: elapsed.num_minutes(),
            });
        }
        Ok(())
    }
}
