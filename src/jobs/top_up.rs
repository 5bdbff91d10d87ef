use crate::topup::{TopUpDecision, TopUpReason, TopUpRequest};
use crate::transaction_monitor::TransactionReceipt;
use crate::wallet::AdminWallet;
use alloy::primitives::utils::format_units;
use alloy::primitives::B256;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

/// Outcome of a single top-up run.
#[derive(Debug)]
pub enum TopUpOutcome {
    /// Dry run: what would have happened.
    Planned(TopUpDecision),
    Submitted(B256),
    Confirmed(TransactionReceipt),
}

/// One top-up for one address, as run from the command line.
pub struct TopUpJob {
    wallet: Arc<AdminWallet>,
    dry_run: bool,
    wait: bool,
}

impl TopUpJob {
    pub fn new(wallet: Arc<AdminWallet>, dry_run: bool, wait: bool) -> Self {
        Self { wallet, dry_run, wait }
    }

    pub async fn execute(&self, request: &TopUpRequest) -> Result<TopUpOutcome> {
        tracing::info!(address = %request.address, force = request.force, dry_run = self.dry_run, "Top-up job starting");

        if self.dry_run {
            let decision = self.wallet.plan_top_up(request, Utc::now()).await?;
            match decision.reason {
                TopUpReason::Forced | TopUpReason::Verified => {
                    let amount = format_units(decision.amount_to_send, "ether")
                        .map_err(|e| anyhow::anyhow!("Failed to format amount: {}", e))?;
                    tracing::info!(amount_ether = %amount, reason = ?decision.reason, "DRY RUN: would send top-up")
                }
                TopUpReason::NotVerified | TopUpReason::BelowThreshold => tracing::info!(
                    deficit = %decision.deficit,
                    reason = ?decision.reason,
                    "DRY RUN: no top-up would be sent"
                ),
            }
            return Ok(TopUpOutcome::Planned(decision));
        }

        let pending = self
            .wallet
            .top_up(request.address, request.last_topping, request.force)
            .await?;

        if !self.wait {
            return Ok(TopUpOutcome::Submitted(pending.tx_hash));
        }

        let receipt = self.wallet.wait_for_receipt(pending.tx_hash).await?;
        tracing::info!(
            tx_hash = %receipt.hash,
            block = receipt.block_number,
            gas_used = %receipt.gas_used,
            "Top-up confirmed"
        );
        Ok(TopUpOutcome::Confirmed(receipt))
    }
}
